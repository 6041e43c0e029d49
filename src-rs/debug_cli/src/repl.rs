use std::fs;
use std::io;

use serde_json::Value;

use crate::client::HTTPClient;
use crate::models::CLIConfig;
use crate::render;

pub struct REPL {
    pub config: CLIConfig,
    pub client: HTTPClient,
}

impl REPL {
    pub fn new(config: CLIConfig, client: HTTPClient) -> Self {
        Self { config, client }
    }

    pub fn run(&mut self) {
        render::banner(&self.config);
        loop {
            render::prompt();
            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('/') {
                if self.handle_command(&line) {
                    break;
                }
                continue;
            }
            self.convert(&line);
        }
    }

    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "key" => {
                if rest.is_empty() {
                    render::error("Please enter a valid API key");
                } else {
                    self.report(self.client.save_key(rest).map(|_| "API key saved successfully!"));
                }
            }
            "forget-key" => self.report(self.client.remove_key().map(|_| "API key removed")),
            "show" => match self.client.current() {
                Ok(Some(record)) => render::record(&record),
                Ok(None) => render::info("no current result"),
                Err(err) => render::error(&err),
            },
            "dismiss" => self.report(self.client.dismiss().map(|_| "result dismissed")),
            "copy" => match self.client.copy(rest) {
                Ok(text) => render::info(&text),
                Err(err) => render::error(&err),
            },
            "history" => match self.client.history() {
                Ok(items) => render::history(&items),
                Err(err) => render::error(&err),
            },
            "pick" => match rest.parse::<usize>() {
                Ok(index) => match self.client.select(index) {
                    Ok(Some(record)) => render::record(&record),
                    Ok(None) => render::info("no such entry"),
                    Err(err) => render::error(&err),
                },
                Err(_) => render::error("usage: /pick <n>"),
            },
            "clear-history" => self.report(self.client.clear_history().map(|_| "History cleared")),
            "fill" => self.fill(rest),
            "config" => render::config(&self.config),
            "base" => {
                if rest.is_empty() {
                    render::info(&format!("base: {}", self.config.base_url));
                } else {
                    match HTTPClient::new(rest) {
                        Ok(client) => {
                            self.config.base_url = rest.to_string();
                            self.client = client;
                            render::info("base url updated");
                        }
                        Err(err) => render::error(&err),
                    }
                }
            }
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    fn report(&self, result: Result<&str, String>) {
        match result {
            Ok(msg) => render::success(msg),
            Err(err) => render::error(&err),
        }
    }

    fn convert(&mut self, text: &str) {
        match self.client.convert(text) {
            Ok(resp) => {
                if let (true, Some(task)) = (resp.success, resp.task.as_ref()) {
                    render::task(task);
                    render::success(&resp.message);
                } else {
                    render::error(&resp.message);
                    if self.config.debug {
                        if let Some(detail) = &resp.error {
                            render::info(detail);
                        }
                    }
                }
            }
            Err(err) => render::error(&err),
        }
    }

    fn fill(&self, rest: &str) {
        let mut args = rest.split_whitespace();
        let (url, path) = match (args.next(), args.next()) {
            (Some(url), Some(path)) => (url, path),
            _ => {
                render::error("usage: /fill <url> <page.json>");
                return;
            }
        };
        let page = match fs::read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|raw| serde_json::from_str::<Value>(&raw).map_err(|err| err.to_string()))
        {
            Ok(page) => page,
            Err(err) => {
                render::error(&format!("could not read {}: {}", path, err));
                return;
            }
        };
        match self.client.fill(url, page) {
            Ok(resp) => {
                if resp.success {
                    render::success(&resp.message);
                } else {
                    render::error(&resp.message);
                }
                if self.config.debug {
                    render::raw(&resp.page);
                }
            }
            Err(err) => render::error(&err),
        }
    }
}
