use std::io::{self, Write};

use serde_json::Value;

use crate::models::{CLIConfig, RecordInfo, TaskInfo};

pub fn banner(cfg: &CLIConfig) {
    println!("Task Converter CLI");
    println!("API: {}", cfg.base_url);
    println!("Describe a task to convert it. Type /help for commands.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                      Show commands");
    println!("  /exit | /quit              Exit");
    println!("  /key <api-key>             Save the OpenAI API key");
    println!("  /forget-key                Remove the saved API key");
    println!("  /show                      Show the current result");
    println!("  /dismiss                   Dismiss the current result");
    println!("  /copy <section>            Print title, description or acceptance");
    println!("  /history                   List past conversions");
    println!("  /pick <n>                  Show history entry n");
    println!("  /clear-history             Clear past conversions");
    println!("  /fill <url> <page.json>    Fill the current result into a page fixture");
    println!("  /config                    Show current config");
    println!("  /base <url>                Update base URL");
}

pub fn task(task: &TaskInfo) {
    println!("Title: {}", task.title);
    println!("Description: {}", task.description);
    println!("Acceptance Criteria:");
    println!("{}", task.acceptance_criteria);
}

pub fn record(record: &RecordInfo) {
    println!("source: {}", record.source_text);
    task(&record.generated_task);
}

pub fn history(items: &[RecordInfo]) {
    if items.is_empty() {
        println!("no history");
        return;
    }
    for (idx, item) in items.iter().enumerate() {
        println!("[{}] {} -> {}", idx, item.source_text, item.generated_task.title);
    }
}

pub fn config(cfg: &CLIConfig) {
    println!("config:");
    println!("  base: {}", cfg.base_url);
    println!("  debug: {}", cfg.debug);
}

pub fn raw(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

pub fn success(msg: &str) {
    println!("ok: {}", msg);
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}
