use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::models::{ConvertRequest, ConvertResponse, FillRequest, FillResponse, RecordInfo};

pub struct HTTPClient {
    pub base_url: String,
    client: Client,
}

impl HTTPClient {
    pub fn new(base_url: &str) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(90))
            .build()
            .map_err(|err| err.to_string())?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn convert(&self, text: &str) -> Result<ConvertResponse, String> {
        let resp = self
            .client
            .post(self.url("/convert"))
            .json(&ConvertRequest {
                text: text.to_string(),
            })
            .send()
            .map_err(|err| err.to_string())?;
        decode(resp)
    }

    pub fn save_key(&self, key: &str) -> Result<Value, String> {
        let resp = self
            .client
            .put(self.url("/credential"))
            .json(&json!({"key": key}))
            .send()
            .map_err(|err| err.to_string())?;
        decode(resp)
    }

    pub fn remove_key(&self) -> Result<Value, String> {
        let resp = self
            .client
            .delete(self.url("/credential"))
            .send()
            .map_err(|err| err.to_string())?;
        decode(resp)
    }

    pub fn history(&self) -> Result<Vec<RecordInfo>, String> {
        let resp = self
            .client
            .get(self.url("/history"))
            .send()
            .map_err(|err| err.to_string())?;
        let value: Value = decode(resp)?;
        let items = value.get("history").cloned().unwrap_or_else(|| json!([]));
        serde_json::from_value(items).map_err(|err| err.to_string())
    }

    pub fn clear_history(&self) -> Result<Value, String> {
        let resp = self
            .client
            .delete(self.url("/history"))
            .send()
            .map_err(|err| err.to_string())?;
        decode(resp)
    }

    pub fn select(&self, index: usize) -> Result<Option<RecordInfo>, String> {
        let resp = self
            .client
            .post(self.url(&format!("/history/{}", index)))
            .send()
            .map_err(|err| err.to_string())?;
        let value: Value = decode(resp)?;
        parse_result(value)
    }

    pub fn current(&self) -> Result<Option<RecordInfo>, String> {
        let resp = self
            .client
            .get(self.url("/result"))
            .send()
            .map_err(|err| err.to_string())?;
        let value: Value = decode(resp)?;
        parse_result(value)
    }

    pub fn dismiss(&self) -> Result<Value, String> {
        let resp = self
            .client
            .delete(self.url("/result"))
            .send()
            .map_err(|err| err.to_string())?;
        decode(resp)
    }

    pub fn copy(&self, section: &str) -> Result<String, String> {
        let resp = self
            .client
            .get(self.url(&format!("/result/copy/{}", section)))
            .send()
            .map_err(|err| err.to_string())?;
        if resp.status().is_success() {
            resp.text().map_err(|err| err.to_string())
        } else {
            Err(error_text(resp))
        }
    }

    pub fn fill(&self, tab_url: &str, page: Value) -> Result<FillResponse, String> {
        let resp = self
            .client
            .post(self.url("/fill"))
            .json(&FillRequest {
                tab_url: tab_url.to_string(),
                page,
            })
            .send()
            .map_err(|err| err.to_string())?;
        decode(resp)
    }
}

fn parse_result(value: Value) -> Result<Option<RecordInfo>, String> {
    match value.get("result") {
        Some(Value::Null) | None => Ok(None),
        Some(raw) => serde_json::from_value(raw.clone())
            .map(Some)
            .map_err(|err| err.to_string()),
    }
}

fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, String> {
    if resp.status().is_success() {
        resp.json::<T>().map_err(|err| err.to_string())
    } else {
        Err(error_text(resp))
    }
}

/// Prefers the server's user-facing message over the raw body.
fn error_text(resp: Response) -> String {
    let status = resp.status();
    let body = resp.text().unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(str::to_string));
    match message {
        Some(message) => message,
        None => format!("http {}: {}", status.as_u16(), body),
    }
}
