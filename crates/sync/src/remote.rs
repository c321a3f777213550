use async_trait::async_trait;
use eyre::{Result, WrapErr, eyre};
use mockall::automock;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::SyncConfig;

pub const CLIENTS_PATH: &str = "/clients";
pub const APPOINTMENTS_PATH: &str = "/appointments";

/// Transport to the external system of record.
///
/// `None` stands for "no data": the request failed, the remote answered with
/// a non-success status, or the body was not JSON. Implementations log the
/// cause themselves.
#[automock]
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn get_json(&self, path: &str) -> Option<Value>;
    async fn post_json(&self, path: &str, payload: Value) -> Option<Value>;
}

/// [`RemoteApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemoteApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteApi {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .wrap_err("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn try_get(&self, path: &str) -> Result<Value> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(eyre!("GET {} returned {}", path, status));
        }

        decode_remote_body(path, &text)
    }

    async fn try_post(&self, path: &str, payload: &Value) -> Result<Value> {
        let response = self.client.post(self.url(path)).json(payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(eyre!("POST {} returned {}: {}", path, status, error_text));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn get_json(&self, path: &str) -> Option<Value> {
        debug!("GET {}{}", self.base_url, path);
        match self.try_get(path).await {
            Ok(value) => Some(value),
            Err(err) => {
                error!("External API GET {} failed: {:#}", path, err);
                None
            }
        }
    }

    async fn post_json(&self, path: &str, payload: Value) -> Option<Value> {
        debug!("POST {}{}", self.base_url, path);
        match self.try_post(path, &payload).await {
            Ok(value) => Some(value),
            Err(err) => {
                error!("External API POST {} failed: {:#}", path, err);
                None
            }
        }
    }
}

/// Decodes a response body from the remote API.
///
/// The mock client listing wraps its payload in a `body` member, sometimes as
/// a JSON-encoded string. When the raw text of a `/clients` response mentions
/// `body` and the document is an object carrying that member, the member
/// (decoded once more if it is a string) is the payload.
pub fn decode_remote_body(path: &str, text: &str) -> Result<Value> {
    let value: Value =
        serde_json::from_str(text).wrap_err_with(|| format!("Invalid JSON from {}", path))?;

    if path != CLIENTS_PATH || !text.contains("body") {
        return Ok(value);
    }

    match value {
        Value::Object(mut object) if object.contains_key("body") => {
            match object.remove("body").unwrap_or(Value::Null) {
                Value::String(inner) => serde_json::from_str(&inner)
                    .wrap_err_with(|| format!("Invalid JSON in body member from {}", path)),
                other => Ok(other),
            }
        }
        other => Ok(other),
    }
}
