// src/source/koji.rs

//! Koji/Brew hub client
//!
//! Wraps a blocking reqwest client speaking XML-RPC, with retry support for
//! transport failures. Faults reported by the hub are not retried.

use super::xmlrpc::{self, Value};
use super::BuildBackend;
use crate::build::BuildRecord;
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default timeout for hub requests; bulk listings of a whole tag are slow
const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// Maximum attempts for a hub call
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

/// XML-RPC client for a Koji hub
pub struct KojiClient {
    client: Client,
    hub_url: Url,
    max_retries: u32,
}

impl KojiClient {
    /// Create a client for the hub at `hub_url`
    /// (e.g. `https://koji.fedoraproject.org/kojihub`)
    pub fn new(hub_url: &str) -> Result<Self> {
        let hub_url = Url::parse(hub_url)
            .map_err(|e| Error::Config(format!("Invalid hub URL '{hub_url}': {e}")))?;

        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            hub_url,
            max_retries: MAX_RETRIES,
        })
    }

    pub fn hub_url(&self) -> &Url {
        &self.hub_url
    }

    /// Issue one XML-RPC call, retrying transport failures
    pub fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
        let body = xmlrpc::encode_call(method, params);
        debug!("Calling {} on {}", method, self.hub_url);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send(&body) {
                Ok(text) => return xmlrpc::decode_response(&text),
                Err(reason) => {
                    if attempt >= self.max_retries {
                        return Err(Error::BackendUnavailable {
                            source_id: self.hub_url.to_string(),
                            reason: format!("{method} failed after {attempt} attempts: {reason}"),
                        });
                    }
                    warn!("{} attempt {} failed: {}, retrying...", method, attempt, reason);
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64));
                }
            }
        }
    }

    fn send(&self, body: &str) -> std::result::Result<String, String> {
        let response = self
            .client
            .post(self.hub_url.clone())
            .header("Content-Type", "text/xml")
            .body(body.to_string())
            .send()
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {} from {}", response.status(), self.hub_url));
        }

        response.text().map_err(|e| e.to_string())
    }

    fn list_tagged(&self, tag: &str, package: Option<&str>) -> Result<Vec<BuildRecord>> {
        let mut kwargs = vec![("latest", Value::from(true))];
        if let Some(package) = package {
            kwargs.push(("package", Value::from(package)));
        }

        let response = self.call("listTagged", &[Value::from(tag), Value::kwargs(kwargs)])?;
        decode_builds(response)
    }
}

/// Convert a `listTagged` response into build records
fn decode_builds(response: Value) -> Result<Vec<BuildRecord>> {
    match response {
        Value::Array(items) => items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item.into())
                    .map_err(|e| Error::Protocol(format!("Unexpected build map: {e}")))
            })
            .collect(),
        other => Err(Error::Protocol(format!(
            "listTagged returned a non-array value: {other:?}"
        ))),
    }
}

impl BuildBackend for KojiClient {
    fn list_latest_builds(&self, tag: &str) -> Result<Vec<BuildRecord>> {
        let builds = self.list_tagged(tag, None)?;
        debug!("Hub listed {} latest builds in {}", builds.len(), tag);
        Ok(builds)
    }

    fn get_latest_build(&self, tag: &str, package: &str) -> Result<Option<BuildRecord>> {
        Ok(self.list_tagged(tag, Some(package))?.into_iter().next())
    }

    fn first_inherited_tag(&self, tag: &str) -> Result<String> {
        let response = self.call("getFullInheritance", &[Value::from(tag)])?;
        response
            .as_array()
            .and_then(|chain| chain.first())
            .and_then(|parent| parent.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Protocol(format!("Tag '{tag}' has no inheritance")))
    }
}
