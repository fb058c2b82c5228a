//! Remote Data Service
//!
//! The registry lives in a Supabase project. Both calls go through PostgREST's
//! RPC endpoint: one returns the distinct filter values, the other returns a
//! filtered page of flat rows.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::model::{FilterOptionRow, FilterOptions, PsychologistRow};
use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, Result};

/// Source of directory data
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Distinct values for the filter dropdowns
    async fn filter_options(&self) -> Result<FilterOptions>;

    /// One page of flat rows for the given RPC parameters
    async fn search(&self, params: Value) -> Result<Vec<PsychologistRow>>;
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    options_rpc: String,
    search_rpc: String,
}

impl SupabaseClient {
    pub fn new(config: &DirectoryConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.service_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            options_rpc: config.options_rpc.clone(),
            search_rpc: config.search_rpc.clone(),
        })
    }

    pub fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, function)
    }

    async fn call<T: DeserializeOwned>(&self, function: &str, params: &Value) -> Result<T> {
        debug!(function, %params, "calling rpc");

        let res = self
            .client
            .post(self.rpc_url(function))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(params)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let message = service_message(status, &body);
            warn!(function, status = status.as_u16(), %message, "rpc failed");
            return Err(DirectoryError::Service {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl DirectoryService for SupabaseClient {
    async fn filter_options(&self) -> Result<FilterOptions> {
        let rows: Vec<FilterOptionRow> = self.call(&self.options_rpc, &Value::Object(Default::default())).await?;
        let options = FilterOptions::from_rows(rows);
        debug!(
            specialties = options.specialties.len(),
            branches = options.branches.len(),
            "filter options loaded"
        );
        Ok(options)
    }

    async fn search(&self, params: Value) -> Result<Vec<PsychologistRow>> {
        self.call(&self.search_rpc, &params).await
    }
}

/// PostgREST error bodies carry a `message` field; fall back to the raw body
fn service_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                trimmed.to_string()
            }
        })
}
