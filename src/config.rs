use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub rabbitmq_url: String,
    pub sync_queue_name: String,
    pub failed_queue_name: String,
    /// Must stay at 1: a single in-flight message is what preserves
    /// strict offset ordering across the sync chain.
    pub prefetch_count: u16,

    pub catalog_api_url: String,
    pub catalog_api_key: String,

    pub storefront_store: String,
    pub storefront_access_token: String,
    pub storefront_api_version: String,

    pub operation_poll_interval_ms: u64,
    pub operation_poll_max_attempts: u32,

    #[serde(default)]
    pub notification_api_key: Option<String>,

    pub server_port: u16,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|_| anyhow!("Invalid or missing environmental variable"))?;
        Ok(config)
    }

    pub fn storefront_graphql_url(&self) -> String {
        format!(
            "https://{}.myshopify.com/admin/api/{}/graphql.json",
            self.storefront_store, self.storefront_api_version
        )
    }
}
