use figment::providers::Env;
use figment::Figment;
use serde::{Deserialize, Serialize};
use shared::core::{AllocationStrategy, DEFAULT_MAX_ATTEMPTS};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Config {
    pub table_name: String,
    /// Prefix of every returned short URL, read from `URL`.
    #[serde(rename = "url")]
    pub base_url: String,
    #[serde(default = "default_max_allocation_attempts")]
    pub max_allocation_attempts: u32,
    #[serde(default)]
    pub allocation_strategy: AllocationStrategy,
    /// Answer unparseable bodies with 500 instead of 400.
    #[serde(default)]
    pub malformed_body_as_server_error: bool,
}

fn default_max_allocation_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Env::raw().only(&[
                "TABLE_NAME",
                "URL",
                "MAX_ALLOCATION_ATTEMPTS",
                "ALLOCATION_STRATEGY",
                "MALFORMED_BODY_AS_SERVER_ERROR",
            ]))
            .extract()
    }
}
