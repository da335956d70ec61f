//! Environment configuration, `.env`-friendly.

use std::env;

/// Override for the Universalis base URL (self-hosted mirrors, tests).
pub const ENV_UNIVERSALIS_API: &str = "CPS_UNIVERSALIS_API";

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub universalis_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            universalis_base_url: env::var(ENV_UNIVERSALIS_API).ok(),
        }
    }
}
