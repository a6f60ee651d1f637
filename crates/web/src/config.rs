use std::env;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    pub bind_address: String,
}

impl WebConfig {
    /// Reads `WEB_BIND_ADDRESS`, falling back to `0.0.0.0:8080`.
    pub fn from_env() -> Self {
        Self::from_bind_address(env::var("WEB_BIND_ADDRESS").ok())
    }

    fn from_bind_address(bind_address: Option<String>) -> Self {
        let bind_address = bind_address
            .map(|address| address.trim().to_owned())
            .filter(|address| !address.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_owned());
        Self { bind_address }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self::from_bind_address(None)
    }
}
