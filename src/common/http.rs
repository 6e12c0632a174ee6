use std::time::Duration;

use reqwest::{Error, blocking};

use crate::configs::HttpConfig;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

pub struct HttpClient;

impl HttpClient {
    pub fn default_user_agent() -> String {
        DEFAULT_USER_AGENT.to_string()
    }

    /// Blocking client handed to the resolver. Resolution runs on the
    /// blocking pool, never on the session's own task.
    pub fn new_blocking(config: &HttpConfig) -> Result<blocking::Client, Error> {
        blocking::Client::builder()
            .user_agent(
                config
                    .user_agent
                    .clone()
                    .unwrap_or_else(Self::default_user_agent),
            )
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
    }
}
