use async_trait::async_trait;

use crate::core::interfaces::adapters::{Reachability, ReachabilityProber};
use crate::global_constants::LOG_TAG_PROBE;

/// Checks a published address with a HEAD request.
pub struct HttpReachabilityProber {
    http: reqwest::Client,
}

impl HttpReachabilityProber {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpReachabilityProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReachabilityProber for HttpReachabilityProber {
    async fn probe(&self, address: &str) -> Reachability {
        log::debug!("{} HEAD {}", LOG_TAG_PROBE, address);

        match self.http.head(address).send().await {
            Ok(response) if response.status().is_success() => {
                log::debug!("{} {} answered {}", LOG_TAG_PROBE, address, response.status());
                Reachability::Reachable
            }
            Ok(response) => {
                let reason = format!("HEAD returned {}", response.status());
                log::warn!("{} {}: {}", LOG_TAG_PROBE, address, reason);
                Reachability::Unreachable { reason }
            }
            Err(error) => {
                let reason = format!("HEAD failed: {}", error);
                log::warn!("{} {}: {}", LOG_TAG_PROBE, address, reason);
                Reachability::Unreachable { reason }
            }
        }
    }
}
