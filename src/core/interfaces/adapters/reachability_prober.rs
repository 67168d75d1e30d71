use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable { reason: String },
}

#[async_trait]
pub trait ReachabilityProber: Send + Sync {
    /// Metadata-only existence check. Never mutates the probed resource.
    async fn probe(&self, address: &str) -> Reachability;
}
