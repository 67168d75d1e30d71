mod blob_store;
mod clipboard;
mod identity_provider;
mod reachability_prober;
mod text_extraction_service;

pub use blob_store::{BlobStore, BlobUpload};
pub use clipboard::TextClipboard;
pub use identity_provider::IdentityProvider;
pub use reachability_prober::{Reachability, ReachabilityProber};
pub use text_extraction_service::TextExtractionService;
