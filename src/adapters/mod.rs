mod http_reachability_prober;
mod ocr_space_client;
mod supabase_auth;
mod supabase_errors;
mod supabase_storage;

pub use http_reachability_prober::HttpReachabilityProber;
pub use ocr_space_client::{OcrSpaceClient, UnconfiguredTextExtraction};
pub use supabase_auth::{credentials_from_environment, SessionCredentials, SupabaseAuth};
pub use supabase_storage::SupabaseStorage;
