mod blob_publisher;
mod capability_checker;
mod frame_capturer;

pub use blob_publisher::BlobPublisher;
pub use capability_checker::{CapabilityChecker, CapabilityGrant};
pub use frame_capturer::FrameCapturer;
