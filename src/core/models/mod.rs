mod capture_buffer;
mod capture_constraints;
mod capture_session;
mod diagnostic_trace;
mod extraction;
mod identity;
mod published_image;
mod user_settings;

pub use capture_buffer::{CaptureBuffer, EncodedFrame};
pub use capture_constraints::{DeviceClass, FacingMode, VideoConstraints};
pub use capture_session::{CaptureOutcome, CaptureSession, SessionState};
pub use diagnostic_trace::DiagnosticTrace;
pub use extraction::ExtractionResult;
pub use identity::Identity;
pub use published_image::PublishedImage;
pub use user_settings::ScannerSettings;
