mod still_image_camera;
mod system_clipboard;
mod xcap_camera;

pub use still_image_camera::StillImageCamera;
pub use system_clipboard::SystemClipboard;
pub use xcap_camera::XcapCamera;
