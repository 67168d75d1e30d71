pub const APPLICATION_NAME: &str = "assignment-scanner";
pub const APPLICATION_TITLE: &str = "Assignment Scanner";

pub const LOG_TAG_APP: &str = "[APP]";
pub const LOG_TAG_CAPTURE: &str = "[CAPTURE]";
pub const LOG_TAG_CAMERA: &str = "[CAMERA]";
pub const LOG_TAG_PUBLISH: &str = "[PUBLISH]";
pub const LOG_TAG_PROBE: &str = "[PROBE]";

pub const SETTINGS_FILE_NAME: &str = "settings.json";

pub const ENV_OCR_API_KEY: &str = "OCRSPACE_API_KEY";
pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_SUPABASE_ACCESS_TOKEN: &str = "SUPABASE_ACCESS_TOKEN";
pub const ENV_SCANNER_EMAIL: &str = "SCANNER_EMAIL";
pub const ENV_SCANNER_PASSWORD: &str = "SCANNER_PASSWORD";

pub const DEFAULT_OCR_ENDPOINT: &str = "https://api.ocr.space/parse/image";
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";
pub const DEFAULT_STORAGE_BUCKET: &str = "scans";
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 3600;

pub const PNG_CONTENT_TYPE: &str = "image/png";
pub const SCAN_KEY_PREFIX: &str = "scan_";
pub const SCAN_KEY_EXTENSION: &str = ".png";

pub const IDEAL_CAPTURE_WIDTH: u32 = 2560;
pub const MIN_CAPTURE_WIDTH: u32 = 1280;
pub const IDEAL_CAPTURE_HEIGHT: u32 = 1440;
pub const MIN_CAPTURE_HEIGHT: u32 = 720;

pub const PROVIDER_SUCCESS_EXIT_CODE: i64 = 1;
pub const LOG_PREVIEW_LIMIT: usize = 500;

pub const TRACE_ERROR_MARKER: &str = "ERROR";
pub const TRACE_ADVISORY_MARKER: &str = "ADVISORY";

pub const USER_MESSAGE_PERMISSION_DENIED: &str =
    "Camera access was denied. Please enable camera permissions in your browser or system settings.";
pub const USER_MESSAGE_DEVICE_UNAVAILABLE: &str =
    "Could not access camera. Make sure your device has a working camera.";
pub const USER_MESSAGE_CAPTURE_FAILED: &str = "Failed to capture image. Please retake.";
pub const USER_MESSAGE_NOT_SIGNED_IN: &str = "You must be logged in to scan";
pub const USER_MESSAGE_INVALID_ADDRESS: &str = "Invalid image URL format";
pub const USER_MESSAGE_MISCONFIGURED: &str =
    "The OCR service is not configured on this installation. Please contact support.";
pub const USER_MESSAGE_INVALID_PROVIDER_RESPONSE: &str = "Invalid response from OCR service";
pub const USER_MESSAGE_EXTRACTION_FAILED: &str = "Failed to process image with OCR service";
pub const USER_MESSAGE_NO_TEXT_DETECTED: &str =
    "No text detected. Try adjusting the lighting and camera position.";
pub const USER_MESSAGE_CANCELLED: &str = "The scan was cancelled before it finished.";
