use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::models::DeviceClass;
use crate::global_constants;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScannerSettings {
    #[serde(default)]
    pub supabase_url: String,
    #[serde(default)]
    pub supabase_anon_key: String,
    #[serde(default = "default_storage_bucket")]
    pub storage_bucket: String,
    #[serde(default = "default_ocr_endpoint")]
    pub ocr_endpoint: String,
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
    #[serde(default)]
    pub device_class: DeviceClass,
}

fn default_storage_bucket() -> String {
    global_constants::DEFAULT_STORAGE_BUCKET.to_string()
}

fn default_ocr_endpoint() -> String {
    global_constants::DEFAULT_OCR_ENDPOINT.to_string()
}

fn default_cache_ttl_seconds() -> u64 {
    global_constants::DEFAULT_CACHE_TTL_SECONDS
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            storage_bucket: default_storage_bucket(),
            ocr_endpoint: default_ocr_endpoint(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
            device_class: DeviceClass::default(),
        }
    }
}

impl ScannerSettings {
    /// Loads the settings file, writing defaults when none exists yet, then
    /// applies environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_file_path()?;

        let settings = if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)?;
            let settings: ScannerSettings = serde_json::from_str(&contents)?;
            log::info!("[SETTINGS] Loaded settings from {:?}", settings_path);
            settings
        } else {
            log::info!("[SETTINGS] No settings file found, using defaults");
            let default_settings = Self::default();
            default_settings.save()?;
            default_settings
        };

        Ok(settings.with_overrides(|name| std::env::var(name).ok()))
    }

    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let settings_path = Self::get_settings_file_path()?;

        if let Some(parent) = settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&settings_path, contents)?;

        log::info!("[SETTINGS] Saved settings to {:?}", settings_path);
        Ok(settings_path)
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(global_constants::ENV_SUPABASE_URL) {
            log::debug!("[SETTINGS] Storage URL overridden from environment");
            self.supabase_url = url;
        }
        if let Some(key) = lookup(global_constants::ENV_SUPABASE_ANON_KEY) {
            log::debug!("[SETTINGS] Storage anon key overridden from environment");
            self.supabase_anon_key = key;
        }
        self
    }

    pub fn get_settings_file_path() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join(global_constants::APPLICATION_NAME);

        Ok(config_dir.join(global_constants::SETTINGS_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanner_settings_default_values() {
        let settings = ScannerSettings::default();

        assert_eq!(settings.storage_bucket, "scans");
        assert_eq!(settings.ocr_endpoint, "https://api.ocr.space/parse/image");
        assert_eq!(settings.cache_ttl_seconds, 3600);
        assert_eq!(settings.device_class, DeviceClass::Desktop);
        assert!(settings.supabase_url.is_empty());
    }

    #[test]
    fn test_deserialization_fills_missing_fields_with_defaults() {
        let json = r#"{ "supabase_url": "https://project.supabase.co" }"#;

        let settings: ScannerSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.supabase_url, "https://project.supabase.co");
        assert_eq!(settings.storage_bucket, "scans");
        assert_eq!(settings.cache_ttl_seconds, 3600);
    }

    #[test]
    fn test_settings_serialization_roundtrip_through_file() {
        let temp_dir = std::env::temp_dir().join("assignment-scanner-settings-test");
        std::fs::create_dir_all(&temp_dir).unwrap();

        let original_settings = ScannerSettings {
            supabase_url: "https://abc.supabase.co".to_string(),
            supabase_anon_key: "anon".to_string(),
            storage_bucket: "homework".to_string(),
            ocr_endpoint: "https://ocr.example.com/parse".to_string(),
            cache_ttl_seconds: 60,
            device_class: DeviceClass::Mobile,
        };

        let test_file = temp_dir.join("settings.json");
        std::fs::write(&test_file, serde_json::to_string_pretty(&original_settings).unwrap())
            .unwrap();
        let loaded: ScannerSettings =
            serde_json::from_str(&std::fs::read_to_string(&test_file).unwrap()).unwrap();

        assert_eq!(loaded, original_settings);

        std::fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_environment_overrides_replace_storage_connection() {
        let settings = ScannerSettings::default().with_overrides(|name| match name {
            "SUPABASE_URL" => Some("https://env.supabase.co".to_string()),
            "SUPABASE_ANON_KEY" => Some("env-anon".to_string()),
            _ => None,
        });

        assert_eq!(settings.supabase_url, "https://env.supabase.co");
        assert_eq!(settings.supabase_anon_key, "env-anon");
    }

    #[test]
    fn test_overrides_leave_settings_untouched_when_environment_is_empty() {
        let settings = ScannerSettings::default().with_overrides(|_| None);

        assert_eq!(settings, ScannerSettings::default());
    }
}
