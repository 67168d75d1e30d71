use std::fmt;

use serde::{Deserialize, Serialize};

use crate::global_constants::{
    IDEAL_CAPTURE_HEIGHT, IDEAL_CAPTURE_WIDTH, MIN_CAPTURE_HEIGHT, MIN_CAPTURE_WIDTH,
};

const MOBILE_USER_AGENT_MARKERS: [&str; 4] = ["iphone", "ipad", "ipod", "android"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DeviceClass {
    Mobile,
    #[default]
    Desktop,
}

impl DeviceClass {
    pub fn from_user_agent(user_agent: &str) -> Self {
        let lowered = user_agent.to_lowercase();
        if MOBILE_USER_AGENT_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceClass::Mobile => write!(f, "Mobile"),
            DeviceClass::Desktop => write!(f, "Desktop"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Rear camera, pointed at the document.
    Environment,
    /// Front camera, pointed at the user.
    User,
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::Environment => write!(f, "environment"),
            FacingMode::User => write!(f, "user"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionRange {
    pub ideal: u32,
    pub min: u32,
}

impl DimensionRange {
    pub fn accepts(&self, value: u32) -> bool {
        value >= self.min
    }
}

/// What we ask the platform for when opening a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    pub width: DimensionRange,
    pub height: DimensionRange,
    pub facing_mode: FacingMode,
}

impl VideoConstraints {
    pub fn for_device(device_class: DeviceClass) -> Self {
        let facing_mode = match device_class {
            DeviceClass::Mobile => FacingMode::Environment,
            DeviceClass::Desktop => FacingMode::User,
        };

        Self {
            width: DimensionRange {
                ideal: IDEAL_CAPTURE_WIDTH,
                min: MIN_CAPTURE_WIDTH,
            },
            height: DimensionRange {
                ideal: IDEAL_CAPTURE_HEIGHT,
                min: MIN_CAPTURE_HEIGHT,
            },
            facing_mode,
        }
    }

    pub fn accepts_resolution(&self, width: u32, height: u32) -> bool {
        self.width.accepts(width) && self.height.accepts(height)
    }
}
