// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    blit::FB_DEVICE, convert::SoftwareConvert, engine::Facing, error::Result,
    params::ParameterDefaults,
};
use serde::{Deserialize, Serialize};
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Environment variable naming an alternative configuration file.
pub const CONFIG_ENV: &str = "CAMERA_HAL_CONFIG";

pub const DEFAULT_CONFIG_PATH: &str = "/vendor/etc/camera_hal.json";

/// HAL configuration.
///
/// Every field has a default matching the stock device, so an absent file
/// or a partial one is fine.
///
/// ```json
/// {
///     "blit_device": "/dev/graphics/fb0",
///     "orientation": 90,
///     "software_convert": { "library": "liboemcamera.so" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HalConfig {
    /// Framebuffer node used for preview blits
    pub blit_device: PathBuf,

    /// Mode passed to the vendor engine when a camera is opened
    pub open_mode: i32,

    /// Facing reported for every camera, regardless of the engine
    pub facing: Facing,

    /// Sensor orientation reported for every camera, in degrees
    pub orientation: i32,

    /// Default tracing filter; `RUST_LOG` takes precedence
    pub log_filter: String,

    /// Vendor software conversion of recording frames, off when absent
    pub software_convert: Option<SoftwareConvert>,

    /// Parameter values filled in when the engine leaves them unset
    pub defaults: ParameterDefaults,
}

impl Default for HalConfig {
    fn default() -> Self {
        Self {
            blit_device: PathBuf::from(FB_DEVICE),
            open_mode: 5,
            facing: Facing::Back,
            orientation: 90,
            log_filter: "info".to_string(),
            software_convert: None,
            defaults: ParameterDefaults::default(),
        }
    }
}

impl HalConfig {
    /// Loads from `$CAMERA_HAL_CONFIG`, or the default path when unset.
    pub fn load() -> Result<Self> {
        let path = env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::from_path(path)
    }

    /// Loads from `path`, falling back to defaults when the file does not
    /// exist. A file that exists but does not parse is an error.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                debug!("loading configuration from {}", path.display());
                Ok(serde_json::from_str(&text)?)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}
