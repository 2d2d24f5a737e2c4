// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use tracing::warn;

pub const KEY_PREVIEW_SIZE: &str = "preview-size";
pub const KEY_SUPPORTED_PREVIEW_SIZES: &str = "preview-size-values";
pub const KEY_PREVIEW_FORMAT: &str = "preview-format";
pub const KEY_PREVIEW_FRAME_RATE: &str = "preview-frame-rate";
pub const KEY_SUPPORTED_PREVIEW_FRAME_RATES: &str = "preview-frame-rate-values";
pub const KEY_VIDEO_SIZE: &str = "video-size";
pub const KEY_SUPPORTED_VIDEO_SIZES: &str = "video-size-values";
pub const KEY_PREFERRED_PREVIEW_SIZE_FOR_VIDEO: &str = "preferred-preview-size-for-video";
pub const KEY_VIDEO_FRAME_FORMAT: &str = "video-frame-format";

pub const PIXEL_FORMAT_YV12: &str = "yuv420p";
pub const PIXEL_FORMAT_NV12: &str = "nv12";

/// Camera settings in the flattened `key=value;key=value` form exchanged
/// with the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraParameters {
    map: BTreeMap<String, String>,
}

impl CameraParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a flattened string. Pairs without a `=` are skipped.
    pub fn unflatten(flat: &str) -> Self {
        let mut params = Self::new();
        params.replace_from(flat);
        params
    }

    /// Replaces every setting with the ones in `flat`.
    pub fn replace_from(&mut self, flat: &str) {
        self.map.clear();
        for pair in flat.split(';').filter(|p| !p.is_empty()) {
            match pair.split_once('=') {
                Some((key, value)) => {
                    self.map.insert(key.to_string(), value.to_string());
                }
                None => warn!("ignoring malformed parameter {pair:?}"),
            }
        }
    }

    pub fn flatten(&self) -> String {
        self.map
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    /// Sets `key`. Keys and values may not contain the `=` and `;`
    /// separators; such pairs are rejected with a warning.
    pub fn set(&mut self, key: &str, value: &str) {
        if key.contains(['=', ';']) || value.contains(['=', ';']) {
            warn!("rejecting parameter {key:?}={value:?}: contains a separator");
            return;
        }
        self.map.insert(key.to_string(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.map.remove(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn preview_size(&self) -> Option<(u32, u32)> {
        self.get(KEY_PREVIEW_SIZE).and_then(parse_size)
    }

    pub fn video_size(&self) -> Option<(u32, u32)> {
        self.get(KEY_VIDEO_SIZE).and_then(parse_size)
    }

    fn set_if_absent(&mut self, key: &str, value: &str) {
        if self.get(key).is_none() {
            self.set(key, value);
        }
    }

    /// Patches the engine's settings into what the framework expects from
    /// this device: fixed frame formats, and size/rate lists for anything
    /// the engine leaves unset.
    pub fn apply_fixups(&mut self, defaults: &ParameterDefaults) {
        self.set(KEY_VIDEO_FRAME_FORMAT, PIXEL_FORMAT_YV12);
        self.set(KEY_PREVIEW_FORMAT, PIXEL_FORMAT_NV12);

        self.set_if_absent(KEY_SUPPORTED_PREVIEW_SIZES, &defaults.preview_sizes);
        self.set_if_absent(KEY_SUPPORTED_VIDEO_SIZES, &defaults.video_sizes);
        self.set_if_absent(KEY_VIDEO_SIZE, &defaults.preferred_size);
        self.set_if_absent(KEY_PREFERRED_PREVIEW_SIZE_FOR_VIDEO, &defaults.preferred_size);
        self.set_if_absent(
            KEY_SUPPORTED_PREVIEW_FRAME_RATES,
            &defaults.preview_frame_rates,
        );
        self.set_if_absent(KEY_PREVIEW_FRAME_RATE, &defaults.preferred_frame_rate);
    }
}

impl fmt::Display for CameraParameters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.flatten())
    }
}

/// Parses `"<width>x<height>"`.
pub fn parse_size(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.split_once('x')?;
    let w = w.trim().parse().ok()?;
    let h = h.trim().parse().ok()?;
    Some((w, h))
}

/// Values filled in by [`CameraParameters::apply_fixups`] when the engine
/// does not report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterDefaults {
    pub preview_sizes: String,
    pub video_sizes: String,
    pub preferred_size: String,
    pub preview_frame_rates: String,
    pub preferred_frame_rate: String,
}

impl Default for ParameterDefaults {
    fn default() -> Self {
        Self {
            preview_sizes: "640x480,576x432,480x320,384x288,352x288,320x240,240x160,176x144"
                .to_string(),
            video_sizes: "640x480,352x288,320x240,176x144".to_string(),
            preferred_size: "640x480".to_string(),
            preview_frame_rates: "30,27,24,15".to_string(),
            preferred_frame_rate: "15".to_string(),
        }
    }
}
