// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Optional software conversion supplied by the vendor camera library.
//!
//! Not used unless configured: preview conversion always goes through the
//! hardware blitter. When enabled, recording frames are converted from
//! YCrCb 4:2:0 semi-planar to YV12 in place, on the client's copy.

use crate::error::{HalError, Result};
use libloading::{Library, Symbol};
use serde::{Deserialize, Serialize};
use std::{ffi::c_int, fmt};
use tracing::{debug, trace};

/// Converts a frame buffer in place.
pub trait InplaceConvert: Send + Sync {
    fn convert(&self, data: &mut [u8], width: u32, height: u32) -> Result<()>;
}

/// Where to find the vendor conversion routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftwareConvert {
    pub library: String,
    pub symbol: String,
}

impl Default for SoftwareConvert {
    fn default() -> Self {
        Self {
            library: "liboemcamera.so".to_string(),
            symbol: "yuv_convert_ycrcb420sp_to_yv12".to_string(),
        }
    }
}

#[repr(C)]
struct YuvImage {
    dx: u32,
    dy: u32,
    img_ptr: *mut u8,
}

type YuvConvertFn = unsafe extern "C" fn(*mut YuvImage) -> c_int;

/// The vendor's `yuv_convert_ycrcb420sp_to_yv12`, resolved at runtime.
pub struct OemConverter {
    func: YuvConvertFn,
    // Keeps `func` mapped; must outlive it.
    _lib: Library,
}

impl OemConverter {
    pub fn load(config: &SoftwareConvert) -> Result<Self> {
        // SAFETY: loading the vendor camera library runs its initialisers,
        // which is what the camera service already expects of it.
        let lib = unsafe { Library::new(&config.library) }?;
        let func = unsafe {
            let symbol: Symbol<YuvConvertFn> = lib.get(config.symbol.as_bytes())?;
            *symbol
        };
        debug!("resolved {} from {}", config.symbol, config.library);
        Ok(Self { func, _lib: lib })
    }
}

impl InplaceConvert for OemConverter {
    fn convert(&self, data: &mut [u8], width: u32, height: u32) -> Result<()> {
        let needed = width as usize * height as usize * 3 / 2;
        if data.len() < needed {
            return Err(HalError::InvalidArgument(format!(
                "{width}x{height} frame needs {needed} bytes, buffer has {}",
                data.len()
            )));
        }

        let mut image = YuvImage {
            dx: width,
            dy: height,
            img_ptr: data.as_mut_ptr(),
        };
        // SAFETY: the buffer holds a full 4:2:0 frame of the given size and
        // is exclusively borrowed for the duration of the call.
        let ret = unsafe { (self.func)(&mut image) };
        trace!("yuv conversion {width}x{height} returned {ret}");
        if ret != 0 {
            return Err(HalError::Status(ret));
        }
        Ok(())
    }
}

impl fmt::Debug for OemConverter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("OemConverter").finish_non_exhaustive()
    }
}
