// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Hardware color-convert-and-copy through the MDP blitter.

use crate::error::Result;
use mdp_sys::{
    mdp_blit_req, mdp_blit_req_list, mdp_img, mdp_rect, msmfb_blit, MDP_ALPHA_NOP,
    MDP_BGRA_8888, MDP_TRANSP_NOP, MDP_Y_CBCR_H2V2,
};
use std::{
    fmt,
    fs::OpenOptions,
    io,
    os::fd::{AsRawFd, RawFd},
    path::{Path, PathBuf},
};
use tracing::{debug, trace};

/// Default framebuffer node exposing the MDP blit ioctl.
pub const FB_DEVICE: &str = "/dev/graphics/fb0";

/// Pixel formats the blitter is asked to read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// YCbCr 4:2:0 semi-planar, the engine's preview output
    YCbCr420SemiPlanar,
    /// Window buffer layout
    Bgra8888,
}

impl PixelFormat {
    pub fn mdp_format(self) -> u32 {
        match self {
            PixelFormat::YCbCr420SemiPlanar => MDP_Y_CBCR_H2V2,
            PixelFormat::Bgra8888 => MDP_BGRA_8888,
        }
    }
}

/// Rectangle in pixels, shared by source and destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn with_size(width: u32, height: u32) -> Self {
        Rect {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

impl From<Rect> for mdp_rect {
    fn from(r: Rect) -> Self {
        mdp_rect {
            x: r.x,
            y: r.y,
            w: r.width,
            h: r.height,
        }
    }
}

/// One side of a blit: which memory, where in it, and how it is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitSurface {
    pub memory_id: RawFd,
    pub offset: usize,
    pub format: PixelFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitRequest {
    pub src: BlitSurface,
    pub dst: BlitSurface,
    pub rect: Rect,
}

impl BlitRequest {
    fn image(&self, surface: &BlitSurface) -> io::Result<mdp_img> {
        let offset = u32::try_from(surface.offset).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("offset {:#x} does not fit the blit descriptor", surface.offset),
            )
        })?;
        Ok(mdp_img {
            width: self.rect.width,
            height: self.rect.height,
            format: surface.format.mdp_format(),
            offset,
            memory_id: surface.memory_id,
            priv_: 0,
        })
    }

    /// The single-request descriptor list submitted with `MSMFB_BLIT`.
    pub fn descriptor(&self) -> io::Result<mdp_blit_req_list> {
        Ok(mdp_blit_req_list {
            count: 1,
            req: mdp_blit_req {
                src: self.image(&self.src)?,
                dst: self.image(&self.dst)?,
                src_rect: self.rect.into(),
                dst_rect: self.rect.into(),
                alpha: MDP_ALPHA_NOP,
                transp_mask: MDP_TRANSP_NOP,
                flags: 0,
                sharpening_strength: 0,
            },
        })
    }
}

impl fmt::Display for BlitRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "src fd:{} offset:{:#x} {:?} -> dst fd:{} offset:{:#x} {:?} rect:{}x{}+{}+{}",
            self.src.memory_id,
            self.src.offset,
            self.src.format,
            self.dst.memory_id,
            self.dst.offset,
            self.dst.format,
            self.rect.width,
            self.rect.height,
            self.rect.x,
            self.rect.y,
        )
    }
}

/// A hardware data-move that converts and copies in one operation.
pub trait Blitter: Send + Sync {
    fn blit(&self, req: &BlitRequest) -> Result<()>;
}

/// Blits through the MSM framebuffer driver.
///
/// The device is opened and closed around every request; no handle is kept
/// between frames.
#[derive(Debug, Clone)]
pub struct MdpBlitter {
    device: PathBuf,
}

impl MdpBlitter {
    pub fn new(device: impl AsRef<Path>) -> Self {
        Self {
            device: device.as_ref().to_path_buf(),
        }
    }

    pub fn device(&self) -> &Path {
        &self.device
    }
}

impl Default for MdpBlitter {
    fn default() -> Self {
        Self::new(FB_DEVICE)
    }
}

impl Blitter for MdpBlitter {
    fn blit(&self, req: &BlitRequest) -> Result<()> {
        let list = req.descriptor()?;
        let fb = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.device)
            .map_err(|e| {
                debug!("error opening {}: {e}", self.device.display());
                e
            })?;

        trace!("MSMFB_BLIT {req}");
        // SAFETY: `list` is a fully initialised mdp_blit_req_list with
        // count 1, matching the single inline request, and lives across the
        // call. The fd is open for the duration of the ioctl.
        unsafe { msmfb_blit(fb.as_raw_fd(), &list) }.map_err(|e| {
            debug!("MSMFB_BLIT failed: {e}");
            e
        })?;
        Ok(())
    }
}
