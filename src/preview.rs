// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Preview frames to the display.
//!
//! Each preview frame is converted and copied by the blitter straight into
//! a buffer borrowed from the client's preview window. A frame either
//! reaches the display queue whole or not at all; a failed blit still
//! queues the buffer so the display never stalls waiting for it.

use crate::{
    blit::{BlitRequest, BlitSurface, Blitter, PixelFormat, Rect},
    engine::EngineFrame,
    window::{
        DequeuedBuffer, PreviewWindow, GRALLOC_USAGE_PRIVATE_0, GRALLOC_USAGE_SW_READ_OFTEN,
        HAL_PIXEL_FORMAT_RGBX_8888,
    },
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, trace, warn};

/// Engine preview output format.
pub const PREVIEW_SOURCE_FORMAT: PixelFormat = PixelFormat::YCbCr420SemiPlanar;
/// Format written into window buffers.
pub const PREVIEW_TARGET_FORMAT: PixelFormat = PixelFormat::Bgra8888;

/// Where a frame stopped when it did not reach the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropStage {
    Geometry,
    Dequeue,
    Lock,
    Enqueue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// No window bound; nothing to do.
    NoWindow,
    /// The engine reported no usable preview size.
    InvalidSize,
    Dropped(DropStage),
    Presented,
    /// Queued for display although the blit failed.
    PresentedStale,
}

pub struct PreviewPipeline {
    window: Mutex<Option<Arc<dyn PreviewWindow>>>,
    blitter: Arc<dyn Blitter>,
}

impl PreviewPipeline {
    pub fn new(blitter: Arc<dyn Blitter>) -> Self {
        Self {
            window: Mutex::new(None),
            blitter,
        }
    }

    /// Binds the preview window, replacing any previous one. `None`
    /// unbinds.
    pub fn set_window(&self, window: Option<Arc<dyn PreviewWindow>>) {
        *self.window.lock() = window;
    }

    pub fn has_window(&self) -> bool {
        self.window.lock().is_some()
    }

    pub fn render(&self, frame: &dyn EngineFrame, width: u32, height: u32) -> PreviewOutcome {
        // Clone out of the slot so a concurrent set_window never waits on a
        // frame in flight.
        let window = match self.window.lock().clone() {
            Some(window) => window,
            None => return PreviewOutcome::NoWindow,
        };
        if width == 0 || height == 0 {
            warn!("preview size {width}x{height} is not usable, dropping frame");
            return PreviewOutcome::InvalidSize;
        }
        trace!(
            "preview {width}x{height} heap_fd:{} offset:{:#x} size:{:#x}",
            frame.heap_fd(),
            frame.offset(),
            frame.len()
        );

        if let Err(e) = window.set_usage(GRALLOC_USAGE_PRIVATE_0 | GRALLOC_USAGE_SW_READ_OFTEN) {
            warn!("set_usage failed: {e}");
        }
        if let Err(e) = window.set_buffers_geometry(width, height, HAL_PIXEL_FORMAT_RGBX_8888) {
            error!("set_buffers_geometry {width}x{height} failed: {e}");
            return PreviewOutcome::Dropped(DropStage::Geometry);
        }

        let dequeued = match DequeuedBuffer::dequeue(window.as_ref()) {
            Ok(buf) => buf,
            Err(e) => {
                error!("error dequeueing the buffer: {e}");
                return PreviewOutcome::Dropped(DropStage::Dequeue);
            }
        };

        if let Err(e) = dequeued.lock() {
            error!("error locking the buffer: {e}");
            if let Err(e) = dequeued.cancel() {
                warn!("cancel_buffer failed: {e}");
            }
            return PreviewOutcome::Dropped(DropStage::Lock);
        }

        let target = dequeued.buffer();
        let req = BlitRequest {
            src: BlitSurface {
                memory_id: frame.heap_fd(),
                offset: frame.offset(),
                format: PREVIEW_SOURCE_FORMAT,
            },
            dst: BlitSurface {
                memory_id: target.fd,
                offset: target.offset,
                format: PREVIEW_TARGET_FORMAT,
            },
            rect: Rect::with_size(width, height),
        };
        let blitted = match self.blitter.blit(&req) {
            Ok(()) => true,
            Err(e) => {
                warn!("blit failed, presenting stale buffer: {e}");
                false
            }
        };

        if let Err(e) = dequeued.enqueue() {
            error!("error enqueueing the buffer: {e}");
            return PreviewOutcome::Dropped(DropStage::Enqueue);
        }
        trace!("enqueued preview buffer");

        if blitted {
            PreviewOutcome::Presented
        } else {
            PreviewOutcome::PresentedStale
        }
    }
}
