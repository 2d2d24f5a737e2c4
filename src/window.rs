// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::error::Result;
use std::os::fd::RawFd;
use tracing::{trace, warn};

pub const GRALLOC_USAGE_SW_READ_OFTEN: u32 = 0x0000_0003;
pub const GRALLOC_USAGE_PRIVATE_0: u32 = 0x1000_0000;

pub const HAL_PIXEL_FORMAT_RGBX_8888: i32 = 2;

/// A display buffer handed out by [`PreviewWindow::dequeue_buffer`].
///
/// Deliberately not `Clone`: a buffer goes back to the window exactly once,
/// by value, through enqueue or cancel.
#[derive(Debug, PartialEq, Eq)]
pub struct WindowBuffer {
    /// Opaque `buffer_handle_t` identity.
    pub handle: usize,
    /// gralloc backing fd and offset, the blit destination.
    pub fd: RawFd,
    pub offset: usize,
    pub stride: i32,
}

/// The display surface the client binds with `set_preview_window`
/// (`preview_stream_ops`).
pub trait PreviewWindow: Send + Sync {
    fn set_usage(&self, usage: u32) -> Result<()>;

    fn set_buffers_geometry(&self, width: u32, height: u32, format: i32) -> Result<()>;

    fn dequeue_buffer(&self) -> Result<WindowBuffer>;

    fn lock_buffer(&self, buffer: &WindowBuffer) -> Result<()>;

    fn enqueue_buffer(&self, buffer: WindowBuffer) -> Result<()>;

    fn cancel_buffer(&self, buffer: WindowBuffer) -> Result<()>;
}

/// A dequeued buffer on its way back to the window.
///
/// Dropping the guard without calling [`enqueue`](Self::enqueue) cancels
/// the buffer, so no exit path can strand it.
pub struct DequeuedBuffer<'a> {
    window: &'a dyn PreviewWindow,
    buffer: Option<WindowBuffer>,
}

impl<'a> DequeuedBuffer<'a> {
    pub fn dequeue(window: &'a dyn PreviewWindow) -> Result<Self> {
        let buffer = window.dequeue_buffer()?;
        trace!("dequeued buffer {:#x} stride:{}", buffer.handle, buffer.stride);
        Ok(Self {
            window,
            buffer: Some(buffer),
        })
    }

    pub fn buffer(&self) -> &WindowBuffer {
        // The Option is only emptied by the consuming methods and Drop.
        self.buffer
            .as_ref()
            .unwrap_or_else(|| unreachable!("dequeued buffer already returned"))
    }

    pub fn lock(&self) -> Result<()> {
        self.window.lock_buffer(self.buffer())
    }

    pub fn enqueue(mut self) -> Result<()> {
        match self.buffer.take() {
            Some(buffer) => self.window.enqueue_buffer(buffer),
            None => Ok(()),
        }
    }

    pub fn cancel(mut self) -> Result<()> {
        match self.buffer.take() {
            Some(buffer) => self.window.cancel_buffer(buffer),
            None => Ok(()),
        }
    }
}

impl Drop for DequeuedBuffer<'_> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            warn!("buffer {:#x} not returned, canceling", buffer.handle);
            if let Err(e) = self.window.cancel_buffer(buffer) {
                warn!("cancel_buffer failed: {e}");
            }
        }
    }
}
