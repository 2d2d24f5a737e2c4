// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! The vendor capture engine as seen by the HAL.
//!
//! The engine is an opaque collaborator: the HAL forwards control calls to
//! it and receives frames back through a [`FrameSink`]. Nothing here knows
//! how the engine drives the sensor.

use crate::{callbacks::UserContext, error::Result, msg::MsgType, params::CameraParameters};
use serde::{Deserialize, Serialize};
use std::{os::fd::RawFd, sync::Arc};

/// A frame owned by the vendor engine (an `IMemory` slice of one of its
/// heaps).
pub trait EngineFrame: Send + Sync {
    /// File descriptor identifying the heap, used as the blit memory id.
    fn heap_fd(&self) -> RawFd;

    /// Byte offset of the frame within its heap.
    fn offset(&self) -> usize;

    /// The frame bytes.
    fn bytes(&self) -> &[u8];

    fn len(&self) -> usize {
        self.bytes().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub type FrameRef = Arc<dyn EngineFrame>;

/// Entry points the engine calls, from threads it owns, when it has
/// something to deliver.
pub trait FrameSink: Send + Sync {
    fn on_notify(&self, msg: MsgType, ext1: i32, ext2: i32, user: UserContext);

    fn on_data(&self, msg: MsgType, frame: &FrameRef, user: UserContext);

    fn on_data_timestamp(&self, timestamp: i64, msg: MsgType, frame: &FrameRef, user: UserContext);
}

/// An opened vendor camera.
pub trait CaptureEngine: Send + Sync {
    fn set_callbacks(&self, sink: Arc<dyn FrameSink>, user: UserContext);

    fn enable_msg_type(&self, msg: MsgType);
    fn disable_msg_type(&self, msg: MsgType);
    fn msg_type_enabled(&self, msg: MsgType) -> bool;

    fn start_preview(&self) -> Result<()>;
    fn stop_preview(&self);
    fn preview_enabled(&self) -> bool;

    fn start_recording(&self) -> Result<()>;
    fn stop_recording(&self);
    fn recording_enabled(&self) -> bool;

    /// Tells the engine a frame delivered through
    /// [`FrameSink::on_data_timestamp`] may be reused.
    fn release_recording_frame(&self, frame: &FrameRef);

    fn auto_focus(&self) -> Result<()>;
    fn cancel_auto_focus(&self) -> Result<()>;
    fn take_picture(&self) -> Result<()>;
    fn cancel_picture(&self) -> Result<()>;

    fn parameters(&self) -> CameraParameters;
    fn set_parameters(&self, params: &CameraParameters) -> Result<()>;

    fn send_command(&self, cmd: i32, arg0: i32, arg1: i32) -> Result<()>;
    fn dump(&self, fd: RawFd) -> Result<()>;
    fn release(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    #[default]
    Back,
    Front,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraInfo {
    pub facing: Facing,
    /// Clockwise rotation of the sensor image relative to the display, in
    /// degrees.
    pub orientation: i32,
}

/// The vendor library's module-level entry points.
pub trait EngineProvider: Send + Sync {
    fn number_of_cameras(&self) -> i32;

    fn camera_info(&self, id: i32) -> CameraInfo;

    fn open(&self, id: i32, mode: i32) -> Option<Arc<dyn CaptureEngine>>;
}
