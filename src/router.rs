// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Fan-out of engine deliveries to the client and the display.
//!
//! The engine is given a [`FrameRouter`] in place of the client's
//! callbacks. Deliveries arrive on engine threads; the router takes a
//! snapshot of the callback table for each one and never calls into client
//! code with a lock held, so a client may release frames or re-register
//! from inside its own callbacks.
//!
//! Two ownership contracts meet here:
//!
//! - Frames on the untimestamped path (preview, postview, pictures) are
//!   copied into a client block that is released as soon as the data
//!   callback returns. The callback must finish with the block before
//!   returning; debug builds assert that it kept no reference.
//! - Frames on the timestamped path (recording) are copied into a client
//!   block tracked by the [`FrameRegistry`] until the client returns it.

use crate::{
    callbacks::{CallbackTable, UserContext},
    convert::InplaceConvert,
    engine::{CaptureEngine, FrameRef, FrameSink},
    msg::MsgType,
    preview::{PreviewOutcome, PreviewPipeline},
    registry::{materialize, FrameRegistry},
};
use parking_lot::RwLock;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Weak,
};
use tracing::{debug, trace, warn};

pub struct FrameRouter {
    callbacks: RwLock<CallbackTable>,
    external_preview: AtomicBool,
    registry: FrameRegistry,
    preview: PreviewPipeline,
    converter: Option<Arc<dyn InplaceConvert>>,
    engine: Weak<dyn CaptureEngine>,
}

impl FrameRouter {
    pub fn new(
        engine: Weak<dyn CaptureEngine>,
        preview: PreviewPipeline,
        converter: Option<Arc<dyn InplaceConvert>>,
    ) -> Self {
        Self {
            callbacks: RwLock::new(CallbackTable::default()),
            external_preview: AtomicBool::new(false),
            registry: FrameRegistry::new(),
            preview,
            converter,
            engine,
        }
    }

    pub fn set_callbacks(&self, table: CallbackTable) {
        debug!("client callbacks: {table:?}");
        *self.callbacks.write() = table;
    }

    pub fn callbacks(&self) -> CallbackTable {
        self.callbacks.read().clone()
    }

    /// Whether the client itself asked for preview frames, as opposed to the
    /// HAL enabling them only to feed the display.
    pub fn external_preview(&self) -> bool {
        self.external_preview.load(Ordering::Acquire)
    }

    pub fn set_external_preview(&self, enabled: bool) {
        self.external_preview.store(enabled, Ordering::Release);
    }

    pub fn registry(&self) -> &FrameRegistry {
        &self.registry
    }

    pub fn preview(&self) -> &PreviewPipeline {
        &self.preview
    }

    fn render_preview(&self, frame: &FrameRef) -> PreviewOutcome {
        let Some(engine) = self.engine.upgrade() else {
            return PreviewOutcome::NoWindow;
        };
        if !self.preview.has_window() {
            return PreviewOutcome::NoWindow;
        }
        match engine.parameters().preview_size() {
            Some((width, height)) => self.preview.render(frame.as_ref(), width, height),
            None => {
                warn!("engine reports no preview size, dropping preview frame");
                PreviewOutcome::InvalidSize
            }
        }
    }

    /// Size used for in-place conversion of recording frames.
    fn video_size(&self) -> Option<(u32, u32)> {
        let params = self.engine.upgrade()?.parameters();
        params.video_size().or_else(|| params.preview_size())
    }
}

impl FrameSink for FrameRouter {
    fn on_notify(&self, msg: MsgType, ext1: i32, ext2: i32, user: UserContext) {
        trace!("notify msg:{msg} ext1:{ext1} ext2:{ext2} user:{user:?}");
        let notify = self.callbacks.read().notify.clone();
        if let Some(notify) = notify {
            notify(msg, ext1, ext2, user);
        }
    }

    fn on_data(&self, msg: MsgType, frame: &FrameRef, user: UserContext) {
        trace!("data msg:{msg} user:{user:?}");
        let table = self.callbacks();

        if msg != MsgType::PREVIEW_FRAME || self.external_preview() {
            if let (Some(data), Some(request_memory)) = (&table.data, &table.request_memory) {
                if let Some(block) = materialize(frame.as_ref(), request_memory, user) {
                    let block = Arc::new(block);
                    trace!("posting {msg} data to client");
                    data(msg, &block, 0, user);
                    debug_assert_eq!(
                        Arc::strong_count(&block),
                        1,
                        "data callback kept a {msg} block past its return"
                    );
                    block.release();
                }
            }
        }

        if msg == MsgType::PREVIEW_FRAME {
            let outcome = self.render_preview(frame);
            trace!("preview outcome {outcome:?}");
        }
    }

    fn on_data_timestamp(&self, timestamp: i64, msg: MsgType, frame: &FrameRef, user: UserContext) {
        trace!("data timestamp:{timestamp} msg:{msg} user:{user:?}");
        let table = self.callbacks();
        let (Some(data_timestamp), Some(request_memory)) =
            (&table.data_timestamp, &table.request_memory)
        else {
            return;
        };

        let engine = self.engine.upgrade();
        let Some(mut block) = materialize(frame.as_ref(), request_memory, user) else {
            warn!("dropping {msg} frame at {timestamp}: no client memory");
            if let Some(engine) = engine {
                engine.release_recording_frame(frame);
            }
            return;
        };

        if let Some(converter) = &self.converter {
            match self.video_size() {
                Some((width, height)) => {
                    if let Err(e) = converter.convert(block.data_mut(), width, height) {
                        warn!("software conversion failed: {e}");
                    }
                }
                None => warn!("no video size for software conversion"),
            }
        }

        let block = Arc::new(block);
        self.registry.append(block.clone());
        trace!("posting {msg} data to client timestamp:{timestamp}");
        data_timestamp(timestamp, msg, &block, 0, user);

        if let Some(engine) = engine {
            engine.release_recording_frame(frame);
        }
    }
}
