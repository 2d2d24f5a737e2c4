// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    blit::Blitter,
    callbacks::CallbackTable,
    convert::InplaceConvert,
    engine::{CaptureEngine, FrameSink},
    memory::MemoryKey,
    msg::MsgType,
    preview::PreviewPipeline,
    router::FrameRouter,
    window::PreviewWindow,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything one open camera device owns: the engine handle, the client's
/// callbacks, the preview window and the outstanding recording blocks.
///
/// Created when the device is opened and dropped when it is closed.
pub struct Session {
    engine: Arc<dyn CaptureEngine>,
    router: Arc<FrameRouter>,
}

impl Session {
    pub fn new(
        engine: Arc<dyn CaptureEngine>,
        blitter: Arc<dyn Blitter>,
        converter: Option<Arc<dyn InplaceConvert>>,
    ) -> Self {
        let router = Arc::new(FrameRouter::new(
            Arc::downgrade(&engine),
            PreviewPipeline::new(blitter),
            converter,
        ));
        Self { engine, router }
    }

    pub fn engine(&self) -> &Arc<dyn CaptureEngine> {
        &self.engine
    }

    pub fn router(&self) -> &Arc<FrameRouter> {
        &self.router
    }

    /// Stores the client's callbacks and points the engine at the router.
    pub fn set_callbacks(&self, table: CallbackTable) {
        let user = table.user;
        self.router.set_callbacks(table);
        let sink: Arc<dyn FrameSink> = self.router.clone();
        self.engine.set_callbacks(sink, user);
    }

    pub fn set_preview_window(&self, window: Option<Arc<dyn PreviewWindow>>) {
        debug!("preview window bound: {}", window.is_some());
        self.router.preview().set_window(window);
    }

    pub fn enable_msg_type(&self, msg: MsgType) {
        if msg.intersects(MsgType::PREVIEW_FRAME) {
            self.router.set_external_preview(true);
        }
        self.engine.enable_msg_type(msg);
    }

    pub fn disable_msg_type(&self, msg: MsgType) {
        debug!("disable msg_type:{msg}");
        if msg.intersects(MsgType::PREVIEW_FRAME) {
            self.router.set_external_preview(false);
        }
        if msg.intersects(MsgType::VIDEO_FRAME) {
            let released = self.router.registry().release_all();
            if released > 0 {
                warn!("released {released} stale video frames");
            }
        }
        self.engine.disable_msg_type(msg);
    }

    /// Client hand-back of a recording frame. Returns whether the key
    /// matched an outstanding block.
    pub fn release_recording_frame(&self, key: MemoryKey) -> bool {
        self.router.registry().release_by_key(key)
    }

    /// Frees every outstanding block and releases the engine.
    pub fn release(&self) {
        self.router.registry().release_all();
        self.engine.release();
    }
}
