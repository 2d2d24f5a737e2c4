// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! The module and device entry points the camera service calls.
//!
//! Everything here is pass-through to the engine apart from the
//! bookkeeping kept in [`Session`]. Return values follow the plugin
//! convention: `0` on success, a negative errno otherwise. A device that
//! has been closed answers every call with `-EINVAL`. Metadata-in-buffers
//! recording is not supported and reports `-ENOSYS`.

use crate::{
    blit::{Blitter, MdpBlitter},
    callbacks::CallbackTable,
    config::HalConfig,
    convert::{InplaceConvert, OemConverter},
    engine::{CameraInfo, EngineProvider},
    error::{to_status, HalError, Result},
    logging,
    memory::MemoryKey,
    msg::MsgType,
    params::CameraParameters,
    session::Session,
    window::PreviewWindow,
};
use parking_lot::Mutex;
use std::{os::fd::RawFd, sync::Arc};
use tracing::{debug, error, info, trace};

pub struct CameraModule {
    provider: Arc<dyn EngineProvider>,
    config: HalConfig,
}

impl CameraModule {
    pub fn new(provider: Arc<dyn EngineProvider>, config: HalConfig) -> Self {
        logging::init(&config.log_filter);
        Self { provider, config }
    }

    pub fn config(&self) -> &HalConfig {
        &self.config
    }

    pub fn number_of_cameras(&self) -> i32 {
        self.provider.number_of_cameras()
    }

    /// Engine info with facing and orientation replaced by the configured
    /// values; the engine's own are not trustworthy on this hardware.
    pub fn camera_info(&self, id: i32) -> CameraInfo {
        let mut info = self.provider.camera_info(id);
        info.facing = self.config.facing;
        info.orientation = self.config.orientation;
        info
    }

    /// Opens the camera named by a decimal id, blitting previews through
    /// the configured framebuffer.
    pub fn open(&self, name: &str) -> Result<CameraDevice> {
        let blitter = Arc::new(MdpBlitter::new(&self.config.blit_device));
        self.open_with(name, blitter)
    }

    pub fn open_with(&self, name: &str, blitter: Arc<dyn Blitter>) -> Result<CameraDevice> {
        let id: i32 = name
            .trim()
            .parse()
            .map_err(|_| HalError::InvalidArgument(format!("camera name {name:?}")))?;
        info!("opening camera {id}");

        let engine = self
            .provider
            .open(id, self.config.open_mode)
            .ok_or(HalError::OpenFailed(id))?;

        let converter = self.config.software_convert.as_ref().and_then(|cfg| {
            match OemConverter::load(cfg) {
                Ok(converter) => Some(Arc::new(converter) as Arc<dyn InplaceConvert>),
                Err(e) => {
                    error!("could not load {} from {}: {e}", cfg.symbol, cfg.library);
                    None
                }
            }
        });

        Ok(CameraDevice::new(
            Session::new(engine, blitter, converter),
            self.config.clone(),
        ))
    }
}

pub struct CameraDevice {
    session: Mutex<Option<Arc<Session>>>,
    settings: Mutex<CameraParameters>,
    config: HalConfig,
}

impl CameraDevice {
    pub fn new(session: Session, config: HalConfig) -> Self {
        Self {
            session: Mutex::new(Some(Arc::new(session))),
            settings: Mutex::new(CameraParameters::new()),
            config,
        }
    }

    fn session(&self, op: &str) -> Result<Arc<Session>> {
        // Cloned out so engine calls, which may re-enter the device from
        // client callbacks, run without the slot locked.
        let session = self.session.lock().clone();
        session.ok_or_else(|| {
            error!("{op}: invalid device");
            HalError::DeviceClosed
        })
    }

    pub fn is_open(&self) -> bool {
        self.session.lock().is_some()
    }

    pub fn set_preview_window(&self, window: Option<Arc<dyn PreviewWindow>>) -> i32 {
        to_status(
            self.session("set_preview_window")
                .map(|s| s.set_preview_window(window)),
        )
    }

    pub fn set_callbacks(&self, table: CallbackTable) {
        if let Ok(s) = self.session("set_callbacks") {
            s.set_callbacks(table);
        }
    }

    pub fn enable_msg_type(&self, msg: MsgType) {
        trace!("enable_msg_type: {msg}");
        if let Ok(s) = self.session("enable_msg_type") {
            s.enable_msg_type(msg);
        }
    }

    pub fn disable_msg_type(&self, msg: MsgType) {
        if let Ok(s) = self.session("disable_msg_type") {
            s.disable_msg_type(msg);
        }
    }

    pub fn msg_type_enabled(&self, msg: MsgType) -> i32 {
        match self.session("msg_type_enabled") {
            Ok(s) => s.engine().msg_type_enabled(msg) as i32,
            Err(e) => e.status(),
        }
    }

    /// Preview frames are enabled on the engine for the display path only;
    /// the client does not receive them unless it asked for them itself.
    pub fn start_preview(&self) -> i32 {
        to_status(self.session("start_preview").and_then(|s| {
            s.engine().enable_msg_type(MsgType::PREVIEW_FRAME);
            s.engine().start_preview()
        }))
    }

    pub fn stop_preview(&self) {
        if let Ok(s) = self.session("stop_preview") {
            s.engine().disable_msg_type(MsgType::PREVIEW_FRAME);
            s.engine().stop_preview();
        }
    }

    pub fn preview_enabled(&self) -> i32 {
        match self.session("preview_enabled") {
            Ok(s) => s.engine().preview_enabled() as i32,
            Err(e) => e.status(),
        }
    }

    pub fn store_meta_data_in_buffers(&self, enable: bool) -> i32 {
        debug!("store_meta_data_in_buffers: {enable} not supported");
        to_status(
            self.session("store_meta_data_in_buffers")
                .and(Err(HalError::Unsupported)),
        )
    }

    pub fn start_recording(&self) -> i32 {
        to_status(self.session("start_recording").and_then(|s| {
            s.engine().enable_msg_type(MsgType::VIDEO_FRAME);
            s.engine().start_recording()
        }))
    }

    pub fn stop_recording(&self) {
        if let Ok(s) = self.session("stop_recording") {
            s.engine().disable_msg_type(MsgType::VIDEO_FRAME);
            s.engine().stop_recording();
        }
    }

    pub fn recording_enabled(&self) -> i32 {
        match self.session("recording_enabled") {
            Ok(s) => s.engine().recording_enabled() as i32,
            Err(e) => e.status(),
        }
    }

    /// `opaque` is the data address of a block delivered on the timestamped
    /// path; `None` is the null pointer and is ignored.
    pub fn release_recording_frame(&self, opaque: Option<MemoryKey>) {
        trace!("release_recording_frame: {opaque:?}");
        if let (Ok(s), Some(key)) = (self.session("release_recording_frame"), opaque) {
            s.release_recording_frame(key);
        }
    }

    pub fn auto_focus(&self) -> i32 {
        to_status(self.session("auto_focus").and_then(|s| s.engine().auto_focus()))
    }

    pub fn cancel_auto_focus(&self) -> i32 {
        to_status(
            self.session("cancel_auto_focus")
                .and_then(|s| s.engine().cancel_auto_focus()),
        )
    }

    pub fn take_picture(&self) -> i32 {
        to_status(self.session("take_picture").and_then(|s| {
            s.engine().enable_msg_type(MsgType::PICTURE);
            s.engine().take_picture()
        }))
    }

    pub fn cancel_picture(&self) -> i32 {
        to_status(
            self.session("cancel_picture")
                .and_then(|s| s.engine().cancel_picture()),
        )
    }

    pub fn set_parameters(&self, params: &str) -> i32 {
        debug!("set_parameters: {params}");
        to_status(self.session("set_parameters").and_then(|s| {
            let settings = {
                let mut settings = self.settings.lock();
                settings.replace_from(params);
                settings.clone()
            };
            s.engine().set_parameters(&settings)
        }))
    }

    /// The engine's settings with the device fixups applied, flattened.
    pub fn get_parameters(&self) -> Option<String> {
        let s = self.session("get_parameters").ok()?;
        let mut params = s.engine().parameters();
        params.apply_fixups(&self.config.defaults);
        let flat = params.flatten();
        *self.settings.lock() = params;
        trace!("get_parameters: {flat}");
        Some(flat)
    }

    /// Takes back a string returned by [`get_parameters`](Self::get_parameters).
    pub fn put_parameters(&self, params: String) {
        trace!("put_parameters: {} bytes", params.len());
        drop(params);
    }

    pub fn send_command(&self, cmd: i32, arg0: i32, arg1: i32) -> i32 {
        trace!("send_command: cmd:{cmd} arg0:{arg0} arg1:{arg1}");
        to_status(
            self.session("send_command")
                .and_then(|s| s.engine().send_command(cmd, arg0, arg1)),
        )
    }

    pub fn release(&self) {
        if let Ok(s) = self.session("release") {
            s.release();
        }
    }

    pub fn dump(&self, fd: RawFd) -> i32 {
        to_status(self.session("dump").and_then(|s| s.engine().dump(fd)))
    }

    /// Drops the session. Outstanding recording blocks still tracked are
    /// released with it. Closing twice reports `-EINVAL`.
    pub fn close(&self) -> i32 {
        match self.session.lock().take() {
            Some(session) => {
                session.router().registry().release_all();
                debug!("camera device closed");
                0
            }
            None => {
                error!("close: invalid device");
                -libc::EINVAL
            }
        }
    }
}
