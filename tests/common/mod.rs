// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

#![allow(dead_code)]

use msm_camera_hal::{
    blit::{BlitRequest, Blitter},
    callbacks::{RequestMemory, UserContext},
    convert::InplaceConvert,
    engine::{CameraInfo, CaptureEngine, EngineFrame, EngineProvider, FrameRef, FrameSink},
    error::{HalError, Result},
    memory::ClientMemory,
    msg::MsgType,
    params::CameraParameters,
    window::{PreviewWindow, WindowBuffer},
};
use parking_lot::Mutex;
use std::{
    os::fd::RawFd,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

pub struct TestMemory {
    data: Vec<u8>,
    releases: Arc<AtomicUsize>,
}

impl ClientMemory for TestMemory {
    fn as_slice(&self) -> &[u8] {
        &self.data
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Client allocator that counts what it hands out and gets back.
#[derive(Default)]
pub struct TestAllocator {
    pub allocations: AtomicUsize,
    pub releases: Arc<AtomicUsize>,
    pub refuse: AtomicBool,
    /// Hand out one byte less than asked for.
    pub short: AtomicBool,
}

impl TestAllocator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn request_memory(self: &Arc<Self>) -> RequestMemory {
        let alloc = self.clone();
        Arc::new(move |fd: i32, size: usize, count: u32, _user: UserContext| {
            assert_eq!(fd, -1);
            assert_eq!(count, 1);
            if alloc.refuse.load(Ordering::SeqCst) {
                return None;
            }
            alloc.allocations.fetch_add(1, Ordering::SeqCst);
            let size = if alloc.short.load(Ordering::SeqCst) {
                size.saturating_sub(1)
            } else {
                size
            };
            Some(Box::new(TestMemory {
                data: vec![0; size],
                releases: alloc.releases.clone(),
            }) as Box<dyn ClientMemory>)
        })
    }

    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

pub struct TestFrame {
    pub fd: RawFd,
    pub offset: usize,
    pub data: Vec<u8>,
}

impl EngineFrame for TestFrame {
    fn heap_fd(&self) -> RawFd {
        self.fd
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn bytes(&self) -> &[u8] {
        &self.data
    }
}

pub fn frame(fill: u8, len: usize) -> FrameRef {
    Arc::new(TestFrame {
        fd: 42,
        offset: 0x2000,
        data: vec![fill; len],
    })
}

pub struct MockEngine {
    pub sink: Mutex<Option<Arc<dyn FrameSink>>>,
    pub user: Mutex<UserContext>,
    pub enabled: Mutex<MsgType>,
    pub params: Mutex<CameraParameters>,
    pub applied_params: Mutex<Option<CameraParameters>>,
    pub recording_frames_released: AtomicUsize,
    pub calls: Mutex<Vec<&'static str>>,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sink: Mutex::new(None),
            user: Mutex::new(UserContext::default()),
            enabled: Mutex::new(MsgType::default()),
            params: Mutex::new(CameraParameters::unflatten("preview-size=320x240")),
            applied_params: Mutex::new(None),
            recording_frames_released: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn sink(&self) -> Arc<dyn FrameSink> {
        match self.sink.lock().clone() {
            Some(sink) => sink,
            None => panic!("set_callbacks was never called"),
        }
    }

    pub fn enabled(&self) -> MsgType {
        *self.enabled.lock()
    }

    pub fn recording_frames_released(&self) -> usize {
        self.recording_frames_released.load(Ordering::SeqCst)
    }
}

impl CaptureEngine for MockEngine {
    fn set_callbacks(&self, sink: Arc<dyn FrameSink>, user: UserContext) {
        *self.sink.lock() = Some(sink);
        *self.user.lock() = user;
    }

    fn enable_msg_type(&self, msg: MsgType) {
        *self.enabled.lock() |= msg;
    }

    fn disable_msg_type(&self, msg: MsgType) {
        let mut enabled = self.enabled.lock();
        *enabled = MsgType(enabled.bits() & !msg.bits());
    }

    fn msg_type_enabled(&self, msg: MsgType) -> bool {
        self.enabled.lock().intersects(msg)
    }

    fn start_preview(&self) -> Result<()> {
        self.record("start_preview");
        Ok(())
    }

    fn stop_preview(&self) {
        self.record("stop_preview");
    }

    fn preview_enabled(&self) -> bool {
        self.calls.lock().contains(&"start_preview")
    }

    fn start_recording(&self) -> Result<()> {
        self.record("start_recording");
        Ok(())
    }

    fn stop_recording(&self) {
        self.record("stop_recording");
    }

    fn recording_enabled(&self) -> bool {
        false
    }

    fn release_recording_frame(&self, _frame: &FrameRef) {
        self.recording_frames_released.fetch_add(1, Ordering::SeqCst);
    }

    fn auto_focus(&self) -> Result<()> {
        self.record("auto_focus");
        Ok(())
    }

    fn cancel_auto_focus(&self) -> Result<()> {
        self.record("cancel_auto_focus");
        Ok(())
    }

    fn take_picture(&self) -> Result<()> {
        self.record("take_picture");
        Ok(())
    }

    fn cancel_picture(&self) -> Result<()> {
        self.record("cancel_picture");
        Ok(())
    }

    fn parameters(&self) -> CameraParameters {
        self.params.lock().clone()
    }

    fn set_parameters(&self, params: &CameraParameters) -> Result<()> {
        *self.applied_params.lock() = Some(params.clone());
        Ok(())
    }

    fn send_command(&self, cmd: i32, _arg0: i32, _arg1: i32) -> Result<()> {
        if cmd < 0 {
            return Err(HalError::Status(-libc::EINVAL));
        }
        self.record("send_command");
        Ok(())
    }

    fn dump(&self, _fd: RawFd) -> Result<()> {
        self.record("dump");
        Ok(())
    }

    fn release(&self) {
        self.record("release");
    }
}

#[derive(Default)]
pub struct MockProvider {
    pub engine: Mutex<Option<Arc<MockEngine>>>,
    pub last_open: Mutex<Option<(i32, i32)>>,
}

impl MockProvider {
    pub fn engine(&self) -> Arc<MockEngine> {
        match self.engine.lock().clone() {
            Some(engine) => engine,
            None => panic!("no camera opened"),
        }
    }
}

impl EngineProvider for MockProvider {
    fn number_of_cameras(&self) -> i32 {
        1
    }

    fn camera_info(&self, _id: i32) -> CameraInfo {
        CameraInfo::default()
    }

    fn open(&self, id: i32, mode: i32) -> Option<Arc<dyn CaptureEngine>> {
        *self.last_open.lock() = Some((id, mode));
        if id != 0 {
            return None;
        }
        let engine = MockEngine::new();
        *self.engine.lock() = Some(engine.clone());
        Some(engine)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Usage(u32),
    Geometry(u32, u32, i32),
    Dequeue(usize),
    Lock(usize),
    Enqueue(usize),
    Cancel(usize),
}

#[derive(Default)]
pub struct MockWindow {
    pub events: Mutex<Vec<WindowEvent>>,
    pub fail_geometry: AtomicBool,
    pub fail_dequeue: AtomicBool,
    pub fail_lock: AtomicBool,
    next: AtomicUsize,
}

impl MockWindow {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<WindowEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&WindowEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }

    pub fn enqueues(&self) -> usize {
        self.count(|e| matches!(e, WindowEvent::Enqueue(_)))
    }

    pub fn cancels(&self) -> usize {
        self.count(|e| matches!(e, WindowEvent::Cancel(_)))
    }

    pub fn dequeues(&self) -> usize {
        self.count(|e| matches!(e, WindowEvent::Dequeue(_)))
    }
}

impl PreviewWindow for MockWindow {
    fn set_usage(&self, usage: u32) -> Result<()> {
        self.events.lock().push(WindowEvent::Usage(usage));
        Ok(())
    }

    fn set_buffers_geometry(&self, width: u32, height: u32, format: i32) -> Result<()> {
        self.events
            .lock()
            .push(WindowEvent::Geometry(width, height, format));
        if self.fail_geometry.load(Ordering::SeqCst) {
            return Err(HalError::Status(-libc::EINVAL));
        }
        Ok(())
    }

    fn dequeue_buffer(&self) -> Result<WindowBuffer> {
        if self.fail_dequeue.load(Ordering::SeqCst) {
            return Err(HalError::Status(-libc::EBUSY));
        }
        let handle = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        self.events.lock().push(WindowEvent::Dequeue(handle));
        Ok(WindowBuffer {
            handle,
            fd: 100 + handle as RawFd,
            offset: 0x1000 * handle,
            stride: 320,
        })
    }

    fn lock_buffer(&self, buffer: &WindowBuffer) -> Result<()> {
        self.events.lock().push(WindowEvent::Lock(buffer.handle));
        if self.fail_lock.load(Ordering::SeqCst) {
            return Err(HalError::Status(-libc::EIO));
        }
        Ok(())
    }

    fn enqueue_buffer(&self, buffer: WindowBuffer) -> Result<()> {
        self.events.lock().push(WindowEvent::Enqueue(buffer.handle));
        Ok(())
    }

    fn cancel_buffer(&self, buffer: WindowBuffer) -> Result<()> {
        self.events.lock().push(WindowEvent::Cancel(buffer.handle));
        Ok(())
    }
}

#[derive(Default)]
pub struct MockBlitter {
    pub requests: Mutex<Vec<BlitRequest>>,
    pub fail: AtomicBool,
}

impl MockBlitter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<BlitRequest> {
        self.requests.lock().clone()
    }
}

impl Blitter for MockBlitter {
    fn blit(&self, req: &BlitRequest) -> Result<()> {
        self.requests.lock().push(*req);
        if self.fail.load(Ordering::SeqCst) {
            return Err(HalError::Ioctl(nix::errno::Errno::EINVAL));
        }
        Ok(())
    }
}

/// Converter that stamps every byte of the frame it is given.
#[derive(Default)]
pub struct MockConverter {
    pub calls: Mutex<Vec<(u32, u32)>>,
    pub fail: AtomicBool,
}

pub const CONVERTED: u8 = 0xee;

impl MockConverter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<(u32, u32)> {
        self.calls.lock().clone()
    }
}

impl InplaceConvert for MockConverter {
    fn convert(&self, data: &mut [u8], width: u32, height: u32) -> Result<()> {
        self.calls.lock().push((width, height));
        if self.fail.load(Ordering::SeqCst) {
            return Err(HalError::Status(-libc::EIO));
        }
        data.fill(CONVERTED);
        Ok(())
    }
}
