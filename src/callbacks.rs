// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    memory::{ClientMemory, FrameBlock},
    msg::MsgType,
};
use std::{ffi::c_void, fmt, sync::Arc};

/// Opaque client cookie passed back with every callback.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct UserContext(usize);

impl UserContext {
    pub fn from_ptr(ptr: *mut c_void) -> Self {
        UserContext(ptr as usize)
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.0 as *mut c_void
    }
}

impl fmt::Debug for UserContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "UserContext({:#x})", self.0)
    }
}

pub type NotifyCallback = Arc<dyn Fn(MsgType, i32, i32, UserContext) + Send + Sync>;

/// `(kind, block, index, user)`. The block is only valid for the duration
/// of the call. The engine produces no frame metadata, so none is passed.
pub type DataCallback = Arc<dyn Fn(MsgType, &Arc<FrameBlock>, u32, UserContext) + Send + Sync>;

/// `(timestamp_ns, kind, block, index, user)`. The block stays valid until
/// the client returns its key through `release_recording_frame`.
pub type DataTimestampCallback =
    Arc<dyn Fn(i64, MsgType, &Arc<FrameBlock>, u32, UserContext) + Send + Sync>;

/// `(fd, buffer_size, buffer_count, user)`, the client's `request_memory`.
pub type RequestMemory =
    Arc<dyn Fn(i32, usize, u32, UserContext) -> Option<Box<dyn ClientMemory>> + Send + Sync>;

/// The client's callbacks, registered through `set_callbacks`.
///
/// A new registration replaces the whole table.
#[derive(Clone, Default)]
pub struct CallbackTable {
    pub notify: Option<NotifyCallback>,
    pub data: Option<DataCallback>,
    pub data_timestamp: Option<DataTimestampCallback>,
    pub request_memory: Option<RequestMemory>,
    pub user: UserContext,
}

impl fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CallbackTable")
            .field("notify", &self.notify.is_some())
            .field("data", &self.data.is_some())
            .field("data_timestamp", &self.data_timestamp.is_some())
            .field("request_memory", &self.request_memory.is_some())
            .field("user", &self.user)
            .finish()
    }
}
