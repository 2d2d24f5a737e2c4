// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};
use tracing::{trace, warn};

/// Identity of a client memory block: the address of its data region.
///
/// The client hands this value back (as the opaque pointer of
/// `release_recording_frame`) to say it is done with a recording frame.
/// It is only ever compared, never dereferenced.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryKey(usize);

impl MemoryKey {
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        MemoryKey(ptr as usize)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl fmt::Debug for MemoryKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MemoryKey({:#x})", self.0)
    }
}

/// A memory region produced by the client's `request_memory` allocator
/// (the `camera_memory_t` of the plugin ABI).
pub trait ClientMemory: Send + Sync {
    fn as_slice(&self) -> &[u8];

    fn as_mut_slice(&mut self) -> &mut [u8];

    /// Hands the region back to the client. Called exactly once, through
    /// [`FrameBlock::release`].
    fn release(&self);

    fn size(&self) -> usize {
        self.as_slice().len()
    }

    fn key(&self) -> MemoryKey {
        MemoryKey::from_ptr(self.as_slice().as_ptr())
    }
}

/// One delivered frame's bytes in client memory.
///
/// Shared as `Arc<FrameBlock>` between the registry and the callback that
/// received it. Releasing is idempotent: only the first call reaches the
/// client.
pub struct FrameBlock {
    memory: Box<dyn ClientMemory>,
    key: MemoryKey,
    released: AtomicBool,
}

impl FrameBlock {
    pub fn new(memory: Box<dyn ClientMemory>) -> Self {
        let key = memory.key();
        Self {
            memory,
            key,
            released: AtomicBool::new(false),
        }
    }

    pub fn key(&self) -> MemoryKey {
        self.key
    }

    pub fn size(&self) -> usize {
        self.memory.size()
    }

    /// The frame bytes. Only valid until the block is released; after that
    /// the allocator owning the region may already have reclaimed it.
    pub fn data(&self) -> &[u8] {
        self.memory.as_slice()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.memory.as_mut_slice()
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Returns the block to the client allocator. Returns `false` when the
    /// block had already been released.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.memory.release();
        trace!("released client block {:?}", self.key);
        true
    }
}

impl Drop for FrameBlock {
    fn drop(&mut self) {
        if !self.is_released() {
            warn!("client block {:?} dropped without release", self.key);
        }
    }
}

impl fmt::Debug for FrameBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FrameBlock")
            .field("key", &self.key)
            .field("size", &self.size())
            .field("released", &self.is_released())
            .finish()
    }
}
