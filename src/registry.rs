// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Tracking of client memory handed out for recording frames.
//!
//! Recording frames outlive the callback that delivers them (an encoder
//! may hold on to them), so every block given to the client on the
//! timestamped path is kept here until the client returns it by key or
//! the stream is torn down.

use crate::{
    callbacks::{RequestMemory, UserContext},
    engine::EngineFrame,
    memory::{FrameBlock, MemoryKey},
};
use parking_lot::Mutex;
use std::{mem, sync::Arc};
use tracing::{debug, trace, warn};

/// Copies an engine frame into a block requested from the client
/// allocator.
///
/// Returns `None` when the allocator refuses or hands back less memory
/// than asked for; the frame is then dropped by the caller.
pub fn materialize(
    frame: &dyn EngineFrame,
    request_memory: &RequestMemory,
    user: UserContext,
) -> Option<FrameBlock> {
    let src = frame.bytes();
    trace!(
        "materialize heap_fd:{} offset:{:#x} size:{:#x}",
        frame.heap_fd(),
        frame.offset(),
        src.len()
    );

    let mut memory = match request_memory(-1, src.len(), 1, user) {
        Some(memory) => memory,
        None => {
            warn!("client allocator returned no memory for {} bytes", src.len());
            return None;
        }
    };

    let dst = memory.as_mut_slice();
    if dst.len() < src.len() {
        warn!(
            "client allocator returned {} bytes, needed {}",
            dst.len(),
            src.len()
        );
        FrameBlock::new(memory).release();
        return None;
    }
    dst[..src.len()].copy_from_slice(src);

    Some(FrameBlock::new(memory))
}

/// Insertion-ordered set of blocks the client still holds.
#[derive(Default)]
pub struct FrameRegistry {
    blocks: Mutex<Vec<Arc<FrameBlock>>>,
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, block: Arc<FrameBlock>) {
        let mut blocks = self.blocks.lock();
        blocks.push(block);
        trace!("tracking {} client blocks", blocks.len());
    }

    /// Releases the block whose key matches. A miss is not an error: the
    /// client may return a frame that teardown already reclaimed.
    pub fn release_by_key(&self, key: MemoryKey) -> bool {
        let block = {
            let mut blocks = self.blocks.lock();
            match blocks.iter().position(|b| b.key() == key) {
                Some(index) => blocks.remove(index),
                None => {
                    debug!("no tracked client block for {key:?}");
                    return false;
                }
            }
        };
        block.release();
        true
    }

    /// Releases every tracked block and returns how many there were.
    pub fn release_all(&self) -> usize {
        let blocks = mem::take(&mut *self.blocks.lock());
        let count = blocks.len();
        for block in blocks {
            block.release();
        }
        if count > 0 {
            debug!("released {count} outstanding client blocks");
        }
        count
    }

    pub fn len(&self) -> usize {
        self.blocks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.lock().is_empty()
    }

    /// Keys of the tracked blocks, oldest first.
    pub fn keys(&self) -> Vec<MemoryKey> {
        self.blocks.lock().iter().map(|b| b.key()).collect()
    }
}

impl Drop for FrameRegistry {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ClientMemory;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct HeapMemory {
        data: Vec<u8>,
        releases: Arc<AtomicUsize>,
    }

    impl ClientMemory for HeapMemory {
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

    fn block(size: usize, releases: &Arc<AtomicUsize>) -> Arc<FrameBlock> {
        Arc::new(FrameBlock::new(Box::new(HeapMemory {
            data: vec![0; size],
            releases: releases.clone(),
        })))
    }

    #[test]
    fn test_release_by_key() {
        let releases = Arc::new(AtomicUsize::new(0));
        let registry = FrameRegistry::new();
        let a = block(16, &releases);
        let b = block(16, &releases);
        registry.append(a.clone());
        registry.append(b.clone());

        assert!(registry.release_by_key(a.key()));
        assert_eq!(registry.len(), 1);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert!(a.is_released());
        assert!(!b.is_released());

        // a second return of the same key is a miss, not a second release
        assert!(!registry.release_by_key(a.key()));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(registry.keys(), vec![b.key()]);
    }

    #[test]
    fn test_release_unknown_key() {
        let releases = Arc::new(AtomicUsize::new(0));
        let registry = FrameRegistry::new();
        let a = block(8, &releases);
        registry.append(a.clone());

        assert!(!registry.release_by_key(MemoryKey::from_ptr(std::ptr::null::<u8>())));
        assert_eq!(registry.keys(), vec![a.key()]);
        assert_eq!(releases.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_release_all_then_append() {
        let releases = Arc::new(AtomicUsize::new(0));
        let registry = FrameRegistry::new();
        for _ in 0..5 {
            registry.append(block(4, &releases));
        }

        assert_eq!(registry.release_all(), 5);
        assert!(registry.is_empty());
        assert_eq!(releases.load(Ordering::SeqCst), 5);
        assert_eq!(registry.release_all(), 0);

        registry.append(block(4, &releases));
        assert_eq!(registry.len(), 1);
        drop(registry);
        assert_eq!(releases.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_release_skips_already_released() {
        let releases = Arc::new(AtomicUsize::new(0));
        let registry = FrameRegistry::new();
        let a = block(4, &releases);
        registry.append(a.clone());
        a.release();

        assert_eq!(registry.release_all(), 1);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }
}
