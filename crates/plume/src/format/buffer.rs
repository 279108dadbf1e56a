//! Pooled scratch strings for aligned rendering.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};

/// Buffers larger than this are dropped instead of returned to the pool.
const MAX_RETAINED_CAPACITY: usize = 4 * 1024;
const MAX_POOLED: usize = 4;

thread_local! {
    static POOL: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// A cleared `String` borrowed from a thread-local pool, returned on drop.
pub struct ScratchBuffer {
    buf: String,
}

impl ScratchBuffer {
    pub fn take() -> Self {
        let buf = POOL.with(|pool| pool.borrow_mut().pop()).unwrap_or_default();
        Self { buf }
    }
}

impl Deref for ScratchBuffer {
    type Target = String;

    fn deref(&self) -> &String {
        &self.buf
    }
}

impl DerefMut for ScratchBuffer {
    fn deref_mut(&mut self) -> &mut String {
        &mut self.buf
    }
}

impl Drop for ScratchBuffer {
    fn drop(&mut self) {
        let mut buf = std::mem::take(&mut self.buf);
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buf.clear();
        // try_with: the pool may already be gone during thread teardown.
        let _ = POOL.try_with(|pool| {
            let mut pool = pool.borrow_mut();
            if pool.len() < MAX_POOLED {
                pool.push(buf);
            }
        });
    }
}
