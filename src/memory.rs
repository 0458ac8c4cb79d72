use crate::connection::{ConnectionFactory, StoreConnection};
use crate::error::StoreError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// In-process list store that stands in for Redis.
///
/// Useful for unit tests and local demos that want to observe exactly
/// what the sink pushed without any external I/O. Cloning shares the
/// same underlying lists and counters.
#[derive(Clone, Default)]
pub struct MemoryConnectionFactory {
    state: Arc<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    lists: Mutex<HashMap<String, Vec<Vec<u8>>>>,
    descriptors: Mutex<Vec<String>>,
    closes: AtomicUsize,
    refuse_connections: AtomicBool,
    fail_writes: AtomicBool,
    panic_on_write: AtomicBool,
}

impl MemoryState {
    fn lists(&self) -> MutexGuard<'_, HashMap<String, Vec<Vec<u8>>>> {
        self.lists.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MemoryConnectionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `connect` calls fail.
    pub fn refuse_connections(&self, refuse: bool) {
        self.state.refuse_connections.store(refuse, Ordering::SeqCst);
    }

    /// Make subsequent pushes return an error.
    pub fn fail_writes(&self, fail: bool) {
        self.state.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent pushes panic, emulating a misbehaving client.
    pub fn panic_on_write(&self, panic: bool) {
        self.state.panic_on_write.store(panic, Ordering::SeqCst);
    }

    /// Payloads pushed onto `key`, oldest first.
    pub fn list(&self, key: &str) -> Vec<Vec<u8>> {
        self.state.lists().get(key).cloned().unwrap_or_default()
    }

    /// Payloads on `key` decoded as JSON documents.
    pub fn records(&self, key: &str) -> Vec<serde_json::Value> {
        self.list(key)
            .iter()
            .filter_map(|payload| serde_json::from_slice(payload).ok())
            .collect()
    }

    /// Total number of payloads pushed across every list.
    pub fn push_count(&self) -> usize {
        self.state.lists().values().map(Vec::len).sum()
    }

    /// Descriptors passed to `connect`, in call order.
    pub fn connect_calls(&self) -> Vec<String> {
        self.state
            .descriptors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of times a connection handed out by this factory was closed.
    pub fn close_count(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }
}

impl ConnectionFactory for MemoryConnectionFactory {
    fn connect(&self, descriptor: &str) -> Result<Box<dyn StoreConnection>, StoreError> {
        self.state
            .descriptors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(descriptor.to_string());

        if self.state.refuse_connections.load(Ordering::SeqCst) {
            return Err(StoreError::Other(format!("connection to {} refused", descriptor)));
        }

        Ok(Box::new(MemoryConnection {
            state: Arc::clone(&self.state),
            closed: AtomicBool::new(false),
        }))
    }
}

struct MemoryConnection {
    state: Arc<MemoryState>,
    closed: AtomicBool,
}

impl StoreConnection for MemoryConnection {
    fn right_push(&self, key: &str, payload: &[u8]) -> Result<(), StoreError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        if self.state.panic_on_write.load(Ordering::SeqCst) {
            panic!("memory store write panicked");
        }
        if self.state.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Other("memory store write failed".to_string()));
        }
        self.state
            .lists()
            .entry(key.to_string())
            .or_default()
            .push(payload.to_vec());
        Ok(())
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.state.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}
