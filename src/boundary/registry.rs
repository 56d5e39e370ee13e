//! Registry for buffers whose ownership crossed the boundary.
//!
//! Every encoded response is stored here, keyed by the `id` carried
//! inside its JSON payload, until the caller releases it. Release is
//! idempotent and bulk release is safe concurrently with in-flight
//! single releases, which is what makes shutdown race-free.

use dashmap::DashMap;
use std::ffi::{c_char, CString};

#[derive(Default)]
pub struct MemoryRegistry {
    buffers: DashMap<String, CString>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            buffers: DashMap::new(),
        }
    }

    /// Store a payload and return a pointer that stays valid until the
    /// buffer is released.
    ///
    /// The CString's heap allocation does not move when the map rehashes,
    /// so the pointer is stable for the buffer's lifetime.
    pub fn register(&self, id: &str, payload: &str) -> *const c_char {
        // Serialized JSON never contains raw NUL bytes; the fallback
        // covers hand-made payloads.
        let cstring = CString::new(payload)
            .unwrap_or_else(|_| CString::new(payload.replace('\0', "")).unwrap_or_default());
        let ptr = cstring.as_ptr();
        self.buffers.insert(id.to_string(), cstring);
        ptr
    }

    /// Release one buffer. Unknown ids are a no-op.
    pub fn release(&self, id: &str) {
        self.buffers.remove(id);
    }

    /// Release every outstanding buffer.
    pub fn release_all(&self) {
        self.buffers.clear();
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_release() {
        let registry = MemoryRegistry::new();
        let ptr = registry.register("id-1", r#"{"status":200}"#);
        assert!(!ptr.is_null());
        assert_eq!(registry.len(), 1);

        registry.release("id-1");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_release_is_idempotent() {
        let registry = MemoryRegistry::new();
        registry.register("id-1", "x");
        registry.release("id-1");
        registry.release("id-1");
        registry.release("never-existed");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_release_all() {
        let registry = MemoryRegistry::new();
        registry.register("a", "1");
        registry.register("b", "2");
        registry.register("c", "3");
        registry.release_all();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_pointer_reads_back_payload() {
        let registry = MemoryRegistry::new();
        let ptr = registry.register("id-1", "hello");
        let read = unsafe { std::ffi::CStr::from_ptr(ptr) };
        assert_eq!(read.to_str().unwrap(), "hello");
    }

    #[test]
    fn test_concurrent_release_all() {
        use std::sync::Arc;

        let registry = Arc::new(MemoryRegistry::new());
        for i in 0..256 {
            registry.register(&format!("id-{i}"), "x");
        }

        let mut handles = Vec::new();
        for i in 0..4 {
            let registry = registry.clone();
            handles.push(std::thread::spawn(move || {
                for j in (i * 64)..((i + 1) * 64) {
                    registry.release(&format!("id-{j}"));
                }
            }));
        }
        let bulk = registry.clone();
        handles.push(std::thread::spawn(move || bulk.release_all()));

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(registry.is_empty());
    }
}
