//! In-process simulated kernel.
//!
//! `SimKernel` implements [`Kernel`] with the same observable contract as
//! the real kernel stub: status codes, thread identifiers assigned from 1,
//! the demo call's echo format with snprintf-style truncation, and a
//! kernel-stamped demo IPC message. It exists so the bridge can be driven
//! end to end without linking the foreign library.

use std::ffi::{CStr, CString};
use std::time::Instant;

use crate::abi::{
    Kernel, KernelStatusBlock, RawMessage, RawStatus, STATUS_ALREADY_INITIALIZED,
    STATUS_INVALID_PARAM, STATUS_NOT_INITIALIZED, STATUS_OK,
};

const SIM_VERSION: (u32, u32, u32) = (0, 1, 0);

/// Kernel-side thread name storage is a 64-byte field, terminator included.
const THREAD_NAME_CAPACITY: usize = 63;

#[derive(Debug)]
struct SimThread {
    id: u32,
    #[allow(dead_code)]
    name: String,
}

/// Pure-Rust stand-in for the Aurora kernel.
#[derive(Debug)]
pub struct SimKernel {
    initialized: bool,
    started: Option<Instant>,
    threads: Vec<SimThread>,
    next_thread_id: u32,
}

impl Default for SimKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimKernel {
    pub fn new() -> Self {
        Self {
            initialized: false,
            started: None,
            threads: Vec::new(),
            next_thread_id: 1,
        }
    }

    fn uptime_ms(&self) -> u64 {
        match self.started {
            Some(t) if self.initialized => t.elapsed().as_millis() as u64,
            _ => 0,
        }
    }
}

impl Kernel for SimKernel {
    fn init(&mut self) -> RawStatus {
        if self.initialized {
            return STATUS_ALREADY_INITIALIZED;
        }
        self.initialized = true;
        self.started = Some(Instant::now());
        STATUS_OK
    }

    fn shutdown(&mut self) -> RawStatus {
        if !self.initialized {
            return STATUS_NOT_INITIALIZED;
        }
        self.threads.clear();
        self.initialized = false;
        STATUS_OK
    }

    fn get_status(&mut self, out: &mut KernelStatusBlock) -> RawStatus {
        if !self.initialized {
            return STATUS_NOT_INITIALIZED;
        }
        out.initialized = true;
        out.version_major = SIM_VERSION.0;
        out.version_minor = SIM_VERSION.1;
        out.version_patch = SIM_VERSION.2;
        out.uptime_ms = self.uptime_ms();
        out.active_threads = self.threads.len() as u32;
        STATUS_OK
    }

    fn version_string(&mut self) -> CString {
        let (major, minor, patch) = SIM_VERSION;
        CString::new(format!("{major}.{minor}.{patch}")).unwrap_or_default()
    }

    fn thread_create(&mut self, out_id: &mut u32, name: &CStr) -> RawStatus {
        if !self.initialized {
            return STATUS_NOT_INITIALIZED;
        }
        let bytes = name.to_bytes();
        let truncated = &bytes[..bytes.len().min(THREAD_NAME_CAPACITY)];
        let id = self.next_thread_id;
        self.next_thread_id += 1;
        self.threads.push(SimThread {
            id,
            name: String::from_utf8_lossy(truncated).into_owned(),
        });
        *out_id = id;
        STATUS_OK
    }

    fn thread_destroy(&mut self, id: u32) -> RawStatus {
        if !self.initialized {
            return STATUS_NOT_INITIALIZED;
        }
        match self.threads.iter().position(|t| t.id == id) {
            Some(idx) => {
                self.threads.remove(idx);
                STATUS_OK
            }
            None => STATUS_INVALID_PARAM,
        }
    }

    fn thread_count(&mut self, out: &mut u32) -> RawStatus {
        if !self.initialized {
            return STATUS_NOT_INITIALIZED;
        }
        *out = self.threads.len() as u32;
        STATUS_OK
    }

    fn ipc_send(&mut self, _target: u32, message: &RawMessage) -> RawStatus {
        if !self.initialized {
            return STATUS_NOT_INITIALIZED;
        }
        if message.data_size as usize > message.data.len() {
            return STATUS_INVALID_PARAM;
        }
        STATUS_OK
    }

    fn ipc_receive(&mut self, out_sender: &mut u32, out: &mut RawMessage) -> RawStatus {
        if !self.initialized {
            return STATUS_NOT_INITIALIZED;
        }
        let payload = b"Demo message from kernel";
        *out_sender = 0;
        out.msg_id = 1;
        out.timestamp = self.uptime_ms();
        out.data = [0; crate::abi::MESSAGE_CAPACITY];
        out.data[..payload.len()].copy_from_slice(payload);
        out.data_size = payload.len() as u32;
        STATUS_OK
    }

    fn demo_call(&mut self, input: &CStr, out: &mut [u8]) -> RawStatus {
        if out.is_empty() {
            return STATUS_INVALID_PARAM;
        }
        if !self.initialized {
            return STATUS_NOT_INITIALIZED;
        }
        let reply = format!(
            "Aurora Kernel Response: '{}' [uptime: {} ms, threads: {}]",
            input.to_string_lossy(),
            self.uptime_ms(),
            self.threads.len()
        );
        // snprintf semantics: at most len-1 payload bytes, always terminated
        let bytes = reply.as_bytes();
        let n = bytes.len().min(out.len() - 1);
        out[..n].copy_from_slice(&bytes[..n]);
        out[n] = 0;
        STATUS_OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_init_is_already_initialized() {
        let mut sim = SimKernel::new();
        assert_eq!(sim.init(), STATUS_OK);
        assert_eq!(sim.init(), STATUS_ALREADY_INITIALIZED);
    }

    #[test]
    fn test_shutdown_before_init_fails() {
        let mut sim = SimKernel::new();
        assert_eq!(sim.shutdown(), STATUS_NOT_INITIALIZED);
    }

    #[test]
    fn test_thread_ids_start_at_one_and_increment() {
        let mut sim = SimKernel::new();
        sim.init();

        let mut id = 0;
        let name = CString::new("a").unwrap();
        assert_eq!(sim.thread_create(&mut id, &name), STATUS_OK);
        assert_eq!(id, 1);
        assert_eq!(sim.thread_create(&mut id, &name), STATUS_OK);
        assert_eq!(id, 2);
    }

    #[test]
    fn test_destroy_unknown_thread_is_invalid_param() {
        let mut sim = SimKernel::new();
        sim.init();
        assert_eq!(sim.thread_destroy(99), STATUS_INVALID_PARAM);
    }

    #[test]
    fn test_status_reflects_thread_table() {
        let mut sim = SimKernel::new();
        sim.init();

        let mut id = 0;
        let name = CString::new("worker").unwrap();
        sim.thread_create(&mut id, &name);

        let mut block = KernelStatusBlock::zeroed();
        assert_eq!(sim.get_status(&mut block), STATUS_OK);
        assert!(block.initialized);
        assert_eq!(block.active_threads, 1);
        assert_eq!(
            (block.version_major, block.version_minor, block.version_patch),
            SIM_VERSION
        );
    }

    #[test]
    fn test_demo_call_truncates_with_terminator() {
        let mut sim = SimKernel::new();
        sim.init();

        let input = CString::new("0123456789").unwrap();
        let mut out = [0xAAu8; 8];
        assert_eq!(sim.demo_call(&input, &mut out), STATUS_OK);
        assert_eq!(out[7], 0);
        assert!(!out[..7].contains(&0));
    }

    #[test]
    fn test_ipc_receive_stamps_demo_message() {
        let mut sim = SimKernel::new();
        sim.init();

        let mut sender = 42;
        let mut raw = RawMessage::default();
        assert_eq!(sim.ipc_receive(&mut sender, &mut raw), STATUS_OK);
        assert_eq!(sender, 0);
        assert_eq!(raw.msg_id, 1);
        assert_eq!(&raw.data[..raw.data_size as usize], b"Demo message from kernel");
    }

    #[test]
    fn test_shutdown_clears_thread_table() {
        let mut sim = SimKernel::new();
        sim.init();

        let mut id = 0;
        let name = CString::new("worker").unwrap();
        sim.thread_create(&mut id, &name);
        sim.shutdown();
        sim.init();

        let mut count = u32::MAX;
        assert_eq!(sim.thread_count(&mut count), STATUS_OK);
        assert_eq!(count, 0);
    }
}
