//! Bounded demo round-trip across the kernel boundary.

use std::ffi::CString;

use tracing::debug;

use crate::abi::Kernel;
use crate::buffer::OutBuffer;
use crate::error::{check, Error, Result};

/// Output capacity used by the kernel's demo entry point.
pub const DEMO_BUFFER_CAPACITY: usize = 256;

/// Performs one text exchange through a fixed-capacity output buffer.
#[derive(Debug, Clone)]
pub struct DemoInvoker {
    capacity: usize,
}

impl Default for DemoInvoker {
    fn default() -> Self {
        Self::new(DEMO_BUFFER_CAPACITY)
    }
}

impl DemoInvoker {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Round-trip `input` through the kernel's demo call.
    ///
    /// On a non-OK status nothing is read from the buffer; whatever partial
    /// bytes the kernel may have written are discarded and the translated
    /// error is returned instead.
    pub fn invoke<K: Kernel>(&self, kernel: &mut K, input: &str) -> Result<String> {
        if self.capacity == 0 {
            return Err(Error::InvalidParameter);
        }
        let input = CString::new(input).map_err(|_| Error::InvalidParameter)?;

        let mut out = OutBuffer::new(self.capacity);
        check(kernel.demo_call(&input, out.as_mut_slice()))?;

        let output = out.decode()?;
        debug!(len = output.len(), "demo call completed");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{RawStatus, STATUS_OK, STATUS_OUT_OF_MEMORY};
    use crate::sim::SimKernel;

    /// Kernel double that writes scripted bytes into the demo buffer.
    struct ScriptedDemo {
        status: RawStatus,
        writes: Vec<u8>,
        terminate: bool,
    }

    impl crate::abi::Kernel for ScriptedDemo {
        fn init(&mut self) -> RawStatus {
            STATUS_OK
        }
        fn shutdown(&mut self) -> RawStatus {
            STATUS_OK
        }
        fn get_status(&mut self, _out: &mut crate::abi::KernelStatusBlock) -> RawStatus {
            STATUS_OK
        }
        fn version_string(&mut self) -> CString {
            CString::default()
        }
        fn thread_create(&mut self, _out_id: &mut u32, _name: &std::ffi::CStr) -> RawStatus {
            STATUS_OK
        }
        fn thread_destroy(&mut self, _id: u32) -> RawStatus {
            STATUS_OK
        }
        fn thread_count(&mut self, _out: &mut u32) -> RawStatus {
            STATUS_OK
        }
        fn ipc_send(&mut self, _target: u32, _message: &crate::abi::RawMessage) -> RawStatus {
            STATUS_OK
        }
        fn ipc_receive(
            &mut self,
            _out_sender: &mut u32,
            _out: &mut crate::abi::RawMessage,
        ) -> RawStatus {
            STATUS_OK
        }
        fn demo_call(&mut self, _input: &std::ffi::CStr, out: &mut [u8]) -> RawStatus {
            let n = self.writes.len().min(out.len());
            out[..n].copy_from_slice(&self.writes[..n]);
            if self.terminate && n < out.len() {
                out[n] = 0;
            }
            self.status
        }
    }

    #[test]
    fn test_invoke_echoes_through_sim_kernel() {
        let mut kernel = SimKernel::new();
        kernel.init();

        let invoker = DemoInvoker::default();
        let output = invoker.invoke(&mut kernel, "ping").unwrap();

        assert!(output.contains("'ping'"));
        assert!(output.len() < DEMO_BUFFER_CAPACITY);
        assert!(!output.as_bytes().contains(&0));
    }

    #[test]
    fn test_failure_discards_partial_bytes() {
        let mut kernel = ScriptedDemo {
            status: STATUS_OUT_OF_MEMORY,
            writes: b"partial garbage".to_vec(),
            terminate: true,
        };
        let err = DemoInvoker::default().invoke(&mut kernel, "in").unwrap_err();
        assert_eq!(err, Error::OutOfMemory);
    }

    #[test]
    fn test_unterminated_buffer_is_rejected() {
        let mut kernel = ScriptedDemo {
            status: STATUS_OK,
            writes: vec![b'x'; DEMO_BUFFER_CAPACITY],
            terminate: false,
        };
        let err = DemoInvoker::default().invoke(&mut kernel, "in").unwrap_err();
        assert!(matches!(err, Error::Inconsistency { .. }));
    }

    #[test]
    fn test_interior_nul_in_input_is_rejected_locally() {
        let mut kernel = ScriptedDemo {
            status: STATUS_OK,
            writes: Vec::new(),
            terminate: true,
        };
        let err = DemoInvoker::default()
            .invoke(&mut kernel, "bad\0input")
            .unwrap_err();
        assert_eq!(err, Error::InvalidParameter);
    }

    #[test]
    fn test_zero_capacity_is_rejected_locally() {
        let mut kernel = SimKernel::new();
        kernel.init();
        let err = DemoInvoker::new(0).invoke(&mut kernel, "ping").unwrap_err();
        assert_eq!(err, Error::InvalidParameter);
    }

    #[test]
    fn test_small_capacity_truncates_but_stays_bounded() {
        let mut kernel = SimKernel::new();
        kernel.init();

        let invoker = DemoInvoker::new(16);
        let output = invoker.invoke(&mut kernel, "a rather long input").unwrap();
        assert!(output.len() < 16);
    }
}
