//! Raw C ABI surface of the Aurora kernel.
//!
//! Everything the bridge knows about the foreign side lives here: the raw
//! status code type and its documented values, the `#[repr(C)]` structures
//! exchanged across the boundary, and the [`Kernel`] trait through which
//! every entry point is reached.
//!
//! The trait keeps raw status codes and out-parameters so that guarding,
//! translation, and buffer decoding happen identically above the seam no
//! matter which kernel is behind it: the linked library (`linked` feature),
//! the in-process simulator (`sim` feature), or a scripted test double.

use std::ffi::CString;

/// Status code as returned by every kernel entry point.
pub type RawStatus = i32;

/// Operation completed.
pub const STATUS_OK: RawStatus = 0;
/// A parameter was rejected by the kernel.
pub const STATUS_INVALID_PARAM: RawStatus = -1;
/// The kernel has not been initialized.
pub const STATUS_NOT_INITIALIZED: RawStatus = -2;
/// The kernel was already initialized.
pub const STATUS_ALREADY_INITIALIZED: RawStatus = -3;
/// The kernel ran out of memory.
pub const STATUS_OUT_OF_MEMORY: RawStatus = -4;
/// The kernel's own catch-all failure code.
pub const STATUS_UNKNOWN: RawStatus = -99;

/// Fixed size of the data field of an IPC message, terminator included.
pub const MESSAGE_CAPACITY: usize = 256;

/// Status block filled by `aurora_kernel_get_status`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelStatusBlock {
    pub initialized: bool,
    pub version_major: u32,
    pub version_minor: u32,
    pub version_patch: u32,
    pub uptime_ms: u64,
    pub active_threads: u32,
}

impl KernelStatusBlock {
    /// A zeroed block suitable as an out-parameter.
    pub const fn zeroed() -> Self {
        Self {
            initialized: false,
            version_major: 0,
            version_minor: 0,
            version_patch: 0,
            uptime_ms: 0,
            active_threads: 0,
        }
    }
}

impl Default for KernelStatusBlock {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// IPC message as laid out on the wire.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawMessage {
    pub msg_id: u32,
    pub timestamp: u64,
    pub data: [u8; MESSAGE_CAPACITY],
    pub data_size: u32,
}

impl Default for RawMessage {
    fn default() -> Self {
        Self {
            msg_id: 0,
            timestamp: 0,
            data: [0; MESSAGE_CAPACITY],
            data_size: 0,
        }
    }
}

impl std::fmt::Debug for RawMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawMessage")
            .field("msg_id", &self.msg_id)
            .field("timestamp", &self.timestamp)
            .field("data_size", &self.data_size)
            .finish_non_exhaustive()
    }
}

/// The seam between the bridge and a concrete kernel.
///
/// Methods mirror the C entry points one for one: raw status codes out,
/// out-parameters for values the kernel writes. Implementations must not
/// panic; failure is always a status code.
pub trait Kernel {
    /// `aurora_kernel_init`
    fn init(&mut self) -> RawStatus;

    /// `aurora_kernel_shutdown`
    fn shutdown(&mut self) -> RawStatus;

    /// `aurora_kernel_get_status`
    fn get_status(&mut self, out: &mut KernelStatusBlock) -> RawStatus;

    /// `aurora_get_version_string`, copied out of kernel-owned memory.
    ///
    /// Meaningful only while the kernel is initialized.
    fn version_string(&mut self) -> CString;

    /// `aurora_thread_create`
    fn thread_create(&mut self, out_id: &mut u32, name: &std::ffi::CStr) -> RawStatus;

    /// `aurora_thread_destroy`
    fn thread_destroy(&mut self, id: u32) -> RawStatus;

    /// `aurora_thread_get_count`
    fn thread_count(&mut self, out: &mut u32) -> RawStatus;

    /// `aurora_ipc_send`
    fn ipc_send(&mut self, target: u32, message: &RawMessage) -> RawStatus;

    /// `aurora_ipc_receive`
    fn ipc_receive(&mut self, out_sender: &mut u32, out: &mut RawMessage) -> RawStatus;

    /// `aurora_demo_kernel_call`. The kernel writes at most `out.len()`
    /// bytes into `out`, terminator included.
    fn demo_call(&mut self, input: &std::ffi::CStr, out: &mut [u8]) -> RawStatus;
}

#[cfg(feature = "linked")]
mod linked {
    use std::ffi::{CStr, CString};
    use std::os::raw::c_char;

    use super::{Kernel, KernelStatusBlock, RawMessage, RawStatus, STATUS_INVALID_PARAM};

    #[link(name = "aurora_kernel")]
    extern "C" {
        fn aurora_kernel_init() -> RawStatus;
        fn aurora_kernel_shutdown() -> RawStatus;
        fn aurora_kernel_get_status(status: *mut KernelStatusBlock) -> RawStatus;
        fn aurora_get_version_string() -> *const c_char;
        fn aurora_thread_create(thread_id: *mut u32, name: *const c_char) -> RawStatus;
        fn aurora_thread_destroy(thread_id: u32) -> RawStatus;
        fn aurora_thread_get_count(count: *mut u32) -> RawStatus;
        fn aurora_ipc_send(target: u32, message: *const RawMessage) -> RawStatus;
        fn aurora_ipc_receive(sender: *mut u32, message: *mut RawMessage) -> RawStatus;
        fn aurora_demo_kernel_call(
            input: *const c_char,
            output: *mut c_char,
            output_size: u32,
        ) -> RawStatus;
    }

    /// Kernel reached through the linked `aurora_*` entry points.
    ///
    /// The kernel state is process-global on the foreign side; constructing
    /// more than one `LinkedKernel` gives aliases of the same resource, so a
    /// process should hand exactly one of these to a session.
    #[derive(Debug, Default)]
    pub struct LinkedKernel;

    impl LinkedKernel {
        pub fn new() -> Self {
            Self
        }
    }

    impl Kernel for LinkedKernel {
        fn init(&mut self) -> RawStatus {
            unsafe { aurora_kernel_init() }
        }

        fn shutdown(&mut self) -> RawStatus {
            unsafe { aurora_kernel_shutdown() }
        }

        fn get_status(&mut self, out: &mut KernelStatusBlock) -> RawStatus {
            unsafe { aurora_kernel_get_status(out) }
        }

        fn version_string(&mut self) -> CString {
            // The kernel owns the returned text; copy it before the next call
            // can reuse the backing storage.
            let ptr = unsafe { aurora_get_version_string() };
            if ptr.is_null() {
                return CString::default();
            }
            unsafe { CStr::from_ptr(ptr) }.to_owned()
        }

        fn thread_create(&mut self, out_id: &mut u32, name: &CStr) -> RawStatus {
            unsafe { aurora_thread_create(out_id, name.as_ptr()) }
        }

        fn thread_destroy(&mut self, id: u32) -> RawStatus {
            unsafe { aurora_thread_destroy(id) }
        }

        fn thread_count(&mut self, out: &mut u32) -> RawStatus {
            unsafe { aurora_thread_get_count(out) }
        }

        fn ipc_send(&mut self, target: u32, message: &RawMessage) -> RawStatus {
            unsafe { aurora_ipc_send(target, message) }
        }

        fn ipc_receive(&mut self, out_sender: &mut u32, out: &mut RawMessage) -> RawStatus {
            unsafe { aurora_ipc_receive(out_sender, out) }
        }

        fn demo_call(&mut self, input: &CStr, out: &mut [u8]) -> RawStatus {
            let Ok(capacity) = u32::try_from(out.len()) else {
                return STATUS_INVALID_PARAM;
            };
            unsafe { aurora_demo_kernel_call(input.as_ptr(), out.as_mut_ptr().cast(), capacity) }
        }
    }
}

#[cfg(feature = "linked")]
pub use linked::LinkedKernel;
