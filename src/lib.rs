//! # aurora-bridge
//!
//! Session bridge for the Aurora microkernel's C ABI. The bridge owns the
//! lifecycle of the opaque kernel resource (initialize / query / shut down),
//! mirrors kernel-side thread handles so a front-end can list and destroy
//! them, marshals a bounded text round-trip across the boundary, and
//! translates raw status codes into a structured error type.
//!
//! ## Core Components
//!
//! - **abi**: raw status codes, `#[repr(C)]` structures, and the [`Kernel`]
//!   seam; `LinkedKernel` behind the `linked` feature calls the real
//!   `aurora_*` entry points
//! - **session**: [`KernelSession`], the lifecycle state machine and the
//!   only owner of the kernel handle
//! - **registry**: insertion-ordered mirror of live thread handles
//! - **demo**: bounded-buffer demo round-trip
//! - **ipc**: message values for the kernel's IPC primitives
//!
//! ## Example
//!
//! ```rust,ignore
//! use aurora_bridge::{KernelSession, LinkedKernel};
//!
//! let mut session = KernelSession::new(LinkedKernel::new());
//! session.initialize()?;
//!
//! let worker = session.create_thread("worker-1")?;
//! println!("{}", session.invoke_demo("ping")?);
//! session.destroy_thread(worker.id)?;
//! // Dropping the session shuts the kernel down.
//! ```
//!
//! The session performs no locking and is meant to be driven by a single
//! caller; concurrent access requires an external mutex.

pub mod abi;
pub mod buffer;
pub mod demo;
pub mod error;
pub mod ipc;
pub mod registry;
pub mod session;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

// Re-exports for convenience
pub use abi::{Kernel, KernelStatusBlock, RawMessage, RawStatus, MESSAGE_CAPACITY};
#[cfg(feature = "linked")]
pub use abi::LinkedKernel;
pub use buffer::OutBuffer;
pub use demo::{DemoInvoker, DEMO_BUFFER_CAPACITY};
pub use error::{check, Error, Result};
pub use ipc::IpcMessage;
pub use registry::{ThreadHandle, ThreadRegistry};
pub use session::{KernelSession, SessionSnapshot, SessionState, StatusSnapshot};
#[cfg(any(test, feature = "sim"))]
pub use sim::SimKernel;
