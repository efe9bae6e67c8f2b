//! Kernel session lifecycle and operations.
//!
//! [`KernelSession`] owns the one live kernel resource, the local thread
//! registry, and the cached status snapshot. Every mutating operation takes
//! `&mut self`, so serialized access is a compile-time property for safe
//! callers; the bridge adds no locking of its own. Callers that need to
//! drive a session from several threads must wrap it in their own mutex.
//!
//! Dropping a session shuts the kernel down, so no exit path leaks the
//! foreign resource.

use std::ffi::CString;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::abi::{Kernel, KernelStatusBlock, RawMessage, STATUS_OK};
use crate::demo::DemoInvoker;
use crate::error::{check, Error, Result};
use crate::ipc::IpcMessage;
use crate::registry::{ThreadHandle, ThreadRegistry};

/// Lifecycle state of the kernel resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Uninitialized,
    Initialized,
    /// Held only for the duration of the shutdown call itself.
    ShuttingDown,
}

/// Point-in-time copy of kernel-reported status. Stale the moment any
/// mutating call succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub version: String,
    pub uptime_ms: u64,
    pub active_threads: u32,
}

/// Immutable view of the whole session, published for a front-end to poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub initialized: bool,
    pub status: Option<StatusSnapshot>,
    pub threads: Vec<ThreadHandle>,
    pub last_error: Option<String>,
    pub demo_output: Option<String>,
}

/// Owner of the kernel resource lifecycle.
///
/// Generic over the [`Kernel`] seam: the linked library in production, the
/// simulator or a scripted double in tests. Exactly one session should own
/// a given kernel; the session releases it on [`shutdown`](Self::shutdown)
/// or on drop, whichever comes first.
pub struct KernelSession<K: Kernel> {
    kernel: K,
    state: SessionState,
    registry: ThreadRegistry,
    status: Option<StatusSnapshot>,
    last_error: Option<Error>,
    demo_output: Option<String>,
    demo: DemoInvoker,
}

impl<K: Kernel> KernelSession<K> {
    /// Wrap a kernel in an uninitialized session.
    pub fn new(kernel: K) -> Self {
        Self::with_demo_invoker(kernel, DemoInvoker::default())
    }

    /// Like [`new`](Self::new) with a non-default demo buffer capacity.
    pub fn with_demo_invoker(kernel: K, demo: DemoInvoker) -> Self {
        Self {
            kernel,
            state: SessionState::Uninitialized,
            registry: ThreadRegistry::new(),
            status: None,
            last_error: None,
            demo_output: None,
            demo,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Acquire the kernel resource.
    ///
    /// Guarded locally: calling this while already initialized fails with
    /// [`Error::AlreadyInitialized`] without touching the kernel. On
    /// success the retained error is cleared and a best-effort status
    /// refresh runs; a failed refresh does not undo initialization.
    pub fn initialize(&mut self) -> Result<()> {
        if self.state == SessionState::Initialized {
            return self.fail(Error::AlreadyInitialized);
        }
        if let Err(e) = check(self.kernel.init()) {
            return self.fail(e);
        }
        self.state = SessionState::Initialized;
        self.last_error = None;
        info!("kernel session initialized");
        let _ = self.refresh_status();
        Ok(())
    }

    /// Release the kernel resource. No-op unless initialized.
    ///
    /// The session always ends Uninitialized with the snapshot absent and
    /// the registry empty, even when the kernel reports a failure: the
    /// handle must never be referenced again once shutdown was requested.
    pub fn shutdown(&mut self) {
        if self.state != SessionState::Initialized {
            return;
        }
        self.state = SessionState::ShuttingDown;
        let status = self.kernel.shutdown();
        if status == STATUS_OK {
            info!("kernel session shut down");
        } else {
            warn!(status, "kernel shutdown reported failure, releasing session state anyway");
        }
        self.state = SessionState::Uninitialized;
        self.status = None;
        self.registry.clear();
    }

    /// Query the kernel for a fresh status snapshot. No-op (and not an
    /// error) when not initialized; on failure the previous snapshot stays.
    pub fn refresh_status(&mut self) -> Result<()> {
        if self.state != SessionState::Initialized {
            return Ok(());
        }
        let mut block = KernelStatusBlock::zeroed();
        if let Err(e) = check(self.kernel.get_status(&mut block)) {
            return self.fail(e);
        }
        let version = self.kernel.version_string().to_string_lossy().into_owned();
        if block.active_threads as usize != self.registry.len() {
            warn!(
                kernel = block.active_threads,
                local = self.registry.len(),
                "thread count drift between kernel and registry"
            );
        }
        self.status = Some(StatusSnapshot {
            version,
            uptime_ms: block.uptime_ms,
            active_threads: block.active_threads,
        });
        self.last_error = None;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Threads
    // ------------------------------------------------------------------

    /// Create a kernel thread and mirror it locally.
    ///
    /// The registry is updated only after the kernel confirms creation; on
    /// any failure nothing is registered.
    pub fn create_thread(&mut self, name: &str) -> Result<ThreadHandle> {
        if self.state != SessionState::Initialized {
            return self.fail(Error::NotInitialized);
        }
        if name.is_empty() {
            return self.fail(Error::InvalidParameter);
        }
        let c_name = match CString::new(name) {
            Ok(s) => s,
            Err(_) => return self.fail(Error::InvalidParameter),
        };

        let mut id: u32 = 0;
        if let Err(e) = check(self.kernel.thread_create(&mut id, &c_name)) {
            return self.fail(e);
        }
        if let Err(e) = self.registry.insert(id, name) {
            warn!(id, "kernel returned a thread id that is already registered");
            return self.fail(e);
        }
        debug!(id, name, "thread created");
        self.last_error = None;
        let _ = self.refresh_status();
        Ok(ThreadHandle {
            id,
            name: name.to_owned(),
        })
    }

    /// Destroy a kernel thread and drop the local mirror entry.
    ///
    /// Removal happens only after the kernel confirms; a locally-absent id
    /// after a confirmed destroy is a desynchronization, logged rather than
    /// raised.
    pub fn destroy_thread(&mut self, id: u32) -> Result<()> {
        if self.state != SessionState::Initialized {
            return self.fail(Error::NotInitialized);
        }
        if let Err(e) = check(self.kernel.thread_destroy(id)) {
            return self.fail(e);
        }
        if !self.registry.remove(id) {
            warn!(id, "kernel destroyed a thread the registry never recorded");
        }
        debug!(id, "thread destroyed");
        self.last_error = None;
        let _ = self.refresh_status();
        Ok(())
    }

    /// Registry contents in insertion order. Pure read, no kernel call.
    pub fn list_threads(&self) -> &[ThreadHandle] {
        self.registry.list()
    }

    /// The kernel's own active-thread count.
    ///
    /// Disagreement with the local registry is logged as a consistency
    /// warning; the kernel's number is returned either way.
    pub fn kernel_thread_count(&mut self) -> Result<u32> {
        if self.state != SessionState::Initialized {
            return self.fail(Error::NotInitialized);
        }
        let mut count: u32 = 0;
        if let Err(e) = check(self.kernel.thread_count(&mut count)) {
            return self.fail(e);
        }
        if count as usize != self.registry.len() {
            warn!(
                kernel = count,
                local = self.registry.len(),
                "thread count drift between kernel and registry"
            );
        }
        self.last_error = None;
        Ok(count)
    }

    // ------------------------------------------------------------------
    // Demo call
    // ------------------------------------------------------------------

    /// Round-trip `input` through the kernel's demo entry point.
    pub fn invoke_demo(&mut self, input: &str) -> Result<String> {
        if self.state != SessionState::Initialized {
            return self.fail(Error::NotInitialized);
        }
        match self.demo.invoke(&mut self.kernel, input) {
            Ok(output) => {
                self.demo_output = Some(output.clone());
                self.last_error = None;
                let _ = self.refresh_status();
                Ok(output)
            }
            Err(e) => {
                // Whatever the buffer held is not trustworthy output.
                self.demo_output = None;
                self.fail(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // IPC
    // ------------------------------------------------------------------

    /// Send a message to a kernel thread.
    pub fn send_message(&mut self, target: u32, message: &IpcMessage) -> Result<()> {
        if self.state != SessionState::Initialized {
            return self.fail(Error::NotInitialized);
        }
        let raw = message.to_raw();
        if let Err(e) = check(self.kernel.ipc_send(target, &raw)) {
            return self.fail(e);
        }
        debug!(thread = target, msg_id = message.msg_id, "ipc message sent");
        self.last_error = None;
        Ok(())
    }

    /// Receive a pending message, returning the sender id alongside it.
    pub fn receive_message(&mut self) -> Result<(u32, IpcMessage)> {
        if self.state != SessionState::Initialized {
            return self.fail(Error::NotInitialized);
        }
        let mut sender: u32 = 0;
        let mut raw = RawMessage::default();
        if let Err(e) = check(self.kernel.ipc_receive(&mut sender, &mut raw)) {
            return self.fail(e);
        }
        self.last_error = None;
        Ok((sender, IpcMessage::from_raw(&raw)))
    }

    // ------------------------------------------------------------------
    // Passive surface
    // ------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == SessionState::Initialized
    }

    /// Cached snapshot from the last successful refresh, if any.
    pub fn status(&self) -> Option<&StatusSnapshot> {
        self.status.as_ref()
    }

    /// The most recent failed operation's error, until cleared or
    /// superseded by a success.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn last_demo_output(&self) -> Option<&str> {
        self.demo_output.as_deref()
    }

    /// Publish an immutable view of the whole session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            initialized: self.is_initialized(),
            status: self.status.clone(),
            threads: self.registry.list().to_vec(),
            last_error: self.last_error.as_ref().map(|e| e.to_string()),
            demo_output: self.demo_output.clone(),
        }
    }

    fn fail<T>(&mut self, err: Error) -> Result<T> {
        self.last_error = Some(err.clone());
        Err(err)
    }
}

impl<K: Kernel> Drop for KernelSession<K> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
