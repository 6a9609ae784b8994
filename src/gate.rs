//! Readiness gate: process-wide "device is connected and announced"
//! condition, driven by the orchestrator and awaited by every task.
//!
//! The gate flips from not-ready to ready once per connection session.
//! Tasks await it once at start; a disconnect (`set_not_ready`) re-arms it
//! for anything that awaits it again later, and the session counter lets
//! callers tell sessions apart.
//!
//! Waiters are kept in an `embassy-sync` multi-waker registry behind a
//! blocking mutex. `NoopRawMutex` matches the single-threaded executor;
//! a preemptive port swaps in `CriticalSectionRawMutex`.

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::waitqueue::MultiWakerRegistration;
use log::info;

/// Registry slots. Overflow wakes everyone, so this bounds memory only.
const MAX_WAITERS: usize = 8;

struct GateState {
    ready: bool,
    session: u32,
    waiters: MultiWakerRegistration<MAX_WAITERS>,
}

pub struct ReadinessGate {
    inner: Mutex<NoopRawMutex, RefCell<GateState>>,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessGate {
    /// A gate in the not-ready state.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(GateState {
                ready: false,
                session: 0,
                waiters: MultiWakerRegistration::new(),
            })),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.inner.lock(|s| s.borrow().ready)
    }

    /// Number of not-ready → ready transitions so far.
    pub fn session(&self) -> u32 {
        self.inner.lock(|s| s.borrow().session)
    }

    /// Mark the device ready and wake every waiting task.
    pub fn set_ready(&self) {
        self.inner.lock(|s| {
            let mut s = s.borrow_mut();
            if s.ready {
                return;
            }
            s.ready = true;
            s.session = s.session.wrapping_add(1);
            info!("gate: ready (session {})", s.session);
            s.waiters.wake();
        });
    }

    /// Connection lost. Tasks already past the gate keep running.
    pub fn set_not_ready(&self) {
        self.inner.lock(|s| {
            let mut s = s.borrow_mut();
            if s.ready {
                info!("gate: not ready (session {} ended)", s.session);
            }
            s.ready = false;
        });
    }

    /// Suspend until the gate is ready. Returns immediately if it already is.
    pub async fn wait_ready(&self) {
        poll_fn(|cx| {
            self.inner.lock(|s| {
                let mut s = s.borrow_mut();
                if s.ready {
                    Poll::Ready(())
                } else {
                    s.waiters.register(cx.waker());
                    Poll::Pending
                }
            })
        })
        .await;
    }
}
