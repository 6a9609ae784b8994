//! Wall-clock timebase.
//!
//! Sleeps are `async-io-mini` timers, so a sleeping task yields the
//! executor instead of blocking the thread.
//!
//! - **`target_os = "espidf"`**: `now_ms` wraps `esp_timer_get_time()`
//!   (microsecond precision, monotonic since boot).
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` for
//!   host-side runs.

use core::future::Future;
use core::time::Duration;

use crate::app::ports::Timebase;

pub struct IoTimebase {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for IoTimebase {
    fn default() -> Self {
        Self::new()
    }
}

impl IoTimebase {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl Timebase for IoTimebase {
    #[cfg(target_os = "espidf")]
    fn now_ms(&self) -> u64 {
        // SAFETY: read-only access to the free-running esp_timer counter.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    #[cfg(not(target_os = "espidf"))]
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn sleep_ms(&self, ms: u32) -> impl Future<Output = ()> + '_ {
        async move {
            async_io_mini::Timer::after(Duration::from_millis(u64::from(ms))).await;
        }
    }
}
