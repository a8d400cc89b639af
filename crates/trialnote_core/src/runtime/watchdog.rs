//! Trial window enforcement.
//!
//! # Invariants
//! - The trial clock is immutable and measured on the monotonic clock.
//! - Expiry is detected at the first check at or after `start + duration`,
//!   so the observed lifetime overshoots by at most one check interval.
//! - On expiry the terminator runs exactly once; `ProcessTerminator` ends the
//!   process without flushing the note store. Unsaved edits since the last
//!   autosave tick are lost.

use crate::logging::flush_logs;
use crate::model::owner::Owner;
use log::{debug, info};
use std::io::Write;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const WATCHDOG_THREAD_NAME: &str = "trialnote-watchdog";
pub const TRIAL_EXPIRED_EXIT_CODE: i32 = 0;
pub const TRIAL_EXPIRED_NOTICE: &str =
    "The trial period has ended. Purchase a license key to continue using trialnote.";

/// Immutable trial window anchored at a monotonic instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialClock {
    start: Instant,
    duration: Duration,
}

impl TrialClock {
    pub fn new(start: Instant, duration: Duration) -> Self {
        Self { start, duration }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// `None` when `start + duration` overflows the platform clock.
    pub fn deadline(&self) -> Option<Instant> {
        self.start.checked_add(self.duration)
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.duration
    }

    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.duration
            .saturating_sub(now.saturating_duration_since(self.start))
    }
}

/// Outcome of one watchdog check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogStatus {
    Active { remaining: Duration },
    Expired,
}

/// Action taken once the trial window has elapsed.
pub trait Terminator: Send + 'static {
    /// Called once with the user-facing notice.
    fn terminate(&self, notice: &str);
}

/// Prints the notice and exits the process immediately.
///
/// Uses `std::process::exit`, which skips destructors and never returns to
/// the interactive loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessTerminator;

impl Terminator for ProcessTerminator {
    fn terminate(&self, notice: &str) {
        let mut stdout = std::io::stdout();
        let _ = writeln!(stdout, "\n{notice}");
        let _ = stdout.flush();
        flush_logs();
        std::process::exit(TRIAL_EXPIRED_EXIT_CODE);
    }
}

/// Periodically compares elapsed time against the trial window.
pub struct TrialWatchdog<T: Terminator> {
    clock: TrialClock,
    interval: Duration,
    owner: Owner,
    terminator: T,
}

impl<T: Terminator> TrialWatchdog<T> {
    pub fn new(clock: TrialClock, interval: Duration, owner: Owner, terminator: T) -> Self {
        Self {
            clock,
            interval,
            owner,
            terminator,
        }
    }

    pub fn clock(&self) -> &TrialClock {
        &self.clock
    }

    pub fn check_at(&self, now: Instant) -> WatchdogStatus {
        if self.clock.is_expired_at(now) {
            WatchdogStatus::Expired
        } else {
            WatchdogStatus::Active {
                remaining: self.clock.remaining_at(now),
            }
        }
    }

    /// Moves the watchdog onto a detached background thread.
    ///
    /// The thread ends only after the terminator returns, which
    /// `ProcessTerminator` never does.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(WATCHDOG_THREAD_NAME.to_string())
            .spawn(move || self.run())
    }

    fn run(&self) {
        loop {
            match self.check_at(Instant::now()) {
                WatchdogStatus::Expired => {
                    info!(
                        "event=trial_expired module=runtime status=ok owner={} trial_secs={}",
                        self.owner,
                        self.clock.duration.as_secs()
                    );
                    self.terminator.terminate(TRIAL_EXPIRED_NOTICE);
                    return;
                }
                WatchdogStatus::Active { remaining } => {
                    debug!(
                        "event=trial_check module=runtime status=active owner={} remaining_secs={}",
                        self.owner,
                        remaining.as_secs()
                    );
                }
            }
            thread::sleep(self.interval);
        }
    }
}
