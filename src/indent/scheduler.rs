//! Debounced scheduling of re-indentation passes
//!
//! The scheduler coalesces bursts of buffer changes into a single deadline
//! that lies one quiet period after the last change. It is polled from the
//! UI frame loop; nothing here spawns threads or timers.
//!
//! # State machine
//!
//! ```text
//!            notify_change            deadline passed
//!   Idle ───────────────────► Scheduled ──────────────► Running ──► Idle
//!                              │    ▲   (begin_pass)        (guard drop)
//!                              └────┘
//!                          notify_change (deadline reset)
//! ```
//!
//! While `Running`, change notifications are swallowed so a pass never
//! schedules itself.

use super::session::ChangeEvent;
use log::trace;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default idle time after the last edit before a pass runs.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Background re-indentation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentConfig {
    /// Whether edits schedule a background pass at all
    pub background_auto_indent: bool,
    /// Idle time after the last edit before the pass runs
    pub quiet_period: Duration,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            background_auto_indent: true,
            quiet_period: DEFAULT_QUIET_PERIOD,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clock
// ─────────────────────────────────────────────────────────────────────────────

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scheduler
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle of the background re-indentation for one editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerPhase {
    /// Nothing pending
    #[default]
    Idle,
    /// A pass is due at the current deadline
    Scheduled,
    /// A pass is mutating the buffer
    Running,
}

/// Single-deadline debouncer with a reentrancy guard.
///
/// All state lives in `Cell`s so the scheduler can be shared (via `Rc`)
/// between the engine and the session's change listener on the UI thread.
pub struct DebounceScheduler {
    clock: Rc<dyn Clock>,
    enabled: Cell<bool>,
    quiet_period: Cell<Duration>,
    phase: Cell<SchedulerPhase>,
    deadline: Cell<Option<Instant>>,
    /// Notifications swallowed because a pass was running
    suppressed: Cell<u64>,
}

impl DebounceScheduler {
    pub fn new(config: IndentConfig, clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            enabled: Cell::new(config.background_auto_indent),
            quiet_period: Cell::new(config.quiet_period),
            phase: Cell::new(SchedulerPhase::Idle),
            deadline: Cell::new(None),
            suppressed: Cell::new(0),
        }
    }

    /// Record a buffer change: (re)arm the deadline one quiet period from now.
    ///
    /// No-op when background indentation is disabled or a pass is running.
    pub fn notify_change(&self, event: &ChangeEvent) {
        if !self.enabled.get() {
            return;
        }

        if self.phase.get() == SchedulerPhase::Running {
            self.suppressed.set(self.suppressed.get() + 1);
            trace!(
                "Suppressed {:?} of rows {}..={} during reindent pass",
                event.kind,
                event.first_row,
                event.last_row
            );
            return;
        }

        self.deadline
            .set(Some(self.clock.now() + self.quiet_period.get()));
        self.phase.set(SchedulerPhase::Scheduled);
    }

    /// Whether a scheduled pass has reached its deadline.
    pub fn is_due(&self) -> bool {
        self.phase.get() == SchedulerPhase::Scheduled
            && self
                .deadline
                .get()
                .is_some_and(|deadline| self.clock.now() >= deadline)
    }

    /// Time left until the scheduled pass is due, if one is scheduled.
    pub fn time_until_due(&self) -> Option<Duration> {
        if self.phase.get() != SchedulerPhase::Scheduled {
            return None;
        }
        self.deadline
            .get()
            .map(|deadline| deadline.saturating_duration_since(self.clock.now()))
    }

    /// Drop a pending deadline.
    pub fn cancel(&self) {
        if self.phase.get() == SchedulerPhase::Scheduled {
            self.phase.set(SchedulerPhase::Idle);
        }
        self.deadline.set(None);
    }

    /// Enter `Running`. Returns `None` if a pass is already running.
    ///
    /// Any pending deadline is consumed; the phase returns to `Idle` when the
    /// guard is dropped.
    pub fn begin_pass(&self) -> Option<PassGuard<'_>> {
        if self.phase.get() == SchedulerPhase::Running {
            return None;
        }
        self.deadline.set(None);
        self.phase.set(SchedulerPhase::Running);
        Some(PassGuard { scheduler: self })
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase.get()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.get()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Turn background scheduling on or off. Disabling drops a pending deadline.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
        if !enabled {
            self.cancel();
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period.get()
    }

    /// Change the quiet period. Applies from the next notification on.
    pub fn set_quiet_period(&self, quiet_period: Duration) {
        self.quiet_period.set(quiet_period);
    }

    pub fn suppressed_notifications(&self) -> u64 {
        self.suppressed.get()
    }
}

/// Holds the scheduler in `Running`; returns it to `Idle` on drop.
#[must_use = "the pass ends when the guard is dropped"]
pub struct PassGuard<'a> {
    scheduler: &'a DebounceScheduler,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.scheduler.phase.set(SchedulerPhase::Idle);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test Support
// ─────────────────────────────────────────────────────────────────────────────

/// Hand-driven clock for deterministic timing tests.
#[cfg(test)]
pub(crate) struct ManualClock {
    now: Cell<Instant>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
