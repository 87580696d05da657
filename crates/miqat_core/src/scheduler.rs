//! Refresh scheduling.
//!
//! After a successful cycle the next refresh is armed at the local day
//! boundary (or just after the resolved Midnight if that already passed).
//! After a failed cycle a retry is armed a minute later instead. Only one
//! trigger is ever pending. An hourly refresh runs alongside and re-arms the
//! trigger from the wall clock, so a trigger delayed by a suspended host is
//! corrected within the hour.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use futures::future::BoxFuture;
use miqat_calendar::local;
use serde::Serialize;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;

use crate::clock::Clock;
use crate::timer::OneShotTimer;

pub const RETRY_DELAY_SECS: i64 = 60;

/// Period of the background refresh.
pub const UPDATE_INTERVAL_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Midnight,
    Retry,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::Midnight => f.write_str("midnight"),
            TriggerKind::Retry => f.write_str("retry"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduledTrigger {
    pub at: DateTime<Utc>,
    pub kind: TriggerKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Scheduled(ScheduledTrigger),
}

/// When to refresh after a successful cycle.
///
/// With the cycle's Midnight `m`: if `now` is already past it, one day and
/// one minute after `m`; otherwise the start of tomorrow in `tz`. Without a
/// Midnight, the start of tomorrow.
pub fn next_update_at(now: DateTime<Utc>, midnight: Option<DateTime<Utc>>, tz: Tz) -> DateTime<Utc> {
    match midnight {
        Some(m) if now > m => m + Duration::days(1) + Duration::minutes(1),
        _ => start_of_tomorrow(now, tz),
    }
}

fn start_of_tomorrow(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    local::local_date(now, tz)
        .succ_opt()
        .and_then(|tomorrow| local::localize(tomorrow.and_time(NaiveTime::MIN), tz))
        .unwrap_or_else(|| local::start_of_local_day(now + Duration::days(1), tz))
}

/// Arms refresh triggers on a [`OneShotTimer`] and owns the periodic
/// refresh task.
pub struct RefreshScheduler {
    clock: Arc<dyn Clock>,
    timer: OneShotTimer<TriggerKind>,
    periodic: Mutex<Option<AbortHandle>>,
}

impl RefreshScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            timer: OneShotTimer::new(clock.clone()),
            clock,
            periodic: Mutex::new(None),
        }
    }

    /// Runs the future made by `tick` every `period`, the first time one
    /// period from now. Replaces a running periodic refresh. The task ends
    /// when stopped or when `tick` returns `None`.
    pub fn start_periodic<F>(&self, period: std::time::Duration, tick: F)
    where
        F: Fn() -> Option<BoxFuture<'static, ()>> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let Some(task) = tick() else { break };
                tracing::debug!("Periodic prayer time update");
                task.await;
            }
        })
        .abort_handle();

        let previous = self
            .periodic
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
        tracing::debug!(every_secs = period.as_secs(), "Periodic prayer time update started");
    }

    /// Stops the periodic refresh. Idempotent.
    pub fn stop_periodic(&self) -> bool {
        let handle = self.periodic.lock().unwrap_or_else(PoisonError::into_inner).take();
        match handle {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }


    /// Replaces any pending trigger with the next regular refresh.
    pub fn schedule_next(&self, midnight: Option<DateTime<Utc>>, tz: Tz, task: BoxFuture<'static, ()>) -> ScheduledTrigger {
        let at = next_update_at(self.clock.now(), midnight, tz);
        self.arm(ScheduledTrigger { at, kind: TriggerKind::Midnight }, task)
    }

    /// Replaces any pending trigger with a retry one minute from now.
    pub fn schedule_retry(&self, task: BoxFuture<'static, ()>) -> ScheduledTrigger {
        let at = self.clock.now() + Duration::seconds(RETRY_DELAY_SECS);
        self.arm(ScheduledTrigger { at, kind: TriggerKind::Retry }, task)
    }

    fn arm(&self, trigger: ScheduledTrigger, task: BoxFuture<'static, ()>) -> ScheduledTrigger {
        self.timer.arm(trigger.at, trigger.kind, task);
        tracing::info!(at = %trigger.at, kind = %trigger.kind, "Next prayer time update scheduled");
        trigger
    }

    pub fn cancel(&self) -> bool {
        let cancelled = self.timer.cancel();
        if cancelled {
            tracing::debug!("Pending prayer time update cancelled");
        }
        cancelled
    }

    pub fn pending(&self) -> Option<ScheduledTrigger> {
        self.timer.armed().map(|(at, kind)| ScheduledTrigger { at, kind })
    }

    pub fn state(&self) -> SchedulerState {
        match self.pending() {
            Some(trigger) => SchedulerState::Scheduled(trigger),
            None => SchedulerState::Idle,
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop_periodic();
    }
}
