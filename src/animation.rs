//! Animation Driver - reveals the curve one segment per tick
//!
//! `Idle` or `Running`; there is no boolean-plus-timer pair to get out of
//! sync. Callers own the clock: they pass `now` in and ask when the next
//! tick is due, so the same driver runs under egui repaints and tokio
//! intervals alike.

use std::time::{Duration, Instant};

use crate::curve::CurveParams;

/// What the caller should do after a due tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Draw the first `n` segments
    Frame(usize),
    /// Last prefix reached, run complete; draw the full static view
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// Parameters frozen at start
    pub snapshot: CurveParams,
    /// Segments currently on screen
    pub revealed: usize,
    pub total: usize,
    next: usize,
    interval: Duration,
    next_tick: Instant,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Animation {
    #[default]
    Idle,
    Running(Run),
}

impl Animation {
    /// Idle → Running; ignored (returns false) while already running
    pub fn start(&mut self, snapshot: CurveParams, total: usize, now: Instant) -> bool {
        if let Animation::Running(_) = self {
            tracing::debug!("Animation already running, start ignored");
            return false;
        }

        tracing::info!(
            "Animation started: {} segments at {} segments/s",
            total,
            snapshot.speed
        );
        *self = Animation::Running(Run {
            interval: snapshot.tick_interval(),
            snapshot,
            revealed: 0,
            total,
            next: 0,
            next_tick: now,
        });
        true
    }

    /// Running → Idle immediately; returns whether a run was cancelled
    pub fn cancel(&mut self) -> bool {
        match self {
            Animation::Running(run) => {
                tracing::info!("Animation cancelled at {}/{}", run.revealed, run.total);
                *self = Animation::Idle;
                true
            }
            Animation::Idle => false,
        }
    }

    /// Fire the tick if it is due
    ///
    /// The following tick is scheduled one interval after `now`, so frames
    /// never pile up behind a slow draw.
    pub fn poll(&mut self, now: Instant) -> Option<Tick> {
        let Animation::Running(run) = self else {
            return None;
        };
        if now < run.next_tick {
            return None;
        }

        let frame = run.next;
        run.next += 1;
        if run.next > run.total {
            tracing::info!("Animation finished: {} segments", run.total);
            *self = Animation::Idle;
            return Some(Tick::Finished);
        }

        run.revealed = frame;
        run.next_tick = now + run.interval;
        Some(Tick::Frame(frame))
    }

    /// Time left until the next tick, `None` when idle
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        match self {
            Animation::Running(run) => Some(run.next_tick.saturating_duration_since(now)),
            Animation::Idle => None,
        }
    }

    /// Revealed segment count, `None` when not animating
    pub fn progress(&self) -> Option<usize> {
        match self {
            Animation::Running(run) => Some(run.revealed),
            Animation::Idle => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Animation::Running(_))
    }

    /// Parameter controls are editable only while idle
    pub fn controls_enabled(&self) -> bool {
        !self.is_running()
    }
}
