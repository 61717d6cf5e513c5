//! Time-driven scalar animation synchronised to an output's frame clock.
//!
//! An [`Animation`] interpolates one `f32` from a start value to a target
//! over a duration.  It does not own a timer: while running it holds a
//! [`FrameSubscription`] on the output it was started on, and whoever owns
//! the animation forwards that output's frame ticks to [`Animation::tick`].
//!
//! # Lifecycle
//!
//! ```text
//! idle ──run()──► running ──tick(t ≥ 1)──► idle   (updated, done)
//!                    │
//!                    └──stop()──► idle            (no done)
//! ```
//!
//! The first tick after [`run`](Animation::run) is elapsed time zero, so a
//! run always begins exactly at the start value.

use crate::curve::Curve;
use crate::output::{FrameSubscription, Output};
use crate::signal::Signal;

/// Options for a single [`Animation::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunFlags {
    #[default]
    None,
    /// The owner should forward completion to its client.  The `done`
    /// signal fires either way; this only flags the side channel.
    SendDone,
}

/// One interpolated value produced by a frame tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f32,
    /// `true` on the tick that reached the target and ended the run.
    pub finished: bool,
}

#[derive(Debug)]
struct ActiveRun {
    subscription: FrameSubscription,
    started_at: Option<u32>,
}

/// Drives a scalar from `start` to `target`.
#[derive(Debug)]
pub struct Animation {
    start: f32,
    target: f32,
    duration: u32,
    value: f32,
    curve: Curve,
    flags: RunFlags,
    active: Option<ActiveRun>,
    updated: Signal<f32>,
    done: Signal<()>,
}

impl Animation {
    pub fn new() -> Self {
        Self {
            start: 0.0,
            target: 0.0,
            duration: 0,
            value: 0.0,
            curve: Curve::Linear,
            flags: RunFlags::None,
            active: None,
            updated: Signal::new(),
            done: Signal::new(),
        }
    }

    pub fn set_start(&mut self, value: f32) {
        self.start = value;
    }

    pub fn set_target(&mut self, value: f32) {
        self.target = value;
    }

    pub fn set_curve(&mut self, curve: Curve) {
        self.curve = curve;
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Last value emitted (the start value before the first tick).
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Start (or restart) the animation on `output`.
    ///
    /// A running animation drops its previous subscription first and starts
    /// timing from scratch with the current start/target; trajectories are
    /// never blended.
    pub fn run(&mut self, output: &Output, duration: u32, flags: RunFlags) {
        self.active = None;
        self.duration = duration;
        self.flags = flags;
        self.value = self.start;
        self.active = Some(ActiveRun {
            subscription: output.clock().subscribe(),
            started_at: None,
        });
    }

    /// Unsubscribe immediately.
    ///
    /// The value stays wherever the last tick left it and `done` is **not**
    /// emitted.
    pub fn stop(&mut self) {
        self.active = None;
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the current (or last) run asked for a client-side done event.
    pub fn sends_done(&self) -> bool {
        self.flags == RunFlags::SendDone
    }

    /// Advance on a frame of `output` presented at `now` (milliseconds).
    ///
    /// Frames from outputs this animation is not subscribed to are ignored,
    /// as are ticks while idle.
    pub fn tick(&mut self, output: &Output, now: u32) -> Option<Sample> {
        let run = self.active.as_mut()?;
        if !run.subscription.is_on(output.clock()) {
            return None;
        }
        let started = *run.started_at.get_or_insert(now);
        let elapsed = now.wrapping_sub(started);

        let t = if self.duration == 0 {
            1.0
        } else {
            (elapsed as f32 / self.duration as f32).clamp(0.0, 1.0)
        };
        let finished = t >= 1.0;
        self.value = if finished {
            self.target
        } else {
            self.start + (self.target - self.start) * self.curve.apply(t)
        };

        self.updated.emit(&self.value);
        if finished {
            self.active = None;
            self.done.emit(&());
        }
        Some(Sample {
            value: self.value,
            finished,
        })
    }

    /// Subscribe to per-tick values.
    ///
    /// Owners read the same value from [`tick`](Self::tick); this signal is
    /// for observers outside the ownership chain.
    pub fn updated(&mut self) -> &mut Signal<f32> {
        &mut self.updated
    }

    /// Subscribe to natural completion.
    ///
    /// Owners see completion through [`is_running`](Self::is_running)
    /// after a tick; this signal is for observers outside the ownership
    /// chain.  [`stop`](Self::stop) never fires it.
    pub fn done(&mut self) -> &mut Signal<()> {
        &mut self.done
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies the scalar state only.  A copy of a running animation is idle and
/// has no subscribers, so the original's frame subscription is never
/// duplicated.
impl Clone for Animation {
    fn clone(&self) -> Self {
        Self {
            start: self.start,
            target: self.target,
            duration: self.duration,
            value: self.value,
            curve: self.curve,
            flags: self.flags,
            active: None,
            updated: Signal::new(),
            done: Signal::new(),
        }
    }
}
