//! Outputs and their frame clocks.
//!
//! An [`Output`] is one display the shell renders to.  Each output owns a
//! [`FrameClock`]: animations subscribe to it while they run, and the
//! compositor keeps scheduling repaints of that output as long as the clock
//! has subscribers.

use glam::Vec2;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Default)]
struct ClockState {
    subscribers: Vec<u64>,
    next_id: u64,
    last_frame: Option<u32>,
}

/// Per-output frame-tick subscription registry.
///
/// Cloning a clock yields another handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    inner: Rc<RefCell<ClockState>>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new frame-tick subscriber.
    ///
    /// The subscription lasts until the returned handle is dropped.
    pub fn subscribe(&self) -> FrameSubscription {
        let mut state = self.inner.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push(id);
        FrameSubscription {
            clock: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    pub fn has_subscribers(&self) -> bool {
        self.subscriber_count() > 0
    }

    /// Record that the output presented a frame at `time` (milliseconds).
    pub fn frame(&self, time: u32) {
        self.inner.borrow_mut().last_frame = Some(time);
    }

    /// Timestamp of the most recent frame, if any has been presented.
    pub fn last_frame(&self) -> Option<u32> {
        self.inner.borrow().last_frame
    }

    fn same_clock(&self, weak: &Weak<RefCell<ClockState>>) -> bool {
        weak.upgrade()
            .is_some_and(|rc| Rc::ptr_eq(&rc, &self.inner))
    }
}

/// A live frame-tick subscription.  Dropping it unsubscribes.
#[derive(Debug)]
pub struct FrameSubscription {
    clock: Weak<RefCell<ClockState>>,
    id: u64,
}

impl FrameSubscription {
    /// Whether this subscription belongs to `clock`.
    pub fn is_on(&self, clock: &FrameClock) -> bool {
        clock.same_clock(&self.clock)
    }
}

impl Drop for FrameSubscription {
    fn drop(&mut self) {
        if let Some(state) = self.clock.upgrade() {
            state.borrow_mut().subscribers.retain(|id| *id != self.id);
        }
    }
}

/// One display the shell renders to.
#[derive(Debug, Clone)]
pub struct Output {
    /// Name the compositor uses for this output (e.g. `"DP-1"`).
    pub name: String,
    /// X position on the virtual desktop (pixels).
    pub x: i32,
    /// Y position on the virtual desktop (pixels).
    pub y: i32,
    /// Horizontal resolution in pixels.
    pub width: u32,
    /// Vertical resolution in pixels.
    pub height: u32,
    clock: FrameClock,
}

impl Output {
    pub fn new(name: impl Into<String>, x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            width,
            height,
            clock: FrameClock::new(),
        }
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Output size as a float vector, for layout arithmetic.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_subscription_unsubscribes() {
        let clock = FrameClock::new();
        let a = clock.subscribe();
        let b = clock.subscribe();
        assert_eq!(clock.subscriber_count(), 2);
        drop(a);
        assert_eq!(clock.subscriber_count(), 1);
        drop(b);
        assert!(!clock.has_subscribers());
    }

    #[test]
    fn cloned_output_shares_clock() {
        let out = Output::new("DP-1", 0, 0, 1920, 1080);
        let copy = out.clone();
        let _sub = out.clock().subscribe();
        assert_eq!(copy.clock().subscriber_count(), 1);
    }

    #[test]
    fn subscription_knows_its_clock() {
        let a = Output::new("A", 0, 0, 10, 10);
        let b = Output::new("B", 0, 0, 10, 10);
        let sub = a.clock().subscribe();
        assert!(sub.is_on(a.clock()));
        assert!(!sub.is_on(b.clock()));
    }

    #[test]
    fn frame_records_timestamp() {
        let clock = FrameClock::new();
        assert_eq!(clock.last_frame(), None);
        clock.frame(42);
        assert_eq!(clock.last_frame(), Some(42));
    }
}
