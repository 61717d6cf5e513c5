//! Pointer state and exclusive pointer grabs.
//!
//! While a grab is active every pointer event goes to it instead of the
//! surface under the pointer.  There are two kinds, wrapped in the [`Grab`]
//! enum and driven through the [`PointerGrab`] trait:
//!
//! * [`MoveGrab`] drags one window, switching workspace when the pointer
//!   dwells at the left or right output edge;
//! * [`OverviewGrab`](crate::overview::OverviewGrab) picks a workspace or
//!   drags a window between cells of the grid overview.
//!
//! At most one grab exists at a time; the [`Desktop`](crate::desktop::Desktop)
//! holds it in an `Option` and drops it when a handler reports that it is
//! finished.

pub mod move_grab;

pub use move_grab::MoveGrab;

use crate::command::ButtonState;
use crate::overview::OverviewGrab;
use crate::pager::Pager;
use crate::scene::{Scene, SurfaceId};
use glam::Vec2;

/// The seat pointer: absolute position, held buttons and cursor sprite.
#[derive(Debug, Clone, Default)]
pub struct Pointer {
    position: Vec2,
    grab_point: Vec2,
    buttons: u32,
    hotspot: Vec2,
    sprite: Vec2,
}

impl Pointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Absolute motion.  The sprite follows unless a grab repositions it.
    pub fn motion_to(&mut self, position: Vec2) {
        self.position = position;
        self.sprite = position - self.hotspot;
    }

    /// Shift the pointer without a physical motion, e.g. to keep a dragged
    /// window in place while the workspaces slide under it.
    pub fn warp(&mut self, dx: f32, dy: f32) {
        self.motion_to(self.position + Vec2::new(dx, dy));
    }

    /// Track a button change.  Returns the number of buttons still held.
    pub fn button(&mut self, state: ButtonState) -> u32 {
        match state {
            ButtonState::Pressed => self.buttons += 1,
            ButtonState::Released => self.buttons = self.buttons.saturating_sub(1),
        }
        self.buttons
    }

    pub fn button_count(&self) -> u32 {
        self.buttons
    }

    /// Position at which the current grab started.
    pub fn grab_point(&self) -> Vec2 {
        self.grab_point
    }

    pub fn set_grab_point(&mut self, point: Vec2) {
        self.grab_point = point;
    }

    /// Offset of the hot pixel inside the cursor image.
    pub fn hotspot(&self) -> Vec2 {
        self.hotspot
    }

    pub fn set_hotspot(&mut self, hotspot: Vec2) {
        self.hotspot = hotspot;
        self.sprite = self.position - hotspot;
    }

    /// Top-left corner of the cursor image.
    pub fn sprite_position(&self) -> Vec2 {
        self.sprite
    }

    pub fn set_sprite_position(&mut self, position: Vec2) {
        self.sprite = position;
    }
}

/// Everything a grab handler may touch, borrowed from the desktop for the
/// duration of one event.
pub struct GrabContext<'a> {
    pub scene: &'a mut Scene,
    pub pager: &'a mut Pager,
    pub pointer: &'a mut Pointer,
}

/// What the desktop should do after a grab handled an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabStatus {
    /// Keep the grab.
    Continue,
    /// A dragged window was dropped onto the current workspace.
    MoveEnded(SurfaceId),
    /// Leave the grid overview.  `pick` is the workspace chosen by clicking
    /// a cell, if any.
    ExitOverview { pick: Option<usize> },
}

/// Pointer event handlers of a grab.
pub trait PointerGrab {
    /// The pointer moved to `ctx.pointer.position()` at `time` (ms).
    fn motion(&mut self, ctx: &mut GrabContext<'_>, time: u32) -> GrabStatus;

    /// A button changed state; `ctx.pointer` already reflects it.
    fn button(
        &mut self,
        ctx: &mut GrabContext<'_>,
        time: u32,
        button: u32,
        state: ButtonState,
    ) -> GrabStatus;

    /// The output presented a frame at `now` (ms).
    fn frame(&mut self, _ctx: &mut GrabContext<'_>, _now: u32) -> GrabStatus {
        GrabStatus::Continue
    }
}

/// The active grab.
#[derive(Debug)]
pub enum Grab {
    Move(MoveGrab),
    Overview(OverviewGrab),
}

impl Grab {
    pub fn is_move(&self) -> bool {
        matches!(self, Grab::Move(_))
    }

    pub fn is_overview(&self) -> bool {
        matches!(self, Grab::Overview(_))
    }
}

impl PointerGrab for Grab {
    fn motion(&mut self, ctx: &mut GrabContext<'_>, time: u32) -> GrabStatus {
        match self {
            Grab::Move(g) => g.motion(ctx, time),
            Grab::Overview(g) => g.motion(ctx, time),
        }
    }

    fn button(
        &mut self,
        ctx: &mut GrabContext<'_>,
        time: u32,
        button: u32,
        state: ButtonState,
    ) -> GrabStatus {
        match self {
            Grab::Move(g) => g.button(ctx, time, button, state),
            Grab::Overview(g) => g.button(ctx, time, button, state),
        }
    }

    fn frame(&mut self, ctx: &mut GrabContext<'_>, now: u32) -> GrabStatus {
        match self {
            Grab::Move(g) => g.frame(ctx, now),
            Grab::Overview(g) => g.frame(ctx, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_count_tracks_presses() {
        let mut p = Pointer::new();
        assert_eq!(p.button(ButtonState::Pressed), 1);
        assert_eq!(p.button(ButtonState::Pressed), 2);
        assert_eq!(p.button(ButtonState::Released), 1);
        assert_eq!(p.button(ButtonState::Released), 0);
        assert_eq!(p.button(ButtonState::Released), 0);
    }

    #[test]
    fn sprite_follows_hotspot() {
        let mut p = Pointer::new();
        p.set_hotspot(Vec2::new(4.0, 2.0));
        p.motion_to(Vec2::new(100.0, 50.0));
        assert_eq!(p.sprite_position(), Vec2::new(96.0, 48.0));
    }

    #[test]
    fn warp_moves_pointer_and_sprite() {
        let mut p = Pointer::new();
        p.motion_to(Vec2::new(999.0, 10.0));
        p.warp(-995.0, 0.0);
        assert_eq!(p.position(), Vec2::new(4.0, 10.0));
        assert_eq!(p.sprite_position(), Vec2::new(4.0, 10.0));
    }
}
