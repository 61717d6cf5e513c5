//! Dragging a window across workspaces.
//!
//! The dragged surface leaves its workspace for the scene's limbo layer and
//! follows the pointer in screen space.  Holding the pointer against the
//! left or right output edge for [`edge_dwell_ms`] switches to the
//! previous or next workspace; the pointer is then warped to the opposite
//! side and a slide transform carries the window (and the cursor sprite)
//! across, in step with the workspaces sliding underneath.
//!
//! [`edge_dwell_ms`]: crate::config::MoveGrabConfig::edge_dwell_ms

use super::{GrabContext, GrabStatus, PointerGrab};
use crate::command::ButtonState;
use crate::config::MoveGrabConfig;
use crate::output::Output;
use crate::scene::SurfaceId;
use crate::transform::Transform;
use glam::Vec2;
use log::{debug, info};

/// Output edge the pointer is dwelling against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
}

/// Grab state while a window is being dragged.
#[derive(Debug)]
pub struct MoveGrab {
    surface: SurfaceId,
    output: Output,
    /// Surface origin relative to the pointer.
    offset: Vec2,
    /// Edge being dwelt on and when the dwell started.
    dwell: Option<(Edge, u32)>,
    /// Carries the window across after a workspace switch.  Its target
    /// translation is the pointer position the window is measured from.
    slide: Transform,
    config: MoveGrabConfig,
}

impl MoveGrab {
    /// Start dragging `surface` from the current pointer position.
    ///
    /// Returns `None` if the surface does not exist.
    pub fn start(
        ctx: &mut GrabContext<'_>,
        surface: SurfaceId,
        config: &MoveGrabConfig,
    ) -> Option<Self> {
        let local = ctx.scene.position(surface)?;
        let screen = ctx
            .scene
            .workspace_of(surface)
            .and_then(|n| ctx.pager.workspace(n))
            .map_or(local, |ws| ws.to_screen(local));

        let grab_point = ctx.pointer.position();
        ctx.pointer.set_grab_point(grab_point);

        ctx.pager.detach_surface(ctx.scene, surface);
        ctx.scene.put_in_limbo(surface);
        ctx.scene.set_position(surface, screen);

        let mut slide = Transform::new();
        slide.set_curve(ctx.pager.curve());
        slide.translate(grab_point.x, grab_point.y, 0.0);
        slide.apply();

        debug!("move grab started for surface {}", surface.raw());
        Some(Self {
            surface,
            output: ctx.pager.output().clone(),
            offset: screen - grab_point,
            dwell: None,
            slide,
            config: config.clone(),
        })
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Edge the pointer is currently dwelling on, with the dwell start.
    pub fn dwell(&self) -> Option<(Edge, u32)> {
        self.dwell
    }

    pub fn is_sliding(&self) -> bool {
        self.slide.is_animating()
    }

    fn edge_at(&self, x: f32) -> Option<Edge> {
        let width = self.output.width as f32;
        if x < self.config.edge_margin {
            Some(Edge::Left)
        } else if x >= width - self.config.edge_margin {
            Some(Edge::Right)
        } else {
            None
        }
    }

    /// Select the neighbouring workspace and warp the pointer to the
    /// opposite edge.
    fn switch(&mut self, ctx: &mut GrabContext<'_>, edge: Edge) {
        let from = ctx.pointer.position();
        let shift = self.output.width as f32 - self.config.warp_inset;
        match edge {
            Edge::Right => {
                ctx.pager.select_next_workspace(ctx.scene);
                ctx.pointer.warp(-shift, 0.0);
            }
            Edge::Left => {
                ctx.pager.select_previous_workspace(ctx.scene);
                ctx.pointer.warp(shift, 0.0);
            }
        }
        let to = ctx.pointer.position();
        info!(
            "dwelled on {:?} edge, now on workspace {}",
            edge,
            ctx.pager.current_index()
        );

        self.slide.reset();
        self.slide.translate(from.x, from.y, 0.0);
        self.slide.apply();
        self.slide.reset();
        self.slide.translate(to.x, to.y, 0.0);
        self.slide.animate(&self.output, ctx.pager.slide_duration());
        self.dwell = None;
    }

    /// Place the window and sprite: the in-flight slide position plus
    /// however far the pointer has moved from the slide target.
    fn reposition(&self, ctx: &mut GrabContext<'_>) {
        let current = self.slide.current_translation().truncate();
        let target = self.slide.target_translation().truncate();
        let at = current + (ctx.pointer.position() - target);

        ctx.scene.set_position(self.surface, at + self.offset);
        ctx.scene.damage(self.surface);
        ctx.scene.schedule_repaint();
        let hotspot = ctx.pointer.hotspot();
        ctx.pointer.set_sprite_position(at - hotspot);
    }

    /// Drop the window onto the current workspace, keeping its screen
    /// position.
    fn finish(&mut self, ctx: &mut GrabContext<'_>) -> GrabStatus {
        self.slide.stop();
        let screen = ctx.scene.position(self.surface).unwrap_or_default();
        let ws = ctx.pager.current_workspace_mut();
        let local = ws.to_local(screen);
        ws.add_surface(ctx.scene, self.surface);
        ctx.scene.set_position(self.surface, local);
        let position = ctx.pointer.position();
        ctx.pointer.motion_to(position);

        info!(
            "surface {} dropped on workspace {}",
            self.surface.raw(),
            ctx.pager.current_index()
        );
        GrabStatus::MoveEnded(self.surface)
    }
}

impl PointerGrab for MoveGrab {
    fn motion(&mut self, ctx: &mut GrabContext<'_>, time: u32) -> GrabStatus {
        match self.edge_at(ctx.pointer.position().x) {
            None => {
                if self.dwell.take().is_some() {
                    debug!("left edge zone, dwell reset");
                }
            }
            Some(edge) => {
                let started = match self.dwell {
                    Some((e, start)) if e == edge => start,
                    _ => {
                        self.dwell = Some((edge, time));
                        time
                    }
                };
                if time.wrapping_sub(started) >= self.config.edge_dwell_ms {
                    self.switch(ctx, edge);
                }
            }
        }
        self.reposition(ctx);
        GrabStatus::Continue
    }

    fn button(
        &mut self,
        ctx: &mut GrabContext<'_>,
        _time: u32,
        _button: u32,
        _state: ButtonState,
    ) -> GrabStatus {
        if ctx.pointer.button_count() > 0 {
            return GrabStatus::Continue;
        }
        self.finish(ctx)
    }

    fn frame(&mut self, ctx: &mut GrabContext<'_>, now: u32) -> GrabStatus {
        if self.slide.tick(&self.output, now) {
            self.reposition(ctx);
        }
        GrabStatus::Continue
    }
}
