//! Grid overview: every workspace shrunk into a cell of one screen.
//!
//! Toggling the overview on hides the panels, installs an [`OverviewGrab`]
//! and animates each workspace into its grid cell.  While it is shown the
//! user can
//!
//! * click a cell to pick that workspace, or
//! * press on a window and drag it (past a small threshold) into another
//!   cell, which moves the window to that workspace.
//!
//! Either release leaves the overview: panels come back and the pending
//! workspace is selected, which slides every workspace back to full size.

use crate::command::ButtonState;
use crate::config::OverviewConfig;
use crate::grab::{Grab, GrabContext, GrabStatus, PointerGrab};
use crate::grid::GridLayout;
use crate::scene::SurfaceId;
use crate::traits::{Cursor, Shell};
use glam::{Mat4, Vec2, Vec3};
use log::{debug, info, warn};

/// Position inside a workspace shown at `origin` with `scale`, for a point
/// at `screen`.
pub fn to_cell_local(screen: Vec2, origin: Vec2, scale: f32) -> Vec2 {
    (screen - origin) / scale
}

/// Where a workspace member currently appears on screen.
fn screen_origin(ctx: &GrabContext<'_>, surface: SurfaceId) -> Option<Vec2> {
    let ws = ctx.pager.workspace(ctx.scene.workspace_of(surface)?)?;
    ws.screen_rect(ctx.scene, surface).map(|r| r.origin())
}

/// The overview effect: whether it is shown and which workspace it will
/// select on exit.
#[derive(Debug)]
pub struct GridOverview {
    active: bool,
    pending: usize,
    config: OverviewConfig,
}

impl GridOverview {
    pub fn new(config: &OverviewConfig) -> Self {
        Self {
            active: false,
            pending: 0,
            config: config.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Workspace selected when the overview exits.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn config(&self) -> &OverviewConfig {
        &self.config
    }

    /// Enter or leave the overview.
    ///
    /// `grab` is the desktop's grab slot.  Entering is refused while
    /// another grab holds the pointer or a fullscreen surface is shown.
    pub fn toggle<S: Shell + ?Sized>(
        &mut self,
        ctx: &mut GrabContext<'_>,
        shell: &S,
        grab: &mut Option<Grab>,
    ) {
        if self.active {
            if let Some(Grab::Overview(mut g)) = grab.take() {
                g.cancel(ctx);
            }
            self.exit(ctx, shell, None);
            return;
        }
        if grab.is_some() {
            warn!("overview toggle ignored, another grab is active");
            return;
        }
        if shell.in_fullscreen() {
            debug!("overview toggle ignored in fullscreen");
            return;
        }
        *grab = Some(Grab::Overview(self.enter(ctx, shell)));
    }

    /// Shrink every workspace into its cell and start the overview grab.
    fn enter<S: Shell + ?Sized>(&mut self, ctx: &mut GrabContext<'_>, shell: &S) -> OverviewGrab {
        shell.hide_panels();
        shell.set_cursor(Cursor::Arrow);
        self.active = true;
        self.pending = ctx.pager.current_index();

        let output = ctx.pager.output().clone();
        let layout = ctx.pager.layout();
        let cells = layout.overview(output.width, output.height, self.config.margin_divisor);
        let scale = cells.scale();
        let curve = ctx.pager.curve();

        for n in 0..ctx.pager.num_workspaces() {
            let Some(ws) = ctx.pager.workspace_mut(n) else {
                continue;
            };
            let origin = cells.cell_origin(n);
            let mut tr = ws.transform().clone();
            tr.reset();
            tr.scale(scale, scale, 1.0);
            tr.translate(origin.x, origin.y, 0.0);
            tr.set_curve(curve);
            tr.animate(&output, self.config.animation_ms);
            ws.set_transform(ctx.scene, tr);
        }

        let (cols, rows) = layout.dimensions();
        info!("overview shown: {}x{} grid at scale {:.3}", cols, rows, scale);
        OverviewGrab {
            layout,
            width: output.width,
            height: output.height,
            scale,
            pending: self.pending,
            threshold: self.config.drag_threshold,
            candidate: None,
            press: Vec2::ZERO,
            offset: Vec2::ZERO,
            moving: false,
        }
    }

    /// Leave the overview and select the pending workspace, or `pick` if
    /// a cell was clicked.
    pub fn exit<S: Shell + ?Sized>(
        &mut self,
        ctx: &mut GrabContext<'_>,
        shell: &S,
        pick: Option<usize>,
    ) {
        if !self.active {
            return;
        }
        if let Some(n) = pick {
            self.pending = n;
        }
        self.active = false;
        shell.show_panels();
        info!("overview hidden, selecting workspace {}", self.pending);
        ctx.pager.select_workspace(ctx.scene, self.pending);
    }
}

/// Pointer grab while the overview is shown.
#[derive(Debug)]
pub struct OverviewGrab {
    layout: GridLayout,
    width: u32,
    height: u32,
    scale: f32,
    pending: usize,
    threshold: f32,
    /// Window pressed on, if any.
    candidate: Option<SurfaceId>,
    press: Vec2,
    /// Window origin relative to the pointer, in screen space.
    offset: Vec2,
    /// Whether the candidate has been lifted out of its workspace.
    moving: bool,
}

impl OverviewGrab {
    /// Uniform scale of the workspaces in the grid.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn candidate(&self) -> Option<SurfaceId> {
        self.candidate
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Workspace whose cell is under `point`.
    fn cell_at(&self, point: Vec2) -> Option<usize> {
        self.layout.cell_at(point, self.width, self.height)
    }

    /// Take `surface` out of its workspace so it can follow the pointer,
    /// shrunk to match the grid.
    fn lift(&mut self, ctx: &mut GrabContext<'_>, surface: SurfaceId) {
        let screen = screen_origin(ctx, surface)
            .unwrap_or_else(|| ctx.pointer.position() + self.offset);

        ctx.pager.detach_surface(ctx.scene, surface);
        ctx.scene.put_in_limbo(surface);
        ctx.scene.set_position(surface, screen);
        ctx.scene.set_surface_transform(
            surface,
            Some(Mat4::from_scale(Vec3::new(self.scale, self.scale, 1.0))),
        );
        self.moving = true;
        debug!("overview lifted surface {}", surface.raw());
    }

    /// Put the lifted `surface` into the workspace under the pointer,
    /// or the pending one if the pointer is over an empty cell.
    fn drop_surface(&mut self, ctx: &mut GrabContext<'_>, surface: SurfaceId) {
        let dest = self.cell_at(ctx.pointer.position()).unwrap_or(self.pending);
        let screen = ctx.scene.position(surface).unwrap_or_default();
        let Some(ws) = ctx.pager.workspace_mut(dest) else {
            return;
        };
        let local = to_cell_local(screen, ws.position(), self.scale);

        ctx.scene.set_surface_transform(surface, None);
        ws.add_surface(ctx.scene, surface);
        ctx.scene.set_position(surface, local);
        self.moving = false;
        self.candidate = None;
        info!(
            "surface {} moved to workspace {} at ({:.0}, {:.0})",
            surface.raw(),
            dest,
            local.x,
            local.y
        );
    }

    /// Put back a window still being dragged when the overview is closed
    /// from the keyboard.
    pub fn cancel(&mut self, ctx: &mut GrabContext<'_>) {
        if let (true, Some(surface)) = (self.moving, self.candidate) {
            self.drop_surface(ctx, surface);
        }
    }
}

impl PointerGrab for OverviewGrab {
    fn motion(&mut self, ctx: &mut GrabContext<'_>, _time: u32) -> GrabStatus {
        let Some(surface) = self.candidate else {
            return GrabStatus::Continue;
        };
        let pointer = ctx.pointer.position();
        if !self.moving {
            let d = pointer - self.press;
            if d.x.abs() + d.y.abs() < self.threshold {
                return GrabStatus::Continue;
            }
            self.lift(ctx, surface);
        }
        ctx.scene.set_position(surface, pointer + self.offset);
        ctx.scene.damage(surface);
        ctx.scene.schedule_repaint();
        GrabStatus::Continue
    }

    fn button(
        &mut self,
        ctx: &mut GrabContext<'_>,
        _time: u32,
        _button: u32,
        state: ButtonState,
    ) -> GrabStatus {
        let pointer = ctx.pointer.position();
        match state {
            ButtonState::Pressed => {
                if ctx.pointer.button_count() > 1 {
                    return GrabStatus::Continue;
                }
                self.press = pointer;
                self.moving = false;
                self.candidate = ctx.pager.surface_at(ctx.scene, pointer);
                if let Some(surface) = self.candidate {
                    let origin = screen_origin(ctx, surface).unwrap_or(pointer);
                    self.offset = origin - pointer;
                    debug!("overview press on surface {}", surface.raw());
                }
                GrabStatus::Continue
            }
            ButtonState::Released => {
                if ctx.pointer.button_count() > 0 {
                    return GrabStatus::Continue;
                }
                match (self.moving, self.candidate.take()) {
                    (true, Some(surface)) => {
                        self.drop_surface(ctx, surface);
                        GrabStatus::ExitOverview { pick: None }
                    }
                    _ => GrabStatus::ExitOverview {
                        pick: self.cell_at(pointer),
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::BTN_LEFT;
    use crate::config::PagerConfig;
    use crate::grab::Pointer;
    use crate::output::Output;
    use crate::pager::Pager;
    use crate::scene::{Rect, Scene, SurfaceRole};
    use std::cell::{Cell, RefCell};

    /// Record-keeping mock shell.
    #[derive(Debug, Default)]
    struct RecorderShell {
        calls: RefCell<Vec<String>>,
        fullscreen: Cell<bool>,
    }

    impl Shell for RecorderShell {
        fn hide_panels(&self) {
            self.calls.borrow_mut().push("hide_panels".into());
        }

        fn show_panels(&self) {
            self.calls.borrow_mut().push("show_panels".into());
        }

        fn in_fullscreen(&self) -> bool {
            self.fullscreen.get()
        }

        fn set_cursor(&self, cursor: Cursor) {
            self.calls.borrow_mut().push(format!("cursor {:?}", cursor));
        }
    }

    struct Harness {
        scene: Scene,
        pager: Pager,
        pointer: Pointer,
        shell: RecorderShell,
        overview: GridOverview,
        grab: Option<Grab>,
        window: SurfaceId,
        time: u32,
    }

    impl Harness {
        /// Four settled workspaces on a 1400×700 output (a 2×2 grid with
        /// 20×10 margins) and one window at (100, 100) on workspace 0.
        fn new() -> Self {
            let mut scene = Scene::new();
            let out = Output::new("DP-1", 0, 0, 1400, 700);
            let mut pager = Pager::new(&mut scene, &out, &PagerConfig::default());
            for _ in 1..4 {
                pager.add_workspace(&mut scene);
            }
            pager.frame(&mut scene, 0);
            pager.frame(&mut scene, 1000);
            let window =
                scene.create_surface(SurfaceRole::Toplevel, Rect::new(100.0, 100.0, 200.0, 100.0));
            pager.move_surface_to(&mut scene, window, 0);
            Self {
                scene,
                pager,
                pointer: Pointer::new(),
                shell: RecorderShell::default(),
                overview: GridOverview::new(&OverviewConfig::default()),
                grab: None,
                window,
                time: 1000,
            }
        }

        fn toggle(&mut self) {
            let mut ctx = GrabContext {
                scene: &mut self.scene,
                pager: &mut self.pager,
                pointer: &mut self.pointer,
            };
            self.overview.toggle(&mut ctx, &self.shell, &mut self.grab);
        }

        /// Run every animation to completion.
        fn settle(&mut self) {
            self.time += 1000;
            self.pager.frame(&mut self.scene, self.time);
            self.time += 1000;
            self.pager.frame(&mut self.scene, self.time);
        }

        fn finish(&mut self, status: GrabStatus) {
            if let GrabStatus::ExitOverview { pick } = status {
                self.grab = None;
                let mut ctx = GrabContext {
                    scene: &mut self.scene,
                    pager: &mut self.pager,
                    pointer: &mut self.pointer,
                };
                self.overview.exit(&mut ctx, &self.shell, pick);
            }
        }

        fn motion(&mut self, x: f32, y: f32) {
            self.pointer.motion_to(Vec2::new(x, y));
            let mut ctx = GrabContext {
                scene: &mut self.scene,
                pager: &mut self.pager,
                pointer: &mut self.pointer,
            };
            let status = match self.grab.as_mut() {
                Some(g) => g.motion(&mut ctx, 0),
                None => GrabStatus::Continue,
            };
            self.finish(status);
        }

        fn button(&mut self, state: ButtonState) {
            self.pointer.button(state);
            let mut ctx = GrabContext {
                scene: &mut self.scene,
                pager: &mut self.pager,
                pointer: &mut self.pointer,
            };
            let status = match self.grab.as_mut() {
                Some(g) => g.button(&mut ctx, 0, BTN_LEFT, state),
                None => GrabStatus::Continue,
            };
            self.finish(status);
        }

        fn click(&mut self, x: f32, y: f32) {
            self.motion(x, y);
            self.button(ButtonState::Pressed);
            self.button(ButtonState::Released);
        }

        fn overview_grab(&self) -> &OverviewGrab {
            match &self.grab {
                Some(Grab::Overview(g)) => g,
                other => panic!("expected overview grab, got {:?}", other),
            }
        }
    }

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).abs().max_element() < 0.1
    }

    #[test]
    fn cell_local_mapping() {
        let local = to_cell_local(Vec2::new(120.0, 200.0), Vec2::new(0.0, 80.0), 0.4);
        assert!(approx(local, Vec2::new(300.0, 300.0)), "{local:?}");
    }

    #[test]
    fn entering_shrinks_workspaces_into_cells() {
        let mut h = Harness::new();
        h.toggle();
        assert!(h.overview.is_active());
        assert!(h.grab.as_ref().is_some_and(Grab::is_overview));
        assert_eq!(
            *h.shell.calls.borrow(),
            vec!["hide_panels".to_string(), "cursor Arrow".to_string()]
        );

        let s = (1.0 - 3.0 * 20.0 / 1400.0) / 2.0;
        let expected = [(20.0, 10.0), (710.0, 10.0), (20.0, 355.0), (710.0, 355.0)];
        for (n, (x, y)) in expected.into_iter().enumerate() {
            let tr = h.pager.workspace(n).unwrap().transform();
            assert_eq!(tr.target_scale(), Vec3::new(s, s, 1.0));
            let t = tr.target_translation();
            assert!(approx(t.truncate(), Vec2::new(x, y)), "workspace {n}: {t:?}");
            assert!(tr.is_animating());
        }
    }

    #[test]
    fn fullscreen_suppresses_toggle() {
        let mut h = Harness::new();
        h.shell.fullscreen.set(true);
        h.toggle();
        assert!(!h.overview.is_active());
        assert!(h.grab.is_none());
        assert!(h.shell.calls.borrow().is_empty());
    }

    #[test]
    fn other_grab_blocks_toggle() {
        let mut h = Harness::new();
        let window = h.window;
        let mut ctx = GrabContext {
            scene: &mut h.scene,
            pager: &mut h.pager,
            pointer: &mut h.pointer,
        };
        let mv = crate::grab::MoveGrab::start(&mut ctx, window, &Default::default()).unwrap();
        h.grab = Some(Grab::Move(mv));
        h.toggle();
        assert!(!h.overview.is_active());
        assert!(h.grab.as_ref().is_some_and(Grab::is_move));
    }

    #[test]
    fn clicking_a_cell_picks_that_workspace() {
        let mut h = Harness::new();
        h.toggle();
        h.settle();
        h.click(1000.0, 600.0);
        assert!(!h.overview.is_active());
        assert!(h.grab.is_none());
        assert_eq!(h.overview.pending(), 3);
        assert_eq!(h.pager.current_index(), 3);
        assert_eq!(h.shell.calls.borrow().last().unwrap(), "show_panels");

        h.settle();
        let ws = h.pager.workspace(3).unwrap().transform();
        assert_eq!(ws.current_translation(), Vec3::ZERO);
        assert_eq!(ws.current_scale(), Vec3::ONE);
    }

    #[test]
    fn clicking_a_window_without_dragging_picks_its_cell() {
        let mut h = Harness::new();
        h.pager.select_workspace(&mut h.scene, 1);
        h.settle();
        h.toggle();
        h.settle();
        // Window at (100, 100) in workspace 0 is at about (67.9, 57.9).
        h.click(80.0, 70.0);
        assert_eq!(h.pager.current_index(), 0);
        assert_eq!(h.scene.workspace_of(h.window), Some(0));
    }

    #[test]
    fn small_motion_does_not_lift() {
        let mut h = Harness::new();
        h.toggle();
        h.settle();
        h.motion(80.0, 70.0);
        h.button(ButtonState::Pressed);
        assert_eq!(h.overview_grab().candidate(), Some(h.window));

        h.motion(82.0, 72.0);
        assert!(!h.overview_grab().is_moving());
        assert_eq!(h.scene.workspace_of(h.window), Some(0));

        h.motion(83.0, 72.0);
        assert!(h.overview_grab().is_moving());
        assert_eq!(h.scene.layer_of(h.window), Some(h.scene.limbo()));
        let s = h.overview_grab().scale();
        assert_eq!(
            h.scene.surface(h.window).unwrap().transform(),
            Some(Mat4::from_scale(Vec3::new(s, s, 1.0)))
        );
    }

    #[test]
    fn dragging_a_window_into_another_cell_moves_it() {
        let mut h = Harness::new();
        h.toggle();
        h.settle();
        h.motion(80.0, 70.0);
        h.button(ButtonState::Pressed);
        h.motion(1000.0, 500.0);
        assert!(approx(
            h.scene.position(h.window).unwrap(),
            Vec2::new(987.857, 487.857)
        ));

        h.button(ButtonState::Released);
        assert!(!h.overview.is_active());
        let ws3 = h.pager.workspace(3).unwrap();
        assert_eq!(h.scene.workspace_of(h.window), Some(3));
        assert_eq!(h.scene.layer_of(h.window), Some(ws3.layer()));
        assert_eq!(h.scene.surface(h.window).unwrap().transform(), None);
        assert!(approx(
            h.scene.position(h.window).unwrap(),
            Vec2::new(580.597, 277.612)
        ));
        // Dropping does not change the workspace the overview returns to.
        assert_eq!(h.pager.current_index(), 0);
    }

    #[test]
    fn toggling_off_mid_drag_drops_the_window() {
        let mut h = Harness::new();
        h.toggle();
        h.settle();
        h.motion(80.0, 70.0);
        h.button(ButtonState::Pressed);
        h.motion(300.0, 500.0);
        h.toggle();
        assert!(!h.overview.is_active());
        assert!(h.grab.is_none());
        assert_eq!(h.scene.workspace_of(h.window), Some(2));
        assert_eq!(h.pager.current_index(), 0);
    }

    #[test]
    fn toggle_twice_restores_layout() {
        let mut h = Harness::new();
        h.pager.select_workspace(&mut h.scene, 2);
        h.settle();
        h.toggle();
        h.settle();
        h.toggle();
        h.settle();
        assert_eq!(h.pager.current_index(), 2);
        for n in 0..4 {
            let tr = h.pager.workspace(n).unwrap().transform();
            assert_eq!(tr.current_scale(), Vec3::ONE);
        }
        assert_eq!(
            h.pager.current_workspace().transform().current_translation(),
            Vec3::ZERO
        );
    }
}
