//! The main orchestrator that ties the scene, pager, grabs and overview
//! together.
//!
//! [`Desktop`] owns all core state and reacts to [`Command`]s: workspace
//! actions go to the [`Pager`], pointer events go to the active grab (if
//! any), key chords toggle the overview and frame ticks drive every
//! running animation.

use crate::command::Command;
use crate::config::{Config, MoveGrabConfig};
use crate::grab::{Grab, GrabContext, GrabStatus, MoveGrab, Pointer, PointerGrab};
use crate::output::Output;
use crate::overview::GridOverview;
use crate::pager::Pager;
use crate::scene::{Rect, Scene, SurfaceId, SurfaceRole};
use crate::signal::Signal;
use crate::traits::{Cursor, Shell};
use glam::Vec2;
use log::{debug, info, warn};

/// Orchestrates workspaces, grabs and the overview on one output.
///
/// The desktop is generic over any [`Shell`] implementation, so the same
/// core runs inside a compositor, in the headless daemon or under test.
///
/// # Typical usage
///
/// ```ignore
/// let mut desktop = Desktop::new(LoggingShell, &Config::default());
/// desktop.handle(Command::MapWindow { x: 10.0, y: 10.0, width: 640.0, height: 480.0 });
/// desktop.handle(Command::NextWorkspace);
/// desktop.handle(Command::Frame { time: 16 });
/// ```
pub struct Desktop<S: Shell> {
    shell: S,
    scene: Scene,
    output: Output,
    pager: Pager,
    pointer: Pointer,
    grab: Option<Grab>,
    overview: GridOverview,
    move_config: MoveGrabConfig,
    move_ended: Signal<SurfaceId>,
}

impl<S: Shell> Desktop<S> {
    /// Create a desktop with `config.pager.workspaces` workspaces (at least
    /// one) on the configured output.
    pub fn new(shell: S, config: &Config) -> Self {
        let output = config.output.build();
        let mut scene = Scene::new();
        let mut pager = Pager::new(&mut scene, &output, &config.pager);
        while pager.num_workspaces() < config.pager.workspaces {
            pager.add_workspace(&mut scene);
        }
        info!(
            "desktop on {} ({}x{}) with {} workspaces",
            output.name,
            output.width,
            output.height,
            pager.num_workspaces()
        );

        Self {
            shell,
            scene,
            output,
            pager,
            pointer: Pointer::new(),
            grab: None,
            overview: GridOverview::new(&config.overview),
            move_config: config.move_grab.clone(),
            move_ended: Signal::new(),
        }
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn overview(&self) -> &GridOverview {
        &self.overview
    }

    /// The grab currently holding the pointer, if any.
    pub fn grab(&self) -> Option<&Grab> {
        self.grab.as_ref()
    }

    /// Fires with the dragged surface when a cross-workspace move ends.
    pub fn move_ended(&mut self) -> &mut Signal<SurfaceId> {
        &mut self.move_ended
    }

    /// Process a single [`Command`].
    ///
    /// Every command is total: anything that does not apply in the current
    /// state is logged and dropped.
    pub fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::AddWorkspace
            | Command::SelectWorkspace(_)
            | Command::NextWorkspace
            | Command::PreviousWorkspace
                if self.overview.is_active() =>
            {
                debug!("{:?} ignored while the overview is shown", cmd);
            }

            Command::AddWorkspace => {
                let n = self.pager.add_workspace(&mut self.scene);
                info!("added workspace {}", n);
            }

            Command::SelectWorkspace(n) => {
                info!("select workspace {}", n);
                self.pager.select_workspace(&mut self.scene, n);
            }

            Command::NextWorkspace => {
                self.pager.select_next_workspace(&mut self.scene);
                info!("next workspace: {}", self.pager.current_index());
            }

            Command::PreviousWorkspace => {
                self.pager.select_previous_workspace(&mut self.scene);
                info!("previous workspace: {}", self.pager.current_index());
            }

            Command::ToggleOverview => self.toggle_overview(),

            Command::Key(chord) => {
                if chord == self.overview.config().binding {
                    self.toggle_overview();
                } else {
                    debug!("unbound key chord {}", chord);
                }
            }

            Command::PointerMotion { time, x, y } => {
                self.pointer.motion_to(Vec2::new(x, y));
                self.with_grab(|grab, ctx| grab.motion(ctx, time));
            }

            Command::PointerButton {
                time,
                button,
                state,
            } => {
                self.pointer.button(state);
                self.with_grab(|grab, ctx| grab.button(ctx, time, button, state));
            }

            Command::BeginMove => {
                let at = self.pointer.position();
                match self.pager.surface_at(&self.scene, at) {
                    Some(surface) => self.begin_move(surface),
                    None => debug!("no window under the pointer at {:?}", at),
                }
            }

            Command::Frame { time } => self.frame(time),

            Command::MapWindow {
                x,
                y,
                width,
                height,
            } => {
                self.map_window(Rect::new(x, y, width, height));
            }

            Command::MapBackground => {
                self.map_background();
            }
        }
    }

    /// Map a window on the current workspace at `rect` (workspace
    /// coordinates).
    pub fn map_window(&mut self, rect: Rect) -> SurfaceId {
        let id = self.scene.create_surface(SurfaceRole::Toplevel, rect);
        let ws = self.pager.current_workspace_mut();
        ws.add_surface(&mut self.scene, id);
        info!("mapped surface {} on workspace {}", id.raw(), ws.number());
        id
    }

    /// Map a background on the current workspace, replacing any other
    /// background shown on this output.
    pub fn map_background(&mut self) -> SurfaceId {
        let id = self
            .scene
            .create_surface(SurfaceRole::Toplevel, Rect::default());
        let ws = self.pager.current_workspace_mut();
        ws.set_background(&mut self.scene, id);
        info!("mapped background {} on workspace {}", id.raw(), ws.number());
        id
    }

    /// Start dragging `surface` across workspaces.  Ignored while another
    /// grab is active.
    pub fn begin_move(&mut self, surface: SurfaceId) {
        if self.grab.is_some() {
            warn!("move of surface {} ignored, a grab is already active", surface.raw());
            return;
        }
        let mut ctx = GrabContext {
            scene: &mut self.scene,
            pager: &mut self.pager,
            pointer: &mut self.pointer,
        };
        match MoveGrab::start(&mut ctx, surface, &self.move_config) {
            Some(grab) => {
                self.grab = Some(Grab::Move(grab));
                self.shell.set_cursor(Cursor::Move);
                info!("moving surface {}", surface.raw());
            }
            None => debug!("surface {} is gone, not moving it", surface.raw()),
        }
    }

    /// Enter or leave the grid overview.
    pub fn toggle_overview(&mut self) {
        let mut ctx = GrabContext {
            scene: &mut self.scene,
            pager: &mut self.pager,
            pointer: &mut self.pointer,
        };
        self.overview.toggle(&mut ctx, &self.shell, &mut self.grab);
    }

    /// The output presented a frame at `time` (ms).
    pub fn frame(&mut self, time: u32) {
        self.output.clock().frame(time);
        self.pager.frame(&mut self.scene, time);
        self.with_grab(|grab, ctx| grab.frame(ctx, time));
    }

    /// Run `f` against the active grab, then act on its verdict.
    fn with_grab<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Grab, &mut GrabContext<'_>) -> GrabStatus,
    {
        let Some(grab) = self.grab.as_mut() else {
            return;
        };
        let mut ctx = GrabContext {
            scene: &mut self.scene,
            pager: &mut self.pager,
            pointer: &mut self.pointer,
        };
        let status = f(grab, &mut ctx);
        self.finish_grab(status);
    }

    fn finish_grab(&mut self, status: GrabStatus) {
        match status {
            GrabStatus::Continue => {}
            GrabStatus::MoveEnded(surface) => {
                self.grab = None;
                self.shell.set_cursor(Cursor::Arrow);
                self.move_ended.emit(&surface);
            }
            GrabStatus::ExitOverview { pick } => {
                self.grab = None;
                let mut ctx = GrabContext {
                    scene: &mut self.scene,
                    pager: &mut self.pager,
                    pointer: &mut self.pointer,
                };
                self.overview.exit(&mut ctx, &self.shell, pick);
            }
        }
    }
}
