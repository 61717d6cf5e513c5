//! The pager: an ordered set of workspaces laid out on a grid.
//!
//! Workspaces sit on a virtual grid one output in size per cell (see
//! [`GridLayout`]).  Selecting a workspace slides every workspace so the
//! selected one lands at the origin; all slides start together and share
//! one duration, so the grid moves as a single sheet.

use crate::config::PagerConfig;
use crate::curve::Curve;
use crate::grid::GridLayout;
use crate::output::Output;
use crate::scene::{LayerId, Scene, SurfaceId};
use crate::workspace::Workspace;
use glam::Vec2;
use log::debug;

/// Owns the workspaces and which one is current.
#[derive(Debug)]
pub struct Pager {
    output: Output,
    layer: LayerId,
    workspaces: Vec<Workspace>,
    current: usize,
    slide_ms: u32,
    curve: Curve,
}

impl Pager {
    /// Create a pager with a single workspace on `output`.
    ///
    /// The pager's layer is stacked below the scene's limbo layer so dragged
    /// surfaces always paint above every workspace.
    pub fn new(scene: &mut Scene, output: &Output, config: &PagerConfig) -> Self {
        let layer = scene.create_layer();
        scene.insert_layer_below(layer, scene.limbo());
        let mut pager = Self {
            output: output.clone(),
            layer,
            workspaces: Vec::new(),
            current: 0,
            slide_ms: config.slide_ms,
            curve: config.curve,
        };
        pager.add_workspace(scene);
        pager
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn slide_duration(&self) -> u32 {
        self.slide_ms
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Append a workspace and re-run the layout.  Returns its index.
    pub fn add_workspace(&mut self, scene: &mut Scene) -> usize {
        let number = self.workspaces.len();
        let ws = Workspace::new(scene, number, &self.output);
        ws.insert(scene, self.layer);
        self.workspaces.push(ws);
        self.activate_workspace(scene);
        debug!("added workspace {} ({} total)", number, self.workspaces.len());
        number
    }

    /// Make workspace `n` current.  Out-of-range indices are ignored.
    pub fn select_workspace(&mut self, scene: &mut Scene, n: usize) {
        if n >= self.workspaces.len() {
            debug!("select workspace {} ignored, only {}", n, self.workspaces.len());
            return;
        }
        self.current = n;
        self.activate_workspace(scene);
    }

    pub fn select_next_workspace(&mut self, scene: &mut Scene) {
        self.current = (self.current + 1) % self.workspaces.len();
        self.activate_workspace(scene);
    }

    pub fn select_previous_workspace(&mut self, scene: &mut Scene) {
        self.current = self
            .current
            .checked_sub(1)
            .unwrap_or(self.workspaces.len() - 1);
        self.activate_workspace(scene);
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_workspace(&self) -> &Workspace {
        &self.workspaces[self.current]
    }

    pub fn current_workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspaces[self.current]
    }

    pub fn workspace(&self, n: usize) -> Option<&Workspace> {
        self.workspaces.get(n)
    }

    pub fn workspace_mut(&mut self, n: usize) -> Option<&mut Workspace> {
        self.workspaces.get_mut(n)
    }

    pub fn workspaces(&self) -> impl Iterator<Item = &Workspace> {
        self.workspaces.iter()
    }

    pub fn num_workspaces(&self) -> usize {
        self.workspaces.len()
    }

    /// Grid shape for the current workspace count.
    pub fn layout(&self) -> GridLayout {
        GridLayout::for_count(self.workspaces.len())
    }

    /// Slide every workspace into place around the current one.
    fn activate_workspace(&mut self, scene: &mut Scene) {
        let layout = self.layout();
        let size = self.output.size();
        debug!(
            "activate workspace {} on {:?} grid",
            self.current,
            layout.dimensions()
        );
        for (i, ws) in self.workspaces.iter_mut().enumerate() {
            let offset = layout.slide_offset(i, self.current, size);
            let mut tr = ws.transform().clone();
            tr.reset();
            tr.translate(offset.x, offset.y, 0.0);
            tr.set_curve(self.curve);
            tr.animate(&self.output, self.slide_ms);
            ws.set_transform(scene, tr);
        }
    }

    /// Move `surface` into workspace `n`, leaving its previous workspace.
    pub fn move_surface_to(&mut self, scene: &mut Scene, surface: SurfaceId, n: usize) {
        if n >= self.workspaces.len() {
            return;
        }
        self.detach_surface(scene, surface);
        self.workspaces[n].add_surface(scene, surface);
    }

    /// Remove `surface` from whichever workspace holds it.
    pub fn detach_surface(&mut self, scene: &mut Scene, surface: SurfaceId) {
        if let Some(ws) = scene
            .workspace_of(surface)
            .and_then(|n| self.workspaces.get_mut(n))
        {
            ws.remove_surface(scene, surface);
        }
    }

    /// Topmost surface under `point`, searching the current workspace
    /// first.
    pub fn surface_at(&self, scene: &Scene, point: Vec2) -> Option<SurfaceId> {
        let current = std::iter::once(self.current_workspace());
        let others = self
            .workspaces
            .iter()
            .filter(|ws| ws.number() != self.current);
        current
            .chain(others)
            .find_map(|ws| ws.surface_at(scene, point))
    }

    /// Whether any workspace is still sliding.
    pub fn is_animating(&self) -> bool {
        self.workspaces.iter().any(|ws| ws.transform().is_animating())
    }

    /// Forward a frame tick to every workspace.  Returns `true` if any moved.
    pub fn frame(&mut self, scene: &mut Scene, now: u32) -> bool {
        let mut moved = false;
        for ws in &mut self.workspaces {
            moved |= ws.frame(scene, now);
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Rect, SurfaceRole};
    use glam::Vec3;

    fn make_pager(count: usize) -> (Scene, Output, Pager) {
        let mut scene = Scene::new();
        let out = Output::new("DP-1", 0, 0, 1000, 500);
        let mut pager = Pager::new(&mut scene, &out, &PagerConfig::default());
        while pager.num_workspaces() < count {
            pager.add_workspace(&mut scene);
        }
        (scene, out, pager)
    }

    /// Run every slide to completion.
    fn settle(scene: &mut Scene, pager: &mut Pager, start: u32) {
        pager.frame(scene, start);
        pager.frame(scene, start + 1000);
    }

    fn target(pager: &Pager, n: usize) -> Vec3 {
        pager.workspace(n).unwrap().transform().target_translation()
    }

    #[test]
    fn starts_with_one_workspace() {
        let (_, _, pager) = make_pager(1);
        assert_eq!(pager.num_workspaces(), 1);
        assert_eq!(pager.current_index(), 0);
    }

    #[test]
    fn add_workspace_returns_sequential_indices() {
        let (mut scene, _, mut pager) = make_pager(1);
        assert_eq!(pager.add_workspace(&mut scene), 1);
        assert_eq!(pager.add_workspace(&mut scene), 2);
        assert_eq!(pager.workspace(2).unwrap().number(), 2);
    }

    #[test]
    fn current_workspace_always_lands_at_origin() {
        for n in 1..=10 {
            let (mut scene, _, mut pager) = make_pager(n);
            for current in 0..n {
                pager.select_workspace(&mut scene, current);
                assert_eq!(target(&pager, current), Vec3::ZERO, "n={n} current={current}");
                settle(&mut scene, &mut pager, 10_000 * current as u32);
                assert_eq!(
                    pager.current_workspace().transform().current_translation(),
                    Vec3::ZERO
                );
            }
        }
    }

    #[test]
    fn other_workspaces_are_offset_by_grid_cell() {
        let (mut scene, _, mut pager) = make_pager(5);
        pager.select_workspace(&mut scene, 4);
        // 3×2 grid, workspace 4 at (col 1, row 1).
        assert_eq!(target(&pager, 0), Vec3::new(-1000.0, -500.0, 0.0));
        assert_eq!(target(&pager, 2), Vec3::new(1000.0, -500.0, 0.0));
        assert_eq!(target(&pager, 3), Vec3::new(-1000.0, 0.0, 0.0));
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let (mut scene, out, mut pager) = make_pager(3);
        pager.select_workspace(&mut scene, 1);
        settle(&mut scene, &mut pager, 0);
        pager.select_workspace(&mut scene, 3);
        pager.select_workspace(&mut scene, usize::MAX);
        assert_eq!(pager.current_index(), 1);
        assert!(!pager.is_animating());
        assert!(!out.clock().has_subscribers());
    }

    #[test]
    fn next_and_previous_wrap_around() {
        let (mut scene, _, mut pager) = make_pager(3);
        pager.select_previous_workspace(&mut scene);
        assert_eq!(pager.current_index(), 2);
        pager.select_next_workspace(&mut scene);
        assert_eq!(pager.current_index(), 0);
        pager.select_next_workspace(&mut scene);
        assert_eq!(pager.current_index(), 1);
    }

    #[test]
    fn slides_share_one_clock_subscription_per_workspace() {
        let (mut scene, out, mut pager) = make_pager(4);
        pager.select_workspace(&mut scene, 3);
        pager.select_workspace(&mut scene, 2);
        assert_eq!(out.clock().subscriber_count(), 4);
        settle(&mut scene, &mut pager, 0);
        assert!(!out.clock().has_subscribers());
    }

    #[test]
    fn slide_interpolates_from_current_position() {
        let (mut scene, _, mut pager) = make_pager(2);
        settle(&mut scene, &mut pager, 0);
        pager.select_workspace(&mut scene, 1);
        pager.frame(&mut scene, 2000);
        pager.frame(&mut scene, 2150);
        let half = pager.workspace(1).unwrap().transform().current_translation();
        assert_eq!(half, Vec3::new(500.0, 0.0, 0.0));

        pager.select_workspace(&mut scene, 0);
        let ws1 = pager.workspace(1).unwrap().transform();
        assert_eq!(ws1.current_translation(), half);
        assert_eq!(ws1.source().translate, half);
    }

    #[test]
    fn move_surface_between_workspaces() {
        let (mut scene, _, mut pager) = make_pager(2);
        let s = scene.create_surface(SurfaceRole::Toplevel, Rect::new(0.0, 0.0, 10.0, 10.0));
        pager.move_surface_to(&mut scene, s, 0);
        pager.move_surface_to(&mut scene, s, 1);
        assert_eq!(pager.workspace(0).unwrap().number_of_surfaces(&scene), 0);
        assert_eq!(pager.workspace(1).unwrap().number_of_surfaces(&scene), 1);
        assert_eq!(
            scene.transform_parent(s),
            Some(pager.workspace(1).unwrap().anchor())
        );
        pager.move_surface_to(&mut scene, s, 7);
        assert_eq!(scene.workspace_of(s), Some(1));
    }

    #[test]
    fn surface_at_prefers_current_workspace() {
        let (mut scene, _, mut pager) = make_pager(2);
        settle(&mut scene, &mut pager, 0);
        let s = scene.create_surface(SurfaceRole::Toplevel, Rect::new(10.0, 10.0, 50.0, 50.0));
        pager.move_surface_to(&mut scene, s, 0);
        assert_eq!(pager.surface_at(&scene, Vec2::new(20.0, 20.0)), Some(s));

        pager.select_workspace(&mut scene, 1);
        settle(&mut scene, &mut pager, 5000);
        assert_eq!(pager.surface_at(&scene, Vec2::new(20.0, 20.0)), None);
    }

    #[test]
    fn frame_damages_moving_workspaces() {
        let (mut scene, _, mut pager) = make_pager(2);
        let before = scene.repaint_requests();
        assert!(pager.frame(&mut scene, 0));
        assert!(scene.repaint_requests() > before);
    }
}
