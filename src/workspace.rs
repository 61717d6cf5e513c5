//! A single workspace: a set of surfaces moved and clipped as one.
//!
//! Every workspace owns an invisible *anchor* surface.  Member surfaces are
//! parented to the anchor, and the workspace [`Transform`] is linked into
//! the anchor's transformation chain, so scaling or sliding the workspace
//! moves all of its windows at once.  The workspace layer is clipped to the
//! transformed output rectangle so content that slides partly out of its
//! cell is not drawn over its neighbours.

use crate::output::Output;
use crate::scene::{LayerId, Rect, Scene, SurfaceId, SurfaceRole};
use crate::transform::Transform;
use glam::Vec2;

/// A numbered container of surfaces sharing one transform.
#[derive(Debug)]
pub struct Workspace {
    number: usize,
    output: Output,
    anchor: SurfaceId,
    layer: LayerId,
    background_layer: LayerId,
    background: Option<SurfaceId>,
    transform: Transform,
}

impl Workspace {
    /// Create workspace `number` on `output`.
    ///
    /// The anchor and both layers are created in `scene` but not stacked;
    /// call [`insert`](Self::insert) to make the workspace visible.
    pub fn new(scene: &mut Scene, number: usize, output: &Output) -> Self {
        let anchor = scene.create_surface(SurfaceRole::Anchor, Rect::default());
        let layer = scene.create_layer();
        let background_layer = scene.create_layer();
        Self {
            number,
            output: output.clone(),
            anchor,
            layer,
            background_layer,
            background: None,
            transform: Transform::new(),
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn anchor(&self) -> SurfaceId {
        self.anchor
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn background_layer(&self) -> LayerId {
        self.background_layer
    }

    pub fn background(&self) -> Option<SurfaceId> {
        self.background
    }

    /// Stack this workspace directly above `parent`, with its background
    /// sub-layer just below its content.
    pub fn insert(&self, scene: &mut Scene, parent: LayerId) {
        scene.insert_layer_above(self.layer, parent);
        scene.insert_layer_below(self.background_layer, self.layer);
    }

    /// Take the workspace out of the rendered stack.
    pub fn remove(&self, scene: &mut Scene) {
        scene.remove_layer_from_stack(self.layer);
        scene.remove_layer_from_stack(self.background_layer);
    }

    /// Adopt `surface`.
    ///
    /// The surface is parented to the anchor unless it already has a
    /// transform parent of its own (e.g. a popup parented to its window).
    pub fn add_surface(&mut self, scene: &mut Scene, surface: SurfaceId) {
        if scene.surface(surface).is_none() {
            return;
        }
        if scene.transform_parent(surface).is_none() {
            scene.set_transform_parent(surface, Some(self.anchor));
        }
        scene.add_to_layer(self.layer, surface);
        scene.set_workspace(surface, Some(self.number));
    }

    /// Release `surface`.  Surfaces that are not members are left alone.
    pub fn remove_surface(&mut self, scene: &mut Scene, surface: SurfaceId) {
        if scene.workspace_of(surface) != Some(self.number) {
            return;
        }
        if scene.transform_parent(surface) == Some(self.anchor) {
            scene.set_transform_parent(surface, None);
        }
        if scene.layer_of(surface) == Some(self.layer) {
            scene.remove_from_layer(surface);
        }
        scene.set_workspace(surface, None);
    }

    pub fn restack(&self, scene: &mut Scene, surface: SurfaceId) {
        if scene.layer_of(surface) == Some(self.layer) {
            scene.restack(surface);
        }
    }

    pub fn stack_above(&self, scene: &mut Scene, surface: SurfaceId, parent: SurfaceId) {
        if scene.layer_of(parent) == Some(self.layer) {
            scene.stack_above(surface, parent);
        }
    }

    /// Make `surface` this workspace's background.
    ///
    /// The surface follows the workspace transform like any member, fills
    /// the output, and replaces whatever background was mapped on the same
    /// output before (see [`Scene::configure`]).
    pub fn set_background(&mut self, scene: &mut Scene, surface: SurfaceId) {
        let Some(s) = scene.surface_mut(surface) else {
            return;
        };
        s.role = SurfaceRole::Background {
            layer: self.background_layer,
            output: self.output.name.clone(),
        };
        scene.set_transform_parent(surface, Some(self.anchor));
        self.background = Some(surface);
        scene.configure(surface, &self.output);
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Replace the workspace transform.
    ///
    /// The old transform (and any animation it was running) is dropped and
    /// unlinked from the anchor before the new one is linked in.
    pub fn set_transform(&mut self, scene: &mut Scene, transform: Transform) {
        scene.set_surface_transform(self.anchor, None);
        self.transform = transform;
        scene.set_surface_transform(self.anchor, Some(self.transform.matrix()));
        self.damage(scene);
    }

    /// Visible rectangle of the workspace: the output, scaled and moved by
    /// the current transform state.
    pub fn clip_rect(&self) -> Rect {
        let t = self.transform.current_translation();
        let s = self.transform.current_scale();
        Rect::new(
            t.x,
            t.y,
            self.output.width as f32 * s.x,
            self.output.height as f32 * s.y,
        )
    }

    pub fn clip(&self, scene: &mut Scene) {
        scene.set_clip(self.layer, Some(self.clip_rect()));
    }

    /// Re-clip, refresh the anchor's transform link and ask for a repaint.
    pub fn damage(&self, scene: &mut Scene) {
        self.clip(scene);
        scene.set_surface_transform(self.anchor, Some(self.transform.matrix()));
        scene.mark_geometry_dirty(self.anchor);
        scene.damage(self.anchor);
        scene.schedule_repaint();
    }

    /// Number of member surfaces (the anchor is not a member).
    pub fn number_of_surfaces(&self, scene: &Scene) -> usize {
        scene.layer_len(self.layer)
    }

    /// Current on-screen origin of the workspace.
    pub fn position(&self) -> Vec2 {
        self.transform.current_translation().truncate()
    }

    /// Map a point in workspace coordinates to the screen.
    pub fn to_screen(&self, local: Vec2) -> Vec2 {
        self.position() + local * self.transform.current_scale().truncate()
    }

    /// Map a screen point into workspace coordinates.
    pub fn to_local(&self, screen: Vec2) -> Vec2 {
        (screen - self.position()) / self.transform.current_scale().truncate()
    }

    /// On-screen rectangle of a member surface.
    pub fn screen_rect(&self, scene: &Scene, surface: SurfaceId) -> Option<Rect> {
        let s = scene.surface(surface)?;
        let origin = self.to_screen(s.position);
        let size = s.size * self.transform.current_scale().truncate();
        Some(Rect::new(origin.x, origin.y, size.x, size.y))
    }

    /// Topmost mapped member surface under the screen point `point`.
    pub fn surface_at(&self, scene: &Scene, point: Vec2) -> Option<SurfaceId> {
        if !self.clip_rect().contains(point) {
            return None;
        }
        let layer = scene.layer(self.layer)?;
        layer.surfaces().iter().rev().copied().find(|id| {
            scene.surface(*id).is_some_and(|s| s.mapped)
                && self
                    .screen_rect(scene, *id)
                    .is_some_and(|r| r.contains(point))
        })
    }

    /// Forward a frame tick to the transform; damage if it moved.
    pub fn frame(&mut self, scene: &mut Scene, now: u32) -> bool {
        if self.transform.tick(&self.output, now) {
            self.damage(scene);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn setup() -> (Scene, Output, Workspace) {
        let mut scene = Scene::new();
        let out = Output::new("DP-1", 0, 0, 1000, 800);
        let ws = Workspace::new(&mut scene, 0, &out);
        let limbo = scene.limbo();
        ws.insert(&mut scene, limbo);
        (scene, out, ws)
    }

    fn window(scene: &mut Scene, x: f32, y: f32) -> SurfaceId {
        scene.create_surface(SurfaceRole::Toplevel, Rect::new(x, y, 200.0, 100.0))
    }

    #[test]
    fn add_surface_parents_to_anchor_and_records_workspace() {
        let (mut scene, _, mut ws) = setup();
        let s = window(&mut scene, 0.0, 0.0);
        ws.add_surface(&mut scene, s);
        assert_eq!(scene.transform_parent(s), Some(ws.anchor()));
        assert_eq!(scene.workspace_of(s), Some(0));
        assert_eq!(ws.number_of_surfaces(&scene), 1);
    }

    #[test]
    fn add_surface_keeps_existing_parent() {
        let (mut scene, _, mut ws) = setup();
        let parent = window(&mut scene, 0.0, 0.0);
        let popup = window(&mut scene, 5.0, 5.0);
        scene.set_transform_parent(popup, Some(parent));
        ws.add_surface(&mut scene, popup);
        assert_eq!(scene.transform_parent(popup), Some(parent));
        assert_eq!(scene.layer_of(popup), Some(ws.layer()));
    }

    #[test]
    fn remove_surface_undoes_add() {
        let (mut scene, _, mut ws) = setup();
        let s = window(&mut scene, 0.0, 0.0);
        ws.add_surface(&mut scene, s);
        ws.remove_surface(&mut scene, s);
        assert_eq!(scene.transform_parent(s), None);
        assert_eq!(scene.layer_of(s), None);
        assert_eq!(scene.workspace_of(s), None);
        assert_eq!(ws.number_of_surfaces(&scene), 0);
    }

    #[test]
    fn remove_surface_ignores_strangers() {
        let (mut scene, out, mut ws) = setup();
        let mut other = Workspace::new(&mut scene, 1, &out);
        let s = window(&mut scene, 0.0, 0.0);
        other.add_surface(&mut scene, s);
        ws.remove_surface(&mut scene, s);
        assert_eq!(scene.workspace_of(s), Some(1));
        assert_eq!(scene.layer_of(s), Some(other.layer()));
    }

    #[test]
    fn one_background_per_output() {
        let (mut scene, out, mut ws) = setup();
        let mut other = Workspace::new(&mut scene, 1, &out);
        let first = window(&mut scene, 0.0, 0.0);
        let second = window(&mut scene, 0.0, 0.0);

        ws.set_background(&mut scene, first);
        assert_eq!(scene.layer_of(first), Some(ws.background_layer()));
        assert_eq!(scene.surface(first).unwrap().size, Vec2::new(1000.0, 800.0));
        assert_eq!(scene.transform_parent(first), Some(ws.anchor()));

        other.set_background(&mut scene, second);
        assert!(!scene.surface(first).unwrap().mapped);
        assert!(scene.surface(second).unwrap().mapped);
        assert_eq!(other.background(), Some(second));
    }

    #[test]
    fn background_sits_below_content() {
        let (scene, _, ws) = setup();
        let stack = scene.stacking();
        let bg = stack.iter().position(|l| *l == ws.background_layer()).unwrap();
        let content = stack.iter().position(|l| *l == ws.layer()).unwrap();
        assert_eq!(content, bg + 1);
    }

    #[test]
    fn clip_follows_current_transform() {
        let (mut scene, out, mut ws) = setup();
        let mut tr = ws.transform().clone();
        tr.scale(0.5, 0.25, 1.0);
        tr.translate(30.0, 40.0, 0.0);
        tr.animate(&out, 100);
        ws.set_transform(&mut scene, tr);
        ws.frame(&mut scene, 0);
        ws.frame(&mut scene, 50);

        let t = ws.transform().current_translation();
        let s = ws.transform().current_scale();
        let clip = scene.layer(ws.layer()).unwrap().clip().unwrap();
        assert_eq!((clip.x, clip.y), (t.x, t.y));
        assert_eq!(clip.width, 1000.0 * s.x);
        assert_eq!(clip.height, 800.0 * s.y);
        assert_eq!(clip, Rect::new(15.0, 20.0, 750.0, 500.0));
    }

    #[test]
    fn set_transform_damages_and_links_anchor() {
        let (mut scene, _, mut ws) = setup();
        let before = scene.repaint_requests();
        let mut tr = Transform::new();
        tr.translate(10.0, 0.0, 0.0);
        tr.apply();
        ws.set_transform(&mut scene, tr);
        assert!(scene.repaint_requests() > before);
        let anchor = scene.surface(ws.anchor()).unwrap();
        assert!(anchor.is_damaged());
        let m = anchor.transform().unwrap();
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn replacing_transform_drops_old_animation() {
        let (mut scene, out, mut ws) = setup();
        let mut tr = ws.transform().clone();
        tr.translate(100.0, 0.0, 0.0);
        tr.animate(&out, 100);
        ws.set_transform(&mut scene, tr);
        let mut tr = ws.transform().clone();
        tr.animate(&out, 100);
        ws.set_transform(&mut scene, tr);
        assert_eq!(out.clock().subscriber_count(), 1);
    }

    #[test]
    fn frame_without_animation_does_nothing() {
        let (mut scene, _, mut ws) = setup();
        let before = scene.repaint_requests();
        assert!(!ws.frame(&mut scene, 10));
        assert_eq!(scene.repaint_requests(), before);
    }

    #[test]
    fn coordinate_mapping_round_trips() {
        let (mut scene, _, mut ws) = setup();
        let mut tr = Transform::new();
        tr.scale(0.4, 0.4, 1.0);
        tr.translate(0.0, 80.0, 0.0);
        tr.apply();
        ws.set_transform(&mut scene, tr);
        let screen = ws.to_screen(Vec2::new(300.0, 300.0));
        assert_eq!(screen, Vec2::new(120.0, 200.0));
        assert_eq!(ws.to_local(screen), Vec2::new(300.0, 300.0));
    }

    #[test]
    fn surface_at_uses_screen_geometry_topmost_first() {
        let (mut scene, _, mut ws) = setup();
        let low = window(&mut scene, 0.0, 0.0);
        let high = window(&mut scene, 100.0, 0.0);
        ws.add_surface(&mut scene, low);
        ws.add_surface(&mut scene, high);
        let mut tr = Transform::new();
        tr.scale(0.5, 0.5, 1.0);
        tr.translate(10.0, 10.0, 0.0);
        tr.apply();
        ws.set_transform(&mut scene, tr);

        assert_eq!(ws.surface_at(&scene, Vec2::new(15.0, 15.0)), Some(low));
        assert_eq!(ws.surface_at(&scene, Vec2::new(70.0, 20.0)), Some(high));
        assert_eq!(ws.surface_at(&scene, Vec2::new(300.0, 300.0)), None);
    }
}
