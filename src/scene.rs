//! Compositor-side scene model: surfaces, stacking layers and the registry
//! that keeps every surface in at most one layer.
//!
//! This is the minimum the pager needs from a compositor.  Surfaces carry a
//! position, a size, an optional transform parent (the workspace anchor),
//! an optional transform link and a back-reference to their workspace.
//! Layers are ordered bottom to top; within a layer, later entries paint
//! above earlier ones.

use crate::output::Output;
use glam::{Mat4, Vec2};
use std::collections::{BTreeMap, HashMap};

/// Opaque surface handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u32);

impl SurfaceId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Opaque layer handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u32);

/// Axis-aligned rectangle in compositor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.y >= self.y && p.x < self.x + self.width && p.y < self.y + self.height
    }
}

/// What a surface is used for.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceRole {
    /// An ordinary client window.
    Toplevel,
    /// Invisible per-workspace pivot for transforms and clipping.
    Anchor,
    /// Desktop background shown in `layer` on the named output.
    Background { layer: LayerId, output: String },
}

/// One unit of renderable content.
#[derive(Debug, Clone)]
pub struct Surface {
    pub role: SurfaceRole,
    /// Position relative to the transform parent (screen space if none).
    pub position: Vec2,
    pub size: Vec2,
    pub mapped: bool,
    transform_parent: Option<SurfaceId>,
    transform: Option<Mat4>,
    workspace: Option<usize>,
    geometry_dirty: bool,
    damaged: bool,
}

impl Surface {
    fn new(role: SurfaceRole, rect: Rect) -> Self {
        Self {
            role,
            position: rect.origin(),
            size: Vec2::new(rect.width, rect.height),
            mapped: true,
            transform_parent: None,
            transform: None,
            workspace: None,
            geometry_dirty: false,
            damaged: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }

    pub fn transform_parent(&self) -> Option<SurfaceId> {
        self.transform_parent
    }

    /// Matrix linked into this surface's transformation chain, if any.
    pub fn transform(&self) -> Option<Mat4> {
        self.transform
    }

    /// Index of the workspace this surface belongs to.
    pub fn workspace(&self) -> Option<usize> {
        self.workspace
    }

    pub fn is_geometry_dirty(&self) -> bool {
        self.geometry_dirty
    }

    pub fn is_damaged(&self) -> bool {
        self.damaged
    }
}

/// An ordered stacking group of surfaces.
#[derive(Debug, Clone, Default)]
pub struct Layer {
    surfaces: Vec<SurfaceId>,
    clip: Option<Rect>,
}

impl Layer {
    /// Members, bottom first.
    pub fn surfaces(&self) -> &[SurfaceId] {
        &self.surfaces
    }

    pub fn clip(&self) -> Option<Rect> {
        self.clip
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

/// All surfaces and layers known to the shell.
#[derive(Debug)]
pub struct Scene {
    surfaces: BTreeMap<SurfaceId, Surface>,
    layers: BTreeMap<LayerId, Layer>,
    /// Layers that are part of the rendered stack, bottom first.
    stacking: Vec<LayerId>,
    /// `surface -> layer` membership registry.
    owner: HashMap<SurfaceId, LayerId>,
    limbo: LayerId,
    next_surface: u32,
    next_layer: u32,
    repaint_requests: u32,
}

impl Scene {
    /// Create an empty scene with a limbo layer on top of the stack.
    pub fn new() -> Self {
        let mut scene = Self {
            surfaces: BTreeMap::new(),
            layers: BTreeMap::new(),
            stacking: Vec::new(),
            owner: HashMap::new(),
            limbo: LayerId(0),
            next_surface: 1,
            next_layer: 0,
            repaint_requests: 0,
        };
        scene.limbo = scene.create_layer();
        scene.stacking.push(scene.limbo);
        scene
    }

    //  Surfaces

    pub fn create_surface(&mut self, role: SurfaceRole, rect: Rect) -> SurfaceId {
        let id = SurfaceId(self.next_surface);
        self.next_surface += 1;
        self.surfaces.insert(id, Surface::new(role, rect));
        id
    }

    /// Forget a surface, dropping its layer membership.
    pub fn destroy_surface(&mut self, id: SurfaceId) {
        self.remove_from_layer(id);
        self.surfaces.remove(&id);
        for surface in self.surfaces.values_mut() {
            if surface.transform_parent == Some(id) {
                surface.transform_parent = None;
            }
        }
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(&id)
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces.get_mut(&id)
    }

    pub fn surface_ids(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.surfaces.keys().copied()
    }

    pub fn set_position(&mut self, id: SurfaceId, position: Vec2) {
        if let Some(s) = self.surfaces.get_mut(&id) {
            s.position = position;
            s.geometry_dirty = true;
        }
    }

    pub fn position(&self, id: SurfaceId) -> Option<Vec2> {
        self.surfaces.get(&id).map(|s| s.position)
    }

    pub fn set_transform_parent(&mut self, id: SurfaceId, parent: Option<SurfaceId>) {
        if let Some(s) = self.surfaces.get_mut(&id) {
            s.transform_parent = parent;
            s.geometry_dirty = true;
        }
    }

    pub fn transform_parent(&self, id: SurfaceId) -> Option<SurfaceId> {
        self.surfaces.get(&id).and_then(|s| s.transform_parent)
    }

    /// Link `matrix` into the surface's transformation chain, or unlink with
    /// `None`.
    pub fn set_surface_transform(&mut self, id: SurfaceId, matrix: Option<Mat4>) {
        if let Some(s) = self.surfaces.get_mut(&id) {
            s.transform = matrix;
            s.geometry_dirty = true;
        }
    }

    pub fn set_workspace(&mut self, id: SurfaceId, workspace: Option<usize>) {
        if let Some(s) = self.surfaces.get_mut(&id) {
            s.workspace = workspace;
        }
    }

    pub fn workspace_of(&self, id: SurfaceId) -> Option<usize> {
        self.surfaces.get(&id).and_then(|s| s.workspace)
    }

    pub fn mark_geometry_dirty(&mut self, id: SurfaceId) {
        if let Some(s) = self.surfaces.get_mut(&id) {
            s.geometry_dirty = true;
        }
    }

    pub fn damage(&mut self, id: SurfaceId) {
        if let Some(s) = self.surfaces.get_mut(&id) {
            s.damaged = true;
        }
    }

    /// Hide a surface and take it out of the stack.
    pub fn unmap(&mut self, id: SurfaceId) {
        self.remove_from_layer(id);
        if let Some(s) = self.surfaces.get_mut(&id) {
            s.mapped = false;
        }
    }

    /// Reconfigure hook.  Backgrounds enforce one live background per
    /// output: any other mapped background on the same output is unmapped,
    /// and this one is resized to the output and added to its layer.
    pub fn configure(&mut self, id: SurfaceId, output: &Output) {
        let Some(SurfaceRole::Background { layer, .. }) = self.surfaces.get(&id).map(|s| s.role.clone())
        else {
            return;
        };

        let stale: Vec<SurfaceId> = self
            .surfaces
            .iter()
            .filter(|(other, s)| {
                **other != id
                    && s.mapped
                    && matches!(&s.role, SurfaceRole::Background { output: o, .. } if *o == output.name)
            })
            .map(|(other, _)| *other)
            .collect();
        for other in stale {
            self.unmap(other);
        }

        if let Some(s) = self.surfaces.get_mut(&id) {
            s.position = Vec2::ZERO;
            s.size = output.size();
            s.mapped = true;
            s.geometry_dirty = true;
        }
        self.add_to_layer(layer, id);
    }

    //  Layers

    /// Create a layer that is not yet part of the rendered stack.
    pub fn create_layer(&mut self) -> LayerId {
        let id = LayerId(self.next_layer);
        self.next_layer += 1;
        self.layers.insert(id, Layer::default());
        id
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    /// Rendered layers, bottom first.
    pub fn stacking(&self) -> &[LayerId] {
        &self.stacking
    }

    /// Place `layer` directly above `reference` in the stack.
    pub fn insert_layer_above(&mut self, layer: LayerId, reference: LayerId) {
        self.stacking.retain(|l| *l != layer);
        let at = self
            .stacking
            .iter()
            .position(|l| *l == reference)
            .map_or(self.stacking.len(), |i| i + 1);
        self.stacking.insert(at, layer);
    }

    /// Place `layer` directly below `reference` in the stack.
    pub fn insert_layer_below(&mut self, layer: LayerId, reference: LayerId) {
        self.stacking.retain(|l| *l != layer);
        let at = self
            .stacking
            .iter()
            .position(|l| *l == reference)
            .unwrap_or(0);
        self.stacking.insert(at, layer);
    }

    pub fn remove_layer_from_stack(&mut self, layer: LayerId) {
        self.stacking.retain(|l| *l != layer);
    }

    /// Add `surface` on top of `layer`, leaving whatever layer held it
    /// before.
    pub fn add_to_layer(&mut self, layer: LayerId, surface: SurfaceId) {
        if !self.surfaces.contains_key(&surface) || !self.layers.contains_key(&layer) {
            return;
        }
        self.remove_from_layer(surface);
        if let Some(l) = self.layers.get_mut(&layer) {
            l.surfaces.push(surface);
        }
        self.owner.insert(surface, layer);
    }

    /// Drop `surface` from its layer.  Returns the layer it was in.
    pub fn remove_from_layer(&mut self, surface: SurfaceId) -> Option<LayerId> {
        let layer = self.owner.remove(&surface)?;
        if let Some(l) = self.layers.get_mut(&layer) {
            l.surfaces.retain(|s| *s != surface);
        }
        Some(layer)
    }

    pub fn layer_of(&self, surface: SurfaceId) -> Option<LayerId> {
        self.owner.get(&surface).copied()
    }

    /// Raise `surface` to the top of its layer.
    pub fn restack(&mut self, surface: SurfaceId) {
        if let Some(layer) = self.layer_of(surface) {
            self.add_to_layer(layer, surface);
        }
    }

    /// Move `surface` into `parent`'s layer, directly above `parent`.
    pub fn stack_above(&mut self, surface: SurfaceId, parent: SurfaceId) {
        let Some(layer) = self.layer_of(parent) else {
            return;
        };
        if surface == parent || !self.surfaces.contains_key(&surface) {
            return;
        }
        self.remove_from_layer(surface);
        if let Some(l) = self.layers.get_mut(&layer) {
            let at = l
                .surfaces
                .iter()
                .position(|s| *s == parent)
                .map_or(l.surfaces.len(), |i| i + 1);
            l.surfaces.insert(at, surface);
        }
        self.owner.insert(surface, layer);
    }

    pub fn set_clip(&mut self, layer: LayerId, rect: Option<Rect>) {
        if let Some(l) = self.layers.get_mut(&layer) {
            l.clip = rect;
        }
    }

    pub fn layer_len(&self, layer: LayerId) -> usize {
        self.layers.get(&layer).map_or(0, Layer::len)
    }

    /// Overlay layer for surfaces detached from every workspace mid-drag.
    pub fn limbo(&self) -> LayerId {
        self.limbo
    }

    pub fn put_in_limbo(&mut self, surface: SurfaceId) {
        self.add_to_layer(self.limbo, surface);
    }

    //  Repaint

    pub fn schedule_repaint(&mut self) {
        self.repaint_requests += 1;
    }

    pub fn repaint_requests(&self) -> u32 {
        self.repaint_requests
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
