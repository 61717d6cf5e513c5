//! Scale + translate transforms with linear per-component interpolation.
//!
//! A [`Transform`] tracks three states, each a scale vector and a translate
//! vector: `source`, `current` and `target`.  Builders ([`scale`],
//! [`translate`]) edit the target; [`apply`] jumps there and [`animate`]
//! interpolates there through an owned [`Animation`] running 0 → 1.
//!
//! Scale and translation are kept as separate vectors instead of being
//! recovered from the matrix, so every frame is six independent lerps.
//!
//! [`scale`]: Transform::scale
//! [`translate`]: Transform::translate
//! [`apply`]: Transform::apply
//! [`animate`]: Transform::animate

use crate::animation::{Animation, RunFlags};
use crate::curve::Curve;
use crate::output::Output;
use crate::signal::Signal;
use glam::{Mat4, Vec3};

/// One endpoint of an interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    pub scale: Vec3,
    pub translate: Vec3,
}

impl TransformState {
    pub const IDENTITY: Self = Self {
        scale: Vec3::ONE,
        translate: Vec3::ZERO,
    };

    /// `self + (other - self) * t`, component by component.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            scale: self.scale + (other.scale - self.scale) * t,
            translate: self.translate + (other.translate - self.translate) * t,
        }
    }

    /// Translation applied after scale.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translate) * Mat4::from_scale(self.scale)
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// An animatable scale + translate transform.
#[derive(Debug)]
pub struct Transform {
    matrix: Mat4,
    animation: Animation,
    source: TransformState,
    current: TransformState,
    target: TransformState,
    updated: Signal<()>,
}

impl Transform {
    pub fn new() -> Self {
        let mut animation = Animation::new();
        animation.set_start(0.0);
        animation.set_target(1.0);
        Self {
            matrix: Mat4::IDENTITY,
            animation,
            source: TransformState::IDENTITY,
            current: TransformState::IDENTITY,
            target: TransformState::IDENTITY,
            updated: Signal::new(),
        }
    }

    /// Set the target back to identity and clear the immediate matrix.
    pub fn reset(&mut self) {
        self.matrix = Mat4::IDENTITY;
        self.target = TransformState::IDENTITY;
    }

    /// Compose a scale onto the immediate matrix and make it the target scale.
    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        let v = Vec3::new(x, y, z);
        self.matrix = Mat4::from_scale(v) * self.matrix;
        self.target.scale = v;
    }

    /// Compose a translation onto the immediate matrix and make it the
    /// target translation.
    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        let v = Vec3::new(x, y, z);
        self.matrix = Mat4::from_translation(v) * self.matrix;
        self.target.translate = v;
    }

    /// Jump to the target without animating.
    pub fn apply(&mut self) {
        self.current = self.target;
        self.matrix = self.current.to_matrix();
    }

    /// Interpolate from the current state to the target over `duration` ms.
    ///
    /// Calling this mid-flight restarts from wherever the previous
    /// trajectory had got to.
    pub fn animate(&mut self, output: &Output, duration: u32) {
        self.matrix = self.current.to_matrix();
        self.source = self.current;
        self.animation.set_start(0.0);
        self.animation.set_target(1.0);
        self.animation.run(output, duration, RunFlags::None);
    }

    /// Abandon an in-flight animation, leaving `current` where it is.
    pub fn stop(&mut self) {
        self.animation.stop();
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_running()
    }

    pub fn set_curve(&mut self, curve: Curve) {
        self.animation.set_curve(curve);
    }

    /// Forward a frame tick to the driving animation.
    ///
    /// Returns `true` if the current state changed.
    pub fn tick(&mut self, output: &Output, now: u32) -> bool {
        match self.animation.tick(output, now) {
            Some(sample) => {
                self.update(sample.value);
                true
            }
            None => false,
        }
    }

    fn update(&mut self, t: f32) {
        self.current = self.source.lerp(&self.target, t);
        self.matrix = self.current.to_matrix();
        self.updated.emit(&());
    }

    pub fn current_translation(&self) -> Vec3 {
        self.current.translate
    }

    pub fn current_scale(&self) -> Vec3 {
        self.current.scale
    }

    pub fn target_translation(&self) -> Vec3 {
        self.target.translate
    }

    pub fn target_scale(&self) -> Vec3 {
        self.target.scale
    }

    pub fn source(&self) -> &TransformState {
        &self.source
    }

    pub fn current(&self) -> &TransformState {
        &self.current
    }

    pub fn target(&self) -> &TransformState {
        &self.target
    }

    /// The renderable matrix.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Fires after every interpolation step.
    ///
    /// The owning workspace reacts to the return value of
    /// [`tick`](Self::tick) instead; this is for outside observers such as
    /// a renderer tracking one transform.
    pub fn updated(&mut self) -> &mut Signal<()> {
        &mut self.updated
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// The copy keeps all three states but starts idle and unobserved.
impl Clone for Transform {
    fn clone(&self) -> Self {
        Self {
            matrix: self.matrix,
            animation: self.animation.clone(),
            source: self.source,
            current: self.current,
            target: self.target,
            updated: Signal::new(),
        }
    }
}
