//! Data transfer between a [`ParticleSystem`] and whatever draws it.
//!
//! The bridge owns a [`RenderTarget`] and keeps its mirror of the particle
//! buffer current: when the system's build generation changes the mirror is
//! discarded and rebuilt, then every frame pushes positions and uniforms and
//! issues the draw. No simulation logic lives here.

use crate::buffer::ParticleBuffer;
use crate::simulation::ParticleSystem;
use crate::visuals::{MaterialUniforms, PointMaterial};
use crate::Vec3;

/// Everything that changes per tick apart from positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub material: MaterialUniforms,
    /// Whole-system rotation about +Y, in radians.
    pub rotation_y: f32,
}

impl FrameUniforms {
    pub fn from_system(system: &ParticleSystem) -> Self {
        Self {
            material: system.material().uniforms,
            rotation_y: system.rotation_y(),
        }
    }
}

/// A GPU-side (or any other) mirror of one particle system.
pub trait RenderTarget {
    type Error;

    /// Drop the current mirror and create one for `material` and `buffer`.
    /// Static per-particle attributes are written here, once.
    fn rebuild(&mut self, material: &PointMaterial, buffer: &ParticleBuffer);

    /// Push this tick's positions and uniforms.
    fn upload(&mut self, positions: &[Vec3], frame: &FrameUniforms);

    /// Issue the draw call.
    fn draw(&mut self) -> Result<(), Self::Error>;
}

/// Keeps a [`RenderTarget`] in step with a [`ParticleSystem`].
pub struct RenderBridge<T: RenderTarget> {
    target: T,
    mirrored_generation: Option<u64>,
}

impl<T: RenderTarget> RenderBridge<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            mirrored_generation: None,
        }
    }

    #[inline]
    pub fn target(&self) -> &T {
        &self.target
    }

    #[inline]
    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Force a rebuild on the next sync, e.g. after the target lost its
    /// resources.
    pub fn invalidate(&mut self) {
        self.mirrored_generation = None;
    }

    /// Rebuild the mirror if the system was reconfigured, then upload.
    pub fn sync(&mut self, system: &ParticleSystem) {
        let generation = system.generation();
        if self.mirrored_generation != Some(generation) {
            tracing::debug!(generation, count = system.buffer().len(), "rebuilding render target");
            self.target.rebuild(system.material(), system.buffer());
            self.mirrored_generation = Some(generation);
        }
        self.target
            .upload(system.buffer().positions(), &FrameUniforms::from_system(system));
    }

    /// Sync and draw.
    pub fn render(&mut self, system: &ParticleSystem) -> Result<(), T::Error> {
        self.sync(system);
        self.target.draw()
    }
}
