//! Initial particle state from a distribution descriptor.
//!
//! [`SpawnContext`] wraps the RNG and exposes the sampling primitives;
//! [`generate`] applies them to a whole [`Config`] and produces a fresh
//! [`ParticleBuffer`].
//!
//! The sphere sampler is deliberately *not* volume-uniform: it draws the
//! radius uniformly, which concentrates particles toward the center. Keep it
//! that way; the look of the sphere and firework presets depends on it.

use crate::buffer::ParticleBuffer;
use crate::config::{Config, Distribution, Shape};
use crate::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Sampling helpers over a seeded RNG.
///
/// ```ignore
/// let mut ctx = SpawnContext::from_seed(7);
/// let p = ctx.random_in_ball(3.0);
/// let v = ctx.random_velocity(0.1);
/// ```
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Context seeded from the clock: different every program execution.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Reproducible context.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[-1, 1)`.
    #[inline]
    pub fn random_signed(&mut self) -> f32 {
        self.random() * 2.0 - 1.0
    }

    /// Point in a ball of `radius` using `theta ~ U(0, 2π)`,
    /// `phi = acos(U(-1, 1))`, `r ~ U(0, radius)`.
    pub fn random_in_ball(&mut self, radius: f32) -> Vec3 {
        let theta = self.random() * TAU;
        let phi = self.random_signed().acos();
        let r = self.random() * radius;

        Vec3::new(
            r * phi.sin() * theta.cos(),
            r * phi.sin() * theta.sin(),
            r * phi.cos(),
        )
    }

    /// Point in the box spanning `size` on each axis, centered at the origin.
    pub fn random_in_box(&mut self, size: [f32; 3]) -> Vec3 {
        Vec3::new(
            (self.random() - 0.5) * size[0],
            (self.random() - 0.5) * size[1],
            (self.random() - 0.5) * size[2],
        )
    }

    /// Initial position for `distribution`.
    pub fn random_position(&mut self, distribution: &Distribution) -> Vec3 {
        match distribution.shape {
            Shape::Sphere => self.random_in_ball(distribution.radius),
            Shape::Box => self.random_in_box(distribution.size),
        }
    }

    /// Per-axis `U(-turbulence, turbulence)`.
    pub fn random_velocity(&mut self, turbulence: f32) -> Vec3 {
        Vec3::new(
            self.random_signed() * turbulence,
            self.random_signed() * turbulence,
            self.random_signed() * turbulence,
        )
    }

    /// `base_size * U(0.5, 1.0)`.
    pub fn jittered_size(&mut self, base_size: f32) -> f32 {
        base_size * (0.5 + self.random() * 0.5)
    }
}

/// Build the initial state for every particle of `config`.
///
/// Per particle, in order: position, velocity, seed, rendered size. The
/// result always holds exactly `config.count` particles.
pub fn generate(config: &Config, ctx: &mut SpawnContext) -> ParticleBuffer {
    let count = config.count as usize;
    let mut buffer = ParticleBuffer::with_capacity(count);

    for _ in 0..count {
        let position = ctx.random_position(&config.distribution);
        let velocity = ctx.random_velocity(config.physics.turbulence);
        let seed = ctx.random();
        let size = ctx.jittered_size(config.appearance.size);
        buffer.push(position, velocity, seed, size);
    }

    buffer
}
