//! Owned per-particle state for one configuration.
//!
//! Struct-of-arrays layout: index `i` in every array is particle `i`.
//! Positions are `Vec3` (12-byte stride, tightly packed) so the slice can be
//! handed to the GPU with `bytemuck::cast_slice` without repacking.
//!
//! Only positions are mutable after creation. Velocity, seed and rendered
//! size are fixed when the buffer is generated and are the particle's
//! identity across recycle events.

use crate::Vec3;

/// Per-instance render attributes: `[rendered_size, seed]`.
pub type InstanceAttributes = [f32; 2];

/// All particles of the active configuration.
#[derive(Clone, Debug, Default)]
pub struct ParticleBuffer {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    seeds: Vec<f32>,
    sizes: Vec<f32>,
}

impl ParticleBuffer {
    pub(crate) fn with_capacity(count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(count),
            velocities: Vec::with_capacity(count),
            seeds: Vec::with_capacity(count),
            sizes: Vec::with_capacity(count),
        }
    }

    pub(crate) fn push(&mut self, position: Vec3, velocity: Vec3, seed: f32, size: f32) {
        self.positions.push(position);
        self.velocities.push(velocity);
        self.seeds.push(seed);
        self.sizes.push(size);
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the buffer holds no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Current world-space positions.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Mutable positions, for hosts that teleport particles directly.
    #[inline]
    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    /// Creation-time velocities (direction / turbulence seeds).
    #[inline]
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    /// Creation-time phase seeds in `[0, 1)`.
    #[inline]
    pub fn seeds(&self) -> &[f32] {
        &self.seeds
    }

    /// Jittered per-particle point sizes.
    #[inline]
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Positions as raw bytes for vertex upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Static per-instance attributes, built once per (re)build.
    pub fn instance_attributes(&self) -> Vec<InstanceAttributes> {
        self.sizes
            .iter()
            .zip(&self.seeds)
            .map(|(&size, &seed)| [size, seed])
            .collect()
    }

    /// Positions mutably alongside the read-only identity arrays.
    pub(crate) fn split_mut(&mut self) -> (&mut [Vec3], &[Vec3]) {
        (&mut self.positions, &self.velocities)
    }
}
