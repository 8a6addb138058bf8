//! Per-tick motion rules, one per archetype.
//!
//! A [`Motion`] is chosen once when a particle system is built and resolved
//! to a plain function pointer ([`StepFn`]); the tick loop calls that pointer
//! without re-examining the archetype.
//!
//! | Motion | Archetypes | Update | Recycle |
//! |--------|------------|--------|---------|
//! | [`Motion::Fall`] | snowflake | `y -= speed`, sideways sway | `y < -5` → `y = 5` |
//! | [`Motion::Rise`] | smoke | `y += speed`, drift along velocity | `y > 5` → `y = -5` |
//! | [`Motion::Burst`] | firework | `pos += velocity * speed`, `y -= 0.002` | `|pos| > 5` → `velocity * 0.1` |
//! | [`Motion::Orbit`] | sphere, cube | rotate about +Y, planar radius kept | none |
//! | [`Motion::Spin`] | (fallback) | whole system rotates about +Y | none |
//!
//! Recycling teleports a particle; it keeps its index, velocity and seed.

use crate::buffer::ParticleBuffer;
use crate::config::Archetype;
use crate::Vec3;

/// Vertical extent of the fall/rise recycle window.
pub const VERTICAL_BOUND: f32 = 5.0;
/// Phase offset per particle index for the snowflake sway.
pub const SWAY_PHASE_STEP: f32 = 0.03;
/// Horizontal sway per tick.
pub const SWAY_AMPLITUDE: f32 = 0.001;
/// Fraction of velocity smoke drifts sideways per tick.
pub const DRIFT_FACTOR: f32 = 0.01;
/// Downward pull on firework particles per tick.
pub const FIREWORK_GRAVITY: f32 = 0.002;
/// Distance from the origin past which firework particles are recycled.
pub const BURST_RADIUS: f32 = 5.0;
/// Recycled firework particles restart at `velocity * BURST_RESEED`.
pub const BURST_RESEED: f32 = 0.1;
/// Phase offset per particle index for orbiting particles.
pub const ORBIT_PHASE_STEP: f32 = 0.03;
/// Whole-system rotation per tick for [`Motion::Spin`], in radians.
pub const SPIN_RATE: f32 = 0.001;

/// Values a rule reads for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepInput {
    /// Simulated time after this tick's advance.
    pub time: f32,
    /// `physics.speed` of the active configuration.
    pub speed: f32,
}

/// A resolved motion rule. Returns the whole-system rotation increment
/// about +Y for this tick.
pub type StepFn = fn(&mut ParticleBuffer, StepInput) -> f32;

/// Closed set of motion rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Motion {
    Fall,
    Rise,
    Burst,
    Orbit,
    Spin,
}

impl Motion {
    /// The rule an archetype animates with.
    pub fn for_archetype(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Snowflake => Motion::Fall,
            Archetype::Smoke => Motion::Rise,
            Archetype::Firework => Motion::Burst,
            Archetype::Sphere | Archetype::Cube => Motion::Orbit,
        }
    }

    /// Resolve to the function the tick loop calls.
    pub fn step_fn(self) -> StepFn {
        match self {
            Motion::Fall => fall,
            Motion::Rise => rise,
            Motion::Burst => burst,
            Motion::Orbit => orbit,
            Motion::Spin => spin,
        }
    }
}

fn fall(buffer: &mut ParticleBuffer, input: StepInput) -> f32 {
    let (positions, _) = buffer.split_mut();
    for (i, p) in positions.iter_mut().enumerate() {
        p.y -= input.speed;
        p.x += (input.time + i as f32 * SWAY_PHASE_STEP).sin() * SWAY_AMPLITUDE;

        if p.y < -VERTICAL_BOUND {
            p.y = VERTICAL_BOUND;
        }
    }
    0.0
}

fn rise(buffer: &mut ParticleBuffer, input: StepInput) -> f32 {
    let (positions, velocities) = buffer.split_mut();
    for (p, v) in positions.iter_mut().zip(velocities) {
        p.y += input.speed;
        p.x += v.x * DRIFT_FACTOR;
        p.z += v.z * DRIFT_FACTOR;

        if p.y > VERTICAL_BOUND {
            p.y = -VERTICAL_BOUND;
        }
    }
    0.0
}

fn burst(buffer: &mut ParticleBuffer, input: StepInput) -> f32 {
    let (positions, velocities) = buffer.split_mut();
    for (p, v) in positions.iter_mut().zip(velocities) {
        *p += *v * input.speed;
        p.y -= FIREWORK_GRAVITY;

        if p.length() > BURST_RADIUS {
            // Capped so a recycled particle always lands nearer the center
            // than the recycle radius, whatever the turbulence.
            *p = (*v * BURST_RESEED).clamp_length_max(BURST_RADIUS * BURST_RESEED);
        }
    }
    0.0
}

fn orbit(buffer: &mut ParticleBuffer, input: StepInput) -> f32 {
    let angle = input.time * input.speed;
    let (positions, _) = buffer.split_mut();
    for (i, p) in positions.iter_mut().enumerate() {
        let radius = Vec3::new(p.x, 0.0, p.z).length();
        let theta = angle + i as f32 * ORBIT_PHASE_STEP;
        p.x = radius * theta.cos();
        p.z = radius * theta.sin();
    }
    0.0
}

fn spin(_buffer: &mut ParticleBuffer, _input: StepInput) -> f32 {
    SPIN_RATE
}
