//! The particle system context object.
//!
//! A [`ParticleSystem`] owns everything one configuration needs: the
//! normalized [`Config`], the [`ParticleBuffer`], the [`PointMaterial`], the
//! resolved motion rule and the simulation clock. The caller drives it with
//! [`ParticleSystem::tick`] once per display refresh and swaps configurations
//! with [`ParticleSystem::reconfigure`]; both take `&mut self`, so a tick
//! never observes a half-built buffer.
//!
//! ```ignore
//! use glimmer::prelude::*;
//!
//! let mut system = ParticleSystem::new(presets::snowflake());
//! loop {
//!     system.tick();
//!     // upload system.buffer().positions() and draw
//! }
//! ```

use crate::buffer::ParticleBuffer;
use crate::config::Config;
use crate::error::ConfigError;
use crate::motion::{Motion, StepFn, StepInput};
use crate::spawn::{self, SpawnContext};
use crate::time::Time;
use crate::visuals::PointMaterial;
use std::f32::consts::TAU;
use std::sync::atomic::{AtomicU64, Ordering};

/// Build generations are unique across every system in the process, so a
/// render target can tell a replaced system from the one it mirrors.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(0);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Simulation state for the active configuration.
pub struct ParticleSystem {
    config: Config,
    buffer: ParticleBuffer,
    material: PointMaterial,
    motion: Motion,
    step: StepFn,
    time: Time,
    spawn: SpawnContext,
    /// Fresh on every (re)build; render targets compare it to know when to
    /// discard their mirror.
    generation: u64,
    /// Whole-system rotation about +Y, in radians.
    rotation_y: f32,
}

impl ParticleSystem {
    /// Build a system from `config`, normalizing it first.
    pub fn new(config: Config) -> Self {
        Self::with_spawn(config, SpawnContext::from_entropy())
    }

    /// Build a reproducible system: the same seed and configurations give the
    /// same particles.
    pub fn with_seed(config: Config, seed: u64) -> Self {
        Self::with_spawn(config, SpawnContext::from_seed(seed))
    }

    fn with_spawn(config: Config, mut spawn: SpawnContext) -> Self {
        let config = config.normalized();
        let buffer = spawn::generate(&config, &mut spawn);
        let material = PointMaterial::for_config(&config);
        let motion = Motion::for_archetype(config.archetype);

        tracing::info!(
            archetype = config.archetype.name(),
            count = buffer.len(),
            "built particle system"
        );

        Self {
            config,
            buffer,
            material,
            motion,
            step: motion.step_fn(),
            time: Time::new(),
            spawn,
            generation: next_generation(),
            rotation_y: 0.0,
        }
    }

    /// Replace the configuration and rebuild buffer and material from scratch.
    ///
    /// The clock keeps running; the system rotation restarts at zero.
    pub fn reconfigure(&mut self, config: Config) {
        let config = config.normalized();
        let buffer = spawn::generate(&config, &mut self.spawn);
        let material = PointMaterial::for_config(&config);
        let motion = Motion::for_archetype(config.archetype);
        let generation = next_generation();

        tracing::info!(
            archetype = config.archetype.name(),
            count = buffer.len(),
            generation,
            "rebuilt particle system"
        );

        self.config = config;
        self.buffer = buffer;
        self.material = material;
        self.motion = motion;
        self.step = motion.step_fn();
        self.rotation_y = 0.0;
        self.generation = generation;
        self.material.set_time(self.time.elapsed());
    }

    /// Advance simulated time by one step and move every particle.
    ///
    /// Returns `false` (and changes nothing) while paused.
    pub fn tick(&mut self) -> bool {
        let Some(time) = self.time.advance() else {
            return false;
        };

        let input = StepInput {
            time,
            speed: self.config.physics.speed,
        };
        let spin = (self.step)(&mut self.buffer, input);
        self.rotation_y = (self.rotation_y + spin) % TAU;
        self.material.set_time(time);
        true
    }

    /// Override the motion rule until the next reconfiguration.
    pub fn set_motion(&mut self, motion: Motion) {
        tracing::debug!(?motion, "motion override");
        self.motion = motion;
        self.step = motion.step_fn();
    }

    /// The normalized active configuration.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn buffer(&self) -> &ParticleBuffer {
        &self.buffer
    }

    #[inline]
    pub fn buffer_mut(&mut self) -> &mut ParticleBuffer {
        &mut self.buffer
    }

    #[inline]
    pub fn material(&self) -> &PointMaterial {
        &self.material
    }

    #[inline]
    pub fn motion(&self) -> Motion {
        self.motion
    }

    #[inline]
    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Clock controls: pause, time scale.
    #[inline]
    pub fn time_mut(&mut self) -> &mut Time {
        &mut self.time
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// The active configuration as the export artifact.
    pub fn export_json(&self) -> Result<String, ConfigError> {
        self.config.to_json_pretty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{presets, Archetype};

    #[test]
    fn test_buffer_matches_count() {
        for archetype in Archetype::ALL {
            let config = presets::preset(archetype);
            let system = ParticleSystem::with_seed(config.clone(), 1);
            assert_eq!(system.buffer().len(), config.count as usize);
        }
    }

    #[test]
    fn test_build_clamps_config() {
        let mut config = presets::sphere();
        config.count = 50_000;
        config.appearance.size = 0.5;
        let system = ParticleSystem::with_seed(config, 2);
        assert_eq!(system.buffer().len(), 20_000);
        assert_eq!(system.config().appearance.size, 0.2);
        assert!((system.material().uniforms.size_scale - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_tick_keeps_identity() {
        let mut system = ParticleSystem::with_seed(presets::firework(), 3);
        let seeds = system.buffer().seeds().to_vec();
        let velocities = system.buffer().velocities().to_vec();
        let sizes = system.buffer().sizes().to_vec();

        for _ in 0..500 {
            system.tick();
        }

        assert_eq!(system.buffer().seeds(), &seeds[..]);
        assert_eq!(system.buffer().velocities(), &velocities[..]);
        assert_eq!(system.buffer().sizes(), &sizes[..]);
    }

    #[test]
    fn test_tick_updates_time_uniform() {
        let mut system = ParticleSystem::with_seed(presets::smoke(), 4);
        system.tick();
        system.tick();
        assert!((system.material().uniforms.time - 0.02).abs() < 1e-6);
        assert_eq!(system.time().tick(), 2);
    }

    #[test]
    fn test_paused_tick_moves_nothing() {
        let mut system = ParticleSystem::with_seed(presets::snowflake(), 5);
        let before = system.buffer().positions().to_vec();
        system.time_mut().pause();
        assert!(!system.tick());
        assert_eq!(system.buffer().positions(), &before[..]);
        assert_eq!(system.material().uniforms.time, 0.0);
    }

    #[test]
    fn test_reconfigure_rebuilds_everything() {
        let mut system = ParticleSystem::with_seed(presets::snowflake(), 6);
        system.tick();
        let first = system.generation();

        system.reconfigure(presets::firework());
        assert_ne!(system.generation(), first);
        assert_eq!(system.config().archetype, Archetype::Firework);
        assert_eq!(system.buffer().len(), 3000);
        assert_eq!(system.motion(), Motion::Burst);
        assert_eq!(system.material().program, crate::visuals::ShadingProgram::Firework);
        assert!((system.material().uniforms.time - system.time().elapsed()).abs() < 1e-6);
    }

    #[test]
    fn test_separate_systems_have_distinct_generations() {
        let a = ParticleSystem::with_seed(presets::snowflake(), 9);
        let b = ParticleSystem::with_seed(presets::snowflake(), 9);
        assert_ne!(a.generation(), b.generation());
    }

    #[test]
    fn test_spin_override_rotates_system() {
        let mut system = ParticleSystem::with_seed(presets::cube(), 7);
        let before = system.buffer().positions().to_vec();
        system.set_motion(Motion::Spin);
        for _ in 0..10 {
            system.tick();
        }
        assert!((system.rotation_y() - 0.01).abs() < 1e-6);
        assert_eq!(system.buffer().positions(), &before[..]);

        system.reconfigure(presets::cube());
        assert_eq!(system.motion(), Motion::Orbit);
        assert_eq!(system.rotation_y(), 0.0);
    }

    #[test]
    fn test_export_is_the_config() {
        let system = ParticleSystem::with_seed(presets::sphere(), 8);
        let json = system.export_json().unwrap();
        let back = Config::from_json_str(&json).unwrap();
        assert_eq!(&back, system.config());
    }
}
