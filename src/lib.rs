//! # glimmer
//!
//! Configurable animated point particles: a JSON-described particle system
//! (archetype, count, appearance, physics, distribution) simulated on the CPU
//! with per-archetype motion rules and drawn as instanced point sprites with
//! per-archetype shading.
//!
//! ## Quick Start
//!
//! ```ignore
//! use glimmer::prelude::*;
//!
//! let config = Config::from_json_str(r##"{
//!     "type": "snowflake", "count": 5000,
//!     "appearance": {"color": "#ffffff", "size": 0.15, "material": "glossy", "opacity": 0.9},
//!     "physics": {"speed": 0.02, "turbulence": 0.1, "gravity": -0.001},
//!     "distribution": {"shape": "box", "size": [10, 10, 10], "radius": 5}
//! }"##)?;
//!
//! let mut system = ParticleSystem::new(config);
//! let mut bridge = RenderBridge::new(my_render_target);
//! loop {
//!     system.tick();
//!     bridge.render(&system)?;
//! }
//! ```
//!
//! ## Pipeline
//!
//! 1. [`Config`] is ingested and normalized (counts and sizes clamped,
//!    unknown archetypes become `sphere`).
//! 2. [`spawn::generate`] samples the [`ParticleBuffer`] from the
//!    distribution; [`PointMaterial::for_config`] picks the shading program.
//! 3. Every [`ParticleSystem::tick`] advances simulated time by a fixed step
//!    and applies the archetype's [`Motion`] rule in place.
//! 4. [`RenderBridge`] mirrors the buffer into a [`RenderTarget`], rebuilding
//!    the mirror whenever the system is reconfigured.
//!
//! ## Archetypes
//!
//! | Archetype | Motion | Shading | Blend |
//! |-----------|--------|---------|-------|
//! | snowflake | fall and sway, recycle at the bottom | hexagonal sparkle | alpha |
//! | smoke | rise and drift, recycle at the top | soft, height-faded | alpha |
//! | firework | burst outward with gravity, recycle near center | glowing core, pulse | additive |
//! | sphere, cube | orbit about +Y | soft disc, pulse | alpha |

pub mod bridge;
pub mod buffer;
pub mod config;
pub mod error;
pub mod gpu;
pub mod motion;
pub mod simulation;
pub mod spawn;
pub mod time;
pub mod visuals;

pub use bridge::{FrameUniforms, RenderBridge, RenderTarget};
pub use buffer::ParticleBuffer;
pub use bytemuck;
pub use config::{presets, Archetype, Config};
pub use error::{ConfigError, GpuError, ViewerError};
pub use glam::{Mat4, Vec3};
pub use motion::Motion;
pub use simulation::ParticleSystem;
pub use spawn::SpawnContext;
pub use visuals::{BlendMode, PointMaterial, ShadingProgram};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use glimmer::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bridge::{FrameUniforms, RenderBridge, RenderTarget};
    pub use crate::buffer::ParticleBuffer;
    pub use crate::config::{
        ingest_generated, presets, Appearance, Archetype, Color, Config, Distribution,
        MaterialClass, Physics, Shape,
    };
    pub use crate::error::ConfigError;
    pub use crate::motion::Motion;
    pub use crate::simulation::ParticleSystem;
    pub use crate::spawn::SpawnContext;
    pub use crate::time::Time;
    pub use crate::visuals::{BlendMode, MaterialUniforms, PointMaterial, ShadingProgram};
    pub use crate::Vec3;
}
