//! Particle system configuration: the data contract every other module reads.
//!
//! A [`Config`] is only ever produced by ingestion ([`Config::from_json_str`],
//! [`Config::from_value`], [`Config::load`], [`ingest_generated`]) or from a
//! [`presets`] entry. Ingestion rejects a document that lacks one of the five
//! required top-level fields and normalizes everything else:
//!
//! | Field | Policy |
//! |-------|--------|
//! | `type` | unknown names become `sphere` |
//! | `count` | clamped to `[1000, 20000]` |
//! | `appearance.size` | clamped to `[0.01, 0.2]` |
//! | `appearance.opacity` | clamped to `[0, 1]` |
//! | `physics.speed`, `physics.turbulence` | clamped to `>= 0` |
//! | `distribution.radius`, `distribution.size` | clamped to `>= 0` |
//!
//! Export is the normalized configuration serialized verbatim.
//!
//! ```ignore
//! let config = Config::from_json_str(r##"{
//!     "type": "firework", "count": 50000,
//!     "appearance": {"color": "#ff00ff", "size": 0.5},
//!     "physics": {"speed": 0.1},
//!     "distribution": {"shape": "sphere", "radius": 0.2}
//! }"##)?;
//! assert_eq!(config.count, 20_000);
//! assert_eq!(config.appearance.size, 0.2);
//! ```

mod color;
pub mod presets;

pub use color::Color;

use crate::error::ConfigError;
use color::ColorInput;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Smallest particle count a configuration may request.
pub const MIN_COUNT: u32 = 1_000;
/// Largest particle count a configuration may request.
pub const MAX_COUNT: u32 = 20_000;
/// Smallest base point size.
pub const MIN_SIZE: f32 = 0.01;
/// Largest base point size.
pub const MAX_SIZE: f32 = 0.2;

/// Top-level fields that must be present for ingestion to succeed.
pub const REQUIRED_FIELDS: [&str; 5] = ["type", "count", "appearance", "physics", "distribution"];

/// Particle behavior class, controlling both the motion rule and the shading rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    /// Falling, swaying flakes with a hexagonal sparkle.
    Snowflake,
    /// Rising, drifting soft puffs.
    Smoke,
    /// Outward burst with additive glow.
    Firework,
    /// Orbiting cloud (default for unknown names).
    #[default]
    Sphere,
    /// Orbiting box-shaped cloud.
    Cube,
}

impl Archetype {
    /// Every archetype, in preset order.
    pub const ALL: [Archetype; 5] = [
        Archetype::Snowflake,
        Archetype::Smoke,
        Archetype::Firework,
        Archetype::Sphere,
        Archetype::Cube,
    ];

    /// The schema name of this archetype.
    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Snowflake => "snowflake",
            Archetype::Smoke => "smoke",
            Archetype::Firework => "firework",
            Archetype::Sphere => "sphere",
            Archetype::Cube => "cube",
        }
    }

    /// Parse a schema name. Returns `None` for anything unrecognized.
    pub fn from_name(name: &str) -> Option<Self> {
        Archetype::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Speed used when a configuration leaves `physics.speed` out.
    pub fn default_speed(&self) -> f32 {
        match self {
            Archetype::Snowflake => 0.02,
            Archetype::Smoke => 0.03,
            Archetype::Firework => 0.08,
            Archetype::Sphere | Archetype::Cube => 0.1,
        }
    }
}

/// Surface class hint. Carried through ingestion and export; shading is keyed
/// by the archetype.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialClass {
    Matte,
    #[default]
    Glossy,
    Emissive,
}

impl MaterialClass {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "matte" => Some(MaterialClass::Matte),
            "glossy" => Some(MaterialClass::Glossy),
            "emissive" => Some(MaterialClass::Emissive),
            _ => None,
        }
    }
}

/// Initial spatial sampling rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Angle-uniform, radius-uniform ball of `radius`.
    Sphere,
    /// Axis-independent uniform box spanning `size`.
    #[default]
    Box,
}

/// How particles look.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Appearance {
    pub color: Color,
    /// Base point size, `[0.01, 0.2]`.
    pub size: f32,
    pub material: MaterialClass,
    /// `[0, 1]`.
    pub opacity: f32,
}

/// Motion parameters read by the simulation step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Physics {
    /// Per-tick displacement scale, `>= 0`.
    pub speed: f32,
    /// Per-axis velocity seed magnitude, `>= 0`.
    pub turbulence: f32,
    /// Signed vertical acceleration hint.
    pub gravity: f32,
}

/// Initial placement of particles.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Distribution {
    pub shape: Shape,
    /// Box extents; each axis samples `[-size/2, size/2]`.
    pub size: [f32; 3],
    /// Maximum radius of the sphere shape.
    pub radius: f32,
}

/// A complete, normalized particle system configuration.
///
/// Replaced wholesale on change; a running [`crate::ParticleSystem`] keeps
/// its own copy.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Config {
    #[serde(rename = "type")]
    pub archetype: Archetype,
    pub count: u32,
    pub appearance: Appearance,
    pub physics: Physics,
    pub distribution: Distribution,
}

impl Config {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Validate an already-parsed JSON value.
    ///
    /// Fails with [`ConfigError::MissingField`] naming the first absent
    /// required field; never builds a partially defaulted configuration.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let object = value.as_object().ok_or(ConfigError::NotAnObject)?;
        for field in REQUIRED_FIELDS {
            if object.get(field).map_or(true, Value::is_null) {
                return Err(ConfigError::MissingField(field));
            }
        }

        let raw: RawConfig = serde_json::from_value(value)?;
        raw.into_config()
    }

    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Write the configuration as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// The exported artifact: this configuration, verbatim.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Suggested file name for an export, e.g. `particle-config-smoke.json`.
    pub fn export_file_name(&self) -> String {
        format!("particle-config-{}.json", self.archetype.name())
    }

    /// Switch to the preset for `archetype`, keeping this configuration's
    /// particle count, point size and speed.
    pub fn with_archetype(&self, archetype: Archetype) -> Self {
        let mut next = presets::preset(archetype);
        next.count = self.count;
        next.appearance.size = self.appearance.size;
        next.physics.speed = self.physics.speed;
        next
    }

    /// Apply every clamp in the normalization policy.
    ///
    /// Idempotent. Ingestion already calls this; [`crate::ParticleSystem`]
    /// calls it again so hand-built configurations obey the same bounds.
    pub fn normalized(mut self) -> Self {
        self.count = self.count.clamp(MIN_COUNT, MAX_COUNT);

        let a = &mut self.appearance;
        a.size = clamp_field("appearance.size", a.size, MIN_SIZE, MAX_SIZE);
        a.opacity = clamp_field("appearance.opacity", a.opacity, 0.0, 1.0);
        a.color = Color::rgb(a.color.0[0], a.color.0[1], a.color.0[2]);

        let p = &mut self.physics;
        p.speed = clamp_field("physics.speed", p.speed, 0.0, f32::MAX);
        p.turbulence = clamp_field("physics.turbulence", p.turbulence, 0.0, f32::MAX);
        p.gravity = clamp_field("physics.gravity", p.gravity, f32::MIN, f32::MAX);

        let d = &mut self.distribution;
        d.radius = clamp_field("distribution.radius", d.radius, 0.0, f32::MAX);
        for extent in &mut d.size {
            *extent = clamp_field("distribution.size", *extent, 0.0, f32::MAX);
        }

        self
    }
}

/// Validate the text returned by the external text-to-configuration service.
///
/// The whole response is tried as JSON first; if that fails, the span from the
/// first `{` to the last `}` is parsed instead, so prose or code fences around
/// the object are tolerated.
pub fn ingest_generated(response: &str) -> Result<Config, ConfigError> {
    let value = match serde_json::from_str::<Value>(response) {
        Ok(value) => value,
        Err(_) => {
            let start = response.find('{').ok_or(ConfigError::NoJsonObject)?;
            let end = response.rfind('}').ok_or(ConfigError::NoJsonObject)?;
            if end < start {
                return Err(ConfigError::NoJsonObject);
            }
            debug!("extracted JSON object from generator response");
            serde_json::from_str(&response[start..=end])?
        }
    };
    Config::from_value(value)
}

fn clamp_field(name: &str, value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        warn!("{} is NaN; using {}", name, min.max(0.0).min(max));
        return min.max(0.0).min(max);
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        debug!("{} clamped from {} to {}", name, value, clamped);
    }
    clamped
}

// Wire shape accepted on ingestion. Nested fields are optional and fall back
// to the generator's documented defaults.

#[derive(Deserialize)]
struct RawConfig {
    /// Any JSON value; anything but a known name falls back to sphere.
    #[serde(rename = "type")]
    archetype: Value,
    count: f64,
    appearance: RawAppearance,
    physics: RawPhysics,
    distribution: RawDistribution,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawAppearance {
    color: Option<ColorInput>,
    size: Option<f32>,
    material: Option<String>,
    opacity: Option<f32>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawPhysics {
    speed: Option<f32>,
    turbulence: Option<f32>,
    gravity: Option<f32>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawDistribution {
    shape: Option<String>,
    size: Option<[f32; 3]>,
    radius: Option<f32>,
}

impl RawConfig {
    fn into_config(self) -> Result<Config, ConfigError> {
        let archetype = self
            .archetype
            .as_str()
            .and_then(Archetype::from_name)
            .unwrap_or_else(|| {
                warn!("unknown particle type {}; using sphere", self.archetype);
                Archetype::Sphere
            });

        let count = if self.count.is_finite() {
            self.count.round().clamp(MIN_COUNT as f64, MAX_COUNT as f64) as u32
        } else {
            MIN_COUNT
        };
        if count as f64 != self.count {
            debug!("count normalized from {} to {}", self.count, count);
        }

        let color = match self.appearance.color {
            Some(input) => input.into_color()?,
            None => Color::WHITE,
        };
        let material = match self.appearance.material.as_deref() {
            Some(name) => MaterialClass::from_name(name).unwrap_or_else(|| {
                warn!("unknown material '{}'; using glossy", name);
                MaterialClass::Glossy
            }),
            None => MaterialClass::Glossy,
        };

        let shape = match self.distribution.shape.as_deref() {
            Some("sphere") => Shape::Sphere,
            _ => Shape::Box,
        };

        let config = Config {
            archetype,
            count,
            appearance: Appearance {
                color,
                size: self.appearance.size.unwrap_or(0.15),
                material,
                opacity: self.appearance.opacity.unwrap_or(0.9),
            },
            physics: Physics {
                speed: self.physics.speed.unwrap_or_else(|| archetype.default_speed()),
                turbulence: self.physics.turbulence.unwrap_or(0.1),
                gravity: self.physics.gravity.unwrap_or(0.0),
            },
            distribution: Distribution {
                shape,
                size: self.distribution.size.unwrap_or([10.0, 10.0, 10.0]),
                radius: self.distribution.radius.unwrap_or(3.0),
            },
        };
        Ok(config.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_document() -> Value {
        json!({
            "type": "firework",
            "count": 5000,
            "appearance": {"color": "#FF00FF", "size": 0.05, "material": "emissive", "opacity": 1.0},
            "physics": {"speed": 0.15, "turbulence": 0.4, "gravity": -0.002},
            "distribution": {"shape": "sphere", "size": [1, 1, 1], "radius": 0.3}
        })
    }

    #[test]
    fn test_full_document_round_trips_verbatim() {
        let config = Config::from_value(full_document()).unwrap();
        assert_eq!(config.archetype, Archetype::Firework);
        assert_eq!(config.count, 5000);
        assert_eq!(config.appearance.material, MaterialClass::Emissive);
        assert_eq!(config.distribution.shape, Shape::Sphere);

        let exported: Value = serde_json::from_str(&config.to_json_pretty().unwrap()).unwrap();
        assert_eq!(exported["type"], "firework");
        assert_eq!(exported["appearance"]["color"], "#ff00ff");
        assert_eq!(exported["distribution"]["shape"], "sphere");
        assert_eq!(Config::from_value(exported).unwrap(), config);
    }

    #[test]
    fn test_each_missing_field_is_named() {
        for field in REQUIRED_FIELDS {
            let mut doc = full_document();
            doc.as_object_mut().unwrap().remove(field);
            match Config::from_value(doc) {
                Err(ConfigError::MissingField(name)) => assert_eq!(name, field),
                other => panic!("expected MissingField({}), got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_null_field_counts_as_missing() {
        let mut doc = full_document();
        doc["physics"] = Value::Null;
        assert!(matches!(Config::from_value(doc), Err(ConfigError::MissingField("physics"))));
    }

    #[test]
    fn test_not_an_object() {
        assert!(matches!(Config::from_json_str("[1, 2]"), Err(ConfigError::NotAnObject)));
    }

    #[test]
    fn test_clamps() {
        let mut doc = full_document();
        doc["count"] = json!(50000);
        doc["appearance"]["size"] = json!(0.5);
        doc["appearance"]["opacity"] = json!(3.0);
        doc["physics"]["speed"] = json!(-1.0);
        let config = Config::from_value(doc).unwrap();
        assert_eq!(config.count, MAX_COUNT);
        assert_eq!(config.appearance.size, MAX_SIZE);
        assert_eq!(config.appearance.opacity, 1.0);
        assert_eq!(config.physics.speed, 0.0);

        let mut doc = full_document();
        doc["count"] = json!(10);
        doc["appearance"]["size"] = json!(0.0001);
        let config = Config::from_value(doc).unwrap();
        assert_eq!(config.count, MIN_COUNT);
        assert_eq!(config.appearance.size, MIN_SIZE);
    }

    #[test]
    fn test_unknown_archetype_becomes_sphere() {
        let mut doc = full_document();
        doc["type"] = json!("tornado");
        let config = Config::from_value(doc).unwrap();
        assert_eq!(config.archetype, Archetype::Sphere);
    }

    #[test]
    fn test_non_string_archetype_becomes_sphere() {
        for value in [json!(42), json!(true), json!(["snowflake"]), json!({"name": "smoke"})] {
            let mut doc = full_document();
            doc["type"] = value;
            let config = Config::from_value(doc).unwrap();
            assert_eq!(config.archetype, Archetype::Sphere);
        }
    }

    #[test]
    fn test_nested_defaults() {
        let config = Config::from_json_str(
            r#"{"type": "smoke", "count": 2000, "appearance": {}, "physics": {}, "distribution": {}}"#,
        )
        .unwrap();
        assert_eq!(config.appearance.color, Color::WHITE);
        assert_eq!(config.appearance.size, 0.15);
        assert_eq!(config.appearance.opacity, 0.9);
        assert_eq!(config.physics.speed, 0.03);
        assert_eq!(config.physics.turbulence, 0.1);
        assert_eq!(config.distribution.shape, Shape::Box);
        assert_eq!(config.distribution.size, [10.0, 10.0, 10.0]);
        assert_eq!(config.distribution.radius, 3.0);
    }

    #[test]
    fn test_wrong_type_is_json_error() {
        let mut doc = full_document();
        doc["count"] = json!("lots");
        assert!(matches!(Config::from_value(doc), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_ingest_generated_with_surrounding_prose() {
        let response = format!("Here you go:\n```json\n{}\n```", full_document());
        let config = ingest_generated(&response).unwrap();
        assert_eq!(config.archetype, Archetype::Firework);

        assert!(matches!(ingest_generated("no json here"), Err(ConfigError::NoJsonObject)));
        assert!(matches!(ingest_generated("} backwards {"), Err(ConfigError::NoJsonObject)));
    }

    #[test]
    fn test_with_archetype_preserves_user_adjustments() {
        let mut current = presets::preset(Archetype::Snowflake);
        current.count = 12_345;
        current.appearance.size = 0.07;
        current.physics.speed = 0.33;

        let next = current.with_archetype(Archetype::Smoke);
        assert_eq!(next.archetype, Archetype::Smoke);
        assert_eq!(next.count, 12_345);
        assert_eq!(next.appearance.size, 0.07);
        assert_eq!(next.physics.speed, 0.33);
        assert_eq!(next.appearance.color, presets::preset(Archetype::Smoke).appearance.color);
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(presets::preset(Archetype::Cube).export_file_name(), "particle-config-cube.json");
    }
}
