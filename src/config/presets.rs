//! Built-in configurations, one per archetype.
//!
//! ```ignore
//! let config = presets::preset(Archetype::Smoke);
//! ```

use super::{Appearance, Archetype, Color, Config, Distribution, MaterialClass, Physics, Shape};

/// The built-in configuration for `archetype`.
pub fn preset(archetype: Archetype) -> Config {
    match archetype {
        Archetype::Snowflake => snowflake(),
        Archetype::Smoke => smoke(),
        Archetype::Firework => firework(),
        Archetype::Sphere => sphere(),
        Archetype::Cube => cube(),
    }
}

/// White glossy flakes falling through a 10-unit box.
pub fn snowflake() -> Config {
    Config {
        archetype: Archetype::Snowflake,
        count: 5000,
        appearance: Appearance {
            color: Color([1.0, 1.0, 1.0]),
            size: 0.15,
            material: MaterialClass::Glossy,
            opacity: 0.9,
        },
        physics: Physics {
            speed: 0.02,
            turbulence: 0.1,
            gravity: -0.001,
        },
        distribution: Distribution {
            shape: Shape::Box,
            size: [10.0, 10.0, 10.0],
            radius: 5.0,
        },
    }
}

/// Light gray matte smoke rising through an 8-unit box.
pub fn smoke() -> Config {
    Config {
        archetype: Archetype::Smoke,
        count: 8000,
        appearance: Appearance {
            color: Color([0.8, 0.8, 0.8]),
            size: 0.2,
            material: MaterialClass::Matte,
            opacity: 0.6,
        },
        physics: Physics {
            speed: 0.03,
            turbulence: 0.3,
            gravity: 0.0,
        },
        distribution: Distribution {
            shape: Shape::Box,
            size: [8.0, 8.0, 8.0],
            radius: 4.0,
        },
    }
}

/// Magenta emissive burst from a tight ball.
pub fn firework() -> Config {
    Config {
        archetype: Archetype::Firework,
        count: 3000,
        appearance: Appearance {
            color: Color([1.0, 0.0, 1.0]),
            size: 0.12,
            material: MaterialClass::Emissive,
            opacity: 1.0,
        },
        physics: Physics {
            speed: 0.08,
            turbulence: 0.5,
            gravity: -0.002,
        },
        distribution: Distribution {
            shape: Shape::Sphere,
            size: [1.0, 1.0, 1.0],
            radius: 0.2,
        },
    }
}

/// Cyan orbiting ball of radius 3.
pub fn sphere() -> Config {
    Config {
        archetype: Archetype::Sphere,
        count: 10000,
        appearance: Appearance {
            color: Color([0.0, 1.0, 1.0]),
            size: 0.1,
            material: MaterialClass::Glossy,
            opacity: 0.95,
        },
        physics: Physics {
            speed: 0.1,
            turbulence: 0.05,
            gravity: 0.0,
        },
        distribution: Distribution {
            shape: Shape::Sphere,
            size: [1.0, 1.0, 1.0],
            radius: 3.0,
        },
    }
}

/// Yellow orbiting 6-unit box.
pub fn cube() -> Config {
    Config {
        archetype: Archetype::Cube,
        count: 8000,
        appearance: Appearance {
            color: Color([1.0, 1.0, 0.0]),
            size: 0.12,
            material: MaterialClass::Matte,
            opacity: 0.9,
        },
        physics: Physics {
            speed: 0.05,
            turbulence: 0.1,
            gravity: 0.0,
        },
        distribution: Distribution {
            shape: Shape::Box,
            size: [6.0, 6.0, 6.0],
            radius: 3.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_match_their_archetype() {
        for archetype in Archetype::ALL {
            assert_eq!(preset(archetype).archetype, archetype);
        }
    }

    #[test]
    fn test_presets_are_already_normalized() {
        for archetype in Archetype::ALL {
            let config = preset(archetype);
            assert_eq!(config.clone().normalized(), config);
        }
    }

    #[test]
    fn test_presets_survive_export_and_ingest() {
        for archetype in Archetype::ALL {
            let config = preset(archetype);
            let json = config.to_json_pretty().unwrap();
            assert_eq!(Config::from_json_str(&json).unwrap(), config);
        }
    }
}
