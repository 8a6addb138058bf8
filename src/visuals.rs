//! Point-sprite materials: per-archetype shading programs and their uniforms.
//!
//! Every archetype shares one vertex stage that sizes a camera-facing quad by
//! view depth:
//!
//! ```text
//! point_size_px = rendered_size * size_scale * (POINT_ATTENUATION / -view_z)
//! ```
//!
//! and differs only in the fragment rule:
//!
//! | Program | Alpha | Color | Blend |
//! |---------|-------|-------|-------|
//! | [`ShadingProgram::Snowflake`] | radial × six-fold angular mask | sparkle `sin(t*3 + seed*10)` | alpha |
//! | [`ShadingProgram::Smoke`] | radial × height fade × `sin(t + seed*20)` | flat | alpha |
//! | [`ShadingProgram::Firework`] | core + glow × distance fade × pulse | boosted, pulse `sin(t*5 + seed*2π)` | additive |
//! | [`ShadingProgram::Basic`] | radial | pulse `sin(t*2 + seed*2π)` | alpha |
//!
//! Fades are floored so particles never disappear entirely.

use crate::config::{Archetype, Config};
use crate::Vec3;

/// `size_scale = appearance.size * SIZE_SCALE_MULTIPLIER`.
pub const SIZE_SCALE_MULTIPLIER: f32 = 100.0;

/// Numerator of the depth attenuation term.
pub const POINT_ATTENUATION: f32 = 300.0;

/// Screen size in pixels of a point at `view_depth` units in front of the
/// camera. Mirrors the vertex stage.
pub fn point_screen_size(rendered_size: f32, size_scale: f32, view_depth: f32) -> f32 {
    rendered_size * size_scale * (POINT_ATTENUATION / view_depth.max(0.001))
}

/// How fragment colors combine with what is already in the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha blending (default).
    #[default]
    Alpha,

    /// Colors sum, so overlapping particles bloom toward white.
    Additive,
}

/// Per-archetype fragment rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingProgram {
    Snowflake,
    Smoke,
    Firework,
    /// Sphere and cube.
    Basic,
}

impl ShadingProgram {
    pub fn for_archetype(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Snowflake => ShadingProgram::Snowflake,
            Archetype::Smoke => ShadingProgram::Smoke,
            Archetype::Firework => ShadingProgram::Firework,
            Archetype::Sphere | Archetype::Cube => ShadingProgram::Basic,
        }
    }

    /// Blend mode this program is designed for.
    pub fn blend_mode(&self) -> BlendMode {
        match self {
            ShadingProgram::Firework => BlendMode::Additive,
            _ => BlendMode::Alpha,
        }
    }

    /// Label for GPU objects and logs.
    pub fn name(&self) -> &'static str {
        match self {
            ShadingProgram::Snowflake => "snowflake",
            ShadingProgram::Smoke => "smoke",
            ShadingProgram::Firework => "firework",
            ShadingProgram::Basic => "basic",
        }
    }

    /// The WGSL fragment body.
    ///
    /// Receives `coord` (quad position in `[-0.5, 0.5]`), `dist = length(coord)`
    /// and `in.seed` / `in.local_position`; returns a `vec4` color with alpha.
    pub fn to_wgsl_fragment(&self) -> &'static str {
        match self {
            ShadingProgram::Snowflake => r#"    // Six-fold angular mask
    let angle = atan2(coord.y, coord.x);
    let hex_pattern = cos(angle * 6.0);
    var alpha = (1.0 - smoothstep(0.0, 0.5, dist)) * (0.5 + hex_pattern * 0.5);
    alpha *= uniforms.opacity;

    let sparkle = sin(uniforms.time * 3.0 + in.seed * 10.0) * 0.3 + 0.7;
    return vec4<f32>(uniforms.color * sparkle, alpha);"#,

            ShadingProgram::Smoke => r#"    var alpha = (1.0 - smoothstep(0.0, 0.5, dist)) * uniforms.opacity;

    // Thin out with height, never fully
    alpha *= max(1.0 - in.local_position.y / 10.0, 0.1);

    let turbulence = sin(uniforms.time + in.seed * 20.0) * 0.2 + 0.8;
    alpha *= turbulence;
    return vec4<f32>(uniforms.color, clamp(alpha, 0.0, 1.0));"#,

            ShadingProgram::Firework => r#"    let bright = 1.0 - smoothstep(0.0, 0.5, dist);
    let glow = (1.0 - smoothstep(0.0, 0.8, dist)) * 0.5;
    var alpha = (bright + glow) * uniforms.opacity;

    let pulse = sin(uniforms.time * 5.0 + in.seed * 6.2831853) * 0.3 + 0.7;
    let dist_fade = max(1.0 - length(in.local_position) / 5.0, 0.1);
    alpha *= dist_fade * pulse;

    let color = uniforms.color * (1.5 + pulse * 0.5);
    return vec4<f32>(color, alpha);"#,

            ShadingProgram::Basic => r#"    let alpha = (1.0 - smoothstep(0.3, 0.5, dist)) * uniforms.opacity;

    let pulse = sin(uniforms.time * 2.0 + in.seed * 6.2831853) * 0.2 + 0.8;
    return vec4<f32>(uniforms.color * pulse, alpha);"#,
        }
    }
}

/// The uniform set every program reads, apart from camera state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialUniforms {
    /// Simulated time; updated every tick.
    pub time: f32,
    /// `appearance.size * SIZE_SCALE_MULTIPLIER`.
    pub size_scale: f32,
    pub color: Vec3,
    pub opacity: f32,
}

/// A GPU-renderable point material: program choice plus bound uniforms.
#[derive(Debug, Clone, PartialEq)]
pub struct PointMaterial {
    pub program: ShadingProgram,
    pub blend_mode: BlendMode,
    pub uniforms: MaterialUniforms,
    /// Always `false`: points are sorted by nothing and must not occlude
    /// each other.
    pub depth_write: bool,
}

impl PointMaterial {
    /// Parameterize a material from a configuration's archetype and appearance.
    pub fn for_config(config: &Config) -> Self {
        let program = ShadingProgram::for_archetype(config.archetype);
        let appearance = &config.appearance;
        Self {
            program,
            blend_mode: program.blend_mode(),
            uniforms: MaterialUniforms {
                time: 0.0,
                size_scale: appearance.size * SIZE_SCALE_MULTIPLIER,
                color: appearance.color.to_vec3(),
                opacity: appearance.opacity,
            },
            depth_write: false,
        }
    }

    /// Update the time uniform.
    #[inline]
    pub fn set_time(&mut self, time: f32) {
        self.uniforms.time = time;
    }

    /// Complete WGSL module (`vs_main` + `fs_main`) for this material.
    pub fn shader_source(&self) -> String {
        let fragment = self.program.to_wgsl_fragment();
        format!(
            r#"struct Uniforms {{
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    model: mat4x4<f32>,
    color: vec3<f32>,
    opacity: f32,
    viewport: vec2<f32>,
    time: f32,
    size_scale: f32,
    attenuation: f32,
}};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) seed: f32,
    @location(2) local_position: vec3<f32>,
}};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) particle_pos: vec3<f32>,
    @location(1) size_seed: vec2<f32>,
) -> VertexOutput {{
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let quad_pos = quad_vertices[vertex_index];

    let view_pos = uniforms.view * uniforms.model * vec4<f32>(particle_pos, 1.0);
    let depth = max(-view_pos.z, 0.001);
    let point_size = size_seed.x * uniforms.size_scale * (uniforms.attenuation / depth);

    // Quad spans [-1, 1], so a half-extent of point_size / 2 pixels is
    // point_size / viewport in NDC.
    var clip_pos = uniforms.proj * view_pos;
    let offset = quad_pos * point_size / uniforms.viewport;
    clip_pos.x += offset.x * clip_pos.w;
    clip_pos.y += offset.y * clip_pos.w;

    var out: VertexOutput;
    out.clip_position = clip_pos;
    out.uv = quad_pos;
    out.seed = size_seed.y;
    out.local_position = particle_pos;
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let coord = in.uv * 0.5;
    let dist = length(coord);
{fragment}
}}
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets;

    #[test]
    fn test_program_per_archetype() {
        assert_eq!(ShadingProgram::for_archetype(Archetype::Snowflake), ShadingProgram::Snowflake);
        assert_eq!(ShadingProgram::for_archetype(Archetype::Smoke), ShadingProgram::Smoke);
        assert_eq!(ShadingProgram::for_archetype(Archetype::Firework), ShadingProgram::Firework);
        assert_eq!(ShadingProgram::for_archetype(Archetype::Sphere), ShadingProgram::Basic);
        assert_eq!(ShadingProgram::for_archetype(Archetype::Cube), ShadingProgram::Basic);
    }

    #[test]
    fn test_only_firework_is_additive() {
        for archetype in Archetype::ALL {
            let material = PointMaterial::for_config(&presets::preset(archetype));
            let expected = if archetype == Archetype::Firework {
                BlendMode::Additive
            } else {
                BlendMode::Alpha
            };
            assert_eq!(material.blend_mode, expected);
            assert!(!material.depth_write);
        }
    }

    #[test]
    fn test_uniform_binding() {
        let config = presets::smoke();
        let mut material = PointMaterial::for_config(&config);
        assert_eq!(material.uniforms.time, 0.0);
        assert!((material.uniforms.size_scale - 20.0).abs() < 1e-5);
        assert_eq!(material.uniforms.color, Vec3::splat(0.8));
        assert_eq!(material.uniforms.opacity, 0.6);

        material.set_time(1.5);
        assert_eq!(material.uniforms.time, 1.5);
    }

    #[test]
    fn test_point_screen_size_shrinks_with_depth() {
        let near = point_screen_size(0.1, 10.0, 2.0);
        let far = point_screen_size(0.1, 10.0, 4.0);
        assert!((near - 150.0).abs() < 1e-3);
        assert!((far - near / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_fragments_carry_their_phase_terms() {
        assert!(ShadingProgram::Snowflake.to_wgsl_fragment().contains("uniforms.time * 3.0 + in.seed * 10.0"));
        assert!(ShadingProgram::Smoke.to_wgsl_fragment().contains("uniforms.time + in.seed * 20.0"));
        assert!(ShadingProgram::Firework.to_wgsl_fragment().contains("uniforms.time * 5.0"));
        assert!(ShadingProgram::Basic.to_wgsl_fragment().contains("uniforms.time * 2.0"));
    }

    /// Validates WGSL code using naga.
    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_every_archetype_shader_validates() {
        for archetype in Archetype::ALL {
            let material = PointMaterial::for_config(&presets::preset(archetype));
            let source = material.shader_source();
            if let Err(e) = validate_wgsl(&source) {
                panic!("{} shader invalid: {}\n{}", archetype.name(), e, source);
            }
        }
    }

    #[test]
    fn test_shader_source_embeds_fragment() {
        let material = PointMaterial::for_config(&presets::firework());
        let source = material.shader_source();
        assert!(source.contains("fn vs_main"));
        assert!(source.contains("fn fs_main"));
        assert!(source.contains(material.program.to_wgsl_fragment()));
    }
}
