//! The render bridge against a target that records what it is sent.

use glimmer::prelude::*;

#[derive(Debug, PartialEq)]
enum Call {
    Rebuild {
        program: ShadingProgram,
        blend: BlendMode,
        attributes: Vec<[f32; 2]>,
    },
    Upload {
        positions: Vec<Vec3>,
        time: f32,
        rotation_y: f32,
    },
    Draw,
}

#[derive(Default)]
struct Recording {
    calls: Vec<Call>,
    fail_draw: bool,
}

impl RenderTarget for Recording {
    type Error = &'static str;

    fn rebuild(&mut self, material: &PointMaterial, buffer: &ParticleBuffer) {
        self.calls.push(Call::Rebuild {
            program: material.program,
            blend: material.blend_mode,
            attributes: buffer.instance_attributes(),
        });
    }

    fn upload(&mut self, positions: &[Vec3], frame: &FrameUniforms) {
        self.calls.push(Call::Upload {
            positions: positions.to_vec(),
            time: frame.material.time,
            rotation_y: frame.rotation_y,
        });
    }

    fn draw(&mut self) -> Result<(), Self::Error> {
        if self.fail_draw {
            return Err("surface lost");
        }
        self.calls.push(Call::Draw);
        Ok(())
    }
}

#[test]
fn test_first_frame_rebuilds_then_uploads_then_draws() {
    let mut system = ParticleSystem::with_seed(presets::snowflake(), 1);
    let mut bridge = RenderBridge::new(Recording::default());

    system.tick();
    bridge.render(&system).unwrap();

    let calls = &bridge.target().calls;
    assert_eq!(calls.len(), 3);
    match &calls[0] {
        Call::Rebuild { program, blend, attributes } => {
            assert_eq!(*program, ShadingProgram::Snowflake);
            assert_eq!(*blend, BlendMode::Alpha);
            assert_eq!(attributes.len(), 5000);
            assert_eq!(attributes[7], [system.buffer().sizes()[7], system.buffer().seeds()[7]]);
        }
        other => panic!("expected rebuild, got {:?}", other),
    }
    match &calls[1] {
        Call::Upload { positions, time, .. } => {
            assert_eq!(&positions[..], system.buffer().positions());
            assert!((time - 0.01).abs() < 1e-6);
        }
        other => panic!("expected upload, got {:?}", other),
    }
    assert_eq!(calls[2], Call::Draw);
}

#[test]
fn test_uploads_track_positions_every_tick() {
    let mut system = ParticleSystem::with_seed(presets::smoke(), 2);
    let mut bridge = RenderBridge::new(Recording::default());

    for _ in 0..5 {
        system.tick();
        bridge.render(&system).unwrap();
        match bridge.target().calls.iter().rev().nth(1) {
            Some(Call::Upload { positions, .. }) => assert_eq!(&positions[..], system.buffer().positions()),
            other => panic!("expected upload, got {:?}", other),
        }
    }

    let rebuilds = bridge
        .target()
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Rebuild { .. }))
        .count();
    assert_eq!(rebuilds, 1);
}

#[test]
fn test_reconfigure_rebuilds_before_next_upload() {
    let mut system = ParticleSystem::with_seed(presets::sphere(), 3);
    let mut bridge = RenderBridge::new(Recording::default());
    bridge.render(&system).unwrap();

    system.reconfigure(presets::firework());
    bridge.target_mut().calls.clear();
    bridge.render(&system).unwrap();

    let calls = &bridge.target().calls;
    match &calls[0] {
        Call::Rebuild { program, blend, attributes } => {
            assert_eq!(*program, ShadingProgram::Firework);
            assert_eq!(*blend, BlendMode::Additive);
            assert_eq!(attributes.len(), 3000);
        }
        other => panic!("expected rebuild, got {:?}", other),
    }
    assert!(matches!(&calls[1], Call::Upload { positions, .. } if positions.len() == 3000));
}

#[test]
fn test_spin_rotation_reaches_target() {
    let mut system = ParticleSystem::with_seed(presets::cube(), 4);
    system.set_motion(Motion::Spin);
    let mut bridge = RenderBridge::new(Recording::default());

    for _ in 0..100 {
        system.tick();
    }
    bridge.sync(&system);

    match bridge.target().calls.last() {
        Some(Call::Upload { rotation_y, .. }) => assert!((rotation_y - 0.1).abs() < 1e-4),
        other => panic!("expected upload, got {:?}", other),
    }
}

#[test]
fn test_draw_failure_leaves_system_intact() {
    let mut system = ParticleSystem::with_seed(presets::snowflake(), 5);
    let mut bridge = RenderBridge::new(Recording {
        fail_draw: true,
        ..Default::default()
    });

    system.tick();
    assert_eq!(bridge.render(&system), Err("surface lost"));
    let positions = system.buffer().positions().to_vec();

    // The host recovers the target; simulation resumes where it was.
    bridge.target_mut().fail_draw = false;
    bridge.render(&system).unwrap();
    assert_eq!(system.buffer().positions(), &positions[..]);
    system.tick();
    assert_eq!(system.time().tick(), 2);
}

#[test]
fn test_replacing_the_system_rebuilds_the_mirror() {
    let snowflake = ParticleSystem::with_seed(presets::snowflake(), 6);
    let mut bridge = RenderBridge::new(Recording::default());
    bridge.render(&snowflake).unwrap();

    let mut config = presets::sphere();
    config.count = 20_000;
    let sphere = ParticleSystem::with_seed(config, 7);
    bridge.render(&sphere).unwrap();

    let rebuilds: Vec<usize> = bridge
        .target()
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::Rebuild { attributes, .. } => Some(attributes.len()),
            _ => None,
        })
        .collect();
    assert_eq!(rebuilds, vec![5000, 20_000]);
    assert!(matches!(
        bridge.target().calls.iter().rev().nth(1),
        Some(Call::Upload { positions, .. }) if positions.len() == 20_000
    ));
}
