//! Skinning demo
//!
//! Loads a level containing a skinned arm, a few crates, a light and a
//! camera, then drives the scene headlessly for a few seconds of simulated
//! time. Every half second the arm's bone palette and the draw list are
//! logged.
//!
//! ```text
//! cargo run -p skinning_demo -- [data dir]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use scene_engine::animation::BonePalette;
use scene_engine::ecs::{Component, ComponentKind};
use scene_engine::foundation::math::Mat4Ext;
use scene_engine::prelude::*;
use thiserror::Error;

const FRAME: Duration = Duration::from_millis(16);
const SIMULATED_FRAMES: u32 = 250;
const REPORT_EVERY: u32 = 31;

#[derive(Debug, Error)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] scene_engine::core::ConfigError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Level has no entity named '{0}'")]
    MissingEntity(&'static str),
}

struct SkinningDemo {
    ctx: EngineContext,
    scene: Scene,
    timer: FrameTimer,
    arm: EntityHandle,
}

impl SkinningDemo {
    fn new(data: PathBuf) -> Result<Self, DemoError> {
        let config = EngineConfig::load_or_default(data.join("engine.toml"))?;
        logging::init(&config.logging);

        log::info!("Creating skinning demo from {}", data.display());
        let level = data.join(&config.scene.startup_level);
        let mut ctx = EngineContext::headless(config, Box::new(RonMeshSource::new(&data)));
        let mut scene = Scene::new(&ctx.config.scene);
        load_level_file(&mut scene, &mut ctx, level)?;

        let arm = scene.entity_by_name("arm").ok_or(DemoError::MissingEntity("arm"))?;
        Ok(Self {
            ctx,
            scene,
            timer: FrameTimer::new(),
            arm,
        })
    }

    fn frame(&mut self) {
        self.timer.advance(FRAME);
        self.scene.update(&mut self.ctx, self.timer.delta_ms());

        self.ctx.renderer.clear();
        self.scene.render(&mut self.ctx, true);
        self.scene.render(&mut self.ctx, false);
    }

    fn palette(&self) -> Option<&BonePalette> {
        let entity = self.scene.entity(self.arm)?;
        let node = entity.find_node(self.scene.graph(), ComponentKind::MeshRender)?;
        self.scene
            .graph()
            .component(node)
            .and_then(Component::as_mesh)?
            .bone_palette()
    }

    fn report(&self) {
        let Some(palette) = self.palette() else {
            log::warn!("Arm has no bone palette");
            return;
        };

        log::info!(
            "t={:.2}s: {} bones, {} bytes for upload",
            self.timer.total_ms() / 1000.0,
            palette.len(),
            palette.to_bytes().len()
        );
        for (i, bone) in palette.as_slice().iter().enumerate() {
            let t = bone.translation();
            log::info!("  bone {i}: ({:.3}, {:.3}, {:.3})", t.x, t.y, t.z);
        }

        let shadow = self.ctx.renderer.draws_in_pass(true).count();
        let color = self.ctx.renderer.draws_in_pass(false).count();
        log::info!("  draws: {color} color, {shadow} shadow");
    }

    fn run(&mut self) {
        for frame in 0..SIMULATED_FRAMES {
            self.frame();
            if frame % REPORT_EVERY == 0 {
                self.report();
            }
        }

        log::info!(
            "Simulated {} frames ({:.1} fps equivalent)",
            self.timer.frame_count(),
            self.timer.average_fps()
        );
        self.scene.clear(&mut self.ctx);
    }
}

fn main() {
    let data = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from("skinning_demo/data"), PathBuf::from);

    match SkinningDemo::new(data) {
        Ok(mut demo) => demo.run(),
        Err(e) => {
            eprintln!("skinning demo failed: {e}");
            std::process::exit(1);
        }
    }
}
