//! Windowless driver: runs the frame loop a fixed number of times with the
//! projecting renderer and summarizes the last frame as JSON.

use std::path::Path;

use energy_sphere_core::{
    AppConfig, FrameClock, ProjectingRenderer, Result, SceneContext, Viewport,
};
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct HeadlessOptions {
    pub frames: u64,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub clock: FrameClock,
    pub viewport: Viewport,
    pub physical_size: (u32, u32),
    pub frames_rendered: u64,
    pub pulse: f32,
    pub group_rotation_y: f32,
    pub star_rotation: [f32; 2],
    pub visible_stars: usize,
    pub visible_polylines: usize,
    pub closed_polylines: usize,
}

pub fn simulate(
    config: &AppConfig,
    options: HeadlessOptions,
    rng: &mut impl Rng,
) -> Result<FrameReport> {
    let viewport = Viewport::new(options.width, options.height);
    let mut context = SceneContext::new(config, ProjectingRenderer::new(viewport), viewport, rng)?;

    let dt = config.animation.reference_frame_seconds;
    for _ in 0..options.frames {
        context.frame(dt)?;
    }

    let scene = context.scene();
    let frame = context.renderer().last_frame();
    let stars = scene.starfield.transform.rotation;

    Ok(FrameReport {
        clock: context.clock(),
        viewport: context.viewport(),
        physical_size: context.viewport().physical_size(),
        frames_rendered: context.renderer().frames_rendered(),
        pulse: scene.energy.transform.scale.x,
        group_rotation_y: scene.energy.transform.rotation.y,
        star_rotation: [stars.x, stars.y],
        visible_stars: frame.points.len(),
        visible_polylines: frame.polylines.len(),
        closed_polylines: frame.polylines.iter().filter(|l| l.closed).count(),
    })
}

pub fn run(
    config: &AppConfig,
    options: HeadlessOptions,
    mut rng: impl Rng,
    output: Option<&Path>,
) -> Result<()> {
    tracing::info!(frames = options.frames, "running headless");
    let report = simulate(config, options, &mut rng)?;
    let json = serde_json::to_string_pretty(&report)?;

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(?path, "wrote frame report");
        }
        None => println!("{json}"),
    }
    Ok(())
}
