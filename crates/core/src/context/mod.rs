use rand::Rng;

use crate::{
    animation::{Animator, FrameClock, SceneState},
    camera::PerspectiveCamera,
    config::AppConfig,
    render::{Renderer, Viewport},
    scene::{SceneBuilder, SceneGraph},
    Result,
};

/// Owns everything a frame touches: scene, clock, camera and renderer.
/// Built once at startup; the driver calls [`SceneContext::frame`] per
/// repaint and [`SceneContext::resize`] whenever the surface changes.
#[derive(Debug)]
pub struct SceneContext<R: Renderer> {
    state: SceneState,
    camera: PerspectiveCamera,
    renderer: R,
    animator: Animator,
}

impl<R: Renderer> SceneContext<R> {
    pub fn new(
        config: &AppConfig,
        mut renderer: R,
        viewport: Viewport,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        config.validate()?;

        let scene = SceneBuilder::new(config).build(rng);
        let camera = PerspectiveCamera::from_config(&config.camera, viewport.aspect());
        renderer.set_size(viewport);
        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            pixel_ratio = viewport.pixel_ratio,
            "scene context ready"
        );

        Ok(Self {
            state: SceneState::new(scene),
            camera,
            renderer,
            animator: Animator::new(config.animation.clone()),
        })
    }

    /// Advances the animation by `dt` seconds and renders one frame.
    pub fn frame(&mut self, dt: f32) -> Result<()> {
        self.animator.advance(&mut self.state, dt);
        self.renderer.render(&self.state.scene, &self.camera)
    }

    /// Applies new surface dimensions, keeping the current pixel ratio.
    pub fn resize(&mut self, width: f32, height: f32) {
        let pixel_ratio = self.renderer.size().pixel_ratio;
        self.camera.set_aspect(width, height);
        self.renderer
            .set_size(Viewport::new(width, height).with_pixel_ratio(pixel_ratio));
        tracing::debug!(width, height, aspect = self.camera.aspect, "resized surface");
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) {
        let viewport = self.renderer.size().with_pixel_ratio(pixel_ratio);
        self.renderer.set_size(viewport);
        tracing::debug!(pixel_ratio, "pixel ratio changed");
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.state.scene
    }

    pub fn clock(&self) -> FrameClock {
        self.state.clock
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn viewport(&self) -> Viewport {
        self.renderer.size()
    }
}
