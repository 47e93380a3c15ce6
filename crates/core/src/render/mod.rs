//! Rendering seam. A [`Renderer`] receives the scene graph and camera once per
//! frame; [`ProjectingRenderer`] flattens them into a 2D [`DrawList`] that a
//! windowing layer can paint, and [`RecordingRenderer`] only keeps statistics.

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::Serialize;

use crate::{
    camera::PerspectiveCamera,
    scene::{Color, SceneGraph},
    Result,
};

/// Drawing surface size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Backing-store size in device pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.width * self.pixel_ratio).round().max(0.0) as u32,
            (self.height * self.pixel_ratio).round().max(0.0) as u32,
        )
    }
}

pub trait Renderer {
    fn set_size(&mut self, viewport: Viewport);

    fn size(&self) -> Viewport;

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawPoint {
    pub position: Vec2,
    /// Diameter in logical pixels after perspective attenuation.
    pub size: f32,
    pub color: Color,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawPolyline {
    pub points: Vec<Vec2>,
    /// The last point connects back to the first.
    pub closed: bool,
    pub color: Color,
    pub opacity: f32,
    pub width: f32,
}

/// One frame worth of projected primitives in surface coordinates
/// (origin top-left, y down).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrawList {
    pub points: Vec<DrawPoint>,
    pub polylines: Vec<DrawPolyline>,
}

impl DrawList {
    pub fn clear(&mut self) {
        self.points.clear();
        self.polylines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.polylines.is_empty()
    }
}

/// Model-view-projection for one node plus the surface it lands on.
struct Projection {
    mvp: Mat4,
    viewport: Viewport,
    focal_px: f32,
}

impl Projection {
    fn new(mvp: Mat4, viewport: Viewport, camera: &PerspectiveCamera) -> Self {
        // Focal length in pixels; point sizes shrink with eye depth.
        let focal_px = viewport.height * 0.5 / (camera.fov_y * 0.5).tan();
        Self {
            mvp,
            viewport,
            focal_px,
        }
    }

    /// Surface position and eye depth, or `None` when clipped.
    fn project(&self, point: Vec3) -> Option<(Vec2, f32)> {
        let clip: Vec4 = self.mvp * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !(-1.0..=1.0).contains(&ndc.z) {
            return None;
        }
        let screen = Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.width,
            (1.0 - ndc.y) * 0.5 * self.viewport.height,
        );
        Some((screen, clip.w))
    }

    fn on_surface(&self, screen: Vec2) -> bool {
        (0.0..=self.viewport.width).contains(&screen.x)
            && (0.0..=self.viewport.height).contains(&screen.y)
    }

    fn attenuated_size(&self, size: f32, depth: f32) -> f32 {
        size * self.focal_px / depth
    }
}

/// Splits a loop into visible runs. A fully visible loop stays closed; a
/// clipped one becomes open runs, with the run crossing the seam stitched.
fn visible_runs(projected: &[Option<Vec2>]) -> (Vec<Vec<Vec2>>, bool) {
    if projected.iter().all(Option::is_some) {
        return (vec![projected.iter().flatten().copied().collect()], true);
    }

    let mut runs: Vec<Vec<Vec2>> = Vec::new();
    let mut current = Vec::new();
    for p in projected {
        match p {
            Some(p) => current.push(*p),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    let wraps = matches!(
        (projected.first(), projected.last()),
        (Some(Some(_)), Some(Some(_)))
    );
    if wraps && runs.len() > 1 {
        let head = runs.remove(0);
        // A loop whose closing sample repeats its first would double that vertex.
        let repeats_seam = projected.first() == projected.last();
        if let Some(tail) = runs.last_mut() {
            tail.extend(head.into_iter().skip(usize::from(repeats_seam)));
        }
    }

    runs.retain(|run| run.len() > 1);
    (runs, false)
}

/// CPU renderer that projects the scene into a [`DrawList`].
#[derive(Debug, Default)]
pub struct ProjectingRenderer {
    viewport: Viewport,
    frame: DrawList,
    frames_rendered: u64,
}

impl ProjectingRenderer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn last_frame(&self) -> &DrawList {
        &self.frame
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    fn project_stars(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera, view_proj: Mat4) {
        let stars = &scene.starfield;
        let projection = Projection::new(
            view_proj * stars.transform.matrix(),
            self.viewport,
            camera,
        );

        self.frame.points.extend(stars.points().filter_map(|p| {
            let (position, depth) = projection.project(p)?;
            if !projection.on_surface(position) {
                return None;
            }
            Some(DrawPoint {
                position,
                size: projection.attenuated_size(stars.material.size, depth),
                color: stars.material.color,
                opacity: stars.material.opacity,
            })
        }));
    }

    fn project_lines(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera, view_proj: Mat4) {
        let group = view_proj * scene.energy.transform.matrix();

        for line in &scene.energy.lines {
            let projection = Projection::new(group * line.transform.matrix(), self.viewport, camera);
            let projected: Vec<Option<Vec2>> = line
                .points
                .iter()
                .map(|&p| projection.project(p).map(|(screen, _)| screen))
                .collect();

            let (runs, closed) = visible_runs(&projected);
            self.frame
                .polylines
                .extend(runs.into_iter().map(|points| DrawPolyline {
                    points,
                    closed,
                    color: line.material.color,
                    opacity: line.material.opacity,
                    width: line.material.width,
                }));
        }
    }
}

impl Renderer for ProjectingRenderer {
    fn set_size(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn size(&self) -> Viewport {
        self.viewport
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<()> {
        self.frame.clear();
        self.frames_rendered += 1;
        if self.viewport.is_empty() {
            return Ok(());
        }

        // Lights are ignored: the backdrop materials are unlit.
        let view_proj = camera.view_projection();
        self.project_stars(scene, camera, view_proj);
        self.project_lines(scene, camera, view_proj);

        tracing::trace!(
            frame = self.frames_rendered,
            points = self.frame.points.len(),
            polylines = self.frame.polylines.len(),
            "projected frame"
        );
        Ok(())
    }
}

/// Renderer that draws nothing and remembers what it was asked to draw.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    pub viewport: Viewport,
    pub frames: u64,
    pub last_group_scale: Option<f32>,
    pub last_aspect: Option<f32>,
}

impl Renderer for RecordingRenderer {
    fn set_size(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn size(&self) -> Viewport {
        self.viewport
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<()> {
        self.frames += 1;
        self.last_group_scale = Some(scene.energy.transform.scale.x);
        self.last_aspect = Some(camera.aspect);
        Ok(())
    }
}
