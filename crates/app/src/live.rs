//! Windowed driver built on eframe/egui.
//!
//! The whole client area is the backdrop. Every repaint advances the scene by
//! egui's frame time, paints the projected draw list and asks for the next
//! repaint, so the loop runs until the window closes.

use eframe::App;
use energy_sphere_core::{
    AppConfig, BackdropError, Color, DrawList, ProjectingRenderer, Result, SceneContext, Viewport,
};
use rand::Rng;

pub fn run(config: AppConfig, mut rng: impl Rng) -> Result<()> {
    let window = config.window.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(window.title.clone())
            .with_inner_size([window.width, window.height]),
        ..Default::default()
    };

    let viewport = Viewport::new(window.width, window.height);
    let context = SceneContext::new(&config, ProjectingRenderer::new(viewport), viewport, &mut rng)?;
    tracing::info!(title = %window.title, "starting live backdrop");

    let background = window.background;
    eframe::run_native(
        &window.title,
        options,
        Box::new(move |_cc| Ok(Box::new(Backdrop::new(context, background)))),
    )
    .map_err(|err| BackdropError::from(format!("window failed: {err}")))
}

/// eframe app state: the scene context plus the last surface it was sized to.
struct Backdrop {
    context: SceneContext<ProjectingRenderer>,
    background: egui::Color32,
    surface: Option<(egui::Vec2, f32)>,
}

impl Backdrop {
    fn new(context: SceneContext<ProjectingRenderer>, background: Color) -> Self {
        Self {
            context,
            background: to_color32(background, 1.0),
            surface: None,
        }
    }

    /// Routes window resizes and DPI changes into the scene context.
    fn sync_surface(&mut self, size: egui::Vec2, pixels_per_point: f32) {
        let Some((last_size, last_ratio)) = self.surface else {
            self.context.set_pixel_ratio(pixels_per_point);
            self.context.resize(size.x, size.y);
            self.surface = Some((size, pixels_per_point));
            return;
        };

        if last_ratio != pixels_per_point {
            self.context.set_pixel_ratio(pixels_per_point);
        }
        if last_size != size {
            self.context.resize(size.x, size.y);
        }
        self.surface = Some((size, pixels_per_point));
    }
}

impl App for Backdrop {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dt = ctx.input(|i| i.stable_dt);

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(self.background))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                self.sync_surface(rect.size(), ctx.pixels_per_point());

                if let Err(err) = self.context.frame(dt) {
                    tracing::error!(%err, "frame failed");
                    return;
                }

                let painter = ui.painter_at(rect);
                paint(&painter, rect.min, self.context.renderer().last_frame());
            });

        ctx.request_repaint();
    }
}

fn to_color32(color: Color, opacity: f32) -> egui::Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, alpha)
}

fn paint(painter: &egui::Painter, origin: egui::Pos2, frame: &DrawList) {
    let at = |p: glam::Vec2| origin + egui::vec2(p.x, p.y);

    for star in &frame.points {
        // Sub-pixel stars would vanish entirely; keep them as faint dots.
        let radius = (star.size * 0.5).max(0.5);
        painter.circle_filled(at(star.position), radius, to_color32(star.color, star.opacity));
    }

    for line in &frame.polylines {
        let stroke = egui::Stroke::new(line.width * 0.5, to_color32(line.color, line.opacity));
        let points: Vec<egui::Pos2> = line.points.iter().map(|&p| at(p)).collect();
        let shape = if line.closed {
            egui::Shape::closed_line(points, stroke)
        } else {
            egui::Shape::line(points, stroke)
        };
        painter.add(shape);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn backdrop() -> Backdrop {
        let viewport = Viewport::new(800.0, 600.0);
        let context = SceneContext::new(
            &AppConfig::default(),
            ProjectingRenderer::new(viewport),
            viewport,
            &mut StdRng::seed_from_u64(4),
        )
        .unwrap();
        Backdrop::new(context, Color::BLACK)
    }

    #[test]
    fn first_sync_adopts_window_surface() {
        let mut app = backdrop();
        app.sync_surface(egui::vec2(1024.0, 512.0), 2.0);

        let viewport = app.context.viewport();
        assert_eq!((viewport.width, viewport.height), (1024.0, 512.0));
        assert_eq!(viewport.pixel_ratio, 2.0);
        assert!((app.context.camera().aspect - 2.0).abs() < 1e-6);
    }

    #[test]
    fn later_syncs_track_resizes() {
        let mut app = backdrop();
        app.sync_surface(egui::vec2(1024.0, 512.0), 1.0);
        app.sync_surface(egui::vec2(600.0, 600.0), 1.0);

        let viewport = app.context.viewport();
        assert_eq!((viewport.width, viewport.height), (600.0, 600.0));
        assert!((app.context.camera().aspect - 1.0).abs() < 1e-6);
    }

    #[test]
    fn opacity_maps_to_alpha() {
        let color = to_color32(Color::from_hex(0xff33cc), 0.5);
        assert_eq!(color.a(), 128);
        assert_eq!(to_color32(Color::WHITE, 2.0).a(), 255);
    }
}
