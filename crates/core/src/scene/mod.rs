//! Scene graph for the backdrop and the builder that populates it once at
//! startup: a star field point cloud and a group of tilted energy loops.

use std::f32::consts::{PI, TAU};
use std::fmt;

use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, LightingConfig, SphereConfig, StarfieldConfig},
    BackdropError,
};

/// 24-bit RGB color. Serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::from_hex(0xffffff);
    pub const BLACK: Color = Color::from_hex(0x000000);

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    pub fn to_hex(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = BackdropError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value
            .strip_prefix('#')
            .filter(|d| d.len() == 6)
            .ok_or_else(|| BackdropError::InvalidColor(value.clone()))?;
        let hex = u32::from_str_radix(digits, 16)
            .map_err(|_| BackdropError::InvalidColor(value.clone()))?;
        Ok(Self::from_hex(hex))
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

/// Animation behavior attached to each energy line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Spins around its own Y axis.
    Clockwise,
    /// Spins around its own Y axis the other way.
    Counter,
    /// Bobs around X and Z with a phase taken from the line index.
    UpDown,
}

/// Euler rotation (XYZ order, radians) plus scale. The backdrop never
/// translates nodes, so there is no position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn with_rotation(rotation: Vec3) -> Self {
        Self {
            rotation,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, Vec3::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointMaterial {
    pub color: Color,
    /// World-space size, attenuated with distance by the renderer.
    pub size: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineMaterial {
    pub color: Color,
    pub opacity: f32,
    pub width: f32,
}

/// Point cloud with a flat `[x0, y0, z0, x1, ...]` position buffer.
#[derive(Debug, Clone)]
pub struct Starfield {
    pub positions: Vec<f32>,
    pub material: PointMaterial,
    pub transform: Transform,
}

impl Starfield {
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.positions.chunks_exact(3).map(Vec3::from_slice)
    }
}

/// One closed loop of the energy sphere.
#[derive(Debug, Clone)]
pub struct EnergyLine {
    /// `detail + 1` samples; the last one coincides with the first.
    pub points: Vec<Vec3>,
    pub radius: f32,
    pub tilt: f32,
    pub material: LineMaterial,
    pub direction: Direction,
    pub speed: f32,
    pub transform: Transform,
}

/// Container for every energy line. Its transform carries the pulse and the
/// slow aggregate spin.
#[derive(Debug, Clone, Default)]
pub struct EnergyLineGroup {
    pub lines: Vec<EnergyLine>,
    pub transform: Transform,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    pub range: f32,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lights {
    pub ambient: AmbientLight,
    pub point: PointLight,
}

impl From<&LightingConfig> for Lights {
    fn from(config: &LightingConfig) -> Self {
        Self {
            ambient: AmbientLight {
                color: config.ambient_color,
                intensity: config.ambient_intensity,
            },
            point: PointLight {
                color: config.point_color,
                intensity: config.point_intensity,
                range: config.point_range,
                position: Vec3::from_array(config.point_position),
            },
        }
    }
}

/// Everything submitted to a renderer in one frame.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub starfield: Starfield,
    pub energy: EnergyLineGroup,
    pub lights: Lights,
}

/// Per-line inputs chosen by the builder before sampling the curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSpec {
    pub radius: f32,
    pub color: Color,
    pub speed: f32,
    pub direction: Direction,
}

/// Samples a tilted loop on a sphere of `radius`, rippled along Y.
///
/// Returns `detail + 1` points; the first and last sample share the same
/// parameter modulo a full turn.
pub fn sample_energy_loop(
    radius: f32,
    tilt: f32,
    detail: usize,
    ripple_amplitude: f32,
    ripple_frequency: f32,
) -> Vec<Vec3> {
    let detail = detail.max(1);
    let (sin_tilt, cos_tilt) = tilt.sin_cos();
    (0..=detail)
        .map(|i| {
            // Wrap the parameter so the closing sample is bit-identical to the first.
            let phi = ((i % detail) as f32 / detail as f32) * TAU;
            let (sin_phi, cos_phi) = phi.sin_cos();
            Vec3::new(
                radius * sin_tilt * cos_phi,
                radius * cos_tilt + (phi * ripple_frequency).sin() * ripple_amplitude,
                radius * sin_tilt * sin_phi,
            )
        })
        .collect()
}

/// Builds the scene graph from a validated configuration.
pub struct SceneBuilder<'a> {
    config: &'a AppConfig,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, rng: &mut impl Rng) -> SceneGraph {
        let starfield = self.build_starfield(rng);
        let energy = self.build_energy_group(rng);
        tracing::info!(
            stars = starfield.len(),
            lines = energy.lines.len(),
            "built backdrop scene"
        );

        SceneGraph {
            starfield,
            energy,
            lights: Lights::from(&self.config.lighting),
        }
    }

    pub fn build_starfield(&self, rng: &mut impl Rng) -> Starfield {
        let StarfieldConfig {
            count,
            half_extent,
            color,
            point_size,
            opacity,
        } = self.config.starfield;

        let positions = (0..count * 3)
            .map(|_| rng.random_range(-half_extent..=half_extent))
            .collect();

        Starfield {
            positions,
            material: PointMaterial {
                color,
                size: point_size,
                opacity,
            },
            transform: Transform::default(),
        }
    }

    pub fn build_energy_group(&self, rng: &mut impl Rng) -> EnergyLineGroup {
        let sphere = &self.config.sphere;
        let lines = (0..sphere.line_count)
            .map(|index| {
                let spec = self.line_spec(index, rng);
                self.energy_line(spec, rng)
            })
            .collect();

        EnergyLineGroup {
            lines,
            transform: Transform::default(),
        }
    }

    /// Colors and directions cycle with the creation index; radius and speed
    /// are drawn at random.
    pub fn line_spec(&self, index: usize, rng: &mut impl Rng) -> LineSpec {
        let sphere = &self.config.sphere;
        let jitter = if sphere.radius_jitter > 0.0 {
            rng.random_range(0.0..sphere.radius_jitter)
        } else {
            0.0
        };

        LineSpec {
            radius: sphere.radius + jitter,
            color: sphere.palette[index % sphere.palette.len()],
            speed: rng.random_range(sphere.speed_min..=sphere.speed_max),
            direction: sphere.directions[index % sphere.directions.len()],
        }
    }

    pub fn energy_line(&self, spec: LineSpec, rng: &mut impl Rng) -> EnergyLine {
        let SphereConfig {
            detail,
            ripple_amplitude,
            ripple_frequency,
            opacity,
            line_width,
            ..
        } = *self.sphere();

        let tilt = rng.random_range(0.0..PI);
        let points = sample_energy_loop(
            spec.radius,
            tilt,
            detail,
            ripple_amplitude,
            ripple_frequency,
        );
        let orientation = Vec3::new(
            rng.random_range(0.0..PI),
            rng.random_range(0.0..PI),
            rng.random_range(0.0..PI),
        );

        EnergyLine {
            points,
            radius: spec.radius,
            tilt,
            material: LineMaterial {
                color: spec.color,
                opacity,
                width: line_width,
            },
            direction: spec.direction,
            speed: spec.speed,
            transform: Transform::with_rotation(orientation),
        }
    }

    fn sphere(&self) -> &SphereConfig {
        &self.config.sphere
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn build(seed: u64) -> SceneGraph {
        let config = AppConfig::default();
        SceneBuilder::new(&config).build(&mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn loop_points_project_onto_tilted_circle() {
        let radius = 6.2;
        let tilt = 1.1_f32;
        let points = sample_energy_loop(radius, tilt, 80, 0.3, 2.0);

        assert_eq!(points.len(), 81);
        let expected = radius * tilt.sin().abs();
        for p in &points {
            let planar = (p.x * p.x + p.z * p.z).sqrt();
            assert!((planar - expected).abs() < 1e-4, "{planar} vs {expected}");
        }
    }

    #[test]
    fn loops_are_closed() {
        for line in &build(7).energy.lines {
            assert_eq!(line.points.first(), line.points.last());
        }
    }

    #[test]
    fn loop_points_stay_near_sphere() {
        let config = AppConfig::default();
        for line in &build(11).energy.lines {
            let amplitude = config.sphere.ripple_amplitude;
            let bound = line.radius + amplitude + 1e-4;
            for p in &line.points {
                assert!(p.length() <= bound, "{} > {bound}", p.length());
                assert!(p.length() <= line.radius * (1.0 + amplitude));
            }
        }
    }

    #[test]
    fn palettes_cycle_by_creation_order() {
        let config = AppConfig::default();
        let scene = build(3);

        assert_eq!(scene.energy.lines.len(), 80);
        for (i, line) in scene.energy.lines.iter().enumerate() {
            assert_eq!(line.direction, config.sphere.directions[i % 3]);
            assert_eq!(line.material.color, config.sphere.palette[i % 3]);
        }
    }

    #[test]
    fn line_parameters_respect_bands() {
        let config = AppConfig::default();
        for line in &build(5).energy.lines {
            assert!(line.speed >= config.sphere.speed_min && line.speed <= config.sphere.speed_max);
            assert!(line.radius >= config.sphere.radius);
            assert!(line.radius <= config.sphere.radius + config.sphere.radius_jitter);
            assert!((0.0..PI).contains(&line.tilt));
            let r = line.transform.rotation;
            for angle in [r.x, r.y, r.z] {
                assert!((0.0..PI).contains(&angle));
            }
            assert_eq!(line.material.opacity, config.sphere.opacity);
        }
    }

    #[test]
    fn stars_fill_the_cube() {
        let scene = build(9);
        let half = AppConfig::default().starfield.half_extent;

        assert_eq!(scene.starfield.len(), 2500);
        assert_eq!(scene.starfield.positions.len(), 7500);
        assert!(scene.starfield.positions.iter().all(|c| c.abs() <= half));
        assert_eq!(scene.starfield.transform, Transform::default());
    }

    #[test]
    fn seeded_builds_are_reproducible() {
        let a = build(42);
        let b = build(42);

        assert_eq!(a.starfield.positions, b.starfield.positions);
        for (la, lb) in a.energy.lines.iter().zip(&b.energy.lines) {
            assert_eq!(la.points, lb.points);
            assert_eq!(la.transform, lb.transform);
            assert_eq!(la.speed, lb.speed);
        }
    }

    #[test]
    fn zero_jitter_uses_base_radius() {
        let mut config = AppConfig::default();
        config.sphere.radius_jitter = 0.0;
        let builder = SceneBuilder::new(&config);
        let spec = builder.line_spec(4, &mut StdRng::seed_from_u64(1));

        assert_eq!(spec.radius, config.sphere.radius);
        assert_eq!(spec.direction, Direction::Counter);
    }

    #[test]
    fn colors_parse_and_print_as_hex() {
        let color = Color::try_from("#AA66ff".to_string()).unwrap();
        assert_eq!(color, Color::from_hex(0xaa66ff));
        assert_eq!(color.to_string(), "#aa66ff");

        assert!(Color::try_from("aa66ff".to_string()).is_err());
        assert!(Color::try_from("#aa66f".to_string()).is_err());
        assert!(Color::try_from("#gg66ff".to_string()).is_err());
    }

    #[test]
    fn lights_follow_config() {
        let scene = build(1);
        assert_eq!(scene.lights.ambient.intensity, 0.4);
        assert_eq!(scene.lights.point.position, Vec3::new(0.0, 0.0, 20.0));
        assert_eq!(scene.lights.point.color, Color::from_hex(0xff88ff));
    }
}
