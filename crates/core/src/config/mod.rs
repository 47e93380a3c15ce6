use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    scene::{Color, Direction},
    BackdropError, Result,
};

/// Top-level configuration structure for the backdrop.
///
/// Every section falls back to its defaults, so a preset file only needs to
/// name the values it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub starfield: StarfieldConfig,
    pub sphere: SphereConfig,
    pub animation: AnimationConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub window: WindowConfig,
}

impl AppConfig {
    /// Parses a JSON preset and validates it.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON preset from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.starfield.validate()?;
        self.sphere.validate()?;
        self.animation.validate()?;
        self.camera.validate()?;
        self.window.validate()
    }
}

/// Point cloud surrounding the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    pub count: usize,
    /// Stars are scattered uniformly inside a cube of this half width.
    pub half_extent: f32,
    pub color: Color,
    pub point_size: f32,
    pub opacity: f32,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: 2500,
            half_extent: 1500.0,
            color: Color::WHITE,
            point_size: 1.2,
            opacity: 1.0,
        }
    }
}

impl StarfieldConfig {
    fn validate(&self) -> Result<()> {
        if !(self.half_extent >= 0.0 && self.half_extent.is_finite()) {
            return Err(BackdropError::invalid(
                "starfield.half_extent",
                "must be a finite, non-negative number",
            ));
        }
        if self.point_size <= 0.0 {
            return Err(BackdropError::invalid(
                "starfield.point_size",
                "must be positive",
            ));
        }
        validate_opacity("starfield.opacity", self.opacity)
    }
}

/// Energy sphere made of tilted line loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    pub line_count: usize,
    pub radius: f32,
    /// Each line gets `radius + U[0, radius_jitter)` as its own radius.
    pub radius_jitter: f32,
    /// Number of segments per loop; the loop stores `detail + 1` points.
    pub detail: usize,
    pub ripple_amplitude: f32,
    pub ripple_frequency: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub opacity: f32,
    pub line_width: f32,
    pub palette: Vec<Color>,
    pub directions: Vec<Direction>,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            line_count: 80,
            radius: 6.0,
            radius_jitter: 0.3,
            detail: 80,
            ripple_amplitude: 0.3,
            ripple_frequency: 2.0,
            speed_min: 0.001,
            speed_max: 0.003,
            opacity: 0.7,
            line_width: 2.0,
            palette: vec![
                Color::from_hex(0xff33cc),
                Color::from_hex(0xaa66ff),
                Color::from_hex(0x3399ff),
            ],
            directions: vec![Direction::Clockwise, Direction::Counter, Direction::UpDown],
        }
    }
}

impl SphereConfig {
    fn validate(&self) -> Result<()> {
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return Err(BackdropError::invalid("sphere.radius", "must be positive"));
        }
        if !(self.radius_jitter >= 0.0 && self.radius_jitter.is_finite()) {
            return Err(BackdropError::invalid(
                "sphere.radius_jitter",
                "must be a finite, non-negative number",
            ));
        }
        if self.detail < 3 {
            return Err(BackdropError::invalid(
                "sphere.detail",
                format!("needs at least 3 segments, got {}", self.detail),
            ));
        }
        if !(self.ripple_amplitude >= 0.0 && self.ripple_amplitude.is_finite()) {
            return Err(BackdropError::invalid(
                "sphere.ripple_amplitude",
                "must be a finite, non-negative number",
            ));
        }
        if !(self.speed_min > 0.0
            && self.speed_min <= self.speed_max
            && self.speed_max.is_finite())
        {
            return Err(BackdropError::invalid(
                "sphere.speed_min",
                format!(
                    "speed band {}..{} must be finite, positive and ordered",
                    self.speed_min, self.speed_max
                ),
            ));
        }
        if self.palette.is_empty() {
            return Err(BackdropError::invalid("sphere.palette", "must not be empty"));
        }
        if self.directions.is_empty() {
            return Err(BackdropError::invalid(
                "sphere.directions",
                "must not be empty",
            ));
        }
        validate_opacity("sphere.opacity", self.opacity)
    }
}

/// How the frame animator turns a frame's `dt` into animation progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeStepMode {
    /// Every invocation advances by exactly one reference frame, whatever the
    /// real elapsed time was.
    Fixed,
    /// Progress is proportional to the measured frame time.
    #[default]
    Elapsed,
}

/// Per-frame rates. All deltas are expressed per reference frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub mode: TimeStepMode,
    /// Increment of the animation time accumulator per reference frame.
    pub time_step: f32,
    pub reference_frame_seconds: f32,
    /// Longest frame the elapsed mode will honor; longer gaps are clamped.
    pub max_frame_seconds: f32,
    pub star_rotation_x: f32,
    pub star_rotation_y: f32,
    pub group_rotation_y: f32,
    pub pulse_amplitude: f32,
    pub pulse_frequency: f32,
    pub bob_amplitude: f32,
    pub bob_frequency_x: f32,
    pub bob_frequency_z: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            mode: TimeStepMode::default(),
            time_step: 0.01,
            reference_frame_seconds: 1.0 / 60.0,
            max_frame_seconds: 0.25,
            star_rotation_x: 0.0001,
            star_rotation_y: 0.0002,
            group_rotation_y: 0.001,
            pulse_amplitude: 0.05,
            pulse_frequency: 0.8,
            bob_amplitude: 0.4,
            bob_frequency_x: 0.5,
            bob_frequency_z: 0.3,
        }
    }
}

impl AnimationConfig {
    fn validate(&self) -> Result<()> {
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            return Err(BackdropError::invalid(
                "animation.time_step",
                "must be positive",
            ));
        }
        if !(self.reference_frame_seconds > 0.0 && self.reference_frame_seconds.is_finite())
        {
            return Err(BackdropError::invalid(
                "animation.reference_frame_seconds",
                "must be positive",
            ));
        }
        if !(self.max_frame_seconds >= self.reference_frame_seconds
            && self.max_frame_seconds.is_finite())
        {
            return Err(BackdropError::invalid(
                "animation.max_frame_seconds",
                "must be finite and cover at least one reference frame",
            ));
        }
        if !(0.0..1.0).contains(&self.pulse_amplitude) {
            return Err(BackdropError::invalid(
                "animation.pulse_amplitude",
                "must be in [0, 1)",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the origin along +Z.
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: 20.0,
        }
    }
}

impl CameraConfig {
    fn validate(&self) -> Result<()> {
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(BackdropError::invalid(
                "camera.fov_y_degrees",
                "must be in (0, 180)",
            ));
        }
        if !(self.near > 0.0 && self.near < self.far) {
            return Err(BackdropError::invalid(
                "camera.near",
                format!("clip range {}..{} must be positive and ordered", self.near, self.far),
            ));
        }
        Ok(())
    }
}

/// Lights carried by the scene. The backdrop materials are unlit, so these
/// only matter to renderers that shade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_color: Color,
    pub ambient_intensity: f32,
    pub point_color: Color,
    pub point_intensity: f32,
    pub point_range: f32,
    pub point_position: [f32; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: Color::WHITE,
            ambient_intensity: 0.4,
            point_color: Color::from_hex(0xff88ff),
            point_intensity: 2.0,
            point_range: 50.0,
            point_position: [0.0, 0.0, 20.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub background: Color,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Energy Sphere".to_string(),
            width: 1280.0,
            height: 720.0,
            background: Color::BLACK,
        }
    }
}

impl WindowConfig {
    fn validate(&self) -> Result<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(BackdropError::invalid(
                "window.width",
                "window size must be positive",
            ));
        }
        Ok(())
    }
}

fn validate_opacity(field: &'static str, opacity: f32) -> Result<()> {
    if (0.0..=1.0).contains(&opacity) {
        Ok(())
    } else {
        Err(BackdropError::invalid(field, "must be in [0, 1]"))
    }
}
