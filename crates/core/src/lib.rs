//! Core library for the Energy Sphere animated backdrop.
//!
//! A star field and a pulsing sphere of tilted line loops are generated once
//! by the [`scene`] builder, then advanced every frame by the [`animation`]
//! step and handed to a [`render::Renderer`]. [`SceneContext`] ties these
//! together so a driver only has to call `frame` and `resize`.

pub mod animation;
pub mod camera;
pub mod config;
pub mod context;
pub mod error;
pub mod render;
pub mod scene;

pub use animation::{bob_rotation, pulse_scale, Animator, FrameClock, SceneState};
pub use camera::PerspectiveCamera;
pub use config::{AnimationConfig, AppConfig, SphereConfig, StarfieldConfig, TimeStepMode};
pub use context::SceneContext;
pub use error::{BackdropError, Result};
pub use render::{
    DrawList, DrawPoint, DrawPolyline, ProjectingRenderer, RecordingRenderer, Renderer, Viewport,
};
pub use scene::{
    sample_energy_loop, Color, Direction, EnergyLine, EnergyLineGroup, SceneBuilder, SceneGraph,
    Starfield,
};
