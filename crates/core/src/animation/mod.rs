use std::f32::consts::TAU;

use serde::Serialize;

use crate::{
    config::{AnimationConfig, TimeStepMode},
    scene::{Direction, SceneGraph},
};

/// Animation time accumulator. `time` is in animation units, not seconds:
/// it grows by `time_step` per reference frame. Kept in `f64` so a step of
/// `time_step` still registers after days of continuous animation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct FrameClock {
    pub time: f64,
    pub frames: u64,
}

impl FrameClock {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn advance(&mut self, delta: f64) {
        self.time += delta;
        self.frames += 1;
    }
}

/// Mutable state threaded through every frame.
#[derive(Debug, Clone)]
pub struct SceneState {
    pub scene: SceneGraph,
    pub clock: FrameClock,
}

impl SceneState {
    pub fn new(scene: SceneGraph) -> Self {
        Self {
            scene,
            clock: FrameClock::default(),
        }
    }
}

/// Uniform group scale at animation time `time`.
pub fn pulse_scale(time: f64, amplitude: f32, frequency: f32) -> f32 {
    1.0 + ((time * f64::from(frequency)).sin() as f32) * amplitude
}

/// X and Z rotation of an up/down line. Depends only on `time` and the
/// line's index, never on earlier frames.
pub fn bob_rotation(time: f64, index: usize, config: &AnimationConfig) -> (f32, f32) {
    let phase = index as f64;
    let x = (time * f64::from(config.bob_frequency_x) + phase).sin() as f32;
    let z = (time * f64::from(config.bob_frequency_z) + phase).cos() as f32;
    (x * config.bob_amplitude, z * config.bob_amplitude)
}

fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(TAU)
}

/// Frame animator: turns a frame's `dt` into transform updates.
#[derive(Debug, Clone)]
pub struct Animator {
    config: AnimationConfig,
}

impl Animator {
    pub fn new(config: AnimationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// How many reference frames an invocation with `dt` seconds stands for.
    pub fn frame_weight(&self, dt: f32) -> f32 {
        match self.config.mode {
            TimeStepMode::Fixed => 1.0,
            TimeStepMode::Elapsed => {
                if !dt.is_finite() || dt <= 0.0 {
                    return 0.0;
                }
                dt.min(self.config.max_frame_seconds) / self.config.reference_frame_seconds
            }
        }
    }

    /// Pure transition: consumes the state and returns the next one.
    pub fn step(&self, mut state: SceneState, dt: f32) -> SceneState {
        self.advance(&mut state, dt);
        state
    }

    pub fn advance(&self, state: &mut SceneState, dt: f32) {
        let cfg = &self.config;
        let weight = self.frame_weight(dt);

        state.clock.advance(f64::from(cfg.time_step) * f64::from(weight));
        let time = state.clock.time;
        let scene = &mut state.scene;

        let stars = &mut scene.starfield.transform.rotation;
        stars.y = wrap_angle(stars.y + cfg.star_rotation_y * weight);
        stars.x = wrap_angle(stars.x + cfg.star_rotation_x * weight);

        for (index, line) in scene.energy.lines.iter_mut().enumerate() {
            let rotation = &mut line.transform.rotation;
            match line.direction {
                Direction::Clockwise => {
                    rotation.y = wrap_angle(rotation.y + line.speed * weight);
                }
                Direction::Counter => {
                    rotation.y = wrap_angle(rotation.y - line.speed * weight);
                }
                Direction::UpDown => {
                    let (x, z) = bob_rotation(time, index, cfg);
                    rotation.x = x;
                    rotation.z = z;
                }
            }
        }

        let group = &mut scene.energy.transform;
        group.scale = glam::Vec3::splat(pulse_scale(
            time,
            cfg.pulse_amplitude,
            cfg.pulse_frequency,
        ));
        group.rotation.y = wrap_angle(group.rotation.y + cfg.group_rotation_y * weight);

        tracing::trace!(frame = state.clock.frames, time, "advanced animation");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, scene::SceneBuilder};
    use rand::{rngs::StdRng, SeedableRng};

    const REFERENCE_DT: f32 = 1.0 / 60.0;

    fn fixed_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.animation.mode = TimeStepMode::Fixed;
        config
    }

    fn state_for(config: &AppConfig) -> SceneState {
        let scene = SceneBuilder::new(config).build(&mut StdRng::seed_from_u64(17));
        SceneState::new(scene)
    }

    /// Distance between two angles on the circle.
    fn angle_gap(a: f32, b: f32) -> f32 {
        let d = (a - b).rem_euclid(TAU);
        d.min(TAU - d)
    }

    #[test]
    fn pulse_stays_in_band() {
        let cfg = AnimationConfig::default();
        for i in 0..20_000 {
            let t = f64::from(i) * 0.037;
            let s = pulse_scale(t, cfg.pulse_amplitude, cfg.pulse_frequency);
            assert!((0.95..=1.05).contains(&s), "pulse {s} at {t}");
        }
    }

    #[test]
    fn spinning_lines_accumulate_speed() {
        let config = fixed_config();
        let animator = Animator::new(config.animation.clone());
        let initial = state_for(&config);
        let mut state = initial.clone();

        let n = 500;
        for _ in 0..n {
            // Fixed mode ignores the measured frame time.
            state = animator.step(state, 0.5);
        }

        for (before, after) in initial.scene.energy.lines.iter().zip(&state.scene.energy.lines) {
            let expected = match before.direction {
                Direction::Clockwise => before.transform.rotation.y + n as f32 * before.speed,
                Direction::Counter => before.transform.rotation.y - n as f32 * before.speed,
                Direction::UpDown => continue,
            };
            let gap = angle_gap(after.transform.rotation.y, expected);
            assert!(gap < 1e-3, "{:?} drifted by {gap}", before.direction);
        }
    }

    #[test]
    fn up_down_lines_depend_only_on_time() {
        let config = fixed_config();
        let animator = Animator::new(config.animation.clone());
        let mut state = state_for(&config);

        for _ in 0..123 {
            animator.advance(&mut state, REFERENCE_DT);
        }

        let t = state.clock.time;
        assert!((t - 1.23).abs() < 1e-4);
        for (index, line) in state.scene.energy.lines.iter().enumerate() {
            if line.direction != Direction::UpDown {
                continue;
            }
            let x = ((0.5 * t + index as f64).sin() as f32) * 0.4;
            let z = (f64::from(0.3_f32) * t + index as f64).cos() as f32 * 0.4;
            assert_eq!(line.transform.rotation.x, x);
            assert_eq!(line.transform.rotation.z, z);
        }
    }

    #[test]
    fn group_pulses_uniformly_and_spins() {
        let config = fixed_config();
        let animator = Animator::new(config.animation.clone());
        let mut state = state_for(&config);

        for _ in 0..10 {
            animator.advance(&mut state, REFERENCE_DT);
        }

        let group = state.scene.energy.transform;
        assert_eq!(group.scale.x, group.scale.y);
        assert_eq!(group.scale.y, group.scale.z);
        assert!((group.scale.x - pulse_scale(0.1, 0.05, 0.8)).abs() < 1e-5);
        assert!((group.rotation.y - 0.01).abs() < 1e-6);

        let stars = state.scene.starfield.transform.rotation;
        assert!((stars.y - 0.002).abs() < 1e-6);
        assert!((stars.x - 0.001).abs() < 1e-6);
        assert_eq!(state.clock.frames, 10);
    }

    #[test]
    fn elapsed_mode_matches_fixed_at_reference_rate() {
        let fixed = fixed_config();
        let elapsed = AppConfig::default();
        assert_eq!(elapsed.animation.mode, TimeStepMode::Elapsed);

        let a = Animator::new(fixed.animation.clone());
        let b = Animator::new(elapsed.animation.clone());
        let mut sa = state_for(&fixed);
        let mut sb = state_for(&elapsed);

        for _ in 0..240 {
            a.advance(&mut sa, REFERENCE_DT);
            b.advance(&mut sb, REFERENCE_DT);
        }

        assert!((sa.clock.time - sb.clock.time).abs() < 1e-4);
        for (la, lb) in sa.scene.energy.lines.iter().zip(&sb.scene.energy.lines) {
            let (ra, rb) = (la.transform.rotation, lb.transform.rotation);
            assert!(angle_gap(ra.x, rb.x) < 1e-3);
            assert!(angle_gap(ra.y, rb.y) < 1e-3);
            assert!(angle_gap(ra.z, rb.z) < 1e-3);
        }
    }

    #[test]
    fn elapsed_mode_scales_with_frame_time() {
        let animator = Animator::new(AnimationConfig::default());
        assert!((animator.frame_weight(1.0 / 30.0) - 2.0).abs() < 1e-4);
        assert_eq!(animator.frame_weight(0.0), 0.0);
        assert_eq!(animator.frame_weight(f32::NAN), 0.0);
        // Long stalls are clamped rather than replayed.
        assert!((animator.frame_weight(10.0) - 15.0).abs() < 1e-3);
    }

    #[test]
    fn angles_stay_wrapped() {
        let mut config = fixed_config();
        config.animation.group_rotation_y = 1.0;
        let animator = Animator::new(config.animation.clone());
        let mut state = state_for(&config);

        for _ in 0..100 {
            animator.advance(&mut state, REFERENCE_DT);
        }

        let y = state.scene.energy.transform.rotation.y;
        assert!((0.0..TAU).contains(&y));
        assert!(angle_gap(y, 100.0) < 1e-3);
    }

    #[test]
    fn time_keeps_stepping_after_long_runs() {
        let config = fixed_config();
        let animator = Animator::new(config.animation.clone());
        let mut state = state_for(&config);
        // Roughly 60 hours of animation at 60 Hz.
        let start = 131_072.0;
        state.clock.time = start;

        for _ in 0..1001 {
            animator.advance(&mut state, REFERENCE_DT);
        }

        let step = f64::from(config.animation.time_step);
        let elapsed = state.clock.time - start;
        assert!((elapsed - 1001.0 * step).abs() < 1e-6, "elapsed {elapsed}");

        let before = state.scene.energy.transform.scale.x;
        animator.advance(&mut state, REFERENCE_DT);
        assert!((state.clock.time - start - 1002.0 * step).abs() < 1e-6);
        assert_ne!(state.scene.energy.transform.scale.x, before);
    }

    #[test]
    fn clock_reset_clears_progress() {
        let mut clock = FrameClock::default();
        clock.advance(0.5);
        clock.advance(0.25);
        assert_eq!(clock.frames, 2);
        assert!((clock.time - 0.75).abs() < f64::EPSILON);

        clock.reset();
        assert_eq!(clock, FrameClock::default());
    }
}
