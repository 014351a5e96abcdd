//! Test-only replay harness: a JSON script of key-hold segments is driven
//! through the scene at the fixed timestep, so whole-scene behavior can be
//! asserted deterministically without a window or GPU.

use serde::Deserialize;

use starhop_core::input::{InputState, Key};

use crate::scene::{GameScene, PlatformerScene};

const DT_US: u64 = 16_667;

#[derive(Debug, Deserialize)]
pub struct InputScript {
    pub segments: Vec<Segment>,
}

/// Hold a set of keys for a number of fixed steps.
#[derive(Debug, Deserialize)]
pub struct Segment {
    pub frames: u32,
    #[serde(default)]
    pub keys: Vec<String>,
}

impl InputScript {
    pub fn from_json(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse input script: {e}"))
    }

    /// Play the whole script into the scene. Unknown key names are an error so
    /// a typo in a script fails the test instead of silently doing nothing.
    pub fn run(&self, scene: &mut PlatformerScene) -> Result<(), String> {
        for segment in &self.segments {
            let mut input = InputState::new();
            for name in &segment.keys {
                input.key_down(parse_key(name)?);
            }
            for _ in 0..segment.frames {
                scene.update(&input, DT_US);
                input.end_frame();
            }
        }
        Ok(())
    }
}

fn parse_key(name: &str) -> Result<Key, String> {
    match name {
        "left" => Ok(Key::Left),
        "right" => Ok(Key::Right),
        "up" => Ok(Key::Up),
        "down" => Ok(Key::Down),
        other => Err(format!("Unknown key name '{other}' in input script")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use starhop_core::session::Session;

    fn scene_with_seed(seed: u64) -> PlatformerScene {
        let mut scene = PlatformerScene::new(
            Vec2::new(0.0, 600.0),
            Vec2::new(960.0, 600.0),
            None::<Session>,
            seed,
        );
        scene.create();
        scene
    }

    fn player_center(scene: &PlatformerScene) -> Vec2 {
        let sprite = *scene.sprites().last().expect("player sprite present");
        sprite.center
    }

    #[test]
    fn unknown_key_name_is_rejected() {
        let script =
            InputScript::from_json(r#"{ "segments": [ { "frames": 1, "keys": ["jump"] } ] }"#)
                .expect("script parses");
        let mut scene = scene_with_seed(1);
        assert!(script.run(&mut scene).is_err());
    }

    #[test]
    fn running_right_moves_the_player_right() {
        let script = InputScript::from_json(
            r#"{ "segments": [
                { "frames": 120 },
                { "frames": 60, "keys": ["right"] }
            ] }"#,
        )
        .expect("script parses");

        let mut scene = scene_with_seed(1);
        let start_x = player_center(&scene).x;
        script.run(&mut scene).expect("script runs");
        let end_x = player_center(&scene).x;
        // 60 frames at 200 px/s is roughly 200 px of travel.
        assert!(end_x > start_x + 150.0, "moved from {start_x} to {end_x}");
    }

    #[test]
    fn holding_right_long_enough_pins_the_player_at_the_edge() {
        let script = InputScript::from_json(
            r#"{ "segments": [
                { "frames": 120 },
                { "frames": 600, "keys": ["right"] }
            ] }"#,
        )
        .expect("script parses");

        let mut scene = scene_with_seed(1);
        script.run(&mut scene).expect("script runs");
        // World bounds clamp: player half-width is 24, so center rests at 936.
        assert!((player_center(&scene).x - 936.0).abs() < 0.01);
    }

    #[test]
    fn jump_script_leaves_the_ground_and_returns() {
        let settle = InputScript::from_json(r#"{ "segments": [ { "frames": 300 } ] }"#)
            .expect("script parses");
        let mut scene = scene_with_seed(1);
        settle.run(&mut scene).expect("settle runs");
        let grounded_y = player_center(&scene).y;

        let jump = InputScript::from_json(
            r#"{ "segments": [ { "frames": 10, "keys": ["up"] } ] }"#,
        )
        .expect("script parses");
        jump.run(&mut scene).expect("jump runs");
        assert!(player_center(&scene).y < grounded_y - 10.0, "player rose");

        let fall = InputScript::from_json(r#"{ "segments": [ { "frames": 300 } ] }"#)
            .expect("script parses");
        fall.run(&mut scene).expect("fall runs");
        assert!((player_center(&scene).y - grounded_y).abs() < 0.5, "player landed again");
    }

    #[test]
    fn identical_scripts_and_seeds_reach_identical_states() {
        let raw = r#"{ "segments": [
            { "frames": 90 },
            { "frames": 45, "keys": ["right"] },
            { "frames": 20, "keys": ["right", "up"] },
            { "frames": 90, "keys": ["left"] },
            { "frames": 60 }
        ] }"#;

        let run = || {
            let script = InputScript::from_json(raw).expect("script parses");
            let mut scene = scene_with_seed(9);
            script.run(&mut scene).expect("script runs");
            (player_center(&scene), scene.score(), scene.active_star_count())
        };

        let (pos_a, score_a, stars_a) = run();
        let (pos_b, score_b, stars_b) = run();
        assert_eq!(pos_a, pos_b);
        assert_eq!(score_a, score_b);
        assert_eq!(stars_a, stars_b);
    }
}
