//! The platformer scene: player, one ground platform, twelve collectible
//! stars, and the score. All gameplay state lives in `PlatformerScene`; the
//! runtime owns exactly one and drives it through the `GameScene` lifecycle.
//!
//! Lifecycle contract:
//!  - `preload` declares assets; no world state exists yet.
//!  - `create` builds the physics world, entities, and animation clips, then
//!    arms the scene.
//!  - `update` runs once per fixed step. Before `create` has run it is a
//!    strict no-op, so a stray early tick cannot corrupt anything.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use starhop_core::animation::{AnimationClip, AnimationRegistry, AnimationState};
use starhop_core::input::{InputState, Key};
use starhop_core::session::{display_name, Session};

use crate::assets::AssetManifest;
use crate::physics::{Aabb, ArcadePhysics, Body, BodyId, OverlapEvent};

pub const CANVAS_WIDTH: f32 = 960.0;
pub const CANVAS_HEIGHT: f32 = 600.0;

const PLAYER_SPAWN: Vec2 = Vec2::new(100.0, 450.0);
const PLAYER_HALF: f32 = 24.0;
const PLAYER_BOUNCE: f32 = 0.2;
const RUN_SPEED: f32 = 200.0;
const JUMP_SPEED: f32 = -400.0;

const STAR_COUNT: usize = 12;
const STAR_FIRST_X: f32 = 12.0;
const STAR_STEP_X: f32 = 80.0;
const STAR_HALF: f32 = 24.0;
const SCORE_PER_STAR: u32 = 10;

/// Ground platform: authored collider rect, full canvas width, top face at
/// y = 576. Decoupled from the placeholder art's pixel size.
const GROUND: Aabb = Aabb {
    center_x: 480.0,
    center_y: 584.0,
    half_w: 480.0,
    half_h: 8.0,
};

/// Scene lifecycle, in the order the runtime calls it.
pub trait GameScene {
    fn preload(&mut self, manifest: &mut AssetManifest);
    fn create(&mut self);
    fn update(&mut self, input: &InputState, dt_us: u64);
}

/// Which texture a sprite instance samples. The runtime resolves these to
/// bind groups; the scene stays GPU-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteTexture {
    Background,
    Platform,
    Star,
    Player { sheet_frame: u32 },
}

#[derive(Debug, Clone, Copy)]
pub struct SpriteInstance {
    pub center: Vec2,
    pub size: Vec2,
    pub texture: SpriteTexture,
}

struct StarEntity {
    body: BodyId,
    /// Original spawn x, restored verbatim on respawn.
    spawn_x: f32,
}

pub struct PlatformerScene {
    created: bool,
    physics: ArcadePhysics,
    player: Option<BodyId>,
    stars: Vec<StarEntity>,
    score: u32,
    score_text: String,
    player_name: String,
    animations: AnimationRegistry,
    player_anim: Option<AnimationState>,
    player_frame: u32,
    session: Option<Session>,
    rng: StdRng,
    sound_queue: Vec<String>,
}

impl PlatformerScene {
    pub fn new(gravity: Vec2, bounds: Vec2, session: Option<Session>, seed: u64) -> Self {
        Self {
            created: false,
            physics: ArcadePhysics::new(gravity, bounds),
            player: None,
            stars: Vec::new(),
            score: 0,
            score_text: String::new(),
            player_name: String::new(),
            animations: AnimationRegistry::new(),
            player_anim: None,
            player_frame: 0,
            session,
            rng: StdRng::seed_from_u64(seed),
            sound_queue: Vec::new(),
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn score_text(&self) -> &str {
        &self.score_text
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn active_star_count(&self) -> usize {
        self.stars
            .iter()
            .filter(|star| self.physics.body(star.body).enabled)
            .count()
    }

    pub fn body_count(&self) -> usize {
        self.physics.body_count()
    }

    /// Sounds queued since the last drain, in play order. The runtime feeds
    /// these to the sound bank; tests inspect them directly.
    pub fn drain_sounds(&mut self) -> Vec<String> {
        std::mem::take(&mut self.sound_queue)
    }

    /// Everything to draw this frame, back to front.
    pub fn sprites(&self) -> Vec<SpriteInstance> {
        if !self.created {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(2 + self.stars.len() + 1);

        out.push(SpriteInstance {
            center: Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0),
            size: Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            texture: SpriteTexture::Background,
        });

        for solid in self.physics.statics_iter() {
            out.push(SpriteInstance {
                center: Vec2::new(solid.center_x, solid.center_y),
                size: Vec2::new(solid.half_w * 2.0, solid.half_h * 2.0),
                texture: SpriteTexture::Platform,
            });
        }

        for star in &self.stars {
            let body = self.physics.body(star.body);
            if !body.enabled {
                continue;
            }
            out.push(SpriteInstance {
                center: Vec2::new(body.aabb.center_x, body.aabb.center_y),
                size: Vec2::new(STAR_HALF * 2.0, STAR_HALF * 2.0),
                texture: SpriteTexture::Star,
            });
        }

        if let Some(player) = self.player {
            let body = self.physics.body(player);
            out.push(SpriteInstance {
                center: Vec2::new(body.aabb.center_x, body.aabb.center_y),
                size: Vec2::new(PLAYER_HALF * 2.0, PLAYER_HALF * 2.0),
                texture: SpriteTexture::Player {
                    sheet_frame: self.player_frame,
                },
            });
        }

        out
    }

    /// Debug-quad rects for every physics body and static, for the F4 overlay.
    pub fn debug_rects(&self) -> Vec<Aabb> {
        let mut out: Vec<Aabb> = self.physics.statics_iter().copied().collect();
        for star in &self.stars {
            let body = self.physics.body(star.body);
            if body.enabled {
                out.push(body.aabb);
            }
        }
        if let Some(player) = self.player {
            out.push(self.physics.body(player).aabb);
        }
        out
    }

    fn play_clip(&mut self, name: &str) {
        let restart = match &self.player_anim {
            Some(state) => state.clip_name != name,
            None => true,
        };
        if restart {
            if self.animations.resolve(name).is_none() {
                log::warn!("Unknown animation clip '{name}'");
                return;
            }
            self.player_anim = Some(AnimationState::new(name));
        }
    }

    fn stop_clip(&mut self) {
        self.player_anim = None;
        self.player_frame = 0;
    }

    fn collect_star(&mut self, star_id: BodyId) {
        let body = self.physics.body_mut(star_id);
        if !body.enabled {
            return;
        }
        body.enabled = false;

        self.score += SCORE_PER_STAR;
        self.score_text = format!("Score: {}", self.score);
        self.sound_queue.push("hit".to_string());
        log::debug!("Star collected, score = {}", self.score);

        if self.active_star_count() == 0 {
            log::info!("All stars collected, respawning the row");
            for star in &self.stars {
                let body = self.physics.body_mut(star.body);
                body.enabled = true;
                body.aabb.center_x = star.spawn_x;
                body.aabb.center_y = 0.0;
                body.velocity = Vec2::ZERO;
            }
        }
    }

    fn handle_overlap(&mut self, event: OverlapEvent) {
        // The only registered overlap pairs are (player, star).
        if Some(event.a) == self.player {
            self.collect_star(event.b);
        }
    }
}

impl GameScene for PlatformerScene {
    fn preload(&mut self, manifest: &mut AssetManifest) {
        manifest.add_image("bg", "assets/textures/placeholder.png");
        manifest.add_image("platform", "assets/textures/placeholder.png");
        manifest.add_image("star", "assets/textures/placeholder.png");
        manifest.add_sprite_sheet("player", "assets/textures/placeholder.png", 48, 48);
        manifest.add_audio("hit", "assets/audio/hit.wav");
    }

    fn create(&mut self) {
        self.physics.add_static(GROUND);

        let mut player_body = Body::new(Aabb {
            center_x: PLAYER_SPAWN.x,
            center_y: PLAYER_SPAWN.y,
            half_w: PLAYER_HALF,
            half_h: PLAYER_HALF,
        });
        player_body.bounce = Vec2::new(0.0, PLAYER_BOUNCE);
        player_body.collide_world_bounds = true;
        let player = self.physics.add_body(player_body);
        self.physics.register_collider(player);
        self.player = Some(player);

        // Placeholder art ships a single frame, so the one movement clip is a
        // single-frame loop.
        match AnimationClip::from_frame_range(0, 0, 10, true) {
            Ok(left) => {
                if let Err(e) = self.animations.create("left", left) {
                    log::warn!("{e}");
                }
            }
            Err(e) => log::warn!("Failed to build 'left' clip: {e}"),
        }

        for i in 0..STAR_COUNT {
            let spawn_x = STAR_FIRST_X + STAR_STEP_X * i as f32;
            let mut star_body = Body::new(Aabb {
                center_x: spawn_x,
                center_y: 0.0,
                half_w: STAR_HALF,
                half_h: STAR_HALF,
            });
            star_body.bounce = Vec2::new(0.0, self.rng.gen_range(0.4..0.8));
            let star = self.physics.add_body(star_body);
            self.physics.register_collider(star);
            self.physics.register_overlap(player, star);
            self.stars.push(StarEntity {
                body: star,
                spawn_x,
            });
        }

        self.score = 0;
        self.score_text = format!("Score: {}", self.score);
        self.player_name = display_name(self.session.as_ref()).to_string();

        self.created = true;
        log::info!(
            "Scene created: {} bodies, player '{}'",
            self.physics.body_count(),
            self.player_name
        );
    }

    fn update(&mut self, input: &InputState, dt_us: u64) {
        if !self.created {
            return;
        }
        let Some(player) = self.player else {
            return;
        };

        let move_left = input.is_held(Key::Left);
        let move_right = input.is_held(Key::Right);
        let jump = input.is_held(Key::Up);

        {
            let body = self.physics.body_mut(player);
            body.velocity.x = if move_left {
                -RUN_SPEED
            } else if move_right {
                RUN_SPEED
            } else {
                0.0
            };
            // Jump is held-up while grounded, not an edge trigger.
            if jump && body.is_grounded() {
                body.velocity.y = JUMP_SPEED;
            }
        }

        // Content gap: only a `left` clip exists, so rightward movement plays
        // it too. Kept as-is until a real sheet lands.
        if move_left || move_right {
            self.play_clip("left");
        } else {
            self.stop_clip();
        }

        let dt = dt_us as f32 / 1_000_000.0;
        let events = self.physics.step(dt);
        for event in events {
            self.handle_overlap(event);
        }

        if let Some(state) = &mut self.player_anim {
            if let Some(clip) = self.animations.resolve(&state.clip_name) {
                self.player_frame = state.tick(dt_us, clip);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT_US: u64 = 16_667;

    fn new_scene(session: Option<Session>, seed: u64) -> PlatformerScene {
        PlatformerScene::new(
            Vec2::new(0.0, 600.0),
            Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            session,
            seed,
        )
    }

    fn created_scene() -> PlatformerScene {
        let mut scene = new_scene(None, 7);
        scene.create();
        scene
    }

    /// Run updates with no input until the player rests on the ground.
    fn settle_player(scene: &mut PlatformerScene) {
        let input = InputState::new();
        for _ in 0..300 {
            scene.update(&input, DT_US);
        }
        let player = scene.player.expect("player exists after create");
        assert!(
            scene.physics.body(player).is_grounded(),
            "player should settle on the ground"
        );
    }

    #[test]
    fn no_input_zeroes_horizontal_velocity() {
        let mut scene = created_scene();
        let player = scene.player.unwrap();
        scene.physics.body_mut(player).velocity.x = 123.0;

        scene.update(&InputState::new(), DT_US);
        assert_eq!(scene.physics.body(player).velocity.x, 0.0);
        assert!(scene.player_anim.is_none());
    }

    #[test]
    fn held_direction_sets_exact_run_speed() {
        let mut scene = created_scene();
        let player = scene.player.unwrap();

        let mut input = InputState::new();
        input.key_down(Key::Left);
        scene.update(&input, DT_US);
        assert_eq!(scene.physics.body(player).velocity.x, -200.0);

        input.key_up(Key::Left);
        input.key_down(Key::Right);
        scene.update(&input, DT_US);
        assert_eq!(scene.physics.body(player).velocity.x, 200.0);
    }

    #[test]
    fn both_directions_play_the_left_clip() {
        let mut scene = created_scene();

        let mut input = InputState::new();
        input.key_down(Key::Right);
        scene.update(&input, DT_US);
        assert_eq!(
            scene.player_anim.as_ref().map(|s| s.clip_name.as_str()),
            Some("left")
        );

        input.key_up(Key::Right);
        input.key_down(Key::Left);
        scene.update(&input, DT_US);
        assert_eq!(
            scene.player_anim.as_ref().map(|s| s.clip_name.as_str()),
            Some("left")
        );
    }

    #[test]
    fn jump_requires_ground_contact() {
        let mut scene = created_scene();
        settle_player(&mut scene);
        let player = scene.player.unwrap();

        let mut input = InputState::new();
        input.key_down(Key::Up);
        scene.update(&input, DT_US);
        // The controller sets vy = -400; the same step's gravity adds ~10.
        let vy = scene.physics.body(player).velocity.y;
        assert!((vy - (-390.0)).abs() < 0.5, "jump velocity applied, vy = {vy}");
    }

    #[test]
    fn airborne_up_hold_does_not_reapply_jump() {
        let mut scene = created_scene();
        settle_player(&mut scene);
        let player = scene.player.unwrap();

        let mut input = InputState::new();
        input.key_down(Key::Up);
        scene.update(&input, DT_US);
        // Now airborne. Further up-held updates must only see gravity.
        let vy_before = scene.physics.body(player).velocity.y;
        scene.update(&input, DT_US);
        let vy_after = scene.physics.body(player).velocity.y;
        let gravity_delta = 600.0 * (DT_US as f32 / 1_000_000.0);
        assert!((vy_after - (vy_before + gravity_delta)).abs() < 0.5);
    }

    #[test]
    fn collection_scores_ten_and_disables_the_star() {
        let mut scene = created_scene();
        let star = scene.stars[0].body;

        scene.collect_star(star);
        assert_eq!(scene.score(), 10);
        assert_eq!(scene.score_text(), "Score: 10");
        assert!(!scene.physics.body(star).enabled);
        assert_eq!(scene.active_star_count(), 11);
        assert_eq!(scene.drain_sounds(), vec!["hit".to_string()]);
    }

    #[test]
    fn collecting_an_already_disabled_star_is_a_no_op() {
        let mut scene = created_scene();
        let star = scene.stars[0].body;
        scene.collect_star(star);
        scene.collect_star(star);
        assert_eq!(scene.score(), 10);
        assert_eq!(scene.active_star_count(), 11);
    }

    #[test]
    fn twelfth_collection_respawns_the_full_row() {
        let mut scene = created_scene();
        let star_ids: Vec<BodyId> = scene.stars.iter().map(|s| s.body).collect();

        for id in star_ids.iter().take(11) {
            scene.collect_star(*id);
        }
        assert_eq!(scene.score(), 110);
        assert_eq!(scene.active_star_count(), 1);

        // The final collection empties the row, which triggers the respawn
        // inside the same call.
        scene.collect_star(star_ids[11]);
        assert_eq!(scene.score(), 120);
        assert_eq!(scene.score_text(), "Score: 120");
        assert_eq!(scene.active_star_count(), 12);

        for (i, star) in scene.stars.iter().enumerate() {
            let body = scene.physics.body(star.body);
            assert!(body.enabled);
            assert_eq!(body.aabb.center_x, 12.0 + 80.0 * i as f32);
            assert_eq!(body.aabb.center_y, 0.0);
            assert_eq!(body.velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn display_name_defaults_to_guest() {
        let scene = created_scene();
        assert_eq!(scene.player_name(), "Guest");
    }

    #[test]
    fn display_name_uses_session_username_verbatim() {
        let session = Session {
            username: Some("ada".to_string()),
        };
        let mut scene = new_scene(Some(session), 7);
        scene.create();
        assert_eq!(scene.player_name(), "ada");
    }

    #[test]
    fn update_before_create_is_a_strict_no_op() {
        let mut scene = new_scene(None, 7);
        let mut input = InputState::new();
        input.key_down(Key::Left);
        input.key_down(Key::Up);

        scene.update(&input, DT_US);

        assert_eq!(scene.score(), 0);
        assert_eq!(scene.score_text(), "");
        assert_eq!(scene.body_count(), 0);
        assert!(scene.sprites().is_empty());
    }

    #[test]
    fn star_bounce_is_seeded_and_in_range() {
        let bounces = |seed: u64| -> Vec<f32> {
            let mut scene = new_scene(None, seed);
            scene.create();
            scene
                .stars
                .iter()
                .map(|s| scene.physics.body(s.body).bounce.y)
                .collect()
        };

        let a = bounces(42);
        let b = bounces(42);
        assert_eq!(a, b, "same seed must reproduce the same bounces");
        assert!(a.iter().all(|&v| (0.4..0.8).contains(&v)));

        let c = bounces(43);
        assert_ne!(a, c, "different seeds should differ");
    }

    #[test]
    fn player_overlap_with_star_collects_it_during_update() {
        let mut scene = created_scene();
        let player = scene.player.unwrap();
        let star = scene.stars[3].body;

        // Teleport the player onto the star; the next update's overlap pass
        // must collect it.
        let star_pos = scene.physics.body(star).aabb;
        let body = scene.physics.body_mut(player);
        body.aabb.center_x = star_pos.center_x;
        body.aabb.center_y = star_pos.center_y;

        scene.update(&InputState::new(), DT_US);
        assert_eq!(scene.score(), 10);
        assert!(!scene.physics.body(star).enabled);
    }

    #[test]
    fn sprites_draw_background_platforms_stars_then_player() {
        let scene = created_scene();
        let sprites = scene.sprites();
        assert_eq!(sprites.len(), 1 + 1 + 12 + 1);
        assert_eq!(sprites[0].texture, SpriteTexture::Background);
        assert_eq!(sprites[1].texture, SpriteTexture::Platform);
        assert!(matches!(
            sprites.last().unwrap().texture,
            SpriteTexture::Player { .. }
        ));
    }

    #[test]
    fn preload_registers_the_five_assets() {
        let mut scene = new_scene(None, 7);
        let mut manifest = AssetManifest::new();
        scene.preload(&mut manifest);
        let keys: Vec<&str> = manifest.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["bg", "platform", "star", "player", "hit"]);
    }
}
