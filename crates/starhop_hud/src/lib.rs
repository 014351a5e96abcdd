//! Score/player HUD and debug panel rendered via egui on top of the scene.
//!
//! Integration pattern: egui requires a three-phase render split because
//! `egui_wgpu::Renderer::render()` needs a `RenderPass<'static>`, while
//! `begin_render_pass` borrows the encoder. The phases are:
//!
//!   1. `prepare()` -- run egui UI logic, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers (borrows encoder mutably)
//!   3. `paint()`   -- render into a new render pass with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! The gameplay HUD (score text, player label) is always drawn; the debug
//! panel only when `debug_visible` is true (toggled by F3). egui event
//! handling stays active either way so the panel can intercept clicks when
//! shown.

use starhop_core::time::TimeState;
use winit::window::Window;

/// Screen position of the score text, from the original scene layout.
const SCORE_POS: (f32, f32) = (16.0, 16.0);
const SCORE_FONT_SIZE: f32 = 28.0;
/// Screen position of the player-name label.
const PLAYER_POS: (f32, f32) = (650.0, 16.0);
const PLAYER_FONT_SIZE: f32 = 18.0;

/// What the gameplay HUD shows every frame.
#[derive(Debug, Clone, Default)]
pub struct HudModel {
    /// Full score line, e.g. "Score: 120". Owned by the scene, mirrored here.
    pub score_text: String,
    /// Display name resolved at scene create ("Guest" fallback).
    pub player_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct DebugStats {
    pub draw_calls: u32,
    pub sprite_count: u32,
    pub body_count: u32,
    pub active_stars: u32,
}

pub struct HudOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub debug_visible: bool,
}

impl HudOverlay {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, window: &Window) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            debug_visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        response.consumed
    }

    pub fn toggle_debug(&mut self) {
        self.debug_visible = !self.debug_visible;
        log::info!(
            "Debug panel: {}",
            if self.debug_visible { "ON" } else { "OFF" }
        );
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        model: &HudModel,
        time: &TimeState,
        stats: Option<DebugStats>,
    ) -> (Vec<egui::ClippedPrimitive>, egui::TexturesDelta) {
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let debug_visible = self.debug_visible;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            draw_hud(ctx, model);

            if debug_visible {
                egui::Window::new("Debug")
                    .default_pos([10.0, 60.0])
                    .show(ctx, |ui| {
                        ui.label(format!("FPS: {:.1}", time.smoothed_fps));
                        ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
                        ui.label(format!("Steps this frame: {}", time.steps_this_frame));
                        ui.label(format!("Total steps: {}", time.fixed_step_count));
                        if let Some(ref stats) = stats {
                            ui.separator();
                            ui.label(format!("Draw calls: {}", stats.draw_calls));
                            ui.label(format!("Sprites: {}", stats.sprite_count));
                            ui.label(format!("Physics bodies: {}", stats.body_count));
                            ui.label(format!("Active stars: {}", stats.active_stars));
                        }
                    });
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures that egui no longer needs. Call after rendering.
    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn draw_hud(ctx: &egui::Context, model: &HudModel) {
    egui::Area::new(egui::Id::new("hud_score"))
        .fixed_pos(egui::pos2(SCORE_POS.0, SCORE_POS.1))
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(&model.score_text)
                    .size(SCORE_FONT_SIZE)
                    .color(egui::Color32::WHITE),
            );
        });

    egui::Area::new(egui::Id::new("hud_player"))
        .fixed_pos(egui::pos2(PLAYER_POS.0, PLAYER_POS.1))
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!("Player: {}", model.player_name))
                    .size(PLAYER_FONT_SIZE)
                    .color(egui::Color32::WHITE),
            );
        });
}
