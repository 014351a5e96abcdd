//! Starhop -- main loop and application entry point.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. All
//! simulation runs inside `RedrawRequested` using a **fixed-timestep** model
//! (see `TimeState`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- the scene updates in deterministic 60 Hz slices
//!   3. Rebuild the sprite mesh from the scene's sprite list
//!   4. Upload camera uniform, issue draw calls, composite the egui HUD
//!
//! The scene itself is windowless: it reads `InputState`, steps its physics
//! world, and exposes sprites, HUD strings, and queued sounds. Everything
//! GPU- or audio-shaped stays out here in the runtime.

mod assets;
mod audio;
mod config;
mod physics;
#[cfg(test)]
mod replay;
mod scene;
mod sheet;

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use assets::{load_image_bytes_or_fallback, AssetKind, AssetManifest};
use audio::SoundBank;
use config::{load_config_or_default, GameConfig};
use scene::{GameScene, PlatformerScene, SpriteTexture};
use sheet::{SpriteSheet, UvRect};
use starhop_core::input::{InputState, Key};
use starhop_core::session::Session;
use starhop_core::time::TimeState;
use starhop_hud::{DebugStats, HudModel, HudOverlay};
use starhop_platform::window::PlatformConfig;
use starhop_render::{Camera2D, GpuContext, SpritePipeline, SpriteVertex, Texture};

const CONFIG_PATH: &str = "assets/config/game.json";
const DEBUG_WHITE_ASSET: &str = "__debug_white";

/// A contiguous run of indices that share the same texture binding.
/// Draw calls are merged when consecutive quads use the same texture,
/// minimizing GPU bind-group switches during the render pass.
#[derive(Debug, Clone)]
struct DrawCall {
    texture_key: Arc<str>,
    index_start: u32,
    index_count: u32,
}

struct QuadSpec<'a> {
    texture_key: &'a str,
    center_x: f32,
    center_y: f32,
    width: f32,
    height: f32,
    uv: UvRect,
    color: [f32; 4],
}

struct GpuSpriteTexture {
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// All mutable engine state. Constructed lazily in
/// `ApplicationHandler::resumed` once the window and GPU surface exist.
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    camera: Camera2D,
    sprite_pipeline: SpritePipeline,
    hud: HudOverlay,

    scene: PlatformerScene,
    player_sheet: SpriteSheet,
    sounds: SoundBank,
    clear_color: wgpu::Color,
    show_physics_debug: bool,
    textures: HashMap<Arc<str>, GpuSpriteTexture>,

    // Per-frame GPU mesh state. The sprite mesh is rebuilt on the CPU each
    // frame, then streamed into these buffers. Buffers grow (power-of-two)
    // but never shrink.
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
    draw_calls: Vec<DrawCall>,
    sprite_count: usize,
}

impl EngineState {
    fn new(window: Arc<Window>, config: &GameConfig) -> Self {
        let gpu = GpuContext::new(window.clone(), config.renderer.backends());
        let time = TimeState::new();
        let input = InputState::new();
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let hud = HudOverlay::new(&gpu.device, gpu.surface_format, &window);

        let seed = config.rng_seed.unwrap_or_else(clock_seed);
        log::info!("Star bounce RNG seed: {seed}");

        let mut scene = PlatformerScene::new(
            glam::Vec2::new(config.physics.gravity.x, config.physics.gravity.y),
            glam::Vec2::new(config.width as f32, config.height as f32),
            Some(Session::from_env()),
            seed,
        );

        let mut manifest = AssetManifest::new();
        scene.preload(&mut manifest);

        let mut textures = HashMap::new();
        let mut sounds = SoundBank::new();
        let mut player_sheet = None;
        for entry in manifest.entries() {
            match &entry.kind {
                AssetKind::Image => {
                    let bytes = load_image_bytes_or_fallback(&entry.path);
                    textures.insert(
                        Arc::from(entry.key.as_str()),
                        upload_texture(&gpu, &sprite_pipeline, &bytes, &entry.key),
                    );
                }
                AssetKind::SpriteSheet {
                    frame_width,
                    frame_height,
                } => {
                    let bytes = load_image_bytes_or_fallback(&entry.path);
                    let texture = upload_texture(&gpu, &sprite_pipeline, &bytes, &entry.key);
                    let (w, h) = texture.texture.size;
                    player_sheet = match SpriteSheet::new(w, h, *frame_width, *frame_height) {
                        Ok(sheet) => Some(sheet),
                        Err(err) => {
                            log::warn!("Sprite sheet '{}': {err}. Using the full texture.", entry.key);
                            None
                        }
                    };
                    textures.insert(Arc::from(entry.key.as_str()), texture);
                }
                AssetKind::Audio => {
                    sounds.register(&entry.key, &entry.path);
                }
            }
        }
        // A sheet that cannot be gridded degrades to a single full-texture frame.
        let player_sheet = player_sheet
            .unwrap_or_else(|| SpriteSheet::new(48, 48, 48, 48).expect("trivial 1-frame sheet"));

        let white = Texture::from_rgba8(&gpu.device, &gpu.queue, &[255, 255, 255, 255], 1, 1, "debug_white");
        let white_bind_group = sprite_pipeline.create_texture_bind_group(&gpu.device, &white);
        textures.insert(
            Arc::from(DEBUG_WHITE_ASSET),
            GpuSpriteTexture {
                texture: white,
                bind_group: white_bind_group,
            },
        );

        scene.create();

        let camera = Camera2D::new(config.width, config.height);
        let camera_uniform = camera.build_uniform();
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);
        let vertex_buffer = create_vertex_buffer(&gpu.device, 1);
        let index_buffer = create_index_buffer(&gpu.device, 1);

        let clear_color = config.clear_color().unwrap_or_else(|err| {
            log::warn!("{err}. Using black.");
            wgpu::Color::BLACK
        });

        let mut state = Self {
            window,
            gpu,
            time,
            input,
            camera,
            sprite_pipeline,
            hud,
            scene,
            player_sheet,
            sounds,
            clear_color,
            show_physics_debug: config.physics.debug,
            textures,
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            mesh_vertex_capacity: 0,
            mesh_index_capacity: 0,
            draw_calls: Vec::new(),
            sprite_count: 0,
        };

        state.ensure_mesh_capacity(4, 6);
        state.rebuild_scene_mesh();
        state
    }

    fn rebuild_scene_mesh(&mut self) {
        let (vertices, indices, draw_calls) = self.build_mesh();
        self.ensure_mesh_capacity(vertices.len(), indices.len());
        self.sprite_count = vertices.len() / 4;
        self.draw_calls = draw_calls;

        if !vertices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        }
        if !indices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&indices));
        }
    }

    fn build_mesh(&self) -> (Vec<SpriteVertex>, Vec<u32>, Vec<DrawCall>) {
        let sprites = self.scene.sprites();
        let mut vertices = Vec::with_capacity((sprites.len() + 16) * 4);
        let mut indices = Vec::with_capacity((sprites.len() + 16) * 6);
        let mut draw_calls = Vec::with_capacity(8);

        for sprite in &sprites {
            let (texture_key, uv) = match sprite.texture {
                SpriteTexture::Background => ("bg", UvRect::FULL),
                SpriteTexture::Platform => ("platform", UvRect::FULL),
                SpriteTexture::Star => ("star", UvRect::FULL),
                SpriteTexture::Player { sheet_frame } => {
                    ("player", self.player_sheet.frame_uv(sheet_frame))
                }
            };
            add_quad(
                &mut vertices,
                &mut indices,
                &mut draw_calls,
                QuadSpec {
                    texture_key,
                    center_x: sprite.center.x,
                    center_y: sprite.center.y,
                    width: sprite.size.x,
                    height: sprite.size.y,
                    uv,
                    color: [1.0, 1.0, 1.0, 1.0],
                },
            );
        }

        // Physics debug overlay: translucent quads over every body and static.
        if self.show_physics_debug {
            for rect in self.scene.debug_rects() {
                add_quad(
                    &mut vertices,
                    &mut indices,
                    &mut draw_calls,
                    QuadSpec {
                        texture_key: DEBUG_WHITE_ASSET,
                        center_x: rect.center_x,
                        center_y: rect.center_y,
                        width: rect.half_w * 2.0,
                        height: rect.half_h * 2.0,
                        uv: UvRect::FULL,
                        color: [0.15, 0.9, 0.15, 0.35],
                    },
                );
            }
        }

        (vertices, indices, draw_calls)
    }

    fn ensure_mesh_capacity(&mut self, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.mesh_vertex_capacity {
            self.mesh_vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.mesh_vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.mesh_index_capacity {
            self.mesh_index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.mesh_index_capacity);
        }
    }
}

struct App {
    config: GameConfig,
    state: Option<EngineState>,
}

impl App {
    fn new(config: GameConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let platform_config = PlatformConfig {
            title: self.config.window_title.clone(),
            width: self.config.width,
            height: self.config.height,
        };
        let window = starhop_platform::window::create_window(event_loop, &platform_config);
        self.state = Some(EngineState::new(window, &self.config));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state.hud.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    state.camera.viewport = (w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(engine_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(engine_key),
                            ElementState::Released => state.input.key_up(engine_key),
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                // Fixed-step simulation phase.
                state.time.begin_frame();
                let dt_us = state.time.fixed_dt_us();

                while state.time.should_step() {
                    if state.input.is_just_pressed(Key::Escape) {
                        event_loop.exit();
                        return;
                    }
                    if state.input.is_just_pressed(Key::F3) {
                        state.hud.toggle_debug();
                    }
                    if state.input.is_just_pressed(Key::F4) {
                        state.show_physics_debug = !state.show_physics_debug;
                        log::info!(
                            "Physics debug: {}",
                            if state.show_physics_debug { "ON" } else { "OFF" }
                        );
                    }

                    state.scene.update(&state.input, dt_us);
                }

                for sound_key in state.scene.drain_sounds() {
                    state.sounds.play(&sound_key);
                }

                if state.time.steps_this_frame > 0 {
                    state.rebuild_scene_mesh();
                }

                // Render phase reads finalized simulation state from this frame.
                let camera_uniform = state.camera.build_uniform();
                state.gpu.queue.write_buffer(
                    &state.camera_buffer,
                    0,
                    bytemuck::cast_slice(&[camera_uniform]),
                );

                let Some((output, view)) = state.gpu.begin_frame() else {
                    return;
                };

                let hud_model = HudModel {
                    score_text: state.scene.score_text().to_string(),
                    player_name: state.scene.player_name().to_string(),
                };
                let (egui_primitives, egui_textures_delta) = state.hud.prepare(
                    &state.window,
                    &hud_model,
                    &state.time,
                    Some(DebugStats {
                        draw_calls: state.draw_calls.len() as u32,
                        sprite_count: state.sprite_count as u32,
                        body_count: state.scene.body_count() as u32,
                        active_stars: state.scene.active_star_count() as u32,
                    }),
                );
                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [state.gpu.size.0, state.gpu.size.1],
                    pixels_per_point: state.window.scale_factor() as f32,
                };

                let mut encoder =
                    state
                        .gpu
                        .device
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("Render Encoder"),
                        });

                {
                    let mut last_bound_texture_key: Option<&Arc<str>> = None;
                    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Scene Render Pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(state.clear_color),
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    });

                    render_pass.set_pipeline(&state.sprite_pipeline.render_pipeline);
                    render_pass.set_bind_group(0, &state.camera_bind_group, &[]);
                    render_pass.set_vertex_buffer(0, state.vertex_buffer.slice(..));
                    render_pass
                        .set_index_buffer(state.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

                    for draw in &state.draw_calls {
                        if let Some(texture) = state.textures.get(&draw.texture_key) {
                            let need_rebind = match last_bound_texture_key {
                                Some(last) => **last != *draw.texture_key,
                                None => true,
                            };
                            if need_rebind {
                                render_pass.set_bind_group(1, &texture.bind_group, &[]);
                                last_bound_texture_key = Some(&draw.texture_key);
                            }
                            render_pass.draw_indexed(
                                draw.index_start..(draw.index_start + draw.index_count),
                                0,
                                0..1,
                            );
                        }
                    }
                }

                state.hud.upload(
                    &state.gpu.device,
                    &state.gpu.queue,
                    &mut encoder,
                    &egui_primitives,
                    &egui_textures_delta,
                    &screen_descriptor,
                );

                {
                    let mut egui_pass = encoder
                        .begin_render_pass(&wgpu::RenderPassDescriptor {
                            label: Some("egui Render Pass"),
                            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                view: &view,
                                resolve_target: None,
                                ops: wgpu::Operations {
                                    load: wgpu::LoadOp::Load,
                                    store: wgpu::StoreOp::Store,
                                },
                            })],
                            depth_stencil_attachment: None,
                            ..Default::default()
                        })
                        .forget_lifetime();

                    state
                        .hud
                        .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
                }

                state.hud.cleanup(&egui_textures_delta);

                state.gpu.queue.submit(std::iter::once(encoder.finish()));
                output.present();

                // Only clear edge-triggered input (just_pressed) after at least
                // one fixed step consumed it. Otherwise a press that lands on a
                // frame with 0 simulation steps is silently lost.
                if state.time.steps_this_frame > 0 {
                    state.input.end_frame();
                }
            }

            _ => {}
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn add_quad(
    vertices: &mut Vec<SpriteVertex>,
    indices: &mut Vec<u32>,
    draw_calls: &mut Vec<DrawCall>,
    spec: QuadSpec<'_>,
) {
    let half_w = spec.width * 0.5;
    let half_h = spec.height * 0.5;
    let base_index = vertices.len() as u32;

    // y-down world: "top" is the smaller y. UV v grows downward too, so the
    // mapping is direct, no flip.
    vertices.push(SpriteVertex {
        position: [spec.center_x - half_w, spec.center_y - half_h],
        tex_coords: [spec.uv.u_min, spec.uv.v_min],
        color: spec.color,
    });
    vertices.push(SpriteVertex {
        position: [spec.center_x + half_w, spec.center_y - half_h],
        tex_coords: [spec.uv.u_max, spec.uv.v_min],
        color: spec.color,
    });
    vertices.push(SpriteVertex {
        position: [spec.center_x + half_w, spec.center_y + half_h],
        tex_coords: [spec.uv.u_max, spec.uv.v_max],
        color: spec.color,
    });
    vertices.push(SpriteVertex {
        position: [spec.center_x - half_w, spec.center_y + half_h],
        tex_coords: [spec.uv.u_min, spec.uv.v_max],
        color: spec.color,
    });

    let draw_start = indices.len() as u32;
    indices.extend_from_slice(&[
        base_index,
        base_index + 1,
        base_index + 2,
        base_index,
        base_index + 2,
        base_index + 3,
    ]);

    push_draw_call(draw_calls, Arc::from(spec.texture_key), draw_start, 6);
}

/// Append a draw call, merging with the previous one when the texture matches
/// and indices are contiguous. Sprites are emitted back-to-front, so the
/// twelve stars collapse into a single `draw_indexed` call.
fn push_draw_call(
    draw_calls: &mut Vec<DrawCall>,
    texture_key: Arc<str>,
    index_start: u32,
    index_count: u32,
) {
    if let Some(last) = draw_calls.last_mut() {
        let contiguous = last.index_start + last.index_count == index_start;
        if *last.texture_key == *texture_key && contiguous {
            last.index_count += index_count;
            return;
        }
    }
    draw_calls.push(DrawCall {
        texture_key,
        index_start,
        index_count,
    });
}

fn upload_texture(
    gpu: &GpuContext,
    pipeline: &SpritePipeline,
    bytes: &[u8],
    label: &str,
) -> GpuSpriteTexture {
    let texture = Texture::from_bytes(&gpu.device, &gpu.queue, bytes, label);
    let bind_group = pipeline.create_texture_bind_group(&gpu.device, &texture);
    GpuSpriteTexture {
        texture,
        bind_group,
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::F4 => Some(Key::F4),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config_or_default(std::path::Path::new(CONFIG_PATH));
    log::info!(
        "Starhop starting: {}x{}, physics engine '{}'",
        config.width,
        config.height,
        config.physics.engine
    );

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).expect("Event loop error");
}
