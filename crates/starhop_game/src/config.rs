//! Static game configuration, loaded once at startup from JSON.
//!
//! Every field has a default matching the shipped game, so a missing or
//! unreadable config file degrades to defaults with a logged warning. Values
//! inside a file that parses are still validated strictly: a config that was
//! written deliberately should fail loudly when it is wrong.

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub renderer: RendererMode,
    pub window_title: String,
    pub width: u32,
    pub height: u32,
    /// Hex color string, e.g. "#0b0f1a".
    pub background_color: String,
    pub physics: PhysicsConfig,
    /// Seed for the star-bounce RNG. None derives one from the clock.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            renderer: RendererMode::Auto,
            window_title: "Starhop".to_string(),
            width: 960,
            height: 600,
            background_color: "#0b0f1a".to_string(),
            physics: PhysicsConfig::default(),
            rng_seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RendererMode {
    /// Let wgpu pick among the primary backends for this platform.
    #[default]
    Auto,
    Vulkan,
    Dx12,
    Gl,
}

impl RendererMode {
    pub fn backends(self) -> wgpu::Backends {
        match self {
            Self::Auto => wgpu::Backends::PRIMARY,
            Self::Vulkan => wgpu::Backends::VULKAN,
            Self::Dx12 => wgpu::Backends::DX12,
            Self::Gl => wgpu::Backends::GL,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Engine selector. "arcade" is the only simulation this game ships.
    pub engine: String,
    pub gravity: GravityConfig,
    /// Draw translucent quads over physics bodies and statics.
    pub debug: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            engine: "arcade".to_string(),
            gravity: GravityConfig { x: 0.0, y: 600.0 },
            debug: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct GravityConfig {
    pub x: f32,
    pub y: f32,
}

impl GameConfig {
    /// Linear color components for the clear color, decoded from the hex string.
    pub fn clear_color(&self) -> Result<wgpu::Color, String> {
        let (r, g, b) = parse_hex_color(&self.background_color)?;
        Ok(wgpu::Color {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        })
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Load the config, or fall back to defaults when the file is missing or
/// malformed. The game is playable without any config on disk.
pub fn load_config_or_default(path: &Path) -> GameConfig {
    match load_config_from_path(path) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("{err}. Using default configuration.");
            GameConfig::default()
        }
    }
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.width == 0 || config.height == 0 {
        return Err("Config validation failed: width and height must be > 0".to_string());
    }
    if config.physics.engine != "arcade" {
        return Err(format!(
            "Config validation failed: unknown physics engine '{}' (only 'arcade' is supported)",
            config.physics.engine
        ));
    }
    parse_hex_color(&config.background_color)
        .map_err(|e| format!("Config validation failed: {e}"))?;
    Ok(())
}

fn parse_hex_color(value: &str) -> Result<(u8, u8, u8), String> {
    let digits = value
        .strip_prefix('#')
        .ok_or_else(|| format!("color '{value}' must start with '#'"))?;
    if digits.len() != 6 {
        return Err(format!("color '{value}' must be 6 hex digits"));
    }
    let parse_pair = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| format!("color '{value}' has non-hex digits"))
    };
    Ok((parse_pair(0..2)?, parse_pair(2..4)?, parse_pair(4..6)?))
}
