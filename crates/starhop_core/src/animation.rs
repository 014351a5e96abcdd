//! Frame-based sprite animation types and deterministic tick logic.
//!
//! Clips are sequences of sprite-sheet frame indices with per-frame durations.
//! All timing uses integer microseconds (`u64`) to guarantee deterministic
//! advancement under the fixed-timestep model -- no floating-point drift.
//!
//! Clips are registered in code at scene create time (the scene declares its
//! placeholder `left` clip there), so there is no file format here, just a
//! registry keyed by clip name.

use std::collections::HashMap;

/// A single frame in an animation clip: which sheet frame, for how long.
#[derive(Debug, Clone, Copy)]
pub struct AnimationFrame {
    pub sheet_frame: u32,
    pub duration_us: u64,
}

/// A named sequence of frames that can loop or play once.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub frames: Vec<AnimationFrame>,
    pub looping: bool,
}

impl AnimationClip {
    /// Build a clip from an inclusive sheet-frame range at a uniform frame rate.
    /// `looping` corresponds to an infinite repeat count.
    pub fn from_frame_range(
        start: u32,
        end: u32,
        frame_rate: u32,
        looping: bool,
    ) -> Result<Self, String> {
        if end < start {
            return Err(format!(
                "Animation clip frame range is inverted: {start}..={end}"
            ));
        }
        if frame_rate == 0 {
            return Err("Animation clip frame rate must be > 0".to_string());
        }
        let duration_us = 1_000_000 / frame_rate as u64;
        let frames = (start..=end)
            .map(|sheet_frame| AnimationFrame {
                sheet_frame,
                duration_us,
            })
            .collect();
        Ok(Self { frames, looping })
    }

    /// Total duration of one full cycle in microseconds.
    pub fn total_duration_us(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_us).sum()
    }
}

/// Clip registry keyed by name. Registration rejects duplicates so a scene
/// cannot silently shadow one clip with another.
#[derive(Default)]
pub struct AnimationRegistry {
    clips: HashMap<String, AnimationClip>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self {
            clips: HashMap::new(),
        }
    }

    pub fn create(&mut self, name: &str, clip: AnimationClip) -> Result<(), String> {
        if self.clips.contains_key(name) {
            return Err(format!("Animation clip '{name}' is already registered"));
        }
        self.clips.insert(name.to_string(), clip);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.get(name)
    }
}

/// Runtime state for one active animation instance.
#[derive(Debug, Clone)]
pub struct AnimationState {
    pub clip_name: String,
    pub frame_index: usize,
    pub elapsed_us: u64,
    pub finished: bool,
}

impl AnimationState {
    pub fn new(clip_name: &str) -> Self {
        Self {
            clip_name: clip_name.to_string(),
            frame_index: 0,
            elapsed_us: 0,
            finished: false,
        }
    }

    /// Advance by `dt_us` microseconds. Returns the current sheet frame.
    /// Integer arithmetic only, for determinism.
    pub fn tick(&mut self, dt_us: u64, clip: &AnimationClip) -> u32 {
        if clip.frames.is_empty() {
            return 0;
        }
        if self.finished {
            let index = self.frame_index.min(clip.frames.len() - 1);
            return clip.frames[index].sheet_frame;
        }

        self.elapsed_us += dt_us;

        loop {
            let current_frame = &clip.frames[self.frame_index];
            if self.elapsed_us < current_frame.duration_us {
                break;
            }

            self.elapsed_us -= current_frame.duration_us;
            self.frame_index += 1;

            if self.frame_index >= clip.frames.len() {
                if clip.looping {
                    self.frame_index = 0;
                } else {
                    self.frame_index = clip.frames.len() - 1;
                    self.elapsed_us = 0;
                    self.finished = true;
                    break;
                }
            }
        }

        clip.frames[self.frame_index].sheet_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_clip(durations_ms: &[u64], looping: bool) -> AnimationClip {
        AnimationClip {
            frames: durations_ms
                .iter()
                .enumerate()
                .map(|(i, &d)| AnimationFrame {
                    sheet_frame: i as u32,
                    duration_us: d * 1000,
                })
                .collect(),
            looping,
        }
    }

    #[test]
    fn tick_advances_through_frames() {
        let clip = make_clip(&[100, 100, 100], true);
        let mut state = AnimationState::new("walk");

        assert_eq!(state.tick(0, &clip), 0);
        assert_eq!(state.tick(50_000, &clip), 0);
        // 110ms total: now on frame 1
        assert_eq!(state.tick(60_000, &clip), 1);
    }

    #[test]
    fn looping_wraps_around() {
        let clip = make_clip(&[100, 100], true);
        let mut state = AnimationState::new("idle");

        let frame = state.tick(250_000, &clip);
        assert_eq!(frame, 0);
        assert!(!state.finished);
    }

    #[test]
    fn non_looping_stops_on_last_frame() {
        let clip = make_clip(&[100, 100], false);
        let mut state = AnimationState::new("jump");

        assert_eq!(state.tick(300_000, &clip), 1);
        assert!(state.finished);
        assert_eq!(state.tick(100_000, &clip), 1);
    }

    #[test]
    fn single_frame_looping_clip_stays_on_frame_zero() {
        // The gameplay scene's placeholder `left` clip is exactly this shape:
        // one frame at 10 fps, looping forever.
        let clip = AnimationClip::from_frame_range(0, 0, 10, true).expect("valid clip");
        assert_eq!(clip.frames.len(), 1);
        assert_eq!(clip.frames[0].duration_us, 100_000);

        let mut state = AnimationState::new("left");
        for _ in 0..1000 {
            assert_eq!(state.tick(16_667, &clip), 0);
            assert!(!state.finished);
        }
    }

    #[test]
    fn from_frame_range_rejects_inverted_range_and_zero_rate() {
        assert!(AnimationClip::from_frame_range(3, 1, 10, true).is_err());
        assert!(AnimationClip::from_frame_range(0, 0, 0, true).is_err());
    }

    #[test]
    fn registry_rejects_duplicate_clip_names() {
        let mut registry = AnimationRegistry::new();
        let clip = AnimationClip::from_frame_range(0, 0, 10, true).expect("valid clip");
        registry.create("left", clip.clone()).expect("first insert");
        assert!(registry.create("left", clip).is_err());
        assert!(registry.resolve("left").is_some());
        assert!(registry.resolve("right").is_none());
    }

    #[test]
    fn determinism_identical_results() {
        let clip = make_clip(&[100, 150, 80], true);
        let dt = 16_667u64;

        let mut state_a = AnimationState::new("run");
        let mut state_b = AnimationState::new("run");

        for _ in 0..100 {
            assert_eq!(state_a.tick(dt, &clip), state_b.tick(dt, &clip));
        }
        assert_eq!(state_a.frame_index, state_b.frame_index);
        assert_eq!(state_a.elapsed_us, state_b.elapsed_us);
    }

    #[test]
    fn total_duration_us() {
        let clip = make_clip(&[100, 200, 300], true);
        assert_eq!(clip.total_duration_us(), 600_000);
    }
}
