//! Fixed-grid sprite sheet: frames are numbered left-to-right, top-to-bottom,
//! and resolved to normalized UV rectangles for the quad builder.

/// UV sub-rectangle of a texture, in [0, 1] coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u_min: f32,
    pub v_min: f32,
    pub u_max: f32,
    pub v_max: f32,
}

impl UvRect {
    /// The whole texture.
    pub const FULL: UvRect = UvRect {
        u_min: 0.0,
        v_min: 0.0,
        u_max: 1.0,
        v_max: 1.0,
    };
}

#[derive(Debug, Clone)]
pub struct SpriteSheet {
    pub frame_width: u32,
    pub frame_height: u32,
    columns: u32,
    rows: u32,
}

impl SpriteSheet {
    pub fn new(
        sheet_width: u32,
        sheet_height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, String> {
        if frame_width == 0 || frame_height == 0 {
            return Err("Sprite sheet frame dimensions must be > 0".to_string());
        }
        if sheet_width % frame_width != 0 || sheet_height % frame_height != 0 {
            return Err(format!(
                "Sprite sheet {sheet_width}x{sheet_height} is not an even grid of \
                 {frame_width}x{frame_height} frames"
            ));
        }
        Ok(Self {
            frame_width,
            frame_height,
            columns: sheet_width / frame_width,
            rows: sheet_height / frame_height,
        })
    }

    pub fn frame_count(&self) -> u32 {
        self.columns * self.rows
    }

    /// UV rectangle for a frame index. Out-of-range indices fall back to
    /// frame 0 with a warning rather than panicking mid-render.
    pub fn frame_uv(&self, frame: u32) -> UvRect {
        let frame = if frame < self.frame_count() {
            frame
        } else {
            log::warn!(
                "Frame index {frame} out of range (sheet has {} frames)",
                self.frame_count()
            );
            0
        };
        let col = frame % self.columns;
        let row = frame / self.columns;
        let u_step = 1.0 / self.columns as f32;
        let v_step = 1.0 / self.rows as f32;
        UvRect {
            u_min: col as f32 * u_step,
            v_min: row as f32 * v_step,
            u_max: (col + 1) as f32 * u_step,
            v_max: (row + 1) as f32 * v_step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_divides_sheet_into_frames() {
        let sheet = SpriteSheet::new(432, 48, 48, 48).expect("even grid");
        assert_eq!(sheet.frame_count(), 9);
    }

    #[test]
    fn uneven_grid_is_rejected() {
        let err = SpriteSheet::new(430, 48, 48, 48).expect_err("uneven sheet must fail");
        assert!(err.contains("not an even grid"));
    }

    #[test]
    fn frame_uv_walks_left_to_right() {
        let sheet = SpriteSheet::new(192, 48, 48, 48).expect("even grid");
        let first = sheet.frame_uv(0);
        assert_eq!(first.u_min, 0.0);
        assert_eq!(first.u_max, 0.25);
        assert_eq!(first.v_min, 0.0);
        assert_eq!(first.v_max, 1.0);

        let last = sheet.frame_uv(3);
        assert_eq!(last.u_min, 0.75);
        assert_eq!(last.u_max, 1.0);
    }

    #[test]
    fn multi_row_sheet_wraps_to_next_row() {
        let sheet = SpriteSheet::new(96, 96, 48, 48).expect("even grid");
        let below = sheet.frame_uv(2);
        assert_eq!(below.u_min, 0.0);
        assert_eq!(below.v_min, 0.5);
    }

    #[test]
    fn out_of_range_frame_falls_back_to_zero() {
        let sheet = SpriteSheet::new(96, 48, 48, 48).expect("even grid");
        assert_eq!(sheet.frame_uv(99), sheet.frame_uv(0));
    }
}
