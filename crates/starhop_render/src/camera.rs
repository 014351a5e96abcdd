use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Orthographic 2D camera in **screen-space y-down** coordinates: the world
/// origin is the top-left corner and y grows downward, matching the arcade
/// physics convention (gravity is +y). The scene keeps the camera fixed at the
/// canvas center.
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
    pub viewport: (u32, u32),
}

impl Camera2D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: Vec2::new(viewport_width as f32 * 0.5, viewport_height as f32 * 0.5),
            zoom: 1.0,
            viewport: (viewport_width, viewport_height),
        }
    }

    pub fn build_uniform(&self) -> CameraUniform {
        let half_w = (self.viewport.0 as f32) / (2.0 * self.zoom);
        let half_h = (self.viewport.1 as f32) / (2.0 * self.zoom);

        // Swapped bottom/top flips the y axis so +y points down the screen.
        let proj = Mat4::orthographic_rh(
            self.position.x - half_w,
            self.position.x + half_w,
            self.position.y + half_h,
            self.position.y - half_h,
            -1.0,
            1.0,
        );

        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn top_left_origin_maps_to_clip_top_left() {
        let camera = Camera2D::new(960, 600);
        let uniform = camera.build_uniform();
        let proj = Mat4::from_cols_array_2d(&uniform.view_proj);

        let origin = proj * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin.x - -1.0).abs() < 1e-5);
        assert!((origin.y - 1.0).abs() < 1e-5);

        let bottom_right = proj * Vec4::new(960.0, 600.0, 0.0, 1.0);
        assert!((bottom_right.x - 1.0).abs() < 1e-5);
        assert!((bottom_right.y - -1.0).abs() < 1e-5);
    }
}
