use crate::core::gfx::shader::ShaderProgram;
use crate::core::gfx::{Color, Gpu, Viewport};
use crate::utils::matrix::{self, Mat4};

/// Logical design ratio the scene is authored in.
pub const DEFAULT_TARGET_RATIO: f32 = 16.0 / 9.0;

/// The one quad every draw call shares, as a triangle fan.
/// Each vertex is `(x, y, u, v)`; the texel pair is uploaded but unused.
pub const QUAD_VERTICES: [f32; 16] = [
    -1.0, -1.0, 0.0, 1.0,
     1.0, -1.0, 1.0, 1.0,
     1.0,  1.0, 1.0, 0.0,
    -1.0,  1.0, 0.0, 0.0,
];
pub const QUAD_VERTEX_COUNT: i32 = 4;
pub const POSITION_COMPONENTS: i32 = 2;
/// Floats per vertex.
pub const VERTEX_STRIDE: i32 = 4;

/// Per-axis scale that keeps `target_ratio` undistorted on a viewport whose
/// width/height is `s_ratio`. Narrower viewports squeeze y, wider ones squeeze x.
#[inline(always)]
pub fn correction_scale(target_ratio: f32, s_ratio: f32) -> (f32, f32) {
    let r = target_ratio / s_ratio;
    if s_ratio < target_ratio {
        (1.0, 1.0 / r)
    } else {
        (r, 1.0)
    }
}

#[inline(always)]
pub fn correction_matrix(target_ratio: f32, s_ratio: f32) -> Mat4 {
    let (sx, sy) = correction_scale(target_ratio, s_ratio);
    let mut m = matrix::identity();
    matrix::scale(&mut m, sx, sy);
    m
}

/// `correction * modelview`.
#[inline(always)]
pub fn compose(modelview: &Mat4, target_ratio: f32, s_ratio: f32) -> Mat4 {
    matrix::multiply(&correction_matrix(target_ratio, s_ratio), modelview)
}

#[derive(Clone, Copy, Debug)]
pub struct Compositor {
    pub target_ratio: f32,
}

impl Compositor {
    pub const fn new(target_ratio: f32) -> Self {
        Self { target_ratio }
    }

    /// Uploads `color` and the ratio-corrected `modelview`, then draws the shared
    /// quad once. `program` must already be bound. Returns the matrix it uploaded.
    pub fn draw<G: Gpu + ?Sized>(
        &self,
        gpu: &mut G,
        program: &ShaderProgram<G>,
        color: Color,
        modelview: &Mat4,
        viewport: Viewport,
    ) -> Mat4 {
        let transform = compose(modelview, self.target_ratio, viewport.ratio());
        gpu.set_uniform_vec4(&program.color, color);
        gpu.set_uniform_matrix4(&program.mv, &transform);
        gpu.draw_triangle_fan(0, QUAD_VERTEX_COUNT);
        transform
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_RATIO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gfx::shader::ProgramKind;
    use crate::core::gfx::testing::{Call, RecordingGpu};

    const TARGET: f32 = 16.0 / 9.0;

    #[test]
    fn matching_ratio_is_exactly_identity() {
        assert_eq!(correction_scale(TARGET, TARGET), (1.0, 1.0));
        assert_eq!(correction_matrix(TARGET, TARGET), matrix::identity());
    }

    #[test]
    fn square_viewport_squeezes_vertically() {
        let (sx, sy) = correction_scale(TARGET, 1.0);
        let r = TARGET / 1.0;
        assert!(r > 1.0);
        assert_eq!(sx, 1.0);
        assert!((sy - 0.5625).abs() < 1e-6);
    }

    #[test]
    fn ultrawide_viewport_squeezes_horizontally() {
        let (sx, sy) = correction_scale(TARGET, 21.0 / 9.0);
        assert_eq!(sy, 1.0);
        assert!(sx < 1.0);
        assert!((sx - 16.0 / 21.0).abs() < 1e-6);
    }

    #[test]
    fn compose_puts_correction_on_the_left() {
        let mut mv = matrix::identity();
        matrix::translate(&mut mv, 0.5, 0.5);
        matrix::scale(&mut mv, 0.1, 0.2);

        let out = compose(&mv, TARGET, 1.0);
        // x untouched, y scaled by 0.5625 including the translation.
        assert!((out[0] - 0.1).abs() < 1e-6);
        assert!((out[5] - 0.2 * 0.5625).abs() < 1e-6);
        assert!((out[12] - 0.5).abs() < 1e-6);
        assert!((out[13] - 0.5 * 0.5625).abs() < 1e-6);
        assert_eq!(out[15], 1.0);
    }

    #[test]
    fn draw_uploads_composed_matrix_and_issues_one_fan() {
        let mut gpu = RecordingGpu::new();
        let program = ShaderProgram::load(&mut gpu, ProgramKind::Background, 0).unwrap();
        gpu.clear_calls();

        let compositor = Compositor::default();
        let mv = matrix::identity();
        let color = Color::rgb(0.0, 1.0, 0.0);
        let uploaded = compositor.draw(&mut gpu, &program, color, &mv, Viewport::new(720, 720));

        assert_eq!(uploaded, correction_matrix(DEFAULT_TARGET_RATIO, 1.0));
        assert_eq!(gpu.matrices_for("MV"), vec![uploaded]);
        assert_eq!(gpu.colors(), vec![color]);
        assert_eq!(gpu.calls.last(), Some(&Call::DrawTriangleFan { first: 0, count: 4 }));
        assert_eq!(gpu.draw_count(), 1);
    }

    #[test]
    fn draw_uses_the_viewport_it_is_given() {
        let mut gpu = RecordingGpu::new();
        let program = ShaderProgram::load(&mut gpu, ProgramKind::Sprite, 0).unwrap();
        let compositor = Compositor::new(TARGET);
        let mv = matrix::identity();

        let wide = compositor.draw(&mut gpu, &program, Color::rgb(1.0, 1.0, 0.0), &mv, Viewport::new(1280, 720));
        let tall = compositor.draw(&mut gpu, &program, Color::rgb(1.0, 1.0, 0.0), &mv, Viewport::new(720, 1280));
        assert!((wide[0] - 1.0).abs() < 1e-6 && (wide[5] - 1.0).abs() < 1e-6);
        assert_eq!(tall[0], 1.0);
        assert!(tall[5] < 1.0);
    }

    #[test]
    fn quad_layout_matches_stride() {
        assert_eq!(QUAD_VERTICES.len() as i32, QUAD_VERTEX_COUNT * VERTEX_STRIDE);
    }
}
