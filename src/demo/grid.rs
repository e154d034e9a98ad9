use crate::core::gfx::Color;
use crate::utils::matrix::{self, Mat4};

// Keeps float rounding from adding a row or column at the far edge.
const GRID_EPSILON: f32 = 1e-4;
/// Smallest cell edge the walker accepts: 2000 cells per axis.
pub const MIN_CELL_SIZE: f32 = 1e-3;

/// Finite and at least [`MIN_CELL_SIZE`]. Anything else would never reach the
/// far edge (NaN, sub-ulp steps) or has no area.
#[inline(always)]
pub fn is_valid_cell(size: f32) -> bool {
    size.is_finite() && size >= MIN_CELL_SIZE
}

/// Walks the gradient background grid, calling `draw` once per cell.
///
/// Rows start at -1 and advance by `cell_h` while below `1 - cell_h`; columns
/// likewise with `cell_w`. Each cell is the shared [-1, 1] quad scaled by the
/// cell size and shifted by one cell, so neighbours overlap by half and the last
/// row and column reach the edge. Red grows by `cell_h / 2` per row, green by
/// `cell_w / 2` per column (restarting every row), blue stays 0.
pub fn for_each_cell(cell_w: f32, cell_h: f32, mut draw: impl FnMut(&Mat4, Color)) -> usize {
    if !(is_valid_cell(cell_w) && is_valid_cell(cell_h)) {
        return 0;
    }

    let mut color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    let mut drawn = 0;
    let mut row = 0u32;
    loop {
        let y = -1.0 + row as f32 * cell_h;
        if y >= 1.0 - cell_h - GRID_EPSILON {
            break;
        }

        color.g = 0.0;
        let mut col = 0u32;
        loop {
            let x = -1.0 + col as f32 * cell_w;
            if x >= 1.0 - cell_w - GRID_EPSILON {
                break;
            }

            let mut modelview = matrix::identity();
            matrix::translate(&mut modelview, x + cell_w, y + cell_h);
            matrix::scale(&mut modelview, cell_w, cell_h);
            draw(&modelview, color);
            drawn += 1;

            color.g += cell_w / 2.0;
            col += 1;
        }

        color.r += cell_h / 2.0;
        row += 1;
    }
    drawn
}
