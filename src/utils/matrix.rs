use std::fmt::Write as _;

/// Column-major 4x4 matrix, element index = column * 4 + row.
/// This is the layout `glUniformMatrix4fv` expects with `transpose = false`.
pub type Mat4 = [f32; 16];

#[inline(always)]
pub fn identity() -> Mat4 {
    let mut m = [0.0; 16];
    set_identity(&mut m);
    m
}

/// Overwrites `m` with the identity transform (diagonal cells are the ones with `i % 5 == 0`).
#[inline(always)]
pub fn set_identity(m: &mut Mat4) {
    for (i, cell) in m.iter_mut().enumerate() {
        *cell = if i % 5 == 0 { 1.0 } else { 0.0 };
    }
}

/// Scales the x and y diagonal cells in place. This is NOT a matrix product:
/// only `m[0]` and `m[5]` change, so it composes as expected only while the
/// matrix is still diagonal-relevant (i.e. before any rotation is baked in).
#[inline(always)]
pub fn scale(m: &mut Mat4, sx: f32, sy: f32) {
    m[0] *= sx;
    m[5] *= sy;
}

/// Adds to the translation column directly. The offset is never pushed through
/// an earlier `scale`, so call order matters.
#[inline(always)]
pub fn translate(m: &mut Mat4, x: f32, y: f32) {
    m[12] += x;
    m[13] += y;
}

/// `out = l * r`.
#[inline(always)]
pub fn multiply_into(l: &Mat4, r: &Mat4, out: &mut Mat4) {
    for i in 0..4 {
        for j in 0..4 {
            out[i + j * 4] = l[i] * r[j * 4]
                + l[i + 4] * r[j * 4 + 1]
                + l[i + 8] * r[j * 4 + 2]
                + l[i + 12] * r[j * 4 + 3];
        }
    }
}

#[inline(always)]
pub fn multiply(l: &Mat4, r: &Mat4) -> Mat4 {
    let mut out = [0.0; 16];
    multiply_into(l, r, &mut out);
    out
}

/// Renders the matrix the way it reads on paper: one visual row per line.
pub fn format(m: &Mat4) -> String {
    let mut s = String::with_capacity(4 * 4 * 12 + 5);
    for row in 0..4 {
        for col in 0..4 {
            let _ = write!(s, "{:.6}\t", m[row + col * 4]);
        }
        s.push('\n');
    }
    s.push('\n');
    s
}

// Debug helper, not used on the frame path.
#[allow(dead_code)]
pub fn print(m: &Mat4) {
    print!("{}", format(m));
}
