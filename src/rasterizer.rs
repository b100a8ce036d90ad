//! Scan conversion of triangles and lines into a pixel grid.
//!
//! The rasterizer owns no buffers. It works out which pixels a primitive
//! covers and hands each one to a caller-supplied closure, which decides
//! about depth testing and what to store.

use image::Rgba;
use nalgebra::{Vector2, Vector3};

/// Triangles with less screen area than this are skipped.
const MIN_AREA: f32 = 1e-6;

/// Twice the signed area of the triangle `(a, b, p)`.
fn edge(a: &Vector3<f32>, b: &Vector3<f32>, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

/// Fills a screen-space triangle.
///
/// Each vertex holds pixel x, pixel y and a positive depth. Pixels are
/// sampled at their centers and accepted when all three barycentric weights
/// are non-negative, whatever the winding. For every covered pixel `plot`
/// receives `(x, y, 1 / depth, color)`, so nearer surfaces give larger
/// values.
///
/// # Arguments
/// * `vertices` - Corners in screen space, either winding
/// * `color` - Color handed to `plot` for every covered pixel
/// * `width`, `height` - Pixel grid the triangle is clipped to
/// * `plot` - Receives each covered pixel with its reciprocal depth
pub(crate) fn fill_triangle(
    vertices: [Vector3<f32>; 3],
    color: Rgba<u8>,
    width: u32,
    height: u32,
    mut plot: impl FnMut(u32, u32, f32, Rgba<u8>),
) {
    if vertices.iter().any(|v| !v.iter().all(|c| c.is_finite())) {
        return;
    }
    let [a, b, c] = vertices;

    let area = edge(&a, &b, c.x, c.y);
    if area.abs() < MIN_AREA {
        return;
    }

    let min_x = a.x.min(b.x).min(c.x).floor().max(0.0);
    let min_y = a.y.min(b.y).min(c.y).floor().max(0.0);
    let max_x = a.x.max(b.x).max(c.x).ceil().min(width as f32 - 1.0);
    let max_y = a.y.max(b.y).max(c.y).ceil().min(height as f32 - 1.0);
    if max_x < min_x || max_y < min_y {
        return;
    }

    for y in min_y as u32..=max_y as u32 {
        let py = y as f32 + 0.5;
        for x in min_x as u32..=max_x as u32 {
            let px = x as f32 + 0.5;

            let w0 = edge(&b, &c, px, py) / area;
            let w1 = edge(&c, &a, px, py) / area;
            let w2 = edge(&a, &b, px, py) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let depth = w0 * a.z + w1 * b.z + w2 * c.z;
            if depth <= 0.0 {
                continue;
            }
            plot(x, y, 1.0 / depth, color);
        }
    }
}

/// Draws a line with a digital differential analyzer, calling `plot` for
/// each on-screen pixel.
pub(crate) fn draw_line(
    from: Vector2<f32>,
    to: Vector2<f32>,
    width: u32,
    height: u32,
    mut plot: impl FnMut(u32, u32),
) {
    if !(from.iter().chain(to.iter()).all(|c| c.is_finite())) {
        return;
    }
    let delta = to - from;
    let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0);
    let increment = delta / steps;

    let mut point = from;
    for _ in 0..=steps as u32 {
        let (x, y) = (point.x.round(), point.y.round());
        if x >= 0.0 && y >= 0.0 && x < width as f32 && y < height as f32 {
            plot(x as u32, y as u32);
        }
        point += increment;
    }
}
