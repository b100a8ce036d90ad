//! Screen-space picking.
//!
//! The renderer stamps every pixel it draws with the face and slot that
//! produced it. Clicks are resolved by reading that mask back, and cursor
//! positions are lifted into puzzle space with the depth left in the
//! z-buffer.

use nalgebra::{Vector3, Vector4};

use crate::camera::{Camera, Projection};
use crate::cube::Face;

/// Which cubie face is visible at a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct PickEntry {
    pub(crate) face: Face,
    pub(crate) slot: usize,
}

/// Per-pixel record of the last frame's visible faces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PickMask {
    width: u32,
    height: u32,
    entries: Vec<Option<PickEntry>>,
}

impl PickMask {
    /// Creates an empty mask covering a `width` × `height` framebuffer.
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            entries: vec![None; width as usize * height as usize],
        }
    }

    /// Forgets every pixel.
    pub(crate) fn clear(&mut self) {
        self.entries.fill(None);
    }

    /// Records `entry` as the visible face at `(x, y)`. Out-of-range pixels
    /// are ignored.
    pub(crate) fn stamp(&mut self, x: u32, y: u32, entry: PickEntry) {
        if let Some(index) = self.index(x, y) {
            self.entries[index] = Some(entry);
        }
    }

    /// Face under the pixel, or `None` for background and out-of-range
    /// coordinates.
    pub(crate) fn get(&self, x: u32, y: u32) -> Option<PickEntry> {
        self.index(x, y).and_then(|index| self.entries[index])
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }
}

/// Converts a cursor position to the pixel it falls in.
pub(crate) fn pixel_at(x: f32, y: f32) -> Option<(u32, u32)> {
    (x.is_finite() && y.is_finite() && x >= 0.0 && y >= 0.0).then(|| (x as u32, y as u32))
}

/// Lifts pixel `(x, y)` into puzzle space using the stored depth value.
///
/// `depth` is the value the z-buffer holds for the pixel (the reciprocal of
/// the screen depth). Background pixels hold no depth and yield `None`.
///
/// # Arguments
/// * `projection` - Projection the frame was rendered with
/// * `camera` - Camera the frame was rendered with
/// * `x`, `y` - Pixel coordinates; the pixel center is used
/// * `depth` - Stored z-buffer value at that pixel
pub(crate) fn unproject(
    projection: &Projection,
    camera: &Camera,
    x: u32,
    y: u32,
    depth: f32,
) -> Option<Vector3<f32>> {
    if !(depth > 0.0) || !depth.is_finite() {
        return None;
    }
    let screen = Vector3::new(x as f32 + 0.5, y as f32 + 0.5, 1.0 / depth);
    let view = projection.to_view(&screen);
    let puzzle: Vector4<f32> = camera.model_inverse() * view;
    Some(puzzle.xyz() / puzzle.w)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn mask_starts_empty_and_ignores_out_of_range() {
        let mut mask = PickMask::new(4, 3);
        let entry = PickEntry {
            face: Face::PosZ,
            slot: 6,
        };
        assert_eq!(mask.get(1, 1), None);

        mask.stamp(3, 2, entry);
        mask.stamp(4, 0, entry);
        assert_eq!(mask.get(3, 2), Some(entry));
        assert_eq!(mask.get(4, 0), None);
        assert_eq!(mask.get(0, 3), None);

        mask.clear();
        assert_eq!(mask, PickMask::new(4, 3));
    }

    #[test]
    fn pixel_conversion_rejects_negative_positions() {
        assert_eq!(pixel_at(12.7, 3.2), Some((12, 3)));
        assert_eq!(pixel_at(-0.5, 3.0), None);
        assert_eq!(pixel_at(f32::NAN, 3.0), None);
    }

    #[test]
    fn unproject_inverts_the_pipeline() {
        let projection = Projection::new(600, 600, 120.0, 0.0, 200.0).unwrap();
        let camera = Camera::new(100.0);
        let point = Vector4::new(-20.0, 20.0, 38.0, 1.0);
        let screen = projection.to_screen(&(camera.model_matrix() * point));

        let (x, y) = (screen.x as u32, screen.y as u32);
        let lifted = unproject(&projection, &camera, x, y, 1.0 / screen.z).unwrap();
        assert_abs_diff_eq!(lifted.z, 38.0, epsilon = 1e-3);
        assert!((lifted.x - point.x).abs() < 0.5);
        assert!((lifted.y - point.y).abs() < 0.5);

        assert_eq!(unproject(&projection, &camera, x, y, 0.0), None);
    }
}
