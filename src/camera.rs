//! Viewing transforms for the puzzle.
//!
//! [`Camera`] holds the free rotation the user drags with the primary
//! button, and [`Projection`] the fixed orthographic projection and
//! viewport that take view space to framebuffer pixels and back.

use nalgebra::{Isometry3, Matrix4, Translation3, UnitQuaternion, Vector3, Vector4};

use crate::error::SetupError;
use crate::math;

/// Radius of the virtual arcball sphere in normalised screen units.
const ARCBALL_RADIUS: f32 = 1.0;

/// Free rotation of the whole puzzle.
///
/// The rotation is split in two: `last_rotation` holds everything committed
/// by earlier drags and `current_rotation` the drag in progress. The model
/// transform is recomputed from both after every change.
#[derive(Debug, Clone)]
pub(crate) struct Camera {
    /// Pushes the puzzle away from the viewer along -z.
    translation: Translation3<f32>,
    /// Rotation committed by finished drags.
    last_rotation: UnitQuaternion<f32>,
    /// Rotation of the drag in progress, identity between drags.
    current_rotation: UnitQuaternion<f32>,
    /// Puzzle space to view space.
    model: Isometry3<f32>,
}

impl Camera {
    /// Places the puzzle `distance` units in front of the viewer.
    ///
    /// # Arguments
    /// * `distance` - How far down -z the puzzle center sits
    pub(crate) fn new(distance: f32) -> Self {
        let translation = Translation3::new(0.0, 0.0, -distance);
        Self {
            translation,
            last_rotation: UnitQuaternion::identity(),
            current_rotation: UnitQuaternion::identity(),
            model: Isometry3::from_parts(translation, UnitQuaternion::identity()),
        }
    }

    /// Puzzle space to view space.
    pub(crate) fn model_matrix(&self) -> Matrix4<f32> {
        self.model.to_homogeneous()
    }

    /// View space back to puzzle space.
    pub(crate) fn model_inverse(&self) -> Matrix4<f32> {
        self.model.inverse().to_homogeneous()
    }

    /// Rotation currently applied to the puzzle, drag included.
    pub(crate) fn orientation(&self) -> UnitQuaternion<f32> {
        self.current_rotation * self.last_rotation
    }

    /// Replaces the in-flight drag rotation with the one taking `from` to `to`
    /// on the arcball sphere.
    pub(crate) fn drag(&mut self, from: &Vector3<f32>, to: &Vector3<f32>) {
        self.current_rotation = math::arcball_rotation(from, to);
        self.model = Isometry3::from_parts(self.translation, self.orientation());
    }

    /// Folds the in-flight drag into the committed rotation.
    pub(crate) fn commit(&mut self) {
        self.last_rotation = self.orientation();
        self.current_rotation = UnitQuaternion::identity();
    }
}

/// Fixed orthographic projection and viewport mapping.
#[derive(Debug, Clone)]
pub(crate) struct Projection {
    /// View space to normalized device coordinates.
    projection: Matrix4<f32>,
    /// Normalized device coordinates to pixels and positive depth.
    viewport: Matrix4<f32>,
    /// Screen space back to view space.
    screen_inverse: Matrix4<f32>,
    /// Pixel to arcball coordinate scale, `2 / (width - 1)`.
    x_scale: f32,
    /// Pixel to arcball coordinate scale, `2 / (height - 1)`.
    y_scale: f32,
}

impl Projection {
    /// Builds the projection for a `width` × `height` framebuffer showing the
    /// view volume `[-extent, extent]² × [near, far]`.
    ///
    /// # Arguments
    /// * `width` - Framebuffer width in pixels, at least 2
    /// * `height` - Framebuffer height in pixels, at least 2
    /// * `extent` - Half-width of the visible square in puzzle units
    /// * `near` - Near plane distance
    /// * `far` - Far plane distance
    ///
    /// # Errors
    /// [`SetupError::EmptyViewport`] for a degenerate framebuffer and
    /// [`SetupError::SingularProjection`] when the planes collapse the
    /// volume.
    pub(crate) fn new(
        width: u32,
        height: u32,
        extent: f32,
        near: f32,
        far: f32,
    ) -> Result<Self, SetupError> {
        if width < 2 || height < 2 {
            return Err(SetupError::EmptyViewport { width, height });
        }
        let (w, h) = (width as f32, height as f32);

        let projection = Matrix4::new_orthographic(-extent, extent, -extent, extent, near, far);

        // The y scale is negative to flip into screen rows. Depth is scaled
        // by the width and nudged so it always stays positive.
        let viewport = Matrix4::new_translation(&Vector3::new(w / 2.0, h / 2.0, w / 2.0 + 0.5))
            * Matrix4::new_nonuniform_scaling(&Vector3::new(w / 2.0, -h / 2.0, w / 2.0));

        let screen_inverse = (viewport * projection)
            .try_inverse()
            .ok_or(SetupError::SingularProjection)?;

        Ok(Self {
            projection,
            viewport,
            screen_inverse,
            x_scale: 2.0 / (w - 1.0),
            y_scale: 2.0 / (h - 1.0),
        })
    }

    /// Projects a view-space point to screen space: pixel x and y, and a
    /// positive depth that grows away from the viewer.
    pub(crate) fn to_screen(&self, view: &Vector4<f32>) -> Vector3<f32> {
        let clip = self.projection * view;
        // Perspective division; a no-op for an orthographic projection.
        let ndc = clip / clip.w;
        (self.viewport * ndc).xyz()
    }

    /// Maps a screen-space point back into view space.
    pub(crate) fn to_view(&self, screen: &Vector3<f32>) -> Vector4<f32> {
        let view = self.screen_inverse * screen.push(1.0);
        view / view.w
    }

    /// Maps a cursor position onto the arcball sphere.
    ///
    /// Points outside the sphere's silhouette fall onto a hyperbolic sheet so
    /// that dragging past the edge still rotates smoothly.
    pub(crate) fn project_to_sphere(&self, x: f32, y: f32) -> Vector3<f32> {
        let r2 = ARCBALL_RADIUS * ARCBALL_RADIUS;
        let x = x * self.x_scale - 1.0;
        let y = 1.0 - y * self.y_scale;
        let length2 = x * x + y * y;

        let z = if length2 <= r2 / 2.0 {
            (r2 - length2).sqrt()
        } else {
            (r2 / 2.0) / length2.sqrt()
        };

        Vector3::new(x, y, z).normalize()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn projection() -> Projection {
        Projection::new(600, 600, 120.0, 0.0, 200.0).unwrap()
    }

    #[test]
    fn empty_viewport_is_rejected() {
        assert!(matches!(
            Projection::new(0, 600, 120.0, 0.0, 200.0),
            Err(SetupError::EmptyViewport { width: 0, height: 600 })
        ));
    }

    #[test]
    fn puzzle_center_lands_mid_screen() {
        let camera = Camera::new(100.0);
        let view = camera.model_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let screen = projection().to_screen(&view);
        assert_abs_diff_eq!(screen.x, 300.0);
        assert_abs_diff_eq!(screen.y, 300.0);
        assert!(screen.z > 0.0);
    }

    #[test]
    fn nearer_points_have_smaller_depth() {
        let projection = projection();
        let near = projection.to_screen(&Vector4::new(0.0, 0.0, -60.0, 1.0));
        let far = projection.to_screen(&Vector4::new(0.0, 0.0, -140.0, 1.0));
        assert!(0.0 < near.z && near.z < far.z);
    }

    #[test]
    fn screen_round_trip() {
        let projection = projection();
        let view = Vector4::new(-25.0, 40.0, -70.0, 1.0);
        let back = projection.to_view(&projection.to_screen(&view));
        assert_abs_diff_eq!(back, view, epsilon = 1e-3);
    }

    #[test]
    fn sphere_projection_is_unit_length() {
        let projection = projection();
        for (x, y) in [(0.0, 0.0), (300.0, 300.0), (599.0, 10.0), (450.0, 200.0)] {
            assert_abs_diff_eq!(projection.project_to_sphere(x, y).norm(), 1.0, epsilon = 1e-5);
        }
        let center = projection.project_to_sphere(299.5, 299.5);
        assert_abs_diff_eq!(center, Vector3::z(), epsilon = 1e-5);
    }

    #[test]
    fn commit_keeps_orientation() {
        let projection = projection();
        let mut camera = Camera::new(100.0);
        let from = projection.project_to_sphere(300.0, 300.0);
        let to = projection.project_to_sphere(380.0, 260.0);
        camera.drag(&from, &to);
        let dragged = camera.model_matrix();

        camera.commit();
        assert_abs_diff_eq!(camera.model_matrix(), dragged, epsilon = 1e-5);

        // A new drag starts from the committed rotation.
        camera.drag(&to, &to);
        assert_abs_diff_eq!(camera.model_matrix(), dragged, epsilon = 1e-5);
        assert_abs_diff_eq!(
            camera.model_inverse() * camera.model_matrix(),
            Matrix4::identity(),
            epsilon = 1e-5
        );
    }
}
