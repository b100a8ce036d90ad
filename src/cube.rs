//! 2x2x2 cube data structures and geometry.
//!
//! This module defines the colors, the shared cubie mesh, the individual
//! cubies and the complete puzzle state, including how a finished quarter
//! turn is folded into that state.

use image::Rgba;
use nalgebra::{Matrix4, Vector3, Vector4};

use crate::math;
use crate::topology::{CUBIE_COUNT, GroupIndex, Orientation, ROTATION_GROUPS};

/// Distance from the puzzle center to each cubie center along every axis.
pub(crate) const CUBIE_OFFSET: f32 = 20.0;

/// Half the edge length of a cubie mesh. Smaller than [`CUBIE_OFFSET`] so a
/// thin gap separates neighbouring cubies.
pub(crate) const CUBIE_HALF_SIZE: f32 = 18.0;

/// Center of each slot in puzzle space.
#[rustfmt::skip]
pub(crate) const SLOT_CENTERS: [[f32; 3]; CUBIE_COUNT] = [
    [-1.0,  1.0, -1.0], // 0 top left back
    [ 1.0,  1.0, -1.0], // 1 top right back
    [-1.0,  1.0,  1.0], // 2 top left front
    [ 1.0,  1.0,  1.0], // 3 top right front
    [-1.0, -1.0, -1.0], // 4 bottom left back
    [ 1.0, -1.0, -1.0], // 5 bottom right back
    [-1.0, -1.0,  1.0], // 6 bottom left front
    [ 1.0, -1.0,  1.0], // 7 bottom right front
];

/// Sticker colors, plus black for hidden inner faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Color {
    White,
    Yellow,
    Blue,
    Green,
    Red,
    Orange,
    Black,
}

impl Color {
    /// Color on the outer face pointing along `face` in the solved state.
    fn solved(face: Face) -> Self {
        match face {
            Face::PosX => Color::Orange,
            Face::NegX => Color::Red,
            Face::PosY => Color::White,
            Face::NegY => Color::Yellow,
            Face::PosZ => Color::Blue,
            Face::NegZ => Color::Green,
        }
    }
}

impl From<Color> for Rgba<u8> {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Rgba([255, 255, 255, 255]),
            Color::Yellow => Rgba([255, 255, 0, 255]),
            Color::Blue => Rgba([0, 0, 255, 255]),
            Color::Green => Rgba([0, 155, 72, 255]),
            Color::Red => Rgba([255, 0, 0, 255]),
            Color::Orange => Rgba([255, 165, 0, 255]),
            Color::Black => Rgba([0, 0, 0, 255]),
        }
    }
}

/// The six faces of a cubie in its own (unrotated) frame.
///
/// The order is fixed: it indexes [`Cubie::colors`] and groups the mesh
/// triangles two by two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Face {
    pub(crate) const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Outward normal in the cubie's local frame.
    pub(crate) fn normal(self) -> Vector3<f32> {
        match self {
            Face::PosX => Vector3::x(),
            Face::NegX => -Vector3::x(),
            Face::PosY => Vector3::y(),
            Face::NegY => -Vector3::y(),
            Face::PosZ => Vector3::z(),
            Face::NegZ => -Vector3::z(),
        }
    }
}

/// Corners of the unit cube; index bits are `x | y << 1 | z << 2`.
#[rustfmt::skip]
pub(crate) const CUBE_VERTICES: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0], // 0
    [ 1.0, -1.0, -1.0], // 1
    [-1.0,  1.0, -1.0], // 2
    [ 1.0,  1.0, -1.0], // 3
    [-1.0, -1.0,  1.0], // 4
    [ 1.0, -1.0,  1.0], // 5
    [-1.0,  1.0,  1.0], // 6
    [ 1.0,  1.0,  1.0], // 7
];

/// Two triangles per face, in [`Face`] order.
///
/// For a triangle `(a, b, c)` the outward normal is `(c - a) × (b - a)`.
#[rustfmt::skip]
pub(crate) const CUBE_TRIANGLES: [[usize; 3]; 12] = [
    [1, 7, 3], [1, 5, 7], // +x
    [0, 2, 6], [0, 6, 4], // -x
    [2, 3, 7], [2, 7, 6], // +y
    [0, 5, 1], [0, 4, 5], // -y
    [4, 7, 5], [4, 6, 7], // +z
    [0, 1, 3], [0, 3, 2], // -z
];

pub(crate) const TRIANGLE_COUNT: usize = CUBE_TRIANGLES.len();

/// Face that mesh triangle `triangle` belongs to.
pub(crate) fn triangle_face(triangle: usize) -> Face {
    Face::ALL[triangle / 2]
}

/// A mesh corner in the cubie's local frame, as a homogeneous point.
pub(crate) fn mesh_vertex(index: usize) -> Vector4<f32> {
    let [x, y, z] = CUBE_VERTICES[index];
    Vector4::new(
        x * CUBIE_HALF_SIZE,
        y * CUBIE_HALF_SIZE,
        z * CUBIE_HALF_SIZE,
        1.0,
    )
}

/// Outward normal of the triangle `(a, b, c)`, following the mesh winding.
pub(crate) fn surface_normal(a: &Vector3<f32>, b: &Vector3<f32>, c: &Vector3<f32>) -> Vector3<f32> {
    (c - a).cross(&(b - a)).normalize()
}

/// One of the eight rigid sub-cubes.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Cubie {
    /// Stable identity, equal to the slot the cubie started in.
    pub(crate) id: usize,
    /// Color of each face, indexed by [`Face::index`].
    pub(crate) colors: [Color; 6],
    /// Maps the local mesh to its current place in puzzle space.
    pub(crate) transform: Matrix4<f32>,
}

impl Cubie {
    /// The cubie that sits in `slot` on a solved puzzle.
    fn solved(slot: usize) -> Self {
        let center = Vector3::from(SLOT_CENTERS[slot]);
        let colors = Face::ALL.map(|face| {
            // Only faces pointing out of the puzzle carry a sticker.
            if face.normal().dot(&center) > 0.0 {
                Color::solved(face)
            } else {
                Color::Black
            }
        });
        Self {
            id: slot,
            colors,
            transform: Matrix4::new_translation(&(center * CUBIE_OFFSET)),
        }
    }

    pub(crate) fn color(&self, face: Face) -> Color {
        self.colors[face.index()]
    }
}

/// The complete puzzle: eight cubies, indexed by the slot they occupy.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PocketCube {
    cubies: [Cubie; CUBIE_COUNT],
    turns_applied: u64,
}

impl PocketCube {
    /// Creates a puzzle in the solved state.
    pub(crate) fn new() -> Self {
        Self {
            cubies: std::array::from_fn(Cubie::solved),
            turns_applied: 0,
        }
    }

    pub(crate) fn cubies(&self) -> &[Cubie; CUBIE_COUNT] {
        &self.cubies
    }

    /// Number of quarter turns folded into the puzzle so far.
    pub(crate) fn turns_applied(&self) -> u64 {
        self.turns_applied
    }

    /// Outward normal, in puzzle space, of `face` on the cubie in `slot`.
    pub(crate) fn face_normal(&self, slot: usize, face: Face) -> Vector3<f32> {
        self.cubies[slot]
            .transform
            .transform_vector(&face.normal())
    }

    /// Completes a quarter turn of `group` about `orientation`.
    ///
    /// # Arguments
    /// * `group` - Index into [`ROTATION_GROUPS`] of the layer to turn
    /// * `orientation` - Signed axis the layer turns about
    ///
    /// The four cubies are cycled through the group's slots and each of them
    /// has the exact 90° rotation baked into its transform. Both happen in
    /// one step so no reader sees a cubie in a new slot with a stale
    /// transform.
    pub(crate) fn apply_turn(&mut self, group: GroupIndex, orientation: Orientation) {
        let slots = ROTATION_GROUPS[group];
        let sources = orientation.cycle().sources();
        let rotate = math::quarter_turn(orientation.axis(), orientation.sign());

        let moved: [Cubie; 4] = std::array::from_fn(|n| {
            let mut cubie = self.cubies[slots[sources[n]]].clone();
            cubie.transform = rotate * cubie.transform;
            cubie
        });
        for (slot, cubie) in slots.into_iter().zip(moved) {
            self.cubies[slot] = cubie;
        }
        self.turns_applied += 1;
    }
}

impl Default for PocketCube {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::math::Axis;
    use crate::topology::group_for;

    /// Current center of a cubie in puzzle space.
    fn center(cubie: &Cubie) -> Vector3<f32> {
        cubie.transform.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Asserts every cubie sits exactly on the center of its slot, with a
    /// transform made only of a signed permutation and that translation.
    fn assert_at_rest(cube: &PocketCube) {
        let mut ids: Vec<usize> = cube.cubies().iter().map(|c| c.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..CUBIE_COUNT).collect::<Vec<_>>());

        for (slot, cubie) in cube.cubies().iter().enumerate() {
            let expected = Vector3::from(SLOT_CENTERS[slot]) * CUBIE_OFFSET;
            assert_eq!(center(cubie), expected, "cubie {} in slot {slot}", cubie.id);

            let rotation = cubie.transform.fixed_view::<3, 3>(0, 0);
            for row in rotation.row_iter() {
                assert_eq!(row.iter().filter(|e| e.abs() == 1.0).count(), 1);
                assert_eq!(row.iter().filter(|&&e| e == 0.0).count(), 2);
            }
            assert_abs_diff_eq!(rotation.determinant(), 1.0);
            assert_eq!(
                cubie.transform.row(3).into_owned(),
                Vector4::new(0.0, 0.0, 0.0, 1.0).transpose()
            );
        }
    }

    #[test]
    fn mesh_triangles_wind_outward() {
        for (triangle, indices) in CUBE_TRIANGLES.iter().enumerate() {
            let [a, b, c] = indices.map(|i| mesh_vertex(i).xyz());
            let normal = surface_normal(&a, &b, &c);
            assert_abs_diff_eq!(normal, triangle_face(triangle).normal(), epsilon = 1e-6);
        }
    }

    #[test]
    fn solved_cube_shows_one_color_per_side() {
        let cube = PocketCube::new();
        assert_at_rest(&cube);
        for face in Face::ALL {
            let visible: Vec<Color> = cube
                .cubies()
                .iter()
                .map(|cubie| cubie.color(face))
                .filter(|&color| color != Color::Black)
                .collect();
            assert_eq!(visible, vec![Color::solved(face); 4]);
        }
    }

    #[test]
    fn top_layer_clockwise_turn() {
        let mut cube = PocketCube::new();
        let before = cube.clone();
        let top = group_for(Axis::Y, 0);
        assert_eq!(ROTATION_GROUPS[top], [0, 1, 2, 3]);

        // Clockwise seen from above is a positive turn about -y.
        cube.apply_turn(top, Orientation::NegY);

        // Backward cycle: 0 <- 2, 1 <- 0, 2 <- 3, 3 <- 1.
        let expected_ids = [2, 0, 3, 1, 4, 5, 6, 7];
        let ids: Vec<usize> = cube.cubies().iter().map(|c| c.id).collect();
        assert_eq!(ids, expected_ids);

        let rotate = math::quarter_turn(Axis::Y, -1.0);
        for slot in 0..4 {
            let old = &before.cubies()[expected_ids[slot]];
            assert_abs_diff_eq!(cube.cubies()[slot].transform, rotate * old.transform);
        }
        for slot in 4..CUBIE_COUNT {
            assert_eq!(&cube.cubies()[slot], &before.cubies()[slot]);
        }
        assert_at_rest(&cube);
        assert_eq!(cube.turns_applied(), 1);
    }

    #[test]
    fn turn_then_inverse_restores_state() {
        for orientation in Orientation::ALL {
            for slot in 0..CUBIE_COUNT {
                let group = group_for(orientation.axis(), slot);
                let mut cube = PocketCube::new();
                cube.apply_turn(group_for(Axis::X, 3), Orientation::PosX);
                let before = cube.clone();

                cube.apply_turn(group, orientation);
                cube.apply_turn(group, orientation.inverse());

                for (after, before) in cube.cubies().iter().zip(before.cubies()) {
                    assert_eq!(after.id, before.id);
                    assert_eq!(after.colors, before.colors);
                    assert_abs_diff_eq!(after.transform, before.transform, epsilon = 1e-4);
                }
            }
        }
    }

    #[test]
    fn four_turns_are_identity() {
        let mut cube = PocketCube::new();
        for _ in 0..4 {
            cube.apply_turn(2, Orientation::PosZ);
        }
        assert_eq!(cube.cubies(), PocketCube::new().cubies());
    }

    #[test]
    fn random_turns_stay_rigid_and_in_place() {
        let mut rng = StdRng::seed_from_u64(0x2b2);
        let mut cube = PocketCube::new();
        for _ in 0..500 {
            let orientation = Orientation::ALL[rng.random_range(0..6)];
            let group = group_for(orientation.axis(), rng.random_range(0..CUBIE_COUNT));
            cube.apply_turn(group, orientation);
            assert_at_rest(&cube);
        }
        assert_eq!(cube.turns_applied(), 500);
    }

    #[test]
    fn face_normal_follows_rotation() {
        let mut cube = PocketCube::new();
        cube.apply_turn(0, Orientation::PosY);
        // The cubie now in slot 0 came from slot 1; its +x face points to -z.
        assert_eq!(cube.cubies()[0].id, 1);
        assert_abs_diff_eq!(
            cube.face_normal(0, Face::PosX),
            -Vector3::z(),
            epsilon = 1e-6
        );
    }
}
