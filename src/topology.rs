//! Static layout of the 2x2x2 puzzle.
//!
//! Slots are fixed positions, numbered top to bottom, back to front, left to
//! right:
//!
//! ```text
//!     +0-------+1
//!    /         /|
//!  +2--------+3 |
//!   |         | |
//!   | +4      |+5
//!   |         |/
//!  +6--------+7
//! ```
//!
//! Every table in this module is expressed in slots, never in cubies, so a
//! layer turn is just a slot permutation plus a transform update.

use nalgebra::Vector3;

use crate::math::{self, Axis};

/// Number of cubies (and slots) in the puzzle.
pub(crate) const CUBIE_COUNT: usize = 8;

/// Index of a rotatable layer in [`ROTATION_GROUPS`].
pub(crate) type GroupIndex = usize;

/// The six turnable layers, each as four slots in a fixed cyclic order.
pub(crate) const ROTATION_GROUPS: [[usize; 4]; 6] = [
    // top and bottom
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    // front and back
    [2, 3, 6, 7],
    [0, 1, 4, 5],
    // left and right
    [0, 2, 4, 6],
    [1, 3, 5, 7],
];

/// `GROUP_INDEX[axis][slot]` is the layer along `axis` that contains `slot`.
pub(crate) const GROUP_INDEX: [[GroupIndex; CUBIE_COUNT]; 3] = [
    // x
    [4, 5, 4, 5, 4, 5, 4, 5],
    // y
    [0, 0, 0, 0, 1, 1, 1, 1],
    // z
    [3, 3, 2, 2, 3, 3, 2, 2],
];

/// Which layer along `axis` holds `slot`.
pub(crate) fn group_for(axis: Axis, slot: usize) -> GroupIndex {
    GROUP_INDEX[axis.index()][slot]
}

/// Direction in which the four slots of a group are cycled by a turn.
///
/// Entry `n` of the table names the position in the group whose cubie moves
/// into position `n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Cycle {
    /// Counter-clockwise looking down the positive axis.
    Forward,
    /// The inverse of [`Cycle::Forward`].
    Backward,
}

impl Cycle {
    pub(crate) fn sources(self) -> [usize; 4] {
        match self {
            Cycle::Forward => [1, 3, 0, 2],
            Cycle::Backward => [2, 0, 3, 1],
        }
    }
}

/// Signed axis of a quarter turn.
///
/// The turn is a positive (right-handed) 90° rotation about this direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Orientation {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Orientation {
    pub(crate) const ALL: [Orientation; 6] = [
        Orientation::PosX,
        Orientation::NegX,
        Orientation::PosY,
        Orientation::NegY,
        Orientation::PosZ,
        Orientation::NegZ,
    ];

    pub(crate) fn axis(self) -> Axis {
        match self {
            Orientation::PosX | Orientation::NegX => Axis::X,
            Orientation::PosY | Orientation::NegY => Axis::Y,
            Orientation::PosZ | Orientation::NegZ => Axis::Z,
        }
    }

    pub(crate) fn sign(self) -> f32 {
        match self {
            Orientation::PosX | Orientation::PosY | Orientation::PosZ => 1.0,
            Orientation::NegX | Orientation::NegY | Orientation::NegZ => -1.0,
        }
    }

    pub(crate) fn direction(self) -> Vector3<f32> {
        self.axis().unit() * self.sign()
    }

    /// The turn that undoes this one.
    #[cfg(test)]
    pub(crate) fn inverse(self) -> Self {
        match self {
            Orientation::PosX => Orientation::NegX,
            Orientation::NegX => Orientation::PosX,
            Orientation::PosY => Orientation::NegY,
            Orientation::NegY => Orientation::PosY,
            Orientation::PosZ => Orientation::NegZ,
            Orientation::NegZ => Orientation::PosZ,
        }
    }

    /// Slot cycle direction for this turn.
    ///
    /// This is fixed data and has to agree with the geometric rotation for
    /// each cubie's transform to keep matching the slot it lands in.
    pub(crate) fn cycle(self) -> Cycle {
        match self {
            Orientation::NegX | Orientation::PosY | Orientation::PosZ => Cycle::Forward,
            Orientation::PosX | Orientation::NegY | Orientation::NegZ => Cycle::Backward,
        }
    }

    /// Classifies a turn axis by its dominant component.
    ///
    /// Returns `None` when `v` is (near) zero and so names no axis at all.
    pub(crate) fn from_direction(v: &Vector3<f32>) -> Option<Self> {
        let snapped = math::snap_to_axis(v)?;
        Orientation::ALL
            .into_iter()
            .find(|orientation| orientation.direction() == snapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_slot_is_in_exactly_one_group_per_axis() {
        for axis in Axis::ALL {
            for slot in 0..CUBIE_COUNT {
                let group = group_for(axis, slot);
                assert!(ROTATION_GROUPS[group].contains(&slot));
                let containing = (0..CUBIE_COUNT)
                    .filter(|&s| group_for(axis, s) == group)
                    .count();
                assert_eq!(containing, 4);
            }
        }
    }

    #[test]
    fn group_lookup_covers_all_six_groups() {
        let mut seen = [false; 6];
        for axis in Axis::ALL {
            for slot in 0..CUBIE_COUNT {
                seen[group_for(axis, slot)] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn cycles_are_inverse_permutations() {
        let forward = Cycle::Forward.sources();
        let backward = Cycle::Backward.sources();
        for n in 0..4 {
            assert_eq!(forward[backward[n]], n);
            assert_eq!(backward[forward[n]], n);
        }
        for orientation in Orientation::ALL {
            assert_ne!(orientation.cycle(), orientation.inverse().cycle());
        }
    }

    #[test]
    fn direction_classification() {
        assert_eq!(
            Orientation::from_direction(&Vector3::new(0.0, -1.0, 0.0)),
            Some(Orientation::NegY)
        );
        assert_eq!(
            Orientation::from_direction(&Vector3::new(0.2, 0.1, 0.9)),
            Some(Orientation::PosZ)
        );
        assert_eq!(Orientation::from_direction(&Vector3::zeros()), None);
        for orientation in Orientation::ALL {
            assert_eq!(
                Orientation::from_direction(&orientation.direction()),
                Some(orientation)
            );
        }
    }
}
