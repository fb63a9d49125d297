//! The six relative degrees of freedom between two rigid frames.
//!
//! A joint reduces the relative pose of its two endpoint frames to a
//! 6-vector ordered `[tx, ty, tz, rx, ry, rz]`. Each entry is either
//! rigidly constrained to zero or left free; the free entries form the
//! joint's reduced coordinates, available to limits, springs, and
//! controllers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the six relative degrees of freedom, ordered
/// `[tx, ty, tz, rx, ry, rz]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Dof {
    /// Translation along X.
    Tx,
    /// Translation along Y.
    Ty,
    /// Translation along Z.
    Tz,
    /// Rotation about X.
    Rx,
    /// Rotation about Y.
    Ry,
    /// Rotation about Z.
    Rz,
}

impl Dof {
    /// Number of relative degrees of freedom between two frames.
    pub const COUNT: usize = 6;

    /// All six dofs in coordinate order.
    pub const ALL: [Self; 6] = [Self::Tx, Self::Ty, Self::Tz, Self::Rx, Self::Ry, Self::Rz];

    /// Index of this dof in the 6-vector.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Tx => 0,
            Self::Ty => 1,
            Self::Tz => 2,
            Self::Rx => 3,
            Self::Ry => 4,
            Self::Rz => 5,
        }
    }

    /// Dof at the given 6-vector index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Tx),
            1 => Some(Self::Ty),
            2 => Some(Self::Tz),
            3 => Some(Self::Rx),
            4 => Some(Self::Ry),
            5 => Some(Self::Rz),
            _ => None,
        }
    }

    /// Whether this is a translational dof.
    #[must_use]
    pub const fn is_translation(self) -> bool {
        matches!(self, Self::Tx | Self::Ty | Self::Tz)
    }

    /// Whether this is a rotational dof.
    #[must_use]
    pub const fn is_rotation(self) -> bool {
        !self.is_translation()
    }
}

impl std::fmt::Display for Dof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Tx => "tx",
            Self::Ty => "ty",
            Self::Tz => "tz",
            Self::Rx => "rx",
            Self::Ry => "ry",
            Self::Rz => "rz",
        };
        write!(f, "{name}")
    }
}

/// A coordinate axis.
///
/// Joint archetypes are parameterized by an axis (hinge axis, slider
/// direction, plane normal, gimbal suppressed axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// Index of this axis (0, 1, 2).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Axis at the given index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::X),
            1 => Some(Self::Y),
            2 => Some(Self::Z),
            _ => None,
        }
    }

    /// The translational dof along this axis.
    #[must_use]
    pub const fn translation(self) -> Dof {
        match self {
            Self::X => Dof::Tx,
            Self::Y => Dof::Ty,
            Self::Z => Dof::Tz,
        }
    }

    /// The rotational dof about this axis.
    #[must_use]
    pub const fn rotation(self) -> Dof {
        match self {
            Self::X => Dof::Rx,
            Self::Y => Dof::Ry,
            Self::Z => Dof::Rz,
        }
    }

    /// The other two axes, in cyclic `(axis+1, axis+2)` order.
    #[must_use]
    pub const fn ortho(self) -> (Self, Self) {
        match self {
            Self::X => (Self::Y, Self::Z),
            Self::Y => (Self::Z, Self::X),
            Self::Z => (Self::X, Self::Y),
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Z => write!(f, "z"),
        }
    }
}

/// Whether a reduced coordinate is rigidly constrained or free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DofState {
    /// Constrained to zero by the joint's equality constraint.
    #[default]
    Constrained,
    /// Left free; part of the joint's reduced coordinates.
    Free,
}

impl DofState {
    /// Whether this state is [`DofState::Free`].
    #[must_use]
    pub const fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }
}

/// The constrained/free partition of the six relative dofs.
///
/// Each joint archetype produces a fixed mask; the free entries, in
/// coordinate order, are the joint's reduced coordinates.
///
/// # Example
///
/// ```
/// use armature_types::{Dof, DofMask};
///
/// let mask = DofMask::with_free(&[Dof::Rz]);
/// assert_eq!(mask.free_count(), 1);
/// assert_eq!(mask.constrained_count(), 5);
/// assert!(mask.is_free(Dof::Rz));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DofMask([DofState; Dof::COUNT]);

impl DofMask {
    /// All six dofs constrained (a fixed joint).
    #[must_use]
    pub const fn all_constrained() -> Self {
        Self([DofState::Constrained; Dof::COUNT])
    }

    /// All six dofs free.
    #[must_use]
    pub const fn all_free() -> Self {
        Self([DofState::Free; Dof::COUNT])
    }

    /// Mask with exactly the listed dofs free.
    #[must_use]
    pub fn with_free(free: &[Dof]) -> Self {
        let mut mask = Self::all_constrained();
        for &dof in free {
            mask.0[dof.index()] = DofState::Free;
        }
        mask
    }

    /// State of one dof.
    #[must_use]
    pub const fn state(&self, dof: Dof) -> DofState {
        self.0[dof.index()]
    }

    /// Whether one dof is free.
    #[must_use]
    pub const fn is_free(&self, dof: Dof) -> bool {
        self.state(dof).is_free()
    }

    /// The free dofs, in coordinate order.
    pub fn free_dofs(&self) -> impl Iterator<Item = Dof> + '_ {
        Dof::ALL.into_iter().filter(|dof| self.is_free(*dof))
    }

    /// Number of free dofs.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_dofs().count()
    }

    /// Number of constrained dofs.
    #[must_use]
    pub fn constrained_count(&self) -> usize {
        Dof::COUNT - self.free_count()
    }

    /// Row with 1.0 at each constrained dof, 0.0 at each free dof.
    ///
    /// This is the projection the joint's soft-zero equality constraint
    /// applies to the reduced 6-vector.
    #[must_use]
    pub fn constrained_row(&self) -> [f64; Dof::COUNT] {
        let mut row = [0.0; Dof::COUNT];
        for (state, slot) in self.0.iter().zip(row.iter_mut()) {
            if !state.is_free() {
                *slot = 1.0;
            }
        }
        row
    }

    /// Row with 1.0 at each free dof, 0.0 at each constrained dof.
    #[must_use]
    pub fn free_row(&self) -> [f64; Dof::COUNT] {
        let mut row = [0.0; Dof::COUNT];
        for (state, slot) in self.0.iter().zip(row.iter_mut()) {
            if state.is_free() {
                *slot = 1.0;
            }
        }
        row
    }
}

/// Sign of a one-sided selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Sign {
    /// +1.
    Positive,
    /// -1.
    Negative,
}

impl Sign {
    /// The sign as a scalar.
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }
}

/// Signed selection of a single reduced coordinate.
///
/// Limits and resistance constraints project the reduced 6-vector onto one
/// dof with a sign; keeping the sign here, separate from [`DofMask`],
/// avoids reusing one array shape for both the constrained/free partition
/// and signed selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LimitSelector {
    /// The selected dof.
    pub dof: Dof,
    /// Sign of the projection.
    pub sign: Sign,
}

impl LimitSelector {
    /// Positive selection of `dof`.
    #[must_use]
    pub const fn positive(dof: Dof) -> Self {
        Self {
            dof,
            sign: Sign::Positive,
        }
    }

    /// Negative (sign-inverted) selection of `dof`.
    #[must_use]
    pub const fn negative(dof: Dof) -> Self {
        Self {
            dof,
            sign: Sign::Negative,
        }
    }

    /// The 6-element projection row: ±1 at the selected dof.
    #[must_use]
    pub fn row(&self) -> [f64; Dof::COUNT] {
        let mut row = [0.0; Dof::COUNT];
        row[self.dof.index()] = self.sign.value();
        row
    }

    /// Apply the projection to a reduced 6-vector.
    #[must_use]
    pub fn project(&self, coords: &[f64; Dof::COUNT]) -> f64 {
        self.sign.value() * coords[self.dof.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dof_indexing() {
        for (i, dof) in Dof::ALL.into_iter().enumerate() {
            assert_eq!(dof.index(), i);
            assert_eq!(Dof::from_index(i), Some(dof));
        }
        assert_eq!(Dof::from_index(6), None);
    }

    #[test]
    fn test_dof_kind() {
        assert!(Dof::Tx.is_translation());
        assert!(!Dof::Tx.is_rotation());
        assert!(Dof::Ry.is_rotation());
    }

    #[test]
    fn test_axis_ortho_cyclic() {
        assert_eq!(Axis::X.ortho(), (Axis::Y, Axis::Z));
        assert_eq!(Axis::Y.ortho(), (Axis::Z, Axis::X));
        assert_eq!(Axis::Z.ortho(), (Axis::X, Axis::Y));
    }

    #[test]
    fn test_axis_dofs() {
        assert_eq!(Axis::Y.translation(), Dof::Ty);
        assert_eq!(Axis::Y.rotation(), Dof::Ry);
    }

    #[test]
    fn test_mask_partition() {
        let mask = DofMask::with_free(&[Dof::Tz, Dof::Rx]);
        assert_eq!(mask.free_count() + mask.constrained_count(), Dof::COUNT);
        assert_eq!(mask.free_dofs().collect::<Vec<_>>(), vec![Dof::Tz, Dof::Rx]);
    }

    #[test]
    fn test_mask_free_dofs_ordered() {
        // Declaration order does not matter; coordinate order does.
        let mask = DofMask::with_free(&[Dof::Rz, Dof::Tx]);
        assert_eq!(mask.free_dofs().collect::<Vec<_>>(), vec![Dof::Tx, Dof::Rz]);
    }

    #[test]
    fn test_mask_rows() {
        let mask = DofMask::with_free(&[Dof::Rz]);
        assert_eq!(mask.constrained_row(), [1.0, 1.0, 1.0, 1.0, 1.0, 0.0]);
        assert_eq!(mask.free_row(), [0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_selector_rows() {
        let lower = LimitSelector::positive(Dof::Rz);
        let upper = LimitSelector::negative(Dof::Rz);
        assert_eq!(lower.row(), [0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(upper.row(), [0.0, 0.0, 0.0, 0.0, 0.0, -1.0]);

        let coords = [0.0, 0.0, 0.0, 0.0, 0.0, 0.4];
        assert_eq!(lower.project(&coords), 0.4);
        assert_eq!(upper.project(&coords), -0.4);
    }
}
