//! The solver-facing constraint vocabulary.
//!
//! A built joint compiles to a list of [`ConstraintBlock`]s. Each block is
//! a self-contained constraint specification over the joint's reduced
//! coordinates: what is projected, with what sign, against what bound or
//! target, and how compliant the penalty is. The numerical solver that
//! consumes these blocks is an external collaborator; nothing here solves
//! anything.

use armature_types::{Dof, DofMask, LimitSelector};

use crate::controller::{ControllerPurpose, Forcing, PositionServo, Resistance, VelocityServo};

/// Default constraint compliance: stiff but not exactly rigid.
///
/// Compliance is inverse stiffness; zero makes a constraint hard.
pub const DEFAULT_COMPLIANCE: f64 = 1e-9;

/// Soft-zero equality on every constrained reduced coordinate.
///
/// Carries a stabilization pass: positional drift on satisfied constraints
/// is corrected without injecting energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskedEquality {
    /// Which coordinates are pinned to zero.
    pub mask: DofMask,
    /// Penalty compliance shared by all constrained coordinates.
    pub compliance: f64,
}

/// Per-coordinate compliance over all six reduced coordinates.
///
/// Nothing is rigidly constrained and no stabilization applies: every
/// coordinate is soft, weighted by its own compliance. Infinite compliance
/// leaves a coordinate entirely free.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagonalSpring {
    /// Compliance per coordinate, `[tx, ty, tz, rx, ry, rz]`.
    pub compliance: [f64; Dof::COUNT],
}

impl DiagonalSpring {
    /// Build from per-coordinate stiffness.
    ///
    /// Compliance is the inverse of stiffness; a non-positive stiffness
    /// maps to infinite compliance (that coordinate is left free).
    #[must_use]
    pub fn from_stiffness(stiffness: &[f64; Dof::COUNT]) -> Self {
        let mut compliance = [f64::INFINITY; Dof::COUNT];
        for (c, &k) in compliance.iter_mut().zip(stiffness.iter()) {
            if k > 0.0 {
                *c = 1.0 / k;
            }
        }
        Self { compliance }
    }
}

/// One unilateral constraint row: `selector·q − offset ≥ 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnilateralRow {
    /// Signed projection of the reduced 6-vector.
    pub selector: LimitSelector,
    /// Bound, already sign-adjusted (lower bound, or negated upper bound).
    pub offset: f64,
}

impl UnilateralRow {
    /// Constraint residual for a reduced coordinate vector.
    ///
    /// Negative residual means the limit is violated.
    #[must_use]
    pub fn residual(&self, coords: &[f64; Dof::COUNT]) -> f64 {
        self.selector.project(coords) - self.offset
    }
}

/// A set of unilateral limit rows on a joint's free coordinates.
///
/// Evaluated without stabilization: the violation sign must stay
/// observable before any correction is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitSet {
    /// The one-sided rows, lower bound before upper per dof.
    pub rows: Vec<UnilateralRow>,
    /// Penalty compliance shared by all rows.
    pub compliance: f64,
}

/// Scalar distance constraint between two endpoint positions.
///
/// The two endpoints are mapped onto a length-1 edge and the edge length
/// is constrained to the rest length. This is the one archetype whose
/// constraint subspace is not a projection of the 6D relative pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceEquality {
    /// Target edge length, resolved at construction.
    pub rest_length: f64,
    /// Penalty compliance.
    pub compliance: f64,
}

/// Velocity damping on the joint's reduced coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamperCoefficients {
    /// One coefficient for every coordinate.
    Uniform(f64),
    /// Per-coordinate coefficients, `[tx, ty, tz, rx, ry, rz]`.
    Diagonal([f64; Dof::COUNT]),
}

/// A damping term over the reduced coordinates (a force, not a constraint).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damper {
    /// Damping coefficients.
    pub coefficients: DamperCoefficients,
}

/// One constraint specification emitted for a joint.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintBlock {
    /// The joint's rigid part: constrained coordinates pinned to zero.
    MaskedEquality(MaskedEquality),
    /// Soft per-coordinate coupling (generic 6D spring, per-dof springs).
    DiagonalSpring(DiagonalSpring),
    /// One-sided limits on free coordinates.
    Limits(LimitSet),
    /// Scalar endpoint-distance equality.
    Distance(DistanceEquality),
    /// Velocity damping.
    Damper(Damper),
    /// Position servo on a subset of the free coordinates.
    PositionServo(PositionServo),
    /// Velocity servo on a subset of the free coordinates.
    VelocityServo(VelocityServo),
    /// Explicit generalized forces on free coordinates.
    Forcing(Forcing),
    /// Velocity-threshold resistance (friction-like).
    Resistance(Resistance),
}

impl ConstraintBlock {
    /// Whether this block carries a drift-stabilization pass.
    ///
    /// Limits and velocity-level blocks never do: limits must expose the
    /// violation sign before correction, and velocity constraints have no
    /// positional drift to correct.
    #[must_use]
    pub const fn stabilized(&self) -> bool {
        matches!(
            self,
            Self::MaskedEquality(_) | Self::Distance(_) | Self::PositionServo(_)
        )
    }

    /// The controller purpose this block occupies, if any.
    #[must_use]
    pub const fn purpose(&self) -> Option<ControllerPurpose> {
        match self {
            Self::PositionServo(_) => Some(ControllerPurpose::Position),
            Self::VelocityServo(_) => Some(ControllerPurpose::Velocity),
            Self::Forcing(_) => Some(ControllerPurpose::Force),
            Self::Resistance(_) => Some(ControllerPurpose::Resistance),
            _ => None,
        }
    }

    /// Scene-node label for this block.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MaskedEquality(_) | Self::Distance(_) => "constraint",
            Self::DiagonalSpring(_) => "spring",
            Self::Limits(_) => "limits",
            Self::Damper(_) => "damper",
            Self::PositionServo(_) => "controller-mask",
            Self::VelocityServo(_) => "controller",
            Self::Forcing(_) => "force",
            Self::Resistance(_) => "resistance",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armature_types::Dof;

    #[test]
    fn test_spring_from_stiffness() {
        let spring = DiagonalSpring::from_stiffness(&[2.0, 0.0, -1.0, 4.0, 0.0, 0.0]);
        assert_eq!(spring.compliance[0], 0.5);
        assert_eq!(spring.compliance[1], f64::INFINITY);
        assert_eq!(spring.compliance[2], f64::INFINITY);
        assert_eq!(spring.compliance[3], 0.25);
    }

    #[test]
    fn test_unilateral_residual_sign() {
        // coordinate ≥ lower
        let lower = UnilateralRow {
            selector: LimitSelector::positive(Dof::Rz),
            offset: -0.5,
        };
        // coordinate ≤ upper
        let upper = UnilateralRow {
            selector: LimitSelector::negative(Dof::Rz),
            offset: -1.0,
        };

        let mut coords = [0.0; 6];
        coords[5] = 0.2; // inside both bounds
        assert!(lower.residual(&coords) > 0.0);
        assert!(upper.residual(&coords) > 0.0);

        coords[5] = -0.7; // below the lower bound
        assert!(lower.residual(&coords) < 0.0);

        coords[5] = 1.3; // above the upper bound
        assert!(upper.residual(&coords) < 0.0);
    }

    #[test]
    fn test_stabilization_policy() {
        let eq = ConstraintBlock::MaskedEquality(MaskedEquality {
            mask: armature_types::DofMask::all_constrained(),
            compliance: 0.0,
        });
        assert!(eq.stabilized());

        let limits = ConstraintBlock::Limits(LimitSet {
            rows: Vec::new(),
            compliance: 0.0,
        });
        assert!(!limits.stabilized());
    }
}
