//! Limit construction over a joint's free coordinates.
//!
//! Every limit becomes a one-sided `value ≥ 0` inequality: the lower bound
//! projects the coordinate with +1 and offsets by the bound; the upper
//! bound projects with −1 and offsets by the negated bound, so both sides
//! are instances of the same unilateral family. A dof with both bounds
//! therefore decomposes into exactly two rows.

use armature_types::{ArmatureError, Dof, LimitSelector, Result};

use crate::constraint::{LimitSet, UnilateralRow};

/// Bounds for one free dof, each side independently optional.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundPair {
    /// Lower bound, if any.
    pub lower: Option<f64>,
    /// Upper bound, if any.
    pub upper: Option<f64>,
}

impl BoundPair {
    /// Both bounds present.
    #[must_use]
    pub const fn both(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Only a lower bound.
    #[must_use]
    pub const fn lower_only(lower: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
        }
    }

    /// Only an upper bound.
    #[must_use]
    pub const fn upper_only(upper: f64) -> Self {
        Self {
            lower: None,
            upper: Some(upper),
        }
    }

    /// No bounds.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }
}

/// Row for a lower bound: `+q − lower ≥ 0`.
fn lower_row(dof: Dof, lower: f64) -> UnilateralRow {
    UnilateralRow {
        selector: LimitSelector::positive(dof),
        offset: lower,
    }
}

/// Row for an upper bound, sign-inverted: `−q − (−upper) ≥ 0`.
fn upper_row(dof: Dof, upper: f64) -> UnilateralRow {
    UnilateralRow {
        selector: LimitSelector::negative(dof),
        offset: -upper,
    }
}

/// Build limits from fully-paired bounds, one pair per free dof.
///
/// `free` is the joint's ordered free-dof list and `bounds` must match it
/// in length. A dof with both bounds yields a lower and an upper row; a
/// dof with neither is skipped. A half-specified pair fails with
/// [`ArmatureError::UnsupportedOneSidedLimit`]; one-sided bounds only go
/// through [`single_dof_limit`], which handles each side independently.
pub fn paired_limits(
    context: &str,
    free: &[Dof],
    bounds: &[BoundPair],
    compliance: f64,
) -> Result<LimitSet> {
    if bounds.len() != free.len() {
        return Err(ArmatureError::mismatched_dofs(
            context,
            free.len(),
            bounds.len(),
        ));
    }

    let mut rows = Vec::with_capacity(2 * bounds.len());
    for (&dof, pair) in free.iter().zip(bounds) {
        match (pair.lower, pair.upper) {
            (Some(lower), Some(upper)) => {
                rows.push(lower_row(dof, lower));
                rows.push(upper_row(dof, upper));
            }
            (None, None) => {}
            _ => return Err(ArmatureError::UnsupportedOneSidedLimit { dof }),
        }
    }

    Ok(LimitSet { rows, compliance })
}

/// Build a limit on a single dof, each side independently optional.
#[must_use]
pub fn single_dof_limit(
    dof: Dof,
    lower: Option<f64>,
    upper: Option<f64>,
    compliance: f64,
) -> LimitSet {
    let mut rows = Vec::with_capacity(2);
    if let Some(lower) = lower {
        rows.push(lower_row(dof, lower));
    }
    if let Some(upper) = upper {
        rows.push(upper_row(dof, upper));
    }
    LimitSet { rows, compliance }
}
