//! Servo and forcing specifications over a joint's free coordinates.
//!
//! Controllers are layered onto a joint after construction and drive a
//! subset of its free dofs. A joint hosts at most one controller per
//! purpose; controllers of different purposes coexist.

use armature_types::{ArmatureError, Dof, Result};

/// The role a controller plays on its joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerPurpose {
    /// Drive coordinates toward target values.
    Position,
    /// Drive coordinate time-derivatives toward target values.
    Velocity,
    /// Apply explicit generalized forces.
    Force,
    /// Resist motion above a velocity threshold.
    Resistance,
}

impl std::fmt::Display for ControllerPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Position => write!(f, "position"),
            Self::Velocity => write!(f, "velocity"),
            Self::Force => write!(f, "force"),
            Self::Resistance => write!(f, "resistance"),
        }
    }
}

/// Equality constraint between selected coordinates and target values.
///
/// Compliance 0 is a rigid servo; larger values track elastically.
/// Rotational targets must lie in `(−π, π]`: values outside that range
/// give undefined servo behavior and are not wrapped.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionServo {
    /// The driven free dofs, in coordinate order.
    pub dofs: Vec<Dof>,
    /// One target per driven dof.
    pub targets: Vec<f64>,
    /// Servo compliance.
    pub compliance: f64,
}

impl PositionServo {
    /// Create a position servo; target count must match the dof count.
    pub fn new(dofs: Vec<Dof>, targets: Vec<f64>, compliance: f64) -> Result<Self> {
        check_lengths("position targets", &dofs, targets.len())?;
        Ok(Self {
            dofs,
            targets,
            compliance,
        })
    }

    /// Replace the targets without rebuilding the joint.
    pub fn set_targets(&mut self, targets: &[f64]) -> Result<()> {
        check_lengths("position targets", &self.dofs, targets.len())?;
        self.targets.clear();
        self.targets.extend_from_slice(targets);
        Ok(())
    }
}

/// Equality constraint on coordinate time-derivatives.
///
/// Targets can be updated live; the constraint itself is unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityServo {
    /// The driven free dofs, in coordinate order.
    pub dofs: Vec<Dof>,
    /// One velocity target per driven dof.
    pub targets: Vec<f64>,
    /// Servo compliance.
    pub compliance: f64,
}

impl VelocityServo {
    /// Create a velocity servo; target count must match the dof count.
    pub fn new(dofs: Vec<Dof>, targets: Vec<f64>, compliance: f64) -> Result<Self> {
        check_lengths("velocity targets", &dofs, targets.len())?;
        Ok(Self {
            dofs,
            targets,
            compliance,
        })
    }

    /// Replace the velocity targets without rebuilding the joint.
    pub fn set_targets(&mut self, targets: &[f64]) -> Result<()> {
        check_lengths("velocity targets", &self.dofs, targets.len())?;
        self.targets.clear();
        self.targets.extend_from_slice(targets);
        Ok(())
    }
}

/// Explicit generalized forces on selected free dofs.
///
/// A forcing term, not a constraint; the solver adds it to the right-hand
/// side. Forces can be updated live.
#[derive(Debug, Clone, PartialEq)]
pub struct Forcing {
    /// The forced free dofs, in coordinate order.
    pub dofs: Vec<Dof>,
    /// One generalized force per dof.
    pub forces: Vec<f64>,
}

impl Forcing {
    /// Create a forcing term; force count must match the dof count.
    pub fn new(dofs: Vec<Dof>, forces: Vec<f64>) -> Result<Self> {
        check_lengths("forces", &dofs, forces.len())?;
        Ok(Self { dofs, forces })
    }

    /// Replace the forces without rebuilding the joint.
    pub fn set_forces(&mut self, forces: &[f64]) -> Result<()> {
        check_lengths("forces", &self.dofs, forces.len())?;
        self.forces.clear();
        self.forces.extend_from_slice(forces);
        Ok(())
    }
}

/// Friction-like passive resistance.
///
/// A one-sided velocity constraint with zero rest compliance and a zero
/// velocity target; it activates only once the relative velocity along a
/// selected dof exceeds the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Resistance {
    /// The resisted free dofs, in coordinate order.
    pub dofs: Vec<Dof>,
    /// Activation threshold on the coordinate velocity.
    pub threshold: f64,
}

impl Resistance {
    /// Create a resistance term on the given dofs.
    #[must_use]
    pub const fn new(dofs: Vec<Dof>, threshold: f64) -> Self {
        Self { dofs, threshold }
    }
}

fn check_lengths(what: &str, dofs: &[Dof], actual: usize) -> Result<()> {
    if actual != dofs.len() {
        return Err(ArmatureError::mismatched_dofs(what, dofs.len(), actual));
    }
    Ok(())
}
