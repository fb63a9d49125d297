//! The geometry-to-inertia collaborator contract.
//!
//! Mass properties derived from geometry come from an external tool; this
//! module fixes its interface and parses the rigid-descriptor files such
//! tools write. A failing derivation is a fatal construction error, never
//! a silent default.

use std::path::Path;

use nalgebra::{Matrix3, Vector3};

use armature_types::{ArmatureError, Result, RigidInfo};

/// External service computing mass properties from a mesh.
///
/// Given a mesh path, a density, and an anisotropic scale, the service
/// returns total mass, center of mass, and principal inertia. Errors
/// (missing tool, unreadable mesh) must be reported as
/// [`ArmatureError::MeshDerivation`]; construction aborts on them.
pub trait InertiaSource {
    /// Derive rigid-body properties for a mesh.
    fn rigid_info(&self, mesh_path: &Path, density: f64, scale: Vector3<f64>)
        -> Result<RigidInfo>;
}

/// Parse a rigid-descriptor file into [`RigidInfo`].
///
/// The format is line-keyed: `mass` (one value), `inrt` (nine values,
/// row-major, normalized by mass), `cntr` (center of mass, three values).
/// Unknown keys such as the header and `volm` are skipped. The inertia
/// matrix is scaled back by the mass and reduced to principal axes.
pub fn parse_rigid_file(path: &str, contents: &str) -> Result<RigidInfo> {
    let mut mass = None;
    let mut inertia = None;
    let mut center = None;

    for line in contents.lines() {
        let mut tokens = line.split_whitespace();
        let Some(key) = tokens.next() else { continue };
        let values: Vec<&str> = tokens.collect();

        match key {
            "mass" => mass = Some(parse_values::<1>(path, key, &values)?[0]),
            "inrt" => inertia = Some(parse_values::<9>(path, key, &values)?),
            "cntr" => center = Some(parse_values::<3>(path, key, &values)?),
            _ => {}
        }
    }

    let mass = mass.ok_or_else(|| ArmatureError::rigid_file(path, "missing 'mass' entry"))?;
    let inertia = inertia.ok_or_else(|| ArmatureError::rigid_file(path, "missing 'inrt' entry"))?;
    let center = center.ok_or_else(|| ArmatureError::rigid_file(path, "missing 'cntr' entry"))?;

    // File inertia is normalized by mass.
    let matrix = Matrix3::from_row_slice(&inertia) * mass;
    RigidInfo::from_inertia_matrix(mass, Vector3::new(center[0], center[1], center[2]), matrix)
}

fn parse_values<const N: usize>(path: &str, key: &str, values: &[&str]) -> Result<[f64; N]> {
    if values.len() != N {
        return Err(ArmatureError::rigid_file(
            path,
            format!("'{key}' expects {N} values, got {}", values.len()),
        ));
    }
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(values) {
        *slot = token.parse().map_err(|_| {
            ArmatureError::rigid_file(path, format!("'{key}' has non-numeric value '{token}'"))
        })?;
    }
    Ok(out)
}
