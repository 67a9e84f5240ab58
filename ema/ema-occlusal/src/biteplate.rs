//! Deriving the occlusal frame and head-anchor targets from a biteplate
//! calibration recording.
//!
//! A biteplate recording tracks two sensors rigidly fixed to a dental bite
//! plate: `OS` at the chosen origin and `MS` some distance posterior. Their
//! mean positions, together with a posterior reference direction, define a
//! plane and with it the whole occlusal coordinate basis:
//!
//! ```text
//! z = normalize(ms_t × ref_t)    perpendicular to the biteplate plane
//! y = normalize(z × ms_t)        perpendicular to z and the molar direction
//! x = normalize(z × y)
//! ```
//!
//! Operand order is load-bearing: swapping either cross product flips the
//! handedness of the resulting basis and with it the sign convention of all
//! processed data.

use std::path::Path;

use nalgebra::{Matrix3, Point3, Vector3};
use tracing::debug;

use ema_recording::{Recording, SensorSet, read_recording};

use crate::error::{OcclusalError, OcclusalResult};
use crate::frame::{AnchorTargets, OcclusalFrame};

/// Biteplate origin sensor.
pub const ORIGIN_SENSOR: &str = "OS";
/// Biteplate molar sensor, posterior to [`ORIGIN_SENSOR`].
pub const MOLAR_SENSOR: &str = "MS";
/// Nasion head-landmark sensor.
pub const NASION_SENSOR: &str = "REF";
/// Right mastoid head-landmark sensor.
pub const RIGHT_MASTOID_SENSOR: &str = "RMA";
/// Left mastoid head-landmark sensor.
pub const LEFT_MASTOID_SENSOR: &str = "LMA";

/// Below this magnitude a cross product is considered collapsed and the
/// calibration unusable.
const DEGENERACY_EPS: f64 = 1e-9;

/// Estimates the occlusal coordinate frame from a biteplate calibration.
///
/// `OS` and `MS` are averaged over all frames where they are present; the
/// posterior reference direction is taken toward the fixed world point
/// `(0, 0, 0)`, which is not a tracked sensor.
///
/// # Errors
///
/// Returns [`OcclusalError::MissingSensor`] if `OS` or `MS` has no valid
/// frames, and [`OcclusalError::DegenerateGeometry`] if the calibration
/// points are collinear.
pub fn estimate_frame(calibration: &Recording) -> OcclusalResult<OcclusalFrame> {
    let os = sensor_mean(calibration, ORIGIN_SENSOR)?;
    let ms = sensor_mean(calibration, MOLAR_SENSOR)?;

    let ms_t = ms - os;
    let ref_t = -os;

    let rotation = occlusal_basis(&ms_t, &ref_t)?;
    debug!(origin = ?os, "estimated occlusal frame");
    OcclusalFrame::new(os, rotation)
}

/// Estimates the desired occlusal-frame positions of the three head-landmark
/// sensors from a biteplate calibration that also tracks `REF`, `RMA` and
/// `LMA`.
///
/// All five sensors are averaged, translated so `OS` sits at the origin, and
/// the basis is derived from the molar direction and the nasion direction.
/// The three landmark offsets, the nasion included, are then rotated into
/// the occlusal frame (they are directions from the origin, so
/// [`OcclusalFrame::rotate`] applies) so the targets share one coordinate
/// convention with the per-frame fit that consumes them.
///
/// # Errors
///
/// Returns [`OcclusalError::MissingSensor`] if any of the five sensors has
/// no valid frames, and [`OcclusalError::DegenerateGeometry`] if the
/// calibration points are collinear.
pub fn estimate_anchors(calibration: &Recording) -> OcclusalResult<AnchorTargets> {
    let os = sensor_mean(calibration, ORIGIN_SENSOR)?;
    let ms = sensor_mean(calibration, MOLAR_SENSOR)?;
    let nasion = sensor_mean(calibration, NASION_SENSOR)?;
    let rma = sensor_mean(calibration, RIGHT_MASTOID_SENSOR)?;
    let lma = sensor_mean(calibration, LEFT_MASTOID_SENSOR)?;

    // The relative geometry of skull-fixed sensors is constant, so means are
    // safe to operate on.
    let ms_t = ms - os;
    let ref_t = nasion - os;
    let rma_t = rma - os;
    let lma_t = lma - os;

    let rotation = occlusal_basis(&ms_t, &ref_t)?;
    let frame = OcclusalFrame::new(os, rotation)?;
    Ok(AnchorTargets::new(
        Point3::from(frame.rotate(&ref_t)),
        Point3::from(frame.rotate(&rma_t)),
        Point3::from(frame.rotate(&lma_t)),
    ))
}

/// Reads a biteplate file and estimates the occlusal frame in one step.
///
/// # Errors
///
/// Propagates read/schema errors from the recording layer and estimation
/// errors from [`estimate_frame`].
pub fn frame_from_file(
    dir: impl AsRef<Path>,
    file_name: &str,
    sensors: &SensorSet,
) -> OcclusalResult<OcclusalFrame> {
    let calibration = read_recording(dir, file_name, sensors)?;
    estimate_frame(&calibration)
}

/// Reads a biteplate file and estimates the head-anchor targets in one step.
///
/// # Errors
///
/// Propagates read/schema errors from the recording layer and estimation
/// errors from [`estimate_anchors`].
pub fn anchors_from_file(
    dir: impl AsRef<Path>,
    file_name: &str,
    sensors: &SensorSet,
) -> OcclusalResult<AnchorTargets> {
    let calibration = read_recording(dir, file_name, sensors)?;
    estimate_anchors(&calibration)
}

/// Mean position of a sensor, requiring at least one valid frame.
fn sensor_mean(calibration: &Recording, sensor: &str) -> OcclusalResult<Vector3<f64>> {
    calibration
        .mean_position(sensor)?
        .map(|p| p.coords)
        .ok_or_else(|| OcclusalError::MissingSensor {
            sensor: sensor.to_string(),
        })
}

/// Builds the rotation basis from the molar and posterior-reference
/// directions. Rows are `[x, y, z]`.
fn occlusal_basis(ms_t: &Vector3<f64>, ref_t: &Vector3<f64>) -> OcclusalResult<Matrix3<f64>> {
    let z = normalized_cross(ms_t, ref_t, "MS and reference directions are collinear")?;
    let y = normalized_cross(&z, ms_t, "z axis and MS direction are collinear")?;
    let x = normalized_cross(&z, &y, "z and y axes are collinear")?;
    Ok(Matrix3::from_rows(&[
        x.transpose(),
        y.transpose(),
        z.transpose(),
    ]))
}

fn normalized_cross(
    a: &Vector3<f64>,
    b: &Vector3<f64>,
    reason: &str,
) -> OcclusalResult<Vector3<f64>> {
    let cross = a.cross(b);
    let norm = cross.norm();
    if norm < DEGENERACY_EPS {
        return Err(OcclusalError::DegenerateGeometry {
            reason: reason.to_string(),
        });
    }
    Ok(cross / norm)
}
