//! Occlusal coordinate frame and head-anchor targets.
//!
//! Both types are computed once per biteplate calibration and then shared,
//! read-only, across every recording processed with them. Neither can be
//! mutated after construction.

use nalgebra::{Matrix3, Point3, Vector3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{OcclusalError, OcclusalResult};

/// Tolerance for the orthonormality and determinant checks.
pub const ROTATION_EPS: f64 = 1e-9;

/// The occlusal-plane coordinate frame derived from a biteplate calibration.
///
/// Holds the origin (the biteplate origin sensor's mean position in raw
/// sensor space) and a rotation matrix whose rows are mutually orthogonal
/// unit vectors. Raw points map into occlusal space as `R · (p − origin)`.
///
/// The basis the biteplate convention produces is a *reflected* (improper)
/// one: the axis construction takes `x = z × y`, which makes the row triple
/// left-handed. The constructor therefore accepts any orthonormal basis with
/// `|det R| = 1` and rejects everything else.
///
/// # Example
///
/// ```
/// use ema_occlusal::OcclusalFrame;
/// use nalgebra::{Matrix3, Point3, Vector3};
///
/// let frame = OcclusalFrame::new(Vector3::new(1.0, 0.0, 0.0), Matrix3::identity()).unwrap();
/// let p = frame.to_occlusal(&Point3::new(2.0, 0.0, 0.0));
/// assert!((p.x - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OcclusalFrame {
    origin: Vector3<f64>,
    rotation: Matrix3<f64>,
}

impl OcclusalFrame {
    /// Creates a frame after validating the rotation matrix.
    ///
    /// # Errors
    ///
    /// Returns [`OcclusalError::InvalidRotation`] unless `R · Rᵗ` is the
    /// identity within [`ROTATION_EPS`] and `|det R|` is 1 within the same
    /// tolerance.
    pub fn new(origin: Vector3<f64>, rotation: Matrix3<f64>) -> OcclusalResult<Self> {
        let gram = rotation * rotation.transpose();
        let deviation = (gram - Matrix3::identity()).abs().max();
        if deviation > ROTATION_EPS {
            return Err(OcclusalError::InvalidRotation {
                reason: format!("rows are not orthonormal (max deviation {deviation:.3e})"),
            });
        }
        let det = rotation.determinant();
        if (det.abs() - 1.0).abs() > ROTATION_EPS {
            return Err(OcclusalError::InvalidRotation {
                reason: format!("determinant is {det:.6}, expected magnitude 1"),
            });
        }
        Ok(Self { origin, rotation })
    }

    /// The identity frame: origin at zero, no rotation.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            origin: Vector3::zeros(),
            rotation: Matrix3::identity(),
        }
    }

    /// The frame origin in raw sensor space.
    #[must_use]
    pub fn origin(&self) -> Vector3<f64> {
        self.origin
    }

    /// The rotation matrix, rows in x/y/z order.
    #[must_use]
    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    /// Maps a raw sensor-space point into occlusal coordinates.
    #[must_use]
    pub fn to_occlusal(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * (point.coords - self.origin))
    }

    /// Rotates a raw-space direction into occlusal coordinates without
    /// translating it.
    #[must_use]
    pub fn rotate(&self, direction: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * direction
    }
}

/// Desired occlusal-frame positions of the three skull-fixed landmark
/// sensors: nasion (`REF`), right mastoid (`RMA`), left mastoid (`LMA`).
///
/// Used as fit targets for per-frame head-motion correction. All three
/// targets are expressed in the occlusal frame; see
/// [`estimate_anchors`](crate::estimate_anchors) for the convention.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnchorTargets {
    /// Target position of the nasion sensor (`REF`).
    pub nasion: Point3<f64>,
    /// Target position of the right mastoid sensor (`RMA`).
    pub right_mastoid: Point3<f64>,
    /// Target position of the left mastoid sensor (`LMA`).
    pub left_mastoid: Point3<f64>,
}

impl AnchorTargets {
    /// Creates anchor targets from the three landmark positions.
    #[must_use]
    pub const fn new(
        nasion: Point3<f64>,
        right_mastoid: Point3<f64>,
        left_mastoid: Point3<f64>,
    ) -> Self {
        Self {
            nasion,
            right_mastoid,
            left_mastoid,
        }
    }

    /// The targets as an array in `REF`, `RMA`, `LMA` order.
    #[must_use]
    pub const fn as_points(&self) -> [Point3<f64>; 3] {
        [self.nasion, self.right_mastoid, self.left_mastoid]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_frame_is_a_noop_transform() {
        let frame = OcclusalFrame::identity();
        let p = Point3::new(1.0, -2.0, 3.0);
        assert_relative_eq!(frame.to_occlusal(&p), p, epsilon = 1e-12);
    }

    #[test]
    fn translation_applies_before_rotation() {
        // 90 degrees about z as row basis: x' = y, y' = -x.
        let rotation = Matrix3::new(0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let frame = OcclusalFrame::new(Vector3::new(1.0, 0.0, 0.0), rotation).unwrap();
        let p = frame.to_occlusal(&Point3::new(2.0, 1.0, 0.0));
        assert_relative_eq!(p, Point3::new(1.0, -1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn rotate_ignores_the_origin() {
        let rotation = Matrix3::new(0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let frame = OcclusalFrame::new(Vector3::new(100.0, -50.0, 7.0), rotation).unwrap();
        let direction = Vector3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(
            frame.rotate(&direction),
            Vector3::new(0.0, -1.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn reflected_basis_is_accepted() {
        // The biteplate construction yields det = -1 bases.
        let rotation = Matrix3::new(0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, -1.0);
        assert_relative_eq!(rotation.determinant(), -1.0, epsilon = 1e-12);
        assert!(OcclusalFrame::new(Vector3::zeros(), rotation).is_ok());
    }

    #[test]
    fn non_orthonormal_rows_are_rejected() {
        let rotation = Matrix3::new(1.0, 0.1, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        let err = OcclusalFrame::new(Vector3::zeros(), rotation).unwrap_err();
        assert!(matches!(err, OcclusalError::InvalidRotation { .. }));
    }

    #[test]
    fn scaled_basis_is_rejected() {
        let rotation = Matrix3::identity() * 2.0;
        assert!(OcclusalFrame::new(Vector3::zeros(), rotation).is_err());
    }

    #[test]
    fn anchor_targets_expose_fit_order() {
        let targets = AnchorTargets::new(
            Point3::new(0.0, 8.0, 2.0),
            Point3::new(5.0, 1.0, 2.0),
            Point3::new(-5.0, 1.0, 2.0),
        );
        let [r, rm, lm] = targets.as_points();
        assert_eq!(r, targets.nasion);
        assert_eq!(rm, targets.right_mastoid);
        assert_eq!(lm, targets.left_mastoid);
    }
}
