//! Least-squares rigid fit of paired point sets.
//!
//! The Kabsch algorithm finds the rotation + translation minimizing the RMS
//! deviation between paired source and target points: center both sets,
//! take the SVD of the 3×3 covariance, and correct the reflection case so
//! the result is always a proper rotation. Three non-collinear pairs fully
//! determine the fit, which is exactly what the three head anchors provide.

use nalgebra::{Matrix3, Point3, Vector3};

use crate::error::{OcclusalError, OcclusalResult};

/// Singular values below this are treated as rank deficiency.
const RANK_EPS: f64 = 1e-9;

/// A rigid rotation + translation, as produced by [`fit_rigid`].
///
/// Maps source-space points into target space as `R·p + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidFit {
    /// Proper rotation matrix (`det = +1`).
    pub rotation: Matrix3<f64>,
    /// Translation applied after rotation.
    pub translation: Vector3<f64>,
}

impl RigidFit {
    /// The identity fit.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Transforms a point from source space into target space.
    #[must_use]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * point.coords + self.translation)
    }
}

/// Computes the rigid transform that best maps `source` onto `target` in the
/// least-squares sense.
///
/// # Errors
///
/// Returns [`OcclusalError::MismatchedPointSets`] if the slices differ in
/// length, [`OcclusalError::InsufficientAnchors`] for fewer than three
/// pairs, and [`OcclusalError::FitFailed`] when the point configuration is
/// rank-deficient (e.g. collinear anchors), which leaves the rotation
/// underdetermined.
///
/// # Example
///
/// ```
/// use ema_occlusal::fit_rigid;
/// use nalgebra::Point3;
///
/// let source = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let target: Vec<_> = source
///     .iter()
///     .map(|p| Point3::new(p.x + 2.0, p.y, p.z))
///     .collect();
///
/// let fit = fit_rigid(&source, &target).unwrap();
/// let moved = fit.transform_point(&source[0]);
/// assert!((moved - target[0]).norm() < 1e-9);
/// ```
pub fn fit_rigid(source: &[Point3<f64>], target: &[Point3<f64>]) -> OcclusalResult<RigidFit> {
    if source.len() != target.len() {
        return Err(OcclusalError::MismatchedPointSets {
            source_len: source.len(),
            target: target.len(),
        });
    }
    if source.len() < 3 {
        return Err(OcclusalError::InsufficientAnchors {
            required: 3,
            actual: source.len(),
        });
    }

    let source_centroid = centroid(source);
    let target_centroid = centroid(target);

    // Covariance H = sum((s - sc) * (t - tc)^T).
    let mut h = Matrix3::zeros();
    for (s, t) in source.iter().zip(target) {
        h += (s.coords - source_centroid) * (t.coords - target_centroid).transpose();
    }

    let svd = h.svd(true, true);
    let u = svd.u.ok_or(OcclusalError::FitFailed)?;
    let v_t = svd.v_t.ok_or(OcclusalError::FitFailed)?;
    // Two nonzero singular values are needed to pin down the rotation.
    if svd.singular_values[1] < RANK_EPS {
        return Err(OcclusalError::FitFailed);
    }

    let mut rotation = v_t.transpose() * u.transpose();
    if rotation.determinant() < 0.0 {
        // Reflection case: flip the sign of V's last column.
        let mut v = v_t.transpose();
        for i in 0..3 {
            v[(i, 2)] = -v[(i, 2)];
        }
        rotation = v * u.transpose();
    }

    let translation = target_centroid - rotation * source_centroid;
    Ok(RigidFit {
        rotation,
        translation,
    })
}

fn centroid(points: &[Point3<f64>]) -> Vector3<f64> {
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    points.iter().map(|p| p.coords).sum::<Vector3<f64>>() / n
}
