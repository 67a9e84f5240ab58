//! Per-frame head-motion correction.
//!
//! The head moves freely during a recording session, so a single
//! recording-level transform cannot separate articulator motion from head
//! motion. Instead, every frame gets its own rigid transform: the tracked
//! positions of the three skull-fixed landmarks (`REF`, `RMA`, `LMA`) are
//! fit onto their calibration-derived [`AnchorTargets`] with a Kabsch
//! least-squares solution, and that frame's transform is applied to every
//! configured sensor.
//!
//! Frames are mutually independent, so the fits run in parallel.

use nalgebra::Point3;
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use ema_recording::{Recording, SensorSet};

use crate::biteplate::{LEFT_MASTOID_SENSOR, NASION_SENSOR, RIGHT_MASTOID_SENSOR};
use crate::error::OcclusalResult;
use crate::fit::{RigidFit, fit_rigid};
use crate::frame::AnchorTargets;

/// Options for [`head_correct`].
///
/// # Example
///
/// ```
/// use ema_occlusal::CorrectionParams;
///
/// // Smooth the anchor tracks over 5 frames before fitting.
/// let params = CorrectionParams { smooth_window: 5 };
/// assert!(params.smooth_window > CorrectionParams::default().smooth_window);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CorrectionParams {
    /// Width of the centered moving-average window applied to the anchor
    /// tracks before fitting. `0` or `1` disables smoothing.
    ///
    /// The head is a slow-moving structure, so constraining each anchor
    /// sample by its temporal neighbors both steadies the fit and recovers
    /// frames lost to brief tracking dropout.
    pub smooth_window: usize,
}

impl Default for CorrectionParams {
    fn default() -> Self {
        Self { smooth_window: 0 }
    }
}

/// Corrects head motion frame by frame and moves the whole recording into
/// the occlusal frame.
///
/// For each frame the tracked `REF`/`RMA`/`LMA` positions are fit onto
/// `anchors` and the resulting transform is applied to every sensor in
/// `sensors` (the landmarks included, which afterwards sit near their
/// targets). Frames where any anchor is missing, or where the anchor
/// configuration is degenerate, cannot be corrected: every configured
/// sensor's position in such a frame becomes missing rather than passing
/// through uncorrected.
///
/// # Errors
///
/// Returns a wrapped column-lookup error if the anchor sensors or any
/// configured sensor's position columns are absent from the recording.
pub fn head_correct(
    recording: &Recording,
    anchors: &AnchorTargets,
    sensors: &SensorSet,
    params: &CorrectionParams,
) -> OcclusalResult<Recording> {
    let mut nasion = recording.positions(NASION_SENSOR)?;
    let mut right = recording.positions(RIGHT_MASTOID_SENSOR)?;
    let mut left = recording.positions(LEFT_MASTOID_SENSOR)?;

    if params.smooth_window > 1 {
        nasion = smooth_track(&nasion, params.smooth_window);
        right = smooth_track(&right, params.smooth_window);
        left = smooth_track(&left, params.smooth_window);
    }

    let targets = anchors.as_points();
    let fits: Vec<Option<RigidFit>> = (0..recording.num_rows())
        .into_par_iter()
        .map(|row| match (nasion[row], right[row], left[row]) {
            (Some(n), Some(r), Some(l)) => fit_rigid(&[n, r, l], &targets).ok(),
            _ => None,
        })
        .collect();

    let corrected = fits.iter().filter(|fit| fit.is_some()).count();
    debug!(
        frames = fits.len(),
        corrected,
        dropped = fits.len() - corrected,
        "fitted per-frame head transforms"
    );

    let mut out = recording.clone();
    for sensor in sensors.sensors() {
        for (row, fit) in fits.iter().enumerate() {
            match fit {
                Some(fit) => {
                    if let Some(position) = out.position(sensor, row)? {
                        out.set_position(sensor, row, Some(fit.transform_point(&position)))?;
                    }
                }
                None => out.set_position(sensor, row, None)?,
            }
        }
    }
    Ok(out)
}

/// Centered moving average over a track with missing samples.
///
/// Each output sample is the mean of the present samples inside the window;
/// a window with no present samples stays missing. Isolated dropouts are
/// therefore filled from their neighbors.
fn smooth_track(track: &[Option<Point3<f64>>], window: usize) -> Vec<Option<Point3<f64>>> {
    let half = window / 2;
    (0..track.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(track.len());
            let mut sum = Point3::origin();
            let mut count = 0usize;
            for sample in track[lo..hi].iter().flatten() {
                sum += sample.coords;
                count += 1;
            }
            if count == 0 {
                None
            } else {
                #[allow(clippy::cast_precision_loss)]
                Some(sum / count as f64)
            }
        })
        .collect()
}
