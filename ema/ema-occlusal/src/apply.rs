//! Applying a recording-level occlusal transform.

use nalgebra::Point3;
use tracing::debug;

use ema_recording::{Recording, SensorSet};

use crate::biteplate::NASION_SENSOR;
use crate::error::OcclusalResult;
use crate::frame::OcclusalFrame;

/// Translates and rotates every configured sensor's positions into the
/// occlusal frame.
///
/// This is the path for recordings whose head motion was already corrected
/// by the capture hardware: one frame-independent transform suffices. Each
/// position maps as `R · (p − origin)`, except the nasion sensor `REF`,
/// whose tracked position is discarded and pinned to exactly `(0, 0, 0)`
/// since by convention it defines the origin of the corrected space.
/// Triplets with
/// any missing component stay missing; time, state, quaternion, and
/// unconfigured columns pass through unchanged.
///
/// Purely functional: the input recording is not modified, and identical
/// inputs always produce identical output.
///
/// # Errors
///
/// Returns a wrapped [`ema_recording::RecordingError::ColumnNotFound`] if a
/// configured sensor's position columns are absent.
///
/// # Example
///
/// ```
/// use ema_occlusal::{OcclusalFrame, apply_frame};
/// use ema_recording::{Column, Recording, Sample, SensorSet};
///
/// let recording = Recording::from_columns(vec![
///     Column::new("TT_x", vec![Sample::Number(1.0)]),
///     Column::new("TT_y", vec![Sample::Number(2.0)]),
///     Column::new("TT_z", vec![Sample::Number(3.0)]),
/// ])
/// .unwrap();
/// let sensors = SensorSet::new(vec!["TT"], vec!["x", "y", "z"]);
///
/// let out = apply_frame(&recording, &OcclusalFrame::identity(), &sensors).unwrap();
/// assert_eq!(out, recording);
/// ```
pub fn apply_frame(
    recording: &Recording,
    frame: &OcclusalFrame,
    sensors: &SensorSet,
) -> OcclusalResult<Recording> {
    let mut out = recording.clone();
    for sensor in sensors.sensors() {
        if sensor == NASION_SENSOR {
            for row in 0..out.num_rows() {
                out.set_position(sensor, row, Some(Point3::origin()))?;
            }
            continue;
        }
        for row in 0..out.num_rows() {
            if let Some(position) = out.position(sensor, row)? {
                out.set_position(sensor, row, Some(frame.to_occlusal(&position)))?;
            }
        }
    }
    debug!(
        sensors = sensors.sensors().len(),
        rows = out.num_rows(),
        "applied occlusal transform"
    );
    Ok(out)
}
