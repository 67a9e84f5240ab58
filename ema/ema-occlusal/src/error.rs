//! Error types for calibration geometry and transforms.

use ema_recording::RecordingError;
use thiserror::Error;

/// Result type for occlusal-frame operations.
pub type OcclusalResult<T> = Result<T, OcclusalError>;

/// Errors that can occur while deriving or applying occlusal-frame
/// transforms.
#[derive(Debug, Error)]
pub enum OcclusalError {
    /// Calibration points are (near-)collinear and define no plane.
    #[error("degenerate biteplate geometry: {reason}")]
    DegenerateGeometry {
        /// Which construction step collapsed.
        reason: String,
    },

    /// A required sensor has no valid frames in the calibration recording.
    #[error("sensor {sensor} has no valid frames in the calibration recording")]
    MissingSensor {
        /// Name of the offending sensor.
        sensor: String,
    },

    /// A rotation matrix failed the orthonormality check.
    #[error("invalid rotation matrix: {reason}")]
    InvalidRotation {
        /// Which property failed.
        reason: String,
    },

    /// Too few anchor points for a rigid fit.
    #[error("rigid fit needs at least {required} point pairs, got {actual}")]
    InsufficientAnchors {
        /// Minimum number of point pairs required.
        required: usize,
        /// Actual number of point pairs provided.
        actual: usize,
    },

    /// Source and target point sets have different lengths.
    #[error("mismatched point sets: {source_len} source vs {target} target points")]
    MismatchedPointSets {
        /// Number of source points.
        source_len: usize,
        /// Number of target points.
        target: usize,
    },

    /// The SVD step of the rigid fit failed or was rank-deficient.
    #[error("rigid fit failed: anchor configuration is rank-deficient")]
    FitFailed,

    /// Error from the recording layer.
    #[error(transparent)]
    Recording(#[from] RecordingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_geometry_names_step() {
        let err = OcclusalError::DegenerateGeometry {
            reason: "MS and REF directions are collinear".to_string(),
        };
        assert!(err.to_string().contains("degenerate"));
        assert!(err.to_string().contains("collinear"));
    }

    #[test]
    fn missing_sensor_names_sensor() {
        let err = OcclusalError::MissingSensor {
            sensor: "OS".to_string(),
        };
        assert!(err.to_string().contains("OS"));
    }

    #[test]
    fn recording_errors_convert() {
        let inner = RecordingError::ColumnNotFound {
            column: "OS_x".to_string(),
        };
        let err = OcclusalError::from(inner);
        assert!(err.to_string().contains("OS_x"));
    }
}
