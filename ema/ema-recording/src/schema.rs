//! Sensor/subcolumn schema and raw-header reconciliation.
//!
//! A recording file's first line is its raw header. The recorder emits one
//! `time` column followed by a fixed tuple of subcolumns per hardware
//! channel; channels that are not part of any configured sensor appear as
//! blank header fields. [`reconcile_header`] rebuilds the full column list
//! from a [`SensorSet`], inserting `EMPTYk` placeholders where the raw
//! header is blank, and rejects any width disagreement before a single data
//! row is parsed.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{RecordingError, RecordingResult};

/// Ordered sensor names plus the ordered per-sensor subcolumn names.
///
/// Supplied by the caller on every read; the crate holds no ambient sensor
/// configuration.
///
/// # Example
///
/// ```
/// use ema_recording::SensorSet;
///
/// let set = SensorSet::ndi_wave(vec!["REF", "OS", "MS"]);
/// assert_eq!(set.expected_header()[0], "time");
/// assert_eq!(set.expected_header()[1], "REF_ID");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorSet {
    sensors: Vec<String>,
    subcolumns: Vec<String>,
}

/// Subcolumns emitted per sensor by NDI WaveFront software.
const NDI_WAVE_SUBCOLUMNS: [&str; 10] =
    ["ID", "frame", "state", "q0", "qx", "qy", "qz", "x", "y", "z"];

impl SensorSet {
    /// Creates a schema from explicit sensor and subcolumn lists.
    #[must_use]
    pub fn new(
        sensors: impl IntoIterator<Item = impl Into<String>>,
        subcolumns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            sensors: sensors.into_iter().map(Into::into).collect(),
            subcolumns: subcolumns.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a schema with the standard NDI WaveFront subcolumn tuple
    /// (`ID, frame, state, q0, qx, qy, qz, x, y, z`).
    #[must_use]
    pub fn ndi_wave(sensors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(sensors, NDI_WAVE_SUBCOLUMNS)
    }

    /// The configured sensor names, in order.
    #[must_use]
    pub fn sensors(&self) -> &[String] {
        &self.sensors
    }

    /// The configured subcolumn names, in order.
    #[must_use]
    pub fn subcolumns(&self) -> &[String] {
        &self.subcolumns
    }

    /// The expected header before placeholder insertion:
    /// `time` followed by `{sensor}_{subcolumn}` for every sensor/subcolumn
    /// pair.
    #[must_use]
    pub fn expected_header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(1 + self.sensors.len() * self.subcolumns.len());
        header.push("time".to_string());
        for sensor in &self.sensors {
            for sub in &self.subcolumns {
                header.push(format!("{sensor}_{sub}"));
            }
        }
        header
    }

    /// Name of a sensor's tracking-state column.
    #[must_use]
    pub fn state_column(sensor: &str) -> String {
        format!("{sensor}_state")
    }

    /// Names of a sensor's position columns, in x/y/z order.
    #[must_use]
    pub fn position_columns(sensor: &str) -> [String; 3] {
        [
            format!("{sensor}_x"),
            format!("{sensor}_y"),
            format!("{sensor}_z"),
        ]
    }
}

/// Reconstructs the full column list for a file from its raw header fields.
///
/// Blank raw-header fields mark hardware channels outside the configured
/// sensor set; a synthetic `EMPTYk` placeholder is inserted at each such
/// position so the reconstructed header aligns column-for-column with the
/// file. The raw header's names are otherwise discarded.
///
/// # Errors
///
/// Returns [`RecordingError::TooFewSensors`] if the file has more columns
/// than the reconstructed header accounts for, and
/// [`RecordingError::TooManySensors`] if it has fewer. `path` is only used
/// in error messages.
pub fn reconcile_header(
    raw_fields: &[&str],
    sensors: &SensorSet,
    path: &str,
) -> RecordingResult<Vec<String>> {
    let mut header = sensors.expected_header();

    // Blank positions are ascending, so sequential insertion keeps every
    // later raw index aligned with the partially rebuilt header.
    let blanks: Vec<usize> = raw_fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.trim().is_empty())
        .map(|(idx, _)| idx)
        .collect();
    for (count, idx) in blanks.into_iter().enumerate() {
        if idx <= header.len() {
            header.insert(idx, format!("EMPTY{count}"));
        } else {
            header.push(format!("EMPTY{count}"));
        }
    }

    if raw_fields.len() > header.len() {
        return Err(RecordingError::TooFewSensors {
            path: path.to_string(),
            file_columns: raw_fields.len(),
            schema_columns: header.len(),
        });
    }
    if raw_fields.len() < header.len() {
        return Err(RecordingError::TooManySensors {
            path: path.to_string(),
            file_columns: raw_fields.len(),
            schema_columns: header.len(),
        });
    }

    Ok(header)
}
