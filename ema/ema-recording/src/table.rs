//! Column-major recording table with explicit missing values.
//!
//! A [`Recording`] is an ordered sequence of frames stored column-wise. Every
//! cell is a [`Sample`], which makes the missing-data policy explicit instead
//! of smuggling NaNs through arithmetic: a position is either a number or it
//! is absent, and absent values are skipped by the aggregation helpers.

use std::fmt;

use nalgebra::Point3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{RecordingError, RecordingResult};
use crate::schema::SensorSet;

/// One table cell.
///
/// # Example
///
/// ```
/// use ema_recording::Sample;
///
/// assert_eq!(Sample::parse("1.5"), Sample::Number(1.5));
/// assert_eq!(Sample::parse(""), Sample::Missing);
/// assert_eq!(Sample::parse("OK"), Sample::Text("OK".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Sample {
    /// No value recorded (empty field, or masked by the cleaning pass).
    Missing,
    /// A finite or infinite floating-point value.
    Number(f64),
    /// A non-numeric field such as a tracking state or sensor identifier.
    Text(String),
}

impl Sample {
    /// Parses one raw field.
    ///
    /// Empty (after trimming) and NaN fields become [`Sample::Missing`];
    /// fields that parse as `f64` become [`Sample::Number`]; everything else
    /// is kept verbatim as [`Sample::Text`].
    #[must_use]
    pub fn parse(field: &str) -> Self {
        let field = field.trim();
        if field.is_empty() {
            return Self::Missing;
        }
        match field.parse::<f64>() {
            Ok(value) if value.is_nan() => Self::Missing,
            Ok(value) => Self::Number(value),
            Err(_) => Self::Text(field.to_string()),
        }
    }

    /// The numeric value, if this sample is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// The text value, if this sample is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// True if no value is recorded.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for Sample {
    /// Missing samples serialize as an empty field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

/// A named column of samples.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Column {
    name: String,
    samples: Vec<Sample>,
}

impl Column {
    /// Creates a column from a name and its samples.
    #[must_use]
    pub fn new(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    /// The column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All samples, in frame order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// The sample at `row`, if in range.
    #[must_use]
    pub fn get(&self, row: usize) -> Option<&Sample> {
        self.samples.get(row)
    }

    /// Overwrites the sample at `row`. Out-of-range rows are ignored.
    pub fn set(&mut self, row: usize, sample: Sample) {
        if let Some(slot) = self.samples.get_mut(row) {
            *slot = sample;
        }
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if the column holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// An ordered sequence of frames from one recording file, stored
/// column-major.
///
/// Created by [`read_recording`](crate::read_recording) and discarded after
/// writing; the table owns its data and retains no connection to the source
/// file.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Recording {
    columns: Vec<Column>,
    rows: usize,
}

impl Recording {
    /// Builds a recording from equal-length columns.
    ///
    /// # Errors
    ///
    /// Returns [`RecordingError::ColumnLengthMismatch`] if any column's
    /// length differs from the first column's.
    pub fn from_columns(columns: Vec<Column>) -> RecordingResult<Self> {
        let rows = columns.first().map_or(0, Column::len);
        for column in &columns {
            if column.len() != rows {
                return Err(RecordingError::ColumnLengthMismatch {
                    column: column.name().to_string(),
                    expected: rows,
                    actual: column.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Number of frames.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True if the recording holds no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in file order.
    #[must_use]
    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// All columns, in file order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Looks up a column by name, mutably.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name() == name)
    }

    fn require_index(&self, name: &str) -> RecordingResult<usize> {
        self.columns
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| RecordingError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    /// A sensor's position at `row`, or `None` if any of x/y/z is missing.
    ///
    /// # Errors
    ///
    /// Returns [`RecordingError::ColumnNotFound`] if the sensor's position
    /// columns are not in the table.
    pub fn position(&self, sensor: &str, row: usize) -> RecordingResult<Option<Point3<f64>>> {
        let [cx, cy, cz] = self.position_indices(sensor)?;
        let coord = |idx: usize| self.columns[idx].get(row).and_then(Sample::as_number);
        Ok(match (coord(cx), coord(cy), coord(cz)) {
            (Some(x), Some(y), Some(z)) => Some(Point3::new(x, y, z)),
            _ => None,
        })
    }

    /// Overwrites a sensor's position at `row`; `None` marks it missing.
    ///
    /// # Errors
    ///
    /// Returns [`RecordingError::ColumnNotFound`] if the sensor's position
    /// columns are not in the table.
    pub fn set_position(
        &mut self,
        sensor: &str,
        row: usize,
        position: Option<Point3<f64>>,
    ) -> RecordingResult<()> {
        let indices = self.position_indices(sensor)?;
        for (axis, idx) in indices.into_iter().enumerate() {
            let sample = position.map_or(Sample::Missing, |p| Sample::Number(p[axis]));
            self.columns[idx].set(row, sample);
        }
        Ok(())
    }

    /// A sensor's full position track, one entry per frame.
    ///
    /// # Errors
    ///
    /// Returns [`RecordingError::ColumnNotFound`] if the sensor's position
    /// columns are not in the table.
    pub fn positions(&self, sensor: &str) -> RecordingResult<Vec<Option<Point3<f64>>>> {
        let [cx, cy, cz] = self.position_indices(sensor)?;
        Ok((0..self.rows)
            .map(|row| {
                let coord = |idx: usize| self.columns[idx].get(row).and_then(Sample::as_number);
                match (coord(cx), coord(cy), coord(cz)) {
                    (Some(x), Some(y), Some(z)) => Some(Point3::new(x, y, z)),
                    _ => None,
                }
            })
            .collect())
    }

    /// Mean position of a sensor over all frames where it is present.
    ///
    /// Returns `Ok(None)` when no frame carries a complete triplet.
    ///
    /// # Errors
    ///
    /// Returns [`RecordingError::ColumnNotFound`] if the sensor's position
    /// columns are not in the table.
    pub fn mean_position(&self, sensor: &str) -> RecordingResult<Option<Point3<f64>>> {
        let mut sum = Point3::origin();
        let mut count = 0usize;
        for position in self.positions(sensor)?.into_iter().flatten() {
            sum += position.coords;
            count += 1;
        }
        if count == 0 {
            return Ok(None);
        }
        #[allow(clippy::cast_precision_loss)]
        Ok(Some(sum / count as f64))
    }

    fn position_indices(&self, sensor: &str) -> RecordingResult<[usize; 3]> {
        let [cx, cy, cz] = SensorSet::position_columns(sensor);
        Ok([
            self.require_index(&cx)?,
            self.require_index(&cy)?,
            self.require_index(&cz)?,
        ])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sensor_recording() -> Recording {
        Recording::from_columns(vec![
            Column::new(
                "time",
                vec![Sample::Number(0.0), Sample::Number(0.01), Sample::Number(0.02)],
            ),
            Column::new(
                "OS_x",
                vec![Sample::Number(1.0), Sample::Missing, Sample::Number(3.0)],
            ),
            Column::new(
                "OS_y",
                vec![Sample::Number(2.0), Sample::Missing, Sample::Number(4.0)],
            ),
            Column::new(
                "OS_z",
                vec![Sample::Number(0.0), Sample::Missing, Sample::Number(0.0)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn parse_classifies_fields() {
        assert_eq!(Sample::parse("3.25"), Sample::Number(3.25));
        assert_eq!(Sample::parse(" -1e3 "), Sample::Number(-1000.0));
        assert_eq!(Sample::parse("OK"), Sample::Text("OK".to_string()));
        assert_eq!(Sample::parse(""), Sample::Missing);
        assert_eq!(Sample::parse("   "), Sample::Missing);
        assert_eq!(Sample::parse("NaN"), Sample::Missing);
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for sample in [
            Sample::Number(1.5),
            Sample::Text("MISSING".to_string()),
            Sample::Missing,
        ] {
            assert_eq!(Sample::parse(&sample.to_string()), sample);
        }
    }

    #[test]
    fn from_columns_rejects_unequal_lengths() {
        let err = Recording::from_columns(vec![
            Column::new("time", vec![Sample::Number(0.0)]),
            Column::new("OS_x", vec![]),
        ])
        .unwrap_err();
        assert!(matches!(err, RecordingError::ColumnLengthMismatch { .. }));
    }

    #[test]
    fn position_is_none_when_any_axis_missing() {
        let recording = sensor_recording();
        assert!(recording.position("OS", 0).unwrap().is_some());
        assert!(recording.position("OS", 1).unwrap().is_none());
    }

    #[test]
    fn position_unknown_sensor_is_an_error() {
        let recording = sensor_recording();
        let err = recording.position("TT", 0).unwrap_err();
        assert!(matches!(err, RecordingError::ColumnNotFound { .. }));
    }

    #[test]
    fn mean_position_skips_missing_frames() {
        let recording = sensor_recording();
        let mean = recording.mean_position("OS").unwrap().unwrap();
        assert_relative_eq!(mean.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(mean.y, 3.0, epsilon = 1e-12);
        assert_relative_eq!(mean.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn mean_position_with_no_valid_frames_is_none() {
        let recording = Recording::from_columns(vec![
            Column::new("OS_x", vec![Sample::Missing]),
            Column::new("OS_y", vec![Sample::Missing]),
            Column::new("OS_z", vec![Sample::Missing]),
        ])
        .unwrap();
        assert!(recording.mean_position("OS").unwrap().is_none());
    }

    #[test]
    fn set_position_overwrites_and_clears() {
        let mut recording = sensor_recording();
        recording
            .set_position("OS", 1, Some(Point3::new(9.0, 8.0, 7.0)))
            .unwrap();
        let p = recording.position("OS", 1).unwrap().unwrap();
        assert_eq!(p, Point3::new(9.0, 8.0, 7.0));

        recording.set_position("OS", 0, None).unwrap();
        assert!(recording.position("OS", 0).unwrap().is_none());
    }
}
