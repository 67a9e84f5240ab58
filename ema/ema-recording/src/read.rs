//! Reading and cleaning NDI WaveFront recordings.
//!
//! The raw files are tab-separated text: one header line (with blank fields
//! for unused hardware channels), then one frame per line. Reading is a
//! strict sequence: reconcile the header against the configured
//! [`SensorSet`], parse every row, then mask position samples whose tracking
//! state is not `"OK"`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{RecordingError, RecordingResult};
use crate::schema::{SensorSet, reconcile_header};
use crate::table::{Column, Recording, Sample};

/// The tracking-quality flag the hardware reports for a usable frame.
const STATE_OK: &str = "OK";

/// Reads one recording file into a [`Recording`] and masks untracked
/// samples.
///
/// The file's own header row is used only to count columns and locate blank
/// placeholder positions; the reconstructed schema names the columns.
///
/// # Errors
///
/// Returns a schema error ([`RecordingError::TooFewSensors`] /
/// [`RecordingError::TooManySensors`]) before any data row is parsed if the
/// file width disagrees with the sensor set, [`RecordingError::RaggedRow`]
/// for a malformed data row, and [`RecordingError::Io`] if the file cannot
/// be read.
///
/// # Example
///
/// ```no_run
/// use ema_recording::{SensorSet, read_recording};
///
/// let sensors = SensorSet::ndi_wave(vec!["REF", "OS", "MS"]);
/// let recording = read_recording("/data", "biteplate.tsv", &sensors).unwrap();
/// ```
pub fn read_recording(
    dir: impl AsRef<Path>,
    file_name: &str,
    sensors: &SensorSet,
) -> RecordingResult<Recording> {
    let path = dir.as_ref().join(file_name);
    let display_path = path.display().to_string();

    let file = File::open(&path)?;
    let mut lines = BufReader::new(file).lines();

    let raw_header = lines
        .next()
        .transpose()?
        .ok_or_else(|| RecordingError::EmptyFile {
            path: display_path.clone(),
        })?;
    let raw_fields: Vec<&str> = raw_header.trim_end_matches(['\r', '\n']).split('\t').collect();
    let header = reconcile_header(&raw_fields, sensors, &display_path)?;

    let mut samples: Vec<Vec<Sample>> = vec![Vec::new(); header.len()];
    for (offset, line) in lines.enumerate() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != header.len() {
            return Err(RecordingError::RaggedRow {
                path: display_path,
                // Header is line 1.
                line: offset + 2,
                expected: header.len(),
                actual: fields.len(),
            });
        }
        for (column, field) in samples.iter_mut().zip(fields) {
            column.push(Sample::parse(field));
        }
    }

    let columns = header
        .into_iter()
        .zip(samples)
        .map(|(name, samples)| Column::new(name, samples))
        .collect();
    let mut recording = Recording::from_columns(columns)?;
    debug!(
        path = %display_path,
        rows = recording.num_rows(),
        columns = recording.num_columns(),
        "parsed recording"
    );

    mask_untracked(&mut recording, sensors)?;
    Ok(recording)
}

/// Masks position samples whose tracking state is not `"OK"`.
///
/// For every configured sensor the `state` column is inspected. If its first
/// sample is missing, the hardware channel was never connected; the sensor
/// is skipped and its values pass through exactly as read. Otherwise every
/// frame whose state differs from `"OK"` has the sensor's x/y/z overwritten
/// with [`Sample::Missing`], regardless of what numbers were present. A
/// numeric state is an explicit state like any other, so it masks too.
///
/// # Errors
///
/// Returns [`RecordingError::ColumnNotFound`] if a configured sensor's state
/// or position columns are absent from the table.
pub fn mask_untracked(recording: &mut Recording, sensors: &SensorSet) -> RecordingResult<()> {
    for sensor in sensors.sensors() {
        let state_column = SensorSet::state_column(sensor);
        let state = recording
            .column(&state_column)
            .ok_or_else(|| RecordingError::ColumnNotFound {
                column: state_column.clone(),
            })?;

        // A disconnected channel records no state at all.
        if state.get(0).is_none_or(Sample::is_missing) {
            warn!(sensor = %sensor, "state channel absent, skipping mask");
            continue;
        }

        let untracked: Vec<usize> = state
            .samples()
            .iter()
            .enumerate()
            .filter(|(_, sample)| sample.as_text() != Some(STATE_OK))
            .map(|(row, _)| row)
            .collect();
        for &row in &untracked {
            recording.set_position(sensor, row, None)?;
        }
        if !untracked.is_empty() {
            debug!(sensor = %sensor, masked = untracked.len(), "masked untracked frames");
        }
    }
    Ok(())
}
