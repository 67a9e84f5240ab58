//! Writing processed recordings back to tab-separated text.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::RecordingResult;
use crate::table::Recording;

/// Extension given to processed output files.
pub const PROCESSED_EXTENSION: &str = "ndi";

/// Writes a recording next to its source file with the extension replaced by
/// [`PROCESSED_EXTENSION`].
///
/// The table is serialized tab-separated with a header row and no index
/// column; missing samples become empty fields. The in-memory recording is
/// not altered. Returns the path actually written.
///
/// # Errors
///
/// Returns [`RecordingError::Io`](crate::RecordingError::Io) if the
/// destination cannot be written.
pub fn write_recording(
    dir: impl AsRef<Path>,
    file_name: &str,
    recording: &Recording,
) -> RecordingResult<PathBuf> {
    write_recording_as(dir, file_name, recording, PROCESSED_EXTENSION)
}

/// [`write_recording`] with an explicit output extension.
///
/// # Errors
///
/// Returns [`RecordingError::Io`](crate::RecordingError::Io) if the
/// destination cannot be written.
pub fn write_recording_as(
    dir: impl AsRef<Path>,
    file_name: &str,
    recording: &Recording,
    extension: &str,
) -> RecordingResult<PathBuf> {
    let path = dir.as_ref().join(file_name).with_extension(extension);
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", recording.header().join("\t"))?;
    for row in 0..recording.num_rows() {
        let mut first = true;
        for column in recording.columns() {
            if !first {
                write!(writer, "\t")?;
            }
            first = false;
            if let Some(sample) = column.get(row) {
                write!(writer, "{sample}")?;
            }
        }
        writeln!(writer)?;
    }
    writer.flush()?;

    Ok(path)
}
