//! End-to-end read/write tests over real temp files.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use ema_recording::{
    RecordingError, Sample, SensorSet, read_recording, write_recording, write_recording_as,
};
use tempfile::tempdir;

/// A two-sensor WaveFront-style file with one blank hardware channel and one
/// untracked frame on MS.
const FIXTURE: &str = "\
time\tOS_ID\tOS_frame\tOS_state\tOS_q0\tOS_qx\tOS_qy\tOS_qz\tOS_x\tOS_y\tOS_z\t \tMS_ID\tMS_frame\tMS_state\tMS_q0\tMS_qx\tMS_qy\tMS_qz\tMS_x\tMS_y\tMS_z
0\t1\t0\tOK\t1\t0\t0\t0\t10\t0\t0\t42\t2\t0\tOK\t1\t0\t0\t0\t10\t-5\t0
0.01\t1\t1\tOK\t1\t0\t0\t0\t10\t0\t0\t42\t2\t1\tMISSING\t1\t0\t0\t0\t99\t99\t99
0.02\t1\t2\tOK\t1\t0\t0\t0\t10\t0\t0\t42\t2\t2\tOK\t1\t0\t0\t0\t10\t-5\t0
";

fn write_fixture(dir: &Path, name: &str) {
    let mut file = File::create(dir.join(name)).unwrap();
    write!(file, "{FIXTURE}").unwrap();
}

fn sensors() -> SensorSet {
    SensorSet::ndi_wave(vec!["OS", "MS"])
}

#[test]
fn read_reconciles_blank_channel_and_masks_untracked() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path(), "bp.tsv");

    let recording = read_recording(dir.path(), "bp.tsv", &sensors()).unwrap();
    assert_eq!(recording.num_rows(), 3);
    assert_eq!(recording.header()[11], "EMPTY0");

    // Frame 1 of MS was MISSING: position masked, numbers discarded.
    assert!(recording.position("MS", 1).unwrap().is_none());
    assert!(recording.position("MS", 0).unwrap().is_some());
    // OS untouched throughout.
    assert!(recording.position("OS", 1).unwrap().is_some());
}

#[test]
fn one_sensor_short_is_too_few() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path(), "bp.tsv");

    let err = read_recording(dir.path(), "bp.tsv", &SensorSet::ndi_wave(vec!["OS"])).unwrap_err();
    assert!(matches!(err, RecordingError::TooFewSensors { .. }));
}

#[test]
fn one_sensor_extra_is_too_many() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path(), "bp.tsv");

    let err = read_recording(
        dir.path(),
        "bp.tsv",
        &SensorSet::ndi_wave(vec!["OS", "MS", "REF"]),
    )
    .unwrap_err();
    assert!(matches!(err, RecordingError::TooManySensors { .. }));
}

/// Like [`FIXTURE`] but without the unused hardware channel, so the written
/// output reconciles against the same schema again.
const PLAIN_FIXTURE: &str = "\
time\tOS_ID\tOS_frame\tOS_state\tOS_q0\tOS_qx\tOS_qy\tOS_qz\tOS_x\tOS_y\tOS_z\tMS_ID\tMS_frame\tMS_state\tMS_q0\tMS_qx\tMS_qy\tMS_qz\tMS_x\tMS_y\tMS_z
0\t1\t0\tOK\t1\t0\t0\t0\t10\t0\t0\t2\t0\tOK\t1\t0\t0\t0\t10\t-5\t0
0.01\t1\t1\tOK\t1\t0\t0\t0\t10\t0\t0\t2\t1\tMISSING\t1\t0\t0\t0\t99\t99\t99
0.02\t1\t2\tOK\t1\t0\t0\t0\t10\t0\t0\t2\t2\tOK\t1\t0\t0\t0\t10\t-5\t0
";

#[test]
fn write_then_read_preserves_table_content() {
    let dir = tempdir().unwrap();
    let mut file = File::create(dir.path().join("bp.tsv")).unwrap();
    write!(file, "{PLAIN_FIXTURE}").unwrap();
    drop(file);

    let original = read_recording(dir.path(), "bp.tsv", &sensors()).unwrap();
    let written = write_recording(dir.path(), "bp.tsv", &original).unwrap();
    assert_eq!(written.file_name().unwrap(), "bp.ndi");

    let reread = read_recording(dir.path(), "bp.ndi", &sensors()).unwrap();
    assert_eq!(reread.num_rows(), original.num_rows());
    assert_eq!(reread.header(), original.header());
    for (a, b) in original.columns().iter().zip(reread.columns()) {
        assert_eq!(a.samples(), b.samples(), "column {}", a.name());
    }
    // The masked MS frame stays missing across the round trip.
    assert_eq!(reread.column("MS_x").unwrap().get(1), Some(&Sample::Missing));
}

#[test]
fn placeholder_column_is_written_out_by_name() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path(), "bp.tsv");

    let original = read_recording(dir.path(), "bp.tsv", &sensors()).unwrap();
    let written = write_recording_as(dir.path(), "bp.tsv", &original, "ndi").unwrap();

    let contents = std::fs::read_to_string(written).unwrap();
    let header: Vec<&str> = contents.lines().next().unwrap().split('\t').collect();
    assert_eq!(header[11], "EMPTY0");
    // The unused channel's data rides along unchanged.
    let row: Vec<&str> = contents.lines().nth(1).unwrap().split('\t').collect();
    assert_eq!(row[11], "42");
}
