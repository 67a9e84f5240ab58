//! Recording tables and file I/O for electromagnetic articulography (EMA) data.
//!
//! This crate provides the data model and tab-separated file handling for
//! recordings produced by NDI WaveFront capture hardware:
//!
//! - **Table** - Column-major [`Recording`] with an explicit missing-value
//!   representation ([`Sample`])
//! - **Schema** - [`SensorSet`] describing the expected sensor/subcolumn
//!   layout, reconciled against each file's raw header
//! - **Reading** - Parse a recording and mask samples whose tracking state
//!   is not `"OK"`
//! - **Writing** - Serialize a processed recording back to tab-separated
//!   text with a normalized extension
//!
//! # Quick Start
//!
//! ```no_run
//! use ema_recording::{SensorSet, read_recording, write_recording};
//!
//! let sensors = SensorSet::ndi_wave(vec!["REF", "OS", "MS", "TT"]);
//!
//! // Read, clean, and re-save a recording.
//! let recording = read_recording("/data/subject1", "calib.tsv", &sensors).unwrap();
//! write_recording("/data/subject1", "calib.tsv", &recording).unwrap();
//! ```
//!
//! # Missing data
//!
//! Position samples are nullable. A sensor's x/y/z triplet is meaningful only
//! for frames where its tracking state equals `"OK"`; every other explicit
//! state forces the triplet to [`Sample::Missing`] at read time. A sensor
//! whose state column is entirely absent (hardware channel never connected)
//! is passed through untouched.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod read;
mod schema;
mod table;
mod write;

pub use error::{RecordingError, RecordingResult};
pub use read::{mask_untracked, read_recording};
pub use schema::{SensorSet, reconcile_header};
pub use table::{Column, Recording, Sample};
pub use write::{PROCESSED_EXTENSION, write_recording, write_recording_as};
