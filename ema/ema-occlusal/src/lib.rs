//! Occlusal-plane alignment for electromagnetic articulography recordings.
//!
//! Raw EMA data lives in the coordinate frame of the field generator, which
//! is arbitrary with respect to the speaker's anatomy. This crate derives an
//! anatomically meaningful frame from a biteplate calibration recording and
//! moves whole recordings into it, either with a single recording-level
//! transform ([`apply_frame`]) or with per-frame head-motion correction
//! ([`head_correct`]).
//!
//! # Example
//!
//! ```no_run
//! use ema_occlusal::{apply_frame, frame_from_file};
//! use ema_recording::{SensorSet, read_recording, write_recording};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sensors = SensorSet::ndi_wave(vec!["OS", "MS", "TT", "REF"]);
//! let frame = frame_from_file("session/", "biteplate.tsv", &sensors)?;
//!
//! let recording = read_recording("session/", "utterance01.tsv", &sensors)?;
//! let aligned = apply_frame(&recording, &frame, &sensors)?;
//! write_recording("session/processed/", "utterance01.tsv", &aligned)?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod apply;
mod biteplate;
mod correct;
mod error;
mod fit;
mod frame;

pub use apply::apply_frame;
pub use biteplate::{
    LEFT_MASTOID_SENSOR, MOLAR_SENSOR, NASION_SENSOR, ORIGIN_SENSOR, RIGHT_MASTOID_SENSOR,
    anchors_from_file, estimate_anchors, estimate_frame, frame_from_file,
};
pub use correct::{CorrectionParams, head_correct};
pub use error::{OcclusalError, OcclusalResult};
pub use fit::{RigidFit, fit_rigid};
pub use frame::{AnchorTargets, OcclusalFrame, ROTATION_EPS};
