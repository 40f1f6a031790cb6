//! Common test infrastructure for gridpaint integration tests.
//!
//! Each test file compiles its own copy of this module, so items may appear
//! unused from the perspective of a single test file even though they're
//! used elsewhere.

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fakes;
pub mod fixtures;
pub mod harness;

pub use fakes::{FakeCapture, RecordingPointer, ScriptedConfirmation, ScriptedPicker};
pub use harness::{near, recorded, TestRun};
