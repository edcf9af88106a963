#![doc = include_str!("../README.md")]
// When we return an error type, the possible errors are encoded within it.
#![allow(clippy::missing_errors_doc)]

mod adapter;
mod cvt;
mod format;
mod plan;
mod rate;
mod result;

pub use {
    adapter::{Adapter, Mode},
    cvt::{AudioCvt, build_converter, format_name},
    format::{AudioFormat, AudioSpec, ChNum, MAX_RATE},
    plan::{MAX_STAGES, Plan},
    rate::{
        FILTER_BYTES,
        fraction::{Fraction, find_fraction},
        polyphase::{Direction, PolyphaseTable},
    },
    result::{CvtError, CvtResult},
};
