//! Sample rate conversion kernels.
//!
//! All kernels work on signed 16 bit native samples, one channel ("lane") at a time.
//! Stereo buffers are processed as two lanes with a stride of 2, sharing the same filter.

pub mod fraction;
mod halfband;
mod lane;
pub mod polyphase;

use {
    crate::{ChNum, Mode},
    lane::{Lane, Order},
    polyphase::{Direction, PolyphaseTable},
};

/// Bytes of headroom a plan reserves for every filtering stage it contains
pub const FILTER_BYTES: usize = 64;

/// Which filter to run over the lanes of a buffer
#[derive(Clone, Copy)]
pub enum Kernel<'a> {
    /// Half-band interpolation to twice the rate
    Double,
    /// Half-band decimation to half the rate
    Half,
    /// Polyphase resampling by the table's fraction
    Var(&'a PolyphaseTable),
}

impl Kernel<'_> {
    const fn order(&self) -> Order {
        match self {
            Self::Double => Order::Backward,
            Self::Half => Order::Forward,
            Self::Var(table) => match table.direction() {
                Direction::Up => Order::Backward,
                Direction::Down => Order::Forward,
            },
        }
    }
}

/// Run `kernel` over every channel of the first `len` bytes of `buf`.
///
/// Returns the new length in bytes.
pub fn run(buf: &mut [u8], len: usize, ch: ChNum, mode: Mode, kernel: Kernel) -> usize {
    let stride = ch as usize;
    let frames = len / (2 * stride);
    let looping = mode.contains(Mode::LOOP);
    let mut out_frames = 0;
    for offset in 0..stride {
        let mut lane = Lane::new(buf, stride, offset, frames, looping, kernel.order());
        out_frames = match kernel {
            Kernel::Double => halfband::double(&mut lane),
            Kernel::Half => halfband::half(&mut lane),
            Kernel::Var(table) => table.resample(&mut lane),
        };
    }
    out_frames * 2 * stride
}

#[expect(clippy::cast_possible_truncation)]
fn saturate(v: i64) -> i16 {
    v.clamp(i16::MIN.into(), i16::MAX.into()) as i16
}
