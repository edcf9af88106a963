//! Rate doubling and halving with a half-band filter.

use super::{lane::Lane, saturate};

/// Half-band lowpass, Kaiser windowed, Q15.
///
/// Entry `d` is the weight of the samples `d` steps away from the center.
/// Even distances are zero except the center itself, which is 0.5 and implicit.
const HALF_BAND: [i64; 32] = [
    0, 20798, 0, -6764, 0, 3863, 0, -2560, 0, 1800, 0, -1295, 0, 936, 0, -671, 0, 474, 0, -326, 0,
    217, 0, -138, 0, 83, 0, -46, 0, 23, 0, -9,
];

/// Interpolate to twice the rate. The original samples are kept as the even outputs.
#[expect(clippy::cast_possible_wrap)]
pub fn double(lane: &mut Lane) -> usize {
    let len = lane.len();
    for k in (0..len).rev() {
        let at = k as isize;
        let mut acc = 0;
        for d in (1..HALF_BAND.len()).step_by(2) {
            // Output sits half a step after `at`, so the pair is at -d/2 and +d/2 from it
            let m = (d / 2) as isize;
            acc += HALF_BAND[d] * (i64::from(lane.get(at - m)) + i64::from(lane.get(at + 1 + m)));
        }
        let even = lane.get(at);
        lane.put(2 * k + 1, saturate((acc + (1 << 14)) >> 15));
        lane.put(2 * k, even);
    }
    len * 2
}

/// Lowpass and drop every other sample. An odd trailing sample makes one more output.
#[expect(clippy::cast_possible_wrap)]
pub fn half(lane: &mut Lane) -> usize {
    let out = lane.len().div_ceil(2);
    for k in 0..out {
        let at = (2 * k) as isize;
        let mut acc = i64::from(lane.get(at)) << 15;
        for d in (1..HALF_BAND.len()).step_by(2) {
            let d_i = d as isize;
            acc += HALF_BAND[d] * (i64::from(lane.get(at - d_i)) + i64::from(lane.get(at + d_i)));
        }
        lane.put(k, saturate((acc + (1 << 15)) >> 16));
    }
    out
}
