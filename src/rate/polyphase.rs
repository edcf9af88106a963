//! Resampling by an arbitrary small fraction with a windowed-sinc polyphase filter.

use {
    super::{
        fraction::{Fraction, MAX_RATIO, MIN_RATIO, find_fraction},
        lane::Lane,
        saturate,
    },
    std::f64::consts::TAU,
};

/// Taps per phase
pub const TAPS: usize = 128;
/// Most phases a table can have (the largest numerator of a [`Fraction`])
pub const MAX_PHASES: usize = 16;
/// The input sample that lines up with tap 0, relative to the interpolation point
const CENTER: isize = 63;
/// Taps of each phase sum to this (1.0 in Q15)
const UNITY: f64 = 32768.0;
/// How far below the lower Nyquist frequency the cutoff sits, in cycles per sample
const CUTOFF_MARGIN: f64 = 0.018;

/// Rising half of a Kaiser window, Q16. The falling half mirrors it.
const KAISER_WINDOW: [u16; TAPS / 2] = [
    22930, 16292, 14648, 14288, 14470, 14945, 15608, 16404, 17304, 18289, 19347, 20467, 21644,
    22872, 24145, 25460, 26812, 28198, 29612, 31052, 32513, 33991, 35482, 36983, 38487, 39993,
    41494, 42986, 44466, 45928, 47368, 48782, 50165, 51513, 52821, 54086, 55302, 56466, 57575,
    58624, 59610, 60529, 61379, 62156, 62858, 63483, 64027, 64490, 64870, 65165, 65375, 65498,
    65535, 65484, 65347, 65124, 64815, 64422, 63946, 63389, 62753, 62039, 61251, 60391,
];

/// Whether a table makes more samples or fewer
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    /// More output samples than input samples
    Up,
    /// Fewer output samples than input samples
    Down,
}

impl Direction {
    /// Input samples every output advances by, unless its phase wraps
    const fn base_advance(self) -> u8 {
        match self {
            Self::Up => 0,
            Self::Down => 1,
        }
    }
}

/// Filter coefficients for resampling by a [`Fraction`].
///
/// Output sample `t` uses phase `t % num`, whose taps are centered `(t * den) % num / num`
/// of a sample after input `t * den / num`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PolyphaseTable {
    direction: Direction,
    fraction: Fraction,
    taps: [[i16; TAPS]; MAX_PHASES],
    advance: [u8; MAX_PHASES],
}

impl PolyphaseTable {
    /// Build the table for resampling by `ratio` (output rate over input rate).
    ///
    /// Returns `None` if `ratio` can't be approximated by a fraction, or the fraction
    /// points the other way than `direction`.
    pub fn new(ratio: f64, direction: Direction) -> Option<Self> {
        if !(MIN_RATIO..=MAX_RATIO).contains(&ratio) {
            return None;
        }
        let fraction = find_fraction(ratio);
        let ok = match direction {
            Direction::Up => fraction.num >= fraction.den,
            Direction::Down => fraction.num <= fraction.den,
        };
        if !fraction.is_valid() || !ok {
            return None;
        }
        let num = fraction.num;
        let den = fraction.den;
        let step = match direction {
            Direction::Up => den,
            Direction::Down => den - num,
        };
        let omega = TAU * (0.5 * ratio.min(ratio.recip()) - CUTOFF_MARGIN);
        let mut table = Self {
            direction,
            fraction,
            taps: [[0; TAPS]; MAX_PHASES],
            advance: [0; MAX_PHASES],
        };
        let mut offset = 0;
        for phase in 0..usize::from(num) {
            table.taps[phase] = phase_taps(omega, f64::from(offset) / f64::from(num));
            offset += step;
            table.advance[phase] = direction.base_advance();
            if offset >= num {
                offset -= num;
                table.advance[phase] += 1;
            }
        }
        Some(table)
    }
    /// Whether this table makes more samples or fewer
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }
    /// The fraction this table resamples by
    #[must_use]
    pub const fn fraction(&self) -> Fraction {
        self.fraction
    }
    /// Number of phases (the fraction's numerator)
    #[must_use]
    pub fn phases(&self) -> usize {
        usize::from(self.fraction.num)
    }
    /// Taps of `phase`, in Q15
    #[must_use]
    pub const fn taps(&self, phase: usize) -> &[i16; TAPS] {
        &self.taps[phase]
    }
    /// Input samples to advance by after producing an output with `phase`
    #[must_use]
    pub const fn advance(&self, phase: usize) -> u8 {
        self.advance[phase]
    }
    /// Output samples made from `frames` input samples
    #[must_use]
    pub fn out_frames(&self, frames: usize) -> usize {
        (frames * usize::from(self.fraction.num)).div_ceil(usize::from(self.fraction.den))
    }
    /// Raw native endian bytes of all taps (testing-only)
    #[must_use]
    #[cfg(feature = "testing")]
    pub fn tap_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.taps[..self.phases()])
    }
    /// Resample the lane, returning the number of output samples
    pub(super) fn resample(&self, lane: &mut Lane) -> usize {
        let len = lane.len();
        if len == 0 {
            return 0;
        }
        let out = self.out_frames(len);
        let num = self.phases();
        match self.direction {
            Direction::Up => {
                // Outputs overtake inputs, so work from the back
                let last = out - 1;
                let mut pos = last * usize::from(self.fraction.den) / num;
                let mut phase = last % num;
                for t in (0..out).rev() {
                    let value = self.convolve(lane, phase, pos);
                    lane.put(t, value);
                    if t > 0 {
                        phase = (phase + num - 1) % num;
                        pos -= usize::from(self.advance[phase]);
                    }
                }
            }
            Direction::Down => {
                let mut pos = 0;
                let mut phase = 0;
                for t in 0..out {
                    let value = self.convolve(lane, phase, pos);
                    lane.put(t, value);
                    pos += usize::from(self.advance[phase]);
                    phase = (phase + 1) % num;
                }
            }
        }
        out
    }
    #[expect(clippy::cast_possible_wrap)]
    fn convolve(&self, lane: &Lane, phase: usize, pos: usize) -> i16 {
        let first = pos as isize + CENTER;
        let acc: i64 = self.taps[phase]
            .iter()
            .zip(0..)
            .map(|(&tap, k)| i64::from(tap) * i64::from(lane.get(first - k)))
            .sum();
        saturate((acc + (1 << 14)) >> 15)
    }
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-24 { 1.0 } else { x.sin() / x }
}

/// Windowed sinc taps for an interpolation point `offset` samples after the center,
/// normalized to unity gain.
#[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn phase_taps(omega: f64, offset: f64) -> [i16; TAPS] {
    let mut proto = [0.0; TAPS];
    let at = |k: usize| omega * (k as f64 - CENTER as f64 + offset);
    for (i, &w) in KAISER_WINDOW.iter().enumerate() {
        let w = f64::from(w) * (i + 1) as f64;
        proto[i] = w * sinc(at(i));
        proto[TAPS - 1 - i] = w * sinc(at(TAPS - 1 - i));
    }
    let scale = UNITY / proto.iter().sum::<f64>();
    proto.map(|p| (p * scale).round().clamp(i16::MIN.into(), i16::MAX.into()) as i16)
}

#[cfg(test)]
mod tests {
    use {super::*, crate::rate::lane::Order};

    fn run(table: &PolyphaseTable, input: &[i16], looping: bool) -> Vec<i16> {
        let out = table.out_frames(input.len());
        let mut buf: Vec<u8> = bytemuck::cast_slice(input).to_vec();
        buf.resize(out.max(input.len()) * 2, 0);
        let order = match table.direction() {
            Direction::Up => Order::Backward,
            Direction::Down => Order::Forward,
        };
        let mut lane = Lane::new(&mut buf, 1, 0, input.len(), looping, order);
        assert_eq!(table.resample(&mut lane), out);
        bytemuck::pod_collect_to_vec(&buf[..out * 2])
    }

    #[test]
    fn test_phase_walk() {
        let up = PolyphaseTable::new(48_000.0 / 44_100.0, Direction::Up).unwrap();
        assert_eq!(up.fraction(), Fraction { num: 12, den: 11 });
        assert_eq!(up.phases(), 12);
        // Over one period, 11 inputs are consumed
        let total: u32 = (0..12).map(|p| u32::from(up.advance(p))).sum();
        assert_eq!(total, 11);
        let down = PolyphaseTable::new(44_100.0 / 48_000.0, Direction::Down).unwrap();
        let total: u32 = (0..11).map(|p| u32::from(down.advance(p))).sum();
        assert_eq!(total, 12);
        assert_eq!(down.out_frames(12), 11);
        assert_eq!(up.out_frames(12), 14);
    }

    #[test]
    fn test_mismatched_direction() {
        assert!(PolyphaseTable::new(1.5, Direction::Down).is_none());
        assert!(PolyphaseTable::new(0.75, Direction::Up).is_none());
        assert!(PolyphaseTable::new(3.0, Direction::Up).is_none());
    }

    #[test]
    fn test_unity_gain() {
        for ratio in [0.5, 0.75, 11.0 / 12.0, 12.0 / 11.0, 1.5, 2.0] {
            let dir = if ratio > 1.0 { Direction::Up } else { Direction::Down };
            let table = PolyphaseTable::new(ratio, dir).unwrap();
            for p in 0..table.phases() {
                let sum: i32 = table.taps(p).iter().map(|&t| i32::from(t)).sum();
                assert!((sum - 32768).abs() <= 64, "{ratio} {p} {sum}");
            }
        }
    }

    #[test]
    fn test_dc_looping() {
        for ratio in [11.0 / 12.0, 12.0 / 11.0, 0.5, 2.0] {
            let dir = if ratio > 1.0 { Direction::Up } else { Direction::Down };
            let table = PolyphaseTable::new(ratio, dir).unwrap();
            for s in run(&table, &[2000; 300], true) {
                assert!((i32::from(s) - 2000).abs() <= 8, "{ratio} {s}");
            }
        }
    }

    #[test]
    fn test_sine_up() {
        let table = PolyphaseTable::new(1.5, Direction::Up).unwrap();
        let input: Vec<i16> = (0..600)
            .map(|i| (8000.0 * (TAU * f64::from(i) / 50.0).sin()).round() as i16)
            .collect();
        let out = run(&table, &input, false);
        assert_eq!(out.len(), 900);
        // Output t sits at input position t / 1.5
        for (t, &s) in out.iter().enumerate().skip(150).take(600) {
            let want = 8000.0 * (TAU * (t as f64 / 1.5) / 50.0).sin();
            assert!((f64::from(s) - want).abs() < 80.0, "{t} {s} {want}");
        }
    }
}
