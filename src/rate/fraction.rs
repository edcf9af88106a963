//! Approximating a rate ratio with a small fraction.

/// Smallest ratio [`find_fraction`] approximates
pub const MIN_RATIO: f64 = 31.0 / 64.0;
/// Largest ratio [`find_fraction`] approximates
pub const MAX_RATIO: f64 = 64.0 / 31.0;

/// Numerators worth considering for each denominator `1..=16`.
///
/// Only fractions between 1/2 and 2 in lowest terms are listed.
const NUMERATORS: [&[u8]; 16] = [
    &[1, 2],
    &[1, 3],
    &[2, 4, 5],
    &[3, 5, 7],
    &[3, 4, 6, 7, 8, 9],
    &[5, 7, 11],
    &[4, 5, 6, 8, 9, 10, 11, 12, 13],
    &[5, 7, 9, 11, 13, 15],
    &[5, 7, 8, 10, 11, 13, 14, 16],
    &[7, 9, 11, 13],
    &[6, 7, 8, 9, 10, 12, 13, 14, 15, 16],
    &[7, 11, 13],
    &[7, 8, 9, 10, 11, 12, 14, 15, 16],
    &[9, 11, 13, 15],
    &[8, 11, 13, 14, 16],
    &[9, 11, 13, 15],
];

/// A ratio of output samples (`num`) to input samples (`den`).
///
/// The default value (`0/0`) means "no fraction".
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Fraction {
    /// Output samples per period
    pub num: u8,
    /// Input samples per period
    pub den: u8,
}

impl Fraction {
    /// No change in rate
    pub const ONE: Self = Self { num: 1, den: 1 };
    /// Whether this is an actual fraction
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.num != 0 && self.den != 0
    }
    /// The ratio as a float
    #[must_use]
    pub fn value(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl std::fmt::Display for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Find the fraction with a denominator of at most 16 that best approximates `ratio`.
///
/// The error is measured relatively, so `q` being 1% too large is as bad as 1% too small.
/// On ties, the fraction with the smaller denominator wins.
/// Ratios outside [`MIN_RATIO`]`..=`[`MAX_RATIO`] give `0/0`.
#[must_use]
pub fn find_fraction(ratio: f64) -> Fraction {
    if !(MIN_RATIO..=MAX_RATIO).contains(&ratio) {
        return Fraction::default();
    }
    let mut best = Fraction::default();
    let mut best_score = 0.0;
    for (den, nums) in (1..).zip(NUMERATORS) {
        for &num in nums {
            let q = f64::from(num) / f64::from(den);
            let score = (q / ratio).min(ratio / q);
            if score > best_score {
                best_score = score;
                best = Fraction { num, den };
            }
        }
    }
    best
}

#[test]
fn test_common_rates() {
    let frac = |src: u32, dst: u32| find_fraction(f64::from(dst) / f64::from(src));
    assert_eq!(frac(44_100, 48_000), Fraction { num: 12, den: 11 });
    assert_eq!(frac(48_000, 44_100), Fraction { num: 11, den: 12 });
    assert_eq!(find_fraction(0.5), Fraction { num: 1, den: 2 });
    assert_eq!(find_fraction(2.0), Fraction { num: 2, den: 1 });
    assert_eq!(find_fraction(1.5), Fraction { num: 3, den: 2 });
    assert_eq!(find_fraction(1.0), Fraction::ONE);
}

#[test]
fn test_out_of_range() {
    assert!(!find_fraction(0.4).is_valid());
    assert!(!find_fraction(2.1).is_valid());
    assert!(!find_fraction(f64::NAN).is_valid());
    assert!(find_fraction(MIN_RATIO).is_valid());
    assert!(find_fraction(MAX_RATIO).is_valid());
}
