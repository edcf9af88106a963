//! Property-based tests for plan building and running.
//!
//! Checks that plans never outgrow the buffer size they ask for, that every rate pair
//! yields a bounded plan, and that the fraction search stays close to the requested ratio.

use pcmcvt::{Adapter, AudioFormat, AudioSpec, MAX_RATE, MAX_STAGES, Mode, Plan, find_fraction};
use proptest::prelude::*;

const FORMATS: [AudioFormat; 7] = [
    AudioFormat::U8,
    AudioFormat::S8,
    AudioFormat::U16LSB,
    AudioFormat::S16LSB,
    AudioFormat::U16MSB,
    AudioFormat::S16MSB,
    AudioFormat::F32SYS,
];

fn spec() -> impl Strategy<Value = AudioSpec> {
    (0..FORMATS.len(), 1u8..=2, 4000u32..=96_000)
        .prop_map(|(fmt, channels, rate)| AudioSpec::new(FORMATS[fmt], channels, rate))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Running a plan on a buffer of exactly `required_len` bytes never writes past it,
    /// and always produces whole frames.
    #[test]
    fn conversion_stays_in_bounds(
        src in spec(),
        dst in spec(),
        same_rate in any::<bool>(),
        looping in any::<bool>(),
        data in prop::collection::vec(any::<u8>(), 0..1024),
    ) {
        let dst = if same_rate { AudioSpec::new(dst.format, dst.channels, src.rate) } else { dst };
        let plan = Plan::build(&src, &dst).unwrap();
        let len = data.len() - data.len() % src.frame_size();
        let mut buf = data;
        buf.resize(plan.required_len(len), 0);
        let mode = if looping { Mode::LOOP } else { Mode::empty() };
        let out = plan.run_mode(&mut buf, len, mode).unwrap();
        prop_assert!(out <= buf.len());
        prop_assert_eq!(out % dst.frame_size(), 0);
        if src.rate == dst.rate {
            prop_assert_eq!(out, len / src.frame_size() * dst.frame_size());
        }
    }

    /// Every pair of valid rates gives a plan that fits, with at most one polyphase stage.
    #[test]
    fn plans_terminate(src_rate in 1..=MAX_RATE, dst_rate in 1..=MAX_RATE, stereo in any::<bool>()) {
        let channels = if stereo { 2 } else { 1 };
        let src = AudioSpec::new(AudioFormat::S16SYS, channels, src_rate);
        let dst = AudioSpec::new(AudioFormat::S16SYS, channels, dst_rate);
        let plan = Plan::build(&src, &dst).unwrap();
        prop_assert!(plan.stages().len() <= MAX_STAGES);
        let variable = plan
            .stages()
            .iter()
            .filter(|s| matches!(s, Adapter::VarRateUp(_) | Adapter::VarRateDown(_)))
            .count();
        prop_assert!(variable <= 1);
        prop_assert_eq!(variable == 1, plan.filter().is_some());
        prop_assert!(plan.multiplier() >= 1.0);
    }

    /// The best fraction is within 3.3% of the ratio, and between 1/2 and 2.
    ///
    /// Fractions with denominators of at most 16 leave a gap of that size just below 1/1
    /// (15/16 to 1) and just below 2/1.
    #[test]
    fn fraction_close(ratio in (31.0f64 / 64.0)..=(64.0 / 31.0)) {
        let frac = find_fraction(ratio);
        prop_assert!(frac.is_valid());
        let q = frac.value();
        prop_assert!((0.5..=2.0).contains(&q));
        prop_assert!((q / ratio - 1.0).abs() <= 0.033, "{} for {}", frac, ratio);
    }

    /// Converting to the same spec leaves the data alone
    #[test]
    fn identity_is_untouched(spec in spec(), data in prop::collection::vec(any::<u8>(), 0..256)) {
        let plan = Plan::build(&spec, &spec).unwrap();
        prop_assert!(plan.is_identity());
        let mut buf = data.clone();
        let out = plan.run(&mut buf, data.len()).unwrap();
        prop_assert_eq!(&buf[..out], &data[..]);
    }
}
