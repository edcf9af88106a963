//! End to end conversions through the public API.

use pcmcvt::{
    Adapter, AudioCvt, AudioFormat, AudioSpec, ChNum, CvtError, Fraction, Mode, Plan,
};

fn to_bytes(samples: &[i16]) -> Vec<u8> {
    bytemuck::cast_slice(samples).to_vec()
}

fn samples(bytes: &[u8]) -> Vec<i16> {
    bytemuck::pod_collect_to_vec(bytes)
}

fn convert(plan: &Plan, mut buf: Vec<u8>, mode: Mode) -> Vec<u8> {
    let len = buf.len();
    buf.resize(plan.required_len(len), 0);
    let out = plan.run_mode(&mut buf, len, mode).unwrap();
    assert!(out <= plan.required_len(len));
    buf.truncate(out);
    buf
}

#[test]
fn test_u8_to_s16() {
    let src = AudioSpec::new(AudioFormat::U8, 1, 8000);
    let dst = AudioSpec::new(AudioFormat::S16SYS, 1, 8000);
    let plan = Plan::build(&src, &dst).unwrap();
    assert_eq!(
        plan.stage_names().collect::<Vec<_>>(),
        ["change_signed_8bit", "expand_8bit_to_16bit_sys"]
    );
    let out = convert(&plan, vec![0, 128, 255], Mode::empty());
    assert_eq!(samples(&out), [-32768, 0, 32512]);
}

#[test]
fn test_stereo_to_mono() {
    let src = AudioSpec::new(AudioFormat::S16SYS, 2, 44_100);
    let dst = AudioSpec::new(AudioFormat::S16SYS, 1, 44_100);
    let plan = Plan::build(&src, &dst).unwrap();
    assert_eq!(plan.stages(), [Adapter::StereoToMonoS16]);
    let out = convert(&plan, to_bytes(&[100, 200, -50, 50]), Mode::empty());
    assert_eq!(samples(&out), [150, 0]);
}

#[test]
fn test_quadruple_rate() {
    let src = AudioSpec::new(AudioFormat::S16SYS, 1, 8000);
    let dst = AudioSpec::new(AudioFormat::S16SYS, 1, 32_000);
    let plan = Plan::build(&src, &dst).unwrap();
    assert_eq!(
        plan.stages(),
        [
            Adapter::DoubleRate(ChNum::Mono),
            Adapter::DoubleRate(ChNum::Mono)
        ]
    );
    assert!(plan.multiplier() >= 4.0);
    let out = convert(&plan, to_bytes(&[500; 100]), Mode::LOOP);
    let out = samples(&out);
    assert_eq!(out.len(), 400);
    assert!(out.iter().all(|&s| (i32::from(s) - 500).abs() <= 2));
}

#[test]
fn test_cd_to_dat() {
    let src = AudioSpec::new(AudioFormat::S16SYS, 2, 44_100);
    let dst = AudioSpec::new(AudioFormat::S16SYS, 2, 48_000);
    let plan = Plan::build(&src, &dst).unwrap();
    assert_eq!(plan.stages(), [Adapter::VarRateUp(ChNum::Stereo)]);
    assert_eq!(
        plan.filter().map(|f| f.fraction()),
        Some(Fraction { num: 12, den: 11 })
    );
    // Left and right channels must not bleed into each other
    let frames: Vec<i16> = (0..1100).flat_map(|_| [3000, -3000]).collect();
    let out = samples(&convert(&plan, to_bytes(&frames), Mode::LOOP));
    assert_eq!(out.len(), 2 * 1200);
    for frame in out.chunks_exact(2) {
        assert!((i32::from(frame[0]) - 3000).abs() <= 12, "{frame:?}");
        assert!((i32::from(frame[1]) + 3000).abs() <= 12, "{frame:?}");
    }
}

#[test]
fn test_invalid_channels() {
    let src = AudioSpec::new(AudioFormat::S16SYS, 3, 44_100);
    let dst = AudioSpec::new(AudioFormat::S16SYS, 2, 44_100);
    assert!(matches!(
        Plan::build(&src, &dst),
        Err(CvtError::InvalidFormat(_))
    ));
    assert!(matches!(
        AudioCvt::new(&dst, &src),
        Err(CvtError::InvalidFormat(_))
    ));
}

#[test]
fn test_missing_plan_or_buffer() {
    let mut cvt = AudioCvt {
        buf: Some(vec![0; 4]),
        len: 4,
        ..AudioCvt::default()
    };
    assert_eq!(cvt.convert(), Err(CvtError::NullPlan));
    let spec = AudioSpec::new(AudioFormat::S16SYS, 2, 44_100);
    let mut cvt = AudioCvt::new(&spec, &spec).unwrap();
    assert_eq!(cvt.convert(), Err(CvtError::NullBuffer));
}

#[test]
fn test_audio_cvt_grows_buffer() {
    let src = AudioSpec::new(AudioFormat::U8, 1, 11_025);
    let dst = AudioSpec::new(AudioFormat::S16LSB, 2, 22_050);
    let mut cvt = AudioCvt::new(&src, &dst).unwrap();
    cvt.set_data(vec![128; 64]);
    assert_eq!(cvt.convert(), Ok(64 * 2 * 2 * 2));
    assert_eq!(cvt.data().len(), 256 * 2);
    assert!(cvt.data().iter().all(|&b| b == 0));
}

#[test]
fn test_buffer_too_small() {
    let src = AudioSpec::new(AudioFormat::U8, 1, 8000);
    let dst = AudioSpec::new(AudioFormat::S16SYS, 2, 8000);
    let plan = Plan::build(&src, &dst).unwrap();
    let mut buf = vec![0; 10];
    assert_eq!(
        plan.run(&mut buf, 10),
        Err(CvtError::BufferTooSmall {
            needed: 40,
            capacity: 10
        })
    );
    // Claiming more data than the buffer holds is caught too
    let same = Plan::build(&src, &src).unwrap();
    assert!(same.run(&mut buf, 11).is_err());
}

#[test]
fn test_identity() {
    for (format, channels) in [
        (AudioFormat::U8, 1),
        (AudioFormat::S16MSB, 2),
        (AudioFormat::F32SYS, 2),
    ] {
        let spec = AudioSpec::new(format, channels, 32_000);
        let plan = Plan::build(&spec, &spec).unwrap();
        assert!(plan.is_identity());
        let data: Vec<u8> = (0..=255).collect();
        assert_eq!(convert(&plan, data.clone(), Mode::empty()), data);
    }
}

#[test]
fn test_round_trips() {
    let all: Vec<i16> = (i16::MIN..=i16::MAX).step_by(7).collect();
    let native = AudioSpec::new(AudioFormat::S16SYS, 1, 16_000);
    for format in [
        AudioFormat::S16LSB,
        AudioFormat::S16MSB,
        AudioFormat::U16SYS,
        AudioFormat::F32SYS,
    ] {
        let other = AudioSpec::new(format, 1, 16_000);
        let there = Plan::build(&native, &other).unwrap();
        let back = Plan::build(&other, &native).unwrap();
        let mid = convert(&there, to_bytes(&all), Mode::empty());
        assert_eq!(mid.len(), all.len() * format.sample_size());
        assert_eq!(samples(&convert(&back, mid, Mode::empty())), all, "{format:?}");
    }
    let bytes: Vec<u8> = (0..=255).collect();
    let signed = AudioSpec::new(AudioFormat::S8, 2, 16_000);
    let unsigned = AudioSpec::new(AudioFormat::U8, 2, 16_000);
    let there = Plan::build(&signed, &unsigned).unwrap();
    let back = Plan::build(&unsigned, &signed).unwrap();
    let mid = convert(&there, bytes.clone(), Mode::empty());
    assert_ne!(mid, bytes);
    assert_eq!(convert(&back, mid, Mode::empty()), bytes);
    for format in [AudioFormat::U8, AudioFormat::S16MSB] {
        let mono = AudioSpec::new(format, 1, 16_000);
        let stereo = AudioSpec::new(format, 2, 16_000);
        let there = Plan::build(&mono, &stereo).unwrap();
        let back = Plan::build(&stereo, &mono).unwrap();
        let mid = convert(&there, bytes.clone(), Mode::empty());
        assert_eq!(mid.len(), 2 * bytes.len());
        assert_eq!(convert(&back, mid, Mode::empty()), bytes, "{format:?}");
    }
}

#[test]
fn test_downsample_attenuates() {
    let src = AudioSpec::new(AudioFormat::S16SYS, 1, 48_000);
    let dst = AudioSpec::new(AudioFormat::S16SYS, 1, 24_000);
    let plan = Plan::build(&src, &dst).unwrap();
    assert_eq!(
        plan.stages(),
        [Adapter::Minus5Db, Adapter::HalfRate(ChNum::Mono)]
    );
    let out = samples(&convert(&plan, to_bytes(&[10_000; 200]), Mode::LOOP));
    assert_eq!(out.len(), 100);
    // -5 dB is a factor of about 0.58
    assert!(out.iter().all(|&s| (5800..=5830).contains(&s)), "{out:?}");
}
