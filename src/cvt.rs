use crate::{
    AudioFormat, AudioSpec, Plan,
    result::{CvtError, CvtResult},
};

/// A conversion plan bundled with the buffer it converts.
///
/// The buffer is grown as needed before converting, and holds the converted data afterwards.
#[derive(Clone, Debug, Default)]
pub struct AudioCvt {
    /// The conversion to run, `None` if building it failed
    pub plan: Option<Plan>,
    /// Data to convert
    pub buf: Option<Vec<u8>>,
    /// Number of valid bytes at the start of `buf`
    pub len: usize,
}

impl AudioCvt {
    /// Build the converter from `src` to `dst`, without any data yet
    pub fn new(src: &AudioSpec, dst: &AudioSpec) -> CvtResult<Self> {
        Ok(Self {
            plan: Some(Plan::build(src, dst)?),
            buf: None,
            len: 0,
        })
    }
    /// Set the data to convert
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.len = data.len();
        self.buf = Some(data);
    }
    /// The valid data in the buffer
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.buf.as_deref().map_or(&[][..], |buf| &buf[..self.len.min(buf.len())])
    }
    /// Take out the buffer, trimmed to the valid data
    pub fn take_data(&mut self) -> Option<Vec<u8>> {
        let mut buf = self.buf.take()?;
        buf.truncate(self.len);
        self.len = 0;
        Some(buf)
    }
    /// Convert the buffer in place, returning the new length
    pub fn convert(&mut self) -> CvtResult<usize> {
        let plan = self.plan.as_ref().ok_or(CvtError::NullPlan)?;
        let buf = self.buf.as_mut().ok_or(CvtError::NullBuffer)?;
        let len = self.len.min(buf.len());
        let needed = plan.required_len(len);
        if buf.len() < needed {
            buf.resize(needed, 0);
        }
        self.len = plan.run(buf, len)?;
        Ok(self.len)
    }
}

/// Build a conversion plan from raw format words, channel counts and rates.
///
/// With the `tracing` feature, the request and the chosen adapters are logged at debug level.
pub fn build_converter(
    src_format: u16,
    src_channels: u8,
    src_rate: u32,
    dst_format: u16,
    dst_channels: u8,
    dst_rate: u32,
) -> CvtResult<Plan> {
    let src = AudioSpec::new(
        AudioFormat::from_bits_retain(src_format),
        src_channels,
        src_rate,
    );
    let dst = AudioSpec::new(
        AudioFormat::from_bits_retain(dst_format),
        dst_channels,
        dst_rate,
    );
    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Building converter: {} {}ch {}Hz -> {} {}ch {}Hz",
        format_name(src.format),
        src.channels,
        src.rate,
        format_name(dst.format),
        dst.channels,
        dst.rate
    );
    let plan = Plan::build(&src, &dst);
    #[cfg(feature = "tracing")]
    match &plan {
        Ok(plan) => {
            for name in plan.stage_names() {
                tracing::debug!("    {name}");
            }
            tracing::debug!(
                multiplier = plan.multiplier(),
                headroom = plan.headroom(),
                "converter ready"
            );
        }
        Err(e) => tracing::debug!("Converter build failed: {e}"),
    }
    plan
}

const FORMAT_NAMES: [(AudioFormat, &str); 7] = [
    (AudioFormat::U8, "U8"),
    (AudioFormat::S8, "S8"),
    (AudioFormat::U16LSB, "U16LSB"),
    (AudioFormat::S16LSB, "S16LSB"),
    (AudioFormat::U16MSB, "U16MSB"),
    (AudioFormat::S16MSB, "S16MSB"),
    (AudioFormat::F32SYS, "F32"),
];

/// Human readable name of a format word, `"??????"` for unknown ones
#[must_use]
pub fn format_name(format: AudioFormat) -> &'static str {
    FORMAT_NAMES
        .iter()
        .find(|(fmt, _)| *fmt == format)
        .map_or("??????", |&(_, name)| name)
}

#[test]
fn test_format_name() {
    assert_eq!(format_name(AudioFormat::S16MSB), "S16MSB");
    assert_eq!(format_name(AudioFormat::F32SYS), "F32");
    assert_eq!(format_name(AudioFormat::BITS_8 | AudioFormat::FLOAT), "??????");
}

#[test]
fn test_missing_parts() {
    let mut cvt = AudioCvt::default();
    assert_eq!(cvt.convert(), Err(CvtError::NullPlan));
    let spec = AudioSpec::new(AudioFormat::U8, 1, 8000);
    let mut cvt = AudioCvt::new(&spec, &spec).unwrap();
    assert_eq!(cvt.convert(), Err(CvtError::NullBuffer));
    cvt.set_data(vec![1, 2, 3]);
    assert_eq!(cvt.convert(), Ok(3));
    assert_eq!(cvt.take_data(), Some(vec![1, 2, 3]));
}

#[test]
fn test_build_converter() {
    let plan = build_converter(0x0008, 1, 8000, AudioFormat::S16SYS.bits(), 2, 16_000).unwrap();
    assert_eq!(plan.stages().len(), 4);
    assert!(matches!(
        build_converter(0x0018, 1, 8000, 0x8010, 1, 8000),
        Err(CvtError::InvalidFormat(_))
    ));
    assert!(build_converter(0x8010, 1, 8000, 0x8010, 3, 8000).is_err());
}
