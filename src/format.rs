use crate::result::{CvtError, CvtResult};

/// Highest sample rate (in Hz) a [`Plan`](crate::Plan) can be built for (2^18)
pub const MAX_RATE: u32 = 1 << 18;

bitflags::bitflags! {
    /// Encoding of a single sample
    ///
    /// The bit layout follows the classic SDL audio format word, so raw format
    /// words coming from decoders can be used with [`AudioFormat::from_bits`].
    /// A valid format has exactly one of [`BITS_8`](Self::BITS_8),
    /// [`BITS_16`](Self::BITS_16) or [`FLOAT`](Self::FLOAT) set.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct AudioFormat: u16 {
        /// 8 bit integer samples
        const BITS_8     = 0x0008;
        /// 16 bit integer samples
        const BITS_16    = 0x0010;
        /// 32 bit floating point samples in native byte order
        const FLOAT      = 0x0020;
        /// Most significant byte first
        const BIG_ENDIAN = 0x1000;
        /// Signed samples
        const SIGNED     = 0x8000;

        /// Unsigned 8 bit
        const U8     = Self::BITS_8.bits();
        /// Signed 8 bit
        const S8     = Self::BITS_8.bits() | Self::SIGNED.bits();
        /// Unsigned 16 bit, little endian
        const U16LSB = Self::BITS_16.bits();
        /// Signed 16 bit, little endian
        const S16LSB = Self::BITS_16.bits() | Self::SIGNED.bits();
        /// Unsigned 16 bit, big endian
        const U16MSB = Self::BITS_16.bits() | Self::BIG_ENDIAN.bits();
        /// Signed 16 bit, big endian
        const S16MSB = Self::BITS_16.bits() | Self::BIG_ENDIAN.bits() | Self::SIGNED.bits();
        /// Unsigned 16 bit, native byte order
        const U16SYS = Self::BITS_16.bits() | NATIVE_ORDER;
        /// Signed 16 bit, native byte order
        const S16SYS = Self::BITS_16.bits() | NATIVE_ORDER | Self::SIGNED.bits();
        /// 32 bit float, native byte order
        const F32SYS = Self::FLOAT.bits() | NATIVE_ORDER | Self::SIGNED.bits();
    }
}

#[cfg(target_endian = "little")]
const NATIVE_ORDER: u16 = 0;
#[cfg(target_endian = "big")]
const NATIVE_ORDER: u16 = AudioFormat::BIG_ENDIAN.bits();

impl AudioFormat {
    /// Samples are 8 bit integers
    #[must_use]
    pub const fn is_8bit(self) -> bool {
        self.contains(Self::BITS_8)
    }
    /// Samples are 16 bit integers
    #[must_use]
    pub const fn is_16bit(self) -> bool {
        self.contains(Self::BITS_16)
    }
    /// Samples are 32 bit floats
    #[must_use]
    pub const fn is_float(self) -> bool {
        self.contains(Self::FLOAT)
    }
    /// Samples are signed
    #[must_use]
    pub const fn is_signed(self) -> bool {
        self.contains(Self::SIGNED)
    }
    /// Samples are stored in the byte order of the machine we run on
    #[must_use]
    pub const fn is_native_endian(self) -> bool {
        self.bits() & Self::BIG_ENDIAN.bits() == NATIVE_ORDER
    }
    /// Size of a single sample in bytes
    #[must_use]
    pub const fn sample_size(self) -> usize {
        if self.is_8bit() {
            1
        } else if self.is_16bit() {
            2
        } else {
            4
        }
    }
    fn validate(self) -> CvtResult {
        let width = [Self::BITS_8, Self::BITS_16, Self::FLOAT]
            .into_iter()
            .filter(|&w| self.contains(w))
            .count();
        if width == 1 {
            Ok(())
        } else {
            Err(CvtError::InvalidFormat(
                "format must be exactly one of 8 bit, 16 bit or float",
            ))
        }
    }
}

/// Channel number (mono or stereo)
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChNum {
    /// Monaural, one channel
    #[default]
    Mono = 1,
    /// Stereo, two channels
    Stereo = 2,
}

impl TryFrom<u8> for ChNum {
    type Error = CvtError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Mono),
            2 => Ok(Self::Stereo),
            _ => Err(CvtError::InvalidFormat("channel count must be 1 or 2")),
        }
    }
}

/// Describes a PCM stream: sample encoding, channel count and sample rate
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AudioSpec {
    /// Encoding of each sample
    pub format: AudioFormat,
    /// Number of interleaved channels
    ///
    /// Only 1 and 2 can be converted. This is kept as a raw number because
    /// decoders hand over whatever their container says.
    pub channels: u8,
    /// Samples per second (per channel)
    pub rate: u32,
}

impl AudioSpec {
    /// Create a new spec
    #[must_use]
    pub const fn new(format: AudioFormat, channels: u8, rate: u32) -> Self {
        Self {
            format,
            channels,
            rate,
        }
    }
    /// Size of one frame (one sample for every channel) in bytes
    #[must_use]
    pub const fn frame_size(&self) -> usize {
        self.format.sample_size() * self.channels as usize
    }
    /// Checks that the spec can take part in a conversion, and returns its channel number.
    pub(crate) fn validate(self) -> CvtResult<ChNum> {
        let ch = ChNum::try_from(self.channels)?;
        if self.rate == 0 || self.rate > MAX_RATE {
            return Err(CvtError::InvalidFormat("sample rate out of range"));
        }
        self.format.validate()?;
        Ok(ch)
    }
}

#[test]
fn test_predicates() {
    assert!(AudioFormat::U8.is_8bit());
    assert!(!AudioFormat::U8.is_signed());
    assert!(AudioFormat::S16MSB.is_16bit() && AudioFormat::S16MSB.is_signed());
    assert!(AudioFormat::F32SYS.is_float() && !AudioFormat::F32SYS.is_16bit());
    assert!(AudioFormat::S16SYS.is_native_endian());
    assert!(AudioFormat::U16SYS.is_native_endian());
    if cfg!(target_endian = "little") {
        assert!(AudioFormat::S16LSB.is_native_endian());
        assert!(!AudioFormat::U16MSB.is_native_endian());
    } else {
        assert!(!AudioFormat::S16LSB.is_native_endian());
        assert!(AudioFormat::U16MSB.is_native_endian());
    }
}

#[test]
fn test_validate() {
    let ok = AudioSpec::new(AudioFormat::S16LSB, 2, 44_100);
    assert_eq!(ok.validate(), Ok(ChNum::Stereo));
    assert_eq!(ok.frame_size(), 4);
    for bad in [
        AudioSpec::new(AudioFormat::S16LSB, 0, 44_100),
        AudioSpec::new(AudioFormat::S16LSB, 3, 44_100),
        AudioSpec::new(AudioFormat::S16LSB, 1, 0),
        AudioSpec::new(AudioFormat::S16LSB, 1, MAX_RATE + 1),
        AudioSpec::new(AudioFormat::SIGNED, 1, 8000),
        AudioSpec::new(AudioFormat::BITS_8 | AudioFormat::BITS_16, 1, 8000),
    ] {
        assert!(matches!(bad.validate(), Err(CvtError::InvalidFormat(_))));
    }
    assert!(AudioSpec::new(AudioFormat::U8, 1, MAX_RATE).validate().is_ok());
}
