pub mod sample;

use {
    crate::{
        ChNum,
        rate::{self, polyphase::PolyphaseTable},
    },
    sample::{read, write},
};

bitflags::bitflags! {
    /// How a plan is run
    #[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
    pub struct Mode: u32 {
        /// The buffer holds a looping sound.
        ///
        /// Rate conversion filters wrap around the buffer edges instead of
        /// treating everything outside the buffer as silence.
        const LOOP = 0x2;
    }
}

/// A single in-place buffer transform.
///
/// Each adapter takes a byte buffer and the length of the valid data in it,
/// and returns the length of the valid data after the transform.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Adapter {
    /// 8 bit to 16 bit native byte order, the sample goes into the high byte
    Expand8To16,
    /// 8 bit to 16 bit, the sample goes into the low byte of a native word
    Expand8To16Wrong,
    /// Signed 16 bit to 32 bit float
    Expand16ToFloat,
    /// Swap the byte order of 16 bit samples
    SwapBytes,
    /// 16 bit to 8 bit by keeping the high byte of a native word
    Cut16To8,
    /// 16 bit to 8 bit by keeping the low byte of a native word
    Cut16To8Wrong,
    /// 32 bit float to signed 16 bit, clipping outside of `-1.0..=1.0`.
    ///
    /// In range values are rounded to the nearest integer, not truncated,
    /// so 16 bit samples survive a trip through float unchanged.
    CutFloatTo16,
    /// Flip the sign bit of native 16 bit samples
    SignFlip16,
    /// Flip the sign bit of byte swapped 16 bit samples
    SignFlip16Wrong,
    /// Flip the sign bit of 8 bit samples
    SignFlip8,
    /// Average signed 16 bit stereo frames into mono
    StereoToMonoS16,
    /// Average unsigned 16 bit stereo frames into mono
    StereoToMonoU16,
    /// Average signed 8 bit stereo frames into mono
    StereoToMonoS8,
    /// Average unsigned 8 bit stereo frames into mono
    StereoToMonoU8,
    /// Duplicate 16 bit mono samples into stereo frames
    MonoToStereo16,
    /// Duplicate 8 bit mono samples into stereo frames
    MonoToStereo8,
    /// Attenuate signed 16 bit samples by about 5 dB
    Minus5Db,
    /// Double the sample rate with a half-band filter
    DoubleRate(ChNum),
    /// Halve the sample rate with a half-band filter
    HalfRate(ChNum),
    /// Raise the sample rate by the plan's polyphase filter ratio
    VarRateUp(ChNum),
    /// Lower the sample rate by the plan's polyphase filter ratio
    VarRateDown(ChNum),
}

impl Adapter {
    /// Run the adapter over the first `len` bytes of `buf`.
    ///
    /// `buf` must be large enough to hold the output; rate adapters additionally need the
    /// plan's polyphase filter when they are variable rate ones. These are guaranteed when
    /// the adapter is run as part of a [`Plan`](crate::Plan).
    /// A variable rate adapter without a filter leaves the data as is (and panics in debug builds).
    pub fn apply(
        self,
        buf: &mut [u8],
        len: usize,
        mode: Mode,
        filter: Option<&PolyphaseTable>,
    ) -> usize {
        match self {
            Self::Expand8To16 => expand_8_to_16(buf, len, |b| u16::from(b) << 8),
            Self::Expand8To16Wrong => expand_8_to_16(buf, len, u16::from),
            Self::Expand16ToFloat => expand_16_to_float(buf, len),
            Self::SwapBytes => swap_bytes(buf, len),
            Self::Cut16To8 => cut_16_to_8(buf, len, |w| w.to_be_bytes()[0]),
            Self::Cut16To8Wrong => cut_16_to_8(buf, len, |w| w.to_le_bytes()[0]),
            Self::CutFloatTo16 => cut_float_to_16(buf, len),
            Self::SignFlip16 => change_signed(buf, len, 0x8000_8000),
            Self::SignFlip16Wrong => change_signed(buf, len, 0x0080_0080),
            Self::SignFlip8 => change_signed(buf, len, 0x8080_8080),
            Self::StereoToMonoS16 => stereo_to_mono::<i16>(buf, len),
            Self::StereoToMonoU16 => stereo_to_mono::<u16>(buf, len),
            Self::StereoToMonoS8 => stereo_to_mono::<i8>(buf, len),
            Self::StereoToMonoU8 => stereo_to_mono::<u8>(buf, len),
            Self::MonoToStereo16 => mono_to_stereo::<u16>(buf, len),
            Self::MonoToStereo8 => mono_to_stereo::<u8>(buf, len),
            Self::Minus5Db => minus_5db(buf, len),
            Self::DoubleRate(ch) => rate::run(buf, len, ch, mode, rate::Kernel::Double),
            Self::HalfRate(ch) => rate::run(buf, len, ch, mode, rate::Kernel::Half),
            Self::VarRateUp(ch) | Self::VarRateDown(ch) => {
                debug_assert!(filter.is_some(), "variable rate stage without a filter");
                filter.map_or(len, |filter| {
                    rate::run(buf, len, ch, mode, rate::Kernel::Var(filter))
                })
            }
        }
    }
    /// Short, stable name of this adapter for diagnostics
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Expand8To16 => "expand_8bit_to_16bit_sys",
            Self::Expand8To16Wrong => "expand_8bit_to_16bit_wrong",
            Self::Expand16ToFloat => "expand_16bit_to_float",
            Self::SwapBytes => "swap_bytes",
            Self::Cut16To8 => "cut_16bit_sys_to_8bit",
            Self::Cut16To8Wrong => "cut_16bit_wrong_to_8bit",
            Self::CutFloatTo16 => "cut_float_to_16bit",
            Self::SignFlip16 => "change_signed_16bit_sys",
            Self::SignFlip16Wrong => "change_signed_16bit_wrong",
            Self::SignFlip8 => "change_signed_8bit",
            Self::StereoToMonoS16 => "stereo_to_mono_s16bit",
            Self::StereoToMonoU16 => "stereo_to_mono_u16bit",
            Self::StereoToMonoS8 => "stereo_to_mono_s8bit",
            Self::StereoToMonoU8 => "stereo_to_mono_u8bit",
            Self::MonoToStereo16 => "mono_to_stereo_16bit",
            Self::MonoToStereo8 => "mono_to_stereo_8bit",
            Self::Minus5Db => "minus_5db",
            Self::DoubleRate(ChNum::Mono) => "double_rate_mono",
            Self::DoubleRate(ChNum::Stereo) => "double_rate_stereo",
            Self::HalfRate(ChNum::Mono) => "half_rate_mono",
            Self::HalfRate(ChNum::Stereo) => "half_rate_stereo",
            Self::VarRateUp(ChNum::Mono) => "var_rate_up_mono",
            Self::VarRateUp(ChNum::Stereo) => "var_rate_up_stereo",
            Self::VarRateDown(ChNum::Mono) => "var_rate_down_mono",
            Self::VarRateDown(ChNum::Stereo) => "var_rate_down_stereo",
        }
    }
}

// Growing transforms walk back to front, so no input is overwritten before it is read.

fn expand_8_to_16(buf: &mut [u8], len: usize, widen: impl Fn(u8) -> u16) -> usize {
    for i in (0..len).rev() {
        let b = buf[i];
        write(buf, i, widen(b));
    }
    2 * len
}

fn expand_16_to_float(buf: &mut [u8], len: usize) -> usize {
    for i in (0..len / 2).rev() {
        let s: i16 = read(buf, i);
        write(buf, i, f32::from(s) / 32767.0);
    }
    2 * len
}

fn swap_bytes(buf: &mut [u8], len: usize) -> usize {
    for pair in buf[..len].chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
    len
}

fn cut_16_to_8(buf: &mut [u8], len: usize, narrow: impl Fn(u16) -> u8) -> usize {
    let len = len / 2;
    for i in 0..len {
        let w: u16 = read(buf, i);
        buf[i] = narrow(w);
    }
    len
}

#[expect(clippy::cast_possible_truncation)]
fn cut_float_to_16(buf: &mut [u8], len: usize) -> usize {
    let len = len / 4;
    for i in 0..len {
        let f: f32 = read(buf, i);
        let s: i16 = if f > 1.0 {
            32767
        } else if f < -1.0 {
            -32768
        } else {
            (32767.0 * f).round() as i16
        };
        write(buf, i, s);
    }
    2 * len
}

/// XOR the buffer with `pattern` (a native 32 bit word), one word at a time
fn change_signed(buf: &mut [u8], len: usize, pattern: u32) -> usize {
    let mut words = buf[..len].chunks_exact_mut(4);
    for word in &mut words {
        let w = read::<u32>(word, 0) ^ pattern;
        write(word, 0, w);
    }
    // Odd number of samples left over
    let mask = pattern.to_ne_bytes();
    for (b, m) in words.into_remainder().iter_mut().zip(mask) {
        *b ^= m;
    }
    len
}

/// Integer sample types the channel adapters work on
trait Sample: bytemuck::Pod {
    fn mean(a: Self, b: Self) -> Self;
}

macro_rules! impl_sample {
    ($($t:ty),*) => {
        $(impl Sample for $t {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            fn mean(a: Self, b: Self) -> Self {
                ((i32::from(a) + i32::from(b)) >> 1) as Self
            }
        })*
    };
}

impl_sample!(i8, u8, i16, u16);

fn stereo_to_mono<T: Sample>(buf: &mut [u8], len: usize) -> usize {
    let frames = len / (2 * size_of::<T>());
    for i in 0..frames {
        let l: T = read(buf, 2 * i);
        let r: T = read(buf, 2 * i + 1);
        write(buf, i, T::mean(l, r));
    }
    frames * size_of::<T>()
}

fn mono_to_stereo<T: Sample>(buf: &mut [u8], len: usize) -> usize {
    let samples = len / size_of::<T>();
    for i in (0..samples).rev() {
        let s: T = read(buf, i);
        write(buf, 2 * i + 1, s);
        write(buf, 2 * i, s);
    }
    2 * len
}

fn minus_5db(buf: &mut [u8], len: usize) -> usize {
    for i in 0..len / 2 {
        let s: i16 = read(buf, i);
        write(buf, i, ((38084 * i32::from(s)) >> 16) as i16);
    }
    len
}
