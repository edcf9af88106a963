//! Choosing the adapters of a plan, and how much room they need.

use {
    super::{MAX_STAGES, Plan},
    crate::{
        Adapter, AudioFormat, AudioSpec, ChNum,
        rate::{
            FILTER_BYTES,
            fraction::{Fraction, MAX_RATIO, MIN_RATIO, find_fraction},
            polyphase::{Direction, PolyphaseTable},
        },
        result::{CvtError, CvtResult},
    },
    arrayvec::ArrayVec,
};

/// Sample format and channel number at some point of the plan
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Layout {
    format: AudioFormat,
    ch: ChNum,
}

struct Builder {
    stages: ArrayVec<Adapter, MAX_STAGES>,
    /// Growth so far: data is at most `len * mult + add` bytes long right now
    mult: f64,
    add: usize,
    peak_mult: f64,
    peak_add: usize,
    filter: Option<PolyphaseTable>,
}

pub fn build(src: AudioSpec, dst: AudioSpec) -> CvtResult<Plan> {
    let src_layout = Layout {
        format: src.format,
        ch: src.validate()?,
    };
    let dst_layout = Layout {
        format: dst.format,
        ch: dst.validate()?,
    };
    let mut b = Builder::new();
    if src.rate == dst.rate {
        b.convert_format(src_layout, dst_layout)?;
    } else {
        // Resample with as few channels as possible
        let ch = if src_layout.ch == ChNum::Stereo && dst_layout.ch == ChNum::Stereo {
            ChNum::Stereo
        } else {
            ChNum::Mono
        };
        let mid = Layout {
            format: AudioFormat::S16SYS,
            ch,
        };
        b.convert_format(src_layout, mid)?;
        b.convert_rate(src.rate, dst.rate, ch)?;
        b.convert_format(mid, dst_layout)?;
    }
    Ok(b.finish())
}

impl Builder {
    const fn new() -> Self {
        Self {
            stages: ArrayVec::new_const(),
            mult: 1.0,
            add: 0,
            peak_mult: 1.0,
            peak_add: 0,
            filter: None,
        }
    }
    fn push(&mut self, stage: Adapter) -> CvtResult {
        self.stages
            .try_push(stage)
            .map_err(|_| CvtError::TooManyStages)
    }
    /// The next stage halves the data
    const fn shrink(&mut self) {
        self.mult /= 2.0;
        self.add = self.add.div_ceil(2);
    }
    /// The next stage doubles the data
    const fn grow(&mut self) {
        self.mult *= 2.0;
        self.add *= 2;
        self.note_peak();
    }
    /// The next stage is a filter that may overshoot a bit
    const fn filter_slack(&mut self) {
        self.add += FILTER_BYTES;
        self.note_peak();
    }
    const fn note_peak(&mut self) {
        self.peak_mult = self.peak_mult.max(self.mult);
        if self.add > self.peak_add {
            self.peak_add = self.add;
        }
    }
    fn finish(self) -> Plan {
        Plan {
            stages: self.stages,
            multiplier: self.peak_mult,
            headroom: self.peak_add,
            filter: self.filter,
        }
    }
    /// Sample format and channel conversion at a fixed rate
    fn convert_format(&mut self, src: Layout, dst: Layout) -> CvtResult {
        if src == dst {
            return Ok(());
        }
        let mut src = src;
        if src.format.is_float() {
            self.push(Adapter::CutFloatTo16)?;
            self.shrink();
            src.format = AudioFormat::S16SYS;
        }
        let int_dst = Layout {
            format: if dst.format.is_float() {
                AudioFormat::S16SYS
            } else {
                dst.format
            },
            ch: dst.ch,
        };
        if src.format.is_8bit() || int_dst.format.is_8bit() {
            self.convert_8bit(src, int_dst)?;
        } else {
            self.convert_16bit(src, int_dst)?;
        }
        if dst.format.is_float() {
            self.push(Adapter::Expand16ToFloat)?;
            self.grow();
        }
        Ok(())
    }
    /// Conversions where either side is 8 bit go through 8 bit
    fn convert_8bit(&mut self, src: Layout, dst: Layout) -> CvtResult {
        if src.format.is_16bit() {
            self.push(if src.format.is_native_endian() {
                Adapter::Cut16To8
            } else {
                Adapter::Cut16To8Wrong
            })?;
            self.shrink();
        }
        if src.ch == ChNum::Stereo && dst.ch == ChNum::Mono {
            self.push(if src.format.is_signed() {
                Adapter::StereoToMonoS8
            } else {
                Adapter::StereoToMonoU8
            })?;
            self.shrink();
        }
        if src.format.is_signed() != dst.format.is_signed() {
            self.push(Adapter::SignFlip8)?;
        }
        if src.ch == ChNum::Mono && dst.ch == ChNum::Stereo {
            self.push(Adapter::MonoToStereo8)?;
            self.grow();
        }
        if !dst.format.is_8bit() {
            self.push(if dst.format.is_native_endian() {
                Adapter::Expand8To16
            } else {
                Adapter::Expand8To16Wrong
            })?;
            self.grow();
        }
        Ok(())
    }
    fn convert_16bit(&mut self, src: Layout, dst: Layout) -> CvtResult {
        if src.ch == ChNum::Stereo && dst.ch == ChNum::Mono {
            // Averaging needs native samples
            if !src.format.is_native_endian() {
                self.push(Adapter::SwapBytes)?;
            }
            self.push(if src.format.is_signed() {
                Adapter::StereoToMonoS16
            } else {
                Adapter::StereoToMonoU16
            })?;
            self.shrink();
            if !dst.format.is_native_endian() {
                self.push(Adapter::SwapBytes)?;
            }
        } else if src.format.is_native_endian() != dst.format.is_native_endian() {
            self.push(Adapter::SwapBytes)?;
        }
        if src.format.is_signed() != dst.format.is_signed() {
            // The native flip is used even when the data is byte swapped by now
            self.push(Adapter::SignFlip16)?;
        }
        if src.ch == ChNum::Mono && dst.ch == ChNum::Stereo {
            self.push(Adapter::MonoToStereo16)?;
            self.grow();
        }
        Ok(())
    }
    /// Rate conversion of signed 16 bit native samples
    #[allow(clippy::float_cmp)]
    fn convert_rate(&mut self, src_rate: u32, dst_rate: u32, ch: ChNum) -> CvtResult {
        let mut ratio = f64::from(dst_rate) / f64::from(src_rate);
        let up = ratio > 1.0;
        if !up {
            self.push(Adapter::Minus5Db)?;
        }
        // Exactly 2 and 1/2 are cheaper as a half-band stage than as a polyphase one
        let mut doublings = 0;
        while ratio > MAX_RATIO || ratio == 2.0 {
            ratio /= 2.0;
            doublings += 1;
        }
        let mut halvings = 0;
        while ratio < MIN_RATIO || ratio == 0.5 {
            ratio *= 2.0;
            halvings += 1;
        }
        let fraction = find_fraction(ratio);
        let variable = fraction.is_valid() && fraction != Fraction::ONE;
        if variable {
            let direction = if up { Direction::Up } else { Direction::Down };
            self.filter = Some(
                PolyphaseTable::new(ratio, direction)
                    .ok_or(CvtError::InvalidFormat("rate ratio has no fraction"))?,
            );
        }
        if up && variable {
            self.push(Adapter::VarRateUp(ch))?;
            self.grow();
            self.filter_slack();
        }
        for _ in 0..doublings {
            self.push(Adapter::DoubleRate(ch))?;
            self.grow();
            self.filter_slack();
        }
        for _ in 0..halvings {
            self.push(Adapter::HalfRate(ch))?;
            self.filter_slack();
        }
        if !up && variable {
            self.push(Adapter::VarRateDown(ch))?;
            self.filter_slack();
        }
        Ok(())
    }
}
