mod builder;

use {
    crate::{
        Adapter, AudioSpec, Mode,
        rate::polyphase::PolyphaseTable,
        result::{CvtError, CvtResult},
    },
    arrayvec::ArrayVec,
    std::fmt,
};

/// Most adapters a [`Plan`] can hold
pub const MAX_STAGES: usize = 32;

/// An ordered list of in-place [`Adapter`]s that converts one [`AudioSpec`] into another.
///
/// A plan also knows how much bigger the data can get while it runs
/// (see [`required_len`](Self::required_len)), so one buffer can be converted in place.
#[derive(Clone, Debug)]
pub struct Plan {
    stages: ArrayVec<Adapter, MAX_STAGES>,
    multiplier: f64,
    headroom: usize,
    filter: Option<PolyphaseTable>,
}

impl Plan {
    /// Build the plan that converts `src` into `dst`.
    ///
    /// Fails with [`CvtError::InvalidFormat`] for channel counts other than 1 or 2,
    /// sample rates of 0 or above [`MAX_RATE`](crate::MAX_RATE), and format words that
    /// don't name exactly one sample width.
    pub fn build(src: &AudioSpec, dst: &AudioSpec) -> CvtResult<Self> {
        builder::build(*src, *dst)
    }
    /// The adapters, in the order they run
    #[must_use]
    pub fn stages(&self) -> &[Adapter] {
        &self.stages
    }
    /// Names of the adapters, in the order they run
    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|stage| stage.name())
    }
    /// Whether the plan leaves the data as is
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        self.stages.is_empty()
    }
    /// The most the data can grow by, as a factor of the input length
    #[must_use]
    pub const fn multiplier(&self) -> f64 {
        self.multiplier
    }
    /// Extra bytes the filters may need on top of [`multiplier`](Self::multiplier)
    #[must_use]
    pub const fn headroom(&self) -> usize {
        self.headroom
    }
    /// The polyphase filter of the variable rate stage, if there is one
    #[must_use]
    pub const fn filter(&self) -> Option<&PolyphaseTable> {
        self.filter.as_ref()
    }
    /// Bytes a buffer needs to convert `len` bytes of input in place
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn required_len(&self, len: usize) -> usize {
        (len as f64 * self.multiplier).ceil() as usize + self.headroom
    }
    /// Convert the first `len` bytes of `buf` in place, returning the converted length.
    ///
    /// `buf` must be at least [`required_len(len)`](Self::required_len) long.
    pub fn run(&self, buf: &mut [u8], len: usize) -> CvtResult<usize> {
        self.run_mode(buf, len, Mode::empty())
    }
    /// Like [`run`](Self::run), but with a specific [`Mode`]
    pub fn run_mode(&self, buf: &mut [u8], len: usize, mode: Mode) -> CvtResult<usize> {
        let needed = self.required_len(len).max(len);
        if buf.len() < needed {
            return Err(CvtError::BufferTooSmall {
                needed,
                capacity: buf.len(),
            });
        }
        let filter = self.filter.as_ref();
        Ok(self.stages.iter().fold(len, |len, stage| {
            let out = stage.apply(buf, len, mode, filter);
            #[cfg(feature = "tracing")]
            tracing::trace!(stage = stage.name(), len, out, "ran stage");
            out
        }))
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Adapter List:")?;
        for name in self.stage_names() {
            writeln!(f, "    {name}")?;
        }
        write!(
            f,
            "Multiplier: {}, headroom: {} bytes",
            self.multiplier, self.headroom
        )
    }
}
