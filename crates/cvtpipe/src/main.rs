//! Command line raw PCM converter
#![forbid(unsafe_code)]

use {
    clap::Parser,
    pcmcvt::{AudioFormat, AudioSpec, Mode, Plan},
    std::{
        io::{ErrorKind, IsTerminal, Write as _},
        path::PathBuf,
    },
    tracing_subscriber::EnvFilter,
};

#[derive(Clone, Copy, clap::ValueEnum)]
enum Format {
    U8,
    S8,
    U16le,
    S16le,
    U16be,
    S16be,
    F32,
}

impl From<Format> for AudioFormat {
    fn from(fmt: Format) -> Self {
        match fmt {
            Format::U8 => Self::U8,
            Format::S8 => Self::S8,
            Format::U16le => Self::U16LSB,
            Format::S16le => Self::S16LSB,
            Format::U16be => Self::U16MSB,
            Format::S16be => Self::S16MSB,
            Format::F32 => Self::F32SYS,
        }
    }
}

#[derive(clap::Parser)]
struct Args {
    /// Path to raw (headerless) sample data
    path: PathBuf,
    /// Input sample format
    #[arg(short = 'f', long, value_enum, default_value = "s16le")]
    from: Format,
    /// Input channel count
    #[arg(short = 'c', long, default_value = "2")]
    from_channels: u8,
    /// Input sample rate
    #[arg(short = 'r', long, default_value = "44100")]
    from_rate: u32,
    /// Output sample format
    #[arg(short = 'F', long, value_enum, default_value = "s16le")]
    to: Format,
    /// Output channel count
    #[arg(short = 'C', long, default_value = "2")]
    to_channels: u8,
    /// Output sample rate
    #[arg(short = 'R', long, default_value = "48000")]
    to_rate: u32,
    /// The data is a seamless loop
    #[arg(long = "loop")]
    looping: bool,
    /// Don't print the conversion plan
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();
    let mut stderr = std::io::stderr().lock();
    let src = AudioSpec::new(args.from.into(), args.from_channels, args.from_rate);
    let dst = AudioSpec::new(args.to.into(), args.to_channels, args.to_rate);
    let plan = match Plan::build(&src, &dst) {
        Ok(plan) => plan,
        Err(e) => {
            writeln!(stderr, "Can't convert between these formats: {e}")?;
            return Err(std::io::Error::other("Converter build error"));
        }
    };
    if !args.quiet {
        writeln!(stderr, "File: {}\n{plan}", args.path.display())?;
    }
    let mut data = match std::fs::read(&args.path) {
        Ok(data) => data,
        Err(e) => {
            writeln!(stderr, "Failed to read '{}': {e}", args.path.display())?;
            return Err(std::io::Error::other("File read error"));
        }
    };
    // A trailing partial frame can't be converted
    let len = data.len() - data.len() % src.frame_size();
    data.resize(plan.required_len(len), 0);
    let mode = if args.looping {
        Mode::LOOP
    } else {
        Mode::empty()
    };
    let out_len = plan
        .run_mode(&mut data, len, mode)
        .map_err(std::io::Error::other)?;
    tracing::info!(in_bytes = len, out_bytes = out_len, "converted");

    let mut writer = std::io::stdout().lock();
    if writer.is_terminal() {
        writeln!(
            stderr,
            "You don't want to write sample data to a terminal. Trust me."
        )?;
        return Err(std::io::Error::other(
            "Attempting to write sample data to terminal",
        ));
    }
    if let Err(e) = writer.write_all(&data[..out_len]) {
        match e.kind() {
            ErrorKind::BrokenPipe => {}
            _ => return Err(e),
        }
    }
    writer.flush()
}
