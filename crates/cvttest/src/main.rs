//! Testing utilities for pcmcvt

use {
    anstyle::AnsiColor,
    clap::Parser,
    pcmcvt::{AudioFormat, AudioSpec, CvtResult, Plan},
    std::{
        error::Error,
        io::{self},
        path::PathBuf,
    },
};

#[derive(clap::Parser)]
enum Args {
    /// Write the polyphase filter taps used between two rates
    DumpFilterTable {
        src_rate: u32,
        dst_rate: u32,
        out_path: PathBuf,
    },
    /// Compare the polyphase filter taps against a previously dumped clean file
    CompareFilterTable { src_rate: u32, dst_rate: u32 },
    /// Convert every 16 bit sample to each format and back, and check nothing changed
    RoundTrip,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    if let Err(e) = std::fs::create_dir_all(basedir()) {
        eprintln!("Error: Failed to create test dir: {e}");
    }
    match args {
        Args::DumpFilterTable {
            src_rate,
            dst_rate,
            out_path,
        } => dump_filter_table_file(src_rate, dst_rate, out_path)?,
        Args::CompareFilterTable { src_rate, dst_rate } => cmp_filter_table(src_rate, dst_rate)?,
        Args::RoundTrip => round_trip()?,
    }
    Ok(())
}

fn dump_filter_table_buf(src_rate: u32, dst_rate: u32) -> CvtResult<Vec<u8>> {
    let spec = |rate| AudioSpec::new(AudioFormat::S16SYS, 1, rate);
    let plan = Plan::build(&spec(src_rate), &spec(dst_rate))?;
    Ok(plan
        .filter()
        .map(|table| table.tap_bytes().to_vec())
        .unwrap_or_default())
}

fn dump_filter_table_file(
    src_rate: u32,
    dst_rate: u32,
    out_path: PathBuf,
) -> Result<(), Box<dyn Error>> {
    std::fs::write(out_path, dump_filter_table_buf(src_rate, dst_rate)?)?;
    Ok(())
}

fn basedir() -> PathBuf {
    std::env::temp_dir().join("pcmcvt-test")
}

fn cmp_filter_table(src_rate: u32, dst_rate: u32) -> Result<(), Box<dyn Error>> {
    let path = basedir().join(format!("clean-filter-{src_rate}-{dst_rate}.pcm"));
    if !path.exists() {
        return Err(format!("Need clean file at '{}'", path.display()).into());
    }
    let clean = std::fs::read(path)?;
    let dirty = dump_filter_table_buf(src_rate, dst_rate)?;
    if clean == dirty {
        pass("Filter tables match");
    } else {
        fail("Filter table mismatch");
    }
    Ok(())
}

fn round_trip() -> io::Result<()> {
    let all: Vec<i16> = (i16::MIN..=i16::MAX).collect();
    let native = AudioSpec::new(AudioFormat::S16SYS, 1, 44_100);
    for format in [
        AudioFormat::S16LSB,
        AudioFormat::S16MSB,
        AudioFormat::U16SYS,
        AudioFormat::F32SYS,
    ] {
        let name = pcmcvt::format_name(format);
        let other = AudioSpec::new(format, 1, 44_100);
        let (there, back) = match (Plan::build(&native, &other), Plan::build(&other, &native)) {
            (Ok(there), Ok(back)) => (there, back),
            (Err(e), _) | (_, Err(e)) => {
                fail(&format!("{name}: {e}"));
                continue;
            }
        };
        let mut buf: Vec<u8> = bytemuck::cast_slice(&all).to_vec();
        let len = buf.len();
        buf.resize(there.required_len(len).max(back.required_len(len * 2)), 0);
        let result = there
            .run(&mut buf, len)
            .and_then(|mid| back.run(&mut buf, mid));
        match result {
            Ok(out) if out == len && buf[..len] == *bytemuck::cast_slice::<i16, u8>(&all) => {
                pass(&format!("{name} round trip"));
            }
            Ok(_) => fail(&format!("{name} round trip changed the data")),
            Err(e) => fail(&format!("{name}: {e}")),
        }
    }
    Ok(())
}

fn pass(msg: &str) {
    let style = anstyle::Style::new()
        .fg_color(Some(anstyle::Color::Ansi(AnsiColor::Green)))
        .bold();
    eprintln!("{style}[PASS]{style:#} {msg}");
}

fn fail(msg: &str) {
    let style = anstyle::Style::new()
        .fg_color(Some(anstyle::Color::Ansi(AnsiColor::Red)))
        .bold();
    eprintln!("{style}[FAIL]{style:#} {msg}");
}
