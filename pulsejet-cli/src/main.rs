//! pulsejet CLI - encode raw float PCM to pulsejet samples and back.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{ensure, Context};
use byteorder::{ByteOrder, LittleEndian};
use clap::Parser;
use pulsejet_codec::{Decoder, Encoder, EncoderConfig};
use pulsejet_core::{
    check_sample, check_sample_version, codec_version_string, library_version_string,
    sample_version_string,
};
use tracing::debug;

const SAMPLE_RATE: f64 = 44100.0;

/// Command-line arguments for the pulsejet tool.
#[derive(Parser, Debug)]
#[command(name = "pulsejet")]
#[command(version)]
#[command(about = "Encode raw 32-bit float PCM (44100hz mono) to pulsejet samples and back")]
#[command(long_about = "pulsejet encodes single-channel floating-point PCM into very small \
    lossy samples meant for size-constrained distribution.\n\n\
    EXAMPLES:\n    \
    pulsejet -e 64 input.raw output.pulsejet\n    \
    pulsejet -d input.pulsejet output.raw")]
struct Args {
    /// Encode at the given target bit rate in kbps
    #[arg(short = 'e', value_name = "KBPS", conflicts_with = "decode")]
    encode: Option<f64>,

    /// Decode an encoded sample back to raw PCM
    #[arg(short = 'd')]
    decode: bool,

    /// Input file (raw f32 PCM for encode, .pulsejet for decode)
    input: PathBuf,

    /// Output file
    output: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    // Any argument error, including a wrong argument count, exits with 1.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            process::exit(1);
        }
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    println!("library version: {}", library_version_string());
    println!("codec version: {}", codec_version_string());

    let result = match (args.encode, args.decode) {
        (Some(target_bit_rate), false) => encode_file(target_bit_rate, &args.input, &args.output),
        (None, true) => decode_file(&args.input, &args.output),
        _ => Err(anyhow::anyhow!("exactly one of -e <kbps> or -d is required")),
    };

    if let Err(err) = result {
        eprintln!("ERROR: {err:#}");
        process::exit(1);
    }
}

fn encode_file(target_bit_rate: f64, input: &Path, output: &Path) -> anyhow::Result<()> {
    let raw = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    ensure!(
        raw.len() % 4 == 0,
        "input size is not aligned to float size"
    );

    let mut samples = vec![0.0f32; raw.len() / 4];
    LittleEndian::read_f32_into(&raw, &mut samples);
    debug!(num_samples = samples.len(), target_bit_rate, "encoding");

    let encoder = Encoder::new(EncoderConfig {
        sample_rate: SAMPLE_RATE,
        target_bit_rate,
    });
    let encoded = encoder.encode(&samples);

    let bit_rate_estimate =
        encoded.total_bits_estimate / 1000.0 / (samples.len() as f64 / SAMPLE_RATE);
    println!(
        "compressed size estimate: {} byte(s) (~{:.4}kbps)",
        (encoded.total_bits_estimate / 8.0).ceil() as u64,
        bit_rate_estimate
    );

    fs::write(output, &encoded.data).with_context(|| format!("writing {}", output.display()))?;
    println!("encoded {} samples to {}", samples.len(), output.display());
    Ok(())
}

fn decode_file(input: &Path, output: &Path) -> anyhow::Result<()> {
    let data = fs::read(input).with_context(|| format!("reading {}", input.display()))?;

    ensure!(check_sample(&data), "input is not a pulsejet sample");
    if let Some(version) = sample_version_string(&data) {
        println!("sample version: {version}");
    }
    ensure!(
        check_sample_version(&data),
        "incompatible codec and sample versions"
    );

    let samples = Decoder::new().decode(&data)?;
    debug!(num_samples = samples.len(), "decoded");

    let mut raw = vec![0u8; samples.len() * 4];
    LittleEndian::write_f32_into(&samples, &mut raw);
    fs::write(output, &raw).with_context(|| format!("writing {}", output.display()))?;
    println!("decoded {} samples to {}", samples.len(), output.display());
    Ok(())
}
