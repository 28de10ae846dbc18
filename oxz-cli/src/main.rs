//! OxZ benchmark harness
//!
//! Drives repeated encode/decode cycles over one input file through a
//! reused session pair and reports wall-clock timings. This binary is a
//! measurement tool; it contributes nothing to the session design.

use clap::Parser;
use oxz_stream::{Check, Decoder, Encoder, Options, DEFAULT_BUFFER_SIZE};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "oxz-bench")]
#[command(
    author,
    version,
    about = "Timing harness for OxZ streaming XZ sessions"
)]
struct Cli {
    /// Get encode timings
    #[arg(short, long)]
    encode: bool,

    /// Get decode timings
    #[arg(short, long)]
    decode: bool,

    /// Warm-up runs to perform
    #[arg(short, long, value_name = "RUNS", default_value_t = 100)]
    warm_up: u32,

    /// Number of runs to perform
    #[arg(short, long, value_name = "RUNS", default_value_t = 100)]
    runs: u32,

    /// Preset level (0-9)
    #[arg(short, long, default_value_t = 6)]
    preset: u32,

    /// File whose contents are compressed (and decompressed) each run
    input: PathBuf,
}

/// Timing summary over a set of runs, in nanoseconds.
struct Summary {
    min: u128,
    avg: u128,
    max: u128,
}

impl Summary {
    fn of(samples: &[u128]) -> Summary {
        let min = samples.iter().copied().min().unwrap_or(0);
        let max = samples.iter().copied().max().unwrap_or(0);
        let avg = if samples.is_empty() {
            0
        } else {
            samples.iter().sum::<u128>() / samples.len() as u128
        };
        Summary { min, avg, max }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = |nanos: u128| nanos as f64 / 1e6;
        write!(
            f,
            "min/avg/max = {:.4}ms/{:.4}ms/{:.4}ms",
            ms(self.min),
            ms(self.avg),
            ms(self.max)
        )
    }
}

fn encode_once(encoder: &Encoder, input: &[u8], out: &mut [u8]) -> Result<usize, oxz_stream::XzError> {
    encoder.set_input(input)?;
    encoder.finish();
    let mut total = 0;
    while !encoder.finished() {
        total += encoder.encode(&mut out[total..])?;
    }
    encoder.reset()?;
    Ok(total)
}

fn decode_once(decoder: &Decoder, input: &[u8], out: &mut [u8]) -> Result<usize, oxz_stream::XzError> {
    decoder.set_input(input)?;
    let mut total = 0;
    while !decoder.finished() {
        total += decoder.decode(&mut out[total..])?;
    }
    decoder.reset()?;
    Ok(total)
}

fn bench<F>(label: &str, warm_up: u32, runs: u32, mut body: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnMut() -> Result<usize, oxz_stream::XzError>,
{
    for _ in 0..warm_up {
        body()?;
    }
    let mut samples = Vec::with_capacity(runs as usize);
    let mut last_size = 0;
    for _ in 0..runs {
        let start = Instant::now();
        last_size = body()?;
        samples.push(start.elapsed().as_nanos());
    }
    println!(
        "{label}: {} ({} runs, {} bytes out)",
        Summary::of(&samples),
        runs,
        last_size
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let input = fs::read(&cli.input)?;

    // Neither direction requested: measure both.
    let (do_encode, do_decode) = if cli.encode || cli.decode {
        (cli.encode, cli.decode)
    } else {
        (true, true)
    };

    let capacity = DEFAULT_BUFFER_SIZE.max(input.len());
    let options = Options::from_preset(cli.preset)?;
    let encoder = Encoder::with_options(options, Check::Crc64, capacity)?;
    let mut encoded = vec![0u8; input.len() * 2 + 4096];

    if do_encode {
        let out = &mut encoded;
        bench("encode", cli.warm_up, cli.runs, || {
            encode_once(&encoder, &input, out)
        })?;
    }

    if do_decode {
        let encoded_len = encode_once(&encoder, &input, &mut encoded)?;
        let compressed = encoded[..encoded_len].to_vec();
        let decoder = Decoder::new()?;
        let mut out = vec![0u8; input.len().max(1)];
        bench("decode", cli.warm_up, cli.runs, || {
            decode_once(&decoder, &compressed, &mut out)
        })?;
        decoder.end();
    }

    encoder.end();
    Ok(())
}
