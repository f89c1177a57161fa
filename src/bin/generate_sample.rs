use std::path::PathBuf;

use anyhow::{Context, Result};
use getopts::Options;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One synthetic channel: a slow sine with noise.
struct Channel {
    amplitude: f64,
    period: f64,
    offset: f64,
    noise: f64,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let mut opts = Options::new();
    opts.optopt("r", "rows", "Number of data rows (default 100000)", "n");
    opts.optopt("c", "cols", "Number of value columns (default 10)", "n");
    opts.optopt("", "bad-every", "Write a non-numeric cell every n rows (default 997, 0 = never)", "n");
    opts.optopt("", "seed", "PRNG seed (default 42)", "n");
    opts.optflag("h", "help", "Show help");
    let matches = opts.parse(&args[1..]).context("parsing arguments")?;

    if matches.opt_present("help") {
        eprintln!("{}", opts.usage("Usage: generate_sample [options] [output.csv]"));
        return Ok(());
    }

    let parse = |name: &str, default: u64| -> Result<u64> {
        matches
            .opt_str(name)
            .map(|s| s.parse::<u64>().with_context(|| format!("invalid --{name} '{s}'")))
            .transpose()
            .map(|v| v.unwrap_or(default))
    };
    let rows = parse("rows", 100_000)?;
    let cols = parse("cols", 10)? as usize;
    let bad_every = parse("bad-every", 997)?;
    let seed = parse("seed", 42)?;
    let output = matches
        .free
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data.csv"));

    let mut rng = SimpleRng::new(seed);
    let channels: Vec<Channel> = (0..cols)
        .map(|i| Channel {
            amplitude: 1.0 + rng.next_f64() * 10.0 * (i + 1) as f64,
            period: 500.0 + rng.next_f64() * 20_000.0,
            offset: rng.gauss(0.0, 50.0),
            noise: 0.02 + rng.next_f64() * 0.2,
        })
        .collect();

    let mut writer = csv::WriterBuilder::new()
        .from_path(&output)
        .with_context(|| format!("creating {}", output.display()))?;

    let mut header = vec!["time".to_string()];
    header.extend((0..cols).map(|i| format!("ch{i}")));
    writer.write_record(&header)?;

    let mut record: Vec<String> = Vec::with_capacity(cols + 1);
    for row in 0..rows {
        record.clear();
        record.push(format!("{:.3}", row as f64 * 0.01));
        for (i, ch) in channels.iter().enumerate() {
            if bad_every > 0 && row % bad_every == (i as u64 % bad_every) && row > 0 {
                record.push("n/a".to_string());
                continue;
            }
            let phase = 2.0 * std::f64::consts::PI * row as f64 / ch.period;
            let value = ch.offset + ch.amplitude * phase.sin() + rng.gauss(0.0, ch.noise * ch.amplitude);
            record.push(format!("{value:.4}"));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;

    println!("Wrote {rows} rows x {cols} columns to {}", output.display());
    Ok(())
}
