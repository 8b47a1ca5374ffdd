//! Writes `sample_logger.tsv`: a two-day temperature log with the usual
//! defects of a real export (a doubled top header, comments, a logger
//! restart with a repeated header, a truncated timestamp and an over-long
//! row).

use std::fmt::Write as _;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

const HEADER: &str = "Logger-id\tDate_time\tTMP1\tTMP2\tTMP3\tTMP4\tVbatt";

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

/// Daily cycle around `base`, peaking mid-afternoon.
fn temperature(minutes: i64, base: f64, swing: f64, rng: &mut SimpleRng) -> f64 {
    let day_fraction = (minutes % 1440) as f64 / 1440.0;
    let phase = 2.0 * std::f64::consts::PI * (day_fraction - 0.375);
    base + swing * phase.sin() + rng.gauss(0.0, 0.15)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2023, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;

    let step_minutes = 10;
    let rows = 2 * 24 * 60 / step_minutes;
    let restart_at = rows / 2;

    let mut out = String::new();
    // Power-on twice before the first reading.
    writeln!(out, "{HEADER}")?;
    writeln!(out, "{HEADER}")?;

    let mut vbatt = 4180.0;
    for i in 0..rows {
        if i == restart_at {
            writeln!(out, "# restart, battery swapped")?;
            writeln!(out, "{HEADER}")?;
        }

        let minutes = (i * step_minutes) as i64;
        let ts = (start + Duration::minutes(minutes)).format("%Y-%m-%dT%H:%M:%S");
        vbatt -= 0.2 + rng.next_f64() * 0.1;

        let values: Vec<String> = [(21.0, 2.0), (22.5, 1.5), (19.0, 3.0), (25.0, 0.5)]
            .iter()
            .map(|&(base, swing)| format!("{:.2}", temperature(minutes, base, swing, &mut rng)))
            .collect();

        if i == 17 {
            // Truncated write.
            writeln!(out, "TL-0042\t2023-06-01T02:5\t{}", values.join("\t"))?;
            continue;
        }
        if i == 42 {
            writeln!(out, "TL-0042\t{ts}\t{}\t{:.0}\t0\t0", values.join("\t"), vbatt)?;
            continue;
        }
        writeln!(out, "TL-0042\t{ts}\t{}\t{:.0}", values.join("\t"), vbatt)?;
    }

    let output_path = "sample_logger.tsv";
    std::fs::write(output_path, out).with_context(|| format!("writing {output_path}"))?;

    println!("Wrote {rows} readings (restart after {restart_at}) to {output_path}");
    Ok(())
}
