use std::path::Path;

use anyhow::{Context, Result};

use dolphot_explorer::data::fits::{write_binary_table_file, ColumnFormat, ColumnSpec};

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

const N_STARS: usize = 20_000;

/// Band name, magnitude offset from F814W, 50% completeness magnitude.
const BANDS: [(&str, f64, f64); 3] = [
    ("F475W", 0.0, 28.0),
    ("F658N", 0.2, 25.5),
    ("F814W", 0.0, 27.3),
];

const STATS: [&str; 7] = ["VEGA", "SNR", "SHARP", "ROUND", "CROWD", "ERR", "CHI"];

/// One band's DOLPHOT output for one star, in `STATS` order.
fn measure(rng: &mut SimpleRng, true_mag: f64, limit: f64) -> [f64; 7] {
    if true_mag > limit + rng.gauss(0.0, 0.3) {
        // Not recovered: DOLPHOT flags the magnitude with 99.999.
        return [99.999, 0.0, 0.0, 0.0, rng.next_f64() * 0.5, 9.9999, 0.0];
    }
    let err = (0.01 * 10f64.powf(0.4 * (true_mag - 24.0))).clamp(0.001, 0.5);
    let vega = true_mag + rng.gauss(0.0, err);
    let snr = 1.0857 / err;
    let sharp = if rng.next_f64() < 0.03 {
        rng.gauss(0.0, 0.5)
    } else {
        rng.gauss(0.0, 0.02 + err * 0.2)
    };
    let round = rng.gauss(0.0, 0.1).abs() + err;
    let crowd = -0.1 * rng.next_f64().max(1e-6).ln();
    let chi = 1.0 + rng.gauss(0.0, 0.3).abs();
    [vega, snr, sharp, round, crowd, err, chi]
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let mut x = Vec::with_capacity(N_STARS);
    let mut y = Vec::with_capacity(N_STARS);
    // columns[band][stat] -> values
    let mut columns: Vec<Vec<Vec<f64>>> =
        vec![vec![Vec::with_capacity(N_STARS); STATS.len()]; BANDS.len()];

    for _ in 0..N_STARS {
        x.push(rng.next_f64() * 4096.0);
        y.push(rng.next_f64() * 4096.0);

        // Main sequence with a red giant branch on top.
        let m814 = 19.0 + 9.0 * rng.next_f64().sqrt();
        let color = if rng.next_f64() < 0.1 {
            rng.gauss(1.4, 0.1)
        } else {
            0.3 + 0.15 * (m814 - 19.0) + rng.gauss(0.0, 0.05)
        };

        for (b, &(band, offset, limit)) in BANDS.iter().enumerate() {
            let true_mag = match band {
                "F475W" => m814 + color,
                _ => m814 + offset + rng.gauss(0.0, 0.1),
            };
            for (s, value) in measure(&mut rng, true_mag, limit).into_iter().enumerate() {
                columns[b][s].push(value);
            }
        }
    }

    let names: Vec<Vec<String>> = BANDS
        .iter()
        .map(|(band, _, _)| STATS.iter().map(|s| format!("{band}_{s}")).collect())
        .collect();

    let mut specs = vec![
        ColumnSpec {
            name: "X",
            format: ColumnFormat::F64,
            values: &x,
        },
        ColumnSpec {
            name: "Y",
            format: ColumnFormat::F64,
            values: &y,
        },
    ];
    for (band_names, band_values) in names.iter().zip(&columns) {
        for (name, values) in band_names.iter().zip(band_values) {
            specs.push(ColumnSpec {
                name,
                format: ColumnFormat::F32,
                values,
            });
        }
    }

    let dir = Path::new("gst");
    std::fs::create_dir_all(dir).context("creating gst directory")?;
    let output_path = dir.join("HODGE6.gst.fits");
    write_binary_table_file(&output_path, Some("PHOTOMETRY"), &specs)
        .with_context(|| format!("writing {}", output_path.display()))?;

    println!(
        "Wrote {N_STARS} sources ({} columns) to {}",
        specs.len(),
        output_path.display()
    );
    Ok(())
}
