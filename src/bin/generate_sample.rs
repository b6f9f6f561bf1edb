use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Physicochemical columns with (mean, std dev, min) for a quality-6 wine and
/// the shift per quality point above 6.
const FEATURES: [(&str, f64, f64, f64, f64); 11] = [
    ("fixed acidity", 6.85, 0.84, 3.8, -0.08),
    ("volatile acidity", 0.28, 0.10, 0.08, -0.02),
    ("citric acid", 0.33, 0.12, 0.0, 0.0),
    ("residual sugar", 6.4, 5.0, 0.6, -0.6),
    ("chlorides", 0.046, 0.022, 0.009, -0.004),
    ("free sulfur dioxide", 35.3, 17.0, 2.0, 0.0),
    ("total sulfur dioxide", 138.4, 42.5, 9.0, -8.0),
    ("density", 0.9940, 0.003, 0.987, -0.0008),
    ("pH", 3.19, 0.15, 2.72, 0.02),
    ("sulphates", 0.49, 0.11, 0.22, 0.01),
    ("alcohol", 10.5, 1.2, 8.0, 0.6),
];

/// Relative frequency of quality scores 3..=9.
const QUALITY_WEIGHTS: [(i64, f64); 7] = [
    (3, 0.004),
    (4, 0.033),
    (5, 0.297),
    (6, 0.449),
    (7, 0.180),
    (8, 0.036),
    (9, 0.001),
];

const ROWS: usize = 4898;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            // splitmix64
            x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = x;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            *slot = z ^ (z >> 31);
        }
        Self { state: s }
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

    fn quality(&mut self) -> i64 {
        let mut u = self.next_f64() * QUALITY_WEIGHTS.iter().map(|(_, w)| w).sum::<f64>();
        for &(q, w) in &QUALITY_WEIGHTS {
            if u < w {
                return q;
            }
            u -= w;
        }
        6
    }
}

/// Round to a fixed number of decimals so the CSV reads like the real file.
fn round_to(v: f64, decimals: i32) -> f64 {
    let p = 10f64.powi(decimals);
    (v * p).round() / p
}

fn decimals_for(name: &str) -> i32 {
    match name {
        "density" => 5,
        "chlorides" | "volatile acidity" | "citric acid" => 3,
        "free sulfur dioxide" | "total sulfur dioxide" => 0,
        _ => 2,
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(ROWS); FEATURES.len()];
    let mut quality: Vec<i64> = Vec::with_capacity(ROWS);

    for _ in 0..ROWS {
        let q = rng.quality();
        let delta = (q - 6) as f64;
        for (col, &(name, mean, sd, min, shift)) in columns.iter_mut().zip(&FEATURES) {
            let v = rng.gauss(mean + shift * delta, sd).max(min);
            col.push(round_to(v, decimals_for(name)));
        }
        quality.push(q);
    }

    // ---- CSV ----
    let csv_path = "sample_wine.csv";
    let mut writer = csv::Writer::from_path(csv_path).context("creating CSV output")?;
    let mut header: Vec<&str> = FEATURES.iter().map(|f| f.0).collect();
    header.push("quality");
    writer.write_record(&header)?;
    for i in 0..ROWS {
        let mut record: Vec<String> = columns.iter().map(|c| c[i].to_string()).collect();
        record.push(quality[i].to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;

    // ---- Parquet ----
    let mut fields: Vec<Field> = FEATURES
        .iter()
        .map(|f| Field::new(f.0, DataType::Float64, false))
        .collect();
    fields.push(Field::new("quality", DataType::Int64, false));
    let schema = Arc::new(Schema::new(fields));

    let mut arrays: Vec<ArrayRef> = columns
        .into_iter()
        .map(|c| Arc::new(Float64Array::from(c)) as ArrayRef)
        .collect();
    arrays.push(Arc::new(Int64Array::from(quality)));

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let parquet_path = "sample_wine.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    println!("Wrote {ROWS} wines to {csv_path} and {parquet_path}");
    Ok(())
}
