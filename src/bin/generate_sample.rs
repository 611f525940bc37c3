//! Write a synthetic dataset with the Pima Indians diabetes schema.
//!
//! Run: cargo run --bin generate_sample [-- out_dir]
//!
//! Produces `diabetes.csv` and `diabetes.parquet` (768 records) in `out_dir`
//! (default `data/`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 768;

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

    /// A clamped, rounded normal draw; `missing` is the chance of a 0 reading,
    /// as the Pima survey codes missing measurements.
    fn reading(&mut self, mean: f64, std_dev: f64, lo: f64, hi: f64, missing: f64) -> f64 {
        if self.next_f64() < missing {
            return 0.0;
        }
        self.gauss(mean, std_dev).clamp(lo, hi).round()
    }
}

#[derive(Default)]
struct Columns {
    pregnancies: Vec<i64>,
    glucose: Vec<i64>,
    blood_pressure: Vec<i64>,
    skin_thickness: Vec<i64>,
    insulin: Vec<i64>,
    bmi: Vec<f64>,
    pedigree: Vec<f64>,
    age: Vec<i64>,
    outcome: Vec<i64>,
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();
    for _ in 0..ROWS {
        let age = rng.gauss(33.0, 11.0).clamp(21.0, 81.0).round();
        let pregnancies = (rng.gauss((age - 21.0) / 5.0, 2.5)).clamp(0.0, 17.0).round();
        let glucose = rng.reading(121.0, 31.0, 44.0, 199.0, 0.007);
        let bmi = if rng.next_f64() < 0.014 {
            0.0
        } else {
            (rng.gauss(32.0, 7.0).clamp(18.2, 67.1) * 10.0).round() / 10.0
        };
        let pedigree = (rng.gauss(0.47, 0.33).clamp(0.078, 2.42) * 1000.0).round() / 1000.0;

        // Logistic risk driven by glucose, BMI, age and family history.
        let g = if glucose > 0.0 { glucose } else { 121.0 };
        let b = if bmi > 0.0 { bmi } else { 32.0 };
        let logit = -8.4 + 0.035 * g + 0.09 * b + 0.015 * age + 0.9 * pedigree;
        let p = 1.0 / (1.0 + (-logit).exp());
        let outcome = i64::from(rng.next_f64() < p);

        cols.age.push(age as i64);
        cols.pregnancies.push(pregnancies as i64);
        cols.glucose.push(glucose as i64);
        cols.blood_pressure.push(rng.reading(72.0, 12.0, 24.0, 122.0, 0.045) as i64);
        cols.skin_thickness.push(rng.reading(29.0, 10.0, 7.0, 99.0, 0.29) as i64);
        cols.insulin.push(rng.reading(155.0, 110.0, 14.0, 846.0, 0.48) as i64);
        cols.bmi.push(bmi);
        cols.pedigree.push(pedigree);
        cols.outcome.push(outcome);
    }
    cols
}

fn to_batch(cols: Columns) -> Result<RecordBatch> {
    let int = |name: &str| Field::new(name, DataType::Int64, false);
    let float = |name: &str| Field::new(name, DataType::Float64, false);
    let schema = Arc::new(Schema::new(vec![
        int("Pregnancies"),
        int("Glucose"),
        int("BloodPressure"),
        int("SkinThickness"),
        int("Insulin"),
        float("BMI"),
        float("DiabetesPedigreeFunction"),
        int("Age"),
        int("Outcome"),
    ]));
    let arrays: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(cols.pregnancies)),
        Arc::new(Int64Array::from(cols.glucose)),
        Arc::new(Int64Array::from(cols.blood_pressure)),
        Arc::new(Int64Array::from(cols.skin_thickness)),
        Arc::new(Int64Array::from(cols.insulin)),
        Arc::new(Float64Array::from(cols.bmi)),
        Arc::new(Float64Array::from(cols.pedigree)),
        Arc::new(Int64Array::from(cols.age)),
        Arc::new(Int64Array::from(cols.outcome)),
    ];
    RecordBatch::try_new(schema, arrays).context("building record batch")
}

fn write_csv(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).context("creating CSV file")?;
    let mut writer = arrow::csv::WriterBuilder::new().with_header(true).build(file);
    writer.write(batch).context("writing CSV")
}

fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let batch = to_batch(generate(&mut rng))?;

    let csv_path = out_dir.join("diabetes.csv");
    let parquet_path = out_dir.join("diabetes.parquet");
    write_csv(&batch, &csv_path)?;
    write_parquet(&batch, &parquet_path)?;

    log::info!("schema: {:?}", batch.schema());
    println!(
        "Wrote {} records to {} and {}",
        batch.num_rows(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
