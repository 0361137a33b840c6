use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Site name and its share of launches (weights need not sum to 1).
const SITES: [(&str, f64); 4] = [
    ("CCAFS LC-40", 0.45),
    ("VAFB SLC-4E", 0.18),
    ("KSC LC-39A", 0.24),
    ("CCAFS SLC-40", 0.13),
];

/// Booster generations in flight order: category, success probability, max payload (kg).
const BOOSTERS: [(&str, f64, f64); 5] = [
    ("v1.0", 0.2, 700.0),
    ("v1.1", 0.4, 4500.0),
    ("FT", 0.8, 6500.0),
    ("B4", 0.6, 9600.0),
    ("B5", 0.95, 9600.0),
];

struct Launch {
    flight_number: i64,
    site: &'static str,
    class: i64,
    payload: f64,
    booster_version: String,
    category: &'static str,
}

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

    /// Pick an entry according to its weight.
    fn weighted<'a>(&mut self, items: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = items.iter().map(|(_, w)| w).sum();
        let mut r = self.next_f64() * total;
        for (name, w) in items {
            if r < *w {
                return *name;
            }
            r -= w;
        }
        items[items.len() - 1].0
    }
}

fn generate_launches(n: usize, rng: &mut SimpleRng) -> Vec<Launch> {
    let mut site_weights = SITES.to_vec();
    (0..n)
        .map(|i| {
            // Later flights use later booster generations.
            let generation = (i * BOOSTERS.len() / n.max(1)).min(BOOSTERS.len() - 1);
            let (category, p_success, max_payload) = BOOSTERS[generation];

            // VAFB only opens after the first generation.
            site_weights[1].1 = if generation == 0 { 0.0 } else { SITES[1].1 };
            let site = rng.weighted(&site_weights);

            // Early test flights carried no payload.
            let payload = if generation == 0 && rng.next_f64() < 0.3 {
                0.0
            } else {
                (rng.next_f64() * max_payload).round()
            };
            let class = i64::from(rng.next_f64() < p_success);

            Launch {
                flight_number: i as i64 + 1,
                site,
                class,
                payload,
                booster_version: format!("F9 {category}  B{:04}", 1000 + i),
                category,
            }
        })
        .collect()
}

fn write_csv(path: &Path, launches: &[Launch]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record([
        "Flight Number",
        "Launch Site",
        "class",
        "Payload Mass (kg)",
        "Booster Version",
        "Booster Version Category",
    ])?;
    for l in launches {
        writer.write_record([
            l.flight_number.to_string(),
            l.site.to_string(),
            l.class.to_string(),
            format!("{:.1}", l.payload),
            l.booster_version.clone(),
            l.category.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, launches: &[Launch]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Flight Number", DataType::Int64, false),
        Field::new("Launch Site", DataType::Utf8, false),
        Field::new("class", DataType::Int64, false),
        Field::new("Payload Mass (kg)", DataType::Float64, false),
        Field::new("Booster Version", DataType::Utf8, false),
        Field::new("Booster Version Category", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(launches.iter().map(|l| l.flight_number))),
            Arc::new(StringArray::from_iter_values(launches.iter().map(|l| l.site))),
            Arc::new(Int64Array::from_iter_values(launches.iter().map(|l| l.class))),
            Arc::new(Float64Array::from_iter_values(launches.iter().map(|l| l.payload))),
            Arc::new(StringArray::from_iter_values(
                launches.iter().map(|l| l.booster_version.as_str()),
            )),
            Arc::new(StringArray::from_iter_values(launches.iter().map(|l| l.category))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let output = std::env::args().nth(1).unwrap_or_else(|| "spacex_launch_dash.csv".to_string());
    let output_path = Path::new(&output);

    let mut rng = SimpleRng::new(42);
    let launches = generate_launches(56, &mut rng);

    match output_path.extension().and_then(|e| e.to_str()) {
        Some("parquet") | Some("pq") => write_parquet(output_path, &launches)?,
        _ => write_csv(output_path, &launches)?,
    }

    let successes = launches.iter().filter(|l| l.class == 1).count();
    println!(
        "Wrote {} launches ({successes} successful) to {output}",
        launches.len()
    );
    Ok(())
}
