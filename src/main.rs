use std::fs::File;
use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use csv::WriterBuilder;
use tracing::info;
use tracing_subscriber::EnvFilter;

use light_hst::anomaly::{HalfSpaceTree, HalfSpaceTreeConfig};
use light_hst::stream::data_stream::Target;
use light_hst::stream::iter_csv::IterCsv;

const USAGE: &str = "usage: light-hst <input.csv> <scores.csv> [config.json] [label_column]";

fn load_config(path: Option<&str>) -> Result<HalfSpaceTreeConfig<f32>> {
    let Some(path) = path else {
        return Ok(HalfSpaceTreeConfig::default());
    };
    let file = File::open(path).with_context(|| format!("cannot open config {}", path))?;
    serde_json::from_reader(file).with_context(|| format!("cannot parse config {}", path))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 4 {
        bail!(USAGE);
    }
    let input = Path::new(&args[0]);
    let output = Path::new(&args[1]);
    let config = load_config(args.get(2).map(String::as_str))?;
    let label = args.get(3).cloned();

    let mut hst: HalfSpaceTree<f32> = HalfSpaceTree::new(config)?;
    let rows: IterCsv<f32, _> = IterCsv::from_path(input, label.clone().map(Target::Name))
        .with_context(|| format!("cannot read {}", input.display()))?;
    let mut csv_writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(output)
        .with_context(|| format!("cannot create {}", output.display()))?;

    let start = Instant::now();
    let mut n_rows: usize = 0;
    for (index, row) in rows.enumerate() {
        let row = row.with_context(|| format!("bad record at row {}", index + 1))?;
        let score = hst.score_and_learn(row.get_x());
        match label.as_deref() {
            Some(name) => csv_writer.serialize((index, score, row.label(name).unwrap_or("")))?,
            None => csv_writer.serialize((index, score))?,
        }
        n_rows += 1;
    }
    csv_writer.flush()?;

    let elapsed = start.elapsed();
    info!(
        rows = n_rows,
        elapsed_ms = elapsed.as_millis() as u64,
        output = %output.display(),
        "scored stream"
    );
    Ok(())
}
