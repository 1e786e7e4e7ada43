use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use range_filters::data::filter::filtered_indices;
use range_filters::data::loader::load_file;
use range_filters::{FieldSchema, FilterSession, FilterStore, Range, Statistics};

const USAGE: &str = "usage: range-filters <dataset.json|dataset.csv> [filters.json] [--modal]";

fn main() -> Result<()> {
    env_logger::init();

    let mut modal = false;
    let mut paths: Vec<PathBuf> = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--modal" => modal = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ => paths.push(PathBuf::from(arg)),
        }
    }
    let (dataset_path, store_path) = match paths.as_slice() {
        [dataset] => (dataset, None),
        [dataset, store] => (dataset, Some(store)),
        _ => bail!("{USAGE}"),
    };

    let dataset = load_file(dataset_path)
        .with_context(|| format!("loading {}", dataset_path.display()))?;
    log::info!(
        "Loaded {} samples with {} fields from {}",
        dataset.len(),
        dataset.field_paths.len(),
        dataset_path.display()
    );

    let schema = FieldSchema::infer(&dataset);
    let statistics = Statistics::compute(&dataset, &schema);
    let mut session = FilterSession::new(schema, statistics);
    if let Some(store_path) = store_path {
        let store = FilterStore::load(store_path)?;
        log::info!("Loaded {} filters from {}", store.len(), store_path.display());
        session = session.with_store(store);
    }

    let view = if modal { "modal" } else { "grid" };
    println!("{view} view");
    let paths: Vec<String> = session.schema().numeric_paths().map(str::to_string).collect();
    for path in &paths {
        let filter = session.filter(path, modal, None);
        let ty = session
            .schema()
            .element_type(path)
            .map_or_else(String::new, |t| t.to_string());
        println!(
            "  {path:<24} {ty:<12} bounds {:<24} range {:<24} none {:<5} filtered {}",
            fmt_range(&session.bounds(path, None)),
            fmt_range(&filter.range),
            filter.none,
            session.is_filtered(path, modal, None),
        );
    }

    let visible = filtered_indices(&dataset, &session, modal);
    println!("{} of {} samples pass the active filters", visible.len(), dataset.len());
    Ok(())
}

fn fmt_range(range: &Range) -> String {
    let side = |v: Option<f64>| v.map_or_else(|| "null".to_string(), |x| format!("{x}"));
    format!("[{}, {}]", side(range[0]), side(range[1]))
}
