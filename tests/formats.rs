//! Loading the same data from CSV, JSON and Parquet files on disk.

use startup_benchmark::data::sample::{materialize, SampleTable};
use startup_benchmark::{Loader, LoaderConfig, Uploads};

fn config_for(dir: &std::path::Path, ext: &str) -> LoaderConfig {
    LoaderConfig {
        companies_file: format!("startups_clean.{ext}"),
        rounds_file: format!("rounds.{ext}"),
        ..LoaderConfig::strict(dir)
    }
}

#[test]
fn every_format_loads_the_same_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let mut loaded = Vec::new();

    for ext in ["csv", "json", "parquet"] {
        let config = config_for(dir.path(), ext);
        materialize(SampleTable::Companies, &config.companies_path()).unwrap();
        materialize(SampleTable::Rounds, &config.rounds_path()).unwrap();

        let mut loader = Loader::new(config);
        let dataset = loader.load(&Uploads::default()).unwrap();
        loaded.push(dataset);
    }

    assert_eq!(loaded[0].companies.len(), 5);
    assert_eq!(*loaded[0], *loaded[1]);
    assert_eq!(*loaded[0], *loaded[2]);
}

#[test]
fn sample_fallback_writes_parquet_when_parquet_is_configured() {
    let dir = tempfile::tempdir().unwrap();
    let config = LoaderConfig {
        companies_file: "startups_clean.parquet".to_string(),
        rounds_file: "rounds.parquet".to_string(),
        ..LoaderConfig::with_data_dir(dir.path())
    };
    let mut loader = Loader::new(config);
    let dataset = loader.load_disk().unwrap();
    assert!(dir.path().join("startups_clean.parquet").exists());
    assert_eq!(dataset.rounds.len(), 12);
}
