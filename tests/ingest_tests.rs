use anyhow::Result;
use lastfm_etl::config::IngestSettings;
use lastfm_etl::core::loader::RecordLoader;
use lastfm_etl::{EtlEngine, IngestPipeline, LocalStorage};
use std::fs;
use tempfile::TempDir;

fn write_tree(root: &std::path::Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
}

#[tokio::test]
async fn test_end_to_end_example_dataset() -> Result<()> {
    let source = TempDir::new()?;
    let output = TempDir::new()?;
    write_tree(
        source.path(),
        &[
            ("a.json", r#"{"id":1,"tags":["x"]}"#),
            ("b.json", "not valid json"),
        ],
    );

    let output_file = output.path().join("lastfm_data.csv");
    let settings = IngestSettings {
        source_root: source.path().to_string_lossy().into_owned(),
        output: output_file.to_string_lossy().into_owned(),
        progress_interval: 10_000,
    };

    let storage = LocalStorage::new(settings.output_dir());
    let engine = EtlEngine::new(IngestPipeline::new(storage, settings));
    let saved = engine.run().await?;

    assert_eq!(std::path::Path::new(&saved), output_file.as_path());

    let mut reader = csv::Reader::from_path(&output_file)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    assert_eq!(headers, vec!["id", "tags"]);

    let rows: Vec<csv::StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "1");
    assert_eq!(&rows[0][1], "['x']");
    Ok(())
}

#[tokio::test]
async fn test_valid_and_corrupt_files_are_counted() -> Result<()> {
    let source = TempDir::new()?;
    write_tree(
        source.path(),
        &[
            ("A/A/A/TRAAAAW128F429D538.json", r#"{"track_id":"TRAAAAW128F429D538","artist":"Casual"}"#),
            ("A/A/B/TRAAABD128F429CF47.json", r#"{"track_id":"TRAAABD128F429CF47","title":"Soul Deep"}"#),
            ("A/B/A/TRABACN128F425B784.json", r#"{"track_id":"TRABACN128F425B784","similars":[["TRAAAAW128F429D538",1]]}"#),
            ("A/B/B/broken.json", r#"{"track_id": "#),
            ("A/C/empty.json", ""),
            ("A/C/readme.txt", "not scanned"),
        ],
    );

    let mut loader =
        RecordLoader::for_directory(source.path().to_str().unwrap()).with_progress_interval(2);
    let report = loader.load_all().await?.clone();

    assert_eq!(report.discovered, 5);
    assert_eq!(report.loaded, 3);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(loader.records().len(), 3);

    let table = loader.to_table().await?;
    assert_eq!(
        table.columns,
        vec!["track_id", "artist", "title", "similars"]
    );
    assert_eq!(table.shape(), (3, 4));
    assert_eq!(
        table.column("artist").unwrap(),
        vec!["Casual", "", ""]
    );
    assert_eq!(
        table.column("similars").unwrap(),
        vec!["", "", "[['TRAAAAW128F429D538', 1]]"]
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_source_root_exports_nothing() -> Result<()> {
    let output = TempDir::new()?;
    let settings = IngestSettings {
        source_root: output.path().join("missing").to_string_lossy().into_owned(),
        output: output.path().join("out.csv").to_string_lossy().into_owned(),
        progress_interval: 1,
    };

    let storage = LocalStorage::new(settings.output_dir());
    let engine = EtlEngine::new(IngestPipeline::new(storage, settings));
    engine.run().await?;

    let written = fs::read(output.path().join("out.csv"))?;
    assert!(written.is_empty());
    Ok(())
}
