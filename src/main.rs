use clap::Parser;
use lastfm_etl::core::loader::RecordLoader;
use lastfm_etl::domain::model::Table;
use lastfm_etl::utils::logger;
use lastfm_etl::{EtlEngine, EtlError, IngestArgs, IngestPipeline, LocalStorage};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = IngestArgs::parse();

    logger::init(args.verbose, args.log_json);
    tracing::info!("Starting lastfm-etl ingest");

    let settings = match args.resolve() {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };
    tracing::debug!("Ingest settings: {:?}", settings);

    if args.stats_only {
        let mut loader = RecordLoader::for_directory(&settings.source_root)
            .with_progress_interval(settings.progress_interval);

        let stats = match loader.statistics().await {
            Ok(stats) => stats,
            Err(e) => exit_with(&e),
        };
        println!("{}", "=".repeat(50));
        println!("Data Statistics:");
        println!("{}", "=".repeat(50));
        println!("Total Records: {}", stats.total_records);
        println!("Columns: {:?}", stats.columns);
        println!("Memory Usage: {:.2} MB", stats.memory_usage_mb);

        let table = loader.to_table().await?;
        print_preview(&table, args.preview);
        return Ok(());
    }

    // 輸出目錄作為 storage 根目錄
    let storage = LocalStorage::new(settings.output_dir());
    let pipeline = IngestPipeline::new(storage, settings);
    let engine = EtlEngine::new_with_monitoring(pipeline, args.monitor);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Data saved successfully!");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => exit_with(&e),
    }
}

fn print_preview(table: &Table, rows: usize) {
    let (height, width) = table.shape();
    println!("\nShape: ({}, {})", height, width);
    if rows == 0 || height == 0 {
        return;
    }

    println!("\nFirst few records:");
    println!("{}", table.columns.join(" | "));
    for row in table.rows.iter().take(rows) {
        println!("{}", row.join(" | "));
    }
}

fn exit_with(e: &EtlError) -> ! {
    tracing::error!(
        "❌ Ingest failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}
