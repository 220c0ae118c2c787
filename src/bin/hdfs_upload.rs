use clap::Parser;
use lastfm_etl::core::transfer::{DockerHdfs, HdfsCliUploader, UploadOptions};
use lastfm_etl::domain::model::{StepOutcome, TransferReport, TransferTarget};
use lastfm_etl::utils::logger;
use lastfm_etl::{EtlError, HdfsUploadArgs, SystemCommandRunner};
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = HdfsUploadArgs::parse();
    logger::init(args.verbose, args.log_json);

    let settings = match args.resolve() {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };
    tracing::debug!("HDFS upload settings: {:?}", settings);

    let hdfs = DockerHdfs::new(
        SystemCommandRunner::new(),
        settings.docker_bin.clone(),
        settings.container.clone(),
    );
    let uploader = HdfsCliUploader::new(
        hdfs,
        UploadOptions {
            staging_dir: settings.staging_dir.clone(),
            cleanup_staged: settings.cleanup_staged,
            dry_run: args.dry_run,
        },
    );

    // 連線檢查失敗就不做任何傳輸步驟
    let checker = uploader.connection_checker(Duration::from_secs(settings.probe_timeout_secs));
    if let Err(e) = checker.check().await {
        exit_with(&e);
    }

    let target = TransferTarget::new(settings.local_file, settings.destination);
    match uploader.upload(&target).await {
        Ok(report) => print_report(&report, args.dry_run),
        Err(e) => exit_with(&e),
    }
}

fn print_report(report: &TransferReport, dry_run: bool) {
    for (step, outcome) in &report.steps {
        let status = match outcome {
            StepOutcome::Performed => "done".to_string(),
            StepOutcome::Skipped => "skipped (already present)".to_string(),
            StepOutcome::Planned => "would run".to_string(),
            StepOutcome::Warned(msg) => format!("warning: {}", msg),
            StepOutcome::Ignored(msg) => format!("ignored: {}", msg),
        };
        println!("  {:<22} {}", step.label(), status);
    }

    if let Some(listing) = &report.listing {
        println!("\n{}", listing);
    }

    if dry_run {
        println!("\n🔍 DRY RUN — nothing was changed");
    } else {
        println!(
            "\n🎉 DONE — Upload process completed in {}s",
            report.elapsed().num_seconds()
        );
    }
}

fn exit_with(e: &EtlError) -> ! {
    tracing::error!(
        "❌ Upload failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("\n❌ Error: {}", e.user_friendly_message());
    eprintln!("💡 {}\n", e.recovery_suggestion());
    std::process::exit(1);
}
