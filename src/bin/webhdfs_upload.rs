use clap::Parser;
use lastfm_etl::core::rest_transfer::WebHdfsUploader;
use lastfm_etl::domain::model::TransferTarget;
use lastfm_etl::utils::logger;
use lastfm_etl::{EtlError, WebHdfsClient, WebHdfsUploadArgs};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = WebHdfsUploadArgs::parse();
    logger::init(args.verbose, args.log_json);

    let settings = match args.resolve() {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };

    let client = match WebHdfsClient::connect(&settings.url, &settings.user) {
        Ok(client) => {
            tracing::info!("✓ Connected to HDFS at {}", client.base_url());
            client
        }
        Err(e) => {
            eprintln!("❌ Could not connect to HDFS: {}", e);
            eprintln!("Make sure HDFS containers are running and accessible");
            std::process::exit(1);
        }
    };

    let uploader = WebHdfsUploader::new(client, settings.overwrite);
    let target = TransferTarget::new(settings.local_file, settings.destination);

    match uploader.upload(&target).await {
        Ok(info) => {
            println!("\nFile info:");
            println!("  Size: {} bytes", info.length);
            println!("  Path: {}", info.path);
        }
        Err(e) => exit_with(&e),
    }
}

fn exit_with(e: &EtlError) -> ! {
    tracing::error!("❌ Upload failed: {} (Category: {:?})", e, e.category());
    eprintln!("❌ Upload failed: {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}
