use anyhow::Result;
use campus_storage::storage::MockStorage;
use campus_storage::{StorageEndpointConfig, UploadPipeline, UploadRequest};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "campus-storage")]
#[command(about = "Upload a file to object storage and print its CDN URL")]
struct CliArgs {
    /// Local file to upload.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Override the content type guessed from the file extension.
    #[arg(long, value_name = "MIME")]
    content_type: Option<String>,

    /// Store into memory instead of the configured bucket.
    #[arg(long)]
    dry_run: bool,

    /// Print the full result as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_storage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = match StorageEndpointConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load storage configuration: {}", e);
            std::process::exit(1);
        }
    };

    let pipeline = if args.dry_run {
        info!("Dry run enabled, uploads stay in memory");
        UploadPipeline::with_storage(Arc::new(config), Box::new(MockStorage::new()))
    } else {
        UploadPipeline::new(config).await?
    };

    let mut request = UploadRequest::from_path(&args.file).await?;
    if let Some(content_type) = args.content_type {
        request = request.with_content_type(content_type);
    }

    match pipeline.upload(request).await {
        Ok(result) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.url);
            }
            Ok(())
        }
        Err(e) => {
            error!("Upload of {} failed: {}", args.file.display(), e);
            std::process::exit(1);
        }
    }
}
