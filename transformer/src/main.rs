use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use lambda_runtime::{run, service_fn, tracing, Error};

mod codec;
mod config;
mod error;
mod event_handler;
mod keys;
mod parquet_writer;
mod store;
mod table;
mod transformer;

use config::TransformerConfig;
use event_handler::function_handler;
use store::S3Store;
use transformer::RecordTransformer;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::subscriber::fmt().json().init();

    let config = TransformerConfig::from_env()?;
    tracing::info!(
        dest_bucket = %config.dest_bucket,
        excluded_fields = ?config.excluded_fields,
        "Loaded transformer config"
    );

    let shared_config = aws_config::load_defaults(BehaviorVersion::v2025_01_17()).await;
    let s3_client = S3Client::new(&shared_config);
    let transformer = RecordTransformer::new(S3Store::new(s3_client), config);
    run(service_fn(|event| function_handler(event, &transformer))).await
}
