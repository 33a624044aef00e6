//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use sheetfmt_core::{BlobStore, S3Config};

use crate::process::Staging;

#[derive(Debug, Parser)]
#[command(name = "sheetfmt", version, about = "Apply the fixed report layout to xlsx workbooks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP service.
    Serve(ServeArgs),
    /// Read one serverless event from stdin and write the response to stdout.
    Event(EventArgs),
}

#[derive(Clone, Debug, Args)]
pub struct StagingArgs {
    /// Directory for staged workbooks (defaults to the system temp dir).
    #[arg(long, env = "SHEETFMT_TMP_DIR")]
    pub tmp_dir: Option<PathBuf>,
}

impl StagingArgs {
    pub fn staging(&self) -> Staging {
        Staging::new(self.tmp_dir.clone())
    }
}

#[derive(Clone, Debug, Args)]
pub struct StorageArgs {
    /// Bucket for the two-phase blob flow. Without it `/api/blob` is disabled.
    #[arg(long, env = "SHEETFMT_BUCKET")]
    pub bucket: Option<String>,

    #[arg(long, env = "SHEETFMT_REGION")]
    pub region: Option<String>,

    /// Endpoint of an S3-compatible service.
    #[arg(long, env = "SHEETFMT_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    #[arg(long, env = "SHEETFMT_S3_PATH_STYLE", default_value_t = false)]
    pub s3_path_style: bool,

    /// Lifetime of presigned URLs, in seconds.
    #[arg(long, env = "SHEETFMT_PRESIGN_SECS", default_value_t = 900)]
    pub presign_secs: u64,
}

impl StorageArgs {
    pub fn s3_config(&self) -> S3Config {
        let mut config = S3Config::new();
        if let Some(region) = &self.region {
            config = config.with_region(region.clone());
        }
        if let Some(endpoint) = &self.s3_endpoint {
            config = config.with_endpoint_url(endpoint.clone());
        }
        if self.s3_path_style {
            config = config.with_path_style();
        }
        config
    }

    pub async fn blob_store(&self) -> Option<BlobStore> {
        let bucket = self.bucket.as_ref()?;
        let expiry = Duration::from_secs(self.presign_secs);
        Some(BlobStore::connect(bucket.clone(), &self.s3_config(), expiry).await)
    }
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    #[arg(long, env = "SHEETFMT_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Largest accepted request body.
    #[arg(long, env = "SHEETFMT_MAX_BODY_BYTES", default_value_t = 32 * 1024 * 1024)]
    pub max_body_bytes: usize,

    #[command(flatten)]
    pub staging: StagingArgs,

    #[command(flatten)]
    pub storage: StorageArgs,
}

#[derive(Clone, Debug, Args)]
pub struct EventArgs {
    #[command(flatten)]
    pub staging: StagingArgs,
}
