//! Application configuration management.
//!
//! Configuration is loaded once at startup from a YAML file with environment variable overrides,
//! and is immutable for the lifetime of the process. The configuration file path defaults to
//! `config.yaml` (a missing file is fine) but can be specified via `-f` flag or `IMGSINK_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `IMGSINK_` override YAML values
//! 3. **BUCKET_NAME** and **PORT** - Unprefixed variables commonly injected by function hosts
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `IMGSINK_STORAGE__ENDPOINT_URL=http://localhost:9000` sets the `storage.endpoint_url` field.
//!
//! ## Example
//!
//! ```yaml
//! bucket_name: uploaded-images
//! max_upload_size: 10485760
//! storage:
//!   type: s3
//!   region: eu-north-1
//!   operation_timeout: 30s
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "IMGSINK_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Bucket every uploaded image is written to
    pub bucket_name: String,
    /// Largest accepted request body, in bytes
    pub max_upload_size: usize,
    /// Export traces over OTLP (configured through the standard `OTEL_*` variables)
    pub enable_otel_export: bool,
    /// Object store backend
    pub storage: StorageConfig,
}

/// Object store backend selection
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Any S3-compatible service, credentials from the AWS provider chain
    S3(S3Config),
    /// Process-local store, contents are lost on shutdown
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct S3Config {
    /// Custom endpoint for S3-compatible services (MinIO, GCS interoperability, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    /// Region override; otherwise resolved from the environment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`
    pub force_path_style: bool,
    /// Upper bound for a single write, including SDK-level attempts
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub operation_timeout: Option<Duration>,
    /// Attempts the SDK makes per write. The default of 1 means one upload, one attempt.
    pub max_attempts: u32,
    /// When the SDK adds integrity checksums to writes. Services that reject the SDK's default
    /// checksum headers, such as the GCS interoperability endpoint, need `when_required`.
    pub checksum_calculation: ChecksumCalculation,
}

/// Checksum policy for S3 requests and responses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumCalculation {
    /// Checksum every operation that supports one
    #[default]
    WhenSupported,
    /// Only checksum operations that require one
    WhenRequired,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            bucket_name: String::new(),
            max_upload_size: 32 * 1024 * 1024, // 32 MiB
            enable_otel_export: false,
            storage: StorageConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::S3(S3Config::default())
    }
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            region: None,
            force_path_style: false,
            operation_timeout: None,
            max_attempts: 1,
            checksum_calculation: ChecksumCalculation::default(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.bucket_name.trim().is_empty() {
            return Err(Error::Internal {
                operation: "validate config: bucket_name is not configured. \
                     Please set BUCKET_NAME environment variable or add bucket_name to config file."
                    .to_string(),
            });
        }

        if self.max_upload_size == 0 {
            return Err(Error::Internal {
                operation: "validate config: max_upload_size must be greater than 0".to_string(),
            });
        }

        if let StorageConfig::S3(s3) = &self.storage
            && s3.max_attempts == 0
        {
            return Err(Error::Internal {
                operation: "validate config: storage.max_attempts must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables override specific values. IMGSINK_CONFIG names the file itself.
            .merge(Env::prefixed("IMGSINK_").ignore(&["config"]).split("__"))
            // Conventional unprefixed variables
            .merge(Env::raw().only(&["BUCKET_NAME", "PORT"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
