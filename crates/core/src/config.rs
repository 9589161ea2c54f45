//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Public host name used in redirect `Location` headers.
    #[serde(default = "default_public_host")]
    pub public_host: String,
    /// Path (relative to the public host) of the static error asset.
    #[serde(default = "default_error_asset")]
    pub error_asset: String,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_public_host() -> String {
    "localhost".to_string()
}

fn default_error_asset() -> String {
    "error.svg".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_host: default_public_host(),
            error_asset: default_error_asset(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

impl ServerConfig {
    /// Validate server configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        let host = self.public_host.trim();
        if host.is_empty() {
            return Err("server.public_host cannot be empty".to_string());
        }
        if host.contains("://") || host.contains('/') {
            return Err(format!(
                "server.public_host must be a bare host name, got {:?}",
                self.public_host
            ));
        }
        if self.error_asset.trim_start_matches('/').is_empty() {
            return Err("server.error_asset cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for storage.
        path: PathBuf,
    },
    /// S3-compatible storage.
    S3 {
        /// Bucket name.
        bucket: String,
        /// Optional endpoint URL (for MinIO, etc.).
        endpoint: Option<String>,
        /// AWS region.
        region: Option<String>,
        /// Optional key prefix.
        prefix: Option<String>,
        /// Falls back to the ambient AWS credential chain if not set.
        access_key_id: Option<String>,
        /// Falls back to the ambient AWS credential chain if not set.
        secret_access_key: Option<String>,
        /// Force path-style URLs. Required for MinIO.
        #[serde(default)]
        force_path_style: bool,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/storage"),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::S3 {
                bucket,
                access_key_id,
                secret_access_key,
                ..
            } => {
                if bucket.trim().is_empty() {
                    return Err("s3 config requires a bucket name".to_string());
                }
                match (access_key_id.as_ref(), secret_access_key.as_ref()) {
                    (Some(_), Some(_)) | (None, None) => Ok(()),
                    _ => Err(
                        "s3 config requires both access_key_id and secret_access_key when either is set"
                            .to_string(),
                    ),
                }
            }
            _ => Ok(()),
        }
    }
}

/// Resampling filter used when resizing.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

/// Image codec tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CodecConfig {
    /// JPEG quality for the encode pass (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// JPEG quality for the recompression pass (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub recompress_jpeg_quality: u8,
    /// Lossy WebP quality (1-100).
    #[serde(default = "default_webp_quality")]
    pub webp_quality: u8,
    /// Lowest acceptable palette quality when recompressing PNG. Below it the
    /// input is kept as is.
    #[serde(default = "default_png_quality_min")]
    pub png_quality_min: u8,
    /// Palette quality the PNG quantizer aims for.
    #[serde(default = "default_png_quality_max")]
    pub png_quality_max: u8,
    #[serde(default)]
    pub resize_filter: ResizeFilter,
}

fn default_jpeg_quality() -> u8 {
    80
}

fn default_webp_quality() -> u8 {
    75
}

fn default_png_quality_min() -> u8 {
    60
}

fn default_png_quality_max() -> u8 {
    80
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
            recompress_jpeg_quality: default_jpeg_quality(),
            webp_quality: default_webp_quality(),
            png_quality_min: default_png_quality_min(),
            png_quality_max: default_png_quality_max(),
            resize_filter: ResizeFilter::default(),
        }
    }
}

impl CodecConfig {
    /// Validate codec settings.
    pub fn validate(&self) -> Result<(), String> {
        for (name, quality) in [
            ("codec.jpeg_quality", self.jpeg_quality),
            ("codec.recompress_jpeg_quality", self.recompress_jpeg_quality),
            ("codec.webp_quality", self.webp_quality),
            ("codec.png_quality_min", self.png_quality_min),
            ("codec.png_quality_max", self.png_quality_max),
        ] {
            if !(1..=100).contains(&quality) {
                return Err(format!("{name} must be between 1 and 100, got {quality}"));
            }
        }
        if self.png_quality_min > self.png_quality_max {
            return Err(format!(
                "codec.png_quality_min ({}) exceeds codec.png_quality_max ({})",
                self.png_quality_min, self.png_quality_max
            ));
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Codec configuration.
    #[serde(default)]
    pub codec: CodecConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses filesystem storage and a fixed public host.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig {
                public_host: "media.example.test".to_string(),
                ..ServerConfig::default()
            },
            storage: StorageConfig::default(),
            codec: CodecConfig::default(),
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.storage.validate()?;
        self.codec.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert!(config.metrics_enabled);
        assert_eq!(config.error_asset, "error.svg");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_config_rejects_bad_hosts() {
        for host in ["", "  ", "https://cdn.example.com", "cdn.example.com/img"] {
            let config = ServerConfig {
                public_host: host.to_string(),
                ..ServerConfig::default()
            };
            assert!(config.validate().is_err(), "host {host:?} should be rejected");
        }
    }

    #[test]
    fn test_app_config_deserialize_empty_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.codec.jpeg_quality, 80);
        assert_eq!(config.codec.webp_quality, 75);
        assert_eq!(
            (config.codec.png_quality_min, config.codec.png_quality_max),
            (60, 80)
        );
        assert_eq!(config.codec.resize_filter, ResizeFilter::Lanczos3);
        assert!(matches!(config.storage, StorageConfig::Filesystem { .. }));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_codec_config_rejects_out_of_range_quality() {
        let config = CodecConfig {
            jpeg_quality: 0,
            ..CodecConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CodecConfig {
            recompress_jpeg_quality: 101,
            ..CodecConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CodecConfig {
            webp_quality: 0,
            ..CodecConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_codec_config_rejects_inverted_png_range() {
        let config = CodecConfig {
            png_quality_min: 90,
            png_quality_max: 70,
            ..CodecConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("png_quality_min"));

        let config = CodecConfig {
            png_quality_min: 70,
            png_quality_max: 70,
            ..CodecConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resize_filter_parses_lowercase() {
        let config: CodecConfig = serde_json::from_str(r#"{"resize_filter":"catmullrom"}"#).unwrap();
        assert_eq!(config.resize_filter, ResizeFilter::CatmullRom);
    }

    #[test]
    fn test_storage_config_s3_validate_partial_credentials() {
        let invalid = StorageConfig::S3 {
            bucket: "bucket".to_string(),
            endpoint: None,
            region: None,
            prefix: None,
            access_key_id: Some("access-key".to_string()),
            secret_access_key: None,
            force_path_style: false,
        };
        assert!(invalid.validate().is_err());

        let valid = StorageConfig::S3 {
            bucket: "bucket".to_string(),
            endpoint: None,
            region: None,
            prefix: None,
            access_key_id: Some("access-key".to_string()),
            secret_access_key: Some("secret-key".to_string()),
            force_path_style: false,
        };
        assert!(valid.validate().is_ok());
    }

    #[test]
    fn test_storage_config_s3_force_path_style_defaults_to_false() {
        let json = r#"{"type":"s3","bucket":"media","endpoint":"http://localhost:9000"}"#;
        let config: StorageConfig = serde_json::from_str(json).unwrap();

        match config {
            StorageConfig::S3 {
                force_path_style,
                prefix,
                ..
            } => {
                assert!(!force_path_style);
                assert!(prefix.is_none());
            }
            _ => panic!("expected S3 config"),
        }
    }
}
