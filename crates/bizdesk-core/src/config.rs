//! Configuration module
//!
//! This module provides configuration structures for the upload service:
//! server settings, storage locations, per-category size ceilings, request
//! limits and the bearer tokens accepted by the auth layer.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::*;
use crate::models::UploadCategory;

const DEFAULT_SERVER_PORT: u16 = 4000;

/// Base server configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

/// Per-category size ceilings, in bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadLimits {
    pub image_max_bytes: u64,
    pub document_max_bytes: u64,
    pub video_max_bytes: u64,
    pub receipt_max_bytes: u64,
    pub avatar_max_bytes: u64,
    pub generic_max_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            image_max_bytes: DEFAULT_IMAGE_MAX_MB * MIB,
            document_max_bytes: DEFAULT_DOCUMENT_MAX_MB * MIB,
            video_max_bytes: DEFAULT_VIDEO_MAX_MB * MIB,
            receipt_max_bytes: DEFAULT_RECEIPT_MAX_MB * MIB,
            avatar_max_bytes: DEFAULT_AVATAR_MAX_MB * MIB,
            generic_max_bytes: DEFAULT_GENERIC_MAX_MB * MIB,
        }
    }
}

impl UploadLimits {
    pub fn max_bytes_for(&self, category: UploadCategory) -> u64 {
        match category {
            UploadCategory::Image => self.image_max_bytes,
            UploadCategory::Document => self.document_max_bytes,
            UploadCategory::Video => self.video_max_bytes,
            UploadCategory::Receipt => self.receipt_max_bytes,
            UploadCategory::Avatar => self.avatar_max_bytes,
            UploadCategory::Generic => self.generic_max_bytes,
        }
    }

    /// Smallest request body that still fits every endpoint at its ceiling:
    /// the biggest single file, or a full batch of images or documents.
    pub fn default_body_limit(&self, max_files: usize) -> u64 {
        let files = max_files as u64;
        let batch = self
            .image_max_bytes
            .max(self.document_max_bytes)
            .saturating_mul(files);
        let single = [
            self.video_max_bytes,
            self.generic_max_bytes,
            self.receipt_max_bytes,
            self.avatar_max_bytes,
        ]
        .into_iter()
        .max()
        .unwrap_or(0);

        single.max(batch).saturating_add(MULTIPART_OVERHEAD_BYTES)
    }
}

/// Upload service configuration
#[derive(Clone, Debug)]
pub struct UploadServiceConfig {
    pub base: BaseConfig,
    pub upload_root: PathBuf,
    pub public_url_prefix: String,
    pub route_prefix: String,
    pub limits: UploadLimits,
    pub max_files_per_request: usize,
    pub upload_timeout_secs: u64,
    pub request_body_limit_bytes: u64,
    pub auth_tokens: Vec<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploadServiceConfig>);

impl Config {
    fn as_upload(&self) -> &UploadServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_upload().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = UploadServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_upload().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_upload().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_upload().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_upload().base.environment
    }

    pub fn upload_root(&self) -> &PathBuf {
        &self.as_upload().upload_root
    }

    pub fn public_url_prefix(&self) -> &str {
        &self.as_upload().public_url_prefix
    }

    pub fn route_prefix(&self) -> &str {
        &self.as_upload().route_prefix
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.as_upload().limits
    }

    pub fn max_files_per_request(&self) -> usize {
        self.as_upload().max_files_per_request
    }

    pub fn upload_timeout_secs(&self) -> u64 {
        self.as_upload().upload_timeout_secs
    }

    pub fn request_body_limit_bytes(&self) -> u64 {
        self.as_upload().request_body_limit_bytes
    }

    pub fn auth_tokens(&self) -> &[String] {
        &self.as_upload().auth_tokens
    }
}

fn is_production_env(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl UploadServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins = split_list(&cors_origins_str);

        let server_port = parse_or("PORT", DEFAULT_SERVER_PORT);

        let limits = UploadLimits {
            image_max_bytes: parse_or("IMAGE_MAX_SIZE_MB", DEFAULT_IMAGE_MAX_MB) * MIB,
            document_max_bytes: parse_or("DOCUMENT_MAX_SIZE_MB", DEFAULT_DOCUMENT_MAX_MB) * MIB,
            video_max_bytes: parse_or("VIDEO_MAX_SIZE_MB", DEFAULT_VIDEO_MAX_MB) * MIB,
            receipt_max_bytes: parse_or("RECEIPT_MAX_SIZE_MB", DEFAULT_RECEIPT_MAX_MB) * MIB,
            avatar_max_bytes: parse_or("AVATAR_MAX_SIZE_MB", DEFAULT_AVATAR_MAX_MB) * MIB,
            generic_max_bytes: parse_or("GENERIC_MAX_SIZE_MB", DEFAULT_GENERIC_MAX_MB) * MIB,
        };

        let max_files_per_request =
            parse_or("MAX_FILES_PER_REQUEST", DEFAULT_MAX_FILES_PER_REQUEST);
        let upload_timeout_secs = parse_or("UPLOAD_TIMEOUT_SECS", DEFAULT_UPLOAD_TIMEOUT_SECS);

        let request_body_limit_bytes = env::var("REQUEST_BODY_LIMIT_MB")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|mb| mb * MIB)
            .unwrap_or_else(|| limits.default_body_limit(max_files_per_request));

        let auth_tokens = env::var("AUTH_TOKENS")
            .map(|v| split_list(&v))
            .map_err(|_| anyhow::anyhow!("AUTH_TOKENS must be set"))?;

        Ok(Self {
            base: BaseConfig {
                server_port,
                cors_origins,
                environment,
            },
            upload_root: PathBuf::from(
                env::var("UPLOAD_ROOT").unwrap_or_else(|_| DEFAULT_UPLOAD_ROOT.to_string()),
            ),
            public_url_prefix: env::var("UPLOAD_PUBLIC_PREFIX")
                .unwrap_or_else(|_| DEFAULT_PUBLIC_URL_PREFIX.to_string()),
            route_prefix: env::var("UPLOAD_ROUTE_PREFIX")
                .unwrap_or_else(|_| DEFAULT_ROUTE_PREFIX.to_string()),
            limits,
            max_files_per_request,
            upload_timeout_secs,
            request_body_limit_bytes,
            auth_tokens,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.auth_tokens.is_empty() {
            return Err(anyhow::anyhow!(
                "AUTH_TOKENS must contain at least one token"
            ));
        }

        if is_production_env(&self.base.environment)
            && self.auth_tokens.iter().any(|t| t.len() < 32)
        {
            return Err(anyhow::anyhow!(
                "AUTH_TOKENS entries must be at least 32 characters long in production"
            ));
        }

        if self.upload_root.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_ROOT cannot be empty"));
        }

        if !self.public_url_prefix.starts_with('/') || self.public_url_prefix.ends_with('/') {
            return Err(anyhow::anyhow!(
                "UPLOAD_PUBLIC_PREFIX must start with '/' and must not end with '/'"
            ));
        }

        if !self.route_prefix.starts_with('/') || self.route_prefix.ends_with('/') {
            return Err(anyhow::anyhow!(
                "UPLOAD_ROUTE_PREFIX must start with '/' and must not end with '/'"
            ));
        }

        for category in UploadCategory::ALL {
            if self.limits.max_bytes_for(category) == 0 {
                return Err(anyhow::anyhow!(
                    "{}_MAX_SIZE_MB must be greater than 0",
                    category.as_str().to_uppercase()
                ));
            }
        }

        if self.max_files_per_request == 0 {
            return Err(anyhow::anyhow!("MAX_FILES_PER_REQUEST must be greater than 0"));
        }

        if self.upload_timeout_secs == 0 {
            return Err(anyhow::anyhow!("UPLOAD_TIMEOUT_SECS must be greater than 0"));
        }

        if self.request_body_limit_bytes == 0 {
            return Err(anyhow::anyhow!("REQUEST_BODY_LIMIT_MB must be greater than 0"));
        }

        Ok(())
    }
}
