use std::{env, time::Duration};

use anyhow::{Context, Result};

/// Everything the server reads from the environment, resolved once at
/// startup. External store ids/credentials stay optional so a partially
/// configured deployment still boots; the affected endpoints report the
/// missing piece at request time.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: String,
    pub admin_password: Option<String>,
    pub limited_password: Option<String>,
    pub jwt_secret: String,
    pub sheet: SheetConfig,
    pub drive: DriveConfig,
    pub comments_webhook_url: Option<String>,
    pub generate_webhook_url: Option<String>,
    /// Absolute base for image proxy URLs; empty means relative URLs.
    pub public_base_url: String,
    pub http_timeout: Duration,
}

/// Tabular store (Sheets-style values API).
#[derive(Clone, Debug)]
pub struct SheetConfig {
    pub api_base: String,
    pub sheet_id: Option<String>,
    /// Tab holding the product catalog, header-name mapped.
    pub product_tab: String,
    /// Tab the automation workflow appends comment rows to, positional.
    pub comments_tab: String,
    pub api_key: Option<String>,
}

/// File store (Drive-style API).
#[derive(Clone, Debug)]
pub struct DriveConfig {
    pub api_base: String,
    pub upload_base: String,
    pub access_token: Option<String>,
    pub folder_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let http_timeout = env::var("HTTP_TIMEOUT_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(30)
            .max(3);

        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()),
            admin_password: non_empty_env("APP_PASSWORD_ADMIN"),
            limited_password: non_empty_env("APP_PASSWORD_LIMITED"),
            jwt_secret: non_empty_env("JWT_SECRET")
                .unwrap_or_else(|| "change-me-in-production".to_string()),
            sheet: SheetConfig {
                api_base: trimmed_url_env("SHEET_API_BASE")
                    .unwrap_or_else(|| "https://sheets.googleapis.com/v4/spreadsheets".to_string()),
                sheet_id: non_empty_env("SHEET_ID"),
                product_tab: non_empty_env("SHEET_PRODUCT_TAB")
                    .unwrap_or_else(|| "Output".to_string()),
                comments_tab: non_empty_env("SHEET_COMMENTS_TAB")
                    .unwrap_or_else(|| "Comments".to_string()),
                api_key: non_empty_env("SHEET_API_KEY"),
            },
            drive: DriveConfig {
                api_base: trimmed_url_env("DRIVE_API_BASE")
                    .unwrap_or_else(|| "https://www.googleapis.com/drive/v3".to_string()),
                upload_base: trimmed_url_env("DRIVE_UPLOAD_BASE")
                    .unwrap_or_else(|| "https://www.googleapis.com/upload/drive/v3".to_string()),
                access_token: non_empty_env("DRIVE_ACCESS_TOKEN"),
                folder_id: non_empty_env("DRIVE_FOLDER_ID"),
            },
            comments_webhook_url: trimmed_url_env("COMMENTS_WEBHOOK_URL"),
            generate_webhook_url: trimmed_url_env("GENERATE_WEBHOOK_URL"),
            public_base_url: trimmed_url_env("PUBLIC_BASE_URL").unwrap_or_default(),
            http_timeout: Duration::from_secs(http_timeout),
        })
    }

    /// Auth is active as soon as either password is configured; without
    /// both, the API runs open (development mode).
    pub fn auth_enabled(&self) -> bool {
        self.admin_password.is_some() || self.limited_password.is_some()
    }

    pub fn build_http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .context("failed to build http client")
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn trimmed_url_env(key: &str) -> Option<String> {
    non_empty_env(key).map(|value| value.trim_end_matches('/').to_string())
}
