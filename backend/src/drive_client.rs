use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use review_flow_shared::ops::StorageQuota;
use serde::Deserialize;

use crate::config::DriveConfig;

/// One file as listed by the store's search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct AboutResponse {
    #[serde(rename = "storageQuota", default)]
    storage_quota: QuotaFields,
}

#[derive(Debug, Default, Deserialize)]
struct QuotaFields {
    usage: Option<String>,
    limit: Option<String>,
}

/// Client for the external file store (uploads, SKU image search, content
/// download, quota).
#[derive(Clone)]
pub struct DriveClient {
    inner: Arc<DriveClientInner>,
}

struct DriveClientInner {
    client: reqwest::Client,
    config: DriveConfig,
}

impl DriveClient {
    pub fn new(client: reqwest::Client, config: DriveConfig) -> Self {
        Self {
            inner: Arc::new(DriveClientInner {
                client,
                config,
            }),
        }
    }

    fn token(&self) -> Result<&str> {
        self.inner
            .config
            .access_token
            .as_deref()
            .context("DRIVE_ACCESS_TOKEN is not configured")
    }

    /// Uploads one image into the configured folder and returns the new
    /// file id.
    pub async fn upload_image(&self, name: &str, mime: &str, data: Vec<u8>) -> Result<String> {
        let folder_id = self
            .inner
            .config
            .folder_id
            .as_deref()
            .context("DRIVE_FOLDER_ID is not configured")?;

        let metadata = serde_json::json!({ "name": name, "parents": [folder_id] });
        let form = Form::new()
            .part(
                "metadata",
                Part::text(metadata.to_string())
                    .mime_str("application/json")
                    .context("invalid metadata part")?,
            )
            .part(
                "file",
                Part::bytes(data)
                    .file_name(name.to_string())
                    .mime_str(mime)
                    .with_context(|| format!("invalid mime type {mime}"))?,
            );

        let url = format!(
            "{}/files?uploadType=multipart&supportsAllDrives=true",
            self.inner.config.upload_base
        );
        let created: CreatedFile = self
            .inner
            .client
            .post(&url)
            .bearer_auth(self.token()?)
            .multipart(form)
            .send()
            .await
            .context("file store upload request failed")?
            .error_for_status()
            .context("file store rejected the upload")?
            .json()
            .await
            .context("file store upload response was malformed")?;

        Ok(created.id)
    }

    /// Drive-wide search for images whose name contains the SKU, ordered by
    /// name. The caller applies the main/nutritional classification.
    pub async fn search_images(&self, sku: &str) -> Result<Vec<DriveFile>> {
        let query = format!(
            "name contains '{}' and (mimeType='image/png' or mimeType='image/jpeg')",
            escape_query_literal(sku)
        );
        let url = format!("{}/files", self.inner.config.api_base);
        let listed: FileListResponse = self
            .inner
            .client
            .get(&url)
            .bearer_auth(self.token()?)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id, name)"),
                ("pageSize", "100"),
                ("orderBy", "name"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await
            .context("file store search request failed")?
            .error_for_status()
            .context("file store search returned bad status")?
            .json()
            .await
            .context("file store search response was malformed")?;

        Ok(listed.files)
    }

    /// Raw content of one file, with its content type, for the image proxy.
    pub async fn download(&self, file_id: &str) -> Result<(Bytes, String)> {
        let url = format!(
            "{}/files/{}?alt=media",
            self.inner.config.api_base,
            urlencoding::encode(file_id)
        );
        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(self.token()?)
            .send()
            .await
            .context("file store download request failed")?
            .error_for_status()
            .context("file store download returned bad status")?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let body = response
            .bytes()
            .await
            .context("failed to read file store content body")?;
        Ok((body, content_type))
    }

    pub async fn quota(&self) -> Result<StorageQuota> {
        let url = format!("{}/about?fields=storageQuota", self.inner.config.api_base);
        let about: AboutResponse = self
            .inner
            .client
            .get(&url)
            .bearer_auth(self.token()?)
            .send()
            .await
            .context("file store quota request failed")?
            .error_for_status()
            .context("file store quota returned bad status")?
            .json()
            .await
            .context("file store quota response was malformed")?;

        Ok(format_quota(
            about.storage_quota.usage.as_deref(),
            about.storage_quota.limit.as_deref(),
        ))
    }
}

fn escape_query_literal(input: &str) -> String {
    input.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Shapes raw byte counters into the GiB strings the sidebar renders.
/// An unreported limit (shared drives) reads as all zeros.
fn format_quota(usage: Option<&str>, limit: Option<&str>) -> StorageQuota {
    let limit_bytes = limit.and_then(|raw| raw.parse::<f64>().ok()).unwrap_or(0.0);
    if limit_bytes <= 0.0 {
        return StorageQuota {
            used: "0".to_string(),
            limit: "0".to_string(),
            percentage: "0".to_string(),
        };
    }
    let used_bytes = usage.and_then(|raw| raw.parse::<f64>().ok()).unwrap_or(0.0);
    let gib = f64::from(1 << 30);
    let used = used_bytes / gib;
    let limit = limit_bytes / gib;
    let percentage = (used / limit) * 100.0;
    StorageQuota {
        used: format!("{used:.2}"),
        limit: format!("{limit:.2}"),
        percentage: format!("{percentage:.1}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_without_a_limit_reads_as_zero() {
        let quota = format_quota(Some("12345"), None);
        assert_eq!(quota.used, "0");
        assert_eq!(quota.limit, "0");
        assert_eq!(quota.percentage, "0");
    }

    #[test]
    fn quota_is_rendered_in_gib() {
        let gib = u64::from(1u32 << 30);
        let quota = format_quota(
            Some(&(5 * gib).to_string()),
            Some(&(20 * gib).to_string()),
        );
        assert_eq!(quota.used, "5.00");
        assert_eq!(quota.limit, "20.00");
        assert_eq!(quota.percentage, "25.0");
    }

    #[test]
    fn search_literals_are_escaped() {
        assert_eq!(escape_query_literal("SKU'1"), "SKU\\'1");
    }
}
