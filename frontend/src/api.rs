use gloo_net::http::{Request, RequestBuilder};
use review_flow_shared::{
    catalog::{ProductListResponse, ProductResponse, SheetGrid},
    ops::{
        ActivityResponse, RecentFilesResponse, StatsSnapshot, StorageQuota, UploadResponse,
    },
    Acknowledged, AuthCheckResponse, CommentRecord, CommentSummary, LoginRequest, LoginResponse,
    SectionComments,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use web_sys::FormData;

use crate::auth;

// API base URL - 编译时从环境变量读取，默认本地开发地址
pub const API_BASE: &str = match option_env!("REVIEWFLOW_API_BASE") {
    Some(url) => url,
    None => "http://localhost:3000/api",
};

fn authorized(builder: RequestBuilder) -> RequestBuilder {
    match auth::token() {
        Some(token) => builder.header("Authorization", &format!("Bearer {token}")),
        None => builder,
    }
}

async fn read_json<T: DeserializeOwned>(response: gloo_net::http::Response) -> Result<T, String> {
    if !response.ok() {
        return Err(format!("HTTP error: {}", response.status()));
    }
    response
        .json()
        .await
        .map_err(|err| format!("Parse error: {err:?}"))
}

async fn get_json<T: DeserializeOwned>(path: &str) -> Result<T, String> {
    let response = authorized(Request::get(&format!("{API_BASE}{path}")))
        .send()
        .await
        .map_err(|err| format!("Network error: {err:?}"))?;
    read_json(response).await
}

async fn post_json<T: DeserializeOwned, B: Serialize>(path: &str, body: &B) -> Result<T, String> {
    let response = authorized(Request::post(&format!("{API_BASE}{path}")))
        .json(body)
        .map_err(|err| format!("Encode error: {err:?}"))?
        .send()
        .await
        .map_err(|err| format!("Network error: {err:?}"))?;
    read_json(response).await
}

async fn post_empty<T: DeserializeOwned>(path: &str) -> Result<T, String> {
    post_json(path, &serde_json::json!({})).await
}

// --- Auth ---

pub async fn login(password: &str) -> Result<LoginResponse, String> {
    let request = LoginRequest {
        password: password.to_string(),
    };
    let response = Request::post(&format!("{API_BASE}/auth/login"))
        .json(&request)
        .map_err(|err| format!("Encode error: {err:?}"))?
        .send()
        .await
        .map_err(|err| format!("Network error: {err:?}"))?;
    if response.status() == 401 {
        return Err("Wrong password".to_string());
    }
    read_json(response).await
}

pub async fn auth_check() -> Result<AuthCheckResponse, String> {
    get_json("/auth/check").await
}

// --- Dashboard ---

pub async fn fetch_activity() -> Result<ActivityResponse, String> {
    get_json("/activity").await
}

pub async fn fetch_stats() -> Result<StatsSnapshot, String> {
    get_json("/stats").await
}

pub async fn fetch_recent_files() -> Result<RecentFilesResponse, String> {
    get_json("/recent-files").await
}

pub async fn fetch_storage_quota() -> Result<StorageQuota, String> {
    get_json("/storage-quota").await
}

pub async fn trigger_generate() -> Result<serde_json::Value, String> {
    post_empty("/generate").await
}

pub async fn record_trigger_stat() -> Result<Acknowledged, String> {
    post_empty("/trigger-stat").await
}

// --- Uploads ---

pub async fn upload_images(form: FormData) -> Result<UploadResponse, String> {
    let response = authorized(Request::post(&format!("{API_BASE}/upload")))
        .body(form)
        .map_err(|err| format!("Encode error: {err:?}"))?
        .send()
        .await
        .map_err(|err| format!("Network error: {err:?}"))?;
    read_json(response).await
}

// --- Sheet grid ---

pub async fn fetch_sheet_data() -> Result<SheetGrid, String> {
    get_json("/sheet-data").await
}

// --- Product catalog ---

pub async fn fetch_products() -> Result<ProductListResponse, String> {
    get_json("/products/list").await
}

pub async fn fetch_product(sku: &str) -> Result<ProductResponse, String> {
    get_json(&format!("/product/{}", urlencoding::encode(sku))).await
}

// --- Comments ---

pub async fn fetch_comment_summary(product_id: &str) -> Result<CommentSummary, String> {
    get_json(&format!(
        "/comments/summary/{}",
        urlencoding::encode(product_id)
    ))
    .await
}

pub async fn fetch_section_comments(
    product_id: &str,
    section: &str,
) -> Result<SectionComments, String> {
    get_json(&format!(
        "/comments/{}?section={}",
        urlencoding::encode(product_id),
        urlencoding::encode(section)
    ))
    .await
}

pub async fn invalidate_comments(product_id: &str) -> Result<Acknowledged, String> {
    post_empty(&format!(
        "/comments/invalidate/{}",
        urlencoding::encode(product_id)
    ))
    .await
}

pub async fn submit_comment(record: &CommentRecord) -> Result<Acknowledged, String> {
    post_json("/comments", record).await
}
