//! Data models shared between the review-flow backend and the Yew frontend.
//!
//! Everything here must stay wasm-clean: serde only, no native-only deps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod ops;

/// One persisted comment, as appended to the comment tab by the external
/// automation workflow. All columns are strings; the store is read-only for
/// us once a row exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub product_id: String,
    pub section: String,
    pub current_text: String,
    pub comment: String,
    pub page_url: String,
    pub time_stamp: String, // ISO-8601 文本，排序用
}

/// Per-section comment counts for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSummary {
    pub product_id: String,
    pub counts: BTreeMap<String, u32>,
}

/// One comment as rendered in the section modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentItem {
    pub id: String,
    pub time_stamp: String,
    pub comment: String,
    pub current_text: String,
}

/// Comments of one section of one product, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionComments {
    pub product_id: String,
    pub section: String,
    pub items: Vec<CommentItem>,
}

/// Generic `{"success": true}` acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledged {
    pub success: bool,
}

impl Acknowledged {
    pub fn ok() -> Self {
        Self {
            success: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
}

/// Answer of `GET /api/auth/check`; `valid`/`role` are absent when the
/// deployment runs without a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCheckResponse {
    pub protected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub app: String,
}
