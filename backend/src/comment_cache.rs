use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use futures_util::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use review_flow_shared::{CommentItem, CommentRecord, CommentSummary, SectionComments};
use tokio::sync::Mutex;

use crate::sheet_rows::{SheetClient, UpstreamError};

/// How long a derived result may be served without re-reading the tab. The
/// workflow appends rows out of band, so staleness inside this window is the
/// contract, not a bug.
const CACHE_TTL: Duration = Duration::from_secs(30);

type RowsResult = Result<Arc<Vec<CommentRecord>>, UpstreamError>;
type InFlightFetch = Shared<BoxFuture<'static, RowsResult>>;

#[derive(Clone)]
enum CachedValue {
    Summary(CommentSummary),
    Section(SectionComments),
}

struct CacheEntry {
    value: CachedValue,
    stored_at: Instant,
}

/// Read side of the comment subsystem: a keyed, time-boxed result cache over
/// one shared full-table read of the comment tab.
///
/// Both query shapes (per-product summary, per-section item list) derive
/// from the same underlying range read, so the in-flight guard is global:
/// no matter how many distinct keys are being resolved concurrently, at
/// most one upstream fetch is outstanding and every waiter attaches to it.
#[derive(Clone)]
pub struct CommentService {
    rows: SheetClient,
    ttl: Duration,
    entries: Arc<DashMap<String, CacheEntry>>,
    in_flight: Arc<Mutex<Option<InFlightFetch>>>,
}

impl CommentService {
    pub fn new(rows: SheetClient) -> Self {
        Self::with_ttl(rows, CACHE_TTL)
    }

    pub fn with_ttl(rows: SheetClient, ttl: Duration) -> Self {
        Self {
            rows,
            ttl,
            entries: Arc::new(DashMap::new()),
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Per-section comment counts for one product.
    pub async fn summary(&self, product_id: &str) -> Result<CommentSummary, UpstreamError> {
        let key = summary_key(product_id);
        if let Some(CachedValue::Summary(hit)) = self.lookup(&key) {
            tracing::debug!(product_id, "comment summary cache hit");
            return Ok(hit);
        }

        let rows = self.read_all_rows().await?;
        let summary = summarize(&rows, product_id);
        self.store(key, CachedValue::Summary(summary.clone()));
        Ok(summary)
    }

    /// Comments of one section of one product, newest first.
    pub async fn section_items(
        &self,
        product_id: &str,
        section: &str,
    ) -> Result<SectionComments, UpstreamError> {
        let key = section_key(product_id, section);
        if let Some(CachedValue::Section(hit)) = self.lookup(&key) {
            tracing::debug!(product_id, section, "section comments cache hit");
            return Ok(hit);
        }

        let rows = self.read_all_rows().await?;
        let items = collect_section(&rows, product_id, section);
        self.store(key, CachedValue::Section(items.clone()));
        Ok(items)
    }

    /// Drops the summary entry and every per-section entry of one product.
    /// The next read for that product always goes upstream.
    pub fn invalidate(&self, product_id: &str) {
        self.entries.remove(&summary_key(product_id));
        let prefix = format!("{product_id}|");
        self.entries.retain(|key, _| !key.starts_with(&prefix));
        tracing::debug!(product_id, "comment cache invalidated");
    }

    /// Single-flight full-table read. The first caller creates the fetch
    /// and parks it in the slot; everyone arriving while it is pending
    /// awaits the same shared future. The slot clears itself inside the
    /// future, before any waiter resumes, so a failed fetch never poisons
    /// the next call.
    async fn read_all_rows(&self) -> RowsResult {
        let fetch = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some(pending) => pending.clone(),
                None => {
                    let rows = self.rows.clone();
                    let in_flight = Arc::clone(&self.in_flight);
                    let fetch = async move {
                        let result = rows.fetch_comment_rows().await.map(Arc::new);
                        in_flight.lock().await.take();
                        result
                    }
                    .boxed()
                    .shared();
                    *slot = Some(fetch.clone());
                    fetch
                },
            }
        };
        fetch.await
    }

    fn lookup(&self, key: &str) -> Option<CachedValue> {
        let entry = self.entries.get(key)?;
        // Lazy expiry: a stale entry just reads as absent and gets
        // overwritten by the refresh.
        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    fn store(&self, key: String, value: CachedValue) {
        self.entries.insert(key, CacheEntry {
            value,
            stored_at: Instant::now(),
        });
    }
}

fn summary_key(product_id: &str) -> String {
    product_id.to_string()
}

fn section_key(product_id: &str, section: &str) -> String {
    format!("{product_id}|{section}")
}

fn summarize(rows: &[CommentRecord], product_id: &str) -> CommentSummary {
    let mut summary = CommentSummary {
        product_id: product_id.to_string(),
        counts: Default::default(),
    };
    for record in rows {
        if record.product_id.trim() != product_id.trim() || record.section.is_empty() {
            continue;
        }
        *summary.counts.entry(record.section.clone()).or_insert(0) += 1;
    }
    summary
}

fn collect_section(rows: &[CommentRecord], product_id: &str, section: &str) -> SectionComments {
    let mut matched: Vec<(i64, CommentItem)> = rows
        .iter()
        .filter(|record| record.product_id == product_id && record.section == section)
        .map(|record| {
            (parse_timestamp_ms(&record.time_stamp), CommentItem {
                id: record.id.clone(),
                time_stamp: record.time_stamp.clone(),
                comment: record.comment.clone(),
                current_text: record.current_text.clone(),
            })
        })
        .collect();

    // Newest first; unparsable timestamps read as epoch 0 and sort last.
    matched.sort_by(|a, b| b.0.cmp(&a.0));

    SectionComments {
        product_id: product_id.to_string(),
        section: section.to_string(),
        items: matched.into_iter().map(|(_, item)| item).collect(),
    }
}

fn parse_timestamp_ms(raw: &str) -> i64 {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|stamp| stamp.timestamp_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{method, path_regex},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::config::SheetConfig;

    fn test_sheet_config(server: &MockServer) -> SheetConfig {
        SheetConfig {
            api_base: server.uri(),
            sheet_id: Some("sheet-1".to_string()),
            product_tab: "Output".to_string(),
            comments_tab: "Comments".to_string(),
            api_key: None,
        }
    }

    fn service_with_ttl(server: &MockServer, ttl: Duration) -> CommentService {
        let client = SheetClient::new(reqwest::Client::new(), test_sheet_config(server));
        CommentService::with_ttl(client, ttl)
    }

    fn sheet_body(values: serde_json::Value) -> serde_json::Value {
        json!({ "range": "'Comments'!A1:G10000", "majorDimension": "ROWS", "values": values })
    }

    fn default_rows() -> serde_json::Value {
        json!([
            ["id", "product_id", "section", "current_text", "comment", "page_url", "time_stamp"],
            ["1", "P1", "name", "Old name", "hi", "http://x", "2024-01-01T00:00:00Z"],
            ["2", "P1", "name", "Old name", "newer", "http://x", "2024-02-01T00:00:00Z"],
            ["3", "P1", "brand", "Old brand", "brand note", "http://x", "not-a-date"],
            ["4", "P2", "name", "Other", "other product", "http://x", "2024-01-15T00:00:00Z"],
        ])
    }

    async fn mount_rows(server: &MockServer, values: serde_json::Value, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path_regex(r"^/sheet-1/values/.*"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(sheet_body(values))
                    .set_delay(Duration::from_millis(50)),
            )
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn concurrent_queries_share_one_upstream_fetch() {
        let server = MockServer::start().await;
        mount_rows(&server, default_rows(), 1).await;
        let service = service_with_ttl(&server, Duration::from_secs(30));

        let (s1, s2, items1, items2) = tokio::join!(
            service.summary("P1"),
            service.summary("P2"),
            service.section_items("P1", "name"),
            service.section_items("P1", "brand"),
        );

        let s1 = s1.expect("summary P1");
        assert_eq!(s1.counts.get("name"), Some(&2));
        assert_eq!(s1.counts.get("brand"), Some(&1));
        assert_eq!(s2.expect("summary P2").counts.get("name"), Some(&1));
        assert_eq!(items1.expect("items P1/name").items.len(), 2);
        assert_eq!(items2.expect("items P1/brand").items.len(), 1);
    }

    #[tokio::test]
    async fn cached_results_skip_the_upstream_within_ttl() {
        let server = MockServer::start().await;
        mount_rows(&server, default_rows(), 1).await;
        let service = service_with_ttl(&server, Duration::from_secs(30));

        let first = service.summary("P1").await.expect("first read");
        let second = service.summary("P1").await.expect("second read");

        // Idempotent: byte-identical aggregates for an unchanged row set.
        assert_eq!(
            serde_json::to_vec(&first).expect("encode"),
            serde_json::to_vec(&second).expect("encode"),
        );
    }

    #[tokio::test]
    async fn expired_entries_trigger_a_fresh_fetch() {
        let server = MockServer::start().await;
        mount_rows(&server, default_rows(), 2).await;
        let service = service_with_ttl(&server, Duration::from_millis(60));

        service.summary("P1").await.expect("first read");
        tokio::time::sleep(Duration::from_millis(120)).await;
        service.summary("P1").await.expect("read after expiry");
    }

    #[tokio::test]
    async fn invalidate_forces_a_refetch_regardless_of_ttl() {
        let server = MockServer::start().await;
        // Four upstream reads: summary and section miss separately, then
        // both miss again after the invalidation.
        mount_rows(&server, default_rows(), 4).await;
        let service = service_with_ttl(&server, Duration::from_secs(30));

        service.summary("P1").await.expect("summary");
        service.section_items("P1", "name").await.expect("items");
        service.invalidate("P1");
        service.summary("P1").await.expect("summary after invalidate");
        service
            .section_items("P1", "name")
            .await
            .expect("items after invalidate");
    }

    #[tokio::test]
    async fn invalidate_leaves_other_products_cached() {
        let server = MockServer::start().await;
        mount_rows(&server, default_rows(), 3).await;
        let service = service_with_ttl(&server, Duration::from_secs(30));

        service.summary("P1").await.expect("summary P1");
        service.summary("P2").await.expect("summary P2");
        service.invalidate("P1");
        // P2 still cached, P1 refetches: exactly one more upstream call.
        service.summary("P2").await.expect("summary P2 cached");
        service.summary("P1").await.expect("summary P1 refetched");
    }

    #[tokio::test]
    async fn items_sort_newest_first_with_unparsable_timestamps_last() {
        let server = MockServer::start().await;
        mount_rows(
            &server,
            json!([
                ["id", "product_id", "section", "current_text", "comment", "page_url", "time_stamp"],
                ["a", "P1", "name", "", "t1", "", "2024-01-01T00:00:00Z"],
                ["b", "P1", "name", "", "t2", "", "2024-06-01T00:00:00Z"],
                ["c", "P1", "name", "", "junk", "", "yesterday-ish"],
            ]),
            1,
        )
        .await;
        let service = service_with_ttl(&server, Duration::from_secs(30));

        let items = service.section_items("P1", "name").await.expect("items");
        let order: Vec<&str> = items.items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn failed_fetch_surfaces_and_does_not_poison_the_next_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/sheet-1/values/.*"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend quota exceeded"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        mount_rows(&server, default_rows(), 1).await;
        let service = service_with_ttl(&server, Duration::from_secs(30));

        let err = service.summary("P1").await.expect_err("first read fails");
        match err {
            UpstreamError::Store {
                status,
                message,
            } => {
                assert_eq!(status, 500);
                assert!(message.contains("quota"));
            },
            other => panic!("unexpected error: {other}"),
        }

        // In-flight slot was cleared on failure; this call retries fresh.
        let summary = service.summary("P1").await.expect("second read succeeds");
        assert_eq!(summary.counts.get("name"), Some(&2));
    }

    #[tokio::test]
    async fn concrete_scenario_single_row() {
        let server = MockServer::start().await;
        mount_rows(
            &server,
            json!([
                ["id", "product_id", "section", "current_text", "comment", "page_url", "time_stamp"],
                ["1", "P1", "name", "", "hi", "", "2024-01-01T00:00:00Z"],
            ]),
            1,
        )
        .await;
        let service = service_with_ttl(&server, Duration::from_secs(30));

        let summary = service.summary("P1").await.expect("summary");
        assert_eq!(summary.product_id, "P1");
        assert_eq!(summary.counts.len(), 1);
        assert_eq!(summary.counts.get("name"), Some(&1));

        let items = service.section_items("P1", "name").await.expect("items");
        assert_eq!(items.items.len(), 1);
        assert_eq!(items.items[0].comment, "hi");
    }
}
