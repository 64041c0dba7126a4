use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use review_flow_shared::ops::{
    ActivityEntry, RecentFile, StatsSnapshot, WorkflowStatusView,
};
use uuid::Uuid;

const ACTIVITY_CAP: usize = 100;
const ACTIVITY_PAGE: usize = 20;
const RECENT_FILES_CAP: usize = 50;
const RECENT_FILES_PAGE: usize = 10;
const WORKFLOW_STATUS_MAX_AGE_SECS: i64 = 3600;

/// Process-local operational state: activity feed, daily counters, recent
/// uploads, workflow progress. Lost on restart by design; none of it is a
/// system of record.
#[derive(Clone)]
pub struct OpsLog {
    inner: Arc<OpsLogInner>,
}

struct OpsLogInner {
    activity: RwLock<VecDeque<ActivityEntry>>,
    recent_files: RwLock<VecDeque<RecentFile>>,
    stats: RwLock<DailyStats>,
    workflows: RwLock<HashMap<String, WorkflowEntry>>,
}

#[derive(Default)]
struct DailyStats {
    uploads_today: u32,
    triggers_today: u32,
    last_reset_date: Option<NaiveDate>,
}

struct WorkflowEntry {
    status: String,
    step: Option<String>,
    updated_at: DateTime<Utc>,
}

impl Default for OpsLog {
    fn default() -> Self {
        Self {
            inner: Arc::new(OpsLogInner {
                activity: RwLock::new(VecDeque::new()),
                recent_files: RwLock::new(VecDeque::new()),
                stats: RwLock::new(DailyStats::default()),
                workflows: RwLock::new(HashMap::new()),
            }),
        }
    }
}

impl OpsLog {
    pub fn record_activity(&self, kind: &str, message: impl Into<String>) {
        let entry = ActivityEntry {
            id: Uuid::new_v4().to_string(),
            kind: kind.to_string(),
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
        };
        let mut feed = self.inner.activity.write();
        feed.push_front(entry);
        feed.truncate(ACTIVITY_CAP);
    }

    pub fn activities(&self) -> Vec<ActivityEntry> {
        self.inner
            .activity
            .read()
            .iter()
            .take(ACTIVITY_PAGE)
            .cloned()
            .collect()
    }

    pub fn push_recent_file(&self, name: impl Into<String>, size: u64) {
        let mut files = self.inner.recent_files.write();
        files.push_front(RecentFile {
            name: name.into(),
            at: Utc::now().to_rfc3339(),
            size,
        });
        files.truncate(RECENT_FILES_CAP);
    }

    pub fn recent_files(&self) -> Vec<RecentFile> {
        self.inner
            .recent_files
            .read()
            .iter()
            .take(RECENT_FILES_PAGE)
            .cloned()
            .collect()
    }

    pub fn bump_uploads(&self) {
        let today = Utc::now().date_naive();
        let mut stats = self.inner.stats.write();
        stats.reset_if_new_day(today);
        stats.uploads_today += 1;
    }

    pub fn bump_triggers(&self) {
        let today = Utc::now().date_naive();
        let mut stats = self.inner.stats.write();
        stats.reset_if_new_day(today);
        stats.triggers_today += 1;
    }

    pub fn stats_snapshot(&self) -> StatsSnapshot {
        let today = Utc::now().date_naive();
        let mut stats = self.inner.stats.write();
        stats.reset_if_new_day(today);
        StatsSnapshot {
            uploads_today: stats.uploads_today,
            triggers_today: stats.triggers_today,
            last_reset_date: stats.last_reset_date.map(|date| date.to_string()),
        }
    }

    /// Upserts one workflow's progress and drops entries that have gone
    /// quiet for over an hour (lazy GC, runs on every report).
    pub fn update_workflow(&self, workflow_id: &str, status: String, step: Option<String>) {
        let now = Utc::now();
        let mut workflows = self.inner.workflows.write();
        workflows.insert(workflow_id.to_string(), WorkflowEntry {
            status,
            step,
            updated_at: now,
        });
        workflows
            .retain(|_, entry| (now - entry.updated_at).num_seconds() < WORKFLOW_STATUS_MAX_AGE_SECS);
    }

    pub fn workflow_view(&self, workflow_id: &str) -> WorkflowStatusView {
        let workflows = self.inner.workflows.read();
        match workflows.get(workflow_id) {
            Some(entry) => WorkflowStatusView {
                status: entry.status.clone(),
                step: entry.step.clone(),
                elapsed: Some((Utc::now() - entry.updated_at).num_seconds().max(0) as u64),
            },
            None => WorkflowStatusView {
                status: "unknown".to_string(),
                step: None,
                elapsed: None,
            },
        }
    }
}

impl DailyStats {
    fn reset_if_new_day(&mut self, today: NaiveDate) {
        if self.last_reset_date != Some(today) {
            self.uploads_today = 0;
            self.triggers_today = 0;
            self.last_reset_date = Some(today);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_feed_is_capped_and_newest_first() {
        let log = OpsLog::default();
        for idx in 0..150 {
            log.record_activity("upload", format!("entry {idx}"));
        }
        let page = log.activities();
        assert_eq!(page.len(), 20);
        assert_eq!(page[0].message, "entry 149");
        assert_eq!(log.inner.activity.read().len(), 100);
    }

    #[test]
    fn recent_files_page_is_bounded() {
        let log = OpsLog::default();
        for idx in 0..60 {
            log.push_recent_file(format!("file-{idx}.png"), 1024);
        }
        let page = log.recent_files();
        assert_eq!(page.len(), 10);
        assert_eq!(page[0].name, "file-59.png");
        assert_eq!(log.inner.recent_files.read().len(), 50);
    }

    #[test]
    fn counters_reset_when_the_day_changes() {
        let mut stats = DailyStats::default();
        let day1 = NaiveDate::from_ymd_opt(2024, 3, 1).expect("date");
        let day2 = NaiveDate::from_ymd_opt(2024, 3, 2).expect("date");

        stats.reset_if_new_day(day1);
        stats.uploads_today += 2;
        stats.triggers_today += 1;

        stats.reset_if_new_day(day1);
        assert_eq!(stats.uploads_today, 2);

        stats.reset_if_new_day(day2);
        assert_eq!(stats.uploads_today, 0);
        assert_eq!(stats.triggers_today, 0);
        assert_eq!(stats.last_reset_date, Some(day2));
    }

    #[test]
    fn unknown_workflow_reads_as_unknown() {
        let log = OpsLog::default();
        let view = log.workflow_view("wf-1");
        assert_eq!(view.status, "unknown");
        assert_eq!(view.elapsed, None);
    }

    #[test]
    fn workflow_status_round_trips() {
        let log = OpsLog::default();
        log.update_workflow("wf-1", "running".to_string(), Some("step 2".to_string()));
        let view = log.workflow_view("wf-1");
        assert_eq!(view.status, "running");
        assert_eq!(view.step.as_deref(), Some("step 2"));
        assert_eq!(view.elapsed, Some(0));
    }
}
