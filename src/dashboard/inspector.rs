use crate::api::types::InspectLogEntry;
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_BODY_PREVIEW_CHARS: usize = 2_000;
pub const TRUNCATION_MARKER: &str = "... (Truncated)";

/// Most recent inspector traffic, newest entry first.
#[derive(Debug, Clone, Default)]
pub struct InspectorLogStore {
    entries: Vec<InspectLogEntry>,
    selected: Option<String>,
}

/// Display form of one entry with long bodies cut down.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogDetail {
    pub id: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub duration_ms: i64,
    pub timestamp: i64,
    pub client_ip: String,
    pub request_headers: BTreeMap<String, String>,
    pub request_body: Option<String>,
    pub response_headers: BTreeMap<String, String>,
    pub response_body: Option<String>,
}

impl InspectorLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored log with a fresh fetch. The service lists
    /// entries oldest-first.
    pub fn replace_oldest_first(&mut self, mut entries: Vec<InspectLogEntry>) {
        entries.reverse();
        self.entries = entries;
    }

    pub fn select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&InspectLogEntry> {
        let id = self.selected.as_deref()?;
        self.get(id)
    }

    pub fn get(&self, id: &str) -> Option<&InspectLogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[InspectLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn selected_detail(&self, body_limit: usize) -> Option<LogDetail> {
        self.selected().map(|entry| LogDetail::from_entry(entry, body_limit))
    }
}

impl LogDetail {
    pub fn from_entry(entry: &InspectLogEntry, body_limit: usize) -> Self {
        Self {
            id: entry.id.clone(),
            method: entry.method.clone(),
            url: entry.url.clone(),
            status: entry.status,
            duration_ms: entry.duration_ms,
            timestamp: entry.timestamp,
            client_ip: entry.client_ip.clone(),
            request_headers: entry.req_headers.clone(),
            request_body: entry
                .req_body
                .as_deref()
                .filter(|body| !body.is_empty())
                .map(|body| truncate_body(body, body_limit)),
            response_headers: entry.res_headers.clone(),
            response_body: entry
                .res_body
                .as_deref()
                .filter(|body| !body.is_empty())
                .map(|body| truncate_body(body, body_limit)),
        }
    }
}

/// Cut a body to `limit` characters, marking that it was cut.
pub fn truncate_body(body: &str, limit: usize) -> String {
    match body.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &body[..cut], TRUNCATION_MARKER),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::log_entry;

    #[test]
    fn test_replace_reverses_into_newest_first() {
        let mut store = InspectorLogStore::new();
        store.replace_oldest_first(vec![log_entry("a", 1), log_entry("b", 2), log_entry("c", 3)]);

        let ids: Vec<_> = store.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_selection_survives_refresh() {
        let mut store = InspectorLogStore::new();
        store.replace_oldest_first(vec![log_entry("a", 1)]);
        store.select("a");

        store.replace_oldest_first(vec![log_entry("a", 1), log_entry("b", 2)]);
        assert_eq!(store.selected().unwrap().id, "a");

        store.replace_oldest_first(vec![log_entry("b", 2)]);
        assert_eq!(store.selected_id(), Some("a"));
        assert!(store.selected().is_none());
    }

    #[test]
    fn test_truncation_is_display_only() {
        let mut entry = log_entry("big", 1);
        entry.res_body = Some("x".repeat(2_500));
        let mut store = InspectorLogStore::new();
        store.replace_oldest_first(vec![entry]);
        store.select("big");

        let detail = store.selected_detail(DEFAULT_BODY_PREVIEW_CHARS).unwrap();
        let body = detail.response_body.unwrap();
        assert!(body.ends_with(TRUNCATION_MARKER));
        assert_eq!(body.chars().count(), 2_000 + TRUNCATION_MARKER.chars().count());

        // Stored entry keeps the full body
        assert_eq!(store.selected().unwrap().res_body.as_ref().unwrap().len(), 2_500);
    }

    #[test]
    fn test_truncate_body_counts_characters() {
        assert_eq!(truncate_body("héllo", 10), "héllo");
        assert_eq!(truncate_body("héllo", 2), format!("hé{}", TRUNCATION_MARKER));
        assert_eq!(truncate_body("abc", 3), "abc");
    }

    #[test]
    fn test_empty_bodies_are_omitted() {
        let mut entry = log_entry("e", 1);
        entry.req_body = Some(String::new());
        let detail = LogDetail::from_entry(&entry, DEFAULT_BODY_PREVIEW_CHARS);
        assert!(detail.request_body.is_none());
        assert_eq!(detail.response_body.as_deref(), Some("ok"));
    }
}
