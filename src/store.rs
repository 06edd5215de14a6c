//! In-memory report store with a fixed capacity.

use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

use crate::routes::StoredReport;

#[derive(Debug)]
pub struct ReportStore {
    reports: HashMap<Uuid, StoredReport>,
    order: VecDeque<Uuid>,
    capacity: usize,
}

impl ReportStore {
    pub fn new(capacity: usize) -> Self {
        Self { reports: HashMap::new(), order: VecDeque::new(), capacity: capacity.max(1) }
    }

    /// Inserts `report`, dropping the oldest reports once the store is full.
    /// Returns the ids that were evicted.
    pub fn insert(&mut self, report: StoredReport) -> Vec<Uuid> {
        let id = report.id;
        if self.reports.insert(id, report).is_some() {
            self.order.retain(|existing| *existing != id);
        }
        self.order.push_back(id);

        let mut evicted = Vec::new();
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.reports.remove(&oldest);
                evicted.push(oldest);
            }
        }
        evicted
    }

    pub fn get(&self, id: &Uuid) -> Option<&StoredReport> { self.reports.get(id) }

    pub fn remove(&mut self, id: &Uuid) -> Option<StoredReport> {
        let removed = self.reports.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    pub fn len(&self) -> usize { self.reports.len() }

    pub fn is_empty(&self) -> bool { self.reports.is_empty() }

    pub fn capacity(&self) -> usize { self.capacity }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layout::{LayoutWriter, PageLayout},
        report::ReportKind,
    };
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn report() -> StoredReport {
        StoredReport {
            id: Uuid::new_v4(),
            kind: ReportKind::Module,
            filename: "module-progress-report-2024-03-05.pdf".into(),
            document: LayoutWriter::new("t", PageLayout::default()).finish(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn capacity_evicts_oldest_first() {
        let mut store = ReportStore::new(2);
        let (a, b, c) = (report(), report(), report());
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        assert!(store.insert(a).is_empty());
        assert!(store.insert(b).is_empty());
        assert_eq!(store.insert(c), vec![a_id]);
        assert_eq!(store.len(), 2);
        assert!(store.get(&a_id).is_none());
        assert!(store.get(&b_id).is_some());
        assert!(store.get(&c_id).is_some());
    }

    #[test]
    fn removed_reports_free_their_slot() {
        let mut store = ReportStore::new(2);
        let (a, b, c) = (report(), report(), report());
        let (a_id, b_id) = (a.id, b.id);
        store.insert(a);
        store.insert(b);
        assert!(store.remove(&a_id).is_some());
        assert!(store.remove(&a_id).is_none());
        assert!(store.insert(c).is_empty());
        assert!(store.get(&b_id).is_some());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn zero_capacity_still_keeps_the_latest_report() {
        let mut store = ReportStore::new(0);
        let r = report();
        let id = r.id;
        store.insert(r);
        assert_eq!(store.capacity(), 1);
        assert!(store.get(&id).is_some());
    }
}
