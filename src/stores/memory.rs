use super::{ReportStore, StoreResult};
use crate::models::report::DisasterReport;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryReportStore {
    reports: RwLock<BTreeMap<Uuid, DisasterReport>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn get(&self, id: &Uuid) -> StoreResult<Option<DisasterReport>> {
        Ok(self.reports.read().await.get(id).cloned())
    }

    async fn insert(&self, report: &DisasterReport) -> StoreResult<()> {
        self.reports
            .write()
            .await
            .insert(report.disaster_id, report.clone());
        Ok(())
    }

    async fn remove(&self, id: &Uuid) -> StoreResult<Option<DisasterReport>> {
        Ok(self.reports.write().await.remove(id))
    }

    async fn values(&self) -> StoreResult<Vec<DisasterReport>> {
        Ok(self.reports.read().await.values().cloned().collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{identity::CallerId, report::ReportPayload};

    fn report() -> DisasterReport {
        DisasterReport::new(Uuid::new_v4(), CallerId::from("amy"), ReportPayload::default())
    }

    #[tokio::test]
    async fn insert_get_remove() {
        let store = MemoryReportStore::new();
        let r = report();

        store.insert(&r).await.unwrap();
        assert_eq!(store.get(&r.disaster_id).await.unwrap(), Some(r.clone()));

        assert_eq!(store.remove(&r.disaster_id).await.unwrap(), Some(r.clone()));
        assert!(store.get(&r.disaster_id).await.unwrap().is_none());
        assert!(store.remove(&r.disaster_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn values_are_key_ordered() {
        let store = MemoryReportStore::new();
        let mut ids = Vec::new();
        for _ in 0..5 {
            let r = report();
            ids.push(r.disaster_id);
            store.insert(&r).await.unwrap();
        }
        ids.sort();

        let listed: Vec<Uuid> = store
            .values()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.disaster_id)
            .collect();
        assert_eq!(listed, ids);
    }
}
