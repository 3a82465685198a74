//! In-memory prediction history for the signed-in principal.

use crate::backend::{PredictionBackend, PredictionResult};
use crate::risk::RiskFilter;
use crate::types::PredictionRecord;

pub const EMPTY_HISTORY: &str = "No predictions yet";
pub const NO_MATCHES: &str = "No matching predictions found";

#[derive(Debug, Clone, Default)]
pub struct PredictionRepository {
    records: Vec<PredictionRecord>,
}

impl PredictionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&PredictionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace the snapshot with a freshly fetched list.
    pub fn replace(&mut self, records: Vec<PredictionRecord>) {
        self.records = records;
    }

    /// Fetch the history from `backend` and replace the snapshot.
    pub async fn refresh<B: PredictionBackend>(&mut self, backend: &B) -> PredictionResult<()> {
        let records = backend.list().await?;
        self.replace(records);
        Ok(())
    }

    /// Records whose area contains `search` (case-insensitive) and whose
    /// risk tier passes `risk`.
    pub fn filter(&self, search: &str, risk: RiskFilter) -> Vec<&PredictionRecord> {
        let needle = search.trim().to_lowercase();
        self.records
            .iter()
            .filter(|r| r.area.to_lowercase().contains(&needle))
            .filter(|r| risk.matches(&r.risk_summary))
            .collect()
    }

    /// Message for an empty result, distinguishing no history from no matches.
    pub fn empty_message(&self, filtered: &[&PredictionRecord]) -> Option<&'static str> {
        if self.records.is_empty() {
            Some(EMPTY_HISTORY)
        } else if filtered.is_empty() {
            Some(NO_MATCHES)
        } else {
            None
        }
    }

    /// Delete remotely, then drop the record locally. On failure the list is
    /// unchanged. Holding `&mut self` across the call keeps a refresh from
    /// replacing the list mid-delete.
    pub async fn delete<B: PredictionBackend>(
        &mut self,
        backend: &B,
        id: &str,
    ) -> PredictionResult<Option<PredictionRecord>> {
        backend.delete(id).await?;

        let removed = self
            .records
            .iter()
            .position(|r| r.id == id)
            .map(|index| self.records.remove(index));
        if removed.is_none() {
            tracing::debug!("Deleted prediction {} was not in the local list", id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredictionError;
    use crate::types::PredictionOutcome;
    use parking_lot::Mutex;
    use raincast_weather::FeatureVector;

    fn record(id: &str, area: &str, risk: &str) -> PredictionRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "area": area,
            "risk_summary": risk,
        }))
        .unwrap()
    }

    fn sample() -> Vec<PredictionRecord> {
        vec![
            record("1", "Kathmandu, Nepal", "High rainfall risk"),
            record("2", "Kathmandu, Nepal", "Moderate showers"),
            record("3", "Pokhara, Nepal", "Severe storm"),
            record("4", "Lalitpur, Nepal", "Clear"),
        ]
    }

    /// Backend whose delete outcome is fixed up front.
    struct FakeBackend {
        fail_delete: bool,
        deleted: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn new(fail_delete: bool) -> Self {
            Self {
                fail_delete,
                deleted: Mutex::new(Vec::new()),
            }
        }
    }

    impl PredictionBackend for FakeBackend {
        async fn submit(&self, _vector: &FeatureVector) -> PredictionResult<PredictionOutcome> {
            Err(PredictionError::Failed("unused".into()))
        }

        async fn list(&self) -> PredictionResult<Vec<PredictionRecord>> {
            Ok(sample())
        }

        async fn delete(&self, id: &str) -> PredictionResult<()> {
            if self.fail_delete {
                return Err(PredictionError::DeleteFailed("boom".into()));
            }
            self.deleted.lock().push(id.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_filter_ands_search_and_risk() {
        let mut repo = PredictionRepository::new();
        repo.replace(sample());

        let hits = repo.filter("kathmandu", "high".parse().unwrap());
        let ids: Vec<_> = hits.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn test_filter_search_only() {
        let mut repo = PredictionRepository::new();
        repo.replace(sample());

        assert_eq!(repo.filter("KATHMANDU", RiskFilter::All).len(), 2);
        assert_eq!(repo.filter("", RiskFilter::All).len(), 4);
        assert_eq!(repo.filter("  nepal ", RiskFilter::All).len(), 4);
    }

    #[test]
    fn test_filter_risk_only() {
        let mut repo = PredictionRepository::new();
        repo.replace(sample());

        let high = repo.filter("", "high".parse().unwrap());
        assert_eq!(high.len(), 2);
        let low = repo.filter("", "low".parse().unwrap());
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, "4");
    }

    #[test]
    fn test_empty_messages() {
        let mut repo = PredictionRepository::new();
        assert_eq!(repo.empty_message(&[]), Some(EMPTY_HISTORY));

        repo.replace(sample());
        let none = repo.filter("Tokyo", RiskFilter::All);
        assert_eq!(repo.empty_message(&none), Some(NO_MATCHES));

        let some = repo.filter("Pokhara", RiskFilter::All);
        assert_eq!(repo.empty_message(&some), None);
    }

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let mut repo = PredictionRepository::new();
        repo.replace(vec![record("old", "x", "")]);

        repo.refresh(&FakeBackend::new(false)).await.unwrap();

        assert_eq!(repo.len(), 4);
        assert!(repo.records().iter().all(|r| r.id != "old"));
    }

    #[tokio::test]
    async fn test_delete_success_removes_exactly_one() {
        let backend = FakeBackend::new(false);
        let mut repo = PredictionRepository::new();
        repo.replace(sample());

        let removed = repo.delete(&backend, "2").await.unwrap();

        assert_eq!(removed.map(|r| r.id), Some("2".to_string()));
        assert_eq!(repo.len(), 3);
        assert!(repo.records().iter().all(|r| r.id != "2"));
        assert_eq!(*backend.deleted.lock(), vec!["2".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_list_unchanged() {
        let backend = FakeBackend::new(true);
        let mut repo = PredictionRepository::new();
        repo.replace(sample());

        let result = repo.delete(&backend, "2").await;

        assert!(matches!(result, Err(PredictionError::DeleteFailed(_))));
        assert_eq!(repo.len(), 4);
        assert_eq!(repo.records(), sample().as_slice());
    }
}
