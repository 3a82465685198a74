//! Prediction history view: fetch once per mount, filter, delete.

use std::sync::Arc;

use raincast_core::AppError;
use raincast_services::{PredictionBackend, PredictionRecord, PredictionRepository, RiskFilter};
use tokio_util::sync::CancellationToken;

use crate::error_mapping::IntoAppError;
use crate::notification::Notifier;
use crate::views::Settled;

pub const DELETE_SUCCESS: &str = "Prediction deleted successfully";

pub struct HistoryView<B> {
    backend: Arc<B>,
    repository: PredictionRepository,
    notifier: Notifier,
    cancel: CancellationToken,
    mounted: bool,
    search: String,
    risk: RiskFilter,
    pending_delete: Option<String>,
}

impl<B: PredictionBackend> HistoryView<B> {
    pub fn new(backend: Arc<B>, notifier: Notifier) -> Self {
        Self {
            backend,
            repository: PredictionRepository::new(),
            notifier,
            cancel: CancellationToken::new(),
            mounted: false,
            search: String::new(),
            risk: RiskFilter::All,
            pending_delete: None,
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    /// Fetch the history. Only the first call per view does any work.
    pub async fn mount(&mut self) -> Result<Settled, AppError> {
        if self.mounted {
            return Ok(Settled::Done);
        }

        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(Settled::Cancelled),
            r = self.backend.list() => r,
        };
        if self.cancel.is_cancelled() {
            return Ok(Settled::Cancelled);
        }

        match fetched {
            Ok(records) => {
                tracing::info!("Loaded {} predictions", records.len());
                self.repository.replace(records);
                self.mounted = true;
                Ok(Settled::Done)
            }
            Err(e) => {
                let err = e.into_app_error();
                self.notifier.error(err.user_message());
                Err(err)
            }
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn set_risk(&mut self, risk: RiskFilter) {
        self.risk = risk;
    }

    pub fn records(&self) -> &[PredictionRecord] {
        self.repository.records()
    }

    pub fn record(&self, id: &str) -> Option<&PredictionRecord> {
        self.repository.get(id)
    }

    /// Records passing both the search term and the risk filter.
    pub fn visible(&self) -> Vec<&PredictionRecord> {
        self.repository.filter(&self.search, self.risk)
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.repository.empty_message(&self.visible())
    }

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: impl Into<String>) {
        self.pending_delete = Some(id.into());
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the record awaiting confirmation. The local list changes only
    /// after the server confirms; either way a notification is shown.
    pub async fn confirm_delete(&mut self) -> Result<Settled, AppError> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(Settled::Done);
        };

        let deleted = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(Settled::Cancelled),
            r = self.repository.delete(self.backend.as_ref(), &id) => r,
        };

        match deleted {
            Ok(_) => {
                self.notifier.success(DELETE_SUCCESS);
                Ok(Settled::Done)
            }
            Err(e) => {
                tracing::error!("Failed to delete prediction {}: {}", id, e);
                let err = e.into_app_error();
                self.notifier.error(err.user_message());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationKind;
    use parking_lot::Mutex;
    use raincast_services::{PredictionError, PredictionOutcome, PredictionResult};
    use raincast_weather::FeatureVector;
    use std::time::Duration;

    fn record(id: &str, area: &str, risk: &str) -> PredictionRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "area": area,
            "risk_summary": risk,
        }))
        .unwrap()
    }

    struct FakeBackend {
        fail_delete: bool,
        stall_delete: bool,
        list_calls: Mutex<usize>,
    }

    impl FakeBackend {
        fn new(fail_delete: bool) -> Arc<Self> {
            Arc::new(Self {
                fail_delete,
                stall_delete: false,
                list_calls: Mutex::new(0),
            })
        }

        fn stalling() -> Arc<Self> {
            Arc::new(Self {
                fail_delete: false,
                stall_delete: true,
                list_calls: Mutex::new(0),
            })
        }
    }

    impl PredictionBackend for FakeBackend {
        async fn submit(&self, _vector: &FeatureVector) -> PredictionResult<PredictionOutcome> {
            Err(PredictionError::Failed("unused".into()))
        }

        async fn list(&self) -> PredictionResult<Vec<PredictionRecord>> {
            *self.list_calls.lock() += 1;
            Ok(vec![
                record("1", "Kathmandu, Nepal", "High rainfall risk"),
                record("2", "Kathmandu, Nepal", "Low"),
                record("3", "Pokhara, Nepal", "Severe storm"),
            ])
        }

        async fn delete(&self, _id: &str) -> PredictionResult<()> {
            if self.stall_delete {
                tokio::time::sleep(Duration::from_secs(10)).await;
            }
            if self.fail_delete {
                Err(PredictionError::DeleteFailed("Could not delete".into()))
            } else {
                Ok(())
            }
        }
    }

    fn notifier() -> Notifier {
        Notifier::new(Duration::from_secs(3))
    }

    #[tokio::test]
    async fn mount_fetches_once() {
        let backend = FakeBackend::new(false);
        let mut view = HistoryView::new(backend.clone(), notifier());

        view.mount().await.unwrap();
        view.mount().await.unwrap();

        assert_eq!(*backend.list_calls.lock(), 1);
        assert_eq!(view.records().len(), 3);
        assert_eq!(view.record("3").map(|r| r.area.as_str()), Some("Pokhara, Nepal"));
        assert!(view.record("9").is_none());
    }

    #[tokio::test]
    async fn filters_combine() {
        let mut view = HistoryView::new(FakeBackend::new(false), notifier());
        view.mount().await.unwrap();

        view.set_search("Kathmandu");
        view.set_risk("high".parse().unwrap());
        let ids: Vec<_> = view.visible().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec!["1".to_string()]);

        view.set_search("Tokyo");
        assert_eq!(view.empty_message(), Some("No matching predictions found"));
    }

    #[tokio::test]
    async fn confirmed_delete_notifies_success() {
        let n = notifier();
        let mut view = HistoryView::new(FakeBackend::new(false), n.clone());
        view.mount().await.unwrap();

        view.request_delete("2");
        assert_eq!(view.pending_delete(), Some("2"));
        view.confirm_delete().await.unwrap();

        assert_eq!(view.records().len(), 2);
        assert_eq!(view.pending_delete(), None);
        let shown = n.current().unwrap();
        assert_eq!(shown.kind, NotificationKind::Success);
        assert_eq!(shown.message, DELETE_SUCCESS);
    }

    #[tokio::test]
    async fn failed_delete_keeps_list_and_notifies() {
        let n = notifier();
        let mut view = HistoryView::new(FakeBackend::new(true), n.clone());
        view.mount().await.unwrap();

        view.request_delete("2");
        let err = view.confirm_delete().await.unwrap_err();

        assert!(matches!(err, AppError::DeleteFailed(_)));
        assert_eq!(view.records().len(), 3);
        assert_eq!(n.current().map(|s| s.kind), Some(NotificationKind::Error));
    }

    #[tokio::test]
    async fn cancelled_delete_request_does_nothing() {
        let mut view = HistoryView::new(FakeBackend::new(false), notifier());
        view.mount().await.unwrap();

        view.request_delete("1");
        view.cancel_delete();
        view.confirm_delete().await.unwrap();

        assert_eq!(view.records().len(), 3);
    }

    #[tokio::test]
    async fn torn_down_view_ignores_fetch() {
        let mut view = HistoryView::new(FakeBackend::new(false), notifier());
        view.teardown();

        assert_eq!(view.mount().await.unwrap(), Settled::Cancelled);
        assert!(view.records().is_empty());
    }

    #[tokio::test]
    async fn teardown_during_delete_leaves_list_alone() {
        let n = notifier();
        let mut view = HistoryView::new(FakeBackend::stalling(), n.clone());
        view.mount().await.unwrap();

        let token = view.cancel_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        view.request_delete("1");
        assert_eq!(view.confirm_delete().await.unwrap(), Settled::Cancelled);

        assert_eq!(view.records().len(), 3);
        assert!(n.current().is_none());
    }
}
