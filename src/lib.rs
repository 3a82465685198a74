//! Raincast: rainfall prediction client.
//!
//! Wires location resolution, weather features, validation and the
//! prediction service into view controllers used by the `raincast` binary.

pub mod app_services;
pub mod error_mapping;
pub mod notification;
pub mod views;

pub use app_services::AppServices;
pub use error_mapping::IntoAppError;
pub use notification::{Notification, NotificationKind, Notifier};
pub use views::{HistoryView, PredictionView, Settled};
