//! View controllers. Each view owns its state and a cancellation token; a
//! torn-down view never writes results back.

mod history_view;
mod prediction_view;

pub use history_view::{HistoryView, DELETE_SUCCESS};
pub use prediction_view::{PredictionView, Settled};
