use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::store::ProgressState;

pub const STATUS_PREPARING: &str = "Preparing to compress...";
pub const STATUS_COMPLETE: &str = "Compression complete";
pub const STATUS_RESET: &str = "Reset";

/// One SSE `data:` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProgressEvent {
    /// Human readable status line.
    pub progress: String,
    /// 0 to 100, one decimal place.
    pub percentage: f64,
}

impl ProgressEvent {
    pub fn reset() -> Self {
        Self {
            progress: STATUS_RESET.to_string(),
            percentage: 0.0,
        }
    }
}

impl From<ProgressState> for ProgressEvent {
    fn from(state: ProgressState) -> Self {
        let progress = if state.completed {
            STATUS_COMPLETE.to_string()
        } else if state.percentage <= 0.0 {
            STATUS_PREPARING.to_string()
        } else {
            format!("Compressing... {}%", state.percentage)
        };

        Self {
            progress,
            percentage: state.percentage,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressErrorEvent {
    pub error: String,
    pub details: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProgressQuery {
    /// Clear the progress slot and close after one event.
    pub reset: Option<bool>,
}
