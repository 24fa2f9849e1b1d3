//! Shared client core for the credit-default prediction service: wire
//! types, the HTTP client, per-user UI state and the view model.

pub mod api;
pub mod config;
pub mod error;
pub mod render;
pub mod state;
pub mod types;

pub use api::ApiClient;
pub use config::{ClientConfig, RouteLayout};
pub use error::{ClientError, ConfigError, FormError};
pub use state::{Action, ClientState, Phase, RequestToken};
pub use types::{Employment, Prediction, PredictionForm, PredictionRequest, TrainingReport};
