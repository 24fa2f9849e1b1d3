//! Explicit UI state for the train and predict actions.
//!
//! Each action moves through idle → loading → (ready | failed). Starting an
//! action issues a [`RequestToken`]; only the latest token may complete it,
//! so a slow response can never overwrite a newer one.

use chrono::{DateTime, Utc};
use log::warn;

use crate::error::ClientError;
use crate::types::{Prediction, PredictionForm, PredictionRequest, TrainingReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Train,
    Predict,
}

/// Identifies one in-flight call of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    action: Action,
    seq: u64,
}

impl RequestToken {
    pub fn action(&self) -> Action {
        self.action
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ActionSlot<T> {
    action: Action,
    phase: Phase<T>,
    current: Option<u64>,
    issued: u64,
    updated_at: Option<DateTime<Utc>>,
}

impl<T> ActionSlot<T> {
    fn new(action: Action) -> Self {
        ActionSlot {
            action,
            phase: Phase::Idle,
            current: None,
            issued: 0,
            updated_at: None,
        }
    }

    pub fn phase(&self) -> &Phase<T> {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    /// When the last response (or validation failure) landed.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Supersedes any call still in flight.
    fn begin(&mut self) -> RequestToken {
        self.issued += 1;
        self.current = Some(self.issued);
        self.phase = Phase::Loading;
        RequestToken {
            action: self.action,
            seq: self.issued,
        }
    }

    fn finish(&mut self, token: RequestToken, result: Result<T, ClientError>) -> bool {
        if token.action != self.action || self.current != Some(token.seq) {
            warn!(
                "Discarding stale {:?} response (token {}, current {:?})",
                token.action, token.seq, self.current
            );
            return false;
        }

        self.current = None;
        self.phase = match result {
            Ok(value) => Phase::Ready(value),
            Err(e) => Phase::Failed(e.to_string()),
        };
        self.updated_at = Some(Utc::now());
        true
    }

    fn fail_now(&mut self, message: String) {
        self.current = None;
        self.phase = Phase::Failed(message);
        self.updated_at = Some(Utc::now());
    }
}

/// Everything one user sees: the form and the two result panels.
#[derive(Debug, Clone)]
pub struct ClientState {
    pub form: PredictionForm,
    training: ActionSlot<TrainingReport>,
    prediction: ActionSlot<Prediction>,
}

impl Default for ClientState {
    fn default() -> Self {
        ClientState {
            form: PredictionForm::default(),
            training: ActionSlot::new(Action::Train),
            prediction: ActionSlot::new(Action::Predict),
        }
    }
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn training(&self) -> &ActionSlot<TrainingReport> {
        &self.training
    }

    pub fn prediction(&self) -> &ActionSlot<Prediction> {
        &self.prediction
    }

    pub fn begin_training(&mut self) -> RequestToken {
        self.training.begin()
    }

    /// Returns `false` when the token is stale and the result was dropped.
    pub fn finish_training(
        &mut self,
        token: RequestToken,
        result: Result<TrainingReport, ClientError>,
    ) -> bool {
        self.training.finish(token, result)
    }

    /// Validates the current form. On a validation failure the prediction
    /// panel shows the message and no token is issued, so no call is made.
    pub fn submit_prediction(&mut self) -> Option<(RequestToken, PredictionRequest)> {
        match self.form.validate() {
            Ok(request) => Some((self.prediction.begin(), request)),
            Err(e) => {
                self.prediction.fail_now(e.to_string());
                None
            }
        }
    }

    pub fn finish_prediction(
        &mut self,
        token: RequestToken,
        result: Result<Prediction, ClientError>,
    ) -> bool {
        self.prediction.finish(token, result)
    }
}
