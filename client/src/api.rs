//! HTTP calls against the prediction service.

use log::{debug, info, warn};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::types::{PredictionEnvelope, PredictionRequest, Prediction, TrainEnvelope, TrainingReport};

/// Client for the `/train` and `/predict` endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Asks the service to (re)train its model. Sends no body.
    pub async fn train(&self) -> Result<TrainingReport, ClientError> {
        let url = self.config.train_url();
        info!("Requesting model training at {url}");

        let response = self.client.post(&url).send().await?;
        let envelope: TrainEnvelope = read_envelope(response).await?;
        let report = envelope.into_result()?;

        info!("Model trained: roc_auc={:.4}", report.roc_auc);
        Ok(report)
    }

    pub async fn predict(&self, request: &PredictionRequest) -> Result<Prediction, ClientError> {
        let url = self.config.predict_url();
        info!("Requesting prediction at {url}");
        debug!("Prediction request: {request:?}");

        let response = self.client.post(&url).json(request).send().await?;
        let envelope: PredictionEnvelope = read_envelope(response).await?;
        let prediction = envelope.into_result()?;

        info!(
            "Prediction received: {:?}, default probability={:.3}",
            prediction.label, prediction.probability.default_risk
        );
        Ok(prediction)
    }
}

/// Decodes the response envelope whatever the status code: the service
/// reports its own failures as `success: false` with 4xx/5xx.
async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    match serde_json::from_str::<T>(&body) {
        Ok(envelope) => {
            if !status.is_success() {
                debug!("Service answered {status} with an envelope");
            }
            Ok(envelope)
        }
        Err(e) if status.is_success() => Err(ClientError::Decode(e.to_string())),
        Err(_) => {
            warn!("Service answered {status} without an envelope");
            Err(ClientError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
