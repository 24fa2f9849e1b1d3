use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, FormError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Employment {
    #[serde(rename = "1")]
    Employed,
    #[serde(rename = "0")]
    Unemployed,
}

impl Employment {
    pub fn as_code(self) -> &'static str {
        match self {
            Employment::Employed => "1",
            Employment::Unemployed => "0",
        }
    }
}

impl FromStr for Employment {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "yes" | "true" | "employed" => Ok(Employment::Employed),
            "0" | "no" | "false" | "unemployed" => Ok(Employment::Unemployed),
            _ => Err(FormError::InvalidEmployment(s.to_string())),
        }
    }
}

impl fmt::Display for Employment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Form fields exactly as the user typed them. Missing fields decode as
/// their defaults and are caught by [`PredictionForm::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionForm {
    pub employed: String,
    pub bank_balance: String,
    pub annual_salary: String,
}

impl Default for PredictionForm {
    fn default() -> Self {
        PredictionForm {
            employed: Employment::Employed.as_code().to_string(),
            bank_balance: String::new(),
            annual_salary: String::new(),
        }
    }
}

impl PredictionForm {
    /// Applies the `required` / `type=number` constraints and builds the
    /// request body. Accepted numbers are sent as typed, minus surrounding
    /// whitespace.
    pub fn validate(&self) -> Result<PredictionRequest, FormError> {
        let employed = required("employment status", &self.employed)?.parse::<Employment>()?;
        let bank_balance = number("bank balance", &self.bank_balance)?;
        let annual_salary = number("annual salary", &self.annual_salary)?;

        Ok(PredictionRequest {
            employed,
            bank_balance,
            annual_salary,
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::MissingField(field));
    }
    Ok(value)
}

fn number(field: &'static str, value: &str) -> Result<String, FormError> {
    let value = required(field, value)?;
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(value.to_string()),
        _ => Err(FormError::NotANumber {
            field,
            value: value.to_string(),
        }),
    }
}

/// Body of a predict call. Numbers travel as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionRequest {
    pub employed: Employment,
    pub bank_balance: String,
    pub annual_salary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Probability {
    #[serde(rename = "default")]
    pub default_risk: f64,
    pub no_default: f64,
}

/// One `(feature, signed weight)` pair of the explanation list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "(String, f64)")]
pub struct Explanation {
    pub feature: String,
    pub weight: f64,
}

impl From<(String, f64)> for Explanation {
    fn from((feature, weight): (String, f64)) -> Self {
        Explanation { feature, weight }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLabel {
    DefaultRisk,
    NoRisk,
}

impl RiskLabel {
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            RiskLabel::DefaultRisk
        } else {
            RiskLabel::NoRisk
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: RiskLabel,
    pub probability: Probability,
    pub explanation: Vec<Explanation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub message: Option<String>,
    pub roc_auc: f64,
    pub classification_report: String,
    pub interpretation: String,
}

/// Raw `/predict` payload, for both outcomes.
#[derive(Debug, Deserialize)]
pub struct PredictionEnvelope {
    pub success: bool,
    pub prediction: Option<i64>,
    pub probability: Option<Probability>,
    pub explanation: Option<Vec<Explanation>>,
    pub message: Option<String>,
    pub error_details: Option<String>,
}

impl PredictionEnvelope {
    pub fn into_result(self) -> Result<Prediction, ClientError> {
        if !self.success {
            log_details(self.error_details.as_deref());
            return Err(ClientError::rejected(self.message));
        }

        Ok(Prediction {
            label: RiskLabel::from_code(self.prediction.ok_or_else(|| missing("prediction"))?),
            probability: self.probability.ok_or_else(|| missing("probability"))?,
            explanation: self.explanation.ok_or_else(|| missing("explanation"))?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Performance {
    pub roc_auc: f64,
    pub classification_report: String,
}

/// Raw `/train` payload. `performans` is the backend's field name.
#[derive(Debug, Deserialize)]
pub struct TrainEnvelope {
    pub success: bool,
    pub message: Option<String>,
    pub performans: Option<Performance>,
    pub ai_interpretation: Option<String>,
    pub error_details: Option<String>,
}

impl TrainEnvelope {
    pub fn into_result(self) -> Result<TrainingReport, ClientError> {
        if !self.success {
            log_details(self.error_details.as_deref());
            return Err(ClientError::rejected(self.message));
        }

        let performance = self.performans.ok_or_else(|| missing("performans"))?;
        Ok(TrainingReport {
            message: self.message,
            roc_auc: performance.roc_auc,
            classification_report: performance.classification_report,
            interpretation: self
                .ai_interpretation
                .ok_or_else(|| missing("ai_interpretation"))?,
        })
    }
}

fn missing(field: &str) -> ClientError {
    ClientError::Decode(format!("success payload without `{field}`"))
}

fn log_details(details: Option<&str>) {
    if let Some(details) = details {
        log::debug!("service error details: {details}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(employed: &str, balance: &str, salary: &str) -> PredictionForm {
        PredictionForm {
            employed: employed.to_string(),
            bank_balance: balance.to_string(),
            annual_salary: salary.to_string(),
        }
    }

    #[test]
    fn valid_form_serializes_to_wire_shape() {
        let request = form("1", " 500 ", "30000").validate().unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"employed": "1", "bank_balance": "500", "annual_salary": "30000"})
        );
    }

    #[test]
    fn empty_fields_are_rejected() {
        assert_eq!(
            form("1", "", "30000").validate(),
            Err(FormError::MissingField("bank balance"))
        );
        assert_eq!(
            form("0", "12", "   ").validate(),
            Err(FormError::MissingField("annual salary"))
        );
        assert_eq!(
            form("", "12", "3").validate(),
            Err(FormError::MissingField("employment status"))
        );
    }

    #[test]
    fn non_numeric_fields_are_rejected() {
        assert!(matches!(
            form("1", "abc", "30000").validate(),
            Err(FormError::NotANumber { field: "bank balance", .. })
        ));
        assert!(matches!(
            form("1", "10", "inf").validate(),
            Err(FormError::NotANumber { field: "annual salary", .. })
        ));
    }

    #[test]
    fn employment_aliases() {
        assert_eq!("yes".parse::<Employment>(), Ok(Employment::Employed));
        assert_eq!("0".parse::<Employment>(), Ok(Employment::Unemployed));
        assert_eq!(
            "maybe".parse::<Employment>(),
            Err(FormError::InvalidEmployment("maybe".to_string()))
        );
    }

    #[test]
    fn prediction_success_payload() {
        let envelope: PredictionEnvelope = serde_json::from_value(json!({
            "success": true,
            "prediction": 1,
            "probability": {"default": 0.7, "no_default": 0.3},
            "explanation": [["bank_balance", 0.05], ["annual_salary", -0.02]]
        }))
        .unwrap();

        let prediction = envelope.into_result().unwrap();
        assert_eq!(prediction.label, RiskLabel::DefaultRisk);
        assert_eq!(prediction.probability.default_risk, 0.7);
        assert_eq!(
            prediction.explanation[1],
            Explanation {
                feature: "annual_salary".to_string(),
                weight: -0.02
            }
        );
    }

    #[test]
    fn success_without_fields_is_a_decode_error() {
        let envelope: PredictionEnvelope =
            serde_json::from_value(json!({"success": true, "prediction": 0})).unwrap();
        assert!(matches!(envelope.into_result(), Err(ClientError::Decode(_))));

        let envelope: TrainEnvelope = serde_json::from_value(json!({
            "success": true,
            "performans": {"roc_auc": 0.9, "classification_report": "r"}
        }))
        .unwrap();
        assert!(matches!(envelope.into_result(), Err(ClientError::Decode(_))));
    }

    #[test]
    fn failure_payload_keeps_only_the_message() {
        let envelope: TrainEnvelope = serde_json::from_value(json!({
            "success": false,
            "message": "Please train the model first",
            "error_details": "Traceback ..."
        }))
        .unwrap();
        assert_eq!(
            envelope.into_result().unwrap_err().to_string(),
            "Please train the model first"
        );

        let envelope: PredictionEnvelope =
            serde_json::from_value(json!({"success": false})).unwrap();
        assert_eq!(
            envelope.into_result().unwrap_err().to_string(),
            crate::error::MISSING_FAILURE_MESSAGE
        );
    }

    #[test]
    fn any_code_other_than_one_is_no_risk() {
        assert_eq!(RiskLabel::from_code(1), RiskLabel::DefaultRisk);
        assert_eq!(RiskLabel::from_code(0), RiskLabel::NoRisk);
        assert_eq!(RiskLabel::from_code(2), RiskLabel::NoRisk);
    }
}
