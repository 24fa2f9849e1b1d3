//! Rendering-agnostic view model.
//!
//! Shells turn [`ClientState`](crate::state::ClientState) slots into panels
//! here and only decide how a panel looks (plain text via `Display`, HTML in
//! the web shell). All number formatting lives in this module.

use std::fmt;

use crate::state::{ActionSlot, Phase};
use crate::types::{Explanation, Prediction, RiskLabel, TrainingReport};

pub const TRAINING_IN_PROGRESS: &str = "Training model, please wait...";
pub const PREDICTION_IN_PROGRESS: &str = "Predicting...";
pub const TRAINING_SUCCEEDED: &str = "Model trained successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Danger,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Info => "info",
            Tone::Success => "success",
            Tone::Warning => "warning",
            Tone::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub tone: Tone,
    pub text: String,
}

impl Banner {
    pub fn new(tone: Tone, text: impl Into<String>) -> Self {
        Banner {
            tone,
            text: text.into(),
        }
    }

    pub fn error(message: &str) -> Self {
        Banner::new(Tone::Danger, format!("Error: {message}"))
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tone.as_str(), self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactDirection {
    Positive,
    Negative,
}

impl ImpactDirection {
    /// Strictly positive weights are positive; zero and NaN are negative.
    pub fn of(weight: f64) -> Self {
        if weight > 0.0 {
            ImpactDirection::Positive
        } else {
            ImpactDirection::Negative
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ImpactDirection::Positive => "Positive impact",
            ImpactDirection::Negative => "Negative impact",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpactLine {
    pub feature: String,
    pub direction: ImpactDirection,
    pub magnitude: String,
}

impl ImpactLine {
    pub fn from_explanation(explanation: &Explanation) -> Self {
        ImpactLine {
            feature: explanation.feature.clone(),
            direction: ImpactDirection::of(explanation.weight),
            magnitude: format_magnitude(explanation.weight),
        }
    }
}

impl fmt::Display for ImpactLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.feature, self.direction.label(), self.magnitude)
    }
}

/// Rounds half away from zero at `decimals` places. `format!` alone rounds
/// exact binary ties to even (`0.0625` → `0.062`).
fn round_to(x: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (x * scale).round() / scale
}

/// `0.4567` → `"45.67%"`.
pub fn format_percent(p: f64) -> String {
    format!("{:.2}%", (p * 10000.0).round() / 100.0)
}

/// Absolute weight with three decimals.
pub fn format_magnitude(weight: f64) -> String {
    format!("{:.3}", round_to(weight.abs(), 3))
}

pub fn format_auc(auc: f64) -> String {
    format!("{:.4}", round_to(auc, 4))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionView {
    pub tone: Tone,
    pub headline: &'static str,
    pub default_probability: String,
    pub no_default_probability: String,
    pub impacts: Vec<ImpactLine>,
}

impl PredictionView {
    pub fn new(prediction: &Prediction) -> Self {
        let (tone, headline) = match prediction.label {
            RiskLabel::DefaultRisk => (Tone::Warning, "Default risk present"),
            RiskLabel::NoRisk => (Tone::Success, "No risk"),
        };

        PredictionView {
            tone,
            headline,
            default_probability: format_percent(prediction.probability.default_risk),
            no_default_probability: format_percent(prediction.probability.no_default),
            impacts: prediction
                .explanation
                .iter()
                .map(ImpactLine::from_explanation)
                .collect(),
        }
    }
}

impl fmt::Display for PredictionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.tone.as_str(), self.headline)?;
        writeln!(f, "Probabilities:")?;
        writeln!(f, "  No default: {}", self.no_default_probability)?;
        writeln!(f, "  Default: {}", self.default_probability)?;
        write!(f, "Feature impacts:")?;
        for impact in &self.impacts {
            write!(f, "\n  {impact}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingView {
    pub banner: Banner,
    pub roc_auc: String,
    pub classification_report: String,
    pub interpretation: Vec<String>,
}

impl TrainingView {
    pub fn new(report: &TrainingReport) -> Self {
        let message = report
            .message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(TRAINING_SUCCEEDED);

        TrainingView {
            banner: Banner::new(Tone::Success, message),
            roc_auc: format_auc(report.roc_auc),
            classification_report: report.classification_report.clone(),
            interpretation: report.interpretation.lines().map(str::to_string).collect(),
        }
    }
}

impl fmt::Display for TrainingView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.banner)?;
        writeln!(f, "Model performance")?;
        writeln!(f, "ROC AUC score: {}", self.roc_auc)?;
        writeln!(f, "{}", self.classification_report.trim_end())?;
        write!(f, "Interpretation:")?;
        for line in &self.interpretation {
            write!(f, "\n  {line}")?;
        }
        Ok(())
    }
}

/// What a shell shows for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel<V> {
    Empty,
    Loading(Banner),
    Ready(V),
    Failed(Banner),
}

impl<V> Panel<V> {
    pub fn is_failed(&self) -> bool {
        matches!(self, Panel::Failed(_))
    }
}

impl<V: fmt::Display> fmt::Display for Panel<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Panel::Empty => Ok(()),
            Panel::Loading(banner) | Panel::Failed(banner) => fmt::Display::fmt(banner, f),
            Panel::Ready(view) => fmt::Display::fmt(view, f),
        }
    }
}

fn panel<T, V>(slot: &ActionSlot<T>, loading: &str, view: impl FnOnce(&T) -> V) -> Panel<V> {
    match slot.phase() {
        Phase::Idle => Panel::Empty,
        Phase::Loading => Panel::Loading(Banner::new(Tone::Info, loading)),
        Phase::Ready(value) => Panel::Ready(view(value)),
        Phase::Failed(message) => Panel::Failed(Banner::error(message)),
    }
}

pub fn training_panel(slot: &ActionSlot<TrainingReport>) -> Panel<TrainingView> {
    panel(slot, TRAINING_IN_PROGRESS, TrainingView::new)
}

pub fn prediction_panel(slot: &ActionSlot<Prediction>) -> Panel<PredictionView> {
    panel(slot, PREDICTION_IN_PROGRESS, PredictionView::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::state::ClientState;
    use crate::types::{PredictionForm, Probability};

    fn sample_prediction(label: RiskLabel) -> Prediction {
        Prediction {
            label,
            probability: Probability {
                default_risk: 0.12,
                no_default: 0.88,
            },
            explanation: vec![
                ("bank_balance".to_string(), 0.05).into(),
                ("annual_salary".to_string(), -0.02).into(),
            ],
        }
    }

    #[test]
    fn percentages_have_two_decimals() {
        assert_eq!(format_percent(0.4567), "45.67%");
        assert_eq!(format_percent(0.12), "12.00%");
        assert_eq!(format_percent(1.0), "100.00%");
        assert_eq!(format_percent(0.0), "0.00%");
    }

    #[test]
    fn ties_round_up() {
        assert_eq!(format_magnitude(0.0625), "0.063");
        assert_eq!(format_magnitude(-0.1875), "0.188");
        assert_eq!(format_percent(0.00625), "0.63%");
        assert_eq!(format_percent(0.00125), "0.13%");
        assert_eq!(format_auc(0.03125), "0.0313");
    }

    #[test]
    fn impact_sign_and_magnitude() {
        assert_eq!(ImpactDirection::of(0.2), ImpactDirection::Positive);
        assert_eq!(ImpactDirection::of(-0.2), ImpactDirection::Negative);
        assert_eq!(ImpactDirection::of(0.0), ImpactDirection::Negative);
        assert_eq!(ImpactDirection::of(-0.0), ImpactDirection::Negative);
        assert_eq!(ImpactDirection::of(f64::NAN), ImpactDirection::Negative);

        assert_eq!(format_magnitude(-0.12345), "0.123");
        assert_eq!(format_magnitude(0.0506), "0.051");
    }

    #[test]
    fn risk_label_selects_tone() {
        let view = PredictionView::new(&sample_prediction(RiskLabel::DefaultRisk));
        assert_eq!(view.tone, Tone::Warning);
        assert_eq!(view.headline, "Default risk present");

        let view = PredictionView::new(&sample_prediction(RiskLabel::NoRisk));
        assert_eq!(view.tone, Tone::Success);
        assert_eq!(view.headline, "No risk");
    }

    #[test]
    fn prediction_text_rendering() {
        let view = PredictionView::new(&sample_prediction(RiskLabel::NoRisk));
        assert_eq!(
            view.to_string(),
            "[success] No risk\n\
             Probabilities:\n  No default: 88.00%\n  Default: 12.00%\n\
             Feature impacts:\n  bank_balance: Positive impact (0.050)\n  \
             annual_salary: Negative impact (0.020)"
        );
    }

    #[test]
    fn training_view_formats_metrics() {
        let view = TrainingView::new(&TrainingReport {
            message: None,
            roc_auc: 0.912345,
            classification_report: "precision recall\n".to_string(),
            interpretation: "Good model.\nBalance matters most.".to_string(),
        });

        assert_eq!(view.banner, Banner::new(Tone::Success, TRAINING_SUCCEEDED));
        assert_eq!(view.roc_auc, "0.9123");
        assert_eq!(view.interpretation, vec!["Good model.", "Balance matters most."]);
    }

    #[test]
    fn panels_follow_the_slot_phase() {
        let mut state = ClientState::new();
        assert_eq!(training_panel(state.training()), Panel::Empty);

        let token = state.begin_training();
        assert_eq!(
            training_panel(state.training()),
            Panel::Loading(Banner::new(Tone::Info, TRAINING_IN_PROGRESS))
        );

        state.finish_training(token, Err(ClientError::Rejected("no data".to_string())));
        let panel = training_panel(state.training());
        assert_eq!(panel, Panel::Failed(Banner::new(Tone::Danger, "Error: no data")));
        assert_eq!(panel.to_string(), "[danger] Error: no data");
    }

    #[test]
    fn failed_prediction_shows_only_the_message() {
        let mut state = ClientState::new();
        state.form = PredictionForm {
            employed: "1".to_string(),
            bank_balance: "1".to_string(),
            annual_salary: "2".to_string(),
        };
        let (token, _) = state.submit_prediction().unwrap();
        state.finish_prediction(
            token,
            Err(ClientError::Rejected("Please train the model first".to_string())),
        );

        let rendered = prediction_panel(state.prediction()).to_string();
        assert_eq!(rendered, "[danger] Error: Please train the model first");
        assert!(!rendered.contains('%'));
    }
}
