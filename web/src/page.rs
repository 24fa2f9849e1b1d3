//! HTML rendering of a session's panels.

use std::fmt;

use credit_client::render::{prediction_panel, training_panel, Banner, Panel, PredictionView, TrainingView};
use credit_client::ClientState;

/// Escapes text for element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn banner(f: &mut fmt::Formatter<'_>, banner: &Banner) -> fmt::Result {
    write!(
        f,
        r#"<div class="alert alert-{}">{}</div>"#,
        banner.tone.as_str(),
        escape(&banner.text)
    )
}

fn training_view(f: &mut fmt::Formatter<'_>, view: &TrainingView) -> fmt::Result {
    banner(f, &view.banner)?;
    write!(
        f,
        "<h4>Model performance</h4>\
         <p><strong>ROC AUC score:</strong> {}</p>\
         <pre>{}</pre>\
         <h5>Interpretation</h5><p>",
        escape(&view.roc_auc),
        escape(&view.classification_report),
    )?;
    for (i, line) in view.interpretation.iter().enumerate() {
        if i > 0 {
            f.write_str("<br>")?;
        }
        f.write_str(&escape(line))?;
    }
    f.write_str("</p>")
}

fn prediction_view(f: &mut fmt::Formatter<'_>, view: &PredictionView) -> fmt::Result {
    write!(
        f,
        r#"<div class="alert alert-{}"><h4>Prediction</h4><p><strong>{}</strong></p>"#,
        view.tone.as_str(),
        escape(view.headline)
    )?;
    write!(
        f,
        "<p>Probabilities:</p><ul><li>No default: {}</li><li>Default: {}</li></ul>",
        view.no_default_probability, view.default_probability
    )?;
    f.write_str("<h5>Feature impacts</h5><ul>")?;
    for impact in &view.impacts {
        write!(f, "<li>{}</li>", escape(&impact.to_string()))?;
    }
    f.write_str("</ul></div>")
}

fn panel<V>(
    f: &mut fmt::Formatter<'_>,
    panel: &Panel<V>,
    ready: fn(&mut fmt::Formatter<'_>, &V) -> fmt::Result,
) -> fmt::Result {
    match panel {
        Panel::Empty => Ok(()),
        Panel::Loading(b) | Panel::Failed(b) => banner(f, b),
        Panel::Ready(view) => ready(f, view),
    }
}

fn selected(form_value: &str, option: &str) -> &'static str {
    if form_value.trim() == option {
        " selected"
    } else {
        ""
    }
}

fn disabled(loading: bool) -> &'static str {
    if loading {
        " disabled"
    } else {
        ""
    }
}

/// The whole page for one session.
pub struct Page<'a>(pub &'a ClientState);

impl fmt::Display for Page<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        let form = &state.form;

        f.write_str(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
             <title>Credit default prediction</title>\
             <link rel=\"stylesheet\" href=\"/static/style.css\"></head><body><main>\
             <h1>Credit default prediction</h1>",
        )?;

        write!(
            f,
            r#"<section><h2>Model training</h2><form method="post" action="/train"><button type="submit"{}>Train model</button></form><div id="trainingStatus">"#,
            disabled(state.training().is_loading())
        )?;
        panel(f, &training_panel(state.training()), training_view)?;
        f.write_str("</div></section>")?;

        write!(
            f,
            r#"<section><h2>Prediction</h2><form method="post" action="/predict">
<label for="employed">Employment status</label>
<select id="employed" name="employed"><option value="1"{}>Employed</option><option value="0"{}>Unemployed</option></select>
<label for="bank_balance">Bank balance</label>
<input id="bank_balance" name="bank_balance" type="number" step="any" required value="{}">
<label for="annual_salary">Annual salary</label>
<input id="annual_salary" name="annual_salary" type="number" step="any" required value="{}">
<button type="submit"{}>Predict</button></form><div id="predictionResult">"#,
            selected(&form.employed, "1"),
            selected(&form.employed, "0"),
            escape(&form.bank_balance),
            escape(&form.annual_salary),
            disabled(state.prediction().is_loading())
        )?;
        panel(f, &prediction_panel(state.prediction()), prediction_view)?;
        f.write_str("</div></section>")?;

        if let Some(at) = [state.training().updated_at(), state.prediction().updated_at()]
            .into_iter()
            .flatten()
            .max()
        {
            write!(f, "<footer>Last updated {}</footer>", at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        }

        f.write_str("</main></body></html>")
    }
}

pub fn render(state: &ClientState) -> String {
    Page(state).to_string()
}
