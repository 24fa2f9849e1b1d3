//! Terminal front-end for the credit-default prediction service.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use credit_client::render::{prediction_panel, training_panel, Panel, PredictionView, TrainingView};
use credit_client::{ApiClient, ClientConfig, ClientState, Employment, PredictionForm, RouteLayout};
use log::info;

#[derive(Parser)]
#[command(name = "credit")]
#[command(about = "Train the credit-default model and request predictions")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Base URL of the prediction service
    #[arg(long, global = true, env = "CREDIT_API_URL")]
    api_url: Option<String>,

    /// Endpoint layout: `api` for /api/train, `root` for /train
    #[arg(long, global = true, env = "CREDIT_API_ROUTES")]
    routes: Option<RouteLayout>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "CREDIT_API_TIMEOUT_SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train (or retrain) the model and show its performance
    Train,

    /// Predict default risk for one applicant
    Predict {
        /// Employment status: 1/0, yes/no
        #[arg(short, long, default_value = "1")]
        employed: Employment,

        /// Current bank balance
        #[arg(short, long)]
        bank_balance: String,

        /// Annual salary
        #[arg(short, long)]
        annual_salary: String,
    },
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::from_env().context("Invalid client configuration")?;
        if let Some(url) = &self.api_url {
            config.base_url = credit_client::config::parse_base_url(url)?;
        }
        if let Some(routes) = self.routes {
            config.routes = routes;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// Runs the train action once, printing the loading banner first.
async fn run_train(client: &ApiClient) -> Panel<TrainingView> {
    let mut state = ClientState::new();
    let token = state.begin_training();
    println!("{}", training_panel(state.training()));

    let result = client.train().await;
    state.finish_training(token, result);
    training_panel(state.training())
}

/// Runs the predict action once. An invalid form fails without a request.
async fn run_predict(client: &ApiClient, form: PredictionForm) -> Panel<PredictionView> {
    let mut state = ClientState::new();
    state.form = form;
    if let Some((token, request)) = state.submit_prediction() {
        let result = client.predict(&request).await;
        state.finish_prediction(token, result);
    }
    prediction_panel(state.prediction())
}

fn exit_code<V>(panel: &Panel<V>) -> u8 {
    if panel.is_failed() {
        1
    } else {
        0
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    let config = cli.client_config()?;
    info!("Using {} ({} routes)", config.base_url, config.routes);
    let client = ApiClient::new(config).context("Failed to create HTTP client")?;

    let code = match cli.command {
        Commands::Train => {
            let panel = run_train(&client).await;
            println!("{panel}");
            exit_code(&panel)
        }
        Commands::Predict {
            employed,
            bank_balance,
            annual_salary,
        } => {
            let form = PredictionForm {
                employed: employed.as_code().to_string(),
                bank_balance,
                annual_salary,
            };
            let panel = run_predict(&client, form).await;
            println!("{panel}");
            exit_code(&panel)
        }
    };

    Ok(ExitCode::from(code))
}
