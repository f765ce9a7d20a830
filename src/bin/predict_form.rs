//! Command-line form client.
//!
//! Usage: `predict_form age=45 Gender=male bilirubin=0.8 alk_phos=90 alt=30 ast=35
//! albumin=4.2 proteins=7.0 prothrombin=11 platelets=250 Ascites=absent LiverFirmness=absent`
//!
//! The endpoint comes from `PREDICTION_API_URL` (default `http://localhost:3000/`).

use dotenvy::dotenv;
use liver_stage_api::client::{render, FormSubmission, PredictionClient};
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "liver_stage_api=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let endpoint =
        env::var("PREDICTION_API_URL").unwrap_or_else(|_| "http://localhost:3000/".to_string());

    let form = FormSubmission::from_pairs(env::args().skip(1)).map_err(|e| anyhow::anyhow!(e))?;
    let client = PredictionClient::new(endpoint)?;

    let result = client.submit(&form).await;
    print!("{}", render(&result));

    if result.is_err() {
        std::process::exit(1);
    }
    Ok(())
}
