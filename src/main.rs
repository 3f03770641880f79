use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod data;
mod engine;

use config::{Command, Config};
use engine::SituationInput;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    let context = data::load_context(&config.data_dir, config.models_dir(), config.fidelity)
        .with_context(|| format!("Failed to load tables from {}", config.data_dir.display()))?;
    let status = context.model_status();
    info!(
        "Engine ready ({:?} fidelity; trained models: conversion={} epa_success={} wpa_success={})",
        context.fidelity, status.conversion, status.epa_success, status.wpa_success
    );

    match config.command {
        Command::Evaluate(args) => {
            let input = SituationInput::from(args);
            let evaluation = engine::evaluate_input(&context, &input)?;
            println!("{}", serde_json::to_string_pretty(&evaluation)?);
        }
        Command::Serve { addr } => {
            let app = api::router(Arc::new(context));
            let addr: SocketAddr = addr.parse()?;
            info!("API listening on http://{}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
