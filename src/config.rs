use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::error::{PredictorError, Result};

#[derive(Debug, Clone, Parser)]
#[command(name = "flight-price-backend")]
#[command(about = "Serves flight price estimates from a trained regression model")]
pub struct Config {
    #[arg(long, env = "FLIGHT_MODEL_PATH", default_value = "flight_price_prediction.onnx")]
    pub model_path: PathBuf,

    #[arg(long, env = "FLIGHT_COLUMNS_PATH", default_value = "model_columns.json")]
    pub columns_path: PathBuf,

    #[arg(long, env = "FLIGHT_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    #[arg(long, env = "FLIGHT_WORKERS", help = "HTTP worker threads (defaults to CPU count)")]
    pub workers: Option<usize>,

    #[arg(long, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.model_path.as_os_str().is_empty() {
            return Err(PredictorError::invalid_input("model path cannot be empty"));
        }
        if self.columns_path.as_os_str().is_empty() {
            return Err(PredictorError::invalid_input("columns path cannot be empty"));
        }
        self.bind_addr()?;
        if self.workers == Some(0) {
            return Err(PredictorError::invalid_input("workers must be at least 1"));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind.parse().map_err(|e| {
            PredictorError::invalid_input(format!("invalid bind address '{}': {}", self.bind, e))
        })
    }
}
