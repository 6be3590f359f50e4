use std::path::Path;
use std::sync::Arc;

use tract_onnx::prelude::*;

use crate::config::Config;
use crate::error::{PredictorError, Result};
use crate::features::{build_features, FeatureVector};
use crate::models::{Estimate, ItineraryInput};
use crate::schema::ColumnSchema;

/// A trained price model.
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64>;
}

type Plan = TypedRunnableModel<TypedModel>;

/// Regression model exported to ONNX, expecting one `f32 [1, n]` input row.
pub struct OnnxRegressor {
    plan: Plan,
    n_features: usize,
}

impl OnnxRegressor {
    pub fn load(path: impl AsRef<Path>, n_features: usize) -> Result<Self> {
        let path = path.as_ref();
        let load_err = |e: TractError| PredictorError::ModelLoad {
            path: path.display().to_string(),
            message: format!("{e:#}"),
        };

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_err)?
            .with_input_fact(0, f32::fact([1, n_features]).into())
            .map_err(load_err)?
            .into_optimized()
            .map_err(load_err)?
            .into_runnable()
            .map_err(load_err)?;

        tracing::info!(
            "Loaded ONNX model from {} ({} input features)",
            path.display(),
            n_features
        );

        Ok(Self { plan, n_features })
    }
}

impl Regressor for OnnxRegressor {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        if features.len() != self.n_features {
            return Err(PredictorError::inference(format!(
                "model expects {} features, got {}",
                self.n_features,
                features.len()
            )));
        }

        let tensor = features.to_array().into_tensor();

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| PredictorError::inference(format!("{e:#}")))?;

        let output = outputs
            .first()
            .ok_or_else(|| PredictorError::inference("model produced no outputs"))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| PredictorError::inference(format!("{e:#}")))?;

        view.iter()
            .next()
            .map(|value| f64::from(*value))
            .ok_or_else(|| PredictorError::inference("model output is empty"))
    }
}

/// Column schema and model, loaded once and read-only afterwards.
#[derive(Clone)]
pub struct ModelStore {
    schema: Arc<ColumnSchema>,
    regressor: Arc<dyn Regressor>,
}

impl ModelStore {
    pub fn new(schema: ColumnSchema, regressor: impl Regressor + 'static) -> Self {
        Self {
            schema: Arc::new(schema),
            regressor: Arc::new(regressor),
        }
    }

    pub fn load(config: &Config) -> Result<Self> {
        let schema = ColumnSchema::load(&config.columns_path)?;
        let regressor = OnnxRegressor::load(&config.model_path, schema.len())?;
        Ok(Self::new(schema, regressor))
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn estimate(&self, input: &ItineraryInput) -> Result<Estimate> {
        let features = build_features(input, &self.schema)?;
        tracing::debug!("Built {} features for {}", features.len(), input.airline);

        let raw = self.regressor.predict(&features)?;
        Ok(Estimate { raw, features })
    }
}
