pub mod config;
pub mod error;
pub mod features;
pub mod handlers;
pub mod logger;
pub mod model_store;
pub mod models;
pub mod schema;
pub mod view;

pub use config::Config;
pub use error::{PredictorError, Result};
pub use features::{build_features, duration_minutes, FeatureVector};
pub use model_store::{ModelStore, OnnxRegressor, Regressor};
pub use models::{Estimate, ItineraryInput};
pub use schema::ColumnSchema;
