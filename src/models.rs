use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// Raw itinerary fields as submitted by the form or the JSON API.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ItineraryInput {
    pub airline: String,
    pub source: String,
    pub destination: String,
    pub total_stops: u32,
    pub departure_datetime: String,
    pub arrival_datetime: String,
}

/// Model output for one itinerary.
#[derive(Debug, Clone)]
pub struct Estimate {
    pub raw: f64,
    pub features: FeatureVector,
}

impl Estimate {
    pub fn rounded(&self) -> f64 {
        (self.raw * 100.0).round() / 100.0
    }

    /// Text shown on the rendered page.
    pub fn display_text(&self) -> String {
        format!("Predicted Flight Price: ₹{:.2}", self.rounded())
    }
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub predicted_price: f64,
    pub currency: &'static str,
    #[serde(skip_serializing_if = "FeatureVector::is_empty")]
    pub features: FeatureVector,
}

impl From<Estimate> for PredictionResponse {
    fn from(estimate: Estimate) -> Self {
        Self {
            predicted_price: estimate.rounded(),
            currency: "INR",
            features: estimate.features,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub columns: usize,
}
