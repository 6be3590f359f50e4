use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::{PredictorError, Result};
use crate::model_store::ModelStore;
use crate::models::{Estimate, HealthResponse, ItineraryInput, PredictionResponse};
use crate::view::render_index;

/// Registers every route plus extractor configs that report through `PredictorError`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| PredictorError::invalid_input(err.to_string()).into()),
    )
    .app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| PredictorError::invalid_input(err.to_string()).into()),
    )
    .service(web::resource("/").route(web::get().to(home)))
    .service(web::resource("/predict").route(web::post().to(predict_form)))
    .service(web::resource("/api/predict").route(web::post().to(predict_json)))
    .service(web::resource("/health").route(web::get().to(health)));
}

pub async fn home() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_index(None))
}

pub async fn predict_form(
    store: web::Data<ModelStore>,
    form: web::Form<ItineraryInput>,
) -> Result<HttpResponse> {
    let estimate = run_estimate(&store, &form.into_inner())?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_index(Some(&estimate.display_text()))))
}

pub async fn predict_json(
    store: web::Data<ModelStore>,
    payload: web::Json<ItineraryInput>,
) -> Result<HttpResponse> {
    let estimate = run_estimate(&store, &payload.into_inner())?;
    Ok(HttpResponse::Ok().json(PredictionResponse::from(estimate)))
}

pub async fn health(store: web::Data<ModelStore>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        columns: store.schema().len(),
    })
}

fn run_estimate(store: &ModelStore, input: &ItineraryInput) -> Result<Estimate> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("predict", %request_id);
    let _guard = span.enter();

    match store.estimate(input) {
        Ok(estimate) => {
            tracing::info!(
                "{} {} -> {}: predicted {:.2}",
                input.airline,
                input.source,
                input.destination,
                estimate.rounded()
            );
            Ok(estimate)
        }
        Err(e) => {
            tracing::error!("Prediction failed: {}", e);
            Err(e)
        }
    }
}
