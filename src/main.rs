use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use flight_price_backend::{handlers, logger, Config, ModelStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logger::init_logger(config.verbose, config.log_json);

    config.validate().context("invalid configuration")?;
    let addr = config.bind_addr()?;

    let store = ModelStore::load(&config).context("failed to load model artifacts")?;
    let store = web::Data::new(store);

    tracing::info!("Server running at http://{}", addr);

    let mut server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(store.clone())
            .configure(handlers::configure)
    });

    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server.bind(addr)?.run().await?;
    Ok(())
}
