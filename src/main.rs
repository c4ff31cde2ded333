//Third-party-dependencies
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};

use taskboard_service::config::AppConfig;
use taskboard_service::routes;
use taskboard_service::state::AppState;
use taskboard_service::utils::auth_middleware::IdentityResolver;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        error!("❌ {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let state = AppState::new(config.clone())?;
    let address = config.bind_address.clone();

    info!("Server started at {}", address);
    info!("Storage directory: {}", config.storage_dir.display());
    info!("Attachment policy: {:?}", config.attachment_policy);
    info!("Upload limit: {} bytes", config.max_upload_bytes);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::PayloadConfig::new(config.max_upload_bytes))
            .wrap(IdentityResolver::new(config.jwt_secret.clone()))
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(routes::init_routes)
    })
    .bind(address)?
    .run()
    .await
}
