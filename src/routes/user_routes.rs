// taskboard-service/src/routes/user_routes.rs
use crate::models::{ServiceError, UserLookupRequest};
use crate::services::user_service;
use crate::state::AppState;
use actix_web::{get, post, web, HttpResponse};
use log::info;

// Get user by ID (for member display)
#[get("/users/{user_id}")]
async fn get_user_by_id(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = path.into_inner();

    info!("🔍 Fetching user: {}", user_id);

    let user = user_service::get_user(&state.store, &user_id)?;
    Ok(HttpResponse::Ok().json(user))
}

#[post("/users/lookup")]
async fn lookup_users(
    state: web::Data<AppState>,
    data: web::Json<UserLookupRequest>,
) -> Result<HttpResponse, ServiceError> {
    info!("🔍 Looking up {} users", data.user_ids.len());

    let users = user_service::get_users(&state.store, &data.user_ids)?;
    Ok(HttpResponse::Ok().json(users))
}

// Register all user routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_user_by_id).service(lookup_users);
}
