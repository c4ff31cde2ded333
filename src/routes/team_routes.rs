// taskboard-service/src/routes/team_routes.rs
use crate::models::{ServiceError, TeamData};
use crate::services::team_service;
use crate::state::AppState;
use crate::utils::get_identity_from_request;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::info;

// Create a new team with the caller as owner
#[post("/teams")]
async fn create_team(
    req: HttpRequest,
    state: web::Data<AppState>,
    team_data: web::Json<TeamData>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req);

    info!("📝 Creating new team: {}", team_data.name);

    let team = team_service::create_team(&state.store, &identity, &team_data.name, Utc::now())?;
    Ok(HttpResponse::Created().json(team))
}

// Get all teams for the current user
#[get("/teams")]
async fn get_user_teams(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req);

    info!("📋 Fetching teams for {:?}", identity);

    let teams = team_service::list_my_teams(&state.store, &identity)?;

    info!("✅ Found {} teams", teams.len());
    Ok(HttpResponse::Ok().json(teams))
}

// Get team members
#[get("/teams/{team_id}/members")]
async fn get_team_members(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req);
    let team_id = path.into_inner();

    info!("📋 Fetching members for team: {}", team_id);

    let members = team_service::list_members(&state.store, &identity, &team_id)?;

    info!("✅ Found {} team members", members.len());
    Ok(HttpResponse::Ok().json(members))
}

// Register all team routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_team)
        .service(get_user_teams)
        .service(get_team_members);
}
