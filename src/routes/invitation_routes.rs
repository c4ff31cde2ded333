// taskboard-service/src/routes/invitation_routes.rs
use crate::models::{InviteTokenResponse, JoinTeamRequest, JoinTeamResponse, ServiceError};
use crate::services::team_service;
use crate::state::AppState;
use crate::utils::get_identity_from_request;
use actix_web::{post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::info;

// Issue an invite token for a team
#[post("/teams/{team_id}/invitations")]
async fn create_invitation(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req);
    let team_id = path.into_inner();

    info!("📧 Creating invite token for team: {}", team_id);

    let invitation = team_service::generate_invite_token(&state.store, &identity, &team_id, Utc::now())?;

    Ok(HttpResponse::Created().json(InviteTokenResponse {
        token: invitation.token,
        expires_at: invitation.expires_at,
    }))
}

// Redeem an invite token
#[post("/invitations/join")]
async fn join_team(
    req: HttpRequest,
    state: web::Data<AppState>,
    data: web::Json<JoinTeamRequest>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req);

    info!("🔑 Redeeming invite token for {:?}", identity);

    let team_id = team_service::join_team(&state.store, &identity, &data.invite_token, Utc::now())?;
    Ok(HttpResponse::Ok().json(JoinTeamResponse { team_id }))
}

// Register all invitation routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_invitation).service(join_team);
}
