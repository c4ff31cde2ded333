// taskboard-service/src/routes/mod.rs
use actix_web::web;

pub mod file_routes;
pub mod invitation_routes;
pub mod task_routes;
pub mod team_routes;
pub mod user_routes;

// Register every route group
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    file_routes::init_routes(cfg);
    task_routes::init_routes(cfg);
    team_routes::init_routes(cfg);
    invitation_routes::init_routes(cfg);
    user_routes::init_routes(cfg);
}
