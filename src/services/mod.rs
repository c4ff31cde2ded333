// taskboard-service/src/services/mod.rs
pub mod attachment_service;
pub mod authorization;
pub mod task_service;
pub mod team_service;
pub mod user_service;
