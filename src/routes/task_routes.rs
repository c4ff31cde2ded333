// taskboard-service/src/routes/task_routes.rs
use crate::models::{CreateTaskRequest, ScopeQuery, ServiceError, TaskListQuery, UpdateTaskRequest};
use crate::services::task_service;
use crate::state::AppState;
use crate::utils::get_identity_from_request;
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::info;
use serde_json::json;

// List tasks for the personal or a team scope
#[get("/tasks")]
async fn list_tasks(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<TaskListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req);
    let (scope, filter) = query.into_inner().into_parts();

    info!("📋 Listing tasks in {:?} for {:?}", scope, identity);

    let tasks = task_service::list_tasks(&state.store, &identity, &scope, &filter)?;

    info!("✅ Found {} tasks", tasks.len());
    Ok(HttpResponse::Ok().json(tasks))
}

#[get("/tasks/categories")]
async fn list_categories(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ScopeQuery>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req);
    let scope = query.into_inner().into_scope();

    info!("📋 Listing categories in {:?}", scope);

    let categories = task_service::list_categories(&state.store, &identity, &scope)?;
    Ok(HttpResponse::Ok().json(categories))
}

#[post("/tasks")]
async fn create_task(
    req: HttpRequest,
    state: web::Data<AppState>,
    data: web::Json<CreateTaskRequest>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req);

    info!("📝 Creating task: {}", data.title);

    let task = task_service::create_task(&state.store, &identity, data.into_inner(), Utc::now())?;
    Ok(HttpResponse::Created().json(task))
}

#[patch("/tasks/{task_id}")]
async fn update_task(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    data: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req);
    let task_id = path.into_inner();

    info!("🔄 Updating task: {}", task_id);

    let task = task_service::update_task(&state.store, &identity, &task_id, data.into_inner())?;
    Ok(HttpResponse::Ok().json(task))
}

#[delete("/tasks/{task_id}")]
async fn delete_task(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req);
    let task_id = path.into_inner();

    info!("🗑️ Deleting task: {}", task_id);

    task_service::delete_task(&state.store, &state.blobs, &identity, &task_id)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task deleted successfully",
        "taskId": task_id
    })))
}

#[post("/tasks/{task_id}/toggle")]
async fn toggle_task_complete(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req);
    let task_id = path.into_inner();

    info!("🔄 Toggling completion of task: {}", task_id);

    let task = task_service::toggle_task_complete(&state.store, &identity, &task_id)?;
    Ok(HttpResponse::Ok().json(task))
}

// Register all task routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_categories)
        .service(list_tasks)
        .service(create_task)
        .service(update_task)
        .service(delete_task)
        .service(toggle_task_complete);
}
