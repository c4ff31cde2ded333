// taskboard-service/src/routes/file_routes.rs
use crate::models::{SaveFileRequest, ServiceError, UploadResponse, UploadUrlResponse};
use crate::services::attachment_service;
use crate::state::AppState;
use crate::utils::get_identity_from_request;
use actix_web::http::header;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use log::info;
use serde_json::json;

// GET ROUTES
#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().body("Taskboard service is running.")
}

// Serves a stored blob
#[get("/blobs/{storage_id}")]
async fn get_blob(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let storage_id = path.into_inner();
    let blob = state.blobs.read(&storage_id)?;
    let etag = format!("\"{}\"", blob.etag);

    let not_modified = req
        .headers()
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value == etag);
    if not_modified {
        return Ok(HttpResponse::NotModified().finish());
    }

    Ok(HttpResponse::Ok()
        .content_type(blob.content_type)
        .append_header((header::ETAG, etag))
        .body(blob.content))
}

// Attachments of a task, with retrieval URLs
#[get("/tasks/{task_id}/files")]
async fn list_task_files(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req);
    let task_id = path.into_inner();

    let files = attachment_service::list_attachments(&state.store, &state.blobs, &identity, &task_id)?;
    Ok(HttpResponse::Ok().json(files))
}

// POST ROUTES

// Hands out a one-time upload target
#[post("/files/upload-url")]
async fn generate_upload_url(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req);
    let upload_url = attachment_service::request_upload_slot(&state.blobs, &identity)?;
    Ok(HttpResponse::Ok().json(UploadUrlResponse { upload_url }))
}

// Receives the content for an upload slot
#[post("/upload/{slot_id}")]
async fn upload_blob(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, ServiceError> {
    let slot_id = path.into_inner();
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let storage_id = state.blobs.store_upload(&slot_id, &body, content_type)?;
    Ok(HttpResponse::Ok().json(UploadResponse { storage_id }))
}

// Records an uploaded blob as an attachment of a task
#[post("/tasks/{task_id}/files")]
async fn save_file(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    data: web::Json<SaveFileRequest>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req);
    let task_id = path.into_inner();

    info!("📎 Attaching {} to task: {}", data.file_name, task_id);

    let attachment = attachment_service::attach_file(
        &state.store,
        &identity,
        &task_id,
        data.into_inner(),
        state.config.attachment_policy,
        Utc::now(),
    )?;
    Ok(HttpResponse::Created().json(attachment))
}

// DELETE ROUTES
#[delete("/files/{file_id}")]
async fn delete_file(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let identity = get_identity_from_request(&req);
    let file_id = path.into_inner();

    info!("🗑️ Deleting file: {}", file_id);

    attachment_service::delete_attachment(
        &state.store,
        &state.blobs,
        &identity,
        &file_id,
        state.config.attachment_policy,
    )?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "File deleted successfully",
        "fileId": file_id
    })))
}

// Register routes function for easy import
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(get_blob)
        .service(list_task_files)
        .service(generate_upload_url)
        .service(upload_blob)
        .service(save_file)
        .service(delete_file);
}
