use crate::application::caption_service::{CaptionService, ExportArtifact, OverlayOptions};
use crate::application::error::ApplicationError;
use crate::application::session_service::{SessionService, StyleUpdate};
use crate::domain::catalog::Catalog;
use crate::domain::editor::{EditorSnapshot, PointerEvent};
use crate::domain::text_overlay::TextAlign;
use super::image_loader::DefaultImageLoader;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Json, Multipart, Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub caption_service: CaptionService<DefaultImageLoader>,
    pub session_service: SessionService,
}

#[derive(Deserialize, Debug)]
pub struct ExportParams {
    /// Catalog id, data URL, remote URL or server path.
    pub image: String,
    #[serde(flatten)]
    pub overlay: OverlayOptions,
}

#[derive(Deserialize, Debug)]
pub struct BackgroundParams {
    pub image: String,
}

#[derive(Serialize, Debug)]
pub struct SessionView {
    pub id: u64,
    #[serde(flatten)]
    pub editor: EditorSnapshot,
}

pub fn build_router(state: Arc<AppState>, assets_dir: &FsPath, frontend_dir: &FsPath, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION]);

    // data URL は base64 なので元の画像より約 4/3 大きくなる
    let json_limit = DefaultBodyLimit::max(json_body_limit(max_upload_bytes));

    Router::new()
        .route("/catalog", get(catalog_handler))
        .route("/export", post(export_handler).layer(json_limit.clone()))
        .route(
            "/upload",
            post(upload_image_handler).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/sessions", post(create_session_handler))
        .route(
            "/sessions/:id",
            get(get_session_handler).patch(update_session_handler).delete(delete_session_handler),
        )
        .route("/sessions/:id/background", put(select_background_handler).layer(json_limit))
        .route("/sessions/:id/pointer", post(pointer_handler))
        .route("/sessions/:id/export", post(export_session_handler))
        .nest_service("/assets", ServeDir::new(assets_dir))
        .fallback_service(ServeDir::new(frontend_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Body limit for JSON requests that may carry an image as a data URL.
fn json_body_limit(max_upload_bytes: usize) -> usize {
    const ENVELOPE_BYTES: usize = 64 * 1024;
    max_upload_bytes.saturating_add(max_upload_bytes / 3 + 3).saturating_add(ENVELOPE_BYTES)
}

// PNG をダウンロードとして返す
fn download_response(artifact: ExportArtifact) -> Result<Response, ApplicationError> {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", artifact.filename))
        .map_err(|e| ApplicationError::ExportFailed(format!("Invalid download filename: {}", e)))?;

    Response::builder()
        .header(header::CONTENT_TYPE, artifact.image.content_type())
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(artifact.image.data))
        .map(IntoResponse::into_response)
        .map_err(|e| ApplicationError::ExportFailed(format!("Failed to build download response: {}", e)))
}

pub async fn catalog_handler(State(state): State<Arc<AppState>>) -> Json<Catalog> {
    Json(state.caption_service.catalog().clone())
}

pub async fn export_handler(
    State(state): State<Arc<AppState>>,
    Json(params): Json<ExportParams>,
) -> Result<Response, ApplicationError> {
    let background = state.caption_service.resolve_background(&params.image)?;
    let overlay = params.overlay.into_overlay()?;
    let artifact = state.caption_service.export(&background, &overlay).await?;
    download_response(artifact)
}

pub async fn upload_image_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApplicationError> {
    let mut file: Option<(Vec<u8>, Option<String>)> = None;
    let mut options = OverlayOptions::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApplicationError::InvalidRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApplicationError::InvalidRequest(format!("Failed to read uploaded file: {}", e)))?;
            file = Some((data.to_vec(), content_type));
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApplicationError::InvalidRequest(format!("Failed to read field {}: {}", name, e)))?;
        match name.as_str() {
            "text" => options.text = Some(value),
            "color" => options.color = Some(value),
            "fontSize" => options.font_size = Some(parse_field(&name, &value)?),
            "x" => options.x = Some(parse_field(&name, &value)?),
            "y" => options.y = Some(parse_field(&name, &value)?),
            "preset" => options.preset = Some(value),
            "align" => options.align = Some(parse_align(&value)?),
            other => tracing::debug!(field = other, "ignoring unknown upload field"),
        }
    }

    let (data, content_type) =
        file.ok_or_else(|| ApplicationError::InvalidRequest("missing \"image\" file field".to_string()))?;
    let overlay = options.into_overlay()?;
    let artifact = state.caption_service.export_upload(&data, content_type.as_deref(), &overlay)?;
    download_response(artifact)
}

fn parse_field<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ApplicationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApplicationError::InvalidRequest(format!("field {} has an invalid value: {:?}", name, value)))
}

fn parse_align(value: &str) -> Result<TextAlign, ApplicationError> {
    match value.trim().to_lowercase().as_str() {
        "left" => Ok(TextAlign::Left),
        "center" => Ok(TextAlign::Center),
        "right" => Ok(TextAlign::Right),
        other => Err(ApplicationError::InvalidRequest(format!("unknown alignment: {}", other))),
    }
}

pub async fn create_session_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (id, editor) = state.session_service.create().await;
    (StatusCode::CREATED, Json(SessionView { id, editor }))
}

pub async fn get_session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<SessionView>, ApplicationError> {
    let editor = state.session_service.snapshot(id).await?;
    Ok(Json(SessionView { id, editor }))
}

pub async fn update_session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(update): Json<StyleUpdate>,
) -> Result<Json<SessionView>, ApplicationError> {
    let editor = state.session_service.update_style(id, update).await?;
    Ok(Json(SessionView { id, editor }))
}

pub async fn delete_session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApplicationError> {
    state.session_service.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn select_background_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(params): Json<BackgroundParams>,
) -> Result<Json<SessionView>, ApplicationError> {
    let background = state.caption_service.resolve_background(&params.image)?;
    let editor = state.session_service.select_background(id, background).await?;
    Ok(Json(SessionView { id, editor }))
}

pub async fn pointer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(event): Json<PointerEvent>,
) -> Result<Json<SessionView>, ApplicationError> {
    let editor = state.session_service.apply_pointer(id, &event).await?;
    Ok(Json(SessionView { id, editor }))
}

pub async fn export_session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Response, ApplicationError> {
    let (background, overlay) = state.session_service.export_inputs(id).await?;
    let artifact = state.caption_service.export(&background, &overlay).await?;
    download_response(artifact)
}
