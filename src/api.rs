use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, Response, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::Value;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        CreateVideoRequest, CreateVideoResponse, HealthResponse, JobStatus, SceneRequest,
        MOOD_TAGS,
    },
    pipeline::spawn_pipeline,
    AppState,
};

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "Live",
        pexels: state.config.footage_credential_configured(),
        timestamp: Utc::now(),
    })
}

pub async fn music_tags() -> impl IntoResponse {
    Json(MOOD_TAGS)
}

fn parse_scenes(scenes: Option<Value>) -> ApiResult<Vec<SceneRequest>> {
    let Some(value @ Value::Array(_)) = scenes else {
        return Err(ApiError::validation("Scenes must be an array"));
    };

    let scenes: Vec<SceneRequest> = serde_json::from_value(value)
        .map_err(|err| ApiError::validation(format!("Invalid scene: {err}")))?;
    if scenes.is_empty() {
        return Err(ApiError::validation("Scenes must be a non-empty array"));
    }
    Ok(scenes)
}

/// A missing body or a non-object body reads as `{}`, so the caller always
/// gets the scene validation message.
fn parse_payload(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<CreateVideoRequest> {
    let value = match payload {
        Ok(Json(value)) => value,
        Err(JsonRejection::MissingJsonContentType(_)) => Value::Null,
        Err(rejection) => return Err(ApiError::validation(rejection.body_text())),
    };

    match value {
        Value::Object(_) => serde_json::from_value(value)
            .map_err(|err| ApiError::validation(format!("Invalid request body: {err}"))),
        _ => Ok(CreateVideoRequest::default()),
    }
}

pub async fn create_video(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let payload = parse_payload(payload)?;
    let scenes = parse_scenes(payload.scenes)?;
    let scene_count = scenes.len();

    let job_id = state.registry.create(scenes, payload.config).await;
    let tracked_jobs = state.registry.len().await;
    info!(
        job_id = %job_id,
        scenes = scene_count,
        tracked_jobs,
        "Video job accepted"
    );

    spawn_pipeline(
        state.registry.clone(),
        state.processor.clone(),
        job_id.clone(),
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(CreateVideoResponse {
            success: true,
            video_id: job_id,
            message: "Video generation started".to_string(),
        }),
    ))
}

pub async fn get_video_status(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let job = state
        .registry
        .get(&video_id)
        .await
        .ok_or_else(|| ApiError::NotFound(video_id.clone()))?;
    Ok(Json(job.to_response()))
}

pub async fn download_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Response<Body>> {
    let job = state
        .registry
        .get(&video_id)
        .await
        .ok_or_else(|| ApiError::NotFound(video_id.clone()))?;

    if job.status != JobStatus::Ready {
        return Err(ApiError::NotReady {
            status: job.status.as_str().to_string(),
        });
    }

    let path = job.primary_video_path.clone().ok_or(ApiError::MissingAsset)?;
    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::MissingAsset);
        }
        Err(err) => {
            return Err(ApiError::Internal(format!(
                "Failed to open {}: {err}",
                path.display()
            )));
        }
    };

    let file_name = job
        .video_name()
        .unwrap_or_else(|| format!("{video_id}.mp4"));
    let content_disposition = format!("attachment; filename=\"{file_name}\"");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::CONTENT_DISPOSITION, content_disposition)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|err| ApiError::Internal(format!("Failed to build download response: {err}")))
}
