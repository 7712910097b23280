use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderError;

pub const MOOD_TAGS: [&str; 12] = [
    "upbeat",
    "relaxing",
    "epic",
    "inspiring",
    "happy",
    "sad",
    "energetic",
    "calm",
    "dramatic",
    "peaceful",
    "intense",
    "cheerful",
];

/// Chunked body of a provider response.
pub type ByteStream = BoxStream<'static, Result<Bytes, ProviderError>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRequest {
    pub text: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub search_terms: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateVideoRequest {
    #[serde(default)]
    pub scenes: Option<Value>,
    #[serde(default)]
    pub config: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoResponse {
    pub success: bool,
    pub video_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Ready,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneAsset {
    pub audio: PathBuf,
    pub video: PathBuf,
}

/// One candidate rendition returned by a footage search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoVariant {
    pub quality: Option<String>,
    pub link: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job_id: String,
    pub status: JobStatus,
    pub progress: u8,
    pub scenes: Vec<SceneRequest>,
    pub config: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub scene_assets: Vec<SceneAsset>,
    pub primary_video_path: Option<PathBuf>,
}

impl JobRecord {
    pub fn new(job_id: String, scenes: Vec<SceneRequest>, config: Option<Value>) -> Self {
        let now = Utc::now();
        Self {
            job_id,
            status: JobStatus::Processing,
            progress: 0,
            scenes,
            config,
            created_at: now,
            updated_at: now,
            message: Some("Queued for processing".to_string()),
            error: None,
            scene_assets: Vec::new(),
            primary_video_path: None,
        }
    }

    /// Raises progress while processing. Lower values and terminal jobs are
    /// left untouched, and 100 is reserved for `mark_ready`.
    pub fn advance(&mut self, progress: u8, message: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.progress = self.progress.max(progress.min(99));
        self.message = Some(message.into());
        self.updated_at = Utc::now();
        true
    }

    pub fn record_scene(&mut self, asset: SceneAsset) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.scene_assets.push(asset);
        self.updated_at = Utc::now();
        true
    }

    pub fn mark_ready(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        let Some(first) = self.scene_assets.first() else {
            return false;
        };
        self.primary_video_path = Some(first.video.clone());
        self.status = JobStatus::Ready;
        self.progress = 100;
        self.message = Some("Video assets ready".to_string());
        self.error = None;
        self.updated_at = Utc::now();
        true
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.message = Some("Video generation failed".to_string());
        self.updated_at = Utc::now();
        true
    }

    pub fn video_name(&self) -> Option<String> {
        self.primary_video_path
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
    }

    pub fn to_response(&self) -> JobStatusResponse {
        JobStatusResponse {
            video_id: self.job_id.clone(),
            status: self.status,
            progress: self.progress,
            error: self.error.clone(),
            message: self.message.clone(),
            config: self.config.clone(),
            scene_count: self.scenes.len(),
            scene_assets: self.scene_assets.clone(),
            video_name: self.video_name(),
            video_path: self.primary_video_path.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub video_id: String,
    pub status: JobStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub config: Option<Value>,
    pub scene_count: usize,
    pub scene_assets: Vec<SceneAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_path: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub pexels: bool,
    pub timestamp: DateTime<Utc>,
}
