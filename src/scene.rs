use std::sync::Arc;

use tracing::info;

use crate::{
    artifact_store::{write_stream, AssetStore},
    error::ProviderError,
    footage::FootageProvider,
    models::{SceneAsset, SceneRequest, VideoVariant},
    speech::SpeechProvider,
};

pub const FALLBACK_SEARCH_TERM: &str = "nature";
pub const PREFERRED_QUALITY: &str = "hd";

/// First non-blank search term, or [`FALLBACK_SEARCH_TERM`].
pub fn resolve_search_term(search_terms: &[String]) -> &str {
    search_terms
        .iter()
        .map(|term| term.trim())
        .find(|term| !term.is_empty())
        .unwrap_or(FALLBACK_SEARCH_TERM)
}

pub fn select_variant(candidates: &[VideoVariant]) -> Option<&VideoVariant> {
    candidates
        .iter()
        .find(|variant| variant.quality.as_deref() == Some(PREFERRED_QUALITY))
        .or_else(|| candidates.first())
}

/// Stages the narration and background clip for one scene.
pub struct SceneProcessor {
    speech: Arc<dyn SpeechProvider>,
    footage: Arc<dyn FootageProvider>,
    store: AssetStore,
}

impl SceneProcessor {
    pub fn new(
        speech: Arc<dyn SpeechProvider>,
        footage: Arc<dyn FootageProvider>,
        store: AssetStore,
    ) -> Self {
        Self {
            speech,
            footage,
            store,
        }
    }

    pub async fn process(
        &self,
        scene: &SceneRequest,
        job_id: &str,
        scene_index: usize,
    ) -> Result<SceneAsset, ProviderError> {
        let audio_path = self.store.audio_path(job_id, scene_index);
        let video_path = self.store.video_path(job_id, scene_index);

        let audio = self.speech.synthesize(&scene.text).await?;
        let audio_bytes = write_stream(&audio_path, audio).await?;
        info!(
            job_id = %job_id,
            scene = scene_index,
            bytes = audio_bytes,
            path = %audio_path.display(),
            "Speech written"
        );

        let term = resolve_search_term(&scene.search_terms);
        let candidates = self.footage.search(term).await?;
        let Some(variant) = select_variant(&candidates) else {
            return Err(ProviderError::NoResults {
                term: term.to_string(),
            });
        };

        let video = self.footage.fetch(variant).await?;
        let video_bytes = write_stream(&video_path, video).await?;
        info!(
            job_id = %job_id,
            scene = scene_index,
            term = %term,
            quality = variant.quality.as_deref().unwrap_or("unknown"),
            width = variant.width,
            height = variant.height,
            bytes = video_bytes,
            path = %video_path.display(),
            "Footage written"
        );

        Ok(SceneAsset {
            audio: audio_path,
            video: video_path,
        })
    }
}
