use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::{header::AUTHORIZATION, Client};
use serde::Deserialize;
use tracing::info;

use crate::{
    config::Config,
    error::ProviderError,
    models::{ByteStream, VideoVariant},
};

#[async_trait]
pub trait FootageProvider: Send + Sync {
    /// Ranked candidate renditions for `term`. An empty list means no match.
    async fn search(&self, term: &str) -> Result<Vec<VideoVariant>, ProviderError>;

    async fn fetch(&self, variant: &VideoVariant) -> Result<ByteStream, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct PexelsSearchResponse {
    #[serde(default)]
    videos: Vec<PexelsVideo>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideo {
    #[serde(default)]
    video_files: Vec<PexelsVideoFile>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideoFile {
    quality: Option<String>,
    link: String,
    width: Option<u32>,
    height: Option<u32>,
}

/// Pexels video search. Candidates are the renditions of the top hit.
#[derive(Debug, Clone)]
pub struct PexelsFootage {
    search_client: Client,
    download_client: Client,
    base_url: String,
    api_key: Option<String>,
    per_page: u32,
    orientation: String,
}

impl PexelsFootage {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            search_client: Client::builder().timeout(config.provider_timeout).build()?,
            download_client: Client::builder()
                .connect_timeout(config.provider_timeout)
                .timeout(config.download_timeout)
                .build()?,
            base_url: config.pexels_base_url.clone(),
            api_key: config.pexels_api_key.clone(),
            per_page: config.pexels_per_page,
            orientation: config.pexels_orientation.clone(),
        })
    }
}

fn variants_from_response(response: PexelsSearchResponse) -> Vec<VideoVariant> {
    response
        .videos
        .into_iter()
        .next()
        .map(|video| {
            video
                .video_files
                .into_iter()
                .map(|file| VideoVariant {
                    quality: file.quality,
                    link: file.link,
                    width: file.width,
                    height: file.height,
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl FootageProvider for PexelsFootage {
    async fn search(&self, term: &str) -> Result<Vec<VideoVariant>, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ProviderError::Search(
                "PEXELS_API_KEY is not configured".to_string(),
            ));
        };

        info!(term = %term, "Searching Pexels");
        let per_page = self.per_page.to_string();
        let response = self
            .search_client
            .get(format!("{}/videos/search", self.base_url))
            .header(AUTHORIZATION, api_key)
            .query(&[
                ("query", term),
                ("per_page", per_page.as_str()),
                ("orientation", self.orientation.as_str()),
            ])
            .send()
            .await
            .map_err(|err| ProviderError::Search(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Search(format!(
                "Pexels returned {status} for `{term}`"
            )));
        }

        let parsed = response
            .json::<PexelsSearchResponse>()
            .await
            .map_err(|err| ProviderError::Search(format!("Invalid Pexels response: {err}")))?;
        Ok(variants_from_response(parsed))
    }

    async fn fetch(&self, variant: &VideoVariant) -> Result<ByteStream, ProviderError> {
        info!(link = %variant.link, "Downloading footage");
        let response = self
            .download_client
            .get(&variant.link)
            .send()
            .await
            .map_err(|err| ProviderError::Fetch(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Fetch(format!(
                "Footage host returned {status}"
            )));
        }

        Ok(response
            .bytes_stream()
            .map_err(|err| ProviderError::Fetch(err.to_string()))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_come_from_first_video_in_order() {
        let payload = r#"{
            "page": 1,
            "videos": [
                {
                    "id": 1,
                    "video_files": [
                        {"id": 10, "quality": "sd", "link": "https://cdn/1-sd.mp4", "width": 540, "height": 960},
                        {"id": 11, "quality": "hd", "link": "https://cdn/1-hd.mp4", "width": 1080, "height": 1920},
                        {"id": 12, "quality": null, "link": "https://cdn/1-raw.mp4"}
                    ]
                },
                {
                    "id": 2,
                    "video_files": [{"id": 20, "quality": "hd", "link": "https://cdn/2-hd.mp4"}]
                }
            ]
        }"#;
        let parsed: PexelsSearchResponse = serde_json::from_str(payload).expect("parse");
        let variants = variants_from_response(parsed);

        assert_eq!(variants.len(), 3);
        assert_eq!(variants[0].quality.as_deref(), Some("sd"));
        assert_eq!(variants[1].link, "https://cdn/1-hd.mp4");
        assert_eq!(variants[1].height, Some(1920));
        assert!(variants[2].quality.is_none());
    }

    #[test]
    fn empty_results_produce_no_candidates() {
        let parsed: PexelsSearchResponse =
            serde_json::from_str(r#"{"videos": []}"#).expect("parse");
        assert!(variants_from_response(parsed).is_empty());

        let parsed: PexelsSearchResponse = serde_json::from_str(r#"{}"#).expect("parse");
        assert!(variants_from_response(parsed).is_empty());
    }

    #[tokio::test]
    async fn search_without_credential_fails_fast() {
        let footage = PexelsFootage {
            search_client: Client::new(),
            download_client: Client::new(),
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            per_page: 5,
            orientation: "portrait".to_string(),
        };
        let err = footage.search("ocean").await.expect_err("missing key");
        assert!(matches!(err, ProviderError::Search(_)));
    }
}
