use std::{
    env, fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Result;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub audio_dir: PathBuf,
    pub video_dir: PathBuf,
    pub pexels_api_key: Option<String>,
    pub pexels_base_url: String,
    pub pexels_per_page: u32,
    pub pexels_orientation: String,
    pub tts_url: String,
    pub tts_voice: String,
    pub provider_timeout: Duration,
    pub download_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.trim().parse::<u16>().ok())
            .unwrap_or(3000);
        let default_addr = SocketAddr::from(([0, 0, 0, 0], port));
        let bind_addr = env::var("SHORT_VIDEO_BIND_ADDR")
            .ok()
            .map(|raw| raw.trim().trim_matches('"').trim_matches('\'').to_string())
            .and_then(|v| v.parse::<SocketAddr>().ok())
            .unwrap_or(default_addr);

        let audio_dir =
            PathBuf::from(env::var("SHORT_VIDEO_AUDIO_DIR").unwrap_or_else(|_| "audio".to_string()));
        let video_dir = PathBuf::from(
            env::var("SHORT_VIDEO_VIDEO_DIR").unwrap_or_else(|_| "videos".to_string()),
        );

        let pexels_base_url = env::var("PEXELS_BASE_URL")
            .unwrap_or_else(|_| "https://api.pexels.com".to_string())
            .trim_end_matches('/')
            .to_string();

        let pexels_per_page = env::var("SHORT_VIDEO_PEXELS_PER_PAGE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(5);

        let pexels_orientation = env::var("SHORT_VIDEO_PEXELS_ORIENTATION")
            .unwrap_or_else(|_| "portrait".to_string());

        let tts_url = env::var("SHORT_VIDEO_TTS_URL")
            .unwrap_or_else(|_| "https://api.streamelements.com/kappa/v2/speech".to_string());
        let tts_voice = env::var("SHORT_VIDEO_TTS_VOICE").unwrap_or_else(|_| "Brian".to_string());

        let provider_timeout_seconds = env::var("SHORT_VIDEO_PROVIDER_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30)
            .max(1);

        let download_timeout_seconds = env::var("SHORT_VIDEO_DOWNLOAD_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(300)
            .max(1);

        Ok(Self {
            bind_addr,
            audio_dir,
            video_dir,
            pexels_api_key: resolve_pexels_key(),
            pexels_base_url,
            pexels_per_page,
            pexels_orientation,
            tts_url,
            tts_voice,
            provider_timeout: Duration::from_secs(provider_timeout_seconds),
            download_timeout: Duration::from_secs(download_timeout_seconds),
        })
    }

    pub fn footage_credential_configured(&self) -> bool {
        self.pexels_api_key.is_some()
    }
}

fn resolve_pexels_key() -> Option<String> {
    if let Ok(value) = env::var("PEXELS_API_KEY") {
        if let Some(key) = non_blank(&value) {
            return Some(key);
        }
    }

    env::var("PEXELS_API_KEY_FILE")
        .ok()
        .and_then(|key_file| read_key_file(Path::new(&key_file)))
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn read_key_file(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(raw) => {
            let key = non_blank(&raw);
            if key.is_none() {
                warn!("PEXELS_API_KEY_FILE is empty: {}", path.display());
            }
            key
        }
        Err(err) => {
            warn!(
                "Failed reading PEXELS_API_KEY_FILE at {}: {err}",
                path.display()
            );
            None
        }
    }
}
