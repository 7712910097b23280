use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::{fs, io::AsyncWriteExt};

use crate::{error::ProviderError, models::ByteStream};

pub const AUDIO_EXTENSION: &str = "mp3";
pub const VIDEO_EXTENSION: &str = "mp4";

#[derive(Debug, Clone)]
pub struct AssetStore {
    audio_dir: PathBuf,
    video_dir: PathBuf,
}

impl AssetStore {
    pub fn new(audio_dir: impl Into<PathBuf>, video_dir: impl Into<PathBuf>) -> Self {
        Self {
            audio_dir: audio_dir.into(),
            video_dir: video_dir.into(),
        }
    }

    pub async fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.audio_dir, &self.video_dir] {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create asset directory {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn audio_path(&self, job_id: &str, scene_index: usize) -> PathBuf {
        self.audio_dir
            .join(scene_file_name(job_id, scene_index, AUDIO_EXTENSION))
    }

    pub fn video_path(&self, job_id: &str, scene_index: usize) -> PathBuf {
        self.video_dir
            .join(scene_file_name(job_id, scene_index, VIDEO_EXTENSION))
    }
}

pub fn scene_file_name(job_id: &str, scene_index: usize, extension: &str) -> String {
    format!("{job_id}_scene{scene_index}.{extension}")
}

/// Drains `stream` into `path`, truncating any previous file. The file is
/// flushed and closed before this returns.
pub async fn write_stream(path: &Path, mut stream: ByteStream) -> Result<u64, ProviderError> {
    let storage_err = |source| ProviderError::Storage {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(path).await.map_err(storage_err)?;
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await.map_err(storage_err)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(storage_err)?;
    file.sync_all().await.map_err(storage_err)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures::stream;

    use super::*;

    #[test]
    fn scene_paths_follow_naming_scheme() {
        let store = AssetStore::new("/data/audio", "/data/videos");
        assert_eq!(
            store.audio_path("abc", 0),
            PathBuf::from("/data/audio/abc_scene0.mp3")
        );
        assert_eq!(
            store.video_path("abc", 3),
            PathBuf::from("/data/videos/abc_scene3.mp4")
        );
    }

    #[tokio::test]
    async fn write_stream_persists_all_chunks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.bin");
        let chunks = vec![Ok(Bytes::from_static(b"hello ")), Ok(Bytes::from_static(b"world"))];

        let written = write_stream(&path, stream::iter(chunks).boxed())
            .await
            .expect("write");

        assert_eq!(written, 11);
        assert_eq!(fs::read(&path).await.expect("read"), b"hello world");
    }

    #[tokio::test]
    async fn write_stream_surfaces_stream_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.bin");
        let chunks = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(ProviderError::Fetch("connection reset".to_string())),
        ];

        let err = write_stream(&path, stream::iter(chunks).boxed())
            .await
            .expect_err("stream error");
        assert!(matches!(err, ProviderError::Fetch(_)));
    }

    #[tokio::test]
    async fn ensure_dirs_creates_nested_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = AssetStore::new(dir.path().join("a/audio"), dir.path().join("b/videos"));
        store.ensure_dirs().await.expect("create");
        assert!(dir.path().join("a/audio").is_dir());
        assert!(dir.path().join("b/videos").is_dir());
    }
}
