//! Stub providers and fixtures shared by the unit tests.

use std::{
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};

use crate::{
    config::Config,
    error::ProviderError,
    footage::FootageProvider,
    models::{ByteStream, VideoVariant},
    registry::JobRegistry,
    speech::SpeechProvider,
};

pub fn test_config(root: &Path) -> Config {
    Config {
        bind_addr: ([127, 0, 0, 1], 0).into(),
        audio_dir: root.join("audio"),
        video_dir: root.join("videos"),
        pexels_api_key: Some("test-key".to_string()),
        pexels_base_url: "http://127.0.0.1:9".to_string(),
        pexels_per_page: 5,
        pexels_orientation: "portrait".to_string(),
        tts_url: "http://127.0.0.1:9/speech".to_string(),
        tts_voice: "Brian".to_string(),
        provider_timeout: Duration::from_secs(1),
        download_timeout: Duration::from_secs(1),
    }
}

pub fn variant(quality: Option<&str>, link: &str) -> VideoVariant {
    VideoVariant {
        quality: quality.map(str::to_string),
        link: link.to_string(),
        width: None,
        height: None,
    }
}

fn body(bytes: Vec<u8>) -> ByteStream {
    stream::iter(vec![Ok(Bytes::from(bytes))]).boxed()
}

#[derive(Default)]
pub struct StubSpeech {
    calls: AtomicUsize,
    fail_on: Option<usize>,
    hold: bool,
    panic: bool,
    observer: Mutex<Option<(JobRegistry, String)>>,
    observed: Mutex<Vec<u8>>,
}

impl StubSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the call with the given zero-based index.
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::default()
        }
    }

    /// Never completes, leaving the job in `processing`.
    pub fn blocking() -> Self {
        Self {
            hold: true,
            ..Self::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Self::default()
        }
    }

    /// Records the job's progress each time synthesis starts.
    pub fn observe(&self, registry: JobRegistry, job_id: &str) {
        *self.observer.lock().expect("observer lock") = Some((registry, job_id.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn observed_progress(&self) -> Vec<u8> {
        self.observed.lock().expect("observed lock").clone()
    }
}

#[async_trait]
impl SpeechProvider for StubSpeech {
    async fn synthesize(&self, text: &str) -> Result<ByteStream, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        let observer = self.observer.lock().expect("observer lock").clone();
        if let Some((registry, job_id)) = observer {
            if let Some(job) = registry.get(&job_id).await {
                self.observed.lock().expect("observed lock").push(job.progress);
            }
        }

        if self.hold {
            futures::future::pending::<()>().await;
        }

        if self.panic {
            panic!("speech stub exploded on call {call}");
        }

        if self.fail_on == Some(call) {
            return Err(ProviderError::Synthesis(format!("stub failure on call {call}")));
        }

        Ok(body(format!("audio:{text}").into_bytes()))
    }
}

#[derive(Default)]
pub struct StubFootage {
    variants: Vec<VideoVariant>,
    terms: Mutex<Vec<String>>,
    fetches: AtomicUsize,
}

impl StubFootage {
    pub fn with_variants(variants: Vec<VideoVariant>) -> Self {
        Self {
            variants,
            ..Self::default()
        }
    }

    pub fn terms(&self) -> Vec<String> {
        self.terms.lock().expect("terms lock").clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FootageProvider for StubFootage {
    async fn search(&self, term: &str) -> Result<Vec<VideoVariant>, ProviderError> {
        self.terms.lock().expect("terms lock").push(term.to_string());
        Ok(self.variants.clone())
    }

    async fn fetch(&self, variant: &VideoVariant) -> Result<ByteStream, ProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(body(format!("video:{}", variant.link).into_bytes()))
    }
}
