use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::Client;

use crate::{config::Config, error::ProviderError, models::ByteStream};

#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Turns `text` into an audio stream. No retries.
    async fn synthesize(&self, text: &str) -> Result<ByteStream, ProviderError>;
}

/// StreamElements text-to-speech endpoint.
#[derive(Debug, Clone)]
pub struct StreamElementsSpeech {
    client: Client,
    url: String,
    voice: String,
}

impl StreamElementsSpeech {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.provider_timeout).build()?;
        Ok(Self {
            client,
            url: config.tts_url.clone(),
            voice: config.tts_voice.clone(),
        })
    }
}

#[async_trait]
impl SpeechProvider for StreamElementsSpeech {
    async fn synthesize(&self, text: &str) -> Result<ByteStream, ProviderError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("voice", self.voice.as_str()), ("text", text)])
            .send()
            .await
            .map_err(|err| ProviderError::Synthesis(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Synthesis(format!(
                "TTS endpoint returned {status}"
            )));
        }

        Ok(response
            .bytes_stream()
            .map_err(|err| ProviderError::Synthesis(err.to_string()))
            .boxed())
    }
}
