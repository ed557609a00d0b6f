//! Text-to-speech providers.

use crate::error::ProviderError;
use crate::TtsProvider;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Maximum text input size for synthesis (64 KiB). Synthesis cost grows
/// with input length; oversized replies indicate an upstream fault.
const MAX_TTS_INPUT_BYTES: usize = 64 * 1024;

/// Timeout for one synthesis call (HTTP or subprocess).
const TTS_TIMEOUT: Duration = Duration::from_secs(60);

/// Hosted speech synthesis over HTTP.
///
/// Posts `{model, input, voice}` to `{base_url}/audio/speech` and returns
/// the response body bytes (mp3 by default). Compatible with OpenAI's
/// speech endpoint and lookalikes.
pub struct SpeechApiTts {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    voice: String,
    client: reqwest::Client,
}

impl SpeechApiTts {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            name: "speech-api".to_string(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the synthesis model (default: "tts-1").
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the voice (default: "alloy").
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    fn speech_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/audio/speech")
    }
}

#[async_trait]
impl TtsProvider for SpeechApiTts {
    fn name(&self) -> &str {
        &self.name
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "speech API key is empty".to_string(),
            ));
        }
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(ProviderError::Request(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let body = serde_json::json!({
            "model": self.model,
            "input": text,
            "voice": self.voice,
            "response_format": "mp3",
        });

        tracing::debug!(provider = %self.name, chars = text.len(), "sending synthesis request");

        let send = self
            .client
            .post(self.speech_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send();

        let response = tokio::time::timeout(TTS_TIMEOUT, send)
            .await
            .map_err(|_| ProviderError::Timeout(TTS_TIMEOUT.as_secs()))?
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(audio.to_vec())
    }
}

/// Local piper synthesis via subprocess.
///
/// Pipes the text to piper's stdin and reads raw PCM (s16le) from stdout.
#[derive(Debug, Clone)]
pub struct PiperTts {
    name: String,
    binary_path: PathBuf,
    model_path: PathBuf,
    speed: f32,
}

impl PiperTts {
    pub fn new(binary_path: impl AsRef<Path>, model_path: impl AsRef<Path>) -> Self {
        Self {
            name: "piper".to_string(),
            binary_path: binary_path.as_ref().to_path_buf(),
            model_path: model_path.as_ref().to_path_buf(),
            speed: 1.0,
        }
    }

    /// Override the speech speed multiplier (default 1.0; accepted range
    /// 0.1..=10.0, validated at call time).
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }
}

#[async_trait]
impl TtsProvider for PiperTts {
    fn name(&self) -> &str {
        &self.name
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(ProviderError::Request(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }
        if !(0.1..=10.0).contains(&self.speed) {
            return Err(ProviderError::NotConfigured(
                "piper speed must be between 0.1 and 10.0".to_string(),
            ));
        }
        if !self.model_path.exists() {
            return Err(ProviderError::NotConfigured(format!(
                "piper model not found: {}",
                self.model_path.display()
            )));
        }

        let mut command = Command::new(&self.binary_path);
        command
            .arg("--model")
            .arg(&self.model_path)
            .arg("--output_raw")
            // Length scale is the inverse of speed: 2.0x speed -> 0.5 scale.
            .arg("--length_scale")
            .arg((1.0 / self.speed).to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command
            .spawn()
            .map_err(|e| ProviderError::Process(format!("failed to spawn piper: {e}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ProviderError::Process("failed to open stdin".to_string()))?;
        let text_owned = text.to_string();

        // Write on a separate task so a full stdout buffer cannot deadlock
        // against an unread stdin pipe.
        let write_task =
            tokio::spawn(async move { stdin.write_all(text_owned.as_bytes()).await });

        let output = tokio::time::timeout(TTS_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| ProviderError::Timeout(TTS_TIMEOUT.as_secs()))?
            .map_err(|e| ProviderError::Process(format!("failed to wait for piper: {e}")))?;

        match write_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(ProviderError::Process(format!(
                    "failed to write to piper stdin: {e}"
                )))
            }
            Err(e) => return Err(ProviderError::Process(format!("stdin task failed: {e}"))),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::Process(format!("piper failed: {stderr}")));
        }

        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_api_defaults() {
        let provider = SpeechApiTts::new("https://api.openai.com/v1", "k");
        assert_eq!(provider.name(), "speech-api");
        assert_eq!(provider.model, "tts-1");
        assert_eq!(provider.voice, "alloy");
    }

    #[test]
    fn speech_api_builders() {
        let provider = SpeechApiTts::new("https://api.openai.com/v1", "k")
            .with_model("tts-1-hd")
            .with_voice("nova");
        assert_eq!(provider.model, "tts-1-hd");
        assert_eq!(provider.voice, "nova");
    }

    #[test]
    fn speech_url_strips_trailing_slash() {
        let provider = SpeechApiTts::new("https://api.example.com/v1/", "k");
        assert_eq!(provider.speech_url(), "https://api.example.com/v1/audio/speech");
    }

    #[tokio::test]
    async fn speech_api_rejects_oversized_text_before_any_request() {
        let provider = SpeechApiTts::new("https://api.openai.com/v1", "k");
        let oversized = "a".repeat(MAX_TTS_INPUT_BYTES + 1);
        let result = provider.synthesize(&oversized).await;
        assert!(matches!(result, Err(ProviderError::Request(_))));
    }

    #[tokio::test]
    async fn piper_rejects_out_of_range_speed() {
        let provider = PiperTts::new("/usr/bin/piper", "/tmp/voice.onnx").with_speed(0.0);
        let result = provider.synthesize("hello").await;
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn piper_missing_model_is_a_configuration_error() {
        let provider = PiperTts::new("/usr/bin/piper", "/definitely/not/here.onnx");
        let result = provider.synthesize("hello").await;
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }
}
