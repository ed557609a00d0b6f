//! Speech-to-text providers.

use crate::error::ProviderError;
use crate::SttProvider;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use voxway_types::AudioFormat;

/// Timeout for one HTTP transcription call.
const STT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for one local transcription subprocess.
const STT_PROCESS_TIMEOUT: Duration = Duration::from_secs(120);

/// Whisper-style hosted transcription over HTTP.
///
/// Posts the audio as a multipart upload to
/// `{base_url}/audio/transcriptions` and reads `text` from the JSON body.
/// Works against OpenAI's Whisper endpoint and compatible self-hosted
/// servers by changing `base_url`.
pub struct WhisperApiStt {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl WhisperApiStt {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            name: "whisper".to_string(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: "whisper-1".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the transcription model (default: "whisper-1").
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn transcriptions_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/audio/transcriptions")
    }
}

#[async_trait]
impl SttProvider for WhisperApiStt {
    fn name(&self) -> &str {
        &self.name
    }

    async fn transcribe(
        &self,
        audio: &[u8],
        format: AudioFormat,
    ) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "whisper API key is empty".to_string(),
            ));
        }

        let file_part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name(format!("audio.{}", format.as_str()))
            .mime_str(format.mime_type())
            .map_err(|e| ProviderError::Request(format!("invalid mime type: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "json");

        tracing::debug!(
            provider = %self.name,
            bytes = audio.len(),
            format = format.as_str(),
            "sending transcription request"
        );

        let send = self
            .client
            .post(self.transcriptions_url())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send();

        let response = tokio::time::timeout(STT_HTTP_TIMEOUT, send)
            .await
            .map_err(|_| ProviderError::Timeout(STT_HTTP_TIMEOUT.as_secs()))?
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        body["text"]
            .as_str()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| ProviderError::InvalidResponse("missing 'text' field".to_string()))
    }
}

/// Local whisper.cpp transcription via subprocess.
///
/// Pipes the audio to the binary's stdin and reads the transcript from
/// stdout. The binary is expected to accept `-m <model> -f -` in the
/// standard whisper.cpp argument convention.
#[derive(Debug, Clone)]
pub struct WhisperCppStt {
    name: String,
    model_path: PathBuf,
    binary_path: PathBuf,
}

impl WhisperCppStt {
    pub fn new(model_path: impl Into<PathBuf>, binary_path: impl Into<PathBuf>) -> Self {
        Self {
            name: "whisper-cpp".to_string(),
            model_path: model_path.into(),
            binary_path: binary_path.into(),
        }
    }
}

#[async_trait]
impl SttProvider for WhisperCppStt {
    fn name(&self) -> &str {
        &self.name
    }

    async fn transcribe(
        &self,
        audio: &[u8],
        format: AudioFormat,
    ) -> Result<String, ProviderError> {
        tracing::debug!(
            provider = %self.name,
            bytes = audio.len(),
            format = format.as_str(),
            "spawning local transcription process"
        );

        let mut command = Command::new(&self.binary_path);
        command
            .arg("-m")
            .arg(&self.model_path)
            .arg("-f")
            .arg("-") // read audio from stdin
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());

        let mut child = command
            .spawn()
            .map_err(|e| ProviderError::Process(format!("failed to spawn stt binary: {e}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ProviderError::Process("failed to open stdin".to_string()))?;

        stdin
            .write_all(audio)
            .await
            .map_err(|e| ProviderError::Process(format!("failed to write audio to stdin: {e}")))?;
        drop(stdin); // close stdin to signal EOF

        let output = tokio::time::timeout(STT_PROCESS_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| ProviderError::Timeout(STT_PROCESS_TIMEOUT.as_secs()))?
            .map_err(|e| ProviderError::Process(format!("failed to collect output: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::Process(format!("stt binary failed: {stderr}")));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whisper_api_default_name_and_model() {
        let provider = WhisperApiStt::new("https://api.openai.com/v1", "test-key");
        assert_eq!(provider.name(), "whisper");
        assert_eq!(provider.model, "whisper-1");
    }

    #[test]
    fn whisper_api_with_model_builder() {
        let provider =
            WhisperApiStt::new("https://api.openai.com/v1", "test-key").with_model("whisper-2");
        assert_eq!(provider.model, "whisper-2");
    }

    #[test]
    fn transcriptions_url_strips_trailing_slash() {
        let provider = WhisperApiStt::new("https://stt.example.com/v1/", "k");
        assert_eq!(
            provider.transcriptions_url(),
            "https://stt.example.com/v1/audio/transcriptions"
        );
    }

    #[tokio::test]
    async fn whisper_api_rejects_empty_key_before_any_request() {
        let provider = WhisperApiStt::new("https://api.openai.com/v1", "");
        let result = provider.transcribe(b"fake audio", AudioFormat::Wav).await;
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn whisper_cpp_missing_binary_is_a_process_error() {
        let provider = WhisperCppStt::new("/nonexistent/model.bin", "/nonexistent/whisper");
        let result = provider.transcribe(b"fake audio", AudioFormat::Wav).await;
        assert!(matches!(result, Err(ProviderError::Process(_))));
    }
}
