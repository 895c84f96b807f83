use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

/// Question photo kept as a `data:<mime>;base64,<payload>` URL, the same shape
/// it is persisted in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct QuestionImage(String);

impl QuestionImage {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        let payload = general_purpose::STANDARD.encode(bytes);
        Self(format!("data:{mime_type};base64,{payload}"))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let mime_type = mime_type_for(path)?;
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read image from {}", path.display()))?;
        if bytes.is_empty() {
            return Err(anyhow!("image {} is empty", path.display()));
        }
        Ok(Self::from_bytes(mime_type, &bytes))
    }

    pub fn as_data_url(&self) -> &str {
        &self.0
    }

    pub fn mime_type(&self) -> &str {
        self.split().map(|(mime, _)| mime).unwrap_or("image/jpeg")
    }

    /// Raw base64 payload without the `data:` prefix, as the collaborator expects it.
    pub fn base64_payload(&self) -> &str {
        self.split().map(|(_, payload)| payload).unwrap_or(&self.0)
    }

    pub fn decoded_len(&self) -> usize {
        general_purpose::STANDARD
            .decode(self.base64_payload())
            .map(|bytes| bytes.len())
            .unwrap_or(0)
    }

    fn split(&self) -> Option<(&str, &str)> {
        let rest = self.0.strip_prefix("data:")?;
        let (mime, payload) = rest.split_once(";base64,")?;
        Some((mime, payload))
    }
}

fn mime_type_for(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "webp" => Ok("image/webp"),
        "gif" => Ok("image/gif"),
        "heic" => Ok("image/heic"),
        "heif" => Ok("image/heif"),
        _ => Err(anyhow!(
            "unsupported image type '{}' for {}",
            extension,
            path.display()
        )),
    }
}
