// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Contract with the external diagram generation service.
//!
//! The service receives `{"promp": "<text>"}` (the field name is part of the wire contract) and
//! answers `{"response": "<diagram json>"}`, where the inner JSON may be wrapped in a markdown
//! code fence.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::store::{parse_document, DiagramSnapshot, ImportError};

mod client;

pub use client::GenerationClient;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/generate/flow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerateMethod {
    /// JSON body `{"promp": ...}`.
    #[default]
    Post,
    /// Query string `?promp=...`.
    Get,
}

impl fmt::Display for GenerateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Post => "post",
            Self::Get => "get",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown request method {0:?} (expected post or get)")]
pub struct ParseMethodError(String);

impl FromStr for GenerateMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "post" => Ok(Self::Post),
            "get" => Ok(Self::Get),
            _ => Err(ParseMethodError(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
    pub endpoint: String,
    pub method: GenerateMethod,
    pub timeout: Duration,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            method: GenerateMethod::default(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub promp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub response: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("generation request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("generation endpoint answered HTTP {status}")]
    Status { status: u16 },
    #[error("unreadable generation response: {0}")]
    Body(#[source] reqwest::Error),
    #[error("generated payload is not a diagram: {0}")]
    Payload(#[source] ImportError),
    #[error("failed to encode existing diagram: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Text to send for `prompt`.
///
/// The first generation of a session sends the prompt as typed; later ones embed the current
/// diagram so the service can continue from it.
pub fn build_prompt(prompt: &str, existing: Option<&DiagramSnapshot>) -> Result<String, GenerateError> {
    let Some(existing) = existing else {
        return Ok(prompt.to_owned());
    };
    let json = serde_json::to_string(existing).map_err(GenerateError::Encode)?;
    Ok(format!(
        "This is the existing flow chart data in JSON format: {json}. Please update the flow chart \
         based on the new prompt: \"{prompt}\". Ensure continuity and coherence with the existing \
         structure."
    ))
}

fn fence_patterns() -> &'static (Regex, Regex) {
    static PATTERNS: OnceLock<(Regex, Regex)> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        (
            Regex::new(r"^```json\s*").expect("valid opening fence pattern"),
            Regex::new(r"\s*```$").expect("valid closing fence pattern"),
        )
    })
}

/// Removes a leading ```` ```json ```` fence and a trailing ```` ``` ```` fence (each with
/// adjacent whitespace). Unfenced text is returned unchanged.
pub fn strip_code_fence(raw: &str) -> String {
    let (open, close) = fence_patterns();
    let without_open = open.replace(raw, "");
    close.replace(&without_open, "").into_owned()
}

/// Parses the `response` string of a generation reply.
pub fn parse_generated(raw: &str) -> Result<DiagramSnapshot, GenerateError> {
    parse_document(strip_code_fence(raw).as_bytes()).map_err(GenerateError::Payload)
}
