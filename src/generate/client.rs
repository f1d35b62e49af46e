// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::store::DiagramSnapshot;

use super::{
    parse_generated, GenerateConfig, GenerateError, GenerateMethod, GenerationRequest,
    GenerationResponse,
};

/// HTTP client for the generation endpoint. Cheap to clone.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    config: GenerateConfig,
}

impl GenerationClient {
    pub fn new(config: GenerateConfig) -> Result<Self, GenerateError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GenerateError::Client)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GenerateConfig {
        &self.config
    }

    /// Sends `text` as-is and parses the diagram out of the reply.
    pub async fn generate(&self, text: &str) -> Result<DiagramSnapshot, GenerateError> {
        let endpoint = self.config.endpoint.as_str();
        let request = match self.config.method {
            GenerateMethod::Post => {
                self.http.post(endpoint).json(&GenerationRequest { promp: text.to_owned() })
            }
            GenerateMethod::Get => self.http.get(endpoint).query(&[("promp", text)]),
        };

        tracing::debug!(endpoint, method = %self.config.method, chars = text.len(), "requesting generation");
        let response = request.send().await.map_err(GenerateError::Request)?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenerateError::Status { status: status.as_u16() });
        }

        let envelope = response.json::<GenerationResponse>().await.map_err(GenerateError::Body)?;
        let snapshot = parse_generated(&envelope.response)?;
        tracing::info!(
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            "received generated diagram"
        );
        Ok(snapshot)
    }
}
