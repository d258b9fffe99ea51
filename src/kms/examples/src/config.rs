// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{Error, Result};
use google_cloud_kms_v1::client::KeyManagementService;

/// Configuration for the Cloud KMS client used by the samples.
///
/// The client uses [Application Default Credentials]. Retry, backoff, and
/// transport settings are the client library defaults.
///
/// # Example
/// ```no_run
/// # async fn example() -> kms_samples::Result<()> {
/// use kms_samples::ClientConfig;
/// let client = ClientConfig::default()
///     .with_endpoint("https://cloudkms.googleapis.com")
///     .with_tracing(true)
///     .build()
///     .await?;
/// # Ok(()) }
/// ```
///
/// [Application Default Credentials]: https://cloud.google.com/docs/authentication#adc
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientConfig {
    endpoint: Option<String>,
    tracing: bool,
}

impl ClientConfig {
    /// Overrides the default endpoint for the service.
    pub fn with_endpoint<V: Into<String>>(mut self, v: V) -> Self {
        self.endpoint = Some(v.into());
        self
    }

    /// Enables tracing in the client library.
    pub fn with_tracing(mut self, v: bool) -> Self {
        self.tracing = v;
        self
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn tracing(&self) -> bool {
        self.tracing
    }

    /// Creates a [KeyManagementService] client with this configuration.
    pub async fn build(self) -> Result<KeyManagementService> {
        let builder = KeyManagementService::builder();
        let builder = match self.endpoint {
            Some(endpoint) => builder.with_endpoint(endpoint),
            None => builder,
        };
        let builder = if self.tracing {
            builder.with_tracing()
        } else {
            builder
        };
        let client = builder.build().await.map_err(Error::ClientInitialization)?;
        tracing::debug!("created Cloud KMS client");
        Ok(client)
    }
}
