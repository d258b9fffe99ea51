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

use anyhow::bail;
use clap::Parser;
use humantime::parse_duration;
use kms_samples::{ClientConfig, RoleName};
use std::time::Duration;

/// Command line arguments for the sample.
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = super::DESCRIPTION)]
pub struct Args {
    /// The full name of the crypto key.
    ///
    /// For example:
    /// `projects/my-project/locations/global/keyRings/my-ring/cryptoKeys/my-key`
    pub name: String,

    /// The member to remove, for example `user:alice@example.com`.
    pub member: String,

    /// The role to remove from the member, for example `roles/viewer`.
    pub role: RoleName,

    /// Override the default endpoint for the Cloud KMS service.
    #[arg(long, env = "GOOGLE_CLOUD_KMS_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Abandon the operation if it does not complete in this time.
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Enable debug logs, including the client library traces.
    #[arg(long, default_value_t = false)]
    pub tracing: bool,
}

impl Args {
    /// Validates the arguments after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.is_empty() {
            bail!("the crypto key name cannot be empty")
        }
        if self.member.is_empty() {
            bail!("the member cannot be empty")
        }
        if self.role.as_str().is_empty() {
            bail!("the role cannot be empty")
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            bail!("invalid timeout, should be > 0")
        }
        Ok(())
    }

    /// The configuration for the Cloud KMS client.
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::default().with_tracing(self.tracing);
        match &self.endpoint {
            Some(endpoint) => config.with_endpoint(endpoint),
            None => config,
        }
    }
}
