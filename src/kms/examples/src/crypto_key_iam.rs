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

use google_cloud_gax::Result;
use google_cloud_iam_v1::model::Policy;
use google_cloud_kms_v1::client::KeyManagementService;
use google_cloud_kms_v1::model::CryptoKey;

/// The Cloud KMS operations needed to update the IAM policy of a crypto key.
///
/// [KeyManagementService] implements this trait. Applications can provide
/// their own implementation, for example, to test code without a connection
/// to the service.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CryptoKeyIam: Send + Sync {
    /// Gets the crypto key named `name`.
    async fn get_crypto_key(&self, name: &str) -> Result<CryptoKey>;

    /// Gets the IAM policy for `resource`, including its `etag`.
    async fn get_iam_policy(&self, resource: &str) -> Result<Policy>;

    /// Sets the IAM policy for `resource`.
    ///
    /// Implementations must reject the update if `policy.etag` does not
    /// match the current policy, returning an error with the `ABORTED` code.
    async fn set_iam_policy(&self, resource: &str, policy: Policy) -> Result<Policy>;
}

#[async_trait::async_trait]
impl CryptoKeyIam for KeyManagementService {
    async fn get_crypto_key(&self, name: &str) -> Result<CryptoKey> {
        self.get_crypto_key().set_name(name).send().await
    }

    async fn get_iam_policy(&self, resource: &str) -> Result<Policy> {
        self.get_iam_policy().set_resource(resource).send().await
    }

    async fn set_iam_policy(&self, resource: &str, policy: Policy) -> Result<Policy> {
        self.set_iam_policy()
            .set_resource(resource)
            .set_policy(policy)
            .send()
            .await
    }
}
