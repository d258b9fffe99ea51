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

use std::borrow::Cow;

/// The name of an IAM role, such as `roles/viewer`.
///
/// IAM roles are plain strings in the policy bindings. This type gives them a
/// name in function signatures and provides constants for the basic roles and
/// the predefined Cloud KMS roles. Any other role can be created from a string.
///
/// # Example
/// ```
/// # use kms_samples::RoleName;
/// let role = RoleName::from("roles/cloudkms.admin");
/// assert_eq!(role, RoleName::CLOUDKMS_ADMIN);
/// assert_eq!(role.as_str(), "roles/cloudkms.admin");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RoleName(Cow<'static, str>);

impl RoleName {
    pub const OWNER: RoleName = RoleName::from_static("roles/owner");
    pub const EDITOR: RoleName = RoleName::from_static("roles/editor");
    pub const VIEWER: RoleName = RoleName::from_static("roles/viewer");

    pub const CLOUDKMS_ADMIN: RoleName = RoleName::from_static("roles/cloudkms.admin");
    pub const CLOUDKMS_VIEWER: RoleName = RoleName::from_static("roles/cloudkms.viewer");
    pub const CRYPTO_KEY_ENCRYPTER_DECRYPTER: RoleName =
        RoleName::from_static("roles/cloudkms.cryptoKeyEncrypterDecrypter");
    pub const CRYPTO_KEY_ENCRYPTER: RoleName =
        RoleName::from_static("roles/cloudkms.cryptoKeyEncrypter");
    pub const CRYPTO_KEY_DECRYPTER: RoleName =
        RoleName::from_static("roles/cloudkms.cryptoKeyDecrypter");
    pub const PUBLIC_KEY_VIEWER: RoleName =
        RoleName::from_static("roles/cloudkms.publicKeyViewer");
    pub const SIGNER_VERIFIER: RoleName = RoleName::from_static("roles/cloudkms.signerVerifier");

    const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the role name as it appears in [Binding::role].
    ///
    /// [Binding::role]: google_cloud_iam_v1::model::Binding::role
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for RoleName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for RoleName {
    fn from(value: &str) -> Self {
        Self(Cow::Owned(value.to_string()))
    }
}

impl From<String> for RoleName {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl std::str::FromStr for RoleName {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}
