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

use google_cloud_gax::client_builder::Error as BuilderError;
use google_cloud_gax::error::Error as RpcError;
use google_cloud_gax::error::rpc::{Code, Status};

/// The step interrupted by a cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Step {
    GetCryptoKey,
    GetIamPolicy,
    SetIamPolicy,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::GetCryptoKey => "GetCryptoKey",
            Self::GetIamPolicy => "GetIamPolicy",
            Self::SetIamPolicy => "SetIamPolicy",
        };
        f.write_str(name)
    }
}

/// Errors returned when updating the IAM policy of a crypto key.
///
/// Each variant identifies the step that failed. The error returned by the
/// client library, if any, is available via [source()][std::error::Error::source].
///
/// None of these errors are retried. In particular, a
/// [ConcurrentModification][Error::ConcurrentModification] means the policy
/// changed after it was fetched. Applications may retry the complete
/// operation, which fetches a fresh policy.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The client for the Cloud KMS service could not be created.
    ///
    /// # Troubleshooting
    ///
    /// The most common cause is missing Application Default Credentials.
    #[error("cannot create the Cloud KMS client: {0}")]
    ClientInitialization(#[source] BuilderError),

    /// The crypto key does not exist.
    ///
    /// Malformed resource names are also reported as not found by the service.
    #[error("crypto key {name} not found")]
    ResourceNotFound {
        name: String,
        #[source]
        source: RpcError,
    },

    /// The crypto key lookup failed for reasons other than a missing key.
    #[error("cannot get crypto key {name}: {source}")]
    KeyLookup {
        name: String,
        #[source]
        source: RpcError,
    },

    /// The IAM policy for the crypto key could not be fetched.
    #[error("cannot get the IAM policy for {name}: {source}")]
    PolicyFetch {
        name: String,
        #[source]
        source: RpcError,
    },

    /// The IAM policy changed between the fetch and the update.
    ///
    /// The service compares the `etag` in the updated policy against the etag
    /// of the current policy, and rejects the update if they differ. The
    /// stored policy is unchanged.
    #[error("the IAM policy for {name} was modified concurrently: {source}")]
    ConcurrentModification {
        name: String,
        #[source]
        source: RpcError,
    },

    /// The updated IAM policy could not be stored.
    #[error("cannot set the IAM policy for {name}: {source}")]
    PolicyPersist {
        name: String,
        #[source]
        source: RpcError,
    },

    /// The operation was cancelled before `step` completed.
    #[error("cancelled while waiting for {step} on {name}")]
    Cancelled { name: String, step: Step },

    /// The confirmation could not be written to the output.
    #[error("cannot write the confirmation: {0}")]
    Output(#[source] std::io::Error),
}

impl Error {
    /// The crypto key was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }

    /// The policy changed after it was fetched.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }

    /// The caller cancelled the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The status returned by the service, if the error came from an RPC.
    pub fn status(&self) -> Option<&Status> {
        self.rpc_error().and_then(RpcError::status)
    }

    fn rpc_error(&self) -> Option<&RpcError> {
        match self {
            Self::ResourceNotFound { source, .. }
            | Self::KeyLookup { source, .. }
            | Self::PolicyFetch { source, .. }
            | Self::ConcurrentModification { source, .. }
            | Self::PolicyPersist { source, .. } => Some(source),
            Self::ClientInitialization(_) | Self::Cancelled { .. } | Self::Output(_) => None,
        }
    }

    pub(crate) fn key_lookup(name: &str, source: RpcError) -> Self {
        let name = name.to_string();
        if has_code(&source, Code::NotFound) {
            return Self::ResourceNotFound { name, source };
        }
        Self::KeyLookup { name, source }
    }

    pub(crate) fn policy_fetch(name: &str, source: RpcError) -> Self {
        Self::PolicyFetch {
            name: name.to_string(),
            source,
        }
    }

    pub(crate) fn policy_persist(name: &str, source: RpcError) -> Self {
        let name = name.to_string();
        if has_code(&source, Code::Aborted) {
            return Self::ConcurrentModification { name, source };
        }
        Self::PolicyPersist { name, source }
    }

    pub(crate) fn cancelled(name: &str, step: Step) -> Self {
        Self::Cancelled {
            name: name.to_string(),
            step,
        }
    }
}

fn has_code(error: &RpcError, code: Code) -> bool {
    error.status().is_some_and(|s| s.code == code)
}
