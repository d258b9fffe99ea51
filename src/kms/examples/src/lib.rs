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

//! Samples showing how to manage the IAM policy of a Cloud KMS crypto key.
//!
//! The main entry point is [remove_member_cryptokey::sample], which removes a
//! member from a role in the policy attached to a crypto key. The policy is
//! updated with a read-modify-write cycle: the service rejects the write if
//! the policy changed after it was fetched, and the sample reports that as
//! [Error::ConcurrentModification] instead of retrying.
//!
//! # Example
//! ```no_run
//! # async fn example() -> anyhow::Result<()> {
//! use kms_samples::{ClientConfig, RoleName, remove_member_cryptokey};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = ClientConfig::default().build().await?;
//! remove_member_cryptokey::sample(
//!     &mut std::io::stdout(),
//!     &client,
//!     "projects/my-project/locations/global/keyRings/my-ring/cryptoKeys/my-key",
//!     "user:alice@example.com",
//!     &RoleName::VIEWER,
//!     &CancellationToken::new(),
//! )
//! .await?;
//! # Ok(()) }
//! ```

pub mod config;
pub mod crypto_key_iam;
pub mod error;
pub mod policy;
pub mod remove_member_cryptokey;
pub mod role;

pub use config::ClientConfig;
pub use crypto_key_iam::CryptoKeyIam;
pub use error::Error;
pub use remove_member_cryptokey::Confirmation;
pub use role::RoleName;

/// The result type for the samples in this crate.
pub type Result<T> = std::result::Result<T, Error>;
