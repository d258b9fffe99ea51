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

//! Remove a member from the IAM policy of a crypto key.
//!
//! The update is a single read-modify-write cycle:
//!
//! 1. Get the crypto key.
//! 2. Get the current IAM policy, including its `etag`.
//! 3. Remove the `(member, role)` binding, see [without_binding].
//! 4. Set the updated policy. The service rejects the update if the `etag` is
//!    stale, and the sample returns [Error::ConcurrentModification].
//!
//! Only the last step changes the state in the service. If any step fails the
//! policy is left unchanged.

// [START kms_remove_member_from_cryptokey_policy]
use crate::error::Step;
use crate::policy::{grants, without_binding};
use crate::{CryptoKeyIam, Error, Result, RoleName};
use google_cloud_iam_v1::model::Policy;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// The result of a successful [remove_member] call.
#[derive(Clone, Debug, PartialEq)]
pub struct Confirmation {
    member: String,
    role: RoleName,
    binding_removed: bool,
    policy: Policy,
}

impl Confirmation {
    /// The member removed from the policy.
    pub fn member(&self) -> &str {
        &self.member
    }

    /// The role the member no longer has.
    pub fn role(&self) -> &RoleName {
        &self.role
    }

    /// Returns false if the policy did not grant the role to the member.
    ///
    /// Removing a member that is not in the policy is not an error. The
    /// updated policy is still written, and is equal to the original policy.
    pub fn binding_removed(&self) -> bool {
        self.binding_removed
    }

    /// The policy returned by the service after the update.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn into_policy(self) -> Policy {
        self.policy
    }
}

impl std::fmt::Display for Confirmation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Removed member {} from cryptokey policy.", self.member)
    }
}

/// Removes `member` from `role` in the IAM policy of the crypto key `name`,
/// and writes a confirmation to `writer`.
///
/// # Parameters
/// - `name`: the full name of the crypto key. For example:
///   `projects/my-project/locations/global/keyRings/my-ring/cryptoKeys/my-key`
/// - `member`: the principal to remove. For example: `user:alice@example.com`
/// - `role`: the role to remove from the principal. For example:
///   [RoleName::VIEWER]
/// - `cancel`: cancelling this token stops any pending request.
pub async fn sample<W, C>(
    writer: &mut W,
    client: &C,
    name: &str,
    member: &str,
    role: &RoleName,
    cancel: &CancellationToken,
) -> Result<Confirmation>
where
    W: std::io::Write + ?Sized,
    C: CryptoKeyIam + ?Sized,
{
    let confirmation = remove_member(client, name, member, role, cancel).await?;
    write!(writer, "{confirmation}").map_err(Error::Output)?;
    Ok(confirmation)
}
// [END kms_remove_member_from_cryptokey_policy]

/// Removes `member` from `role` in the IAM policy of the crypto key `name`.
///
/// See the [module documentation][self] for details.
#[tracing::instrument(level = "debug", skip(client, cancel))]
pub async fn remove_member<C>(
    client: &C,
    name: &str,
    member: &str,
    role: &RoleName,
    cancel: &CancellationToken,
) -> Result<Confirmation>
where
    C: CryptoKeyIam + ?Sized,
{
    let key = with_cancel(
        cancel,
        name,
        Step::GetCryptoKey,
        client.get_crypto_key(name),
    )
    .await?
    .map_err(|e| Error::key_lookup(name, e))?;
    let resource = if key.name.is_empty() {
        name
    } else {
        key.name.as_str()
    };
    tracing::debug!("found crypto key {resource}");

    let policy = with_cancel(
        cancel,
        resource,
        Step::GetIamPolicy,
        client.get_iam_policy(resource),
    )
    .await?
    .map_err(|e| Error::policy_fetch(resource, e))?;
    tracing::debug!(
        bindings = policy.bindings.len(),
        etag = ?policy.etag,
        "fetched IAM policy"
    );

    let binding_removed = grants(&policy, member, role);
    let updated = without_binding(policy, member, role);
    if !binding_removed {
        tracing::debug!("the policy does not grant {role} to {member}");
    }

    let policy = with_cancel(
        cancel,
        resource,
        Step::SetIamPolicy,
        client.set_iam_policy(resource, updated),
    )
    .await?
    .map_err(|e| Error::policy_persist(resource, e))
    .inspect_err(|e| {
        if e.is_conflict() {
            tracing::warn!("{e}");
        }
    })?;
    tracing::debug!(etag = ?policy.etag, "updated IAM policy");

    Ok(Confirmation {
        member: member.to_string(),
        role: role.clone(),
        binding_removed,
        policy,
    })
}

async fn with_cancel<F, T>(
    cancel: &CancellationToken,
    name: &str,
    step: Step,
    request: F,
) -> Result<google_cloud_gax::Result<T>>
where
    F: Future<Output = google_cloud_gax::Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::cancelled(name, step)),
        response = request => Ok(response),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_key_iam::MockCryptoKeyIam;
    use google_cloud_gax::error::Error as RpcError;
    use google_cloud_gax::error::rpc::{Code, Status};
    use google_cloud_iam_v1::model::Binding;
    use google_cloud_kms_v1::model::CryptoKey;
    use pretty_assertions::assert_eq;

    const NAME: &str = "projects/p/locations/global/keyRings/r/cryptoKeys/k";
    const USER: &str = "user@example.com";
    const ADMIN: &str = "admin@example.com";
    type TestResult = anyhow::Result<()>;

    fn initial_policy() -> Policy {
        Policy::new()
            .set_version(1)
            .set_etag(bytes::Bytes::from_static(b"etag-1"))
            .set_bindings([
                Binding::new()
                    .set_role(RoleName::VIEWER.as_str())
                    .set_members([USER]),
                Binding::new()
                    .set_role(RoleName::EDITOR.as_str())
                    .set_members([ADMIN]),
            ])
    }

    fn service_error(code: Code) -> RpcError {
        RpcError::service(Status::default().set_code(code).set_message("test-only"))
    }

    fn expect_key(mock: &mut MockCryptoKeyIam) {
        mock.expect_get_crypto_key()
            .withf(|name| name == NAME)
            .times(1)
            .returning(|name| Ok(CryptoKey::new().set_name(name)));
    }

    #[tokio::test]
    async fn removes_member() -> TestResult {
        let mut mock = MockCryptoKeyIam::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_get_crypto_key()
            .withf(|name| name == NAME)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|name| Ok(CryptoKey::new().set_name(name)));
        mock.expect_get_iam_policy()
            .withf(|resource| resource == NAME)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(initial_policy()));
        let want = Policy::new()
            .set_version(1)
            .set_etag(bytes::Bytes::from_static(b"etag-1"))
            .set_bindings([Binding::new()
                .set_role(RoleName::EDITOR.as_str())
                .set_members([ADMIN])]);
        let expected = want.clone();
        mock.expect_set_iam_policy()
            .withf(move |resource, policy| resource == NAME && *policy == expected)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, policy| Ok(policy.set_etag(bytes::Bytes::from_static(b"etag-2"))));

        let mut output = Vec::new();
        let confirmation = sample(
            &mut output,
            &mock,
            NAME,
            USER,
            &RoleName::VIEWER,
            &CancellationToken::new(),
        )
        .await?;
        assert_eq!(
            String::from_utf8(output)?,
            "Removed member user@example.com from cryptokey policy."
        );
        assert!(confirmation.binding_removed(), "{confirmation:?}");
        assert_eq!(confirmation.member(), USER);
        assert_eq!(confirmation.role(), &RoleName::VIEWER);
        assert_eq!(
            confirmation.into_policy(),
            want.set_etag(bytes::Bytes::from_static(b"etag-2"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn missing_member_is_noop() -> TestResult {
        let mut mock = MockCryptoKeyIam::new();
        expect_key(&mut mock);
        mock.expect_get_iam_policy()
            .times(1)
            .returning(|_| Ok(initial_policy()));
        mock.expect_set_iam_policy()
            .withf(|_, policy| *policy == initial_policy())
            .times(1)
            .returning(|_, policy| Ok(policy));

        let mut output = Vec::new();
        let confirmation = sample(
            &mut output,
            &mock,
            NAME,
            "nobody@example.com",
            &RoleName::VIEWER,
            &CancellationToken::new(),
        )
        .await?;
        assert_eq!(
            String::from_utf8(output)?,
            "Removed member nobody@example.com from cryptokey policy."
        );
        assert!(!confirmation.binding_removed(), "{confirmation:?}");
        assert_eq!(confirmation.policy(), &initial_policy());
        Ok(())
    }

    #[tokio::test]
    async fn uses_resolved_key_name() -> TestResult {
        const RESOLVED: &str = "projects/123/locations/global/keyRings/r/cryptoKeys/k";
        let mut mock = MockCryptoKeyIam::new();
        mock.expect_get_crypto_key()
            .times(1)
            .returning(|_| Ok(CryptoKey::new().set_name(RESOLVED)));
        mock.expect_get_iam_policy()
            .withf(|resource| resource == RESOLVED)
            .times(1)
            .returning(|_| Ok(initial_policy()));
        mock.expect_set_iam_policy()
            .withf(|resource, _| resource == RESOLVED)
            .times(1)
            .returning(|_, policy| Ok(policy));

        let confirmation = remove_member(
            &mock,
            NAME,
            USER,
            &RoleName::VIEWER,
            &CancellationToken::new(),
        )
        .await?;
        assert!(confirmation.binding_removed(), "{confirmation:?}");
        Ok(())
    }

    #[tokio::test]
    async fn key_not_found() {
        let mut mock = MockCryptoKeyIam::new();
        mock.expect_get_crypto_key()
            .times(1)
            .returning(|_| Err(service_error(Code::NotFound)));
        mock.expect_get_iam_policy().never();
        mock.expect_set_iam_policy().never();

        let mut output = Vec::new();
        let got = sample(
            &mut output,
            &mock,
            NAME,
            USER,
            &RoleName::VIEWER,
            &CancellationToken::new(),
        )
        .await;
        assert!(got.as_ref().is_err_and(Error::is_not_found), "{got:?}");
        assert!(output.is_empty(), "{output:?}");
    }

    #[tokio::test]
    async fn key_lookup_error() {
        let mut mock = MockCryptoKeyIam::new();
        mock.expect_get_crypto_key()
            .times(1)
            .returning(|_| Err(service_error(Code::PermissionDenied)));
        mock.expect_get_iam_policy().never();
        mock.expect_set_iam_policy().never();

        let got = remove_member(
            &mock,
            NAME,
            USER,
            &RoleName::VIEWER,
            &CancellationToken::new(),
        )
        .await;
        assert!(
            matches!(got, Err(Error::KeyLookup { ref name, .. }) if name == NAME),
            "{got:?}"
        );
    }

    #[tokio::test]
    async fn policy_fetch_error() {
        let mut mock = MockCryptoKeyIam::new();
        expect_key(&mut mock);
        mock.expect_get_iam_policy()
            .times(1)
            .returning(|_| Err(service_error(Code::Unavailable)));
        mock.expect_set_iam_policy().never();

        let got = remove_member(
            &mock,
            NAME,
            USER,
            &RoleName::VIEWER,
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(got, Err(Error::PolicyFetch { .. })), "{got:?}");
        let status = got.as_ref().err().and_then(Error::status);
        assert_eq!(status.map(|s| s.code), Some(Code::Unavailable));
    }

    #[tokio::test]
    async fn concurrent_modification() {
        let mut mock = MockCryptoKeyIam::new();
        expect_key(&mut mock);
        mock.expect_get_iam_policy()
            .times(1)
            .returning(|_| Ok(initial_policy()));
        mock.expect_set_iam_policy()
            .times(1)
            .returning(|_, _| Err(service_error(Code::Aborted)));

        let mut output = Vec::new();
        let got = sample(
            &mut output,
            &mock,
            NAME,
            USER,
            &RoleName::VIEWER,
            &CancellationToken::new(),
        )
        .await;
        assert!(got.as_ref().is_err_and(Error::is_conflict), "{got:?}");
        assert!(output.is_empty(), "{output:?}");
    }

    #[tokio::test]
    async fn policy_persist_error() {
        let mut mock = MockCryptoKeyIam::new();
        expect_key(&mut mock);
        mock.expect_get_iam_policy()
            .times(1)
            .returning(|_| Ok(initial_policy()));
        mock.expect_set_iam_policy()
            .times(1)
            .returning(|_, _| Err(service_error(Code::PermissionDenied)));

        let got = remove_member(
            &mock,
            NAME,
            USER,
            &RoleName::VIEWER,
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(got, Err(Error::PolicyPersist { .. })), "{got:?}");
    }

    #[tokio::test]
    async fn cancelled_before_start() {
        let mut mock = MockCryptoKeyIam::new();
        mock.expect_get_crypto_key()
            .returning(|name| Ok(CryptoKey::new().set_name(name)));
        mock.expect_get_iam_policy().never();
        mock.expect_set_iam_policy().never();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let got = remove_member(&mock, NAME, USER, &RoleName::VIEWER, &cancel).await;
        assert!(
            matches!(
                got,
                Err(Error::Cancelled {
                    step: Step::GetCryptoKey,
                    ..
                })
            ),
            "{got:?}"
        );
    }

    #[derive(Debug)]
    struct Stalled;

    #[async_trait::async_trait]
    impl CryptoKeyIam for Stalled {
        async fn get_crypto_key(&self, name: &str) -> google_cloud_gax::Result<CryptoKey> {
            Ok(CryptoKey::new().set_name(name))
        }
        async fn get_iam_policy(&self, _resource: &str) -> google_cloud_gax::Result<Policy> {
            std::future::pending().await
        }
        async fn set_iam_policy(
            &self,
            _resource: &str,
            _policy: Policy,
        ) -> google_cloud_gax::Result<Policy> {
            unreachable!("the policy fetch never completes")
        }
    }

    #[tokio::test]
    async fn cancelled_in_flight() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let _task = tokio::spawn(async move {
            tokio::task::yield_now().await;
            trigger.cancel();
        });
        let mut output = Vec::new();
        let got = sample(
            &mut output,
            &Stalled,
            NAME,
            USER,
            &RoleName::VIEWER,
            &cancel,
        )
        .await;
        assert!(
            matches!(
                got,
                Err(Error::Cancelled {
                    step: Step::GetIamPolicy,
                    ..
                })
            ),
            "{got:?}"
        );
        assert!(output.is_empty(), "{output:?}");
    }

    struct BrokenWriter;
    impl std::io::Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("test-only"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn output_error() {
        let mut mock = MockCryptoKeyIam::new();
        expect_key(&mut mock);
        mock.expect_get_iam_policy()
            .times(1)
            .returning(|_| Ok(initial_policy()));
        mock.expect_set_iam_policy()
            .times(1)
            .returning(|_, policy| Ok(policy));

        let got = sample(
            &mut BrokenWriter,
            &mock,
            NAME,
            USER,
            &RoleName::VIEWER,
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(got, Err(Error::Output(_))), "{got:?}");
    }

    #[test]
    fn confirmation_display() {
        let confirmation = Confirmation {
            member: USER.to_string(),
            role: RoleName::VIEWER,
            binding_removed: true,
            policy: Policy::new(),
        };
        assert_eq!(
            confirmation.to_string(),
            "Removed member user@example.com from cryptokey policy."
        );
    }
}
