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

//! Local transformations on IAM policies.
//!
//! These functions never contact the service. They take a policy by value and
//! return the transformed policy, preserving the `etag` so the result can be
//! written back with optimistic concurrency control.

use crate::RoleName;
use google_cloud_iam_v1::model::Policy;

/// Returns `policy` without any grant of `role` to `member`.
///
/// The member is removed from every binding for `role`, including bindings
/// with a condition. Bindings left without members are dropped. All other
/// bindings, the member order within them, the policy `version`, the
/// `audit_configs`, and the `etag` are unchanged.
///
/// Removing a member that is not present returns a policy equal to the input.
///
/// # Example
/// ```
/// # use google_cloud_iam_v1::model::{Binding, Policy};
/// # use kms_samples::{RoleName, policy::without_binding};
/// let policy = Policy::new().set_bindings([
///     Binding::new().set_role("roles/viewer").set_members(["user:a@example.com"]),
///     Binding::new().set_role("roles/editor").set_members(["user:b@example.com"]),
/// ]);
/// let updated = without_binding(policy, "user:a@example.com", &RoleName::VIEWER);
/// assert_eq!(updated.bindings.len(), 1);
/// assert_eq!(updated.bindings[0].role, "roles/editor");
/// ```
pub fn without_binding(mut policy: Policy, member: &str, role: &RoleName) -> Policy {
    if !grants(&policy, member, role) {
        return policy;
    }
    policy
        .bindings
        .iter_mut()
        .filter(|b| b.role == role.as_str())
        .for_each(|b| b.members.retain(|m| m != member));
    policy
        .bindings
        .retain(|b| b.role != role.as_str() || !b.members.is_empty());
    policy
}

/// Returns true if any binding in `policy` grants `role` to `member`.
pub fn grants(policy: &Policy, member: &str, role: &RoleName) -> bool {
    policy
        .bindings
        .iter()
        .any(|b| b.role == role.as_str() && b.members.iter().any(|m| m == member))
}
