use crate::platform::{PermissionService, PermissionStatus, StaticPermission};

/// WHAT: Status is undetermined until the first request
/// WHY: The session only prompts when permission is not yet granted
#[tokio::test]
async fn given_fresh_permission_when_querying_then_undetermined() {
    // Given: A permission service that would grant
    let mut permission = StaticPermission::granted();

    // When: Querying before any request
    let status = permission.status().await.unwrap();

    // Then: Undetermined
    assert_eq!(status, PermissionStatus::Undetermined);
}

/// WHAT: A request records the configured answer
/// WHY: Later status checks must not prompt again
#[tokio::test]
async fn given_denying_permission_when_requesting_then_denied_and_remembered() {
    // Given: A permission service configured to deny
    let mut permission = StaticPermission::denied();

    // When: Requesting
    let answer = permission.request().await.unwrap();

    // Then: Denied now and on later queries
    assert_eq!(answer, PermissionStatus::Denied);
    assert_eq!(permission.status().await.unwrap(), PermissionStatus::Denied);
}
