mod common;

use common::*;

use std::sync::Arc;

use image_store::lifecycle::LifecycleError;

/// Quota ceiling scaled down so the tests move kilobytes, not 30 MiB. The
/// ratios mirror the production limits: an owner close to the ceiling is
/// rejected for a large upload and accepted for a small one.
const TEST_CEILING: u64 = 64 * 1024;

fn quota_store() -> TestStore {
    // Raw payloads don't decode as images; resize failures are non-fatal and
    // irrelevant here, so skip the real resizer.
    TestStore::build(
        |mut config| {
            config.owner_quota_bytes = TEST_CEILING;
            config
        },
        Arc::new(FailingResizer),
    )
}

#[tokio::test]
async fn test_upload_over_ceiling_rejected_without_partial_state() {
    let setup = quota_store();

    // Fill to just under the ceiling
    setup
        .lifecycle
        .create_authenticated("alice", vec![1u8; (TEST_CEILING - 2048) as usize], None)
        .await
        .unwrap();

    let result = setup
        .lifecycle
        .create_authenticated("alice", vec![2u8; 4096], None)
        .await;

    assert!(matches!(result, Err(LifecycleError::QuotaExceeded { .. })));
    // The rejected upload left nothing behind
    assert_eq!(setup.on_disk_bytes("alice"), TEST_CEILING - 2048);
    assert_eq!(setup.store().count(Some("alice")).unwrap(), 1);
}

#[tokio::test]
async fn test_small_upload_under_ceiling_accepted() {
    let setup = quota_store();

    setup
        .lifecycle
        .create_authenticated("alice", vec![1u8; (TEST_CEILING - 2048) as usize], None)
        .await
        .unwrap();

    setup
        .lifecycle
        .create_authenticated("alice", vec![2u8; 1024], None)
        .await
        .unwrap();

    assert_eq!(setup.store().count(Some("alice")).unwrap(), 2);
}

#[tokio::test]
async fn test_quota_is_recomputed_after_deletes() {
    let setup = quota_store();

    let record = setup
        .lifecycle
        .create_authenticated("alice", vec![1u8; (TEST_CEILING - 1024) as usize], None)
        .await
        .unwrap();

    // Full: a further upload is rejected
    assert!(matches!(
        setup
            .lifecycle
            .create_authenticated("alice", vec![2u8; 4096], None)
            .await,
        Err(LifecycleError::QuotaExceeded { .. })
    ));

    // Freeing space is reflected immediately; no cached counter to drift
    setup.lifecycle.delete(&record.id, "alice").await.unwrap();
    setup
        .lifecycle
        .create_authenticated("alice", vec![2u8; 4096], None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_quota_is_scoped_per_owner() {
    let setup = quota_store();

    setup
        .lifecycle
        .create_authenticated("alice", vec![1u8; (TEST_CEILING - 1024) as usize], None)
        .await
        .unwrap();

    // Bob's namespace is empty regardless of Alice's usage
    setup
        .lifecycle
        .create_authenticated("bob", vec![2u8; 8192], None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_derived_variants_count_against_the_quota() {
    // The derived file lands in the owner's namespace, so the walk picks it
    // up on the next create.
    let setup = TestStore::build(
        |mut config| {
            config.owner_quota_bytes = TEST_CEILING;
            config
        },
        Arc::new(StaticResizer(vec![9u8; 4096])),
    );

    setup
        .lifecycle
        .create_authenticated("alice", vec![1u8; 1024], None)
        .await
        .unwrap();

    assert_eq!(
        setup.store().total_bytes("alice").await.unwrap(),
        1024 + 4096
    );
}
