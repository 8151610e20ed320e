//! Integration tests for drive lifecycle transitions and the deadline
//! sweep.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use chrono::Utc;
use common::{drive, drive_with_deadline, InMemoryDriveStore};
use tokio_util::sync::CancellationToken;

use placedrive_core::{CoreError, DriveStatus, DriveStore};
use placedrive_notify::{transition_drive, DeadlineSweep};

// ---------------------------------------------------------------------------
// Test: manual transitions
// ---------------------------------------------------------------------------

/// The happy path walks every legal edge: publish, hold, reopen, finish.
#[tokio::test]
async fn admin_transitions_follow_the_state_machine() {
    let store = InMemoryDriveStore::with_drives([drive(1, DriveStatus::Draft)]);

    transition_drive(&store, 1, DriveStatus::Open)
        .await
        .unwrap();
    assert_eq!(store.status_of(1), Some(DriveStatus::Open));

    transition_drive(&store, 1, DriveStatus::OnHold)
        .await
        .unwrap();
    assert_eq!(store.status_of(1), Some(DriveStatus::OnHold));

    transition_drive(&store, 1, DriveStatus::Open)
        .await
        .unwrap();
    transition_drive(&store, 1, DriveStatus::Completed)
        .await
        .unwrap();
    assert_eq!(store.status_of(1), Some(DriveStatus::Completed));
}

/// Illegal edges are rejected and leave the drive untouched.
#[tokio::test]
async fn illegal_transitions_are_conflicts() {
    let store = InMemoryDriveStore::with_drives([
        drive(1, DriveStatus::Draft),
        drive(2, DriveStatus::Cancelled),
    ]);

    let err = transition_drive(&store, 1, DriveStatus::Completed)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
    assert_eq!(store.status_of(1), Some(DriveStatus::Draft));

    let err = transition_drive(&store, 2, DriveStatus::Open)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
    assert_eq!(store.status_of(2), Some(DriveStatus::Cancelled));
}

#[tokio::test]
async fn transitioning_a_missing_drive_is_not_found() {
    let store = InMemoryDriveStore::new();
    let err = transition_drive(&store, 99, DriveStatus::Open)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NotFound { id: 99, .. });
}

#[tokio::test]
async fn requesting_the_current_status_is_a_no_op() {
    let store = InMemoryDriveStore::with_drives([drive(1, DriveStatus::Open)]);
    transition_drive(&store, 1, DriveStatus::Open)
        .await
        .unwrap();
    assert_eq!(store.status_of(1), Some(DriveStatus::Open));
}

/// A transition that loses its compare-and-set against a concurrent
/// writer surfaces as a conflict, not a silent overwrite.
#[tokio::test]
async fn losing_a_status_race_is_a_conflict() {
    let store = InMemoryDriveStore::with_drives([drive(1, DriveStatus::Open)]);
    store.fail_next_cas();

    let err = transition_drive(&store, 1, DriveStatus::Closed)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
}

// ---------------------------------------------------------------------------
// Test: deadline sweep
// ---------------------------------------------------------------------------

/// Only open drives past their deadline are closed; held, finished and
/// unpublished drives are left alone whatever their deadline says.
#[tokio::test]
async fn sweep_closes_only_expired_open_drives() {
    let past = Utc::now() - chrono::Duration::hours(1);
    let future = Utc::now() + chrono::Duration::hours(1);
    let store = Arc::new(InMemoryDriveStore::with_drives([
        drive_with_deadline(1, DriveStatus::Open, past),
        drive_with_deadline(2, DriveStatus::Open, future),
        drive_with_deadline(3, DriveStatus::OnHold, past),
        drive_with_deadline(4, DriveStatus::Completed, past),
        drive_with_deadline(5, DriveStatus::Draft, past),
    ]));

    let sweep = DeadlineSweep::new(store.clone());
    sweep.sweep_once().await;

    assert_eq!(store.status_of(1), Some(DriveStatus::Closed));
    assert_eq!(store.status_of(2), Some(DriveStatus::Open));
    assert_eq!(store.status_of(3), Some(DriveStatus::OnHold));
    assert_eq!(store.status_of(4), Some(DriveStatus::Completed));
    assert_eq!(store.status_of(5), Some(DriveStatus::Draft));
}

/// A pass that finds nothing new closes nothing: sweeping is idempotent.
#[tokio::test]
async fn repeated_sweeps_close_nothing_new() {
    let past = Utc::now() - chrono::Duration::hours(1);
    let store = InMemoryDriveStore::with_drives([
        drive_with_deadline(1, DriveStatus::Open, past),
        drive_with_deadline(2, DriveStatus::Open, past),
    ]);

    assert_eq!(store.close_expired().await.unwrap(), 2);
    assert_eq!(store.close_expired().await.unwrap(), 0);
}

/// The loop does a first pass immediately and exits promptly on
/// cancellation.
#[tokio::test]
async fn sweep_loop_runs_until_cancelled() {
    let past = Utc::now() - chrono::Duration::hours(1);
    let store = Arc::new(InMemoryDriveStore::with_drives([drive_with_deadline(
        1,
        DriveStatus::Open,
        past,
    )]));

    let sweep = DeadlineSweep::new(store.clone()).with_interval(Duration::from_millis(50));
    let cancel = CancellationToken::new();
    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move { sweep.run(cancel).await })
    };

    let mut closed = false;
    for _ in 0..100 {
        if store.status_of(1) == Some(DriveStatus::Closed) {
            closed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(closed, "sweep should close the expired drive");

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("sweep loop should exit when cancelled")
        .expect("sweep loop should not panic");
}
