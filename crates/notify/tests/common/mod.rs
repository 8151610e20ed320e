#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use placedrive_core::message::{PushMessage, TemplateMessage};
use placedrive_core::types::{DbId, Timestamp};
use placedrive_core::{
    CoreError, Drive, DriveStatus, DriveStore, EligibilityCriteria, StudentDirectory,
    StudentEligibilityProfile,
};
use placedrive_notify::gateway::messaging::{MessagingError, MessagingGateway};
use placedrive_notify::gateway::push::{BatchReceipt, PushError, PushGateway};

/// Token that makes [`RecordingPushGateway`] reject the whole batch with
/// a permanent HTTP 400.
pub const REJECTED_TOKEN: &str = "token-rejected";

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// A drive with sensible defaults and a deadline a week out.
pub fn drive(id: DbId, status: DriveStatus) -> Drive {
    drive_with_deadline(id, status, Utc::now() + chrono::Duration::days(7))
}

pub fn drive_with_deadline(id: DbId, status: DriveStatus, deadline: Timestamp) -> Drive {
    Drive {
        id,
        company_name: "Apex Systems".to_string(),
        job_role: "Software Engineer".to_string(),
        eligibility: EligibilityCriteria::new(),
        drive_date: deadline.date_naive(),
        deadline,
        status,
        posted_by: 1,
        created_at: Utc::now(),
    }
}

/// A CSE 2025 student with CGPA 8.0 and no backlogs. Tests tweak the
/// public fields directly where they need something else.
pub fn student(
    id: DbId,
    push_token: Option<&str>,
    phone: Option<&str>,
) -> StudentEligibilityProfile {
    StudentEligibilityProfile {
        student_id: id,
        department: Some("CSE".to_string()),
        batch_year: Some(2025),
        cgpa: Some(8.0),
        backlogs: Some(0),
        placement_willing: None,
        push_token: push_token.map(str::to_string),
        phone: phone.map(str::to_string),
    }
}

// ---------------------------------------------------------------------------
// Store fakes
// ---------------------------------------------------------------------------

/// In-memory [`DriveStore`] for exercising the coordinator and the sweep
/// without a database.
#[derive(Default)]
pub struct InMemoryDriveStore {
    drives: Mutex<HashMap<DbId, Drive>>,
    fail_cas: AtomicBool,
}

impl InMemoryDriveStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drives(drives: impl IntoIterator<Item = Drive>) -> Self {
        let store = Self::new();
        for drive in drives {
            store.insert(drive);
        }
        store
    }

    pub fn insert(&self, drive: Drive) {
        self.drives.lock().unwrap().insert(drive.id, drive);
    }

    pub fn status_of(&self, id: DbId) -> Option<DriveStatus> {
        self.drives.lock().unwrap().get(&id).map(|d| d.status)
    }

    /// Make every subsequent `set_status` lose its compare-and-set.
    pub fn fail_next_cas(&self) {
        self.fail_cas.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DriveStore for InMemoryDriveStore {
    async fn fetch_drive(&self, id: DbId) -> Result<Option<Drive>, CoreError> {
        Ok(self.drives.lock().unwrap().get(&id).cloned())
    }

    async fn close_expired(&self) -> Result<u64, CoreError> {
        let now = Utc::now();
        let mut closed = 0;
        for drive in self.drives.lock().unwrap().values_mut() {
            if drive.status == DriveStatus::Open && drive.deadline < now {
                drive.status = DriveStatus::Closed;
                closed += 1;
            }
        }
        Ok(closed)
    }

    async fn set_status(
        &self,
        id: DbId,
        from: DriveStatus,
        to: DriveStatus,
    ) -> Result<bool, CoreError> {
        if self.fail_cas.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let mut drives = self.drives.lock().unwrap();
        match drives.get_mut(&id) {
            Some(drive) if drive.status == from => {
                drive.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// In-memory [`StudentDirectory`] that returns its whole population for
/// every query, leaving all filtering to the caller.
pub struct InMemoryDirectory {
    students: Vec<StudentEligibilityProfile>,
    queries: AtomicUsize,
}

impl InMemoryDirectory {
    pub fn new(students: Vec<StudentEligibilityProfile>) -> Self {
        Self {
            students,
            queries: AtomicUsize::new(0),
        }
    }

    /// How many times `eligible_pool` was called.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StudentDirectory for InMemoryDirectory {
    async fn eligible_pool(
        &self,
        _criteria: &EligibilityCriteria,
    ) -> Result<Vec<StudentEligibilityProfile>, CoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.students.clone())
    }
}

// ---------------------------------------------------------------------------
// Gateway fakes
// ---------------------------------------------------------------------------

/// Push gateway that records every batch it is handed. Batches containing
/// [`REJECTED_TOKEN`] fail with a permanent HTTP 400; everything else is
/// delivered in full.
#[derive(Default)]
pub struct RecordingPushGateway {
    batches: Mutex<Vec<Vec<String>>>,
    messages: Mutex<Vec<PushMessage>>,
    calls: AtomicUsize,
}

impl RecordingPushGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<PushMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushGateway for RecordingPushGateway {
    async fn send_multicast(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<BatchReceipt, PushError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().unwrap().push(tokens.to_vec());
        self.messages.lock().unwrap().push(message.clone());
        if tokens.iter().any(|t| t == REJECTED_TOKEN) {
            return Err(PushError::HttpStatus(400));
        }
        Ok(BatchReceipt {
            delivered: tokens.len(),
            failed: 0,
        })
    }
}

/// Push gateway that fails with HTTP 503 a fixed number of times, then
/// delivers everything.
pub struct FlakyPushGateway {
    failures_left: AtomicUsize,
    calls: AtomicUsize,
}

impl FlakyPushGateway {
    pub fn failing(times: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(times),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushGateway for FlakyPushGateway {
    async fn send_multicast(
        &self,
        tokens: &[String],
        _message: &PushMessage,
    ) -> Result<BatchReceipt, PushError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(PushError::HttpStatus(503));
        }
        Ok(BatchReceipt {
            delivered: tokens.len(),
            failed: 0,
        })
    }
}

/// Push gateway that never answers within any reasonable deadline.
pub struct HangingPushGateway;

#[async_trait]
impl PushGateway for HangingPushGateway {
    async fn send_multicast(
        &self,
        tokens: &[String],
        _message: &PushMessage,
    ) -> Result<BatchReceipt, PushError> {
        tokio::time::sleep(Duration::from_secs(300)).await;
        Ok(BatchReceipt {
            delivered: tokens.len(),
            failed: 0,
        })
    }
}

/// Push gateway that parks inside `send_multicast` until released, so a
/// test can control exactly when delivery happens.
pub struct GatedPushGateway {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
    delivered: AtomicUsize,
}

impl GatedPushGateway {
    pub fn new() -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            delivered: AtomicUsize::new(0),
        }
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }
}

impl Default for GatedPushGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushGateway for GatedPushGateway {
    async fn send_multicast(
        &self,
        tokens: &[String],
        _message: &PushMessage,
    ) -> Result<BatchReceipt, PushError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.delivered.fetch_add(tokens.len(), Ordering::SeqCst);
        Ok(BatchReceipt {
            delivered: tokens.len(),
            failed: 0,
        })
    }
}

/// Messaging gateway that records every send. One recipient can be
/// marked to fail with a permanent HTTP 400.
#[derive(Default)]
pub struct RecordingMessagingGateway {
    sends: Mutex<Vec<(String, TemplateMessage)>>,
    fail_recipient: Option<String>,
}

impl RecordingMessagingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(recipient: &str) -> Self {
        Self {
            sends: Mutex::new(Vec::new()),
            fail_recipient: Some(recipient.to_string()),
        }
    }

    pub fn sends(&self) -> Vec<(String, TemplateMessage)> {
        self.sends.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingGateway for RecordingMessagingGateway {
    async fn send_template(
        &self,
        recipient: &str,
        message: &TemplateMessage,
    ) -> Result<(), MessagingError> {
        self.sends
            .lock()
            .unwrap()
            .push((recipient.to_string(), message.clone()));
        if self.fail_recipient.as_deref() == Some(recipient) {
            return Err(MessagingError::HttpStatus(400));
        }
        Ok(())
    }
}
