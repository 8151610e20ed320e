//! Per-channel recipient resolution.
//!
//! Converts the eligible student set into channel-specific recipient
//! identifiers. The two channels resolve independently: a student may be
//! reachable on both, one, or neither, and dropping a student here is a
//! skip, never a failure.

use crate::student::StudentEligibilityProfile;
use crate::types::DbId;

/// Placeholder stored by upstream imports when a phone number is
/// unknown. Must never be dialed.
pub const PHONE_UNSET_SENTINEL: &str = "NA";

/// Country code prefixed onto bare 10-digit local numbers.
const COUNTRY_CODE: &str = "91";

/// Digits in a bare local subscriber number.
const PHONE_LOCAL_DIGITS: usize = 10;

/// Longest acceptable international number (E.164).
const PHONE_MAX_DIGITS: usize = 15;

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// One channel-specific recipient: a push token or a canonical phone
/// number, plus the owning student for result attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTarget {
    pub student_id: DbId,
    pub identifier: String,
}

impl NotificationTarget {
    /// Truncated identifier for log output; full tokens and numbers
    /// never appear in the log.
    pub fn redacted(&self) -> String {
        const VISIBLE: usize = 6;
        let mut head: String = self.identifier.chars().take(VISIBLE).collect();
        if head.len() < self.identifier.len() {
            head.push_str("...");
        }
        head
    }
}

/// Result of resolving one channel's audience from the eligible set.
#[derive(Debug, Clone)]
pub struct ResolvedAudience {
    pub targets: Vec<NotificationTarget>,
    /// Students dropped for lacking a usable identifier on this channel.
    pub skipped: usize,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Students with a non-empty push token.
pub fn push_targets(students: &[StudentEligibilityProfile]) -> ResolvedAudience {
    let mut targets = Vec::new();
    let mut skipped = 0;
    for student in students {
        match student.push_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => targets.push(NotificationTarget {
                student_id: student.student_id,
                identifier: token.to_string(),
            }),
            _ => skipped += 1,
        }
    }
    ResolvedAudience { targets, skipped }
}

/// Students with a usable phone number, normalized to canonical form.
pub fn messaging_targets(students: &[StudentEligibilityProfile]) -> ResolvedAudience {
    let mut targets = Vec::new();
    let mut skipped = 0;
    for student in students {
        match student.phone.as_deref().and_then(normalize_phone) {
            Some(number) => targets.push(NotificationTarget {
                student_id: student.student_id,
                identifier: number,
            }),
            None => skipped += 1,
        }
    }
    ResolvedAudience { targets, skipped }
}

/// Canonicalize a raw phone number for outbound messaging.
///
/// Strips a leading `+`, prefixes bare 10-digit local numbers with the
/// country code, and rejects the unset sentinel, non-numeric input and
/// implausible lengths. Rejected numbers are skipped upstream rather
/// than submitted and retried.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == PHONE_UNSET_SENTINEL {
        return None;
    }
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() == PHONE_LOCAL_DIGITS {
        return Some(format!("{COUNTRY_CODE}{digits}"));
    }
    if digits.len() > PHONE_LOCAL_DIGITS && digits.len() <= PHONE_MAX_DIGITS {
        return Some(digits.to_string());
    }
    None
}
