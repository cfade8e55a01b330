use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::event::EventId;

const UNKNOWN_COURSE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "attendance_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    NotCheckedIn,
    CheckedIn,
}

/// One attendee's right to attend one event.
///
/// `(event_id, ticket_id)` is unique. `check_in_time` is set exactly when
/// `status` is `CheckedIn` and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub event_id: EventId,
    pub ticket_id: String,
    pub attendee_name: String,
    pub course: Option<String>,
    pub year: Option<String>,
    pub gender: Option<String>,
    pub status: AttendanceStatus,
    pub check_in_time: Option<DateTime<Utc>>,
}

impl Registration {
    /// A fresh, not yet checked-in registration.
    pub fn new(
        event_id: EventId,
        ticket_id: impl Into<String>,
        attendee_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            ticket_id: ticket_id.into(),
            attendee_name: attendee_name.into(),
            course: None,
            year: None,
            gender: None,
            status: AttendanceStatus::NotCheckedIn,
            check_in_time: None,
        }
    }

    pub fn with_course(mut self, course: impl Into<String>) -> Self {
        self.course = Some(course.into());
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn is_checked_in(&self) -> bool {
        self.status == AttendanceStatus::CheckedIn
    }

    /// Applies the one-way transition to `CheckedIn`.
    ///
    /// Returns `false` and leaves the record untouched when it is already
    /// checked in. Callers must hold whatever exclusion guards this row.
    pub(crate) fn mark_checked_in(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_checked_in() {
            return false;
        }
        self.status = AttendanceStatus::CheckedIn;
        self.check_in_time = Some(at);
        true
    }

    pub fn snapshot(&self) -> AttendeeSnapshot {
        AttendeeSnapshot {
            name: self.attendee_name.clone(),
            ticket_id: self.ticket_id.clone(),
            course: self
                .course
                .clone()
                .unwrap_or_else(|| UNKNOWN_COURSE.to_string()),
            year: self.year.clone(),
            check_in_time: self.check_in_time,
        }
    }
}

/// The attendee fields a scanner is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeSnapshot {
    pub name: String,
    pub ticket_id: String,
    pub course: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<DateTime<Utc>>,
}

/// Row of the checked-in attendee list.
#[derive(Debug, Clone, Serialize)]
pub struct AttendeeRecord {
    pub name: String,
    pub id: String,
    pub course: Option<String>,
    pub year: Option<String>,
    pub gender: Option<String>,
    pub time: Option<String>,
}

impl AttendeeRecord {
    /// Builds the list row, showing the check-in time as wall-clock time at
    /// `offset`.
    pub fn from_registration(registration: Registration, offset: FixedOffset) -> Self {
        Self {
            name: registration.attendee_name,
            id: registration.ticket_id,
            course: registration.course,
            year: registration.year,
            gender: registration.gender,
            time: registration
                .check_in_time
                .map(|at| at.with_timezone(&offset).format("%H:%M:%S").to_string()),
        }
    }
}
