//! Check-in / check-out reconciliation.
//!
//! Every submission is keyed by `(user_id, date)` and merged into that day's
//! record, creating it on first use, so a user never has more than one record
//! per day. Fields present in a submission overwrite the stored ones (last
//! write wins) except that a bare check-in against an open shift is refused.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use strum::Display;
use thiserror::Error;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::{
    model::attendance::AttendanceRecord,
    store::{Document, RecordStore},
    utils::shift::hours_between,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttendanceError {
    #[error("Invalid attendance data")]
    InvalidSubmission,

    #[error("You have already checked in today.")]
    AlreadyCheckedIn,

    #[error("Attendance record {0} not found")]
    RecordNotFound(String),
}

/// Fields to merge into a record. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendancePatch {
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub user_name: Option<String>,
}

impl AttendancePatch {
    // Blank strings count as absent.
    fn normalized(self) -> Self {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Self {
            check_in: present(self.check_in),
            check_out: present(self.check_out),
            user_name: present(self.user_name),
        }
    }

    fn has_times(&self) -> bool {
        self.check_in.is_some() || self.check_out.is_some()
    }

    fn is_bare_check_in(&self) -> bool {
        self.check_in.is_some() && self.check_out.is_none()
    }

    fn apply(self, record: &mut AttendanceRecord) {
        if let Some(check_in) = self.check_in {
            record.check_in = Some(check_in);
        }
        if let Some(check_out) = self.check_out {
            record.check_out = Some(check_out);
        }
        if let Some(user_name) = self.user_name {
            record.user_name = Some(user_name);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReconcileStatus {
    #[strum(to_string = "Check-in recorded")]
    CheckInRecorded,
    #[strum(to_string = "Check-out recorded")]
    CheckOutRecorded,
    #[strum(to_string = "Attendance updated")]
    Updated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub record: AttendanceRecord,
    pub status: ReconcileStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftStatus {
    pub is_checked_in: bool,
    #[schema(example = "2024-01-01T09:00:00Z")]
    pub check_in_time: Option<String>,
    /// Hours elapsed in the open shift
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 2.5)]
    pub shift_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub struct AttendanceService {
    store: Arc<dyn RecordStore>,
    // Serializes load-modify-save cycles within this process.
    write_lock: Mutex<()>,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Merges `patch` into the record for `(user_id, date)`, creating it if
    /// the user has none for that day.
    pub fn reconcile(
        &self,
        user_id: u64,
        date: NaiveDate,
        patch: AttendancePatch,
    ) -> Result<Reconciled, AttendanceError> {
        let patch = patch.normalized();
        if !patch.has_times() {
            return Err(AttendanceError::InvalidSubmission);
        }

        let _guard = self.lock();
        let mut doc = self.store.load();

        let reconciled = match position_of(&doc, user_id, date) {
            Some(idx) => {
                let existing = &mut doc.attendance[idx];
                if existing.is_open() && patch.is_bare_check_in() {
                    info!(user_id, %date, record_id = %existing.id, "Duplicate check-in rejected");
                    return Err(AttendanceError::AlreadyCheckedIn);
                }

                patch.apply(existing);
                Reconciled {
                    record: existing.clone(),
                    status: ReconcileStatus::Updated,
                }
            }
            None => {
                let status = if patch.check_in.is_some() {
                    ReconcileStatus::CheckInRecorded
                } else {
                    ReconcileStatus::CheckOutRecorded
                };
                let record = AttendanceRecord {
                    id: next_record_id(&doc.attendance),
                    user_id,
                    user_name: patch.user_name,
                    date,
                    check_in: patch.check_in,
                    check_out: patch.check_out,
                };
                doc.attendance.push(record.clone());
                Reconciled { record, status }
            }
        };

        self.store.save(&doc);
        info!(
            user_id,
            %date,
            record_id = %reconciled.record.id,
            status = %reconciled.status,
            worked_hours = ?reconciled.record.worked_hours(),
            "Attendance reconciled"
        );

        Ok(reconciled)
    }

    /// Admin edit of a single record by id. The duplicate check-in rule does
    /// not apply here.
    pub fn update_record(
        &self,
        record_id: &str,
        patch: AttendancePatch,
    ) -> Result<AttendanceRecord, AttendanceError> {
        let patch = patch.normalized();
        if !patch.has_times() {
            return Err(AttendanceError::InvalidSubmission);
        }

        let _guard = self.lock();
        let mut doc = self.store.load();

        let record = doc
            .attendance
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| AttendanceError::RecordNotFound(record_id.to_string()))?;
        patch.apply(record);
        let record = record.clone();

        self.store.save(&doc);
        info!(record_id, user_id = record.user_id, "Attendance record edited");

        Ok(record)
    }

    pub fn list_all(&self) -> Vec<AttendanceRecord> {
        self.store.load().attendance
    }

    /// First record of `user_id`, restricted to `date` when given.
    pub fn find_by_user(&self, user_id: u64, date: Option<NaiveDate>) -> Option<AttendanceRecord> {
        let record = self
            .store
            .load()
            .attendance
            .into_iter()
            .find(|r| r.user_id == user_id && date.is_none_or(|d| r.date == d));

        debug!(user_id, ?date, found = record.is_some(), "Attendance lookup");
        record
    }

    pub fn status(&self, user_id: u64, date: NaiveDate, now: DateTime<Utc>) -> ShiftStatus {
        let Some(record) = self.find_by_user(user_id, Some(date)) else {
            return ShiftStatus {
                is_checked_in: false,
                check_in_time: None,
                shift_hours: None,
                message: Some("You are not currently in a shift.".to_string()),
            };
        };

        let is_checked_in = record.is_open();
        let shift_hours = if is_checked_in {
            record
                .check_in
                .as_deref()
                .and_then(|check_in| hours_between(check_in, now))
        } else {
            None
        };

        ShiftStatus {
            is_checked_in,
            check_in_time: record.check_in,
            shift_hours,
            message: None,
        }
    }
}

fn position_of(doc: &Document, user_id: u64, date: NaiveDate) -> Option<usize> {
    doc.attendance
        .iter()
        .position(|r| r.user_id == user_id && r.date == date)
}

/// One past the last record's numeric id. Falls back to one past the highest
/// numeric id when the last id is not a number or is already taken.
fn next_record_id(records: &[AttendanceRecord]) -> String {
    let numeric = |r: &AttendanceRecord| r.id.parse::<u64>().ok();

    let Some(last) = records.last() else {
        return "1".to_string();
    };

    let candidate = numeric(last)
        .map(|n| n + 1)
        .filter(|n| !records.iter().any(|r| numeric(r) == Some(*n)));

    candidate
        .unwrap_or_else(|| records.iter().filter_map(numeric).max().map_or(1, |n| n + 1))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    impl AttendancePatch {
        fn check_in(at: impl Into<String>) -> Self {
            Self {
                check_in: Some(at.into()),
                ..Self::default()
            }
        }

        fn check_out(at: impl Into<String>) -> Self {
            Self {
                check_out: Some(at.into()),
                ..Self::default()
            }
        }
    }

    fn service() -> (AttendanceService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        (AttendanceService::new(store.clone()), store)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn record(id: &str, user_id: u64, date: NaiveDate) -> AttendanceRecord {
        AttendanceRecord {
            id: id.into(),
            user_id,
            user_name: None,
            date,
            check_in: None,
            check_out: None,
        }
    }

    #[test]
    fn check_in_then_check_out_closes_one_record() {
        let (svc, _) = service();

        let first = svc
            .reconcile(1, day(1), AttendancePatch::check_in("2024-01-01T09:00:00Z"))
            .unwrap();
        assert_eq!(first.status, ReconcileStatus::CheckInRecorded);
        assert_eq!(first.record.id, "1");

        let second = svc
            .reconcile(1, day(1), AttendancePatch::check_out("2024-01-01T17:00:00Z"))
            .unwrap();
        assert_eq!(second.status, ReconcileStatus::Updated);
        assert_eq!(second.record.id, "1");

        let all = svc.list_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].check_in.as_deref(), Some("2024-01-01T09:00:00Z"));
        assert_eq!(all[0].check_out.as_deref(), Some("2024-01-01T17:00:00Z"));
    }

    #[test]
    fn check_out_without_check_in_creates_record() {
        let (svc, _) = service();

        let out = svc
            .reconcile(4, day(2), AttendancePatch::check_out("17:00"))
            .unwrap();

        assert_eq!(out.status, ReconcileStatus::CheckOutRecorded);
        assert_eq!(out.record.check_in, None);
        assert_eq!(out.record.check_out.as_deref(), Some("17:00"));
    }

    #[test]
    fn submission_without_times_is_rejected() {
        let (svc, store) = service();

        let err = svc
            .reconcile(
                1,
                day(1),
                AttendancePatch {
                    user_name: Some("jane".into()),
                    check_in: Some("   ".into()),
                    check_out: None,
                },
            )
            .unwrap_err();

        assert_eq!(err, AttendanceError::InvalidSubmission);
        assert!(store.load().attendance.is_empty());
    }

    #[test]
    fn second_check_in_on_open_shift_is_rejected() {
        let (svc, _) = service();
        svc.reconcile(1, day(1), AttendancePatch::check_in("09:00")).unwrap();

        let err = svc
            .reconcile(1, day(1), AttendancePatch::check_in("10:00"))
            .unwrap_err();

        assert_eq!(err, AttendanceError::AlreadyCheckedIn);
        assert_eq!(svc.list_all()[0].check_in.as_deref(), Some("09:00"));
    }

    #[test]
    fn check_in_on_closed_shift_overwrites() {
        let (svc, _) = service();
        svc.reconcile(1, day(1), AttendancePatch::check_in("09:00")).unwrap();
        svc.reconcile(1, day(1), AttendancePatch::check_out("17:00")).unwrap();

        let again = svc
            .reconcile(1, day(1), AttendancePatch::check_in("08:30"))
            .unwrap();

        assert_eq!(again.record.check_in.as_deref(), Some("08:30"));
        assert_eq!(again.record.check_out.as_deref(), Some("17:00"));
    }

    #[test]
    fn one_record_per_user_and_day_with_stable_id() {
        let (svc, _) = service();
        svc.reconcile(1, day(1), AttendancePatch::check_in("09:00")).unwrap();
        svc.reconcile(2, day(1), AttendancePatch::check_in("09:05")).unwrap();

        for t in ["17:00", "17:10", "18:00"] {
            let r = svc.reconcile(1, day(1), AttendancePatch::check_out(t)).unwrap();
            assert_eq!(r.record.id, "1");
        }

        let mine: Vec<_> = svc
            .list_all()
            .into_iter()
            .filter(|r| r.user_id == 1 && r.date == day(1))
            .collect();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].check_out.as_deref(), Some("18:00"));
    }

    #[test]
    fn distinct_pairs_produce_distinct_records() {
        let (svc, _) = service();
        let pairs = [(1, 1), (1, 2), (2, 1), (3, 5), (2, 2)];

        for (user, d) in pairs {
            svc.reconcile(user, day(d), AttendancePatch::check_in("09:00")).unwrap();
        }

        let all = svc.list_all();
        assert_eq!(all.len(), pairs.len());
        let ids: Vec<_> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn user_name_is_kept_when_patch_omits_it() {
        let (svc, _) = service();
        svc.reconcile(
            1,
            day(1),
            AttendancePatch {
                user_name: Some("jane".into()),
                ..AttendancePatch::check_in("09:00")
            },
        )
        .unwrap();

        let r = svc.reconcile(1, day(1), AttendancePatch::check_out("17:00")).unwrap();
        assert_eq!(r.record.user_name.as_deref(), Some("jane"));
    }

    #[test]
    fn next_id_follows_last_record() {
        assert_eq!(next_record_id(&[]), "1");
        assert_eq!(
            next_record_id(&[record("4", 1, day(1)), record("9", 1, day(2))]),
            "10"
        );
    }

    #[test]
    fn next_id_skips_non_numeric_and_taken_ids() {
        let legacy = [
            record("7", 1, day(1)),
            record("0b6f4a52-uuid", 1, day(2)),
        ];
        assert_eq!(next_record_id(&legacy), "8");

        let reordered = [record("2", 1, day(1)), record("1", 1, day(2))];
        assert_eq!(next_record_id(&reordered), "3");
    }

    #[test]
    fn find_by_user_with_and_without_date() {
        let (svc, _) = service();
        svc.reconcile(1, day(1), AttendancePatch::check_in("a")).unwrap();
        svc.reconcile(1, day(2), AttendancePatch::check_in("b")).unwrap();

        assert_eq!(svc.find_by_user(1, Some(day(2))).unwrap().id, "2");
        assert_eq!(svc.find_by_user(1, None).unwrap().id, "1");
        assert!(svc.find_by_user(1, Some(day(3))).is_none());
        assert!(svc.find_by_user(9, None).is_none());
    }

    #[test]
    fn update_record_edits_by_id() {
        let (svc, _) = service();
        svc.reconcile(1, day(1), AttendancePatch::check_in("09:00")).unwrap();

        let edited = svc
            .update_record("1", AttendancePatch::check_in("08:00"))
            .unwrap();
        assert_eq!(edited.check_in.as_deref(), Some("08:00"));

        assert_eq!(
            svc.update_record("42", AttendancePatch::check_out("17:00")),
            Err(AttendanceError::RecordNotFound("42".into()))
        );
        assert_eq!(
            svc.update_record("1", AttendancePatch::default()),
            Err(AttendanceError::InvalidSubmission)
        );
    }

    #[test]
    fn status_reports_open_shift_and_elapsed_hours() {
        let (svc, _) = service();
        let now = DateTime::parse_from_rfc3339("2024-01-01T11:30:00Z")
            .unwrap()
            .to_utc();

        let idle = svc.status(1, day(1), now);
        assert!(!idle.is_checked_in);
        assert!(idle.message.is_some());

        svc.reconcile(1, day(1), AttendancePatch::check_in("2024-01-01T09:00:00Z"))
            .unwrap();
        let open = svc.status(1, day(1), now);
        assert!(open.is_checked_in);
        assert_eq!(open.check_in_time.as_deref(), Some("2024-01-01T09:00:00Z"));
        assert_eq!(open.shift_hours, Some(2.5));

        svc.reconcile(1, day(1), AttendancePatch::check_out("2024-01-01T12:00:00Z"))
            .unwrap();
        let closed = svc.status(1, day(1), now);
        assert!(!closed.is_checked_in);
        assert_eq!(closed.shift_hours, None);
    }

    #[test]
    fn concurrent_check_ins_all_land_with_distinct_ids() {
        const USERS: u64 = 16;
        let (svc, _) = service();

        std::thread::scope(|scope| {
            for user_id in 1..=USERS {
                let svc = &svc;
                scope.spawn(move || {
                    svc.reconcile(user_id, day(1), AttendancePatch::check_in("09:00"))
                        .unwrap();
                });
            }
        });

        let records = svc.list_all();
        assert_eq!(records.len(), USERS as usize);
        let ids: std::collections::HashSet<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), USERS as usize);
        let users: std::collections::HashSet<_> = records.iter().map(|r| r.user_id).collect();
        assert_eq!(users.len(), USERS as usize);
    }
}
