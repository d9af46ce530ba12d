//! Class schedule models, DTOs and timetable rules.
//!
//! - [`changes`]: dirty-field tracking of edited entries against a snapshot
//! - [`conflicts`]: double-booking detection for sections and teachers
//! - [`timetable`]: weekly grid view of entries

pub mod changes;
pub mod conflicts;
pub mod timetable;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use edudesk_core::PaginationMeta;
use edudesk_core::PaginationParams;
use edudesk_core::serde::deserialize_optional_parsed;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{ClassId, PeriodId, ScheduleId, SectionId, SubjectId, TeacherId};

pub use changes::{
    EntryChange, FieldChange, FieldDiff, ScheduleChangeError, ScheduleChangeTracker, ScheduleField,
};
pub use conflicts::{
    ConflictKind, ConflictParty, ScheduleConflict, ScheduleSlot, describe_conflicts, detect_conflicts,
};
pub use timetable::{Timetable, TimetableDay, build_timetable};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "day_of_week", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.as_str() == lowered || day.as_str()[..3] == lowered)
            .ok_or_else(|| format!("unknown day of week: {}", s))
    }
}

/// Lifecycle of a schedule entry.
///
/// `draft → active`, `draft → inactive`, `active ⇄ inactive`. Nothing goes
/// back to `draft`. Inactive entries never take part in conflict checks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "schedule_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    #[default]
    Draft,
    Active,
    Inactive,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Draft => "draft",
            ScheduleStatus::Active => "active",
            ScheduleStatus::Inactive => "inactive",
        }
    }

    pub fn can_transition_to(self, next: ScheduleStatus) -> bool {
        use ScheduleStatus::*;
        matches!(
            (self, next),
            (Draft, Draft)
                | (Draft, Active)
                | (Draft, Inactive)
                | (Active, Active)
                | (Active, Inactive)
                | (Inactive, Inactive)
                | (Inactive, Active)
        )
    }

    /// Whether entries in this status occupy their slot.
    pub fn occupies_slot(self) -> bool {
        self != ScheduleStatus::Inactive
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(ScheduleStatus::Draft),
            "active" => Ok(ScheduleStatus::Active),
            "inactive" => Ok(ScheduleStatus::Inactive),
            other => Err(format!("unknown schedule status: {}", other)),
        }
    }
}

/// A schedule entry joined with the display names of what it references.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScheduleEntry {
    pub id: ScheduleId,
    pub day: DayOfWeek,
    pub period_id: PeriodId,
    pub class_id: ClassId,
    pub section_id: SectionId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    pub room: Option<String>,
    pub status: ScheduleStatus,
    #[sqlx(default)]
    pub period_name: Option<String>,
    #[sqlx(default)]
    pub period_sort_order: Option<i32>,
    #[sqlx(default)]
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[sqlx(default)]
    #[schema(value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
    #[sqlx(default)]
    pub class_name: Option<String>,
    #[sqlx(default)]
    pub section_name: Option<String>,
    #[sqlx(default)]
    pub subject_name: Option<String>,
    #[sqlx(default)]
    pub teacher_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleEntry {
    pub fn fields(&self) -> ScheduleFields {
        ScheduleFields {
            day: self.day,
            period_id: self.period_id,
            class_id: self.class_id,
            section_id: self.section_id,
            subject_id: self.subject_id,
            teacher_id: self.teacher_id,
            room: self.room.clone(),
            status: self.status,
        }
    }
}

/// The editable part of a schedule entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScheduleFields {
    pub day: DayOfWeek,
    pub period_id: PeriodId,
    pub class_id: ClassId,
    pub section_id: SectionId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    pub room: Option<String>,
    pub status: ScheduleStatus,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateScheduleDto {
    pub day: DayOfWeek,
    pub period_id: PeriodId,
    pub class_id: ClassId,
    pub section_id: SectionId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    #[validate(length(max = 50))]
    pub room: Option<String>,
    /// Defaults to `draft`
    #[serde(default)]
    pub status: ScheduleStatus,
}

impl CreateScheduleDto {
    pub fn into_fields(self) -> ScheduleFields {
        ScheduleFields {
            day: self.day,
            period_id: self.period_id,
            class_id: self.class_id,
            section_id: self.section_id,
            subject_id: self.subject_id,
            teacher_id: self.teacher_id,
            room: normalize_room(self.room),
            status: self.status,
        }
    }
}

/// Partial edit of one entry. `room: ""` clears the room.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateScheduleDto {
    pub day: Option<DayOfWeek>,
    pub period_id: Option<PeriodId>,
    pub class_id: Option<ClassId>,
    pub section_id: Option<SectionId>,
    pub subject_id: Option<SubjectId>,
    pub teacher_id: Option<TeacherId>,
    #[validate(length(max = 50))]
    pub room: Option<String>,
    pub status: Option<ScheduleStatus>,
}

impl UpdateScheduleDto {
    /// The field changes carried by this edit, in field order.
    pub fn changes(&self) -> Vec<FieldChange> {
        let mut changes = Vec::new();
        if let Some(day) = self.day {
            changes.push(FieldChange::Day(day));
        }
        if let Some(period_id) = self.period_id {
            changes.push(FieldChange::Period(period_id));
        }
        if let Some(class_id) = self.class_id {
            changes.push(FieldChange::Class(class_id));
        }
        if let Some(section_id) = self.section_id {
            changes.push(FieldChange::Section(section_id));
        }
        if let Some(subject_id) = self.subject_id {
            changes.push(FieldChange::Subject(subject_id));
        }
        if let Some(teacher_id) = self.teacher_id {
            changes.push(FieldChange::Teacher(teacher_id));
        }
        if let Some(room) = &self.room {
            changes.push(FieldChange::Room(normalize_room(Some(room.clone()))));
        }
        if let Some(status) = self.status {
            changes.push(FieldChange::Status(status));
        }
        changes
    }
}

/// One edited entry inside a bulk submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ScheduleEntryPatch {
    pub id: ScheduleId,
    #[serde(flatten)]
    #[validate(nested)]
    pub update: UpdateScheduleDto,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BulkScheduleUpdateDto {
    #[validate(length(min = 1, max = 500), nested)]
    pub entries: Vec<ScheduleEntryPatch>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkScheduleUpdateResponse {
    pub updated: usize,
    pub unchanged: usize,
    pub changes: Vec<EntryChange>,
    pub entries: Vec<ScheduleEntry>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateScheduleStatusDto {
    pub status: ScheduleStatus,
}

/// Dry-run body for `POST /schedules/validate`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ValidateSchedulesDto {
    /// Proposed entries; an `id` marks an edit of a stored entry.
    #[validate(length(min = 1, max = 500))]
    pub entries: Vec<ProposedSchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProposedSchedule {
    pub id: Option<ScheduleId>,
    #[serde(flatten)]
    pub fields: ScheduleFields,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleValidationReport {
    pub valid: bool,
    pub conflicts: Vec<ScheduleConflict>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScheduleFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub day: Option<DayOfWeek>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub class_id: Option<ClassId>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub section_id: Option<SectionId>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub teacher_id: Option<TeacherId>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub status: Option<ScheduleStatus>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimetableParams {
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub class_id: Option<ClassId>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub section_id: Option<SectionId>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub teacher_id: Option<TeacherId>,
    /// Include inactive entries (default: false)
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedSchedulesResponse {
    pub data: Vec<ScheduleEntry>,
    pub meta: PaginationMeta,
}

/// Trims a room name; blank means no room.
pub fn normalize_room(room: Option<String>) -> Option<String> {
    room.map(|r| r.trim().to_string()).filter(|r| !r.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_parse() {
        assert_eq!("Monday".parse::<DayOfWeek>().unwrap(), DayOfWeek::Monday);
        assert_eq!("fri".parse::<DayOfWeek>().unwrap(), DayOfWeek::Friday);
        assert!("funday".parse::<DayOfWeek>().is_err());
    }

    #[test]
    fn test_day_order_follows_week() {
        let mut days = vec![DayOfWeek::Friday, DayOfWeek::Monday, DayOfWeek::Wednesday];
        days.sort();
        assert_eq!(
            days,
            vec![DayOfWeek::Monday, DayOfWeek::Wednesday, DayOfWeek::Friday]
        );
    }

    #[test]
    fn test_status_transitions() {
        use ScheduleStatus::*;
        assert!(Draft.can_transition_to(Active));
        assert!(Draft.can_transition_to(Inactive));
        assert!(Active.can_transition_to(Inactive));
        assert!(Inactive.can_transition_to(Active));
        assert!(!Active.can_transition_to(Draft));
        assert!(!Inactive.can_transition_to(Draft));
    }

    #[test]
    fn test_status_occupies_slot() {
        assert!(ScheduleStatus::Draft.occupies_slot());
        assert!(ScheduleStatus::Active.occupies_slot());
        assert!(!ScheduleStatus::Inactive.occupies_slot());
    }

    #[test]
    fn test_create_dto_defaults_to_draft() {
        let json = format!(
            r#"{{"day":"tuesday","period_id":"{}","class_id":"{}","section_id":"{}","subject_id":"{}","teacher_id":"{}","room":"  "}}"#,
            PeriodId::new(),
            ClassId::new(),
            SectionId::new(),
            SubjectId::new(),
            TeacherId::new()
        );
        let dto: CreateScheduleDto = serde_json::from_str(&json).unwrap();
        assert_eq!(dto.status, ScheduleStatus::Draft);

        let fields = dto.into_fields();
        assert_eq!(fields.day, DayOfWeek::Tuesday);
        assert_eq!(fields.room, None);
    }

    #[test]
    fn test_update_dto_changes_in_field_order() {
        let teacher_id = TeacherId::new();
        let dto = UpdateScheduleDto {
            status: Some(ScheduleStatus::Active),
            teacher_id: Some(teacher_id),
            room: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(
            dto.changes(),
            vec![
                FieldChange::Teacher(teacher_id),
                FieldChange::Room(None),
                FieldChange::Status(ScheduleStatus::Active),
            ]
        );
    }

    #[test]
    fn test_bulk_patch_is_flat_json() {
        let id = ScheduleId::new();
        let json = format!(r#"{{"entries":[{{"id":"{}","day":"monday"}}]}}"#, id);
        let dto: BulkScheduleUpdateDto = serde_json::from_str(&json).unwrap();
        assert_eq!(dto.entries[0].id, id);
        assert_eq!(dto.entries[0].update.day, Some(DayOfWeek::Monday));
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_bulk_requires_entries() {
        let dto = BulkScheduleUpdateDto { entries: vec![] };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_validate_body_bounds() {
        let empty: ValidateSchedulesDto = serde_json::from_str(r#"{"entries":[]}"#).unwrap();
        assert!(empty.validate().is_err());

        let json = format!(
            r#"{{"entries":[{{"day":"monday","period_id":"{}","class_id":"{}","section_id":"{}","subject_id":"{}","teacher_id":"{}","status":"draft"}}]}}"#,
            PeriodId::new(),
            ClassId::new(),
            SectionId::new(),
            SubjectId::new(),
            TeacherId::new()
        );
        let dto: ValidateSchedulesDto = serde_json::from_str(&json).unwrap();
        assert!(dto.validate().is_ok());
        assert!(dto.entries[0].id.is_none());
    }
}
