//! Dirty-field tracking for schedule edits.
//!
//! The tracker holds an original snapshot and a working copy of each entry.
//! A field is dirty while its working value differs from the original;
//! setting it back to the original value removes it from the change-set.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::{DayOfWeek, ScheduleEntry, ScheduleFields, ScheduleStatus};
use crate::ids::{ClassId, PeriodId, ScheduleId, SectionId, SubjectId, TeacherId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleField {
    Day,
    PeriodId,
    ClassId,
    SectionId,
    SubjectId,
    TeacherId,
    Room,
    Status,
}

impl ScheduleField {
    /// Column backing this field in `schedules`.
    pub fn column(self) -> &'static str {
        match self {
            ScheduleField::Day => "day",
            ScheduleField::PeriodId => "period_id",
            ScheduleField::ClassId => "class_id",
            ScheduleField::SectionId => "section_id",
            ScheduleField::SubjectId => "subject_id",
            ScheduleField::TeacherId => "teacher_id",
            ScheduleField::Room => "room",
            ScheduleField::Status => "status",
        }
    }

    fn value_of(self, fields: &ScheduleFields) -> Value {
        let value = match self {
            ScheduleField::Day => serde_json::to_value(fields.day),
            ScheduleField::PeriodId => serde_json::to_value(fields.period_id),
            ScheduleField::ClassId => serde_json::to_value(fields.class_id),
            ScheduleField::SectionId => serde_json::to_value(fields.section_id),
            ScheduleField::SubjectId => serde_json::to_value(fields.subject_id),
            ScheduleField::TeacherId => serde_json::to_value(fields.teacher_id),
            ScheduleField::Room => serde_json::to_value(&fields.room),
            ScheduleField::Status => serde_json::to_value(fields.status),
        };
        value.unwrap_or(Value::Null)
    }
}

impl fmt::Display for ScheduleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A new value for one field of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Day(DayOfWeek),
    Period(PeriodId),
    Class(ClassId),
    Section(SectionId),
    Subject(SubjectId),
    Teacher(TeacherId),
    Room(Option<String>),
    Status(ScheduleStatus),
}

impl FieldChange {
    pub fn field(&self) -> ScheduleField {
        match self {
            FieldChange::Day(_) => ScheduleField::Day,
            FieldChange::Period(_) => ScheduleField::PeriodId,
            FieldChange::Class(_) => ScheduleField::ClassId,
            FieldChange::Section(_) => ScheduleField::SectionId,
            FieldChange::Subject(_) => ScheduleField::SubjectId,
            FieldChange::Teacher(_) => ScheduleField::TeacherId,
            FieldChange::Room(_) => ScheduleField::Room,
            FieldChange::Status(_) => ScheduleField::Status,
        }
    }

    fn write(self, fields: &mut ScheduleFields) {
        match self {
            FieldChange::Day(day) => fields.day = day,
            FieldChange::Period(id) => fields.period_id = id,
            FieldChange::Class(id) => fields.class_id = id,
            FieldChange::Section(id) => fields.section_id = id,
            FieldChange::Subject(id) => fields.subject_id = id,
            FieldChange::Teacher(id) => fields.teacher_id = id,
            FieldChange::Room(room) => fields.room = room,
            FieldChange::Status(status) => fields.status = status,
        }
    }

    fn matches(&self, fields: &ScheduleFields) -> bool {
        match self {
            FieldChange::Day(day) => fields.day == *day,
            FieldChange::Period(id) => fields.period_id == *id,
            FieldChange::Class(id) => fields.class_id == *id,
            FieldChange::Section(id) => fields.section_id == *id,
            FieldChange::Subject(id) => fields.subject_id == *id,
            FieldChange::Teacher(id) => fields.teacher_id == *id,
            FieldChange::Room(room) => fields.room == *room,
            FieldChange::Status(status) => fields.status == *status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleChangeError {
    UnknownEntry(ScheduleId),
    DuplicateEntry(ScheduleId),
    InvalidStatusTransition {
        id: ScheduleId,
        from: ScheduleStatus,
        to: ScheduleStatus,
    },
}

impl fmt::Display for ScheduleChangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleChangeError::UnknownEntry(id) => write!(f, "Schedule entry {} not found", id),
            ScheduleChangeError::DuplicateEntry(id) => {
                write!(f, "Schedule entry {} appears more than once", id)
            }
            ScheduleChangeError::InvalidStatusTransition { id, from, to } => write!(
                f,
                "Schedule entry {} cannot change status from {} to {}",
                id, from, to
            ),
        }
    }
}

impl std::error::Error for ScheduleChangeError {}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldDiff {
    pub field: ScheduleField,
    pub from: Value,
    pub to: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EntryChange {
    pub id: ScheduleId,
    pub fields: Vec<FieldDiff>,
}

#[derive(Debug, Clone)]
struct TrackedEntry {
    original: ScheduleFields,
    working: ScheduleFields,
    dirty: BTreeSet<ScheduleField>,
}

impl TrackedEntry {
    fn new(fields: ScheduleFields) -> Self {
        Self {
            original: fields.clone(),
            working: fields,
            dirty: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleChangeTracker {
    order: Vec<ScheduleId>,
    entries: HashMap<ScheduleId, TrackedEntry>,
}

impl ScheduleChangeTracker {
    pub fn from_snapshot<'a, I>(entries: I) -> Result<Self, ScheduleChangeError>
    where
        I: IntoIterator<Item = &'a ScheduleEntry>,
    {
        Self::from_fields(entries.into_iter().map(|e| (e.id, e.fields())))
    }

    pub fn from_fields<I>(entries: I) -> Result<Self, ScheduleChangeError>
    where
        I: IntoIterator<Item = (ScheduleId, ScheduleFields)>,
    {
        let mut tracker = Self::default();
        for (id, fields) in entries {
            if tracker.entries.contains_key(&id) {
                return Err(ScheduleChangeError::DuplicateEntry(id));
            }
            tracker.order.push(id);
            tracker.entries.insert(id, TrackedEntry::new(fields));
        }
        Ok(tracker)
    }

    /// Sets one field of the working copy and updates the dirty set.
    ///
    /// Status changes are checked against the original status.
    pub fn apply(&mut self, id: ScheduleId, change: FieldChange) -> Result<(), ScheduleChangeError> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(ScheduleChangeError::UnknownEntry(id))?;

        if let FieldChange::Status(to) = change {
            let from = entry.original.status;
            if !from.can_transition_to(to) {
                return Err(ScheduleChangeError::InvalidStatusTransition { id, from, to });
            }
        }

        let field = change.field();
        if change.matches(&entry.original) {
            entry.dirty.remove(&field);
        } else {
            entry.dirty.insert(field);
        }
        change.write(&mut entry.working);
        Ok(())
    }

    pub fn apply_all<I>(&mut self, id: ScheduleId, changes: I) -> Result<(), ScheduleChangeError>
    where
        I: IntoIterator<Item = FieldChange>,
    {
        for change in changes {
            self.apply(id, change)?;
        }
        Ok(())
    }

    pub fn revert(&mut self, id: ScheduleId) -> Result<(), ScheduleChangeError> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(ScheduleChangeError::UnknownEntry(id))?;
        entry.working = entry.original.clone();
        entry.dirty.clear();
        Ok(())
    }

    pub fn revert_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.working = entry.original.clone();
            entry.dirty.clear();
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.entries.values().any(|e| !e.dirty.is_empty())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn original(&self, id: ScheduleId) -> Option<&ScheduleFields> {
        self.entries.get(&id).map(|e| &e.original)
    }

    pub fn working(&self, id: ScheduleId) -> Option<&ScheduleFields> {
        self.entries.get(&id).map(|e| &e.working)
    }

    pub fn dirty_fields(&self, id: ScheduleId) -> Option<&BTreeSet<ScheduleField>> {
        self.entries.get(&id).map(|e| &e.dirty)
    }

    /// Working copies of every tracked entry, in snapshot order.
    pub fn working_entries(&self) -> impl Iterator<Item = (ScheduleId, &ScheduleFields)> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|e| (*id, &e.working)))
    }

    /// Dirty entries with their dirty field sets, in snapshot order.
    pub fn dirty_entries(
        &self,
    ) -> impl Iterator<Item = (ScheduleId, &ScheduleFields, &BTreeSet<ScheduleField>)> {
        self.order.iter().filter_map(|id| {
            self.entries
                .get(id)
                .filter(|e| !e.dirty.is_empty())
                .map(|e| (*id, &e.working, &e.dirty))
        })
    }

    pub fn changes(&self) -> Vec<EntryChange> {
        self.dirty_entries()
            .filter_map(|(id, working, dirty)| {
                let original = self.original(id)?;
                let fields = dirty
                    .iter()
                    .map(|field| FieldDiff {
                        field: *field,
                        from: field.value_of(original),
                        to: field.value_of(working),
                    })
                    .collect();
                Some(EntryChange { id, fields })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> ScheduleFields {
        ScheduleFields {
            day: DayOfWeek::Monday,
            period_id: PeriodId::from_u128(1),
            class_id: ClassId::from_u128(2),
            section_id: SectionId::from_u128(3),
            subject_id: SubjectId::from_u128(4),
            teacher_id: TeacherId::from_u128(5),
            room: Some("R1".to_string()),
            status: ScheduleStatus::Draft,
        }
    }

    fn tracker() -> (ScheduleChangeTracker, ScheduleId, ScheduleId) {
        let a = ScheduleId::from_u128(10);
        let b = ScheduleId::from_u128(11);
        let tracker =
            ScheduleChangeTracker::from_fields(vec![(a, fields()), (b, fields())]).unwrap();
        (tracker, a, b)
    }

    #[test]
    fn test_fresh_tracker_is_clean() {
        let (tracker, _, _) = tracker();
        assert!(!tracker.is_dirty());
        assert!(tracker.changes().is_empty());
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_apply_marks_field_dirty() {
        let (mut tracker, a, _) = tracker();
        tracker.apply(a, FieldChange::Day(DayOfWeek::Friday)).unwrap();

        assert!(tracker.is_dirty());
        let changes = tracker.changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].id, a);
        assert_eq!(
            changes[0].fields,
            vec![FieldDiff {
                field: ScheduleField::Day,
                from: json!("monday"),
                to: json!("friday"),
            }]
        );
        assert_eq!(tracker.working(a).unwrap().day, DayOfWeek::Friday);
    }

    #[test]
    fn test_setting_original_value_removes_field() {
        let (mut tracker, a, _) = tracker();
        tracker.apply(a, FieldChange::Day(DayOfWeek::Friday)).unwrap();
        tracker
            .apply(a, FieldChange::Room(Some("Lab".to_string())))
            .unwrap();
        tracker.apply(a, FieldChange::Day(DayOfWeek::Monday)).unwrap();

        let dirty: Vec<_> = tracker.dirty_fields(a).unwrap().iter().copied().collect();
        assert_eq!(dirty, vec![ScheduleField::Room]);

        tracker
            .apply(a, FieldChange::Room(Some("R1".to_string())))
            .unwrap();
        assert!(!tracker.is_dirty());
        assert!(tracker.changes().is_empty());
    }

    #[test]
    fn test_same_value_is_not_a_change() {
        let (mut tracker, a, _) = tracker();
        tracker
            .apply(a, FieldChange::Teacher(TeacherId::from_u128(5)))
            .unwrap();
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn test_unknown_entry() {
        let (mut tracker, _, _) = tracker();
        let missing = ScheduleId::from_u128(99);
        assert_eq!(
            tracker.apply(missing, FieldChange::Day(DayOfWeek::Sunday)),
            Err(ScheduleChangeError::UnknownEntry(missing))
        );
        assert_eq!(
            tracker.revert(missing),
            Err(ScheduleChangeError::UnknownEntry(missing))
        );
    }

    #[test]
    fn test_duplicate_snapshot_rejected() {
        let a = ScheduleId::from_u128(10);
        let result = ScheduleChangeTracker::from_fields(vec![(a, fields()), (a, fields())]);
        assert!(matches!(result, Err(ScheduleChangeError::DuplicateEntry(id)) if id == a));
    }

    #[test]
    fn test_revert_single_entry() {
        let (mut tracker, a, b) = tracker();
        tracker.apply(a, FieldChange::Room(None)).unwrap();
        tracker.apply(b, FieldChange::Room(None)).unwrap();

        tracker.revert(a).unwrap();
        assert_eq!(tracker.working(a).unwrap().room.as_deref(), Some("R1"));
        let changes = tracker.changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].id, b);
    }

    #[test]
    fn test_revert_all() {
        let (mut tracker, a, b) = tracker();
        tracker.apply(a, FieldChange::Day(DayOfWeek::Sunday)).unwrap();
        tracker
            .apply(b, FieldChange::Status(ScheduleStatus::Active))
            .unwrap();

        tracker.revert_all();
        assert!(!tracker.is_dirty());
        assert_eq!(tracker.working(a), tracker.original(a));
    }

    #[test]
    fn test_changes_follow_snapshot_order() {
        let (mut tracker, a, b) = tracker();
        tracker.apply(b, FieldChange::Day(DayOfWeek::Sunday)).unwrap();
        tracker.apply(a, FieldChange::Day(DayOfWeek::Sunday)).unwrap();
        let ids: Vec<_> = tracker.changes().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_status_cannot_return_to_draft() {
        let a = ScheduleId::from_u128(10);
        let mut active = fields();
        active.status = ScheduleStatus::Active;
        let mut tracker = ScheduleChangeTracker::from_fields(vec![(a, active)]).unwrap();

        let result = tracker.apply(a, FieldChange::Status(ScheduleStatus::Draft));
        assert!(matches!(
            result,
            Err(ScheduleChangeError::InvalidStatusTransition { .. })
        ));
        tracker
            .apply(a, FieldChange::Status(ScheduleStatus::Inactive))
            .unwrap();
        assert!(tracker.is_dirty());
    }

    #[test]
    fn test_room_cleared_reports_null() {
        let (mut tracker, a, _) = tracker();
        tracker.apply(a, FieldChange::Room(None)).unwrap();
        let diff = &tracker.changes()[0].fields[0];
        assert_eq!(diff.field, ScheduleField::Room);
        assert_eq!(diff.from, json!("R1"));
        assert_eq!(diff.to, Value::Null);
    }
}
