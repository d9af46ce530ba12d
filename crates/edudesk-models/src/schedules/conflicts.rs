//! Double-booking checks for schedule entries.
//!
//! Two occupying entries conflict when they share day + period and either
//! the same class section (slot taken) or the same teacher (teacher
//! double-booked). Inactive entries never conflict.

use std::collections::HashSet;

use serde::Serialize;
use utoipa::ToSchema;

use super::{DayOfWeek, ScheduleEntry, ScheduleFields, ScheduleStatus};
use crate::ids::{ClassId, PeriodId, ScheduleId, SectionId, TeacherId};

/// The parts of an entry that decide whether it collides with another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub id: Option<ScheduleId>,
    pub day: DayOfWeek,
    pub period_id: PeriodId,
    pub class_id: ClassId,
    pub section_id: SectionId,
    pub teacher_id: TeacherId,
    pub status: ScheduleStatus,
}

impl ScheduleSlot {
    pub fn from_fields(id: Option<ScheduleId>, fields: &ScheduleFields) -> Self {
        Self {
            id,
            day: fields.day,
            period_id: fields.period_id,
            class_id: fields.class_id,
            section_id: fields.section_id,
            teacher_id: fields.teacher_id,
            status: fields.status,
        }
    }

    fn same_time(&self, other: &ScheduleSlot) -> bool {
        self.day == other.day && self.period_id == other.period_id
    }

    fn kind_against(&self, other: &ScheduleSlot) -> Option<ConflictKind> {
        if !self.same_time(other) {
            return None;
        }
        if self.class_id == other.class_id && self.section_id == other.section_id {
            Some(ConflictKind::SlotTaken)
        } else if self.teacher_id == other.teacher_id {
            Some(ConflictKind::TeacherDoubleBooked)
        } else {
            None
        }
    }
}

impl From<&ScheduleEntry> for ScheduleSlot {
    fn from(entry: &ScheduleEntry) -> Self {
        Self::from_fields(Some(entry.id), &entry.fields())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    SlotTaken,
    TeacherDoubleBooked,
}

/// The entry a candidate collides with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ConflictParty {
    /// A stored entry that is not part of the submission
    Stored { id: ScheduleId },
    /// Another entry of the same submission, by position
    Candidate { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ScheduleConflict {
    pub kind: ConflictKind,
    /// Position of the offending entry in the submission
    pub candidate: usize,
    pub candidate_id: Option<ScheduleId>,
    pub other: ConflictParty,
    pub day: DayOfWeek,
    pub period_id: PeriodId,
    pub message: String,
}

impl ScheduleConflict {
    fn new(kind: ConflictKind, index: usize, slot: &ScheduleSlot, other: ConflictParty) -> Self {
        let message = match kind {
            ConflictKind::SlotTaken => format!(
                "Section {} already has an entry on {} in period {}",
                slot.section_id, slot.day, slot.period_id
            ),
            ConflictKind::TeacherDoubleBooked => format!(
                "Teacher {} is already booked on {} in period {}",
                slot.teacher_id, slot.day, slot.period_id
            ),
        };
        Self {
            kind,
            candidate: index,
            candidate_id: slot.id,
            other,
            day: slot.day,
            period_id: slot.period_id,
            message,
        }
    }
}

/// Checks candidates against each other and against stored entries.
///
/// A stored entry whose id matches a candidate is replaced by that candidate.
/// Each colliding pair of candidates is reported once, on the earlier one.
pub fn detect_conflicts(
    candidates: &[ScheduleSlot],
    existing: &[ScheduleSlot],
) -> Vec<ScheduleConflict> {
    let replaced: HashSet<ScheduleId> = candidates.iter().filter_map(|c| c.id).collect();
    let stored: Vec<&ScheduleSlot> = existing
        .iter()
        .filter(|s| s.status.occupies_slot())
        .filter(|s| s.id.is_none_or(|id| !replaced.contains(&id)))
        .collect();

    let mut conflicts = Vec::new();
    for (index, candidate) in candidates.iter().enumerate() {
        if !candidate.status.occupies_slot() {
            continue;
        }

        for (other_index, other) in candidates.iter().enumerate().skip(index + 1) {
            if !other.status.occupies_slot() {
                continue;
            }
            if let Some(kind) = candidate.kind_against(other) {
                conflicts.push(ScheduleConflict::new(
                    kind,
                    index,
                    candidate,
                    ConflictParty::Candidate { index: other_index },
                ));
            }
        }

        for other in &stored {
            let Some(other_id) = other.id else { continue };
            if let Some(kind) = candidate.kind_against(other) {
                conflicts.push(ScheduleConflict::new(
                    kind,
                    index,
                    candidate,
                    ConflictParty::Stored { id: other_id },
                ));
            }
        }
    }
    conflicts
}

/// Joins conflict messages into one line for error responses.
pub fn describe_conflicts(conflicts: &[ScheduleConflict]) -> String {
    let messages: Vec<&str> = conflicts.iter().map(|c| c.message.as_str()).collect();
    format!("Schedule conflicts: {}", messages.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: u128, day: DayOfWeek, period: u128, section: u128, teacher: u128) -> ScheduleSlot {
        ScheduleSlot {
            id: Some(ScheduleId::from_u128(id)),
            day,
            period_id: PeriodId::from_u128(period),
            class_id: ClassId::from_u128(1),
            section_id: SectionId::from_u128(section),
            teacher_id: TeacherId::from_u128(teacher),
            status: ScheduleStatus::Active,
        }
    }

    #[test]
    fn test_no_conflicts_for_distinct_slots() {
        let candidates = vec![
            slot(1, DayOfWeek::Monday, 1, 1, 1),
            slot(2, DayOfWeek::Monday, 2, 1, 1),
            slot(3, DayOfWeek::Tuesday, 1, 1, 1),
        ];
        assert!(detect_conflicts(&candidates, &[]).is_empty());
    }

    #[test]
    fn test_slot_taken_between_candidates() {
        let candidates = vec![
            slot(1, DayOfWeek::Monday, 1, 1, 1),
            slot(2, DayOfWeek::Monday, 1, 1, 2),
        ];
        let conflicts = detect_conflicts(&candidates, &[]);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::SlotTaken);
        assert_eq!(conflicts[0].candidate, 0);
        assert_eq!(conflicts[0].other, ConflictParty::Candidate { index: 1 });
    }

    #[test]
    fn test_teacher_double_booked_against_stored() {
        let candidates = vec![slot(1, DayOfWeek::Monday, 1, 1, 7)];
        let existing = vec![slot(9, DayOfWeek::Monday, 1, 2, 7)];
        let conflicts = detect_conflicts(&candidates, &existing);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::TeacherDoubleBooked);
        assert_eq!(
            conflicts[0].other,
            ConflictParty::Stored {
                id: ScheduleId::from_u128(9)
            }
        );
    }

    #[test]
    fn test_inactive_entries_never_conflict() {
        let mut inactive = slot(2, DayOfWeek::Monday, 1, 1, 1);
        inactive.status = ScheduleStatus::Inactive;

        let candidates = vec![slot(1, DayOfWeek::Monday, 1, 1, 1), inactive];
        assert!(detect_conflicts(&candidates, &[inactive]).is_empty());
        assert!(detect_conflicts(&[inactive], &[slot(3, DayOfWeek::Monday, 1, 1, 1)]).is_empty());
    }

    #[test]
    fn test_candidate_replaces_stored_row_with_same_id() {
        // Moving entry 1 away from Monday frees its old slot.
        let stored = vec![
            slot(1, DayOfWeek::Monday, 1, 1, 1),
            slot(2, DayOfWeek::Tuesday, 1, 1, 1),
        ];
        let candidates = vec![
            slot(1, DayOfWeek::Wednesday, 1, 1, 1),
            slot(3, DayOfWeek::Monday, 1, 1, 1),
        ];
        assert!(detect_conflicts(&candidates, &stored).is_empty());

        let moved_onto_tuesday = vec![slot(1, DayOfWeek::Tuesday, 1, 1, 1)];
        let conflicts = detect_conflicts(&moved_onto_tuesday, &stored);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::SlotTaken);
    }

    #[test]
    fn test_new_candidate_without_id() {
        let mut fresh = slot(0, DayOfWeek::Friday, 3, 1, 4);
        fresh.id = None;
        let existing = vec![slot(5, DayOfWeek::Friday, 3, 1, 8)];
        let conflicts = detect_conflicts(&[fresh], &existing);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].candidate_id, None);
    }

    #[test]
    fn test_describe_conflicts() {
        let candidates = vec![
            slot(1, DayOfWeek::Monday, 1, 1, 1),
            slot(2, DayOfWeek::Monday, 1, 2, 1),
        ];
        let message = describe_conflicts(&detect_conflicts(&candidates, &[]));
        assert!(message.starts_with("Schedule conflicts: Teacher"));
    }
}
