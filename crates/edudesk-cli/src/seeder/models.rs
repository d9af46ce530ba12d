//! Seed records and seeding configuration.

use chrono::NaiveDate;
use edudesk_models::ids::{BusId, ClassId, SectionId};

/// Marks codes, admission numbers and bus numbers created by the seeder.
pub const SEED_PREFIX: &str = "SEED-";

/// Seeded teachers all use this mail domain.
pub const SEED_EMAIL_DOMAIN: &str = "@example.com";

/// Seeded classes carry this description.
pub const SEED_CLASS_DESCRIPTION: &str = "Seeded demo class";

pub struct TeacherSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
}

pub struct StudentSeed {
    pub first_name: String,
    pub last_name: String,
    pub admission_number: String,
    pub gender: &'static str,
    pub date_of_birth: Option<NaiveDate>,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub class_id: ClassId,
    pub section_id: SectionId,
    pub bus_id: Option<BusId>,
}

/// A seeded section together with its class.
#[derive(Debug, Clone, Copy)]
pub struct SeededSection {
    pub class_id: ClassId,
    pub section_id: SectionId,
}

/// How much demo data `seed_all` creates.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub classes: usize,
    pub sections_per_class: usize,
    pub students_per_section: usize,
    pub teachers: usize,
    pub buses: usize,
    pub periods: usize,
    pub with_schedules: bool,
    pub with_fees: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            classes: 6,
            sections_per_class: 2,
            students_per_section: 20,
            teachers: 15,
            buses: 4,
            periods: 6,
            with_schedules: true,
            with_fees: true,
        }
    }
}

impl SeedConfig {
    pub fn with_classes(mut self, classes: usize, sections_per_class: usize) -> Self {
        self.classes = classes;
        self.sections_per_class = sections_per_class;
        self
    }

    pub fn with_students_per_section(mut self, students: usize) -> Self {
        self.students_per_section = students;
        self
    }

    pub fn with_teachers(mut self, teachers: usize) -> Self {
        self.teachers = teachers;
        self
    }

    pub fn with_buses(mut self, buses: usize) -> Self {
        self.buses = buses;
        self
    }

    pub fn with_periods(mut self, periods: usize) -> Self {
        self.periods = periods;
        self
    }

    pub fn without_schedules(mut self) -> Self {
        self.with_schedules = false;
        self
    }

    pub fn without_fees(mut self) -> Self {
        self.with_fees = false;
        self
    }

    pub fn total_sections(&self) -> usize {
        self.classes * self.sections_per_class
    }

    pub fn total_students(&self) -> usize {
        self.total_sections() * self.students_per_section
    }
}
