//! # edudesk Models
//!
//! Domain models and DTOs for the edudesk API.
//!
//! Besides the database entities and request/response shapes, this crate
//! holds the two pieces of school-office logic that do not need a database:
//!
//! - [`fees::calculator`]: subtotal / discount / balance arithmetic
//! - [`schedules::changes`]: dirty-field tracking for timetable edits, with
//!   [`schedules::conflicts`] checking the result for double bookings
//!
//! # Modules
//!
//! - [`ids`]: typed UUID wrappers
//! - [`students`], [`teachers`], [`classes`] (with sections), [`subjects`], [`buses`]
//! - [`periods`], [`schedules`]
//! - [`fees`], [`payments`]
//! - [`dashboard`]
//!
//! # Example
//!
//! ```ignore
//! use edudesk_models::fees::FeeBreakdown;
//! use rust_decimal_macros::dec;
//!
//! let b = FeeBreakdown::compute([dec!(500), dec!(80)], dec!(30), dec!(100))?;
//! assert_eq!(b.remaining, dec!(450));
//! ```

pub mod buses;
pub mod classes;
pub mod dashboard;
pub mod fees;
pub mod ids;
pub mod payments;
pub mod periods;
pub mod schedules;
pub mod students;
pub mod subjects;
pub mod teachers;

pub use buses::{Bus, CreateBusDto, PaginatedBusesResponse, UpdateBusDto};
pub use classes::{
    Class, ClassWithStats, CreateClassDto, CreateSectionDto, CreateSectionWithClassDto,
    PaginatedClassesResponse, PaginatedSectionsResponse, Section, SectionFilterParams,
    UpdateClassDto, UpdateSectionDto,
};
pub use dashboard::{DashboardSummary, DirectoryCounts, FeeTotals};
pub use fees::{
    CreateFeeDto, FeeBreakdown, FeeDetails, FeeError, FeeFilterParams, FeeItem, FeeItemInput,
    FeePreviewDto, FeeRecord, FeeStatus, FeeSummary, PaginatedFeesResponse, UpdateFeeDto,
};
pub use payments::{
    CreatePaymentDto, PaginatedPaymentsResponse, Payment, PaymentFilterParams, PaymentMethod,
    RecordedPayment,
};
pub use periods::{CreatePeriodDto, PaginatedPeriodsResponse, Period, UpdatePeriodDto};
pub use schedules::{
    BulkScheduleUpdateDto, BulkScheduleUpdateResponse, CreateScheduleDto, DayOfWeek,
    PaginatedSchedulesResponse, ProposedSchedule, ScheduleEntry, ScheduleEntryPatch,
    ScheduleFields, ScheduleFilterParams, ScheduleStatus, ScheduleValidationReport,
    TimetableParams, UpdateScheduleDto, UpdateScheduleStatusDto, ValidateSchedulesDto,
};
pub use students::{
    CreateStudentDto, PaginatedStudentsResponse, Student, StudentFilterParams, UpdateStudentDto,
};
pub use subjects::{CreateSubjectDto, PaginatedSubjectsResponse, Subject, UpdateSubjectDto};
pub use teachers::{CreateTeacherDto, PaginatedTeachersResponse, Teacher, UpdateTeacherDto};
