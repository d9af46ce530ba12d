use utoipa::OpenApi;

use edudesk_core::{ErrorResponse, ListParams, PaginationMeta, PaginationParams};
use edudesk_models::buses::{Bus, CreateBusDto, PaginatedBusesResponse, UpdateBusDto};
use edudesk_models::classes::{
    Class, ClassWithStats, CreateClassDto, CreateSectionDto, CreateSectionWithClassDto,
    PaginatedClassesResponse, PaginatedSectionsResponse, Section, UpdateClassDto,
    UpdateSectionDto,
};
use edudesk_models::dashboard::{DashboardSummary, DirectoryCounts, FeeTotals};
use edudesk_models::fees::{
    CreateFeeDto, FeeBreakdown, FeeDetails, FeeItem, FeeItemInput, FeePreviewDto, FeeRecord,
    FeeStatus, FeeSummary, PaginatedFeesResponse, UpdateFeeDto,
};
use edudesk_models::payments::{
    CreatePaymentDto, PaginatedPaymentsResponse, Payment, PaymentMethod, RecordedPayment,
};
use edudesk_models::periods::{CreatePeriodDto, PaginatedPeriodsResponse, Period, UpdatePeriodDto};
use edudesk_models::schedules::{
    BulkScheduleUpdateDto, BulkScheduleUpdateResponse, ConflictKind, ConflictParty,
    CreateScheduleDto, DayOfWeek, EntryChange, FieldDiff, PaginatedSchedulesResponse,
    ProposedSchedule, ScheduleConflict, ScheduleEntry, ScheduleEntryPatch, ScheduleField,
    ScheduleFields, ScheduleStatus, ScheduleValidationReport, Timetable, TimetableDay,
    UpdateScheduleDto, UpdateScheduleStatusDto, ValidateSchedulesDto,
};
use edudesk_models::students::{
    CreateStudentDto, PaginatedStudentsResponse, Student, UpdateStudentDto,
};
use edudesk_models::subjects::{
    CreateSubjectDto, PaginatedSubjectsResponse, Subject, UpdateSubjectDto,
};
use edudesk_models::teachers::{
    CreateTeacherDto, PaginatedTeachersResponse, Teacher, UpdateTeacherDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::delete_teacher,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::classes::controller::get_class_sections,
        crate::modules::classes::controller::create_class_section,
        crate::modules::classes::controller::create_section,
        crate::modules::classes::controller::get_sections,
        crate::modules::classes::controller::get_section,
        crate::modules::classes::controller::update_section,
        crate::modules::classes::controller::delete_section,
        crate::modules::subjects::controller::create_subject,
        crate::modules::subjects::controller::get_subjects,
        crate::modules::subjects::controller::get_subject,
        crate::modules::subjects::controller::update_subject,
        crate::modules::subjects::controller::delete_subject,
        crate::modules::buses::controller::create_bus,
        crate::modules::buses::controller::get_buses,
        crate::modules::buses::controller::get_bus,
        crate::modules::buses::controller::get_bus_students,
        crate::modules::buses::controller::update_bus,
        crate::modules::buses::controller::delete_bus,
        crate::modules::periods::controller::create_period,
        crate::modules::periods::controller::get_periods,
        crate::modules::periods::controller::get_period,
        crate::modules::periods::controller::update_period,
        crate::modules::periods::controller::delete_period,
        crate::modules::schedules::controller::create_schedule,
        crate::modules::schedules::controller::get_schedules,
        crate::modules::schedules::controller::get_timetable,
        crate::modules::schedules::controller::bulk_update_schedules,
        crate::modules::schedules::controller::validate_schedules,
        crate::modules::schedules::controller::get_schedule,
        crate::modules::schedules::controller::update_schedule,
        crate::modules::schedules::controller::update_schedule_status,
        crate::modules::schedules::controller::delete_schedule,
        crate::modules::fees::controller::create_fee,
        crate::modules::fees::controller::get_fees,
        crate::modules::fees::controller::preview_fee,
        crate::modules::fees::controller::get_fee,
        crate::modules::fees::controller::update_fee,
        crate::modules::fees::controller::delete_fee,
        crate::modules::payments::controller::record_payment,
        crate::modules::payments::controller::get_payments,
        crate::modules::payments::controller::get_payment,
        crate::modules::payments::controller::delete_payment,
        crate::modules::dashboard::controller::get_summary,
    ),
    components(
        schemas(
            ErrorResponse,
            PaginationMeta,
            PaginationParams,
            ListParams,
            Student,
            CreateStudentDto,
            UpdateStudentDto,
            PaginatedStudentsResponse,
            Teacher,
            CreateTeacherDto,
            UpdateTeacherDto,
            PaginatedTeachersResponse,
            Class,
            ClassWithStats,
            CreateClassDto,
            UpdateClassDto,
            PaginatedClassesResponse,
            Section,
            CreateSectionDto,
            CreateSectionWithClassDto,
            UpdateSectionDto,
            PaginatedSectionsResponse,
            Subject,
            CreateSubjectDto,
            UpdateSubjectDto,
            PaginatedSubjectsResponse,
            Bus,
            CreateBusDto,
            UpdateBusDto,
            PaginatedBusesResponse,
            Period,
            CreatePeriodDto,
            UpdatePeriodDto,
            PaginatedPeriodsResponse,
            DayOfWeek,
            ScheduleStatus,
            ScheduleEntry,
            ScheduleFields,
            CreateScheduleDto,
            UpdateScheduleDto,
            UpdateScheduleStatusDto,
            ScheduleEntryPatch,
            BulkScheduleUpdateDto,
            BulkScheduleUpdateResponse,
            ScheduleField,
            FieldDiff,
            EntryChange,
            ValidateSchedulesDto,
            ProposedSchedule,
            ScheduleValidationReport,
            ScheduleConflict,
            ConflictKind,
            ConflictParty,
            Timetable,
            TimetableDay,
            PaginatedSchedulesResponse,
            FeeStatus,
            FeeItem,
            FeeItemInput,
            FeeRecord,
            FeeSummary,
            FeeDetails,
            FeeBreakdown,
            CreateFeeDto,
            UpdateFeeDto,
            FeePreviewDto,
            PaginatedFeesResponse,
            PaymentMethod,
            Payment,
            CreatePaymentDto,
            RecordedPayment,
            PaginatedPaymentsResponse,
            DashboardSummary,
            DirectoryCounts,
            FeeTotals,
        )
    ),
    tags(
        (name = "Students", description = "Student directory"),
        (name = "Teachers", description = "Teaching staff"),
        (name = "Classes", description = "Classes and their nested sections"),
        (name = "Sections", description = "Sections across all classes"),
        (name = "Subjects", description = "Subjects taught"),
        (name = "Buses", description = "School buses and their riders"),
        (name = "Periods", description = "Time slots of the school day"),
        (name = "Schedules", description = "Weekly timetable entries, bulk edits and conflict checks"),
        (name = "Fees", description = "Itemized fees and balance computation"),
        (name = "Payments", description = "Payments recorded against fees"),
        (name = "Dashboard", description = "Summary counters for the admin home screen")
    ),
    info(
        title = "edudesk API",
        version = "0.1.0",
        description = "School administration REST API built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;
