//! Typed identifiers for every table the service owns.
//!
//! All of them are UUIDs on the wire and in Postgres. Wrapping each one in
//! its own type means a bus id handed to a query that expects a class id is
//! a type error rather than a silent empty result.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;
use uuid::Uuid;

/// Declares one identifier type per name.
///
/// Serde and sqlx see straight through the wrapper, so JSON carries the bare
/// UUID string and columns stay `UUID` (arrays included, for `= ANY($1)`).
/// The OpenAPI schema is a `uuid`-formatted string.
macro_rules! entity_ids {
    ($($(#[$doc:meta])* $name:ident;)+) => {$(
        $(#[$doc])*
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize, sqlx::Type, ToSchema,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        #[schema(value_type = String, format = "uuid")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Fresh random (v4) id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Fixed id, handy for fixtures.
            pub const fn from_u128(value: u128) -> Self {
                Self(Uuid::from_u128(value))
            }

            pub const fn nil() -> Self {
                Self(Uuid::nil())
            }

            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }

            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&format_args!("{}", self.0)).finish()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    )+};
}

entity_ids! {
    /// A student on the roll.
    StudentId;
    /// A member of teaching staff.
    TeacherId;
    /// A grade, e.g. "Grade 5".
    ClassId;
    /// A section belonging to one class.
    SectionId;
    SubjectId;
    /// A school bus route.
    BusId;
    /// A slot in the daily bell schedule.
    PeriodId;
    /// One timetable entry.
    ScheduleId;
    /// A fee bill issued to a student.
    FeeId;
    FeeItemId;
    PaymentId;
}
