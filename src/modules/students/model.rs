//! Student data models and DTOs, re-exported from `edudesk-models`.

pub use edudesk_models::students::*;
