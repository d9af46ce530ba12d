//! # edudesk CLI
//!
//! Demo data seeding for edudesk development and testing.
//!
//! This library crate provides the seeding functionality used by the CLI binary.
//!
//! ## Usage
//!
//! ```ignore
//! use edudesk_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::default().with_students_per_section(20);
//! seed_all(&pool, config).await?;
//! ```

pub mod seeder;
