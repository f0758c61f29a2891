//! Student Service
//!
//! This crate provides student record management on top of the user store:
//! the admin dashboard, adding, editing and deleting students, listing by
//! course and the student's own profile.

pub mod models;
pub mod service;

pub use models::{Dashboard, NewAdmin, NewStudent, StudentProfile, StudentUpdate, COURSES};
pub use service::{ServiceError, StudentService};
