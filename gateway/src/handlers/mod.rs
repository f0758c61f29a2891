//! HTTP handlers, grouped by portal area.

pub mod admin;
pub mod login;
pub mod password;
pub mod student;
