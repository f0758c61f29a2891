//! User record persistence for the student portal.
//!
//! The backend contract is coarse: read the whole set, replace the
//! whole set. [`UserRepository`] layers lookups and locked read-modify-write
//! mutations on top of any backend.

mod backend;
mod models;
mod repository;

pub use backend::{InMemoryUserStore, JsonFileStore, UserStore};
pub use models::{Role, UserRecord};
pub use repository::UserRepository;

pub use error::StoreError;
