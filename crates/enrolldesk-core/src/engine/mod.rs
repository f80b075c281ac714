//! Enrollment engine.
//!
//! `Enrollment::enroll` validates one request against a snapshot and returns
//! the `MutationSet` to apply, or an `EnrollError` with nothing changed.
//! Capacity, duplicate and lookup checks all run before any mutation exists.

pub mod enroll;
pub mod error;
pub mod ident;
pub mod mutation;
pub mod policy;

pub use enroll::Enrollment;
pub use error::{EnrollError, Entity, PersistError};
pub use ident::next_student_id;
pub use mutation::{ApplicationUpdate, MutationSet, StudentUpsert};
pub use policy::{EnrollmentPolicy, DEFAULT_PROGRAM_CODE, DEFAULT_SECTION_CAPACITY};
