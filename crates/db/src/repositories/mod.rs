//! Store trait implementations backed by PostgreSQL.

pub mod drive_store;
pub mod student_directory;

pub use drive_store::PgDriveStore;
pub use student_directory::PgStudentDirectory;
