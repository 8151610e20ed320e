//! Row types mapping table shapes onto the domain types in
//! `placedrive-core`.

pub mod drive;
pub mod student;
