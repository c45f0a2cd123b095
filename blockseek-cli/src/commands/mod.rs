pub mod config;
pub mod find;
pub mod pick;
