pub mod discover;
pub mod naming;
