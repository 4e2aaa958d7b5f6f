pub mod blend;
pub mod paper;
