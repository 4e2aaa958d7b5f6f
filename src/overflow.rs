pub mod detector;
pub mod mask;
