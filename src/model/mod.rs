pub mod levels;
pub mod sample;
pub mod signal;
