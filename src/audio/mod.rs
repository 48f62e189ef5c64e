pub mod silence;
pub mod wav;
