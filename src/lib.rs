//! Phoneme to viseme mapping and the pronunciation-practice helpers built
//! around it.

pub mod audio;
pub mod config;
pub mod pronunciation;
pub mod types;
