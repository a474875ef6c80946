//! Per-group M3U8 playlist output

pub mod generator;

pub use generator::PlaylistGenerator;
