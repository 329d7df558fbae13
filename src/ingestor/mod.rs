//! Playlist ingestion: turning M3U text into structured entries

pub mod m3u_parser;

pub use m3u_parser::{parse_playlist, M3uParser};
