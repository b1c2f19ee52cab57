pub mod channel;
pub mod m3u;
pub mod pointer;
pub mod sanitize;

pub use channel::{Channel, CompactChannel, CompactPlaylist, Playlist};
pub use pointer::PointerRecord;
