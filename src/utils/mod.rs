pub mod time;

pub use time::{format_local, parse_offset, parse_timestamp};
