pub mod iso8601;
pub mod time;
