pub mod clock;
pub mod error;
pub mod notes_formatter;
pub mod raw;
