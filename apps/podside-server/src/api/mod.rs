pub mod downloads;
pub mod host;
pub mod meta;
pub mod ui;
