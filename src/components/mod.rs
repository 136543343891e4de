pub mod footer;
pub mod help_overlay;
pub mod prompt;
pub mod table;
