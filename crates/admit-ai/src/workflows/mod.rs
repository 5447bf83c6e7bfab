pub mod entry;
pub mod portfolio;
