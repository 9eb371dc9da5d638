pub mod catalog;
pub mod exporter;
pub mod formatter;
pub mod pagination;
pub mod reports;
