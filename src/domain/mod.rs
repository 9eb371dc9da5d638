pub mod course;
pub mod document;
pub mod exam;
pub mod report;
