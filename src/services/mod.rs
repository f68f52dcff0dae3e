pub mod address;
pub mod report_service;
pub mod validation;
