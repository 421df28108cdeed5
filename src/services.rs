pub mod projects;
pub mod report;
pub mod session;
pub mod test_cases;
pub mod validation;
