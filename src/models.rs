pub mod credential;
pub mod date;
pub mod id;
pub mod project;
pub mod session;
pub mod test_case;
