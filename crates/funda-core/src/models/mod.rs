pub mod curriculum;
pub mod grade;
pub mod message;
pub mod session;
pub mod subject;
