pub mod chat;
pub mod curriculum;
pub mod health;
pub mod sessions;
