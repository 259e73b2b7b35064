pub mod entity;
pub mod user_store;
