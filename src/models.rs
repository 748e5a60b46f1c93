pub mod auth;
pub mod company;
pub mod document;
pub mod link;
pub mod person;
