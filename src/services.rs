pub mod association_service;
pub mod auth;
pub mod company_service;
pub mod credentials;
pub mod document_store;
pub mod person_service;
