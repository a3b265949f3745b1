pub mod auth_service;
pub mod image_service;
pub mod storage;
pub mod worker;
