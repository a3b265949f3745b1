pub mod auth;
pub mod tags;
pub mod validation;
