pub mod auth;
pub mod health;
pub mod images;
pub mod pages;
pub mod users;
