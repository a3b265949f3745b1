pub mod prelude;

pub mod images;
pub mod sessions;
pub mod users;
