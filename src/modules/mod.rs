pub mod admin;
pub mod auth;
pub mod language;
pub mod pages;
pub mod translations;
pub mod users;

pub use self::auth::model::LoginRequest;
pub use self::users::model::User;
