pub mod assets;
pub mod auth;
pub mod catalog;
pub mod permissions;
pub mod roles;
pub mod services_catalog;
pub mod system;
pub mod users;
