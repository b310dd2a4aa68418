pub mod admin;
pub mod auth;
pub mod petitions;
pub mod reports;
