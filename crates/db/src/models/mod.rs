pub mod petition;
pub mod report;
pub mod user;
