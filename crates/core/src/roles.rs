//! Well-known role name constants.
//!
//! These must match the CHECK constraint in `20260801000001_create_users_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CITIZEN: &str = "citizen";
