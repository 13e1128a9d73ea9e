//! Entities module - rows persisted in the database
//!
//! Each entity maps one table.

pub mod activity;
pub mod enums;
pub mod team;
pub mod team_request;
pub mod user;

pub use activity::Activity;
pub use enums::{RequestState, Role};
pub use team::Team;
pub use team_request::TeamRequest;
pub use user::User;
