//! Repositories module - database access, one repository per table
//!
//! Queries use runtime-checked `sqlx::query_as` with `FromRow` entities, so the
//! crate builds without a live database. Statements that touch several tables
//! at once (joining, leaving or switching teams) live in `membership` and run
//! inside a single transaction.

// ************************* NOTE ON LOCKING ************************* //

/*
   Transactions in `membership` lock rows with SELECT ... FOR UPDATE in one
   order: team rows (ascending id when two teams are involved), then user
   rows, then team_requests rows. Anything needed to pick the teams is read
   before the transaction and checked again once the user row is locked.
   Keep this order in new statements, or MySQL will start reporting
   deadlocks under concurrent edits. Deadlocks and lock wait timeouts that
   still happen surface as 503.
*/

pub mod activity;
pub mod membership;
pub mod team;
pub mod team_request;
pub mod traits;
pub mod user;

pub use traits::{Create, Delete, Read, ReadMany, Update};

pub use activity::ActivityRepository;
pub use membership::{MembershipConflict, MembershipRepository};
pub use team::{TeamRepository, TeamWithMembers};
pub use team_request::TeamRequestRepository;
pub use user::UserRepository;
