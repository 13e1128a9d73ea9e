//! DTOs module - Data Transfer Objects
//!
//! JSON shapes exchanged with clients, kept apart from the persisted entities.
//! Field names are camelCase on the wire.

pub mod activity;
pub mod query;
pub mod team;
pub mod team_request;
pub mod user;

pub use activity::{ActivityDTO, CreateActivityDTO, UpdateActivityDTO};
pub use query::{Page, PageQuery};
pub use team::{
    CreateTeamDTO, TeamDTO, TeamDetailsDTO, TeamListItemDTO, TeamPageDTO, TeamSummaryDTO,
    UpdateTeamDTO,
};
pub use team_request::{
    CreateTeamRequestDTO, InviteMemberDTO, PendingTeamRequestDTO, SentTeamRequestDTO,
    TeamRequestDTO,
};
pub use user::{
    CreateUserDTO, UpdateUserDTO, UserDTO, UserPageDTO, UserUpdatedDTO, UserWithTeamDTO,
};
