//! Job application review pipeline: the active queue, the approval state machine, team
//! enrollment for approved applicants, and the reviewer-facing surfaces built on them.

pub mod domain;
pub mod enrollment;
pub mod export;
pub mod query;
pub mod referral;
pub mod router;
pub mod service;
pub mod session;
pub mod store;
pub mod team;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationStatus, NewApplication, NewTeamMember, ReviewState,
    TeamMember, TeamMemberId,
};
pub use enrollment::{team_member_from, TeamEnrollment};
pub use export::{CsvExportSink, ExportError, ExportSink};
pub use query::{
    select_active, ActiveQueue, ApplicationQuery, ApplicationQueryEngine, QueryError, SortOrder,
};
pub use referral::generate_referral_code;
pub use router::pipeline_router;
pub use service::ReviewPipeline;
pub use session::{FlagState, ReviewFlag, ReviewSession};
pub use store::{
    load_seed, ApplicationPatch, ApplicationStore, InMemoryApplicationStore, InMemoryTeamStore,
    SeedError, SeedRecord, StoreError, TeamMemberUpdate, TeamStore,
};
pub use team::{NewTeamMemberRequest, TeamError, TeamService};
pub use workflow::{ApplicationWorkflow, Approval, WorkflowError};
