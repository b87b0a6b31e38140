pub mod actor;
pub mod config;
pub mod eligibility;
pub mod hierarchy;
pub mod proposal;
pub mod query;
pub mod verification;

pub use actor::{
    ActorContext, ActorIdentity, Capability, EligibilitySource, InstitutionConfig, Role,
    VerifierEligibility, VerifierProfile,
};
pub use config::{
    ActorConfig, BackendConfig, BackendKind, Config, DatabaseConfig, DocumentsConfig,
    LoggingConfig,
};
pub use eligibility::{EligibilityOutcome, EligibilityReport, MissingField, SetupArea};
pub use hierarchy::{GroupClassification, RegionGroup, Rollup, StatusStatistics, VillageGroup};
pub use proposal::{
    ActingInstitution, ActivityItem, ActivityKind, Proposal, ProposalListing, ProposalStatus,
    RegionRef, StatusBucket,
};
pub use query::{ActivityKindFilter, ProposalQuery, StatusFilter};
pub use verification::{
    DecisionAction, DecisionRequest, EventActor, PendingAction, VerificationAction,
    VerificationEvent,
};
