pub mod action_locks;
pub mod audit_trail;
pub mod capability_resolver;
pub mod console;
pub mod document_linker;
pub mod eligibility_gate;
pub mod filter_engine;
pub mod hierarchy_aggregator;
pub mod state_machine;
pub mod verification_service;

pub use action_locks::{ActionGuard, ActionLocks};
pub use audit_trail::AuditTrailRecorder;
pub use capability_resolver::CapabilityResolver;
pub use console::{ConsoleSnapshot, ConsoleView, VerificationConsole};
pub use document_linker::DocumentLinker;
pub use eligibility_gate::EligibilityGate;
pub use filter_engine::FilterEngine;
pub use hierarchy_aggregator::HierarchyAggregator;
pub use state_machine::{Transition, VerificationStateMachine};
pub use verification_service::{DecisionOutcome, VerificationService};
