// Hardening lifecycle - testable orchestrator
//
// The orchestrator sequences install, pre-hardening script, hardening and
// audit over injected collaborators (state store, hardening engine, package
// manager, command executor) so every step can be driven from tests.

pub mod errors;
pub mod gate;
pub mod orchestrator;
pub mod prescript;
pub mod readiness;
pub mod score;
pub mod store;
pub mod tailoring;
pub mod types;

#[cfg(test)]
pub mod mocks;


pub use errors::LifecycleError;
pub use gate::OperationGate;
pub use orchestrator::{Orchestrator, OrchestratorSettings};
pub use readiness::{ReadinessState, StatusSnapshot};
pub use store::{InMemoryStateStore, JsonFileStateStore, StateStore, StoreError};
pub use types::{
    AuditReport, Failure, FailureStep, HardenReport, InstallReport, LifecycleState, ResultFormat,
    ResultPaths,
};
