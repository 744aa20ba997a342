// CIS hardening lifecycle for a single host.
// The binary is a thin CLI over these components; tests drive them directly.

pub mod cli;
pub mod config;
pub mod external;
pub mod lifecycle;
pub mod telemetry;

pub use config::HardenerConfig;
pub use external::{
    AptInstaller, CommandError, CommandExecutor, CommandOutput, HardeningTool, PackageInstaller,
    ProcessCommandExecutor, ToolError, ToolOutput, UsgTool,
};
pub use lifecycle::{
    LifecycleError, LifecycleState, OperationGate, Orchestrator, OrchestratorSettings,
    ReadinessState, StatusSnapshot,
};
pub use telemetry::{generate_correlation_id, init_telemetry, lifecycle_span};
