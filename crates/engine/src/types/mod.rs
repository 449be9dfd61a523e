//! Shared state-model types for the reconciliation engines.

mod activity;
mod deposit;
mod stage;
mod workflow;

pub use activity::{Activity, ACTIVITY_STATUS_CHANGE};
pub use deposit::{
    status, DepositMetadata, EmailProcessing, MessageSeverity, ProcessingMessage,
};
pub use stage::{CheckState, CheckSummary, Stage, StageRecord, StageStatus};
pub use workflow::{StateDef, TransitionDef, Workflow};
