pub mod deletion_step;
pub mod outcome;
pub mod pagination_step;
pub mod state;

pub use deletion_step::DeletionStep;
pub use outcome::StepOutcome;
pub use pagination_step::PaginationStep;
pub use state::{ErrorRecord, RunOutcome, RunSummary, WorkflowState};
