//! State module for tracking batch progress
//!
//! # Components
//!
//! - `RunStatus`: Lifecycle of one batch run (pending, running, completed, failed)

mod run_status;

pub use run_status::RunStatus;
