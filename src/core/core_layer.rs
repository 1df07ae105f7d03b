// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "datasource/datasource_service.rs"]
pub mod datasource;

#[path = "merge/merge_service.rs"]
pub mod merge;

#[path = "batch/batch_runner.rs"]
pub mod batch;
