//! CLI commands for the dojo.
//!
//! Each command pairs an `Options` struct with a serializable `Output`,
//! a `run` method and `format_output` honoring `--json` and `--quiet`:
//! - **Catalog commands**: init, catalog
//! - **Learner commands**: complete, dashboard, skills, history

// Catalog commands
pub mod catalog;
pub mod init;

// Learner commands
pub mod complete;
pub mod dashboard;
pub mod history;
pub mod skills;

pub use catalog::CatalogCommand;
pub use complete::CompleteCommand;
pub use dashboard::DashboardCommand;
pub use history::HistoryCommand;
pub use init::InitCommand;
pub use skills::SkillsCommand;
