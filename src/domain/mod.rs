//! Domain logic - pure value types and rules independent of git operations

pub mod branch;
pub mod module;
pub mod tag;
pub mod version;

pub use branch::{default_beta_prefixes, BranchKind};
pub use module::ModuleScope;
pub use tag::{has_module_suffix, local_name, parse_tag_name};
pub use version::{BumpLevel, SemVer};
