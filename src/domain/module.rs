/// A monorepo sub-component versioned through suffixed tags.
///
/// Tags for the module end in `-<tag_suffix>` (e.g. `v1.2.0-api`), and the
/// module is considered changed when files under any of `paths` differ from
/// its baseline tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleScope {
    pub tag_suffix: String,
    pub paths: Vec<String>,
}

impl ModuleScope {
    pub fn new(tag_suffix: impl Into<String>, paths: Vec<String>) -> Self {
        ModuleScope {
            tag_suffix: tag_suffix.into(),
            paths,
        }
    }

    /// Whether a tag's local name belongs to this module
    pub fn matches_tag(&self, tag_name: &str) -> bool {
        tag_name.ends_with(&format!("-{}", self.tag_suffix))
    }
}
