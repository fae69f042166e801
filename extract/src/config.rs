use crate::output::OutputFormat;
use std::path::PathBuf;

/// Which relation to pick and which of its way members count as boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTag {
    pub key: String,
    pub value: String,
    pub role: String,
}

impl TargetTag {
    pub fn matches<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        tags.into_iter()
            .any(|(k, v)| k == self.key && v == self.value)
    }
}

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub target: TargetTag,
    pub format: OutputFormat,
    /// Fail instead of warning when zero or several relations match.
    pub require_unique_match: bool,
}
