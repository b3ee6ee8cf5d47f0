use std::fmt;

/// Identifies a cached read: a resource name followed by its parameters,
/// e.g. `["activities", "3"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// A key with a single part.
    pub fn new(root: impl Into<String>) -> Self {
        Self(vec![root.into()])
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with(mut self, part: impl fmt::Display) -> Self {
        self.0.push(part.to_string());
        self
    }

    /// First part: the resource name.
    #[must_use]
    pub fn root(&self) -> &str {
        self.0.first().map_or("", String::as_str)
    }

    /// All parts, root first.
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// True when `prefix` names this key or one of its ancestors.
    #[must_use]
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl From<&str> for QueryKey {
    fn from(root: &str) -> Self {
        Self::new(root)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}
