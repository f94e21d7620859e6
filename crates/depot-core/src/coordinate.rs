use serde::{Deserialize, Serialize};

/// Identity of one published component version.
///
/// `version` is `None` only for version-less patterns inside exclusion
/// rules (`"group:artifact"`); everywhere else a coordinate is fully
/// qualified. Equality and hashing cover all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: Option<String>,
}

impl Coordinate {
    pub fn new(group: &str, artifact: &str, version: &str) -> Self {
        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: Some(version.to_string()),
        }
    }

    /// A version-less pattern, used only inside exclusion rules.
    pub fn pattern(group: &str, artifact: &str) -> Self {
        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: None,
        }
    }

    /// Parse `"group:artifact:version"` or `"group:artifact"`.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [group, artifact, version] => Some(Self::new(group, artifact, version)),
            [group, artifact] => Some(Self::pattern(group, artifact)),
            _ => None,
        }
    }

    /// `group:artifact` identifier (without version).
    pub fn ga_key(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }

    /// `group:artifact:version` identifier, used as the owner key in
    /// exclusion maps. Version-less patterns render without a version.
    pub fn owner_key(&self) -> String {
        match self.version {
            Some(ref v) => format!("{}:{}:{}", self.group, self.artifact, v),
            None => self.ga_key(),
        }
    }

    /// Whether this coordinate names the same `(group, artifact)` pair.
    pub fn same_artifact(&self, other: &Coordinate) -> bool {
        self.group == other.group && self.artifact == other.artifact
    }

    /// Rebind the version field, e.g. when an exclusion pattern is matched
    /// against a concrete closure entry.
    pub fn with_version(&self, version: &str) -> Self {
        Self::new(&self.group, &self.artifact, version)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.version {
            Some(ref v) => write!(f, "{}:{}:{}", self.group, self.artifact, v),
            None => write!(f, "{}:{}", self.group, self.artifact),
        }
    }
}
