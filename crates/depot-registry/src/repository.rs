//! Remote registry abstraction: URL layout and configuration.

/// Maven Central base URL.
pub const MAVEN_CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2";

/// A configured upstream registry with optional credentials.
#[derive(Debug, Clone)]
pub struct RemoteRegistry {
    pub name: String,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl RemoteRegistry {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.trim_end_matches('/').to_string(),
            username: None,
            password: None,
        }
    }

    /// Construct the default Maven Central registry.
    pub fn maven_central() -> Self {
        Self::new("maven-central", MAVEN_CENTRAL_URL)
    }

    /// Standard Maven layout path for a given coordinate.
    ///
    /// `org.example:lib:1.0.0` becomes `org/example/lib/1.0.0`.
    pub fn coordinate_path(group: &str, artifact: &str, version: &str) -> String {
        format!("{}/{}/{}", group.replace('.', "/"), artifact, version)
    }

    /// Full URL to the POM file for a coordinate.
    pub fn pom_url(&self, group: &str, artifact: &str, version: &str) -> String {
        format!(
            "{}/{}/{}-{}.pom",
            self.url,
            Self::coordinate_path(group, artifact, version),
            artifact,
            version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_path_layout() {
        assert_eq!(
            RemoteRegistry::coordinate_path("org.example.deep", "lib", "1.0.0"),
            "org/example/deep/lib/1.0.0"
        );
    }

    #[test]
    fn pom_url_layout() {
        let repo = RemoteRegistry::new("test", "https://repo.test/maven/");
        assert_eq!(
            repo.pom_url("org.example", "lib", "1.0.0"),
            "https://repo.test/maven/org/example/lib/1.0.0/lib-1.0.0.pom"
        );
    }

    #[test]
    fn central_default() {
        let central = RemoteRegistry::maven_central();
        assert_eq!(central.name, "maven-central");
        assert!(central.url.contains("repo.maven.apache.org"));
    }
}
