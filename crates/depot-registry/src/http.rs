//! HTTP access to remote registries: POM fetch, checksum sidecars.

use std::collections::BTreeSet;
use std::time::Duration;

use depot_core::DeclaredDependency;
use depot_util::errors::DepotError;
use depot_util::DepotResult;
use reqwest::blocking::Client;

use crate::checksum::{self, Algo};
use crate::pom;
use crate::repository::RemoteRegistry;
use crate::ArtifactRepository;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Build a shared blocking client for registry access.
pub fn build_client() -> miette::Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent("depot/0.3")
        .build()
        .map_err(|e| {
            DepotError::Generic {
                message: format!("failed to create HTTP client: {e}"),
            }
            .into()
        })
}

/// Artifact repository over one or more remote registries, first hit wins.
pub struct HttpRepository {
    client: Client,
    registries: Vec<RemoteRegistry>,
}

impl HttpRepository {
    pub fn new(client: Client, registries: Vec<RemoteRegistry>) -> Self {
        Self { client, registries }
    }

    /// Fetch a text resource. `Ok(None)` for 404, error for anything else
    /// that is not a success.
    fn fetch_text(&self, registry: &RemoteRegistry, url: &str) -> DepotResult<Option<String>> {
        let mut req = self.client.get(url);
        if let (Some(user), Some(pass)) = (&registry.username, &registry.password) {
            req = req.basic_auth(user, Some(pass));
        }
        let resp = req.send().map_err(|e| DepotError::RepositoryAccess {
            coordinate: url.to_string(),
            message: e.to_string(),
        })?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DepotError::RepositoryAccess {
                coordinate: url.to_string(),
                message: format!("HTTP {status}"),
            }
            .into());
        }
        let body = resp.text().map_err(|e| DepotError::RepositoryAccess {
            coordinate: url.to_string(),
            message: format!("reading response: {e}"),
        })?;
        Ok(Some(body))
    }

    /// Verify a fetched POM against its checksum sidecars.
    ///
    /// Tries SHA-256 first, then SHA-1. A missing sidecar is logged, not
    /// an error.
    fn verify(&self, registry: &RemoteRegistry, url: &str, body: &str) -> DepotResult<()> {
        for algo in [Algo::Sha256, Algo::Sha1] {
            let sidecar_url = format!("{url}{}", algo.suffix());
            if let Some(sidecar) = self.fetch_text(registry, &sidecar_url)? {
                return checksum::check(body.as_bytes(), &sidecar, algo, url);
            }
        }
        tracing::warn!("no checksum sidecar found for {url}");
        Ok(())
    }
}

impl ArtifactRepository for HttpRepository {
    fn find_dependencies(
        &self,
        group: &str,
        artifact: &str,
        version: &str,
    ) -> DepotResult<BTreeSet<DeclaredDependency>> {
        for registry in &self.registries {
            let url = registry.pom_url(group, artifact, version);
            let Some(body) = self.fetch_text(registry, &url)? else {
                tracing::debug!("{} not found in {}", url, registry.name);
                continue;
            };
            self.verify(registry, &url, &body)?;
            let deps = pom::parse_dependencies(&body)?;
            return Ok(pom::declared_dependencies(deps).into_iter().collect());
        }
        Err(DepotError::MissingCoordinate {
            coordinate: format!("{group}:{artifact}:{version}"),
        }
        .into())
    }
}
