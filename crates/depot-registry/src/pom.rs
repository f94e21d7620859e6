//! POM metadata parsing: dependency declarations and their exclusions.
//!
//! Depot only needs the `<dependencies>` section of a POM; packaging,
//! parents, and property interpolation are handled upstream at ingestion
//! time, so this parser is a single pass over the declared dependencies.

use depot_core::{Coordinate, DeclaredDependency};
use depot_util::errors::DepotError;
use quick_xml::events::Event;
use quick_xml::Reader;

/// A dependency declared in a POM file.
#[derive(Debug, Clone, Default)]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: Option<String>,
    pub optional: bool,
    pub exclusions: Vec<PomExclusion>,
}

/// An exclusion within a dependency declaration. The artifact may be
/// absent (group-wide exclusion); the version never appears in a POM.
#[derive(Debug, Clone, Default)]
pub struct PomExclusion {
    pub group_id: String,
    pub artifact_id: Option<String>,
}

/// Parse the `<dependencies>` section of a POM XML string.
pub fn parse_dependencies(xml: &str) -> miette::Result<Vec<PomDependency>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut deps = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut text_buf = String::new();
    let mut current_dep: Option<PomDependency> = None;
    let mut current_exclusion: Option<PomExclusion> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                path.push(tag);
                text_buf.clear();

                match path_context(&path).as_str() {
                    "project>dependencies>dependency" => {
                        current_dep = Some(PomDependency::default());
                    }
                    ctx if ctx.ends_with(">exclusion") && current_dep.is_some() => {
                        current_exclusion = Some(PomExclusion::default());
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                text_buf = e.unescape().unwrap_or_default().to_string();
            }
            Ok(Event::End(_)) => {
                let ctx = path_context(&path);

                if let Some(ref mut dep) = current_dep {
                    if let Some(ref mut excl) = current_exclusion {
                        match path.last().map(|s| s.as_str()) {
                            Some("groupId") => excl.group_id = text_buf.clone(),
                            Some("artifactId") => excl.artifact_id = Some(text_buf.clone()),
                            _ => {}
                        }
                        if ctx.ends_with(">exclusion") {
                            if let Some(excl) = current_exclusion.take() {
                                dep.exclusions.push(excl);
                            }
                        }
                    } else {
                        match path.last().map(|s| s.as_str()) {
                            Some("groupId") if ctx.ends_with(">dependency>groupId") => {
                                dep.group_id = text_buf.clone();
                            }
                            Some("artifactId") if ctx.ends_with(">dependency>artifactId") => {
                                dep.artifact_id = text_buf.clone();
                            }
                            Some("version") if ctx.ends_with(">dependency>version") => {
                                dep.version = Some(text_buf.clone());
                            }
                            Some("scope") if ctx.ends_with(">dependency>scope") => {
                                dep.scope = Some(text_buf.clone());
                            }
                            Some("optional") if ctx.ends_with(">dependency>optional") => {
                                dep.optional = text_buf.trim() == "true";
                            }
                            _ => {}
                        }
                    }

                    if ctx == "project>dependencies>dependency" {
                        if let Some(dep) = current_dep.take() {
                            deps.push(dep);
                        }
                    }
                }

                path.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DepotError::Input {
                    message: format!("malformed POM: {e}"),
                }
                .into());
            }
        }
    }

    Ok(deps)
}

/// Convert parsed POM dependencies into declarations for the resolver,
/// dropping optional dependencies and non-runtime scopes.
pub fn declared_dependencies(deps: Vec<PomDependency>) -> Vec<DeclaredDependency> {
    let mut out = Vec::new();
    for dep in deps {
        if dep.optional {
            continue;
        }
        let scope = dep.scope.as_deref().unwrap_or("compile");
        if scope == "test" || scope == "provided" || scope == "system" {
            continue;
        }
        let Some(version) = dep.version else {
            tracing::debug!("skipping unversioned dependency {}:{}", dep.group_id, dep.artifact_id);
            continue;
        };
        let exclusions = dep
            .exclusions
            .into_iter()
            .map(|e| match e.artifact_id {
                Some(artifact) => Coordinate::pattern(&e.group_id, &artifact),
                None => Coordinate::pattern(&e.group_id, "*"),
            })
            .collect();
        out.push(DeclaredDependency {
            coordinate: Coordinate::new(&dep.group_id, &dep.artifact_id, &version),
            exclusions,
        });
    }
    out
}

fn path_context(path: &[String]) -> String {
    path.join(">")
}
