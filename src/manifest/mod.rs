//! Build manifest assembly.
//!
//! Downstream deployment tooling discovers a build through its `build.json`
//! record: a flat string map naming the project, the monotonic build number,
//! the commit and the time the build started. The record is assembled purely
//! from the captured environment; absence of any upstream value is a
//! configuration error, never a manifest with a hole in it.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Environment;
use crate::error::{Error, Result};

/// Fixed object name the manifest is published under.
pub const MANIFEST_OBJECT_NAME: &str = "build.json";

/// Description of one CI build, published alongside its artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildManifest {
    pub project_name: String,
    pub build_number: String,
    pub start_time: String,
    #[serde(rename = "vcsURL")]
    pub vcs_url: String,
    pub branch: String,
    pub revision: String,
}

/// Assemble the manifest for this run.
///
/// The project name is the explicit override when non-empty, otherwise the
/// repository segment of the `owner/repo` identifier. The start time is the
/// current UTC wall clock in ISO-8601.
pub fn build(env: &Environment, override_name: Option<&str>) -> Result<BuildManifest> {
    let repository = env.require("GITHUB_REPOSITORY")?;
    let repo_name = repository_name(repository)?;

    let project_name = match override_name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => repo_name.to_string(),
    };

    Ok(BuildManifest {
        project_name,
        build_number: env.require("GITHUB_RUN_NUMBER")?.to_string(),
        start_time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        // The server URL is joined with the repository name alone, not the
        // owner/repo pair.
        vcs_url: format!("{}/{repo_name}", env.require("GITHUB_SERVER_URL")?),
        branch: env.require("GITHUB_REF")?.to_string(),
        revision: env.require("GITHUB_SHA")?.to_string(),
    })
}

/// Second segment of an `owner/repo` identifier.
fn repository_name(repository: &str) -> Result<&str> {
    repository
        .split('/')
        .nth(1)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::InvalidRepositoryIdentifier(repository.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::github_environment;

    #[test]
    fn manifest_is_built_from_the_environment() -> Result<()> {
        let manifest = build(&github_environment(), None)?;

        assert_eq!(manifest.project_name, "my-app");
        assert_eq!(manifest.build_number, "42");
        assert_eq!(manifest.branch, "refs/heads/main");
        assert_eq!(manifest.revision, "abc123");
        assert_eq!(manifest.vcs_url, "https://github.com/my-app");

        Ok(())
    }

    #[test]
    fn override_replaces_the_repository_name() -> Result<()> {
        let manifest = build(&github_environment(), Some("frontend"))?;
        assert_eq!(manifest.project_name, "frontend");

        // An empty override falls back to the repository name.
        let manifest = build(&github_environment(), Some(""))?;
        assert_eq!(manifest.project_name, "my-app");

        Ok(())
    }

    #[test]
    fn repository_without_a_slash_is_rejected() {
        let env = Environment::from_iter([
            ("GITHUB_REPOSITORY", "noslash"),
            ("GITHUB_RUN_NUMBER", "42"),
            ("GITHUB_REF", "refs/heads/main"),
            ("GITHUB_SHA", "abc123"),
            ("GITHUB_SERVER_URL", "https://github.com"),
        ]);

        let error = build(&env, None).unwrap_err();
        assert!(matches!(error, Error::InvalidRepositoryIdentifier(repo) if repo == "noslash"));
    }

    #[test]
    fn start_time_is_iso_8601_utc() -> Result<()> {
        let manifest = build(&github_environment(), None)?;

        assert!(manifest.start_time.ends_with('Z'));
        assert!(
            chrono::DateTime::parse_from_rfc3339(&manifest.start_time).is_ok(),
            "not RFC 3339: {}",
            manifest.start_time
        );

        Ok(())
    }

    #[test]
    fn serialized_manifest_has_the_stable_key_set() -> Result<()> {
        let manifest = build(&github_environment(), None)?;
        let value = serde_json::to_value(&manifest).map_err(Error::Json)?;

        let mut keys: Vec<String> = value
            .as_object()
            .expect("manifest serializes to an object")
            .keys()
            .cloned()
            .collect();
        keys.sort_unstable();

        let mut expected = [
            "branch",
            "buildNumber",
            "projectName",
            "revision",
            "startTime",
            "vcsURL",
        ];
        expected.sort_unstable();
        assert_eq!(keys, expected);

        Ok(())
    }
}
