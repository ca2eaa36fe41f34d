//! Run configuration.
//!
//! The process environment is captured once into an [`Environment`] snapshot
//! at startup; every component reads from that snapshot instead of touching
//! `std::env` ambiently. Pipeline inputs resolve in order: CLI flag, then the
//! `INPUT_<NAME>` variable the workflow runner sets, then nothing. A missing
//! required value ends the run immediately.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::cli::commands::PublishArgs;
use crate::error::{Error, Result};
use crate::token::TokenSource;

/// Workflow input names, as declared by the pipeline definition.
pub const INPUT_ROLE: &str = "awsRoleToAssume";
pub const INPUT_REGION: &str = "awsRegion";
pub const INPUT_ARTIFACT_BUCKET: &str = "artifactBucket";
pub const INPUT_BUILD_BUCKET: &str = "buildBucket";
pub const INPUT_ARTIFACT_DIRECTORY: &str = "artifactDirectory";
pub const INPUT_PROJECT_NAME: &str = "projectName";

/// Immutable snapshot of the process environment.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the current process environment. Called once, in `main`.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Look up a variable. Empty values count as absent, matching how the
    /// workflow runner represents unset inputs.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Look up a variable that the run cannot proceed without.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| Error::MissingConfiguration(name.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Everything one publication run needs, resolved up front.
#[derive(Debug)]
pub struct RunConfig {
    pub token: TokenSource,
    pub role_arn: String,
    pub region: String,
    pub artifact_bucket: String,
    pub build_bucket: String,
    pub artifact_directory: PathBuf,
    pub project_name: Option<String>,
}

impl RunConfig {
    /// Resolve the full configuration or fail on the first absent key.
    pub fn resolve(args: &PublishArgs, env: &Environment) -> Result<Self> {
        Ok(Self {
            token: TokenSource::from_environment(env)?,
            role_arn: require_input(env, args.role_to_assume.as_deref(), INPUT_ROLE)?,
            region: require_input(env, args.region.as_deref(), INPUT_REGION)?,
            artifact_bucket: require_input(
                env,
                args.artifact_bucket.as_deref(),
                INPUT_ARTIFACT_BUCKET,
            )?,
            build_bucket: require_input(env, args.build_bucket.as_deref(), INPUT_BUILD_BUCKET)?,
            artifact_directory: PathBuf::from(require_input(
                env,
                args.artifact_directory.as_deref(),
                INPUT_ARTIFACT_DIRECTORY,
            )?),
            project_name: resolve_input(env, args.project_name.as_deref(), INPUT_PROJECT_NAME),
        })
    }
}

/// Resolve a pipeline input: CLI flag first, then the runner-provided
/// `INPUT_<NAME>` variable.
pub fn resolve_input(env: &Environment, flag: Option<&str>, name: &str) -> Option<String> {
    flag.filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| env.get(&input_var(name)).map(str::to_string))
}

/// Like [`resolve_input`], but absence is a configuration error naming the
/// input.
pub fn require_input(env: &Environment, flag: Option<&str>, name: &str) -> Result<String> {
    resolve_input(env, flag, name).ok_or_else(|| Error::MissingConfiguration(name.to_string()))
}

fn input_var(name: &str) -> String {
    format!("INPUT_{}", name.to_uppercase())
}
