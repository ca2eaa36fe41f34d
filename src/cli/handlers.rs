use std::path::PathBuf;
use std::sync::Arc;

use super::commands::{ExportArgs, PublishArgs};
use crate::artifacts::ArtifactFileSet;
use crate::config::{self, Environment, RunConfig};
use crate::credentials::WebIdentityProvider;
use crate::env_export;
use crate::error::Result;
use crate::manifest;
use crate::publish::{Publisher, S3Store};
use crate::token::TokenSource;

/// Run the full publication flow: resolve configuration, describe the build,
/// collect the artifacts, exchange the identity token for role credentials,
/// and upload.
pub async fn handle_publish(args: PublishArgs, env: &Environment) -> Result<()> {
    let config = RunConfig::resolve(&args, env)?;
    log::debug!("resolved run configuration: {config:?}");

    let manifest = manifest::build(env, config.project_name.as_deref())?;
    log::debug!("build manifest: {manifest:?}");

    // Collected before any network call, so a missing descriptor or an
    // unreadable directory fails the run cheaply.
    let artifacts = ArtifactFileSet::collect(&config.artifact_directory)?;

    let token = config.token.fetch().await?;
    let credentials = WebIdentityProvider::connect(&config.region, &config.role_arn, token).await?;
    let store = S3Store::connect(&config.region, credentials);

    let publisher = Publisher::new(
        Arc::new(store),
        &config.build_bucket,
        &config.artifact_bucket,
        &manifest,
    );
    publisher.publish(&manifest, &artifacts).await?;

    println!(
        "Published {} and {} artifact files for {}/{}",
        manifest::MANIFEST_OBJECT_NAME,
        artifacts.len(),
        manifest.project_name,
        manifest.build_number
    );
    Ok(())
}

/// Fetch the identity token, persist it, and expose the role settings to
/// later workflow steps through the environment propagation file.
pub async fn handle_export_credentials(args: ExportArgs, env: &Environment) -> Result<()> {
    let role_arn = config::require_input(env, args.role_to_assume.as_deref(), config::INPUT_ROLE)?;
    let region = config::require_input(env, args.region.as_deref(), config::INPUT_REGION)?;
    let env_file = PathBuf::from(env.require(env_export::ENV_FILE_VAR)?);

    let token = TokenSource::from_environment(env)?.fetch().await?;
    let token_file = env_export::persist_identity_token(&token)?;
    env_export::append_exports(
        &env_file,
        &env_export::role_exports(&token_file, &role_arn, &region),
    )?;

    println!("Exported role {role_arn} to {}", env_file.display());
    Ok(())
}
