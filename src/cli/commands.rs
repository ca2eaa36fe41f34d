use clap::Args;

/// Arguments for the full publication flow.
///
/// Every value can also arrive as a pipeline input (`INPUT_<NAME>` variable);
/// a flag given here wins over the input.
#[derive(Debug, Args)]
pub struct PublishArgs {
    /// ARN of the deployment role to assume
    #[arg(long = "role-to-assume")]
    pub role_to_assume: Option<String>,

    /// AWS region for the token exchange and the uploads
    #[arg(long = "region")]
    pub region: Option<String>,

    /// Bucket receiving the artifact files
    #[arg(long = "artifact-bucket")]
    pub artifact_bucket: Option<String>,

    /// Bucket receiving the build manifest
    #[arg(long = "build-bucket")]
    pub build_bucket: Option<String>,

    /// Directory containing the files to upload
    #[arg(long = "artifact-directory")]
    pub artifact_directory: Option<String>,

    /// Project name override (defaults to the repository name)
    #[arg(long = "project-name")]
    pub project_name: Option<String>,
}

/// Arguments for exporting role credentials to later workflow steps.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// ARN of the deployment role to assume
    #[arg(long = "role-to-assume")]
    pub role_to_assume: Option<String>,

    /// AWS region to advertise to later steps
    #[arg(long = "region")]
    pub region: Option<String>,
}
