//! Credential propagation to later workflow steps.
//!
//! Instead of uploading anything, this variant persists the identity token to
//! a freshly created file and appends the matching `AWS_*` variables to the
//! file named by `GITHUB_ENV`. Later steps then assume the role through the
//! SDK's default web-identity chain, with no long-lived secrets involved.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::Result;

/// Variable naming the environment propagation file.
pub const ENV_FILE_VAR: &str = "GITHUB_ENV";

/// Write the identity token to a freshly created file in the OS temp
/// directory and return its path.
pub fn persist_identity_token(token: &Zeroizing<String>) -> Result<PathBuf> {
    let path = std::env::temp_dir().join(format!("web-identity-token-{}", Uuid::new_v4()));
    std::fs::write(&path, token.as_bytes())?;
    Ok(path)
}

/// The variable block later steps need to pick up the role from the token
/// file.
pub fn role_exports(token_file: &Path, role_arn: &str, region: &str) -> Vec<(&'static str, String)> {
    vec![
        (
            "AWS_WEB_IDENTITY_TOKEN_FILE",
            token_file.display().to_string(),
        ),
        ("AWS_ROLE_ARN", role_arn.to_string()),
        ("AWS_DEFAULT_REGION", region.to_string()),
        ("AWS_REGION", region.to_string()),
    ]
}

/// Append `KEY=VALUE` lines to the propagation file.
pub fn append_exports(env_file: &Path, exports: &[(&'static str, String)]) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(env_file)?;
    for (key, value) in exports {
        writeln!(file, "{key}={value}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn token_file_holds_the_token() -> Result<()> {
        let token = Zeroizing::new("ey.token".to_string());
        let path = persist_identity_token(&token)?;

        assert_eq!(fs::read_to_string(&path)?, "ey.token");
        fs::remove_file(path)?;

        Ok(())
    }

    #[test]
    fn exports_are_appended_as_key_value_lines() -> Result<()> {
        let dir = tempdir()?;
        let env_file = dir.path().join("github_env");
        fs::write(&env_file, "EXISTING=1\n")?;

        let exports = role_exports(
            Path::new("/tmp/token-file"),
            "arn:aws:iam::0123:role/deploy",
            "eu-west-1",
        );
        append_exports(&env_file, &exports)?;

        let content = fs::read_to_string(&env_file)?;
        assert_eq!(
            content,
            "EXISTING=1\n\
             AWS_WEB_IDENTITY_TOKEN_FILE=/tmp/token-file\n\
             AWS_ROLE_ARN=arn:aws:iam::0123:role/deploy\n\
             AWS_DEFAULT_REGION=eu-west-1\n\
             AWS_REGION=eu-west-1\n"
        );

        Ok(())
    }
}
