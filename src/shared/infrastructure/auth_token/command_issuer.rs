// Token issuer backed by an external command, e.g. a cloud CLI that generates
// IAM database auth tokens. The command must print the token on stdout.

use crate::shared::infrastructure::auth_token::{AuthToken, TokenError, TokenIssuer};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::process::Command;

pub struct CommandTokenIssuer {
    program: String,
    args: Vec<String>,
    lifetime: Duration,
}

impl CommandTokenIssuer {
    pub fn new(program: impl Into<String>, args: Vec<String>, lifetime: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            lifetime,
        }
    }

    /// Splits a command line on whitespace. Quoting is not supported.
    pub fn from_command_line(command_line: &str, lifetime: Duration) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect(), lifetime))
    }
}

#[async_trait]
impl TokenIssuer for CommandTokenIssuer {
    async fn issue(&self) -> Result<AuthToken, TokenError> {
        // Expiry is measured from before the command runs.
        let expires_at = Utc::now() + self.lifetime;
        let output = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| TokenError::Issuance(format!("failed to run {}: {err}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TokenError::Issuance(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let token = String::from_utf8(output.stdout)
            .map_err(|err| TokenError::Issuance(format!("token is not valid utf-8: {err}")))?;
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Empty);
        }
        Ok(AuthToken::new(token, expires_at))
    }
}
