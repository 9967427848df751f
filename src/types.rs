use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Which execution backend resolved actions are handed to.
///
/// The backend fixes the resolver chain:
/// - `Local`: everything becomes a shell command run in the worker directory.
/// - `Staging`: transactions the backend can stage become staging directives;
///   the rest fall back to shell commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    Staging,
}

impl Default for BackendKind {
    fn default() -> Self {
        BackendKind::Local
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => f.write_str("local"),
            BackendKind::Staging => f.write_str("staging"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "staging" => Ok(BackendKind::Staging),
            other => Err(format!(
                "invalid backend kind: {other} (expected \"local\" or \"staging\")"
            )),
        }
    }
}
