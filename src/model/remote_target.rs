//! Replication destinations saved by the operator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host value used for targets on the local machine.
pub const LOCAL_HOST: &str = "local";

/// A saved destination for `send`.
///
/// Invariant: `host == "local"` exactly when `use_ssh == false`. The fields are
/// private so the only ways to obtain a value are [`RemoteTarget::new`] and
/// deserialization followed by [`RemoteTarget::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTarget {
    name: String,
    host: String,
    dataset: String,
    use_ssh: bool,
}

/// Where a target's receiving `zfs` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination<'a> {
    /// Receive on this machine.
    Local,
    /// Receive on `host` (a `user@hostname` string) over SSH.
    Ssh {
        /// SSH endpoint.
        host: &'a str,
    },
}

impl RemoteTarget {
    /// Smart constructor enforcing the host/ssh invariant.
    ///
    /// Surrounding whitespace is trimmed from every field.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` when a field is empty, when `use_ssh` disagrees
    /// with `host == "local"`, or when an SSH host is not `user@hostname`.
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        dataset: impl Into<String>,
        use_ssh: bool,
    ) -> Result<Self, InvalidTarget> {
        let target = Self {
            name: name.into().trim().to_string(),
            host: host.into().trim().to_string(),
            dataset: dataset.into().trim().to_string(),
            use_ssh,
        };
        target.validate()?;
        Ok(target)
    }

    /// Convenience constructor for a target on this machine.
    pub fn local(
        name: impl Into<String>,
        dataset: impl Into<String>,
    ) -> Result<Self, InvalidTarget> {
        Self::new(name, LOCAL_HOST, dataset, false)
    }

    /// Re-check the invariant (used after deserialization).
    pub fn validate(&self) -> Result<(), InvalidTarget> {
        if self.name.is_empty() {
            return Err(InvalidTarget::EmptyName);
        }
        if self.dataset.is_empty() {
            return Err(InvalidTarget::EmptyDataset);
        }
        if !is_dataset_name(&self.dataset) {
            return Err(InvalidTarget::MalformedDataset(self.dataset.clone()));
        }
        let is_local = self.host == LOCAL_HOST;
        match (is_local, self.use_ssh) {
            (true, true) => Err(InvalidTarget::LocalWithSsh),
            (false, false) => Err(InvalidTarget::RemoteWithoutSsh(self.host.clone())),
            (true, false) => Ok(()),
            (false, true) => validate_ssh_host(&self.host),
        }
    }

    /// User-chosen label, unique within a registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `local` or `user@hostname`.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Destination dataset path on the target.
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Whether the stream is carried over SSH.
    pub fn use_ssh(&self) -> bool {
        self.use_ssh
    }

    /// Resolved destination for the replication collaborator.
    pub fn destination(&self) -> Destination<'_> {
        if self.use_ssh {
            Destination::Ssh { host: &self.host }
        } else {
            Destination::Local
        }
    }
}

impl fmt::Display for RemoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.host, self.dataset)
    }
}

/// ZFS dataset path characters only, never starting with `-`.
fn is_dataset_name(dataset: &str) -> bool {
    !dataset.starts_with('-')
        && dataset
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '/' | '-'))
}

fn is_host_part(part: &str) -> bool {
    !part.is_empty()
        && !part.starts_with('-')
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | ':' | '[' | ']'))
}

fn validate_ssh_host(host: &str) -> Result<(), InvalidTarget> {
    if host.is_empty() {
        return Err(InvalidTarget::MissingHost);
    }
    match host.split_once('@') {
        Some((user, hostname)) if is_host_part(user) && is_host_part(hostname) => Ok(()),
        _ => Err(InvalidTarget::MalformedHost(host.to_string())),
    }
}

/// Reasons a target is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTarget {
    /// Name is blank.
    #[error("target name cannot be empty")]
    EmptyName,
    /// Dataset is blank.
    #[error("destination dataset cannot be empty")]
    EmptyDataset,
    /// Dataset has characters outside a ZFS name or starts with `-`.
    #[error("destination dataset '{0}' is not a valid dataset path")]
    MalformedDataset(String),
    /// SSH enabled but no host given.
    #[error("an SSH target needs a user@hostname")]
    MissingHost,
    /// Host is not `user@hostname`.
    #[error("host '{0}' must have the form user@hostname")]
    MalformedHost(String),
    /// `host == "local"` combined with `use_ssh == true`.
    #[error("a local target cannot use SSH")]
    LocalWithSsh,
    /// Remote host combined with `use_ssh == false`.
    #[error("host '{0}' is remote and requires SSH")]
    RemoteWithoutSsh(String),
}
