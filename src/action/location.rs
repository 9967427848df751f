// src/action/location.rs

//! Realm-tagged file references.
//!
//! Every location is written as `<realm>://<path>`, e.g.
//! `shared://data/in`, `worker://traj/`, `file:///abs/x.pdb`. The realm
//! decides which physical namespace the path is resolved against; a trailing
//! `/` marks a folder.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::ResolutionError;

/// Logical storage namespace of a file reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Realm {
    /// The worker's current working directory.
    Worker,
    /// A filesystem shared by all workers of a resource.
    Shared,
    /// The backend's staging area.
    Staging,
    /// The project sandbox on the shared filesystem.
    Sandbox,
    /// A literal, already resolved path.
    File,
}

impl Realm {
    pub const ALL: [Realm; 5] = [
        Realm::Worker,
        Realm::Shared,
        Realm::Staging,
        Realm::Sandbox,
        Realm::File,
    ];

    pub fn scheme(self) -> &'static str {
        match self {
            Realm::Worker => "worker",
            Realm::Shared => "shared",
            Realm::Staging => "staging",
            Realm::Sandbox => "sandbox",
            Realm::File => "file",
        }
    }

    /// The `<scheme>://` prefix of locations in this realm.
    pub fn prefix(self) -> &'static str {
        match self {
            Realm::Worker => "worker://",
            Realm::Shared => "shared://",
            Realm::Staging => "staging://",
            Realm::Sandbox => "sandbox://",
            Realm::File => "file://",
        }
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.scheme())
    }
}

impl FromStr for Realm {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "worker" => Ok(Realm::Worker),
            "shared" => Ok(Realm::Shared),
            "staging" => Ok(Realm::Staging),
            "sandbox" => Ok(Realm::Sandbox),
            "file" => Ok(Realm::File),
            other => Err(ResolutionError::UnknownRealm(other.to_string())),
        }
    }
}

/// A file or folder in one of the realms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRef {
    realm: Realm,
    path: String,
    is_folder: bool,
}

impl FileRef {
    /// Build a reference from a realm and a realm-relative path.
    ///
    /// A trailing `/` on `path` marks the reference as a folder.
    pub fn new(realm: Realm, path: impl Into<String>) -> Self {
        let path = path.into();
        let is_folder = path.ends_with('/');
        Self {
            realm,
            path,
            is_folder,
        }
    }

    /// Parse a `<realm>://<path>` location.
    pub fn parse(url: &str) -> Result<Self, ResolutionError> {
        let (scheme, path) = url
            .split_once("://")
            .ok_or_else(|| ResolutionError::UnknownRealm(url.to_string()))?;
        let realm = scheme
            .parse::<Realm>()
            .map_err(|_| ResolutionError::UnknownRealm(url.to_string()))?;
        Ok(Self::new(realm, path))
    }

    /// Force the folder flag regardless of a trailing slash.
    pub fn as_folder(mut self) -> Self {
        self.is_folder = true;
        self
    }

    pub fn realm(&self) -> Realm {
        self.realm
    }

    /// Realm-relative path, without the `<realm>://` prefix.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_folder(&self) -> bool {
        self.is_folder
    }

    /// Full location string including the realm prefix.
    pub fn url(&self) -> String {
        format!("{}{}", self.realm.prefix(), self.path)
    }

    /// Last path component, ignoring a trailing slash.
    pub fn basename(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.realm.prefix(), self.path)
    }
}

impl FromStr for FileRef {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileRef::parse(s)
    }
}
