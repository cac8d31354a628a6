//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ProjectName`] - Validated project (tenant) name
//! - [`StageName`] - Validated stage name
//! - [`ServiceName`] - Validated service name
//! - [`ResourcePath`] - Canonical relative resource path
//! - [`BranchName`] - Validated Git branch name
//! - [`Version`] - Commit identifier returned by every mutation
//!
//! # Validation
//!
//! These types enforce validity at construction time. Every name that reaches
//! the repository layer has already passed through one of these constructors,
//! so a project name always maps to exactly one directory under the data root
//! and a resource path can never escape its repository.
//!
//! # Examples
//!
//! ```
//! use cfgstore::core::types::{ProjectName, ResourcePath, StageName};
//!
//! let project = ProjectName::new("shop").unwrap();
//! let stage = StageName::new("staging").unwrap();
//! let path = ResourcePath::new("/svc//./config.yaml").unwrap();
//! assert_eq!(path.as_str(), "svc/config.yaml");
//!
//! assert!(ProjectName::new("../etc").is_err());
//! assert!(ResourcePath::new("svc/../../secret").is_err());
//! # let _ = (project, stage);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid project name: {0}")]
    InvalidProjectName(String),

    #[error("invalid stage name: {0}")]
    InvalidStageName(String),

    #[error("invalid service name: {0}")]
    InvalidServiceName(String),

    #[error("invalid resource path: {0}")]
    InvalidResourcePath(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid version: {0}")]
    InvalidVersion(String),
}

/// Maximum length of a project, stage or service name.
pub const MAX_NAME_LEN: usize = 200;

/// Validate a single name segment (project, stage or service).
///
/// Allowed: lowercase ASCII letters, digits, `-` and `_`, starting with a
/// letter or digit. Lowercase-only keeps the name-to-directory mapping
/// one-to-one on case-insensitive filesystems.
fn validate_segment(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name cannot be empty".into());
    }
    if name.len() > MAX_NAME_LEN {
        return Err(format!("name exceeds {MAX_NAME_LEN} characters"));
    }
    let first = name.chars().next().unwrap_or('-');
    if !(first.is_ascii_lowercase() || first.is_ascii_digit()) {
        return Err(format!("'{name}' must start with a letter or digit"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_'))
    {
        return Err(format!("'{name}' contains illegal character {c:?}"));
    }
    Ok(())
}

macro_rules! segment_type {
    ($(#[$meta:meta])* $name:ident, $variant:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a new validated name.
            ///
            /// # Errors
            ///
            /// Returns a [`TypeError`] if the name is empty, too long, or
            /// contains characters outside `[a-z0-9_-]`.
            pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
                let name = name.into();
                validate_segment(&name).map_err(TypeError::$variant)?;
                Ok(Self(name))
            }

            /// Get the name as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> Self {
                name.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

segment_type!(
    /// A validated project name.
    ///
    /// Project names are used verbatim as repository directory names, so the
    /// alphabet is restricted to characters that are safe on every filesystem.
    ///
    /// # Example
    ///
    /// ```
    /// use cfgstore::core::types::ProjectName;
    ///
    /// assert!(ProjectName::new("sockshop").is_ok());
    /// assert!(ProjectName::new("my_project-2").is_ok());
    /// assert!(ProjectName::new("").is_err());
    /// assert!(ProjectName::new("..").is_err());
    /// assert!(ProjectName::new("a/b").is_err());
    /// ```
    ProjectName,
    InvalidProjectName
);

segment_type!(
    /// A validated stage name.
    ///
    /// Every valid stage name is also a valid branch name; see
    /// [`StageName::branch`].
    StageName,
    InvalidStageName
);

segment_type!(
    /// A validated service name (the directory grouping one service's resources).
    ServiceName,
    InvalidServiceName
);

impl StageName {
    /// The branch that backs this stage.
    ///
    /// ```
    /// use cfgstore::core::types::StageName;
    ///
    /// let stage = StageName::new("production").unwrap();
    /// assert_eq!(stage.branch().as_str(), "production");
    /// ```
    pub fn branch(&self) -> BranchName {
        // Segment alphabet is a strict subset of the refname alphabet.
        BranchName(self.0.clone())
    }
}

/// A canonical, repository-relative resource path.
///
/// Canonicalization strips a leading `/` and drops empty and `.` components.
/// Traversal (`..`), the `.git` directory, backslashes and control characters
/// are rejected.
///
/// # Example
///
/// ```
/// use cfgstore::core::types::ResourcePath;
///
/// let path = ResourcePath::new("/helm/carts/values.yaml").unwrap();
/// assert_eq!(path.as_str(), "helm/carts/values.yaml");
///
/// assert!(ResourcePath::new("").is_err());
/// assert!(ResourcePath::new("../x").is_err());
/// assert!(ResourcePath::new(".git/config").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Create a new canonical resource path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidResourcePath` if the path is empty after
    /// canonicalization or contains an illegal component.
    pub fn new(path: impl AsRef<str>) -> Result<Self, TypeError> {
        let raw = path.as_ref();

        if raw.contains('\\') {
            return Err(TypeError::InvalidResourcePath(
                "resource path cannot contain '\\'".into(),
            ));
        }
        if raw.chars().any(|c| c.is_control()) {
            return Err(TypeError::InvalidResourcePath(
                "resource path cannot contain control characters".into(),
            ));
        }

        let mut components = Vec::new();
        for component in raw.split('/') {
            match component {
                "" | "." => continue,
                ".." => {
                    return Err(TypeError::InvalidResourcePath(format!(
                        "'{raw}' escapes its directory"
                    )))
                }
                c if c.eq_ignore_ascii_case(".git") => {
                    return Err(TypeError::InvalidResourcePath(
                        "resource path cannot touch the .git directory".into(),
                    ))
                }
                c => components.push(c),
            }
        }

        if components.is_empty() {
            return Err(TypeError::InvalidResourcePath(
                "resource path cannot be empty".into(),
            ));
        }

        Ok(Self(components.join("/")))
    }

    /// Prefix this path with a service directory.
    pub fn under(&self, service: &ServiceName) -> Self {
        Self(format!("{}/{}", service.as_str(), self.0))
    }

    /// Whether this path lies below `dir` treated as a directory.
    pub fn is_inside(&self, dir: &ResourcePath) -> bool {
        self.0
            .strip_prefix(dir.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Strip a service directory prefix, if present.
    pub fn strip_service(&self, service: &ServiceName) -> Option<Self> {
        self.0
            .strip_prefix(service.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .map(|rest| Self(rest.to_string()))
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ResourcePath {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ResourcePath> for String {
    fn from(path: ResourcePath) -> Self {
        path.0
    }
}

impl AsRef<str> for ResourcePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated Git branch name.
///
/// Branch names must conform to Git's refname rules (see `git check-ref-format`):
/// - Cannot be empty
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
/// - Cannot be exactly `@`
///
/// # Example
///
/// ```
/// use cfgstore::core::types::BranchName;
///
/// let name = BranchName::new("master").unwrap();
/// assert_eq!(name.as_str(), "master");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("branch.lock").is_err());
/// assert!(BranchName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let fail = |msg: &str| Err(TypeError::InvalidBranchName(msg.to_string()));

        if name.is_empty() {
            return fail("branch name cannot be empty");
        }
        if name == "@" {
            return fail("branch name cannot be '@' (reserved)");
        }
        if name.starts_with('-') {
            return fail("branch name cannot start with '-'");
        }
        if name.ends_with('/') {
            return fail("branch name cannot end with '/'");
        }
        for seq in ["..", "@{", "//"] {
            if name.contains(seq) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{seq}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        for c in INVALID_CHARS {
            if name.contains(c) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{c}'"
                )));
            }
        }
        if name.chars().any(|c| c.is_ascii_control()) {
            return fail("branch name cannot contain control characters");
        }

        // Component rules also cover a leading '.' and a trailing '.lock'.
        for component in name.split('/').filter(|c| !c.is_empty()) {
            if component.starts_with('.') {
                return fail("path component cannot start with '.'");
            }
            if component.ends_with(".lock") {
                return fail("path component cannot end with '.lock'");
            }
        }

        Ok(())
    }

    /// Full ref name (`refs/heads/<branch>`).
    pub fn refname(&self) -> String {
        format!("refs/heads/{}", self.0)
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resource version: the id of the commit that produced it.
///
/// Versions are normalized to lowercase hex. Callers should treat them as
/// opaque; the only supported operations are display, comparison for
/// equality, and passing one back to the store.
///
/// # Example
///
/// ```
/// use cfgstore::core::types::Version;
///
/// let v = Version::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(v.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(v.short(7), "abc123d");
///
/// assert!(Version::new("not-a-sha").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(String);

impl Version {
    /// Create a new validated version.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidVersion` if the string is not a 40 or 64
    /// character hex object id.
    pub fn new(version: impl Into<String>) -> Result<Self, TypeError> {
        let version = version.into().to_ascii_lowercase();
        if version.len() != 40 && version.len() != 64 {
            return Err(TypeError::InvalidVersion(format!(
                "expected 40 or 64 hex characters, got {}",
                version.len()
            )));
        }
        if !version.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidVersion(
                "version must be hexadecimal".into(),
            ));
        }
        Ok(Self(version))
    }

    /// Get an abbreviated form of the version.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Get the version as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Version {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.0
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod segment_names {
        use super::*;

        #[test]
        fn valid_names() {
            assert!(ProjectName::new("sockshop").is_ok());
            assert!(ProjectName::new("shop2").is_ok());
            assert!(StageName::new("dev").is_ok());
            assert!(StageName::new("pre-prod_1").is_ok());
            assert!(ServiceName::new("carts-db").is_ok());
            assert!(ProjectName::new("9lives").is_ok());
        }

        #[test]
        fn empty_rejected() {
            assert!(matches!(
                ProjectName::new(""),
                Err(TypeError::InvalidProjectName(_))
            ));
            assert!(matches!(
                StageName::new(""),
                Err(TypeError::InvalidStageName(_))
            ));
            assert!(matches!(
                ServiceName::new(""),
                Err(TypeError::InvalidServiceName(_))
            ));
        }

        #[test]
        fn traversal_rejected() {
            assert!(ProjectName::new("..").is_err());
            assert!(ProjectName::new(".").is_err());
            assert!(ProjectName::new("a/b").is_err());
            assert!(StageName::new("../master").is_err());
        }

        #[test]
        fn leading_punctuation_rejected() {
            assert!(StageName::new("-dev").is_err());
            assert!(StageName::new("_dev").is_err());
        }

        #[test]
        fn illegal_characters_rejected() {
            for name in ["has space", "a:b", "a.b", "ümlaut", "tab\t", "Shop"] {
                assert!(ProjectName::new(name).is_err(), "accepted {name:?}");
            }
        }

        #[test]
        fn length_limit() {
            assert!(ProjectName::new("a".repeat(MAX_NAME_LEN)).is_ok());
            assert!(ProjectName::new("a".repeat(MAX_NAME_LEN + 1)).is_err());
        }

        #[test]
        fn stage_branch_is_valid_branch() {
            let stage = StageName::new("hardening").unwrap();
            let branch = stage.branch();
            assert_eq!(branch, BranchName::new("hardening").unwrap());
            assert_eq!(branch.refname(), "refs/heads/hardening");
        }

        #[test]
        fn serde_validates() {
            let ok: Result<StageName, _> = serde_json::from_str("\"dev\"");
            assert!(ok.is_ok());
            let bad: Result<StageName, _> = serde_json::from_str("\"../dev\"");
            assert!(bad.is_err());
        }
    }

    mod resource_path {
        use super::*;

        #[test]
        fn canonicalizes() {
            assert_eq!(ResourcePath::new("a.yaml").unwrap().as_str(), "a.yaml");
            assert_eq!(ResourcePath::new("/a/b.yaml").unwrap().as_str(), "a/b.yaml");
            assert_eq!(ResourcePath::new("a//b/./c").unwrap().as_str(), "a/b/c");
            assert_eq!(ResourcePath::new("a/b/").unwrap().as_str(), "a/b");
        }

        #[test]
        fn rejects_empty() {
            assert!(ResourcePath::new("").is_err());
            assert!(ResourcePath::new("/").is_err());
            assert!(ResourcePath::new("./.").is_err());
        }

        #[test]
        fn rejects_traversal() {
            assert!(ResourcePath::new("..").is_err());
            assert!(ResourcePath::new("a/../b").is_err());
            assert!(ResourcePath::new("a/..").is_err());
        }

        #[test]
        fn rejects_git_dir() {
            assert!(ResourcePath::new(".git").is_err());
            assert!(ResourcePath::new("x/.GIT/HEAD").is_err());
            assert!(ResourcePath::new(".gitignore").is_ok());
        }

        #[test]
        fn rejects_backslash_and_control() {
            assert!(ResourcePath::new("a\\b").is_err());
            assert!(ResourcePath::new("a\0b").is_err());
            assert!(ResourcePath::new("a\nb").is_err());
        }

        #[test]
        fn service_prefixing() {
            let service = ServiceName::new("carts").unwrap();
            let path = ResourcePath::new("values.yaml").unwrap();
            let full = path.under(&service);
            assert_eq!(full.as_str(), "carts/values.yaml");
            assert_eq!(full.strip_service(&service), Some(path));

            let other = ServiceName::new("cart").unwrap();
            assert_eq!(full.strip_service(&other), None);
        }

        #[test]
        fn containment_is_by_component() {
            let dir = ResourcePath::new("svc/a").unwrap();
            assert!(ResourcePath::new("svc/a/b").unwrap().is_inside(&dir));
            assert!(!ResourcePath::new("svc/ab").unwrap().is_inside(&dir));
            assert!(!dir.is_inside(&dir));
        }
    }

    mod branch_name {
        use super::*;

        #[test]
        fn valid_branch_names() {
            assert!(BranchName::new("main").is_ok());
            assert!(BranchName::new("feature/foo").is_ok());
            assert!(BranchName::new("with.dot").is_ok());
        }

        #[test]
        fn invalid_branch_names() {
            assert!(BranchName::new("").is_err());
            assert!(BranchName::new("@").is_err());
            assert!(BranchName::new(".hidden").is_err());
            assert!(BranchName::new("-flag").is_err());
            assert!(BranchName::new("a..b").is_err());
            assert!(BranchName::new("a//b").is_err());
            assert!(BranchName::new("x.lock").is_err());
            assert!(BranchName::new("trailing/").is_err());
            assert!(BranchName::new("what?").is_err());
        }
    }

    mod version {
        use super::*;

        #[test]
        fn normalized_to_lowercase() {
            let v = Version::new("ABCDEF0123456789ABCDEF0123456789ABCDEF01").unwrap();
            assert_eq!(v.as_str(), "abcdef0123456789abcdef0123456789abcdef01");
        }

        #[test]
        fn sha256_length_accepted() {
            assert!(Version::new("a".repeat(64)).is_ok());
        }

        #[test]
        fn wrong_length_rejected() {
            assert!(Version::new("abc").is_err());
            assert!(Version::new("a".repeat(41)).is_err());
        }

        #[test]
        fn non_hex_rejected() {
            assert!(Version::new("g".repeat(40)).is_err());
        }

        #[test]
        fn short_clamps() {
            let v = Version::new("a".repeat(40)).unwrap();
            assert_eq!(v.short(7), "aaaaaaa");
            assert_eq!(v.short(100).len(), 40);
        }
    }
}
