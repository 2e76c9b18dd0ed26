use std::{
    fmt,
    path::{Component, Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// A path to a resource, relative to the resource root.
///
/// This is the form the downstream loader fetches assets by, for example
/// `/models/props/crate.mimodel`. It always starts with `/`, always uses `/`
/// as the separator (regardless of platform), and never contains empty,
/// `.` or `..` segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Builds a resource path from a filesystem path relative to the
    /// resource root.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty, absolute, escapes the root via
    /// `..`, or contains a segment that is not valid UTF-8.
    pub fn from_relative(path: &Path) -> Result<Self, ResourcePathError> {
        let mut out = String::new();

        for component in path.components() {
            match component {
                Component::Normal(segment) => {
                    let segment = segment
                        .to_str()
                        .ok_or_else(|| ResourcePathError::NonUtf8(path.to_path_buf()))?;
                    out.push('/');
                    out.push_str(segment);
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(ResourcePathError::NotRelative(path.to_path_buf()));
                }
            }
        }

        if out.is_empty() {
            return Err(ResourcePathError::Empty);
        }

        Ok(Self(out))
    }

    /// Returns the string form, including the leading `/`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last segment of the path.
    #[must_use]
    pub fn file_name(&self) -> &str {
        // Construction guarantees at least one non-empty segment after a '/'.
        self.0.rsplit('/').next().unwrap_or_default()
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourcePath {
    type Err = ResourcePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('/')
            .ok_or_else(|| ResourcePathError::MissingLeadingSlash(s.to_string()))?;

        if rest.is_empty() {
            return Err(ResourcePathError::Empty);
        }

        if rest
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(ResourcePathError::InvalidSegment(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ResourcePath {
    type Error = ResourcePathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
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

/// Errors that can occur when building or parsing a [`ResourcePath`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResourcePathError {
    /// The path has no segments.
    #[error("resource path is empty")]
    Empty,

    /// The filesystem path is absolute or escapes the resource root.
    #[error("path is not relative to the resource root: {}", .0.display())]
    NotRelative(PathBuf),

    /// The filesystem path cannot be represented as UTF-8.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8(PathBuf),

    /// The string form does not start with `/`.
    #[error("resource path must start with '/': {0}")]
    MissingLeadingSlash(String),

    /// The string form contains an empty, `.` or `..` segment.
    #[error("resource path contains an invalid segment: {0}")]
    InvalidSegment(String),
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("models/a/x.mimodel", "/models/a/x.mimodel"; "nested")]
    #[test_case("models/x.mimodel", "/models/x.mimodel"; "shallow")]
    #[test_case("./models/x.mimodel", "/models/x.mimodel"; "leading current dir")]
    fn from_relative_joins_with_forward_slashes(input: &str, expected: &str) {
        let path = ResourcePath::from_relative(Path::new(input)).unwrap();
        assert_eq!(path.as_str(), expected);
    }

    #[test_case("../models/x.mimodel"; "parent escape")]
    #[test_case("/models/x.mimodel"; "absolute")]
    fn from_relative_rejects_non_relative_paths(input: &str) {
        let error = ResourcePath::from_relative(Path::new(input)).unwrap_err();
        assert!(matches!(error, ResourcePathError::NotRelative(_)));
    }

    #[test]
    fn from_relative_rejects_empty_path() {
        assert_eq!(
            ResourcePath::from_relative(Path::new("")),
            Err(ResourcePathError::Empty)
        );
    }

    #[test]
    fn file_name_is_last_segment() {
        let path: ResourcePath = "/model_overrides/a/x.mimodel".parse().unwrap();
        assert_eq!(path.file_name(), "x.mimodel");
    }

    #[test_case("models/x.mimodel"; "missing slash")]
    #[test_case("/"; "root only")]
    #[test_case("/models//x.mimodel"; "empty segment")]
    #[test_case("/models/../x.mimodel"; "parent segment")]
    fn parse_rejects_malformed_strings(input: &str) {
        assert!(input.parse::<ResourcePath>().is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let path: ResourcePath = "/models/b/y.mimodel".parse().unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#""/models/b/y.mimodel""#);

        let back: ResourcePath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
