use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic version representation
///
/// Ordering is lexicographic over `(major, minor, patch)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Create a new version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dotted version string such as `"1.2.3"`.
    ///
    /// Missing trailing components default to 0 (`"1.2"` -> `1.2.0`) and
    /// components past the third are ignored. Every present component must
    /// consist of ASCII digits only, so signs and whitespace are rejected.
    pub fn parse(version: &str) -> Result<Self> {
        let mut components = [0u32; 3];

        for (slot, part) in components.iter_mut().zip(version.split('.')) {
            *slot = parse_component(version, part)?;
        }

        Ok(Version::new(components[0], components[1], components[2]))
    }

    /// Bump version according to bump type
    ///
    /// Lower-order components are reset to 0. `BumpKind::None` is treated as
    /// a patch bump; callers filter it out before getting here.
    ///
    /// # Errors
    /// Returns a version error if the bumped component would overflow.
    pub fn bump(&self, kind: BumpKind) -> Result<Self> {
        let bumped = match kind {
            BumpKind::Major => self.major.checked_add(1).map(|major| Version::new(major, 0, 0)),
            BumpKind::Minor => {
                self.minor.checked_add(1).map(|minor| Version::new(self.major, minor, 0))
            }
            BumpKind::Patch | BumpKind::None => {
                self.patch.checked_add(1).map(|patch| Version::new(self.major, self.minor, patch))
            }
        };

        bumped.ok_or_else(|| {
            ReleaseError::version(format!("{} bump of {} overflows", kind, self))
        })
    }
}

fn parse_component(version: &str, part: &str) -> Result<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ReleaseError::version(format!(
            "Invalid version '{}': component '{}' is not a number",
            version, part
        )));
    }

    part.parse::<u32>().map_err(|_| {
        ReleaseError::version(format!(
            "Invalid version '{}': component '{}' is out of range",
            version, part
        ))
    })
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

/// Version bump decision, ordered `None < Patch < Minor < Major`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl BumpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpKind::None => "none",
            BumpKind::Patch => "patch",
            BumpKind::Minor => "minor",
            BumpKind::Major => "major",
        }
    }

    pub fn is_none(&self) -> bool {
        *self == BumpKind::None
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strongest bump among `bumps`, or `BumpKind::None` for an empty input.
pub fn max_bump<I>(bumps: I) -> BumpKind
where
    I: IntoIterator<Item = BumpKind>,
{
    bumps.into_iter().max().unwrap_or(BumpKind::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
    }

    #[test]
    fn test_version_parse_missing_components_default_to_zero() {
        assert_eq!(Version::parse("1").unwrap(), Version::new(1, 0, 0));
        assert_eq!(Version::parse("1.2").unwrap(), Version::new(1, 2, 0));
    }

    #[test]
    fn test_version_parse_ignores_extra_components() {
        assert_eq!(Version::parse("1.2.3.4").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("a.b.c").is_err());
        assert!(Version::parse("1..3").is_err());
        assert!(Version::parse("-1.0.0").is_err());
        assert!(Version::parse("+1.0.0").is_err());
        assert!(Version::parse("v1.0.0").is_err());
        assert!(Version::parse("99999999999.0.0").is_err());
    }

    #[test]
    fn test_version_round_trip() {
        for raw in ["0.0.0", "1.2.3", "10.0", "7", "4.5.6.7"] {
            let parsed = Version::parse(raw).unwrap();
            assert_eq!(Version::parse(&parsed.to_string()).unwrap(), parsed);
        }
    }

    #[test]
    fn test_version_bump_major() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(BumpKind::Major).unwrap(), Version::new(2, 0, 0));
    }

    #[test]
    fn test_version_bump_minor() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(BumpKind::Minor).unwrap(), Version::new(1, 3, 0));
    }

    #[test]
    fn test_version_bump_patch() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(BumpKind::Patch).unwrap(), Version::new(1, 2, 4));
    }

    #[test]
    fn test_bump_strictly_increases() {
        let versions = [
            Version::new(0, 0, 0),
            Version::new(1, 2, 3),
            Version::new(0, 9, 9),
        ];
        for v in versions {
            for kind in [BumpKind::Patch, BumpKind::Minor, BumpKind::Major] {
                assert!(v.bump(kind).unwrap() > v, "{} bumped by {} did not increase", v, kind);
            }
        }
    }

    #[test]
    fn test_bump_overflow_is_an_error() {
        let top = Version::parse("4294967295.4294967295.4294967295").unwrap();
        for kind in [BumpKind::Patch, BumpKind::Minor, BumpKind::Major] {
            let err = top.bump(kind).unwrap_err();
            assert!(err.to_string().contains("overflows"), "got: {}", err);
        }

        // Only the bumped component matters
        let v = Version::new(u32::MAX, 0, 7);
        assert_eq!(v.bump(BumpKind::Patch).unwrap(), Version::new(u32::MAX, 0, 8));
        assert!(v.bump(BumpKind::Major).is_err());
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::new(1, 10, 0) > Version::new(1, 9, 9));
        assert!(Version::new(2, 0, 0) > Version::new(1, 99, 99));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(1, 2, 3).to_string(), "1.2.3");
    }

    #[test]
    fn test_bump_kind_ordering() {
        assert!(BumpKind::None < BumpKind::Patch);
        assert!(BumpKind::Patch < BumpKind::Minor);
        assert!(BumpKind::Minor < BumpKind::Major);
    }

    #[test]
    fn test_max_bump() {
        assert_eq!(
            max_bump([BumpKind::Patch, BumpKind::Minor, BumpKind::Patch]),
            BumpKind::Minor
        );
        assert_eq!(max_bump(Vec::new()), BumpKind::None);
        assert_eq!(
            max_bump([BumpKind::Patch, BumpKind::Major]),
            BumpKind::Major
        );
    }

    #[test]
    fn test_bump_kind_serde() {
        assert_eq!(serde_json::to_string(&BumpKind::Minor).unwrap(), "\"minor\"");
        let kind: BumpKind = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(kind, BumpKind::None);
    }
}
