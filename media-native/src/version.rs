use std::fmt;
use std::str::FromStr;

/// Version reported by the running native engine
///
/// Ordered so event-code availability can be compared against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EngineVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl EngineVersion {
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse an engine version string such as `"3.0.18 Vetinari"`
    ///
    /// Anything after the first whitespace is a release name and is ignored.
    /// Missing minor/patch components default to zero.
    pub fn parse(s: &str) -> Option<Self> {
        let numeric = s.split_whitespace().next()?;
        let mut parts = numeric.split('.');

        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(p) => leading_digits(p)?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(p) => leading_digits(p)?,
            None => 0,
        };

        Some(Self::new(major, minor, patch))
    }
}

// "18-git" -> 18
fn leading_digits(s: &str) -> Option<u16> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}

impl FromStr for EngineVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid engine version: {s}"))
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3.0.18 Vetinari", EngineVersion::new(3, 0, 18))]
    #[case("4.0.0-dev Otto Chriek", EngineVersion::new(4, 0, 0))]
    #[case("2.2", EngineVersion::new(2, 2, 0))]
    #[case("3", EngineVersion::new(3, 0, 0))]
    fn test_parse(#[case] input: &str, #[case] expected: EngineVersion) {
        assert_eq!(EngineVersion::parse(input), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("vlc")]
    #[case("x.1.2")]
    fn test_parse_invalid(#[case] input: &str) {
        assert_eq!(EngineVersion::parse(input), None);
    }

    #[test]
    fn test_ordering() {
        assert!(EngineVersion::new(2, 2, 8) < EngineVersion::new(3, 0, 0));
        assert!(EngineVersion::new(3, 0, 18) < EngineVersion::new(4, 0, 0));
        assert_eq!(EngineVersion::new(3, 0, 2).to_string(), "3.0.2");
    }
}
