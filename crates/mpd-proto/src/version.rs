//! The `OK MPD <major>.<minor>.<patch>` welcome line (§4.1).

use crate::error::MpdError;

/// Server protocol version, parsed once from the welcome line and held for
/// the lifetime of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses a welcome line of the form `OK MPD 0.22.3\n` (trailing
    /// newline optional). Anchored at the start, per §4.1.
    pub fn parse_welcome(line: &str) -> Result<Self, MpdError> {
        let rest = line
            .trim_end_matches(['\r', '\n'])
            .strip_prefix("OK MPD ")
            .ok_or_else(|| MpdError::invalid_data(format!("not a welcome line: {line:?}")))?;

        let mut parts = rest.splitn(3, '.');
        let (major, minor, patch) = match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), Some(c)) => (a, b, c),
            _ => {
                return Err(MpdError::invalid_data(format!(
                    "malformed version in welcome line: {line:?}"
                )))
            }
        };

        let parse = |s: &str| {
            s.parse::<u32>()
                .map_err(|_| MpdError::invalid_data(format!("non-numeric version field: {s:?}")))
        };

        Ok(Self::new(parse(major)?, parse(minor)?, parse(patch)?))
    }

    /// Whether this version is at least `(major, minor, patch)`. Exposed for
    /// accumulators that need to change parsing behavior across protocol
    /// revisions (§4.1); no accumulator in this crate needs it yet.
    pub fn at_least(&self, major: u32, minor: u32, patch: u32) -> bool {
        *self >= Self::new(major, minor, patch)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_welcome_line() {
        let v = Version::parse_welcome("OK MPD 0.22.3\n").unwrap();
        assert_eq!(v, Version::new(0, 22, 3));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Version::parse_welcome("HELLO THERE\n").is_err());
        assert!(Version::parse_welcome("OK MPD 0.22\n").is_err());
        assert!(Version::parse_welcome("OK MPD a.b.c\n").is_err());
    }

    #[test]
    fn round_trips_and_compares_lexicographically() {
        for (m, n, p) in [(0u32, 0u32, 0u32), (0, 22, 3), (123456789, 0, 1)] {
            let line = format!("OK MPD {m}.{n}.{p}\n");
            let v = Version::parse_welcome(&line).unwrap();
            assert_eq!(v, Version::new(m, n, p));
        }

        assert!(Version::new(0, 21, 9) < Version::new(0, 22, 0));
        assert!(Version::new(0, 22, 0) < Version::new(0, 22, 1));
        assert!(Version::new(1, 0, 0) > Version::new(0, 99, 99));
    }

    #[test]
    fn at_least_gate() {
        let v = Version::new(0, 22, 3);
        assert!(v.at_least(0, 22, 0));
        assert!(!v.at_least(0, 23, 0));
    }
}
