//! Recursion bound for project discovery.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How many directory levels below the root a scan may descend into.
///
/// Configuration sources express this as an integer where `-1` (or any
/// negative value) means unbounded. Serialization uses the same encoding.
///
/// Depth is counted from the scan root: the root itself is depth `0`, its
/// children depth `1`, and so on. A directory's own files are always matched;
/// the bound only decides whether its subdirectories are entered.
///
/// # Examples
///
/// ```
/// use dcx_core::MaxDepth;
///
/// let depth: MaxDepth = "-1".parse().unwrap();
/// assert!(depth.is_unbounded());
///
/// let depth: MaxDepth = "2".parse().unwrap();
/// assert_eq!(depth.limit(), Some(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum MaxDepth {
    /// Traverse the whole tree.
    #[default]
    Unbounded,
    /// Descend at most this many levels below the root.
    Limited(usize),
}

impl MaxDepth {
    /// Returns `true` if the scan has no depth bound.
    #[inline]
    #[must_use]
    pub const fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Returns the level limit, or `None` when unbounded.
    #[inline]
    #[must_use]
    pub const fn limit(self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::Limited(n) => Some(n),
        }
    }
}

impl From<i64> for MaxDepth {
    fn from(value: i64) -> Self {
        if value < 0 {
            Self::Unbounded
        } else {
            Self::Limited(usize::try_from(value).unwrap_or(usize::MAX))
        }
    }
}

impl From<MaxDepth> for i64 {
    fn from(value: MaxDepth) -> Self {
        match value {
            MaxDepth::Unbounded => -1,
            MaxDepth::Limited(n) => Self::try_from(n).unwrap_or(Self::MAX),
        }
    }
}

impl FromStr for MaxDepth {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("unbounded") {
            return Ok(Self::Unbounded);
        }
        trimmed.parse::<i64>().map(Self::from).map_err(|e| {
            ConfigError::invalid_option("max_depth", format!("'{trimmed}' is not an integer: {e}"))
        })
    }
}

impl fmt::Display for MaxDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("unbounded"),
            Self::Limited(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_values_are_unbounded() {
        assert_eq!(MaxDepth::from(-1), MaxDepth::Unbounded);
        assert_eq!(MaxDepth::from(-42), MaxDepth::Unbounded);
        assert_eq!(MaxDepth::from(0), MaxDepth::Limited(0));
    }

    #[test]
    fn test_parse() {
        assert_eq!("-1".parse::<MaxDepth>().unwrap(), MaxDepth::Unbounded);
        assert_eq!(" 3 ".parse::<MaxDepth>().unwrap(), MaxDepth::Limited(3));
        assert_eq!(
            "unbounded".parse::<MaxDepth>().unwrap(),
            MaxDepth::Unbounded
        );
        assert!("deep".parse::<MaxDepth>().is_err());
    }

    #[test]
    fn test_serde_integer_encoding() {
        assert_eq!(serde_json::to_string(&MaxDepth::Unbounded).unwrap(), "-1");
        assert_eq!(serde_json::to_string(&MaxDepth::Limited(2)).unwrap(), "2");
        let parsed: MaxDepth = serde_json::from_str("-5").unwrap();
        assert_eq!(parsed, MaxDepth::Unbounded);
    }

    #[test]
    fn test_display() {
        assert_eq!(MaxDepth::Unbounded.to_string(), "unbounded");
        assert_eq!(MaxDepth::Limited(4).to_string(), "4");
    }
}
