//! Output depth levels for listings and tool results

use std::fmt;

/// How much of a record to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    /// One-liner per item.
    #[default]
    Summary,
    /// Key fields, no reasoning text.
    Standard,
    /// Everything.
    Full,
}

impl Depth {
    /// Parse a depth token, defaulting unknown input to `Summary`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "standard" => Self::Standard,
            "full" => Self::Full,
            _ => Self::Summary,
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary => f.write_str("summary"),
            Self::Standard => f.write_str("standard"),
            Self::Full => f.write_str("full"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_summary() {
        assert_eq!(Depth::parse("standard"), Depth::Standard);
        assert_eq!(Depth::parse("full"), Depth::Full);
        assert_eq!(Depth::parse("verbose"), Depth::Summary);
        assert_eq!(Depth::parse(""), Depth::Summary);
    }
}
