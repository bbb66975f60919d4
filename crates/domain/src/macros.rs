//! Macro for implementing Display and FromStr for small domain enums
//!
//! # Example
//!
//! ```rust
//! use daterange_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Granularity {
//!     Day,
//!     Instant,
//! }
//!
//! impl_domain_enum_conversions!(Granularity {
//!     Day => "day",
//!     Instant => "instant",
//! });
//!
//! assert_eq!("DAY".parse::<Granularity>().unwrap(), Granularity::Day);
//! ```

/// Implements Display and FromStr traits for unit-only enums
///
/// - Display: writes the mapped lowercase string
/// - FromStr: case-insensitive parse, error names the enum
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::types::{IntervalState, SortDirection};

    #[test]
    fn test_display_conversion() {
        assert_eq!(IntervalState::Unstarted.to_string(), "unstarted");
        assert_eq!(IntervalState::Active.to_string(), "active");
        assert_eq!(IntervalState::Ended.to_string(), "ended");
        assert_eq!(SortDirection::Descending.to_string(), "desc");
    }

    #[test]
    fn test_fromstr_mixed_case() {
        assert_eq!(SortDirection::from_str("ASC").unwrap(), SortDirection::Ascending);
        assert_eq!(SortDirection::from_str("Desc").unwrap(), SortDirection::Descending);
        assert_eq!(IntervalState::from_str("EnDeD").unwrap(), IntervalState::Ended);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = SortDirection::from_str("sideways");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid SortDirection: sideways"));
        assert!(IntervalState::from_str("").is_err());
    }
}
