// SPDX-License-Identifier: MIT

//! Comparator table for condition classes
//!
//! Both operands are raw strings (a live computed style value and the
//! literal from the class name) and are compared by their leading integer
//! prefix only, so `500px` and `500` are equal and no unit conversion ever
//! happens.

use serde::Serialize;

/// Comparison operators usable in a condition class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    /// eq
    Eq,
    /// lt
    Lt,
    /// gt
    Gt,
    /// lteq
    Lteq,
    /// gteq
    Gteq,
}

impl Comparator {
    pub const ALL: [Comparator; 5] = [
        Comparator::Eq,
        Comparator::Lt,
        Comparator::Gt,
        Comparator::Lteq,
        Comparator::Gteq,
    ];

    /// Look up a comparator by its name in a condition class
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(Comparator::Eq),
            "lt" => Some(Comparator::Lt),
            "gt" => Some(Comparator::Gt),
            "lteq" => Some(Comparator::Lteq),
            "gteq" => Some(Comparator::Gteq),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Comparator::Eq => "eq",
            Comparator::Lt => "lt",
            Comparator::Gt => "gt",
            Comparator::Lteq => "lteq",
            Comparator::Gteq => "gteq",
        }
    }

    /// Compare `left` against `right`.
    ///
    /// If either side has no integer prefix the result is `false` for every
    /// comparator, `eq` included.
    pub fn compare(&self, left: &str, right: &str) -> bool {
        let (Some(a), Some(b)) = (parse_int_prefix(left), parse_int_prefix(right)) else {
            return false;
        };
        match self {
            Comparator::Eq => a == b,
            Comparator::Lt => a < b,
            Comparator::Gt => a > b,
            Comparator::Lteq => a <= b,
            Comparator::Gteq => a >= b,
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parse the leading base-10 integer of `input`.
///
/// Leading whitespace is skipped and one `+`/`-` sign is accepted; parsing
/// stops at the first non-digit. Returns `None` when no digit follows.
/// Values beyond the `i64` range saturate.
///
/// There is no radix detection: `0x1f` reads as `0` rather than as hex.
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let rest = input.trim_start();
    let (negative, digits) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        seen_digit = true;
        let digit = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }

    seen_digit.then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_names() {
        for cmp in Comparator::ALL {
            assert_eq!(Comparator::from_name(cmp.name()), Some(cmp));
        }
    }

    #[test]
    fn test_lookup_unknown_name() {
        assert_eq!(Comparator::from_name("unknowncmp"), None);
        assert_eq!(Comparator::from_name("EQ"), None);
        assert_eq!(Comparator::from_name(""), None);
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("500px"), Some(500));
        assert_eq!(parse_int_prefix("500"), Some(500));
        assert_eq!(parse_int_prefix("  42em"), Some(42));
        assert_eq!(parse_int_prefix("-12px"), Some(-12));
        assert_eq!(parse_int_prefix("+7"), Some(7));
        assert_eq!(parse_int_prefix("12.9px"), Some(12));
        assert_eq!(parse_int_prefix("auto"), None);
        assert_eq!(parse_int_prefix("px500"), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix(""), None);
    }

    #[test]
    fn test_parse_int_prefix_has_no_radix_detection() {
        assert_eq!(parse_int_prefix("0x1f"), Some(0));
        assert_eq!(parse_int_prefix("010"), Some(10));
        assert!(Comparator::Eq.compare("0x1f", "0"));
    }

    #[test]
    fn test_parse_int_prefix_saturates() {
        assert_eq!(parse_int_prefix("99999999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_int_prefix("-99999999999999999999999"), Some(i64::MIN));
    }

    #[test]
    fn test_compare_ignores_units() {
        assert!(Comparator::Eq.compare("500px", "500"));
        assert!(Comparator::Eq.compare("500px", "500em"));
        assert!(Comparator::Lt.compare("5em", "500px"));
        assert!(Comparator::Gt.compare("500px", "400px"));
        assert!(!Comparator::Gt.compare("400px", "400px"));
        assert!(Comparator::Gteq.compare("400px", "400px"));
        assert!(Comparator::Lteq.compare("399px", "400px"));
        assert!(!Comparator::Lteq.compare("401px", "400px"));
    }

    #[test]
    fn test_compare_non_numeric_is_always_false() {
        for cmp in Comparator::ALL {
            assert!(!cmp.compare("auto", "500px"), "{} auto", cmp);
            assert!(!cmp.compare("500px", "big"), "{} big", cmp);
            assert!(!cmp.compare("none", "none"), "{} none", cmp);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Comparator::Lteq), "lteq");
        assert_eq!(format!("{}", Comparator::Gteq), "gteq");
    }
}
