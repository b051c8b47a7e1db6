//! Tag-number spellings and private-tag detection
//!
//! Field identifiers are usually keywords (`PatientName`), but records coming
//! from different readers may key the same element by its tag number. This
//! module parses the accepted spellings into a [`TagNumber`]:
//!
//! - `(0010,0010)` / `(0010, 0010)`
//! - `00100010`
//! - `0x00100010`
//!
//! # Examples
//!
//! ```
//! use phi_guard::domain::tag::TagNumber;
//!
//! let tag: TagNumber = "0x00100010".parse().unwrap();
//! assert_eq!(tag.to_string(), "(0010,0010)");
//! assert!(!tag.is_private());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A (group, element) tag number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagNumber {
    pub group: u16,
    pub element: u16,
}

impl TagNumber {
    pub fn new(group: u16, element: u16) -> Self {
        Self { group, element }
    }

    /// Private (manufacturer-specific) tags have an odd group number
    pub fn is_private(&self) -> bool {
        self.group & 0x0001 == 1
    }
}

impl fmt::Display for TagNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.group, self.element)
    }
}

impl FromStr for TagNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();

        let hex = if let Some(inner) = compact
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let (group, element) = inner
                .split_once(',')
                .ok_or_else(|| format!("Invalid tag number: {s}"))?;
            if group.len() != 4 || element.len() != 4 {
                return Err(format!("Invalid tag number: {s}"));
            }
            format!("{group}{element}")
        } else if let Some(rest) = compact
            .strip_prefix("0x")
            .or_else(|| compact.strip_prefix("0X"))
        {
            rest.to_string()
        } else {
            compact
        };

        if hex.len() != 8 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Invalid tag number: {s}"));
        }

        let group = u16::from_str_radix(&hex[..4], 16).map_err(|e| e.to_string())?;
        let element = u16::from_str_radix(&hex[4..], 16).map_err(|e| e.to_string())?;
        Ok(Self { group, element })
    }
}

/// Returns true when `field_id` is a tag-number spelling of a private tag
///
/// Keywords are never private.
pub fn is_private_field(field_id: &str) -> bool {
    field_id
        .parse::<TagNumber>()
        .map(|tag| tag.is_private())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("(0010,0010)" ; "parenthesized")]
    #[test_case("(0010, 0010)" ; "parenthesized with space")]
    #[test_case("00100010" ; "bare hex")]
    #[test_case("0x00100010" ; "prefixed hex")]
    #[test_case("0X00100010" ; "upper prefix")]
    fn test_parse_spellings(input: &str) {
        let tag: TagNumber = input.parse().unwrap();
        assert_eq!(tag, TagNumber::new(0x0010, 0x0010));
    }

    #[test]
    fn test_display_is_canonical_uppercase() {
        let tag: TagNumber = "0020000d".parse().unwrap();
        assert_eq!(tag.to_string(), "(0020,000D)");
    }

    #[test]
    fn test_keywords_are_not_tag_numbers() {
        assert!("PatientName".parse::<TagNumber>().is_err());
        assert!("(0010,00)".parse::<TagNumber>().is_err());
        assert!("".parse::<TagNumber>().is_err());
    }

    #[test]
    fn test_private_detection() {
        assert!(is_private_field("(0011,0010)"));
        assert!(is_private_field("00091001"));
        assert!(!is_private_field("(0010,0010)"));
        assert!(!is_private_field("PatientName"));
    }
}
