//! # API Microversions
//!
//! The service evolves its request and response shapes through "microversions":
//! `"<major>.<minor>"` strings negotiated once per session and sent with every
//! request. [`ApiVersion`] is the comparable value behind those strings.
//!
//! Ordering is numeric on `(major, minor)`, so `2.9 < 2.10`. The null version
//! (`0.0`) is the "unset" sentinel: it sorts before every concrete version and,
//! when used as a range bound, means "unbounded" on that side.

use crate::error::{Result, SfsError};
use std::fmt;
use std::str::FromStr;

/// Oldest version this client can speak.
pub const MIN_API_VERSION: ApiVersion = ApiVersion::new(2, 0);

/// Newest version this client can speak.
pub const MAX_API_VERSION: ApiVersion = ApiVersion::new(2, 84);

/// The retired v1 API; recognized so it can be refused with a clear message.
pub const LEGACY_API_VERSION: ApiVersion = ApiVersion::new(1, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ApiVersion {
    major: u32,
    minor: u32,
}

impl ApiVersion {
    pub const NULL: ApiVersion = ApiVersion::new(0, 0);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parses `"<major>.<minor>"`.
    ///
    /// `"null"`/`"none"` yield [`ApiVersion::NULL`] and `"latest"`/`"max"` yield
    /// [`MAX_API_VERSION`]. A missing minor component is rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "null" | "none" => return Ok(Self::NULL),
            "latest" | "max" => return Ok(MAX_API_VERSION),
            _ => {}
        }

        let invalid = || SfsError::InvalidVersionFormat(text.to_string());
        let (major, minor) = trimmed.split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: parse_component(major).ok_or_else(invalid)?,
            minor: parse_component(minor).ok_or_else(invalid)?,
        })
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    pub fn is_legacy(&self) -> bool {
        !self.is_null() && self.major < MIN_API_VERSION.major
    }

    /// True when `start <= self <= end`, treating a null bound as open.
    pub fn matches(&self, start: ApiVersion, end: ApiVersion) -> bool {
        let above = start.is_null() || *self >= start;
        let below = end.is_null() || *self <= end;
        above && below
    }
}

fn parse_component(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}.{}", self.major, self.minor)
        }
    }
}

impl FromStr for ApiVersion {
    type Err = SfsError;

    fn from_str(s: &str) -> Result<Self> {
        ApiVersion::parse(s)
    }
}

/// Rejects versions outside what this client implements.
pub fn check_supported(requested: ApiVersion) -> Result<ApiVersion> {
    if requested.is_legacy() {
        return Err(SfsError::IncompatibleVersion(format!(
            "API version {} is no longer supported; use {} or later",
            requested, MIN_API_VERSION
        )));
    }
    if requested.is_null() || !requested.matches(MIN_API_VERSION, MAX_API_VERSION) {
        return Err(SfsError::IncompatibleVersion(format!(
            "The specified version isn't supported by client. The valid version range is '{}' to '{}'",
            MIN_API_VERSION, MAX_API_VERSION
        )));
    }
    Ok(requested)
}

/// Picks the highest version both sides understand.
///
/// A null `server_max` means the service does not expose microversions at all.
pub fn negotiate(
    client_min: ApiVersion,
    client_max: ApiVersion,
    server_min: ApiVersion,
    server_max: ApiVersion,
) -> Result<ApiVersion> {
    if server_max.is_null() {
        return Err(SfsError::IncompatibleVersion(
            "The server does not support API microversions".to_string(),
        ));
    }

    let candidate = client_max.min(server_max);
    let floor = client_min.max(server_min);
    if candidate < floor {
        return Err(SfsError::IncompatibleVersion(format!(
            "The server supports API versions {} to {}, this client supports {} to {}",
            server_min, server_max, client_min, client_max
        )));
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ApiVersion {
        ApiVersion::parse(s).unwrap()
    }

    #[test]
    fn parses_major_and_minor() {
        let version = v("2.57");
        assert_eq!(version.major(), 2);
        assert_eq!(version.minor(), 57);
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in ["2", "2.", ".5", "2.x", "two.one", "2.1.3", "+2.1", "", "-1.0"] {
            assert!(
                matches!(ApiVersion::parse(bad), Err(SfsError::InvalidVersionFormat(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn recognizes_sentinels() {
        assert!(v("null").is_null());
        assert!(v("None").is_null());
        assert_eq!(v("latest"), MAX_API_VERSION);
    }

    #[test]
    fn orders_numerically_not_lexically() {
        assert!(v("2.9") < v("2.10"));
        assert!(v("2.10") < v("3.0"));
        assert!(v("1.99") < v("2.0"));
        assert_eq!(v("2.07"), v("2.7"));
    }

    #[test]
    fn null_sorts_before_concrete_versions() {
        assert!(ApiVersion::NULL < v("0.1"));
        assert!(ApiVersion::NULL < MIN_API_VERSION);
    }

    #[test]
    fn string_form_round_trips() {
        for text in ["2.0", "2.7", "2.57", "10.100", "1.0"] {
            let parsed = v(text);
            assert_eq!(v(&parsed.to_string()), parsed);
        }
        assert_eq!(v(&ApiVersion::NULL.to_string()), ApiVersion::NULL);
    }

    #[test]
    fn range_matching_honours_open_bounds() {
        let version = v("2.30");
        assert!(version.matches(v("2.0"), v("2.30")));
        assert!(version.matches(v("2.30"), ApiVersion::NULL));
        assert!(version.matches(ApiVersion::NULL, v("2.31")));
        assert!(version.matches(ApiVersion::NULL, ApiVersion::NULL));
        assert!(!version.matches(v("2.31"), ApiVersion::NULL));
        assert!(!version.matches(v("2.0"), v("2.29")));
    }

    #[test]
    fn legacy_versions_are_refused() {
        assert!(v("1.0").is_legacy());
        assert!(matches!(
            check_supported(v("1.0")),
            Err(SfsError::IncompatibleVersion(_))
        ));
        assert!(check_supported(v("2.0")).is_ok());
        assert!(check_supported(MAX_API_VERSION).is_ok());
        assert!(check_supported(v("2.999")).is_err());
        assert!(check_supported(v("3.0")).is_err());
    }

    #[test]
    fn negotiation_picks_highest_common_version() {
        let negotiated = negotiate(v("2.0"), v("2.84"), v("2.0"), v("2.65")).unwrap();
        assert_eq!(negotiated, v("2.65"));

        let negotiated = negotiate(v("2.0"), v("2.84"), v("2.0"), v("2.90")).unwrap();
        assert_eq!(negotiated, v("2.84"));
    }

    #[test]
    fn negotiation_fails_without_overlap() {
        assert!(negotiate(v("2.0"), v("2.40"), v("2.50"), v("2.90")).is_err());
        assert!(negotiate(v("2.0"), v("2.84"), ApiVersion::NULL, ApiVersion::NULL).is_err());
    }
}
