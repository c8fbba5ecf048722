//! # Versioned Dispatch
//!
//! One logical operation ("create share", "get quotas", ...) may have several
//! implementations, each valid for a range of API versions. The [`Registry`]
//! holds those candidates and [`Registry::resolve`] picks the one whose range
//! contains the negotiated version.
//!
//! ## Registration
//!
//! Registries are built explicitly through a [`RegistryBuilder`] during client
//! construction, so the contents never depend on module load order. Ranges are
//! inclusive on both ends; a null bound leaves that side open.
//!
//! Overlapping ranges for one operation are rejected when registered. With
//! disjoint ranges at most one candidate can match any version, which keeps
//! resolution independent of registration order.
//!
//! ## Experimental candidates
//!
//! A candidate can be marked experimental. Resolution does not hide it; the
//! flag is metadata that callers surface (help text, warnings, the
//! experimental request header).

use crate::error::{Result, SfsError};
use crate::version::ApiVersion;
use std::collections::BTreeMap;

/// One implementation of an operation together with the versions it serves.
#[derive(Debug, Clone)]
pub struct VersionedMethod<F> {
    pub name: &'static str,
    pub start: ApiVersion,
    pub end: ApiVersion,
    pub func: F,
    pub experimental: bool,
}

impl<F> VersionedMethod<F> {
    pub fn covers(&self, version: ApiVersion) -> bool {
        version.matches(self.start, self.end)
    }

    fn overlaps(&self, start: ApiVersion, end: ApiVersion) -> bool {
        let begins_before_other_ends = end.is_null() || self.start.is_null() || self.start <= end;
        let other_begins_before_end = self.end.is_null() || start.is_null() || start <= self.end;
        begins_before_other_ends && other_begins_before_end
    }

    /// Human readable range, e.g. `2.7..=2.38` or `2.81..`.
    pub fn range(&self) -> String {
        describe_range(self.start, self.end)
    }
}

fn describe_range(start: ApiVersion, end: ApiVersion) -> String {
    let low = if start.is_null() {
        String::new()
    } else {
        start.to_string()
    };
    if end.is_null() {
        format!("{}..", low)
    } else {
        format!("{}..={}", low, end)
    }
}

/// Immutable table of versioned candidates keyed by operation name.
#[derive(Debug, Clone)]
pub struct Registry<F> {
    methods: BTreeMap<&'static str, Vec<VersionedMethod<F>>>,
}

impl<F> Registry<F> {
    pub fn builder() -> RegistryBuilder<F> {
        RegistryBuilder {
            methods: BTreeMap::new(),
        }
    }

    /// Selects the candidate of `name` valid at `version`.
    pub fn resolve(&self, name: &str, version: ApiVersion) -> Result<&VersionedMethod<F>> {
        self.candidates(name)
            .iter()
            .find(|method| method.covers(version))
            .ok_or_else(|| SfsError::UnsupportedVersion {
                operation: name.to_string(),
                version,
            })
    }

    /// Candidates for `name`, ordered by start version.
    pub fn candidates(&self, name: &str) -> &[VersionedMethod<F>] {
        self.methods.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn operations(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.methods.keys().copied()
    }

    /// True when any candidate of `name` is experimental.
    pub fn is_experimental(&self, name: &str) -> bool {
        self.candidates(name).iter().any(|m| m.experimental)
    }

    /// True when the candidate serving `version` is experimental.
    pub fn is_experimental_at(&self, name: &str, version: ApiVersion) -> bool {
        self.resolve(name, version)
            .map(|m| m.experimental)
            .unwrap_or(false)
    }
}

/// Collects candidates before freezing them into a [`Registry`].
#[derive(Debug)]
pub struct RegistryBuilder<F> {
    methods: BTreeMap<&'static str, Vec<VersionedMethod<F>>>,
}

impl<F> RegistryBuilder<F> {
    /// Registers `func` for `name` over `start..=end` (`end = None` is unbounded).
    pub fn register(
        &mut self,
        name: &'static str,
        start: &str,
        end: Option<&str>,
        func: F,
    ) -> Result<&mut Self> {
        self.add(name, start, end, func, false)
    }

    pub fn register_experimental(
        &mut self,
        name: &'static str,
        start: &str,
        end: Option<&str>,
        func: F,
    ) -> Result<&mut Self> {
        self.add(name, start, end, func, true)
    }

    fn add(
        &mut self,
        name: &'static str,
        start: &str,
        end: Option<&str>,
        func: F,
        experimental: bool,
    ) -> Result<&mut Self> {
        let start = ApiVersion::parse(start)?;
        let end = match end {
            Some(text) => ApiVersion::parse(text)?,
            None => ApiVersion::NULL,
        };

        let candidates = self.methods.entry(name).or_default();
        if let Some(existing) = candidates.iter().find(|m| m.overlaps(start, end)) {
            return Err(SfsError::OverlappingVersions {
                operation: name.to_string(),
                existing: existing.range(),
                new: describe_range(start, end),
            });
        }

        candidates.push(VersionedMethod {
            name,
            start,
            end,
            func,
            experimental,
        });
        Ok(self)
    }

    pub fn build(mut self) -> Registry<F> {
        for candidates in self.methods.values_mut() {
            candidates.sort_by_key(|m| m.start);
        }
        Registry {
            methods: self.methods,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ApiVersion {
        ApiVersion::parse(s).unwrap()
    }

    fn quota_registry() -> Registry<&'static str> {
        let mut builder = Registry::builder();
        builder
            .register("quotas.get", "2.0", Some("2.6"), "legacy")
            .unwrap()
            .register("quotas.get", "2.7", Some("2.38"), "current")
            .unwrap()
            .register("quotas.get", "2.39", None, "share-type-aware")
            .unwrap()
            .register_experimental("servers.migrate", "2.57", None, "migrate")
            .unwrap();
        builder.build()
    }

    #[test]
    fn resolves_every_version_inside_each_range() {
        let registry = quota_registry();
        let ranges = [(0, 6, "legacy"), (7, 38, "current"), (39, 120, "share-type-aware")];
        for (low, high, expected) in ranges {
            for minor in low..=high {
                let version = ApiVersion::new(2, minor);
                let method = registry.resolve("quotas.get", version).unwrap();
                assert_eq!(method.func, expected, "at {version}");
            }
        }
    }

    #[test]
    fn versions_outside_all_ranges_are_unsupported() {
        let registry = quota_registry();
        for minor in 0..57 {
            let err = registry
                .resolve("servers.migrate", ApiVersion::new(2, minor))
                .unwrap_err();
            assert!(matches!(err, SfsError::UnsupportedVersion { .. }));
        }
        assert!(registry.resolve("quotas.get", v("1.0")).is_err());
    }

    #[test]
    fn unknown_operation_is_unsupported() {
        let registry = quota_registry();
        let err = registry.resolve("shares.teleport", v("2.7")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Operation 'shares.teleport' is not supported at API version 2.7"
        );
    }

    #[test]
    fn tracks_experimental_candidates() {
        let registry = quota_registry();
        assert!(registry.is_experimental("servers.migrate"));
        assert!(!registry.is_experimental("quotas.get"));
        assert!(registry.is_experimental_at("servers.migrate", v("2.60")));
        assert!(!registry.is_experimental_at("servers.migrate", v("2.50")));
    }

    #[test]
    fn rejects_overlapping_ranges() {
        let mut builder = Registry::builder();
        builder.register("shares.create", "2.0", Some("2.30"), 1).unwrap();

        let err = builder
            .register("shares.create", "2.30", None, 2)
            .unwrap_err();
        assert!(matches!(err, SfsError::OverlappingVersions { .. }));

        let err = builder
            .register("shares.create", "1.5", Some("2.0"), 3)
            .unwrap_err();
        assert!(matches!(err, SfsError::OverlappingVersions { .. }));

        builder.register("shares.create", "2.31", None, 4).unwrap();
        let err = builder
            .register("shares.create", "2.90", Some("2.95"), 5)
            .unwrap_err();
        assert!(matches!(err, SfsError::OverlappingVersions { .. }));
    }

    #[test]
    fn open_ranges_overlap_everything_on_their_side() {
        let mut builder = Registry::builder();
        builder.register("op", "null", Some("2.10"), 1).unwrap();
        assert!(builder.register("op", "2.0", Some("2.1"), 2).is_err());
        builder.register("op", "2.11", None, 3).unwrap();

        let registry = builder.build();
        assert_eq!(registry.resolve("op", v("1.0")).unwrap().func, 1);
        assert_eq!(registry.resolve("op", v("9.9")).unwrap().func, 3);
    }

    #[test]
    fn candidates_are_ordered_by_start_version() {
        let mut builder = Registry::builder();
        builder
            .register("op", "2.40", None, "late")
            .unwrap()
            .register("op", "2.0", Some("2.39"), "early")
            .unwrap();
        let registry = builder.build();
        let order: Vec<_> = registry.candidates("op").iter().map(|m| m.func).collect();
        assert_eq!(order, vec!["early", "late"]);
        assert_eq!(registry.candidates("op")[0].range(), "2.0..=2.39");
        assert_eq!(registry.candidates("op")[1].range(), "2.40..");
    }

    #[test]
    fn registration_reports_bad_version_strings() {
        let mut builder: RegistryBuilder<u8> = Registry::builder();
        assert!(matches!(
            builder.register("op", "2", None, 0),
            Err(SfsError::InvalidVersionFormat(_))
        ));
    }
}
