use crate::catalog::model::{UpdateCatalog, UpdateRecord};
use crate::catalog::version::Version;
use crate::error::Result;
use std::fmt;

/// Which catalog entries are eligible when looking for updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionPolicy {
    /// Target the package's stable marker; deltas beyond it are ignored.
    #[default]
    Stable,
    /// Target the highest `to` of any delta.
    Experimental,
}

impl ResolutionPolicy {
    pub fn from_experimental_flag(experimental: bool) -> Self {
        if experimental {
            ResolutionPolicy::Experimental
        } else {
            ResolutionPolicy::Stable
        }
    }
}

impl fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionPolicy::Stable => f.write_str("stable"),
            ResolutionPolicy::Experimental => f.write_str("experimental"),
        }
    }
}

/// One delta to download and apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStep {
    pub from: Version,
    pub to: Version,
}

impl fmt::Display for UpdateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Steps ordered by `from`; each step starts where the previous one ended.
pub type UpdateChain = Vec<UpdateStep>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Target version, `None` when the catalog names none for the policy.
    pub latest: Option<Version>,
    pub chain: UpdateChain,
}

impl Resolution {
    pub fn is_up_to_date(&self) -> bool {
        self.chain.is_empty()
    }
}

/// Compute the target version of `package` and the deltas leading to it.
///
/// The walk is greedy: from the current version it always takes the delta
/// that jumps furthest without passing the target, and it never backtracks.
/// A version with no eligible outgoing delta ends the chain, even when a
/// different earlier hop would have reached the target. This matches the
/// vendor catalog, which publishes a single monotone chain per branch.
///
/// An unreachable `from` is not an error; it yields an empty chain.
pub fn resolve(
    catalog: &UpdateCatalog,
    package: &str,
    from: &Version,
    policy: ResolutionPolicy,
) -> Result<Resolution> {
    let records = catalog.records(package)?;
    let latest = latest_version(records, policy);

    let mut chain = UpdateChain::new();
    if let Some(latest) = &latest {
        let mut current = from.clone();
        // Steps carry the catalog's spelling, the service expects it back
        while let Some((hop_from, hop_to)) = furthest_hop(records, &current, latest) {
            chain.push(UpdateStep {
                from: hop_from.clone(),
                to: hop_to.clone(),
            });
            current = hop_to.clone();
        }
    }

    chain.sort_by(|a, b| a.from.cmp(&b.from));

    tracing::debug!(
        package,
        %from,
        %policy,
        latest = ?latest.as_ref().map(Version::as_str),
        steps = chain.len(),
        "resolved update chain"
    );

    Ok(Resolution { latest, chain })
}

fn latest_version(records: &[UpdateRecord], policy: ResolutionPolicy) -> Option<Version> {
    match policy {
        ResolutionPolicy::Stable => records
            .iter()
            .filter_map(UpdateRecord::as_stable)
            .fold(None, |chosen, candidate| {
                pick_stable_marker(chosen, candidate)
            })
            .cloned(),
        ResolutionPolicy::Experimental => records
            .iter()
            .filter_map(UpdateRecord::as_delta)
            .map(|(_, to)| to)
            .fold(None, |best: Option<&Version>, to| best.max(Some(to)))
            .cloned(),
    }
}

/// Decide between the marker chosen so far and the next one in catalog order.
///
/// Last one wins, regardless of version.
fn pick_stable_marker<'a>(
    _chosen: Option<&'a Version>,
    candidate: &'a Version,
) -> Option<&'a Version> {
    Some(candidate)
}

/// Delta leaving `current` with the highest `to` that stays within `latest`.
fn furthest_hop<'a>(
    records: &'a [UpdateRecord],
    current: &Version,
    latest: &Version,
) -> Option<(&'a Version, &'a Version)> {
    records
        .iter()
        .filter_map(UpdateRecord::as_delta)
        .filter(|(from, to)| *from == current && *to <= latest && *to > current)
        .max_by(|(_, a), (_, b)| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpdaterError;

    const PACKAGE: &str = "core-linux_headless64";

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn catalog(records: &str) -> UpdateCatalog {
        UpdateCatalog::from_json(&format!(r#"{{"{PACKAGE}": [{records}]}}"#)).unwrap()
    }

    fn steps(resolution: &Resolution) -> Vec<(String, String)> {
        resolution
            .chain
            .iter()
            .map(|s| (s.from.to_string(), s.to.to_string()))
            .collect()
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn stable_policy_excludes_deltas_beyond_marker() {
        let catalog = catalog(
            r#"{"stable": "1.5.0"},
               {"from": "1.4.0", "to": "1.5.0"},
               {"from": "1.5.0", "to": "1.6.0"}"#,
        );

        let resolution = resolve(&catalog, PACKAGE, &v("1.4.0"), ResolutionPolicy::Stable).unwrap();

        assert_eq!(resolution.latest, Some(v("1.5.0")));
        assert_eq!(steps(&resolution), pairs(&[("1.4.0", "1.5.0")]));
    }

    #[test]
    fn experimental_policy_follows_all_deltas() {
        let catalog = catalog(
            r#"{"stable": "1.5.0"},
               {"from": "1.4.0", "to": "1.5.0"},
               {"from": "1.5.0", "to": "1.6.0"}"#,
        );

        let resolution =
            resolve(&catalog, PACKAGE, &v("1.4.0"), ResolutionPolicy::Experimental).unwrap();

        assert_eq!(resolution.latest, Some(v("1.6.0")));
        assert_eq!(
            steps(&resolution),
            pairs(&[("1.4.0", "1.5.0"), ("1.5.0", "1.6.0")])
        );
    }

    #[test]
    fn greedy_walk_stops_at_dead_end() {
        let catalog = catalog(
            r#"{"stable": "1.3"},
               {"from": "1.0", "to": "1.2"},
               {"from": "1.0", "to": "1.1"},
               {"from": "1.1", "to": "1.3"}"#,
        );

        for policy in [ResolutionPolicy::Stable, ResolutionPolicy::Experimental] {
            let resolution = resolve(&catalog, PACKAGE, &v("1.0"), policy).unwrap();
            assert_eq!(resolution.latest, Some(v("1.3")));
            assert_eq!(steps(&resolution), pairs(&[("1.0", "1.2")]));
        }
    }

    #[test]
    fn experimental_without_deltas_has_no_latest() {
        let catalog = catalog(r#"{"stable": "1.1.0"}"#);

        let resolution =
            resolve(&catalog, PACKAGE, &v("1.0.0"), ResolutionPolicy::Experimental).unwrap();

        assert_eq!(resolution.latest, None);
        assert!(resolution.is_up_to_date());
    }

    #[test]
    fn stable_without_marker_has_no_latest() {
        let catalog = catalog(r#"{"from": "1.0.0", "to": "1.1.0"}"#);

        let resolution = resolve(&catalog, PACKAGE, &v("1.0.0"), ResolutionPolicy::Stable).unwrap();

        assert_eq!(resolution.latest, None);
        assert!(resolution.chain.is_empty());
    }

    #[test]
    fn already_at_latest_yields_empty_chain() {
        let catalog = catalog(
            r#"{"from": "1.0.0", "to": "1.1.0"},
               {"stable": "1.1.0"}"#,
        );

        for policy in [ResolutionPolicy::Stable, ResolutionPolicy::Experimental] {
            let resolution = resolve(&catalog, PACKAGE, &v("1.1.0"), policy).unwrap();
            assert_eq!(resolution.latest, Some(v("1.1.0")));
            assert!(resolution.is_up_to_date());
        }
    }

    #[test]
    fn unreachable_start_yields_empty_chain() {
        let catalog = catalog(
            r#"{"from": "1.0.0", "to": "1.1.0"},
               {"stable": "1.1.0"}"#,
        );

        let resolution = resolve(&catalog, PACKAGE, &v("0.9.0"), ResolutionPolicy::Stable).unwrap();

        assert_eq!(resolution.latest, Some(v("1.1.0")));
        assert!(resolution.chain.is_empty());
    }

    #[test]
    fn last_stable_marker_wins() {
        let catalog = catalog(
            r#"{"stable": "1.2.0"},
               {"stable": "1.1.0"},
               {"from": "1.0.0", "to": "1.1.0"},
               {"from": "1.1.0", "to": "1.2.0"}"#,
        );

        let resolution = resolve(&catalog, PACKAGE, &v("1.0.0"), ResolutionPolicy::Stable).unwrap();

        assert_eq!(resolution.latest, Some(v("1.1.0")));
        assert_eq!(steps(&resolution), pairs(&[("1.0.0", "1.1.0")]));
    }

    #[test]
    fn chain_is_contiguous_and_increasing() {
        let catalog = catalog(
            r#"{"from": "1.1.3", "to": "1.1.4"},
               {"from": "1.1.0", "to": "1.1.1"},
               {"from": "1.1.2", "to": "1.1.3"},
               {"from": "1.1.1", "to": "1.1.2"},
               {"from": "1.1.1", "to": "1.1.3"},
               {"from": "1.1.4", "to": "1.1.10"},
               {"stable": "1.1.10"}"#,
        );

        let resolution = resolve(&catalog, PACKAGE, &v("1.1.0"), ResolutionPolicy::Stable).unwrap();

        assert_eq!(
            steps(&resolution),
            pairs(&[
                ("1.1.0", "1.1.1"),
                ("1.1.1", "1.1.3"),
                ("1.1.3", "1.1.4"),
                ("1.1.4", "1.1.10"),
            ])
        );
        for step in &resolution.chain {
            assert!(step.to > step.from);
        }
        for pair in resolution.chain.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
        }
    }

    #[test]
    fn ignores_self_loops_and_downgrades() {
        let catalog = catalog(
            r#"{"from": "1.0.0", "to": "1.0.0"},
               {"from": "1.0.0", "to": "0.9.0"},
               {"from": "1.0.0", "to": "1.0.1"},
               {"stable": "1.0.1"}"#,
        );

        let resolution = resolve(&catalog, PACKAGE, &v("1.0.0"), ResolutionPolicy::Stable).unwrap();

        assert_eq!(steps(&resolution), pairs(&[("1.0.0", "1.0.1")]));
    }

    #[test]
    fn start_version_matches_across_arity() {
        let catalog = catalog(
            r#"{"from": "1.1.0", "to": "1.2.0"},
               {"stable": "1.2.0"}"#,
        );

        let resolution = resolve(&catalog, PACKAGE, &v("1.1"), ResolutionPolicy::Stable).unwrap();

        assert_eq!(steps(&resolution), pairs(&[("1.1.0", "1.2.0")]));
    }

    #[test]
    fn steps_use_catalog_spelling_of_start_version() {
        let catalog = catalog(
            r#"{"from": "1.1.100", "to": "1.1.101"},
               {"stable": "1.1.101"}"#,
        );

        for start in ["1.1.100", "01.1.100", "1.1.100.0"] {
            let resolution =
                resolve(&catalog, PACKAGE, &v(start), ResolutionPolicy::Stable).unwrap();
            assert_eq!(
                steps(&resolution),
                pairs(&[("1.1.100", "1.1.101")]),
                "starting from {start}"
            );
        }
    }

    #[test]
    fn unknown_package_is_reported() {
        let catalog = catalog(r#"{"stable": "1.0.0"}"#);

        let err = resolve(&catalog, "core-mac", &v("1.0.0"), ResolutionPolicy::Stable).unwrap_err();

        assert!(matches!(err, UpdaterError::UnknownPackage(_)));
    }
}
