// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Which side of a node (or contract) a slot name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Input,
    Output,
    Parameter,
    Artifact,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SlotKind::Input => "input",
            SlotKind::Output => "output",
            SlotKind::Parameter => "parameter",
            SlotKind::Artifact => "artifact",
        };
        write!(f, "{}", label)
    }
}

/// A declared slot of a node.
///
/// `local` is the name the node function sees in its arguments and must use in
/// its outputs. `dataset` is the name the graph uses to connect producers to
/// consumers. The two start out equal; namespacing and overrides only ever
/// rewrite `dataset`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotBinding {
    pub local: String,
    pub dataset: String,
}

impl SlotBinding {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            local: name.clone(),
            dataset: name,
        }
    }

    pub(crate) fn rebind(&self, dataset: String) -> Self {
        Self {
            local: self.local.clone(),
            dataset,
        }
    }
}

/// A mapping of slot names, used both for namespace overrides
/// (`original -> replacement`) and for app contracts (`external -> internal`).
///
/// Converts from a single name or a list of names (identity mappings) as well
/// as from explicit pairs and maps, so call sites can read like
/// `.inputs("features_store")` or `.inputs([("features", "X_test")])`.
///
/// ```
/// use pipeline_boot::pipeline::SlotMapping;
///
/// let single = SlotMapping::from("pi");
/// assert_eq!(single.get("pi"), Some("pi"));
///
/// let renamed = SlotMapping::from([("features", "X_test")]);
/// assert_eq!(renamed.get("features"), Some("X_test"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotMapping(BTreeMap<String, String>);

impl SlotMapping {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Map each name to itself.
    pub fn identity<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            names
                .into_iter()
                .map(|n| {
                    let n = n.into();
                    (n.clone(), n)
                })
                .collect(),
        )
    }

    pub fn with(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.0.insert(from.into(), to.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for SlotMapping {
    fn from(name: &str) -> Self {
        Self::identity([name])
    }
}

impl From<String> for SlotMapping {
    fn from(name: String) -> Self {
        Self::identity([name])
    }
}

impl From<Vec<&str>> for SlotMapping {
    fn from(names: Vec<&str>) -> Self {
        Self::identity(names)
    }
}

impl From<Vec<String>> for SlotMapping {
    fn from(names: Vec<String>) -> Self {
        Self::identity(names)
    }
}

impl<const N: usize> From<[&str; N]> for SlotMapping {
    fn from(names: [&str; N]) -> Self {
        Self::identity(names)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for SlotMapping {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl From<Vec<(&str, &str)>> for SlotMapping {
    fn from(pairs: Vec<(&str, &str)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for SlotMapping {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl From<HashMap<String, String>> for SlotMapping {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map.into_iter().collect())
    }
}
