use crate::error::Error;
use serde::Serialize;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// A single template variable: either a scalar string or a nested level of variables.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Variable {
    Scalar(String),
    Nested(VariableTree),
}

impl Variable {
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Variable::Scalar(value) => Some(value),
            Variable::Nested(_) => None,
        }
    }
}

impl From<&str> for Variable {
    fn from(value: &str) -> Self {
        Variable::Scalar(value.to_string())
    }
}

impl From<VariableTree> for Variable {
    fn from(tree: VariableTree) -> Self {
        Variable::Nested(tree)
    }
}

/// The nested key/value structure merged into a template at render time.
///
/// Keys are case-sensitive and unique within a level. A key holds either a
/// [`Variable::Scalar`] or a [`Variable::Nested`] tree, never both.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct VariableTree {
    entries: BTreeMap<String, Variable>,
}

impl VariableTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from raw query string pairs.
    ///
    /// When a key repeats only its first value is used. Keys without a `.` are bound at the top
    /// level, dotted keys are split into nested levels (see [`VariableTree::insert_dotted`]).
    /// The result doesn't depend on the order of distinct keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParamCollision`] if one key descends through another key's scalar
    /// value, and [`Error::InvalidParamKey`] if a key has an empty segment.
    pub fn from_query<I, K, V>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut first_values: BTreeMap<String, String> = BTreeMap::new();
        for (key, value) in pairs {
            first_values.entry(key.into()).or_insert_with(|| value.into());
        }

        let mut tree = Self::new();
        for (key, value) in first_values {
            tracing::trace!("query variable {key}={value}");
            tree.insert_dotted(&key, value)?;
        }
        Ok(tree)
    }

    /// Bind `value` under a `.` delimited key, creating or descending into nested levels for
    /// every segment but the last.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParamCollision`] if an intermediate segment is already bound to a scalar,
    /// or if the final segment is already bound. Returns [`Error::InvalidParamKey`] for keys
    /// with an empty segment.
    pub fn insert_dotted(&mut self, key: &str, value: impl Into<String>) -> Result<(), Error> {
        let segments: Vec<&str> = key.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(Error::InvalidParamKey(key.to_string()));
        }
        let Some((leaf, parents)) = segments.split_last() else {
            return Err(Error::InvalidParamKey(key.to_string()));
        };

        let mut level = self;
        for segment in parents {
            let entry = level
                .entries
                .entry((*segment).to_string())
                .or_insert_with(|| Variable::Nested(VariableTree::new()));
            level = match entry {
                Variable::Nested(tree) => tree,
                Variable::Scalar(_) => return Err(Error::ParamCollision(key.to_string())),
            };
        }

        match level.entries.entry((*leaf).to_string()) {
            btree_map::Entry::Occupied(_) => Err(Error::ParamCollision(key.to_string())),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(Variable::Scalar(value.into()));
                Ok(())
            }
        }
    }

    /// Bind a top-level scalar, replacing whatever was bound under `key` before.
    pub fn set_scalar(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .insert(key.into(), Variable::Scalar(value.into()));
    }

    /// Layer `higher` on top of this tree. On a key collision at the same level the value from
    /// `higher` wins, except when both sides hold a nested tree: those are merged recursively
    /// under the same rule.
    pub fn merge(&mut self, higher: VariableTree) {
        for (key, value) in higher.entries {
            match value {
                Variable::Nested(higher_tree) => {
                    if let Some(Variable::Nested(lower_tree)) = self.entries.get_mut(&key) {
                        lower_tree.merge(higher_tree);
                        continue;
                    }
                    self.entries.insert(key, Variable::Nested(higher_tree));
                }
                scalar @ Variable::Scalar(_) => {
                    self.entries.insert(key, scalar);
                }
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Variable> {
        self.entries.get(key)
    }

    /// Resolve a `.` delimited path, e.g. `net.eth0.ip`.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Variable> {
        let mut segments = path.split('.');
        let mut current = self.entries.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Variable::Nested(tree) => tree.entries.get(segment)?,
                Variable::Scalar(_) => return None,
            };
        }
        Some(current)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Variable)> {
        self.entries.iter()
    }
}

/// Collects flat name/value pairs (e.g. mapping rule params) into top-level scalars.
impl<K, V> FromIterator<(K, V)> for VariableTree
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        for (key, value) in iter {
            tree.set_scalar(key, value);
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn nested(pairs: &[(&str, Variable)]) -> Variable {
        let mut tree = VariableTree::new();
        for (key, value) in pairs {
            tree.entries.insert((*key).to_string(), value.clone());
        }
        Variable::Nested(tree)
    }

    #[test]
    fn flat_and_dotted_keys_get_one_entry_each() {
        let tree = VariableTree::from_query([
            ("mac", "52:54:00:12:34:56"),
            ("disk.root", "/dev/sda"),
            ("net.eth0.ip", "10.0.0.2"),
        ])
        .unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get("mac"), Some(&"52:54:00:12:34:56".into()));
        assert_eq!(
            tree.get("disk"),
            Some(&nested(&[("root", "/dev/sda".into())]))
        );
        assert_eq!(
            tree.get("net"),
            Some(&nested(&[("eth0", nested(&[("ip", "10.0.0.2".into())]))]))
        );
        assert!(tree.get("net.eth0.ip").is_none());
    }

    #[test]
    fn shared_prefixes_merge_into_one_nested_level() {
        let tree = VariableTree::from_query([("a.b.c", "1"), ("a.b.d", "2")]).unwrap();

        let expected = nested(&[("b", nested(&[("c", "1".into()), ("d", "2".into())]))]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get("a"), Some(&expected));
        assert_eq!(tree.lookup("a.b.d").and_then(Variable::as_scalar), Some("2"));
    }

    #[test]
    fn key_order_does_not_change_the_tree() {
        let pairs = vec![
            ("a.b.c", "1"),
            ("a.b.d", "2"),
            ("a.e", "3"),
            ("f", "4"),
            ("g.h", "5"),
        ];
        let expected = VariableTree::from_query(pairs.clone()).unwrap();

        for shift in 0..pairs.len() {
            let mut rotated = pairs.clone();
            rotated.rotate_left(shift);
            assert_eq!(VariableTree::from_query(rotated.clone()).unwrap(), expected);
            rotated.reverse();
            assert_eq!(VariableTree::from_query(rotated).unwrap(), expected);
        }
    }

    #[test]
    fn repeated_key_keeps_first_value() {
        let tree = VariableTree::from_query([("env", "prod"), ("env", "staging")]).unwrap();
        assert_eq!(tree.get("env"), Some(&"prod".into()));
    }

    #[test]
    fn descending_through_scalar_is_rejected_in_any_order() {
        for pairs in [
            vec![("net", "eth0"), ("net.ip", "10.0.0.2")],
            vec![("net.ip", "10.0.0.2"), ("net", "eth0")],
            vec![("a.b", "1"), ("a.b.c", "2")],
            vec![("a.b.c", "2"), ("a.b", "1")],
        ] {
            let err = VariableTree::from_query(pairs).unwrap_err();
            assert!(matches!(err, Error::ParamCollision(_)), "{err:?}");
        }
    }

    #[test]
    fn empty_segments_are_rejected() {
        for key in ["a..b", ".a", "a.", "."] {
            let err = VariableTree::from_query([(key, "x")]).unwrap_err();
            assert!(matches!(err, Error::InvalidParamKey(ref k) if k == key), "{err:?}");
        }
    }

    #[test]
    fn merge_prefers_higher_layer_and_recurses_into_nested() {
        let mut lower = VariableTree::from_query([
            ("env", "staging"),
            ("net.gw", "10.0.0.1"),
            ("net.ip", "10.0.0.9"),
            ("kernel", "vmlinuz"),
        ])
        .unwrap();
        let higher =
            VariableTree::from_query([("env", "prod"), ("net.ip", "10.0.0.2")]).unwrap();

        lower.merge(higher);

        let expected = VariableTree::from_query([
            ("env", "prod"),
            ("net.gw", "10.0.0.1"),
            ("net.ip", "10.0.0.2"),
            ("kernel", "vmlinuz"),
        ])
        .unwrap();
        assert_eq!(lower, expected);
    }

    #[test]
    fn merge_replaces_scalar_with_nested_and_back() {
        let mut lower: VariableTree = [("net", "dhcp")].into_iter().collect();
        lower.merge(VariableTree::from_query([("net.ip", "10.0.0.2")]).unwrap());
        assert_eq!(lower.lookup("net.ip").and_then(Variable::as_scalar), Some("10.0.0.2"));

        lower.merge([("net", "dhcp")].into_iter().collect());
        assert_eq!(lower.get("net"), Some(&"dhcp".into()));
    }

    #[test]
    fn serializes_as_plain_json_object() {
        let tree = VariableTree::from_query([("a.b", "1"), ("c", "2")]).unwrap();
        assert_eq!(
            serde_json::to_string(&tree).unwrap(),
            r#"{"a":{"b":"1"},"c":"2"}"#
        );
    }
}
