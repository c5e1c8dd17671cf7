//! In-memory result bundles
//!
//! A bundle is an insertion-ordered mapping from key to value. Values are
//! numeric arrays of any dimension (0-d arrays are scalars), text, or nested
//! bundles. The archive format is flat, so nested bundles are flattened to
//! `"<group>.<field>"` keys before persistence.

use ndarray::{Array, ArrayD, Dimension, IxDyn};

/// Separator between group and field in flattened keys
pub const KEY_SEPARATOR: char = '.';

/// One value in a result bundle
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveValue {
    Float(ArrayD<f64>),
    Int(ArrayD<i64>),
    Bool(ArrayD<bool>),
    Text(String),
    Group(ResultBundle),
}

impl ArchiveValue {
    /// True for 0-d numeric arrays
    pub fn is_scalar(&self) -> bool {
        match self {
            ArchiveValue::Float(a) => a.ndim() == 0,
            ArchiveValue::Int(a) => a.ndim() == 0,
            ArchiveValue::Bool(a) => a.ndim() == 0,
            ArchiveValue::Text(_) | ArchiveValue::Group(_) => false,
        }
    }

    pub fn shape(&self) -> Option<&[usize]> {
        match self {
            ArchiveValue::Float(a) => Some(a.shape()),
            ArchiveValue::Int(a) => Some(a.shape()),
            ArchiveValue::Bool(a) => Some(a.shape()),
            ArchiveValue::Text(_) | ArchiveValue::Group(_) => None,
        }
    }

    pub fn as_float(&self) -> Option<&ArrayD<f64>> {
        match self {
            ArchiveValue::Float(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&ArrayD<i64>> {
        match self {
            ArchiveValue::Int(a) => Some(a),
            _ => None,
        }
    }

    /// Scalar value of a 0-d float array
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArchiveValue::Float(a) if a.ndim() == 0 => a.first().copied(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArchiveValue::Bool(a) if a.ndim() == 0 => a.first().copied(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArchiveValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&ResultBundle> {
        match self {
            ArchiveValue::Group(b) => Some(b),
            _ => None,
        }
    }
}

impl<D: Dimension> From<Array<f64, D>> for ArchiveValue {
    fn from(a: Array<f64, D>) -> Self {
        ArchiveValue::Float(a.into_dyn())
    }
}

impl<D: Dimension> From<Array<i64, D>> for ArchiveValue {
    fn from(a: Array<i64, D>) -> Self {
        ArchiveValue::Int(a.into_dyn())
    }
}

impl<D: Dimension> From<Array<bool, D>> for ArchiveValue {
    fn from(a: Array<bool, D>) -> Self {
        ArchiveValue::Bool(a.into_dyn())
    }
}

impl From<f64> for ArchiveValue {
    fn from(v: f64) -> Self {
        ArchiveValue::Float(ArrayD::from_elem(IxDyn(&[]), v))
    }
}

impl From<i64> for ArchiveValue {
    fn from(v: i64) -> Self {
        ArchiveValue::Int(ArrayD::from_elem(IxDyn(&[]), v))
    }
}

impl From<bool> for ArchiveValue {
    fn from(v: bool) -> Self {
        ArchiveValue::Bool(ArrayD::from_elem(IxDyn(&[]), v))
    }
}

impl From<&str> for ArchiveValue {
    fn from(v: &str) -> Self {
        ArchiveValue::Text(v.to_string())
    }
}

impl From<String> for ArchiveValue {
    fn from(v: String) -> Self {
        ArchiveValue::Text(v)
    }
}

impl From<ResultBundle> for ArchiveValue {
    fn from(b: ResultBundle) -> Self {
        ArchiveValue::Group(b)
    }
}

/// Insertion-ordered key/value bundle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultBundle {
    entries: Vec<(String, ArchiveValue)>,
}

impl ResultBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ArchiveValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ArchiveValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ArchiveValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArchiveValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten nested groups to `"<group>.<field>"` keys, recursively.
    pub fn flatten(&self) -> ResultBundle {
        let mut flat = ResultBundle::new();
        self.flatten_into("", &mut flat);
        flat
    }

    fn flatten_into(&self, prefix: &str, out: &mut ResultBundle) {
        for (key, value) in &self.entries {
            let full = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}{}{}", prefix, KEY_SEPARATOR, key)
            };
            match value {
                ArchiveValue::Group(inner) => inner.flatten_into(&full, out),
                other => out.insert(full, other.clone()),
            }
        }
    }

    /// Rebuild one level of nesting from flattened keys.
    ///
    /// Keys split on their last separator, so group names may contain `.`
    /// while field names may not. Keys without a separator stay top-level.
    pub fn nest(&self) -> ResultBundle {
        let mut nested = ResultBundle::new();
        for (key, value) in &self.entries {
            match key.rsplit_once(KEY_SEPARATOR) {
                Some((group, field)) if !group.is_empty() && !field.is_empty() => {
                    let mut inner = match nested.get(group) {
                        Some(ArchiveValue::Group(b)) => b.clone(),
                        _ => ResultBundle::new(),
                    };
                    inner.insert(field, value.clone());
                    nested.insert(group, ArchiveValue::Group(inner));
                }
                _ => nested.insert(key.clone(), value.clone()),
            }
        }
        nested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_insert_keeps_order() {
        let mut b = ResultBundle::new();
        b.insert("z", 1.0);
        b.insert("a", 2i64);
        b.insert("z", 3.0);
        assert_eq!(b.keys().collect::<Vec<_>>(), vec!["z", "a"]);
        assert_eq!(b.get("z").unwrap().as_f64(), Some(3.0));
    }

    #[test]
    fn test_scalar_vs_array() {
        assert!(ArchiveValue::from(1.5).is_scalar());
        assert!(!ArchiveValue::from(arr1(&[1.5])).is_scalar());
        assert_eq!(ArchiveValue::from(arr2(&[[1.0, 2.0]])).shape(), Some(&[1, 2][..]));
        assert_eq!(ArchiveValue::from(true).as_bool(), Some(true));
    }

    #[test]
    fn test_flatten_and_nest() {
        let fridge = ResultBundle::new()
            .with("appliance_name", "Fridge")
            .with("scales", arr1(&[1.0, 2.0]));
        let all = ResultBundle::new()
            .with("Fridge", fridge.clone())
            .with("version", 1i64);

        let flat = all.flatten();
        assert_eq!(
            flat.keys().collect::<Vec<_>>(),
            vec!["Fridge.appliance_name", "Fridge.scales", "version"]
        );
        assert_eq!(flat.nest(), all);
    }

    #[test]
    fn test_nest_with_dotted_group() {
        let flat = ResultBundle::new().with("Fan v1.2.time", arr1(&[0.0, 0.1]));
        let nested = flat.nest();
        let group = nested.get("Fan v1.2").and_then(ArchiveValue::as_group).unwrap();
        assert!(group.contains_key("time"));
    }
}
