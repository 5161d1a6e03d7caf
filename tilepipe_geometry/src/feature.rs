use crate::Geometry;
use serde::Deserialize;
use std::{cmp::Ordering, collections::BTreeMap, fmt};

/// A single attribute value.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
	Null,
	Bool(bool),
	Int(i64),
	Double(f64),
	String(String),
	Object(Attributes),
}

impl AttributeValue {
	#[must_use]
	pub fn is_null(&self) -> bool {
		matches!(self, AttributeValue::Null)
	}

	#[must_use]
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			AttributeValue::Int(v) => Some(*v as f64),
			AttributeValue::Double(v) => Some(*v),
			_ => None,
		}
	}

	/// Compare two values of compatible kinds.
	///
	/// Integers and doubles compare numerically with each other, strings
	/// lexically and booleans with `false < true`. Everything else, including
	/// `Null`, is incomparable.
	#[must_use]
	pub fn compare(&self, other: &AttributeValue) -> Option<Ordering> {
		use AttributeValue::*;
		match (self, other) {
			(Int(a), Int(b)) => Some(a.cmp(b)),
			(Int(_) | Double(_), Int(_) | Double(_)) => self.as_f64()?.partial_cmp(&other.as_f64()?),
			(String(a), String(b)) => Some(a.cmp(b)),
			(Bool(a), Bool(b)) => Some(a.cmp(b)),
			_ => None,
		}
	}
}

impl fmt::Display for AttributeValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AttributeValue::Null => f.write_str("NULL"),
			AttributeValue::Bool(v) => write!(f, "{v}"),
			AttributeValue::Int(v) => write!(f, "{v}"),
			AttributeValue::Double(v) => write!(f, "{v:?}"),
			AttributeValue::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
			AttributeValue::Object(v) => write!(f, "{v:?}"),
		}
	}
}

impl From<bool> for AttributeValue {
	fn from(value: bool) -> Self {
		AttributeValue::Bool(value)
	}
}

impl From<i64> for AttributeValue {
	fn from(value: i64) -> Self {
		AttributeValue::Int(value)
	}
}

impl From<i32> for AttributeValue {
	fn from(value: i32) -> Self {
		AttributeValue::Int(i64::from(value))
	}
}

impl From<f64> for AttributeValue {
	fn from(value: f64) -> Self {
		AttributeValue::Double(value)
	}
}

impl From<&str> for AttributeValue {
	fn from(value: &str) -> Self {
		AttributeValue::String(value.to_string())
	}
}

impl From<String> for AttributeValue {
	fn from(value: String) -> Self {
		AttributeValue::String(value)
	}
}

impl From<Attributes> for AttributeValue {
	fn from(value: Attributes) -> Self {
		AttributeValue::Object(value)
	}
}

/// Named attributes of a feature, sorted by name.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, key: &str, value: impl Into<AttributeValue>) {
		self.0.insert(key.to_string(), value.into());
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&AttributeValue> {
		self.0.get(key)
	}

	/// Look up a dotted path like `address.city` through nested objects.
	#[must_use]
	pub fn get_path(&self, path: &str) -> Option<&AttributeValue> {
		let mut parts = path.split('.');
		let mut value = self.0.get(parts.next()?)?;
		for part in parts {
			match value {
				AttributeValue::Object(inner) => value = inner.0.get(part)?,
				_ => return None,
			}
		}
		Some(value)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
		self.0.iter()
	}
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for Attributes {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Attributes(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

impl<K: Into<String>, V: Into<AttributeValue>> From<Vec<(K, V)>> for Attributes {
	fn from(value: Vec<(K, V)>) -> Self {
		value.into_iter().collect()
	}
}

/// A feature as stored by a layer.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Feature {
	pub id: String,
	#[serde(default)]
	pub attributes: Attributes,
	#[serde(default)]
	pub geometry: Option<Geometry>,
}

impl Feature {
	#[must_use]
	pub fn new(id: &str, attributes: Attributes, geometry: Option<Geometry>) -> Self {
		Feature {
			id: id.to_string(),
			attributes,
			geometry,
		}
	}
}
