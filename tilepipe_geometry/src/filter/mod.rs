//! Predicates over features.
//!
//! A [`Filter`] is a small OGC-style expression tree. It is built either by
//! [`parse_filter`] from an ECQL-like string or through a [`FilterService`],
//! combined with [`Filter::and`] and evaluated against a [`Feature`].

mod parser;
mod service;

pub use parser::{FilterParseError, parse_filter};
pub use service::{DefaultFilterService, FilterService};

use crate::{AttributeValue, Feature, Geometry};
use itertools::Itertools;
use regex::Regex;
use std::{cmp::Ordering, fmt};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
}

impl CompareOp {
	fn accepts(self, ordering: Ordering) -> bool {
		match self {
			CompareOp::Eq => ordering == Ordering::Equal,
			CompareOp::Ne => ordering != Ordering::Equal,
			CompareOp::Lt => ordering == Ordering::Less,
			CompareOp::Le => ordering != Ordering::Greater,
			CompareOp::Gt => ordering == Ordering::Greater,
			CompareOp::Ge => ordering != Ordering::Less,
		}
	}

	fn symbol(self) -> &'static str {
		match self {
			CompareOp::Eq => "=",
			CompareOp::Ne => "<>",
			CompareOp::Lt => "<",
			CompareOp::Le => "<=",
			CompareOp::Gt => ">",
			CompareOp::Ge => ">=",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpatialOp {
	Intersects,
	Within,
	/// Bounding box overlap; the geometry is the box as a rectangle.
	Bbox,
}

/// A `LIKE` pattern with `%` (any run of characters) and `_` (one character).
#[derive(Clone, Debug)]
pub struct LikePattern {
	pattern: String,
	regex: Regex,
}

impl LikePattern {
	pub fn new(pattern: &str) -> Result<LikePattern, regex::Error> {
		let mut expression = String::from("(?s)^");
		for c in pattern.chars() {
			match c {
				'%' => expression.push_str(".*"),
				'_' => expression.push('.'),
				c => expression.push_str(&regex::escape(&c.to_string())),
			}
		}
		expression.push('$');
		Ok(LikePattern {
			pattern: pattern.to_string(),
			regex: Regex::new(&expression)?,
		})
	}

	pub fn as_str(&self) -> &str {
		&self.pattern
	}

	pub fn is_match(&self, value: &str) -> bool {
		self.regex.is_match(value)
	}
}

impl PartialEq for LikePattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
	/// Accepts every feature.
	Include,
	/// Rejects every feature.
	Exclude,
	And(Vec<Filter>),
	Or(Vec<Filter>),
	Not(Box<Filter>),
	Compare {
		attribute: String,
		op: CompareOp,
		value: AttributeValue,
	},
	Between {
		attribute: String,
		lower: AttributeValue,
		upper: AttributeValue,
	},
	In {
		attribute: String,
		values: Vec<AttributeValue>,
	},
	Like {
		attribute: String,
		pattern: LikePattern,
	},
	IsNull(String),
	Spatial {
		op: SpatialOp,
		/// Name of the geometry attribute the predicate applies to.
		attribute: String,
		geometry: Geometry,
	},
}

impl Filter {
	/// Conjunction of `self` and `other`.
	///
	/// Operands keep their order, nested conjunctions are flattened,
	/// `Include` operands disappear and a single `Exclude` turns the whole
	/// conjunction into `Exclude`.
	#[must_use]
	pub fn and(self, other: Filter) -> Filter {
		Filter::all([self, other])
	}

	/// Conjunction of all `filters`, simplified like [`Filter::and`].
	pub fn all(filters: impl IntoIterator<Item = Filter>) -> Filter {
		let mut operands = Vec::new();
		for filter in filters {
			match filter {
				Filter::Include => {}
				Filter::Exclude => return Filter::Exclude,
				Filter::And(inner) => match Filter::all(inner) {
					Filter::Include => {}
					Filter::Exclude => return Filter::Exclude,
					Filter::And(inner) => operands.extend(inner),
					other => operands.push(other),
				},
				other => operands.push(other),
			}
		}
		match operands.len() {
			0 => Filter::Include,
			1 => operands.remove(0),
			_ => Filter::And(operands),
		}
	}

	/// Disjunction of all `filters`; `Include` absorbs, `Exclude` disappears.
	pub fn any(filters: impl IntoIterator<Item = Filter>) -> Filter {
		let mut operands = Vec::new();
		for filter in filters {
			match filter {
				Filter::Exclude => {}
				Filter::Include => return Filter::Include,
				other => operands.push(other),
			}
		}
		match operands.len() {
			0 => Filter::Exclude,
			1 => operands.remove(0),
			_ => Filter::Or(operands),
		}
	}

	#[must_use]
	pub fn negate(self) -> Filter {
		match self {
			Filter::Include => Filter::Exclude,
			Filter::Exclude => Filter::Include,
			Filter::Not(inner) => *inner,
			other => Filter::Not(Box::new(other)),
		}
	}

	#[must_use]
	pub fn is_exclude(&self) -> bool {
		matches!(self, Filter::Exclude)
	}

	/// `true` if `feature` satisfies the predicate.
	///
	/// Comparisons against missing or `Null` attributes, or values of
	/// incomparable kinds, are false. Spatial predicates are false for
	/// features without geometry.
	pub fn evaluate(&self, feature: &Feature) -> bool {
		let lookup = |attribute: &str| feature.attributes.get_path(attribute).filter(|v| !v.is_null());
		match self {
			Filter::Include => true,
			Filter::Exclude => false,
			Filter::And(filters) => filters.iter().all(|f| f.evaluate(feature)),
			Filter::Or(filters) => filters.iter().any(|f| f.evaluate(feature)),
			Filter::Not(filter) => !filter.evaluate(feature),
			Filter::Compare { attribute, op, value } => lookup(attribute)
				.and_then(|v| v.compare(value))
				.is_some_and(|o| op.accepts(o)),
			Filter::Between { attribute, lower, upper } => lookup(attribute).is_some_and(|v| {
				v.compare(lower).is_some_and(|o| o != Ordering::Less)
					&& v.compare(upper).is_some_and(|o| o != Ordering::Greater)
			}),
			Filter::In { attribute, values } => lookup(attribute)
				.is_some_and(|v| values.iter().any(|candidate| v.compare(candidate) == Some(Ordering::Equal))),
			Filter::Like { attribute, pattern } => match lookup(attribute) {
				Some(AttributeValue::String(s)) => pattern.is_match(s),
				_ => false,
			},
			Filter::IsNull(attribute) => lookup(attribute).is_none(),
			Filter::Spatial { op, geometry, .. } => feature.geometry.as_ref().is_some_and(|g| match op {
				SpatialOp::Intersects | SpatialOp::Bbox => g.intersects(geometry),
				SpatialOp::Within => g.is_within(geometry),
			}),
		}
	}
}

fn write_operand(f: &mut fmt::Formatter<'_>, filter: &Filter) -> fmt::Result {
	match filter {
		Filter::And(_) | Filter::Or(_) => write!(f, "({filter})"),
		_ => write!(f, "{filter}"),
	}
}

/// ECQL-like text. Everything except `INTERSECTS` and `WITHIN` can be
/// parsed back with [`parse_filter`].
impl fmt::Display for Filter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Filter::Include => f.write_str("INCLUDE"),
			Filter::Exclude => f.write_str("EXCLUDE"),
			Filter::And(filters) | Filter::Or(filters) => {
				let separator = if matches!(self, Filter::And(_)) { " AND " } else { " OR " };
				for (index, filter) in filters.iter().enumerate() {
					if index > 0 {
						f.write_str(separator)?;
					}
					write_operand(f, filter)?;
				}
				Ok(())
			}
			Filter::Not(filter) => write!(f, "NOT ({filter})"),
			Filter::Compare { attribute, op, value } => write!(f, "{attribute} {} {value}", op.symbol()),
			Filter::Between { attribute, lower, upper } => write!(f, "{attribute} BETWEEN {lower} AND {upper}"),
			Filter::In { attribute, values } => write!(f, "{attribute} IN ({})", values.iter().join(", ")),
			Filter::Like { attribute, pattern } => write!(
				f,
				"{attribute} LIKE {}",
				AttributeValue::from(pattern.as_str())
			),
			Filter::IsNull(attribute) => write!(f, "{attribute} IS NULL"),
			Filter::Spatial {
				op,
				attribute,
				geometry,
			} => match op {
				SpatialOp::Intersects => write!(f, "INTERSECTS({attribute}, {})", geometry.to_wkt()),
				SpatialOp::Within => write!(f, "WITHIN({attribute}, {})", geometry.to_wkt()),
				SpatialOp::Bbox => match geometry.bounds() {
					Some(b) => write!(f, "BBOX({attribute}, {}, {}, {}, {})", b.x_min, b.y_min, b.x_max, b.y_max),
					None => f.write_str("EXCLUDE"),
				},
			},
		}
	}
}
