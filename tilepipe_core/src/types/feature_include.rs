use enumset::{EnumSet, EnumSetType};
use serde::Deserialize;

/// Parts of a feature a caller wants to receive.
///
/// The discriminants match the legacy bitmask (`attributes = 1`,
/// `geometry = 2`, `style = 4`, `label = 8`).
#[derive(EnumSetType, Debug, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureInclude {
	Attributes,
	Geometry,
	Style,
	Label,
}

pub type FeatureIncludes = EnumSet<FeatureInclude>;

/// Build a set from the legacy bitmask; unknown bits are ignored.
#[must_use]
pub fn includes_from_bits(bits: u32) -> FeatureIncludes {
	EnumSet::from_u32_truncated(bits)
}

/// Legacy bitmask of a set.
#[must_use]
pub fn includes_to_bits(includes: FeatureIncludes) -> u32 {
	includes.as_u32()
}
