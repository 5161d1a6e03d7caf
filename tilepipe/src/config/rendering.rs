use serde::Deserialize;
use tilepipe_render::strategy::{RenderBetweenScales, RenderForLayers, RenderingKind, RenderingStrategyFactory};

/// One rendering rule, written as a single-key map naming the rule type.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleConfig {
	BetweenScales(RenderBetweenScales),
	ForLayers(RenderForLayers),
}

/// Chooses between vector and raster rendering.
///
/// Rules are evaluated in order; the first accepting rule decides, otherwise
/// `default` is used.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RenderingConfig {
	pub default: RenderingKind,
	pub rules: Vec<RuleConfig>,
}

impl RenderingConfig {
	#[must_use]
	pub fn build(&self) -> RenderingStrategyFactory {
		self
			.rules
			.iter()
			.fold(RenderingStrategyFactory::standard(self.default), |factory, rule| match rule {
				RuleConfig::BetweenScales(rule) => factory.with_rule(rule.clone()),
				RuleConfig::ForLayers(rule) => factory.with_rule(rule.clone()),
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rstest::rstest;
	use tilepipe_core::{TileCode, TileMetadata};

	const YAML: &str = r"
default: vector
rules:
  - for_layers: { layers: [satellite], kind: raster }
  - between_scales: { min_scale: 100, kind: raster }
";

	#[test]
	fn parse() {
		let config: RenderingConfig = serde_yaml_ng::from_str(YAML).unwrap();
		assert_eq!(
			config,
			RenderingConfig {
				default: RenderingKind::Vector,
				rules: vec![
					RuleConfig::ForLayers(RenderForLayers {
						layers: vec!["satellite".to_string()],
						kind: RenderingKind::Raster,
					}),
					RuleConfig::BetweenScales(RenderBetweenScales {
						min_scale: Some(100.0),
						max_scale: None,
						kind: RenderingKind::Raster,
					}),
				],
			}
		);
	}

	#[rstest]
	#[case("beans", 1.0, RenderingKind::Vector)]
	#[case("beans", 100.0, RenderingKind::Raster)]
	#[case("satellite", 1.0, RenderingKind::Raster)]
	fn rules_pick_the_kind(#[case] layer_id: &str, #[case] scale: f64, #[case] expected: RenderingKind) {
		let factory = serde_yaml_ng::from_str::<RenderingConfig>(YAML).unwrap().build();
		let metadata = TileMetadata::new(layer_id, "EPSG:4326", TileCode::new(0, 0, 0).unwrap(), scale);
		assert_eq!(factory.kind_for(&metadata), expected);
	}

	#[test]
	fn unknown_rule() {
		assert!(serde_yaml_ng::from_str::<RenderingConfig>("rules:\n  - by_moon: { kind: raster }").is_err());
	}

	#[test]
	fn empty_config_renders_vectors() {
		let factory = RenderingConfig::default().build();
		assert_eq!(factory.default_kind(), RenderingKind::Vector);
	}
}
