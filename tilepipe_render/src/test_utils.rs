use crate::{
	LayerAuthorization, LayerRegistry, MemoryLayer, MemoryTileCache, StaticSecurityContext, TileCache, VectorLayerInfo,
	steps::{TileServices, default_tile_pipelines},
	strategy::RenderServices,
};
use std::sync::Arc;
use tilepipe_core::{Bbox, FeatureStyleInfo, LabelStyle, NamedStyle, TileCode, TileGrid, TileMetadata};
use tilepipe_geometry::{AttributeValue, Attributes, Crs, DefaultFilterService, DefaultGeoService, Feature, Geometry};
use tilepipe_pipeline::PipelineService;

pub fn beans_info() -> VectorLayerInfo {
	VectorLayerInfo {
		id: "beans".to_string(),
		crs: Crs::Wgs84,
		default_filter: None,
		geometry_attribute: "the_geom".to_string(),
		grid: TileGrid::new(Bbox::new(-20.0, -20.0, 20.0, 20.0).unwrap()),
	}
}

fn feature(id: &str, size: i64, name: AttributeValue, geometry: Geometry) -> Feature {
	let attributes = Attributes::from(vec![("size", AttributeValue::Int(size)), ("name", name)]);
	Feature::new(id, attributes, Some(geometry))
}

/// Four features: a point, a line, a polygon crossing the level 1 tile
/// borders and a point too far north for web mercator.
pub fn beans_features() -> Vec<Feature> {
	vec![
		feature("small", 3, "Small bean".into(), Geometry::new_point([1.0, 1.0])),
		feature(
			"line",
			7,
			AttributeValue::Int(7),
			Geometry::new_line_string(vec![[-10.0, 5.0], [10.0, 5.0]]),
		),
		feature(
			"big",
			20,
			"Big bean".into(),
			Geometry::new_polygon(vec![vec![[-5.0, -5.0], [5.0, -5.0], [5.0, 5.0], [-5.0, 5.0], [-5.0, -5.0]]]),
		),
		feature("polar", 15, "Polar bean".into(), Geometry::new_point([0.0, 89.0])),
	]
}

pub fn beans_layer() -> MemoryLayer {
	MemoryLayer::new(beans_info(), beans_features(), Arc::new(DefaultGeoService))
}

pub fn beans_style() -> NamedStyle {
	NamedStyle {
		name: "beans".to_string(),
		feature_styles: vec![
			FeatureStyleInfo {
				index: 1,
				name: "small".to_string(),
				formula: Some("size < 5".to_string()),
				fill_color: "#ff0000".to_string(),
				..FeatureStyleInfo::default()
			},
			FeatureStyleInfo {
				index: 2,
				name: "other".to_string(),
				..FeatureStyleInfo::default()
			},
		],
		label_style: Some(LabelStyle::default()),
	}
}

pub fn full_extent() -> Geometry {
	Geometry::from_bbox(&Bbox::new(-20.0, -20.0, 20.0, 20.0).unwrap())
}

pub fn beans_security() -> StaticSecurityContext {
	StaticSecurityContext::new().with_layer(
		"beans",
		LayerAuthorization {
			visible: true,
			feature_filter: None,
			visible_area: Some(full_extent()),
			partly_visible_sufficient: true,
		},
	)
}

/// Metadata for the whole beans extent as one 400 × 400 pixel tile.
pub fn beans_metadata() -> TileMetadata {
	let mut metadata = TileMetadata::new("beans", "EPSG:4326", TileCode::new(0, 0, 0).unwrap(), 10.0);
	metadata.style = beans_style();
	metadata
}

pub fn beans_tile_services(cache: bool) -> TileServices {
	let mut layers = LayerRegistry::new();
	layers.add(Arc::new(beans_layer())).unwrap();
	TileServices {
		layers: Arc::new(layers),
		security: Arc::new(beans_security()),
		filters: Arc::new(DefaultFilterService),
		geo: Arc::new(DefaultGeoService),
		cache: cache.then(|| Arc::new(MemoryTileCache::new(100)) as Arc<dyn TileCache>),
	}
}

/// Services running the default pipelines over the beans layer.
pub fn beans_services(cache: bool) -> RenderServices {
	let tile_services = beans_tile_services(cache);
	RenderServices {
		pipelines: PipelineService::new(Arc::new(default_tile_pipelines(&tile_services).unwrap())),
		layers: tile_services.layers,
		security: tile_services.security,
	}
}
