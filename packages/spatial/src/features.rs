//! `GeoJSON` export of cooling sites and their buffers.
//!
//! The presentation layer only ever sees plain `FeatureCollection`s, so it
//! never has to depend on `geo` types.

use geo::{Coord, LineString, Point, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, feature::Id};
use heat_map_models::{BufferPolygon, CoolingSite};
use serde_json::{Map, Value};

/// Rebuilds a `geo` polygon from a buffer's exterior ring.
#[must_use]
pub fn buffer_polygon(buffer: &BufferPolygon) -> Polygon<f64> {
    let ring: Vec<Coord<f64>> = buffer
        .exterior
        .iter()
        .map(|[x, y]| Coord { x: *x, y: *y })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

/// Cooling sites as a `FeatureCollection` of WGS84 points.
///
/// Every source column is copied into the feature properties alongside
/// the planar `x`/`y`.
#[must_use]
pub fn cooling_sites_collection(sites: &[CoolingSite]) -> FeatureCollection {
    let features = sites
        .iter()
        .map(|site| {
            let mut properties: Map<String, Value> = site
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            properties.insert("site_id".to_string(), Value::String(site.id.clone()));
            properties.insert("x".to_string(), Value::from(site.x));
            properties.insert("y".to_string(), Value::from(site.y));

            let point = Point::new(site.longitude, site.latitude);
            feature(&site.id, geojson::Value::from(&point), properties)
        })
        .collect();

    collection(features)
}

/// Buffers as a `FeatureCollection` of WGS84 polygons.
#[must_use]
pub fn buffers_collection(buffers: &[BufferPolygon]) -> FeatureCollection {
    let features = buffers
        .iter()
        .map(|buffer| {
            let mut properties = Map::new();
            properties.insert(
                "site_id".to_string(),
                Value::String(buffer.site_id.clone()),
            );
            properties.insert("radius_ft".to_string(), Value::from(buffer.radius_ft));

            let polygon = buffer_polygon(buffer);
            feature(&buffer.site_id, geojson::Value::from(&polygon), properties)
        })
        .collect();

    collection(features)
}

fn feature(id: &str, value: geojson::Value, properties: Map<String, Value>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: Some(Id::String(id.to_string())),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn sample_site() -> CoolingSite {
        let mut properties = BTreeMap::new();
        properties.insert("propertyname".to_string(), "Hamilton Fish".to_string());
        CoolingSite {
            id: "7".to_string(),
            x: 989_000.0,
            y: 202_000.0,
            longitude: -73.98,
            latitude: 40.72,
            properties,
        }
    }

    #[test]
    fn sites_serialize_as_points() {
        let collection = cooling_sites_collection(&[sample_site()]);
        let json = serde_json::to_value(&collection).unwrap();

        assert_eq!(json["type"], "FeatureCollection");
        let feature = &json["features"][0];
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(feature["geometry"]["coordinates"][0], -73.98);
        assert_eq!(feature["geometry"]["coordinates"][1], 40.72);
        assert_eq!(feature["properties"]["site_id"], "7");
        assert_eq!(feature["properties"]["propertyname"], "Hamilton Fish");
    }

    #[test]
    fn buffers_serialize_as_nested_arrays() {
        let buffer = BufferPolygon {
            site_id: "7".to_string(),
            center: [0.5, 0.5],
            radius_ft: 800.0,
            exterior: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
        };
        let json = serde_json::to_value(buffers_collection(&[buffer])).unwrap();

        let geometry = &json["features"][0]["geometry"];
        assert_eq!(geometry["type"], "Polygon");
        let ring = geometry["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[1][0], 1.0);
        assert_eq!(json["features"][0]["properties"]["radius_ft"], 800.0);
    }
}
