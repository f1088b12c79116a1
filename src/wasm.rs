use geo::{Geometry, LineString, MultiLineString, MultiPolygon, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson, Value};
use std::convert::TryInto;
use std::str::FromStr;
use wasm_bindgen::prelude::*;

use crate::noding::node_lines;
use crate::simplify::{simplify, SimplifyMethod, TopologyPreservingSimplifier};

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Nodes all linework in a GeoJSON document and returns the noded lines as
/// a FeatureCollection of LineStrings. `scale` turns on snap rounding.
#[wasm_bindgen]
pub fn node_geojson(geojson_str: &str, scale: Option<f64>) -> Result<String, JsValue> {
    node_geojson_str(geojson_str, scale).map_err(|e| JsValue::from_str(&e))
}

/// Simplifies every line and polygon in a GeoJSON document. `method` is
/// one of `douglas-peucker`, `visvalingam` or `topology-preserving`.
#[wasm_bindgen]
pub fn simplify_geojson(
    geojson_str: &str,
    tolerance: f64,
    method: &str,
) -> Result<String, JsValue> {
    simplify_geojson_str(geojson_str, tolerance, method).map_err(|e| JsValue::from_str(&e))
}

pub fn parse_method(method: &str) -> Option<SimplifyMethod> {
    match method {
        "douglas-peucker" | "dp" => Some(SimplifyMethod::DouglasPeucker),
        "visvalingam" | "vw" => Some(SimplifyMethod::VisvalingamWhyatt),
        "topology-preserving" | "tp" => Some(SimplifyMethod::TopologyPreserving),
        _ => None,
    }
}

fn node_geojson_str(geojson_str: &str, scale: Option<f64>) -> Result<String, String> {
    let geometries = parse_geometries(geojson_str)?;
    let mut lines = Vec::new();
    for geom in &geometries {
        extract_lines(geom, &mut lines);
    }
    let noded = node_lines(&lines, scale).map_err(|e| format!("Noding failed: {}", e))?;
    Ok(to_feature_collection(noded.into_iter().map(Geometry::LineString)))
}

fn simplify_geojson_str(geojson_str: &str, tolerance: f64, method: &str) -> Result<String, String> {
    let method = parse_method(method)
        .ok_or_else(|| format!("Unknown simplification method: {}", method))?;
    let geometries = parse_geometries(geojson_str)?;
    let simplified = geometries
        .into_iter()
        .map(|geom| simplify_geometry(geom, tolerance, method))
        .collect::<crate::error::Result<Vec<_>>>()
        .map_err(|e| format!("Simplification failed: {}", e))?;
    Ok(to_feature_collection(simplified.into_iter()))
}

fn parse_geometries(geojson_str: &str) -> Result<Vec<Geometry<f64>>, String> {
    let geojson = GeoJson::from_str(geojson_str)
        .map_err(|e| format!("Failed to parse GeoJSON: {}", e))?;

    let mut out: Vec<Geometry<f64>> = Vec::new();
    let mut push = |geom: geojson::Geometry| {
        let converted: Result<Geometry<f64>, _> = geom.try_into();
        if let Ok(geo_geom) = converted {
            out.push(geo_geom);
        }
    };
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in fc.features {
                if let Some(geom) = feature.geometry {
                    push(geom);
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geom) = feature.geometry {
                push(geom);
            }
        }
        GeoJson::Geometry(geometry) => push(geometry),
    }
    Ok(out)
}

/// Collects every line and ring of `geom`.
pub fn extract_lines(geom: &Geometry<f64>, out: &mut Vec<LineString<f64>>) {
    match geom {
        Geometry::LineString(ls) => out.push(ls.clone()),
        Geometry::MultiLineString(mls) => out.extend(mls.0.iter().cloned()),
        Geometry::Polygon(poly) => {
            out.push(poly.exterior().clone());
            out.extend(poly.interiors().iter().cloned());
        }
        Geometry::MultiPolygon(mp) => {
            for poly in &mp.0 {
                out.push(poly.exterior().clone());
                out.extend(poly.interiors().iter().cloned());
            }
        }
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                extract_lines(g, out);
            }
        }
        _ => {}
    }
}

/// Simplifies lines and polygons; other geometry types pass through.
pub fn simplify_geometry(
    geom: Geometry<f64>,
    tolerance: f64,
    method: SimplifyMethod,
) -> crate::error::Result<Geometry<f64>> {
    let simplified = match geom {
        Geometry::LineString(ls) => Geometry::LineString(simplify(&ls, tolerance, method)?),
        Geometry::MultiLineString(mls) => {
            Geometry::MultiLineString(simplify_multi_line(&mls, tolerance, method)?)
        }
        Geometry::Polygon(poly) => Geometry::Polygon(simplify_polygon(&poly, tolerance, method)?),
        Geometry::MultiPolygon(mp) => {
            let polys = mp
                .0
                .iter()
                .map(|p| simplify_polygon(p, tolerance, method))
                .collect::<crate::error::Result<Vec<_>>>()?;
            Geometry::MultiPolygon(MultiPolygon::new(polys))
        }
        other => other,
    };
    Ok(simplified)
}

fn simplify_multi_line(
    mls: &MultiLineString<f64>,
    tolerance: f64,
    method: SimplifyMethod,
) -> crate::error::Result<MultiLineString<f64>> {
    let lines = match method {
        SimplifyMethod::TopologyPreserving => {
            TopologyPreservingSimplifier::new(tolerance)?.simplify_lines(&mls.0)?
        }
        _ => mls
            .0
            .iter()
            .map(|l| simplify(l, tolerance, method))
            .collect::<crate::error::Result<Vec<_>>>()?,
    };
    Ok(MultiLineString::new(lines))
}

fn simplify_polygon(
    poly: &Polygon<f64>,
    tolerance: f64,
    method: SimplifyMethod,
) -> crate::error::Result<Polygon<f64>> {
    if method == SimplifyMethod::TopologyPreserving {
        return TopologyPreservingSimplifier::new(tolerance)?.simplify_polygon(poly);
    }
    let exterior = simplify(poly.exterior(), tolerance, method)?;
    let interiors = poly
        .interiors()
        .iter()
        .map(|ring| simplify(ring, tolerance, method))
        .collect::<crate::error::Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn to_feature_collection(geometries: impl Iterator<Item = Geometry<f64>>) -> String {
    let features: Vec<Feature> = geometries
        .map(|geom| {
            let geometry = geojson::Geometry::new(Value::from(&geom));
            Feature {
                bbox: None,
                geometry: Some(geometry),
                id: None,
                properties: None,
                foreign_members: None,
            }
        })
        .collect();

    let fc = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    fc.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_geojson_splits_crossing_lines() {
        let input = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":null,
             "geometry":{"type":"LineString","coordinates":[[0,0],[10,10]]}},
            {"type":"Feature","properties":null,
             "geometry":{"type":"LineString","coordinates":[[0,10],[10,0]]}}
        ]}"#;
        let out = node_geojson_str(input, Some(1.0)).unwrap();
        let parsed = GeoJson::from_str(&out).unwrap();
        match parsed {
            GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 4),
            _ => panic!("expected a FeatureCollection"),
        }
    }

    #[test]
    fn test_simplify_geojson_polygon() {
        let input =
            r#"{"type":"Polygon","coordinates":[[[0,0],[5,0.1],[10,0],[10,10],[0,10],[0,0]]]}"#;
        let out = simplify_geojson_str(input, 1.0, "topology-preserving").unwrap();
        let parsed = GeoJson::from_str(&out).unwrap();
        let GeoJson::FeatureCollection(fc) = parsed else {
            panic!("expected a FeatureCollection");
        };
        let geom: Geometry<f64> = fc.features[0].geometry.clone().unwrap().try_into().unwrap();
        let Geometry::Polygon(poly) = geom else {
            panic!("expected a Polygon");
        };
        assert_eq!(poly.exterior().0.len(), 5);
    }

    #[test]
    fn test_bad_method_and_bad_json() {
        let line = r#"{"type":"LineString","coordinates":[[0,0],[1,1]]}"#;
        assert!(simplify_geojson_str(line, 1.0, "bogus").is_err());
        assert!(simplify_geojson_str("not json", 1.0, "dp").is_err());
        assert_eq!(parse_method("vw"), Some(SimplifyMethod::VisvalingamWhyatt));
    }

    #[test]
    fn test_simplify_geojson_keeps_polygon_ring() {
        let input = r#"{"type":"Polygon","coordinates":[[[0,0],[10,0],[10,10],[0,10],[0,0]]]}"#;
        for method in ["dp", "vw"] {
            let out = simplify_geojson_str(input, 100.0, method).unwrap();
            let GeoJson::FeatureCollection(fc) = GeoJson::from_str(&out).unwrap() else {
                panic!("expected a FeatureCollection");
            };
            let geom: Geometry<f64> = fc.features[0].geometry.clone().unwrap().try_into().unwrap();
            let Geometry::Polygon(poly) = geom else {
                panic!("expected a Polygon");
            };
            assert_eq!(poly.exterior().0.len(), 5, "{method}");
        }
    }
}
