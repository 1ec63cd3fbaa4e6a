use crate::map::LineString;
use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;

/// Load boundary outlines (state or country borders) from a GeoJSON file.
/// Polygons contribute their exterior ring; points are ignored.
pub fn load_outline(path: &Path) -> Result<Vec<LineString>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read outline file: {:?}", path))?;
    let lines = parse_outline(&content)
        .with_context(|| format!("Failed to parse outline GeoJSON: {:?}", path))?;
    tracing::info!(path = %path.display(), lines = lines.len(), "loaded outline");
    Ok(lines)
}

fn parse_outline(content: &str) -> Result<Vec<LineString>> {
    let geojson: GeoJson = content.parse()?;
    let mut lines = Vec::new();
    collect_lines(&geojson, |line| {
        if line.len() >= 2 {
            lines.push(line);
        }
    });
    Ok(lines)
}

fn collect_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(LineString),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    collect_geometry_lines(geometry, &mut add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                collect_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => {
            collect_geometry_lines(geometry, &mut add_line);
        }
    }
}

fn collect_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(LineString),
{
    let to_line = |coords: &Vec<Vec<f64>>| -> LineString {
        coords
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| (c[0], c[1]))
            .collect()
    };

    match &geometry.value {
        Value::LineString(coords) => add_line(to_line(coords)),
        Value::MultiLineString(lines) => {
            for coords in lines {
                add_line(to_line(coords));
            }
        }
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    add_line(to_line(exterior));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_and_line_features() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"sigla": "AM"},
                 "geometry": {"type": "Polygon", "coordinates": [[[-70,-10],[-60,-10],[-60,0],[-70,-10]]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "LineString", "coordinates": [[-50,-20],[-45,-22]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Point", "coordinates": [-40,-15]}}
            ]
        }"#;
        let lines = parse_outline(content).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 4);
        assert_eq!(lines[1], vec![(-50.0, -20.0), (-45.0, -22.0)]);
    }

    #[test]
    fn test_invalid_geojson() {
        assert!(parse_outline("{not json").is_err());
    }
}
