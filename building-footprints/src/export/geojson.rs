//! Export vers GeoJSON avec geozero (streaming)

use std::io::Write;

use anyhow::Result;
use geo::Geometry;
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;

use crate::pipeline::PreparedFootprint;

/// Écrit une FeatureCollection WGS84
pub fn write_geojson<W: Write>(footprints: &[PreparedFootprint], writer: &mut W) -> Result<()> {
    write!(
        writer,
        r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::4326"}}}},"features":["#
    )?;

    for (i, footprint) in footprints.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_feature(writer, footprint)?;
    }

    write!(writer, "]}}")?;
    writer.flush()?;

    Ok(())
}

/// Écrit une feature en GeoJSON
fn write_feature<W: Write>(writer: &mut W, footprint: &PreparedFootprint) -> Result<()> {
    write!(
        writer,
        r#"{{"type":"Feature","id":"{}","#,
        escape_json(&footprint.id)
    )?;

    // Geometry via geozero (x = lon, y = lat)
    write!(writer, r#""geometry":"#)?;
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    Geometry::Polygon(footprint.polygon.clone()).process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    write!(
        writer,
        r#","properties":{{"_id":"{}","origin":"{}","index":{},"hash":"{}"}}}}"#,
        escape_json(&footprint.id),
        footprint.origin_kind(),
        footprint.index,
        footprint.hash_hex()
    )?;

    Ok(())
}

/// Échappe une chaîne pour JSON
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};
    use osm_rings::Origin;

    fn footprint() -> PreparedFootprint {
        PreparedFootprint {
            index: 3,
            id: "way/42".to_string(),
            origin: Origin::Way { way: 42 },
            polygon: Polygon::new(
                LineString::from(vec![(91.68, 24.73), (91.69, 24.73), (91.69, 24.74), (91.68, 24.73)]),
                vec![],
            ),
            hash: [0xab; 32],
        }
    }

    #[test]
    fn test_write_feature() {
        let mut buffer = Vec::new();
        write_feature(&mut buffer, &footprint()).unwrap();

        let json = String::from_utf8(buffer).unwrap();
        assert!(json.contains(r#""id":"way/42""#));
        assert!(json.contains(r#""type":"Feature""#));
        assert!(json.contains("Polygon"));
        assert!(json.contains(r#""origin":"way""#));
        assert!(json.contains(r#""index":3"#));
        assert!(json.contains(&format!(r#""hash":"{}""#, "ab".repeat(32))));
    }

    #[test]
    fn test_escape_json() {
        assert_eq!(escape_json("hello"), "hello");
        assert_eq!(escape_json("hello\"world"), "hello\\\"world");
        assert_eq!(escape_json("line\nbreak"), "line\\nbreak");
    }

    #[test]
    fn test_write_geojson_is_valid_json() {
        let mut buffer = Vec::new();
        write_geojson(&[footprint(), footprint()], &mut buffer).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().unwrap().len(), 2);

        let ring = &value["features"][0]["geometry"]["coordinates"][0];
        assert_eq!(ring[0][0].as_f64(), Some(91.68));
        assert_eq!(ring[0][1].as_f64(), Some(24.73));
        assert_eq!(ring[0], ring[3]);
    }
}
