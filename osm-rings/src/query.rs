//! Requête Overpass QL pour les bâtiments autour d'un point
//!
//! La forme `out body; >; out skel qt;` renvoie les ways et relations de
//! bâtiments suivis des nodes et ways qu'ils référencent : exactement ce que
//! consomme [`crate::reconstruct`].

use crate::OsmError;

/// Rayon de recherche par défaut (mètres)
pub const DEFAULT_RADIUS_M: u32 = 300;

/// Bâtiments dans un cercle autour d'une position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius_m: u32,
    pub timeout_s: Option<u32>,
}

impl BuildingQuery {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            radius_m: DEFAULT_RADIUS_M,
            timeout_s: None,
        }
    }

    pub fn with_radius(mut self, radius_m: u32) -> Self {
        self.radius_m = radius_m;
        self
    }

    pub fn with_timeout(mut self, timeout_s: u32) -> Self {
        self.timeout_s = Some(timeout_s);
        self
    }

    /// Vérifie les bornes de la position et du rayon
    pub fn validate(&self) -> Result<(), OsmError> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(OsmError::invalid_query(format!(
                "latitude out of range: {}",
                self.lat
            )));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(OsmError::invalid_query(format!(
                "longitude out of range: {}",
                self.lon
            )));
        }
        if self.radius_m == 0 {
            return Err(OsmError::invalid_query("radius must be positive"));
        }
        if self.timeout_s == Some(0) {
            return Err(OsmError::invalid_query("timeout must be positive"));
        }
        Ok(())
    }

    /// Construit le texte Overpass QL
    pub fn to_overpass_ql(&self) -> Result<String, OsmError> {
        self.validate()?;

        let settings = match self.timeout_s {
            Some(timeout) => format!("[out:json][timeout:{}];", timeout),
            None => "[out:json];".to_string(),
        };
        let around = format!("(around:{},{},{})", self.radius_m, self.lat, self.lon);

        Ok(format!(
            "{settings}\n(\n  way[\"building\"]{around};\n  relation[\"building\"]{around};\n);\nout body;\n>;\nout skel qt;\n"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query() {
        let ql = BuildingQuery::new(24.7359, 91.6852).to_overpass_ql().unwrap();

        assert!(ql.starts_with("[out:json];"));
        assert!(ql.contains(r#"way["building"](around:300,24.7359,91.6852);"#));
        assert!(ql.contains(r#"relation["building"](around:300,24.7359,91.6852);"#));
        assert!(ql.contains("out body;\n>;\nout skel qt;"));
    }

    #[test]
    fn test_query_with_options() {
        let ql = BuildingQuery::new(48.85, 2.35)
            .with_radius(50)
            .with_timeout(25)
            .to_overpass_ql()
            .unwrap();

        assert!(ql.starts_with("[out:json][timeout:25];"));
        assert!(ql.contains("(around:50,48.85,2.35)"));
    }

    #[test]
    fn test_invalid_queries() {
        assert!(BuildingQuery::new(91.0, 0.0).validate().is_err());
        assert!(BuildingQuery::new(0.0, -180.5).validate().is_err());
        assert!(BuildingQuery::new(f64::NAN, 0.0).validate().is_err());
        assert!(BuildingQuery::new(0.0, 0.0).with_radius(0).validate().is_err());
        assert!(BuildingQuery::new(0.0, 0.0).with_timeout(0).validate().is_err());
        assert!(BuildingQuery::new(-90.0, 180.0).validate().is_ok());
    }
}
