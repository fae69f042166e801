use serde::{Deserialize, Serialize};

pub mod xml;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderNode {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderWay {
    pub id: i64,
    pub nodes: Vec<BorderNode>,
}

/// Outer boundary fragments of a single relation, in the order they were found.
///
/// The ways are not joined into rings; consecutive ways may or may not share endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub ways: Vec<BorderWay>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Border {
    pub fn is_empty(&self) -> bool {
        self.ways.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.ways.iter().map(|w| w.nodes.len()).sum()
    }

    /// Number of line segments needed to draw every way.
    pub fn segment_count(&self) -> usize {
        self.ways
            .iter()
            .map(|w| w.nodes.len().saturating_sub(1))
            .sum()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut nodes = self.ways.iter().flat_map(|w| w.nodes.iter());
        let first = nodes.next()?;

        let init = Bounds {
            min_lat: first.lat,
            min_lon: first.lon,
            max_lat: first.lat,
            max_lon: first.lon,
        };

        Some(nodes.fold(init, |b, n| Bounds {
            min_lat: b.min_lat.min(n.lat),
            min_lon: b.min_lon.min(n.lon),
            max_lat: b.max_lat.max(n.lat),
            max_lon: b.max_lon.max(n.lon),
        }))
    }
}
