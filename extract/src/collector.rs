use crate::error::ExtractError;
use common::{Border, BorderNode, BorderWay};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Keeps the node references of every way in the boundary set, in the order the ways appear.
pub struct WayCollector<'a> {
    boundary_ways: &'a HashSet<i64>,
    ways: Vec<(i64, Vec<i64>)>,
    positions: HashMap<i64, usize>,
    ways_seen: u64,
}

impl<'a> WayCollector<'a> {
    pub fn new(boundary_ways: &'a HashSet<i64>) -> WayCollector<'a> {
        WayCollector {
            boundary_ways,
            ways: Vec::with_capacity(boundary_ways.len()),
            positions: HashMap::with_capacity(boundary_ways.len()),
            ways_seen: 0,
        }
    }

    pub fn observe_way<R>(&mut self, id: i64, refs: R)
    where
        R: IntoIterator<Item = i64>,
    {
        self.ways_seen += 1;

        if !self.boundary_ways.contains(&id) {
            return;
        }

        let refs: Vec<i64> = refs.into_iter().collect();
        debug!("Keeping way {id} with {} nodes", refs.len());

        // A repeated id replaces the earlier copy but keeps its slot
        match self.positions.get(&id) {
            Some(&i) => self.ways[i].1 = refs,
            None => {
                self.positions.insert(id, self.ways.len());
                self.ways.push((id, refs));
            }
        }
    }

    pub fn ways_seen(&self) -> u64 {
        self.ways_seen
    }

    pub fn finish(self) -> CollectedWays {
        CollectedWays { ways: self.ways }
    }
}

#[derive(Debug, Default)]
pub struct CollectedWays {
    ways: Vec<(i64, Vec<i64>)>,
}

impl CollectedWays {
    pub fn len(&self) -> usize {
        self.ways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ways.is_empty()
    }

    pub fn way_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.ways.iter().map(|(id, _)| *id)
    }

    /// Every node id referenced by a kept way.
    pub fn required_nodes(&self) -> HashSet<i64> {
        self.ways
            .iter()
            .flat_map(|(_, refs)| refs.iter().copied())
            .collect()
    }

    pub fn resolve(self, index: &LocationIndex) -> Result<Border, ExtractError> {
        let ways = self
            .ways
            .into_iter()
            .map(|(way, refs)| {
                let nodes = refs
                    .into_iter()
                    .map(|node| {
                        let (lat, lon) = index
                            .get(node)
                            .ok_or(ExtractError::MissingLocation { way, node })?;
                        Ok(BorderNode { id: node, lat, lon })
                    })
                    .collect::<Result<Vec<_>, ExtractError>>()?;
                Ok(BorderWay { id: way, nodes })
            })
            .collect::<Result<Vec<_>, ExtractError>>()?;

        Ok(Border { ways })
    }
}

/// Node locations, restricted to the nodes that kept ways reference.
pub struct LocationIndex {
    wanted: HashSet<i64>,
    locations: HashMap<i64, (f64, f64)>,
}

impl LocationIndex {
    pub fn new(wanted: HashSet<i64>) -> LocationIndex {
        let locations = HashMap::with_capacity(wanted.len());
        LocationIndex { wanted, locations }
    }

    pub fn observe_node(&mut self, id: i64, lat: f64, lon: f64) {
        if self.wanted.contains(&id) {
            self.locations.insert(id, (lat, lon));
        }
    }

    pub fn get(&self, id: i64) -> Option<(f64, f64)> {
        self.locations.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn missing(&self) -> usize {
        self.wanted.len() - self.locations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestWay = (i64, Vec<(i64, f64, f64)>);

    fn run(boundary: &HashSet<i64>, ways: &[TestWay]) -> Result<Border, ExtractError> {
        let mut collector = WayCollector::new(boundary);
        for (id, nodes) in ways {
            collector.observe_way(*id, nodes.iter().map(|(n, _, _)| *n));
        }
        assert_eq!(collector.ways_seen(), ways.len() as u64);
        let collected = collector.finish();

        let mut index = LocationIndex::new(collected.required_nodes());
        for (_, nodes) in ways {
            for (id, lat, lon) in nodes {
                index.observe_node(*id, *lat, *lon);
            }
        }
        collected.resolve(&index)
    }

    fn node(id: i64, lat: f64, lon: f64) -> BorderNode {
        BorderNode { id, lat, lon }
    }

    #[test]
    fn keeps_only_boundary_ways() {
        let boundary = HashSet::from([101]);
        let border = run(
            &boundary,
            &[
                (101, vec![(1, 55.0, 37.0), (2, 56.0, 38.0)]),
                (102, vec![(3, 50.0, 30.0)]),
            ],
        )
        .unwrap();

        assert_eq!(
            border.ways,
            vec![BorderWay {
                id: 101,
                nodes: vec![node(1, 55.0, 37.0), node(2, 56.0, 38.0)],
            }]
        );
    }

    #[test]
    fn preserves_way_and_node_order() {
        let boundary = HashSet::from([5, 3, 9]);
        let border = run(
            &boundary,
            &[
                (9, vec![(30, 1.5, 2.5), (10, 1.25, 2.125), (20, 1.0, 2.0)]),
                (4, vec![(10, 0.0, 0.0)]),
                (3, vec![(20, 1.0, 2.0), (30, 1.5, 2.5)]),
                (5, vec![(40, -33.8688197, 151.2092955)]),
            ],
        )
        .unwrap();

        let ids: Vec<i64> = border.ways.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![9, 3, 5]);

        let first: Vec<i64> = border.ways[0].nodes.iter().map(|n| n.id).collect();
        assert_eq!(first, vec![30, 10, 20]);
        assert_eq!(border.ways[2].nodes[0], node(40, -33.8688197, 151.2092955));
    }

    #[test]
    fn closed_way_repeats_first_node() {
        let boundary = HashSet::from([1]);
        let border = run(
            &boundary,
            &[(1, vec![(1, 0.0, 0.0), (2, 0.0, 1.0), (3, 1.0, 1.0), (1, 0.0, 0.0)])],
        )
        .unwrap();

        assert_eq!(border.ways[0].nodes.len(), 4);
        assert_eq!(border.ways[0].nodes[0], border.ways[0].nodes[3]);
    }

    #[test]
    fn repeated_way_replaces_in_place() {
        let boundary = HashSet::from([1, 2]);
        let mut collector = WayCollector::new(&boundary);
        collector.observe_way(1, [10]);
        collector.observe_way(2, [20]);
        collector.observe_way(1, [11, 12]);

        let collected = collector.finish();
        assert_eq!(collected.way_ids().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(collected.required_nodes(), HashSet::from([11, 12, 20]));
    }

    #[test]
    fn empty_boundary_keeps_nothing() {
        let boundary = HashSet::new();
        let border = run(&boundary, &[(1, vec![(1, 0.0, 0.0)])]).unwrap();
        assert!(border.is_empty());
    }

    #[test]
    fn index_only_stores_wanted_nodes() {
        let mut index = LocationIndex::new(HashSet::from([1, 2]));
        index.observe_node(1, 10.0, 20.0);
        index.observe_node(3, 30.0, 40.0);

        assert_eq!(index.len(), 1);
        assert_eq!(index.missing(), 1);
        assert_eq!(index.get(1), Some((10.0, 20.0)));
        assert_eq!(index.get(3), None);
    }

    #[test]
    fn unlocated_node_is_an_error() {
        let boundary = HashSet::from([7]);
        let mut collector = WayCollector::new(&boundary);
        collector.observe_way(7, [70, 71]);

        let collected = collector.finish();
        let mut index = LocationIndex::new(collected.required_nodes());
        index.observe_node(70, 1.0, 1.0);

        let err = collected.resolve(&index).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingLocation { way: 7, node: 71 }
        ));
    }
}
