use crate::{
    collector::{CollectedWays, LocationIndex, WayCollector},
    config::ExtractConfig,
    error::ExtractError,
    scanner::{MemberKind, RelationMatch, RelationScanner},
};
use common::Border;
use log::{info, warn};
use osmpbf::{Element, ElementReader};
use std::{collections::HashSet, path::Path};

fn open(path: &Path) -> Result<ElementReader<std::io::BufReader<std::fs::File>>, ExtractError> {
    ElementReader::from_path(path).map_err(|source| ExtractError::Pbf {
        path: path.to_path_buf(),
        source,
    })
}

fn read_err(path: &Path) -> impl FnOnce(osmpbf::Error) -> ExtractError + '_ {
    move |source| ExtractError::Pbf {
        path: path.to_path_buf(),
        source,
    }
}

/// Pbf stores coordinates as integer decimicrodegrees. Dividing once gives the closest f64 to
/// the stored decimal, unlike `lat()`/`lon()` which scale nanodegrees by `1e-9`.
fn degrees(decimicro: i32) -> f64 {
    decimicro as f64 / 1e7
}

pub fn scan_relations(path: &Path, config: &ExtractConfig) -> Result<RelationMatch, ExtractError> {
    let mut scanner = RelationScanner::new(&config.target);

    open(path)?
        .for_each(|elem| {
            if let Element::Relation(relation) = elem {
                // Roles that are not valid utf8 cannot equal the target role
                let members = relation.members().map(|m| {
                    let role = m.role().unwrap_or("");
                    (MemberKind::from(m.member_type), m.member_id, role)
                });
                scanner.observe_relation(relation.id(), relation.tags(), members);
            }
        })
        .map_err(read_err(path))?;

    info!("Scanned {} relations", scanner.relations_seen());
    Ok(scanner.finish())
}

pub fn collect_ways(
    path: &Path,
    boundary_ways: &HashSet<i64>,
) -> Result<CollectedWays, ExtractError> {
    let mut collector = WayCollector::new(boundary_ways);

    open(path)?
        .for_each(|elem| {
            if let Element::Way(way) = elem {
                collector.observe_way(way.id(), way.refs());
            }
        })
        .map_err(read_err(path))?;

    info!("Scanned {} ways", collector.ways_seen());
    Ok(collector.finish())
}

pub fn locate_nodes(path: &Path, wanted: HashSet<i64>) -> Result<LocationIndex, ExtractError> {
    let mut index = LocationIndex::new(wanted);

    open(path)?
        .for_each(|elem| match elem {
            Element::Node(node) => index.observe_node(
                node.id(),
                degrees(node.decimicro_lat()),
                degrees(node.decimicro_lon()),
            ),
            Element::DenseNode(node) => index.observe_node(
                node.id(),
                degrees(node.decimicro_lat()),
                degrees(node.decimicro_lon()),
            ),
            Element::Way(_) | Element::Relation(_) => {}
        })
        .map_err(read_err(path))?;

    Ok(index)
}

/// Runs the passes over the input in order. Each pass needs the complete result of the one
/// before it, since ways and relations can come in any order.
pub fn extract_border(config: &ExtractConfig) -> Result<Border, ExtractError> {
    let path = config.input.as_path();

    info!("Looking for {}={} in {}", config.target.key, config.target.value, path.display());
    let relation = scan_relations(path, config)?;
    if let Some(id) = relation.relation {
        info!(
            "Relation {id} has {} {} ways",
            relation.boundary_ways.len(),
            config.target.role
        );
    }
    let boundary_ways = relation.into_boundary_ways(&config.target, config.require_unique_match)?;

    let collected = collect_ways(path, &boundary_ways)?;
    info!("Kept {} of {} boundary ways", collected.len(), boundary_ways.len());
    if collected.len() < boundary_ways.len() {
        let found: HashSet<i64> = collected.way_ids().collect();
        let mut missing: Vec<i64> = boundary_ways.difference(&found).copied().collect();
        missing.sort_unstable();
        warn!("{} boundary ways are not in the input: {missing:?}", missing.len());
    }
    if collected.is_empty() {
        return Ok(Border::default());
    }

    let index = locate_nodes(path, collected.required_nodes())?;
    info!("Located {} nodes, {} missing", index.len(), index.missing());

    collected.resolve(&index)
}
