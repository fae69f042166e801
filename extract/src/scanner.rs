use crate::{config::TargetTag, error::ExtractError};
use log::{debug, warn};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Node,
    Way,
    Relation,
}

impl From<osmpbf::RelMemberType> for MemberKind {
    fn from(value: osmpbf::RelMemberType) -> Self {
        match value {
            osmpbf::RelMemberType::Node => MemberKind::Node,
            osmpbf::RelMemberType::Way => MemberKind::Way,
            osmpbf::RelMemberType::Relation => MemberKind::Relation,
        }
    }
}

/// Finds the target relation and remembers the ids of its boundary ways.
pub struct RelationScanner<'a> {
    target: &'a TargetTag,
    matched: Option<i64>,
    ignored: Vec<i64>,
    boundary_ways: HashSet<i64>,
    relations_seen: u64,
}

impl<'a> RelationScanner<'a> {
    pub fn new(target: &'a TargetTag) -> RelationScanner<'a> {
        RelationScanner {
            target,
            matched: None,
            ignored: Vec::new(),
            boundary_ways: HashSet::new(),
            relations_seen: 0,
        }
    }

    /// Members are only walked for the first matching relation, so callers should pass a lazy
    /// iterator.
    pub fn observe_relation<'t, T, M>(&mut self, id: i64, tags: T, members: M)
    where
        T: IntoIterator<Item = (&'t str, &'t str)>,
        M: IntoIterator<Item = (MemberKind, i64, &'t str)>,
    {
        self.relations_seen += 1;

        if !self.target.matches(tags) {
            return;
        }

        if self.matched.is_some() {
            debug!("Relation {id} also matches, ignoring it");
            self.ignored.push(id);
            return;
        }

        let target = self.target;
        debug!("Relation {id} matches {}={}", target.key, target.value);
        self.matched = Some(id);
        self.boundary_ways.extend(
            members
                .into_iter()
                .filter(|(kind, _, role)| *kind == MemberKind::Way && *role == target.role)
                .map(|(_, member_id, _)| member_id),
        );
    }

    pub fn relations_seen(&self) -> u64 {
        self.relations_seen
    }

    pub fn finish(self) -> RelationMatch {
        RelationMatch {
            relation: self.matched,
            ignored: self.ignored,
            boundary_ways: self.boundary_ways,
        }
    }
}

#[derive(Debug, Default)]
pub struct RelationMatch {
    pub relation: Option<i64>,
    /// Later relations that matched the same tag.
    pub ignored: Vec<i64>,
    pub boundary_ways: HashSet<i64>,
}

impl RelationMatch {
    /// Reports a missing or ambiguous match, as a warning or, if `require_unique` is set, as an
    /// error. Returns the boundary way set to filter the way pass with.
    pub fn into_boundary_ways(
        self,
        target: &TargetTag,
        require_unique: bool,
    ) -> Result<HashSet<i64>, ExtractError> {
        match self.relation {
            None if require_unique => {
                return Err(ExtractError::NoMatchingRelation {
                    key: target.key.clone(),
                    value: target.value.clone(),
                })
            }
            None => warn!(
                "No relation is tagged {}={}, output will be empty",
                target.key, target.value
            ),
            Some(first) if !self.ignored.is_empty() => {
                if require_unique {
                    return Err(ExtractError::AmbiguousRelation {
                        key: target.key.clone(),
                        value: target.value.clone(),
                        first,
                        ignored: self.ignored,
                    });
                }
                warn!(
                    "{} relations are tagged {}={}, using {first} and ignoring {:?}",
                    self.ignored.len() + 1,
                    target.key,
                    target.value,
                    self.ignored
                );
            }
            Some(_) => {}
        }

        Ok(self.boundary_ways)
    }
}
