//! Shortest-path resolution over the migration graph of one event type.

use super::registry::{MigrationEdge, MigrationRegistry};
use chatstream_core::event::{EventType, SchemaVersion};
use std::collections::{HashMap, HashSet, VecDeque};

/// An ordered chain of edges leading from one version to another.
///
/// An empty chain is the identity path (`from == to`).
#[derive(Debug, Clone)]
pub struct MigrationPath {
    from: SchemaVersion,
    steps: Vec<MigrationEdge>,
}

impl MigrationPath {
    fn identity(from: SchemaVersion) -> Self {
        Self {
            from,
            steps: Vec::new(),
        }
    }

    pub fn from_version(&self) -> &SchemaVersion {
        &self.from
    }

    /// Returns the version the path ends at.
    pub fn to_version(&self) -> &SchemaVersion {
        self.steps.last().map(|edge| &edge.to).unwrap_or(&self.from)
    }

    pub fn steps(&self) -> &[MigrationEdge] {
        &self.steps
    }

    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns every version visited, starting with the source version.
    pub fn versions(&self) -> Vec<SchemaVersion> {
        std::iter::once(self.from.clone())
            .chain(self.steps.iter().map(|edge| edge.to.clone()))
            .collect()
    }
}

impl MigrationRegistry {
    /// Finds a fewest-hops chain of edges from `from` to `to`.
    ///
    /// Breadth-first over the edges registered for `event_type`. Among paths
    /// of equal length the one whose edges were registered first wins. Cycles
    /// terminate because each version is enqueued at most once.
    ///
    /// Returns `None` when no path exists, including when either version is
    /// unknown or nothing is registered for the event type.
    pub fn resolve(
        &self,
        event_type: EventType,
        from: &SchemaVersion,
        to: &SchemaVersion,
    ) -> Option<MigrationPath> {
        if from == to {
            return Some(MigrationPath::identity(from.clone()));
        }

        let edges = self.edges_for_type(event_type);
        if edges.is_empty() {
            return None;
        }

        let mut adjacency: HashMap<&SchemaVersion, Vec<&MigrationEdge>> = HashMap::new();
        for edge in edges {
            adjacency.entry(&edge.from).or_default().push(edge);
        }

        let mut visited: HashSet<&SchemaVersion> = HashSet::new();
        visited.insert(from);

        let mut queue: VecDeque<(&SchemaVersion, Vec<&MigrationEdge>)> = VecDeque::new();
        queue.push_back((from, Vec::new()));

        while let Some((current, steps)) = queue.pop_front() {
            let Some(outgoing) = adjacency.get(&current) else {
                continue;
            };

            for edge in outgoing {
                let mut next_steps = steps.clone();
                next_steps.push(*edge);

                if &edge.to == to {
                    tracing::debug!(
                        "Resolved {} migration path {} -> {} in {} step(s)",
                        event_type,
                        from,
                        to,
                        next_steps.len()
                    );
                    return Some(MigrationPath {
                        from: from.clone(),
                        steps: next_steps.into_iter().cloned().collect(),
                    });
                }

                if visited.insert(&edge.to) {
                    queue.push_back((&edge.to, next_steps));
                }
            }
        }

        None
    }
}
