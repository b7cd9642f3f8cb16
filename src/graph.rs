use std::collections::{HashMap, HashSet};

use crate::error::GraphError;
use crate::ir::NodeRecord;

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub data: serde_json::Value,
    /// Parent indices in the order the record listed them.
    pub parents: Vec<usize>,
    /// Child indices in input order of the children.
    pub children: Vec<usize>,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Validated DAG stored as an arena of nodes with index adjacency in both
/// directions. Node indices follow input order.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Active,
    Done,
}

impl Graph {
    /// Links a flat record list into a graph. Duplicate ids are reported
    /// first, then dangling parents, then cycles; no partial graph is
    /// returned on failure.
    pub fn build(records: &[NodeRecord]) -> Result<Self, GraphError> {
        if records.is_empty() {
            return Err(GraphError::Empty);
        }

        let mut index: HashMap<String, usize> = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if index.insert(record.id.clone(), idx).is_some() {
                return Err(GraphError::DuplicateId {
                    id: record.id.clone(),
                });
            }
        }

        let mut nodes: Vec<Node> = records
            .iter()
            .map(|record| Node {
                id: record.id.clone(),
                data: record.data.clone(),
                parents: Vec::with_capacity(record.parent_ids.len()),
                children: Vec::new(),
            })
            .collect();

        for (child, record) in records.iter().enumerate() {
            let mut seen: HashSet<usize> = HashSet::new();
            for parent_id in &record.parent_ids {
                let Some(&parent) = index.get(parent_id) else {
                    return Err(GraphError::DanglingParent {
                        child: record.id.clone(),
                        parent: parent_id.clone(),
                    });
                };
                if seen.insert(parent) {
                    nodes[child].parents.push(parent);
                    nodes[parent].children.push(child);
                }
            }
        }

        let graph = Self { nodes, index };
        graph.check_acyclic()?;
        Ok(graph)
    }

    /// Iterative depth-first search over parent->child edges. A child that
    /// is still on the active path closes a cycle.
    fn check_acyclic(&self) -> Result<(), GraphError> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        for start in 0..self.nodes.len() {
            if marks[start] != Mark::Unvisited {
                continue;
            }
            // (node, next child cursor)
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
            marks[start] = Mark::Active;
            while let Some(frame) = stack.last_mut() {
                let (node, cursor) = *frame;
                let Some(&child) = self.nodes[node].children.get(cursor) else {
                    marks[node] = Mark::Done;
                    stack.pop();
                    continue;
                };
                frame.1 += 1;
                match marks[child] {
                    Mark::Done => {}
                    Mark::Active => {
                        let from = stack
                            .iter()
                            .position(|(idx, _)| *idx == child)
                            .unwrap_or(0);
                        let mut path: Vec<String> = stack[from..]
                            .iter()
                            .map(|(idx, _)| self.nodes[*idx].id.clone())
                            .collect();
                        path.push(self.nodes[child].id.clone());
                        return Err(GraphError::Cycle { path });
                    }
                    Mark::Unvisited => {
                        marks[child] = Mark::Active;
                        stack.push((child, 0));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|idx| &self.nodes[idx])
    }

    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_root())
            .map(|(idx, _)| idx)
    }

    /// All (parent, child) edges, grouped by child in input order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(child, node)| node.parents.iter().map(move |&parent| (parent, child)))
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.parents.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Vec<NodeRecord> {
        vec![
            NodeRecord::new("A", &[]),
            NodeRecord::new("B", &["A"]),
            NodeRecord::new("C", &["A"]),
            NodeRecord::new("D", &["B", "C"]),
        ]
    }

    #[test]
    fn links_parents_and_children() {
        let graph = Graph::build(&diamond()).unwrap();
        let a = graph.index_of("A").unwrap();
        let d = graph.index_of("D").unwrap();
        assert_eq!(graph.node(a).children.len(), 2);
        assert_eq!(graph.node(d).parents.len(), 2);
        assert_eq!(graph.roots().collect::<Vec<_>>(), vec![a]);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut records = diamond();
        records.push(NodeRecord::new("B", &[]));
        assert_eq!(
            Graph::build(&records).unwrap_err(),
            GraphError::DuplicateId { id: "B".into() }
        );
    }

    #[test]
    fn dangling_parent_is_rejected() {
        let records = vec![NodeRecord::new("A", &[]), NodeRecord::new("B", &["Z"])];
        assert_eq!(
            Graph::build(&records).unwrap_err(),
            GraphError::DanglingParent {
                child: "B".into(),
                parent: "Z".into()
            }
        );
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let records = vec![NodeRecord::new("A", &[]), NodeRecord::new("X", &["X"])];
        let err = Graph::build(&records).unwrap_err();
        assert_eq!(
            err,
            GraphError::Cycle {
                path: vec!["X".into(), "X".into()]
            }
        );
    }

    #[test]
    fn longer_cycle_reports_its_path() {
        let records = vec![
            NodeRecord::new("R", &[]),
            NodeRecord::new("A", &["R", "C"]),
            NodeRecord::new("B", &["A"]),
            NodeRecord::new("C", &["B"]),
        ];
        let GraphError::Cycle { path } = Graph::build(&records).unwrap_err() else {
            panic!("expected a cycle");
        };
        assert_eq!(path.first(), path.last());
        assert_eq!(path.len(), 4);
        for id in ["A", "B", "C"] {
            assert!(path.iter().any(|p| p == id));
        }
    }

    #[test]
    fn repeated_parent_yields_single_edge() {
        let records = vec![NodeRecord::new("A", &[]), NodeRecord::new("B", &["A", "A"])];
        let graph = Graph::build(&records).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node(0).children, vec![1]);
    }

    #[test]
    fn empty_dataset_is_rejected() {
        assert_eq!(Graph::build(&[]).unwrap_err(), GraphError::Empty);
    }
}
