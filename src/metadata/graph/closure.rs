//! Cycle-safe breadth-first closure over the graph arena.
//!
//! Every relationship query is the same traversal with a different expansion function: the
//! expansion lists the neighbours of a node as [`Step`]s, each either reported in the
//! result or only traversed through (a superclass visited to reach its inherited
//! annotations is not itself an annotation). Visited and reported state are kept in two
//! bit vectors indexed by [`NodeId`], so every node is expanded at most once and reported
//! at most once no matter how many cycles lead back to it.
//!
//! The seed starts out visited but unreported: it appears in the result only when some
//! step reports it, i.e. when a cycle routes back to it. Nodes reported while expanding
//! the seed itself form the first layer and are flagged as direct.

use crate::metadata::graph::NodeId;

/// One outgoing edge produced by an expansion function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Step {
    pub target: NodeId,
    pub report: bool,
}

impl Step {
    /// Follow the edge and include the target in the result
    pub fn report(target: NodeId) -> Self {
        Step {
            target,
            report: true,
        }
    }

    /// Follow the edge without reporting the target
    pub fn traverse(target: NodeId) -> Self {
        Step {
            target,
            report: false,
        }
    }
}

/// Compute the closure of `seed`.
///
/// Returns reported nodes in discovery order, each with its direct flag.
pub(crate) fn closure<F>(node_count: usize, seed: NodeId, mut expand: F) -> Vec<(NodeId, bool)>
where
    F: FnMut(NodeId, &mut Vec<Step>),
{
    if seed.index() >= node_count {
        return Vec::new();
    }

    let mut visited = vec![false; node_count];
    let mut reported = vec![false; node_count];
    let mut result = Vec::new();

    let mut frontier = vec![seed];
    let mut next = Vec::new();
    let mut steps = Vec::new();
    let mut first_layer = true;
    visited[seed.index()] = true;

    while !frontier.is_empty() {
        for &node in &frontier {
            steps.clear();
            expand(node, &mut steps);

            for step in &steps {
                let index = step.target.index();
                if step.report && !reported[index] {
                    reported[index] = true;
                    result.push((step.target, first_layer));
                }
                if !visited[index] {
                    visited[index] = true;
                    next.push(step.target);
                }
            }
        }

        std::mem::swap(&mut frontier, &mut next);
        next.clear();
        first_layer = false;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(edges: &[&[usize]], seed: usize) -> Vec<(usize, bool)> {
        closure(edges.len(), NodeId(seed), |node, steps| {
            steps.extend(edges[node.0].iter().map(|&t| Step::report(NodeId(t))));
        })
        .into_iter()
        .map(|(id, direct)| (id.0, direct))
        .collect()
    }

    #[test]
    fn chain() {
        let edges: &[&[usize]] = &[&[1], &[2], &[]];
        assert_eq!(run(edges, 0), [(1, true), (2, false)]);
        assert_eq!(run(edges, 2), []);
    }

    #[test]
    fn diamond_reports_once() {
        let edges: &[&[usize]] = &[&[1, 2], &[3], &[3], &[]];
        assert_eq!(run(edges, 0), [(1, true), (2, true), (3, false)]);
    }

    #[test]
    fn two_cycle_terminates_and_reports_seed() {
        let edges: &[&[usize]] = &[&[1], &[0]];
        assert_eq!(run(edges, 0), [(1, true), (0, false)]);
        assert_eq!(run(edges, 1), [(0, true), (1, false)]);
    }

    #[test]
    fn self_loop_is_direct() {
        let edges: &[&[usize]] = &[&[0, 1], &[]];
        assert_eq!(run(edges, 0), [(0, true), (1, true)]);
    }

    #[test]
    fn traversed_nodes_are_not_reported() {
        // 0 -> (1 traversed) -> 2 reported
        let result = closure(3, NodeId(0), |node, steps| match node.0 {
            0 => steps.push(Step::traverse(NodeId(1))),
            1 => steps.push(Step::report(NodeId(2))),
            _ => {}
        });
        assert_eq!(result, [(NodeId(2), false)]);
    }

    #[test]
    fn out_of_range_seed() {
        assert!(closure(2, NodeId(5), |_, _| {}).is_empty());
    }
}
