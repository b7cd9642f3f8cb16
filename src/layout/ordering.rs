use std::cmp::Ordering;

use crate::config::{OrderHeuristic, OrderingConfig};

use super::ranking::LayeredGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    /// Top to bottom, ordering each layer against the one above.
    Down,
    /// Bottom to top, ordering each layer against the one below.
    Up,
}

/// Total crossings over all adjacent layer pairs.
pub fn crossing_count(layered: &LayeredGraph) -> usize {
    let positions = layered.positions();
    layered
        .layers
        .windows(2)
        .map(|pair| two_layer_cross_count(layered, &positions, &pair[0], &pair[1]))
        .sum()
}

/// Accumulator-tree count (Barth, Jünger, Mutzel): walk the north layer in
/// order, insert each segment's south position into a binary tree of
/// counts, and add the number of earlier segments ending further right.
fn two_layer_cross_count(
    layered: &LayeredGraph,
    positions: &[usize],
    north: &[usize],
    south: &[usize],
) -> usize {
    if south.is_empty() {
        return 0;
    }

    let mut south_entries: Vec<usize> = Vec::new();
    for &vertex in north {
        let mut entries: Vec<usize> = layered.down[vertex]
            .iter()
            .map(|&low| positions[low])
            .collect();
        entries.sort_unstable();
        south_entries.extend(entries);
    }

    let mut first_index: usize = 1;
    while first_index < south.len() {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let mut tree = vec![0usize; tree_size];

    let mut cc = 0usize;
    for pos in south_entries {
        let mut index = pos + first_index;
        tree[index] += 1;
        let mut weight_sum = 0usize;
        while index > 0 {
            if index % 2 == 1 {
                weight_sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += 1;
        }
        cc += weight_sum;
    }
    cc
}

/// Reorders every layer to reduce crossings. Layers no larger than
/// `exact_threshold` are solved exactly against both neighbor layers; the
/// rest are sorted by barycenter or median. The best ordering seen, the
/// input ordering included, is kept.
pub fn minimize_crossings(mut layered: LayeredGraph, config: &OrderingConfig) -> LayeredGraph {
    let initial = crossing_count(&layered);
    let mut best_layers = layered.layers.clone();
    let mut best = initial;
    let mut unchanged = 0usize;
    let mut sweeps = 0usize;

    if layered.layers.len() > 1 {
        while best > 0 && sweeps < config.sweep_limit && unchanged < 2 {
            let sweep = if sweeps % 2 == 0 { Sweep::Down } else { Sweep::Up };
            let before = layered.layers.clone();
            run_sweep(&mut layered, sweep, config);
            sweeps += 1;

            if layered.layers == before {
                unchanged += 1;
            } else {
                unchanged = 0;
            }

            let current = crossing_count(&layered);
            if current < best {
                best = current;
                best_layers.clone_from(&layered.layers);
            }
        }
    }

    tracing::debug!(initial, best, sweeps, "minimized crossings");
    layered.layers = best_layers;
    layered
}

fn run_sweep(layered: &mut LayeredGraph, sweep: Sweep, config: &OrderingConfig) {
    let mut positions = layered.positions();
    let layer_count = layered.layers.len();
    let order: Vec<usize> = match sweep {
        Sweep::Down => (1..layer_count).collect(),
        Sweep::Up => (0..layer_count.saturating_sub(1)).rev().collect(),
    };
    for layer in order {
        if layered.layers[layer].len() <= 1 {
            continue;
        }
        let reordered = if layered.layers[layer].len() <= config.exact_threshold {
            exact_order(layered, &positions, &layered.layers[layer])
        } else {
            heuristic_order(layered, &positions, layer, sweep, config.heuristic)
        };
        for (pos, &vertex) in reordered.iter().enumerate() {
            positions[vertex] = pos;
        }
        layered.layers[layer] = reordered;
    }
}

/// Stable sort by neighbor barycenter/median on the fixed side. Vertices
/// without neighbors there keep their current position as key.
fn heuristic_order(
    layered: &LayeredGraph,
    positions: &[usize],
    layer: usize,
    sweep: Sweep,
    heuristic: OrderHeuristic,
) -> Vec<usize> {
    let neighbors = match sweep {
        Sweep::Down => &layered.up,
        Sweep::Up => &layered.down,
    };
    let mut keyed: Vec<(f32, usize)> = layered.layers[layer]
        .iter()
        .map(|&vertex| {
            let key = neighbor_key(&neighbors[vertex], positions, heuristic)
                .unwrap_or(positions[vertex] as f32);
            (key, vertex)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    keyed.into_iter().map(|(_, vertex)| vertex).collect()
}

fn neighbor_key(neighbors: &[usize], positions: &[usize], heuristic: OrderHeuristic) -> Option<f32> {
    if neighbors.is_empty() {
        return None;
    }
    let mut values: Vec<f32> = neighbors.iter().map(|&n| positions[n] as f32).collect();
    match heuristic {
        OrderHeuristic::Barycenter => Some(values.iter().sum::<f32>() / values.len() as f32),
        OrderHeuristic::Median => {
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            let mid = values.len() / 2;
            if values.len() % 2 == 1 {
                Some(values[mid])
            } else {
                Some((values[mid - 1] + values[mid]) * 0.5)
            }
        }
    }
}

/// Crossings among segments of `a` and `b` (towards one fixed layer) when
/// `a` is placed left of `b`.
fn pair_crossings(a: &[usize], b: &[usize], positions: &[usize]) -> usize {
    let mut count = 0;
    for &na in a {
        for &nb in b {
            if positions[na] > positions[nb] {
                count += 1;
            }
        }
    }
    count
}

struct ExactSearch {
    /// `cost[i][j]`: crossings caused by placing `i` left of `j`.
    cost: Vec<Vec<usize>>,
    best: usize,
    best_perm: Vec<usize>,
}

impl ExactSearch {
    fn pair_min(&self, i: usize, j: usize) -> usize {
        self.cost[i][j].min(self.cost[j][i])
    }

    fn search(&mut self, placed: &mut Vec<usize>, used: &mut [bool], cost: usize, remaining_min: usize) {
        let n = used.len();
        if placed.len() == n {
            if cost < self.best {
                self.best = cost;
                self.best_perm.clone_from(placed);
            }
            return;
        }
        for next in 0..n {
            if used[next] {
                continue;
            }
            let mut added = 0;
            let mut released = 0;
            for other in 0..n {
                if used[other] || other == next {
                    continue;
                }
                added += self.cost[next][other];
                released += self.pair_min(next, other);
            }
            let cost_next = cost + added;
            let remaining_next = remaining_min - released;
            if cost_next + remaining_next >= self.best {
                continue;
            }
            used[next] = true;
            placed.push(next);
            self.search(placed, used, cost_next, remaining_next);
            placed.pop();
            used[next] = false;
        }
    }
}

/// Branch-and-bound over permutations of one layer, minimizing crossings
/// against both adjacent layers. The lower bound adds, for every pair not
/// yet placed, the cheaper of its two relative orders. Ties keep the
/// earliest permutation in current order, so the current order wins when
/// it is already optimal.
fn exact_order(layered: &LayeredGraph, positions: &[usize], layer: &[usize]) -> Vec<usize> {
    let n = layer.len();
    let mut cost = vec![vec![0usize; n]; n];
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let (a, b) = (layer[i], layer[j]);
            cost[i][j] = pair_crossings(&layered.up[a], &layered.up[b], positions)
                + pair_crossings(&layered.down[a], &layered.down[b], positions);
        }
    }

    let mut current = 0;
    let mut remaining_min = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            current += cost[i][j];
            remaining_min += cost[i][j].min(cost[j][i]);
        }
    }
    if current == remaining_min {
        return layer.to_vec();
    }

    let mut search = ExactSearch {
        cost,
        best: current,
        best_perm: (0..n).collect(),
    };
    let mut placed = Vec::with_capacity(n);
    let mut used = vec![false; n];
    search.search(&mut placed, &mut used, 0, remaining_min);

    search.best_perm.into_iter().map(|idx| layer[idx]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::ir::NodeRecord;
    use crate::layout::ranking::assign_layers;

    fn layered(records: &[NodeRecord]) -> LayeredGraph {
        assign_layers(&Graph::build(records).unwrap())
    }

    /// Two roots whose children are listed in swapped order.
    fn crossed() -> Vec<NodeRecord> {
        vec![
            NodeRecord::new("a", &[]),
            NodeRecord::new("b", &[]),
            NodeRecord::new("y", &["b"]),
            NodeRecord::new("x", &["a"]),
        ]
    }

    #[test]
    fn counts_simple_crossing() {
        assert_eq!(crossing_count(&layered(&crossed())), 1);
    }

    #[test]
    fn counts_k22_crossing() {
        // Complete bipartite K(2,2) always has exactly one crossing.
        let graph = layered(&[
            NodeRecord::new("a", &[]),
            NodeRecord::new("b", &[]),
            NodeRecord::new("x", &["a", "b"]),
            NodeRecord::new("y", &["a", "b"]),
        ]);
        assert_eq!(crossing_count(&graph), 1);
        let ordered = minimize_crossings(graph, &OrderingConfig::default());
        assert_eq!(crossing_count(&ordered), 1);
    }

    #[test]
    fn exact_strategy_removes_crossing() {
        let result = minimize_crossings(layered(&crossed()), &OrderingConfig::default());
        assert_eq!(crossing_count(&result), 0);
    }

    #[test]
    fn heuristic_strategy_removes_crossing() {
        let config = OrderingConfig {
            exact_threshold: 0,
            ..OrderingConfig::default()
        };
        let result = minimize_crossings(layered(&crossed()), &config);
        assert_eq!(crossing_count(&result), 0);

        let config = OrderingConfig {
            exact_threshold: 0,
            heuristic: OrderHeuristic::Median,
            ..OrderingConfig::default()
        };
        let result = minimize_crossings(layered(&crossed()), &config);
        assert_eq!(crossing_count(&result), 0);
    }

    #[test]
    fn zero_sweeps_keeps_input_order() {
        let config = OrderingConfig {
            sweep_limit: 0,
            ..OrderingConfig::default()
        };
        let input = layered(&crossed());
        let expected = input.layers.clone();
        let result = minimize_crossings(input, &config);
        assert_eq!(result.layers, expected);
    }

    #[test]
    fn diamond_has_no_crossings() {
        let result = minimize_crossings(
            layered(&[
                NodeRecord::new("A", &[]),
                NodeRecord::new("B", &["A"]),
                NodeRecord::new("C", &["A"]),
                NodeRecord::new("D", &["B", "C"]),
            ]),
            &OrderingConfig::default(),
        );
        assert_eq!(crossing_count(&result), 0);
        assert_eq!(result.layers[1], vec![1, 2]);
    }

    #[test]
    fn isolated_nodes_keep_relative_order() {
        let records = vec![
            NodeRecord::new("a", &[]),
            NodeRecord::new("b", &[]),
            NodeRecord::new("lonely1", &[]),
            NodeRecord::new("lonely2", &[]),
            NodeRecord::new("y", &["b"]),
            NodeRecord::new("x", &["a"]),
        ];
        for threshold in [0, 8] {
            let config = OrderingConfig {
                exact_threshold: threshold,
                ..OrderingConfig::default()
            };
            let result = minimize_crossings(layered(&records), &config);
            let top = &result.layers[0];
            let p1 = top.iter().position(|&v| v == 2).unwrap();
            let p2 = top.iter().position(|&v| v == 3).unwrap();
            assert!(p1 < p2, "threshold {threshold}: {top:?}");
            assert_eq!(crossing_count(&result), 0);
        }
    }

    #[test]
    fn exact_order_beats_or_matches_heuristic() {
        // A wide fan where greedy sorting leaves crossings behind.
        let records = vec![
            NodeRecord::new("r0", &[]),
            NodeRecord::new("r1", &[]),
            NodeRecord::new("r2", &[]),
            NodeRecord::new("c0", &["r2", "r0"]),
            NodeRecord::new("c1", &["r1"]),
            NodeRecord::new("c2", &["r0", "r1"]),
            NodeRecord::new("c3", &["r2"]),
        ];
        let exact = minimize_crossings(layered(&records), &OrderingConfig::default());
        let heuristic = minimize_crossings(
            layered(&records),
            &OrderingConfig {
                exact_threshold: 0,
                ..OrderingConfig::default()
            },
        );
        assert!(crossing_count(&exact) <= crossing_count(&heuristic));
        assert!(crossing_count(&exact) <= crossing_count(&layered(&records)));
    }

    #[test]
    fn heuristic_ties_keep_previous_order() {
        // x and w hang off the same parents, so their keys tie.
        let records = vec![
            NodeRecord::new("p", &[]),
            NodeRecord::new("q", &[]),
            NodeRecord::new("x", &["p", "q"]),
            NodeRecord::new("w", &["q", "p"]),
        ];
        for heuristic in [OrderHeuristic::Barycenter, OrderHeuristic::Median] {
            let graph = layered(&records);
            let positions = graph.positions();
            let order = heuristic_order(&graph, &positions, 1, Sweep::Down, heuristic);
            assert_eq!(order, vec![2, 3], "{heuristic:?}");

            let mut swapped = layered(&records);
            swapped.layers[1] = vec![3, 2];
            let positions = swapped.positions();
            let order = heuristic_order(&swapped, &positions, 1, Sweep::Down, heuristic);
            assert_eq!(order, vec![3, 2], "{heuristic:?}");

            let config = OrderingConfig {
                exact_threshold: 0,
                heuristic,
                ..OrderingConfig::default()
            };
            let result = minimize_crossings(layered(&records), &config);
            assert_eq!(result.layers[1], vec![2, 3], "{heuristic:?}");
        }
    }

    #[test]
    fn median_of_even_neighbor_count_is_midpoint() {
        let positions = vec![0, 3, 1, 5];
        let key = neighbor_key(&[0, 1, 2, 3], &positions, OrderHeuristic::Median);
        assert_eq!(key, Some(2.0));
        let key = neighbor_key(&[0, 1], &positions, OrderHeuristic::Barycenter);
        assert_eq!(key, Some(1.5));
        assert_eq!(neighbor_key(&[], &positions, OrderHeuristic::Median), None);
    }
}
