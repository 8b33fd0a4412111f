//! Balanced linear assignment (spec §4.5 "Net mapping (post-step)"): map a
//! small set of continuous scalp positions onto a net's discrete electrode
//! positions, minimizing total Euclidean distance. Implemented as the
//! classic Kuhn-Munkres shortest-augmenting-path algorithm over a dense
//! cost matrix — net sizes here are in the hundreds at most, so the
//! O(n^2 m) cost is negligible next to a single solver call.

use ti_core::geometry::Point3;
use ti_core::net::ElectrodeNet;

/// One optimized point's mapping onto the net, or lack of one if there
/// were more points than net electrodes (spec: "reported distances flag
/// the degenerate fit").
#[derive(Debug, Clone)]
pub struct MappedElectrode {
    pub electrode_label: String,
    pub electrode_position: Point3,
    pub optimized_position: Point3,
    pub distance_mm: f64,
}

/// The full net-mapping result: one entry per optimized point that could
/// be matched, plus the indices of any points left over when there were
/// more points than net electrodes.
#[derive(Debug, Clone)]
pub struct NetMapping {
    pub mapped: Vec<MappedElectrode>,
    pub unmapped_point_indices: Vec<usize>,
}

/// Assigns each of `positions` to a distinct electrode in `net`, minimizing
/// total Euclidean distance. When `positions.len() > net` electrode count,
/// every net electrode is used but some positions are left unmapped;
/// `unmapped_point_indices` names which.
pub fn assign_to_net(positions: &[Point3], net: &ElectrodeNet) -> NetMapping {
    let n_points = positions.len();
    let n_electrodes = net.electrodes.len();
    if n_points == 0 || n_electrodes == 0 {
        return NetMapping { mapped: Vec::new(), unmapped_point_indices: (0..n_points).collect() };
    }

    if n_points <= n_electrodes {
        // Rows = points (fully assigned), columns = electrodes.
        let cost = build_cost_matrix(positions, net);
        let row_to_col = hungarian_min_cost(&cost);
        let mapped = (0..n_points)
            .map(|i| {
                let j = row_to_col[i];
                let (label, epos) = &net.electrodes[j];
                MappedElectrode {
                    electrode_label: label.clone(),
                    electrode_position: *epos,
                    optimized_position: positions[i],
                    distance_mm: positions[i].distance(epos),
                }
            })
            .collect();
        NetMapping { mapped, unmapped_point_indices: Vec::new() }
    } else {
        // Rows = electrodes (fully assigned), columns = points; invert to
        // get which point each electrode took, then find the leftover
        // points nobody claimed.
        let electrode_positions: Vec<Point3> = net.electrodes.iter().map(|(_, p)| *p).collect();
        let cost = build_cost_matrix(&electrode_positions, &ElectrodeNet { name: net.name.clone(), electrodes: positions.iter().enumerate().map(|(i, p)| (i.to_string(), *p)).collect() });
        let electrode_to_point = hungarian_min_cost(&cost);
        let mut used_points = vec![false; n_points];
        let mapped = (0..n_electrodes)
            .map(|e| {
                let point_idx = electrode_to_point[e];
                used_points[point_idx] = true;
                let (label, epos) = &net.electrodes[e];
                MappedElectrode {
                    electrode_label: label.clone(),
                    electrode_position: *epos,
                    optimized_position: positions[point_idx],
                    distance_mm: positions[point_idx].distance(epos),
                }
            })
            .collect();
        let unmapped_point_indices = (0..n_points).filter(|&i| !used_points[i]).collect();
        NetMapping { mapped, unmapped_point_indices }
    }
}

fn build_cost_matrix(rows: &[Point3], net: &ElectrodeNet) -> Vec<Vec<f64>> {
    rows.iter().map(|p| net.electrodes.iter().map(|(_, ep)| p.distance(ep)).collect()).collect()
}

/// Kuhn-Munkres shortest-augmenting-path assignment for a dense
/// `rows x cols` cost matrix with `rows <= cols`. Returns `row_to_col[i]`,
/// the column assigned to row `i`, minimizing total cost.
fn hungarian_min_cost(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    let m = cost[0].len();
    debug_assert!(n <= m);

    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; m + 1];
    let mut p = vec![0usize; m + 1]; // p[j] = 1-indexed row assigned to column j
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;
            for j in 1..=m {
                if !used[j] {
                    let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                    if cur < minv[j] {
                        minv[j] = cur;
                        way[j] = j0;
                    }
                    if minv[j] < delta {
                        delta = minv[j];
                        j1 = j;
                    }
                }
            }
            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![usize::MAX; n];
    for (j, &assigned_row) in p.iter().enumerate().skip(1) {
        if assigned_row != 0 {
            row_to_col[assigned_row - 1] = j - 1;
        }
    }
    row_to_col
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(electrodes: &[(&str, f64, f64, f64)]) -> ElectrodeNet {
        ElectrodeNet {
            name: "test".into(),
            electrodes: electrodes.iter().map(|&(l, x, y, z)| (l.to_string(), Point3::new(x, y, z))).collect(),
        }
    }

    #[test]
    fn single_point_maps_to_nearest_electrode() {
        let n = net(&[("A", 0.0, 0.0, 0.0), ("B", 10.0, 0.0, 0.0)]);
        let mapping = assign_to_net(&[Point3::new(0.5, 0.0, 0.0)], &n);
        assert_eq!(mapping.mapped.len(), 1);
        assert_eq!(mapping.mapped[0].electrode_label, "A");
        assert!(mapping.unmapped_point_indices.is_empty());
    }

    #[test]
    fn optimal_assignment_beats_greedy_nearest_first() {
        // Point 0 is closest to A, but so is point 1 (slightly less close);
        // the optimal assignment swaps them to minimize total distance.
        let n = net(&[("A", 0.0, 0.0, 0.0), ("B", 1.0, 0.0, 0.0)]);
        let positions = [Point3::new(0.1, 0.0, 0.0), Point3::new(0.9, 0.0, 0.0)];
        let mapping = assign_to_net(&positions, &n);
        let total: f64 = mapping.mapped.iter().map(|m| m.distance_mm).sum();
        assert!((total - 0.2).abs() < 1e-9);
    }

    #[test]
    fn more_points_than_electrodes_flags_unmapped() {
        let n = net(&[("A", 0.0, 0.0, 0.0)]);
        let positions = [Point3::new(0.0, 0.0, 0.0), Point3::new(100.0, 0.0, 0.0)];
        let mapping = assign_to_net(&positions, &n);
        assert_eq!(mapping.mapped.len(), 1);
        assert_eq!(mapping.unmapped_point_indices.len(), 1);
        assert_eq!(mapping.mapped[0].optimized_position, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn more_electrodes_than_points_leaves_some_electrodes_unused() {
        let n = net(&[("A", 0.0, 0.0, 0.0), ("B", 5.0, 0.0, 0.0), ("C", 10.0, 0.0, 0.0)]);
        let positions = [Point3::new(5.1, 0.0, 0.0)];
        let mapping = assign_to_net(&positions, &n);
        assert_eq!(mapping.mapped.len(), 1);
        assert_eq!(mapping.mapped[0].electrode_label, "B");
    }
}
