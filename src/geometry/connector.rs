//! Assembly of unordered boundary arcs into connected paths.

use crate::geometry::{GreatArc, GreatArcPath};

/// Connects arcs end-to-start into paths.
///
/// Full arcs become single-arc paths. Chains that cannot be closed are
/// started from arcs with no incoming connection, so each open chain comes
/// out whole. When several arcs leave the same vertex, the one forming the
/// smallest interior angle with the current arc is taken, which keeps
/// regions touching at a single vertex in separate loops. A chain stops as
/// soon as it returns to its own start.
#[must_use]
pub fn connect_minimized(arcs: impl IntoIterator<Item = GreatArc>) -> Vec<GreatArcPath> {
    let mut paths = Vec::new();
    let mut bounded = Vec::new();
    for arc in arcs {
        if arc.is_full() {
            paths.push(GreatArcPath::from_arc(arc));
        } else {
            bounded.push(arc);
        }
    }

    let count = bounded.len();
    let has_incoming: Vec<bool> = (0..count)
        .map(|i| (0..count).any(|j| j != i && connects(&bounded[j], &bounded[i])))
        .collect();
    let order = (0..count)
        .filter(|&i| !has_incoming[i])
        .chain((0..count).filter(|&i| has_incoming[i]));

    let mut used = vec![false; count];
    for start in order {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut chain = vec![bounded[start]];
        loop {
            let current = chain[chain.len() - 1];
            if chain.len() > 1 && connects(&current, &chain[0]) {
                break;
            }
            let next = (0..count)
                .filter(|&j| !used[j] && connects(&current, &bounded[j]))
                .max_by(|&a, &b| {
                    turn_angle(&current, &bounded[a]).total_cmp(&turn_angle(&current, &bounded[b]))
                });
            let Some(next) = next else {
                break;
            };
            used[next] = true;
            chain.push(bounded[next]);
        }
        paths.push(GreatArcPath::from_connected(chain));
    }
    tracing::trace!(paths = paths.len(), arcs = count, "connected boundary arcs");
    paths
}

fn connects(previous: &GreatArc, next: &GreatArc) -> bool {
    match (previous.end_point(), next.start_point()) {
        (Some(end), Some(start)) => end.approx_eq(&start, previous.precision()),
        _ => false,
    }
}

/// Signed turn from `current` onto `next` at their shared vertex; the
/// interior angle on the minus side is `π` minus this value.
fn turn_angle(current: &GreatArc, next: &GreatArc) -> f64 {
    match current.end_point() {
        Some(vertex) => current.circle().angle_at(next.circle(), &vertex),
        None => 0.0,
    }
}
