//! Critical-Distance Diagram Layout
//!
//! Computes the geometry of a critical-distance diagram from the pairwise
//! adjacency the Nemenyi stage reports: a horizontal rank axis, algorithm
//! labels split into left/right columns, and the horizontal bars connecting
//! algorithms that are not significantly different. The "not significantly
//! different" relation is not transitive, so the bars may overlap; they are
//! derived per-algorithm from adjacency, never from flattened groups.

use empirica_stats::CriticalDistanceResult;
use serde::{Deserialize, Serialize};

/// One labeled algorithm on the diagram
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdEntry {
    /// Algorithm name
    pub algorithm: String,
    /// Its average rank (position on the axis)
    pub rank: f64,
}

/// One non-significance bar spanning a rank interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CdSegment {
    /// Left end of the bar (smallest rank it covers)
    pub lo: f64,
    /// Right end of the bar
    pub hi: f64,
}

/// Full diagram geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdDiagram {
    /// Critical distance drawn as the ruler above the axis
    pub cd: f64,
    /// Smallest axis tick (floor of the best average rank)
    pub lowest: usize,
    /// Largest axis tick (ceiling of the worst average rank)
    pub highest: usize,
    /// Better-ranked half, top-down, labels drawn on the left
    pub left: Vec<CdEntry>,
    /// Worse-ranked half, labels drawn on the right
    pub right: Vec<CdEntry>,
    /// Non-significance bars, sorted by left end
    pub segments: Vec<CdSegment>,
}

/// Lay out a critical-distance diagram.
///
/// `algorithms` must be in the same order as the ranks inside `result`.
pub fn layout_cd_diagram(algorithms: &[String], result: &CriticalDistanceResult) -> CdDiagram {
    let k = algorithms.len();

    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| {
        result.average_ranks[a]
            .partial_cmp(&result.average_ranks[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let entries: Vec<CdEntry> = order
        .iter()
        .map(|&i| CdEntry {
            algorithm: algorithms[i].clone(),
            rank: result.average_ranks[i],
        })
        .collect();

    let split = k.div_ceil(2);
    let (left, right) = entries.split_at(split);

    let lowest = entries
        .first()
        .map(|e| e.rank.floor() as usize)
        .unwrap_or(1);
    let highest = entries
        .last()
        .map(|e| e.rank.ceil() as usize)
        .unwrap_or(1);

    // One candidate bar per algorithm: from its rank to the furthest
    // worse-ranked algorithm it is still adjacent to. Bars fully covered by an
    // earlier bar add nothing and are dropped.
    let mut segments: Vec<CdSegment> = Vec::new();
    for (pos, &i) in order.iter().enumerate() {
        let mut furthest: Option<f64> = None;
        for &j in &order[pos + 1..] {
            if result.adjacency[i][j] {
                furthest = Some(result.average_ranks[j]);
            }
        }
        if let Some(hi) = furthest {
            let seg = CdSegment {
                lo: result.average_ranks[i],
                hi,
            };
            if segments.last().map_or(true, |prev| prev.hi < seg.hi) {
                segments.push(seg);
            }
        }
    }

    CdDiagram {
        cd: result.cd,
        lowest,
        highest,
        left: left.to_vec(),
        right: right.to_vec(),
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use empirica_stats::critical_distance;

    fn names(k: usize) -> Vec<String> {
        (0..k).map(|i| format!("alg{i}")).collect()
    }

    #[test]
    fn test_split_and_ordering() {
        let ranks = vec![3.1, 1.2, 2.0, 3.9, 2.8];
        let result = critical_distance(&ranks, 20, 0.05).unwrap();
        let d = layout_cd_diagram(&names(5), &result);
        assert_eq!(d.left.len(), 3);
        assert_eq!(d.right.len(), 2);
        assert_eq!(d.left[0].algorithm, "alg1");
        assert_eq!(d.right[1].algorithm, "alg3");
        assert_eq!(d.lowest, 1); // floor(1.2)
        assert_eq!(d.highest, 4);
    }

    #[test]
    fn test_overlapping_segments_preserved() {
        // Chain adjacency: 1.0~2.0, 2.0~3.0, but not 1.0~3.0 (cd ~ 1.28)
        let ranks = vec![1.0, 2.0, 3.0];
        let result = critical_distance(&ranks, 8, 0.05).unwrap();
        let d = layout_cd_diagram(&names(3), &result);
        assert_eq!(
            d.segments,
            vec![
                CdSegment { lo: 1.0, hi: 2.0 },
                CdSegment { lo: 2.0, hi: 3.0 },
            ]
        );
    }

    #[test]
    fn test_contained_segments_dropped() {
        // Everything within cd of everything: one bar spanning all ranks
        let ranks = vec![2.0, 2.1, 2.2];
        let result = critical_distance(&ranks, 10, 0.05).unwrap();
        let d = layout_cd_diagram(&names(3), &result);
        assert_eq!(d.segments, vec![CdSegment { lo: 2.0, hi: 2.2 }]);
    }

    #[test]
    fn test_no_segments_when_all_distinct() {
        let ranks = vec![1.0, 5.0, 9.0];
        let result = critical_distance(&ranks, 100, 0.05).unwrap();
        let d = layout_cd_diagram(&names(3), &result);
        assert!(d.segments.is_empty());
    }
}
