//! Matching utilities for multi-object tracking.

use ndarray::Array2;
use tracing::{debug, warn};

use crate::error::Result;
use crate::tracker::detection::Detection;
use crate::tracker::rect::{Rect, iou_batch};
use crate::tracker::registry::TrackRegistry;
use crate::tracker::track::{Track, TrackId};

/// Compute IoU distance matrix between tracks and detections.
///
/// Pairs below `iou_threshold` or with differing classes are marked
/// `f32::INFINITY` and can never be matched.
pub fn gated_iou_distance(tracks: &[&Track], detections: &[&Detection], iou_threshold: f32) -> Array2<f32> {
    let track_boxes: Vec<Rect> = tracks.iter().map(|t| t.predicted_bbox()).collect();
    let det_boxes: Vec<Rect> = detections.iter().map(|d| d.bbox).collect();
    let ious = iou_batch(&track_boxes, &det_boxes);

    let mut dists = Array2::from_elem(ious.dim(), f32::INFINITY);
    for (i, track) in tracks.iter().enumerate() {
        for (j, det) in detections.iter().enumerate() {
            let iou = ious[[i, j]];
            if track.class == det.class && iou >= iou_threshold {
                dists[[i, j]] = 1.0 - iou;
            }
        }
    }
    dists
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Optimal assignment over the finite entries of `cost_matrix`.
///
/// Maximizes the number of matched pairs, then minimizes total cost. When
/// alternatives cost the same, lower row indices win.
pub fn linear_assignment(cost_matrix: &Array2<f32>) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: (0..num_cols).collect(),
        };
    }

    // Excluded pairs and dummy cells cost more than any full set of real
    // pairs (each at most 1.0), so the solver maximizes matches first.
    let size = num_rows.max(num_cols);
    let excluded_cost = size as f64 + 1.0;
    let mut padded = Array2::<f64>::from_elem((size, size), excluded_cost);

    for i in 0..num_rows {
        for j in 0..num_cols {
            let cost = cost_matrix[[i, j]];
            if cost.is_finite() {
                padded[[i, j]] = cost as f64;
            }
        }
    }

    let mut assigned: Vec<Option<usize>> = vec![None; num_rows];
    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row_idx, &col_idx) in row_to_col.iter().enumerate().take(num_rows) {
                if col_idx < num_cols && cost_matrix[[row_idx, col_idx]].is_finite() {
                    assigned[row_idx] = Some(col_idx);
                }
            }
            prefer_lower_rows(cost_matrix, &mut assigned);
        }
        Err(err) => {
            warn!(?err, rows = num_rows, cols = num_cols, "assignment solver failed, leaving frame unmatched");
        }
    }

    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut unmatched_detections_mask: Vec<bool> = vec![true; num_cols];
    for (row_idx, col) in assigned.iter().enumerate() {
        match *col {
            Some(col_idx) => {
                matches.push((row_idx, col_idx));
                unmatched_detections_mask[col_idx] = false;
            }
            None => unmatched_tracks.push(row_idx),
        }
    }

    let unmatched_detections: Vec<usize> = unmatched_detections_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &u)| if u { Some(i) } else { None })
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}

/// Hands a column to the lowest unmatched row that reaches it at exactly the
/// same cost. Total cost and match count are unchanged.
fn prefer_lower_rows(cost_matrix: &Array2<f32>, assigned: &mut [Option<usize>]) {
    loop {
        let mut changed = false;
        for owner in 0..assigned.len() {
            let Some(col) = assigned[owner] else { continue };
            let cost = cost_matrix[[owner, col]];
            if let Some(lower) = (0..owner).find(|&r| assigned[r].is_none() && cost_matrix[[r, col]] == cost) {
                assigned[lower] = Some(col);
                assigned[owner] = None;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}

/// Outcome of one frame's association, expressed in track ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Association {
    /// Matched `(track id, detection index)` pairs, detection index into the input slice.
    pub matches: Vec<(TrackId, usize)>,
    /// Tracks spawned from unmatched detections.
    pub created: Vec<TrackId>,
    /// Tracks that went unmatched this frame.
    pub unmatched: Vec<TrackId>,
    /// Tracks purged at the end of the frame.
    pub deleted: Vec<TrackId>,
}

/// Matches each frame's detections to the live tracks of a registry.
#[derive(Debug, Clone)]
pub struct Associator {
    iou_threshold: f32,
}

impl Associator {
    pub fn new(iou_threshold: f32) -> Self {
        Self { iou_threshold }
    }

    /// Associate one frame and apply the result to `registry`.
    ///
    /// Detections of untracked classes are ignored. Matched tracks are
    /// updated, unmatched detections start new tracks, unmatched tracks are
    /// expired and deleted tracks are purged.
    pub fn associate(&self, registry: &mut TrackRegistry, detections: &[Detection]) -> Result<Association> {
        let det_indices: Vec<usize> = detections
            .iter()
            .enumerate()
            .filter(|(_, d)| d.class.is_tracked())
            .map(|(i, _)| i)
            .collect();
        let dets: Vec<&Detection> = det_indices.iter().map(|&i| &detections[i]).collect();

        let tracks: Vec<&Track> = registry.tracks().iter().collect();
        let track_ids: Vec<TrackId> = tracks.iter().map(|t| t.track_id).collect();

        let dists = gated_iou_distance(&tracks, &dets, self.iou_threshold);
        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = linear_assignment(&dists);

        let mut association = Association::default();

        for (itrack, idet) in matches {
            let id = track_ids[itrack];
            registry.update(id, dets[idet])?;
            association.matches.push((id, det_indices[idet]));
        }

        for itrack in unmatched_tracks {
            let id = track_ids[itrack];
            registry.expire(id)?;
            association.unmatched.push(id);
        }

        for idet in unmatched_detections {
            association.created.push(registry.create(dets[idet]));
        }

        association.deleted = registry.purge_deleted();
        if !association.deleted.is_empty() {
            debug!(ids = ?association.deleted, "tracks deleted");
        }

        Ok(association)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{ObjectClass, TrackState};

    fn det(class: ObjectClass, x: f32, frame: u64) -> Detection {
        Detection::new(class, Rect::new(x, 0.0, 10.0, 10.0), 0.9).at_frame(frame, frame as f64 / 30.0)
    }

    #[test]
    fn test_linear_assignment_prefers_lower_cost() {
        let cost = ndarray::array![[0.1, 0.5], [0.2, 0.15]];
        let result = linear_assignment(&cost);
        assert_eq!(result.matches, vec![(0, 0), (1, 1)]);
        assert!(result.unmatched_tracks.is_empty());
        assert!(result.unmatched_detections.is_empty());
    }

    #[test]
    fn test_linear_assignment_is_optimal_not_greedy() {
        // Greedy would take (0, 0) at 0.1 and strand row 1.
        let cost = ndarray::array![[0.1, 0.2], [0.15, f32::INFINITY]];
        let result = linear_assignment(&cost);
        assert_eq!(result.matches, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_linear_assignment_tie_goes_to_lower_row() {
        let cost = ndarray::array![[0.3], [0.3]];
        let result = linear_assignment(&cost);
        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_tracks, vec![1]);
    }

    #[test]
    fn test_linear_assignment_one_ulp_beats_lower_row() {
        let mut cost = Array2::from_elem((61, 1), f32::INFINITY);
        cost[[0, 0]] = f32::from_bits(0.3f32.to_bits() + 1);
        cost[[60, 0]] = 0.3;
        let result = linear_assignment(&cost);
        assert_eq!(result.matches, vec![(60, 0)]);
        assert_eq!(result.unmatched_tracks.len(), 60);
    }

    #[test]
    fn test_linear_assignment_excluded_pairs() {
        let cost = ndarray::array![[f32::INFINITY, f32::INFINITY]];
        let result = linear_assignment(&cost);
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched_tracks, vec![0]);
        assert_eq!(result.unmatched_detections, vec![0, 1]);
    }

    #[test]
    fn test_linear_assignment_empty() {
        let cost = Array2::<f32>::zeros((0, 3));
        let result = linear_assignment(&cost);
        assert_eq!(result.unmatched_detections, vec![0, 1, 2]);
    }

    #[test]
    fn test_class_mismatch_never_matches() {
        let mut registry = TrackRegistry::new(2, 5);
        let associator = Associator::new(0.3);
        associator
            .associate(&mut registry, &[det(ObjectClass::Person, 0.0, 0)])
            .unwrap();

        let result = associator
            .associate(&mut registry, &[det(ObjectClass::Vehicle, 0.0, 1)])
            .unwrap();
        assert!(result.matches.is_empty());
        assert_eq!(result.created, vec![2]);
        // The tentative person track missed and was removed.
        assert_eq!(result.deleted, vec![1]);
    }

    #[test]
    fn test_below_threshold_spawns_new_track() {
        let mut registry = TrackRegistry::new(2, 5);
        let associator = Associator::new(0.5);
        associator
            .associate(&mut registry, &[det(ObjectClass::Vehicle, 0.0, 0)])
            .unwrap();
        // IoU of a 10px box shifted by 6px is 4/16 = 0.25
        let result = associator
            .associate(&mut registry, &[det(ObjectClass::Vehicle, 6.0, 1)])
            .unwrap();
        assert!(result.matches.is_empty());
        assert_eq!(result.created, vec![2]);
    }

    #[test]
    fn test_untracked_classes_ignored() {
        let mut registry = TrackRegistry::new(2, 5);
        let associator = Associator::new(0.3);
        let result = associator
            .associate(&mut registry, &[det(ObjectClass::Pothole, 0.0, 0)])
            .unwrap();
        assert!(result.created.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_prediction_follows_velocity() {
        // 0 -> 4 gives velocity 4, so the box is expected at 8. Without the
        // prediction the IoU against x=8 would be 2/18, below threshold.
        let mut registry = TrackRegistry::new(1, 5);
        let associator = Associator::new(0.3);
        associator.associate(&mut registry, &[det(ObjectClass::Vehicle, 0.0, 0)]).unwrap();
        associator.associate(&mut registry, &[det(ObjectClass::Vehicle, 4.0, 1)]).unwrap();
        let result = associator
            .associate(&mut registry, &[det(ObjectClass::Vehicle, 8.0, 2)])
            .unwrap();
        assert_eq!(result.matches, vec![(1, 0)]);
        assert_eq!(registry.get(1).unwrap().state, TrackState::Confirmed);
    }
}
