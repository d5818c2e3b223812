//! Object tracker: per-frame detections → stable cross-frame objects
//!
//! Per update:
//! - drop face-suppressed detections that overlap a known face this frame
//! - reduce boxes to centroids
//! - greedy first-fit matching per class, in track storage order
//! - age unmatched tracks, evict at `max_track_age`
//! - leftover centroids start new tracks
//!
//! First-fit is not a minimum-cost assignment: a track takes the first
//! candidate under the distance threshold, not the nearest one.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::SentryConfig;
use crate::types::{BBox, Centroid, TrackedObject};

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub min_frames_stable: u32,
    pub spatial_clustering_distance: f64,
    pub max_track_age: u32,
    pub face_region_expand: f32,
    /// Classes dropped when overlapping a recognised face
    pub face_suppressed: BTreeSet<String>,
}

impl From<&SentryConfig> for TrackerConfig {
    fn from(config: &SentryConfig) -> Self {
        let face_suppressed = config
            .animal_classes
            .iter()
            .filter(|class| config.is_face_suppressed(class))
            .cloned()
            .collect();
        Self {
            min_frames_stable: config.min_frames_stable,
            spatial_clustering_distance: config.spatial_clustering_distance,
            max_track_age: config.max_track_age,
            face_region_expand: config.face_region_expand as f32,
            face_suppressed,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::from(&SentryConfig::default())
    }
}

#[derive(Debug)]
pub struct ObjectTracker {
    config: TrackerConfig,
    tracks: BTreeMap<String, Vec<TrackedObject>>,
    /// Known-face boxes for the current frame only
    face_regions: Vec<BBox>,
}

impl ObjectTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            tracks: BTreeMap::new(),
            face_regions: Vec::new(),
        }
    }

    /// Replace the face regions used by the next `update`
    pub fn set_face_regions(&mut self, regions: Vec<BBox>) {
        self.face_regions = regions;
    }

    fn in_face_region(&self, bbox: &BBox) -> bool {
        self.face_regions
            .iter()
            .any(|face| bbox.overlaps_padded(face, self.config.face_region_expand))
    }

    pub fn update(&mut self, detections_by_class: &BTreeMap<String, Vec<BBox>>) {
        // Stage 1: suppression + centroids
        let mut pool: BTreeMap<&str, Vec<Centroid>> = BTreeMap::new();
        for (class, boxes) in detections_by_class {
            let suppress = self.config.face_suppressed.contains(class);
            let centroids: Vec<Centroid> = boxes
                .iter()
                .filter(|b| !(suppress && self.in_face_region(b)))
                .map(BBox::centroid)
                .collect();
            if !centroids.is_empty() {
                pool.insert(class.as_str(), centroids);
            }
        }

        // Stage 2: first-fit matching, ageing, eviction
        let mut next: BTreeMap<String, Vec<TrackedObject>> = BTreeMap::new();
        for (class, old_tracks) in std::mem::take(&mut self.tracks) {
            let mut candidates = pool.get_mut(class.as_str());
            let mut kept = Vec::with_capacity(old_tracks.len());

            for mut track in old_tracks {
                let hit = candidates.as_deref().and_then(|c| {
                    c.iter()
                        .position(|&cent| track.distance_to(cent) < self.config.spatial_clustering_distance)
                });
                match (hit, candidates.as_deref_mut()) {
                    (Some(i), Some(c)) => {
                        let cent = c.remove(i);
                        track.matched(cent);
                        kept.push(track);
                    }
                    _ => {
                        track.age += 1;
                        if track.age < self.config.max_track_age {
                            kept.push(track);
                        }
                    }
                }
            }
            if !kept.is_empty() {
                next.insert(class, kept);
            }
        }

        // Stage 3: births
        for (class, leftovers) in pool {
            if leftovers.is_empty() {
                continue;
            }
            next.entry(class.to_string())
                .or_default()
                .extend(leftovers.into_iter().map(TrackedObject::new));
        }

        self.tracks = next;
    }

    /// Centroids of stable tracks per class; classes without any are omitted
    pub fn get_stable(&self) -> BTreeMap<String, Vec<Centroid>> {
        self.tracks
            .iter()
            .filter_map(|(class, tracks)| {
                let stable: Vec<Centroid> = tracks
                    .iter()
                    .filter(|t| t.is_stable(self.config.min_frames_stable))
                    .map(|t| t.centroid)
                    .collect();
                (!stable.is_empty()).then(|| (class.clone(), stable))
            })
            .collect()
    }

    /// All live tracks, stable or not
    pub fn tracks(&self) -> &BTreeMap<String, Vec<TrackedObject>> {
        &self.tracks
    }

    pub fn track_count(&self) -> usize {
        self.tracks.values().map(Vec::len).sum()
    }
}

// =============================================================================
// TESTS
// =============================================================================
