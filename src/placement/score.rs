//! Placement scoring and score bounds used for pruning.

use super::config::ScoreWeights;
use crate::geometry::{accessibility, touching_surfaces, Aabb, Vec3, TOUCH_EPSILON};
use crate::model::{Container, Item};

/// Scores candidate boxes of one item in one container.
///
/// The terms that do not depend on the box (priority, zone, volume) are
/// computed once.
#[derive(Debug, Clone, Copy)]
pub struct PlacementScorer<'a> {
    container: &'a Container,
    weights: ScoreWeights,
    fixed: f64,
}

impl<'a> PlacementScorer<'a> {
    pub fn new(item: &Item, container: &'a Container, weights: ScoreWeights) -> Self {
        let mut fixed = f64::from(item.priority) / 100.0;
        if item
            .preferred_zone
            .as_deref()
            .is_some_and(|zone| zone == container.zone)
        {
            fixed += weights.zone_bonus;
        }
        let container_volume = container.volume();
        if container_volume > 0.0 {
            fixed += (weights.volume_factor * item.volume() / container_volume).min(weights.volume_cap);
        }
        Self {
            container,
            weights,
            fixed,
        }
    }

    /// Score of placing the item as `bounds`. Higher is better.
    pub fn score(&self, bounds: &Aabb) -> f64 {
        let access = accessibility(bounds, self.container.depth());
        let touching = touching_surfaces(bounds, &self.container.dimensions);
        self.fixed
            + self.weights.accessibility * access
            + self.weights.contact * touching as f64 / 6.0
    }

    /// Best score any box of size `dims` can reach with its front face at
    /// depth `z`, or anywhere when `z` is `None`.
    pub fn bound(&self, dims: Vec3, z: Option<f64>) -> f64 {
        let extent = self.container.dimensions;
        let front = z.unwrap_or(0.0);
        let access = accessibility(&Aabb::new(Vec3::new(0.0, 0.0, front), dims), self.container.depth());

        let span = |len: f64, room: f64| if (len - room).abs() < TOUCH_EPSILON { 2 } else { 1 };
        let depth_touches = match z {
            None => span(dims.z, extent.z),
            Some(z) => {
                usize::from(z.abs() < TOUCH_EPSILON)
                    + usize::from((z + dims.z - extent.z).abs() < TOUCH_EPSILON)
            }
        };
        let touching = span(dims.x, extent.x) + span(dims.y, extent.y) + depth_touches;

        self.fixed
            + self.weights.accessibility * access
            + self.weights.contact * touching.min(6) as f64 / 6.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_score_terms() {
        let container = Container::new("C", "Lab", 100.0, 100.0, 100.0);
        let item = Item::new("i", 10.0, 10.0, 10.0)
            .with_priority(80)
            .with_preferred_zone("Lab");
        let scorer = PlacementScorer::new(&item, &container, ScoreWeights::default());

        let corner = Aabb::new(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0));
        // 0.8 + 0.5 + 0.3*0.95 + 0.01 + 0.1*3/6
        assert_relative_eq!(scorer.score(&corner), 0.8 + 0.5 + 0.285 + 0.01 + 0.05, epsilon = 1e-12);

        let deep = Aabb::new(Vec3::new(40.0, 40.0, 80.0), Vec3::new(10.0, 10.0, 10.0));
        assert!(scorer.score(&deep) < scorer.score(&corner));
    }

    #[test]
    fn test_zone_mismatch_and_degenerate_volume() {
        let container = Container::new("C", "Storage", 0.0, 10.0, 10.0);
        let item = Item::new("i", 1.0, 1.0, 1.0)
            .with_priority(50)
            .with_preferred_zone("Lab");
        let scorer = PlacementScorer::new(&item, &container, ScoreWeights::default());
        let s = scorer.score(&Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0)));
        assert!(s.is_finite());
        assert!(s < 0.5 + 0.3 + 0.1 + 1e-9);
    }

    #[test]
    fn test_bound_dominates_scores() {
        let container = Container::new("C", "Z", 30.0, 20.0, 40.0);
        let item = Item::new("i", 30.0, 5.0, 8.0).with_priority(40);
        let scorer = PlacementScorer::new(&item, &container, ScoreWeights::default());
        let dims = item.dimensions;
        let global = scorer.bound(dims, None);
        for z in [0.0, 8.0, 32.0] {
            let row = scorer.bound(dims, Some(z));
            assert!(row <= global + 1e-12);
            for y in [0.0, 7.0, 15.0] {
                let s = scorer.score(&Aabb::new(Vec3::new(0.0, y, z), dims));
                assert!(s <= row + 1e-12);
            }
        }
        // full-width box at the floor and the front reaches the bound
        let best = scorer.score(&Aabb::new(Vec3::ZERO, dims));
        assert_relative_eq!(best, global, epsilon = 1e-12);
        assert_relative_eq!(scorer.bound(dims, Some(0.0)), best, epsilon = 1e-12);
    }
}
