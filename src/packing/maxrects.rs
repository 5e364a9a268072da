use super::Rect;
use crate::cli::PackingHeuristic;

/// MaxRects bin packer
///
/// Keeps the list of maximal free rectangles of one page and splits them
/// around every placed box.
pub struct MaxRectsPacker {
    bin_width: u32,
    bin_height: u32,
    free_rects: Vec<Rect>,
    used_area: u64,
}

impl MaxRectsPacker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bin_width: width,
            bin_height: height,
            free_rects: vec![Rect::new(0, 0, width, height)],
            used_area: 0,
        }
    }

    /// Try to insert a rectangle with the given dimensions
    /// Returns the placed rectangle if successful
    pub fn insert(&mut self, width: u32, height: u32, heuristic: PackingHeuristic) -> Option<Rect> {
        let placed = self.find_position(width, height, heuristic)?;
        self.place_rect(placed);
        Some(placed)
    }

    /// Check if a rectangle of the given size can fit
    pub fn can_fit(&self, width: u32, height: u32) -> bool {
        self.free_rects.iter().any(|r| r.fits(width, height))
    }

    fn find_position(&self, width: u32, height: u32, heuristic: PackingHeuristic) -> Option<Rect> {
        self.free_rects
            .iter()
            .filter(|free| free.fits(width, height))
            .map(|free| (score_rect(free, width, height, heuristic), free))
            .min_by_key(|(score, _)| *score)
            .map(|(_, free)| Rect::new(free.x, free.y, width, height))
    }

    fn place_rect(&mut self, rect: Rect) {
        let mut split = Vec::new();

        self.free_rects.retain(|free| {
            if !rect.intersects(free) {
                return true;
            }

            if rect.x > free.x {
                split.push(Rect::new(free.x, free.y, rect.x - free.x, free.height));
            }
            if rect.right() < free.right() {
                split.push(Rect::new(
                    rect.right(),
                    free.y,
                    free.right() - rect.right(),
                    free.height,
                ));
            }
            if rect.y > free.y {
                split.push(Rect::new(free.x, free.y, free.width, rect.y - free.y));
            }
            if rect.bottom() < free.bottom() {
                split.push(Rect::new(
                    free.x,
                    rect.bottom(),
                    free.width,
                    free.bottom() - rect.bottom(),
                ));
            }

            false
        });

        self.free_rects.extend(split);
        self.prune_free_rects();
        self.used_area += rect.area();
    }

    /// Remove free rectangles that are fully contained within others
    fn prune_free_rects(&mut self) {
        let mut i = 0;
        while i < self.free_rects.len() {
            let mut j = i + 1;
            while j < self.free_rects.len() {
                if self.free_rects[i].contains(&self.free_rects[j]) {
                    self.free_rects.swap_remove(j);
                } else if self.free_rects[j].contains(&self.free_rects[i]) {
                    self.free_rects.swap_remove(i);
                    j = i + 1;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
    }

    /// Fraction of the page covered by placed rectangles (0.0 to 1.0)
    pub fn occupancy(&self) -> f64 {
        let total = u64::from(self.bin_width) * u64::from(self.bin_height);
        if total == 0 {
            return 0.0;
        }
        #[expect(
            clippy::cast_precision_loss,
            reason = "page areas stay far below 2^52"
        )]
        let ratio = self.used_area as f64 / total as f64;
        ratio
    }
}

/// Lower is better; the second component breaks ties
fn score_rect(free: &Rect, width: u32, height: u32, heuristic: PackingHeuristic) -> (u64, u64) {
    let leftover_h = u64::from(free.width - width);
    let leftover_v = u64::from(free.height - height);
    let short = leftover_h.min(leftover_v);
    let long = leftover_h.max(leftover_v);

    match heuristic {
        // `Best` is resolved by the atlas builder; score it like the default
        PackingHeuristic::BestShortSideFit | PackingHeuristic::Best => (short, long),
        PackingHeuristic::BestLongSideFit => (long, short),
        PackingHeuristic::BestAreaFit => (free.area(), short),
        PackingHeuristic::BottomLeft => (u64::from(free.y + height), u64::from(free.x)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_insert() {
        let mut packer = MaxRectsPacker::new(100, 100);
        let rect = packer
            .insert(50, 50, PackingHeuristic::BestShortSideFit)
            .unwrap();

        assert_eq!(rect, Rect::new(0, 0, 50, 50));
    }

    #[test]
    fn test_four_quadrants_fill_the_bin() {
        let mut packer = MaxRectsPacker::new(100, 100);

        let rects: Vec<_> = (0..4)
            .map(|_| {
                packer
                    .insert(50, 50, PackingHeuristic::BestShortSideFit)
                    .unwrap()
            })
            .collect();

        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
        assert!(!packer.can_fit(1, 1));
        assert!((packer.occupancy() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_large() {
        let mut packer = MaxRectsPacker::new(100, 100);
        assert!(
            packer
                .insert(150, 50, PackingHeuristic::BestShortSideFit)
                .is_none()
        );
    }

    #[test]
    fn test_can_fit() {
        let mut packer = MaxRectsPacker::new(100, 100);
        assert!(packer.can_fit(50, 50));
        assert!(packer.can_fit(100, 100));
        assert!(!packer.can_fit(101, 100));

        packer
            .insert(100, 100, PackingHeuristic::BestShortSideFit)
            .unwrap();
        assert!(!packer.can_fit(1, 1));
    }

    #[test]
    fn test_occupancy_counts_placed_area() {
        let mut packer = MaxRectsPacker::new(100, 100);
        packer
            .insert(50, 50, PackingHeuristic::BestShortSideFit)
            .unwrap();

        assert!((packer.occupancy() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_bottom_left_stacks_rows() {
        let mut packer = MaxRectsPacker::new(100, 100);
        let first = packer.insert(60, 10, PackingHeuristic::BottomLeft).unwrap();
        let second = packer.insert(60, 10, PackingHeuristic::BottomLeft).unwrap();

        assert_eq!((first.x, first.y), (0, 0));
        assert_eq!((second.x, second.y), (0, 10));
    }

    #[test]
    fn test_every_heuristic_places_without_overlap() {
        let sizes = [(30, 20), (25, 15), (40, 10), (15, 35), (20, 20)];
        for heuristic in [
            PackingHeuristic::BestShortSideFit,
            PackingHeuristic::BestLongSideFit,
            PackingHeuristic::BestAreaFit,
            PackingHeuristic::BottomLeft,
        ] {
            let mut packer = MaxRectsPacker::new(100, 100);
            let placed: Vec<_> = sizes
                .iter()
                .filter_map(|&(w, h)| packer.insert(w, h, heuristic))
                .collect();

            assert_eq!(placed.len(), sizes.len(), "{:?}", heuristic);
            for (i, a) in placed.iter().enumerate() {
                for b in &placed[i + 1..] {
                    assert!(!a.intersects(b), "{:?}", heuristic);
                }
            }
        }
    }
}
