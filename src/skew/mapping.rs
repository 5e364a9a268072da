use serde::{Deserialize, Serialize};

use super::search::Transform;

/// Corners of a packed texture and where a renderer should draw them
///
/// Corner `i` of `uv` is drawn at corner `i` of `screen`. UV corners run
/// `(0, 0), (0, h), (w, h), (w, 0)` on the packed image; screen corners are in
/// the source sprite's pixel frame and generally form a parallelogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadMapping {
    pub uv: [[u32; 2]; 4],
    pub screen: [[f32; 2]; 4],
}

impl QuadMapping {
    /// Invert the shear of `transform`; `None` for an empty sprite
    pub fn from_transform(transform: &Transform) -> Option<Self> {
        if transform.is_empty() {
            return None;
        }
        let t = transform;
        let minw = u32::try_from(t.minw).ok()?;
        let minh = u32::try_from(t.minh).ok()?;

        let bounding_h = t.bounding_h as f32;
        let edge_x = |y: f32| t.skew_x as f32 * (y - bounding_h) / bounding_h + t.skew_offx as f32;

        // Top of the left and right packed edges, in pre-shear rows
        let left_top = (t.skew_offy - t.skew_y) as f32;
        let right_top = t.skew_offy as f32;
        let left_bottom = left_top + t.minh as f32;
        let right_bottom = right_top + t.minh as f32;
        let width = t.minw as f32;

        let corners = [
            [edge_x(left_top), left_top],
            [edge_x(left_bottom), left_bottom],
            [edge_x(right_bottom) + width, right_bottom],
            [edge_x(right_top) + width, right_top],
        ];
        let origin = [t.bounding_x as f32, t.bounding_y as f32];

        Some(Self {
            uv: [[0, 0], [0, minh], [minw, minh], [minw, 0]],
            screen: corners.map(|[x, y]| [x + origin[0], y + origin[1]]),
        })
    }

    /// `(uv, screen)` pairs in corner order
    pub fn vertices(&self) -> impl Iterator<Item = ([u32; 2], [f32; 2])> + '_ {
        self.uv.iter().copied().zip(self.screen.iter().copied())
    }

    /// Axis-aligned extent of the screen quad as `(min_x, min_y, max_x, max_y)`
    pub fn screen_bounds(&self) -> (f32, f32, f32, f32) {
        self.screen.iter().fold(
            (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
            |(x0, y0, x1, y1), &[x, y]| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_mapping_is_bounding_box() {
        let t = Transform {
            bounding_x: 2,
            bounding_y: 3,
            bounding_w: 5,
            bounding_h: 4,
            minw: 5,
            minh: 4,
            ..Transform::default()
        };

        let mapping = QuadMapping::from_transform(&t).unwrap();

        assert_eq!(mapping.uv, [[0, 0], [0, 4], [5, 4], [5, 0]]);
        assert_eq!(
            mapping.screen,
            [[2.0, 3.0], [2.0, 7.0], [7.0, 7.0], [7.0, 3.0]]
        );
    }

    #[test]
    fn test_horizontal_skew_mapping() {
        // Parallelogram whose rows slide one pixel left per row
        let t = Transform {
            bounding_w: 8,
            bounding_h: 4,
            skew_x: -3,
            minw: 5,
            minh: 4,
            ..Transform::default()
        };

        let mapping = QuadMapping::from_transform(&t).unwrap();

        assert_eq!(
            mapping.screen,
            [[3.0, 0.0], [0.0, 4.0], [5.0, 4.0], [8.0, 0.0]]
        );
        assert_eq!(mapping.screen_bounds(), (0.0, 0.0, 8.0, 4.0));
    }

    #[test]
    fn test_vertical_skew_offsets_left_edge() {
        let t = Transform {
            bounding_x: 10,
            bounding_y: 20,
            bounding_w: 3,
            bounding_h: 6,
            skew_y: 2,
            skew_offy: 2,
            minw: 3,
            minh: 4,
            ..Transform::default()
        };

        let mapping = QuadMapping::from_transform(&t).unwrap();

        let left: Vec<_> = mapping.vertices().filter(|(uv, _)| uv[0] == 0).collect();
        assert_eq!(left[0].1, [10.0, 20.0]);
        assert_eq!(left[1].1, [10.0, 24.0]);
        let right: Vec<_> = mapping.vertices().filter(|(uv, _)| uv[0] == 3).collect();
        assert_eq!(right[0].1, [13.0, 26.0]);
        assert_eq!(right[1].1, [13.0, 22.0]);
    }

    #[test]
    fn test_empty_transform_has_no_mapping() {
        assert!(QuadMapping::from_transform(&Transform::default()).is_none());
    }
}
