//! Search for the shear pair that minimizes a sprite's packed area.
//!
//! A sprite is described by the opaque span of each row. Shearing the rows by
//! `x` and then the resulting columns by `y` re-parameterizes the sprite; the
//! search picks the `(x, y)` whose sheared spans fit the smallest rectangle.
//!
//! Rows are sheared as a linear ramp: line `n - 1` stays put and line `i`
//! moves by `x * (n - 1 - i) / (n - 1)`. The left end of a span is moved by the
//! floor of that amount and the right end by its ceiling, so the sheared span
//! always covers every pixel the resampler blends into.

use serde::{Deserialize, Serialize};

use super::segment::{Segment, Segments, min_segment, rotate_segments};

/// How the one-dimensional skew search walks its candidates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    /// Walk away from zero and stop once the width grows by more than one
    /// unit past the best seen. Assumes width is unimodal in the shear, which
    /// holds for most sprites but is not guaranteed to find the optimum.
    #[default]
    Unimodal,
    /// Evaluate every candidate shear
    Exhaustive,
}

/// Parameters of the minimal-area skew for one sprite
///
/// All coordinates are in pixels. `bounding_*` is the trim box in the source
/// image; the packed image is `minw x minh`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transform {
    pub bounding_x: i64,
    pub bounding_y: i64,
    pub bounding_w: i64,
    pub bounding_h: i64,
    /// Horizontal offset of the top row relative to the bottom row
    pub skew_x: i64,
    /// Vertical offset of the left column relative to the right column
    pub skew_y: i64,
    /// Translation introduced by the horizontal shear
    pub skew_offx: i64,
    /// Translation introduced by the vertical shear
    pub skew_offy: i64,
    pub minw: i64,
    pub minh: i64,
}

impl Transform {
    /// Unskewed transform of a trimmed segment sequence
    fn identity(trimmed: &super::segment::TrimmedSegments) -> Self {
        Self {
            bounding_x: trimmed.offset_x,
            bounding_y: trimmed.offset_y,
            bounding_w: trimmed.width,
            bounding_h: trimmed.height(),
            minw: trimmed.width,
            minh: trimmed.height(),
            ..Self::default()
        }
    }

    pub fn area(&self) -> i64 {
        self.minw * self.minh
    }

    pub fn bounding_area(&self) -> i64 {
        self.bounding_w * self.bounding_h
    }

    /// True when the sprite had no opaque pixel
    pub fn is_empty(&self) -> bool {
        self.minw == 0 || self.minh == 0
    }

    /// True when no shear was applied
    pub fn is_identity(&self) -> bool {
        self.skew_x == 0 && self.skew_y == 0
    }
}

/// Segment lines after a shear
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheared {
    /// Shifted lines, renormalized so the smallest `left` is 0
    pub lines: Segments,
    pub width: i64,
    /// Smallest shifted `left` before renormalization
    pub offset: i64,
}

/// Best shear found along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSkew {
    pub skew: i64,
    pub offset: i64,
    pub width: i64,
}

/// Floor and ceiling of the ramp shift of line `line` out of `lines`
pub(crate) fn ramp_shift(skew: i64, line: i64, lines: i64) -> (i64, i64) {
    if lines <= 1 {
        return (0, 0);
    }
    let num = skew * (lines - 1 - line);
    let den = lines - 1;
    let floor = num.div_euclid(den);
    let ceil = if num.rem_euclid(den) == 0 {
        floor
    } else {
        floor + 1
    };
    (floor, ceil)
}

fn shift_line(line: Option<Segment>, skew: i64, index: usize, lines: usize) -> Option<Segment> {
    line.map(|s| {
        let (lo, hi) = ramp_shift(skew, index as i64, lines as i64);
        Segment::new(s.left + lo, s.right + hi)
    })
}

/// Width and offset of `lines` sheared by `skew`, without materializing them
fn shear_extent(lines: &[Option<Segment>], skew: i64) -> (i64, i64) {
    let n = lines.len();
    let mut extent: Option<(i64, i64)> = None;
    for (i, line) in lines.iter().enumerate() {
        if let Some(s) = shift_line(*line, skew, i, n) {
            extent = Some(match extent {
                Some((left, right)) => (left.min(s.left), right.max(s.right)),
                None => (s.left, s.right),
            });
        }
    }

    match extent {
        Some((left, right)) => (right - left + 1, left),
        None => (0, 0),
    }
}

/// Shear a segment sequence by `x`
///
/// A single line has no ramp and is returned unshifted.
pub fn apply_shear(lines: &[Option<Segment>], x: i64) -> Sheared {
    let n = lines.len();
    let (width, offset) = shear_extent(lines, x);
    let lines = lines
        .iter()
        .enumerate()
        .map(|(i, line)| shift_line(*line, x, i, n).map(|s| s.shifted(-offset)))
        .collect();

    Sheared {
        lines,
        width,
        offset,
    }
}

/// Find the shear of `lines` within `(-limit, limit)` giving the smallest width
///
/// Positive shears are tried first and win ties; a negative shear must be
/// strictly better. With [`SearchMode::Unimodal`] each direction stops as soon
/// as the width exceeds the best by more than one, which tolerates the
/// rounding noise of the floor/ceil ramp.
pub fn find_min_skew(lines: &[Option<Segment>], limit: i64, mode: SearchMode) -> AxisSkew {
    let (width, offset) = shear_extent(lines, 0);
    let identity = AxisSkew {
        skew: 0,
        offset,
        width,
    };
    if lines.len() <= 1 {
        return identity;
    }

    let positive = walk(lines, 1..limit, mode, identity, |new, best| new <= best);
    let negative = walk(lines, (1..limit).map(|s| -s), mode, identity, |new, best| {
        new < best
    });

    if negative.width < positive.width {
        negative
    } else {
        positive
    }
}

fn walk(
    lines: &[Option<Segment>],
    candidates: impl Iterator<Item = i64>,
    mode: SearchMode,
    start: AxisSkew,
    accept: impl Fn(i64, i64) -> bool,
) -> AxisSkew {
    let mut best = start;
    for skew in candidates {
        let (width, offset) = shear_extent(lines, skew);
        if accept(width, best.width) {
            best = AxisSkew {
                skew,
                offset,
                width,
            };
        } else if mode == SearchMode::Unimodal && width > best.width + 1 {
            break;
        }
    }
    best
}

/// Find the shear pair minimizing the packed area of a sprite
///
/// `lines` are the row segments of the whole sprite. They are trimmed first;
/// then every horizontal shear in `[-w, w]` of the trimmed width is paired
/// with the best vertical shear of the resulting columns. Falls back to the
/// unskewed trim box when nothing is strictly smaller.
pub fn find_best_skew(lines: &[Option<Segment>], mode: SearchMode) -> Transform {
    let trimmed = min_segment(lines);
    let mut best = Transform::identity(&trimmed);
    if trimmed.is_empty() {
        return best;
    }

    let width = trimmed.width;
    let height = trimmed.height();
    let mut area = best.area();

    for x in -width..=width {
        let sheared = apply_shear(&trimmed.lines, x);
        let cols = rotate_segments(&sheared.lines, sheared.width);
        let vertical = find_min_skew(&cols, height, mode);

        let new_area = sheared.width * vertical.width;
        if new_area < area {
            area = new_area;
            best = Transform {
                skew_x: x,
                skew_y: vertical.skew,
                skew_offx: sheared.offset,
                skew_offy: vertical.offset,
                minw: sheared.width,
                minh: vertical.width,
                ..best
            };
        }
    }

    best
}
