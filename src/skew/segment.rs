use super::bitmap::{Bitmap, PIXEL_SIZE};

/// Span of opaque pixels on one line, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub left: i64,
    pub right: i64,
}

impl Segment {
    pub fn new(left: i64, right: i64) -> Self {
        Self { left, right }
    }

    pub fn width(&self) -> i64 {
        self.right - self.left + 1
    }

    /// Check if the span includes position `c`
    pub fn covers(&self, c: i64) -> bool {
        self.left <= c && c <= self.right
    }

    pub(crate) fn shifted(self, by: i64) -> Self {
        Self::new(self.left + by, self.right + by)
    }
}

/// One entry per line, `None` for a line without any opaque pixel
pub type Segments = Vec<Option<Segment>>;

/// Segment lines after leading and trailing empty lines are dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrimmedSegments {
    /// Remaining lines, shifted so the smallest `left` is 0
    pub lines: Segments,
    /// Width of the enclosing interval
    pub width: i64,
    /// Amount the lines were shifted left by
    pub offset_x: i64,
    /// Number of leading empty lines dropped
    pub offset_y: i64,
}

impl TrimmedSegments {
    pub fn height(&self) -> i64 {
        self.lines.len() as i64
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Extract the opaque span of every row of `bitmap`
///
/// The ends are scanned independently, so a row with a transparent gap in the
/// middle still reports its full outer span.
pub fn extract_segments(bitmap: &Bitmap<'_>) -> Segments {
    (0..bitmap.height())
        .map(|y| row_segment(bitmap.row(y)))
        .collect()
}

fn row_segment(row: &[u8]) -> Option<Segment> {
    let opaque = |px: &[u8]| px[3] > 0;
    let left = row.chunks_exact(PIXEL_SIZE).position(opaque)?;
    let right = row.chunks_exact(PIXEL_SIZE).rposition(opaque)?;
    Some(Segment::new(left as i64, right as i64))
}

/// Trim a segment sequence to its minimal enclosing interval
///
/// A sequence with no opaque line trims to zero lines of width 0.
pub fn min_segment(lines: &[Option<Segment>]) -> TrimmedSegments {
    let Some(top) = lines.iter().position(Option::is_some) else {
        return TrimmedSegments::default();
    };
    let bottom = lines.iter().rposition(Option::is_some).unwrap_or(top);
    let lines = &lines[top..=bottom];

    let left = lines.iter().flatten().map(|s| s.left).min().unwrap_or(0);
    let right = lines.iter().flatten().map(|s| s.right).max().unwrap_or(left);

    TrimmedSegments {
        lines: lines.iter().map(|l| l.map(|s| s.shifted(-left))).collect(),
        width: right - left + 1,
        offset_x: left,
        offset_y: top as i64,
    }
}

/// Transpose line segments into `width` column segments
///
/// Column `c` spans from the first to the last line whose segment covers `c`.
pub fn rotate_segments(lines: &[Option<Segment>], width: i64) -> Segments {
    (0..width)
        .map(|c| {
            let covers = |line: &Option<Segment>| line.is_some_and(|s| s.covers(c));
            let top = lines.iter().position(covers)?;
            let bottom = lines.iter().rposition(covers)?;
            Some(Segment::new(top as i64, bottom as i64))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(width: u32, height: u32, opaque: impl Fn(u32, u32) -> bool) -> Vec<u8> {
        (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .flat_map(|(x, y)| {
                if opaque(x, y) {
                    [200, 100, 50, 255]
                } else {
                    [0, 0, 0, 0]
                }
            })
            .collect()
    }

    #[test]
    fn test_extract_fully_opaque() {
        let data = rgba(4, 4, |_, _| true);
        let bitmap = Bitmap::new(4, 4, &data).unwrap();

        let segments = extract_segments(&bitmap);

        assert_eq!(segments, vec![Some(Segment::new(0, 3)); 4]);
    }

    #[test]
    fn test_extract_fully_transparent() {
        let data = rgba(4, 4, |_, _| false);
        let bitmap = Bitmap::new(4, 4, &data).unwrap();

        let segments = extract_segments(&bitmap);

        assert_eq!(segments, vec![None; 4]);
    }

    #[test]
    fn test_extract_reports_outer_span() {
        // Opaque only at both ends of the row
        let data = rgba(6, 1, |x, _| x == 1 || x == 4);
        let bitmap = Bitmap::new(6, 1, &data).unwrap();

        assert_eq!(extract_segments(&bitmap), vec![Some(Segment::new(1, 4))]);
    }

    #[test]
    fn test_extract_any_nonzero_alpha_is_opaque() {
        let mut data = vec![0u8; 3 * 4];
        data[2 * 4 + 3] = 1;
        let bitmap = Bitmap::new(3, 1, &data).unwrap();

        assert_eq!(extract_segments(&bitmap), vec![Some(Segment::new(2, 2))]);
    }

    #[test]
    fn test_extract_from_view() {
        let data = rgba(5, 5, |x, y| x == 3 && y == 2);
        let bitmap = Bitmap::new(5, 5, &data).unwrap();

        let segments = extract_segments(&bitmap.view(2, 1, 3, 3));

        assert_eq!(segments, vec![None, Some(Segment::new(1, 1)), None]);
    }

    #[test]
    fn test_min_segment_trims_empty_lines() {
        let lines = vec![
            None,
            Some(Segment::new(3, 5)),
            None,
            Some(Segment::new(2, 4)),
            None,
            None,
        ];

        let trimmed = min_segment(&lines);

        assert_eq!(trimmed.height(), 3);
        assert_eq!(trimmed.width, 4);
        assert_eq!(trimmed.offset_x, 2);
        assert_eq!(trimmed.offset_y, 1);
        assert_eq!(
            trimmed.lines,
            vec![Some(Segment::new(1, 3)), None, Some(Segment::new(0, 2))]
        );
    }

    #[test]
    fn test_min_segment_all_empty() {
        let trimmed = min_segment(&[None, None, None]);

        assert!(trimmed.is_empty());
        assert_eq!(trimmed.width, 0);
        assert_eq!(trimmed.offset_x, 0);
        assert_eq!(trimmed.offset_y, 0);
    }

    #[test]
    fn test_rotate_segments() {
        // Anti-diagonal of three pixels plus a full bottom row
        let lines = vec![
            Some(Segment::new(2, 2)),
            Some(Segment::new(1, 1)),
            Some(Segment::new(0, 2)),
        ];

        let cols = rotate_segments(&lines, 3);

        assert_eq!(
            cols,
            vec![
                Some(Segment::new(2, 2)),
                Some(Segment::new(1, 2)),
                Some(Segment::new(0, 2)),
            ]
        );
    }

    #[test]
    fn test_rotate_segments_uncovered_column() {
        let lines = vec![Some(Segment::new(0, 0)), None, Some(Segment::new(2, 2))];

        let cols = rotate_segments(&lines, 3);

        assert_eq!(
            cols,
            vec![Some(Segment::new(0, 0)), None, Some(Segment::new(2, 2))]
        );
    }
}
