//! Segment planning: how a page's content is split around its spacers.

use crate::model::Spacer;
use serde::Serialize;

/// One piece of a reflowed page.
///
/// Offsets and lengths are in source-page units. A plan is produced fresh on
/// every call and borrows the spacers it was planned from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment<'a> {
    /// A strip of original page content.
    #[serde(rename_all = "camelCase")]
    Content {
        /// First source row covered
        source_start: f32,
        /// Number of source units covered
        source_length: f32,
        /// Offset in the reflowed page
        dest_offset: f32,
    },

    /// An inserted spacer.
    #[serde(rename_all = "camelCase")]
    Spacer {
        /// The planned spacer
        spacer: &'a Spacer,
        /// Offset in the reflowed page
        dest_offset: f32,
    },
}

impl<'a> Segment<'a> {
    /// Offset of the segment in the reflowed page.
    pub fn dest_offset(&self) -> f32 {
        match *self {
            Segment::Content { dest_offset, .. } | Segment::Spacer { dest_offset, .. } => {
                dest_offset
            }
        }
    }

    /// Height the segment occupies in the reflowed page.
    pub fn length(&self) -> f32 {
        match *self {
            Segment::Content { source_length, .. } => source_length,
            Segment::Spacer { spacer, .. } => spacer.height,
        }
    }

    /// Offset just below the segment in the reflowed page.
    pub fn dest_end(&self) -> f32 {
        self.dest_offset() + self.length()
    }

    /// Whether this is original content.
    pub fn is_content(&self) -> bool {
        matches!(self, Segment::Content { .. })
    }

    /// The spacer, for spacer segments.
    pub fn spacer(&self) -> Option<&'a Spacer> {
        match *self {
            Segment::Spacer { spacer, .. } => Some(spacer),
            Segment::Content { .. } => None,
        }
    }
}

/// Order spacers by `y`; equal offsets keep their incoming order.
pub fn sort_spacers(spacers: &[Spacer]) -> Vec<&Spacer> {
    let mut sorted: Vec<&Spacer> = spacers.iter().collect();
    // `sort_by` is stable, which is what keeps ties in insertion order.
    sorted.sort_by(|a, b| a.y.total_cmp(&b.y));
    sorted
}

/// Split a page of `page_height` units around `spacers`.
///
/// Spacers are taken in insertion order and sorted stably by `y`. A spacer
/// whose `y` lies below the page still consumes its height; the content
/// segment in front of it then reaches past the page bottom and renders blank.
pub fn plan_segments(page_height: f32, spacers: &[Spacer]) -> Vec<Segment<'_>> {
    let sorted = sort_spacers(spacers);
    let mut segments = Vec::with_capacity(sorted.len() * 2 + 1);

    let mut current_y = 0.0_f32;
    let mut cumulative_offset = 0.0_f32;

    for spacer in sorted {
        if spacer.y > current_y {
            segments.push(Segment::Content {
                source_start: current_y,
                source_length: spacer.y - current_y,
                dest_offset: current_y + cumulative_offset,
            });
        }
        // Ties land here with spacer.y == current_y: no zero or negative strip.
        segments.push(Segment::Spacer {
            spacer,
            dest_offset: spacer.y + cumulative_offset,
        });
        current_y = current_y.max(spacer.y);
        cumulative_offset += spacer.height;
    }

    if current_y < page_height {
        segments.push(Segment::Content {
            source_start: current_y,
            source_length: page_height - current_y,
            dest_offset: current_y + cumulative_offset,
        });
    }

    log::debug!(
        "planned {} segments for page height {} ({} spacers)",
        segments.len(),
        page_height,
        spacers.len()
    );
    segments
}

/// Height of the reflowed page described by a plan.
pub fn reflowed_height(segments: &[Segment<'_>]) -> f32 {
    segments.last().map(Segment::dest_end).unwrap_or(0.0)
}

/// Reflowed top of a spacer, or `None` if it is not in `spacers`.
pub fn reflowed_top(spacers: &[Spacer], id: &str) -> Option<f32> {
    let mut cumulative_offset = 0.0;
    for spacer in sort_spacers(spacers) {
        if spacer.id == id {
            return Some(spacer.y + cumulative_offset);
        }
        cumulative_offset += spacer.height;
    }
    None
}

/// Map a reflowed offset back to original page coordinates.
///
/// Heights of spacers whose reflowed top lies at or above `reflowed_y` are
/// subtracted, including a spacer the point falls inside. Clamped to `>= 0`.
pub fn to_source_y(reflowed_y: f32, spacers: &[Spacer]) -> f32 {
    let mut cumulative_offset = 0.0;
    for spacer in sort_spacers(spacers) {
        let top = spacer.y + cumulative_offset;
        if reflowed_y < top {
            break;
        }
        cumulative_offset += spacer.height;
    }
    (reflowed_y - cumulative_offset).max(0.0)
}

/// Map an original page offset to its reflowed position.
///
/// Spacers inserted at exactly `source_y` push the point down.
pub fn to_reflowed_y(source_y: f32, spacers: &[Spacer]) -> f32 {
    let pushed: f32 = spacers
        .iter()
        .filter(|s| s.y <= source_y)
        .map(|s| s.height)
        .sum();
    source_y + pushed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spacer(id: &str, y: f32, height: f32) -> Spacer {
        Spacer::plain(id, y, height)
    }

    #[test]
    fn test_no_spacers_single_segment() {
        let segments = plan_segments(800.0, &[]);
        assert_eq!(
            segments,
            vec![Segment::Content {
                source_start: 0.0,
                source_length: 800.0,
                dest_offset: 0.0
            }]
        );
    }

    #[test]
    fn test_single_spacer_splits_page() {
        let spacers = [spacer("s", 300.0, 100.0)];
        let segments = plan_segments(800.0, &spacers);
        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments[0],
            Segment::Content {
                source_start: 0.0,
                source_length: 300.0,
                dest_offset: 0.0
            }
        );
        assert_eq!(segments[1].dest_offset(), 300.0);
        assert_eq!(segments[1].length(), 100.0);
        assert_eq!(
            segments[2],
            Segment::Content {
                source_start: 300.0,
                source_length: 500.0,
                dest_offset: 400.0
            }
        );
        assert_eq!(reflowed_height(&segments), 900.0);
    }

    #[test]
    fn test_spacer_at_top_has_no_leading_content() {
        let spacers = [spacer("s", 0.0, 50.0)];
        let segments = plan_segments(100.0, &spacers);
        assert!(!segments[0].is_content());
        assert_eq!(segments[1].dest_offset(), 50.0);
    }

    #[test]
    fn test_tie_keeps_insertion_order() {
        let spacers = [spacer("h50", 100.0, 50.0), spacer("h30", 100.0, 30.0)];
        let segments = plan_segments(400.0, &spacers);
        let ids: Vec<_> = segments
            .iter()
            .filter_map(|s| s.spacer())
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, ["h50", "h30"]);
        assert_eq!(segments[1].dest_offset(), 100.0);
        assert_eq!(segments[2].dest_offset(), 150.0);
        assert_eq!(segments[3].dest_offset(), 180.0);
        assert!(segments.iter().all(|s| s.length() > 0.0));
    }

    #[test]
    fn test_spacer_below_page_still_consumes_height() {
        let spacers = [spacer("s", 900.0, 100.0)];
        let segments = plan_segments(800.0, &spacers);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].length(), 900.0);
        assert_eq!(segments[1].dest_offset(), 900.0);
        assert_eq!(reflowed_height(&segments), 1000.0);
    }

    #[test]
    fn test_spacer_at_page_bottom_has_no_trailing_content() {
        let spacers = [spacer("s", 800.0, 40.0)];
        let segments = plan_segments(800.0, &spacers);
        assert_eq!(segments.len(), 2);
        assert_eq!(reflowed_height(&segments), 840.0);
    }

    #[test]
    fn test_reflowed_top_accounts_for_spacers_above() {
        let spacers = [spacer("b", 500.0, 20.0), spacer("a", 100.0, 60.0)];
        assert_eq!(reflowed_top(&spacers, "a"), Some(100.0));
        assert_eq!(reflowed_top(&spacers, "b"), Some(560.0));
        assert_eq!(reflowed_top(&spacers, "zzz"), None);
    }

    #[test]
    fn test_to_source_y_inverts_reflow() {
        let spacers = [spacer("a", 300.0, 100.0)];
        assert_eq!(to_source_y(200.0, &spacers), 200.0);
        assert_eq!(to_source_y(350.0, &spacers), 250.0);
        assert_eq!(to_source_y(450.0, &spacers), 350.0);
        assert_eq!(to_reflowed_y(350.0, &spacers), 450.0);
        assert_eq!(to_reflowed_y(200.0, &spacers), 200.0);
    }

    #[test]
    fn test_to_source_y_inside_spacer_subtracts_its_height() {
        let spacers = [spacer("a", 300.0, 100.0), spacer("b", 0.0, 40.0)];
        // Inside "a", whose reflowed band is 340..440.
        assert_eq!(to_source_y(350.0, &spacers), 210.0);
        // Inside "b" near the top clamps to zero.
        assert_eq!(to_source_y(10.0, &spacers), 0.0);
    }
}
