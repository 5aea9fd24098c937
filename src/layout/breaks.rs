//! Output page-break guides for the continuous viewer.

use crate::source::PageSize;

/// Positions of output page breaks inside one stacked page of the viewer.
///
/// `doc_offset` is where the page starts in the stacked document and
/// `page_height` its reflowed height, both in display pixels. Breaks repeat
/// every `page_width * target.height / target.width` pixels measured from the
/// top of the document, so guides line up across page boundaries. Returned
/// positions are relative to the page top.
pub fn page_break_guides(doc_offset: f32, page_height: f32, page_width: f32, target: PageSize) -> Vec<f32> {
    let mut guides = Vec::new();
    if page_width <= 0.0 || target.width <= 0.0 || page_height <= 0.0 {
        return guides;
    }

    let step = page_width * (target.height / target.width);
    let mut y = step - doc_offset.rem_euclid(step);
    if y >= step {
        y = 0.0;
    }
    while y < page_height - 1.0 {
        guides.push(y);
        y += step;
    }
    guides
}
