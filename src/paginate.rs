//! Measurement-driven text pagination
//!
//! Partitions a line sequence into discrete pages sized to the current
//! viewport and font metrics. Pages are rebuilt wholesale on every trigger
//! (lines, viewport, or style change); consumers never see a partially
//! rebuilt sequence.

use log::debug;

use crate::error::PaginateFault;

/// Font metrics driving line measurement.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleMetrics {
    pub font_family: String,
    /// Font size in device pixels
    pub font_size: f32,
    /// Line height as a multiple of font size
    pub line_height: f32,
}

impl Default for StyleMetrics {
    fn default() -> Self {
        Self {
            font_family: "serif".to_string(),
            font_size: 16.0,
            line_height: 1.5,
        }
    }
}

impl StyleMetrics {
    /// Nominal height of one rendered line in device pixels.
    #[must_use]
    pub fn nominal_line_px(&self) -> f32 {
        self.font_size * self.line_height
    }
}

/// Box the paginated text must fit into, in device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AvailableBox {
    pub width: f32,
    pub height: f32,
}

impl AvailableBox {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Off-surface line measurement. The host backs this with whatever layout
/// surface it has; measurement happens away from the visible surface to
/// avoid flicker.
pub trait LineMeasurer {
    /// Rendered height of a line under the given metrics and width.
    ///
    /// Returns [`PaginateFault::MeasurementUnavailable`] while the layout
    /// surface is not ready; pagination is deferred and retried.
    fn line_height_px(
        &self,
        line: &str,
        metrics: &StyleMetrics,
        available_width: f32,
    ) -> Result<f32, PaginateFault>;
}

/// One page of paginated text.
///
/// An ordered sequence of TextPages partitions the input lines exactly:
/// no line omitted, duplicated, or reordered.
#[derive(Clone, Debug, PartialEq)]
pub struct TextPage {
    /// Page number, 1-indexed
    pub number: usize,
    /// First line on the page (index into the input)
    pub start_line: usize,
    /// Last line on the page, inclusive
    pub end_line: usize,
    /// Lines joined with newlines
    pub content: String,
}

/// Blank lines occupy this fraction of a nominal line instead of being
/// dropped.
const BLANK_LINE_FRACTION: f32 = 0.5;

/// Greedy line-packing paginator.
pub struct TextPaginator;

impl TextPaginator {
    /// Partition `lines` into pages no taller than `available.height`.
    ///
    /// Greedy: accumulate measured line heights; when the next line would
    /// overflow, close the page and start a new one with that line. The
    /// final open page is always flushed, even with a single line. A line
    /// taller than the box still gets a page of its own.
    pub fn paginate<M: LineMeasurer + ?Sized>(
        lines: &[String],
        available: AvailableBox,
        metrics: &StyleMetrics,
        measurer: &M,
    ) -> Result<Vec<TextPage>, PaginateFault> {
        let mut pages = Vec::new();
        if lines.is_empty() {
            return Ok(pages);
        }

        let blank_px = (metrics.nominal_line_px() * BLANK_LINE_FRACTION).max(1.0);

        let mut page_start = 0usize;
        let mut running_height = 0.0f32;

        for (index, line) in lines.iter().enumerate() {
            let line_px = if line.trim().is_empty() {
                blank_px
            } else {
                measurer.line_height_px(line, metrics, available.width)?
            };

            if index > page_start && running_height + line_px > available.height {
                pages.push(Self::close_page(lines, pages.len() + 1, page_start, index - 1));
                page_start = index;
                running_height = 0.0;
            }

            running_height += line_px;
        }

        pages.push(Self::close_page(lines, pages.len() + 1, page_start, lines.len() - 1));

        debug!(
            "paginated {} lines into {} pages ({}x{} box)",
            lines.len(),
            pages.len(),
            available.width,
            available.height
        );

        Ok(pages)
    }

    fn close_page(lines: &[String], number: usize, start: usize, end: usize) -> TextPage {
        TextPage {
            number,
            start_line: start,
            end_line: end,
            content: lines[start..=end].join("\n"),
        }
    }

    /// Page index to restore for a saved 1-indexed page number:
    /// min(saved - 1, page_count - 1), or 0 when nothing was saved.
    #[must_use]
    pub fn restore_index(saved_page: Option<usize>, page_count: usize) -> usize {
        match (saved_page, page_count) {
            (_, 0) => 0,
            (Some(saved), count) => saved.saturating_sub(1).min(count - 1),
            (None, _) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every line measures a fixed height.
    struct FixedHeight(f32);

    impl LineMeasurer for FixedHeight {
        fn line_height_px(
            &self,
            _line: &str,
            _metrics: &StyleMetrics,
            _width: f32,
        ) -> Result<f32, PaginateFault> {
            Ok(self.0)
        }
    }

    /// Measurement surface that is never ready.
    struct NotReady;

    impl LineMeasurer for NotReady {
        fn line_height_px(
            &self,
            _line: &str,
            _metrics: &StyleMetrics,
            _width: f32,
        ) -> Result<f32, PaginateFault> {
            Err(PaginateFault::MeasurementUnavailable)
        }
    }

    fn numbered_lines(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {i}")).collect()
    }

    fn assert_exact_partition(pages: &[TextPage], line_count: usize) {
        let mut expected_start = 0;
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.number, i + 1, "pages numbered contiguously from 1");
            assert_eq!(page.start_line, expected_start, "no gap or overlap");
            assert!(page.end_line >= page.start_line);
            expected_start = page.end_line + 1;
        }
        assert_eq!(expected_start, line_count, "all lines covered");
    }

    #[test]
    fn thirty_seven_lines_at_twenty_px_in_hundred_px_box() {
        let lines = numbered_lines(37);
        let pages = TextPaginator::paginate(
            &lines,
            AvailableBox::new(300.0, 100.0),
            &StyleMetrics::default(),
            &FixedHeight(20.0),
        )
        .expect("measurable");

        assert_eq!(pages.len(), 8);
        assert_eq!(pages[0].start_line, 0);
        assert_eq!(pages[0].end_line, 4);
        for page in &pages[..7] {
            assert_eq!(page.end_line - page.start_line + 1, 5);
        }
        assert_eq!(pages[7].end_line - pages[7].start_line + 1, 2);
        assert_exact_partition(&pages, 37);
    }

    #[test]
    fn partition_is_exact_for_varied_heights() {
        struct Alternating;
        impl LineMeasurer for Alternating {
            fn line_height_px(
                &self,
                line: &str,
                _metrics: &StyleMetrics,
                _width: f32,
            ) -> Result<f32, PaginateFault> {
                Ok(if line.len() % 2 == 0 { 17.0 } else { 41.0 })
            }
        }

        let lines = numbered_lines(53);
        let pages = TextPaginator::paginate(
            &lines,
            AvailableBox::new(300.0, 120.0),
            &StyleMetrics::default(),
            &Alternating,
        )
        .expect("measurable");

        assert!(!pages.is_empty());
        assert_exact_partition(&pages, 53);
    }

    #[test]
    fn empty_input_yields_no_pages() {
        let pages = TextPaginator::paginate(
            &[],
            AvailableBox::new(300.0, 100.0),
            &StyleMetrics::default(),
            &FixedHeight(20.0),
        )
        .expect("measurable");
        assert!(pages.is_empty());
    }

    #[test]
    fn single_line_still_gets_a_page() {
        let lines = vec!["only line".to_string()];
        let pages = TextPaginator::paginate(
            &lines,
            AvailableBox::new(300.0, 100.0),
            &StyleMetrics::default(),
            &FixedHeight(20.0),
        )
        .expect("measurable");

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].content, "only line");
        assert_exact_partition(&pages, 1);
    }

    #[test]
    fn oversized_line_gets_its_own_page() {
        let lines = numbered_lines(3);
        let pages = TextPaginator::paginate(
            &lines,
            AvailableBox::new(300.0, 50.0),
            &StyleMetrics::default(),
            &FixedHeight(80.0),
        )
        .expect("measurable");

        assert_eq!(pages.len(), 3);
        assert_exact_partition(&pages, 3);
    }

    #[test]
    fn blank_lines_are_counted_not_dropped() {
        let lines = vec![
            "alpha".to_string(),
            String::new(),
            "   ".to_string(),
            "omega".to_string(),
        ];
        let metrics = StyleMetrics::default();
        let pages = TextPaginator::paginate(
            &lines,
            AvailableBox::new(300.0, 1000.0),
            &metrics,
            &FixedHeight(20.0),
        )
        .expect("measurable");

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].start_line, 0);
        assert_eq!(pages[0].end_line, 3);
        assert_eq!(pages[0].content, "alpha\n\n   \nomega");
    }

    #[test]
    fn blank_line_placeholder_takes_space() {
        // 12px nominal blank placeholder (16 * 1.5 * 0.5) means four blanks
        // plus two 30px lines overflow a 100px box.
        let lines = vec![
            "top".to_string(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            "bottom".to_string(),
        ];
        let pages = TextPaginator::paginate(
            &lines,
            AvailableBox::new(300.0, 100.0),
            &StyleMetrics::default(),
            &FixedHeight(30.0),
        )
        .expect("measurable");

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].start_line, 5);
        assert_exact_partition(&pages, 6);
    }

    #[test]
    fn unmeasurable_surface_defers_pagination() {
        let lines = numbered_lines(3);
        let result = TextPaginator::paginate(
            &lines,
            AvailableBox::new(300.0, 100.0),
            &StyleMetrics::default(),
            &NotReady,
        );
        assert_eq!(result.unwrap_err(), PaginateFault::MeasurementUnavailable);
    }

    #[test]
    fn restore_index_clamps_saved_page() {
        assert_eq!(TextPaginator::restore_index(Some(3), 8), 2);
        assert_eq!(TextPaginator::restore_index(Some(99), 8), 7);
        assert_eq!(TextPaginator::restore_index(Some(0), 8), 0);
        assert_eq!(TextPaginator::restore_index(None, 8), 0);
        assert_eq!(TextPaginator::restore_index(Some(5), 0), 0);
    }
}
