// Scroll state for lists and panels
//
// Each scrollable component owns one of these; the draw layer reports
// content and viewport sizes every frame and reads back the visible
// range. Lists here are top-anchored: new content does not move the view.

#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    /// Line/item index at the top of the viewport.
    offset: usize,
    total: usize,
    viewport: usize,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update sizes for the current frame, clamping the offset to the
    /// valid range.
    pub fn update_dimensions(&mut self, total: usize, viewport: usize) {
        self.total = total;
        self.viewport = viewport;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn scroll_up(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        // Before dimensions are known allow unbounded scroll; the next
        // update_dimensions clamps.
        if self.total == 0 || self.offset < self.max_offset() {
            self.offset += 1;
        }
    }

    pub fn page_up(&mut self) {
        self.offset = self.offset.saturating_sub(self.viewport.max(1));
    }

    pub fn page_down(&mut self) {
        self.offset = (self.offset + self.viewport.max(1)).min(self.max_offset());
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Visible (start, end) item indices.
    pub fn visible_range(&self) -> (usize, usize) {
        let start = self.offset;
        let end = (self.offset + self.viewport).min(self.total);
        (start, end)
    }

    fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_clamped_to_content() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(10, 4);
        for _ in 0..20 {
            scroll.scroll_down();
        }
        scroll.update_dimensions(10, 4);
        assert_eq!(scroll.offset(), 6);
        assert_eq!(scroll.visible_range(), (6, 10));
    }

    #[test]
    fn test_top_anchored_on_growth() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(5, 4);
        assert_eq!(scroll.offset(), 0);
        scroll.update_dimensions(50, 4);
        assert_eq!(scroll.offset(), 0);
    }

    #[test]
    fn test_paging() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(100, 10);
        scroll.page_down();
        assert_eq!(scroll.offset(), 10);
        scroll.page_up();
        assert_eq!(scroll.offset(), 0);
        scroll.page_up();
        assert_eq!(scroll.offset(), 0);
    }

    #[test]
    fn test_content_shrink_reclamps() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(100, 10);
        scroll.page_down();
        scroll.page_down();
        scroll.update_dimensions(12, 10);
        assert_eq!(scroll.offset(), 2);
    }
}
