//! Input normalization: keyboard and pointer events become [`InputEvent`]s,
//! and screen cells are mapped back to the semantic actions registered
//! during the last frame.

use ratzilla::ratatui::layout::Rect;

/// A keyboard press or a tap on a registered target.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key(char),
    /// Tap on a click target, carrying its action ID (see `terminal::actions`).
    Click(u16),
}

#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub rect: Rect,
    pub action_id: u16,
}

/// Click targets registered by the renderer. Rebuilt from scratch every frame.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
        }
    }

    pub fn begin_frame(&mut self) {
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        if rect.width > 0 && rect.height > 0 {
            self.targets.push(ClickTarget { rect, action_id });
        }
    }

    /// Register the full width of `area` at `row`. Rows outside `area` are
    /// dropped so clipped content never becomes tappable.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.bottom() {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Action under the given cell. Later registrations sit on top.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets
            .iter()
            .rev()
            .find(|t| {
                let r = t.rect;
                col >= r.x && col < r.right() && row >= r.y && row < r.bottom()
            })
            .map(|t| t.action_id)
    }
}

/// Phones in portrait get the stacked layout without reactor art.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 44
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_test_rows_and_columns() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 5, 10, 1), 1);
        cs.add_click_target(Rect::new(10, 5, 10, 2), 2);

        assert_eq!(cs.hit_test(0, 5), Some(1));
        assert_eq!(cs.hit_test(9, 5), Some(1));
        assert_eq!(cs.hit_test(10, 5), Some(2));
        assert_eq!(cs.hit_test(19, 6), Some(2));
        assert_eq!(cs.hit_test(20, 5), None);
        assert_eq!(cs.hit_test(5, 6), None);
    }

    #[test]
    fn later_target_wins_on_overlap() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 40, 10), 0);
        cs.add_click_target(Rect::new(0, 9, 40, 1), 10);

        assert_eq!(cs.hit_test(3, 9), Some(10));
        assert_eq!(cs.hit_test(3, 8), Some(0));
    }

    #[test]
    fn empty_rect_is_not_registered() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(3, 3, 0, 1), 1);
        cs.add_click_target(Rect::new(3, 3, 4, 0), 2);
        assert!(cs.targets.is_empty());
    }

    #[test]
    fn row_target_clipped_to_area() {
        let mut cs = ClickState::new();
        let area = Rect::new(2, 10, 30, 3);
        cs.add_row_target(area, 9, 1);
        cs.add_row_target(area, 13, 2);
        cs.add_row_target(area, 12, 3);

        assert_eq!(cs.targets.len(), 1);
        assert_eq!(cs.hit_test(2, 12), Some(3));
        assert_eq!(cs.hit_test(1, 12), None);
    }

    #[test]
    fn begin_frame_resets_targets() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 5, 5), 1);
        cs.begin_frame();
        assert!(cs.targets.is_empty());
        assert_eq!(cs.hit_test(1, 1), None);
    }

    #[test]
    fn narrow_layout_threshold() {
        assert!(is_narrow_layout(37));
        assert!(!is_narrow_layout(44));
        assert!(!is_narrow_layout(80));
    }

    #[test]
    fn tap_on_phone_grid_hits_tab_bar() {
        // 37x50 grid, tab bar on the last 3 rows
        let mut cs = ClickState::new();
        cs.begin_frame();
        cs.add_click_target(Rect::new(0, 47, 12, 3), 10);
        cs.add_click_target(Rect::new(12, 47, 12, 3), 11);
        cs.add_click_target(Rect::new(24, 47, 13, 3), 12);

        assert_eq!(cs.hit_test(0, 48), Some(10));
        assert_eq!(cs.hit_test(18, 49), Some(11));
        assert_eq!(cs.hit_test(36, 47), Some(12));
        assert_eq!(cs.hit_test(18, 0), None);
        assert_eq!(cs.hit_test(18, 50), None);
    }
}
