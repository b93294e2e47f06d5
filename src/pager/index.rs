//! Authoritative current-page index for the horizontal pager.
//!
//! The host pager reports continuous scroll samples and discrete settle
//! events. Only settles (and explicit seeks) move `current`; scroll samples
//! produce a velocity-based `pending` guess that is surfaced as a hint.

use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageIndexState {
    /// Last settled index.
    pub current: usize,
    /// Velocity-predicted next index, cleared on settle.
    pub pending: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexEvent {
    /// Hint: the pager is heading for this index.
    WillChange(usize),
    /// `current` moved to this index.
    Changed(usize),
}

/// Imperative scroll the host pager has to perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCommand {
    pub offset: f64,
    pub animated: bool,
}

/// Outcome of an imperative seek.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seek {
    pub scroll: ScrollCommand,
    pub changed: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct PageIndexCoordinator {
    state: PageIndexState,
    item_count: usize,
    page_width: f64,
    zoom_active: bool,
}

impl PageIndexCoordinator {
    /// Mount at `initial_index`. The initial value is never reported as a change.
    pub fn new(initial_index: usize, item_count: usize, page_width: f64) -> Self {
        let mut coordinator = Self {
            state: PageIndexState {
                current: 0,
                pending: None,
            },
            item_count,
            page_width,
            zoom_active: false,
        };
        coordinator.state.current = coordinator.clamp(initial_index as i64);
        coordinator
    }

    pub fn current(&self) -> usize {
        self.state.current
    }

    pub fn pending(&self) -> Option<usize> {
        self.state.pending
    }

    pub fn state(&self) -> PageIndexState {
        self.state
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn page_width(&self) -> f64 {
        self.page_width
    }

    pub fn is_zoom_active(&self) -> bool {
        self.zoom_active
    }

    /// While set, scroll-derived index changes are rejected.
    pub fn set_zoom_active(&mut self, active: bool) {
        self.zoom_active = active;
        if active {
            self.state.pending = None;
        }
    }

    /// Horizontal content offset of a page.
    pub fn offset_for(&self, index: usize) -> f64 {
        index as f64 * self.page_width.max(0.0)
    }

    /// Intra-scroll sample. Only updates the `pending` hint.
    pub fn on_scroll(&mut self, velocity_x: f64) -> Option<IndexEvent> {
        if self.item_count == 0 || self.zoom_active || !velocity_x.is_finite() {
            return None;
        }
        let step = if velocity_x > 0.0 {
            1
        } else if velocity_x < 0.0 {
            -1
        } else {
            return None;
        };

        let predicted = self.clamp(self.state.current as i64 + step);
        let pending = (predicted != self.state.current).then_some(predicted);
        if pending == self.state.pending {
            return None;
        }
        self.state.pending = pending;
        trace!(?pending, velocity_x, "pager pending index");
        pending.map(IndexEvent::WillChange)
    }

    /// Momentum ended at `final_offset_x`.
    pub fn on_settle(&mut self, final_offset_x: f64) -> Option<IndexEvent> {
        self.state.pending = None;
        if self.item_count == 0 || self.zoom_active {
            return None;
        }
        if self.page_width <= 0.0 || !final_offset_x.is_finite() {
            return None;
        }

        let settled = self.clamp((final_offset_x / self.page_width).round() as i64);
        if settled == self.state.current {
            return None;
        }
        debug!(from = self.state.current, to = settled, "pager settled");
        self.state.current = settled;
        Some(IndexEvent::Changed(settled))
    }

    /// Host-driven jump. Always yields one non-animated scroll command.
    pub fn seek(&mut self, index: usize) -> Seek {
        let target = self.clamp(index as i64);
        let changed = (target != self.state.current).then_some(target);
        if changed.is_some() {
            debug!(from = self.state.current, to = target, "pager seek");
        }
        self.state.current = target;
        self.state.pending = None;
        Seek {
            scroll: ScrollCommand {
                offset: self.offset_for(target),
                animated: false,
            },
            changed,
        }
    }

    /// Page width changed (rotation). Returns the scroll that keeps `current` aligned.
    pub fn set_page_width(&mut self, page_width: f64) -> Option<ScrollCommand> {
        if (page_width - self.page_width).abs() < f64::EPSILON {
            return None;
        }
        self.page_width = page_width;
        self.state.pending = None;
        if page_width <= 0.0 || self.item_count == 0 {
            return None;
        }
        Some(ScrollCommand {
            offset: self.offset_for(self.state.current),
            animated: false,
        })
    }

    /// Collection size changed. Clamps `current` and reports a move.
    pub fn set_item_count(&mut self, item_count: usize) -> Option<IndexEvent> {
        self.item_count = item_count;
        self.state.pending = None;
        let clamped = self.clamp(self.state.current as i64);
        if clamped == self.state.current {
            return None;
        }
        self.state.current = clamped;
        Some(IndexEvent::Changed(clamped))
    }

    fn clamp(&self, index: i64) -> usize {
        if self.item_count == 0 {
            return 0;
        }
        index.clamp(0, self.item_count as i64 - 1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f64 = 390.0;

    #[test]
    fn test_initial_index_is_clamped_and_silent() {
        let mut pager = PageIndexCoordinator::new(4, 10, WIDTH);
        assert_eq!(pager.current(), 4);
        // Settling on the mount page is not a change.
        assert_eq!(pager.on_settle(4.0 * WIDTH), None);

        let pager = PageIndexCoordinator::new(50, 10, WIDTH);
        assert_eq!(pager.current(), 9);
    }

    #[test]
    fn test_settle_rounds_and_notifies() {
        let mut pager = PageIndexCoordinator::new(0, 10, WIDTH);
        assert_eq!(pager.on_settle(WIDTH * 0.4), None);
        assert_eq!(pager.on_settle(WIDTH * 0.6), Some(IndexEvent::Changed(1)));
        assert_eq!(pager.on_settle(WIDTH * 1.02), None);
        assert_eq!(pager.on_settle(WIDTH * 3.0), Some(IndexEvent::Changed(3)));
    }

    #[test]
    fn test_last_settle_wins() {
        let mut pager = PageIndexCoordinator::new(2, 8, WIDTH);
        let settles = [3, 4, 4, 1, 7, 6];
        for index in settles {
            pager.on_settle(index as f64 * WIDTH);
        }
        assert_eq!(pager.current(), 6);
    }

    #[test]
    fn test_settle_out_of_bounds_clamps() {
        let mut pager = PageIndexCoordinator::new(1, 3, WIDTH);
        assert_eq!(pager.on_settle(-120.0), Some(IndexEvent::Changed(0)));
        assert_eq!(pager.on_settle(WIDTH * 40.0), Some(IndexEvent::Changed(2)));
        assert_eq!(pager.on_settle(f64::NAN), None);
    }

    #[test]
    fn test_scroll_velocity_sets_pending_hint() {
        let mut pager = PageIndexCoordinator::new(5, 10, WIDTH);
        assert_eq!(pager.on_scroll(0.0), None);
        assert_eq!(pager.on_scroll(1.2), Some(IndexEvent::WillChange(6)));
        // Same prediction is not repeated.
        assert_eq!(pager.on_scroll(0.8), None);
        assert_eq!(pager.on_scroll(-0.5), Some(IndexEvent::WillChange(4)));
        assert_eq!(pager.current(), 5);

        assert_eq!(pager.on_settle(5.0 * WIDTH), None);
        assert_eq!(pager.pending(), None);
    }

    #[test]
    fn test_pending_clamped_at_edges() {
        let mut pager = PageIndexCoordinator::new(9, 10, WIDTH);
        assert_eq!(pager.on_scroll(3.0), None);
        assert_eq!(pager.pending(), None);
        assert_eq!(pager.on_scroll(-3.0), Some(IndexEvent::WillChange(8)));
    }

    #[test]
    fn test_zoom_blocks_paging() {
        let mut pager = PageIndexCoordinator::new(0, 10, WIDTH);
        pager.set_zoom_active(true);
        assert_eq!(pager.on_scroll(2.0), None);
        assert_eq!(pager.on_settle(2.0 * WIDTH), None);
        assert_eq!(pager.current(), 0);

        pager.set_zoom_active(false);
        assert_eq!(pager.on_settle(2.0 * WIDTH), Some(IndexEvent::Changed(2)));
    }

    #[test]
    fn test_seek_then_confirming_settle() {
        let mut pager = PageIndexCoordinator::new(0, 10, WIDTH);
        let seek = pager.seek(3);
        assert_eq!(seek.changed, Some(3));
        assert_eq!(
            seek.scroll,
            ScrollCommand {
                offset: 3.0 * WIDTH,
                animated: false
            }
        );
        assert_eq!(pager.current(), 3);
        assert_eq!(pager.on_settle(3.0 * WIDTH), None);
    }

    #[test]
    fn test_seek_clamps_and_same_index_is_silent() {
        let mut pager = PageIndexCoordinator::new(2, 4, WIDTH);
        let seek = pager.seek(99);
        assert_eq!(seek.changed, Some(3));
        let seek = pager.seek(3);
        assert_eq!(seek.changed, None);
        assert_eq!(seek.scroll.offset, 3.0 * WIDTH);
    }

    #[test]
    fn test_rotation_realigns() {
        let mut pager = PageIndexCoordinator::new(2, 4, WIDTH);
        assert_eq!(pager.set_page_width(WIDTH), None);
        let cmd = pager.set_page_width(844.0).unwrap();
        assert_eq!(cmd.offset, 2.0 * 844.0);
        assert!(!cmd.animated);
        assert_eq!(pager.on_settle(2.0 * 844.0), None);
    }

    #[test]
    fn test_zero_width_and_empty_collection() {
        let mut pager = PageIndexCoordinator::new(0, 5, 0.0);
        assert_eq!(pager.on_settle(500.0), None);

        let mut empty = PageIndexCoordinator::new(3, 0, WIDTH);
        assert_eq!(empty.current(), 0);
        assert_eq!(empty.on_settle(WIDTH), None);
        assert_eq!(empty.on_scroll(1.0), None);
        assert_eq!(empty.seek(2).changed, None);
    }

    #[test]
    fn test_shrinking_collection_clamps_current() {
        let mut pager = PageIndexCoordinator::new(7, 10, WIDTH);
        assert_eq!(pager.set_item_count(20), None);
        assert_eq!(pager.set_item_count(5), Some(IndexEvent::Changed(4)));
    }
}
