use crate::gesture::TapPoint;
use crate::models::MediaItem;

/// Imperative commands accepted by the host's native pager.
pub trait PagerCommands {
    fn scroll_to_offset(&mut self, offset: f64, animated: bool);

    /// Enables or disables user paging (disabled while an item is zoomed).
    fn set_scroll_enabled(&mut self, enabled: bool);
}

/// Callbacks the viewer raises toward its host.
pub trait ViewerHost {
    fn on_current_index_change(&mut self, index: usize);

    /// Called once per viewer, after the close fade when there is one.
    fn on_request_close(&mut self);

    /// Velocity-based guess of the next page; may never materialize.
    fn on_index_will_change(&mut self, _index: usize) {}

    /// Header/footer should show or hide.
    fn on_chrome_visibility(&mut self, _visible: bool) {}

    /// Drive the native zoom of item `index` to `scale`, centred on `at`.
    fn on_zoom_to(&mut self, _index: usize, _scale: f64, _at: TapPoint) {}

    fn on_long_press(&mut self, _item: &MediaItem) {}
}
