// Lightbox viewer shell
// Wires the per-item gesture state, the page index coordinator and the close
// debouncer to a host pager and host callbacks:
// - Mounts at the initial page with one non-animated scroll, no notification
// - Per-item slots (zoom, double-tap, renderer) for pages near the current one
// - Page switches cancel double-tap history and lazily reset zoom
// - Swipe-dismiss and explicit close share one debounced close path

pub mod close;
pub mod host;
pub mod renderer;

pub use close::*;
pub use host::*;
pub use renderer::*;

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::config::ViewerConfig;
use crate::gesture::{DoubleTapDetector, GestureSample, TapPoint, ZoomController, ZoomEvent, ZoomState};
use crate::layout::{compute_transform, FitTransform, Size, ViewportGeometry};
use crate::models::{ItemFlags, MediaItem, MediaKey, MediaKind};
use crate::pager::{IndexEvent, PageIndexCoordinator, ScrollCommand};
use crate::resolve::Resolved;

/// Pages on either side of the current one that keep their slot state.
const SLOT_WINDOW: usize = 2;

/// Everything a renderer needs to draw one page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub transform: FitTransform,
    pub zoom: ZoomState,
    pub max_zoom: f64,
    pub show_placeholder: bool,
    pub opacity: f64,
    pub playing: bool,
    /// Badges for the host's overlay (favorite, hidden, albums).
    pub flags: ItemFlags,
}

#[derive(Debug)]
struct ItemSlot {
    key: MediaKey,
    zoom: ZoomController,
    taps: DoubleTapDetector,
    renderer: MediaRenderer,
    // Left while zoomed; reset on next becoming current.
    stale: bool,
}

impl ItemSlot {
    fn new(key: MediaKey, kind: MediaKind, max_zoom: f64, config: &ViewerConfig) -> Self {
        Self {
            key,
            zoom: ZoomController::new(max_zoom, config.swipe_to_close_enabled)
                .with_close_velocity(config.swipe_close_velocity),
            taps: DoubleTapDetector::new(config.double_tap_window),
            renderer: MediaRenderer::for_kind(kind),
            stale: false,
        }
    }
}

pub struct ViewerShell<P: PagerCommands, H: ViewerHost> {
    items: Vec<MediaItem>,
    viewport: ViewportGeometry,
    config: ViewerConfig,
    index: PageIndexCoordinator,
    slots: HashMap<usize, ItemSlot>,
    close: CloseDebouncer,
    chrome_visible: bool,
    pager: P,
    host: H,
}

impl<P: PagerCommands, H: ViewerHost> ViewerShell<P, H> {
    pub fn new(
        items: Vec<MediaItem>,
        initial_index: usize,
        viewport: ViewportGeometry,
        config: ViewerConfig,
        pager: P,
        host: H,
    ) -> Self {
        let index = PageIndexCoordinator::new(initial_index, items.len(), viewport.width);
        let close = CloseDebouncer::new(config.close_mode, config.close_fade);
        let mut shell = Self {
            items,
            viewport,
            config,
            index,
            slots: HashMap::new(),
            close,
            chrome_visible: true,
            pager,
            host,
        };

        let current = shell.index.current();
        info!(count = shell.items.len(), current, "Mounting viewer");
        if !shell.items.is_empty() {
            let offset = shell.index.offset_for(current);
            shell.pager.scroll_to_offset(offset, false);
            shell.pager.set_scroll_enabled(true);
            if let Some(slot) = shell.slot_mut(current) {
                slot.renderer.set_current(true);
            }
        }
        shell
    }

    /// Imperative controller for the host.
    pub fn handle(&mut self) -> ViewerHandle<'_, P, H> {
        ViewerHandle { shell: self }
    }

    pub fn current_index(&self) -> usize {
        self.index.current()
    }

    pub fn pending_index(&self) -> Option<usize> {
        self.index.pending()
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    pub fn viewport(&self) -> ViewportGeometry {
        self.viewport
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn chrome_visible(&self) -> bool {
        self.chrome_visible
    }

    pub fn is_closing(&self) -> bool {
        self.close.is_closing()
    }

    /// Delay the host should use for its own long-press recognizer.
    pub fn long_press_delay(&self) -> Duration {
        self.config.delay_before_long_press
    }

    pub fn pager(&self) -> &P {
        &self.pager
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Fit transform for an item against the current viewport. Never cached.
    pub fn transform_for(&self, index: usize) -> FitTransform {
        let intrinsic = self.items.get(index).and_then(|item| item.dimensions);
        compute_transform(intrinsic, self.viewport)
    }

    pub fn zoom_state(&self, index: usize) -> ZoomState {
        self.slots
            .get(&index)
            .map(|slot| slot.zoom.state())
            .unwrap_or_default()
    }

    pub fn frame(&self, index: usize, now: Duration) -> Option<RenderFrame> {
        let item = self.items.get(index)?;
        let transform = self.transform_for(index);
        let slot = self.slots.get(&index).filter(|slot| slot.key == item.key);
        let is_current = index == self.index.current();

        let zoom = slot.map(|s| s.zoom.state()).unwrap_or_default();
        let show_placeholder = slot
            .map(|s| s.renderer.show_placeholder(item.has_dimensions()))
            .unwrap_or(true);
        let mut opacity = self.close.opacity(now);
        if is_current {
            if let Some(slot) = slot {
                opacity *= slot.zoom.dismiss_opacity();
            }
        }

        Some(RenderFrame {
            transform,
            zoom,
            max_zoom: transform.max_zoom(),
            show_placeholder,
            opacity,
            playing: slot.is_some_and(|s| s.renderer.is_playing()),
            flags: item.flags.clone(),
        })
    }

    /// Viewport changed (rotation, window resize).
    pub fn set_viewport(&mut self, viewport: ViewportGeometry) {
        if viewport == self.viewport {
            return;
        }
        debug!(width = viewport.width, height = viewport.height, "Viewport changed");
        self.viewport = viewport;

        let current = self.index.current();
        let mut current_event = None;
        for (i, slot) in self.slots.iter_mut() {
            let intrinsic = self.items.get(*i).and_then(|item| item.dimensions);
            let event = slot
                .zoom
                .set_max_zoom(compute_transform(intrinsic, viewport).max_zoom());
            if *i == current {
                current_event = event;
            }
        }
        if let Some(cmd) = self.index.set_page_width(viewport.width) {
            self.apply_scroll(cmd);
        }
        if let Some(ZoomEvent::ZoomChanged {
            zoomed,
            target_scale,
        }) = current_event
        {
            self.on_zoom_changed(current, zoomed, target_scale, None);
        }
    }

    /// Swap the collection (items deleted or appended by the host).
    pub fn replace_items(&mut self, items: Vec<MediaItem>) {
        let previous = self.index.current();
        self.items = items;
        self.slots.retain(|i, slot| {
            self.items
                .get(*i)
                .is_some_and(|item| item.key == slot.key)
        });

        let moved = self.index.set_item_count(self.items.len());
        if self.items.is_empty() {
            debug!("Collection emptied");
            self.slots.clear();
            self.index.set_zoom_active(false);
            return;
        }

        if let Some(IndexEvent::Changed(new)) = moved {
            let cmd = self.index.seek(new).scroll;
            self.apply_scroll(cmd);
            self.switch_page(previous, new);
        } else {
            // Same index, possibly a different item under it.
            let current = self.index.current();
            if let Some(slot) = self.slot_mut(current) {
                slot.renderer.set_current(true);
            }
            self.sync_zoom_lock();
        }
    }

    /// Apply a dimension result from the resolver.
    pub fn apply_resolved(&mut self, resolved: Resolved) {
        let Some(item) = self.items.get_mut(resolved.index) else {
            return;
        };
        if item.key != resolved.key {
            trace!(index = resolved.index, "Dropping stale dimension result");
            return;
        }

        let index = resolved.index;
        let event = match resolved.result {
            Ok(size) if size.is_positive() && item.dimensions.is_none() => {
                item.dimensions = Some(size);
                let max_zoom = compute_transform(Some(size), self.viewport).max_zoom();
                self.slots
                    .get_mut(&index)
                    .and_then(|slot| slot.zoom.set_max_zoom(max_zoom))
            }
            Ok(size) => {
                debug!(index, ?size, "Ignoring unusable or duplicate dimensions");
                None
            }
            Err(e) => {
                debug!(index, error = %e, "Dimensions unavailable");
                None
            }
        };

        if let Some(ZoomEvent::ZoomChanged {
            zoomed,
            target_scale,
        }) = event
        {
            if index == self.index.current() {
                self.on_zoom_changed(index, zoomed, target_scale, None);
            }
        }
    }

    pub fn on_media_loaded(&mut self, index: usize) {
        let is_current = index == self.index.current();
        if let Some(slot) = self.slot_mut(index) {
            slot.renderer.on_loaded();
            slot.renderer.set_current(is_current);
        }
    }

    pub fn on_media_error(&mut self, index: usize, message: &str) {
        if let Some(slot) = self.slot_mut(index) {
            slot.renderer.on_error(message);
        }
    }

    /// Horizontal pager scroll sample.
    pub fn on_pager_scroll(&mut self, velocity_x: f64) {
        if self.close.is_closing() {
            return;
        }
        if let Some(IndexEvent::WillChange(next)) = self.index.on_scroll(velocity_x) {
            self.host.on_index_will_change(next);
        }
    }

    /// Horizontal pager momentum ended.
    pub fn on_pager_settle(&mut self, offset_x: f64) {
        if self.close.is_closing() {
            return;
        }
        let previous = self.index.current();
        if let Some(IndexEvent::Changed(new)) = self.index.on_settle(offset_x) {
            self.switch_page(previous, new);
        }
    }

    /// Live sample from an item's zoomable scroll view.
    pub fn on_item_scroll(&mut self, index: usize, sample: GestureSample) {
        if !self.accepts_item_input(index) {
            return;
        }
        let event = self.slot_mut(index).and_then(|slot| slot.zoom.on_scroll(sample));
        if let Some(event) = event {
            self.handle_zoom_event(index, event, sample.timestamp, None);
        }
    }

    /// End-of-drag sample from an item's zoomable scroll view.
    pub fn on_item_settle(&mut self, index: usize, sample: GestureSample) {
        if !self.accepts_item_input(index) {
            return;
        }
        let event = self.slot_mut(index).and_then(|slot| slot.zoom.on_settle(sample));
        if let Some(event) = event {
            self.handle_zoom_event(index, event, sample.timestamp, None);
        }
    }

    pub fn on_tap(&mut self, index: usize, timestamp: Duration, at: TapPoint) {
        if !self.accepts_item_input(index) {
            return;
        }
        let Some(kind) = self.items.get(index).map(|item| item.kind) else {
            return;
        };
        if !self.config.double_tap_enabled_for(kind) {
            return;
        }

        let event = self.slot_mut(index).and_then(|slot| {
            let intent = slot.taps.on_tap(timestamp, at)?;
            slot.zoom.toggle(intent)
        });
        if let Some(event) = event {
            self.handle_zoom_event(index, event, timestamp, Some(at));
        }
    }

    pub fn on_long_press(&mut self, index: usize) {
        if let Some(item) = self.items.get(index) {
            self.host.on_long_press(item);
        }
    }

    /// Close button, back gesture, or flick-to-dismiss.
    pub fn request_close(&mut self, now: Duration) {
        let request = self.close.request_close(now);
        if request == CloseRequest::Ignored {
            return;
        }
        info!(?request, "Closing viewer");
        let current = self.index.current();
        if let Some(slot) = self.slots.get_mut(&current) {
            slot.renderer.stop();
        }
        if request == CloseRequest::Fire {
            self.host.on_request_close();
        }
    }

    /// Advance animations. Fires the host close callback when the fade ends.
    pub fn tick(&mut self, now: Duration) {
        if self.close.tick(now) {
            self.host.on_request_close();
        }
    }

    /// Overlay opacity, fading while closing.
    pub fn opacity(&self, now: Duration) -> f64 {
        self.close.opacity(now)
    }

    fn set_current_index(&mut self, index: usize) {
        if self.items.is_empty() {
            warn!(index, "Seek on empty viewer ignored");
            return;
        }
        let previous = self.index.current();
        let seek = self.index.seek(index);
        self.apply_scroll(seek.scroll);
        if let Some(new) = seek.changed {
            self.switch_page(previous, new);
        }
    }

    fn accepts_item_input(&self, index: usize) -> bool {
        !self.close.is_closing() && index == self.index.current()
    }

    fn apply_scroll(&mut self, cmd: ScrollCommand) {
        self.pager.scroll_to_offset(cmd.offset, cmd.animated);
    }

    fn handle_zoom_event(
        &mut self,
        index: usize,
        event: ZoomEvent,
        now: Duration,
        at: Option<TapPoint>,
    ) {
        match event {
            ZoomEvent::ZoomChanged {
                zoomed,
                target_scale,
            } => self.on_zoom_changed(index, zoomed, target_scale, at),
            ZoomEvent::RequestClose => self.request_close(now),
        }
    }

    fn on_zoom_changed(
        &mut self,
        index: usize,
        zoomed: bool,
        target_scale: Option<f64>,
        at: Option<TapPoint>,
    ) {
        debug!(index, zoomed, "Zoom changed");
        self.sync_zoom_lock();
        if let Some(scale) = target_scale {
            self.host.on_zoom_to(index, scale, at.unwrap_or_default());
        }
    }

    /// Paging, chrome and the index lock all follow the current item's zoom.
    fn sync_zoom_lock(&mut self) {
        let current = self.index.current();
        let zoomed = self
            .slots
            .get(&current)
            .is_some_and(|slot| slot.zoom.is_zoomed());
        self.index.set_zoom_active(zoomed);
        self.pager.set_scroll_enabled(!zoomed);
        if self.config.hide_chrome_on_zoom {
            self.set_chrome_visible(!zoomed);
        }
    }

    fn set_chrome_visible(&mut self, visible: bool) {
        if self.chrome_visible != visible {
            self.chrome_visible = visible;
            self.host.on_chrome_visibility(visible);
        }
    }

    fn switch_page(&mut self, previous: usize, current: usize) {
        if let Some(slot) = self.slots.get_mut(&previous) {
            slot.taps.reset();
            slot.renderer.set_current(false);
            slot.stale = slot.zoom.is_zoomed();
        }

        if let Some(slot) = self.slot_mut(current) {
            if slot.stale {
                slot.zoom.reset();
                slot.stale = false;
            }
            slot.taps.reset();
            slot.renderer.set_current(true);
        }
        self.sync_zoom_lock();

        self.slots
            .retain(|i, _| i.abs_diff(current) <= SLOT_WINDOW);

        info!(from = previous, to = current, "Current page changed");
        self.host.on_current_index_change(current);
    }

    fn slot_mut(&mut self, index: usize) -> Option<&mut ItemSlot> {
        let item = self.items.get(index)?;
        let key = item.key;
        let kind = item.kind;
        let max_zoom = compute_transform(item.dimensions, self.viewport).max_zoom();
        let config = &self.config;

        let slot = self
            .slots
            .entry(index)
            .or_insert_with(|| ItemSlot::new(key, kind, max_zoom, config));
        if slot.key != key {
            *slot = ItemSlot::new(key, kind, max_zoom, config);
        }
        Some(slot)
    }
}

/// Host-facing imperative controller.
pub struct ViewerHandle<'a, P: PagerCommands, H: ViewerHost> {
    shell: &'a mut ViewerShell<P, H>,
}

impl<P: PagerCommands, H: ViewerHost> ViewerHandle<'_, P, H> {
    /// Jump to `index` (clamped). Scrolls the pager and notifies on change.
    pub fn set_current_index(&mut self, index: usize) {
        self.shell.set_current_index(index);
    }

    pub fn current_index(&self) -> usize {
        self.shell.current_index()
    }
}

/// Size of the page viewport for a host screen with optional chrome insets.
pub fn page_viewport(screen: Size, top_inset: f64, bottom_inset: f64) -> ViewportGeometry {
    Size::new(
        screen.width.max(0.0),
        (screen.height - top_inset - bottom_inset).max(0.0),
    )
}
