use crate::binder::{Catalog, DerivedViews, ViewBinder};
use crate::config::AppConfig;
use crate::data::Locality;
use crate::map::{AltitudeBands, MapRenderer, SpatialGrid, Viewport};
use crate::ui;
use ratatui::layout::Rect;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Hover grid cell size in degrees
const HOVER_CELL_DEG: f64 = 1.0;

/// Fallback extent (Brazil) when the dataset is empty
const DEFAULT_BOUNDS: (f64, f64, f64, f64) = (-73.99, -33.75, -28.84, 5.27);

/// Which pane receives keyboard input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Regions,
    States,
    Map,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Regions => Focus::States,
            Focus::States => Focus::Map,
            Focus::Map => Focus::Regions,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Regions => Focus::Map,
            Focus::States => Focus::Regions,
            Focus::Map => Focus::States,
        }
    }
}

/// Multi-select list standing in for a dropdown
#[derive(Clone, Debug)]
pub struct Picker {
    pub title: &'static str,
    pub options: Vec<String>,
    pub selected: BTreeSet<String>,
    pub cursor: usize,
}

impl Picker {
    pub fn new(title: &'static str, options: Vec<String>) -> Self {
        Self {
            title,
            options,
            selected: BTreeSet::new(),
            cursor: 0,
        }
    }

    /// Replace the option list, keeping the cursor on the same option when
    /// it survives
    pub fn set_options(&mut self, options: Vec<String>) {
        let current = self.options.get(self.cursor).cloned();
        self.options = options;
        self.cursor = current
            .and_then(|c| self.options.iter().position(|o| *o == c))
            .unwrap_or(0);
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.options.len() {
            self.cursor += 1;
        }
    }

    /// Toggle the option under the cursor; false when the list is empty
    pub fn toggle_current(&mut self) -> bool {
        let Some(option) = self.options.get(self.cursor) else {
            return false;
        };
        if !self.selected.remove(option) {
            self.selected.insert(option.clone());
        }
        true
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    pub fn is_checked(&self, option: &str) -> bool {
        self.selected.contains(option)
    }

    /// Short description of the selection for pane titles
    pub fn summary(&self) -> String {
        match self.selected.len() {
            0 => "all".to_string(),
            1 => self.selected.iter().next().cloned().unwrap_or_default(),
            n => format!("{} selected", n),
        }
    }
}

/// Application state
pub struct App {
    pub title: String,
    binder: ViewBinder,
    pub views: DerivedViews,
    pub regions: Picker,
    pub states: Picker,
    pub focus: Focus,
    pub viewport: Viewport,
    home: Viewport,
    pub map_renderer: MapRenderer,
    /// Terminal area inside the map border
    pub map_area: Rect,
    hover_grid: SpatialGrid,
    hover_radius_deg: f64,
    /// Index into `views.localities`
    pub hovered: Option<usize>,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
}

impl App {
    pub fn new(catalog: Arc<Catalog>, config: &AppConfig, width: u16, height: u16) -> Self {
        let bands = AltitudeBands::new(catalog.dataset.altitude_range());
        let bounds = catalog.dataset.bounds().unwrap_or(DEFAULT_BOUNDS);
        let region_options = catalog.index.regions().map(String::from).collect();

        let binder = ViewBinder::new(catalog, config.view.stale_states);
        let views = binder.views();
        let states = Picker::new("States", views.state_options.clone());

        let map_area = ui::map_inner(Rect::new(0, 0, width, height));
        let home = Viewport::fit(
            bounds,
            map_area.width as usize * 2,
            map_area.height as usize * 4,
        );

        let mut app = Self {
            title: config.view.title.clone(),
            binder,
            views,
            regions: Picker::new("Regions", region_options),
            states,
            focus: Focus::Regions,
            viewport: home.clone(),
            home,
            map_renderer: MapRenderer::new(bands),
            map_area,
            hover_grid: SpatialGrid::new(HOVER_CELL_DEG),
            hover_radius_deg: config.view.hover_radius_deg,
            hovered: None,
            should_quit: false,
            last_mouse: None,
        };
        app.rebuild_hover_grid();
        app
    }

    /// Recompute the map area when the terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.map_area = ui::map_inner(Rect::new(0, 0, width, height));
        let (w, h) = (self.map_area.width as usize * 2, self.map_area.height as usize * 4);
        self.viewport.width = w;
        self.viewport.height = h;
        self.home.width = w;
        self.home.height = h;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn move_up(&mut self) {
        match self.focus {
            Focus::Regions => self.regions.move_up(),
            Focus::States => self.states.move_up(),
            Focus::Map => self.pan(0, -6),
        }
    }

    pub fn move_down(&mut self) {
        match self.focus {
            Focus::Regions => self.regions.move_down(),
            Focus::States => self.states.move_down(),
            Focus::Map => self.pan(0, 6),
        }
    }

    /// Toggle the option under the cursor of the focused picker
    pub fn toggle(&mut self) {
        match self.focus {
            Focus::Regions => {
                if self.regions.toggle_current() {
                    self.apply_regions();
                }
            }
            Focus::States => {
                if self.states.toggle_current() {
                    self.apply_states();
                }
            }
            Focus::Map => {}
        }
    }

    /// Clear the focused picker back to "all"
    pub fn clear_focused(&mut self) {
        match self.focus {
            Focus::Regions => {
                if self.regions.clear() {
                    self.apply_regions();
                }
            }
            Focus::States => {
                if self.states.clear() {
                    self.apply_states();
                }
            }
            Focus::Map => {}
        }
    }

    fn apply_regions(&mut self) {
        let views = self
            .binder
            .region_selection_changed(self.regions.selected.iter().cloned());
        self.states.set_options(views.state_options.clone());
        self.states.selected = self.binder.selection().states.clone();
        self.set_views(views);
    }

    fn apply_states(&mut self) {
        let views = self
            .binder
            .state_selection_changed(self.states.selected.iter().cloned());
        self.set_views(views);
    }

    fn set_views(&mut self, views: DerivedViews) {
        self.views = views;
        self.rebuild_hover_grid();
    }

    fn rebuild_hover_grid(&mut self) {
        self.hover_grid = SpatialGrid::build(
            self.views.localities.iter().map(|l| (l.lon, l.lat)),
            HOVER_CELL_DEG,
        );
        self.hovered = None;
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn reset_view(&mut self) {
        self.viewport = self.home.clone();
    }

    /// Terminal cell to braille pixel inside the map, if the cell is on it
    fn map_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let area = self.map_area;
        if col < area.x || row < area.y || col >= area.x + area.width || row >= area.y + area.height {
            return None;
        }
        Some((((col - area.x) as i32) * 2, ((row - area.y) as i32) * 4))
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_in_at(px, py);
        }
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_out_at(px, py);
        }
    }

    pub fn start_drag(&mut self, col: u16, row: u16) {
        if self.map_pixel(col, row).is_some() {
            self.last_mouse = Some((col, row));
        }
    }

    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = (last_x as i32 - col as i32) * 2;
            let dy = (last_y as i32 - row as i32) * 4;
            self.pan(dx, dy);
            self.last_mouse = Some((col, row));
        }
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    /// Track the hovered locality under a terminal cell.
    ///
    /// The search radius never drops below half the diagonal of the cell's
    /// 2x4 dots grown by one pixel, so every dot drawn in the cell is in reach
    /// at any zoom.
    pub fn hover(&mut self, col: u16, row: u16) {
        self.hovered = self.map_pixel(col, row).and_then(|(px, py)| {
            // Centre of the character cell
            let (lon, lat) = self.viewport.unproject(px + 1, py + 2);
            let radius = self
                .cell_radius(px, py)
                .max(self.hover_radius_deg * self.home.zoom / self.viewport.zoom);
            self.hover_grid.nearest(lon, lat, radius)
        });
    }

    /// Half the diagonal, in degrees, of the cell whose top-left pixel is `(px, py)`
    fn cell_radius(&self, px: i32, py: i32) -> f64 {
        let (lon0, lat0) = self.viewport.unproject(px - 1, py - 1);
        let (lon1, lat1) = self.viewport.unproject(px + 3, py + 5);
        (lon1 - lon0).hypot(lat1 - lat0) / 2.0
    }

    pub fn hovered_locality(&self) -> Option<&Locality> {
        self.hovered.and_then(|idx| self.views.localities.get(idx))
    }

    pub fn total_localities(&self) -> usize {
        self.binder.catalog().dataset.len()
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom / self.home.zoom.max(f64::EPSILON))
    }
}
