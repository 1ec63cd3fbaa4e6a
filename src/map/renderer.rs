use crate::braille::BrailleCanvas;
use crate::data::Locality;
use crate::map::geometry::{draw_circle, draw_line, draw_ring};
use crate::map::projection::Viewport;
use rayon::prelude::*;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Number of altitude colour bands on the map
pub const BAND_COUNT: usize = 4;

/// Splits the dataset's altitude range into equal-width bands
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AltitudeBands {
    min: f64,
    max: f64,
}

impl AltitudeBands {
    pub fn new(range: Option<(f64, f64)>) -> Self {
        let (min, max) = range.unwrap_or((0.0, 0.0));
        Self { min, max }
    }

    /// Band index in `0..BAND_COUNT`; out-of-range altitudes clamp to the ends
    pub fn band(&self, alt: f64) -> usize {
        let span = self.max - self.min;
        if span <= 0.0 || !alt.is_finite() {
            return 0;
        }
        let t = ((alt - self.min) / span).clamp(0.0, 1.0);
        ((t * BAND_COUNT as f64) as usize).min(BAND_COUNT - 1)
    }

    /// Lower and upper altitude of a band
    pub fn limits(&self, band: usize) -> (f64, f64) {
        let step = (self.max - self.min) / BAND_COUNT as f64;
        let lo = self.min + step * band as f64;
        (lo, lo + step)
    }
}

#[derive(Clone)]
pub struct DisplaySettings {
    pub show_outline: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { show_outline: true }
    }
}

/// Rendered canvases, drawn back to front
pub struct MapLayers {
    pub outline: BrailleCanvas,
    /// One canvas per altitude band, lowest first
    pub bands: Vec<BrailleCanvas>,
    pub highlight: BrailleCanvas,
}

/// Draws locality points (coloured by altitude) over optional outlines
pub struct MapRenderer {
    pub outline: Vec<LineString>,
    pub bands: AltitudeBands,
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new(bands: AltitudeBands) -> Self {
        Self {
            outline: Vec::new(),
            bands,
            settings: DisplaySettings::default(),
        }
    }

    pub fn set_outline(&mut self, lines: Vec<LineString>) {
        self.outline = lines;
    }

    pub fn toggle_outline(&mut self) {
        self.settings.show_outline = !self.settings.show_outline;
    }

    /// Render localities into a `width x height` character area
    pub fn render(
        &self,
        localities: &[Locality],
        hovered: Option<usize>,
        width: usize,
        height: usize,
        viewport: &Viewport,
    ) -> MapLayers {
        let mut outline = BrailleCanvas::new(width, height);
        let mut bands: Vec<BrailleCanvas> =
            (0..BAND_COUNT).map(|_| BrailleCanvas::new(width, height)).collect();
        let mut highlight = BrailleCanvas::new(width, height);

        if self.settings.show_outline {
            for line in &self.outline {
                draw_linestring(&mut outline, line, viewport);
            }
        }

        let radius = if viewport.zoom > 40.0 { 1 } else { 0 };
        let projected: Vec<(i32, i32, usize)> = localities
            .par_iter()
            .map(|l| {
                let (px, py) = viewport.project(l.lon, l.lat);
                (px, py, self.bands.band(l.alt))
            })
            .collect();

        for &(px, py, band) in &projected {
            if viewport.is_visible(px, py) {
                draw_circle(&mut bands[band], px, py, radius);
            }
        }

        if let Some(&(px, py, _)) = hovered.and_then(|idx| projected.get(idx)) {
            draw_ring(&mut highlight, px, py, radius + 3);
        }

        MapLayers {
            outline,
            bands,
            highlight,
        }
    }
}

/// Draw a linestring with viewport culling
fn draw_linestring(canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;

    for &(lon, lat) in line {
        let (px, py) = viewport.project(lon, lat);

        if let Some((prev_x, prev_y)) = prev {
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width * 4 && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }

        prev = Some((px, py));
    }
}
