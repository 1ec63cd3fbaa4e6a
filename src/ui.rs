use crate::app::{App, Focus, Picker};
use crate::braille::BrailleCanvas;
use crate::map::{MapLayers, BAND_COUNT};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, List, ListItem, ListState, Paragraph, Widget},
    Frame,
};

/// Altitude band colours, lowest band first
const BAND_COLORS: [Color; BAND_COUNT] = [Color::Blue, Color::Magenta, Color::LightRed, Color::Yellow];

/// Attribution shown next to the title
const SOURCE_NOTE: &str = "Fonte: IBGE, Censo Demográfico 2010 (localidades indígenas)";

/// Screen areas of the dashboard panes
pub struct DashboardLayout {
    pub header: Rect,
    pub regions: Rect,
    pub states: Rect,
    pub map: Rect,
    pub bars: Rect,
    pub status: Rect,
}

pub fn dashboard_layout(area: Rect) -> DashboardLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(5),    // Body
            Constraint::Length(2), // Status bar
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(20)])
        .split(rows[1]);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(35), Constraint::Min(3)])
        .split(columns[0]);

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(65), Constraint::Min(6)])
        .split(columns[1]);

    DashboardLayout {
        header: rows[0],
        regions: sidebar[0],
        states: sidebar[1],
        map: charts[0],
        bars: charts[1],
        status: rows[2],
    }
}

/// Area inside the map border for a given terminal area
pub fn map_inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(dashboard_layout(area).map)
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let layout = dashboard_layout(frame.area());

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {}", app.title),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", SOURCE_NOTE), Style::default().fg(Color::DarkGray)),
        ])),
        layout.header,
    );

    render_picker(frame, &app.regions, app.focus == Focus::Regions, layout.regions);
    render_picker(frame, &app.states, app.focus == Focus::States, layout.states);
    render_map(frame, app, layout.map);
    render_bars(frame, app, layout.bars);
    render_status_bar(frame, app, layout.status);
}

fn render_picker(frame: &mut Frame, picker: &Picker, focused: bool, area: Rect) {
    let block = pane_block(format!(" {}: {} ", picker.title, picker.summary()), focused);

    let items: Vec<ListItem> = picker
        .options
        .iter()
        .map(|option| {
            let checked = picker.is_checked(option);
            let mark = if checked { "[x] " } else { "[ ] " };
            let style = if checked {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Gray)
            };
            ListItem::new(Line::from(vec![Span::styled(mark, style), Span::styled(option.clone(), style)]))
        })
        .collect();

    let highlight = if focused {
        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let list = List::new(items).block(block).highlight_style(highlight);

    let mut state = ListState::default().with_selected(Some(picker.cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(
        " Mapa: {} / {} aldeias ",
        app.views.localities.len(),
        app.total_localities()
    );
    let block = pane_block(title, app.focus == Focus::Map);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut viewport = app.viewport.clone();
    // Braille gives 2x4 resolution per character
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layers = app.map_renderer.render(
        &app.views.localities,
        app.hovered,
        inner.width as usize,
        inner.height as usize,
        &viewport,
    );
    frame.render_widget(MapWidget { layers }, inner);
}

/// Braille map layers drawn back to front
struct MapWidget {
    layers: MapLayers,
}

impl MapWidget {
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (col, row, ch) in canvas.dots() {
            if col >= area.width as usize || row >= area.height as usize {
                continue;
            }
            let x = area.x + col as u16;
            let y = area.y + row as u16;
            buf[(x, y)].set_char(ch).set_fg(color);
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Self::render_layer(&self.layers.outline, Color::DarkGray, area, buf);
        for (canvas, color) in self.layers.bands.iter().zip(BAND_COLORS) {
            Self::render_layer(canvas, color, area, buf);
        }
        Self::render_layer(&self.layers.highlight, Color::White, area, buf);
    }
}

fn render_bars(frame: &mut Frame, app: &App, area: Rect) {
    let block = pane_block(" Aldeias por estado ".to_string(), false);
    let counts = &app.views.counts;

    if counts.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "Nenhuma aldeia para a seleção atual",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let bars: Vec<Bar> = counts
        .iter()
        .map(|c| {
            Bar::default()
                .value(c.count)
                .label(Line::from(c.state.clone()))
                .text_value(c.count.to_string())
                .style(Style::default().fg(Color::Cyan))
                .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        })
        .collect();

    let inner_width = area.width.saturating_sub(2);
    let n = counts.len() as u16;
    let bar_width = (inner_width.saturating_sub(n.saturating_sub(1)) / n.max(1)).clamp(1, 8);

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1);
    frame.render_widget(chart, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);

    let info = match app.hovered_locality() {
        Some(l) => Line::from(vec![
            Span::styled(" Nome: ", dim),
            Span::styled(l.name.clone(), Style::default().fg(Color::White)),
            Span::styled(" | Estado: ", dim),
            Span::styled(l.state_name.clone(), Style::default().fg(Color::Cyan)),
            Span::styled(" | Região: ", dim),
            Span::styled(l.region.clone(), Style::default().fg(Color::Cyan)),
            Span::styled(" | Altitude: ", dim),
            Span::styled(format!("{:.1} m", l.alt), Style::default().fg(Color::Yellow)),
            Span::styled(format!(" | {:.4}, {:.4}", l.lat, l.lon), dim),
        ]),
        None => Line::from(vec![
            Span::styled(" Zoom: ", dim),
            Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
            Span::styled(
                " | Tab:focus ↑↓:move Space:toggle c:clear hjkl:pan +/-:zoom o:outline r:reset q:quit",
                dim,
            ),
        ]),
    };

    let bands = app.map_renderer.bands;
    let mut legend = vec![Span::styled(" Altitude: ", dim)];
    for (band, color) in BAND_COLORS.iter().enumerate() {
        let (lo, hi) = bands.limits(band);
        legend.push(Span::styled("⣿ ", Style::default().fg(*color)));
        legend.push(Span::styled(format!("{:.0}–{:.0} m  ", lo, hi), dim));
    }

    frame.render_widget(Paragraph::new(vec![info, Line::from(legend)]), area);
}
