// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use showroom_app::{
    AttributeDescriptor, AttributeKind, FetchError, PopupDetails, PopupStore, SelectionLog,
    Vehicle, VehicleStore, compute_attribute_options, fetch_notification, matching_vehicles,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use time::OffsetDateTime;

/// First dropdown row; choosing it clears the attribute's selection.
pub const CLEAR_CHOICE: &str = "(none)";

#[derive(Debug, PartialEq)]
pub enum InternalEvent {
    FetchCompleted {
        request_id: u64,
        result: Result<Vec<Vehicle>, FetchError>,
    },
}

pub trait AppRuntime {
    fn fetch_vehicles(&mut self) -> Result<Vec<Vehicle>, FetchError>;

    /// Dispatches one fetch and delivers the outcome through the event
    /// channel. The default implementation runs inline; runtimes that own a
    /// cloneable source override this to run on a thread so the UI keeps
    /// drawing while the catalog responds.
    fn spawn_fetch(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self.fetch_vehicles();
        tx.send(InternalEvent::FetchCompleted { request_id, result })
            .map_err(|_| anyhow::anyhow!("fetch event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DropdownUiState {
    attribute: AttributeKind,
    options: Vec<String>,
    cursor: usize,
}

#[derive(Debug, Default)]
struct ViewData {
    store: VehicleStore,
    popups: PopupStore,
    selections: SelectionLog,
    focus: usize,
    dropdown: Option<DropdownUiState>,
    in_flight: Option<u64>,
    next_request_id: u64,
}

pub fn run_app<R: AppRuntime>(runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    start_fetch(&mut view_data, runtime, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(&mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(&mut view_data, runtime, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(view_data: &mut ViewData, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::FetchCompleted { request_id, result } => {
                apply_fetch_completion(view_data, request_id, result, OffsetDateTime::now_utc());
            }
        }
    }
}

/// Records a fetch outcome in the store and raises its notification, if
/// any. Completions always land in the store (last write wins); the
/// request id only decides whether this completion owns the spinner.
fn apply_fetch_completion(
    view_data: &mut ViewData,
    request_id: u64,
    result: Result<Vec<Vehicle>, FetchError>,
    now: OffsetDateTime,
) {
    let events = view_data.store.complete_fetch(result, now);
    for event in &events {
        if let Some(details) = fetch_notification(event) {
            view_data.popups.show(details);
        }
    }
    if view_data.in_flight == Some(request_id) {
        view_data.in_flight = None;
    }
    // The option lists under an open dropdown may have changed.
    view_data.dropdown = None;
}

fn start_fetch<R: AppRuntime>(
    view_data: &mut ViewData,
    runtime: &mut R,
    internal_tx: &Sender<InternalEvent>,
) {
    view_data.next_request_id += 1;
    let request_id = view_data.next_request_id;
    view_data.in_flight = Some(request_id);
    view_data.store.begin_fetch();

    if let Err(error) = runtime.spawn_fetch(request_id, internal_tx.clone()) {
        apply_fetch_completion(
            view_data,
            request_id,
            Err(FetchError::request(format!("start fetch -- {error}"))),
            OffsetDateTime::now_utc(),
        );
    }
}

/// Returns true when the app should quit.
fn handle_key_event<R: AppRuntime>(
    view_data: &mut ViewData,
    runtime: &mut R,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if let Some(popup) = view_data.popups.newest() {
        let id = popup.id;
        let dismissible = popup.details.dismissible();
        match key.code {
            KeyCode::Enter => view_data.popups.dismiss(id),
            KeyCode::Esc if dismissible => view_data.popups.dismiss(id),
            _ => {}
        }
        return false;
    }

    if view_data.dropdown.is_some() {
        handle_dropdown_key(view_data, key);
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('r') => start_fetch(view_data, runtime, internal_tx),
        KeyCode::Char('c') => {
            let attribute = focused_attribute(view_data);
            view_data.selections.apply(attribute, "");
        }
        KeyCode::Tab | KeyCode::Right => {
            view_data.focus = (view_data.focus + 1) % AttributeKind::ALL.len();
        }
        KeyCode::BackTab | KeyCode::Left => {
            let len = AttributeKind::ALL.len();
            view_data.focus = (view_data.focus + len - 1) % len;
        }
        KeyCode::Enter => open_dropdown(view_data),
        _ => {}
    }
    false
}

fn handle_dropdown_key(view_data: &mut ViewData, key: KeyEvent) {
    let Some(dropdown) = view_data.dropdown.as_mut() else {
        return;
    };

    match key.code {
        KeyCode::Esc => view_data.dropdown = None,
        KeyCode::Up => dropdown.cursor = dropdown.cursor.saturating_sub(1),
        KeyCode::Down => {
            let last = dropdown.options.len().saturating_sub(1);
            dropdown.cursor = (dropdown.cursor + 1).min(last);
        }
        KeyCode::Enter => {
            let attribute = dropdown.attribute;
            let chosen = dropdown
                .options
                .get(dropdown.cursor)
                .cloned()
                .unwrap_or_default();
            view_data.dropdown = None;

            let value = if chosen == CLEAR_CHOICE {
                String::new()
            } else {
                chosen
            };
            view_data.selections.apply(attribute, &value);
        }
        _ => {}
    }
}

fn focused_attribute(view_data: &ViewData) -> AttributeKind {
    AttributeKind::ALL[view_data.focus % AttributeKind::ALL.len()]
}

fn current_descriptors(view_data: &ViewData) -> Vec<AttributeDescriptor> {
    compute_attribute_options(view_data.store.vehicles(), view_data.selections.entries())
}

fn open_dropdown(view_data: &mut ViewData) {
    let descriptors = current_descriptors(view_data);
    let descriptor = &descriptors[view_data.focus % descriptors.len()];

    let options = dropdown_options(descriptor);
    let cursor = descriptor
        .selected_value
        .as_deref()
        .and_then(|selected| options.iter().position(|option| option == selected))
        .unwrap_or(0);

    view_data.dropdown = Some(DropdownUiState {
        attribute: descriptor.attribute,
        options,
        cursor,
    });
}

fn dropdown_options(descriptor: &AttributeDescriptor) -> Vec<String> {
    let mut options = Vec::with_capacity(descriptor.available_values.len() + 1);
    options.push(CLEAR_CHOICE.to_owned());
    options.extend(descriptor.available_values.iter().cloned());
    options
}

fn render(frame: &mut ratatui::Frame<'_>, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(10),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new("pick a vehicle by type, brand, and color")
        .style(Style::default().fg(Color::White))
        .block(Block::default().title("showroom").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    let descriptors = current_descriptors(view_data);
    render_select_boxes(frame, layout[1], view_data, &descriptors);
    render_summary(frame, layout[2], &descriptors);
    render_matching(frame, layout[3], view_data);

    let status = Paragraph::new(status_text(view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[4]);

    if let Some(dropdown) = &view_data.dropdown {
        let area = centered_rect(40, 60, frame.area());
        frame.render_widget(Clear, area);
        let list = Paragraph::new(dropdown_overlay_text(dropdown)).block(
            Block::default()
                .title(dropdown.attribute.label())
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(list, area);
    }

    if let Some(popup) = view_data.popups.newest() {
        let area = centered_rect(60, 45, frame.area());
        frame.render_widget(Clear, area);
        let body = Paragraph::new(popup_overlay_text(&popup.details)).block(
            Block::default()
                .title(popup.details.title().to_owned())
                .borders(Borders::ALL)
                .style(Style::default().fg(popup_color(&popup.details))),
        );
        frame.render_widget(body, area);
    }

    if view_data.store.loading() && view_data.popups.is_empty() {
        let area = centered_rect(30, 12, frame.area());
        frame.render_widget(Clear, area);
        let loading = Paragraph::new("fetching vehicles...")
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Cyan));
        frame.render_widget(loading, area);
    }
}

fn render_select_boxes(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    view_data: &ViewData,
    descriptors: &[AttributeDescriptor],
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    for (index, descriptor) in descriptors.iter().enumerate() {
        let focused = index == view_data.focus;
        let border_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let body = Paragraph::new(select_box_text(descriptor)).block(
            Block::default()
                .title(select_box_title(descriptor))
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        frame.render_widget(body, columns[index]);
    }
}

fn render_summary(frame: &mut ratatui::Frame<'_>, area: Rect, descriptors: &[AttributeDescriptor]) {
    let rows = descriptors
        .iter()
        .map(|descriptor| {
            Row::new(vec![
                Cell::from(descriptor.label).style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(descriptor.selected_value.clone().unwrap_or_default()),
            ])
        })
        .collect::<Vec<_>>();

    let table = Table::new(rows, [Constraint::Length(12), Constraint::Min(1)])
        .block(Block::default().title("selection").borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_matching(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let matched = matching_vehicles(view_data.store.vehicles(), view_data.selections.entries());
    let rows = matched
        .iter()
        .map(|vehicle| {
            Row::new(vec![
                Cell::from(vehicle.id.to_string()),
                Cell::from(vehicle.kind.clone()),
                Cell::from(vehicle.brand.clone()),
                Cell::from(vehicle.colors.join(", ")),
                Cell::from(vehicle.image_url.clone()),
            ])
        })
        .collect::<Vec<_>>();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(10),
            Constraint::Length(24),
            Constraint::Length(28),
            Constraint::Min(1),
        ],
    )
    .header(
        Row::new(vec!["id", "type", "brand", "colors", "image"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .title(format!("matching vehicles ({})", matched.len()))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}

fn select_box_title(descriptor: &AttributeDescriptor) -> String {
    format!(
        "{} ({})",
        descriptor.label,
        descriptor.available_values.len()
    )
}

fn select_box_text(descriptor: &AttributeDescriptor) -> String {
    descriptor
        .available_values
        .iter()
        .map(|value| {
            if descriptor.selected_value.as_deref() == Some(value) {
                format!("▸ {value}")
            } else {
                format!("  {value}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn dropdown_overlay_text(dropdown: &DropdownUiState) -> String {
    dropdown
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            if index == dropdown.cursor {
                format!("▸ {option}")
            } else {
                format!("  {option}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn popup_overlay_text(details: &PopupDetails) -> String {
    let mut lines = Vec::new();
    match details {
        PopupDetails::ApiError { error, .. } => {
            lines.push(error.to_string());
            for violation in error.violations() {
                lines.push(format!("  {violation}"));
            }
        }
        PopupDetails::Info { description, .. } => {
            lines.push(description.clone());
        }
    }
    lines.push(String::new());
    lines.push(format!("[enter] {}", details.confirm_label()));
    lines.join("\n")
}

fn popup_color(details: &PopupDetails) -> Color {
    match details {
        PopupDetails::ApiError { .. } => Color::Red,
        PopupDetails::Info {
            variant: showroom_app::InfoVariant::Warning,
            ..
        } => Color::Yellow,
        PopupDetails::Info { .. } => Color::Green,
    }
}

fn status_text(view_data: &ViewData) -> String {
    if view_data.store.loading() {
        return "fetching vehicles...".to_owned();
    }

    let mut parts = vec![format!("{} vehicles", view_data.store.vehicles().len())];
    if let Some(loaded_at) = view_data.store.last_loaded_at() {
        parts.push(format!("loaded {}", format_clock(loaded_at)));
    }
    if let Some(error) = view_data.store.error() {
        parts.push(format!("last fetch failed: {error}"));
    }
    parts.push("tab focus / enter choose / c clear / r refetch / q quit".to_owned());
    parts.join("  |  ")
}

fn format_clock(at: OffsetDateTime) -> String {
    at.format(&time::macros::format_description!(
        "[hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|_| at.to_string())
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
