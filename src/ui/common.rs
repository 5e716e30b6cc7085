//! Common UI components.
//!
//! This module contains the header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_duration;

/// Render the header bar.
///
/// Displays: state indicator, project, poll period, source.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.view;
    let state_style = app.theme.state_style(view.state);

    let project = match view.target_id {
        Some(ref id) => Span::styled(id.clone(), Style::default().add_modifier(Modifier::BOLD)),
        None => Span::styled("no project", Style::default().add_modifier(Modifier::DIM)),
    };

    let subdirs = if view.include_subdirectories {
        "subdirs"
    } else {
        "top level"
    };

    let line = Line::from(vec![
        Span::styled(" ● ", state_style),
        Span::styled("NEBULA LIVE ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        project,
        Span::raw(" │ "),
        Span::styled(view.state.label(), state_style),
        Span::raw(format!(
            " every {} │ {} │ {}",
            format_duration(view.refresh_interval),
            subdirs,
            app.source_description()
        )),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows the preview status text, the pause control and key hints.
/// Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let view = &app.view;
    let line = Line::from(vec![
        Span::raw(format!(" {} ", view.display.status_text)),
        Span::styled(
            format!("| p:{} o:open ?:help q:quit", view.pause_label),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the preview.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from("  p / Space   Pause or resume polling"),
        Line::from("  o / Enter   Open latest image"),
        Line::from("  ?           Toggle this help"),
        Line::from("  q / Esc     Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 10u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
