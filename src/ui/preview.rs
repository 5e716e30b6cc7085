//! Current image panel and recent frames list.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_duration;
use crate::data::FrameRecord;
use crate::preview::display::format_token_time;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(6), // Current image
        Constraint::Min(3),    // Recent frames
    ])
    .split(area);

    render_current(frame, app, chunks[0]);
    render_frames(frame, app, chunks[1]);
}

fn render_current(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.view;
    let latest = view.recent_frames.first();
    let label = Style::default().add_modifier(Modifier::DIM);

    let image = match view.display.image_url {
        Some(ref url) => Span::raw(url.clone()),
        None => Span::styled("none yet", label),
    };

    let lines = vec![
        Line::from(vec![Span::styled(" Image:    ", label), image]),
        Line::from(vec![
            Span::styled(" Name:     ", label),
            Span::raw(
                latest
                    .and_then(|f| f.display_name.clone())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Loop:     ", label),
            Span::raw(
                latest
                    .and_then(|f| f.group_label.clone())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Revision: ", label),
            Span::raw(view.display.image_revision.to_string()),
            Span::styled("   Avg interval: ", label),
            Span::raw(
                view.average_frame_interval
                    .map(format_duration)
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]),
    ];

    let block = Block::default()
        .title(Span::styled(" Current ", app.theme.header))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_frames(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .view
        .recent_frames
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let item = ListItem::new(frame_line(record));
            if i == 0 {
                item.style(app.theme.selected)
            } else {
                item
            }
        })
        .collect();

    let block = Block::default()
        .title(Span::styled(" Recent frames ", app.theme.header))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if items.is_empty() {
        let paragraph = Paragraph::new(" No frames yet")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    frame.render_widget(List::new(items).block(block), area);
}

fn frame_line(record: &FrameRecord) -> Line<'static> {
    let name = record
        .display_name
        .clone()
        .unwrap_or_else(|| "latest".to_string());
    let mut spans = vec![
        Span::raw(format!(" {} ", format_token_time(record.change_token))),
        Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
    ];
    if let Some(ref group) = record.group_label {
        spans.push(Span::raw(format!("  loop: {}", group)));
    }
    spans.push(Span::styled(
        format!("  {} ago", format_duration(record.observed_at.elapsed())),
        Style::default().add_modifier(Modifier::DIM),
    ));
    Line::from(spans)
}
