use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::app::{App, Focus};
use super::dropdown::{self, DropdownKind, NO_MATCH, SEARCH_PLACEHOLDER};
use crate::directory::card::{self, CardState};
use crate::directory::PsychologistRecord;

const TITLE: &str = " Registrul psihologilor ";
const SEARCH_HINT: &str = "Introdu numele specialistului...";

fn focus_style(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    // Search Box
    let (search_text, search_style) = if app.filters.name.is_empty() && app.focus != Focus::Search {
        (SEARCH_HINT, Style::default().fg(Color::DarkGray))
    } else {
        (app.filters.name.as_str(), Style::default())
    };
    let search = Paragraph::new(search_text).style(search_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(TITLE)
            .border_style(focus_style(app, Focus::Search)),
    );
    f.render_widget(search, chunks[0]);

    render_filters(f, app, chunks[1]);
    render_results(f, app, chunks[2]);

    // Footer
    let footer = match app.error() {
        Some(err) => Paragraph::new(err).style(Style::default().fg(Color::Red)),
        None => {
            let state = if app.pager.is_loading() {
                "Se încarcă..."
            } else if app.pager.has_more() {
                "Derulează pentru mai multe"
            } else {
                "Toate rezultatele"
            };
            Paragraph::new(format!(
                " {} psihologi | {} | TAB: Navigare | ENTER: Deschide | 1-9 / ←→ SPAȚIU: Specializare | R: Reîncarcă | ESC: Ieșire ",
                app.records().len(),
                state
            ))
            .style(Style::default().fg(Color::DarkGray))
        }
    };
    f.render_widget(footer, chunks[3]);

    if let Some(ref open) = app.dropdown {
        render_dropdown(f, app, open);
    }
}

fn render_filters(f: &mut Frame, app: &App, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(35),
            Constraint::Percentage(30),
        ])
        .split(area);

    let specialties = Paragraph::new(dropdown::summary(&app.filters.specialties, DropdownKind::Specialties))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(DropdownKind::Specialties.title())
                .border_style(focus_style(app, Focus::Specialties)),
        );
    f.render_widget(specialties, cols[0]);

    let branches = Paragraph::new(dropdown::summary(&app.filters.branches, DropdownKind::Branches)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(DropdownKind::Branches.title())
            .border_style(focus_style(app, Focus::Branches)),
    );
    f.render_widget(branches, cols[1]);

    let checkbox = |label: &'static str, checked: bool, focus: Focus| {
        let mark = if checked { "[x]" } else { "[ ]" };
        Span::styled(format!("{} {}  ", mark, label), focus_style(app, focus))
    };
    let flags = Paragraph::new(Line::from(vec![
        checkbox("DGPC", app.filters.dgpc, Focus::Dgpc),
        checkbox("TSA", app.filters.tsa, Focus::Tsa),
        checkbox("Expert", app.filters.expert, Focus::Expert),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(flags, cols[2]);
}

fn render_results(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .records()
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let state = app.card_state(index);
            ListItem::new(card_text(record, state))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Rezultate ")
                .border_style(focus_style(app, Focus::Results)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if app.focus == Focus::Results && !app.records().is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn card_text<'a>(record: &'a PsychologistRecord, state: Option<&CardState>) -> Text<'a> {
    let expanded = state.is_some_and(|s| s.expanded);
    let marker = if expanded { "▾" } else { "▸" };

    let mut header = vec![
        Span::from(format!("{} ", marker)),
        Span::styled(
            format!("[{}] ", card::initials(&record.nume)),
            Style::default().fg(Color::White).bg(Color::Black),
        ),
        Span::styled(record.nume.as_str(), Style::default().add_modifier(Modifier::BOLD)),
    ];
    for badge in card::badges(record) {
        let color = match badge {
            card::DGPC_BADGE => Color::Blue,
            card::TSA_BADGE => Color::Magenta,
            _ => Color::LightMagenta,
        };
        header.push(Span::from(" "));
        header.push(Span::styled(format!(" {} ", badge), Style::default().fg(Color::White).bg(color)));
    }
    if !expanded {
        header.push(Span::styled(
            format!("  ({} specializări)", record.specialitati.len()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut lines = vec![Line::from(header)];
    if !expanded {
        return Text::from(lines);
    }

    if let Some(email) = card::first_email(record.email.as_deref()) {
        lines.push(Line::from(vec![
            Span::styled(format!("    {}: ", card::LABEL_CONTACT), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(email.to_string(), Style::default().fg(Color::Cyan)),
        ]));
    }
    lines.push(Line::from(format!("    {}: {}", card::LABEL_CODE, record.cod_personal)));
    lines.push(Line::from(Span::styled(
        format!("    {}", card::LABEL_SPECIALTIES),
        Style::default().add_modifier(Modifier::BOLD),
    )));

    for (i, entry) in record.specialitati.iter().enumerate() {
        let spec = &entry.specialty;
        let open = state.is_some_and(|s| s.is_open(i));
        let pointer = if state.is_some_and(|s| s.cursor() == i) { "›" } else { " " };
        let status_color = if spec.is_active() { Color::Green } else { Color::Red };
        lines.push(Line::from(vec![
            Span::from(format!("     {}{}. {} ", pointer, i + 1, spec.specialitate)),
            Span::styled(
                format!(" {} ", card::status_label(spec)),
                Style::default().fg(Color::White).bg(status_color),
            ),
            Span::from(if open { " ▾" } else { " ▸" }),
        ]));
        if open {
            for (label, value) in card::specialty_details(spec) {
                lines.push(Line::from(vec![
                    Span::styled(format!("          {}: ", label), Style::default().add_modifier(Modifier::BOLD)),
                    Span::from(value),
                ]));
            }
        }
    }

    Text::from(lines)
}

fn render_dropdown(f: &mut Frame, app: &App, open: &dropdown::Dropdown) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let (query, style) = if open.query.is_empty() {
        (SEARCH_PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else {
        (open.query.as_str(), Style::default())
    };
    f.render_widget(
        Paragraph::new(query)
            .style(style)
            .block(Block::default().borders(Borders::ALL).title(open.kind.title())),
        rows[0],
    );

    let (options, selected) = match open.kind {
        DropdownKind::Specialties => (&app.options.specialties, &app.filters.specialties),
        DropdownKind::Branches => (&app.options.branches, &app.filters.branches),
    };
    let visible = open.visible(options);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" ENTER: Selectează | ESC: Închide ");

    if visible.is_empty() {
        f.render_widget(
            Paragraph::new(NO_MATCH).style(Style::default().fg(Color::DarkGray)).block(block),
            rows[1],
        );
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .map(|option| {
            let mark = if selected.iter().any(|s| s.as_str() == *option) { "✓ " } else { "  " };
            ListItem::new(format!("{}{}", mark, option))
        })
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    state.select(Some(open.cursor));
    f.render_stateful_widget(list, rows[1], &mut state);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
