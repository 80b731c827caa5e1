//! Rendering routines for the chat screen

use super::ChatScreen;
use crate::chat::Sender;
use crate::state_machine::Status;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use ratatui::Frame;

const KEY_HINTS: &str = "Enter send · Esc stop · Ctrl-T theme · Ctrl-P persona · /attach <path> · Ctrl-C quit";

/// Colors for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub user: Color,
    pub assistant: Color,
    pub accent: Color,
}

impl Palette {
    pub const DARK: Palette = Palette {
        background: Color::Rgb(24, 24, 27),
        text: Color::Rgb(238, 238, 238),
        muted: Color::Rgb(128, 128, 128),
        border: Color::Rgb(60, 60, 60),
        user: Color::Rgb(96, 165, 250),
        assistant: Color::Rgb(192, 132, 252),
        accent: Color::Rgb(229, 192, 123),
    };

    pub const LIGHT: Palette = Palette {
        background: Color::Rgb(250, 250, 250),
        text: Color::Rgb(24, 24, 27),
        muted: Color::Rgb(113, 113, 122),
        border: Color::Rgb(212, 212, 216),
        user: Color::Rgb(37, 99, 235),
        assistant: Color::Rgb(126, 34, 206),
        accent: Color::Rgb(180, 83, 9),
    };

    pub fn for_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self::DARK
        } else {
            Self::LIGHT
        }
    }
}

/// Draw the entire chat frame.
pub fn draw(frame: &mut Frame<'_>, screen: &mut ChatScreen) {
    let palette = Palette::for_mode(screen.view.dark_mode);
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
        area,
    );

    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(0),    // chat
            Constraint::Length(3), // input
            Constraint::Length(1), // status bar
        ])
        .split(area);

    draw_header(frame, screen, palette, root[0]);
    draw_chat(frame, screen, palette, root[1]);
    draw_input(frame, screen, palette, root[2]);
    draw_status_bar(frame, screen, palette, root[3]);
}

fn draw_header(frame: &mut Frame<'_>, screen: &ChatScreen, palette: Palette, area: Rect) {
    let status = match screen.view.status {
        Status::Idle => "ready",
        Status::Sending => "thinking…",
        Status::Revealing => "typing…",
    };
    let line = Line::from(vec![
        Span::styled(
            " Muse ",
            Style::default().fg(palette.assistant).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("· {} ", screen.view.persona.label()),
            Style::default().fg(palette.text),
        ),
        Span::styled(format!("· {status}"), Style::default().fg(palette.muted)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_chat(frame: &mut Frame<'_>, screen: &mut ChatScreen, palette: Palette, area: Rect) {
    let lines = render_lines(screen, palette);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.border));
    let inner = block.inner(area);

    let total_lines = Paragraph::new(lines.clone())
        .wrap(Wrap { trim: false })
        .line_count(inner.width)
        .max(1);
    let max_scroll = u16::try_from(total_lines.saturating_sub(usize::from(inner.height)))
        .unwrap_or(u16::MAX);
    screen.update_scroll_bounds(max_scroll);

    let chat = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((screen.scroll, 0));
    frame.render_widget(chat, area);
}

/// Transcript lines: committed history plus the in-progress reply
pub(crate) fn render_lines(screen: &ChatScreen, palette: Palette) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if screen.view.history.is_empty() && !screen.view.is_busy() {
        lines.push(Line::from(Span::styled(
            "Say hello to Muse.",
            Style::default().fg(palette.muted),
        )));
    }

    for message in &screen.view.history {
        push_message(&mut lines, message.sender, &message.text, palette);
    }

    match screen.view.status {
        Status::Sending => {
            push_label(&mut lines, Sender::Assistant, palette);
            lines.push(Line::from(Span::styled(
                "…",
                Style::default().fg(palette.muted),
            )));
        }
        Status::Revealing => {
            let revealed = screen.view.revealed.as_deref().unwrap_or_default();
            push_message(&mut lines, Sender::Assistant, &format!("{revealed}▌"), palette);
        }
        Status::Idle => {}
    }

    lines
}

fn push_label(lines: &mut Vec<Line<'static>>, sender: Sender, palette: Palette) {
    let color = match sender {
        Sender::User => palette.user,
        Sender::Assistant => palette.assistant,
    };
    if !lines.is_empty() {
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled(
        sender.label(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));
}

fn push_message(lines: &mut Vec<Line<'static>>, sender: Sender, text: &str, palette: Palette) {
    push_label(lines, sender, palette);
    for line in text.lines() {
        lines.push(Line::from(Span::styled(
            line.to_string(),
            Style::default().fg(palette.text),
        )));
    }
}

fn draw_input(frame: &mut Frame<'_>, screen: &ChatScreen, palette: Palette, area: Rect) {
    let title = match &screen.view.attachment {
        Some(attachment) => format!(" Message · 📎 {} ({}) ", attachment.file_name, attachment.media_type),
        None => " Message ".to_string(),
    };
    let border = if screen.view.is_busy() {
        palette.border
    } else {
        palette.accent
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(Span::styled(title, Style::default().fg(palette.muted)));
    let inner = block.inner(area);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("› ", Style::default().fg(palette.accent)),
        Span::styled(screen.input.clone(), Style::default().fg(palette.text)),
    ]))
    .block(block);
    frame.render_widget(input, area);

    let typed = u16::try_from(screen.input.chars().count()).unwrap_or(u16::MAX);
    let x = inner
        .x
        .saturating_add(2)
        .saturating_add(typed)
        .min(inner.right().saturating_sub(1));
    frame.set_cursor_position((x, inner.y));
}

fn draw_status_bar(frame: &mut Frame<'_>, screen: &ChatScreen, palette: Palette, area: Rect) {
    let line = match &screen.notice {
        Some(notice) => Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(palette.accent),
        )),
        None => Line::from(Span::styled(
            format!(" {KEY_HINTS}"),
            Style::default().fg(palette.muted),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}
