use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::App;

const PLACEHOLDER: &str = "Ask me anything about code... (Enter to send)";

/// Style `**bold**` and `` `code` `` spans in one line of an answer. Unclosed markers stay
/// literal.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let code = Style::default().fg(Color::Green);

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    loop {
        let (start, marker, style) = match (rest.find("**"), rest.find('`')) {
            (Some(b), Some(c)) if c < b => (c, "`", code),
            (Some(b), _) => (b, "**", bold),
            (None, Some(c)) => (c, "`", code),
            (None, None) => break,
        };

        let after = &rest[start + marker.len()..];
        match after.find(marker) {
            Some(end) if end > 0 => {
                if start > 0 {
                    spans.push(Span::raw(rest[..start].to_string()));
                }
                spans.push(Span::styled(after[..end].to_string(), style));
                rest = &after[end + marker.len()..];
            }
            _ => {
                spans.push(Span::raw(rest[..start + marker.len()].to_string()));
                rest = after;
            }
        }
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, conversation, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" AI Code Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.model.clone(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    for index in 0..app.messages.len() {
        if app.is_user(index) {
            lines.push(Line::from(Span::styled(
                "You:",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            for line in app.displayed_content(index).lines() {
                lines.push(Line::from(line.to_string()));
            }
        } else {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            for line in app.displayed_content(index).lines() {
                lines.push(parse_markdown_line(line));
            }
        }
        lines.push(Line::default());
    }

    if app.assistant_typing {
        lines.push(Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("AI is thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    // Measure with the same wrapping the frame uses, inside the borders
    let chat = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });
    let inner_width = area.width.saturating_sub(2);
    app.chat_height = area.height.saturating_sub(2);
    app.content_lines = u16::try_from(chat.line_count(inner_width)).unwrap_or(u16::MAX);
    app.sync_scroll();

    let chat = chat.block(chat_block).scroll((app.scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let (border_color, title) = if app.assistant_typing {
        (Color::DarkGray, " Waiting for answer... ")
    } else {
        (Color::Yellow, " Ask ")
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    if app.input.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ))
        .block(input_block);
        frame.render_widget(placeholder, area);
        frame.set_cursor_position((area.x + 1, area.y + 1));
        return;
    }

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled(" Enter ", Style::default().fg(Color::Black).bg(Color::Yellow)),
        Span::raw(" send  "),
        Span::styled(" ↑↓ PgUp PgDn ", Style::default().fg(Color::Black).bg(Color::Yellow)),
        Span::raw(" scroll  "),
        Span::styled(" Esc ", Style::default().fg(Color::Black).bg(Color::Yellow)),
        Span::raw(" close"),
    ]);

    frame.render_widget(Paragraph::new(hints), area);
}
