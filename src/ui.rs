use crate::app::{Action, App, Focus, FormField, ToastKind};
use crate::attachment::data_uri_payload_len;
use crate::post_form::{TextField, CONTENT_MAX_CHARS, TITLE_MAX_CHARS};
use crate::schedule::{format_schedule, sorted_by_schedule, EMPTY_PLACEHOLDER};
use crate::scheduled_post::{Platform, ScheduledPost};
use color_eyre::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::{
    io::{stdout, Stdout},
    time::{Duration, Instant},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI { terminal })
    }

    pub fn display(&mut self, app: &App, posts: &[ScheduledPost]) -> Result<()> {
        self.terminal.draw(|f| render(f, app, posts))?;
        Ok(())
    }

    /// Wait briefly for a key press and translate it into an action.
    pub fn handle_input(&self, app: &mut App, posts: &[ScheduledPost]) -> Result<Option<Action>> {
        let mut action = None;
        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    action = app.handle_key(key, posts);
                }
            }
        }
        app.tick(Instant::now());
        Ok(action)
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

pub fn render(f: &mut Frame, app: &App, posts: &[ScheduledPost]) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "Social Media Scheduler",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from("Plan and schedule your social media content in one place"),
    ])
    .alignment(Alignment::Center);
    f.render_widget(header, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_form(f, app, panes[0]);
    render_posts(f, app, posts, panes[1]);

    f.render_widget(footer(app), chunks[2]);
}

fn pane_block(title: &str, active: bool) -> Block<'_> {
    let border = if active { Color::Yellow } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let focused = match app.focus() {
        Focus::Compose(field) => Some(field),
        Focus::Browse => None,
    };
    let block = pane_block("Create New Post", focused.is_some());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(inner);
    let schedule_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[4]);

    let title_label = format!(
        "Title ({}/{TITLE_MAX_CHARS})",
        app.form.text(TextField::Title).chars().count()
    );
    let content_label = format!(
        "Content ({}/{CONTENT_MAX_CHARS})",
        app.form.text(TextField::Content).chars().count()
    );
    let text_inputs = [
        (FormField::Title, TextField::Title, title_label, rows[0]),
        (FormField::Content, TextField::Content, content_label, rows[1]),
        (FormField::Date, TextField::Date, "Date (YYYY-MM-DD)".to_string(), schedule_row[0]),
        (FormField::Time, TextField::Time, "Time (HH:MM)".to_string(), schedule_row[1]),
    ];
    for (field, text_field, label, rect) in text_inputs {
        let is_focused = focused == Some(field);
        let mut text = app.form.text(text_field).to_string();
        if is_focused {
            text.push('|');
        }
        let input = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(field_block(label, is_focused));
        f.render_widget(input, rect);
    }

    let image_focused = focused == Some(FormField::Image);
    let typed_path = app.form.text(TextField::ImagePath);
    let image_line = match app.form.image() {
        Some(image) if typed_path.is_empty() => {
            let kb = image.size_bytes.div_ceil(1024);
            Line::from(vec![
                Span::styled(image.file_name.clone(), Style::default().fg(Color::Green)),
                Span::raw(format!(" ({kb} KB)")),
                Span::styled("  Del to remove", Style::default().fg(Color::DarkGray)),
            ])
        }
        None if typed_path.is_empty() && !image_focused => Line::from(Span::styled(
            "No image selected",
            Style::default().fg(Color::DarkGray),
        )),
        _ => {
            let cursor = if image_focused { "|" } else { "" };
            Line::from(format!("{typed_path}{cursor}"))
        }
    };
    f.render_widget(
        Paragraph::new(image_line).block(field_block(
            "Image path (optional, Enter to attach)".to_string(),
            image_focused,
        )),
        rows[2],
    );

    let platforms_focused = focused == Some(FormField::Platforms);
    let mut spans = Vec::new();
    for (i, platform) in Platform::ALL.iter().enumerate() {
        let selected = app.form.is_selected(*platform);
        let mut style = if selected {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        if platforms_focused && app.platform_cursor() == *platform {
            style = style.add_modifier(Modifier::REVERSED);
        }
        let mark = if selected { 'x' } else { ' ' };
        spans.push(Span::styled(
            format!("[{mark}] {} {}", i + 1, platform.label()),
            style,
        ));
        spans.push(Span::raw("  "));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans))
            .block(field_block("Platforms".to_string(), platforms_focused)),
        rows[3],
    );
}

fn field_block(label: String, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(label)
}

fn render_posts(f: &mut Frame, app: &App, posts: &[ScheduledPost], area: Rect) {
    let block = pane_block("Scheduled Posts", app.focus() == Focus::Browse);

    if posts.is_empty() {
        let placeholder = Paragraph::new(EMPTY_PLACEHOLDER)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    if app.show_detail() {
        if let Some(post) = app.selected_post(posts) {
            f.render_widget(post_detail(post).block(block), area);
            return;
        }
    }

    let width = block.inner(area).width.saturating_sub(2) as usize;
    let sorted = sorted_by_schedule(posts);
    let items: Vec<ListItem> = sorted.iter().map(|post| post_card(post, width)).collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.selected_index(sorted.len())));
    f.render_stateful_widget(list, area, &mut state);
}

fn post_card(post: &ScheduledPost, width: usize) -> ListItem<'static> {
    let mut badges = post
        .platforms
        .iter()
        .map(|p| p.label())
        .collect::<Vec<_>>()
        .join(" · ");
    if post.image.is_some() {
        badges.push_str("  [image]");
    }

    ListItem::new(vec![
        Line::from(vec![
            Span::styled(
                truncate_to_width(&post.title, width),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            format_schedule(post),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(truncate_to_width(
            post.content.lines().next().unwrap_or(""),
            width,
        )),
        Line::from(Span::styled(badges, Style::default().fg(Color::Magenta))),
        Line::from(""),
    ])
}

fn post_detail(post: &ScheduledPost) -> Paragraph<'static> {
    let platforms = post
        .platforms
        .iter()
        .map(|p| p.label())
        .collect::<Vec<_>>()
        .join(", ");
    let mut lines = vec![
        Line::from(Span::styled(
            post.title.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Scheduled: {}", format_schedule(post))),
        Line::from(format!("Platforms: {platforms}")),
        Line::from(format!(
            "Created: {}",
            post.created_at.format("%Y-%m-%d %H:%M UTC")
        )),
    ];
    if let Some(len) = post.image.as_deref().and_then(data_uri_payload_len) {
        lines.push(Line::from(format!("Image: {} KB", len.div_ceil(1024))));
    }
    lines.push(Line::from(""));
    lines.extend(post.content.lines().map(|l| Line::from(l.to_string())));

    Paragraph::new(lines).wrap(Wrap { trim: false })
}

fn footer(app: &App) -> Paragraph<'static> {
    if let Some(toast) = app.toast() {
        let color = match toast.kind {
            ToastKind::Success => Color::Green,
            ToastKind::Error => Color::Red,
        };
        return Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{}: ", toast.title),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(toast.description.clone(), Style::default().fg(color)),
        ]))
        .alignment(Alignment::Center);
    }

    let keys: &[(&str, &str)] = match app.focus() {
        Focus::Browse => &[
            ("n", "new post"),
            ("↑/↓", "select"),
            ("Enter", "details"),
            ("d", "delete"),
            ("q", "quit"),
        ],
        Focus::Compose(FormField::Platforms) => &[
            ("←/→", "move"),
            ("Space/1-4", "toggle"),
            ("Tab", "next field"),
            ("Ctrl+S", "schedule"),
            ("Esc", "back"),
        ],
        Focus::Compose(_) => &[
            ("Tab", "next field"),
            ("Ctrl+S", "schedule"),
            ("Esc", "back"),
        ],
    };
    let mut spans = Vec::new();
    for (i, (key, what)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(", "));
        }
        spans.push(Span::styled(
            *key,
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {what}")));
    }
    Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
}

/// Cut `text` to at most `max` display columns, marking the cut with `…`.
fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduled_post::{PostDraft, PostId};
    use ratatui::backend::TestBackend;

    fn post(title: &str, date: &str, time: &str) -> ScheduledPost {
        ScheduledPost::new(
            PostId::generate(),
            PostDraft {
                title: title.to_string(),
                content: "Body text".to_string(),
                image: None,
                platforms: vec![Platform::Twitter, Platform::Linkedin],
                scheduled_date: date.to_string(),
                scheduled_time: time.to_string(),
            },
        )
    }

    fn screen(app: &App, posts: &[ScheduledPost]) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render(f, app, posts)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn empty_store_shows_the_placeholder() {
        let app = App::new(Duration::from_secs(3));
        let text = screen(&app, &[]);
        assert!(text.contains(EMPTY_PLACEHOLDER));
        assert!(text.contains("Social Media Scheduler"));
    }

    #[test]
    fn posts_render_in_schedule_order() {
        let app = App::new(Duration::from_secs(3));
        let posts = vec![
            post("Zeta", "2025-06-01", "08:00"),
            post("Alpha", "2025-01-01", "09:00"),
        ];

        let text = screen(&app, &posts);

        assert!(!text.contains(EMPTY_PLACEHOLDER));
        let alpha = text.find("Alpha").expect("Alpha rendered");
        let zeta = text.find("Zeta").expect("Zeta rendered");
        assert!(alpha < zeta);
        assert!(text.contains("Jan 01, 2025, 09:00"));
        assert!(text.contains("Twitter/X · LinkedIn"));
    }

    #[test]
    fn toast_replaces_the_key_help() {
        let mut app = App::new(Duration::from_secs(3));
        assert!(screen(&app, &[]).contains("new post"));

        app.notify(ToastKind::Error, "Title required", "Please enter a post title");
        let text = screen(&app, &[]);
        assert!(text.contains("Title required: Please enter a post title"));
        assert!(!text.contains("new post"));
    }

    #[test]
    fn truncation_respects_display_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefgh", 5), "abcd…");
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn typed_image_path_shows_over_an_attached_image() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = dir.path().join("first.png");
        std::fs::write(&first, b"png").unwrap();

        let mut app = App::new(Duration::from_secs(3));
        app.form.attach_image(&first).unwrap();
        assert!(screen(&app, &[]).contains("first.png (1 KB)"));

        app.form.set_text(TextField::ImagePath, "/tmp/second.png");
        let text = screen(&app, &[]);
        assert!(text.contains("/tmp/second.png"));
        assert!(!text.contains("first.png (1 KB)"));
    }
}
