use crate::client::AppSnapshot;
use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use piedra_papel_tijera::{
    game::{Move, Outcome},
    stats::RoundRecord,
};
use ratatui::{prelude::*, widgets::*};
use std::io::stdout;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UserEvent {
    Quit,
    Play(Move),
    Reset,
    ToggleTheme,
    Redraw,
}

#[derive(Debug, Default)]
pub struct UiState {
    mode: Mode,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Mode {
    #[default]
    Normal,
    QuitModal,
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    // Create a single persistent Terminal to preserve buffers across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    if let Some(mut term) = state.terminal.take() {
        let res = term.draw(|f| ui(f, state, snap)).map(|_| ());
        state.terminal = Some(term);
        res?;
    }
    Ok(())
}

pub async fn next_event(state: &mut UiState) -> Result<UserEvent> {
    loop {
        // crossterm reads block, keep them off the event loop thread
        match tokio::task::spawn_blocking(event::read).await?? {
            Event::Key(k) => {
                if let Some(ev) = handle_key(state, k) {
                    return Ok(ev);
                }
            }
            Event::Resize(..) => return Ok(UserEvent::Redraw),
            _ => {}
        }
    }
}

fn handle_key(state: &mut UiState, k: KeyEvent) -> Option<UserEvent> {
    if k.kind != KeyEventKind::Press {
        return None;
    }
    if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
        return Some(UserEvent::Quit);
    }
    if state.mode == Mode::QuitModal {
        return match k.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(UserEvent::Quit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            _ => None,
        };
    }
    match k.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            state.mode = Mode::QuitModal;
            Some(UserEvent::Redraw)
        }
        KeyCode::Char('r') | KeyCode::Char('1') => Some(UserEvent::Play(Move::Rock)),
        KeyCode::Char('p') | KeyCode::Char('2') => Some(UserEvent::Play(Move::Paper)),
        KeyCode::Char('s') | KeyCode::Char('3') => Some(UserEvent::Play(Move::Scissors)),
        KeyCode::Char('x') => Some(UserEvent::Reset),
        KeyCode::Char('t') => Some(UserEvent::ToggleTheme),
        _ => None,
    }
}

fn ui(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    // Clear the whole frame to avoid leftover fragments
    f.render_widget(Clear, f.area());
    let palette = snap.theme.palette();
    f.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.foreground)),
        f.area(),
    );
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title + theme toggle
            Constraint::Length(3), // counters
            Constraint::Length(3), // result message
            Constraint::Length(7), // history, five entries
            Constraint::Min(3),    // status/errors
            Constraint::Length(3), // help
        ])
        .split(f.area());

    draw_header(f, chunks[0], snap);
    draw_counters(f, chunks[1], snap);
    draw_result(f, chunks[2], snap);
    draw_history(f, chunks[3], snap);
    draw_bottom(f, chunks[4], chunks[5], snap);
    draw_modals(f, state);
}

fn draw_header(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let text = Line::from(vec![
        Span::styled(
            "Rock · Paper · Scissors",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  |  [t] {}", snap.theme.toggle_label())),
    ]);
    let widget = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn draw_counters(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let stats = &snap.stats;
    let cells = [
        ("Rounds", stats.rounds_played.to_string()),
        ("Wins", stats.user_wins.to_string()),
        ("Losses", stats.computer_wins.to_string()),
        ("Draws", stats.draws.to_string()),
        ("Win rate", format!("{:.0}%", stats.win_rate() * 100.0)),
    ];
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, cells.len() as u32); 5])
        .split(area);
    for ((title, value), rect) in cells.into_iter().zip(cols.iter()) {
        let widget = Paragraph::new(value)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(widget, *rect);
    }
}

fn draw_result(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let style = snap
        .stats
        .history
        .first()
        .map(|r| outcome_style(r.outcome))
        .unwrap_or_default();
    let widget = Paragraph::new(Line::styled(snap.message.clone(), style))
        .block(Block::default().borders(Borders::ALL).title("Result"));
    f.render_widget(widget, area);
}

// History list is rebuilt from the snapshot on every frame
fn draw_history(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let mut lines = vec![];
    if snap.stats.history.is_empty() {
        lines.push(Line::styled("None", Style::default().fg(Color::DarkGray)));
    } else {
        for (idx, record) in snap.stats.history.iter().enumerate() {
            lines.push(history_line(idx, record));
        }
    }
    let widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("History"));
    f.render_widget(widget, area);
}

fn history_line(idx: usize, record: &RoundRecord) -> Line<'static> {
    Line::styled(
        format!(
            "{}. You: {} | Computer: {} | {}",
            idx + 1,
            record.user_choice,
            record.computer_choice,
            record.outcome.label()
        ),
        outcome_style(record.outcome),
    )
}

/// One style per outcome; a draw keeps the palette's default colours.
fn outcome_style(outcome: Outcome) -> Style {
    match outcome {
        Outcome::Win => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        Outcome::Loss => Style::default().fg(Color::Red),
        Outcome::Draw => Style::default(),
    }
}

fn draw_bottom(f: &mut Frame, status_area: Rect, help_area: Rect, snap: &AppSnapshot) {
    let status_widget = if snap.errors.is_empty() {
        let mut lines: Vec<Line> = Vec::new();
        if snap.status.trim().is_empty() {
            lines.push(Line::from("Ready"));
        } else {
            for line in snap.status.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .style(Style::default().fg(Color::Green))
    } else {
        // newest last; show as many as fit
        let visible = status_area.height.saturating_sub(2) as usize;
        let skip = snap.errors.len().saturating_sub(visible);
        let lines: Vec<Line> = snap
            .errors
            .iter()
            .skip(skip)
            .map(|e| Line::from(e.clone()))
            .collect();
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Errors"))
            .style(Style::default().fg(Color::Red))
    };
    f.render_widget(status_widget, status_area);

    let help = Paragraph::new(format!(
        "r rock | p paper | s scissors | x reset | t {} | q/Esc quit",
        snap.theme.toggle_label()
    ))
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, help_area);
}

fn draw_modals(f: &mut Frame, state: &UiState) {
    if state.mode == Mode::QuitModal {
        let area = centered_rect(40, 20, f.area());
        f.render_widget(Clear, area);
        let widget = Paragraph::new("Quit the game? (y/n)")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Quit"));
        f.render_widget(widget, area);
    }
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    let vertical = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1]);

    vertical[1]
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use piedra_papel_tijera::{
        game::judge,
        stats::GameStatistics,
        theme::ThemePreference,
    };
    use ratatui::{backend::TestBackend, buffer::Buffer};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn snapshot(stats: GameStatistics, theme: ThemePreference) -> AppSnapshot {
        AppSnapshot {
            stats,
            theme,
            message: String::from("Choose your move"),
            status: String::from("Ready"),
            errors: Vec::new(),
        }
    }

    fn render(state: &UiState, snap: &AppSnapshot) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(90, 30)).unwrap();
        terminal.draw(|f| ui(f, state, snap)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn buffer_text(buf: &Buffer) -> String {
        let width = buf.area.width as usize;
        buf.content()
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn record(user: Move, computer: Move) -> RoundRecord {
        RoundRecord {
            user_choice: user,
            computer_choice: computer,
            outcome: judge(user, computer),
        }
    }

    #[test]
    fn draw__without_a_terminal_is_a_no_op() {
        // given
        let mut state = UiState::default();
        let snap = snapshot(GameStatistics::default(), ThemePreference::Light);

        // when
        let without_terminal = draw(&mut state, &snap);

        // then
        assert!(without_terminal.is_ok());
        assert!(state.terminal.is_none());
    }

    #[test]
    fn handle_key__maps_moves_and_actions() {
        let mut state = UiState::default();
        let cases = [
            (KeyCode::Char('r'), UserEvent::Play(Move::Rock)),
            (KeyCode::Char('2'), UserEvent::Play(Move::Paper)),
            (KeyCode::Char('s'), UserEvent::Play(Move::Scissors)),
            (KeyCode::Char('x'), UserEvent::Reset),
            (KeyCode::Char('t'), UserEvent::ToggleTheme),
        ];
        for (code, expected) in cases {
            assert_eq!(Some(expected), handle_key(&mut state, press(code)));
        }
        assert_eq!(None, handle_key(&mut state, press(KeyCode::Char('z'))));
    }

    #[test]
    fn handle_key__quit_requires_confirmation() {
        // given
        let mut state = UiState::default();

        // when
        let first = handle_key(&mut state, press(KeyCode::Char('q')));
        let ignored = handle_key(&mut state, press(KeyCode::Char('r')));
        let cancel = handle_key(&mut state, press(KeyCode::Esc));
        handle_key(&mut state, press(KeyCode::Esc));
        let confirm = handle_key(&mut state, press(KeyCode::Char('y')));

        // then
        assert_eq!(Some(UserEvent::Redraw), first);
        assert_eq!(None, ignored);
        assert_eq!(Some(UserEvent::Redraw), cancel);
        assert_eq!(Some(UserEvent::Quit), confirm);
    }

    #[test]
    fn handle_key__ctrl_c_quits_immediately() {
        let mut state = UiState::default();
        let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(Some(UserEvent::Quit), handle_key(&mut state, ev));
    }

    #[test]
    fn ui__fresh_dark_session_shows_zeroes_and_light_toggle() {
        // given
        let snap = snapshot(GameStatistics::default(), ThemePreference::Dark);

        // when
        let buf = render(&UiState::default(), &snap);

        // then
        let text = buffer_text(&buf);
        assert!(text.contains("switch to light"));
        assert!(text.contains("None"));
        assert!(text.contains("0%"));
        assert!(!text.contains("You:"));
        let dark_bg = ThemePreference::Dark.palette().background;
        assert!(buf.content().iter().all(|c| c.bg == dark_bg));
    }

    #[test]
    fn ui__history_is_newest_first_with_outcome_styles() {
        // given
        let mut stats = GameStatistics::default();
        stats.record(record(Move::Rock, Move::Scissors));
        stats.record(record(Move::Rock, Move::Paper));
        stats.record(record(Move::Paper, Move::Paper));
        let snap = snapshot(stats, ThemePreference::Light);

        // when
        let text = buffer_text(&render(&UiState::default(), &snap));

        // then
        let draw = text.find("1. You: Paper | Computer: Paper | Draw").unwrap();
        let loss = text.find("2. You: Rock | Computer: Paper | Loss").unwrap();
        let win = text.find("3. You: Rock | Computer: Scissors | Win").unwrap();
        assert!(draw < loss && loss < win);
        assert!(text.contains("switch to dark"));
    }

    #[test]
    fn outcome_style__is_distinct_per_outcome() {
        let win = outcome_style(Outcome::Win);
        let loss = outcome_style(Outcome::Loss);
        let draw = outcome_style(Outcome::Draw);
        assert_ne!(win, loss);
        assert_ne!(win, draw);
        assert_ne!(loss, draw);
        assert_eq!(Style::default(), draw);
    }

    #[test]
    fn ui__rendering_is_idempotent_and_never_stale() {
        // given
        let mut stats = GameStatistics::default();
        for _ in 0..3 {
            stats.record(record(Move::Scissors, Move::Paper));
        }
        let played = snapshot(stats, ThemePreference::Light);
        let state = UiState::default();

        // when
        let first = render(&state, &played);
        let second = render(&state, &played);
        let mut terminal = Terminal::new(TestBackend::new(90, 30)).unwrap();
        terminal.draw(|f| ui(f, &state, &played)).unwrap();
        let after_reset = snapshot(GameStatistics::default(), ThemePreference::Light);
        terminal.draw(|f| ui(f, &state, &after_reset)).unwrap();

        // then
        assert_eq!(first, second);
        let text = buffer_text(terminal.backend().buffer());
        assert!(!text.contains("You:"));
        assert!(text.contains("None"));
    }

    #[test]
    fn ui__errors_replace_status_panel() {
        let mut snap = snapshot(GameStatistics::default(), ThemePreference::Light);
        snap.errors.push(String::from("Failed to save statistics"));

        let text = buffer_text(&render(&UiState::default(), &snap));

        assert!(text.contains("Errors"));
        assert!(text.contains("Failed to save statistics"));
    }

    #[test]
    fn ui__quit_modal_is_drawn_on_top() {
        let mut state = UiState::default();
        handle_key(&mut state, press(KeyCode::Char('q')));
        let snap = snapshot(GameStatistics::default(), ThemePreference::Light);

        let text = buffer_text(&render(&state, &snap));

        assert!(text.contains("Quit the game? (y/n)"));
    }
}
