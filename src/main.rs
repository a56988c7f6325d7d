mod app;
mod bank;
mod config;
mod event;
mod quiz;
mod ui;

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use app::{App, AppScreen};
use bank::{BankId, Choice};
use config::Config;
use event::{AppEvent, EventSource};
use quiz::{OrderMode, QuizMode};
use ui::components::progress_bar::ProgressBar;
use ui::components::question_card::QuestionCard;
use ui::components::setup::SetupView;
use ui::components::summary::Summary;
use ui::layout::{AppLayout, pack_hint_lines};

#[derive(Parser)]
#[command(name = "chapquiz", version, about = "Chapter-based A/B/C multiple-choice quiz")]
struct Cli {
    #[arg(short, long, help = "Question bank (generated, book)")]
    bank: Option<String>,

    #[arg(short, long, help = "Chapter number")]
    chapter: Option<u32>,

    #[arg(short, long, help = "Quiz mode (practice, exam)")]
    mode: Option<String>,

    #[arg(short, long, help = "Question order (sequential, random)")]
    order: Option<String>,

    #[arg(short = 'n', long, help = "Number of questions (5-30)")]
    count: Option<usize>,

    #[arg(long, help = "Allow Next before the question is answered")]
    no_lock: bool,

    #[arg(long, help = "Seed for the question shuffle")]
    seed: Option<u64>,

    #[arg(long, help = "Directory holding <bank>/chapter_<N>.json files")]
    bank_dir: Option<PathBuf>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = Config::load()?;
    let auto_start = should_auto_start(&cli);
    apply_cli(&mut config, &cli)?;

    let theme = match ui::theme::Theme::load(&config.theme) {
        Some(theme) => theme,
        None => {
            warn!(
                "theme {:?} not found (available: {}), using the built-in palette",
                config.theme,
                ui::theme::Theme::available_themes().join(", ")
            );
            ui::theme::Theme::default()
        }
    };

    let mut app = App::new(&config, theme, cli.seed);
    if auto_start {
        app.start_session();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &EventSource);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Records go to a file because stderr shares the terminal with the
/// alternate screen. `RUST_LOG` sets the filter, default `warn`.
fn init_logging() {
    let path = log_file_path();
    let file = match open_log_file(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("logging disabled: cannot open {}: {err}", path.display());
            return;
        }
    };
    let filters = env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn log_file_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chapquiz")
        .join("chapquiz.log")
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Naming both bank and chapter on the command line skips the setup screen.
fn should_auto_start(cli: &Cli) -> bool {
    cli.bank.is_some() && cli.chapter.is_some()
}

fn apply_cli(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(name) = &cli.bank {
        let Some(bank) = BankId::from_name(name) else {
            bail!("unknown bank {name:?} (expected generated or book)");
        };
        config.bank = bank;
    }
    if let Some(chapter) = cli.chapter {
        // Chapters missing from the bank surface as a load error on start
        if chapter == 0 {
            bail!("chapter must be 1 or greater");
        }
        config.chapter = chapter;
    }
    if let Some(name) = &cli.mode {
        let Some(mode) = QuizMode::from_name(name) else {
            bail!("unknown mode {name:?} (expected practice or exam)");
        };
        config.mode = mode;
    }
    if let Some(name) = &cli.order {
        let Some(order) = OrderMode::from_name(name) else {
            bail!("unknown order {name:?} (expected sequential or random)");
        };
        config.order = order;
    }
    if let Some(count) = cli.count {
        config.question_count = count;
    }
    if cli.no_lock {
        config.lock_next_until_answered = false;
    }
    if let Some(dir) = &cli.bank_dir {
        config.bank_dir = Some(dir.to_string_lossy().into_owned());
    }
    if let Some(theme) = &cli.theme {
        config.theme = theme.clone();
    }
    config.validate();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventSource,
) -> Result<()> {
    loop {
        if app.screen == AppScreen::Quiz {
            app.controller.sync_active_question();
        }
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            info!("quitting");
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Setup => handle_setup_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::Summary => handle_summary_key(app, key),
    }
}

fn handle_setup_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.setup.prev_field(),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => app.setup.next_field(),
        KeyCode::Left | KeyCode::Char('h') => app.setup.cycle_backward(),
        KeyCode::Right | KeyCode::Char('l') => app.setup.cycle_forward(),
        KeyCode::Enter | KeyCode::Char(' ') => app.setup_activate(),
        KeyCode::Char('s') => app.start_session(),
        KeyCode::Char('r') => app.resume(),
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.go_to_setup(),
        KeyCode::Char('a') | KeyCode::Char('1') => app.choose(Choice::A),
        KeyCode::Char('b') | KeyCode::Char('2') => app.choose(Choice::B),
        KeyCode::Char('c') | KeyCode::Char('3') => app.choose(Choice::C),
        KeyCode::Up | KeyCode::Char('k') => app.cycle_choice(false),
        KeyCode::Down | KeyCode::Char('j') => app.cycle_choice(true),
        KeyCode::Enter | KeyCode::Char(' ') => app.answer(),
        KeyCode::Left | KeyCode::Char('p') => app.go_previous(),
        KeyCode::Right | KeyCode::Char('n') => app.go_next(),
        KeyCode::Char('r') => app.restart(),
        _ => {}
    }
}

fn handle_summary_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.restart(),
        KeyCode::Char('s') | KeyCode::Esc => app.go_to_setup(),
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.scroll_summary(false),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_summary(true),
        KeyCode::Left | KeyCode::Char('p') => {
            app.controller.previous();
            app.screen = AppScreen::Quiz;
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Setup => render_setup(frame, app),
        AppScreen::Quiz => render_quiz(frame, app),
        AppScreen::Summary => render_summary(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect, text: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " chapquiz ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            text.to_string(),
            Style::default().fg(colors.text_dim()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect, hints: &[&str]) {
    let colors = &app.theme.colors;
    let lines: Vec<Line> = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_dim()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_setup(frame: &mut ratatui::Frame, app: &App) {
    let app_layout = AppLayout::new(frame.area());
    render_header(frame, app, app_layout.header, " Setup");

    let centered = ui::layout::centered_rect(60, 80, app_layout.main);
    let view = SetupView {
        form: &app.setup,
        error: app.controller.load_error(),
        theme: app.theme,
    };
    frame.render_widget(view, centered);

    let resume_hint = if app.can_resume() { "[r] Resume" } else { "" };
    render_footer(
        frame,
        app,
        app_layout.footer,
        &[
            "[Up/Down] Field",
            "[Left/Right] Change",
            "[Enter] Select",
            "[s] Start",
            resume_hint,
            "[q] Quit",
        ],
    );
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App) {
    let app_layout = AppLayout::new(frame.area());
    let colors = &app.theme.colors;
    let state = app.controller.state();

    let Some(question) = app.controller.current_question() else {
        return;
    };

    let mode = app
        .controller
        .config()
        .map(|c| c.mode.label())
        .unwrap_or_default();
    let header_text = format!(
        " Chapter {} · Question {} of {} | {mode}",
        state.chapter(),
        state.position() + 1,
        state.len()
    );
    render_header(frame, app, app_layout.header, &header_text);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(6),
        ])
        .split(app_layout.main);

    let progress = ProgressBar::for_position(state.position(), state.len(), app.theme);
    frame.render_widget(progress, body[0]);

    let score = app.controller.live_score();
    let caption = Paragraph::new(Line::from(Span::styled(
        format!(
            " Answered {}/{} · Score {}",
            score.answered, score.total, score.correct
        ),
        Style::default().fg(colors.text_dim()),
    )));
    frame.render_widget(caption, body[1]);

    let card = QuestionCard {
        question,
        selected: state.current_choice(),
        feedback: app.controller.feedback(),
        last_outcome: state.last_outcome(),
        theme: app.theme,
    };
    frame.render_widget(card, body[2]);

    let prev_hint = if app.can_go_previous() { "[Left/p] Previous" } else { "" };
    let next_hint = if app.can_go_next() { "[Right/n] Next" } else { "" };
    render_footer(
        frame,
        app,
        app_layout.footer,
        &[
            "[a/b/c] Choose",
            "[Enter] Answer",
            prev_hint,
            next_hint,
            "[r] Reset",
            "[Esc] Setup",
        ],
    );
}

fn render_summary(frame: &mut ratatui::Frame, app: &App) {
    let app_layout = AppLayout::new(frame.area());
    let state = app.controller.state();
    render_header(
        frame,
        app,
        app_layout.header,
        &format!(" Chapter {} · Finished", state.chapter()),
    );

    let centered = ui::layout::centered_rect(70, 90, app_layout.main);
    let summary = Summary {
        score: app.controller.final_score(),
        missed: app.controller.review(),
        scroll: app.summary_scroll,
        theme: app.theme,
    };
    frame.render_widget(summary, centered);

    render_footer(
        frame,
        app,
        app_layout.footer,
        &[
            "[r] Restart",
            "[Up/Down] Scroll",
            "[p] Back to last question",
            "[s/Esc] Setup",
            "[q] Quit",
        ],
    );
}
