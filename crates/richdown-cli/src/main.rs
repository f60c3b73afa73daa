use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use richdown_config::Config;
use richdown_engine::editing::runes;
use richdown_engine::position::offset_of;
use richdown_engine::{Editor, Op, io, metrics, to_plaintext};
use std::time::{Duration, Instant};
use std::{env, path::PathBuf, process};

/// Starter document shown when the storage root holds nothing yet.
const DEFAULT_DOCUMENT: &str = "\
# Welcome to richdown

Type anywhere. *Emphasis*, **strong**, `code`, ~strike~.

> Quotes accumulate row by row
- So do lists
- [ ] And todos

```rust
let fenced = true;
```

Ctrl-S saves, Ctrl-P toggles read-only, Ctrl-Q quits.";

struct App {
    storage_root: PathBuf,
    editor: Editor,
    clipboard: String,
    status: String,
}

impl App {
    fn new(storage_root: PathBuf) -> Self {
        let buffer = match io::load_document(&storage_root) {
            Ok(buffer) => buffer,
            Err(io::IoError::NotFound(_)) => DEFAULT_DOCUMENT.to_string(),
            Err(err) => {
                log::warn!("loading document failed, starting empty: {err}");
                String::new()
            }
        };
        let mut editor = Editor::new(&buffer);
        editor.focus();
        Self {
            storage_root,
            editor,
            clipboard: String::new(),
            status: String::new(),
        }
    }

    fn save(&mut self) {
        match io::save_document(&self.storage_root, self.editor.buffer()) {
            Ok(()) => self.status = "saved".to_string(),
            Err(err) => self.status = format!("save failed: {err}"),
        }
    }

    /// Classifies a key event into the engine's semantic operation set.
    /// Returns false when the event asks to quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        self.status.clear();

        match (key.code, ctrl, alt) {
            (KeyCode::Char('q'), true, _) => return false,
            (KeyCode::Char('s'), true, _) => self.save(),
            (KeyCode::Char('p'), true, _) => {
                self.editor.dispatch(Op::ToggleReadOnly);
            }
            (KeyCode::Char('z'), true, _) => {
                self.editor.dispatch(Op::Undo);
            }
            (KeyCode::Char('y'), true, _) => {
                self.editor.dispatch(Op::Redo);
            }
            (KeyCode::Char('x'), true, _) => {
                if let Some(cut) = self.editor.dispatch(Op::Cut) {
                    self.clipboard = cut;
                }
            }
            (KeyCode::Char('c'), true, _) => {
                if let Some(copied) = self.editor.dispatch(Op::Copy) {
                    self.clipboard = copied;
                }
            }
            (KeyCode::Char('v'), true, _) => {
                self.editor.dispatch(Op::Paste(self.clipboard.clone()));
            }
            (KeyCode::Char(c), false, false) => {
                self.editor.dispatch(Op::Write(c.to_string()));
            }
            (KeyCode::Enter, _, _) => {
                self.editor.dispatch(Op::Enter);
            }
            (KeyCode::Tab, _, _) => {
                self.editor.dispatch(Op::Tab);
            }
            (KeyCode::Backspace, false, false) => {
                self.editor.dispatch(Op::BackspaceRune);
            }
            (KeyCode::Backspace, true, false) => {
                self.editor.dispatch(Op::BackspaceWord);
            }
            (KeyCode::Backspace, _, true) => {
                self.editor.dispatch(Op::BackspaceParagraph);
            }
            (KeyCode::Delete, false, _) => {
                self.editor.dispatch(Op::DeleteRuneForward);
            }
            (KeyCode::Delete, true, _) => {
                self.editor.dispatch(Op::DeleteWordForward);
            }
            (KeyCode::Left, _, _) => self.move_horizontal(-1),
            (KeyCode::Right, _, _) => self.move_horizontal(1),
            (KeyCode::Up, _, _) => self.move_vertical(-1),
            (KeyCode::Down, _, _) => self.move_vertical(1),
            _ => {}
        }
        true
    }

    fn move_horizontal(&mut self, direction: i64) {
        let editor = &mut self.editor;
        let offset = if direction < 0 {
            let at = editor.pos1().pos;
            at.saturating_sub(runes::grapheme_before(editor.buffer(), at))
        } else {
            let at = editor.pos2().pos;
            at + runes::grapheme_after(editor.buffer(), at)
        };
        let _ = editor.select_offsets(offset, offset);
    }

    fn move_vertical(&mut self, direction: i64) {
        let editor = &mut self.editor;
        let pos = editor.pos1();
        let target_y = if direction < 0 {
            pos.y.saturating_sub(1)
        } else {
            (pos.y + 1).min(editor.rows().len() - 1)
        };
        let x = pos.x.min(editor.rows()[target_y].len_runes());
        if let Ok(offset) = offset_of(editor.rows(), target_y, x) {
            let _ = editor.select_offsets(offset, offset);
        }
    }
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    // Determine the storage path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let storage_root = if args.len() == 2 {
        PathBuf::from(&args[1])
    } else if args.len() == 1 {
        match Config::load() {
            Ok(Some(config)) => config.storage_path,
            Ok(None) => {
                eprintln!("Error: No storage path provided and no config file found");
                eprintln!("Usage: {} <storage-folder-path>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} <storage-folder-path>", args[0]);
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [storage-folder-path]", args[0]);
        process::exit(1);
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(storage_root);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Polling doubles as the debounce clock for history snapshots.
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()?
                && key.kind == event::KeyEventKind::Press
                && !app.handle_key(key)
            {
                return Ok(());
            }
        }
        app.editor.tick(Instant::now());
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(f.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(vertical[0]);

    // Editor pane: the raw buffer with the live cursor.
    let buffer_lines: Vec<Line> = app
        .editor
        .buffer()
        .split('\n')
        .map(|line| Line::from(Span::raw(line.to_string())))
        .collect();
    let mode = if app.editor.is_read_only() {
        "read-only"
    } else {
        "edit"
    };
    let editor_pane = Paragraph::new(buffer_lines)
        .block(Block::default().borders(Borders::ALL).title(format!("Editor [{mode}]")));
    f.render_widget(editor_pane, panes[0]);

    if !app.editor.is_read_only() {
        let pos = app.editor.pos2();
        f.set_cursor_position(Position::new(
            panes[0].x + 1 + pos.x as u16,
            panes[0].y + 1 + pos.y as u16,
        ));
    }

    // Preview pane: the tree without syntax markers.
    let preview_lines: Vec<Line> = to_plaintext(app.editor.tree(), false)
        .split('\n')
        .map(|line| Line::from(Span::raw(line.to_string())))
        .collect();
    let preview = Paragraph::new(preview_lines)
        .block(Block::default().borders(Borders::ALL).title("Preview"))
        .wrap(Wrap { trim: false });
    f.render_widget(preview, panes[1]);

    // Status line: document metrics and feedback.
    let m = metrics(app.editor.tree());
    let status = Line::from(vec![
        Span::styled(m.title.clone(), Style::default().fg(Color::Cyan)),
        Span::raw(format!(
            "  {} words · {} chars · {:.1} min read",
            m.words, m.characters, m.duration
        )),
        Span::raw(format!("  | undo depth {}", app.editor.history_len())),
        Span::styled(
            format!("  {}", app.status),
            Style::default().fg(Color::Green),
        ),
    ]);
    let help = Line::from(Span::raw(
        "Ctrl-S save · Ctrl-Z undo · Ctrl-Y redo · Ctrl-X/C/V clipboard · Ctrl-P read-only · Ctrl-Q quit",
    ));
    let footer = Paragraph::new(vec![status, help]);
    f.render_widget(footer, vertical[1]);
}
