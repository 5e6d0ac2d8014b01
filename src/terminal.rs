//! Line-oriented terminal front-end.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use wxboard_places::{CardState, Intent, IntentSender, Place, PlaceView};
use wxboard_weather::Suggestion;

pub const HELP: &str = "\
Commands:
  type <text>   edit the city input and show suggestions
  add [text]    add the typed (or given) city
  pick <n>      choose suggestion n
  dismiss       hide suggestions
  rm <n|id>     remove place n or the place with this id
  refresh       reload every forecast
  locate        use the current position
  list          show tracked places
  quit          exit";

/// Rows shown by `list`, shared between the view and the input loop.
pub type Rows = Arc<Mutex<Vec<Row>>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: String,
    pub label: String,
    pub is_geo: bool,
}

impl Row {
    fn from_place(place: &Place) -> Self {
        Self {
            id: place.id.clone(),
            label: place.display_name.clone(),
            is_geo: place.is_geo,
        }
    }
}

/// Prints every change the dashboard pushes.
pub struct TerminalView {
    rows: Rows,
}

impl TerminalView {
    pub fn new(rows: Rows) -> Self {
        Self { rows }
    }

    fn label(&self, id: &str) -> String {
        self.rows
            .lock()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.label.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

impl PlaceView for TerminalView {
    fn place_added(&mut self, place: &Place, index: usize) {
        let mut rows = self.rows.lock();
        let index = index.min(rows.len());
        rows.insert(index, Row::from_place(place));
    }

    fn place_updated(&mut self, place: &Place) {
        if let Some(row) = self.rows.lock().iter_mut().find(|r| r.id == place.id) {
            *row = Row::from_place(place);
        }
    }

    fn place_removed(&mut self, id: &str) {
        let mut rows = self.rows.lock();
        if let Some(index) = rows.iter().position(|r| r.id == id) {
            let row = rows.remove(index);
            println!("- {}", row.label);
        }
    }

    fn card_state(&mut self, id: &str, state: &CardState) {
        let label = self.label(id);
        match state {
            CardState::Loading => println!("[{}] loading...", label),
            CardState::Rendered(lines) => {
                println!("[{}]", label);
                for line in lines {
                    println!("  {}", line);
                }
            }
            CardState::Errored(message) => println!("[{}] {}", label, message),
        }
    }

    fn location_header(&mut self, label: Option<&str>) {
        match label {
            Some(label) => println!("Location: {}", label),
            None => println!("Location: -"),
        }
    }

    fn form_error(&mut self, message: Option<&str>) {
        if let Some(message) = message {
            println!("! {}", message);
        }
    }

    fn suggestions(&mut self, items: &[Suggestion]) {
        for (i, item) in items.iter().enumerate() {
            println!("  {}) {}", i + 1, item.display_name());
        }
    }

    fn input_text(&mut self, text: &str) {
        if !text.is_empty() {
            println!("> {}", text);
        }
    }
}

/// A parsed input line.
#[derive(Debug)]
pub enum Command {
    Send(Vec<Intent>),
    List,
    Help,
    Unknown(String),
}

pub fn parse_command(line: &str, rows: &[Row]) -> Command {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "type" => Command::Send(vec![Intent::InputChanged(rest.to_string())]),
        "add" if rest.is_empty() => Command::Send(vec![Intent::Add]),
        "add" => Command::Send(vec![Intent::InputChanged(rest.to_string()), Intent::Add]),
        "pick" => match rest.parse::<usize>() {
            Ok(n) if n > 0 => Command::Send(vec![Intent::SelectSuggestion(n - 1)]),
            _ => Command::Unknown(line.to_string()),
        },
        "dismiss" => Command::Send(vec![Intent::DismissSuggestions]),
        "rm" if !rest.is_empty() => {
            let id = rest
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| rows.get(i))
                .map(|r| r.id.clone())
                .unwrap_or_else(|| rest.to_string());
            Command::Send(vec![Intent::Remove(id)])
        }
        "refresh" => Command::Send(vec![Intent::Refresh]),
        "locate" => Command::Send(vec![Intent::Locate]),
        "list" => Command::List,
        "quit" | "exit" => Command::Send(vec![Intent::Shutdown]),
        "help" | "" => Command::Help,
        _ => Command::Unknown(line.to_string()),
    }
}

fn print_rows(rows: &[Row]) {
    if rows.is_empty() {
        println!("No places yet");
    }
    for (i, row) in rows.iter().enumerate() {
        let marker = if row.is_geo { " (current location)" } else { "" };
        println!("{}) {}{}  [{}]", i + 1, row.label, marker, row.id);
    }
}

/// Read stdin until EOF or `quit`, forwarding intents to the dashboard.
pub async fn read_input(tx: IntentSender, rows: Rows) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to read input: {}", e);
                break;
            }
        };

        let command = parse_command(&line, &rows.lock());
        match command {
            Command::Send(intents) => {
                for intent in intents {
                    let stop = matches!(intent, Intent::Shutdown);
                    if tx.send(intent).is_err() || stop {
                        return;
                    }
                }
            }
            Command::List => print_rows(&rows.lock()),
            Command::Help => println!("{}", HELP),
            Command::Unknown(text) => println!("Unknown command: {} (try help)", text),
        }
    }

    let _ = tx.send(Intent::Shutdown);
}
