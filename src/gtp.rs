//! Go Text Protocol (version 2) adapter.
//!
//! A thin text layer over [`Engine`]: it owns coordinate parsing and
//! formatting (column letters skip 'I'), translates core failures into
//! `?`-responses, and never reaches into the search itself. Works with
//! GoGui, Sabaki, KGS and anything else speaking GTP.
//!
//! ## Supported commands
//!
//! The administrative set (`protocol_version`, `name`, `version`,
//! `known_command`, `list_commands`, `quit`), game setup (`boardsize`,
//! `clear_board`, `komi`, `fixed_handicap`), play (`play`, `genmove`,
//! `kgs-genmove_cleanup`), clocks (`level`, `time_settings`,
//! `kgs-time_settings`, `time_left`), and scoring (`final_score`,
//! `final_status_list`, `showboard`).

use std::io::{self, BufRead, Write};

use crate::board::{Color, Point};
use crate::constants::{COORDINATES, PASS};
use crate::engine::{Engine, GenMove};

/// The list of known GTP commands, sorted.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "final_score",
    "final_status_list",
    "fixed_handicap",
    "genmove",
    "kgs-genmove_cleanup",
    "kgs-time_settings",
    "known_command",
    "komi",
    "level",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "time_left",
    "time_settings",
    "version",
];

pub struct GtpSession {
    engine: Engine,
    early_pass: bool,
}

impl GtpSession {
    pub fn new(engine: Engine) -> Self {
        GtpSession {
            engine,
            early_pass: true,
        }
    }

    /// Run the command loop: read from stdin, answer on stdout, until
    /// `quit` or end of input.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some(&command) = parts.first() else {
                continue;
            };
            let command = command.to_lowercase();
            let args = &parts[1..];

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            write!(stdout, "{prefix}{id_str} {message}\n\n")?;
            stdout.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse the optional numeric command id prefix.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let mut split = line.splitn(2, char::is_whitespace);
        let head = split.next().unwrap_or("");
        if let Ok(id) = head.parse::<u32>() {
            (Some(id), split.next().unwrap_or("").trim())
        } else {
            (None, line)
        }
    }

    /// Execute one command, returning (success, response body).
    pub(crate) fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "protocol_version" => (true, "2".to_string()),

            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.first() {
                Some(cmd) => (
                    true,
                    KNOWN_COMMANDS
                        .contains(&cmd.to_lowercase().as_str())
                        .to_string(),
                ),
                None => (false, "syntax error".to_string()),
            },

            "quit" => (true, String::new()),

            "boardsize" => match args.first().and_then(|a| a.parse::<usize>().ok()) {
                Some(size) => match self.engine.set_size(size) {
                    Ok(()) => (true, String::new()),
                    Err(_) => (false, "unacceptable size".to_string()),
                },
                None => (false, "syntax error".to_string()),
            },

            "clear_board" => {
                self.engine.clear_board();
                (true, String::new())
            }

            "komi" => match args.first().and_then(|a| a.parse::<f32>().ok()) {
                Some(komi) => {
                    self.engine.set_komi(komi);
                    (true, String::new())
                }
                None => (false, "syntax error".to_string()),
            },

            "fixed_handicap" => match args.first().and_then(|a| a.parse::<usize>().ok()) {
                Some(handicap) if (2..=9).contains(&handicap) => {
                    if self.engine.set_fixed_handicap(handicap) {
                        (true, String::new())
                    } else {
                        (false, "invalid handicap".to_string())
                    }
                }
                _ => (false, "syntax error".to_string()),
            },

            "play" => {
                let (Some(color), Some(vertex)) = (
                    args.first().and_then(|a| parse_color(a)),
                    args.get(1).and_then(|a| self.parse_vertex(a)),
                ) else {
                    return (false, "syntax error".to_string());
                };
                match self.engine.play_move(vertex, color) {
                    Ok(()) => {
                        self.engine.report_move(vertex);
                        (true, String::new())
                    }
                    Err(_) => (false, "illegal move".to_string()),
                }
            }

            "genmove" => match args.first().and_then(|a| parse_color(a)) {
                Some(color) => self.genmove(color),
                None => (false, "syntax error".to_string()),
            },

            "kgs-genmove_cleanup" => match args.first().and_then(|a| parse_color(a)) {
                Some(color) => {
                    self.early_pass = false;
                    let response = self.genmove(color);
                    self.early_pass = true;
                    response
                }
                None => (false, "syntax error".to_string()),
            },

            "level" => match args.first().and_then(|a| a.parse::<u32>().ok()) {
                Some(level) if level > 0 => {
                    self.engine.set_playouts(10_000 * level);
                    (true, String::new())
                }
                _ => (false, "syntax error".to_string()),
            },

            "time_settings" => {
                let nums: Vec<u64> = args.iter().filter_map(|a| a.parse().ok()).collect();
                if nums.len() >= 3 {
                    self.engine.set_times(nums[0], nums[1], nums[2]);
                    (true, String::new())
                } else {
                    (false, "syntax error".to_string())
                }
            }

            "kgs-time_settings" => {
                let nums: Vec<u64> = args.iter().filter_map(|a| a.parse().ok()).collect();
                match args.first().copied() {
                    Some("byoyomi") | Some("canadian") if nums.len() >= 3 => {
                        self.engine.set_times(nums[0], nums[1], nums[2]);
                        (true, String::new())
                    }
                    Some("absolute") if !nums.is_empty() => {
                        self.engine.set_times(nums[0], 0, 0);
                        (true, String::new())
                    }
                    Some("none") => {
                        self.engine.set_times(30, 0, 0);
                        (true, String::new())
                    }
                    _ => (false, "syntax error".to_string()),
                }
            }

            "time_left" => {
                let nums: Vec<u64> = args.iter().filter_map(|a| a.parse().ok()).collect();
                if args.len() >= 3 && nums.len() >= 2 {
                    self.engine.set_time_left(nums[0], nums[1]);
                    (true, String::new())
                } else {
                    (false, "syntax error".to_string())
                }
            }

            "final_score" => {
                let score = self.engine.score(None);
                if score > 0.0 {
                    (true, format!("B+{score}"))
                } else {
                    (true, format!("W+{}", -score))
                }
            }

            "final_status_list" => match args.first().copied() {
                Some("dead") => {
                    let mut dead = Vec::new();
                    self.engine.score(Some(&mut dead));
                    let list: Vec<String> =
                        dead.iter().map(|&p| self.format_vertex(p)).collect();
                    (true, list.join("\n"))
                }
                _ => (false, "syntax error".to_string()),
            },

            "showboard" => (true, format!("\n{}", self.engine.board())),

            _ => (false, "unknown command".to_string()),
        }
    }

    /// Generate, commit, and report a move for `color`, synchronizing the
    /// side to move with an artificial pass when the controller asks out
    /// of turn.
    fn genmove(&mut self, color: Color) -> (bool, String) {
        if color != self.engine.board().side() {
            if self.engine.play_move(PASS, color.opponent()).is_err() {
                return (false, "cannot synchronize side to move".to_string());
            }
            self.engine.report_move(PASS);
        }
        match self.engine.generate_move(self.early_pass) {
            GenMove::Resign => (true, "resign".to_string()),
            GenMove::Pass => match self.engine.play_move(PASS, color) {
                Ok(()) => {
                    self.engine.report_move(PASS);
                    (true, "pass".to_string())
                }
                Err(_) => (false, "illegal move".to_string()),
            },
            GenMove::Play(p) => match self.engine.play_move(p, color) {
                Ok(()) => {
                    self.engine.report_move(p);
                    (true, self.format_vertex(p))
                }
                Err(_) => (false, "illegal move".to_string()),
            },
        }
    }

    /// "D4" or "pass" to a point, on the current board size.
    fn parse_vertex(&self, s: &str) -> Option<Point> {
        if s.eq_ignore_ascii_case("pass") {
            return Some(PASS);
        }
        let size = self.engine.board().size();
        let mut chars = s.chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let col = COORDINATES[..size].iter().position(|&c| c == letter)?;
        let row: usize = chars.as_str().parse().ok()?;
        if row == 0 || row > size {
            return None;
        }
        Some((row - 1) * size + col + 1)
    }

    /// A point back to its vertex string.
    fn format_vertex(&self, p: Point) -> String {
        if p == PASS {
            return "pass".to_string();
        }
        let size = self.engine.board().size();
        let col = (p - 1) % size;
        let row = (p - 1) / size + 1;
        format!("{}{row}", COORDINATES[col])
    }
}

fn parse_color(s: &str) -> Option<Color> {
    if s.eq_ignore_ascii_case("black") || s.eq_ignore_ascii_case("b") {
        Some(Color::Black)
    } else if s.eq_ignore_ascii_case("white") || s.eq_ignore_ascii_case("w") {
        Some(Color::White)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GtpSession {
        let mut engine = Engine::with_seed(17);
        engine.set_playouts(20);
        GtpSession::new(engine)
    }

    #[test]
    fn parse_id_with_and_without() {
        assert_eq!(GtpSession::parse_id("12 name"), (Some(12), "name"));
        assert_eq!(GtpSession::parse_id("name"), (None, "name"));
    }

    #[test]
    fn administrative_commands() {
        let mut gtp = session();
        assert_eq!(gtp.execute("protocol_version", &[]), (true, "2".into()));
        let (ok, name) = gtp.execute("name", &[]);
        assert!(ok && !name.is_empty());
        assert_eq!(gtp.execute("known_command", &["play"]), (true, "true".into()));
        assert_eq!(
            gtp.execute("known_command", &["frobnicate"]),
            (true, "false".into())
        );
        let (ok, list) = gtp.execute("list_commands", &[]);
        assert!(ok && list.contains("genmove"));
    }

    #[test]
    fn vertex_roundtrip_skips_i() {
        let gtp = session();
        let p = gtp.parse_vertex("J9").unwrap();
        assert_eq!(gtp.format_vertex(p), "J9");
        // 'I' is not a column.
        assert!(gtp.parse_vertex("I5").is_none());
        assert_eq!(gtp.parse_vertex("pass"), Some(PASS));
        assert!(gtp.parse_vertex("A10").is_none());
    }

    #[test]
    fn boardsize_and_clear() {
        let mut gtp = session();
        assert!(gtp.execute("boardsize", &["13"]).0);
        assert_eq!(gtp.engine.board().size(), 13);
        assert!(!gtp.execute("boardsize", &["25"]).0);
        assert_eq!(gtp.engine.board().size(), 13);
        assert!(gtp.execute("clear_board", &[]).0);
    }

    #[test]
    fn play_rejects_illegal() {
        let mut gtp = session();
        assert!(gtp.execute("play", &["black", "D4"]).0);
        let (ok, msg) = gtp.execute("play", &["white", "D4"]);
        assert!(!ok);
        assert_eq!(msg, "illegal move");
        assert!(!gtp.execute("play", &["purple", "D4"]).0);
    }

    #[test]
    fn genmove_answers_with_a_vertex() {
        let mut gtp = session();
        let (ok, reply) = gtp.execute("genmove", &["b"]);
        assert!(ok);
        assert!(
            reply == "pass" || reply == "resign" || gtp.parse_vertex(&reply).is_some(),
            "unexpected genmove reply {reply}"
        );
    }

    #[test]
    fn komi_is_applied() {
        let mut gtp = session();
        assert!(gtp.execute("komi", &["6.5"]).0);
        assert_eq!(gtp.engine.board().komi(), 6.5);
        assert!(!gtp.execute("komi", &[]).0);
    }

    #[test]
    fn fixed_handicap_validates_range() {
        let mut gtp = session();
        assert!(gtp.execute("fixed_handicap", &["4"]).0);
        assert!(!gtp.execute("fixed_handicap", &["1"]).0);
        assert!(!gtp.execute("fixed_handicap", &["10"]).0);
    }
}
