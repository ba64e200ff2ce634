//! The interactive command loop.
//!
//! Each input line is split into words and parsed as a clap subcommand, so any
//! unambiguous prefix of a command name works (`su` for `summary`). Commands
//! that take a player resolve it by initials and ask when several match.

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser, Subcommand};
use crossterm::style::Stylize;
use itertools::Itertools;
use rollcall::{Ledger, PlayerId, PlayerPatch};
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rollcall", no_binary_name = true, infer_subcommands = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending data migrations
    Fix,
    /// List players whose initials match
    Lookup { query: String },
    /// Add a player joining on the current day
    Add {
        name: String,
        level: u32,
        /// Derived from the name when omitted
        initials: Option<String>,
    },
    /// Record that a player left on the current day
    #[command(alias = "rm")]
    Remove { player: String },
    /// Change player fields, e.g. `edit zw level=3 title=`
    Edit {
        player: String,
        #[arg(required = true, value_name = "FIELD=VALUE")]
        changes: Vec<String>,
    },
    /// Move to another day (YYYY-MM-DD or "today")
    #[command(alias = "date")]
    SetCurrentDate { date: String },
    /// Show the day being edited
    GetCurrentDate,
    /// Mark players present on the current day
    Mark {
        #[arg(required = true)]
        players: Vec<String>,
    },
    /// Remove presence marks on the current day
    Unmark {
        #[arg(required = true)]
        players: Vec<String>,
    },
    /// Add a warning to a player
    Warn { player: String },
    /// Take a warning away from a player
    Unwarn { player: String },
    /// Flag the current day as completed
    Complete,
    /// Attendance on the current day
    Summary,
    /// Players ranked by absences
    Lazy,
    /// Show a player record
    Player { player: String },
    /// Write the ledger to disk
    Save,
    /// Save and leave
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// Splits a command line on whitespace, keeping quoted runs together.
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote = None;

    for c in line.chars() {
        match quote {
            Some(open) if c == open => quote = None,
            Some(_) => word.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            None => {
                word.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        bail!("Unterminated quote in {:?}", line.trim());
    }
    if in_word {
        words.push(word);
    }
    Ok(words)
}

fn available_commands() -> String {
    Line::command()
        .get_subcommands()
        .map(|command| command.get_name())
        .join(", ")
}

pub struct Shell<R, W> {
    ledger: Ledger,
    data_dir: PathBuf,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(ledger: Ledger, data_dir: PathBuf, input: R, out: W) -> Self {
        Self {
            ledger,
            data_dir,
            input,
            out,
        }
    }

    #[cfg(test)]
    fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn save(&self) -> Result<()> {
        self.ledger.save(&self.data_dir)?;
        Ok(())
    }

    /// Prompts until `quit` or end of input, then saves.
    pub fn run(&mut self) -> Result<()> {
        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            match self.execute(&line) {
                Ok(Outcome::Quit) => break,
                Ok(Outcome::Continue) => {}
                Err(err) => writeln!(self.out, "{}", format!("{:#}", err).red())?,
            }
        }
        self.save()
    }

    fn read_answer(&mut self) -> Result<Option<String>> {
        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Ok(None);
        }
        Ok(Some(answer.trim().to_string()))
    }

    /// Resolves typed initials to a single player, asking when ambiguous.
    fn resolve(&mut self, query: &str) -> Result<Option<PlayerId>> {
        let candidates: Vec<(PlayerId, String)> = self
            .ledger
            .lookup(query)
            .into_iter()
            .map(|player| (player.id, player.to_string()))
            .collect();

        match candidates.as_slice() {
            [] => {
                writeln!(self.out, "Failed to find player {:?}", query)?;
                Ok(None)
            }
            [(id, _)] => Ok(Some(*id)),
            _ => self.choose(&candidates),
        }
    }

    fn choose(&mut self, candidates: &[(PlayerId, String)]) -> Result<Option<PlayerId>> {
        writeln!(self.out, "Choose player:")?;
        for (i, (_, label)) in candidates.iter().enumerate() {
            writeln!(self.out, "  {}) {}", i + 1, label)?;
        }
        loop {
            write!(self.out, "[1-{}, enter for 1, q to cancel] ", candidates.len())?;
            self.out.flush()?;
            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            match answer.as_str() {
                "" => return Ok(Some(candidates[0].0)),
                "q" => return Ok(None),
                text => match text.parse::<usize>() {
                    Ok(n) if (1..=candidates.len()).contains(&n) => {
                        return Ok(Some(candidates[n - 1].0))
                    }
                    _ => writeln!(self.out, "Invalid choice {:?}", text)?,
                },
            }
        }
    }

    fn label(&self, id: PlayerId) -> String {
        self.ledger
            .player(id)
            .map_or_else(|| format!("#{}", id), |player| player.to_string())
    }

    pub fn execute(&mut self, line: &str) -> Result<Outcome> {
        let words = split_words(line)?;
        let command = match Line::try_parse_from(&words) {
            Ok(line) => line.command,
            Err(err) => {
                write!(self.out, "{}", err)?;
                if err.kind() == clap::error::ErrorKind::InvalidSubcommand {
                    writeln!(self.out, "Available commands: {}", available_commands())?;
                }
                return Ok(Outcome::Continue);
            }
        };
        log::debug!("Running {:?}", command);

        match command {
            Command::Fix => {
                let applied = self.ledger.fix();
                if applied.is_empty() {
                    writeln!(self.out, "Nothing to fix")?;
                } else {
                    writeln!(self.out, "Applied migrations: {}", applied.join(", "))?;
                }
            }
            Command::Lookup { query } => {
                let found = self.ledger.lookup(&query);
                if found.is_empty() {
                    writeln!(self.out, "No player matches {:?}", query)?;
                }
                for player in found {
                    writeln!(self.out, "{:>4} {:<8} {}", player.id, player.initials, player)?;
                }
            }
            Command::Add {
                name,
                level,
                initials,
            } => {
                let id = self.ledger.add(&name, level, initials.as_deref());
                writeln!(self.out, "Added {} as #{}", self.label(id), id)?;
            }
            Command::Remove { player } => {
                if let Some(id) = self.resolve(&player)? {
                    self.ledger.remove(id)?;
                    writeln!(self.out, "{} has left", self.label(id))?;
                }
            }
            Command::Edit { player, changes } => {
                let patch = PlayerPatch::from_pairs(&changes)?;
                if let Some(id) = self.resolve(&player)? {
                    self.ledger.edit(id, &patch)?;
                    writeln!(self.out, "Updated {}", self.label(id))?;
                }
            }
            Command::SetCurrentDate { date } => {
                self.ledger.set_current_date(&date)?;
                writeln!(self.out, "Editing {}", self.ledger.current_date()?)?;
            }
            Command::GetCurrentDate => {
                writeln!(self.out, "{}", self.ledger.current_date()?)?;
            }
            Command::Mark { players } => {
                for query in players {
                    if let Some(id) = self.resolve(&query)? {
                        self.ledger.mark(id)?;
                        writeln!(self.out, "{} present", self.label(id))?;
                    }
                }
            }
            Command::Unmark { players } => {
                for query in players {
                    if let Some(id) = self.resolve(&query)? {
                        if self.ledger.unmark(id)? {
                            writeln!(self.out, "{} unmarked", self.label(id))?;
                        } else {
                            writeln!(self.out, "{} was not marked", self.label(id))?;
                        }
                    }
                }
            }
            Command::Warn { player } => {
                if let Some(id) = self.resolve(&player)? {
                    let count = self.ledger.warn(id)?;
                    writeln!(self.out, "{} has {} warning(s)", self.label(id), count)?;
                }
            }
            Command::Unwarn { player } => {
                if let Some(id) = self.resolve(&player)? {
                    let count = self.ledger.unwarn(id)?;
                    writeln!(self.out, "{} has {} warning(s)", self.label(id), count)?;
                }
            }
            Command::Complete => {
                self.ledger.complete();
                writeln!(self.out, "{} completed", self.ledger.current_date()?)?;
            }
            Command::Summary => self.print_summary()?,
            Command::Lazy => self.print_lazy()?,
            Command::Player { player } => {
                if let Some(id) = self.resolve(&player)? {
                    if let Some(player) = self.ledger.player(id) {
                        writeln!(self.out, "{}", serde_json::to_string_pretty(player)?)?;
                    }
                }
            }
            Command::Save => {
                self.save()?;
                writeln!(self.out, "Saved to {}", self.data_dir.display())?;
            }
            Command::Quit => return Ok(Outcome::Quit),
        }
        Ok(Outcome::Continue)
    }

    fn print_summary(&mut self) -> Result<()> {
        let summary = self.ledger.summary()?;
        let status = if summary.completed {
            "completed".green()
        } else {
            "failed".red()
        };
        writeln!(
            self.out,
            "{} status {} {}/{}",
            summary.date, status, summary.present_count, summary.total_eligible
        )?;
        writeln!(self.out, "Lazy players:")?;
        for player in &summary.lazy_players {
            writeln!(self.out, "{}", player)?;
        }
        Ok(())
    }

    fn print_lazy(&mut self) -> Result<()> {
        let ranking = self.ledger.lazy_ranking();
        writeln!(self.out, "{}/{}/{}\tScore\tPlayer", "M".red(), "L".yellow(), "T".green())?;
        for entry in ranking.iter() {
            writeln!(
                self.out,
                "{}/{}/{}\t{:.2}\t{}",
                entry.missed_days.to_string().red(),
                entry.layback_days.to_string().yellow(),
                entry.total_days.to_string().green(),
                entry.score,
                entry.player
            )?;
        }
        Ok(())
    }
}
