//! Line-oriented operator commands.

use anyhow::{bail, Result};
use gate_core::{FlagField, TextField};
use shared::domain::{LaneFilter, LaneId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Lanes(LaneFilter),
    Select(LaneId),
    Show,
    Open,
    Set { field: TextField, value: String },
    Flag { flag: FlagField, on: bool },
    Reset,
    Cancel,
    Submit,
    Acknowledge,
    Retry,
    Dismiss,
    Search { truck_plate: String, container_no: String },
    History(String),
    Snapshot,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  lanes [all|inbound|outbound|<lane>]   list the lane board
  select <lane>                          show a lane's reconciliation
  show                                   reprint the current view
  open                                   open the correction form
  set <field> <value>                    bic, cont, trailer, truck, iso, vgm
  flag <flag> on|off                     standard, stickers, passgate
  reset | cancel | submit | ok           correction workflow
  retry | dismiss                        handle a failed TOS sync
  search [truck=<plate>] [cont=<no>]     override the current capture
  history [query]                        committed corrections, newest first
  snapshot                               dashboard state as JSON
  quit";

impl ConsoleCommand {
    /// `Ok(None)` for blank lines and `#` comments.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "lanes" => ConsoleCommand::Lanes(LaneFilter::parse(rest)),
            "select" => {
                if rest.is_empty() {
                    bail!("usage: select <lane>");
                }
                ConsoleCommand::Select(LaneId::new(rest))
            }
            "show" => ConsoleCommand::Show,
            "open" | "edit" => ConsoleCommand::Open,
            "set" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if field.is_empty() {
                    bail!("usage: set <field> <value>");
                }
                let field = field.parse::<TextField>()?;
                ConsoleCommand::Set {
                    field,
                    value: value.trim().to_string(),
                }
            }
            "flag" => {
                let mut parts = rest.split_whitespace();
                let (Some(flag), Some(state), None) = (parts.next(), parts.next(), parts.next())
                else {
                    bail!("usage: flag <flag> on|off");
                };
                let flag = flag.parse::<FlagField>()?;
                ConsoleCommand::Flag {
                    flag,
                    on: parse_switch(state)?,
                }
            }
            "reset" => ConsoleCommand::Reset,
            "cancel" => ConsoleCommand::Cancel,
            "submit" => ConsoleCommand::Submit,
            "ok" | "ack" => ConsoleCommand::Acknowledge,
            "retry" => ConsoleCommand::Retry,
            "dismiss" => ConsoleCommand::Dismiss,
            "search" => parse_search(rest)?,
            "history" => ConsoleCommand::History(rest.to_string()),
            "snapshot" => ConsoleCommand::Snapshot,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => bail!("unknown command '{other}' (try 'help')"),
        };
        Ok(Some(command))
    }
}

fn parse_switch(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => bail!("expected on|off, got '{other}'"),
    }
}

fn parse_search(rest: &str) -> Result<ConsoleCommand> {
    let mut truck_plate = String::new();
    let mut container_no = String::new();
    for part in rest.split_whitespace() {
        match part.split_once('=') {
            Some(("truck", value)) => truck_plate = value.to_string(),
            Some(("cont", value)) | Some(("container", value)) => {
                container_no = value.to_string()
            }
            _ => bail!("usage: search [truck=<plate>] [cont=<no>]"),
        }
    }
    Ok(ConsoleCommand::Search {
        truck_plate,
        container_no,
    })
}
