//! Line commands typed into the console.

pub const USAGE: &str =
    "commands: list | fetch <order_uid> | create | delete <order_uid> | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    List,
    /// The id is passed through as typed, including empty, so that the
    /// controller rejects it.
    Fetch {
        id: String,
    },
    Create,
    Delete {
        id: String,
    },
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl ConsoleCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ConsoleCommand::List => "list",
            ConsoleCommand::Fetch { .. } => "fetch",
            ConsoleCommand::Create => "create",
            ConsoleCommand::Delete { .. } => "delete",
            ConsoleCommand::Help => "help",
            ConsoleCommand::Quit => "quit",
            ConsoleCommand::Empty => "empty",
            ConsoleCommand::Unknown(_) => "unknown",
        }
    }
}

pub fn parse_command(line: &str) -> ConsoleCommand {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "" => ConsoleCommand::Empty,
        "list" | "ls" => ConsoleCommand::List,
        "fetch" | "get" => ConsoleCommand::Fetch {
            id: rest.to_string(),
        },
        "create" | "new" => ConsoleCommand::Create,
        "delete" | "rm" => ConsoleCommand::Delete {
            id: rest.to_string(),
        },
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        _ => ConsoleCommand::Unknown(verb.to_string()),
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
