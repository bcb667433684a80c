/// A user action on the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(String),
    Open(String),
    SetStart,
    SetEnd,
    ClearA,
    ClearB,
    JumpA,
    JumpB,
    ToggleLoop,
    AddBreakpoint,
    SetBreakpointTime(String),
    JumpToBreakpoint(String),
    /// `name` is `None` when the rename prompt was cancelled
    Rename { id: String, name: Option<String> },
    Delete(String),
    Speed(f64),
    Play,
    Pause,
    Show,
    Quit,
}

impl Command {
    /// Parse one line of the interactive front end.
    ///
    /// Expected format: `<verb> [argument...]`
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "" => Err("Empty command".to_string()),
            "load" => Ok(Command::Load(Self::argument(verb, rest)?)),
            "open" => Ok(Command::Open(Self::argument(verb, rest)?)),
            "a" => Self::bare(Command::SetStart, verb, rest),
            "b" => Self::bare(Command::SetEnd, verb, rest),
            "clear" => match Self::marker(verb, rest)? {
                'a' => Ok(Command::ClearA),
                _ => Ok(Command::ClearB),
            },
            "jump" => match Self::marker(verb, rest)? {
                'a' => Ok(Command::JumpA),
                _ => Ok(Command::JumpB),
            },
            "loop" => Self::bare(Command::ToggleLoop, verb, rest),
            "add" => Self::bare(Command::AddBreakpoint, verb, rest),
            "set" => Ok(Command::SetBreakpointTime(Self::argument(verb, rest)?)),
            "go" => Ok(Command::JumpToBreakpoint(Self::argument(verb, rest)?)),
            "rename" => {
                let rest = Self::argument(verb, rest)?;
                let (id, name) = match rest.split_once(char::is_whitespace) {
                    Some((id, name)) => (id.to_string(), Some(name.trim().to_string())),
                    None => (rest, None),
                };
                Ok(Command::Rename { id, name })
            }
            "delete" => Ok(Command::Delete(Self::argument(verb, rest)?)),
            "speed" => {
                let rate = Self::argument(verb, rest)?;
                let rate = rate
                    .trim_end_matches(['x', 'X'])
                    .parse::<f64>()
                    .map_err(|e| format!("Invalid rate '{}': {}", rate, e))?;
                Ok(Command::Speed(rate))
            }
            "play" => Self::bare(Command::Play, verb, rest),
            "pause" => Self::bare(Command::Pause, verb, rest),
            "show" => Self::bare(Command::Show, verb, rest),
            "quit" | "exit" => Self::bare(Command::Quit, verb, rest),
            _ => Err(format!("Unknown command '{}'", verb)),
        }
    }

    fn bare(command: Command, verb: &str, rest: &str) -> Result<Self, String> {
        if !rest.is_empty() {
            return Err(format!("'{}' takes no argument", verb));
        }
        Ok(command)
    }

    fn argument(verb: &str, rest: &str) -> Result<String, String> {
        if rest.is_empty() {
            return Err(format!("'{}' needs an argument", verb));
        }
        Ok(rest.to_string())
    }

    fn marker(verb: &str, rest: &str) -> Result<char, String> {
        match rest.to_ascii_lowercase().as_str() {
            "a" => Ok('a'),
            "b" => Ok('b'),
            _ => Err(format!("'{}' expects 'a' or 'b', got '{}'", verb, rest)),
        }
    }
}
