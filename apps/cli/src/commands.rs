//! Line commands read from stdin

use std::str::FromStr;

use tunedeck_discovery_client::{Decision, Filters};
use tunedeck_session::gesture::SwipeGesture;

/// A parsed terminal command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch with new filters; `None` reuses the startup filters
    Next(Option<Filters>),
    Decide(Decision),
    /// Raw pan values, resolved through the gesture thresholds
    Swipe(SwipeGesture),
    Undo,
    Status,
    /// Set or clear the active playlist
    Playlist(Option<String>),
    Mute(bool),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("Invalid argument for {command}: {argument}")]
    InvalidArgument { command: String, argument: String },
}

pub const HELP: &str = "\
commands:
  next [genre=<g>] [lang=<l>]   fetch a recommendation
  like | dislike | skip         decide on the current track
  swipe <dx> <dy> [vx]          decide through a pan gesture
  undo                          go back to the previous track
  status                        print the session state
  playlist [<id>]               set or clear the active playlist
  mute | unmute                 toggle preview audio
  quit                          exit";

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(ParseError::Empty)?.to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        let invalid = |argument: &str| ParseError::InvalidArgument {
            command: name.clone(),
            argument: argument.to_string(),
        };

        match name.as_str() {
            "next" | "n" => {
                if args.is_empty() {
                    return Ok(Command::Next(None));
                }
                let mut filters = Filters::new();
                for arg in &args {
                    filters = match arg.split_once('=') {
                        Some(("genre" | "g", value)) => filters.genre(value),
                        Some(("lang" | "l", value)) => filters.language(value),
                        _ => return Err(invalid(arg)),
                    };
                }
                Ok(Command::Next(Some(filters)))
            }
            "like" | "dislike" | "skip" => {
                let decision = name.parse().map_err(|_| invalid(&name))?;
                Ok(Command::Decide(decision))
            }
            "l" => Ok(Command::Decide(Decision::Like)),
            "d" => Ok(Command::Decide(Decision::Dislike)),
            "s" => Ok(Command::Decide(Decision::Skip)),
            "swipe" => {
                let values = args
                    .iter()
                    .map(|a| a.parse::<f32>().map_err(|_| invalid(a)))
                    .collect::<Result<Vec<_>, _>>()?;
                match values.as_slice() {
                    [dx, dy] => Ok(Command::Swipe(SwipeGesture {
                        translation_x: *dx,
                        translation_y: *dy,
                        velocity_x: 0.0,
                    })),
                    [dx, dy, vx] => Ok(Command::Swipe(SwipeGesture {
                        translation_x: *dx,
                        translation_y: *dy,
                        velocity_x: *vx,
                    })),
                    _ => Err(invalid(&args.join(" "))),
                }
            }
            "undo" | "u" => Ok(Command::Undo),
            "status" => Ok(Command::Status),
            "playlist" => match args.as_slice() {
                [] => Ok(Command::Playlist(None)),
                [id] => Ok(Command::Playlist(Some(id.to_string()))),
                _ => Err(invalid(&args.join(" "))),
            },
            "mute" => Ok(Command::Mute(true)),
            "unmute" => Ok(Command::Mute(false)),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(ParseError::Unknown(name.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_next_with_filters() {
        let command: Command = "next genre=rock lang=en g=jazz".parse().unwrap();
        assert_eq!(
            command,
            Command::Next(Some(
                Filters::new().genre("rock").genre("jazz").language("en")
            ))
        );
        assert_eq!("n".parse::<Command>().unwrap(), Command::Next(None));
    }

    #[test]
    fn test_parse_decisions() {
        assert_eq!("LIKE".parse::<Command>().unwrap(), Command::Decide(Decision::Like));
        assert_eq!("d".parse::<Command>().unwrap(), Command::Decide(Decision::Dislike));
        assert_eq!("  skip  ".parse::<Command>().unwrap(), Command::Decide(Decision::Skip));
    }

    #[test]
    fn test_parse_swipe() {
        assert_matches!(
            "swipe 120 -4".parse::<Command>(),
            Ok(Command::Swipe(g)) if g.translation_x == 120.0 && g.velocity_x == 0.0
        );
        assert_matches!(
            "swipe 10 0 -900".parse::<Command>(),
            Ok(Command::Swipe(g)) if g.velocity_x == -900.0
        );
        assert_matches!(
            "swipe left 0".parse::<Command>(),
            Err(ParseError::InvalidArgument { argument, .. }) if argument == "left"
        );
        assert_matches!("swipe 1".parse::<Command>(), Err(ParseError::InvalidArgument { .. }));
    }

    #[test]
    fn test_parse_playlist() {
        assert_eq!(
            "playlist road-trip".parse::<Command>().unwrap(),
            Command::Playlist(Some("road-trip".to_string()))
        );
        assert_eq!("playlist".parse::<Command>().unwrap(), Command::Playlist(None));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(ParseError::Empty));
        assert_matches!("dance".parse::<Command>(), Err(ParseError::Unknown(name)) if name == "dance");
        assert_matches!(
            "next mood=happy".parse::<Command>(),
            Err(ParseError::InvalidArgument { .. })
        );
    }
}
