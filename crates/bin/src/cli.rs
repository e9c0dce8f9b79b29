//! Command line parsing.

use protocol::templates::TEMPLATE_KEYS;

pub const USAGE: &str = "usage: orbview [watch | launch <template> | templates]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Follow the stream without starting anything.
    Watch,
    /// Start a preset once the session is up, then follow the stream.
    Launch { template: String },
    /// Print the available presets.
    Templates,
}

impl Command {
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, String> {
        let mut args = args.into_iter();
        let command = match args.next().as_deref() {
            None | Some("watch") => Command::Watch,
            Some("templates") => Command::Templates,
            Some("launch") => {
                let template = args.next().unwrap_or_else(|| "default".to_string());
                if !TEMPLATE_KEYS.contains(&template.as_str()) {
                    return Err(format!(
                        "unknown template {:?}, expected one of: {}",
                        template,
                        TEMPLATE_KEYS.join(", ")
                    ));
                }
                Command::Launch { template }
            }
            Some(other) => return Err(format!("unknown command {:?}\n{}", other, USAGE)),
        };
        if let Some(extra) = args.next() {
            return Err(format!("unexpected argument {:?}\n{}", extra, USAGE));
        }
        Ok(command)
    }
}

/// Key events typed on stdin: `+w` presses, `-w` releases.
pub fn parse_key_line(line: &str) -> Option<(String, bool)> {
    let line = line.trim();
    let (pressed, key) = if let Some(key) = line.strip_prefix('+') {
        (true, key)
    } else if let Some(key) = line.strip_prefix('-') {
        (false, key)
    } else {
        return None;
    };
    let key = key.trim();
    (!key.is_empty()).then(|| (key.to_string(), pressed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_commands() {
        assert_eq!(Command::parse(args(&[])), Ok(Command::Watch));
        assert_eq!(Command::parse(args(&["watch"])), Ok(Command::Watch));
        assert_eq!(Command::parse(args(&["templates"])), Ok(Command::Templates));
        assert_eq!(
            Command::parse(args(&["launch", "binary-stars"])),
            Ok(Command::Launch {
                template: "binary-stars".to_string()
            })
        );
        assert_eq!(
            Command::parse(args(&["launch"])),
            Ok(Command::Launch {
                template: "default".to_string()
            })
        );
    }

    #[test]
    fn test_bad_commands() {
        assert!(Command::parse(args(&["launch", "galaxy"])).is_err());
        assert!(Command::parse(args(&["fly"])).is_err());
        assert!(Command::parse(args(&["watch", "extra"])).is_err());
    }

    #[test]
    fn test_key_lines() {
        assert_eq!(parse_key_line("+w"), Some(("w".to_string(), true)));
        assert_eq!(parse_key_line(" -D \n"), Some(("D".to_string(), false)));
        assert_eq!(parse_key_line("w"), None);
        assert_eq!(parse_key_line("+"), None);
    }
}
