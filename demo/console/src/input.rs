// Typed commands
use sentinel_core::NodeRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Select(String),
    Pause,
    Add,
    Edit(NodeRecord),
    Set(FormField, String),
    Save,
    Close,
    Escape,
    Delete(String),
    Show,
    Logs(usize),
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Url,
    Token,
}

pub const HELP: &str = "\
commands:
  select <url>                     switch the node the views show
  pause                            pause or resume the log stream
  add                              open the node form for a new node
  edit <id> <name> <url> [token]   open the node form for an existing node
  set name|url|token [value]       fill a form field
  save                             submit the node form
  close                            hide the node form
  esc                              close the inspector and the node form
  delete <id>                      delete a node (asks first)
  show                             print the current views
  logs [n]                         print the last n log lines
  quit";

/// Parse one typed line; `Err` carries the message to print
pub fn parse(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Err(String::new());
    };
    let rest: Vec<&str> = words.collect();

    match (command, rest.as_slice()) {
        ("select", [url]) => Ok(Input::Select(url.to_string())),
        ("pause" | "resume", []) => Ok(Input::Pause),
        ("add", []) => Ok(Input::Add),
        ("edit", [id, name, url, token @ ..]) if token.len() <= 1 => {
            Ok(Input::Edit(NodeRecord::from_form(
                id,
                name,
                url,
                token.first().copied().unwrap_or_default(),
            )))
        }
        ("set", [field, value @ ..]) => {
            let field = match *field {
                "name" => FormField::Name,
                "url" => FormField::Url,
                "token" => FormField::Token,
                other => return Err(format!("unknown field '{}'", other)),
            };
            Ok(Input::Set(field, value.join(" ")))
        }
        ("save", []) => Ok(Input::Save),
        ("close", []) => Ok(Input::Close),
        ("esc" | "escape", []) => Ok(Input::Escape),
        ("delete", [id]) => Ok(Input::Delete(id.to_string())),
        ("show", []) => Ok(Input::Show),
        ("logs", []) => Ok(Input::Logs(20)),
        ("logs", [n]) => n
            .parse()
            .map(Input::Logs)
            .map_err(|_| format!("not a line count: '{}'", n)),
        ("help" | "?", []) => Ok(Input::Help),
        ("quit" | "exit", []) => Ok(Input::Quit),
        _ => Err(format!("unrecognized command '{}', try 'help'", line.trim())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse("select http://10.0.0.7:3001"),
            Ok(Input::Select("http://10.0.0.7:3001".to_string()))
        );
        assert_eq!(parse("  pause "), Ok(Input::Pause));
        assert_eq!(
            parse("set name web front"),
            Ok(Input::Set(FormField::Name, "web front".to_string()))
        );
        assert_eq!(parse("set token"), Ok(Input::Set(FormField::Token, String::new())));
        assert_eq!(parse("logs 5"), Ok(Input::Logs(5)));
        assert!(parse("logs many").is_err());
        assert!(parse("set colour red").is_err());
    }

    #[test]
    fn edit_token_is_optional() {
        let Ok(Input::Edit(record)) = parse("edit n1 db http://db:3001") else {
            panic!("expected edit");
        };
        assert_eq!(record.token, None);

        let Ok(Input::Edit(record)) = parse("edit n1 db http://db:3001 s3cret") else {
            panic!("expected edit");
        };
        assert_eq!(record.token.as_deref(), Some("s3cret"));
    }
}
