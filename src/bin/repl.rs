use std::cell::RefCell;
use std::rc::Rc;

use lilt::Evaluator;
use lilt::lexer::{TokenKind, keywords, tokenize};
use lilt::parser::parse_str;
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{Helper, Highlighter, Hinter, Validator};

struct LiltCompleter {
    evaluator: Rc<RefCell<Evaluator>>,
}

impl LiltCompleter {
    fn new(evaluator: Rc<RefCell<Evaluator>>) -> Self {
        LiltCompleter { evaluator }
    }
}

impl rustyline::completion::Completer for LiltCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok((
            pos,
            match tokenize(&line[..pos]) {
                Ok(tokens) => {
                    let last = tokens.iter().rev().find(|t| t.kind != TokenKind::EndOfFile);
                    if let Some(token) = last.filter(|t| t.kind == TokenKind::Identifier) {
                        let prefix = token.text.as_str();
                        self.evaluator
                            .borrow()
                            .environment()
                            .identifiers()
                            .union(&keywords())
                            .filter_map(|id| {
                                if id.starts_with(prefix) {
                                    Some(id[prefix.len()..].to_string())
                                } else {
                                    None
                                }
                            })
                            .collect()
                    } else {
                        vec![]
                    }
                }
                Err(_) => vec![],
            },
        ))
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct InputValidator {
    #[rustyline(Validator)]
    validator: LiltValidator,
    #[rustyline(Highlighter)]
    highlighter: LiltHighlighter,
    #[rustyline(Completer)]
    completer: LiltCompleter,
}

struct LiltValidator;

impl Validator for LiltValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let input = ctx.input();
        let mut stack = Vec::new();
        let mut in_string = false;

        // Strings have no escape sequences; the next quote always closes.
        for (i, c) in input.chars().enumerate() {
            if in_string {
                if c == '"' {
                    in_string = false;
                }
                continue;
            }

            match c {
                '"' => {
                    in_string = true;
                }
                '(' | '{' => {
                    stack.push((c, i));
                }
                ')' | '}' => {
                    if let Some((opening, _)) = stack.pop() {
                        if !((opening == '(' && c == ')') || (opening == '{' && c == '}')) {
                            return Ok(ValidationResult::Invalid(Some(format!(
                                "  - Unmatched '{}' at position {}",
                                c, i
                            ))));
                        }
                    } else {
                        return Ok(ValidationResult::Invalid(Some(format!(
                            "  - Unmatched '{}' at position {}",
                            c, i
                        ))));
                    }
                }
                _ => {}
            }
        }

        if in_string || !stack.is_empty() {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

struct LiltHighlighter;

impl Highlighter for LiltHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> std::borrow::Cow<'l, str> {
        let mut stack: Vec<(char, usize)> = Vec::new();
        let mut highlighted = String::new();
        let mut in_string = false;

        for (i, c) in line.chars().enumerate() {
            if in_string {
                if c == '"' {
                    in_string = false;
                }
                highlighted.push_str(&format!("\x1b[32m{}\x1b[0m", c)); // Green for strings
                continue;
            }

            match c {
                '"' => {
                    in_string = true;
                    highlighted.push_str(&format!("\x1b[32m{}\x1b[0m", c)); // Green for strings
                }
                '(' | '{' => {
                    stack.push((c, highlighted.len()));
                    highlighted.push(c);
                }
                ')' | '}' => {
                    if let Some((opening, matching_pos)) = stack.pop() {
                        if (opening == '(' && c == ')') || (opening == '{' && c == '}') {
                            if matching_pos == pos - 1 || i == pos - 1 {
                                highlighted.push_str(&format!("\x1b[34m{}\x1b[0m", c)); // Blue for matching brackets
                                highlighted.replace_range(
                                    matching_pos..=matching_pos,
                                    &format!("\x1b[1;34m{}\x1b[0m", opening as char),
                                );
                            } else {
                                highlighted.push(c);
                            }
                        } else {
                            highlighted.push_str(&format!("\x1b[31m{}\x1b[0m", c)); // Red for unmatched closing brackets
                            highlighted.replace_range(
                                matching_pos..=matching_pos,
                                &format!("\x1b[1;31m{}\x1b[0m", opening as char),
                            );
                        }
                    } else {
                        highlighted.push_str(&format!("\x1b[31m{}\x1b[0m", c)); // Red for unmatched closing brackets
                    }
                }
                _ => {
                    highlighted.push(c);
                }
            }
        }

        std::borrow::Cow::Owned(highlighted)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn main() -> rustyline::Result<()> {
    println!("Lilt REPL v0.1.0");
    println!("Type 'exit' or press Ctrl-D to quit.");

    let evaluator = Rc::new(RefCell::new(Evaluator::new()));
    let h = InputValidator {
        highlighter: LiltHighlighter,
        validator: LiltValidator,
        completer: LiltCompleter::new(evaluator.clone()),
    };
    let config = rustyline::config::Config::builder()
        .edit_mode(rustyline::EditMode::Vi)
        .build();
    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(h));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if rl.load_history("lilt_history.txt").is_err() {
        println!("No previous history.");
    }

    loop {
        let readline = rl.readline("lilt> ");
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let trimmed_input = line.trim();
                if trimmed_input.is_empty() {
                    continue;
                }
                if trimmed_input.eq_ignore_ascii_case("exit") {
                    break;
                }

                match parse_str(trimmed_input) {
                    Ok(program) => {
                        // Bindings persist across lines on the shared evaluator
                        match evaluator.borrow_mut().evaluate(&program) {
                            Ok(value) => println!("{}", value),
                            Err(e) => e.pretty_print(trimmed_input),
                        }
                    }
                    Err(e) => e.pretty_print(trimmed_input),
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                println!("\nExiting.");
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }
    rl.save_history("lilt_history.txt")
}
