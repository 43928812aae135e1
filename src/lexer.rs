use logos::Logos;
use std::collections::HashSet;
use std::fmt;

use crate::Span;
use crate::diagnostic::{Diagnostic, DiagnosticKind};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")] // Skip whitespace
#[logos(error = LexErrorKind)]
pub enum TokenKind {
    #[regex(r"[0-9]+", |lex| {
        let slice = lex.slice();
        slice
            .parse::<f64>()
            .map_err(|_| LexErrorKind::InvalidNumberFormat(slice.to_string()))
    })]
    Number(f64),
    // A string is a raw character copy between two quotes; no escapes. The
    // optional closing quote lets the callback report the unterminated case
    // with a span from the opening quote to the point of failure.
    #[regex(r#""[^"]*"?"#, |lex| {
        let slice = lex.slice();
        if slice.len() < 2 || !slice.ends_with('"') {
            return Err(LexErrorKind::UnterminatedString);
        }
        Ok(slice[1..slice.len() - 1].to_string())
    })]
    StringLiteral(String),
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("++")]
    PlusPlus,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("=")]
    Equals,
    #[token("==")]
    EqualsEquals,
    #[token("!")]
    Bang,
    #[token("!=")]
    BangEquals,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEquals,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEquals,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("let")]
    Let,
    #[token("mut")]
    Mut,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,
    // Catch-all for stray characters (`&`, `|`, `@`, ...). The lexer never
    // fails on these; the parser rejects them by kind.
    #[regex(r".", priority = 0)]
    Unknown,
    // A NUL byte is the end-of-input signal wherever it appears.
    #[token("\0")]
    EndOfFile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

// Implement Display for parser error messages
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::StringLiteral(s) => write!(f, "\"{}\"", s),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::PlusPlus => write!(f, "'++'"),
            TokenKind::AmpAmp => write!(f, "'&&'"),
            TokenKind::PipePipe => write!(f, "'||'"),
            TokenKind::Equals => write!(f, "'='"),
            TokenKind::EqualsEquals => write!(f, "'=='"),
            TokenKind::Bang => write!(f, "'!'"),
            TokenKind::BangEquals => write!(f, "'!='"),
            TokenKind::Less => write!(f, "'<'"),
            TokenKind::LessEquals => write!(f, "'<='"),
            TokenKind::Greater => write!(f, "'>'"),
            TokenKind::GreaterEquals => write!(f, "'>='"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Let => write!(f, "'let'"),
            TokenKind::Mut => write!(f, "'mut'"),
            TokenKind::True => write!(f, "'true'"),
            TokenKind::False => write!(f, "'false'"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Unknown => write!(f, "unknown character"),
            TokenKind::EndOfFile => write!(f, "end of file"),
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
pub enum LexErrorKind {
    UnterminatedString,
    InvalidNumberFormat(String),
    #[default]
    InvalidToken,
}

/// The fixed keyword set, exposed for REPL completion.
pub fn keywords() -> HashSet<String> {
    ["let", "mut", "true", "false", "if", "else"]
        .iter()
        .map(|keyword| keyword.to_string())
        .collect()
}

/// Scans the whole input. The returned sequence is never empty and always
/// ends with exactly one zero-width `EndOfFile` token. The only failure is
/// an unterminated string literal; anything else the grammar does not know
/// degrades to an `Unknown` token for the parser to reject.
pub fn tokenize(input: &str) -> Result<Vec<Token>, Diagnostic> {
    let mut tokens = Vec::new();
    for (result, range) in TokenKind::lexer(input).spanned() {
        let span = Span::new(range.start, range.end);
        match result {
            Ok(TokenKind::EndOfFile) => {
                tokens.push(Token {
                    kind: TokenKind::EndOfFile,
                    text: "\0".to_string(),
                    span: Span::new(span.start, span.start),
                });
                return Ok(tokens);
            }
            Ok(kind) => {
                tokens.push(Token {
                    kind,
                    text: input[span.to_range()].to_string(),
                    span,
                });
            }
            Err(LexErrorKind::UnterminatedString) => {
                return Err(Diagnostic::new(DiagnosticKind::UnterminatedString, span));
            }
            Err(_) => {
                tokens.push(Token {
                    kind: TokenKind::Unknown,
                    text: input[span.to_range()].to_string(),
                    span,
                });
            }
        }
    }
    let end = input.len();
    tokens.push(Token {
        kind: TokenKind::EndOfFile,
        text: "\0".to_string(),
        span: Span::new(end, end),
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Helper to simplify testing token sequences; asserts the EndOfFile
    // invariant on every input, then compares the tokens before it.
    fn assert_tokens(input: &str, expected: Vec<TokenKind>) {
        match tokenize(input) {
            Ok(tokens) => {
                let (last, rest) = tokens.split_last().expect("token stream is never empty");
                assert_eq!(last.kind, TokenKind::EndOfFile, "Input: '{}'", input);
                assert_eq!(last.span.start, last.span.end, "Input: '{}'", input);
                let kinds: Vec<TokenKind> = rest.iter().map(|t| t.kind.clone()).collect();
                assert_eq!(kinds, expected, "Input: '{}'", input);
            }
            Err(e) => panic!("Lexing failed for input '{}': {}", input, e),
        }
    }

    fn assert_unterminated(input: &str, start: usize, end: usize) {
        match tokenize(input) {
            Ok(tokens) => panic!(
                "Expected lexing to fail for input '{}', but got tokens: {:?}",
                input, tokens
            ),
            Err(e) => {
                assert_eq!(e.kind, DiagnosticKind::UnterminatedString, "Input: '{}'", input);
                assert_eq!(e.span, Span::new(start, end), "Input: '{}'", input);
            }
        }
    }

    #[test]
    fn test_empty_input() {
        let tokens = tokenize("").expect("empty input tokenizes");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::EndOfFile);
        assert_eq!(tokens[0].span, Span::new(0, 0));
    }

    #[test]
    fn test_simple_expression() {
        assert_tokens(
            "1 + 2 * 3",
            vec![
                TokenKind::Number(1.0),
                TokenKind::Plus,
                TokenKind::Number(2.0),
                TokenKind::Star,
                TokenKind::Number(3.0),
            ],
        );
    }

    #[test]
    fn test_two_character_operators_match_longest() {
        assert_tokens(
            "== != <= >= && || ++",
            vec![
                TokenKind::EqualsEquals,
                TokenKind::BangEquals,
                TokenKind::LessEquals,
                TokenKind::GreaterEquals,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::PlusPlus,
            ],
        );
        assert_tokens(
            "= ! < > +",
            vec![
                TokenKind::Equals,
                TokenKind::Bang,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Plus,
            ],
        );
    }

    #[test]
    fn test_stray_symbols_become_unknown() {
        assert_tokens("&", vec![TokenKind::Unknown]);
        assert_tokens("|", vec![TokenKind::Unknown]);
        assert_tokens(
            "1 @ 2",
            vec![
                TokenKind::Number(1.0),
                TokenKind::Unknown,
                TokenKind::Number(2.0),
            ],
        );
    }

    #[test]
    fn test_unknown_consumes_one_character() {
        let tokens = tokenize("&foo").expect("should tokenize");
        assert_eq!(tokens[0].kind, TokenKind::Unknown);
        assert_eq!(tokens[0].text, "&");
        assert_eq!(tokens[0].span, Span::new(0, 1));
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].text, "foo");
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_tokens(
            "let mut x true false if else",
            vec![
                TokenKind::Let,
                TokenKind::Mut,
                TokenKind::Identifier,
                TokenKind::True,
                TokenKind::False,
                TokenKind::If,
                TokenKind::Else,
            ],
        );
        // Keyword prefixes are plain identifiers
        assert_tokens("lettuce", vec![TokenKind::Identifier]);
        assert_tokens("if_", vec![TokenKind::Identifier]);
        assert_tokens("truely", vec![TokenKind::Identifier]);
        assert_tokens("_mut", vec![TokenKind::Identifier]);
    }

    #[test]
    fn test_numbers() {
        assert_tokens("123", vec![TokenKind::Number(123.0)]);
        assert_tokens("0", vec![TokenKind::Number(0.0)]);
        let tokens = tokenize("007").expect("should tokenize");
        assert_eq!(tokens[0].kind, TokenKind::Number(7.0));
        assert_eq!(tokens[0].text, "007");
        // No decimal literals; the dot is a stray character
        assert_tokens(
            "1.5",
            vec![
                TokenKind::Number(1.0),
                TokenKind::Unknown,
                TokenKind::Number(5.0),
            ],
        );
    }

    #[test]
    fn test_strings() {
        assert_tokens(
            r#""hello""#,
            vec![TokenKind::StringLiteral("hello".to_string())],
        );
        assert_tokens(r#""""#, vec![TokenKind::StringLiteral(String::new())]);
        // No escape processing; the backslash is an ordinary character
        assert_tokens(
            r#""a\nb""#,
            vec![TokenKind::StringLiteral("a\\nb".to_string())],
        );
        // Strings may span lines
        assert_tokens(
            "\"two\nlines\"",
            vec![TokenKind::StringLiteral("two\nlines".to_string())],
        );
    }

    #[test]
    fn test_string_spans_cover_quotes() {
        let tokens = tokenize(r#"  "hi"  "#).expect("should tokenize");
        assert_eq!(tokens[0].span, Span::new(2, 6));
        assert_eq!(tokens[0].text, "\"hi\"");
    }

    #[test]
    fn test_unterminated_string() {
        assert_unterminated(r#""abc"#, 0, 4);
        assert_unterminated(r#"""#, 0, 1);
        assert_unterminated("1 + \"x", 4, 6);
    }

    #[test]
    fn test_tokenize_spans() {
        // Verify spans manually for a simple case
        let input = "let x = 10";
        let tokens = tokenize(input).expect("Should tokenize successfully");

        assert_eq!(tokens.len(), 5);

        assert_eq!(tokens[0].kind, TokenKind::Let);
        assert_eq!(tokens[0].span, Span::new(0, 3));

        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].span, Span::new(4, 5));
        assert_eq!(tokens[1].text, "x");

        assert_eq!(tokens[2].kind, TokenKind::Equals);
        assert_eq!(tokens[2].span, Span::new(6, 7));

        assert_eq!(tokens[3].kind, TokenKind::Number(10.0));
        assert_eq!(tokens[3].span, Span::new(8, 10));

        assert_eq!(tokens[4].kind, TokenKind::EndOfFile);
        assert_eq!(tokens[4].span, Span::new(10, 10));
    }

    #[test]
    fn test_nul_byte_ends_the_stream() {
        let tokens = tokenize("1 \0 2").expect("should tokenize");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Number(1.0));
        assert_eq!(tokens[1].kind, TokenKind::EndOfFile);
        assert_eq!(tokens[1].span, Span::new(2, 2));
    }

    #[test]
    fn test_retokenizing_token_texts_is_stable() {
        let input = "let mut total = (1 + 2) * 3 if total >= 9 { \"big\" } else { total }";
        let tokens = tokenize(input).expect("should tokenize");
        let reconstructed = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::EndOfFile)
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let again = tokenize(&reconstructed).expect("reconstruction tokenizes");
        let kinds = |ts: &[Token]| ts.iter().map(|t| t.kind.clone()).collect::<Vec<_>>();
        assert_eq!(kinds(&tokens), kinds(&again));
    }

    #[test]
    fn test_keyword_set() {
        let keywords = keywords();
        assert_eq!(keywords.len(), 6);
        assert!(keywords.contains("let"));
        assert!(keywords.contains("else"));
    }
}
