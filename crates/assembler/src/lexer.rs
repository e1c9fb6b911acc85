//! Tokenizer for JNVM assembly text.

use std::fmt;

use crate::error::AsmError;

/// A single token from an assembly line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// An opcode mnemonic. Always uppercase.
    Ident(String),
    /// A `.`-prefixed directive name. Always uppercase.
    Directive(String),
    /// A numeric literal (decimal or hex).
    Number(u64),
    /// A register operand, `r0` through `r255`.
    Register(u8),
    /// A native call target, `@N`. Range is checked by the parser.
    Native(u64),
    /// A double-quoted string literal with escapes resolved.
    Str(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) | Token::Directive(s) => f.write_str(s),
            Token::Number(n) => write!(f, "{n}"),
            Token::Register(r) => write!(f, "r{r}"),
            Token::Native(id) => write!(f, "@{id}"),
            Token::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// Tokenize a single line of assembly text.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `;` outside a string literal and extend to end of
/// line.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token>, AsmError> {
    let mut tokens = Vec::new();
    let mut rest = line;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() || rest.starts_with(';') {
            break;
        }

        if let Some(body) = rest.strip_prefix('"') {
            let (text, after) = read_string(body, line_num)?;
            tokens.push(Token::Str(text));
            rest = after;
            continue;
        }

        let end = rest
            .find(|c: char| c.is_whitespace() || c == ';' || c == '"')
            .unwrap_or(rest.len());
        let (word, after) = rest.split_at(end);
        tokens.push(classify(word, line_num)?);
        rest = after;
    }

    Ok(tokens)
}

/// Parse a decimal or `0x`-prefixed hex literal.
pub(crate) fn parse_number(word: &str) -> Option<u64> {
    match word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => word.parse().ok(),
    }
}

fn classify(word: &str, line_num: usize) -> Result<Token, AsmError> {
    let invalid_number = || AsmError::InvalidNumber {
        line: line_num,
        token: word.to_string(),
    };

    if word.starts_with('.') {
        return Ok(Token::Directive(word.to_uppercase()));
    }

    if let Some(id) = word.strip_prefix('@') {
        return parse_number(id).map(Token::Native).ok_or_else(invalid_number);
    }

    if let Some(index) = word.strip_prefix(|c: char| c == 'r' || c == 'R') {
        if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) {
            return index
                .parse::<u8>()
                .map(Token::Register)
                .map_err(|_| AsmError::InvalidRegister {
                    line: line_num,
                    token: word.to_string(),
                });
        }
    }

    if word.as_bytes().first().is_some_and(|b| b.is_ascii_digit()) {
        return parse_number(word).map(Token::Number).ok_or_else(invalid_number);
    }

    Ok(Token::Ident(word.to_uppercase()))
}

/// Read a string literal body (opening quote already consumed).
///
/// Returns the unescaped text and the remainder of the line after the
/// closing quote.
fn read_string(body: &str, line_num: usize) -> Result<(String, &str), AsmError> {
    let mut text = String::new();
    let mut chars = body.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((text, &body[i + 1..])),
            '\\' => {
                let escaped = match chars.next() {
                    Some((_, 'n')) => '\n',
                    Some((_, 't')) => '\t',
                    Some((_, 'r')) => '\r',
                    Some((_, '0')) => '\0',
                    Some((_, '\\')) => '\\',
                    Some((_, '"')) => '"',
                    Some((j, 'x')) => {
                        let escaped = hex_escape(body.get(j + 1..j + 3)).ok_or_else(|| {
                            AsmError::InvalidEscape {
                                line: line_num,
                                token: body[i..].chars().take(4).collect(),
                            }
                        })?;
                        chars.nth(1);
                        escaped
                    }
                    Some((_, other)) => {
                        return Err(AsmError::InvalidEscape {
                            line: line_num,
                            token: format!("\\{other}"),
                        })
                    }
                    None => return Err(AsmError::UnterminatedString { line: line_num }),
                };
                text.push(escaped);
            }
            _ => text.push(c),
        }
    }

    Err(AsmError::UnterminatedString { line: line_num })
}

/// `\xHH` for ASCII code points only.
fn hex_escape(digits: Option<&str>) -> Option<char> {
    let digits = digits?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let byte = u8::from_str_radix(digits, 16).ok()?;
    byte.is_ascii().then_some(byte as char)
}
