//! Function boundary walker.
//!
//! Runs on a buffer whose literals, comments, escapes and directives have
//! already been blanked, so every bracket it sees is structural.

use super::helpers::line_number;
use super::tokens::{next_token, Token, Tokenizer};
use crate::error::{DiffError, Result};
use crate::matcher::match_bracket;
use crate::types::FunctionEntry;

fn parse_error(buffer: &[u8], at: usize, what: &str) -> DiffError {
    DiffError::Extraction {
        message: format!("{} (line {})", what, line_number(buffer, at)),
    }
}

fn skip_bracket(buffer: &[u8], token: &Token, closing: u8) -> Result<usize> {
    let opening = buffer[token.start];
    match_bracket(buffer, token.start, opening, closing).ok_or_else(|| {
        parse_error(
            buffer,
            token.start,
            &format!("Cannot find matching '{}'", closing as char),
        )
    })
}

/// First token after the last `;` between `from` and the function name.
fn declaration_start(buffer: &[u8], from: usize, name: &Token) -> usize {
    let after_semicolon = buffer[from..name.start]
        .iter()
        .rposition(|&b| b == b';')
        .map_or(from, |p| from + p + 1);

    next_token(buffer, after_semicolon).map_or(name.start, |t| t.start)
}

/// Tokens that, right after a parenthesized list, mean it was not a function
/// definition: a prototype, a declarator list, an initializer or a function
/// pointer.
const NOT_A_DEFINITION: &[&str] = &[";", ",", "=", "("];

/// Try to read a function whose name is `name` and whose parameter list ends
/// just before `after_params`.
fn function_at(
    buffer: &[u8],
    from: usize,
    name: &Token,
    after_params: usize,
    full_function: bool,
) -> Result<Option<FunctionEntry>> {
    let next = next_token(buffer, after_params)
        .ok_or_else(|| parse_error(buffer, name.start, "Cannot find function body"))?;
    if NOT_A_DEFINITION.iter().any(|t| next.is(t)) {
        return Ok(None);
    }

    // K&R parameter declarations may sit between `)` and `{`.
    let body = Tokenizer::new(buffer, after_params)
        .skip_to("{")
        .ok_or_else(|| parse_error(buffer, name.start, "Cannot find function body"))?;
    let end = match_bracket(buffer, body.start, b'{', b'}')
        .ok_or_else(|| parse_error(buffer, body.start, "Cannot find function body"))?;

    let start = if full_function {
        declaration_start(buffer, from, name)
    } else {
        body.start
    };

    tracing::trace!(
        "Found function '{}' in lines {} ... {}",
        name.text,
        line_number(buffer, start),
        line_number(buffer, end)
    );

    FunctionEntry::new(name.text.clone(), start, end, buffer.len()).map(Some)
}

/// Find the next function definition at or after `from`.
///
/// `from` must be the end of the previous function (or 0): with
/// `full_function` the declaration is taken to start after the last `;`
/// following it.
pub fn next_function(buffer: &[u8], from: usize, full_function: bool) -> Result<Option<FunctionEntry>> {
    let mut tokens = Tokenizer::new(buffer, from);
    let mut previous: Option<Token> = None;

    while let Some(token) = tokens.next() {
        match token.text.as_str() {
            "(" => {
                let after_params = skip_bracket(buffer, &token, b')')?;
                if let Some(name) = previous.as_ref().filter(|t| t.is_identifier()) {
                    if let Some(entry) =
                        function_at(buffer, from, name, after_params, full_function)?
                    {
                        return Ok(Some(entry));
                    }
                }
                tokens.seek(after_params);
            }
            "[" => tokens.seek(skip_bracket(buffer, &token, b']')?),
            "{" => tokens.seek(skip_bracket(buffer, &token, b'}')?),
            _ => {}
        }
        previous = Some(token);
    }

    Ok(None)
}

/// Every function definition in a prepared buffer, in order.
pub fn walk_functions(buffer: &[u8], full_function: bool) -> Result<Vec<FunctionEntry>> {
    let mut functions = Vec::new();
    let mut index = 0;

    while let Some(entry) = next_function(buffer, index, full_function)? {
        index = entry.end();
        functions.push(entry);
    }

    Ok(functions)
}
