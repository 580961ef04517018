use nom::{
    IResult, Parser,
    bytes::complete::{take_till, take_while1},
    character::complete::{char, digit1, multispace0, one_of},
    combinator::{all_consuming, opt, recognize},
    error::ErrorKind,
};

use crate::ast::{NumberType, Value, sym};
use crate::config::ParseConfig;
use crate::{Error, MAX_PARSE_DEPTH, ParseError, ParseErrorKind};

type ParseResult<'a, T> = IResult<&'a str, T>;

fn fail<T>(input: &str, code: ErrorKind) -> ParseResult<'_, T> {
    Err(nom::Err::Failure(nom::error::Error::new(input, code)))
}

fn is_delimiter(c: char, config: ParseConfig) -> bool {
    c.is_whitespace()
        || matches!(c, '(' | ')' | '\'' | '"')
        || (config.handle_comments && c == ';')
}

/// Skip whitespace and, when enabled, `;` line comments
fn skip_trivia(mut input: &str, config: ParseConfig) -> ParseResult<'_, ()> {
    loop {
        let (rest, _) = multispace0.parse(input)?;
        input = rest;
        if config.handle_comments && input.starts_with(';') {
            let (rest, _) = take_till(|c: char| c == '\n').parse(input)?;
            input = rest;
        } else {
            return Ok((input, ()));
        }
    }
}

/// A lone `.` inside a list, introducing the tail of an improper list
fn is_dot(input: &str, config: ParseConfig) -> bool {
    input
        .strip_prefix('.')
        .is_some_and(|rest| rest.chars().next().is_none_or(|c| is_delimiter(c, config)))
}

/// Classify an atom: boolean, integer, or symbol
fn parse_atom(input: &str, config: ParseConfig) -> ParseResult<'_, Value> {
    let (remaining, atom) = take_while1(|c: char| !is_delimiter(c, config)).parse(input)?;

    match atom {
        "#t" => return Ok((remaining, Value::Bool(true))),
        "#f" => return Ok((remaining, Value::Bool(false))),
        "." => return fail(input, ErrorKind::Char),
        _ if atom.starts_with('#') => return fail(input, ErrorKind::Tag),
        _ => {}
    }

    let integer: ParseResult<'_, &str> =
        all_consuming(recognize((opt(one_of("+-")), digit1))).parse(atom);
    if integer.is_err() {
        return Ok((remaining, Value::Symbol(atom.to_owned())));
    }

    match atom.parse::<NumberType>() {
        Ok(n) => Ok((remaining, Value::Number(n))),
        Err(_) => fail(input, ErrorKind::Digit),
    }
}

/// Parse the elements of a list after its opening parenthesis
fn parse_list(input: &str, config: ParseConfig, depth: usize) -> ParseResult<'_, Value> {
    let (mut input, _) = char('(').parse(input)?;
    let mut items = Vec::new();

    loop {
        let (rest, ()) = skip_trivia(input, config)?;
        input = rest;

        if let Some(rest) = input.strip_prefix(')') {
            return Ok((rest, Value::list(items)));
        }
        if input.is_empty() {
            return fail(input, ErrorKind::Eof);
        }

        if is_dot(input, config) {
            if items.is_empty() {
                return fail(input, ErrorKind::Char);
            }
            let (rest, tail) = parse_datum(&input[1..], config, depth + 1)?;
            let (rest, ()) = skip_trivia(rest, config)?;
            return match rest.strip_prefix(')') {
                Some(rest) => Ok((rest, Value::improper_list(items, tail))),
                None if rest.is_empty() => fail(rest, ErrorKind::Eof),
                None => fail(rest, ErrorKind::Char),
            };
        }

        let (rest, item) = parse_datum(input, config, depth + 1)?;
        items.push(item);
        input = rest;
    }
}

/// Parse one datum, skipping leading whitespace and comments
fn parse_datum(input: &str, config: ParseConfig, depth: usize) -> ParseResult<'_, Value> {
    if depth >= MAX_PARSE_DEPTH {
        return fail(input, ErrorKind::TooLarge);
    }

    let (input, ()) = skip_trivia(input, config)?;
    match input.chars().next() {
        None => fail(input, ErrorKind::Eof),
        Some('(') => parse_list(input, config, depth),
        Some(')') => fail(input, ErrorKind::Char),
        Some('\'') => {
            // 'expr -> (quote expr)
            let (rest, quoted) = parse_datum(&input[1..], config, depth + 1)?;
            Ok((rest, Value::list([sym("quote"), quoted])))
        }
        Some('"') => fail(input, ErrorKind::Verify),
        Some(_) => parse_atom(input, config),
    }
}

/// The token starting at `input`, for error reports
fn token_at(input: &str, config: ParseConfig) -> Option<String> {
    let first = input.chars().next()?;
    if is_delimiter(first, config) {
        return Some(first.to_string());
    }
    Some(input.chars().take_while(|&c| !is_delimiter(c, config)).collect())
}

/// Convert nom parsing errors to structured parse errors
fn to_parse_error(
    input: &str,
    error: nom::Err<nom::error::Error<&str>>,
    config: ParseConfig,
) -> ParseError {
    let e = match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => {
            return ParseError::from_message(ParseErrorKind::Incomplete, "Incomplete input");
        }
    };

    let offset = input[..input.len() - e.input.len()].chars().count();
    let found = token_at(e.input, config);
    let (kind, message) = match e.code {
        ErrorKind::Eof => {
            return ParseError::from_message(
                ParseErrorKind::Incomplete,
                "Unexpected end of input",
            );
        }
        ErrorKind::TooLarge => {
            return ParseError::from_message(
                ParseErrorKind::TooDeeplyNested,
                format!("Expression too deeply nested (max depth: {MAX_PARSE_DEPTH})"),
            );
        }
        ErrorKind::Digit => (
            ParseErrorKind::ImplementationLimit,
            "Integer literal out of range".to_owned(),
        ),
        ErrorKind::Verify => (
            ParseErrorKind::Unsupported,
            "String literals are not supported".to_owned(),
        ),
        ErrorKind::Tag => (
            ParseErrorKind::Unsupported,
            "Unsupported '#' syntax".to_owned(),
        ),
        _ => (
            ParseErrorKind::InvalidSyntax,
            format!("Unexpected token at position {offset}"),
        ),
    };

    ParseError::with_context_and_found(kind, message, input, offset, found)
}

/// Parse exactly one S-expression from input.
pub fn parse_scheme(input: &str) -> Result<Value, Error> {
    parse_scheme_with_config(input, ParseConfig::default())
}

/// Parse exactly one S-expression; anything but whitespace and comments
/// after it is a `TrailingContent` error.
pub fn parse_scheme_with_config(input: &str, config: ParseConfig) -> Result<Value, Error> {
    let to_error = |e| Error::ParseError(to_parse_error(input, e, config));

    let (rest, value) = parse_datum(input, config, 0).map_err(to_error)?;
    let (rest, ()) = skip_trivia(rest, config).map_err(to_error)?;

    if !rest.is_empty() {
        let offset = input[..input.len() - rest.len()].chars().count();
        return Err(ParseError::with_context_and_found(
            ParseErrorKind::TrailingContent,
            "Unexpected remaining input after expression",
            input,
            offset,
            token_at(rest, config),
        )
        .into());
    }

    Ok(value)
}

/// Parse every S-expression in the input, in order. Blank input (or only
/// comments) yields an empty program.
pub fn parse_program(input: &str, config: ParseConfig) -> Result<Vec<Value>, Error> {
    let to_error = |e| Error::ParseError(to_parse_error(input, e, config));

    let mut values = Vec::new();
    let mut remaining = input;
    loop {
        let (rest, ()) = skip_trivia(remaining, config).map_err(to_error)?;
        if rest.is_empty() {
            return Ok(values);
        }
        let (rest, value) = parse_datum(rest, config, 0).map_err(to_error)?;
        values.push(value);
        remaining = rest;
    }
}
