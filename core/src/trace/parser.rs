use nom::{
    branch::alt,
    bytes::complete::take_while_m_n,
    character::complete::{char, space0, space1},
    combinator::{all_consuming, map, map_res, rest},
    multi::separated_list1,
    sequence::{delimited, preceded},
    IResult, Parser,
};

use crate::error::TraceError;

/// One line of a trace file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    /// `<` bytes received from the monitor.
    Input(Vec<u8>),
    /// `>` bytes sent to the monitor.
    Output(Vec<u8>),
    /// `#` free text.
    Comment(String),
}

impl Directive {
    pub fn input(&self) -> Option<&[u8]> {
        match self {
            Directive::Input(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Parse a whole trace.
///
/// Lines that do not start with `<`, `>` or `#` carry no directive and are
/// skipped. Bad hex on a `<` or `>` line is an error.
pub fn parse_trace(text: &str) -> Result<Vec<Directive>, TraceError> {
    let mut directives = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if !line.starts_with(['<', '>', '#']) {
            log::debug!("trace line {} skipped: '{}'", idx + 1, line);
            continue;
        }
        directives.push(parse_directive(line).map_err(|message| TraceError::Parse {
            line: idx + 1,
            message,
        })?);
    }
    Ok(directives)
}

/// Parse one non-empty line.
pub fn parse_directive(line: &str) -> Result<Directive, String> {
    match all_consuming(directive).parse(line) {
        Ok((_, directive)) => Ok(directive),
        Err(e) => Err(format!("unrecognized directive '{}': {:?}", line, e)),
    }
}

fn directive(input: &str) -> IResult<&str, Directive> {
    alt((
        map(preceded(char('<'), hex_bytes), Directive::Input),
        map(preceded(char('>'), hex_bytes), Directive::Output),
        map(preceded(char('#'), rest), |text: &str| {
            Directive::Comment(text.to_string())
        }),
    ))
    .parse(input)
}

fn hex_bytes(input: &str) -> IResult<&str, Vec<u8>> {
    delimited(space0, separated_list1(space1, hex_byte), space0).parse(input)
}

fn hex_byte(input: &str) -> IResult<&str, u8> {
    map_res(
        take_while_m_n(1, 2, |c: char| c.is_ascii_hexdigit()),
        |digits: &str| u8::from_str_radix(digits, 16),
    )
    .parse(input)
}
