//! Grammar driver for the Compose text format.
//!
//! ```text
//! FILE          ::= { [PRODUCTION] [COMMENT] "\n" | INCLUDE }
//! INCLUDE       ::= "include" '"' INCLUDE_STRING '"'
//! PRODUCTION    ::= LHS ":" RHS [ COMMENT ]
//! COMMENT       ::= "#" {<any character except null or newline>}
//! LHS           ::= EVENT { EVENT }
//! EVENT         ::= "<" keysym ">"
//! RHS           ::= ( STRING | keysym | STRING keysym )
//! STRING        ::= '"' { CHAR } '"'
//! ```
//!
//! The historical MODIFIER rules (`!mod`, `~mod`, `None`) are not supported.
//!
//! The recogniser is a small state machine over the token stream. Recovery
//! is line-local: a bad token logs a diagnostic and skips to the next end of
//! line, and only after more than [`MAX_ERRORS`] problems does the whole
//! parse give up. Includes are handled recursively with a depth guard.

use crate::keysym::Keysym;
use crate::lexer::{lex, lex_include_string, Token};
use crate::paths::Environment;
use crate::scanner::Scanner;
use crate::table::ComposeTable;

pub(crate) const MAX_LHS_LEN: usize = 10;
const MAX_INCLUDE_DEPTH: u32 = 5;
const MAX_ERRORS: u32 = 10;

/// One parsed line: the keysym sequence and its results.
pub(crate) struct Production {
    pub lhs: [Keysym; MAX_LHS_LEN],
    pub len: usize,
    pub keysym: Keysym,
    pub string: String,
    pub has_keysym: bool,
    pub has_string: bool,
}

impl Production {
    fn new() -> Production {
        Production {
            lhs: [Keysym::NO_SYMBOL; MAX_LHS_LEN],
            len: 0,
            keysym: Keysym::NO_SYMBOL,
            string: String::new(),
            has_keysym: false,
            has_string: false,
        }
    }

    fn reset(&mut self) {
        self.len = 0;
        self.has_keysym = false;
        self.has_string = false;
    }
}

/// Parse-wide context threaded down to include handling.
pub(crate) struct ParseCtx<'a> {
    pub env: &'a Environment,
    pub locale: String,
}

enum State {
    Initial,
    InitialEol,
    Include,
    IncludeEol(String),
    Lhs,
    Rhs,
}

pub(crate) fn parse_string(
    table: &mut ComposeTable,
    ctx: &ParseCtx<'_>,
    bytes: &[u8],
    file_name: &str,
) -> bool {
    let mut scanner = Scanner::new(bytes, file_name);
    parse(table, ctx, &mut scanner, 0)
}

fn do_include(
    table: &mut ComposeTable,
    ctx: &ParseCtx<'_>,
    s: &Scanner<'_>,
    path: &str,
    include_depth: u32,
) -> bool {
    if include_depth >= MAX_INCLUDE_DEPTH {
        s.err(format_args!(
            "maximum include depth ({MAX_INCLUDE_DEPTH}) exceeded; \
             maybe there is an include loop?"
        ));
        return false;
    }

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            s.err(format_args!(
                "failed to open included Compose file \"{path}\": {e}"
            ));
            return false;
        }
    };

    let mut scanner = Scanner::new(&bytes, path);
    parse(table, ctx, &mut scanner, include_depth + 1)
}

fn parse(
    table: &mut ComposeTable,
    ctx: &ParseCtx<'_>,
    s: &mut Scanner<'_>,
    include_depth: u32,
) -> bool {
    let mut num_errors: u32 = 0;
    let mut production = Production::new();
    let mut state = State::Initial;

    loop {
        match state {
            State::Initial => {
                production.reset();
                state = State::InitialEol;
            }

            State::InitialEol => match lex(s) {
                Token::EndOfLine => {}
                Token::EndOfFile => return true,
                Token::Include => state = State::Include,
                Token::LhsKeysym(keysym) => {
                    production.lhs[0] = keysym;
                    production.len = 1;
                    state = State::Lhs;
                }
                tok => match recover(s, &mut num_errors, tok) {
                    Recovery::Resume => state = State::Initial,
                    Recovery::Fail => return false,
                },
            },

            State::Include => match lex_include_string(s, ctx.env, &ctx.locale) {
                Token::IncludeString(path) => state = State::IncludeEol(path),
                tok => match recover(s, &mut num_errors, tok) {
                    Recovery::Resume => state = State::Initial,
                    Recovery::Fail => return false,
                },
            },

            State::IncludeEol(path) => match lex(s) {
                Token::EndOfLine => {
                    if !do_include(table, ctx, s, &path, include_depth) {
                        s.err("failed to parse file");
                        return false;
                    }
                    state = State::Initial;
                }
                tok => match recover(s, &mut num_errors, tok) {
                    Recovery::Resume => state = State::Initial,
                    Recovery::Fail => return false,
                },
            },

            State::Lhs => match lex(s) {
                Token::LhsKeysym(keysym) => {
                    if production.len + 1 > MAX_LHS_LEN {
                        s.warn(format_args!(
                            "too many keysyms ({}) on left-hand side; skipping line",
                            MAX_LHS_LEN + 1
                        ));
                        skip_rest_of_line(s);
                        state = State::Initial;
                        continue;
                    }
                    production.lhs[production.len] = keysym;
                    production.len += 1;
                }
                Token::Colon => {
                    if production.len == 0 {
                        s.warn("expected at least one keysym on left-hand side; skipping line");
                        skip_rest_of_line(s);
                        state = State::Initial;
                        continue;
                    }
                    state = State::Rhs;
                }
                tok => match recover(s, &mut num_errors, tok) {
                    Recovery::Resume => state = State::Initial,
                    Recovery::Fail => return false,
                },
            },

            State::Rhs => match lex(s) {
                Token::String(string) => {
                    if production.has_string {
                        s.warn("right-hand side can have at most one string; skipping line");
                        skip_rest_of_line(s);
                        state = State::Initial;
                        continue;
                    }
                    // An embedded NUL ends the stored string.
                    let string = match string.find('\0') {
                        Some(nul) => &string[..nul],
                        None => &string[..],
                    };
                    if string.is_empty() {
                        s.warn("right-hand side string must not be empty; skipping line");
                        skip_rest_of_line(s);
                        state = State::Initial;
                        continue;
                    }
                    if string.len() > 255 {
                        s.warn("right-hand side string is too long; skipping line");
                        skip_rest_of_line(s);
                        state = State::Initial;
                        continue;
                    }
                    production.string.clear();
                    production.string.push_str(string);
                    production.has_string = true;
                }
                Token::RhsKeysym(keysym) => {
                    if production.has_keysym {
                        s.warn("right-hand side can have at most one keysym; skipping line");
                        skip_rest_of_line(s);
                        state = State::Initial;
                        continue;
                    }
                    production.keysym = keysym;
                    production.has_keysym = true;
                    // A right-hand keysym completes the production at once;
                    // anything but a newline after it is then unexpected.
                    table.add_production(s, &production);
                    state = State::Initial;
                }
                Token::EndOfLine => {
                    if !production.has_string && !production.has_keysym {
                        s.warn(
                            "right-hand side must have at least one of string or keysym; \
                             skipping line",
                        );
                        state = State::Initial;
                        continue;
                    }
                    table.add_production(s, &production);
                    state = State::Initial;
                }
                tok => match recover(s, &mut num_errors, tok) {
                    Recovery::Resume => state = State::Initial,
                    Recovery::Fail => return false,
                },
            },
        }
    }
}

enum Recovery {
    Resume,
    Fail,
}

/// Log an unexpected token, bail out past [`MAX_ERRORS`], otherwise skip the
/// rest of the line.
fn recover(s: &mut Scanner<'_>, num_errors: &mut u32, tok: Token) -> Recovery {
    if tok != Token::Error {
        s.err("unexpected token");
    }

    *num_errors += 1;
    if *num_errors > MAX_ERRORS {
        s.err("too many errors");
        s.err("failed to parse file");
        return Recovery::Fail;
    }

    if tok != Token::EndOfLine && tok != Token::EndOfFile {
        skip_rest_of_line(s);
    }
    Recovery::Resume
}

fn skip_rest_of_line(s: &mut Scanner<'_>) {
    loop {
        let tok = lex(s);
        if tok == Token::EndOfLine || tok == Token::EndOfFile {
            return;
        }
    }
}
