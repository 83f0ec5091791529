//! Token producer for the Compose text format.
//!
//! Two entry points: [`lex`] produces ordinary tokens, and
//! [`lex_include_string`] handles the path argument of an `include`
//! statement, where `%`-expansions apply instead of string escapes.
//!
//! Errors never abort lexing on their own. A bad token is reported through
//! the scanner's diagnostics and surfaces as [`Token::Error`]; the parser
//! decides how far to skip.

use crate::keysym::Keysym;
use crate::paths::{self, Environment};
use crate::scanner::Scanner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    EndOfLine,
    EndOfFile,
    Include,
    IncludeString(String),
    LhsKeysym(Keysym),
    Colon,
    String(String),
    RhsKeysym(Keysym),
    Error,
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

pub(crate) fn lex(s: &mut Scanner) -> Token {
    loop {
        // Skip spaces; a newline ends the line.
        while is_space(s.peek()) {
            if s.advance() == b'\n' {
                return Token::EndOfLine;
            }
        }

        // Skip comments up to (not including) the newline.
        if s.chr(b'#') {
            while !s.eol() {
                s.advance();
            }
            continue;
        }

        break;
    }

    if s.eof() {
        return Token::EndOfFile;
    }

    s.start_token();

    // LHS keysym.
    if s.chr(b'<') {
        while s.peek() != b'>' && !s.eol() {
            let b = s.advance();
            s.buf_append(b);
        }
        if !s.chr(b'>') {
            s.err("unterminated keysym literal");
            return Token::Error;
        }
        if !s.buf_append(0) {
            s.err("keysym literal is too long");
            return Token::Error;
        }
        let name = &s.buf()[..s.buf().len() - 1];
        match std::str::from_utf8(name).ok().and_then(Keysym::from_name) {
            Some(keysym) => return Token::LhsKeysym(keysym),
            None => {
                s.err(format_args!(
                    "unrecognized keysym \"{}\" on left-hand side",
                    String::from_utf8_lossy(name)
                ));
                return Token::Error;
            }
        }
    }

    if s.chr(b':') {
        return Token::Colon;
    }

    // String literal.
    if s.chr(b'"') {
        while !s.eol() && s.peek() != b'"' {
            if s.chr(b'\\') {
                if s.chr(b'\\') {
                    s.buf_append(b'\\');
                } else if s.chr(b'"') {
                    s.buf_append(b'"');
                } else if s.chr(b'x') || s.chr(b'X') {
                    match s.hex() {
                        Some(o) => {
                            s.buf_append(o);
                        }
                        None => {
                            s.warn("illegal hexadecimal escape sequence in string literal");
                        }
                    }
                } else if let Some(o) = s.oct() {
                    s.buf_append(o);
                } else {
                    // The bad escape character is left in place and picked
                    // up as an ordinary character on the next iteration.
                    s.warn(format_args!(
                        "unknown escape sequence ({}) in string literal",
                        s.peek() as char
                    ));
                }
            } else {
                let b = s.advance();
                s.buf_append(b);
            }
        }
        if !s.chr(b'"') {
            s.err("unterminated string literal");
            return Token::Error;
        }
        if !s.buf_append(0) {
            s.err("string literal is too long");
            return Token::Error;
        }
        let bytes = &s.buf()[..s.buf().len() - 1];
        match std::str::from_utf8(bytes) {
            Ok(text) => return Token::String(text.to_string()),
            Err(_) => {
                s.err("string literal is not a valid UTF-8 string");
                return Token::Error;
            }
        }
    }

    // RHS keysym or include.
    if is_ident_start(s.peek()) {
        while is_ident(s.peek()) {
            let b = s.advance();
            s.buf_append(b);
        }
        if !s.buf_append(0) {
            s.err("identifier is too long");
            return Token::Error;
        }
        let name = &s.buf()[..s.buf().len() - 1];

        if name == b"include" {
            return Token::Include;
        }

        match std::str::from_utf8(name).ok().and_then(Keysym::from_name) {
            Some(keysym) => return Token::RhsKeysym(keysym),
            None => {
                s.err(format_args!(
                    "unrecognized keysym \"{}\" on right-hand side",
                    String::from_utf8_lossy(name)
                ));
                return Token::Error;
            }
        }
    }

    // Unrecognized input: drop the rest of the line.
    while !s.eol() {
        s.advance();
    }
    s.err("unrecognized token");
    Token::Error
}

/// Lex the quoted path after an `include` keyword, applying `%%`, `%H`,
/// `%L` and `%S` expansions.
pub(crate) fn lex_include_string(
    s: &mut Scanner,
    env: &Environment,
    locale: &str,
) -> Token {
    while is_space(s.peek()) {
        if s.advance() == b'\n' {
            return Token::EndOfLine;
        }
    }

    s.start_token();

    if !s.chr(b'"') {
        s.err("include statement must be followed by a path");
        return Token::Error;
    }

    while !s.eol() && s.peek() != b'"' {
        if s.chr(b'%') {
            if s.chr(b'%') {
                s.buf_append(b'%');
            } else if s.chr(b'H') {
                let Some(home) = env.home() else {
                    s.err("%H was used in an include statement, but the HOME \
                           environment variable is not set");
                    return Token::Error;
                };
                if !s.buf_appends(home.as_bytes()) {
                    s.err("include path after expanding %H is too long");
                    return Token::Error;
                }
            } else if s.chr(b'L') {
                let Some(path) = paths::locale_compose_file_path(env, locale) else {
                    s.err("failed to expand %L to the locale Compose file");
                    return Token::Error;
                };
                if !s.buf_appends(path.to_string_lossy().as_bytes()) {
                    s.err("include path after expanding %L is too long");
                    return Token::Error;
                }
            } else if s.chr(b'S') {
                let xlocaledir = paths::xlocaledir_path(env);
                if !s.buf_appends(xlocaledir.to_string_lossy().as_bytes()) {
                    s.err("include path after expanding %S is too long");
                    return Token::Error;
                }
            } else {
                s.err(format_args!(
                    "unknown % format ({}) in include statement",
                    s.peek() as char
                ));
                return Token::Error;
            }
        } else {
            let b = s.advance();
            s.buf_append(b);
        }
    }
    if !s.chr(b'"') {
        s.err("unterminated include statement");
        return Token::Error;
    }
    if !s.buf_append(0) {
        s.err("include path is too long");
        return Token::Error;
    }
    let path = String::from_utf8_lossy(&s.buf()[..s.buf().len() - 1]).into_owned();
    Token::IncludeString(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> Vec<Token> {
        let mut s = Scanner::new(source.as_bytes(), "(test)");
        let mut tokens = Vec::new();
        loop {
            let tok = lex(&mut s);
            let done = tok == Token::EndOfFile;
            tokens.push(tok);
            if done {
                return tokens;
            }
        }
    }

    fn keysym(name: &str) -> Keysym {
        Keysym::from_name(name).unwrap()
    }

    #[test]
    fn production_line() {
        let tokens = lex_all("<dead_tilde> <space> : \"~\" asciitilde\n");
        assert_eq!(
            tokens,
            vec![
                Token::LhsKeysym(keysym("dead_tilde")),
                Token::LhsKeysym(keysym("space")),
                Token::Colon,
                Token::String("~".to_string()),
                Token::RhsKeysym(keysym("asciitilde")),
                Token::EndOfLine,
                Token::EndOfFile,
            ]
        );
    }

    #[test]
    fn comments_and_blank_lines() {
        let tokens = lex_all("# a comment\n\n  # another\n");
        assert_eq!(
            tokens,
            vec![
                Token::EndOfLine,
                Token::EndOfLine,
                Token::EndOfLine,
                Token::EndOfFile,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        let tokens = lex_all(r#""a\x41\101\\\"b""#);
        assert_eq!(tokens[0], Token::String("aAA\\\"b".to_string()));
    }

    #[test]
    fn unknown_escape_drops_backslash() {
        let tokens = lex_all(r#""a\qb""#);
        assert_eq!(tokens[0], Token::String("aqb".to_string()));
    }

    #[test]
    fn invalid_utf8_string_is_an_error() {
        let tokens = lex_all("\"\\xff\"\n");
        assert_eq!(tokens[0], Token::Error);
    }

    #[test]
    fn unterminated_literals() {
        assert_eq!(lex_all("<dead_tilde\n")[0], Token::Error);
        assert_eq!(lex_all("\"abc\n")[0], Token::Error);
        assert_eq!(lex_all("\"abc")[0], Token::Error);
    }

    #[test]
    fn unknown_keysym_names() {
        assert_eq!(lex_all("<notakeysym>\n")[0], Token::Error);
        assert_eq!(lex_all("notakeysym\n")[0], Token::Error);
    }

    #[test]
    fn include_keyword() {
        assert_eq!(lex_all("include\n")[0], Token::Include);
    }

    #[test]
    fn unrecognized_token_skips_line() {
        let tokens = lex_all("@@garbage <a>\n<b>");
        assert_eq!(tokens[0], Token::Error);
        // The rest of the line was dropped; the next line still lexes.
        assert_eq!(tokens[1], Token::EndOfLine);
        assert_eq!(tokens[2], Token::LhsKeysym(keysym("b")));
    }

    #[test]
    fn include_string_expansion() {
        let env = Environment::empty()
            .with_home("/home/ran")
            .with_xlocaledir("/opt/locale");

        let mut s = Scanner::new(b"\"%H/.XCompose\"", "(test)");
        assert_eq!(
            lex_include_string(&mut s, &env, "C"),
            Token::IncludeString("/home/ran/.XCompose".to_string())
        );

        let mut s = Scanner::new(b"\"%L\"", "(test)");
        assert_eq!(
            lex_include_string(&mut s, &env, "en_US.UTF-8"),
            Token::IncludeString("/opt/locale/en_US.UTF-8/Compose".to_string())
        );

        let mut s = Scanner::new(b"\"%S/extra\"", "(test)");
        assert_eq!(
            lex_include_string(&mut s, &env, "C"),
            Token::IncludeString("/opt/locale/extra".to_string())
        );

        let mut s = Scanner::new(b"\"50%% done\"", "(test)");
        assert_eq!(
            lex_include_string(&mut s, &env, "C"),
            Token::IncludeString("50% done".to_string())
        );
    }

    #[test]
    fn include_string_errors() {
        let env = Environment::empty();

        // HOME unset.
        let mut s = Scanner::new(b"\"%H/.XCompose\"", "(test)");
        assert_eq!(lex_include_string(&mut s, &env, "C"), Token::Error);

        // Unknown % expansion.
        let mut s = Scanner::new(b"\"%q\"", "(test)");
        assert_eq!(lex_include_string(&mut s, &env, "C"), Token::Error);

        // Missing quote.
        let mut s = Scanner::new(b"path\n", "(test)");
        assert_eq!(lex_include_string(&mut s, &env, "C"), Token::Error);

        let mut s = Scanner::new(b"\"path\n", "(test)");
        assert_eq!(lex_include_string(&mut s, &env, "C"), Token::Error);
    }
}
