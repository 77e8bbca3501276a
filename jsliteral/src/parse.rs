//! Parser for the object-literal subset of JavaScript.
//!
//! Profile templates and `nls` bundles are small scripts whose only job is
//! to produce one literal value. This parser reads that value without
//! evaluating anything: comments, single- or double-quoted strings,
//! unquoted keys, trailing commas, hex numbers, parenthesized values and
//! regular-expression literals are understood; function calls, operators
//! and references to other variables are not.
//!
//! Numbers end up as JSON numbers, which have no infinity: a literal
//! outside the `f64` range such as `1e400` is an
//! [`InvalidNumber`](ParseErrorKind::InvalidNumber) error.

use serde_json::Number;

use crate::{
    error::{ParseError, ParseErrorKind},
    value::{JsObject, JsValue, RegExpLiteral},
};

type PResult<T> = std::result::Result<T, ParseError>;

/// Parses a single literal value.
pub fn parse(src: &str) -> PResult<JsValue> {
    let mut p = Parser::new(src);
    let value = p.value()?;
    p.finish()?;
    Ok(value)
}

/// Parses `[var|let|const] name = <value>[;]` or a bare value.
///
/// Returns the assigned name (if any) and the value, which is what a
/// script of this shape evaluates to.
pub fn parse_assignment(src: &str) -> PResult<(Option<String>, JsValue)> {
    let mut p = Parser::new(src);
    let name = p.assignment_target();
    let value = p.value()?;
    p.skip_trivia()?;
    p.eat(';');
    p.finish()?;
    Ok((name, value))
}

/// Parses an AMD module of the form `define(<value>);` and returns the value.
pub fn parse_amd_define(src: &str) -> PResult<JsValue> {
    let mut p = Parser::new(src);
    p.skip_trivia()?;
    let start = p.pos;
    match p.ident() {
        Some(name) if name == "define" => {}
        _ => {
            p.pos = start;
            return Err(p.unexpected());
        }
    }
    p.skip_trivia()?;
    p.expect('(')?;
    let value = p.value()?;
    p.skip_trivia()?;
    p.expect(')')?;
    p.skip_trivia()?;
    p.eat(';');
    p.finish()?;
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> PResult<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn error_at(&self, pos: usize, kind: ParseErrorKind) -> ParseError {
        let mut line = 1;
        let mut column = 1;
        for &c in &self.chars[..pos.min(self.chars.len())] {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        ParseError { kind, line, column }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        self.error_at(self.pos, kind)
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(c) => self.error(ParseErrorKind::UnexpectedChar(c)),
            None => self.error(ParseErrorKind::UnexpectedEnd),
        }
    }

    fn finish(&mut self) -> PResult<()> {
        self.skip_trivia()?;
        if self.peek().is_some() {
            return Err(self.error(ParseErrorKind::TrailingInput));
        }
        Ok(())
    }

    fn skip_trivia(&mut self) -> PResult<()> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() || c == '\u{feff}' => {
                    self.pos += 1;
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.pos += 1;
                                break;
                            }
                            Some(_) => {}
                            None => return Err(self.error_at(start, ParseErrorKind::UnexpectedEnd)),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn ident(&mut self) -> Option<String> {
        let first = self.peek()?;
        if !(first.is_alphabetic() || first == '_' || first == '$') {
            return None;
        }
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                name.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        Some(name)
    }

    /// Consumes `[var|let|const] name =` when present; rewinds otherwise.
    fn assignment_target(&mut self) -> Option<String> {
        if self.skip_trivia().is_err() {
            return None;
        }
        let start = self.pos;
        let mut name = self.ident();
        if matches!(name.as_deref(), Some("var" | "let" | "const")) {
            if self.skip_trivia().is_err() {
                self.pos = start;
                return None;
            }
            name = self.ident();
        }
        if let Some(name) = name
            && self.skip_trivia().is_ok()
            && self.peek() == Some('=')
            && self.peek_at(1) != Some('=')
        {
            self.pos += 1;
            return Some(name);
        }
        self.pos = start;
        None
    }

    fn value(&mut self) -> PResult<JsValue> {
        self.skip_trivia()?;
        match self.peek() {
            None => Err(self.error(ParseErrorKind::UnexpectedEnd)),
            Some('{') => self.object(),
            Some('[') => self.array(),
            Some(q @ ('"' | '\'')) => self.string(q).map(JsValue::String),
            Some('(') => {
                self.pos += 1;
                let value = self.value()?;
                self.skip_trivia()?;
                self.expect(')')?;
                Ok(value)
            }
            Some('/') => self.regexp(),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => {
                self.number().map(JsValue::Number)
            }
            Some(_) => {
                let start = self.pos;
                match self.ident().as_deref() {
                    Some("true") => Ok(JsValue::Bool(true)),
                    Some("false") => Ok(JsValue::Bool(false)),
                    Some("null" | "undefined") => Ok(JsValue::Null),
                    _ => {
                        self.pos = start;
                        Err(self.unexpected())
                    }
                }
            }
        }
    }

    fn object(&mut self) -> PResult<JsValue> {
        self.expect('{')?;
        let mut obj = JsObject::new();
        loop {
            self.skip_trivia()?;
            if self.eat('}') {
                break;
            }
            let key = match self.peek() {
                Some(q @ ('"' | '\'')) => self.string(q)?,
                Some(c) if c.is_ascii_digit() => self.number()?.to_string(),
                Some(_) => match self.ident() {
                    Some(name) => name,
                    None => return Err(self.unexpected()),
                },
                None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
            };
            self.skip_trivia()?;
            self.expect(':')?;
            let value = self.value()?;
            obj.insert(key, value);
            self.skip_trivia()?;
            if self.eat(',') {
                continue;
            }
            self.expect('}')?;
            break;
        }
        Ok(JsValue::Object(obj))
    }

    fn array(&mut self) -> PResult<JsValue> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat(']') {
                break;
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            if self.eat(',') {
                continue;
            }
            self.expect(']')?;
            break;
        }
        Ok(JsValue::Array(items))
    }

    fn string(&mut self, quote: char) -> PResult<String> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(self.error_at(start, ParseErrorKind::UnterminatedString));
                }
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> PResult<()> {
        let at = self.pos - 1;
        let Some(c) = self.bump() else {
            return Err(self.error(ParseErrorKind::UnterminatedString));
        };
        match c {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            // line continuation
            '\n' => {}
            '\r' => {
                self.eat('\n');
            }
            'x' => {
                let code = self.hex_digits(2, at)?;
                out.push(self.code_point(code, at)?);
            }
            'u' => {
                let code = self.unicode_escape(at)?;
                if (0xD800..0xDC00).contains(&code)
                    && self.peek() == Some('\\')
                    && self.peek_at(1) == Some('u')
                {
                    let rewind = self.pos;
                    self.pos += 2;
                    let low = self.unicode_escape(at)?;
                    if (0xDC00..0xE000).contains(&low) {
                        let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                        out.push(self.code_point(combined, at)?);
                        return Ok(());
                    }
                    self.pos = rewind;
                }
                out.push(self.code_point(code, at)?);
            }
            other => out.push(other),
        }
        Ok(())
    }

    fn unicode_escape(&mut self, at: usize) -> PResult<u32> {
        if self.eat('{') {
            let mut code: u32 = 0;
            let mut digits = 0;
            while let Some(c) = self.peek() {
                if c == '}' {
                    break;
                }
                let d = c
                    .to_digit(16)
                    .ok_or_else(|| self.error_at(at, ParseErrorKind::InvalidEscape))?;
                code = code
                    .checked_mul(16)
                    .and_then(|v| v.checked_add(d))
                    .ok_or_else(|| self.error_at(at, ParseErrorKind::InvalidEscape))?;
                digits += 1;
                self.pos += 1;
            }
            if digits == 0 || !self.eat('}') {
                return Err(self.error_at(at, ParseErrorKind::InvalidEscape));
            }
            Ok(code)
        } else {
            self.hex_digits(4, at)
        }
    }

    fn hex_digits(&mut self, count: usize, at: usize) -> PResult<u32> {
        let mut code = 0;
        for _ in 0..count {
            let d = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error_at(at, ParseErrorKind::InvalidEscape))?;
            code = code * 16 + d;
        }
        Ok(code)
    }

    fn code_point(&self, code: u32, at: usize) -> PResult<char> {
        char::from_u32(code).ok_or_else(|| self.error_at(at, ParseErrorKind::InvalidEscape))
    }

    fn number(&mut self) -> PResult<Number> {
        let start = self.pos;
        let negative = match self.peek() {
            Some('-') => {
                self.pos += 1;
                true
            }
            Some('+') => {
                self.pos += 1;
                false
            }
            _ => false,
        };

        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x' | 'X')) {
            self.pos += 2;
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            let digits: String = self.chars[digits_start..self.pos].iter().collect();
            let value = i64::from_str_radix(&digits, 16).map_err(|_| self.invalid_number(start))?;
            return Ok(Number::from(if negative { -value } else { value }));
        }

        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {}
                '.' => is_float = true,
                'e' | 'E' => {
                    is_float = true;
                    if matches!(self.peek_at(1), Some('+' | '-')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
            self.pos += 1;
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        let text = text.strip_prefix('+').unwrap_or(&text);
        if !is_float {
            if let Ok(v) = text.parse::<i64>() {
                return Ok(Number::from(v));
            }
            if let Ok(v) = text.parse::<u64>() {
                return Ok(Number::from(v));
            }
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .ok_or_else(|| self.invalid_number(start))
    }

    fn invalid_number(&self, start: usize) -> ParseError {
        let text: String = self.chars[start..self.pos].iter().collect();
        self.error_at(start, ParseErrorKind::InvalidNumber(text))
    }

    fn regexp(&mut self) -> PResult<JsValue> {
        let start = self.pos;
        self.expect('/')?;
        let mut pattern = String::new();
        let mut in_class = false;
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(self.error_at(start, ParseErrorKind::UnterminatedRegExp));
                }
                Some('\\') => {
                    pattern.push('\\');
                    match self.bump() {
                        Some(c) if c != '\n' => pattern.push(c),
                        _ => return Err(self.error_at(start, ParseErrorKind::UnterminatedRegExp)),
                    }
                }
                Some('/') if !in_class => break,
                Some(c) => {
                    match c {
                        '[' => in_class = true,
                        ']' => in_class = false,
                        _ => {}
                    }
                    pattern.push(c);
                }
            }
        }
        let mut flags = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_alphabetic() {
                break;
            }
            flags.push(c);
            self.pos += 1;
        }
        Ok(JsValue::RegExp(RegExpLiteral { pattern, flags }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_template_like_script() {
        let src = r#"
            // generated profile
            profile = {
                basePath: "./",
                releaseDir: '../dist',
                /* layers are filled in later */
                layers: {
                    "dynamic-modules/preload": { include: [], exclude: ["jimu/main"] },
                    'dynamic-modules/postload': { include: [], },
                },
                resourceTags: {
                    amd: function_is_not_supported_here_so_use_regexp,
                },
            };
        "#;
        let err = parse_assignment(src).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedChar('f')));

        let src = src.replace("function_is_not_supported_here_so_use_regexp", r"/\.js$/");
        let (name, value) = parse_assignment(&src).unwrap();
        assert_eq!(name.as_deref(), Some("profile"));

        let obj = value.as_object().unwrap();
        assert_eq!(
            obj.keys().collect::<Vec<_>>(),
            vec!["basePath", "releaseDir", "layers", "resourceTags"]
        );
        let amd = obj
            .get("resourceTags")
            .and_then(|v| v.as_object())
            .and_then(|o| o.get("amd"))
            .and_then(|v| v.as_regexp())
            .unwrap();
        assert_eq!(amd, &RegExpLiteral::new(r"\.js$", ""));
    }

    #[test]
    fn test_parse_var_and_bare_forms() {
        let (name, value) = parse_assignment("var p = ({a: 1});").unwrap();
        assert_eq!(name.as_deref(), Some("p"));
        assert_eq!(value.to_json(), json!({"a": 1}));

        let (name, value) = parse_assignment("[true, false, null, undefined]").unwrap();
        assert_eq!(name, None);
        assert_eq!(value.to_json(), json!([true, false, null, null]));
    }

    #[test]
    fn test_parse_strings_and_escapes() {
        let value = parse(r#"['a\'b', "tab\there", "\x41B\u{43}", "😀", 'line\
continued']"#)
        .unwrap();
        assert_eq!(
            value.to_json(),
            json!(["a'b", "tab\there", "ABC", "\u{1F600}", "linecontinued"])
        );

        let err = parse(r#""open"#).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);

        let err = parse(r#""\u12""#).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidEscape);
    }

    #[test]
    fn test_parse_numbers() {
        let value = parse("[0, -12, +3, 1.5, .5, 2e3, 0x1F, -0x10, 18446744073709551615]").unwrap();
        assert_eq!(
            value.to_json(),
            json!([0, -12, 3, 1.5, 0.5, 2000.0, 31, -16, 18446744073709551615u64])
        );

        let err = parse("1.2.3").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidNumber(_)));
    }

    #[test]
    fn test_parse_number_out_of_range() {
        assert_eq!(parse("1.7e308").unwrap().to_json(), json!(1.7e308));

        let err = parse("{ big: 1e400 }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidNumber("1e400".into()));
        assert_eq!((err.line, err.column), (1, 8));
    }

    #[test]
    fn test_parse_regexp_with_class_and_escapes() {
        let value = parse(r"/[/\]]+\/x/gi").unwrap();
        assert_eq!(
            value.as_regexp().unwrap(),
            &RegExpLiteral::new(r"[/\]]+\/x", "gi")
        );

        let err = parse("/abc").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedRegExp);
    }

    #[test]
    fn test_parse_amd_define() {
        let src = r#"define({
            root: ({
                _widgetLabel: "Legend"
            }),
            "zh-cn": true
        });"#;
        let value = parse_amd_define(src).unwrap();
        assert_eq!(
            value.to_json(),
            json!({"root": {"_widgetLabel": "Legend"}, "zh-cn": true})
        );

        assert!(parse_amd_define("require({})").is_err());
    }

    #[test]
    fn test_error_position() {
        let err = parse("{\n  a: 1,\n  b: ?\n}").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedChar('?'));
        assert_eq!((err.line, err.column), (3, 6));

        let err = parse("{} x").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TrailingInput);
    }
}
