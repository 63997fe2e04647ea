// Copyright (c) 2016-2021 Fabian Schuiki

//! A lexical analyzer for structural Verilog files, loosely based on IEEE
//! 1364-2005 section 3. Operates on the coarse token groups produced by the
//! categorizing lexer and yields proper Verilog tokens.

use crate::cat::{Cat, CatToken, CatTokenKind};
use crate::errors::*;
use crate::name::NameTable;
use crate::source::{SourceFile, Span, INVALID_SPAN};
pub use crate::token::*;

type CatTokenAndSpan = (CatTokenKind, Span);
pub type TokenAndSpan = (Token, Span);

/// A lexical analyzer for structural Verilog files.
pub struct Lexer<'a> {
    file: &'a SourceFile,
    table: &'a NameTable,
    input: Cat<'a>,
    peek: [CatTokenAndSpan; 4],
}

impl<'a> Lexer<'a> {
    pub fn new(file: &'a SourceFile, table: &'a NameTable) -> Lexer<'a> {
        Lexer {
            file,
            table,
            input: Cat::new(file.content()),
            peek: [(CatTokenKind::Eof, INVALID_SPAN); 4],
        }
    }

    fn bump(&mut self) {
        self.peek[0] = self.peek[1];
        self.peek[1] = self.peek[2];
        self.peek[2] = self.peek[3];
        self.peek[3] = match self.input.next() {
            Some(CatToken(kind, begin, end)) => (kind, Span::new(begin, end)),
            None => (CatTokenKind::Eof, self.peek[2].1),
        };
    }

    /// Skip ahead to the next whitespace or newline. Used to resynchronize
    /// after a lexical error, so that scanning resumes at a token boundary.
    fn recover_to_boundary(&mut self) {
        loop {
            match self.peek[0].0 {
                CatTokenKind::Whitespace | CatTokenKind::Newline | CatTokenKind::Eof => break,
                _ => self.bump(),
            }
        }
    }

    pub fn next_token(&mut self) -> DiagResult<TokenAndSpan> {
        // Upon the first invocation the peek buffer is still empty. In that
        // case we need to load the first batch of tokens.
        if self.peek[0].0 == CatTokenKind::Eof {
            self.bump();
            self.bump();
            self.bump();
            self.bump();
        }

        self.skip_noise()?;

        // Match punctuation.
        if let CatTokenKind::Symbol(c0) = self.peek[0].0 {
            let sym = match c0 {
                '(' => Some(OpenDelim(Paren)),
                ')' => Some(CloseDelim(Paren)),
                '[' => Some(OpenDelim(Brack)),
                ']' => Some(CloseDelim(Brack)),
                '{' => Some(OpenDelim(Brace)),
                '}' => Some(CloseDelim(Brace)),
                ':' => Some(Colon),
                ',' => Some(Comma),
                '.' => Some(Period),
                ';' => Some(Semicolon),
                '=' => Some(Equal),
                _ => None,
            };
            if let Some(tkn) = sym {
                let sp = self.peek[0].1;
                self.bump();
                return Ok((tkn, sp));
            }
        }

        match self.peek[0] {
            // A text token introduces an identifier, which is emitted as a
            // keyword token if it matches one of the reserved words.
            (CatTokenKind::Text, _) | (CatTokenKind::Symbol('_'), _) => {
                let (m, msp) = self.match_ident()?;
                match find_keyword(&m) {
                    Some(kw) => Ok((Keyword(kw), msp)),
                    None => Ok((Ident(self.table.intern(&m)), msp)),
                }
            }

            // Escaped identifiers are introduced with a backslash and last
            // until the next whitespace or newline character. The backslash
            // itself is not part of the identifier.
            (CatTokenKind::Symbol('\\'), mut sp) => {
                let mut s = String::new();
                loop {
                    self.bump();
                    match self.peek[0].0 {
                        CatTokenKind::Whitespace
                        | CatTokenKind::Newline
                        | CatTokenKind::Eof => break,
                        _ => {
                            sp.expand(self.peek[0].1);
                            s.push_str(&self.file.extract(self.peek[0].1));
                        }
                    }
                }
                if s.is_empty() {
                    return Err(
                        DiagBuilder::error("expected an escaped identifier after `\\`").span(sp)
                    );
                }
                Ok((EscIdent(self.table.intern(&s)), sp))
            }

            // Numbers are either introduced by a set of digits in the case of
            // a sized literal or unsigned number, or an apostrophe in the
            // case of an unsized based number.
            (CatTokenKind::Symbol('\''), sp) => {
                self.bump();
                self.match_based_number(None, sp)
            }
            (CatTokenKind::Digits, _) => self.match_number(),

            (CatTokenKind::Eof, sp) => Ok((Eof, sp)),

            (CatTokenKind::Symbol(c), sp) => {
                self.recover_to_boundary();
                Err(DiagBuilder::error(format!("unknown character `{}`", c)).span(sp))
            }
            (tkn, sp) => Err(DiagBuilder::error(format!("unknown token {:?}", tkn)).span(sp)),
        }
    }

    /// Skips all input tokens that are excluded from the language's syntax,
    /// i.e. whitespace, newlines, comments, and attributes.
    fn skip_noise(&mut self) -> DiagResult<()> {
        loop {
            match (self.peek[0], self.peek[1].0) {
                // Single-line comment.
                ((CatTokenKind::Symbol('/'), _), CatTokenKind::Symbol('/')) => {
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek[0].0 {
                            CatTokenKind::Eof => break,
                            CatTokenKind::Newline => {
                                self.bump();
                                break;
                            }
                            _ => self.bump(),
                        }
                    }
                    continue;
                }
                // Multi-line comment. These do not nest.
                ((CatTokenKind::Symbol('/'), sp), CatTokenKind::Symbol('*')) => {
                    self.bump();
                    self.bump();
                    loop {
                        match (self.peek[0].0, self.peek[1].0) {
                            (CatTokenKind::Eof, _) => {
                                return Err(
                                    DiagBuilder::error("unterminated block comment").span(sp)
                                );
                            }
                            (CatTokenKind::Symbol('*'), CatTokenKind::Symbol('/')) => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            _ => self.bump(),
                        }
                    }
                    continue;
                }
                // Attributes, e.g. `(* keep *)`.
                ((CatTokenKind::Symbol('('), _), CatTokenKind::Symbol('*'))
                    if self.peek[2].0 != CatTokenKind::Symbol(')') =>
                {
                    self.bump();
                    self.bump();
                    loop {
                        match (self.peek[0].0, self.peek[1].0) {
                            (CatTokenKind::Eof, _) => break,
                            (CatTokenKind::Symbol('*'), CatTokenKind::Symbol(')')) => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            _ => self.bump(),
                        }
                    }
                    continue;
                }
                _ => (),
            }
            match self.peek[0].0 {
                CatTokenKind::Whitespace | CatTokenKind::Newline => self.bump(),
                _ => return Ok(()),
            }
        }
    }

    /// Matches an identifier. This consumes all tokens from the input that
    /// when combined still make up a valid identifier and returns the
    /// consumed characters as a String, alongside the span they covered.
    /// Upper- and lowercase characters, digits, underscores `_`, and dollar
    /// signs `$` are all valid within an identifier.
    fn match_ident(&mut self) -> DiagResult<(String, Span)> {
        let mut s = String::new();
        let mut sp = self.peek[0].1;
        loop {
            match self.peek[0] {
                (CatTokenKind::Text, this_sp)
                | (CatTokenKind::Digits, this_sp)
                | (CatTokenKind::Symbol('_'), this_sp)
                | (CatTokenKind::Symbol('$'), this_sp) => {
                    s.push_str(&self.file.extract(this_sp));
                    sp.expand(this_sp);
                    self.bump();
                }
                _ => break,
            }
        }
        if s.is_empty() {
            return Err(DiagBuilder::error("could not match an identifier here").span(sp));
        }
        Ok((s, sp))
    }

    /// Matches a number introduced by a digit run: an unsigned integer, the
    /// size prefix of a based literal, a real, or an exponent literal.
    fn match_number(&mut self) -> DiagResult<TokenAndSpan> {
        let mut sp = self.peek[0].1;
        let mut body = self.file.extract(sp);
        self.bump();
        self.eat_number_body_into(&mut body, &mut sp, false)?;

        // A decimal point followed by digits makes this a real literal.
        let mut is_real = false;
        if self.peek[0].0 == CatTokenKind::Symbol('.')
            && self.peek[1].0 == CatTokenKind::Digits
        {
            is_real = true;
            sp.expand(self.peek[0].1);
            body.push('.');
            self.bump();
            self.eat_number_body_into(&mut body, &mut sp, false)?;
        }

        // An `e` or `E` makes this an exponent literal.
        let mut is_exp = false;
        if self.peek[0].0 == CatTokenKind::Text {
            let text = self.file.extract(self.peek[0].1);
            if text == "e" || text == "E" {
                is_exp = true;
                sp.expand(self.peek[0].1);
                body.push_str(&text);
                self.bump();
                match self.peek[0] {
                    (CatTokenKind::Symbol('+'), ssp) => {
                        body.push('+');
                        sp.expand(ssp);
                        self.bump();
                    }
                    (CatTokenKind::Symbol('-'), ssp) => {
                        body.push('-');
                        sp.expand(ssp);
                        self.bump();
                    }
                    _ => (),
                }
                if self.peek[0].0 != CatTokenKind::Digits {
                    self.recover_to_boundary();
                    return Err(DiagBuilder::error(format!(
                        "malformed exponent in number literal `{}`",
                        body
                    ))
                    .span(sp));
                }
                self.eat_number_body_into(&mut body, &mut sp, false)?;
            }
        }

        if self.peek[0].0 == CatTokenKind::Text {
            let letters = self.file.extract(self.peek[0].1);
            self.recover_to_boundary();
            return Err(DiagBuilder::error(format!(
                "number literal `{}` may not directly be followed by letters `{}`",
                body, letters
            ))
            .span(sp));
        }

        if is_exp {
            return Ok((Literal(Exp(self.table.intern(&body))), sp));
        }
        if is_real {
            return Ok((Literal(Real(self.table.intern(&body))), sp));
        }

        // Whitespace is allowed between the size indication and the base of
        // a sized literal.
        self.skip_noise()?;
        match (self.peek[0].0, self.peek[1].0) {
            (CatTokenKind::Symbol('\''), CatTokenKind::Text)
            | (CatTokenKind::Symbol('\''), CatTokenKind::Digits) => {
                let mut span = sp;
                span.expand(self.peek[0].1);
                self.bump();
                self.match_based_number(Some(body), span)
            }
            _ => Ok((Literal(Integer(self.table.intern(&body))), sp)),
        }
    }

    /// This function assumes that we have just consumed the apostrophe `'`
    /// before the base indication.
    fn match_based_number(
        &mut self,
        size: Option<String>,
        mut span: Span,
    ) -> DiagResult<TokenAndSpan> {
        match self.peek[0] {
            (CatTokenKind::Text, sp) => {
                self.bump();
                let text = self.file.extract(sp);
                span.expand(sp);
                let mut chars = text.chars();
                let mut c = chars.next();

                // Consume the optional sign indicator.
                let mut signed = None;
                if c == Some('s') || c == Some('S') {
                    signed = c;
                    c = chars.next();
                }

                // Consume the base of the number.
                let base = match c {
                    Some(b) if matches!(b, 'b' | 'B' | 'o' | 'O' | 'd' | 'D' | 'h' | 'H') => b,
                    Some(b) => {
                        self.recover_to_boundary();
                        return Err(DiagBuilder::error(format!(
                            "`{}` is not a valid number base",
                            b
                        ))
                        .span(span));
                    }
                    None => {
                        self.recover_to_boundary();
                        return Err(DiagBuilder::error("missing number base").span(span));
                    }
                };

                // If no more characters remain, a whitespace and subsequent
                // digits may follow. Otherwise, the remaining characters are
                // to be treated as part of the number body and no whitespace
                // follows.
                let mut body = String::new();
                match chars.next() {
                    Some(c) => {
                        body.push(c);
                        body.push_str(chars.as_str());
                    }
                    None => self.skip_noise()?,
                }
                self.eat_number_body_into(&mut body, &mut span, true)?;

                if body.is_empty() {
                    self.recover_to_boundary();
                    return Err(
                        DiagBuilder::error("missing digits after number base").span(span)
                    );
                }
                if let Some(d) = invalid_digit(&body, base) {
                    self.recover_to_boundary();
                    return Err(DiagBuilder::error(format!(
                        "digit `{}` is invalid for base `{}`",
                        d, base
                    ))
                    .span(span));
                }

                // Reassemble the canonical spelling of the literal, with `_`
                // separators stripped and digit case preserved.
                let mut full = size.unwrap_or_default();
                full.push('\'');
                if let Some(s) = signed {
                    full.push(s);
                }
                full.push(base);
                full.push_str(&body);
                Ok((
                    Literal(Based(self.table.intern(&full), base.to_ascii_lowercase())),
                    span,
                ))
            }
            (_, sp) => {
                self.recover_to_boundary();
                Err(DiagBuilder::error("expected a number base after `'`")
                    .span(Span::union(span, sp)))
            }
        }
    }

    /// Eats all digit and text tokens, accumulating them (except for the
    /// underscore separators) in a String.
    fn eat_number_body_into(
        &mut self,
        into: &mut String,
        span: &mut Span,
        allow_alphabetic: bool,
    ) -> DiagResult<()> {
        loop {
            match self.peek[0] {
                (CatTokenKind::Digits, sp) | (CatTokenKind::Text, sp) => {
                    if self.peek[0].0 == CatTokenKind::Text && !allow_alphabetic {
                        break;
                    }
                    into.push_str(&self.file.extract(sp));
                    span.expand(sp);
                }
                (CatTokenKind::Symbol('_'), _) => (),
                (CatTokenKind::Symbol('?'), sp) => {
                    if !allow_alphabetic {
                        break;
                    }
                    into.push('?');
                    span.expand(sp);
                }
                _ => break,
            }
            self.bump();
        }
        Ok(())
    }
}

/// Find the first character of a number body that is not a valid digit for
/// the given base. `x`, `z`, and `?` stand for unknown bits and are admitted
/// in the non-decimal bases.
fn invalid_digit(body: &str, base: char) -> Option<char> {
    let is_xz = |c: char| matches!(c, 'x' | 'X' | 'z' | 'Z' | '?');
    match base.to_ascii_lowercase() {
        'b' => body.chars().find(|&c| !matches!(c, '0' | '1') && !is_xz(c)),
        'o' => body.chars().find(|&c| !c.is_digit(8) && !is_xz(c)),
        'h' => body.chars().find(|&c| !c.is_ascii_hexdigit() && !is_xz(c)),
        'd' => {
            if body.len() == 1 && body.chars().all(is_xz) {
                None
            } else {
                body.chars().find(|&c| !c.is_ascii_digit())
            }
        }
        _ => None,
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = DiagResult<TokenAndSpan>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok((Eof, _)) => None,
            x => Some(x),
        }
    }
}
