// Copyright (c) 2016-2021 Fabian Schuiki

//! The categorizing lexer. Tokenizes an input stream of characters, yielding
//! a stream of newline, whitespace, symbol, digits, and text tokens.

pub use self::CatTokenKind::*;

/// The categorizing lexer. Divides an input stream of characters into coarse
/// groups of tokens. These include whitespace, digit runs, letter runs, and
/// symbols. The substrings covered by the emitted tokens can be concatenated
/// to arrive at the original file, i.e. no information is lost.
pub struct Cat<'a> {
    iter: std::str::CharIndices<'a>,
    last: usize,
    chars: (Option<char>, Option<char>),
    indices: (usize, usize),
}

impl<'a> Cat<'a> {
    /// Create a new categorizing lexer over the given input.
    pub fn new(input: &'a str) -> Cat<'a> {
        let last = input.len();
        let mut iter = input.char_indices();
        let c0 = iter.next();
        let c1 = iter.next();
        Cat {
            iter,
            last,
            chars: (c0.map(|x| x.1), c1.map(|x| x.1)),
            indices: (
                c0.map(|x| x.0).unwrap_or(last),
                c1.map(|x| x.0).unwrap_or(last),
            ),
        }
    }

    /// Advance to the next character in the input stream.
    fn bump(&mut self) {
        let c = self.iter.next();
        self.chars = (self.chars.1, c.map(|x| x.1));
        self.indices = (self.indices.1, c.map(|x| x.0).unwrap_or(self.last));
    }
}

impl<'a> Iterator for Cat<'a> {
    type Item = CatToken;

    fn next(&mut self) -> Option<Self::Item> {
        match self.chars {
            (None, _) => None,

            // Newlines
            (Some('\n'), _) => {
                let t = CatToken(Newline, self.indices.0, self.indices.1);
                self.bump();
                Some(t)
            }

            // Whitespace characters
            (Some(c), _) if is_whitespace(c) => {
                let p0 = self.indices.0;
                while let (Some(c), _) = self.chars {
                    if !is_whitespace(c) {
                        break;
                    }
                    self.bump();
                }
                Some(CatToken(Whitespace, p0, self.indices.0))
            }

            // Digit runs
            (Some(c), _) if c.is_ascii_digit() => {
                let p0 = self.indices.0;
                while let (Some(c), _) = self.chars {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    self.bump();
                }
                Some(CatToken(Digits, p0, self.indices.0))
            }

            // Letter runs
            (Some(c), _) if c.is_ascii_alphabetic() => {
                let p0 = self.indices.0;
                while let (Some(c), _) = self.chars {
                    if !c.is_ascii_alphabetic() {
                        break;
                    }
                    self.bump();
                }
                Some(CatToken(Text, p0, self.indices.0))
            }

            // Everything else, including `_`, `$`, punctuation, and bytes
            // outside ASCII, is emitted as an individual symbol and left for
            // the lexer to interpret.
            (Some(c), _) => {
                let t = CatToken(Symbol(c), self.indices.0, self.indices.1);
                self.bump();
                Some(t)
            }
        }
    }
}

/// Check whether the given character is considered a whitespace in Verilog.
fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r' || c == (0xA0 as char)
}

/// A token emitted by the categorizing lexer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CatToken(pub CatTokenKind, pub usize, pub usize);

/// The different kinds of tokens the categorizing lexer can emit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CatTokenKind {
    Newline,
    Whitespace,
    Symbol(char),
    Digits,
    Text,
    Eof,
}
