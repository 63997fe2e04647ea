// Copyright (c) 2016-2021 Fabian Schuiki

//! Defines all tokens that may result from performing lexical analysis on a
//! structural Verilog source file. This module is inspired heavily by the
//! tokens used in the Rust compiler.

pub use self::DelimToken::*;
pub use self::Lit::*;
pub use self::Token::*;
use crate::name::Name;
use std::fmt;

/// A primary token emitted by the lexer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Token {
    // Symbols
    Colon,
    Comma,
    Equal,
    Period,
    Semicolon,

    /// An opening delimiter
    OpenDelim(DelimToken),
    /// A closing delimiter
    CloseDelim(DelimToken),

    /// A keyword
    Keyword(Kw),
    /// A literal
    Literal(Lit),
    /// An identifier
    Ident(Name),
    /// An escaped identifier
    EscIdent(Name),

    /// The end of the input file
    Eof,
}

impl Token {
    pub fn as_str(self) -> &'static str {
        match self {
            Colon => ":",
            Comma => ",",
            Equal => "=",
            Period => ".",
            Semicolon => ";",
            OpenDelim(Paren) => "(",
            OpenDelim(Brack) => "[",
            OpenDelim(Brace) => "{",
            CloseDelim(Paren) => ")",
            CloseDelim(Brack) => "]",
            CloseDelim(Brace) => "}",
            Keyword(kw) => kw.as_str(),
            Literal(..) => "literal",
            Ident(..) => "identifier",
            EscIdent(..) => "escaped identifier",
            Eof => "end of input",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A delimiter token such as parentheses or brackets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DelimToken {
    /// A round paranthesis `(` or `)`
    Paren,
    /// A square bracket `[` or `]`
    Brack,
    /// A curly brace `{` or `}`
    Brace,
}

/// Abstract literals. The name always holds the full spelling of the literal
/// as it appeared in the source, with `_` separators removed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Lit {
    /// An unsigned integer such as `42`.
    Integer(Name),
    /// A real literal with a decimal point, e.g. `3.14`.
    Real(Name),
    /// A real literal in scientific notation, e.g. `25E-2`.
    Exp(Name),
    /// A sized or unsized based number such as `4'b1010` or `'hFF`. The char
    /// holds the lowercased base letter.
    Based(Name, char),
}

/// Generates a `Kw` enum from a list of keywords.
macro_rules! declare_keywords {(
    $( ($konst:ident, $string:expr) )*
) => {
    #[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Debug, Hash)]
    pub enum Kw {
        $($konst,)*
    }

    impl Kw {
        pub fn as_str(self) -> &'static str {
            match self {
                $(Kw::$konst => $string,)*
            }
        }
    }

    impl fmt::Display for Kw {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "{}", self.as_str())
        }
    }

    /// Look up an identifier in the keyword table. Verilog keywords are
    /// case sensitive, so this is an exact match.
    pub fn find_keyword<S: AsRef<str>>(name: S) -> Option<Kw> {
        use once_cell::sync::Lazy;
        use std::collections::HashMap;
        static TBL: Lazy<HashMap<&'static str, Kw>> = Lazy::new(|| {
            let mut tbl = HashMap::new();
            $(tbl.insert($string, Kw::$konst);)*
            tbl
        });
        TBL.get(name.as_ref()).map(|kw| *kw)
    }
}}

declare_keywords! {
    // The structural subset of IEEE 1364-2005 Annex B.
    (Assign,        "assign")
    (Endmodule,     "endmodule")
    (Inout,         "inout")
    (Input,         "input")
    (Module,        "module")
    (Output,        "output")
    (Reg,           "reg")
    (Supply0,       "supply0")
    (Supply1,       "supply1")
    (Tri,           "tri")
    (Triand,        "triand")
    (Trior,         "trior")
    (Wand,          "wand")
    (Wire,          "wire")
    (Wor,           "wor")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup() {
        assert_eq!(find_keyword("module"), Some(Kw::Module));
        assert_eq!(find_keyword("supply1"), Some(Kw::Supply1));
        assert_eq!(find_keyword("Module"), None);
        assert_eq!(find_keyword("always"), None);
    }
}
