// Copyright (c) 2016-2021 Fabian Schuiki

//! A parser for structural Verilog netlists.
//!
//! This crate reads Verilog source text describing module interfaces, net
//! declarations, continuous assignments, and module instantiations, and
//! delivers a sequence of typed records to a host application through the
//! [`NetlistEmitter`] trait. All identifiers are interned into a compact
//! [`NameTable`] shared with the host, so records carry lightweight
//! [`Name`] tags instead of strings.
//!
//! ```no_run
//! use verilog_netlist::{NetlistEmitter, Reader};
//! use verilog_netlist::ast::{Assignment, Instance, Net, Port};
//! use verilog_netlist::name::Name;
//!
//! #[derive(Default)]
//! struct Counter(usize);
//!
//! impl NetlistEmitter for Counter {
//!     fn add_module(&mut self, _: Name) { self.0 += 1; }
//!     fn add_port(&mut self, _: Port) {}
//!     fn add_net(&mut self, _: Net) {}
//!     fn add_assignment(&mut self, _: Assignment) {}
//!     fn add_instance(&mut self, _: Instance) {}
//! }
//!
//! let mut reader = Reader::new(Counter::default());
//! assert_eq!(reader.read("design.v"), 0);
//! println!("{} modules", reader.emitter().0);
//! ```

#[macro_use]
extern crate log;

pub mod ast;
pub mod cat;
pub mod errors;
pub mod lexer;
pub mod name;
pub mod parser;
pub mod source;
pub mod token;

pub use crate::ast::{
    Assignment, Constant, ConstantType, ConnectionType, Instance, Net, NetRef, NetType, Port,
    PortDirection,
};
pub use crate::errors::{DiagBuilder, Severity};
pub use crate::name::{Name, NameTable, RcStr};
pub use crate::source::{SourceFile, Span};

use std::io::Read as _;
use std::rc::Rc;

/// The capability set a host implements to receive parsed records. The
/// parser invokes exactly one of these operations per recognized construct,
/// in strict source order, and hands each record over by value.
pub trait NetlistEmitter {
    fn add_module(&mut self, name: Name);
    fn add_port(&mut self, port: Port);
    fn add_net(&mut self, net: Net);
    fn add_assignment(&mut self, assign: Assignment);
    fn add_instance(&mut self, inst: Instance);
}

/// Drives the scanner and parser over input files and owns the name table
/// the records refer to. The table persists across multiple `read` calls on
/// the same reader; a fresh reader starts a fresh id space.
pub struct Reader<E> {
    emitter: E,
    table: Rc<NameTable>,
    diagnostics: Vec<DiagBuilder>,
}

impl<E: NetlistEmitter> Reader<E> {
    pub fn new(emitter: E) -> Reader<E> {
        Reader {
            emitter,
            table: Rc::new(NameTable::new()),
            diagnostics: Vec::new(),
        }
    }

    /// Parse the Verilog source file at `path`. Returns `0` on a clean
    /// parse, `-1` when the file cannot be opened (in which case no callback
    /// is invoked), the number of recoverable errors when any were reported,
    /// and `-2` on a fatal mid-stream condition such as a read failure.
    pub fn read(&mut self, path: &str) -> i32 {
        self.diagnostics.clear();
        let mut f = match std::fs::File::open(path) {
            Ok(f) => f,
            Err(_) => return -1,
        };
        let mut content = String::new();
        if let Err(e) = f.read_to_string(&mut content) {
            let diag = DiagBuilder::fatal(format!("failed to read `{}`: {}", path, e));
            eprintln!("{}", diag);
            self.diagnostics.push(diag);
            return -2;
        }
        let file = SourceFile::new(path, content);
        self.read_source(&file)
    }

    /// Parse an in-memory source file. Hosts with virtual files and the test
    /// suite call this directly; `read` is a thin wrapper around it.
    pub fn read_source(&mut self, file: &SourceFile) -> i32 {
        debug!("parsing `{}`", file.path());
        self.diagnostics = parser::parse(file, &self.table, &mut self.emitter);
        if self
            .diagnostics
            .iter()
            .any(|d| d.get_severity() >= Severity::Fatal)
        {
            return -2;
        }
        self.diagnostics
            .iter()
            .filter(|d| d.get_severity() >= Severity::Error)
            .count() as i32
    }

    /// The name table the emitted records refer to.
    pub fn intern(&self) -> &NameTable {
        &self.table
    }

    /// A shared handle on the name table, for hosts that resolve names from
    /// inside their emitter callbacks.
    pub fn intern_handle(&self) -> Rc<NameTable> {
        self.table.clone()
    }

    /// The diagnostics collected during the most recent `read`.
    pub fn diagnostics(&self) -> &[DiagBuilder] {
        &self.diagnostics
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    pub fn emitter_mut(&mut self) -> &mut E {
        &mut self.emitter
    }

    pub fn into_emitter(self) -> E {
        self.emitter
    }
}
