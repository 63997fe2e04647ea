// Copyright (c) 2016-2021 Fabian Schuiki

//! A command line tool that parses structural Verilog netlists and prints
//! every record the parser emits.

extern crate clap;
#[macro_use]
extern crate log;
extern crate stderrlog;
extern crate verilog_netlist;

use clap::{App, Arg};
use std::rc::Rc;
use verilog_netlist::ast::{Assignment, Instance, Net, Port};
use verilog_netlist::name::{Name, NameTable};
use verilog_netlist::{NetlistEmitter, Reader};

/// An emitter that prints each record as it arrives, resolving names
/// through a shared handle on the reader's name table.
#[derive(Default)]
struct PrintingEmitter {
    table: Option<Rc<NameTable>>,
    records: usize,
}

impl PrintingEmitter {
    fn table(&self) -> &NameTable {
        self.table.as_ref().expect("name table not attached")
    }
}

impl NetlistEmitter for PrintingEmitter {
    fn add_module(&mut self, name: Name) {
        println!("module {}", self.table().get(name));
        self.records += 1;
    }

    fn add_port(&mut self, port: Port) {
        println!("  {}", port.display(self.table()));
        self.records += 1;
    }

    fn add_net(&mut self, net: Net) {
        println!("  {}", net.display(self.table()));
        self.records += 1;
    }

    fn add_assignment(&mut self, assign: Assignment) {
        println!("  {}", assign.display(self.table()));
        self.records += 1;
    }

    fn add_instance(&mut self, inst: Instance) {
        println!("  {}", inst.display(self.table()));
        self.records += 1;
    }
}

fn main() {
    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("A parser for structural Verilog netlists.")
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .help("Silence all output"),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("The input files to parse")
                .multiple(true)
                .required(true),
        )
        .get_matches();

    // Configure the logger.
    let verbose = matches.occurrences_of("verbosity") as usize + 1;
    let quiet = matches.is_present("quiet");
    stderrlog::new()
        .quiet(quiet)
        .verbosity(verbose)
        .init()
        .unwrap_or_else(|e| {
            eprintln!("failed to initialize logger: {}", e);
            std::process::exit(1);
        });

    let mut failed = false;
    for filename in matches.values_of("INPUT").into_iter().flatten() {
        let mut reader = Reader::new(PrintingEmitter::default());
        let handle = reader.intern_handle();
        reader.emitter_mut().table = Some(handle);

        match reader.read(filename) {
            0 => {
                info!(
                    "parsed `{}`: {} records",
                    filename,
                    reader.emitter().records
                );
            }
            -1 => {
                eprintln!("error: cannot open `{}`", filename);
                failed = true;
            }
            n if n > 0 => {
                eprintln!("error: {} errors in `{}`", n, filename);
                failed = true;
            }
            _ => {
                eprintln!("error: fatal error while reading `{}`", filename);
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
