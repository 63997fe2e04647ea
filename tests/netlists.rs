// Copyright (c) 2016-2021 Fabian Schuiki

//! End-to-end tests that feed netlists through the reader and check the
//! record sequences delivered to the emitter.

extern crate verilog_netlist;

use verilog_netlist::ast::*;
use verilog_netlist::name::Name;
use verilog_netlist::source::SourceFile;
use verilog_netlist::{NetlistEmitter, Reader, Severity};

#[derive(Clone, PartialEq, Debug)]
enum Event {
    Module(Name),
    Port(Port),
    Net(Net),
    Assignment(Assignment),
    Instance(Instance),
}

/// Collects every callback in arrival order, like the sample driver of the
/// library does with its vectors.
#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
}

impl NetlistEmitter for Recorder {
    fn add_module(&mut self, name: Name) {
        self.events.push(Event::Module(name));
    }
    fn add_port(&mut self, port: Port) {
        self.events.push(Event::Port(port));
    }
    fn add_net(&mut self, net: Net) {
        self.events.push(Event::Net(net));
    }
    fn add_assignment(&mut self, assign: Assignment) {
        self.events.push(Event::Assignment(assign));
    }
    fn add_instance(&mut self, inst: Instance) {
        self.events.push(Event::Instance(inst));
    }
}

fn parse(input: &str) -> (Reader<Recorder>, i32) {
    let mut reader = Reader::new(Recorder::default());
    let code = reader.read_source(&SourceFile::new("test.v", input.to_string()));
    (reader, code)
}

/// Renders each event as canonical text, so that record sequences from
/// different readers (and thus different name id spaces) can be compared.
fn render(reader: &Reader<Recorder>) -> Vec<String> {
    let t = reader.intern();
    reader
        .emitter()
        .events
        .iter()
        .map(|ev| match ev {
            Event::Module(n) => format!("module {}", t.get(*n)),
            Event::Port(p) => p.display(t).to_string(),
            Event::Net(n) => n.display(t).to_string(),
            Event::Assignment(a) => a.display(t).to_string(),
            Event::Instance(i) => i.display(t).to_string(),
        })
        .collect()
}

/// Reassembles a compilable netlist from the recorded events. Ports are
/// written as body declarations, which the parser accepts without a header.
fn to_source(reader: &Reader<Recorder>) -> String {
    let t = reader.intern();
    let mut out = String::new();
    let mut open = false;
    for ev in &reader.emitter().events {
        match ev {
            Event::Module(n) => {
                if open {
                    out.push_str("endmodule\n");
                }
                out.push_str(&format!("module {};\n", t.get(*n)));
                open = true;
            }
            Event::Port(p) => out.push_str(&format!("  {}\n", p.display(t))),
            Event::Net(n) => out.push_str(&format!("  {}\n", n.display(t))),
            Event::Assignment(a) => out.push_str(&format!("  {}\n", a.display(t))),
            Event::Instance(i) => out.push_str(&format!("  {}\n", i.display(t))),
        }
    }
    if open {
        out.push_str("endmodule\n");
    }
    out
}

#[test]
fn ports_and_assignment() {
    let (reader, code) = parse("module top(a,b); input a; output b; assign b = a; endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events,
        vec![
            Event::Module(n("top")),
            Event::Port(Port {
                names: vec![n("a")],
                beg: -1,
                end: -1,
                dir: PortDirection::Input,
                ty: ConnectionType::None,
            }),
            Event::Port(Port {
                names: vec![n("b")],
                beg: -1,
                end: -1,
                dir: PortDirection::Output,
                ty: ConnectionType::None,
            }),
            Event::Assignment(Assignment {
                lhs: vec![NetRef::Whole(n("b"))],
                rhs: vec![NetRef::Whole(n("a"))],
            }),
        ]
    );
}

#[test]
fn ansi_ranged_ports() {
    let (reader, code) = parse("module m(input [3:0] a, output [3:0] y); assign y = a; endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events,
        vec![
            Event::Module(n("m")),
            Event::Port(Port {
                names: vec![n("a")],
                beg: 3,
                end: 0,
                dir: PortDirection::Input,
                ty: ConnectionType::None,
            }),
            Event::Port(Port {
                names: vec![n("y")],
                beg: 3,
                end: 0,
                dir: PortDirection::Output,
                ty: ConnectionType::None,
            }),
            Event::Assignment(Assignment {
                lhs: vec![NetRef::Whole(n("y"))],
                rhs: vec![NetRef::Whole(n("a"))],
            }),
        ]
    );
}

#[test]
fn net_decl_and_hex_constant() {
    let (reader, code) = parse("module t(); wire [7:0] w; assign w = 8'hFF; endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events,
        vec![
            Event::Module(n("t")),
            Event::Net(Net {
                names: vec![n("w")],
                beg: 7,
                end: 0,
                ty: NetType::Wire,
            }),
            Event::Assignment(Assignment {
                lhs: vec![NetRef::Whole(n("w"))],
                rhs: vec![NetRef::Const(Constant {
                    value: "8'hFF".to_string(),
                    ty: ConstantType::Hex,
                })],
            }),
        ]
    );
}

#[test]
fn named_instance() {
    let (reader, code) = parse("module u(); and g1(.Y(y), .A(a), .B(b)); endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events,
        vec![
            Event::Module(n("u")),
            Event::Instance(Instance {
                module_name: n("and"),
                inst_name: n("g1"),
                pin_names: vec![
                    NetRef::Whole(n("Y")),
                    NetRef::Whole(n("A")),
                    NetRef::Whole(n("B")),
                ],
                net_names: vec![
                    vec![NetRef::Whole(n("y"))],
                    vec![NetRef::Whole(n("a"))],
                    vec![NetRef::Whole(n("b"))],
                ],
            }),
        ]
    );
}

#[test]
fn positional_instance_with_concat() {
    let (reader, code) = parse("module v(); foo f1(x, {a,b[2],c[3:0]}); endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events,
        vec![
            Event::Module(n("v")),
            Event::Instance(Instance {
                module_name: n("foo"),
                inst_name: n("f1"),
                pin_names: vec![],
                net_names: vec![
                    vec![NetRef::Whole(n("x"))],
                    vec![
                        NetRef::Whole(n("a")),
                        NetRef::Bit(n("b"), 2),
                        NetRef::Range(n("c"), 3, 0),
                    ],
                ],
            }),
        ]
    );
}

#[test]
fn concatenated_lvalue() {
    let (reader, code) = parse("module w(); assign {y[3],y[2],y[1],y[0]} = 4'b1010; endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events,
        vec![
            Event::Module(n("w")),
            Event::Assignment(Assignment {
                lhs: vec![
                    NetRef::Bit(n("y"), 3),
                    NetRef::Bit(n("y"), 2),
                    NetRef::Bit(n("y"), 1),
                    NetRef::Bit(n("y"), 0),
                ],
                rhs: vec![NetRef::Const(Constant {
                    value: "4'b1010".to_string(),
                    ty: ConstantType::Binary,
                })],
            }),
        ]
    );
}

#[test]
fn empty_module() {
    let (reader, code) = parse("module m(); endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(reader.emitter().events, vec![Event::Module(n("m"))]);
}

#[test]
fn zero_range_is_distinct_from_unranged() {
    let (reader, code) = parse("module m(); wire [0:0] a; wire b; endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events[1..],
        vec![
            Event::Net(Net {
                names: vec![n("a")],
                beg: 0,
                end: 0,
                ty: NetType::Wire,
            }),
            Event::Net(Net {
                names: vec![n("b")],
                beg: -1,
                end: -1,
                ty: NetType::Wire,
            }),
        ][..]
    );
}

#[test]
fn descending_range_is_not_reordered() {
    let (reader, code) = parse("module m(); wire [0:7] w; endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events[1],
        Event::Net(Net {
            names: vec![n("w")],
            beg: 0,
            end: 7,
            ty: NetType::Wire,
        })
    );
}

#[test]
fn single_element_concat_collapses() {
    let (reader, code) = parse("module m(); assign {y} = {a}; endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events[1],
        Event::Assignment(Assignment {
            lhs: vec![NetRef::Whole(n("y"))],
            rhs: vec![NetRef::Whole(n("a"))],
        })
    );
}

#[test]
fn shared_declaration_yields_one_record() {
    let (reader, code) = parse("module m(); input wire [3:0] a, b; endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events[1],
        Event::Port(Port {
            names: vec![n("a"), n("b")],
            beg: 3,
            end: 0,
            dir: PortDirection::Input,
            ty: ConnectionType::Wire,
        })
    );
}

#[test]
fn reg_port_binding() {
    let (reader, code) = parse("module m(output reg q); endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events[1],
        Event::Port(Port {
            names: vec![n("q")],
            beg: -1,
            end: -1,
            dir: PortDirection::Output,
            ty: ConnectionType::Reg,
        })
    );
}

#[test]
fn header_port_overridden_by_body_declaration() {
    let (reader, code) = parse("module m(a, b); output b; endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    // `b` is emitted at its body declaration with the overriding direction;
    // `a` is flushed at `endmodule` as an unranged input, with a warning.
    assert_eq!(
        reader.emitter().events,
        vec![
            Event::Module(n("m")),
            Event::Port(Port {
                names: vec![n("b")],
                beg: -1,
                end: -1,
                dir: PortDirection::Output,
                ty: ConnectionType::None,
            }),
            Event::Port(Port {
                names: vec![n("a")],
                beg: -1,
                end: -1,
                dir: PortDirection::Input,
                ty: ConnectionType::None,
            }),
        ]
    );
    let warnings: Vec<_> = reader
        .diagnostics()
        .iter()
        .filter(|d| d.get_severity() == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
}

#[test]
fn empty_named_connection() {
    let (reader, code) = parse("module m(); buf b1(.Y(), .A(a)); endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events[1],
        Event::Instance(Instance {
            module_name: n("buf"),
            inst_name: n("b1"),
            pin_names: vec![NetRef::Whole(n("Y")), NetRef::Whole(n("A"))],
            net_names: vec![vec![], vec![NetRef::Whole(n("a"))]],
        })
    );
}

#[test]
fn instance_without_connections() {
    let (reader, code) = parse("module m(); blackbox u0(); endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events[1],
        Event::Instance(Instance {
            module_name: n("blackbox"),
            inst_name: n("u0"),
            pin_names: vec![],
            net_names: vec![],
        })
    );
}

#[test]
fn positional_connection_with_constant() {
    let (reader, code) = parse("module m(); foo f(1'b0, x); endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events[1],
        Event::Instance(Instance {
            module_name: n("foo"),
            inst_name: n("f"),
            pin_names: vec![],
            net_names: vec![
                vec![NetRef::Const(Constant {
                    value: "1'b0".to_string(),
                    ty: ConstantType::Binary,
                })],
                vec![NetRef::Whole(n("x"))],
            ],
        })
    );
}

#[test]
fn escaped_identifiers_are_interned_without_backslash() {
    let (reader, code) = parse("module m(); wire \\bus+index ; assign \\bus+index = a; endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events[1],
        Event::Net(Net {
            names: vec![n("bus+index")],
            beg: -1,
            end: -1,
            ty: NetType::Wire,
        })
    );
}

#[test]
fn modules_arrive_in_source_order() {
    let (reader, code) = parse("module a(); endmodule module b(); endmodule module c(); endmodule");
    assert_eq!(code, 0);
    let n = |s: &str| reader.intern().intern(s);
    assert_eq!(
        reader.emitter().events,
        vec![
            Event::Module(n("a")),
            Event::Module(n("b")),
            Event::Module(n("c")),
        ]
    );
}

#[test]
fn formatting_does_not_change_records() {
    let terse = "module m(input [3:0] a,output y);wire w;assign y=w;endmodule";
    let airy = "module m (\n  input [3:0] a, // data\n  output y\n);\n  /* nets */\n  wire w;\n  assign y = w;\nendmodule\n";
    let (r1, c1) = parse(terse);
    let (r2, c2) = parse(airy);
    assert_eq!(c1, 0);
    assert_eq!(c2, 0);
    assert_eq!(render(&r1), render(&r2));
}

#[test]
fn missing_endmodule_is_reported() {
    let (reader, code) = parse("module m(); wire w;");
    assert!(code > 0);
    // The records recognized before the error were still delivered.
    assert_eq!(reader.emitter().events.len(), 2);
}

#[test]
fn parser_recovers_at_statement_boundary() {
    let (reader, code) =
        parse("module m(); wire w; assign = 1; assign w = 1'b0; endmodule");
    assert_eq!(code, 1);
    let n = |s: &str| reader.intern().intern(s);
    // The bad assignment is discarded, the surrounding records survive.
    assert_eq!(reader.emitter().events.len(), 3);
    assert_eq!(
        reader.emitter().events[2],
        Event::Assignment(Assignment {
            lhs: vec![NetRef::Whole(n("w"))],
            rhs: vec![NetRef::Const(Constant {
                value: "1'b0".to_string(),
                ty: ConstantType::Binary,
            })],
        })
    );
}

#[test]
fn lexical_garbage_is_recoverable() {
    let (reader, code) = parse("module m(); wire w; @@@\n assign w = 1'b1; endmodule");
    assert!(code > 0);
    assert_eq!(reader.emitter().events.len(), 3);
}

#[test]
fn read_missing_file_returns_minus_one() {
    let mut reader = Reader::new(Recorder::default());
    assert_eq!(reader.read("/nonexistent/netlist.v"), -1);
    assert!(reader.emitter().events.is_empty());
}

#[test]
fn read_from_disk() {
    let path = std::env::temp_dir().join("vnl_read_test.v");
    std::fs::write(&path, "module m(); wire w; endmodule\n").unwrap();
    let mut reader = Reader::new(Recorder::default());
    let code = reader.read(path.to_str().unwrap());
    assert_eq!(code, 0);
    assert_eq!(reader.emitter().events.len(), 2);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn name_table_persists_across_reads() {
    let mut reader = Reader::new(Recorder::default());
    reader.read_source(&SourceFile::new("a.v", "module m(); wire w; endmodule".into()));
    let w = reader.intern().find("w");
    assert!(w.is_some());
    reader.read_source(&SourceFile::new("b.v", "module n(); wire w; endmodule".into()));
    assert_eq!(reader.intern().find("w"), w);
}

#[test]
fn round_trip() {
    let input = "\
module top(a, b);
  input [3:0] a;
  output reg b;
  wire [7:0] w, v;
  supply0 gnd;
  assign {w[7], w[6]} = 2'b10;
  assign b = a[0];
  dff u1(.Q(b), .D(w[0]), .CK());
  foo u2(v, {a[3:0], 4'hF});
endmodule
module empty();
endmodule
";
    let (first, c1) = parse(input);
    assert_eq!(c1, 0);
    let (second, c2) = parse(&to_source(&first));
    assert_eq!(c2, 0);
    assert_eq!(render(&first), render(&second));
}
