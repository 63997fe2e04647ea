// Copyright (c) 2016-2021 Fabian Schuiki

//! The data model for structural Verilog netlists. Each struct in this module
//! corresponds to one callback on the emitter interface and is handed over to
//! the host by value. Identifiers are carried as [`Name`](crate::name::Name)
//! tags; the strings themselves stay in the reader's name table.

use crate::name::{Name, NameTable};
use std::fmt;

/// The base family of a constant.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConstantType {
    None,
    Integer,
    Binary,
    Octal,
    Decimal,
    Hex,
    Real,
    Exp,
}

/// A literal constant. The value holds the textual form as it appeared in
/// the source, with `_` separators removed; sized literals retain both the
/// size prefix and the base-tagged digits.
#[derive(Clone, PartialEq, Debug)]
pub struct Constant {
    pub value: String,
    pub ty: ConstantType,
}

/// The direction of a module port.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PortDirection {
    Input,
    Output,
    Inout,
}

impl PortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            PortDirection::Input => "input",
            PortDirection::Output => "output",
            PortDirection::Inout => "inout",
        }
    }
}

/// The net kind bound to a port declaration, if any.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConnectionType {
    None,
    Wire,
    Reg,
}

impl ConnectionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionType::None => "",
            ConnectionType::Wire => "wire",
            ConnectionType::Reg => "reg",
        }
    }
}

/// The kind of a declared net.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NetType {
    None,
    Reg,
    Wire,
    Wand,
    Wor,
    Tri,
    Trior,
    Triand,
    Supply0,
    Supply1,
}

impl NetType {
    pub fn as_str(self) -> &'static str {
        match self {
            NetType::None => "",
            NetType::Reg => "reg",
            NetType::Wire => "wire",
            NetType::Wand => "wand",
            NetType::Wor => "wor",
            NetType::Tri => "tri",
            NetType::Trior => "trior",
            NetType::Triand => "triand",
            NetType::Supply0 => "supply0",
            NetType::Supply1 => "supply1",
        }
    }
}

/// A port declaration. A single declaration may introduce several names that
/// share the same range and direction, e.g. `input [3:0] a, b;`. A `beg` and
/// `end` of −1 mean the declaration is unranged.
#[derive(Clone, PartialEq, Debug)]
pub struct Port {
    pub names: Vec<Name>,
    pub beg: i32,
    pub end: i32,
    pub dir: PortDirection,
    pub ty: ConnectionType,
}

/// A net declaration. Like ports, several names may share one declaration.
#[derive(Clone, PartialEq, Debug)]
pub struct Net {
    pub names: Vec<Name>,
    pub beg: i32,
    pub end: i32,
    pub ty: NetType,
}

/// A reference to a net, or a fragment thereof, as it appears inside an
/// assignment or an instance connection. The set of variants is closed; the
/// `Const` variant only occurs on the right hand side of assignments and in
/// instance connection expressions.
#[derive(Clone, PartialEq, Debug)]
pub enum NetRef {
    /// A bare identifier, e.g. `a`.
    Whole(Name),
    /// A single bit select, e.g. `a[2]`.
    Bit(Name, i32),
    /// A range select, e.g. `a[3:0]`.
    Range(Name, i32, i32),
    /// A literal constant.
    Const(Constant),
}

/// A continuous assignment. Either side may be a concatenation, in which
/// case the elements appear in source order, left to right.
#[derive(Clone, PartialEq, Debug)]
pub struct Assignment {
    pub lhs: Vec<NetRef>,
    pub rhs: Vec<NetRef>,
}

/// A module instantiation. `pin_names` is empty for positional connections;
/// otherwise it is parallel to `net_names`. Each entry of `net_names` is one
/// connection's expression, which may itself be a concatenation.
#[derive(Clone, PartialEq, Debug)]
pub struct Instance {
    pub module_name: Name,
    pub inst_name: Name,
    pub pin_names: Vec<NetRef>,
    pub net_names: Vec<Vec<NetRef>>,
}

/// Writes an identifier, falling back to the escaped form when the interned
/// text is not a plain Verilog identifier.
fn write_name(f: &mut fmt::Formatter, table: &NameTable, name: Name) -> fmt::Result {
    let text = table.get(name);
    let plain = text.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if plain {
        write!(f, "{}", text)
    } else {
        write!(f, "\\{} ", text)
    }
}

fn write_names(f: &mut fmt::Formatter, table: &NameTable, names: &[Name]) -> fmt::Result {
    for (i, &name) in names.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_name(f, table, name)?;
    }
    Ok(())
}

fn write_net_ref(f: &mut fmt::Formatter, table: &NameTable, netref: &NetRef) -> fmt::Result {
    match *netref {
        NetRef::Whole(name) => write_name(f, table, name),
        NetRef::Bit(name, bit) => {
            write_name(f, table, name)?;
            write!(f, "[{}]", bit)
        }
        NetRef::Range(name, beg, end) => {
            write_name(f, table, name)?;
            write!(f, "[{}:{}]", beg, end)
        }
        NetRef::Const(ref c) => write!(f, "{}", c.value),
    }
}

/// Writes a connection expression, bracing it when it is a concatenation.
fn write_concat(f: &mut fmt::Formatter, table: &NameTable, refs: &[NetRef]) -> fmt::Result {
    if refs.len() > 1 {
        write!(f, "{{")?;
    }
    for (i, r) in refs.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_net_ref(f, table, r)?;
    }
    if refs.len() > 1 {
        write!(f, "}}")?;
    }
    Ok(())
}

macro_rules! display_adaptor {
    ($record:ident, $adaptor:ident) => {
        impl $record {
            /// Render this record as canonical Verilog, resolving names
            /// against the given table.
            pub fn display<'a>(&'a self, table: &'a NameTable) -> $adaptor<'a> {
                $adaptor {
                    record: self,
                    table,
                }
            }
        }

        pub struct $adaptor<'a> {
            record: &'a $record,
            table: &'a NameTable,
        }
    };
}

display_adaptor!(Port, PortDisplay);
display_adaptor!(Net, NetDisplay);
display_adaptor!(NetRef, NetRefDisplay);
display_adaptor!(Assignment, AssignmentDisplay);
display_adaptor!(Instance, InstanceDisplay);

impl fmt::Display for PortDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.record.dir.as_str())?;
        if self.record.ty != ConnectionType::None {
            write!(f, " {}", self.record.ty.as_str())?;
        }
        if self.record.beg != -1 {
            write!(f, " [{}:{}]", self.record.beg, self.record.end)?;
        }
        write!(f, " ")?;
        write_names(f, self.table, &self.record.names)?;
        write!(f, ";")
    }
}

impl fmt::Display for NetDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.record.ty != NetType::None {
            write!(f, "{} ", self.record.ty.as_str())?;
        }
        if self.record.beg != -1 {
            write!(f, "[{}:{}] ", self.record.beg, self.record.end)?;
        }
        write_names(f, self.table, &self.record.names)?;
        write!(f, ";")
    }
}

impl fmt::Display for NetRefDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_net_ref(f, self.table, self.record)
    }
}

impl fmt::Display for AssignmentDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "assign ")?;
        write_concat(f, self.table, &self.record.lhs)?;
        write!(f, " = ")?;
        write_concat(f, self.table, &self.record.rhs)?;
        write!(f, ";")
    }
}

impl fmt::Display for InstanceDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_name(f, self.table, self.record.module_name)?;
        write!(f, " ")?;
        write_name(f, self.table, self.record.inst_name)?;
        write!(f, " (")?;
        if !self.record.pin_names.is_empty() {
            for (i, pin) in self.record.pin_names.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, ".")?;
                write_net_ref(f, self.table, pin)?;
                write!(f, "(")?;
                write_concat(f, self.table, &self.record.net_names[i])?;
                write!(f, ")")?;
            }
        } else {
            for (i, conn) in self.record.net_names.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_concat(f, self.table, conn)?;
            }
        }
        write!(f, ");")
    }
}
