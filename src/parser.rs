// Copyright (c) 2016-2021 Fabian Schuiki

//! A recursive descent parser for the structural subset of Verilog: module
//! headers, port and net declarations, continuous assignments, and module
//! instantiations. Each recognized construct is synthesized into a record
//! from [`crate::ast`] and pushed through the emitter as soon as it has been
//! reduced, so the host observes constructs in strict source order.

use crate::ast::*;
use crate::errors::*;
use crate::lexer::{Lexer, TokenAndSpan};
use crate::name::{Name, NameTable};
use crate::source::{SourceFile, Span, INVALID_SPAN};
use crate::token::*;
use crate::NetlistEmitter;
use std::collections::{HashSet, VecDeque};

/// Return type of functions that emit diagnostic messages and only need to
/// communicate success to the parent.
type ReportedResult<T> = Result<T, ()>;

/// Parse a source file, delivering one callback per recognized construct.
/// Returns the diagnostics that were produced along the way; the parser
/// attempts to resynchronize at the next `;` or `endmodule` after an error,
/// so a single bad statement does not suppress the rest of the file.
pub fn parse<E: NetlistEmitter>(
    file: &SourceFile,
    table: &NameTable,
    emit: &mut E,
) -> Vec<DiagBuilder> {
    let mut p = Parser::new(Lexer::new(file, table), file, table, emit);
    p.parse_source_text();
    p.diagnostics
}

/// Names a module lists in its port header without directions, to be
/// reconciled against the direction declarations in the module body.
#[derive(Default)]
struct ModuleHeader {
    pending: Vec<(Name, Span)>,
    declared: HashSet<Name>,
}

struct Parser<'a, E> {
    input: Lexer<'a>,
    file: &'a SourceFile,
    table: &'a NameTable,
    emit: &'a mut E,
    queue: VecDeque<TokenAndSpan>,
    diagnostics: Vec<DiagBuilder>,
    last_span: Span,
    severity: Severity,
}

impl<'a, E: NetlistEmitter> Parser<'a, E> {
    fn new(
        input: Lexer<'a>,
        file: &'a SourceFile,
        table: &'a NameTable,
        emit: &'a mut E,
    ) -> Parser<'a, E> {
        Parser {
            input,
            file,
            table,
            emit,
            queue: VecDeque::new(),
            diagnostics: Vec::new(),
            last_span: INVALID_SPAN,
            severity: Severity::Note,
        }
    }

    fn ensure_queue_filled(&mut self, min_tokens: usize) {
        if let Some(&(Eof, _)) = self.queue.back() {
            return;
        }
        while self.queue.len() <= min_tokens {
            match self.input.next_token() {
                Ok(tkn) => self.queue.push_back(tkn),
                Err(x) => self.add_diag(x),
            }
        }
    }

    fn peek(&mut self, offset: usize) -> TokenAndSpan {
        self.ensure_queue_filled(offset);
        if offset < self.queue.len() {
            self.queue[offset]
        } else {
            *self
                .queue
                .back()
                .expect("at least an Eof token should be in the queue")
        }
    }

    fn bump(&mut self) {
        if self.queue.is_empty() {
            self.ensure_queue_filled(1);
        }
        if let Some((_, sp)) = self.queue.pop_front() {
            self.last_span = sp;
        }
    }

    fn skip(&mut self) {
        self.bump()
    }

    fn add_diag(&mut self, diag: DiagBuilder) {
        eprintln!();
        eprintln!("{}", diag.display(self.file));

        // Keep track of the worst diagnostic severity we have encountered,
        // such that parsing can be aborted accordingly.
        if diag.get_severity() > self.severity {
            self.severity = diag.get_severity();
        }
        self.diagnostics.push(diag);
    }

    fn is_fatal(&self) -> bool {
        self.severity >= Severity::Fatal
    }

    fn try_eat(&mut self, expect: Token) -> bool {
        match self.peek(0) {
            (actual, _) if actual == expect => {
                self.bump();
                true
            }
            _ => false,
        }
    }

    fn require_reported(&mut self, expect: Token) -> ReportedResult<()> {
        match self.peek(0) {
            (actual, _) if actual == expect => {
                self.bump();
                Ok(())
            }
            (wrong, span) => {
                self.add_diag(
                    DiagBuilder::error(format!(
                        "expected `{}`, but found `{}` instead",
                        expect, wrong
                    ))
                    .span(span),
                );
                Err(())
            }
        }
    }

    fn try_eat_ident(&mut self) -> Option<(Name, Span)> {
        match self.peek(0) {
            (Ident(name), span) | (EscIdent(name), span) => {
                self.bump();
                Some((name, span))
            }
            _ => None,
        }
    }

    fn eat_ident(&mut self, msg: &str) -> ReportedResult<(Name, Span)> {
        match self.peek(0) {
            (Ident(name), span) | (EscIdent(name), span) => {
                self.bump();
                Ok((name, span))
            }
            (tkn, span) => {
                self.add_diag(
                    DiagBuilder::error(format!("expected {} before `{}`", msg, tkn)).span(span),
                );
                Err(())
            }
        }
    }

    fn is_ident_at(&mut self, offset: usize) -> bool {
        match self.peek(offset).0 {
            Ident(_) | EscIdent(_) => true,
            _ => false,
        }
    }

    /// Skip tokens until one of the terminators is found at the current
    /// nesting depth, keeping delimiters balanced along the way.
    fn recover_balanced(&mut self, terminators: &[Token], eat_terminator: bool) {
        let mut stack = Vec::new();
        loop {
            let (tkn, sp) = self.peek(0);
            if stack.is_empty() {
                for t in terminators {
                    if *t == tkn {
                        if eat_terminator {
                            self.skip();
                        }
                        return;
                    }
                }
            }

            match tkn {
                OpenDelim(x) => stack.push(x),
                CloseDelim(x) => {
                    let balanced = stack.pop().map(|open| open == x).unwrap_or(false);
                    if !balanced {
                        self.add_diag(
                            DiagBuilder::error(format!(
                                "found unbalanced closing `{}` during recovery",
                                CloseDelim(x)
                            ))
                            .span(sp),
                        );
                        self.skip();
                        break;
                    }
                }
                Eof => break,
                _ => (),
            }
            self.skip();
        }
    }

    /// Parses the opening delimiter, calls the `inner` function, and parses
    /// the closing delimiter. Properly recovers to and including the closing
    /// delimiter if the `inner` function throws an error.
    fn flanked<R, F>(&mut self, delim: DelimToken, mut inner: F) -> ReportedResult<R>
    where
        F: FnMut(&mut Self) -> ReportedResult<R>,
    {
        self.require_reported(OpenDelim(delim))?;
        match inner(self) {
            Ok(r) => match self.require_reported(CloseDelim(delim)) {
                Ok(_) => Ok(r),
                Err(e) => {
                    self.recover_balanced(&[CloseDelim(delim)], true);
                    Err(e)
                }
            },
            Err(e) => {
                self.recover_balanced(&[CloseDelim(delim)], true);
                Err(e)
            }
        }
    }

    fn parse_source_text(&mut self) {
        loop {
            if self.is_fatal() {
                break;
            }
            match self.peek(0) {
                (Eof, _) => break,
                (Keyword(Kw::Module), _) => {
                    let _ = self.parse_module();
                }
                (tkn, sp) => {
                    self.add_diag(
                        DiagBuilder::error(format!(
                            "expected `module`, but found `{}` instead",
                            tkn
                        ))
                        .span(sp),
                    );
                    loop {
                        match self.peek(0).0 {
                            Eof | Keyword(Kw::Module) => break,
                            _ => self.skip(),
                        }
                    }
                }
            }
        }
    }

    fn parse_module(&mut self) -> ReportedResult<()> {
        self.require_reported(Keyword(Kw::Module))?;
        let (name, _) = match self.try_eat_ident() {
            Some(x) => x,
            None => {
                let (tkn, sp) = self.peek(0);
                self.add_diag(
                    DiagBuilder::error(format!("expected module name before `{}`", tkn)).span(sp),
                );
                self.recover_balanced(&[Keyword(Kw::Endmodule)], true);
                return Err(());
            }
        };
        trace!("parsing module `{}`", self.table.get(name));
        self.emit.add_module(name);

        // Parse the optional port header. A header of bare names defers the
        // port records until the body declarations are known.
        let mut header = ModuleHeader::default();
        if self.peek(0).0 == OpenDelim(Paren) {
            let _ = self.flanked(Paren, |p| p.parse_port_header(&mut header));
        }

        if !self.try_eat(Semicolon) {
            let sp = self.peek(0).1;
            self.add_diag(
                DiagBuilder::error(format!(
                    "missing `;` after header of module `{}`",
                    self.table.get(name)
                ))
                .span(sp),
            );
        }

        // Parse the module items.
        while !self.is_fatal() && self.peek(0).0 != Keyword(Kw::Endmodule) && self.peek(0).0 != Eof
        {
            if self.try_eat(Semicolon) {
                continue;
            }
            let _ = self.parse_item(&mut header);
        }

        // Header ports that were never declared in the body are emitted now,
        // with the direction defaulted to input.
        self.flush_header_ports(&mut header);

        self.require_reported(Keyword(Kw::Endmodule))?;
        Ok(())
    }

    fn parse_port_header(&mut self, header: &mut ModuleHeader) -> ReportedResult<()> {
        if self.peek(0).0 == CloseDelim(Paren) {
            return Ok(());
        }
        match self.peek(0).0 {
            Keyword(kw) if as_port_direction(kw).is_some() => self.parse_ansi_ports(),
            _ => self.parse_nonansi_ports(header),
        }
    }

    /// Parse an ANSI style port list, e.g. `(input [3:0] a, output y)`. Each
    /// directional declaration produces one port record right away.
    fn parse_ansi_ports(&mut self) -> ReportedResult<()> {
        loop {
            let dir = self.eat_direction()?;
            let ty = self.parse_connection_type();
            let (beg, end) = self.parse_opt_range()?;
            let mut names = vec![self.eat_ident("port name")?.0];
            // A comma followed by another name extends the current
            // declaration; a comma followed by a direction starts a new one.
            while self.peek(0).0 == Comma && self.is_ident_at(1) {
                self.bump();
                names.push(self.eat_ident("port name")?.0);
            }
            self.emit.add_port(Port {
                names,
                beg,
                end,
                dir,
                ty,
            });
            if !self.try_eat(Comma) {
                break;
            }
        }
        Ok(())
    }

    /// Parse a non-ANSI port list of bare names, e.g. `(a, b, c)`. No port
    /// records are emitted yet; the names are reconciled against the body.
    fn parse_nonansi_ports(&mut self, header: &mut ModuleHeader) -> ReportedResult<()> {
        loop {
            let (name, sp) = self.eat_ident("port name")?;
            if !header.pending.iter().any(|&(n, _)| n == name) {
                header.pending.push((name, sp));
            }
            if !self.try_eat(Comma) {
                break;
            }
            if self.peek(0).0 == CloseDelim(Paren) {
                let sp = self.last_span;
                self.add_diag(DiagBuilder::warning("superfluous trailing comma").span(sp));
                break;
            }
        }
        Ok(())
    }

    fn parse_item(&mut self, header: &mut ModuleHeader) -> ReportedResult<()> {
        let (tkn, sp) = self.peek(0);
        let result = match tkn {
            Keyword(kw) if as_port_direction(kw).is_some() => self.parse_port_decl(header),
            Keyword(kw) if as_net_type(kw).is_some() => self.parse_net_decl(),
            Keyword(Kw::Assign) => self.parse_assignment(),
            Ident(_) | EscIdent(_) => self.parse_instance(),
            _ => {
                self.add_diag(
                    DiagBuilder::error(format!(
                        "expected a declaration, `assign`, or an instantiation, but found `{}` \
                         instead",
                        tkn
                    ))
                    .span(sp),
                );
                self.bump();
                Err(())
            }
        };
        if result.is_err() {
            self.recover_balanced(&[Semicolon, Keyword(Kw::Endmodule)], false);
            self.try_eat(Semicolon);
        }
        result
    }

    /// Parse a port declaration in the module body, e.g. `input wire a, b;`.
    /// This also settles the direction of ports listed in a non-ANSI header.
    fn parse_port_decl(&mut self, header: &mut ModuleHeader) -> ReportedResult<()> {
        let dir = self.eat_direction()?;
        let ty = self.parse_connection_type();
        let (beg, end) = self.parse_opt_range()?;
        let mut names = Vec::new();
        loop {
            let (name, _) = self.eat_ident("port name")?;
            names.push(name);
            if !self.try_eat(Comma) {
                break;
            }
        }
        self.require_reported(Semicolon)?;
        for &name in &names {
            header.declared.insert(name);
        }
        self.emit.add_port(Port {
            names,
            beg,
            end,
            dir,
            ty,
        });
        Ok(())
    }

    fn parse_net_decl(&mut self) -> ReportedResult<()> {
        let (tkn, sp) = self.peek(0);
        let ty = match tkn {
            Keyword(kw) => match as_net_type(kw) {
                Some(ty) => {
                    self.bump();
                    ty
                }
                None => {
                    self.add_diag(
                        DiagBuilder::error(format!("expected a net type before `{}`", tkn))
                            .span(sp),
                    );
                    return Err(());
                }
            },
            _ => {
                self.add_diag(
                    DiagBuilder::error(format!("expected a net type before `{}`", tkn)).span(sp),
                );
                return Err(());
            }
        };
        let (beg, end) = self.parse_opt_range()?;
        let mut names = Vec::new();
        loop {
            let (name, _) = self.eat_ident("net name")?;
            names.push(name);
            if !self.try_eat(Comma) {
                break;
            }
        }
        self.require_reported(Semicolon)?;
        self.emit.add_net(Net {
            names,
            beg,
            end,
            ty,
        });
        Ok(())
    }

    fn parse_assignment(&mut self) -> ReportedResult<()> {
        self.require_reported(Keyword(Kw::Assign))?;
        let lhs = self.parse_lvalue_concat()?;
        self.require_reported(Equal)?;
        let rhs = self.parse_expr_concat()?;
        self.require_reported(Semicolon)?;
        self.emit.add_assignment(Assignment { lhs, rhs });
        Ok(())
    }

    fn parse_instance(&mut self) -> ReportedResult<()> {
        let (module_name, _) = self.eat_ident("module name")?;
        let (inst_name, _) = self.eat_ident("instance name")?;
        trace!(
            "parsing instance `{}` of `{}`",
            self.table.get(inst_name),
            self.table.get(module_name)
        );
        let mut pin_names = Vec::new();
        let mut net_names = Vec::new();
        self.flanked(Paren, |p| {
            if p.peek(0).0 == CloseDelim(Paren) {
                return Ok(());
            }
            if p.peek(0).0 == Period {
                // Named connections, e.g. `.A(a)`. An empty parenthesized
                // connection leaves the pin unconnected.
                loop {
                    p.require_reported(Period)?;
                    let pin = p.parse_net_ref()?;
                    let conn = p.flanked(Paren, |p| {
                        if p.peek(0).0 == CloseDelim(Paren) {
                            Ok(Vec::new())
                        } else {
                            p.parse_expr_concat()
                        }
                    })?;
                    pin_names.push(pin);
                    net_names.push(conn);
                    if !p.try_eat(Comma) {
                        break;
                    }
                }
            } else {
                // Positional connections.
                loop {
                    net_names.push(p.parse_expr_concat()?);
                    if !p.try_eat(Comma) {
                        break;
                    }
                }
            }
            Ok(())
        })?;
        self.require_reported(Semicolon)?;
        self.emit.add_instance(Instance {
            module_name,
            inst_name,
            pin_names,
            net_names,
        });
        Ok(())
    }

    /// Parse the left hand side of an assignment: a net reference or a
    /// concatenation of net references.
    fn parse_lvalue_concat(&mut self) -> ReportedResult<Vec<NetRef>> {
        if self.peek(0).0 == OpenDelim(Brace) {
            self.flanked(Brace, |p| {
                let mut refs = vec![p.parse_net_ref()?];
                while p.try_eat(Comma) {
                    refs.push(p.parse_net_ref()?);
                }
                Ok(refs)
            })
        } else {
            Ok(vec![self.parse_net_ref()?])
        }
    }

    /// Parse a connection expression: a net reference or constant, or a
    /// concatenation thereof.
    fn parse_expr_concat(&mut self) -> ReportedResult<Vec<NetRef>> {
        if self.peek(0).0 == OpenDelim(Brace) {
            self.flanked(Brace, |p| {
                let mut refs = vec![p.parse_expr()?];
                while p.try_eat(Comma) {
                    refs.push(p.parse_expr()?);
                }
                Ok(refs)
            })
        } else {
            Ok(vec![self.parse_expr()?])
        }
    }

    /// Parse a net reference: an identifier with an optional bit or range
    /// select, e.g. `a`, `a[2]`, or `a[3:0]`.
    fn parse_net_ref(&mut self) -> ReportedResult<NetRef> {
        let (name, _) = self.eat_ident("net name")?;
        if self.peek(0).0 != OpenDelim(Brack) {
            return Ok(NetRef::Whole(name));
        }
        self.flanked(Brack, |p| {
            let beg = p.parse_int("bit index")?;
            if p.try_eat(Colon) {
                let end = p.parse_int("bit index")?;
                Ok(NetRef::Range(name, beg, end))
            } else {
                Ok(NetRef::Bit(name, beg))
            }
        })
    }

    fn parse_expr(&mut self) -> ReportedResult<NetRef> {
        match self.peek(0) {
            (Literal(lit), _) => {
                self.bump();
                Ok(NetRef::Const(self.make_constant(lit)))
            }
            (Ident(_), _) | (EscIdent(_), _) => self.parse_net_ref(),
            (tkn, sp) => {
                self.add_diag(
                    DiagBuilder::error(format!(
                        "expected a net or a constant, but found `{}` instead",
                        tkn
                    ))
                    .span(sp),
                );
                Err(())
            }
        }
    }

    /// Parse an optional range suffix on a declaration. A missing range is
    /// the (−1, −1) sentinel pair; a single index `[k]` collapses to
    /// `(k, k)`. Bounds are kept in source order.
    fn parse_opt_range(&mut self) -> ReportedResult<(i32, i32)> {
        if self.peek(0).0 != OpenDelim(Brack) {
            return Ok((-1, -1));
        }
        self.flanked(Brack, |p| {
            let beg = p.parse_int("range bound")?;
            if p.try_eat(Colon) {
                let end = p.parse_int("range bound")?;
                Ok((beg, end))
            } else {
                Ok((beg, beg))
            }
        })
    }

    fn parse_int(&mut self, msg: &str) -> ReportedResult<i32> {
        match self.peek(0) {
            (Literal(Integer(name)), sp) => {
                self.bump();
                match self.table.get(name).parse::<i32>() {
                    Ok(v) => Ok(v),
                    Err(_) => {
                        self.add_diag(
                            DiagBuilder::error(format!(
                                "integer `{}` is out of range",
                                self.table.get(name)
                            ))
                            .span(sp),
                        );
                        Err(())
                    }
                }
            }
            (tkn, sp) => {
                self.add_diag(
                    DiagBuilder::error(format!("expected {} before `{}`", msg, tkn)).span(sp),
                );
                Err(())
            }
        }
    }

    fn eat_direction(&mut self) -> ReportedResult<PortDirection> {
        let (tkn, sp) = self.peek(0);
        if let Keyword(kw) = tkn {
            if let Some(dir) = as_port_direction(kw) {
                self.bump();
                return Ok(dir);
            }
        }
        self.add_diag(
            DiagBuilder::error(format!("expected a port direction before `{}`", tkn)).span(sp),
        );
        Err(())
    }

    /// Consume an optional `wire` or `reg` binding on a port declaration.
    fn parse_connection_type(&mut self) -> ConnectionType {
        match self.peek(0).0 {
            Keyword(Kw::Wire) => {
                self.bump();
                ConnectionType::Wire
            }
            Keyword(Kw::Reg) => {
                self.bump();
                ConnectionType::Reg
            }
            _ => ConnectionType::None,
        }
    }

    fn make_constant(&self, lit: Lit) -> Constant {
        match lit {
            Integer(name) => Constant {
                value: self.table.get(name).to_string(),
                ty: ConstantType::Integer,
            },
            Real(name) => Constant {
                value: self.table.get(name).to_string(),
                ty: ConstantType::Real,
            },
            Exp(name) => Constant {
                value: self.table.get(name).to_string(),
                ty: ConstantType::Exp,
            },
            Based(name, base) => Constant {
                value: self.table.get(name).to_string(),
                ty: match base {
                    'b' => ConstantType::Binary,
                    'o' => ConstantType::Octal,
                    'd' => ConstantType::Decimal,
                    'h' => ConstantType::Hex,
                    _ => ConstantType::None,
                },
            },
        }
    }

    fn flush_header_ports(&mut self, header: &mut ModuleHeader) {
        let pending = std::mem::take(&mut header.pending);
        for (name, sp) in pending {
            if header.declared.contains(&name) {
                continue;
            }
            self.add_diag(
                DiagBuilder::warning(format!(
                    "port `{}` is listed in the module header but never declared in the body",
                    self.table.get(name)
                ))
                .span(sp)
                .add_note("the port is recorded as an unranged input"),
            );
            self.emit.add_port(Port {
                names: vec![name],
                beg: -1,
                end: -1,
                dir: PortDirection::Input,
                ty: ConnectionType::None,
            });
        }
    }
}

fn as_port_direction(kw: Kw) -> Option<PortDirection> {
    Some(match kw {
        Kw::Input => PortDirection::Input,
        Kw::Output => PortDirection::Output,
        Kw::Inout => PortDirection::Inout,
        _ => return None,
    })
}

fn as_net_type(kw: Kw) -> Option<NetType> {
    Some(match kw {
        Kw::Reg => NetType::Reg,
        Kw::Wire => NetType::Wire,
        Kw::Wand => NetType::Wand,
        Kw::Wor => NetType::Wor,
        Kw::Tri => NetType::Tri,
        Kw::Triand => NetType::Triand,
        Kw::Trior => NetType::Trior,
        Kw::Supply0 => NetType::Supply0,
        Kw::Supply1 => NetType::Supply1,
        _ => return None,
    })
}
