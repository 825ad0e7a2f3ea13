//! Java source rendering for generated classes.

use crate::ast::{Block, Expr, Stmt};
use crate::model::{FieldDecl, GeneratedClass, MethodDecl};
use std::collections::BTreeSet;
use weft_model::{Modifier, Param};

/// Incrementally builds indented source text.
#[derive(Debug, Clone)]
struct SourceBuilder {
    content: String,
    indent_level: usize,
    indent: String,
}

impl SourceBuilder {
    fn new(indent: &str) -> Self {
        Self {
            content: String::new(),
            indent_level: 0,
            indent: indent.to_string(),
        }
    }

    fn push_line(&mut self, line: &str) {
        if !line.is_empty() {
            self.push_indent();
            self.content.push_str(line);
        }
        self.content.push('\n');
    }

    fn push_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.content.push_str(&self.indent);
        }
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    fn build(self) -> String {
        self.content
    }
}

/// Renders [`GeneratedClass`]es as Java compilation units.
#[derive(Debug, Clone)]
pub struct JavaRenderer {
    indent: String,
}

impl Default for JavaRenderer {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
        }
    }
}

impl JavaRenderer {
    /// A renderer indenting with `indent`.
    pub fn with_indent(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
        }
    }

    /// Renders a whole compilation unit for `class`.
    pub fn render_class(&self, class: &GeneratedClass) -> String {
        let mut out = SourceBuilder::new(&self.indent);
        if !class.package().is_empty() {
            out.push_line(&format!("package {};", class.package()));
            out.push_line("");
        }
        out.push_line(&format!(
            "public class {} extends {} {{",
            class.simple_name(),
            class.superclass
        ));
        out.indent();
        if !class.fields.is_empty() {
            out.push_line("");
            for field in &class.fields {
                self.field(&mut out, field);
            }
        }
        for method in &class.methods {
            out.push_line("");
            self.method(&mut out, method);
        }
        out.dedent();
        out.push_line("}");
        out.build()
    }

    /// Renders one method, unindented.
    pub fn render_method(&self, method: &MethodDecl) -> String {
        let mut out = SourceBuilder::new(&self.indent);
        self.method(&mut out, method);
        out.build()
    }

    /// Renders an expression as it would appear at indent level zero.
    pub fn render_expr(&self, expr: &Expr) -> String {
        self.expr(expr, 0)
    }

    fn field(&self, out: &mut SourceBuilder, field: &FieldDecl) {
        out.push_line(&format!("{}{} {};", modifiers(&field.mods), field.ty, field.name));
    }

    fn method(&self, out: &mut SourceBuilder, method: &MethodDecl) {
        for annotation in &method.annotations {
            out.push_line(&format!("@{annotation}"));
        }
        out.push_line(&format!(
            "{}{} {}({}) {{",
            modifiers(&method.mods),
            method.ret,
            method.name,
            params(&method.params)
        ));
        out.indent();
        self.block(out, &method.body);
        out.dedent();
        out.push_line("}");
    }

    fn block(&self, out: &mut SourceBuilder, block: &Block) {
        for stmt in &block.stmts {
            self.stmt(out, stmt);
        }
    }

    fn stmt(&self, out: &mut SourceBuilder, stmt: &Stmt) {
        let level = out.indent_level;
        match stmt {
            Stmt::Expr(expr) => out.push_line(&format!("{};", self.expr(expr, level))),
            Stmt::Assign { target, value } => out.push_line(&format!(
                "{} = {};",
                self.expr(target, level),
                self.expr(value, level)
            )),
            Stmt::Decl { ty, name, init } => match init {
                Some(init) => {
                    out.push_line(&format!("{ty} {name} = {};", self.expr(init, level)))
                }
                None => out.push_line(&format!("{ty} {name};")),
            },
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                out.push_line(&format!("if ({}) {{", self.expr(cond, level)));
                out.indent();
                self.block(out, then);
                out.dedent();
                match otherwise {
                    Some(otherwise) => {
                        out.push_line("} else {");
                        out.indent();
                        self.block(out, otherwise);
                        out.dedent();
                        out.push_line("}");
                    }
                    None => out.push_line("}"),
                }
            }
            Stmt::Return(None) => out.push_line("return;"),
            Stmt::Return(Some(value)) => {
                out.push_line(&format!("return {};", self.expr(value, level)))
            }
            Stmt::TryCatch {
                body,
                exception,
                var,
                handler,
            } => {
                out.push_line("try {");
                out.indent();
                self.block(out, body);
                out.dedent();
                out.push_line(&format!("}} catch ({exception} {var}) {{"));
                out.indent();
                self.block(out, handler);
                out.dedent();
                out.push_line("}");
            }
        }
    }

    fn receiver(&self, expr: &Expr, level: usize) -> String {
        match expr {
            Expr::Cast { .. } | Expr::NeNull(_) => format!("({})", self.expr(expr, level)),
            _ => self.expr(expr, level),
        }
    }

    fn args(&self, args: &[Expr], level: usize) -> String {
        args.iter()
            .map(|a| self.expr(a, level))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn expr(&self, expr: &Expr, level: usize) -> String {
        match expr {
            Expr::Null => "null".to_string(),
            Expr::Bool(b) => b.to_string(),
            Expr::Int(i) => i.to_string(),
            Expr::Str(s) => format!("\"{}\"", escape(s)),
            Expr::This => "this".to_string(),
            Expr::Ref(name) => name.clone(),
            Expr::FieldOf { target, name } => format!("{}.{name}", self.receiver(target, level)),
            Expr::Invoke {
                target: None,
                method,
                args,
            } => format!("{method}({})", self.args(args, level)),
            Expr::Invoke {
                target: Some(target),
                method,
                args,
            } => format!(
                "{}.{method}({})",
                self.receiver(target, level),
                self.args(args, level)
            ),
            Expr::StaticInvoke {
                class,
                method,
                args,
            } => format!("{class}.{method}({})", self.args(args, level)),
            Expr::New { class, args } => format!("new {class}({})", self.args(args, level)),
            Expr::Cast { ty, expr } => format!("({ty}) {}", self.receiver(expr, level)),
            Expr::NeNull(expr) => format!("{} != null", self.expr(expr, level)),
            Expr::Lambda {
                interface,
                method,
                params: lambda_params,
                body,
            } => {
                let mut out = SourceBuilder::new(&self.indent);
                out.indent_level = level + 1;
                out.push_line("@Override");
                out.push_line(&format!("public void {method}({}) {{", params(lambda_params)));
                out.indent();
                self.block(&mut out, body);
                out.dedent();
                out.push_line("}");
                let closing = self.indent.repeat(level);
                format!("new {interface}() {{\n{}{closing}}}", out.build())
            }
        }
    }
}

fn modifiers(mods: &BTreeSet<Modifier>) -> String {
    mods.iter()
        .map(|m| match m {
            Modifier::Public => "public ",
            Modifier::Protected => "protected ",
            Modifier::Private => "private ",
            Modifier::Static => "static ",
            Modifier::Abstract => "abstract ",
            Modifier::Final => "final ",
        })
        .collect()
}

fn params(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| format!("{} {}", p.ty, p.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
