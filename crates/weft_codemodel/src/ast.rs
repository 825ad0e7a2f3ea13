//! Statements and expressions of generated method bodies.

use serde::{Deserialize, Serialize};
use weft_model::{Param, TypeRef};

/// An expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// `null`
    Null,
    /// A boolean literal.
    Bool(bool),
    /// An integer literal.
    Int(i64),
    /// A string literal.
    Str(String),
    /// `this`
    This,
    /// A local, parameter or field of `this`, by simple name.
    Ref(String),
    /// `target.name`
    FieldOf {
        /// The object whose field is read.
        target: Box<Expr>,
        /// Field name.
        name: String,
    },
    /// `target.method(args)`, or `method(args)` on `this` when `target` is `None`.
    Invoke {
        /// Receiver.
        target: Option<Box<Expr>>,
        /// Method name.
        method: String,
        /// Positional arguments.
        args: Vec<Expr>,
    },
    /// `Class.method(args)`
    StaticInvoke {
        /// Class name.
        class: String,
        /// Method name.
        method: String,
        /// Positional arguments.
        args: Vec<Expr>,
    },
    /// `new Class(args)`
    New {
        /// Class name.
        class: String,
        /// Constructor arguments.
        args: Vec<Expr>,
    },
    /// `(ty) expr`
    Cast {
        /// Target class name.
        ty: String,
        /// The cast operand.
        expr: Box<Expr>,
    },
    /// `expr != null`
    NeNull(Box<Expr>),
    /// A single-method anonymous implementation of `interface`.
    Lambda {
        /// The implemented interface.
        interface: String,
        /// The implemented method.
        method: String,
        /// Its parameters.
        params: Vec<Param>,
        /// Its body.
        body: Block,
    },
}

impl Expr {
    /// A reference by simple name.
    pub fn name(name: impl Into<String>) -> Self {
        Expr::Ref(name.into())
    }

    /// A string literal.
    pub fn string(text: impl Into<String>) -> Self {
        Expr::Str(text.into())
    }

    /// `self.method(args)`
    pub fn call(self, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Invoke {
            target: Some(Box::new(self)),
            method: method.into(),
            args,
        }
    }

    /// `method(args)` on `this`.
    pub fn call_this(method: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Invoke {
            target: None,
            method: method.into(),
            args,
        }
    }

    /// `Class.method(args)`
    pub fn call_static(
        class: impl Into<String>,
        method: impl Into<String>,
        args: Vec<Expr>,
    ) -> Self {
        Expr::StaticInvoke {
            class: class.into(),
            method: method.into(),
            args,
        }
    }

    /// `self.name`
    pub fn field(self, name: impl Into<String>) -> Self {
        Expr::FieldOf {
            target: Box::new(self),
            name: name.into(),
        }
    }

    /// `(ty) self`
    pub fn cast(self, ty: impl Into<String>) -> Self {
        Expr::Cast {
            ty: ty.into(),
            expr: Box::new(self),
        }
    }

    /// `self != null`
    pub fn ne_null(self) -> Self {
        Expr::NeNull(Box::new(self))
    }

    /// `new Class(args)`
    pub fn new_object(class: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::New {
            class: class.into(),
            args,
        }
    }

    /// An anonymous implementation of `interface.method(params)`.
    pub fn lambda(
        interface: impl Into<String>,
        method: impl Into<String>,
        params: Vec<Param>,
        body: Block,
    ) -> Self {
        Expr::Lambda {
            interface: interface.into(),
            method: method.into(),
            params,
            body,
        }
    }
}

/// A statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// An expression evaluated for its effect.
    Expr(Expr),
    /// `target = value;`
    Assign {
        /// A [`Expr::Ref`] or [`Expr::FieldOf`].
        target: Expr,
        /// The assigned value.
        value: Expr,
    },
    /// `ty name = init;`
    Decl {
        /// Declared type.
        ty: TypeRef,
        /// Local name.
        name: String,
        /// Initializer.
        init: Option<Expr>,
    },
    /// `if (cond) { .. } else { .. }`
    If {
        /// Condition.
        cond: Expr,
        /// Taken branch.
        then: Block,
        /// Optional else branch.
        otherwise: Option<Block>,
    },
    /// `return;` or `return value;`
    Return(Option<Expr>),
    /// `try { .. } catch (Exception var) { .. }`
    TryCatch {
        /// Protected body.
        body: Block,
        /// Caught exception class.
        exception: String,
        /// Name bound to the caught exception.
        var: String,
        /// Handler.
        handler: Block,
    },
}

/// A sequence of statements.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Statements in execution order.
    pub stmts: Vec<Stmt>,
}

impl Block {
    /// An empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a block with `f`.
    pub fn build(f: impl FnOnce(&mut Block)) -> Self {
        let mut block = Block::new();
        f(&mut block);
        block
    }

    /// Returns `true` if the block has no statements.
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    /// Returns the number of top-level statements.
    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    /// Appends a statement.
    pub fn push(&mut self, stmt: Stmt) -> &mut Self {
        self.stmts.push(stmt);
        self
    }

    /// Appends an expression statement.
    pub fn expr(&mut self, expr: Expr) -> &mut Self {
        self.push(Stmt::Expr(expr))
    }

    /// Appends `target.method(args);`, or `method(args);` when `target` is `None`.
    pub fn invoke(&mut self, target: Option<Expr>, method: &str, args: Vec<Expr>) -> &mut Self {
        self.expr(Expr::Invoke {
            target: target.map(Box::new),
            method: method.to_string(),
            args,
        })
    }

    /// Appends `target = value;`.
    pub fn assign(&mut self, target: Expr, value: Expr) -> &mut Self {
        self.push(Stmt::Assign { target, value })
    }

    /// Appends a local declaration.
    pub fn decl(&mut self, ty: TypeRef, name: &str, init: Option<Expr>) -> &mut Self {
        self.push(Stmt::Decl {
            ty,
            name: name.to_string(),
            init,
        })
    }

    /// Appends `return value;`, or `return;` for `None`.
    pub fn ret(&mut self, value: Option<Expr>) -> &mut Self {
        self.push(Stmt::Return(value))
    }

    /// Appends `if (cond) { .. }` whose body is built by `then`.
    pub fn if_then(&mut self, cond: Expr, then: impl FnOnce(&mut Block)) -> &mut Self {
        self.push(Stmt::If {
            cond,
            then: Block::build(then),
            otherwise: None,
        })
    }

    /// Appends `if (cond) { .. } else { .. }`.
    pub fn if_then_else(
        &mut self,
        cond: Expr,
        then: impl FnOnce(&mut Block),
        otherwise: impl FnOnce(&mut Block),
    ) -> &mut Self {
        self.push(Stmt::If {
            cond,
            then: Block::build(then),
            otherwise: Some(Block::build(otherwise)),
        })
    }

    /// Appends `try { .. } catch (exception var) { .. }`.
    pub fn try_catch(
        &mut self,
        exception: &str,
        var: &str,
        body: impl FnOnce(&mut Block),
        handler: impl FnOnce(&mut Block),
    ) -> &mut Self {
        self.push(Stmt::TryCatch {
            body: Block::build(body),
            exception: exception.to_string(),
            var: var.to_string(),
            handler: Block::build(handler),
        })
    }

    /// Appends every statement of `other`.
    pub fn extend(&mut self, other: Block) -> &mut Self {
        self.stmts.extend(other.stmts);
        self
    }
}
