//! A tree-walking interpreter for generated method bodies.
//!
//! Objects whose class is a [`GeneratedClass`](crate::GeneratedClass) in the
//! model dispatch to their generated methods. Everything else goes to the
//! [`Host`], then to the getter/setter convention over object fields.

use crate::ast::{Block, Expr, Stmt};
use crate::error::EvalError;
use crate::model::CodeModel;
use crate::value::{Closure, Value};
use std::collections::HashMap;
use std::rc::Rc;

const MAX_DEPTH: usize = 256;

const NULL_POINTER: &str = "java.lang.NullPointerException";
const NUMBER_FORMAT: &str = "java.lang.NumberFormatException";

/// What a [`Host`] did with a call.
#[derive(Debug)]
pub enum HostReply {
    /// The call returned this value.
    Value(Value),
    /// The call continues by invoking `method` on `target`.
    Call {
        /// Receiver of the continued call.
        target: Value,
        /// Method to invoke.
        method: String,
        /// Arguments.
        args: Vec<Value>,
    },
    /// The call threw this exception value.
    Throw(Value),
    /// The host does not know this call.
    Unhandled,
}

/// Behaviour of everything outside the generated classes: the source
/// components they extend, library classes, and the UI runtime.
pub trait Host {
    /// Handles `target.method(args)` where no generated method applies.
    fn call(&mut self, target: &Value, method: &str, args: &[Value]) -> HostReply {
        let _ = (target, method, args);
        HostReply::Unhandled
    }

    /// Handles `Class.method(args)` not covered by the built-in conversions.
    fn call_static(&mut self, class: &str, method: &str, args: &[Value]) -> HostReply {
        let _ = (class, method, args);
        HostReply::Unhandled
    }

    /// Handles `new Class(args)` for classes outside the model.
    fn construct(&mut self, class: &str, args: &[Value]) -> HostReply {
        let _ = (class, args);
        HostReply::Unhandled
    }
}

/// A host that handles nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHost;

impl Host for NoHost {}

struct Frame {
    this: Value,
    locals: HashMap<String, Value>,
}

enum Flow {
    Normal,
    Return(Value),
}

/// Executes generated code from a [`CodeModel`].
pub struct Interpreter<'m, H: Host> {
    model: &'m CodeModel,
    host: H,
    depth: usize,
}

impl<'m, H: Host> Interpreter<'m, H> {
    /// An interpreter over `model` delegating to `host`.
    pub fn new(model: &'m CodeModel, host: H) -> Self {
        Self {
            model,
            host,
            depth: 0,
        }
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consumes the interpreter, returning the host.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Creates an instance of the generated class `class`. Generated fields
    /// start as `null`; `fields` supplies the inherited source fields.
    pub fn instantiate<K: Into<String>>(
        &self,
        class: &str,
        fields: impl IntoIterator<Item = (K, Value)>,
    ) -> Result<Value, EvalError> {
        let generated = self
            .model
            .by_name(class)
            .ok_or_else(|| EvalError::Unresolved(class.to_string()))?;
        let declared = generated
            .fields
            .iter()
            .map(|f| (f.name.clone(), Value::Null));
        let supplied = fields.into_iter().map(|(k, v)| (k.into(), v));
        Ok(Value::object(class, declared.chain(supplied)))
    }

    /// Invokes `method` on `target`.
    pub fn call(
        &mut self,
        target: &Value,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::Type(format!("call depth exceeded at `{method}`")));
        }
        self.depth += 1;
        let result = self.dispatch(target, method, args);
        self.depth -= 1;
        result
    }

    fn dispatch(
        &mut self,
        target: &Value,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        match target {
            Value::Null => Err(EvalError::throw(
                NULL_POINTER,
                format!("cannot invoke `{method}` on null"),
            )),
            Value::Closure(closure) => {
                let closure = Rc::clone(closure);
                if closure.method != method || closure.params.len() != args.len() {
                    return Err(no_method(target, method));
                }
                let mut locals = closure.captured.clone();
                locals.extend(closure.params.iter().cloned().zip(args));
                let mut frame = Frame {
                    this: closure.this.clone(),
                    locals,
                };
                self.run_body(&closure.body, &mut frame)
            }
            Value::Native(f) => f(&args),
            Value::Object(obj) => {
                let class = obj.borrow().class.clone();
                let model = self.model;
                if let Some(decl) = model.by_name(&class).and_then(|c| {
                    c.methods
                        .iter()
                        .find(|m| m.name == method && m.params.len() == args.len())
                }) {
                    let locals = decl.params.iter().map(|p| p.name.clone()).zip(args).collect();
                    let mut frame = Frame {
                        this: target.clone(),
                        locals,
                    };
                    return self.run_body(&decl.body, &mut frame);
                }
                let reply = self.host.call(target, method, &args);
                if let Some(result) = self.resolve(reply) {
                    return result;
                }
                accessor(target, method, args).unwrap_or_else(|| Err(no_method(target, method)))
            }
            _ => {
                let reply = self.host.call(target, method, &args);
                if let Some(result) = self.resolve(reply) {
                    return result;
                }
                builtin_instance(target, method, &args)
                    .unwrap_or_else(|| Err(no_method(target, method)))
            }
        }
    }

    fn resolve(&mut self, reply: HostReply) -> Option<Result<Value, EvalError>> {
        match reply {
            HostReply::Value(value) => Some(Ok(value)),
            HostReply::Throw(value) => Some(Err(EvalError::Thrown(value))),
            HostReply::Call {
                target,
                method,
                args,
            } => Some(self.call(&target, &method, args)),
            HostReply::Unhandled => None,
        }
    }

    fn run_body(&mut self, body: &Block, frame: &mut Frame) -> Result<Value, EvalError> {
        match self.exec_block(body, frame)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
        }
    }

    fn exec_block(&mut self, block: &Block, frame: &mut Frame) -> Result<Flow, EvalError> {
        for stmt in &block.stmts {
            if let Flow::Return(value) = self.exec_stmt(stmt, frame)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, frame: &mut Frame) -> Result<Flow, EvalError> {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval(expr, frame)?;
            }
            Stmt::Assign { target, value } => {
                let value = self.eval(value, frame)?;
                self.assign(target, value, frame)?;
            }
            Stmt::Decl { name, init, .. } => {
                let value = match init {
                    Some(init) => self.eval(init, frame)?,
                    None => Value::Null,
                };
                frame.locals.insert(name.clone(), value);
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.eval(cond, frame)?;
                let taken = cond
                    .as_bool()
                    .ok_or_else(|| EvalError::Type(format!("condition is not boolean: {cond}")))?;
                if taken {
                    return self.exec_block(then, frame);
                }
                if let Some(otherwise) = otherwise {
                    return self.exec_block(otherwise, frame);
                }
            }
            Stmt::Return(value) => {
                let value = match value {
                    Some(value) => self.eval(value, frame)?,
                    None => Value::Null,
                };
                return Ok(Flow::Return(value));
            }
            Stmt::TryCatch {
                body,
                exception,
                var,
                handler,
            } => {
                return match self.exec_block(body, frame) {
                    Err(EvalError::Thrown(thrown)) if catches(exception, &thrown) => {
                        frame.locals.insert(var.clone(), thrown);
                        self.exec_block(handler, frame)
                    }
                    other => other,
                };
            }
        }
        Ok(Flow::Normal)
    }

    fn assign(&mut self, target: &Expr, value: Value, frame: &mut Frame) -> Result<(), EvalError> {
        match target {
            Expr::Ref(name) => {
                if let Some(slot) = frame.locals.get_mut(name) {
                    *slot = value;
                    return Ok(());
                }
                if frame.this.set_field(name, value) {
                    Ok(())
                } else {
                    Err(EvalError::Unresolved(name.clone()))
                }
            }
            Expr::FieldOf { target, name } => {
                let object = self.eval(target, frame)?;
                if object.is_null() {
                    return Err(EvalError::throw(
                        NULL_POINTER,
                        format!("cannot assign `{name}` on null"),
                    ));
                }
                if object.set_field(name, value) {
                    Ok(())
                } else {
                    Err(EvalError::Type(format!("cannot assign `{name}` on {object}")))
                }
            }
            other => Err(EvalError::Type(format!("not assignable: {other:?}"))),
        }
    }

    fn eval_args(&mut self, args: &[Expr], frame: &mut Frame) -> Result<Vec<Value>, EvalError> {
        args.iter().map(|a| self.eval(a, frame)).collect()
    }

    fn eval(&mut self, expr: &Expr, frame: &mut Frame) -> Result<Value, EvalError> {
        match expr {
            Expr::Null => Ok(Value::Null),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Int(i) => Ok(Value::Int(*i)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::This => Ok(frame.this.clone()),
            Expr::Ref(name) => {
                if let Some(value) = frame.locals.get(name) {
                    return Ok(value.clone());
                }
                match &frame.this {
                    Value::Object(_) => Ok(frame.this.get_field(name)),
                    _ => Err(EvalError::Unresolved(name.clone())),
                }
            }
            Expr::FieldOf { target, name } => {
                let object = self.eval(target, frame)?;
                match object {
                    Value::Null => Err(EvalError::throw(
                        NULL_POINTER,
                        format!("cannot read `{name}` on null"),
                    )),
                    Value::Object(_) => Ok(object.get_field(name)),
                    other => Err(EvalError::Type(format!("cannot read `{name}` on {other}"))),
                }
            }
            Expr::Invoke {
                target,
                method,
                args,
            } => {
                let receiver = match target {
                    Some(target) => self.eval(target, frame)?,
                    None => frame.this.clone(),
                };
                let args = self.eval_args(args, frame)?;
                self.call(&receiver, method, args)
            }
            Expr::StaticInvoke {
                class,
                method,
                args,
            } => {
                let args = self.eval_args(args, frame)?;
                if let Some(result) = builtin_static(class, method, &args) {
                    return result;
                }
                let reply = self.host.call_static(class, method, &args);
                self.resolve(reply).unwrap_or_else(|| {
                    Err(EvalError::NoMethod {
                        target: class.clone(),
                        method: method.clone(),
                    })
                })
            }
            Expr::New { class, args } => {
                let args = self.eval_args(args, frame)?;
                if self.model.by_name(class).is_some() {
                    return self.instantiate::<String>(class, []);
                }
                let reply = self.host.construct(class, &args);
                self.resolve(reply)
                    .unwrap_or_else(|| Ok(Value::object::<String>(class, [])))
            }
            Expr::Cast { expr, .. } => self.eval(expr, frame),
            Expr::NeNull(expr) => Ok(Value::Bool(!self.eval(expr, frame)?.is_null())),
            Expr::Lambda {
                interface,
                method,
                params,
                body,
            } => Ok(Value::Closure(Rc::new(Closure {
                interface: interface.clone(),
                method: method.clone(),
                params: params.iter().map(|p| p.name.clone()).collect(),
                body: body.clone(),
                captured: frame.locals.clone(),
                this: frame.this.clone(),
            }))),
        }
    }
}

fn no_method(target: &Value, method: &str) -> EvalError {
    EvalError::NoMethod {
        target: target.class_name().unwrap_or_else(|| target.to_string()),
        method: method.to_string(),
    }
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

fn catches(exception: &str, thrown: &Value) -> bool {
    let caught = simple_name(exception);
    if matches!(caught, "Throwable" | "Exception" | "RuntimeException") {
        return true;
    }
    thrown
        .class_name()
        .is_some_and(|class| simple_name(&class) == caught)
}

fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The getter/setter convention over object fields.
fn accessor(
    target: &Value,
    method: &str,
    mut args: Vec<Value>,
) -> Option<Result<Value, EvalError>> {
    if args.is_empty() {
        let property = method
            .strip_prefix("get")
            .or_else(|| method.strip_prefix("is"))
            .filter(|rest| !rest.is_empty())?;
        return Some(Ok(target.get_field(&decapitalize(property))));
    }
    if args.len() == 1 {
        let property = method.strip_prefix("set").filter(|rest| !rest.is_empty())?;
        let value = args.pop().unwrap_or_default();
        target.set_field(&decapitalize(property), value);
        return Some(Ok(Value::Null));
    }
    None
}

fn builtin_instance(
    target: &Value,
    method: &str,
    args: &[Value],
) -> Option<Result<Value, EvalError>> {
    match (target, method, args) {
        (_, "toString", []) => Some(Ok(Value::Str(target.to_string()))),
        (Value::Str(s), "trim", []) => Some(Ok(Value::Str(s.trim().to_string()))),
        (Value::Str(s), "isEmpty", []) => Some(Ok(Value::Bool(s.is_empty()))),
        (Value::Str(s), "length", []) => Some(Ok(Value::Int(s.chars().count() as i64))),
        (Value::Str(s), "equals", [other]) => {
            Some(Ok(Value::Bool(other.as_str() == Some(s.as_str()))))
        }
        _ => None,
    }
}

fn number_format(input: &Value) -> EvalError {
    EvalError::throw(NUMBER_FORMAT, format!("For input string: \"{input}\""))
}

fn parse_integral(input: &Value, min: i64, max: i64) -> Result<Value, EvalError> {
    match input {
        Value::Int(i) if (min..=max).contains(i) => Ok(Value::Int(*i)),
        Value::Str(s) => match s.parse::<i64>() {
            Ok(i) if (min..=max).contains(&i) => Ok(Value::Int(i)),
            _ => Err(number_format(input)),
        },
        _ => Err(number_format(input)),
    }
}

fn parse_floating(input: &Value) -> Result<Value, EvalError> {
    match input {
        Value::Null => Err(EvalError::throw(NULL_POINTER, "cannot parse null")),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Float(x) => Ok(Value::Float(*x)),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| number_format(input)),
        _ => Err(number_format(input)),
    }
}

/// `String.valueOf` and the boxed `valueOf` conversions.
fn builtin_static(class: &str, method: &str, args: &[Value]) -> Option<Result<Value, EvalError>> {
    let [arg] = args else {
        return None;
    };
    if method != "valueOf" {
        return None;
    }
    let result = match simple_name(class) {
        "String" => Ok(Value::Str(arg.to_string())),
        "Boolean" => Ok(match arg {
            Value::Bool(b) => Value::Bool(*b),
            Value::Str(s) => Value::Bool(s.eq_ignore_ascii_case("true")),
            _ => Value::Bool(false),
        }),
        "Byte" => parse_integral(arg, i8::MIN.into(), i8::MAX.into()),
        "Short" => parse_integral(arg, i16::MIN.into(), i16::MAX.into()),
        "Integer" => parse_integral(arg, i32::MIN.into(), i32::MAX.into()),
        "Long" => parse_integral(arg, i64::MIN, i64::MAX),
        "Float" | "Double" => parse_floating(arg),
        _ => return None,
    };
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDecl, MethodDecl};
    use std::cell::Cell;
    use weft_model::{Modifier, Param, TypeRef};

    fn model_with(method: MethodDecl) -> CodeModel {
        let mut model = CodeModel::new();
        let id = model.class_for("a.B_", "a.B");
        let class = model.class_mut(id);
        class.add_field(FieldDecl::private(TypeRef::class("L"), "listener"));
        class.add_method(method);
        model
    }

    fn counter() -> (Rc<Cell<usize>>, Value) {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let f = Value::native(move |_| {
            seen.set(seen.get() + 1);
            Ok(Value::Null)
        });
        (count, f)
    }

    #[test]
    fn guarded_forward_and_fallback() {
        let body = Block::build(|b| {
            b.if_then(Expr::name("cart").ne_null(), |b| {
                b.ret(Some(Expr::name("cart").call("total", vec![])));
            });
            b.ret(Some(Expr::Int(0)));
        });
        let model = model_with(
            MethodDecl::new(Modifier::Public, TypeRef::parse("int"), "total", vec![])
                .with_body(body),
        );
        let mut interp = Interpreter::new(&model, NoHost);

        let this = interp.instantiate("a.B_", [("cart", Value::Null)]).unwrap();
        assert_eq!(interp.call(&this, "total", vec![]).unwrap(), Value::Int(0));

        let cart = Value::native(|_| Ok(Value::Int(7)));
        this.set_field("cart", cart);
        assert_eq!(interp.call(&this, "total", vec![]).unwrap(), Value::Int(7));
    }

    #[test]
    fn instantiate_nulls_generated_fields() {
        let model = model_with(MethodDecl::new(Modifier::Public, TypeRef::Void, "go", vec![]));
        let interp = Interpreter::new(&model, NoHost);
        let this = interp.instantiate::<&str>("a.B_", []).unwrap();
        assert!(this.get_field("listener").is_null());
        assert!(matches!(
            interp.instantiate::<&str>("a.Missing_", []),
            Err(EvalError::Unresolved(_))
        ));
    }

    #[test]
    fn try_catch_catches_runtime_exceptions() {
        let body = Block::build(|b| {
            b.try_catch(
                "RuntimeException",
                "e",
                |body| {
                    body.assign(
                        Expr::name("v"),
                        Expr::call_static("Integer", "valueOf", vec![Expr::string("x1")]),
                    );
                },
                |handler| {
                    handler.if_then(Expr::name("onFailed").ne_null(), |b| {
                        b.invoke(Some(Expr::name("onFailed")), "onFailed", vec![Expr::name("e")]);
                    });
                    handler.ret(None);
                },
            );
            b.invoke(Some(Expr::name("onDone")), "run", vec![]);
        });
        let params = vec![Param::new("onDone", "Runnable"), Param::new("onFailed", "OnFailed")];
        let model = model_with(
            MethodDecl::new(Modifier::Private, TypeRef::Void, "work", params).with_body(body),
        );
        let mut interp = Interpreter::new(&model, NoHost);
        let this = interp.instantiate("a.B_", [("v", Value::Int(0))]).unwrap();
        let (done, on_done) = counter();
        let (failed, on_failed) = counter();
        interp.call(&this, "work", vec![on_done, on_failed]).unwrap();
        assert_eq!(done.get(), 0);
        assert_eq!(failed.get(), 1);
        assert_eq!(this.get_field("v"), Value::Int(0));
    }

    #[test]
    fn closures_capture_locals_and_this() {
        let body = Block::build(|b| {
            b.decl(TypeRef::parse("int"), "n", Some(Expr::Int(5)));
            b.assign(
                Expr::This.field("listener"),
                Expr::lambda(
                    "Runnable",
                    "run",
                    vec![],
                    Block::build(|b| {
                        b.assign(Expr::name("seen"), Expr::name("n"));
                    }),
                ),
            );
            b.invoke(Some(Expr::name("listener")), "run", vec![]);
        });
        let model = model_with(
            MethodDecl::new(Modifier::Public, TypeRef::Void, "go", vec![]).with_body(body),
        );
        let mut interp = Interpreter::new(&model, NoHost);
        let this = interp.instantiate("a.B_", [("seen", Value::Null)]).unwrap();
        interp.call(&this, "go", vec![]).unwrap();
        assert_eq!(this.get_field("seen"), Value::Int(5));
    }

    #[test]
    fn accessor_convention_on_plain_objects() {
        let model = CodeModel::new();
        let mut interp = Interpreter::new(&model, NoHost);
        let order = Value::object("com.shop.Order", [("total", Value::Int(3))]);
        assert_eq!(interp.call(&order, "getTotal", vec![]).unwrap(), Value::Int(3));
        interp.call(&order, "setTotal", vec![Value::Int(9)]).unwrap();
        assert_eq!(order.get_field("total"), Value::Int(9));
        assert!(matches!(
            interp.call(&order, "refresh", vec![]),
            Err(EvalError::NoMethod { .. })
        ));
    }

    #[test]
    fn null_receiver_throws() {
        let model = CodeModel::new();
        let mut interp = Interpreter::new(&model, NoHost);
        let err = interp.call(&Value::Null, "run", vec![]).unwrap_err();
        assert_eq!(err.thrown_class().as_deref(), Some(NULL_POINTER));
    }

    #[test]
    fn boxed_conversions() {
        let s = |t: &str| vec![Value::string(t)];
        assert_eq!(
            builtin_static("Integer", "valueOf", &s("42")).unwrap().unwrap(),
            Value::Int(42)
        );
        assert_eq!(
            builtin_static("java.lang.Boolean", "valueOf", &s("TRUE")).unwrap().unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            builtin_static("Boolean", "valueOf", &s("yes")).unwrap().unwrap(),
            Value::Bool(false)
        );
        assert!(builtin_static("Byte", "valueOf", &s("300")).unwrap().is_err());
        assert!(builtin_static("Integer", "valueOf", &s(" 4")).unwrap().is_err());
        assert_eq!(
            builtin_static("Double", "valueOf", &s(" 2.5 ")).unwrap().unwrap(),
            Value::Float(2.5)
        );
        assert_eq!(
            builtin_static("String", "valueOf", &[Value::Int(8)]).unwrap().unwrap(),
            Value::string("8")
        );
        assert!(builtin_static("Integer", "parseInt", &s("1")).is_none());
    }

    struct Validating {
        pass: bool,
    }

    impl Host for Validating {
        fn call(&mut self, _target: &Value, method: &str, args: &[Value]) -> HostReply {
            match (method, args) {
                ("validate", [ok, fail]) => {
                    let (target, args) = if self.pass {
                        (ok.clone(), vec![])
                    } else {
                        (fail.clone(), vec![Value::string("invalid")])
                    };
                    let method = if self.pass { "run" } else { "onFailed" };
                    HostReply::Call {
                        target,
                        method: method.to_string(),
                        args,
                    }
                }
                _ => HostReply::Unhandled,
            }
        }
    }

    #[test]
    fn host_call_continues_into_callback() {
        let model = CodeModel::new();
        let mut interp = Interpreter::new(&model, Validating { pass: false });
        let validator = Value::object::<&str>("Validator", []);
        let (failed, on_failed) = counter();
        let (done, on_done) = counter();
        interp
            .call(&validator, "validate", vec![on_done, on_failed])
            .unwrap();
        assert_eq!(failed.get(), 1);
        assert_eq!(done.get(), 0);
        interp.host_mut().pass = true;
        let (done, on_done) = counter();
        interp
            .call(&validator, "validate", vec![on_done, Value::Null])
            .unwrap();
        assert_eq!(done.get(), 1);
    }
}
