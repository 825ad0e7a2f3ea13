//! Building blocks shared by population and recollection.
//!
//! Both generate listener-overridable procedures taking a continuation pair
//! `(onDone, onFailed)`. Exactly one of the two is invoked per call.

use weft_codemodel::{Block, Expr, FieldDecl, GeneratedClass, MethodDecl};
use weft_model::{Modifier, Param, TypeRef};

use crate::names::{
    Flavor, ON_DONE_PARAM, ON_FAILED, ON_FAILED_METHOD, ON_FAILED_PARAM, RUN, RUNNABLE,
    RUNTIME_EXCEPTION,
};

const CAUGHT: &str = "e";
const LISTENER_PARAM: &str = "listener";

/// `(Runnable onDone, OnFailedRunnable onFailed)`.
pub(crate) fn continuation_params() -> Vec<Param> {
    vec![
        Param::new(ON_DONE_PARAM, RUNNABLE),
        Param::new(ON_FAILED_PARAM, ON_FAILED),
    ]
}

/// `(onDone, onFailed)` as arguments.
pub(crate) fn continuation_args() -> Vec<Expr> {
    vec![Expr::name(ON_DONE_PARAM), Expr::name(ON_FAILED_PARAM)]
}

/// `if (onDone != null) onDone.run();`
pub(crate) fn signal_done(b: &mut Block) {
    b.if_then(Expr::name(ON_DONE_PARAM).ne_null(), |b| {
        b.invoke(Some(Expr::name(ON_DONE_PARAM)), RUN, vec![]);
    });
}

/// `if (onFailed != null) onFailed.onFailed(error);`
pub(crate) fn signal_failed(b: &mut Block, error: Expr) {
    b.if_then(Expr::name(ON_FAILED_PARAM).ne_null(), |b| {
        b.invoke(Some(Expr::name(ON_FAILED_PARAM)), ON_FAILED_METHOD, vec![error]);
    });
}

/// `try { body } catch (RuntimeException e) { <fail>; return; }` followed by
/// `after`. An empty `body` emits only `after`.
pub(crate) fn guarded(b: &mut Block, body: Block, after: impl FnOnce(&mut Block)) {
    if body.is_empty() {
        after(b);
        return;
    }
    b.try_catch(
        RUNTIME_EXCEPTION,
        CAUGHT,
        |b| {
            b.extend(body);
        },
        |h| {
            signal_failed(h, Expr::name(CAUGHT));
            h.ret(None);
        },
    );
    after(b);
}

/// A private procedure `name(onDone, onFailed)` with `body`.
pub(crate) fn procedure(name: String, body: Block) -> MethodDecl {
    MethodDecl::new(Modifier::Private, TypeRef::Void, name, continuation_params()).with_body(body)
}

/// Declares the listener field of `target` and its public setter.
pub(crate) fn declare_listener(class: &mut GeneratedClass, flavor: Flavor, target: Option<&str>) {
    let field = flavor.listener_field(target);
    let listener = TypeRef::class(flavor.listener_interface());
    class.add_field(FieldDecl::private(listener.clone(), field.clone()));
    let setter = MethodDecl::new(
        Modifier::Public,
        TypeRef::Void,
        flavor.listener_setter(target),
        vec![Param::new(LISTENER_PARAM, listener)],
    )
    .with_body(Block::build(|b| {
        b.assign(Expr::This.field(field), Expr::name(LISTENER_PARAM));
    }));
    class.add_method(setter);
}

/// The body deferring to the listener of `target`, or signalling done when
/// none is registered.
pub(crate) fn listener_body(flavor: Flavor, target: Option<&str>) -> Block {
    let field = flavor.listener_field(target);
    Block::build(|b| {
        b.if_then(Expr::name(field.clone()).ne_null(), |b| {
            b.invoke(
                Some(Expr::name(field.clone())),
                flavor.listener_method(),
                continuation_args(),
            );
            b.ret(None);
        });
        signal_done(b);
    })
}

/// The body running `procedures` one after another: each one's success
/// starts the next, the last one receives `onDone`, all share `onFailed`.
pub(crate) fn chain_body(procedures: &[String]) -> Block {
    let Some((last, rest)) = procedures.split_last() else {
        return Block::build(signal_done);
    };
    let mut call = Block::build(|b| {
        b.invoke(None, last, continuation_args());
    });
    for name in rest.iter().rev() {
        let next = Expr::lambda(RUNNABLE, RUN, Vec::new(), call);
        call = Block::build(|b| {
            b.invoke(None, name, vec![next, Expr::name(ON_FAILED_PARAM)]);
        });
    }
    call
}

/// A listener instance forwarding to the procedure `procedure` of `this`.
pub(crate) fn forwarding_listener(flavor: Flavor, procedure: &str) -> Expr {
    let done = flavor.listener_done_param();
    Expr::lambda(
        flavor.listener_interface(),
        flavor.listener_method(),
        vec![Param::new(done, RUNNABLE), Param::new(ON_FAILED_PARAM, ON_FAILED)],
        Block::build(|b| {
            b.invoke(None, procedure, vec![Expr::name(done), Expr::name(ON_FAILED_PARAM)]);
        }),
    )
}
