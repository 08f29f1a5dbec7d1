use crate::env;
use crate::error::{EvalResult, RascalError};
use crate::heap::Heap;
use crate::interner::SymId;
use crate::value::{Arity, Closure, ObjRef, Object, Policy, Primitive};

//===----------------------------------------------------------------------===//
// Evaluator
//===----------------------------------------------------------------------===//
//
// One expression at a time, recursively. The environment is threaded as a
// mutable handle so that `def` (which produces a new frame chain node) is
// visible to the expressions that follow it in the same body and at the
// top level. Failures propagate as `Err` and abort the whole top-level
// expression; side effects committed before the failure stand.

/// Evaluate `expr` in `env`.
pub fn eval(heap: &mut Heap, expr: ObjRef, env: &mut ObjRef) -> EvalResult<ObjRef> {
    match heap.get(expr) {
        // Atoms other than symbols evaluate to themselves, as do the
        // sentinels (checked by identity below).
        Object::Number(_)
        | Object::Str(_)
        | Object::Error(_)
        | Object::Primitive(_)
        | Object::Closure(_) => Ok(expr),

        Object::Symbol(id) => {
            let id = *id;
            if expr == heap.nil() || expr == heap.unbound() {
                return Ok(expr);
            }
            let value = env::lookup(heap, id, *env);
            if value == heap.unbound() {
                return Err(RascalError::UnboundSymbol(heap.sym_name(id).to_string()));
            }
            Ok(value)
        }

        Object::Pair(head_expr, rest) => {
            let (head_expr, rest) = (*head_expr, *rest);
            let head = eval(heap, head_expr, env)?;
            apply_form(heap, head, rest, env)
        }
    }
}

/// Apply an evaluated head to the raw (unevaluated) argument list of the
/// call form. Eager callables get their arguments evaluated here; special
/// forms receive the expressions untouched.
fn apply_form(heap: &mut Heap, head: ObjRef, rest: ObjRef, env: &mut ObjRef) -> EvalResult<ObjRef> {
    let raw = heap.list_to_vec(rest).ok_or(RascalError::TypeMismatch {
        expected: "argument list",
        got: heap.kind(rest),
    })?;

    if let Some(prim) = heap.as_primitive(head) {
        let argv = match prim.policy {
            Policy::Eager => eval_each(heap, &raw, env)?,
            Policy::Form | Policy::Quote => raw,
        };
        check_arity(heap, prim.name, prim.arity, argv.len())?;
        return (prim.body)(heap, &argv, env);
    }

    if let Some(closure) = heap.as_closure(head) {
        let argv = eval_each(heap, &raw, env)?;
        return apply_closure(heap, closure, &argv);
    }

    Err(RascalError::NotApplicable(heap.kind(head)))
}

/// Apply an already-evaluated callable to already-evaluated argument
/// values (the `apply` builtin).
pub fn apply_values(
    heap: &mut Heap,
    fun: ObjRef,
    args: &[ObjRef],
    env: &mut ObjRef,
) -> EvalResult<ObjRef> {
    if let Some(prim) = heap.as_primitive(fun) {
        check_arity(heap, prim.name, prim.arity, args.len())?;
        return (prim.body)(heap, args, env);
    }
    if let Some(closure) = heap.as_closure(fun) {
        return apply_closure(heap, closure, args);
    }
    Err(RascalError::NotApplicable(heap.kind(fun)))
}

/// Invoke a closure: extend its captured environment with one call frame,
/// then evaluate the body expressions in order. An empty body yields nil.
pub fn apply_closure(heap: &mut Heap, closure: Closure, args: &[ObjRef]) -> EvalResult<ObjRef> {
    let mut call_env = env::extend(heap, closure.formals, args, closure.env)?;
    let mut out = heap.nil();
    let mut body = closure.body;
    while let Some((expr, tail)) = heap.pair_parts(body) {
        out = eval(heap, expr, &mut call_env)?;
        body = tail;
    }
    Ok(out)
}

/// Quote-eval: the second evaluation mode, used on a `quote` form's
/// argument. Structure passes through untouched except that a nested form
/// whose head resolves to the `unquote` form is evaluated normally and its
/// value substituted in place.
pub fn quote_eval(heap: &mut Heap, expr: ObjRef, env: &mut ObjRef) -> EvalResult<ObjRef> {
    let (head, tail) = match heap.pair_parts(expr) {
        Some(parts) => parts,
        None => return Ok(expr),
    };

    if resolves_to_unquote(heap, head, *env) {
        let args = heap.list_to_vec(tail).ok_or(RascalError::TypeMismatch {
            expected: "argument list",
            got: heap.kind(tail),
        })?;
        if args.len() != 1 {
            return Err(RascalError::ArityMismatch {
                name: "unquote".to_string(),
                expected: Arity::Exact(1),
                got: args.len(),
            });
        }
        return eval(heap, args[0], env);
    }

    let new_head = quote_eval(heap, head, env)?;
    let new_tail = quote_eval(heap, tail, env)?;
    Ok(heap.pair(new_head, new_tail))
}

/// Does this head position denote the `unquote` form in `env`?
fn resolves_to_unquote(heap: &Heap, head: ObjRef, env: ObjRef) -> bool {
    let resolved = match heap.symbol_id(head) {
        Some(id) => env::lookup(heap, id, env),
        None => head,
    };
    match heap.as_primitive(resolved) {
        Some(Primitive { name, policy: Policy::Quote, .. }) => heap.sym_name(name) == "unquote",
        _ => false,
    }
}

fn eval_each(heap: &mut Heap, exprs: &[ObjRef], env: &mut ObjRef) -> EvalResult<Vec<ObjRef>> {
    let mut out = Vec::with_capacity(exprs.len());
    for &expr in exprs {
        out.push(eval(heap, expr, env)?);
    }
    Ok(out)
}

fn check_arity(heap: &Heap, name: SymId, arity: Arity, got: usize) -> EvalResult<()> {
    if arity.admits(got) {
        Ok(())
    } else {
        Err(RascalError::ArityMismatch {
            name: heap.sym_name(name).to_string(),
            expected: arity,
            got,
        })
    }
}
