use crate::env;
use crate::error::{EvalResult, RascalError};
use crate::eval;
use crate::heap::Heap;
use crate::printer;
use crate::value::{Arity, Closure, NativeFn, ObjRef, Policy, Primitive};

//===----------------------------------------------------------------------===//
// Registry
//===----------------------------------------------------------------------===//

/// The built-in surface: name, arity contract, argument-evaluation policy,
/// native body. `Eager` callables see evaluated values; `Form` callables
/// see raw expressions and evaluate what they choose; `Quote` callables
/// run in quote-eval mode.
const BUILTINS: &[(&str, Arity, Policy, NativeFn)] = &[
    ("+", Arity::Exact(2), Policy::Eager, prim_add),
    ("-", Arity::Exact(2), Policy::Eager, prim_sub),
    ("*", Arity::Exact(2), Policy::Eager, prim_mul),
    ("/", Arity::Exact(2), Policy::Eager, prim_div),
    ("%", Arity::Exact(2), Policy::Eager, prim_mod),
    ("pow", Arity::Exact(2), Policy::Eager, prim_pow),
    ("cons", Arity::Exact(2), Policy::Eager, prim_cons),
    ("head", Arity::Exact(1), Policy::Eager, prim_head),
    ("tail", Arity::Exact(1), Policy::Eager, prim_tail),
    ("eq?", Arity::Exact(2), Policy::Eager, prim_eq),
    ("len", Arity::Exact(1), Policy::Eager, prim_len),
    ("eval", Arity::Exact(2), Policy::Eager, prim_eval),
    ("apply", Arity::Exact(3), Policy::Eager, prim_apply),
    ("globals", Arity::Exact(0), Policy::Eager, prim_globals),
    ("allocations", Arity::Exact(0), Policy::Eager, prim_allocations),
    ("print", Arity::Exact(1), Policy::Eager, prim_print),
    ("def", Arity::Exact(2), Policy::Form, form_def),
    ("set!", Arity::Exact(2), Policy::Form, form_set),
    ("if", Arity::Exact(3), Policy::Form, form_if),
    ("fn", Arity::AtLeast(1), Policy::Form, form_fn),
    ("do", Arity::AtLeast(0), Policy::Form, form_do),
    ("quote", Arity::Exact(1), Policy::Quote, form_quote),
    ("unquote", Arity::Exact(1), Policy::Quote, form_unquote),
];

/// Build the initial global environment: one frame binding the sentinels
/// (`nil`, `undef`, `t`) and every builtin, sorted by name like any other
/// frame so `globals` enumerates deterministically.
pub fn make_global_environment(heap: &mut Heap) -> ObjRef {
    let nil = heap.nil();
    let mut env = env::new_scope(heap, nil);

    let sentinels = [("nil", heap.nil()), ("undef", heap.unbound()), ("t", heap.truth())];
    for (name, value) in sentinels {
        let id = heap.intern(name);
        env = env::define(heap, id, value, env).expect("global frame is well-formed");
    }

    for &(name, arity, policy, body) in BUILTINS {
        let id = heap.intern(name);
        let prim = heap.primitive(Primitive { name: id, arity, policy, body });
        env = env::define(heap, id, prim, env).expect("global frame is well-formed");
    }

    env
}

//===----------------------------------------------------------------------===//
// Eager primitives
//===----------------------------------------------------------------------===//

fn num_arg(heap: &Heap, r: ObjRef) -> EvalResult<i64> {
    heap.number_value(r)
        .ok_or(RascalError::TypeMismatch { expected: "num", got: heap.kind(r) })
}

fn sym_arg(heap: &Heap, r: ObjRef) -> EvalResult<crate::interner::SymId> {
    heap.symbol_id(r)
        .ok_or(RascalError::TypeMismatch { expected: "sym", got: heap.kind(r) })
}

/// `(+ a b)`
fn prim_add(heap: &mut Heap, args: &[ObjRef], _env: &mut ObjRef) -> EvalResult<ObjRef> {
    let x = num_arg(heap, args[0])?;
    let y = num_arg(heap, args[1])?;
    Ok(heap.number(x.wrapping_add(y)))
}

/// `(- a b)`
fn prim_sub(heap: &mut Heap, args: &[ObjRef], _env: &mut ObjRef) -> EvalResult<ObjRef> {
    let x = num_arg(heap, args[0])?;
    let y = num_arg(heap, args[1])?;
    Ok(heap.number(x.wrapping_sub(y)))
}

/// `(* a b)`
fn prim_mul(heap: &mut Heap, args: &[ObjRef], _env: &mut ObjRef) -> EvalResult<ObjRef> {
    let x = num_arg(heap, args[0])?;
    let y = num_arg(heap, args[1])?;
    Ok(heap.number(x.wrapping_mul(y)))
}

/// `(/ a b)` — truncating division; division by zero is an error value,
/// never a native fault.
fn prim_div(heap: &mut Heap, args: &[ObjRef], _env: &mut ObjRef) -> EvalResult<ObjRef> {
    let x = num_arg(heap, args[0])?;
    let y = num_arg(heap, args[1])?;
    if y == 0 {
        return Err(RascalError::Arithmetic("division by zero".to_string()));
    }
    Ok(heap.number(x.wrapping_div(y)))
}

/// `(% a b)`
fn prim_mod(heap: &mut Heap, args: &[ObjRef], _env: &mut ObjRef) -> EvalResult<ObjRef> {
    let x = num_arg(heap, args[0])?;
    let y = num_arg(heap, args[1])?;
    if y == 0 {
        return Err(RascalError::Arithmetic("modulo by zero".to_string()));
    }
    Ok(heap.number(x.wrapping_rem(y)))
}

/// `(pow base exp)` — integer exponentiation; a negative exponent is an
/// arithmetic error.
fn prim_pow(heap: &mut Heap, args: &[ObjRef], _env: &mut ObjRef) -> EvalResult<ObjRef> {
    let x = num_arg(heap, args[0])?;
    let y = num_arg(heap, args[1])?;
    if y < 0 {
        return Err(RascalError::Arithmetic("negative exponent".to_string()));
    }
    let e = u32::try_from(y)
        .map_err(|_| RascalError::Arithmetic("exponent out of range".to_string()))?;
    Ok(heap.number(x.wrapping_pow(e)))
}

/// `(cons a b)`
fn prim_cons(heap: &mut Heap, args: &[ObjRef], _env: &mut ObjRef) -> EvalResult<ObjRef> {
    Ok(heap.pair(args[0], args[1]))
}

/// `(head pair)`
fn prim_head(heap: &mut Heap, args: &[ObjRef], _env: &mut ObjRef) -> EvalResult<ObjRef> {
    let (head, _) = heap
        .pair_parts(args[0])
        .ok_or(RascalError::TypeMismatch { expected: "cons", got: heap.kind(args[0]) })?;
    Ok(head)
}

/// `(tail pair)`
fn prim_tail(heap: &mut Heap, args: &[ObjRef], _env: &mut ObjRef) -> EvalResult<ObjRef> {
    let (_, tail) = heap
        .pair_parts(args[0])
        .ok_or(RascalError::TypeMismatch { expected: "cons", got: heap.kind(args[0]) })?;
    Ok(tail)
}

/// `(eq? a b)` — equality over symbols and numbers only. Symbols compare
/// by spelling, numbers by value; a symbol never equals a number.
fn prim_eq(heap: &mut Heap, args: &[ObjRef], _env: &mut ObjRef) -> EvalResult<ObjRef> {
    for &arg in &args[..2] {
        if heap.number_value(arg).is_none() && heap.symbol_id(arg).is_none() {
            return Err(RascalError::TypeMismatch {
                expected: "sym or num",
                got: heap.kind(arg),
            });
        }
    }
    let equal = match (heap.number_value(args[0]), heap.number_value(args[1])) {
        (Some(x), Some(y)) => x == y,
        (None, None) => heap.symbol_id(args[0]) == heap.symbol_id(args[1]),
        _ => false, // a symbol never equals a number
    };
    Ok(if equal { heap.truth() } else { heap.nil() })
}

/// `(len list)`
fn prim_len(heap: &mut Heap, args: &[ObjRef], _env: &mut ObjRef) -> EvalResult<ObjRef> {
    let items = heap
        .list_to_vec(args[0])
        .ok_or(RascalError::TypeMismatch { expected: "list", got: heap.kind(args[0]) })?;
    Ok(heap.number(items.len() as i64))
}

/// `(eval expr env)` — re-enters the evaluator with an environment passed
/// as data.
fn prim_eval(heap: &mut Heap, args: &[ObjRef], _env: &mut ObjRef) -> EvalResult<ObjRef> {
    let mut target = env_arg(heap, args[1])?;
    eval::eval(heap, args[0], &mut target)
}

/// `(apply f env args)` — applies a procedure to a list of already
/// evaluated argument values.
fn prim_apply(heap: &mut Heap, args: &[ObjRef], _env: &mut ObjRef) -> EvalResult<ObjRef> {
    let mut target = env_arg(heap, args[1])?;
    let values = heap
        .list_to_vec(args[2])
        .ok_or(RascalError::TypeMismatch { expected: "argument list", got: heap.kind(args[2]) })?;
    eval::apply_values(heap, args[0], &values, &mut target)
}

fn env_arg(heap: &Heap, r: ObjRef) -> EvalResult<ObjRef> {
    if heap.pair_parts(r).is_some() {
        Ok(r)
    } else {
        Err(RascalError::TypeMismatch { expected: "environment", got: heap.kind(r) })
    }
}

/// `(globals)` — the outermost frame of the current lexical chain, as
/// ordinary list data.
fn prim_globals(heap: &mut Heap, _args: &[ObjRef], env: &mut ObjRef) -> EvalResult<ObjRef> {
    let mut scope = *env;
    while let Some((_, parent)) = heap.pair_parts(scope) {
        if heap.pair_parts(parent).is_none() {
            break;
        }
        scope = parent;
    }
    Ok(scope)
}

/// `(allocations)` — current live heap object count.
fn prim_allocations(heap: &mut Heap, _args: &[ObjRef], _env: &mut ObjRef) -> EvalResult<ObjRef> {
    let count = heap.allocation_count() as i64;
    Ok(heap.number(count))
}

/// `(print v)` — writes the rendering of `v` to stdout, returns `v`.
fn prim_print(heap: &mut Heap, args: &[ObjRef], _env: &mut ObjRef) -> EvalResult<ObjRef> {
    println!("{}", printer::print(heap, args[0]));
    Ok(args[0])
}

//===----------------------------------------------------------------------===//
// Special forms
//===----------------------------------------------------------------------===//

/// `(def name expr)` — binds `name` in the current frame. A name already
/// bound in this frame keeps its old value; the expression still yields
/// the evaluated value.
fn form_def(heap: &mut Heap, args: &[ObjRef], env: &mut ObjRef) -> EvalResult<ObjRef> {
    let name = sym_arg(heap, args[0])?;
    let value = eval::eval(heap, args[1], env)?;
    *env = env::define(heap, name, value, *env)?;
    Ok(value)
}

/// `(set! name expr)` — mutates the nearest existing binding of `name`.
/// An unbound name is a no-op: no error, no binding created.
fn form_set(heap: &mut Heap, args: &[ObjRef], env: &mut ObjRef) -> EvalResult<ObjRef> {
    let name = sym_arg(heap, args[0])?;
    let value = eval::eval(heap, args[1], env)?;
    env::set(heap, name, value, *env)?;
    Ok(value)
}

/// `(if cond then else)` — evaluates the condition, then exactly one
/// branch. `nil` is the only false value.
fn form_if(heap: &mut Heap, args: &[ObjRef], env: &mut ObjRef) -> EvalResult<ObjRef> {
    let cond = eval::eval(heap, args[0], env)?;
    let branch = if heap.is_nil(cond) { args[2] } else { args[1] };
    eval::eval(heap, branch, env)
}

/// `(fn formals body...)` — builds a closure capturing the defining
/// environment. Nothing is evaluated here.
fn form_fn(heap: &mut Heap, args: &[ObjRef], env: &mut ObjRef) -> EvalResult<ObjRef> {
    let formals = args[0];
    let names = heap
        .list_to_vec(formals)
        .ok_or(RascalError::TypeMismatch { expected: "formals list", got: heap.kind(formals) })?;
    for name in names {
        sym_arg(heap, name)?;
    }
    let body = heap.list(&args[1..]);
    Ok(heap.closure(Closure { formals, body, env: *env }))
}

/// `(do expr...)` — evaluates the body in order, yielding the last value;
/// an empty body yields `nil`.
fn form_do(heap: &mut Heap, args: &[ObjRef], env: &mut ObjRef) -> EvalResult<ObjRef> {
    let mut out = heap.nil();
    for &expr in args {
        out = eval::eval(heap, expr, env)?;
    }
    Ok(out)
}

/// `(quote expr)` — quote-eval: the structure passes through unevaluated
/// except for nested `(unquote …)` forms, which are evaluated and
/// substituted.
fn form_quote(heap: &mut Heap, args: &[ObjRef], env: &mut ObjRef) -> EvalResult<ObjRef> {
    eval::quote_eval(heap, args[0], env)
}

/// `(unquote expr)` — outside a quote this simply evaluates its argument.
fn form_unquote(heap: &mut Heap, args: &[ObjRef], env: &mut ObjRef) -> EvalResult<ObjRef> {
    eval::eval(heap, args[0], env)
}
