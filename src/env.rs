use std::cmp::Ordering;

use crate::error::{EvalResult, RascalError};
use crate::heap::Heap;
use crate::interner::SymId;
use crate::value::{Arity, ObjRef};

//===----------------------------------------------------------------------===//
// Environments
//===----------------------------------------------------------------------===//
//
// An environment is an ordinary heap value: a pair `(frame . parent)`.
// The frame is a list of `(symbol . value)` binding pairs kept sorted
// ascending by symbol spelling; the parent is the enclosing environment,
// or nil at the outermost scope. Because frames are plain pair chains the
// collector needs no special case for them.
//
// The mutation rules are asymmetric on purpose:
//   - `define` inserts by rebuilding the frame spine up to the insertion
//     point (structural sharing of the tail) and returns a new environment
//     node, so a closure holding the old environment is untouched.
//   - `set` mutates the nearest existing binding pair in place, so every
//     environment sharing that binding observes the update.

/// Create an environment with an empty frame on top of `parent`.
pub fn new_scope(heap: &mut Heap, parent: ObjRef) -> ObjRef {
    let nil = heap.nil();
    heap.pair(nil, parent)
}

fn frame_parts(heap: &Heap, env: ObjRef) -> Option<(ObjRef, ObjRef)> {
    heap.pair_parts(env)
}

fn binding_parts(heap: &Heap, binding: ObjRef) -> EvalResult<(SymId, ObjRef)> {
    let (sym, value) = heap
        .pair_parts(binding)
        .ok_or(RascalError::TypeMismatch { expected: "binding pair", got: heap.kind(binding) })?;
    let id = heap
        .symbol_id(sym)
        .ok_or(RascalError::TypeMismatch { expected: "sym", got: heap.kind(sym) })?;
    Ok((id, value))
}

/// Resolve `name` by walking the frame chain outward. Each frame is
/// scanned in order and abandoned early once the scanned spelling passes
/// `name`. Absent everywhere: the `undef` sentinel.
pub fn lookup(heap: &Heap, name: SymId, env: ObjRef) -> ObjRef {
    let mut scope = env;
    while let Some((frame, parent)) = frame_parts(heap, scope) {
        let mut rest = frame;
        while let Some((binding, tail)) = heap.pair_parts(rest) {
            if let Ok((bound, value)) = binding_parts(heap, binding) {
                match heap.name_cmp(bound, name) {
                    Ordering::Equal => return value,
                    Ordering::Greater => break, // sorted: cannot appear later
                    Ordering::Less => {}
                }
            }
            rest = tail;
        }
        scope = parent;
    }
    heap.unbound()
}

/// Bind `name` to `value` in the current frame only, returning the
/// environment that reflects the insertion. A name already bound in this
/// frame makes the operation inert and returns `env` unchanged; shadowing
/// belongs in a new frame, not here.
pub fn define(heap: &mut Heap, name: SymId, value: ObjRef, env: ObjRef) -> EvalResult<ObjRef> {
    let (frame, parent) = frame_parts(heap, env)
        .ok_or(RascalError::TypeMismatch { expected: "environment", got: heap.kind(env) })?;

    // Find the sorted position, remembering the spine we walked past.
    let mut prefix = Vec::new();
    let mut rest = frame;
    while let Some((binding, tail)) = heap.pair_parts(rest) {
        let (bound, _) = binding_parts(heap, binding)?;
        match heap.name_cmp(bound, name) {
            Ordering::Equal => return Ok(env),
            Ordering::Greater => break,
            Ordering::Less => {
                prefix.push(binding);
                rest = tail;
            }
        }
    }

    let sym = heap.symbol_from(name);
    let binding = heap.pair(sym, value);
    let mut new_frame = heap.pair(binding, rest);
    for carried in prefix.into_iter().rev() {
        new_frame = heap.pair(carried, new_frame);
    }
    Ok(heap.pair(new_frame, parent))
}

/// Mutate the nearest binding of `name` (current frame outward) in place.
/// Returns whether a binding was found; an absent name is a no-op.
pub fn set(heap: &mut Heap, name: SymId, value: ObjRef, env: ObjRef) -> EvalResult<bool> {
    let mut scope = env;
    while let Some((frame, parent)) = frame_parts(heap, scope) {
        let mut rest = frame;
        while let Some((binding, tail)) = heap.pair_parts(rest) {
            let (bound, _) = binding_parts(heap, binding)?;
            match heap.name_cmp(bound, name) {
                Ordering::Equal => {
                    heap.set_tail(binding, value);
                    return Ok(true);
                }
                Ordering::Greater => break,
                Ordering::Less => {}
            }
            rest = tail;
        }
        scope = parent;
    }
    Ok(false)
}

/// Build the frame for a procedure call: bind the closure's formals to the
/// evaluated arguments, one new frame whose parent is the closure's own
/// captured environment. Argument count must match the formal count.
pub fn extend(
    heap: &mut Heap,
    formals: ObjRef,
    args: &[ObjRef],
    parent: ObjRef,
) -> EvalResult<ObjRef> {
    let names = heap
        .list_to_vec(formals)
        .ok_or(RascalError::TypeMismatch { expected: "formals list", got: heap.kind(formals) })?;
    if names.len() != args.len() {
        return Err(RascalError::ArityMismatch {
            name: "#proc".to_string(),
            expected: Arity::Exact(names.len()),
            got: args.len(),
        });
    }

    let mut env = new_scope(heap, parent);
    for (formal, &value) in names.iter().zip(args.iter()) {
        let id = heap
            .symbol_id(*formal)
            .ok_or(RascalError::TypeMismatch { expected: "sym", got: heap.kind(*formal) })?;
        env = define(heap, id, value, env)?;
    }
    Ok(env)
}
