use std::fmt;

use crate::error::EvalResult;
use crate::heap::Heap;
use crate::interner::SymId;

//===----------------------------------------------------------------------===//
// Handles
//===----------------------------------------------------------------------===//

/// Index into the heap's slot arena. This is the GC handle: `Copy`, cheap
/// to pass around, and only meaningful together with the heap that issued
/// it. Sentinel identity (`nil`, `undef`) is handle equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef(pub u32);

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjRef({})", self.0)
    }
}

//===----------------------------------------------------------------------===//
// Object
//===----------------------------------------------------------------------===//

/// GC color of a heap slot. `Grey` is reserved for an incremental
/// collector and is treated as unmarked by the current stop-the-world
/// cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mark {
    White,
    Grey,
    Black,
}

/// Number of arguments a callable accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn admits(self, got: usize) -> bool {
        match self {
            Arity::Exact(n) => got == n,
            Arity::AtLeast(n) => got >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "exactly {}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// When a callable's arguments are evaluated.
///
/// `Eager` callables receive evaluated argument values. `Form` callables
/// receive the raw expressions plus the caller's environment and decide
/// per argument what to evaluate (`if`, `def`, `fn`, ...). `Quote`
/// callables run in quote-eval mode (`quote`, `unquote`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Policy {
    Eager,
    Form,
    Quote,
}

/// A native procedure body. Receives the heap, the argument expressions or
/// values (depending on [`Policy`]), and the caller's environment handle,
/// which it may rebind (this is how `def` threads new frames outward).
pub type NativeFn = fn(&mut Heap, &[ObjRef], &mut ObjRef) -> EvalResult<ObjRef>;

/// A built-in procedure or special form.
#[derive(Clone, Copy)]
pub struct Primitive {
    pub name: SymId,
    pub arity: Arity,
    pub policy: Policy,
    pub body: NativeFn,
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Primitive")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("policy", &self.policy)
            .finish()
    }
}

/// A user-defined procedure: formal parameter list, body expressions, and
/// the environment captured where the `fn` form was evaluated. The
/// captured environment is a snapshot handle; invocation extends it with a
/// fresh frame and never rewrites it.
#[derive(Clone, Copy, Debug)]
pub struct Closure {
    pub formals: ObjRef,
    pub body: ObjRef,
    pub env: ObjRef,
}

/// The closed set of heap value kinds. Every slot in the arena holds
/// exactly one of these; the evaluator and the collector both match on it
/// exhaustively.
#[derive(Clone, Debug)]
pub enum Object {
    Number(i64),
    Str(String),
    Error(crate::error::RascalError),
    Symbol(SymId),
    Pair(ObjRef, ObjRef),
    Primitive(Primitive),
    Closure(Closure),
}

impl Object {
    /// Short kind name used in type-error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Number(_) => "num",
            Object::Str(_) => "str",
            Object::Error(_) => "err",
            Object::Symbol(_) => "sym",
            Object::Pair(_, _) => "cons",
            Object::Primitive(_) => "prim",
            Object::Closure(_) => "proc",
        }
    }
}
