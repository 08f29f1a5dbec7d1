use crate::heap::Heap;
use crate::value::{ObjRef, Object};

//===----------------------------------------------------------------------===//
// Printer
//===----------------------------------------------------------------------===//
//
// Rendering needs the heap to chase handles, so this is a function of
// `(&Heap, ObjRef)` rather than a `Display` impl on the handle type.

/// Render a value back to source-like text.
pub fn print(heap: &Heap, v: ObjRef) -> String {
    let mut out = String::new();
    write_value(heap, v, &mut out);
    out
}

fn write_value(heap: &Heap, v: ObjRef, out: &mut String) {
    match heap.get(v) {
        Object::Number(n) => out.push_str(&n.to_string()),
        Object::Str(s) => out.push_str(s),
        Object::Error(err) => out.push_str(&err.to_string()),
        Object::Symbol(id) => out.push_str(heap.sym_name(*id)),
        Object::Pair(_, _) => write_list(heap, v, out),
        Object::Primitive(_) => out.push_str("#proc"),
        Object::Closure(_) => out.push_str("#proc"),
    }
}

/// Lists print as `(a b c)`; a non-nil tail is printed in place, in the
/// manner of the original printer.
fn write_list(heap: &Heap, v: ObjRef, out: &mut String) {
    out.push('(');
    let mut curr = v;
    while !heap.is_nil(curr) {
        match heap.pair_parts(curr) {
            Some((head, tail)) => {
                write_value(heap, head, out);
                if !heap.is_nil(tail) {
                    out.push(' ');
                }
                curr = tail;
            }
            None => {
                write_value(heap, curr, out);
                break;
            }
        }
    }
    out.push(')');
}
