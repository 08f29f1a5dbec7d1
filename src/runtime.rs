use crate::builtins;
use crate::eval;
use crate::heap::Heap;
use crate::printer;
use crate::reader;
use crate::value::{ObjRef, Object};

/// Collection threshold the driver uses when none is given: once the live
/// object count passes this, the next top-level boundary runs a cycle.
pub const DEFAULT_GC_THRESHOLD: usize = 2048;

//===----------------------------------------------------------------------===//
// Runtime
//===----------------------------------------------------------------------===//

/// One interpreter session: the heap, the global environment handle, the
/// most recent top-level result, and the collection policy. Sessions are
/// independent; tests run many of them side by side.
///
/// The last result is held as a GC root so a value in hand between
/// evaluation and printing is never collected out from under the driver.
pub struct Runtime {
    heap: Heap,
    globals: ObjRef,
    last_result: ObjRef,
    gc_threshold: usize,
}

/// One top-level expression's rendered outcome.
pub struct Evaluation {
    pub rendered: String,
    pub is_error: bool,
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_gc_threshold(DEFAULT_GC_THRESHOLD)
    }

    /// A threshold of `0` disables automatic collection; `1` forces a
    /// cycle at every top-level boundary.
    pub fn with_gc_threshold(gc_threshold: usize) -> Self {
        let mut heap = Heap::new();
        let globals = builtins::make_global_environment(&mut heap);
        let last_result = heap.nil();
        Runtime { heap, globals, last_result, gc_threshold }
    }

    //===------------------------------------------------------------------===//
    // Evaluation
    //===------------------------------------------------------------------===//

    /// The sole evaluation entry point. Always returns a value: an
    /// evaluation failure comes back as an `Error` heap value, never as a
    /// native fault. Environment mutations committed before a failure
    /// stand.
    pub fn evaluate(&mut self, expr: ObjRef, env: &mut ObjRef) -> ObjRef {
        match eval::eval(&mut self.heap, expr, env) {
            Ok(value) => value,
            Err(err) => self.heap.error(err),
        }
    }

    /// Evaluate one top-level expression against the global environment,
    /// threading the (possibly extended) environment back and rooting the
    /// result. Collection is not triggered here; the driver decides when.
    pub fn eval_top(&mut self, expr: ObjRef) -> ObjRef {
        let mut env = self.globals;
        let value = self.evaluate(expr, &mut env);
        self.globals = env;
        self.last_result = value;
        value
    }

    /// Read and evaluate every form in `input`, returning one rendered
    /// outcome per form. A read failure yields a single error outcome; an
    /// evaluation failure is rendered for its own form and the remaining
    /// forms still run. A collection may run after the batch, never inside
    /// it.
    pub fn rep(&mut self, input: &str) -> Vec<Evaluation> {
        let forms = match reader::read_all(&mut self.heap, input) {
            Ok(forms) => forms,
            Err(err) => {
                let value = self.heap.error(err);
                self.last_result = value;
                return vec![self.render(value)];
            }
        };

        let mut outcomes = Vec::with_capacity(forms.len());
        for form in forms {
            let value = self.eval_top(form);
            outcomes.push(self.render(value));
        }
        self.maybe_collect();
        outcomes
    }

    fn render(&self, value: ObjRef) -> Evaluation {
        Evaluation {
            rendered: printer::print(&self.heap, value),
            is_error: matches!(self.heap.get(value), Object::Error(_)),
        }
    }

    //===------------------------------------------------------------------===//
    // Collection
    //===------------------------------------------------------------------===//

    /// Run one mark-sweep cycle rooted at the global environment and the
    /// last top-level result. Returns the post-collection live count.
    pub fn collect(&mut self) -> usize {
        let roots = [self.globals, self.last_result];
        self.heap.collect(&roots)
    }

    /// Apply the trigger policy: collect if the live count exceeds the
    /// threshold. Called only at top-level boundaries, when no transient
    /// handles are outstanding.
    pub fn maybe_collect(&mut self) -> Option<usize> {
        if self.gc_threshold > 0 && self.heap.allocation_count() > self.gc_threshold {
            Some(self.collect())
        } else {
            None
        }
    }

    pub fn allocation_count(&self) -> usize {
        self.heap.allocation_count()
    }

    //===------------------------------------------------------------------===//
    // Accessors
    //===------------------------------------------------------------------===//

    pub fn globals(&self) -> ObjRef {
        self.globals
    }

    pub fn last_result(&self) -> ObjRef {
        self.last_result
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last(runtime: &mut Runtime, input: &str) -> String {
        runtime.rep(input).pop().map(|e| e.rendered).unwrap_or_default()
    }

    #[test]
    fn rep_evaluates_and_renders() {
        let mut runtime = Runtime::new();
        assert_eq!(last(&mut runtime, "(+ 1 2)"), "3");
    }

    #[test]
    fn rep_surfaces_read_errors_as_error_values() {
        let mut runtime = Runtime::new();
        let outcomes = runtime.rep("(+ 1");
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_error);
    }

    #[test]
    fn an_error_form_does_not_stop_later_forms() {
        let mut runtime = Runtime::new();
        let outcomes = runtime.rep("(/ 1 0) (+ 1 1)");
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].is_error);
        assert_eq!(outcomes[1].rendered, "2");
    }

    #[test]
    fn definitions_persist_across_rep_calls() {
        let mut runtime = Runtime::new();
        runtime.rep("(def x 41)");
        assert_eq!(last(&mut runtime, "(+ x 1)"), "42");
    }

    #[test]
    fn sessions_are_independent() {
        let mut a = Runtime::new();
        let mut b = Runtime::new();
        a.rep("(def x 1)");
        let outcome = b.rep("x").pop().unwrap();
        assert!(outcome.is_error);
    }
}
