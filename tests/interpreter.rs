use rascal::runtime::Runtime;
use rascal::value::Object;

fn eval(runtime: &mut Runtime, form: &str) -> String {
    runtime
        .rep(form)
        .pop()
        .unwrap_or_else(|| panic!("no outcome for `{}`", form))
        .rendered
}

fn eval_err(runtime: &mut Runtime, form: &str) -> String {
    let outcome = runtime
        .rep(form)
        .pop()
        .unwrap_or_else(|| panic!("no outcome for `{}`", form));
    assert!(outcome.is_error, "expected `{}` to fail, got `{}`", form, outcome.rendered);
    outcome.rendered
}

//===----------------------------------------------------------------------===//
// Self-evaluation
//===----------------------------------------------------------------------===//

#[test]
fn numbers_strings_and_sentinels_are_self_evaluating() {
    let mut rt = Runtime::new();
    assert_eq!(eval(&mut rt, "42"), "42");
    assert_eq!(eval(&mut rt, "-42"), "-42");
    assert_eq!(eval(&mut rt, "\"hello\""), "hello");
    assert_eq!(eval(&mut rt, "nil"), "nil");
    assert_eq!(eval(&mut rt, "t"), "t");
}

#[test]
fn evaluating_a_name_bound_to_undef_is_an_unbound_error() {
    let mut rt = Runtime::new();
    // The binding exists but holds the absent-binding marker; asking for
    // its value is the same as asking for no value at all.
    assert_eq!(eval_err(&mut rt, "undef"), "Unbound symbol: undef");
    // Quoted, the marker flows through structurally.
    assert_eq!(eval(&mut rt, ":undef"), "undef");
}

#[test]
fn procedure_values_evaluate_to_themselves() {
    let mut rt = Runtime::new();
    rt.rep("(def id (fn (x) x))");
    // Evaluate the closure value itself: identity, same handle out.
    let closure = rt.last_result();
    let mut env = rt.globals();
    assert_eq!(rt.evaluate(closure, &mut env), closure);

    rt.rep("+");
    let prim = rt.last_result();
    assert!(matches!(rt.heap().get(prim), Object::Primitive(_)));
    let mut env = rt.globals();
    assert_eq!(rt.evaluate(prim, &mut env), prim);
}

#[test]
fn error_values_flow_as_data() {
    let mut rt = Runtime::new();
    rt.rep("(/ 1 0)");
    let error = rt.last_result();
    let mut env = rt.globals();
    assert_eq!(rt.evaluate(error, &mut env), error);
}

//===----------------------------------------------------------------------===//
// Binding and scope
//===----------------------------------------------------------------------===//

#[test]
fn call_frames_shadow_without_touching_outer_bindings() {
    let mut rt = Runtime::new();
    eval(&mut rt, "(def x 1)");
    assert_eq!(eval(&mut rt, "((fn (x) (+ x 10)) 5)"), "15");
    assert_eq!(eval(&mut rt, "x"), "1");
}

#[test]
fn redefinition_in_the_same_frame_is_inert() {
    let mut rt = Runtime::new();
    eval(&mut rt, "(def x 1)");
    eval(&mut rt, "(def x 2)");
    assert_eq!(eval(&mut rt, "x"), "1");
}

#[test]
fn set_mutates_and_set_on_unbound_is_a_noop() {
    let mut rt = Runtime::new();
    eval(&mut rt, "(def x 1)");
    eval(&mut rt, "(set! x 2)");
    assert_eq!(eval(&mut rt, "x"), "2");

    // Never-defined name: no error, no binding created.
    assert_eq!(eval(&mut rt, "(set! y 9)"), "9");
    let err = eval_err(&mut rt, "y");
    assert_eq!(err, "Unbound symbol: y");
}

#[test]
fn def_and_set_yield_the_evaluated_value() {
    let mut rt = Runtime::new();
    assert_eq!(eval(&mut rt, "(def x (+ 20 1))"), "21");
    assert_eq!(eval(&mut rt, "(set! x (+ x 1))"), "22");
}

#[test]
fn closures_capture_their_defining_environment() {
    let mut rt = Runtime::new();
    eval(&mut rt, "(def x 1)");
    eval(&mut rt, "(def getx (fn () x))");
    assert_eq!(eval(&mut rt, "(getx)"), "1");
    // The binding pair is shared, so set! is visible through the capture.
    eval(&mut rt, "(set! x 50)");
    assert_eq!(eval(&mut rt, "(getx)"), "50");
}

#[test]
fn recursion_through_a_mutated_binding() {
    let mut rt = Runtime::new();
    eval(&mut rt, "(def fact nil)");
    eval(&mut rt, "(set! fact (fn (n) (if (eq? n 0) 1 (* n (fact (- n 1))))))");
    assert_eq!(eval(&mut rt, "(fact 5)"), "120");
}

#[test]
fn unbound_symbols_are_errors() {
    let mut rt = Runtime::new();
    assert_eq!(eval_err(&mut rt, "ghost"), "Unbound symbol: ghost");
}

//===----------------------------------------------------------------------===//
// Application and arity
//===----------------------------------------------------------------------===//

#[test]
fn closure_arity_is_enforced() {
    let mut rt = Runtime::new();
    eval(&mut rt, "(def add (fn (a b) (+ a b)))");
    assert_eq!(eval(&mut rt, "(add 1 2)"), "3");
    assert!(eval_err(&mut rt, "(add 1)").starts_with("Arity error"));
    assert!(eval_err(&mut rt, "(add 1 2 3)").starts_with("Arity error"));
}

#[test]
fn primitive_arity_is_enforced() {
    let mut rt = Runtime::new();
    assert!(eval_err(&mut rt, "(+ 1)").starts_with("Arity error"));
    assert!(eval_err(&mut rt, "(cons 1 2 3)").starts_with("Arity error"));
    assert!(eval_err(&mut rt, "(quote)").starts_with("Arity error"));
}

#[test]
fn applying_a_non_procedure_is_an_error() {
    let mut rt = Runtime::new();
    assert_eq!(eval_err(&mut rt, "(1 2)"), "Type error: num is not applicable");
}

#[test]
fn empty_closure_body_yields_nil() {
    let mut rt = Runtime::new();
    eval(&mut rt, "(def noop (fn ()))");
    assert_eq!(eval(&mut rt, "(noop)"), "nil");
}

#[test]
fn closure_bodies_run_in_order() {
    let mut rt = Runtime::new();
    eval(&mut rt, "(def x 0)");
    eval(&mut rt, "(def bump (fn () (set! x (+ x 1)) x))");
    assert_eq!(eval(&mut rt, "(bump)"), "1");
    assert_eq!(eval(&mut rt, "(bump)"), "2");
}

//===----------------------------------------------------------------------===//
// Special forms
//===----------------------------------------------------------------------===//

#[test]
fn if_evaluates_exactly_one_branch() {
    let mut rt = Runtime::new();
    assert_eq!(eval(&mut rt, "(if t 1 2)"), "1");
    assert_eq!(eval(&mut rt, "(if nil 1 2)"), "2");
    // The untaken branch is never evaluated, so its unbound symbol is fine.
    assert_eq!(eval(&mut rt, "(if t 1 ghost)"), "1");
    // Anything non-nil is true, including zero.
    assert_eq!(eval(&mut rt, "(if 0 1 2)"), "1");
}

#[test]
fn do_sequences_and_threads_definitions() {
    let mut rt = Runtime::new();
    assert_eq!(eval(&mut rt, "(do (def a 1) (def b 2) (+ a b))"), "3");
    assert_eq!(eval(&mut rt, "(do)"), "nil");
    // Definitions made inside a top-level do persist.
    assert_eq!(eval(&mut rt, "a"), "1");
}

#[test]
fn quote_returns_structure_unevaluated() {
    let mut rt = Runtime::new();
    assert_eq!(eval(&mut rt, ":(+ 1 2)"), "(+ 1 2)");
    assert_eq!(eval(&mut rt, "(quote (+ 1 2))"), "(+ 1 2)");
    assert_eq!(eval(&mut rt, ":x"), "x");
}

#[test]
fn unquote_substitutes_inside_quote() {
    let mut rt = Runtime::new();
    assert_eq!(eval(&mut rt, ":$(+ 1 2)"), "3");
    assert_eq!(eval(&mut rt, ":(a $(+ 1 2) c)"), "(a 3 c)");
    // Unquote nested below another list level still fires.
    assert_eq!(eval(&mut rt, ":(a (b $(+ 1 1)))"), "(a (b 2))");
}

#[test]
fn unquote_outside_quote_evaluates_eagerly() {
    let mut rt = Runtime::new();
    assert_eq!(eval(&mut rt, "$(+ 1 2)"), "3");
}

#[test]
fn quoted_data_can_carry_unbound_names_without_error() {
    let mut rt = Runtime::new();
    assert_eq!(eval(&mut rt, ":(ghost undef)"), "(ghost undef)");
}

//===----------------------------------------------------------------------===//
// Primitives
//===----------------------------------------------------------------------===//

#[test]
fn arithmetic() {
    let mut rt = Runtime::new();
    assert_eq!(eval(&mut rt, "(+ 1 2)"), "3");
    assert_eq!(eval(&mut rt, "(- 1 2)"), "-1");
    assert_eq!(eval(&mut rt, "(* 6 7)"), "42");
    assert_eq!(eval(&mut rt, "(/ 7 2)"), "3");
    assert_eq!(eval(&mut rt, "(% 7 2)"), "1");
    assert_eq!(eval(&mut rt, "(pow 2 8)"), "256");
}

#[test]
fn division_and_modulo_by_zero_are_errors() {
    let mut rt = Runtime::new();
    assert_eq!(eval_err(&mut rt, "(/ 1 0)"), "Arithmetic error: division by zero");
    assert_eq!(eval_err(&mut rt, "(% 1 0)"), "Arithmetic error: modulo by zero");
    assert_eq!(eval_err(&mut rt, "(pow 2 -1)"), "Arithmetic error: negative exponent");
}

#[test]
fn arithmetic_rejects_non_numbers() {
    let mut rt = Runtime::new();
    assert_eq!(eval_err(&mut rt, "(+ 1 :a)"), "Type error: expected num, got sym");
}

#[test]
fn pairs_and_lists() {
    let mut rt = Runtime::new();
    assert_eq!(eval(&mut rt, "(head (cons 1 2))"), "1");
    assert_eq!(eval(&mut rt, "(tail (cons 1 2))"), "2");
    assert_eq!(eval(&mut rt, "(cons 1 (cons 2 nil))"), "(1 2)");
    assert_eq!(eval(&mut rt, "(len :(1 2 3))"), "3");
    assert_eq!(eval(&mut rt, "(len nil)"), "0");
    assert_eq!(eval_err(&mut rt, "(head nil)"), "Type error: expected cons, got sym");
    assert_eq!(eval_err(&mut rt, "(len 5)"), "Type error: expected list, got num");
}

#[test]
fn eq_compares_symbols_and_numbers_only() {
    let mut rt = Runtime::new();
    assert_eq!(eval(&mut rt, "(eq? 1 1)"), "t");
    assert_eq!(eval(&mut rt, "(eq? 1 2)"), "nil");
    assert_eq!(eval(&mut rt, "(eq? :a :a)"), "t");
    assert_eq!(eval(&mut rt, "(eq? :a :b)"), "nil");
    assert_eq!(eval(&mut rt, "(eq? :a 1)"), "nil");
    assert!(eval_err(&mut rt, "(eq? \"a\" \"a\")").starts_with("Type error"));
}

#[test]
fn eval_reenters_with_an_environment_argument() {
    let mut rt = Runtime::new();
    assert_eq!(eval(&mut rt, "(eval :(+ 1 2) (globals))"), "3");
    assert_eq!(eval_err(&mut rt, "(eval 1 2)"), "Type error: expected environment, got num");
}

#[test]
fn apply_spreads_a_value_list() {
    let mut rt = Runtime::new();
    assert_eq!(eval(&mut rt, "(apply + (globals) :(1 2))"), "3");
    eval(&mut rt, "(def add (fn (a b) (+ a b)))");
    assert_eq!(eval(&mut rt, "(apply add (globals) :(3 4))"), "7");
}

#[test]
fn globals_exposes_the_global_frame_as_data() {
    let mut rt = Runtime::new();
    // Sentinels plus every builtin, one binding each.
    assert_eq!(eval(&mut rt, "(len (head (globals)))"), "26");
    // Inside a call, the chain still bottoms out at the global frame.
    assert_eq!(eval(&mut rt, "((fn (x) (len (head (globals)))) 1)"), "26");
}

#[test]
fn allocations_reports_a_live_count() {
    let mut rt = Runtime::new();
    let rendered = eval(&mut rt, "(allocations)");
    let count: i64 = rendered.parse().expect("allocations prints a number");
    assert!(count > 0);
}

//===----------------------------------------------------------------------===//
// Failure semantics
//===----------------------------------------------------------------------===//

#[test]
fn an_error_aborts_the_expression_but_not_the_session() {
    let mut rt = Runtime::new();
    eval_err(&mut rt, "(+ 1 ghost)");
    assert_eq!(eval(&mut rt, "(+ 1 2)"), "3");
}

#[test]
fn effects_before_the_error_point_stand() {
    let mut rt = Runtime::new();
    eval_err(&mut rt, "(do (def a 5) (/ 1 0))");
    assert_eq!(eval(&mut rt, "a"), "5");
}

#[test]
fn read_errors_use_the_same_error_channel() {
    let mut rt = Runtime::new();
    assert!(eval_err(&mut rt, "(+ 1").starts_with("Read error"));
    assert!(eval_err(&mut rt, "\"oops").starts_with("Read error"));
    assert_eq!(eval(&mut rt, "(+ 2 2)"), "4");
}
