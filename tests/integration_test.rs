// ABOUTME: End-to-end read/eval/write integration tests covering spec.md §8

use serial_test::serial;
use veclisp::eval::eval;
use veclisp::primitives;
use veclisp::reader::{self, ReadOutcome};
use veclisp::scope::Scope;
use veclisp::streams;
use veclisp::value::Value;
use veclisp::writer;

fn fresh_root() -> std::rc::Rc<Scope> {
    let root = Scope::root();
    primitives::register_all(&root);
    root
}

/// Reads and evaluates every top-level form in `src` under a fresh root
/// scope, returning the last result.
fn run(src: &str) -> Result<Value, Value> {
    let scope = fresh_root();
    let handle = streams::open_in_memory_input(src.as_bytes().to_vec());
    let mut result = Ok(Value::nil());
    loop {
        match reader::read(handle) {
            Ok(ReadOutcome::End) => break,
            Ok(ReadOutcome::Value(form)) => {
                result = eval(&scope, &form);
                if result.is_err() {
                    break;
                }
            }
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }
    streams::close(handle);
    result
}

fn written(v: &Value) -> String {
    String::from_utf8(writer::canonical_bytes(v)).unwrap()
}

#[test]
#[serial]
fn arithmetic_fold_end_to_end() {
    assert_eq!(run("(+ 1 2 3)").unwrap(), Value::Int(6));
}

#[test]
#[serial]
fn quote_then_call_by_name() {
    assert_eq!(
        run("(let () (set id '((x) x)) (id 42))").unwrap(),
        Value::Int(42)
    );
}

#[test]
#[serial]
fn reader_dotted_pair_scenarios() {
    let v = run("(1 . 2)").unwrap();
    assert_eq!(v.head().unwrap(), Value::Int(1));
    assert_eq!(v.tail().unwrap(), Value::Int(2));

    let v = run("(1 2 . 3)").unwrap();
    let items: Vec<Value> = v.iter_list().collect();
    assert_eq!(items, vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(v.list_tail(), Value::Int(3));

    let err = run("(1 . 2 3)").unwrap_err();
    assert_eq!(err.as_symbol().unwrap().as_ref(), b"illegal dotted list");
}

#[test]
#[serial]
fn quote_writer_round_trip_uses_dotted_form() {
    assert_eq!(written(&run("'foo").unwrap()), "(quote . foo)");
}

#[test]
#[serial]
fn vector_evaluation_end_to_end() {
    assert_eq!(written(&run("[(+ 1 2) 3]").unwrap()), "[3 3]");
}

#[test]
#[serial]
fn catch_end_to_end() {
    assert_eq!(run("(catch (e e) (throw 'oops))").unwrap().as_symbol().unwrap().as_ref(), b"oops");
}

#[test]
#[serial]
fn chained_comparison() {
    assert!(run("(< 1 2 3)").unwrap().is_truthy());
    assert!(!run("(< 1 2 2)").unwrap().is_truthy());
    assert!(run("(= 1 1 1)").unwrap().is_truthy());
}

#[test]
#[serial]
fn lookup_shadowing_does_not_leak_to_toplevel() {
    assert_eq!(
        run("(let ((x 1)) (let ((x 2)) x)) x").unwrap(),
        Value::nil()
    );
}

#[test]
#[serial]
fn set_targets_nearest_defining_frame() {
    assert_eq!(run("(let ((x 1)) (set x 2) x)").unwrap(), Value::Int(2));
    assert!(run("(let ((x 1)) (set x 2)) x").unwrap().is_nil());
}

#[test]
#[serial]
fn argument_evaluation_discipline_across_lambda_list_shapes() {
    // List lambda list: args evaluated once, left to right, caller scope.
    assert_eq!(run("('((x) (+ x x)) (+ 1 1))").unwrap(), Value::Int(4));
    // Vector lambda list: args bound unevaluated.
    let v = run("('([x] x) (+ 1 2))").unwrap();
    assert_eq!(written(&v), "(+ 1 2)");
}

#[test]
#[serial]
fn map_and_filter_preserve_dotted_tail() {
    let doubled = run("(map '([n] (* n 2)) '(1 2 . 3))").unwrap();
    let items: Vec<Value> = doubled.iter_list().collect();
    assert_eq!(items, vec![Value::Int(2), Value::Int(4)]);
    assert_eq!(doubled.list_tail(), Value::Int(6));
}

#[test]
#[serial]
fn fold_sums_a_list() {
    assert_eq!(run("(fold '([n acc] (+ n acc)) 0 '(1 2 3 4))").unwrap(), Value::Int(10));
}

#[test]
#[serial]
fn sequence_introspection_length() {
    assert_eq!(run("(length '(1 2 3))").unwrap(), Value::Int(3));
    assert_eq!(run("(length [10 20])").unwrap(), Value::Int(2));
    assert_eq!(run(r#"(length "abc")"#).unwrap(), Value::Int(3));
}

#[test]
#[serial]
fn total_order_is_antisymmetric() {
    assert_eq!(run("(<=> 1 2)").unwrap(), Value::Int(-1));
    assert_eq!(run("(<=> 2 1)").unwrap(), Value::Int(1));
    assert_eq!(run("(<=> 1 1)").unwrap(), Value::Int(0));
}

#[test]
#[serial]
fn intern_identity_is_pointer_equal() {
    assert!(run("(= 'hello 'hello)").unwrap().is_truthy());
}

#[test]
#[serial]
fn vector_ref_and_set_mutate_in_place() {
    assert_eq!(
        run("(let ((v [1 2 3])) (vector-set v 1 99) (vector-ref v 1))").unwrap(),
        Value::Int(99)
    );
}

#[test]
#[serial]
fn unfold_pair_builds_a_countdown_list() {
    let v = run("(unfold-pair '([n] (> n 0)) '([n] n) '([n] (- n 1)) 3)").unwrap();
    let items: Vec<Value> = v.iter_list().collect();
    assert_eq!(items, vec![Value::Int(3), Value::Int(2), Value::Int(1)]);
}
