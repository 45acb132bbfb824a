// ABOUTME: Total order over all Value kinds, used by <=>, =, <, >, <=, >=, min, max

use crate::value::Value;
use std::cmp::Ordering;
use std::rc::Rc;

fn kind_rank(v: &Value) -> u8 {
    match v {
        Value::Int(_) => 0,
        Value::Symbol(_) => 1,
        Value::Vector(_) => 2,
        Value::Pair(_) => 3,
        Value::Primitive(_) => 4,
        Value::Stream(_) => 5,
    }
}

/// Total order per spec.md §4.5:
/// - same-kind values compare structurally (numeric, identity-then-lexicographic,
///   length-then-elementwise, nil-then-head-then-tail)
/// - across kinds, nil sorts below any non-nil value of a different kind;
///   otherwise ordering follows the declared kind-tag order
///   Integer < Symbol < Vector < Pair (host-only tags Primitive/Stream sort
///   after Pair, since they never appear in source-level comparisons but
///   still need a total order to satisfy `Ord`).
pub fn compare(a: &Value, b: &Value) -> Ordering {
    let a_nil = a.is_nil();
    let b_nil = b.is_nil();
    if a_nil && b_nil {
        return Ordering::Equal;
    }

    if kind_rank(a) != kind_rank(b) {
        if a_nil {
            return Ordering::Less;
        }
        if b_nil {
            return Ordering::Greater;
        }
        return kind_rank(a).cmp(&kind_rank(b));
    }

    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Symbol(x), Value::Symbol(y)) => {
            if Rc::ptr_eq(x, y) {
                Ordering::Equal
            } else {
                x.as_ref().cmp(y.as_ref())
            }
        }
        (Value::Vector(x), Value::Vector(y)) => {
            let xb = x.borrow();
            let yb = y.borrow();
            match xb.len().cmp(&yb.len()) {
                Ordering::Equal => {
                    for (xi, yi) in xb.iter().zip(yb.iter()) {
                        let ord = compare(xi, yi);
                        if ord != Ordering::Equal {
                            return ord;
                        }
                    }
                    Ordering::Equal
                }
                other => other,
            }
        }
        (Value::Pair(pa), Value::Pair(pb)) => match (pa, pb) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(ca), Some(cb)) => {
                let head_ord = compare(&ca.head.borrow(), &cb.head.borrow());
                if head_ord != Ordering::Equal {
                    return head_ord;
                }
                compare(&ca.tail.borrow(), &cb.tail.borrow())
            }
        },
        (Value::Primitive(x), Value::Primitive(y)) => (x.func as usize).cmp(&(y.func as usize)),
        (Value::Stream(x), Value::Stream(y)) => x.cmp(y),
        _ => unreachable!("kind_rank equality guarantees matching variants"),
    }
}

/// Evaluates a chained relational operator (e.g. `(< 1 2 3)`) by checking
/// that every consecutive pair of `values` satisfies `holds`. Short-circuits
/// on the first disproof, per spec.md §4.5.
pub fn chain_holds(values: &[Value], holds: impl Fn(Ordering) -> bool) -> bool {
    values
        .windows(2)
        .all(|pair| holds(compare(&pair[0], &pair[1])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::intern_str;

    #[test]
    fn integers_compare_numerically() {
        assert_eq!(compare(&Value::Int(1), &Value::Int(2)), Ordering::Less);
        assert_eq!(compare(&Value::Int(2), &Value::Int(2)), Ordering::Equal);
    }

    #[test]
    fn nil_sorts_below_non_nil_of_another_kind() {
        assert_eq!(compare(&Value::nil(), &Value::Int(-100)), Ordering::Less);
        assert_eq!(
            compare(&Value::Int(-100), &Value::nil()),
            Ordering::Greater
        );
    }

    #[test]
    fn nil_vs_cons_same_kind_is_less() {
        let cons = Value::cons(Value::Int(1), Value::nil());
        assert_eq!(compare(&Value::nil(), &cons), Ordering::Less);
    }

    #[test]
    fn symbols_compare_by_identity_then_bytes() {
        let a = Value::Symbol(intern_str("aaa"));
        let b = Value::Symbol(intern_str("bbb"));
        let a2 = Value::Symbol(intern_str("aaa"));
        assert_eq!(compare(&a, &a2), Ordering::Equal);
        assert_eq!(compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn vectors_compare_by_length_then_elementwise() {
        let short = Value::Vector(std::rc::Rc::new(std::cell::RefCell::new(vec![Value::Int(9)])));
        let long = Value::Vector(std::rc::Rc::new(std::cell::RefCell::new(vec![
            Value::Int(1),
            Value::Int(1),
        ])));
        assert_eq!(compare(&short, &long), Ordering::Less);
    }

    #[test]
    fn chained_strict_less_short_circuits() {
        let vals = vec![Value::Int(1), Value::Int(2), Value::Int(2)];
        assert!(!chain_holds(&vals, |o| o == Ordering::Less));
    }

    #[test]
    fn chained_equal_holds_across_all_pairs() {
        let vals = vec![Value::Int(1), Value::Int(1), Value::Int(1)];
        assert!(chain_holds(&vals, |o| o == Ordering::Equal));
    }

    #[test]
    fn kind_tag_order_integer_symbol_vector_pair() {
        let i = Value::Int(0);
        let s = Value::Symbol(intern_str("x"));
        let v = Value::Vector(std::rc::Rc::new(std::cell::RefCell::new(vec![])));
        let p = Value::cons(Value::Int(1), Value::nil());
        assert_eq!(compare(&i, &s), Ordering::Less);
        assert_eq!(compare(&s, &v), Ordering::Less);
        assert_eq!(compare(&v, &p), Ordering::Less);
    }
}
