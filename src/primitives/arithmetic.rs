// ABOUTME: Arithmetic, bitwise, and numeric primitives (spec.md §4.8). These
// ABOUTME: are the "external collaborator" operations spec.md §1 calls
// ABOUTME: mechanical once the evaluator's calling convention is fixed.

use crate::error::LispError;
use crate::eval::eval;
use crate::scope::Scope;
use crate::value::{EvalResult, Value};
use std::cell::Cell;
use std::rc::Rc;

pub fn register(scope: &Rc<Scope>) {
    super::define(scope, "+", add);
    super::define(scope, "-", sub);
    super::define(scope, "*", mul);
    super::define(scope, "/", div);
    super::define(scope, "%", rem);
    super::define(scope, "exp", exp);
    super::define(scope, "shl", shl);
    super::define(scope, "shr", shr);
    super::define(scope, "bitand", bitand);
    super::define(scope, "bitor", bitor);
    super::define(scope, "bitxor", bitxor);
    super::define(scope, "bitwise-not", bitwise_not);
    super::define(scope, "abs", abs);
    super::define(scope, "sqrt", sqrt);
    super::define(scope, "rand", rand);
}

fn as_int(v: &Value) -> Result<i64, Value> {
    match v {
        Value::Int(n) => Ok(*n),
        _ => Err(LispError::ExpectedInteger.into()),
    }
}

fn ints(scope: &Rc<Scope>, tail: &Value) -> Result<Vec<i64>, Value> {
    tail.iter_list()
        .map(|form| eval(scope, &form).and_then(|v| as_int(&v)))
        .collect()
}

fn seed_and_rest(values: Vec<i64>, name: &'static str) -> Result<(i64, Vec<i64>), Value> {
    if values.is_empty() {
        return Err(LispError::arity(name, "1+", 0).into());
    }
    let mut it = values.into_iter();
    let seed = it.next().unwrap();
    Ok((seed, it.collect()))
}

fn add(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    Ok(Value::Int(ints(scope, tail)?.into_iter().sum()))
}

fn mul(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    Ok(Value::Int(ints(scope, tail)?.into_iter().product()))
}

fn sub(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let (seed, rest) = seed_and_rest(ints(scope, tail)?, "-")?;
    Ok(Value::Int(rest.into_iter().fold(seed, |a, b| a.wrapping_sub(b))))
}

fn div(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let (seed, rest) = seed_and_rest(ints(scope, tail)?, "/")?;
    rest.into_iter().try_fold(seed, |a, b| {
        a.checked_div(b)
            .ok_or_else(|| LispError::Custom("division by zero".to_string()).into_value())
    }).map(Value::Int)
}

fn rem(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let (seed, rest) = seed_and_rest(ints(scope, tail)?, "%")?;
    rest.into_iter().try_fold(seed, |a, b| {
        a.checked_rem(b)
            .ok_or_else(|| LispError::Custom("division by zero".to_string()).into_value())
    }).map(Value::Int)
}

fn exp(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let (seed, rest) = seed_and_rest(ints(scope, tail)?, "exp")?;
    Ok(Value::Int(
        rest.into_iter().fold(seed, |a, b| a.wrapping_pow(b.max(0) as u32)),
    ))
}

fn shl(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let (seed, rest) = seed_and_rest(ints(scope, tail)?, "shl")?;
    Ok(Value::Int(rest.into_iter().fold(seed, |a, b| a.wrapping_shl(b as u32))))
}

fn shr(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let (seed, rest) = seed_and_rest(ints(scope, tail)?, "shr")?;
    Ok(Value::Int(rest.into_iter().fold(seed, |a, b| a.wrapping_shr(b as u32))))
}

fn bitand(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let (seed, rest) = seed_and_rest(ints(scope, tail)?, "bitand")?;
    Ok(Value::Int(rest.into_iter().fold(seed, |a, b| a & b)))
}

fn bitor(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let (seed, rest) = seed_and_rest(ints(scope, tail)?, "bitor")?;
    Ok(Value::Int(rest.into_iter().fold(seed, |a, b| a | b)))
}

fn bitxor(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let (seed, rest) = seed_and_rest(ints(scope, tail)?, "bitxor")?;
    Ok(Value::Int(rest.into_iter().fold(seed, |a, b| a ^ b)))
}

fn one_arg(scope: &Rc<Scope>, tail: &Value, name: &'static str) -> Result<i64, Value> {
    let values = ints(scope, tail)?;
    if values.len() != 1 {
        return Err(LispError::arity(name, "1", values.len()).into());
    }
    Ok(values[0])
}

fn bitwise_not(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    Ok(Value::Int(!one_arg(scope, tail, "bitwise-not")?))
}

fn abs(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    Ok(Value::Int(one_arg(scope, tail, "abs")?.wrapping_abs()))
}

fn sqrt(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let n = one_arg(scope, tail, "sqrt")?;
    Ok(Value::Int((n.max(0) as f64).sqrt() as i64))
}

thread_local! {
    static RAND_STATE: Cell<i64> = const { Cell::new(0x2545_F491_4F6C_DD1D) };
}

/// A linear congruential step (same constants as PCG's multiplier), used
/// both for the stateful zero-argument form and the seeded chaining form.
fn next_lcg(seed: i64) -> i64 {
    seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407)
}

fn rand(scope: &Rc<Scope>, tail: &Value) -> EvalResult {
    let values = ints(scope, tail)?;
    match values.len() {
        0 => Ok(Value::Int(RAND_STATE.with(|state| {
            let next = next_lcg(state.get());
            state.set(next);
            next
        }))),
        1 => {
            let next = next_lcg(values[0]);
            Ok(Value::cons(Value::Int(next), Value::Int(next)))
        }
        n => Err(LispError::arity("rand", "0 or 1", n).into()),
    }
}
