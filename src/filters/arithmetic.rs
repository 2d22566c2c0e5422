//! Arithmetic filters (spec.md §4.E "Arithmetic"). Two integers produce an
//! integer, except `divide`, which promotes to float when the operands
//! aren't evenly divisible; any float operand promotes the whole operation
//! to float, which is also why `add`'s `Value` equality treats `Integer(2)`
//! and `Float(2.0)` as equal.

use super::{arg, FilterContext, Registry};
use crate::{error::FilterError, value::Value};

pub(super) fn register(registry: &mut Registry) {
    registry.register_aliases(&["add"], 1, false, |args, ctx| binary_op(args, ctx, "add", Op::Add));
    registry.register_aliases(
        &["sub", "subtract"],
        1,
        false,
        |args, ctx| binary_op(args, ctx, "sub", Op::Sub),
    );
    registry.register_aliases(
        &["mul", "multiply"],
        1,
        false,
        |args, ctx| binary_op(args, ctx, "mul", Op::Mul),
    );
    registry.register_aliases(
        &["div", "divide"],
        1,
        false,
        |args, ctx| binary_op(args, ctx, "div", Op::Div),
    );
}

#[derive(Clone, Copy)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

fn as_number(value: &Value, filter: &str) -> Result<Number, FilterError> {
    match value {
        Value::Integer(i) => Ok(Number::Int(*i)),
        Value::Float(f) => Ok(Number::Float(*f)),
        other => Err(FilterError::new(
            filter,
            format!("expected a number, got {other:?}"),
        )),
    }
}

enum Number {
    Int(i64),
    Float(f64),
}

fn binary_op(args: &[Value], _ctx: &FilterContext, name: &str, op: Op) -> Result<Value, FilterError> {
    let lhs = as_number(&args[0], name)?;
    let rhs = as_number(arg(args, 1, name)?, name)?;
    Ok(match (lhs, rhs, op) {
        (Number::Int(a), Number::Int(b), Op::Add) => Value::Integer(a + b),
        (Number::Int(a), Number::Int(b), Op::Sub) => Value::Integer(a - b),
        (Number::Int(a), Number::Int(b), Op::Mul) => Value::Integer(a * b),
        (Number::Int(a), Number::Int(b), Op::Div) => {
            if b == 0 {
                return Err(FilterError::new(name, "division by zero"));
            }
            if a % b == 0 {
                Value::Integer(a / b)
            } else {
                Value::Float(a as f64 / b as f64)
            }
        }
        (a, b, op) => {
            let (a, b) = (to_f64(a), to_f64(b));
            match op {
                Op::Add => Value::Float(a + b),
                Op::Sub => Value::Float(a - b),
                Op::Mul => Value::Float(a * b),
                Op::Div => {
                    if b == 0.0 {
                        return Err(FilterError::new(name, "division by zero"));
                    }
                    Value::Float(a / b)
                }
            }
        }
    })
}

fn to_f64(n: Number) -> f64 {
    match n {
        Number::Int(i) => i as f64,
        Number::Float(f) => f,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_add_stays_integer() {
        let result = binary_op(&[Value::Integer(1), Value::Integer(2)], &FilterContext::bare(), "add", Op::Add).unwrap();
        assert_eq!(result, Value::Integer(3));
    }

    #[test]
    fn mixed_operand_promotes_to_float() {
        let result = binary_op(&[Value::Integer(1), Value::Float(0.5)], &FilterContext::bare(), "add", Op::Add).unwrap();
        assert_eq!(result, Value::Float(1.5));
    }

    #[test]
    fn division_by_zero_errors() {
        let result = binary_op(&[Value::Integer(1), Value::Integer(0)], &FilterContext::bare(), "div", Op::Div);
        assert!(result.is_err());
    }

    #[test]
    fn integer_division_stays_integer_when_evenly_divisible() {
        let result = binary_op(&[Value::Integer(1), Value::Integer(1)], &FilterContext::bare(), "div", Op::Div).unwrap();
        assert_eq!(result, Value::Integer(1));
    }

    #[test]
    fn integer_division_promotes_to_float_when_not_evenly_divisible() {
        let result = binary_op(&[Value::Integer(3), Value::Integer(4)], &FilterContext::bare(), "div", Op::Div).unwrap();
        assert_eq!(result, Value::Float(0.75));
    }
}
