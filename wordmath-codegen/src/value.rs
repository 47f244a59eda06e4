use std::fmt;
use wordmath_target::unit::{BinOp, Ty};

/// A runtime value of the reference [`Vm`](crate::vm::Vm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Long(i64),
    Double(f64),
}

impl Value {
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Long(val) => val as f64,
            Value::Double(val) => val,
        }
    }

    /// Explicit conversion. `Double` to `Long` truncates toward zero.
    pub fn cast(self, ty: Ty) -> Value {
        match (self, ty) {
            (Value::Long(val), Ty::Double) => Value::Double(val as f64),
            (Value::Double(val), Ty::Long) => Value::Long(val as i64),
            (val, _) => val,
        }
    }

    pub fn neg(self) -> Value {
        match self {
            Value::Long(val) => Value::Long(val.wrapping_neg()),
            Value::Double(val) => Value::Double(-val),
        }
    }

    /// Applies `op`. Two longs stay a long and wrap on overflow, anything else is a double.
    pub fn binary(self, op: BinOp, rhs: Value) -> Result<Value, String> {
        let (a, b) = match (self, rhs) {
            (Value::Long(a), Value::Long(b)) => {
                let val = match op {
                    BinOp::Add => a.wrapping_add(b),
                    BinOp::Sub => a.wrapping_sub(b),
                    BinOp::Mul => a.wrapping_mul(b),
                    BinOp::Div if b == 0 => return Err("Attempted to divide by zero.".to_string()),
                    BinOp::Div => a
                        .checked_div(b)
                        .ok_or_else(|| "Arithmetic operation resulted in an overflow.".to_string())?,
                };
                return Ok(Value::Long(val));
            }
            (a, b) => (a.as_f64(), b.as_f64()),
        };
        let val = match op {
            BinOp::Add => a + b,
            BinOp::Sub => a - b,
            BinOp::Mul => a * b,
            BinOp::Div => a / b,
        };
        Ok(Value::Double(val))
    }
}

/// Writes `val` the way .NET formats a double with the invariant culture:
/// shortest round-trip digits, scientific notation below `0.0001` and from `1E+15`.
fn write_double(f: &mut fmt::Formatter<'_>, val: f64) -> fmt::Result {
    if val.is_nan() {
        return write!(f, "NaN");
    }
    if val.is_infinite() {
        return write!(f, "{}", if val > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if val == 0.0 {
        return write!(f, "{}", if val.is_sign_negative() { "-0" } else { "0" });
    }

    let scientific = format!("{:e}", val);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return write!(f, "{}", val),
    };
    let exponent: i32 = match exponent.parse() {
        Ok(exponent) => exponent,
        Err(_) => return write!(f, "{}", val),
    };
    if (-4..15).contains(&exponent) {
        write!(f, "{}", val)
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        write!(f, "{}E{}{:02}", mantissa, sign, exponent.abs())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Long(val) => write!(f, "{}", val),
            Value::Double(val) => write_double(f, *val),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Long(-14).to_string(), "-14");
        assert_eq!(Value::Double(0.5).to_string(), "0.5");
        assert_eq!(Value::Double(2.0).to_string(), "2");
        assert_eq!(Value::Double(std::f64::consts::PI).to_string(), "3.141592653589793");
        assert_eq!(Value::Double(123456789012345.0).to_string(), "123456789012345");
        assert_eq!(Value::Double(1e15).to_string(), "1E+15");
        assert_eq!(Value::Double(-2.5e20).to_string(), "-2.5E+20");
        assert_eq!(Value::Double(0.0001).to_string(), "0.0001");
        assert_eq!(Value::Double(0.00001).to_string(), "1E-05");
        assert_eq!(Value::Double(1.0 / 0.0).to_string(), "Infinity");
        assert_eq!(Value::Double(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(Value::Long(7).binary(BinOp::Div, Value::Long(2)), Ok(Value::Long(3)));
        assert!(Value::Long(1).binary(BinOp::Div, Value::Long(0)).is_err());
        assert_eq!(
            Value::Long(i64::MAX).binary(BinOp::Add, Value::Long(1)),
            Ok(Value::Long(i64::MIN))
        );
        assert_eq!(
            Value::Long(1).cast(Ty::Double).binary(BinOp::Div, Value::Long(2)),
            Ok(Value::Double(0.5))
        );
        assert_eq!(Value::Double(1.0).binary(BinOp::Div, Value::Long(0)), Ok(Value::Double(f64::INFINITY)));
        assert_eq!(Value::Double(-2.7).cast(Ty::Long), Value::Long(-2));
        assert_eq!(Value::Long(3).neg(), Value::Long(-3));
    }
}
