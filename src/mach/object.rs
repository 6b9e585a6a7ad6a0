use super::{Array, Decimal, Environment, Session};
use crate::error;
use crate::lang::ast::Expression;
use crate::lang::{Error, Ident, Suffix};
use std::cell::RefCell;
use std::convert::TryFrom;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// ## Runtime values
///
/// Everything an expression evaluates to. Failures are not objects;
/// they travel as the `Err` side of `Result<Object, Error>`.

#[derive(Debug, Clone)]
pub enum Object {
    Integer(i16),
    Long(i32),
    Fixed(Decimal),
    Single(f32),
    Double(f64),
    String(Rc<str>),
    Array(Rc<RefCell<Array>>),
    /// A value bound to a suffixed name such as `A%`.
    Typed(Box<Object>, Suffix),
    Function(Rc<UserFunction>),
    Builtin(Builtin),
    Return(Box<Object>),
}

/// A `DEF FN` closure over the environment it was defined in.
pub struct UserFunction {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Rc<Expression>,
    pub env: Environment,
}

impl std::fmt::Debug for UserFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserFunction({}/{})", self.name, self.params.len())
    }
}

pub type BuiltinFn = fn(&mut Session, Vec<Object>) -> Result<Object>;

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

impl Object {
    /// The value a fresh variable or array slot of this suffix holds.
    pub fn zero(suffix: Suffix) -> Object {
        match suffix {
            Suffix::String => Object::String("".into()),
            Suffix::Integer => Object::Integer(0),
            Suffix::Double => Object::Double(0.0),
            Suffix::Single | Suffix::Plain => Object::Single(0.0),
        }
    }

    pub fn into_value(self) -> Object {
        match self {
            Object::Typed(inner, _) => *inner,
            other => other,
        }
    }

    pub fn is_numeric(&self) -> bool {
        match self {
            Object::Integer(_)
            | Object::Long(_)
            | Object::Fixed(_)
            | Object::Single(_)
            | Object::Double(_) => true,
            Object::Typed(inner, _) => inner.is_numeric(),
            _ => false,
        }
    }

    pub fn is_string(&self) -> bool {
        match self {
            Object::String(_) => true,
            Object::Typed(inner, _) => inner.is_string(),
            _ => false,
        }
    }

    /// Both strings or both numbers.
    pub fn is_compatible(&self, other: &Object) -> bool {
        (self.is_numeric() && other.is_numeric()) || (self.is_string() && other.is_string())
    }

    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Object::Integer(n) => Ok(*n as f64),
            Object::Long(n) => Ok(*n as f64),
            Object::Fixed(d) => Ok(d.to_f64()),
            Object::Single(n) => Ok(*n as f64),
            Object::Double(n) => Ok(*n),
            Object::Typed(inner, _) => inner.to_f64(),
            _ => Err(error!(TypeMismatch)),
        }
    }

    pub fn to_f32(&self) -> Result<f32> {
        let n = match self {
            Object::Single(n) => *n,
            _ => self.to_f64()? as f32,
        };
        if n.is_finite() {
            Ok(n)
        } else {
            Err(error!(Overflow))
        }
    }

    /// Rounds half away from zero. Anything that doesn't fit an i64 overflows.
    pub fn round_i64(&self) -> Result<i64> {
        match self {
            Object::Integer(n) => Ok(*n as i64),
            Object::Long(n) => Ok(*n as i64),
            Object::Fixed(d) => i64::try_from(d.round(0)?),
            Object::Typed(inner, _) => inner.round_i64(),
            _ => {
                let n = self.to_f64()?.round();
                if n.is_finite() && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
                    Ok(n as i64)
                } else {
                    Err(error!(Overflow))
                }
            }
        }
    }

    /// Strict 16-bit conversion. Unlike arithmetic, this never widens.
    pub fn cint(&self) -> Result<i16> {
        match i16::try_from(self.round_i64()?) {
            Ok(n) => Ok(n),
            Err(_) => Err(error!(Overflow)),
        }
    }

    /// Subscripts, line numbers and similar counts truncate toward zero.
    pub fn to_index(&self) -> Result<i64> {
        match self {
            Object::Integer(n) => Ok(*n as i64),
            Object::Long(n) => Ok(*n as i64),
            Object::Fixed(d) => i64::try_from(*d),
            Object::Typed(inner, _) => inner.to_index(),
            _ => {
                let n = self.to_f64()?.trunc();
                if n.is_finite() && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
                    Ok(n as i64)
                } else {
                    Err(error!(Overflow))
                }
            }
        }
    }

    pub fn is_true(&self) -> Result<bool> {
        match self {
            Object::Integer(n) => Ok(*n != 0),
            Object::Long(n) => Ok(*n != 0),
            Object::Fixed(d) => Ok(!d.is_zero()),
            Object::Single(n) => Ok(*n != 0.0),
            Object::Double(n) => Ok(*n != 0.0),
            Object::Typed(inner, _) => inner.is_true(),
            _ => Err(error!(TypeMismatch)),
        }
    }

    /// Converts a value for storage under a name or array of the given
    /// suffix. Plain storage accepts any number unchanged.
    pub fn coerce(self, suffix: Suffix) -> Result<Object> {
        let value = self.into_value();
        match suffix {
            Suffix::String => match value {
                Object::String(_) => Ok(value),
                _ => Err(error!(TypeMismatch)),
            },
            _ if !value.is_numeric() => Err(error!(TypeMismatch)),
            Suffix::Plain => Ok(value),
            Suffix::Integer => Ok(Object::Integer(value.cint()?)),
            Suffix::Single => Ok(Object::Single(value.to_f32()?)),
            Suffix::Double => Ok(Object::Double(value.to_f64()?)),
        }
    }

    /// Number text without the sign column, as `STR$` and `PRINT` build on.
    pub fn number_text(&self) -> Option<String> {
        match self {
            Object::Integer(n) => Some(n.to_string()),
            Object::Long(n) => Some(n.to_string()),
            Object::Fixed(d) => Some(d.to_string()),
            Object::Single(n) => Some(float_text(*n as f64, format!("{:E}", n), n.to_string())),
            Object::Double(n) => Some(float_text(*n, format!("{:E}", n), n.to_string())),
            Object::Typed(inner, _) => inner.number_text(),
            _ => None,
        }
    }

    /// What `PRINT` writes: numbers get a sign column and a trailing space.
    pub fn print_text(&self) -> String {
        match self.number_text() {
            Some(s) if s.starts_with('-') => format!("{} ", s),
            Some(s) => format!(" {} ", s),
            None => self.to_string(),
        }
    }
}

fn float_text(n: f64, s: String, shortest: String) -> String {
    let magnitude = n.abs();
    if magnitude != 0.0 && !(1e-7..1e16).contains(&magnitude) {
        if s.contains("E-") {
            s
        } else {
            s.replace('E', "E+")
        }
    } else {
        shortest
    }
}

impl std::fmt::Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Object::*;
        match self {
            Integer(_) | Long(_) | Fixed(_) | Single(_) | Double(_) => match self.number_text() {
                Some(s) => write!(f, "{}", s),
                None => Ok(()),
            },
            String(s) => write!(f, "{}", s),
            Array(a) => write!(f, "ARRAY({})", a.borrow().len()),
            Typed(inner, _) => write!(f, "{}", inner),
            Function(func) => write!(f, "{}", func.name),
            Builtin(b) => write!(f, "{}", b.name),
            Return(inner) => write!(f, "{}", inner),
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Object) -> bool {
        use Object::*;
        match (self, other) {
            (Integer(l), Integer(r)) => l == r,
            (Long(l), Long(r)) => l == r,
            (Fixed(l), Fixed(r)) => l == r,
            (Single(l), Single(r)) => l.to_bits() == r.to_bits(),
            (Double(l), Double(r)) => l.to_bits() == r.to_bits(),
            (String(l), String(r)) => l == r,
            (Array(l), Array(r)) => Rc::ptr_eq(l, r),
            (Typed(l, ls), Typed(r, rs)) => ls == rs && l == r,
            (Function(l), Function(r)) => Rc::ptr_eq(l, r),
            (Builtin(l), Builtin(r)) => l.name == r.name,
            (Return(l), Return(r)) => l == r,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_print_text() {
        assert_eq!(Object::Integer(7).print_text(), " 7 ");
        assert_eq!(Object::Integer(-7).print_text(), "-7 ");
        assert_eq!(Object::Single(2.5).print_text(), " 2.5 ");
        assert_eq!(Object::Fixed("2.50".parse().unwrap()).print_text(), " 2.50 ");
        assert_eq!(Object::Single(1e20).print_text(), " 1E+20 ");
        assert_eq!(Object::String("HI".into()).print_text(), "HI");
    }

    #[test]
    fn test_cint_bounds() {
        assert_eq!(Object::Double(32767.4).cint().unwrap(), 32767);
        assert_eq!(Object::Double(-32768.4).cint().unwrap(), -32768);
        assert_eq!(Object::Double(32767.5).cint().unwrap_err().code(), ErrorCode::Overflow);
        assert_eq!(Object::Long(-32769).cint().unwrap_err().code(), ErrorCode::Overflow);
        assert_eq!(Object::Fixed("2.5".parse().unwrap()).cint().unwrap(), 3);
    }

    #[test]
    fn test_coerce() {
        assert_eq!(
            Object::Fixed("1.5".parse().unwrap()).coerce(Suffix::Single).unwrap(),
            Object::Single(1.5)
        );
        assert_eq!(
            Object::String("X".into()).coerce(Suffix::Integer).unwrap_err().code(),
            ErrorCode::TypeMismatch
        );
        assert_eq!(
            Object::Integer(1).coerce(Suffix::String).unwrap_err().code(),
            ErrorCode::TypeMismatch
        );
        assert_eq!(Object::Double(1e300).coerce(Suffix::Single).unwrap_err().code(), ErrorCode::Overflow);
    }

    #[test]
    fn test_to_index_truncates() {
        assert_eq!(Object::Single(2.9).to_index().unwrap(), 2);
        assert_eq!(Object::Fixed("-1.5".parse().unwrap()).to_index().unwrap(), -1);
        assert!(Object::String("1".into()).to_index().is_err());
    }
}
