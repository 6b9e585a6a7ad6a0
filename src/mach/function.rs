use super::{Builtin, BuiltinFn, Decimal, Object, Operation, Session};
use crate::error;
use crate::lang::Error;
use chrono::Timelike;
use std::collections::HashMap;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// ## Builtin functions
///
/// Natives are looked up by name when an identifier isn't a variable
/// or a dimensioned array.

#[derive(Debug, Clone)]
pub struct Registry {
    builtins: HashMap<&'static str, Builtin>,
}

impl Default for Registry {
    fn default() -> Registry {
        let mut registry = Registry::new();
        registry.insert("ABS", abs);
        registry.insert("CDBL", cdbl);
        registry.insert("CHR$", chr);
        registry.insert("CINT", cint);
        registry.insert("COS", cos);
        registry.insert("CSNG", csng);
        registry.insert("FIX", fix);
        registry.insert("INT", int);
        registry.insert("LEN", len);
        registry.insert("RND", rnd);
        registry.insert("SGN", sgn);
        registry.insert("SIN", sin);
        registry.insert("SQR", sqr);
        registry.insert("STR$", string);
        registry.insert("TIMER", timer);
        registry
    }
}

impl Registry {
    /// A registry with nothing in it.
    pub fn new() -> Registry {
        Registry {
            builtins: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: &'static str, func: BuiltinFn) {
        self.builtins.insert(name, Builtin { name, func });
    }

    pub fn lookup(&self, name: &str) -> Option<Builtin> {
        self.builtins.get(name.to_ascii_uppercase().as_str()).copied()
    }
}

fn arity_error() -> Error {
    error!(SyntaxError; "WRONG NUMBER OF ARGUMENTS")
}

fn one(args: Vec<Object>) -> Result<Object> {
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(arg), None) => Ok(arg.into_value()),
        _ => Err(arity_error()),
    }
}

fn numeric(args: Vec<Object>) -> Result<Object> {
    let arg = one(args)?;
    if arg.is_numeric() {
        Ok(arg)
    } else {
        Err(error!(TypeMismatch))
    }
}

fn abs(_: &mut Session, args: Vec<Object>) -> Result<Object> {
    use Object::*;
    match numeric(args)? {
        Integer(n) if n < 0 => Operation::negate(Integer(n)),
        Long(n) if n < 0 => Operation::negate(Long(n)),
        Fixed(d) => Ok(Fixed(d.abs()?)),
        Single(n) => Ok(Single(n.abs())),
        Double(n) => Ok(Double(n.abs())),
        other => Ok(other),
    }
}

fn cint(_: &mut Session, args: Vec<Object>) -> Result<Object> {
    Ok(Object::Integer(numeric(args)?.cint()?))
}

fn csng(_: &mut Session, args: Vec<Object>) -> Result<Object> {
    Ok(Object::Single(numeric(args)?.to_f32()?))
}

fn cdbl(_: &mut Session, args: Vec<Object>) -> Result<Object> {
    Ok(Object::Double(numeric(args)?.to_f64()?))
}

fn whole(arg: Object, floor: bool) -> Result<Object> {
    use Object::*;
    match arg {
        Fixed(d) if !d.is_integer() => {
            let mut n = i64::try_from(d)?;
            if floor && d.signum() < 0 {
                n -= 1;
            }
            Ok(Fixed(Decimal::from(n)))
        }
        Single(n) => Ok(Operation::normalize(Single(if floor {
            n.floor()
        } else {
            n.trunc()
        }))),
        Double(n) => Ok(Operation::normalize(Double(if floor {
            n.floor()
        } else {
            n.trunc()
        }))),
        other => Ok(other),
    }
}

fn int(_: &mut Session, args: Vec<Object>) -> Result<Object> {
    whole(numeric(args)?, true)
}

fn fix(_: &mut Session, args: Vec<Object>) -> Result<Object> {
    whole(numeric(args)?, false)
}

fn sgn(_: &mut Session, args: Vec<Object>) -> Result<Object> {
    let arg = numeric(args)?;
    let sign = match &arg {
        Object::Fixed(d) => d.signum(),
        _ => {
            let n = arg.to_f64()?;
            if n > 0.0 {
                1
            } else if n < 0.0 {
                -1
            } else {
                0
            }
        }
    };
    Ok(Object::Integer(sign))
}

fn sqr(_: &mut Session, args: Vec<Object>) -> Result<Object> {
    let arg = numeric(args)?;
    let n = arg.to_f64()?;
    if n < 0.0 {
        return Err(error!(IllegalFunctionCall));
    }
    match arg {
        Object::Double(_) => Ok(Operation::normalize(Object::Double(n.sqrt()))),
        _ => Ok(Operation::normalize(Object::Single((n as f32).sqrt()))),
    }
}

fn sin(_: &mut Session, args: Vec<Object>) -> Result<Object> {
    match numeric(args)? {
        Object::Double(n) => Ok(Object::Double(n.sin())),
        arg => Ok(Object::Single(arg.to_f32()?.sin())),
    }
}

fn cos(_: &mut Session, args: Vec<Object>) -> Result<Object> {
    match numeric(args)? {
        Object::Double(n) => Ok(Object::Double(n.cos())),
        arg => Ok(Object::Single(arg.to_f32()?.cos())),
    }
}

fn len(_: &mut Session, args: Vec<Object>) -> Result<Object> {
    match one(args)? {
        Object::String(s) => match i32::try_from(s.chars().count()) {
            Ok(n) => Ok(Operation::normalize(Object::Long(n))),
            Err(_) => Err(error!(Overflow)),
        },
        _ => Err(error!(TypeMismatch)),
    }
}

fn chr(_: &mut Session, args: Vec<Object>) -> Result<Object> {
    match u8::try_from(numeric(args)?.cint()?) {
        Ok(n) => Ok(Object::String(char::from(n).to_string().into())),
        Err(_) => Err(error!(IllegalFunctionCall)),
    }
}

fn string(_: &mut Session, args: Vec<Object>) -> Result<Object> {
    match numeric(args)?.number_text() {
        Some(s) if s.starts_with('-') => Ok(Object::String(s.into())),
        Some(s) => Ok(Object::String(format!(" {}", s).into())),
        None => Err(error!(TypeMismatch)),
    }
}

fn rnd(session: &mut Session, args: Vec<Object>) -> Result<Object> {
    let arg = match args.len() {
        0 => None,
        1 => Some(numeric(args)?.to_f64()?),
        _ => return Err(arity_error()),
    };
    Ok(Object::Single(session.rnd(arg)))
}

fn timer(_: &mut Session, args: Vec<Object>) -> Result<Object> {
    if !args.is_empty() {
        return Err(arity_error());
    }
    let now = chrono::Local::now();
    let seconds = now.num_seconds_from_midnight() as f32 + now.nanosecond() as f32 / 1e9;
    Ok(Object::Single(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    fn call(name: &str, args: Vec<Object>) -> Result<Object> {
        let mut session = Session::default();
        let builtin = Registry::default().lookup(name).unwrap();
        (builtin.func)(&mut session, args)
    }

    #[test]
    fn test_lookup_ignores_case() {
        assert!(Registry::default().lookup("chr$").is_some());
        assert!(Registry::default().lookup("NOPE").is_none());
        assert!(Registry::new().lookup("ABS").is_none());
    }

    #[test]
    fn test_abs() {
        assert_eq!(call("ABS", vec![Object::Integer(-32768)]).unwrap(), Object::Long(32768));
        assert_eq!(call("ABS", vec![Object::Single(-1.5)]).unwrap(), Object::Single(1.5));
        assert_eq!(
            call("ABS", vec![Object::String("A".into())]).unwrap_err().code(),
            ErrorCode::TypeMismatch
        );
    }

    #[test]
    fn test_cint_is_strict() {
        assert_eq!(call("CINT", vec![Object::Single(32767.0)]).unwrap(), Object::Integer(32767));
        assert_eq!(
            call("CINT", vec![Object::Long(32768)]).unwrap_err().code(),
            ErrorCode::Overflow
        );
        assert_eq!(
            call("CINT", vec![Object::Long(-32768)]).unwrap(),
            Object::Integer(-32768)
        );
        assert_eq!(
            call("CINT", vec![Object::Long(-32769)]).unwrap_err().code(),
            ErrorCode::Overflow
        );
    }

    #[test]
    fn test_int_and_fix() {
        assert_eq!(call("INT", vec![Object::Single(-2.5)]).unwrap(), Object::Integer(-3));
        assert_eq!(call("FIX", vec![Object::Single(-2.5)]).unwrap(), Object::Integer(-2));
        let d = Object::Fixed("-2.5".parse().unwrap());
        assert_eq!(call("INT", vec![d.clone()]).unwrap(), Object::Fixed("-3".parse().unwrap()));
        assert_eq!(call("FIX", vec![d]).unwrap(), Object::Fixed("-2".parse().unwrap()));
    }

    #[test]
    fn test_strings() {
        assert_eq!(call("LEN", vec![Object::String("ABC".into())]).unwrap(), Object::Integer(3));
        assert_eq!(call("CHR$", vec![Object::Integer(65)]).unwrap(), Object::String("A".into()));
        assert_eq!(
            call("CHR$", vec![Object::Integer(256)]).unwrap_err().code(),
            ErrorCode::IllegalFunctionCall
        );
        assert_eq!(call("STR$", vec![Object::Integer(7)]).unwrap(), Object::String(" 7".into()));
        assert_eq!(call("STR$", vec![Object::Integer(-7)]).unwrap(), Object::String("-7".into()));
    }

    #[test]
    fn test_math() {
        assert_eq!(call("SQR", vec![Object::Integer(16)]).unwrap(), Object::Integer(4));
        assert_eq!(
            call("SQR", vec![Object::Integer(-1)]).unwrap_err().code(),
            ErrorCode::IllegalFunctionCall
        );
        assert_eq!(call("SGN", vec![Object::Double(-0.1)]).unwrap(), Object::Integer(-1));
        assert_eq!(call("SIN", vec![Object::Integer(0)]).unwrap(), Object::Single(0.0));
        assert_eq!(
            call("COS", vec![]).unwrap_err().code(),
            ErrorCode::SyntaxError
        );
    }

    #[test]
    fn test_rnd_repeats_last_on_zero() {
        let mut session = Session::default();
        let a = rnd(&mut session, vec![]).unwrap();
        let b = rnd(&mut session, vec![Object::Integer(0)]).unwrap();
        assert_eq!(a, b);
        match a {
            Object::Single(n) => assert!((0.0..1.0).contains(&n)),
            _ => panic!(),
        }
    }
}
