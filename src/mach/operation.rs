use super::{Decimal, Object};
use crate::error;
use crate::lang::Error;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// ## Numeric tower
///
/// Binary operators first promote both operands to a common kind using
/// the `PROMOTE` table, compute in that kind, then normalize the result
/// to the narrowest kind that holds it exactly. Integer arithmetic
/// widens silently to Long and then Double; only explicit conversions
/// and saves into `%` names enforce the 16-bit range.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Integer,
    Long,
    Fixed,
    Single,
    Double,
}

impl Kind {
    pub fn of(obj: &Object) -> Option<Kind> {
        match obj {
            Object::Integer(_) => Some(Kind::Integer),
            Object::Long(_) => Some(Kind::Long),
            Object::Fixed(_) => Some(Kind::Fixed),
            Object::Single(_) => Some(Kind::Single),
            Object::Double(_) => Some(Kind::Double),
            Object::Typed(inner, _) => Kind::of(inner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
    DivideInt,
    Modulus,
    Power,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Op {
    fn is_relational(self) -> bool {
        use Op::*;
        matches!(
            self,
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    And,
    Or,
    Xor,
    Imp,
    Eqv,
}

/// Operands after promotion. Integer kinds compute in i64.
#[derive(Debug)]
enum Pair {
    Long(i64, i64),
    Fixed(Decimal, Decimal),
    Single(f32, f32),
    Double(f64, f64),
}

type Promote = fn(&Object, &Object) -> Result<Pair>;

#[rustfmt::skip]
static PROMOTE: [[Promote; 5]; 5] = [
    // Integer   Long        Fixed       Single      Double
    [to_long,    to_long,    to_fixed,   to_single,  to_double], // Integer
    [to_long,    to_long,    to_fixed,   to_single,  to_double], // Long
    [to_fixed,   to_fixed,   to_fixed,   to_single,  to_double], // Fixed
    [to_single,  to_single,  to_single,  to_single,  to_double], // Single
    [to_double,  to_double,  to_double,  to_double,  to_double], // Double
];

fn long(obj: &Object) -> Result<i64> {
    match obj {
        Object::Integer(n) => Ok(*n as i64),
        Object::Long(n) => Ok(*n as i64),
        _ => Err(error!(InternalError; "NOT AN INTEGER KIND")),
    }
}

fn fixed(obj: &Object) -> Result<Decimal> {
    match obj {
        Object::Integer(n) => Ok(Decimal::from(*n)),
        Object::Long(n) => Ok(Decimal::from(*n)),
        Object::Fixed(d) => Ok(*d),
        _ => Err(error!(InternalError; "NOT A FIXED KIND")),
    }
}

fn to_long(lhs: &Object, rhs: &Object) -> Result<Pair> {
    Ok(Pair::Long(long(lhs)?, long(rhs)?))
}

fn to_fixed(lhs: &Object, rhs: &Object) -> Result<Pair> {
    Ok(Pair::Fixed(fixed(lhs)?, fixed(rhs)?))
}

fn to_single(lhs: &Object, rhs: &Object) -> Result<Pair> {
    Ok(Pair::Single(lhs.to_f32()?, rhs.to_f32()?))
}

fn to_double(lhs: &Object, rhs: &Object) -> Result<Pair> {
    Ok(Pair::Double(lhs.to_f64()?, rhs.to_f64()?))
}

fn truth(b: bool) -> Object {
    Object::Integer(if b { -1 } else { 0 })
}

fn long_result(n: i64) -> Object {
    match i32::try_from(n) {
        Ok(n) => Object::Long(n),
        Err(_) => Object::Double(n as f64),
    }
}

fn single_result(n: f32) -> Result<Object> {
    if n.is_finite() {
        Ok(Object::Single(n))
    } else {
        Err(error!(Overflow))
    }
}

fn double_result(n: f64) -> Result<Object> {
    if n.is_finite() {
        Ok(Object::Double(n))
    } else {
        Err(error!(Overflow))
    }
}

fn rounded(n: f64) -> Result<i64> {
    Object::Double(n).round_i64()
}

impl Pair {
    fn apply(self, op: Op, precision: u32) -> Result<Object> {
        match self {
            Pair::Long(l, r) => long_op(op, l, r),
            Pair::Fixed(l, r) => fixed_op(op, l, r, precision),
            Pair::Single(l, r) => match op {
                Op::Add => single_result(l + r),
                Op::Subtract => single_result(l - r),
                Op::Multiply => single_result(l * r),
                Op::Divide if r == 0.0 => Err(error!(DivisionByZero)),
                Op::Divide => single_result(l / r),
                Op::DivideInt | Op::Modulus => {
                    long_op(op, rounded(l as f64)?, rounded(r as f64)?)
                }
                Op::Power => single_result(l.powf(r)),
                _ => Ok(compare(op, l.partial_cmp(&r))),
            },
            Pair::Double(l, r) => match op {
                Op::Add => double_result(l + r),
                Op::Subtract => double_result(l - r),
                Op::Multiply => double_result(l * r),
                Op::Divide if r == 0.0 => Err(error!(DivisionByZero)),
                Op::Divide => double_result(l / r),
                Op::DivideInt | Op::Modulus => long_op(op, rounded(l)?, rounded(r)?),
                Op::Power => double_result(l.powf(r)),
                _ => Ok(compare(op, l.partial_cmp(&r))),
            },
        }
    }
}

fn long_op(op: Op, l: i64, r: i64) -> Result<Object> {
    match op {
        Op::Add => Ok(checked(l.checked_add(r), l as f64 + r as f64)),
        Op::Subtract => Ok(checked(l.checked_sub(r), l as f64 - r as f64)),
        Op::Multiply => Ok(checked(l.checked_mul(r), l as f64 * r as f64)),
        Op::Divide if r == 0 => Err(error!(DivisionByZero)),
        Op::Divide if exact_in_single(l) && exact_in_single(r) => {
            single_result(l as f32 / r as f32)
        }
        Op::Divide => double_result(l as f64 / r as f64),
        Op::DivideInt if r == 0 => Err(error!(DivisionByZero)),
        Op::DivideInt => Ok(checked(l.checked_div(r), l as f64 / r as f64)),
        Op::Modulus if r == 0 => Err(error!(DivisionByZero)),
        Op::Modulus => Ok(checked(l.checked_rem(r), 0.0)),
        Op::Power => {
            let exact = u32::try_from(r).ok().and_then(|r| l.checked_pow(r));
            match exact {
                Some(n) => Ok(long_result(n)),
                None => double_result((l as f64).powf(r as f64)),
            }
        }
        _ => Ok(compare(op, l.partial_cmp(&r))),
    }
}

/// Integers an f32 holds without rounding.
fn exact_in_single(n: i64) -> bool {
    n.unsigned_abs() <= 1 << 24
}

fn checked(exact: Option<i64>, wide: f64) -> Object {
    match exact {
        Some(n) => long_result(n),
        None => Object::Double(wide),
    }
}

fn fixed_op(op: Op, l: Decimal, r: Decimal, precision: u32) -> Result<Object> {
    match op {
        Op::Add => Ok(Object::Fixed(l.add(&r)?)),
        Op::Subtract => Ok(Object::Fixed(l.sub(&r)?)),
        Op::Multiply => Ok(Object::Fixed(l.mul(&r, precision)?)),
        Op::Divide => Ok(Object::Fixed(l.div(&r, precision)?)),
        Op::DivideInt | Op::Modulus => {
            let l = i64::try_from(l.round(0)?)?;
            let r = i64::try_from(r.round(0)?)?;
            long_op(op, l, r)
        }
        Op::Power if r.is_integer() && r.signum() >= 0 && r <= Decimal::from(64i64) => {
            let mut n = Decimal::from(1i64);
            for _ in 0..i64::try_from(r)? {
                n = n.mul(&l, precision)?;
            }
            Ok(Object::Fixed(n))
        }
        Op::Power => double_result(l.to_f64().powf(r.to_f64())),
        _ => Ok(compare(op, Some(l.cmp(&r)))),
    }
}

fn compare(op: Op, ord: Option<std::cmp::Ordering>) -> Object {
    use std::cmp::Ordering::*;
    truth(match (op, ord) {
        (Op::Equal, Some(Equal)) => true,
        (Op::NotEqual, Some(Equal)) => false,
        (Op::NotEqual, _) => true,
        (Op::Less, Some(Less)) => true,
        (Op::LessEqual, Some(Less)) | (Op::LessEqual, Some(Equal)) => true,
        (Op::Greater, Some(Greater)) => true,
        (Op::GreaterEqual, Some(Greater)) | (Op::GreaterEqual, Some(Equal)) => true,
        _ => false,
    })
}

fn integral(n: f64) -> Option<Object> {
    if !n.is_finite() || n.fract() != 0.0 {
        return None;
    }
    if n >= i16::MIN as f64 && n <= i16::MAX as f64 {
        Some(Object::Integer(n as i16))
    } else if n >= i32::MIN as f64 && n <= i32::MAX as f64 {
        Some(Object::Long(n as i32))
    } else {
        None
    }
}

pub struct Operation {}

impl Operation {
    /// Narrows to the first kind in Integer, Long, Single, Double that
    /// represents the value exactly. Fixed values are left alone.
    pub fn normalize(obj: Object) -> Object {
        match obj {
            Object::Long(n) => match i16::try_from(n) {
                Ok(n) => Object::Integer(n),
                Err(_) => Object::Long(n),
            },
            Object::Single(n) => integral(n as f64).unwrap_or(Object::Single(n)),
            Object::Double(n) => match integral(n) {
                Some(obj) => obj,
                None if n.is_finite() && (n as f32) as f64 == n => Object::Single(n as f32),
                None => Object::Double(n),
            },
            other => other,
        }
    }

    pub fn binary(op: Op, lhs: Object, rhs: Object, precision: u32) -> Result<Object> {
        let lhs = lhs.into_value();
        let rhs = rhs.into_value();
        if let (Object::String(l), Object::String(r)) = (&lhs, &rhs) {
            return match op {
                Op::Add => Ok(Object::String(format!("{}{}", l, r).into())),
                _ if op.is_relational() => Ok(compare(op, Some(l.as_bytes().cmp(r.as_bytes())))),
                _ => Err(error!(TypeMismatch)),
            };
        }
        let (lk, rk) = match (Kind::of(&lhs), Kind::of(&rhs)) {
            (Some(lk), Some(rk)) => (lk, rk),
            _ => return Err(error!(TypeMismatch)),
        };
        let pair = PROMOTE[lk as usize][rk as usize](&lhs, &rhs)?;
        let result = pair.apply(op, precision)?;
        match op {
            Op::Divide => Ok(result),
            _ => Ok(Operation::normalize(result)),
        }
    }

    pub fn negate(val: Object) -> Result<Object> {
        match val.into_value() {
            Object::Integer(n) => Ok(Operation::normalize(Object::Long(-(n as i32)))),
            Object::Long(n) => Ok(Operation::normalize(long_result(-(n as i64)))),
            Object::Fixed(d) => Ok(Object::Fixed(d.neg()?)),
            Object::Single(n) => Ok(Object::Single(-n)),
            Object::Double(n) => Ok(Object::Double(-n)),
            _ => Err(error!(TypeMismatch)),
        }
    }

    pub fn not(val: Object) -> Result<Object> {
        if !val.is_numeric() {
            return Err(error!(TypeMismatch));
        }
        let n = val.round_i64()?;
        if let Ok(n) = i16::try_from(n) {
            Ok(Object::Integer(!n))
        } else if let Ok(n) = i32::try_from(n) {
            Ok(Object::Long(!n))
        } else {
            Err(error!(Overflow))
        }
    }

    pub fn logical(op: Logic, lhs: Object, rhs: Object) -> Result<Object> {
        if !lhs.is_numeric() || !rhs.is_numeric() {
            return Err(error!(TypeMismatch));
        }
        let (l, r) = (lhs.round_i64()?, rhs.round_i64()?);
        let apply = |l: i64, r: i64| match op {
            Logic::And => l & r,
            Logic::Or => l | r,
            Logic::Xor => l ^ r,
            Logic::Imp => !l | r,
            Logic::Eqv => !(l ^ r),
        };
        if let (Ok(l), Ok(r)) = (i16::try_from(l), i16::try_from(r)) {
            Ok(Object::Integer(apply(l as i64, r as i64) as i16))
        } else if let (Ok(l), Ok(r)) = (i32::try_from(l), i32::try_from(r)) {
            Ok(Operation::normalize(Object::Long(apply(l as i64, r as i64) as i32)))
        } else {
            Err(error!(Overflow))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;
    use crate::mach::DEFAULT_PRECISION;

    fn fixed(s: &str) -> Object {
        Object::Fixed(s.parse().unwrap())
    }

    fn op(op: Op, l: Object, r: Object) -> Result<Object> {
        Operation::binary(op, l, r, DEFAULT_PRECISION)
    }

    #[test]
    fn test_integer_plus_fixed_is_fixed() {
        assert_eq!(
            op(Op::Add, Object::Integer(3), fixed("2.5")).unwrap(),
            fixed("5.5")
        );
    }

    #[test]
    fn test_fixed_plus_single_is_single() {
        assert_eq!(
            op(Op::Add, fixed("2.5"), Object::Single(1.0)).unwrap(),
            Object::Single(3.5)
        );
    }

    #[test]
    fn test_anything_with_double_is_double() {
        assert_eq!(
            op(Op::Multiply, fixed("0.1"), Object::Double(0.1)).unwrap(),
            Object::Double(0.1 * 0.1)
        );
    }

    #[test]
    fn test_integer_overflow_widens() {
        assert_eq!(
            op(Op::Add, Object::Integer(32767), Object::Integer(1)).unwrap(),
            Object::Long(32768)
        );
        assert_eq!(
            op(Op::Subtract, Object::Integer(-32768), Object::Integer(1)).unwrap(),
            Object::Long(-32769)
        );
        assert_eq!(
            op(Op::Multiply, Object::Long(i32::MAX), Object::Integer(2)).unwrap(),
            Object::Double(i32::MAX as f64 * 2.0)
        );
        assert_eq!(
            op(Op::Subtract, Object::Long(32768), Object::Integer(1)).unwrap(),
            Object::Integer(32767)
        );
    }

    #[test]
    fn test_divide_never_narrows_to_integer() {
        assert_eq!(
            op(Op::Divide, Object::Integer(6), Object::Integer(3)).unwrap(),
            Object::Single(2.0)
        );
        assert_eq!(
            op(Op::Divide, Object::Integer(1), Object::Integer(4)).unwrap(),
            Object::Single(0.25)
        );
        assert_eq!(
            op(Op::Divide, fixed("1"), fixed("8")).unwrap(),
            fixed("0.125")
        );
    }

    #[test]
    fn test_divide_wide_longs_in_double() {
        assert_eq!(
            op(Op::Divide, Object::Long(i32::MAX), Object::Integer(1)).unwrap(),
            Object::Double(i32::MAX as f64)
        );
        assert_eq!(
            op(Op::Divide, Object::Long(16_777_216), Object::Integer(2)).unwrap(),
            Object::Single(8_388_608.0)
        );
    }

    #[test]
    fn test_division_by_zero() {
        for (l, r) in vec![
            (Object::Integer(1), Object::Integer(0)),
            (Object::Single(1.0), Object::Single(0.0)),
            (fixed("1.5"), fixed("0.0")),
        ] {
            assert_eq!(
                op(Op::Divide, l.clone(), r.clone()).unwrap_err().code(),
                ErrorCode::DivisionByZero
            );
            assert_eq!(
                op(Op::Modulus, l, r).unwrap_err().code(),
                ErrorCode::DivisionByZero
            );
        }
    }

    #[test]
    fn test_int_divide_and_modulus_round_operands() {
        assert_eq!(
            op(Op::DivideInt, Object::Single(7.6), Object::Integer(2)).unwrap(),
            Object::Integer(4)
        );
        assert_eq!(
            op(Op::Modulus, Object::Integer(-7), Object::Integer(3)).unwrap(),
            Object::Integer(-1)
        );
        assert_eq!(
            op(Op::Modulus, fixed("10.4"), Object::Integer(3)).unwrap(),
            Object::Integer(1)
        );
    }

    #[test]
    fn test_power() {
        assert_eq!(
            op(Op::Power, Object::Integer(2), Object::Integer(10)).unwrap(),
            Object::Integer(1024)
        );
        assert_eq!(
            op(Op::Power, Object::Integer(2), Object::Integer(-1)).unwrap(),
            Object::Single(0.5)
        );
        assert_eq!(op(Op::Power, fixed("1.5"), Object::Integer(2)).unwrap(), fixed("2.25"));
    }

    #[test]
    fn test_relational() {
        assert_eq!(
            op(Op::Less, Object::Integer(1), fixed("1.5")).unwrap(),
            Object::Integer(-1)
        );
        assert_eq!(
            op(Op::Equal, Object::Single(0.5), Object::Double(0.5)).unwrap(),
            Object::Integer(-1)
        );
        assert_eq!(
            op(Op::GreaterEqual, Object::String("A".into()), Object::String("B".into())).unwrap(),
            Object::Integer(0)
        );
        assert_eq!(
            op(Op::NotEqual, Object::Double(f64::NAN), Object::Double(f64::NAN)).unwrap(),
            Object::Integer(-1)
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            op(Op::Add, Object::String("AB".into()), Object::String("C".into())).unwrap(),
            Object::String("ABC".into())
        );
        assert_eq!(
            op(Op::Add, Object::String("A".into()), Object::Integer(1)).unwrap_err().code(),
            ErrorCode::TypeMismatch
        );
        assert_eq!(
            op(Op::Subtract, Object::String("A".into()), Object::String("A".into()))
                .unwrap_err()
                .code(),
            ErrorCode::TypeMismatch
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for obj in vec![
            Object::Long(7),
            Object::Long(70000),
            Object::Single(2.0),
            Object::Single(2.5),
            Object::Double(0.5),
            Object::Double(0.1),
            Object::Double(1e12),
            fixed("2.00"),
        ] {
            let once = Operation::normalize(obj);
            let twice = Operation::normalize(once.clone());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(Operation::normalize(Object::Long(7)), Object::Integer(7));
        assert_eq!(Operation::normalize(Object::Double(70000.0)), Object::Long(70000));
        assert_eq!(Operation::normalize(Object::Double(0.5)), Object::Single(0.5));
        assert_eq!(Operation::normalize(Object::Double(0.1)), Object::Double(0.1));
        assert_eq!(Operation::normalize(fixed("2.00")), fixed("2.00"));
    }

    #[test]
    fn test_negate() {
        assert_eq!(Operation::negate(Object::Integer(-32768)).unwrap(), Object::Long(32768));
        assert_eq!(Operation::negate(fixed("2.5")).unwrap(), fixed("-2.5"));
        assert!(Operation::negate(Object::String("A".into())).is_err());
    }

    #[test]
    fn test_logical() {
        assert_eq!(
            Operation::logical(Logic::And, Object::Integer(-1), Object::Integer(0)).unwrap(),
            Object::Integer(0)
        );
        assert_eq!(
            Operation::logical(Logic::Or, Object::Integer(12), Object::Integer(3)).unwrap(),
            Object::Integer(15)
        );
        assert_eq!(
            Operation::logical(Logic::Imp, Object::Integer(0), Object::Integer(0)).unwrap(),
            Object::Integer(-1)
        );
        assert_eq!(Operation::not(Object::Integer(0)).unwrap(), Object::Integer(-1));
        assert_eq!(Operation::not(Object::Long(70000)).unwrap(), Object::Long(-70001));
    }
}
