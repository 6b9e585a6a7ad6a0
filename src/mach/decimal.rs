use crate::error;
use crate::lang::Error;
use std::cmp::Ordering;
use std::convert::TryFrom;
use std::str::FromStr;

type Result<T> = std::result::Result<T, Error>;

/// Fractional digits kept by division unless a session asks for another.
pub const DEFAULT_PRECISION: u32 = 16;

/// ## Base-10 scaled integer
///
/// The number is `value * 10^exp`. Every operation returns a new
/// `Decimal`; scales are aligned before the integer arithmetic so
/// results carry no binary-float noise. `2.50` keeps its trailing zero.

#[derive(Debug, Clone, Copy)]
pub struct Decimal {
    value: i128,
    exp: i32,
}

fn pow10(n: u32) -> Result<i128> {
    match 10i128.checked_pow(n) {
        Some(p) => Ok(p),
        None => Err(error!(Overflow)),
    }
}

impl Decimal {
    pub fn new(value: i128, exp: i32) -> Decimal {
        Decimal { value, exp }
    }

    pub fn zero() -> Decimal {
        Decimal { value: 0, exp: 0 }
    }

    pub fn value(&self) -> i128 {
        self.value
    }

    pub fn exp(&self) -> i32 {
        self.exp
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    pub fn is_integer(&self) -> bool {
        if self.exp >= 0 {
            return true;
        }
        match pow10((-self.exp) as u32) {
            Ok(p) => self.value % p == 0,
            Err(_) => self.value == 0,
        }
    }

    /// Mantissa expressed at a smaller (or equal) exponent.
    fn rescale(&self, exp: i32) -> Result<i128> {
        debug_assert!(exp <= self.exp);
        let shift = (self.exp - exp) as u32;
        match self.value.checked_mul(pow10(shift)?) {
            Some(v) => Ok(v),
            None => Err(error!(Overflow)),
        }
    }

    fn align(&self, other: &Decimal) -> Result<(i128, i128, i32)> {
        let exp = self.exp.min(other.exp);
        Ok((self.rescale(exp)?, other.rescale(exp)?, exp))
    }

    pub fn add(&self, rhs: &Decimal) -> Result<Decimal> {
        let (l, r, exp) = self.align(rhs)?;
        match l.checked_add(r) {
            Some(value) => Ok(Decimal { value, exp }),
            None => Err(error!(Overflow)),
        }
    }

    pub fn sub(&self, rhs: &Decimal) -> Result<Decimal> {
        let (l, r, exp) = self.align(rhs)?;
        match l.checked_sub(r) {
            Some(value) => Ok(Decimal { value, exp }),
            None => Err(error!(Overflow)),
        }
    }

    /// Product kept to at most `precision` fractional digits. When the
    /// exact mantissa won't fit, fractional digits are dropped from the
    /// operand carrying more of them until it does.
    pub fn mul(&self, rhs: &Decimal, precision: u32) -> Result<Decimal> {
        let (mut l, mut r) = (*self, *rhs);
        loop {
            let exp = match l.exp.checked_add(r.exp) {
                Some(exp) => exp,
                None => return Err(error!(Overflow)),
            };
            if let Some(value) = l.value.checked_mul(r.value) {
                return Decimal { value, exp }.limit(precision);
            }
            let wide = if l.exp <= r.exp { &mut l } else { &mut r };
            let trimmed = wide.trim();
            if trimmed.exp < wide.exp {
                *wide = trimmed;
            } else if wide.exp < 0 {
                *wide = wide.round((-wide.exp - 1) as u32)?;
            } else {
                return Err(error!(Overflow));
            }
        }
    }

    /// Trailing fractional zeros removed.
    fn trim(&self) -> Decimal {
        let mut d = *self;
        while d.exp < 0 && d.value % 10 == 0 && d.value != 0 {
            d.value /= 10;
            d.exp += 1;
        }
        if d.value == 0 {
            d.exp = 0;
        }
        d
    }

    /// Rounds away digits past `precision`; zeros that leaves are trimmed.
    fn limit(&self, precision: u32) -> Result<Decimal> {
        if self.exp >= -(precision as i32) {
            return Ok(*self);
        }
        Ok(self.round(precision)?.trim())
    }

    /// Quotient truncated to `precision` fractional digits. Zeros the
    /// rescale introduced are stripped again, so `10/4` is `2.5`.
    pub fn div(&self, rhs: &Decimal, precision: u32) -> Result<Decimal> {
        if rhs.value == 0 {
            return Err(error!(DivisionByZero));
        }
        let shift = self.exp - rhs.exp + precision as i32;
        let (num, den) = if shift >= 0 {
            match self.value.checked_mul(pow10(shift as u32)?) {
                Some(n) => (n, rhs.value),
                None => return Err(error!(Overflow)),
            }
        } else {
            match rhs.value.checked_mul(pow10((-shift) as u32)?) {
                Some(d) => (self.value, d),
                None => return Err(error!(Overflow)),
            }
        };
        let quotient = Decimal {
            value: num / den,
            exp: -(precision as i32),
        };
        Ok(quotient.trim())
    }

    pub fn neg(&self) -> Result<Decimal> {
        match self.value.checked_neg() {
            Some(value) => Ok(Decimal {
                value,
                exp: self.exp,
            }),
            None => Err(error!(Overflow)),
        }
    }

    pub fn abs(&self) -> Result<Decimal> {
        if self.value < 0 {
            self.neg()
        } else {
            Ok(*self)
        }
    }

    pub fn signum(&self) -> i16 {
        self.value.signum() as i16
    }

    /// Rounds half away from zero to `digits` fractional digits.
    pub fn round(&self, digits: u32) -> Result<Decimal> {
        let target = -(digits as i32);
        if self.exp >= target {
            return Ok(*self);
        }
        let p = match pow10((target - self.exp) as u32) {
            Ok(p) => p,
            Err(_) => return Ok(Decimal { value: 0, exp: target }),
        };
        let mut value = self.value / p;
        let rem = self.value % p;
        if rem.unsigned_abs() * 2 >= p.unsigned_abs() {
            value += self.value.signum();
        }
        Ok(Decimal { value, exp: target })
    }

    /// Truncates toward zero. Lossy by intent.
    pub fn int_part(&self) -> Result<i128> {
        if self.exp >= 0 {
            match self.value.checked_mul(pow10(self.exp as u32)?) {
                Some(v) => Ok(v),
                None => Err(error!(Overflow)),
            }
        } else {
            match pow10((-self.exp) as u32) {
                Ok(p) => Ok(self.value / p),
                Err(_) => Ok(0),
            }
        }
    }

    /// Nearest binary double. Lossy by intent.
    pub fn to_f64(&self) -> f64 {
        match self.to_string().parse() {
            Ok(f) => f,
            Err(_) => f64::NAN,
        }
    }

    fn magnitude_digits(&self) -> (String, i64) {
        let digits = self.value.unsigned_abs().to_string();
        let adjusted = digits.len() as i64 + self.exp as i64;
        (digits, adjusted)
    }

    /// Exact comparison. Scales are aligned when the mantissas allow it,
    /// otherwise the digit strings are compared directly.
    pub fn cmp(&self, other: &Decimal) -> Ordering {
        if let Ok((l, r, _)) = self.align(other) {
            return l.cmp(&r);
        }
        let sign = self.value.signum().cmp(&other.value.signum());
        if sign != Ordering::Equal || self.value == 0 {
            return sign;
        }
        let (mut ld, la) = self.magnitude_digits();
        let (mut rd, ra) = other.magnitude_digits();
        let magnitude = match la.cmp(&ra) {
            Ordering::Equal => {
                let len = ld.len().max(rd.len());
                while ld.len() < len {
                    ld.push('0');
                }
                while rd.len() < len {
                    rd.push('0');
                }
                ld.cmp(&rd)
            }
            ord => ord,
        };
        if self.value < 0 {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Decimal) -> bool {
        Decimal::cmp(self, other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Decimal) -> Option<Ordering> {
        Some(Decimal::cmp(self, other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Decimal) -> Ordering {
        Decimal::cmp(self, other)
    }
}

impl From<i64> for Decimal {
    fn from(n: i64) -> Decimal {
        Decimal {
            value: n as i128,
            exp: 0,
        }
    }
}

impl From<i32> for Decimal {
    fn from(n: i32) -> Decimal {
        Decimal::from(n as i64)
    }
}

impl From<i16> for Decimal {
    fn from(n: i16) -> Decimal {
        Decimal::from(n as i64)
    }
}

impl TryFrom<Decimal> for i64 {
    type Error = Error;
    fn try_from(d: Decimal) -> std::result::Result<Self, Self::Error> {
        match i64::try_from(d.int_part()?) {
            Ok(n) => Ok(n),
            Err(_) => Err(error!(Overflow)),
        }
    }
}

impl FromStr for Decimal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Decimal> {
        let s = s.trim();
        let (negative, s) = match s.chars().next() {
            Some('-') => (true, &s[1..]),
            Some('+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (mantissa, exponent) = match s.find(|c| c == 'E' || c == 'e') {
            Some(i) => (&s[..i], Some(&s[i + 1..])),
            None => (s, None),
        };
        let (int_digits, frac_digits) = match mantissa.find('.') {
            Some(i) => (&mantissa[..i], &mantissa[i + 1..]),
            None => (mantissa, ""),
        };
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(error!(SyntaxError; "INVALID NUMBER"));
        }
        let mut value: i128 = 0;
        for ch in int_digits.chars().chain(frac_digits.chars()) {
            let digit = match ch.to_digit(10) {
                Some(d) => d as i128,
                None => return Err(error!(SyntaxError; "INVALID NUMBER")),
            };
            value = match value.checked_mul(10).and_then(|v| v.checked_add(digit)) {
                Some(v) => v,
                None => return Err(error!(Overflow)),
            };
        }
        let mut exp = -(frac_digits.len() as i32);
        if let Some(e) = exponent {
            match e.parse::<i32>() {
                Ok(e) => exp += e,
                Err(_) => return Err(error!(SyntaxError; "INVALID NUMBER")),
            }
        }
        if negative {
            value = -value;
        }
        Ok(Decimal { value, exp })
    }
}

impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let sign = if self.value < 0 { "-" } else { "" };
        let mut digits = self.value.unsigned_abs().to_string();
        if self.exp >= 0 {
            if self.value != 0 {
                digits.extend(std::iter::repeat('0').take(self.exp as usize));
            }
            return write!(f, "{}{}", sign, digits);
        }
        let frac = (-self.exp) as usize;
        if digits.len() <= frac {
            digits = "0".repeat(frac + 1 - digits.len()) + &digits;
        }
        let (int, fraction) = digits.split_at(digits.len() - frac);
        write!(f, "{}{}.{}", sign, int, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_round_trip() {
        for s in &["0", "2.5", "2.50", "-1.25", "0.005", "123456789.987654321", "-7"] {
            assert_eq!(d(s).to_string(), *s);
        }
        assert_eq!(d(".5").to_string(), "0.5");
        assert_eq!(d("1.5E2").to_string(), "150");
    }

    #[test]
    fn test_add_aligns_scales() {
        let sum = d("2.5").add(&Decimal::from(3i64)).unwrap();
        assert_eq!(sum.to_string(), "5.5");
        assert_eq!(d("0.1").add(&d("0.2")).unwrap().to_string(), "0.3");
        assert_eq!(d("1.00").sub(&d("0.3")).unwrap().to_string(), "0.70");
    }

    #[test]
    fn test_add_commutes() {
        let values = ["0.1", "-3.25", "1000", "0.0007", "99.9"];
        for a in values.iter() {
            for b in values.iter() {
                let ab = d(a).add(&d(b)).unwrap();
                let ba = d(b).add(&d(a)).unwrap();
                assert_eq!(ab.cmp(&ba), Ordering::Equal);
            }
        }
    }

    #[test]
    fn test_mul_sums_exponents() {
        let p = d("1.5").mul(&d("0.25"), DEFAULT_PRECISION).unwrap();
        assert_eq!((p.value(), p.exp()), (375, -3));
        assert_eq!(p.to_string(), "0.375");
    }

    #[test]
    fn test_mul_keeps_scale_bounded() {
        let mut one = d("1.0");
        let mut grow = d("1.5");
        for _ in 0..40 {
            one = one.mul(&d("1.0"), DEFAULT_PRECISION).unwrap();
            grow = grow.mul(&d("1.5"), DEFAULT_PRECISION).unwrap();
        }
        assert_eq!(one, Decimal::from(1i64));
        assert!(grow.exp() >= -(DEFAULT_PRECISION as i32));
        assert!((grow.to_f64() - 1.5f64.powi(41)).abs() < 1e-6);
    }

    #[test]
    fn test_mul_underflows_to_zero() {
        let mut n = d("0.1");
        for _ in 0..30 {
            n = n.mul(&n, DEFAULT_PRECISION).unwrap();
        }
        assert!(n.is_zero());
        assert_eq!(n.to_string(), "0");
        assert_eq!(Decimal::new(1, -40).to_string().len(), 42);
    }

    #[test]
    fn test_mul_rounds_when_mantissa_is_full() {
        let wide = Decimal::new(12_345_678_901_234_567_890_123, -22);
        let p = wide.mul(&wide, 30).unwrap();
        assert!(p.exp() >= -30);
        assert!((p.to_f64() - 1.524157875323883).abs() < 1e-12);
        assert!(Decimal::new(i128::max_value(), 0)
            .mul(&Decimal::from(2i64), DEFAULT_PRECISION)
            .is_err());
    }

    #[test]
    fn test_div() {
        assert_eq!(d("10").div(&d("4"), DEFAULT_PRECISION).unwrap().to_string(), "2.5");
        assert_eq!(d("6").div(&d("2"), DEFAULT_PRECISION).unwrap().to_string(), "3");
        assert_eq!(d("1").div(&d("3"), 4).unwrap().to_string(), "0.3333");
        assert_eq!(d("-1").div(&d("8"), 2).unwrap().to_string(), "-0.12");
        let e = d("1").div(&Decimal::zero(), DEFAULT_PRECISION).unwrap_err();
        assert_eq!(e.code(), crate::lang::ErrorCode::DivisionByZero);
    }

    #[test]
    fn test_cmp_across_scales() {
        assert_eq!(d("2.50"), d("2.5"));
        assert!(d("2.51") > d("2.5"));
        assert!(d("-3") < d("-2.99"));
        let huge = Decimal::new(1, 60);
        let tiny = Decimal::new(1, -60);
        assert_eq!(huge.cmp(&tiny), Ordering::Greater);
        assert_eq!(huge.neg().unwrap().cmp(&tiny), Ordering::Less);
    }

    #[test]
    fn test_round_and_int_part() {
        assert_eq!(d("2.5").round(0).unwrap().to_string(), "3");
        assert_eq!(d("-2.5").round(0).unwrap().to_string(), "-3");
        assert_eq!(d("2.449").round(1).unwrap().to_string(), "2.4");
        assert_eq!(d("-7.9").int_part().unwrap(), -7);
        assert_eq!(d("1.5E2").int_part().unwrap(), 150);
        assert!((d("0.1").to_f64() - 0.1).abs() < std::f64::EPSILON);
    }
}
