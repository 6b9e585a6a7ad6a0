mod common;
use basic::lang::ErrorCode;
use common::*;

#[test]
fn test_precedence() {
    let mut r = Basic::new();
    r.enter(r#"?1+2*3"#);
    assert_eq!(exec(&mut r), " 7 \n");
    r.enter(r#"?(1+2)*3"#);
    assert_eq!(exec(&mut r), " 9 \n");
    r.enter(r#"?2^10"#);
    assert_eq!(exec(&mut r), " 1024 \n");
}

#[test]
fn test_division() {
    let mut r = Basic::new();
    r.enter(r#"?10/4"#);
    assert_eq!(exec(&mut r), " 2.5 \n");
    r.enter(r#"?7\2;7 mod 2"#);
    assert_eq!(exec(&mut r), " 3  1 \n");
    assert_eq!(r.error(r#"?7 mod 0"#).0, ErrorCode::DivisionByZero);
}

#[test]
fn test_fixed_point_promotion() {
    let mut r = Basic::new();
    r.enter(r#"?3+2.5"#);
    assert_eq!(exec(&mut r), " 5.5 \n");
    r.enter(r#"?0.1+0.2"#);
    assert_eq!(exec(&mut r), " 0.3 \n");
}

#[test]
fn test_integer_arithmetic_widens() {
    let mut r = Basic::new();
    r.enter(r#"a%=32767:?a%+1"#);
    assert_eq!(exec(&mut r), " 32768 \n");
    r.enter(r#"a%=-32768:?a%-1"#);
    assert_eq!(exec(&mut r), "-32769 \n");
    r.enter(r#"?-a%"#);
    assert_eq!(exec(&mut r), " 32768 \n");
}

#[test]
fn test_integer_variables_are_strict() {
    let mut r = Basic::new();
    r.enter(r#"a%=32767:?a%"#);
    assert_eq!(exec(&mut r), " 32767 \n");
    assert_eq!(r.error(r#"a%=32767+1"#).0, ErrorCode::Overflow);
    r.enter(r#"a%=-32768:?a%"#);
    assert_eq!(exec(&mut r), "-32768 \n");
    assert_eq!(r.error(r#"a%=-32768-1"#).0, ErrorCode::Overflow);
}

#[test]
fn test_cint_is_strict() {
    let mut r = Basic::new();
    r.enter(r#"?cint(32767);cint(-32768)"#);
    assert_eq!(exec(&mut r), " 32767 -32768 \n");
    assert_eq!(r.error(r#"?cint(32768)"#).0, ErrorCode::Overflow);
    assert_eq!(r.error(r#"?cint(-32769)"#).0, ErrorCode::Overflow);
}

#[test]
fn test_relational() {
    let mut r = Basic::new();
    r.enter(r#"?1<2;1>2;2<=2;1<>1"#);
    assert_eq!(exec(&mut r), "-1  0 -1  0 \n");
    r.enter(r#"?"A"<"B";"A"="A""#);
    assert_eq!(exec(&mut r), "-1 -1 \n");
}

#[test]
fn test_strings() {
    let mut r = Basic::new();
    r.enter(r#"a$="AB":?a$+"C""#);
    assert_eq!(exec(&mut r), "ABC\n");
    assert_eq!(r.error(r#"?"A"+1"#).0, ErrorCode::TypeMismatch);
    assert_eq!(r.error(r#"?-"A""#).0, ErrorCode::TypeMismatch);
}

#[test]
fn test_logic() {
    let mut r = Basic::new();
    r.enter(r#"?5 and 3;5 or 3;5 xor 3;not 0"#);
    assert_eq!(exec(&mut r), " 1  7  6 -1 \n");
}

#[test]
fn test_unbound_variable() {
    let mut r = Basic::new();
    assert_eq!(r.error(r#"?zz"#).0, ErrorCode::IdentifierNotFound);
    r.enter(r#"zz=1:?zz"#);
    assert_eq!(exec(&mut r), " 1 \n");
}

#[test]
fn test_exponent_format() {
    let mut r = Basic::new();
    r.enter(r#"?1e20"#);
    assert_eq!(exec(&mut r), " 1E+20 \n");
}

#[test]
fn test_fixed_point_products_stay_in_range() {
    let mut r = Basic::new();
    r.enter("10 A = 1.0: B = 1.5");
    r.enter("20 FOR I = 1 TO 40: A = A * 1.0: B = B * 1.5: NEXT");
    r.enter("30 PRINT A = 1; B > 16585998 AND B < 16585999");
    r.enter("RUN");
    assert_eq!(exec(&mut r), "-1 -1 \n");
}

#[test]
fn test_fixed_point_squares_vanish() {
    let mut r = Basic::new();
    r.enter("10 A = 0.1");
    r.enter("20 FOR I = 1 TO 30: A = A * A: NEXT");
    r.enter("30 PRINT A");
    r.enter("RUN");
    assert_eq!(exec(&mut r), " 0 \n");
}

#[test]
fn test_long_division_keeps_precision() {
    let mut r = Basic::new();
    r.enter("?2147483647 / 1 = 2147483647; 16777217 / 1 = 16777217");
    assert_eq!(exec(&mut r), "-1 -1 \n");
    r.enter("?10/4");
    assert_eq!(exec(&mut r), " 2.5 \n");
}
