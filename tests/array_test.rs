mod common;
use basic::lang::ErrorCode;
use common::*;

#[test]
fn test_array_basics() {
    let mut r = Basic::new();
    r.enter("10 DIM A$(100), X(10,10)");
    r.enter("20 A$(42)=\"THE ANSWER\"");
    r.enter("30 X(4,2)=27");
    r.enter("40 PRINT A$(42)+\"!\"; X(4,2); X(10,10)");
    r.enter("RUN");
    assert_eq!(exec(&mut r), "THE ANSWER! 27  0 \n");
}

#[test]
fn test_subscript_out_of_range() {
    let mut r = Basic::new();
    r.enter("10 DIM A(3)");
    r.enter("20 A(5) = 1");
    assert_eq!(r.error("RUN"), (ErrorCode::SubscriptOutOfRange, Some(20)));
    assert_eq!(r.error("A(-1) = 1").0, ErrorCode::SubscriptOutOfRange);
    assert_eq!(r.error("A(1,1) = 1").0, ErrorCode::SubscriptOutOfRange);
}

#[test]
fn test_implicit_dimension() {
    let mut r = Basic::new();
    r.enter("B(10) = 5: PRINT B(10)");
    assert_eq!(exec(&mut r), " 5 \n");
    assert_eq!(r.error("B(11) = 5").0, ErrorCode::SubscriptOutOfRange);
    assert_eq!(r.error("DIM B(20)").0, ErrorCode::RedimensionedArray);
}

#[test]
fn test_typed_elements() {
    let mut r = Basic::new();
    r.enter("DIM N%(2)");
    assert_eq!(r.error("N%(1) = \"X\"").0, ErrorCode::TypeMismatch);
    assert_eq!(r.error("N%(1) = 40000").0, ErrorCode::Overflow);
    r.enter("N%(1) = 2.6: PRINT N%(1)");
    assert_eq!(exec(&mut r), " 3 \n");
}

#[test]
fn test_oversized_dim() {
    let mut r = Basic::new();
    r.enter("10 DIM A(65535, 65535)");
    assert_eq!(r.error("RUN"), (ErrorCode::OutOfMemory, Some(10)));
    r.enter("DIM B(65535): B(65535) = 1: PRINT B(65535)");
    assert_eq!(exec(&mut r), " 1 \n");
}
