use sssp_harness::sweep::{speedup, speedup::UNDEFINED_SPEEDUP, SpeedupError};

#[test]
fn test_speedup() {
    assert_eq!(speedup(&[2.0, 3.0], &[1.0, 1.5]), Ok(vec![2.0, 2.0]));
    assert_eq!(speedup(&[1.0, 4.0], &[2.0, 1.0]), Ok(vec![0.5, 4.0]));
    assert_eq!(
        speedup(&[1.0, 1.0], &[0.0, f64::NAN]),
        Ok(vec![UNDEFINED_SPEEDUP, UNDEFINED_SPEEDUP])
    );
    assert_eq!(
        speedup(&[1.0, 2.0], &[1.0]),
        Err(SpeedupError::LengthMismatch {
            baseline: 2,
            variant: 1
        })
    );
    assert_eq!(speedup(&[], &[]), Ok(vec![]));
}
