use pretty_assertions::assert_eq;

use crate::{SizeBound, SizeSignature, SizeType, SizeVar};

fn s(n: u32) -> SizeVar {
    SizeVar::new(n)
}

#[test]
fn contravariant_set_is_normalized() {
    let sig = SizeSignature::new(
        vec![SizeBound::Unbounded; 3],
        [s(2), s(0), s(2)],
        SizeType::function([SizeType::sized(s(0))], SizeType::sized(s(2))),
    );

    assert_eq!(sig.contravariant, vec![s(0), s(2)]);
    assert!(sig.is_contravariant(s(2)));
    assert!(!sig.is_contravariant(s(1)));
}

#[test]
fn vars_enumerate_bound_slots() {
    let sig = SizeSignature::new(
        vec![SizeBound::Unbounded, SizeBound::Below(s(0))],
        [],
        SizeType::function([SizeType::sized(s(1))], SizeType::sized(s(0))),
    );

    assert_eq!(sig.vars().collect::<Vec<_>>(), vec![s(0), s(1)]);
    assert_eq!(sig.bound_of(s(1)), Some(SizeBound::Below(s(0))));
    assert_eq!(sig.bound_of(s(2)), None);
}

#[test]
fn display_marks_bounds_and_coinductive_slots() {
    let sig = SizeSignature::new(
        vec![SizeBound::Unbounded, SizeBound::Below(s(0))],
        [s(0)],
        SizeType::function([SizeType::sized(s(1))], SizeType::sized(s(0))),
    );

    assert_eq!(sig.to_string(), "[s0 co, s1 < s0] (#s1 -> #s0)");
}
