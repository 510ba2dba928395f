use proptest::prelude::*;
use wl_hist::Histogram;

#[test]
fn interior_edge_resolves_to_upper_bin() {
    let h = Histogram::uniform(10, 0.0, 10.0).unwrap();
    for edge in 1..10 {
        assert_eq!(h.find(edge as f64).unwrap(), edge);
    }
    assert_eq!(h.find(0.0).unwrap(), 0);
    assert_eq!(h.find(9.999).unwrap(), 9);
}

#[test]
fn outside_window_is_a_domain_error() {
    let h = Histogram::uniform(10, 0.0, 10.0).unwrap();
    let err = h.find(10.0).unwrap_err();
    assert_eq!(err.info().code, "energy-above-window");
    assert!(err.info().hint.is_some());
    assert_eq!(h.find(-0.001).unwrap_err().info().code, "energy-below-window");
    assert_eq!(h.find(f64::NAN).unwrap_err().info().code, "energy-not-finite");
}

#[test]
fn explicit_edges_are_searched() {
    let mut h = Histogram::with_edges(vec![-3.0, -1.5, 0.0, 4.0]).unwrap();
    assert_eq!(h.find(-1.5).unwrap(), 1);
    assert_eq!(h.increment(3.9).unwrap(), 2);
    assert_eq!(h.accumulate(-2.0, 0.25).unwrap(), 0);
    assert_eq!(h.values(), &[0.25, 0.0, 1.0]);
}

#[test]
fn failed_lookup_leaves_payload_untouched() {
    let mut h = Histogram::uniform(2, 0.0, 2.0).unwrap();
    assert!(h.increment(5.0).is_err());
    assert_eq!(h.sum(), 0.0);
}

proptest! {
    #[test]
    fn find_succeeds_inside_window(bins in 1usize..64, min in -100.0f64..100.0, width in 0.5f64..50.0, t in 0.0f64..1.0) {
        let max = min + width;
        let h = Histogram::uniform(bins, min, max).unwrap();
        let value = min + t * width;
        prop_assume!(value < max);
        let bin = h.find(value).unwrap();
        let (lo, hi) = h.get_range(bin).unwrap();
        prop_assert!(lo <= value && value < hi);
    }

    #[test]
    fn find_fails_outside_window(bins in 1usize..64, min in -100.0f64..100.0, width in 0.5f64..50.0, offset in 0.0f64..10.0) {
        let max = min + width;
        let h = Histogram::uniform(bins, min, max).unwrap();
        prop_assert!(h.find(max + offset).is_err());
        prop_assert!(h.find(min - offset - 1e-9).is_err());
    }
}
