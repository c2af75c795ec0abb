use approx::assert_relative_eq;
use gda::encoding::{decode_uint256, encode_price, to_uint256};
use gda::models::{
    ContinuousPurchase, DiscretePurchase, ExponentialContinuousGda, ExponentialDiscreteGda, LinearEquivalentGda,
    Price,
};
use gda::verifier::verify_discrete;
use gda::GdaError;
use proptest::prelude::*;

/// Checks a computed price against its natural-log reference: in range it must agree,
/// past `ln(f64::MAX)` it must be an overflow. The band around either edge is skipped.
fn check_against_log_reference(result: Result<Price, GdaError>, log_ref: f64) -> Result<(), TestCaseError> {
    let ln_max = f64::MAX.ln();
    let ln_min = f64::MIN_POSITIVE.ln();
    if log_ref > ln_max + 1e-6 {
        prop_assert!(matches!(result, Err(GdaError::Overflow(_))), "ln ref {} → {:?}", log_ref, result);
    } else if log_ref < ln_max - 1e-6 {
        let p = result.map_err(|e| TestCaseError::fail(format!("ln ref {log_ref} → {e}")))?.value();
        prop_assert!(p.is_finite());
        if log_ref > ln_min + 1.0 {
            prop_assert!((p.ln() - log_ref).abs() < 1e-9, "ln p {} vs ln ref {}", p.ln(), log_ref);
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn discrete_extreme_magnitudes_match_log_reference(
        p0_exp in -300.0f64..300.0,
        k in 1e-6f64..1.0,
        s in 1.001f64..4.0,
        n in 0.0f64..2000.0,
        t in 0.0f64..1000.0,
        q in 1.0f64..100.0,
    ) {
        let p0 = 10f64.powf(p0_exp);
        let m = ExponentialDiscreteGda { initial_price: p0, decay_constant: k, scale_factor: s };
        let r = m.cumulative_price(&DiscretePurchase { num_total_purchases: n, time_since_start: t, quantity: q });
        let log_ref = p0.ln() + n * s.ln() + (s.powf(q) - 1.0).ln() - (s - 1.0).ln() - k * t;
        check_against_log_reference(r, log_ref)?;
    }

    #[test]
    fn continuous_extreme_magnitudes_match_log_reference(
        p0_exp in -300.0f64..300.0,
        k in 1e-3f64..10.0,
        r in 0.1f64..10.0,
        q in 0.1f64..1000.0,
        age in 0.0f64..500.0,
    ) {
        let p0 = 10f64.powf(p0_exp);
        let m = ExponentialContinuousGda { initial_price: p0, decay_constant: k, emission_rate: r };
        let res = m.cumulative_price(&ContinuousPurchase { age_last_auction: age, quantity: q });
        let x = k * q / r;
        let ln_expm1 = if x > 1.0 { x + (-(-x).exp()).ln_1p() } else { x.exp_m1().ln() };
        let log_ref = p0.ln() - k.ln() + ln_expm1 - k * age;
        check_against_log_reference(res, log_ref)?;
    }

    #[test]
    fn linear_extreme_magnitudes_match_log_reference(
        scale_exp in -300.0f64..300.0,
        age_exp in -300.0f64..300.0,
        frac in 1e-6f64..0.999,
    ) {
        let scale = 10f64.powf(scale_exp);
        let age = 10f64.powf(age_exp);
        let q = age * frac;
        let m = LinearEquivalentGda { price_scale: scale };
        let res = m.cumulative_price(&ContinuousPurchase { age_last_auction: age, quantity: q });
        let log_ref = scale.ln() - age.ln() + q.ln() - (age - q).ln();
        check_against_log_reference(res, log_ref)?;
    }

    #[test]
    fn discrete_is_increasing_in_quantity(
        p0 in 1e-3f64..1e3,
        k in 1e-4f64..0.5,
        s in 1.0001f64..2.0,
        n in 0.0f64..200.0,
        t in 0.0f64..500.0,
        q1 in 0.0f64..100.0,
        dq in 0.01f64..50.0,
    ) {
        let m = ExponentialDiscreteGda { initial_price: p0, decay_constant: k, scale_factor: s };
        let a = m.cumulative_price(&DiscretePurchase { num_total_purchases: n, time_since_start: t, quantity: q1 });
        let b = m.cumulative_price(&DiscretePurchase { num_total_purchases: n, time_since_start: t, quantity: q1 + dq });
        prop_assume!(a.is_ok() && b.is_ok());
        let (a, b) = (a.unwrap().value(), b.unwrap().value());
        prop_assume!(b > f64::MIN_POSITIVE);
        prop_assert!(b > a, "q={} → {}, q={} → {}", q1, a, q1 + dq, b);
    }

    #[test]
    fn continuous_is_increasing_in_quantity(
        p0 in 1e-3f64..1e3,
        k in 1e-6f64..0.5,
        r in 0.1f64..100.0,
        age in 0.0f64..200.0,
        q1 in 0.0f64..100.0,
        dq in 0.01f64..50.0,
    ) {
        let m = ExponentialContinuousGda { initial_price: p0, decay_constant: k, emission_rate: r };
        let a = m.cumulative_price(&ContinuousPurchase { age_last_auction: age, quantity: q1 }).unwrap().value();
        let b = m.cumulative_price(&ContinuousPurchase { age_last_auction: age, quantity: q1 + dq }).unwrap().value();
        prop_assume!(b > f64::MIN_POSITIVE);
        prop_assert!(b > a);
    }

    #[test]
    fn linear_is_increasing_in_quantity(
        scale in 1e-3f64..1e6,
        age in 1.0f64..1e4,
        f1 in 0.0f64..0.9,
        df in 0.001f64..0.09,
    ) {
        let m = LinearEquivalentGda { price_scale: scale };
        let a = m.cumulative_price(&ContinuousPurchase { age_last_auction: age, quantity: age * f1 }).unwrap().value();
        let b = m.cumulative_price(&ContinuousPurchase { age_last_auction: age, quantity: age * (f1 + df) }).unwrap().value();
        prop_assert!(b > a);
    }

    #[test]
    fn linear_never_prices_age_at_or_below_quantity(
        scale in 1e-3f64..1e6,
        q in 0.0f64..1e4,
        below in 0.0f64..1.0,
    ) {
        let m = LinearEquivalentGda { price_scale: scale };
        let r = m.cumulative_price(&ContinuousPurchase { age_last_auction: q * below, quantity: q });
        prop_assert!(matches!(r, Err(GdaError::Domain(_))), "{:?}", r);
    }

    #[test]
    fn discrete_converges_to_linear_limit_as_scale_factor_nears_one(
        p0 in 1e-3f64..1e3,
        k in 1e-4f64..0.1,
        n in 0.0f64..100.0,
        t in 0.0f64..100.0,
        q in 1.0f64..100.0,
        eps_exp in -14.0f64..-9.0,
    ) {
        let s = 1.0 + 10f64.powf(eps_exp);
        prop_assume!(s > 1.0);
        let m = ExponentialDiscreteGda { initial_price: p0, decay_constant: k, scale_factor: s };
        let p = m.cumulative_price(&DiscretePurchase { num_total_purchases: n, time_since_start: t, quantity: q }).unwrap().value();
        let limit = p0 * s.powf(n) * q / (k * t).exp();
        assert_relative_eq!(p, limit, max_relative = 1e-6);
    }

    #[test]
    fn continuous_converges_to_linear_limit_as_decay_nears_zero(
        p0 in 1e-3f64..1e3,
        r in 0.1f64..100.0,
        age in 0.0f64..100.0,
        q in 0.1f64..100.0,
        k_exp in -16.0f64..-10.0,
    ) {
        let k = 10f64.powf(k_exp);
        let m = ExponentialContinuousGda { initial_price: p0, decay_constant: k, emission_rate: r };
        let p = m.cumulative_price(&ContinuousPurchase { age_last_auction: age, quantity: q }).unwrap().value();
        assert_relative_eq!(p, p0 * q / r, max_relative = 1e-6);
    }

    #[test]
    fn discrete_closed_form_matches_unit_sum(
        p0 in 1e-3f64..1e3,
        k in 1e-4f64..0.1,
        s in 1.001f64..1.2,
        n in 0u32..100,
        t in 0.0f64..100.0,
        q in 1u32..300,
    ) {
        let m = ExponentialDiscreteGda { initial_price: p0, decay_constant: k, scale_factor: s };
        let req = DiscretePurchase { num_total_purchases: n as f64, time_since_start: t, quantity: q as f64 };
        let rep = verify_discrete(&m, &req).unwrap();
        assert_relative_eq!(rep.numeric, rep.closed, max_relative = 1e-9);
        prop_assert!(rep.monotone_ok);
    }

    #[test]
    fn encoded_word_decodes_to_truncated_price(v in 0.0f64..1e60) {
        let price = Price::new(v).unwrap();
        let word = encode_price(price).unwrap();
        prop_assert_eq!(word.len(), 66);
        prop_assert!(word.starts_with("0x"));
        prop_assert!(word[2..].chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        prop_assert_eq!(decode_uint256(&word).unwrap(), to_uint256(price).unwrap());
    }

    #[test]
    fn integral_prices_round_trip_exactly(v in 0u64..u64::MAX) {
        // stay within f64's exact integer range
        let v = v >> 11;
        let word = encode_price(Price::new(v as f64).unwrap()).unwrap();
        prop_assert_eq!(decode_uint256(&word).unwrap(), alloy_primitives::U256::from(v));
    }
}

#[test]
fn zero_quantity_is_free_for_every_variant() {
    let d = ExponentialDiscreteGda { initial_price: 5.0, decay_constant: 0.3, scale_factor: 1.5 };
    let c = ExponentialContinuousGda { initial_price: 5.0, decay_constant: 0.3, emission_rate: 1.5 };
    let l = LinearEquivalentGda { price_scale: 5.0 };
    let dreq = DiscretePurchase { num_total_purchases: 10.0, time_since_start: 10.0, quantity: 0.0 };
    let creq = ContinuousPurchase { age_last_auction: 10.0, quantity: 0.0 };
    assert_eq!(d.cumulative_price(&dreq).unwrap().value(), 0.0);
    assert_eq!(c.cumulative_price(&creq).unwrap().value(), 0.0);
    assert_eq!(l.cumulative_price(&creq).unwrap().value(), 0.0);
}

#[test]
fn documented_scenarios() {
    let d = ExponentialDiscreteGda { initial_price: 1.0, decay_constant: 0.02, scale_factor: 1.1 };
    let p = d
        .cumulative_price(&DiscretePurchase { num_total_purchases: 5.0, time_since_start: 100.0, quantity: 3.0 })
        .unwrap()
        .value();
    let reference = 1.1f64.powf(5.0) * (1.1f64.powf(3.0) - 1.0) / ((0.02f64 * 100.0).exp() * (1.1 - 1.0));
    assert_relative_eq!(p, reference, max_relative = 1e-9);

    let c = ExponentialContinuousGda { initial_price: 1.0, decay_constant: 0.01, emission_rate: 2.0 };
    let p = c.cumulative_price(&ContinuousPurchase { age_last_auction: 50.0, quantity: 10.0 }).unwrap().value();
    let reference = (1.0 / 0.01) * ((0.01f64 * 10.0 / 2.0).exp() - 1.0) / (0.01f64 * 50.0).exp();
    assert_relative_eq!(p, reference, max_relative = 1e-9);

    let l = LinearEquivalentGda { price_scale: 100.0 };
    let p = l.cumulative_price(&ContinuousPurchase { age_last_auction: 10.0, quantity: 5.0 }).unwrap().value();
    assert_relative_eq!(p, 10.0, max_relative = 1e-12);
}
