//! Net present value of a period-indexed cash-flow series and its rate derivative

/// NPV of `flows` discounted at the periodic `rate`.
///
/// `NPV = Σ F[t] / (1 + rate)^t`
pub fn npv(flows: &[f64], rate: f64) -> f64 {
    flows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// First derivative of [`npv`] with respect to the rate.
///
/// `dNPV/dr = Σ -t · F[t] / (1 + rate)^(t+1)`; period 0 contributes nothing.
pub fn npv_derivative(flows: &[f64], rate: f64) -> f64 {
    flows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(t, &cf)| -(t as f64) * cf / (1.0 + rate).powi(t as i32 + 1))
        .sum()
}

/// NPV and its derivative in a single pass.
///
/// Discount factors are built by repeated multiplication with `1 / (1 + rate)`
/// instead of one power per period.
pub fn npv_and_derivative(flows: &[f64], rate: f64) -> (f64, f64) {
    let factor = 1.0 / (1.0 + rate);
    let (value, slope, _) = flows.iter().enumerate().fold(
        (0.0, 0.0, 1.0),
        |(value, slope, discount), (t, &cf)| {
            let present = cf * discount;
            (value + present, slope - t as f64 * present * factor, discount * factor)
        },
    );

    (value, slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_npv_at_zero_rate_is_plain_sum() {
        let flows = [1000.0, -300.0, -300.0, -450.0];
        assert_relative_eq!(npv(&flows, 0.0), -50.0, epsilon = 1e-12);
    }

    #[test]
    fn test_npv_one_period() {
        // 1000 today against 1100 next month at 10%
        let flows = [1000.0, -1100.0];
        assert_relative_eq!(npv(&flows, 0.1), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let flows = [10000.0, -900.0, -900.0, -900.0, -900.0, -7000.0];
        let rate = 0.03;
        let h = 1e-6;
        let numeric = (npv(&flows, rate + h) - npv(&flows, rate - h)) / (2.0 * h);

        assert_relative_eq!(npv_derivative(&flows, rate), numeric, max_relative = 1e-6);
    }

    #[test]
    fn test_fused_matches_separate() {
        let flows = [48500.0, -2793.55, -2793.55, -2793.55];
        let (value, slope) = npv_and_derivative(&flows, 0.025);

        assert_relative_eq!(value, npv(&flows, 0.025), max_relative = 1e-12);
        assert_relative_eq!(slope, npv_derivative(&flows, 0.025), max_relative = 1e-12);
    }

    #[test]
    fn test_initial_flow_has_no_slope() {
        assert_eq!(npv_derivative(&[5000.0], 0.2), 0.0);
    }
}
