//! Decomposability boundary of airline models.
//!
//! For a fixed regular MA coefficient `θ`, an airline model
//! `(1−B)(1−Bˢ)yₜ = (1 + θB)(1 + ΘBˢ)aₜ` admits a canonical decomposition
//! only when `Θ` stays below a bound. The bounds were computed on a grid of
//! `θ` from −0.9 to 0.9 in steps of 0.05.

const THETA_MIN: f64 = -0.9;
const THETA_STEP: f64 = 0.05;

const MONTHLY: [f64; 37] = [
    0.1129, 0.1275, 0.1513, 0.1885, 0.2444, 0.2922, 0.3274, 0.3103, 0.2793, 0.2550, 0.2355,
    0.2194, 0.2060, 0.1946, 0.1848, 0.1763, 0.1688, 0.1622, 0.1564, 0.1511, 0.1464, 0.1422,
    0.1383, 0.1348, 0.1316, 0.1287, 0.1260, 0.1235, 0.1212, 0.1191, 0.1172, 0.1155, 0.1139,
    0.1124, 0.1112, 0.1101, 0.1091,
];

const QUARTERLY: [f64; 37] = [
    0.1181, 0.1197, 0.1222, 0.1257, 0.1304, 0.1365, 0.1446, 0.1549, 0.1682, 0.1855, 0.2080,
    0.2381, 0.2737, 0.3053, 0.3331, 0.3575, 0.3682, 0.3428, 0.3208, 0.3018, 0.2852, 0.2706,
    0.2578, 0.2464, 0.2362, 0.2272, 0.2191, 0.2119, 0.2055, 0.1997, 0.1946, 0.1900, 0.1860,
    0.1824, 0.1793, 0.1767, 0.1744,
];

/// Largest decomposable seasonal MA coefficient for an airline model of the
/// given period, by linear interpolation. `θ` is clamped to `[−0.9, 0.9]`.
///
/// Returns `None` for periods other than 4 and 12.
pub fn seasonal_ma_boundary(period: usize, theta: f64) -> Option<f64> {
    let table = match period {
        4 => &QUARTERLY,
        12 => &MONTHLY,
        _ => return None,
    };
    let x = (theta.clamp(THETA_MIN, -THETA_MIN) - THETA_MIN) / THETA_STEP;
    let i = (x.floor() as usize).min(table.len() - 2);
    let frac = x - i as f64;
    Some(table[i] * (1.0 - frac) + table[i + 1] * frac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn grid_points_are_exact() {
        assert_abs_diff_eq!(seasonal_ma_boundary(12, -0.9).unwrap(), 0.1129);
        assert_abs_diff_eq!(seasonal_ma_boundary(12, 0.9).unwrap(), 0.1091, epsilon = 1e-12);
        assert_abs_diff_eq!(seasonal_ma_boundary(4, -0.1).unwrap(), 0.3682, epsilon = 1e-12);
    }

    #[test]
    fn interpolates_between_points() {
        let mid = seasonal_ma_boundary(12, -0.875).unwrap();
        assert_abs_diff_eq!(mid, (0.1129 + 0.1275) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn clamps_and_rejects() {
        assert_eq!(seasonal_ma_boundary(12, -2.0), seasonal_ma_boundary(12, -0.9));
        assert!(seasonal_ma_boundary(7, 0.0).is_none());
    }
}
