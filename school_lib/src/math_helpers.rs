use glam::Vec2;

/// Unit vector of `v`, or zero for a zero length `v` instead of NaNs.
#[inline]
pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    let length_sq = v.length_squared();
    if length_sq > 0. {
        v / length_sq.sqrt()
    } else {
        Vec2::ZERO
    }
}

/// Clamps each component into `[-limit, limit]`.
#[inline]
pub fn clamp_per_axis(v: Vec2, limit: f32) -> Vec2 {
    Vec2::new(v.x.clamp(-limit, limit), v.y.clamp(-limit, limit))
}

/// Component-wise `1 / v`, a zero component stays zero.
#[inline]
pub fn inverse_components(v: Vec2) -> Vec2 {
    let inv = |c: f32| if c != 0. { 1. / c } else { 0. };
    Vec2::new(inv(v.x), inv(v.y))
}

/// Arithmetic mean of `positions`, accumulated in double precision so large
/// schools don't drift. `None` for an empty slice.
pub fn mean_position(positions: &[Vec2]) -> Option<Vec2> {
    if positions.is_empty() {
        return None;
    }

    let (sum_x, sum_y) = positions.iter().fold((0_f64, 0_f64), |(x, y), p| {
        (x + p.x as f64, y + p.y as f64)
    });
    let n = positions.len() as f64;

    Some(Vec2::new((sum_x / n) as f32, (sum_y / n) as f32))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec2;

    use super::{clamp_per_axis, inverse_components, mean_position, normalize_or_zero};

    macro_rules! assert_eqf32 {
        ($x:expr, $y:expr) => {
            assert_relative_eq!($x, $y, epsilon = 1e-3_f32)
        };
    }

    #[test]
    fn test_normalize_or_zero() {
        assert_eq!(normalize_or_zero(Vec2::ZERO), Vec2::ZERO);

        let n = normalize_or_zero(Vec2::new(3., -4.));
        assert_eqf32!(n.x, 0.6);
        assert_eqf32!(n.y, -0.8);
    }

    #[test]
    fn test_clamp_per_axis() {
        let c = clamp_per_axis(Vec2::new(250., -0.5), 100.);
        assert_eqf32!(c.x, 100.);
        assert_eqf32!(c.y, -0.5);

        let c = clamp_per_axis(Vec2::new(-101., 101.), 100.);
        assert_eqf32!(c.x, -100.);
        assert_eqf32!(c.y, 100.);
    }

    #[test]
    fn test_inverse_components() {
        let i = inverse_components(Vec2::new(-0.25, 0.));
        assert_eqf32!(i.x, -4.);
        assert_eqf32!(i.y, 0.);
    }

    #[test]
    fn test_mean_position() {
        assert_eq!(mean_position(&[]), None);

        let m = mean_position(&[Vec2::new(1., 2.), Vec2::new(3., -2.), Vec2::new(-1., 3.)]).unwrap();
        assert_eqf32!(m.x, 1.);
        assert_eqf32!(m.y, 1.);
    }

    #[test]
    fn test_mean_position_large_school() {
        // a single precision running sum loses the small offsets next to a large one
        let mut positions = vec![Vec2::new(1e7, 0.)];
        positions.extend(std::iter::repeat(Vec2::new(0.25, 0.)).take(999));

        let m = mean_position(&positions).unwrap();

        assert_relative_eq!(m.x, ((1e7 + 999. * 0.25) / 1000.) as f32, epsilon = 1e-2_f32);
    }
}
