use num::Float;

/// Point-wise fuzzy AND (minimum) of two curves sampled on the same universe.
pub fn fuzzy_and<F: Float>(u: &[F], v: &[F]) -> Vec<F> {
    debug_assert_eq!(u.len(), v.len());

    u.iter().zip(v).map(|(&u, &v)| F::min(u, v)).collect()
}

/// Point-wise fuzzy OR (maximum) of two curves sampled on the same universe.
pub fn fuzzy_or<F: Float>(u: &[F], v: &[F]) -> Vec<F> {
    debug_assert_eq!(u.len(), v.len());

    u.iter().zip(v).map(|(&u, &v)| F::max(u, v)).collect()
}

/// Cuts a curve off at `level`, i.e. the fuzzy AND of a curve with a constant.
pub fn clip<F: Float>(u: &[F], level: F) -> Vec<F> {
    u.iter().map(|&u| F::min(u, level)).collect()
}

/// Center of gravity of a piecewise-linear membership curve.
///
/// Each segment between two samples is split into a rectangle and a right
/// triangle whose areas and centers are combined exactly, so the result does
/// not depend on the sampling density of flat or linear stretches.
///
/// Returns `None` when the curve encloses no area.
pub fn centroid<F: Float>(universe: &[F], membership: &[F]) -> Option<F> {
    debug_assert_eq!(universe.len(), membership.len());

    let n = universe.len().min(membership.len());

    match n {
        0 => return None,
        1 => return if membership[0] > F::zero() { Some(universe[0]) } else { None },
        _ => {},
    }

    let two = F::one() + F::one();
    let three = two + F::one();
    let mut sum_area = F::zero();
    let mut sum_moment = F::zero();

    for i in 0..n - 1 {
        let (x1, x2) = (universe[i], universe[i + 1]);
        let (y1, y2) = (membership[i], membership[i + 1]);
        let base = x2 - x1;

        let area_rect = F::min(y1, y2) * base;
        let center_rect = x1 + base / two;
        let area_tri = base * F::abs(y2 - y1) / two;
        // The triangle leans towards its taller side
        let center_tri = if y2 > y1 {
            x1 + two / three * base
        } else {
            x1 + base / three
        };

        sum_area = sum_area + area_rect + area_tri;
        sum_moment = sum_moment + area_rect * center_rect + area_tri * center_tri;
    }

    if sum_area > F::zero() && sum_area.is_finite() {
        Some(sum_moment / sum_area)
    } else {
        None
    }
}

#[test]
fn test_fuzzy_and_or() {
    let u = [0., 0.4, 1.];
    let v = [0.5, 0.2, 0.9];

    assert_eq!(fuzzy_and(&u, &v), vec![0., 0.2, 0.9]);
    assert_eq!(fuzzy_or(&u, &v), vec![0.5, 0.4, 1.]);
    assert_eq!(clip(&u, 0.5), vec![0., 0.4, 0.5]);
}

#[test]
fn test_centroid() {
    // Symmetric triangle peaks in the middle
    let universe = [0., 0.5, 1.];
    let c = centroid(&universe, &[0., 1., 0.]).unwrap();
    assert!((c - 0.5).abs() < 1e-12);

    // Right-angled triangle rising to the right has its center at 2/3
    let c = centroid(&[0., 1.], &[0., 1.]).unwrap();
    assert!((c - 2. / 3.).abs() < 1e-12);

    // A flat plateau is centered on its midpoint
    assert_eq!(centroid(&[2., 4., 6.], &[0.5, 0.5, 0.5]), Some(4.));

    assert_eq!(centroid(&universe, &[0., 0., 0.]), None);
    assert_eq!(centroid::<f64>(&[], &[]), None);
    assert_eq!(centroid(&[7.], &[0.2]), Some(7.));
}
