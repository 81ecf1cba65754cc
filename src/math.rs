use num::Float;

/// Similar to numpy.interp: piecewise-linear interpolation of `x` over the
/// break points `(xp, fp)`. Values outside `xp` clamp to the boundary `fp`.
///
/// `xp` must be sorted ascending and as long as `fp`. An empty `xp` yields zero.
pub(crate) fn interp_point<F: Float>(x: F, xp: &[F], fp: &[F]) -> F {
    debug_assert_eq!(xp.len(), fp.len());

    let n = xp.len().min(fp.len());

    if n == 0 {
        return F::zero();
    }

    // Index of the first break point strictly right of x
    let i = xp[..n].partition_point(|&p| p <= x);

    if i == 0 {
        return fp[0];
    }
    if i == n {
        return fp[n - 1];
    }

    let (x1, y1) = (xp[i - 1], fp[i - 1]);
    let (x2, y2) = (xp[i], fp[i]);

    if x2 == x1 {
        return y1;
    }

    y1 + (x - x1) * (y2 - y1) / (x2 - x1)
}

/// Interpolates every value of `x_input` over the break points `coords`.
pub(crate) fn interp<F: Float>(x_input: impl IntoIterator<Item = F>, coords: &[(F, F)]) -> Vec<F> {
    let (xp, fp): (Vec<F>, Vec<F>) = coords.iter().copied().unzip();

    x_input.into_iter().map(|x| interp_point(x, &xp, &fp)).collect()
}

#[test]
fn test_interp() {
    let x = [0., 1., 1.5, 2.72, 3.24];
    let coords = [(1., 3.), (2., 2.), (3., 0.)];

    assert_eq!(interp(x, &coords), vec![3., 3., 2.5, 0.5599999999999996, 0.]);

    let x = [2.5, -1., 7.5];
    let coords = [(0., 0.), (1., 2.), (2., 5.), (3., 3.), (4.5, 2.)];

    assert_eq!(interp(x, &coords), vec![4., 0., 2.]);
}

#[test]
fn test_interp_point_hits_break_points_exactly() {
    let xp = [0., 0.5, 1.];
    let fp = [0., 1., 0.];

    assert_eq!(interp_point(0.5, &xp, &fp), 1.);
    assert_eq!(interp_point(1., &xp, &fp), 0.);
    assert_eq!(interp_point(0.25, &xp, &fp), 0.5);
    assert_eq!(interp_point(0.25f64, &[], &[]), 0.);
}
