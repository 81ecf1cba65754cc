/// Evenly spaced samples over `[min, max]`, both ends included.
///
/// Like `numpy.linspace`, the last sample is exactly `max` rather than the
/// accumulated `min + step * (n - 1)`, so boundaries such as `1.0` on a
/// `[0, 2]` universe land on a sample when `n` is odd.
#[derive(Clone, Debug)]
pub struct Linspace {
    start: f64,
    end: f64,
    step: f64,
    index: usize,
    len: usize,
}

impl Linspace {
    pub fn new(min: f64, max: f64, n: usize) -> Self {
        let step = if n > 1 { (max - min) / (n - 1) as f64 } else { 0. };

        Linspace {
            start: min,
            end: max,
            step,
            index: 0,
            len: n,
        }
    }
}

impl Iterator for Linspace {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        if self.index >= self.len {
            return None;
        }

        let i = self.index;
        self.index += 1;

        if i + 1 == self.len && self.len > 1 {
            Some(self.end)
        } else {
            Some(self.start + self.step * i as f64)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.index;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Linspace {}

/// Collects `n` evenly spaced samples over `[min, max]`.
pub fn linspace(min: f64, max: f64, n: usize) -> Vec<f64> {
    Linspace::new(min, max, n).collect()
}

#[test]
fn test_linspace() {
    assert_eq!(linspace(0., 1., 5), vec![0., 0.25, 0.5, 0.75, 1.]);
    assert_eq!(linspace(3., 3., 1), vec![3.]);
    assert!(linspace(0., 1., 0).is_empty());

    let universe = linspace(0., 0.1, 7);
    assert_eq!(universe.len(), 7);
    assert_eq!(universe[6], 0.1);
}
