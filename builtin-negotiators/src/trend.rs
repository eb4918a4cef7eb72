use std::cmp::Ordering;

use boa_negotiator_component::TrendPoint;

/// Straight line fitted to utility trend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrendFit {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendFit {
    pub fn at(&self, time: f64) -> f64 {
        self.intercept + self.slope * time
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    Some(match values.len() % 2 {
        0 => (values[mid - 1] + values[mid]) / 2.0,
        _ => values[mid],
    })
}

/// Trailing moving average over `window` points. Time is averaged together
/// with utility, so a linear trend is preserved without lag.
pub fn moving_average(points: &[TrendPoint], window: usize) -> Vec<TrendPoint> {
    let window = window.max(1);
    (0..points.len())
        .map(|idx| {
            let slice = &points[(idx + 1).saturating_sub(window)..=idx];
            let n = slice.len() as f64;
            TrendPoint {
                time: slice.iter().map(|p| p.time).sum::<f64>() / n,
                utility: slice.iter().map(|p| p.utility).sum::<f64>() / n,
            }
        })
        .collect()
}

/// Theil-Sen estimator: median of pairwise slopes, intercept as median residual.
/// Robust to outliers, unlike least squares. `None` if there are no two points
/// with different times.
pub fn theil_sen(points: &[TrendPoint]) -> Option<TrendFit> {
    let mut slopes = Vec::with_capacity(points.len() * points.len() / 2);
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            let dt = b.time - a.time;
            if dt.abs() > f64::EPSILON {
                slopes.push((b.utility - a.utility) / dt);
            }
        }
    }

    let slope = median(&mut slopes)?;
    let mut residuals = points
        .iter()
        .map(|p| p.utility - slope * p.time)
        .collect::<Vec<_>>();
    let intercept = median(&mut residuals)?;

    Some(TrendFit { slope, intercept })
}

/// Monotone non-increasing fit: a rising trend is flattened to its median level,
/// since the opponent is expected never to demand more over time.
pub fn monotone_fit(points: &[TrendPoint]) -> Option<TrendFit> {
    let fit = theil_sen(points)?;
    if fit.slope <= 0.0 {
        return Some(fit);
    }

    let mut utilities = points.iter().map(|p| p.utility).collect::<Vec<_>>();
    median(&mut utilities).map(|level| TrendFit {
        slope: 0.0,
        intercept: level,
    })
}

/// Projects opponent self-utility at deadline from their offers' utilities.
/// Result is clamped to [0, lowest observed utility].
pub fn project_reservation(points: &[TrendPoint], smoothing: usize) -> Option<f64> {
    let lowest = points
        .iter()
        .map(|p| p.utility)
        .fold(f64::INFINITY, f64::min);
    if !lowest.is_finite() {
        return None;
    }

    let smoothed = moving_average(points, smoothing);
    let fit = monotone_fit(&smoothed)?;
    Some(fit.at(1.0).clamp(0.0, lowest.max(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(utilities: &[(f64, f64)]) -> Vec<TrendPoint> {
        utilities
            .iter()
            .map(|(time, utility)| TrendPoint {
                time: *time,
                utility: *utility,
            })
            .collect()
    }

    /// Linear concession from 1.0 towards `reservation` at deadline, with
    /// deterministic noise that isn't monotone.
    fn noisy_concession(reservation: f64, count: usize) -> Vec<TrendPoint> {
        (0..count)
            .map(|i| {
                let time = i as f64 / count as f64;
                let noise = 0.05 * (i as f64 * 1.7).sin();
                TrendPoint {
                    time,
                    utility: 1.0 - (1.0 - reservation) * time + noise,
                }
            })
            .collect()
    }

    #[test]
    fn test_theil_sen_exact_line() {
        let fit = theil_sen(&points(&[(0.0, 1.0), (0.5, 0.75), (1.0, 0.5)])).unwrap();
        assert!((fit.slope + 0.5).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_theil_sen_ignores_outlier() {
        let fit = theil_sen(&points(&[
            (0.0, 1.0),
            (0.2, 0.9),
            (0.4, 0.1),
            (0.6, 0.7),
            (0.8, 0.6),
        ]))
        .unwrap();
        assert!((fit.slope + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_input() {
        assert!(theil_sen(&[]).is_none());
        assert!(theil_sen(&points(&[(0.3, 0.5), (0.3, 0.4)])).is_none());
        assert!(project_reservation(&[], 3).is_none());
    }

    #[test]
    fn test_rising_trend_is_flattened() {
        let fit = monotone_fit(&points(&[(0.0, 0.4), (0.5, 0.6), (1.0, 0.8)])).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert!((fit.intercept - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_keeps_linear_trend() {
        let line = points(&[(0.0, 1.0), (0.1, 0.9), (0.2, 0.8), (0.3, 0.7)]);
        for point in moving_average(&line, 3) {
            assert!((point.utility - (1.0 - point.time)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reservation_converges_in_final_quartile() {
        let offers = noisy_concession(0.3, 40);

        for end in 30..=offers.len() {
            let estimate = project_reservation(&offers[..end], 3).unwrap();
            assert!(
                (estimate - 0.3).abs() <= 0.1,
                "Estimate {estimate} after {end} offers is too far from 0.3"
            );
        }
    }

    #[test]
    fn test_reservation_clamped_to_lowest_offer() {
        let estimate =
            project_reservation(&points(&[(0.0, 0.9), (0.1, 0.8), (0.2, 0.7)]), 1).unwrap();
        assert!((estimate - 0.0).abs() < 1e-12);

        let stubborn = project_reservation(&points(&[(0.0, 0.6), (0.5, 0.6)]), 1).unwrap();
        assert!((stubborn - 0.6).abs() < 1e-12);
    }
}
