//! Series statistics shared by the forecasting and training code.

/// Arithmetic mean; `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; `0.0` for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Coefficient of variation (`stddev / mean`).
///
/// Returns `0.0` when the mean is zero.
pub fn volatility(values: &[f64]) -> f64 {
    let m = mean(values);
    if m == 0.0 {
        return 0.0;
    }
    (std_dev(values) / m).abs()
}

/// Same-length smoothed series.
///
/// The first `window - 1` points average everything seen so far (expanding
/// window); after that each point averages the trailing `window` values.
pub fn moving_average(series: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(series.len());
    let mut running = 0.0;

    for (i, &v) in series.iter().enumerate() {
        running += v;
        if i >= window {
            running -= series[i - window];
        }
        let len = (i + 1).min(window);
        out.push(running / len as f64);
    }

    out
}

/// `1 - SSres/SStot`, or `0.0` when the observations have no variance.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    let m = mean(actual);
    let ss_tot: f64 = actual.iter().map(|a| (a - m) * (a - m)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    1.0 - ss_res / ss_tot
}
