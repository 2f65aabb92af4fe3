//! Float formatting that never goes through `format!("{:.N}")`.
//!
//! Float-to-decimal formatting has panicked on some wasm toolchain/browser
//! combinations, and these strings are produced on every animation frame.
//! Values are scaled and rounded into an `i64` and the integer is formatted.

/// Fixed number of decimals (capped at 9). Non-finite values print as
/// `NaN`, `Inf` or `-Inf`.
pub fn fmt_f64_fixed(v: f64, decimals: usize) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    let decimals = decimals.min(9);
    let scale = 10_i64.pow(decimals as u32);
    let scaled = (v * scale as f64).round();
    if !scaled.is_finite() || scaled.abs() >= i64::MAX as f64 {
        return if v.is_sign_negative() { "-Inf" } else { "Inf" }.to_string();
    }

    let scaled = scaled as i64;
    let mut out = String::new();
    if scaled < 0 {
        out.push('-');
    }
    let abs = scaled.unsigned_abs();
    let scale = scale as u64;
    out.push_str(&(abs / scale).to_string());
    if decimals > 0 {
        let frac = (abs % scale).to_string();
        out.push('.');
        out.extend(std::iter::repeat('0').take(decimals - frac.len()));
        out.push_str(&frac);
    }
    out
}

/// Like [`fmt_f64_fixed`] but with trailing zeros (and a bare dot) removed,
/// so `5.0` prints as `5` and `2.50` as `2.5`.
pub fn fmt_f64_compact(v: f64, max_decimals: usize) -> String {
    let s = fmt_f64_fixed(v, max_decimals);
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
