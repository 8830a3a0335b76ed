//! This module provides observability hooks for the codec pipelines and the
//! playback controller.
//!
//! Operational messages go through the `log` facade; `codec_metric!` emits
//! structured key-value metric strings for per-stage diagnostics (stage
//! timings, token counts, ratios). The `#[cfg(debug_assertions)]` attribute
//! ensures the macro body is completely compiled out of release builds.

/// Logs a structured key-value metric string to stdout, only in debug builds.
///
/// # Example
/// ```
/// use hac_codec::codec_metric;
/// let tokens = 42;
/// codec_metric!("event"="rle_encode", "tokens"=&tokens);
/// ```
#[macro_export]
macro_rules! codec_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            // Collect each pair as a JSON string fragment
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            let output = format!("HAC_METRIC: {{ {} }}", parts.join(", "));
            println!("{}", output);
        }
    };
}
