//! CSS color string helpers.
//!
//! Colors travel through the crate as CSS strings (`"rgba(0,200,150,0.6)"`)
//! so that themes and host configuration can pass them straight to the
//! drawing surface. The only manipulation needed is swapping the trailing
//! alpha component of an `rgba(...)` color.

/// Fully transparent variant of the default accent color.
pub const TRANSPARENT_ACCENT: &str = "rgba(0,200,150,0.0)";

/// Fully transparent ripple edge.
pub const RIPPLE_EDGE: &str = "rgba(0,200,150,0)";

/// Background gradient start color.
pub const BACKGROUND_START: &str = "rgba(0, 200, 150, 0.03)";

/// Background gradient end color.
pub const BACKGROUND_END: &str = "rgba(0, 100, 75, 0.03)";

/// Extract the trailing alpha component of an `rgba(...)` color.
///
/// Returns `None` for colors without a numeric trailing component.
#[must_use]
pub fn alpha_of(color: &str) -> Option<f64> {
    let (_, tail) = split_alpha(color)?;
    tail.trim().parse().ok()
}

/// Replace the trailing alpha component of an `rgba(...)` color.
///
/// Colors that carry no alpha (hex, named, `rgb(...)`) are returned unchanged.
#[must_use]
pub fn with_alpha(color: &str, alpha: f64) -> String {
    match split_alpha(color) {
        Some((head, tail)) if tail.trim().parse::<f64>().is_ok() => {
            format!("{head}{})", format_alpha(alpha))
        }
        _ => color.to_string(),
    }
}

/// Multiply the trailing alpha component of an `rgba(...)` color.
#[must_use]
pub fn scale_alpha(color: &str, factor: f64) -> String {
    match alpha_of(color) {
        Some(alpha) => with_alpha(color, alpha * factor),
        None => color.to_string(),
    }
}

/// Particle fill color at the given alpha.
#[must_use]
pub fn particle_color(alpha: f64) -> String {
    format!("rgba(0, 200, 150, {})", format_alpha(alpha))
}

/// Split `"rgba(1,2,3,0.5)"` into `("rgba(1,2,3,", "0.5")`.
fn split_alpha(color: &str) -> Option<(&str, &str)> {
    let body = color.trim_end().strip_suffix(')')?;
    if !body.starts_with("rgba") && !body.starts_with("hsla") {
        return None;
    }
    let comma = body.rfind(',')?;
    Some((&body[..=comma], &body[comma + 1..]))
}

fn format_alpha(alpha: f64) -> String {
    let clamped = alpha.clamp(0.0, 1.0);
    let rounded = (clamped * 1000.0).round() / 1000.0;
    format!("{rounded}")
}
