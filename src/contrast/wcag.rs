//! WCAG 2.x relative luminance and contrast ratio.

use serde::Serialize;

use crate::pdf::Rgb;

/// AA threshold for normal-size text.
pub const AA_NORMAL: f64 = 4.5;
/// AA threshold for large text.
pub const AA_LARGE: f64 = 3.0;
/// AAA threshold for normal-size text.
pub const AAA_NORMAL: f64 = 7.0;
/// AAA threshold for large text.
pub const AAA_LARGE: f64 = 4.5;

/// Relative luminance of an sRGB colour, in `0.0..=1.0`.
#[must_use]
pub fn relative_luminance(color: Rgb) -> f64 {
    let [r, g, b] = color.0.map(|channel| {
        let c = f64::from(channel) / 255.0;
        if c <= 0.039_28 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    });
    0.2126f64.mul_add(r, 0.7152f64.mul_add(g, 0.0722 * b))
}

/// Contrast ratio between two colours, in `1.0..=21.0`. Order-independent.
#[must_use]
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Pass/fail against the four WCAG contrast thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WcagCompliance {
    /// Ratio ≥ 4.5.
    pub aa_normal: bool,
    /// Ratio ≥ 3.0.
    pub aa_large: bool,
    /// Ratio ≥ 7.0.
    pub aaa_normal: bool,
    /// Ratio ≥ 4.5.
    pub aaa_large: bool,
}

impl WcagCompliance {
    /// Classifies a contrast ratio.
    #[must_use]
    pub fn classify(ratio: f64) -> Self {
        Self {
            aa_normal: ratio >= AA_NORMAL,
            aa_large: ratio >= AA_LARGE,
            aaa_normal: ratio >= AAA_NORMAL,
            aaa_large: ratio >= AAA_LARGE,
        }
    }

    /// True if every threshold passes.
    #[must_use]
    pub const fn is_fully_compliant(&self) -> bool {
        self.aa_normal && self.aa_large && self.aaa_normal && self.aaa_large
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_on_white_is_21() {
        let ratio = contrast_ratio(Rgb::BLACK, Rgb::WHITE);
        assert!((ratio - 21.0).abs() < 1e-9);
    }

    #[test]
    fn identical_colours_are_1() {
        let grey = Rgb([119, 119, 119]);
        assert!((contrast_ratio(grey, grey) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ratio_is_symmetric() {
        let a = Rgb([12, 90, 200]);
        let b = Rgb([240, 230, 140]);
        assert!((contrast_ratio(a, b) - contrast_ratio(b, a)).abs() < 1e-12);
    }

    #[test]
    fn grey_on_white_is_near_aa_boundary() {
        // #777777 on white is the classic "just fails AA" example (≈4.48).
        let ratio = contrast_ratio(Rgb([0x77, 0x77, 0x77]), Rgb::WHITE);
        assert!(ratio > 4.4 && ratio < 4.5);
    }

    #[test]
    fn exactly_four_point_five() {
        let compliance = WcagCompliance::classify(4.5);
        assert!(compliance.aa_normal);
        assert!(compliance.aa_large);
        assert!(compliance.aaa_large);
        assert!(!compliance.aaa_normal);
        assert!(!compliance.is_fully_compliant());
    }

    #[test]
    fn low_ratio_fails_everything() {
        let compliance = WcagCompliance::classify(2.0);
        assert_eq!(
            compliance,
            WcagCompliance {
                aa_normal: false,
                aa_large: false,
                aaa_normal: false,
                aaa_large: false,
            }
        );
        assert!(WcagCompliance::classify(7.0).is_fully_compliant());
    }
}
