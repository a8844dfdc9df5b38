//! CBC discriminant indices
//!
//! The screening service derives red-cell indices from the submitted panel and
//! flags a likely thalassemia trait when any of the classic cut-offs trip.
//! The same arithmetic is available here for an offline preview.

use serde::Serialize;
use std::fmt;

use crate::validator::parse_number;
use crate::values::FormValues;

/// Mentzer index below this suggests thalassemia trait over iron deficiency.
pub const MENTZER_CUTOFF: f64 = 13.0;
/// Microcytosis threshold, fL.
pub const MCV_CUTOFF: f64 = 80.0;
/// Hypochromia threshold, pg.
pub const MCH_CUTOFF: f64 = 27.0;

/// Red-cell parameters used by the indices.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CbcPanel {
    pub hb: f64,
    pub rbc: f64,
    pub mcv: f64,
    pub mch: f64,
    pub mchc: f64,
    pub rdw: f64,
}

impl CbcPanel {
    /// Read the panel from form values; `None` unless all six parse.
    pub fn from_values(values: &FormValues) -> Option<Self> {
        let get = |name: &str| values.get(name).and_then(parse_number);
        Some(Self {
            hb: get("hb")?,
            rbc: get("rbc")?,
            mcv: get("mcv")?,
            mch: get("mch")?,
            mchc: get("mchc")?,
            rdw: get("rdwcv")?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CbcIndices {
    pub mentzer: f64,
    pub shine_lal: f64,
    pub srivastava: f64,
    pub green_king: f64,
}

impl CbcIndices {
    /// Indices rounded to two decimals; a zero divisor yields 0.
    pub fn compute(panel: &CbcPanel) -> Self {
        let mentzer = if panel.rbc != 0.0 { panel.mcv / panel.rbc } else { 0.0 };
        let shine_lal = if panel.mch != 0.0 { panel.mcv.powi(2) * panel.mch / 100.0 } else { 0.0 };
        let srivastava = if panel.rbc != 0.0 { panel.mch / panel.rbc } else { 0.0 };
        let green_king = if panel.hb != 0.0 {
            panel.mcv.powi(2) * panel.rdw / (panel.hb * 100.0)
        } else {
            0.0
        };

        Self {
            mentzer: round2(mentzer),
            shine_lal: round2(shine_lal),
            srivastava: round2(srivastava),
            green_king: round2(green_king),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Prediction {
    LikelyThalassemiaMinor,
    NotThalassemiaMinor,
}

impl Prediction {
    pub fn assess(indices: &CbcIndices, panel: &CbcPanel) -> Self {
        if indices.mentzer < MENTZER_CUTOFF || panel.mcv < MCV_CUTOFF || panel.mch < MCH_CUTOFF {
            Prediction::LikelyThalassemiaMinor
        } else {
            Prediction::NotThalassemiaMinor
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::LikelyThalassemiaMinor => write!(f, "Likely Thalassemia Minor"),
            Prediction::NotThalassemiaMinor => write!(f, "Not Thalassemia Minor"),
        }
    }
}

/// Indices plus the resulting call.
#[derive(Clone, Debug, Serialize)]
pub struct Screening {
    pub panel: CbcPanel,
    pub indices: CbcIndices,
    pub prediction: String,
}

pub fn screen(panel: CbcPanel) -> Screening {
    let indices = CbcIndices::compute(&panel);
    let prediction = Prediction::assess(&indices, &panel);
    tracing::debug!(mentzer = indices.mentzer, %prediction, "screened panel");
    Screening {
        panel,
        indices,
        prediction: prediction.to_string(),
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> CbcPanel {
        CbcPanel { hb: 10.0, rbc: 5.5, mcv: 66.0, mch: 20.0, mchc: 30.3, rdw: 14.0 }
    }

    #[test]
    fn test_indices() {
        let idx = CbcIndices::compute(&panel());
        assert_eq!(idx.mentzer, 12.0);
        assert_eq!(idx.shine_lal, 871.2);
        assert_eq!(idx.srivastava, 3.64);
        assert_eq!(idx.green_king, 60.98);
    }

    #[test]
    fn test_zero_divisors() {
        let idx = CbcIndices::compute(&CbcPanel { hb: 0.0, rbc: 0.0, mch: 0.0, ..panel() });
        assert_eq!(idx, CbcIndices { mentzer: 0.0, shine_lal: 0.0, srivastava: 0.0, green_king: 0.0 });
    }

    #[test]
    fn test_prediction() {
        assert_eq!(screen(panel()).prediction, "Likely Thalassemia Minor");

        let normal = CbcPanel { hb: 14.0, rbc: 4.8, mcv: 90.0, mch: 30.0, mchc: 33.0, rdw: 13.0 };
        assert_eq!(screen(normal).prediction, "Not Thalassemia Minor");

        // Mentzer alone trips the call.
        let erythrocytosis = CbcPanel { rbc: 7.5, ..normal };
        assert_eq!(screen(erythrocytosis).prediction, "Likely Thalassemia Minor");
    }

    #[test]
    fn test_panel_from_values() {
        let mut values: FormValues = [
            ("hb", "10"),
            ("rbc", "5.5"),
            ("mcv", "66"),
            ("mch", "20"),
            ("mchc", "30.3"),
        ]
        .into_iter()
        .collect();
        assert!(CbcPanel::from_values(&values).is_none());

        values.set("rdwcv", "14");
        assert_eq!(CbcPanel::from_values(&values), Some(panel()));
    }
}
