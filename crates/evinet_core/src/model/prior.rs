//! Descriptive prior presets offered by the node editor.
//!
//! Labels follow the analytic probability yardstick used by analysts; each
//! maps to one representative prior value.

/// One selectable descriptive prior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorPreset {
    pub label: &'static str,
    pub value: f64,
}

pub const PRIOR_PRESETS: &[PriorPreset] = &[
    PriorPreset {
        label: "Evidence Refuted",
        value: 0.0,
    },
    PriorPreset {
        label: "Remote Chance",
        value: 0.05,
    },
    PriorPreset {
        label: "Highly Unlikely",
        value: 0.15,
    },
    PriorPreset {
        label: "Unlikely",
        value: 0.30,
    },
    PriorPreset {
        label: "Realistic Possibility",
        value: 0.45,
    },
    PriorPreset {
        label: "Likely or Probable",
        value: 0.65,
    },
    PriorPreset {
        label: "Highly Likely",
        value: 0.85,
    },
    PriorPreset {
        label: "Almost Certain",
        value: 0.975,
    },
    PriorPreset {
        label: "Evidence Confirmed",
        value: 1.0,
    },
];

/// Looks up a preset by label, ignoring case and surrounding whitespace.
pub fn preset_by_label(label: &str) -> Option<&'static PriorPreset> {
    let wanted = label.trim();
    PRIOR_PRESETS
        .iter()
        .find(|preset| preset.label.eq_ignore_ascii_case(wanted))
}
