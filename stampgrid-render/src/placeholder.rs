use stampgrid_core::StampRecord;

/// First and last decade of the placeholder colour ramp.
const RAMP_START: i32 = 1840;
const RAMP_END: i32 = 2020;

/// Colour stops along the decade ramp (position 0..1, RGB).
const STOPS: &[(f64, [u8; 3])] = &[
    (0.0, [92, 58, 33]),
    (0.2, [128, 36, 46]),
    (0.4, [46, 82, 120]),
    (0.6, [40, 110, 76]),
    (0.8, [150, 110, 30]),
    (1.0, [90, 60, 140]),
];

/// Low-cost stand-in shown before an image loads, after eviction, or when
/// the image is missing: the topic over a decade-coloured background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderVisual {
    pub label: String,
    pub background: [u8; 3],
    pub decade: i32,
}

impl PlaceholderVisual {
    pub fn for_record(record: &StampRecord) -> Self {
        let label = if record.main_topic.is_empty() {
            record.id.clone()
        } else {
            record.main_topic.clone()
        };
        Self {
            label,
            background: decade_color(record.decade()),
            decade: record.decade(),
        }
    }

    /// Black or white, whichever reads better on the background.
    pub fn text_color(&self) -> [u8; 3] {
        let [r, g, b] = self.background;
        let luma = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
        if luma > 140.0 {
            [20, 20, 20]
        } else {
            [240, 240, 240]
        }
    }
}

/// Deterministic background colour for a decade.
pub fn decade_color(decade: i32) -> [u8; 3] {
    let span = (RAMP_END - RAMP_START) as f64;
    let t = ((decade - RAMP_START) as f64 / span).clamp(0.0, 1.0);
    let mut lo = 0;
    for (j, &(pos, _)) in STOPS.iter().enumerate() {
        if pos <= t {
            lo = j;
        }
    }
    let hi = (lo + 1).min(STOPS.len() - 1);
    let (lo_t, lo_c) = STOPS[lo];
    let (hi_t, hi_c) = STOPS[hi];
    let frac = if (hi_t - lo_t).abs() < 1e-10 {
        0.0
    } else {
        ((t - lo_t) / (hi_t - lo_t)).clamp(0.0, 1.0)
    };
    let inv = 1.0 - frac;
    [
        (lo_c[0] as f64 * inv + hi_c[0] as f64 * frac) as u8,
        (lo_c[1] as f64 * inv + hi_c[1] as f64 * frac) as u8,
        (lo_c[2] as f64 * inv + hi_c[2] as f64 * frac) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_decade_same_color() {
        assert_eq!(decade_color(1850), decade_color(1850));
        let a = PlaceholderVisual::for_record(&StampRecord::new("1", 1851, "A"));
        let b = PlaceholderVisual::for_record(&StampRecord::new("2", 1858, "B"));
        assert_eq!(a.background, b.background);
    }

    #[test]
    fn distinct_decades_differ() {
        assert_ne!(decade_color(1850), decade_color(1930));
    }

    #[test]
    fn out_of_range_decades_clamp() {
        assert_eq!(decade_color(1700), decade_color(RAMP_START));
        assert_eq!(decade_color(2200), decade_color(RAMP_END));
    }

    #[test]
    fn missing_topic_uses_identifier() {
        let p = PlaceholderVisual::for_record(&StampRecord::new("SG-12", 1900, ""));
        assert_eq!(p.label, "SG-12");
    }
}
