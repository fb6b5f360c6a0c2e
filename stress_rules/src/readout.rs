//! Display-ready view of the meter for whatever draws the stress bar.

use serde::{Deserialize, Serialize};

use crate::meter::MeterSnapshot;

/// Colour band of the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeterBand {
    /// Below half of the danger fraction.
    Calm,
    /// Between half of the danger fraction and the danger fraction.
    Warning,
    /// At or above the danger threshold.
    Danger,
}

/// Everything a stress bar needs, computed from a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReadout {
    /// Fill amount, `current / max`, in `[0, 1]`.
    pub fill: f32,
    pub band: MeterBand,
    /// Position inside the band in `[0, 1]`, for colour blending toward the
    /// next band. Always 1.0 in the danger band.
    pub band_position: f32,
    /// Whether the bar should pulse.
    pub pulsing: bool,
    pub label: String,
}

impl MeterReadout {
    pub fn from_snapshot(snapshot: &MeterSnapshot) -> Self {
        let fill = if snapshot.max > 0.0 {
            (snapshot.current / snapshot.max).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let danger = if snapshot.max > 0.0 {
            snapshot.danger_threshold / snapshot.max
        } else {
            0.0
        };
        let half = danger * 0.5;

        let (band, band_position) = if snapshot.current >= snapshot.danger_threshold {
            (MeterBand::Danger, 1.0)
        } else if fill < half {
            (MeterBand::Calm, fill / half)
        } else {
            (MeterBand::Warning, (fill - half) / half)
        };

        Self {
            fill,
            band,
            band_position: band_position.clamp(0.0, 1.0),
            pulsing: band == MeterBand::Danger,
            label: format!("Stress: {}%", (fill * 100.0).round() as u32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(current: f32) -> MeterSnapshot {
        MeterSnapshot {
            current,
            max: 100.0,
            danger_threshold: 80.0,
            in_danger_zone: current >= 80.0,
            exhausted: current >= 100.0,
        }
    }

    #[test]
    fn test_bands() {
        assert_eq!(MeterReadout::from_snapshot(&snapshot(10.0)).band, MeterBand::Calm);
        assert_eq!(MeterReadout::from_snapshot(&snapshot(40.0)).band, MeterBand::Warning);
        assert_eq!(MeterReadout::from_snapshot(&snapshot(79.9)).band, MeterBand::Warning);
        assert_eq!(MeterReadout::from_snapshot(&snapshot(80.0)).band, MeterBand::Danger);
    }

    #[test]
    fn test_band_position() {
        let calm = MeterReadout::from_snapshot(&snapshot(20.0));
        assert!((calm.band_position - 0.5).abs() < 0.001);

        let warning = MeterReadout::from_snapshot(&snapshot(60.0));
        assert!((warning.band_position - 0.5).abs() < 0.001);

        let danger = MeterReadout::from_snapshot(&snapshot(90.0));
        assert_eq!(danger.band_position, 1.0);
        assert!(danger.pulsing);
    }

    #[test]
    fn test_label_and_fill() {
        let readout = MeterReadout::from_snapshot(&snapshot(44.6));
        assert_eq!(readout.label, "Stress: 45%");
        assert!((readout.fill - 0.446).abs() < 0.001);
        assert!(!readout.pulsing);
    }

    #[test]
    fn test_label_is_percent_of_max() {
        let snap = MeterSnapshot {
            current: 25.0,
            max: 50.0,
            danger_threshold: 40.0,
            in_danger_zone: false,
            exhausted: false,
        };
        assert_eq!(MeterReadout::from_snapshot(&snap).label, "Stress: 50%");
    }

    #[test]
    fn test_zero_threshold_is_always_danger() {
        let snap = MeterSnapshot {
            current: 0.0,
            max: 100.0,
            danger_threshold: 0.0,
            in_danger_zone: false,
            exhausted: false,
        };
        let readout = MeterReadout::from_snapshot(&snap);
        assert_eq!(readout.band, MeterBand::Danger);
    }
}
