//! Overlay configuration.
//!
//! The overlay shipped in two shapes over time: a compact 30-slot graph that
//! samples every 250 ms, and a wider 100-slot graph sampling every 100 ms.
//! Both are presets of the same [`StatsConfig`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatsError};

/// Largest vertex count addressable by the 16-bit index buffer.
pub const MAX_INDEXED_VERTICES: usize = u16::MAX as usize + 1;

/// How a sample value is turned into a bar color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorPolicy {
    /// Red fades out towards 60 fps while green/blue fade in from 15 fps.
    #[default]
    ThresholdRamp,
    /// Straight red to green blend over `[0, cap_max]`.
    LinearRamp,
}

/// A horizontal reference line drawn behind the bars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdLine {
    /// Sample value the line sits at.
    pub value: f64,
    /// Line thickness in sample units.
    #[serde(default = "default_line_thickness")]
    pub thickness: f64,
    pub color: [f32; 3],
}

fn default_line_thickness() -> f64 {
    2.0
}

impl ThresholdLine {
    pub fn new(value: f64, color: [f32; 3]) -> Self {
        Self {
            value,
            thickness: default_line_thickness(),
            color,
        }
    }
}

/// Configuration for a [`StatsOverlay`](crate::overlay::StatsOverlay).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Number of visible history slots (`N`).
    pub capacity: usize,
    /// Saturation ceiling; larger samples draw as if equal to it.
    pub cap_max: f64,
    /// Minimum time between two reported samples.
    pub min_report_interval_ms: f64,
    pub color_policy: ColorPolicy,
    pub threshold_lines: Vec<ThresholdLine>,
    /// Multiplied into every fragment.
    pub tint: [f32; 4],
}

impl StatsConfig {
    /// 30 slots, 90 fps ceiling, 250 ms sampling, threshold colors.
    pub fn compact() -> Self {
        Self {
            capacity: 30,
            cap_max: 90.0,
            min_report_interval_ms: 250.0,
            color_policy: ColorPolicy::ThresholdRamp,
            threshold_lines: vec![
                ThresholdLine::new(30.0, [0.5, 0.0, 0.5]),
                ThresholdLine::new(60.0, [0.2, 0.0, 0.75]),
            ],
            tint: [1.0; 4],
        }
    }

    /// 100 slots, 120 fps ceiling, 100 ms sampling, linear colors.
    pub fn wide() -> Self {
        let thin = |value: f64, color: [f32; 3]| ThresholdLine {
            value,
            thickness: 0.5,
            color,
        };
        Self {
            capacity: 100,
            cap_max: 120.0,
            min_report_interval_ms: 100.0,
            color_policy: ColorPolicy::LinearRamp,
            threshold_lines: vec![
                thin(30.0, [0.5, 0.0, 0.5]),
                thin(60.0, [0.2, 0.0, 0.75]),
                thin(90.0, [0.0, 0.0, 1.0]),
            ],
            tint: [1.0; 4],
        }
    }

    /// Total vertices the overlay uploads: 4 per slot plus 4 per background quad
    /// (panel, graph area, one per threshold line). Saturates at `usize::MAX`.
    pub fn vertex_count(&self) -> usize {
        self.capacity
            .saturating_add(2)
            .saturating_add(self.threshold_lines.len())
            .saturating_mul(4)
    }

    /// Check that the configuration describes a drawable graph.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(StatsError::invalid_config("capacity must be at least 1"));
        }
        if self.vertex_count() > MAX_INDEXED_VERTICES {
            return Err(StatsError::invalid_config(format!(
                "capacity {} with {} threshold lines needs more vertices than 16-bit indices can address",
                self.capacity,
                self.threshold_lines.len()
            )));
        }
        if !self.cap_max.is_finite() || self.cap_max <= 0.0 {
            return Err(StatsError::invalid_config(format!(
                "cap_max must be finite and positive, got {}",
                self.cap_max
            )));
        }
        if !self.min_report_interval_ms.is_finite() || self.min_report_interval_ms < 0.0 {
            return Err(StatsError::invalid_config(format!(
                "min_report_interval_ms must be finite and non-negative, got {}",
                self.min_report_interval_ms
            )));
        }
        if self.tint.iter().any(|c| !c.is_finite()) {
            return Err(StatsError::invalid_config("tint must be finite"));
        }
        for line in &self.threshold_lines {
            if !line.value.is_finite()
                || !line.thickness.is_finite()
                || line.color.iter().any(|c| !c.is_finite())
            {
                return Err(StatsError::invalid_config(format!(
                    "threshold line at {} is not finite",
                    line.value
                )));
            }
        }
        Ok(())
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self::compact()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        assert!(StatsConfig::compact().validate().is_ok());
        assert!(StatsConfig::wide().validate().is_ok());
        assert_eq!(StatsConfig::default(), StatsConfig::compact());
    }

    #[test]
    fn huge_capacity_is_rejected_not_wrapped() {
        for capacity in [usize::MAX / 2, usize::MAX, 1 << 30] {
            let cfg = StatsConfig {
                capacity,
                ..StatsConfig::compact()
            };
            let exact = 4 * (capacity as u128 + 4);
            assert_eq!(cfg.vertex_count() as u128, exact.min(usize::MAX as u128));
            assert!(matches!(
                cfg.validate(),
                Err(StatsError::InvalidConfig { .. })
            ));
        }
    }

    #[test]
    fn rejects_degenerate_configs() {
        let mut cfg = StatsConfig::compact();
        cfg.capacity = 0;
        assert!(matches!(
            cfg.validate(),
            Err(StatsError::InvalidConfig { .. })
        ));

        let mut cfg = StatsConfig::compact();
        cfg.cap_max = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = StatsConfig::compact();
        cfg.min_report_interval_ms = f64::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = StatsConfig::compact();
        cfg.threshold_lines.push(ThresholdLine::new(f64::INFINITY, [1.0; 3]));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_capacity_beyond_u16_indices() {
        let mut cfg = StatsConfig::compact();
        cfg.capacity = MAX_INDEXED_VERTICES / 4;
        assert!(cfg.validate().is_err());

        // Leave room for the background quads.
        cfg.capacity = MAX_INDEXED_VERTICES / 4 - (2 + cfg.threshold_lines.len());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: StatsConfig =
            serde_json::from_str(r#"{ "capacity": 4, "color_policy": "linear_ramp" }"#).unwrap();
        assert_eq!(cfg.capacity, 4);
        assert_eq!(cfg.color_policy, ColorPolicy::LinearRamp);
        assert_eq!(cfg.cap_max, 90.0);
        assert_eq!(cfg.threshold_lines.len(), 2);
        assert_eq!(cfg.threshold_lines[0].thickness, 2.0);
    }
}
