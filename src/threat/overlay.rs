//! Overlay colors and intensity tiers

use serde::{Deserialize, Serialize};

/// RGBA color (0.0 to 1.0 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(&self, a: f32) -> Self {
        Self { a, ..*self }
    }
}

pub const DANGER_RED: Color = Color::new(0.9, 0.1, 0.1, 1.0);
pub const EXPECTED_DAMAGE_VIOLET: Color = Color::new(0.6, 0.2, 0.9, 1.0);

/// Which projection the overlay paints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DangerMetric {
    #[default]
    Danger,
    ExpectedDamage,
}

impl DangerMetric {
    pub fn next(self) -> Self {
        match self {
            DangerMetric::Danger => DangerMetric::ExpectedDamage,
            DangerMetric::ExpectedDamage => DangerMetric::Danger,
        }
    }

    pub fn base_color(self) -> Color {
        match self {
            DangerMetric::Danger => DANGER_RED,
            DangerMetric::ExpectedDamage => EXPECTED_DAMAGE_VIOLET,
        }
    }
}

/// Painted state of one tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileTint {
    /// 0 (lowest) through 3
    pub tier: u8,
    pub value: f32,
    pub color: Color,
}

/// Maps summed threat values onto tinted tiers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierScale {
    pub thresholds: [f32; 3],
    pub opacities: [f32; 4],
}

impl TierScale {
    /// Zero or negative values leave the tile clear
    pub fn tier_of(&self, value: f32) -> Option<u8> {
        if value <= 0.0 {
            return None;
        }
        let tier = self
            .thresholds
            .iter()
            .position(|t| value <= *t)
            .unwrap_or(self.thresholds.len());
        Some(tier as u8)
    }

    pub fn tint(&self, metric: DangerMetric, value: f32) -> Option<TileTint> {
        let tier = self.tier_of(value)?;
        let alpha = self.opacities[tier as usize];
        Some(TileTint {
            tier,
            value,
            color: metric.base_color().with_alpha(alpha),
        })
    }
}
