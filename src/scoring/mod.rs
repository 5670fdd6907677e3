use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Financial,
    Reputation,
    LegalRegulatory,
    Environmental,
    TimeSchedule,
    Other,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 6] = [
        Self::Financial,
        Self::Reputation,
        Self::LegalRegulatory,
        Self::Environmental,
        Self::TimeSchedule,
        Self::Other,
    ];
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Financial => "financial",
            Self::Reputation => "reputation",
            Self::LegalRegulatory => "legal_regulatory",
            Self::Environmental => "environmental",
            Self::TimeSchedule => "time_schedule",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for RiskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "financial" => Ok(Self::Financial),
            "reputation" => Ok(Self::Reputation),
            "legal_regulatory" => Ok(Self::LegalRegulatory),
            "environmental" => Ok(Self::Environmental),
            "time_schedule" => Ok(Self::TimeSchedule),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Likelihood {
    Rare,
    Unlikely,
    Possible,
    Likely,
    AlmostCertain,
}

impl Likelihood {
    pub const ALL: [Likelihood; 5] = [
        Self::Rare,
        Self::Unlikely,
        Self::Possible,
        Self::Likely,
        Self::AlmostCertain,
    ];

    pub fn weight(&self) -> f64 {
        match self {
            Self::Rare => 0.05,
            Self::Unlikely => 0.1,
            Self::Possible => 0.2,
            Self::Likely => 0.4,
            Self::AlmostCertain => 0.8,
        }
    }

    /// Resolves a submitted numeric weight back to its canonical band.
    pub fn from_weight(weight: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|l| (l.weight() - weight).abs() < 1e-9)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Rare => "Rare",
            Self::Unlikely => "Unlikely",
            Self::Possible => "Possible",
            Self::Likely => "Likely",
            Self::AlmostCertain => "Almost certain",
        }
    }
}

impl std::fmt::Display for Likelihood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Rare => "rare",
            Self::Unlikely => "unlikely",
            Self::Possible => "possible",
            Self::Likely => "likely",
            Self::AlmostCertain => "almost_certain",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Likelihood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rare" => Ok(Self::Rare),
            "unlikely" => Ok(Self::Unlikely),
            "possible" => Ok(Self::Possible),
            "likely" => Ok(Self::Likely),
            "almost_certain" => Ok(Self::AlmostCertain),
            _ => Err(format!("Unknown likelihood: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Bucket boundaries are inclusive on both ends and contiguous:
    /// Low [0.01, 0.05], Medium [0.06, 0.15], High [0.16, 0.35],
    /// Critical [0.36, 0.72]. Products below 0.01 take Low.
    pub fn for_score(score: f64) -> RiskLevel {
        if score >= 0.36 {
            Self::Critical
        } else if score >= 0.16 {
            Self::High
        } else if score >= 0.06 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("Unknown risk level: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactPoint {
    pub value: f64,
    pub label: &'static str,
}

const fn point(value: f64, label: &'static str) -> ImpactPoint {
    ImpactPoint { value, label }
}

const GENERIC_SCALE: [ImpactPoint; 5] = [
    point(0.05, "Insignificant"),
    point(0.1, "Minor"),
    point(0.2, "Moderate"),
    point(0.4, "Major"),
    point(0.8, "Severe"),
];

const REPUTATION_SCALE: [ImpactPoint; 5] = [
    point(0.1, "Internal awareness only"),
    point(0.3, "Local complaints"),
    point(0.5, "Regional press coverage"),
    point(0.7, "National press coverage"),
    point(0.9, "Sustained international coverage"),
];

const LEGAL_SCALE: [ImpactPoint; 5] = [
    point(0.1, "Procedural remark"),
    point(0.3, "Regulator inquiry"),
    point(0.5, "Formal warning or minor fine"),
    point(0.7, "Material fine or sanction"),
    point(0.9, "License loss or prosecution"),
];

const ENVIRONMENTAL_SCALE: [ImpactPoint; 5] = [
    point(0.1, "Contained on site"),
    point(0.3, "Minor off-site release"),
    point(0.5, "Reportable incident"),
    point(0.7, "Serious lasting damage"),
    point(0.9, "Irreversible damage"),
];

const SCHEDULE_SCALE: [ImpactPoint; 5] = [
    point(0.1, "Slack absorbed"),
    point(0.3, "Milestone slips"),
    point(0.5, "Phase delayed"),
    point(0.7, "Deliverable date missed"),
    point(0.9, "Program deadline missed"),
];

/// Five-point impact scale registered for a category. Financial and
/// Other share the generic weights; the remaining categories carry the
/// heavier 0.1..0.9 weighting.
pub fn impact_scale(category: RiskCategory) -> &'static [ImpactPoint; 5] {
    match category {
        RiskCategory::Financial | RiskCategory::Other => &GENERIC_SCALE,
        RiskCategory::Reputation => &REPUTATION_SCALE,
        RiskCategory::LegalRegulatory => &LEGAL_SCALE,
        RiskCategory::Environmental => &ENVIRONMENTAL_SCALE,
        RiskCategory::TimeSchedule => &SCHEDULE_SCALE,
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("likelihood {0} is not a canonical likelihood weight")]
    UnknownLikelihood(f64),
    #[error("impact {value} is not on the {category} impact scale")]
    ImpactOffScale { category: RiskCategory, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskScore {
    /// Unrounded product; bucketing uses this, not the display value.
    pub raw: f64,
    pub level: RiskLevel,
}

impl RiskScore {
    /// Two-decimal fixed-point form for persistence and display.
    pub fn rounded(&self) -> BigDecimal {
        BigDecimal::try_from(self.raw)
            .unwrap_or_default()
            .with_scale_round(2, RoundingMode::HalfUp)
    }
}

pub fn resolve_likelihood(weight: f64) -> Result<Likelihood, ScoringError> {
    Likelihood::from_weight(weight).ok_or(ScoringError::UnknownLikelihood(weight))
}

pub fn resolve_impact(
    category: RiskCategory,
    value: f64,
) -> Result<&'static ImpactPoint, ScoringError> {
    impact_scale(category)
        .iter()
        .find(|p| (p.value - value).abs() < 1e-9)
        .ok_or(ScoringError::ImpactOffScale { category, value })
}

/// Scores a (category, likelihood, impact) triple. The impact value must
/// sit on the scale registered for the category.
pub fn score(
    category: RiskCategory,
    likelihood: Likelihood,
    impact: f64,
) -> Result<RiskScore, ScoringError> {
    let point = resolve_impact(category, impact)?;
    let raw = likelihood.weight() * point.value;
    Ok(RiskScore {
        raw,
        level: RiskLevel::for_score(raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn every_canonical_pair_buckets() {
        for category in RiskCategory::ALL {
            for likelihood in Likelihood::ALL {
                for impact in impact_scale(category) {
                    let result = score(category, likelihood, impact.value)
                        .expect("canonical pair must score");
                    // Each product lands in exactly one bucket.
                    assert!(matches!(
                        result.level,
                        RiskLevel::Low | RiskLevel::Medium | RiskLevel::High | RiskLevel::Critical
                    ));
                }
            }
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let a = score(RiskCategory::Environmental, Likelihood::Likely, 0.7).unwrap();
        let b = score(RiskCategory::Environmental, Likelihood::Likely, 0.7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn boundary_at_high_is_inclusive() {
        let result = score(RiskCategory::Financial, Likelihood::Likely, 0.4).unwrap();
        assert_eq!(result.level, RiskLevel::High);
        assert_eq!(result.rounded(), BigDecimal::from_str("0.16").unwrap());
    }

    #[test]
    fn sub_threshold_product_falls_back_to_low() {
        // 0.05 x 0.1 = 0.005, below the lowest bucket boundary.
        let result = score(RiskCategory::Reputation, Likelihood::Rare, 0.1).unwrap();
        assert!(result.raw < 0.01);
        assert_eq!(result.level, RiskLevel::Low);
    }

    #[test]
    fn medium_band_holds_at_its_edges() {
        let low_edge = score(RiskCategory::Reputation, Likelihood::Possible, 0.3).unwrap();
        assert_eq!(low_edge.level, RiskLevel::Medium); // 0.06

        let high_edge = score(RiskCategory::Reputation, Likelihood::Rare, 0.3).unwrap();
        assert_eq!(high_edge.level, RiskLevel::Low); // 0.015
    }

    #[test]
    fn maximum_product_is_critical() {
        let result = score(RiskCategory::Environmental, Likelihood::AlmostCertain, 0.9).unwrap();
        assert_eq!(result.level, RiskLevel::Critical);
        assert_eq!(result.rounded(), BigDecimal::from_str("0.72").unwrap());
    }

    #[test]
    fn impact_off_scale_is_rejected() {
        // 0.05 belongs to the generic scale, not the reputation scale.
        let err = score(RiskCategory::Reputation, Likelihood::Possible, 0.05).unwrap_err();
        assert!(matches!(err, ScoringError::ImpactOffScale { .. }));
    }

    #[test]
    fn likelihood_weight_resolution() {
        assert_eq!(resolve_likelihood(0.4).unwrap(), Likelihood::Likely);
        assert!(resolve_likelihood(0.3).is_err());
    }

    #[test]
    fn category_codes_round_trip() {
        let parsed = RiskCategory::from_str("legal_regulatory").unwrap();
        assert_eq!(parsed, RiskCategory::LegalRegulatory);
        assert_eq!(parsed.to_string(), "legal_regulatory");
    }
}
