//! Risk priority scoring.
//!
//! Each risk scores as probability weight times impact weight times a time
//! urgency factor. Urgency is the risk reserve measured against one workday,
//! clamped to the 0.5..=1 range so even a tiny reserve keeps half its
//! probability/impact product. Scores fall into severity bands and a 3x3
//! probability/impact matrix for reporting.

use rust_decimal::Decimal;

use crate::fields::{RiskBand, RiskLevel};
use crate::task::Risk;
use crate::time;

/// Numeric weight of a risk level (Low 1, Medium 2, High 3).
pub fn level_weight(level: RiskLevel) -> u32 {
    match level {
        RiskLevel::Low => 1,
        RiskLevel::Medium => 2,
        RiskLevel::High => 3,
    }
}

/// Risk priority index of one risk.
///
/// The highest possible score is 9: high probability, high impact and a
/// reserve of at least one full workday.
pub fn priority_index(risk: &Risk) -> Decimal {
    let probability = Decimal::from(level_weight(risk.probability));
    let impact = Decimal::from(level_weight(risk.impact_severity));
    let urgency = (risk.risk_time_in_minutes / Decimal::from(time::MINUTES_PER_DAY))
        .min(Decimal::ONE)
        .max(Decimal::new(5, 1));
    probability * impact * urgency
}

/// Map a priority index to its severity band.
pub fn band(score: Decimal) -> RiskBand {
    if score >= Decimal::from(6) {
        RiskBand::Critical
    } else if score >= Decimal::from(4) {
        RiskBand::High
    } else if score >= Decimal::from(2) {
        RiskBand::Medium
    } else {
        RiskBand::Low
    }
}

/// One cell of the probability/impact matrix.
#[derive(Debug, Clone, Default)]
pub struct MatrixCell {
    pub risk_ids: Vec<String>,
    pub total_index: Decimal,
}

impl MatrixCell {
    /// Mean priority index of the risks in this cell, zero when empty.
    pub fn average_index(&self) -> Decimal {
        if self.risk_ids.is_empty() {
            Decimal::ZERO
        } else {
            self.total_index / Decimal::from(self.risk_ids.len())
        }
    }
}

/// Bucket risks into a 3x3 matrix.
///
/// Rows index by probability weight minus one, columns by impact weight
/// minus one, so `matrix[2][2]` holds the high/high corner.
pub fn matrix(risks: &[Risk]) -> [[MatrixCell; 3]; 3] {
    let mut cells: [[MatrixCell; 3]; 3] = Default::default();
    for risk in risks {
        let row = level_weight(risk.probability) as usize - 1;
        let col = level_weight(risk.impact_severity) as usize - 1;
        let cell = &mut cells[row][col];
        cell.total_index += priority_index(risk);
        cell.risk_ids.push(risk.id.clone());
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::TimeUnit;
    use rust_decimal_macros::dec;

    fn make_risk(minutes: i64, probability: RiskLevel, impact: RiskLevel) -> Risk {
        Risk::new(
            "risk",
            Decimal::from(minutes),
            TimeUnit::Minutes,
            probability,
            impact,
        )
    }

    #[test]
    fn test_level_weights() {
        assert_eq!(level_weight(RiskLevel::Low), 1);
        assert_eq!(level_weight(RiskLevel::Medium), 2);
        assert_eq!(level_weight(RiskLevel::High), 3);
    }

    #[test]
    fn test_priority_index_urgency_caps_at_one() {
        let risk = make_risk(600, RiskLevel::High, RiskLevel::High);
        assert_eq!(priority_index(&risk), dec!(9));
    }

    #[test]
    fn test_priority_index_urgency_floors_at_half() {
        let risk = make_risk(0, RiskLevel::Low, RiskLevel::Low);
        assert_eq!(priority_index(&risk), dec!(0.5));
        let risk = make_risk(120, RiskLevel::High, RiskLevel::Medium);
        assert_eq!(priority_index(&risk), dec!(3));
    }

    #[test]
    fn test_priority_index_partial_urgency() {
        let risk = make_risk(360, RiskLevel::High, RiskLevel::High);
        assert_eq!(priority_index(&risk), dec!(6.75));
    }

    #[test]
    fn test_band_thresholds() {
        assert_eq!(band(dec!(0.5)), RiskBand::Low);
        assert_eq!(band(dec!(1.99)), RiskBand::Low);
        assert_eq!(band(dec!(2)), RiskBand::Medium);
        assert_eq!(band(dec!(4)), RiskBand::High);
        assert_eq!(band(dec!(5.99)), RiskBand::High);
        assert_eq!(band(dec!(6)), RiskBand::Critical);
        assert_eq!(band(dec!(9)), RiskBand::Critical);
    }

    #[test]
    fn test_matrix_buckets_and_averages() {
        let risks = vec![
            make_risk(600, RiskLevel::High, RiskLevel::High),
            make_risk(240, RiskLevel::High, RiskLevel::High),
            make_risk(480, RiskLevel::Low, RiskLevel::Medium),
        ];
        let cells = matrix(&risks);
        assert_eq!(cells[2][2].risk_ids.len(), 2);
        assert_eq!(cells[2][2].average_index(), dec!(6.75));
        assert_eq!(cells[0][1].risk_ids.len(), 1);
        assert_eq!(cells[0][1].average_index(), dec!(2));
        assert_eq!(cells[1][1].risk_ids.len(), 0);
        assert_eq!(cells[1][1].average_index(), Decimal::ZERO);
    }
}
