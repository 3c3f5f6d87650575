use serde::{Deserialize, Serialize};

use crate::error::SizingError;
use crate::units::{from_bar, to_m3_s, PressureUnit, VolumeFlowUnit};

/// 효율을 모를 때 쓰는 펌프 총효율
pub const DEFAULT_PUMP_EFFICIENCY: f64 = 0.5;
/// 인버터 제어 펌프의 정속 대비 소비 비율
pub const REGULATED_ENERGY_FACTOR: f64 = 0.55;
/// 수명 비용을 보는 기간 [년]
pub const LIFETIME_YEARS: f64 = 10.0;

/// 펌프 동력 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PumpPower {
    /// 수력 동력 [W]
    pub hydraulic_power_w: f64,
    /// 전기 입력 [W]
    pub electric_power_w: f64,
    pub electric_power_kw: f64,
}

/// 유량 [m³/h] 과 압력손실 [bar] 에서 펌프 동력을 구한다.
pub fn pump_power(
    flow_m3_h: f64,
    pressure_drop_bar: f64,
    efficiency: f64,
) -> Result<PumpPower, SizingError> {
    if !(efficiency.is_finite() && efficiency > 0.0 && efficiency <= 1.0) {
        return Err(SizingError::configuration(format!(
            "펌프 효율은 0 초과 1 이하여야 합니다 (입력: {efficiency})"
        )));
    }
    let flow_m3_s = to_m3_s(flow_m3_h, VolumeFlowUnit::CubicMeterPerHour).max(0.0);
    let hydraulic_power_w = flow_m3_s * from_bar(pressure_drop_bar.max(0.0), PressureUnit::Pascal);
    let electric_power_w = hydraulic_power_w / efficiency;
    Ok(PumpPower {
        hydraulic_power_w,
        electric_power_w,
        electric_power_kw: electric_power_w / 1000.0,
    })
}

/// 펌프 운전 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpControl {
    /// 정속 운전
    #[default]
    Constant,
    /// 인버터(차압) 제어
    Regulated,
}

/// 펌프 연간 에너지 입력.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpEnergyInput {
    /// 전기 입력 [W]
    pub electric_power_w: f64,
    /// 연간 운전 시간 [h]
    pub operating_hours: f64,
    /// 전력 단가 [원/kWh]
    pub electricity_price_per_kwh: f64,
    pub control: PumpControl,
    /// 인버터 펌프 추가 투자비 [원]. 있으면 정속 운전과 비교한다.
    #[serde(default)]
    pub regulated_premium: Option<f64>,
}

/// 정속 대비 인버터 제어 비교.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegulatedComparison {
    pub annual_kwh: f64,
    pub annual_cost: f64,
    /// 연간 절감액 [원/년]
    pub savings_annual: f64,
    /// 단순 회수기간 [년]. 절감이 없으면 None
    pub payback_years: Option<f64>,
}

/// 펌프 연간 에너지 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PumpEnergyResult {
    pub annual_kwh: f64,
    pub annual_cost: f64,
    pub lifetime_10y_kwh: f64,
    pub lifetime_10y_cost: f64,
    pub regulated: Option<RegulatedComparison>,
}

fn control_factor(control: PumpControl) -> f64 {
    match control {
        PumpControl::Constant => 1.0,
        PumpControl::Regulated => REGULATED_ENERGY_FACTOR,
    }
}

/// 연간 소비 전력량과 비용을 계산한다.
pub fn pump_energy(input: &PumpEnergyInput) -> Result<PumpEnergyResult, SizingError> {
    let checks = [
        (input.electric_power_w, "펌프 전기 입력"),
        (input.operating_hours, "운전 시간"),
        (input.electricity_price_per_kwh, "전력 단가"),
    ];
    for (value, what) in checks {
        if !value.is_finite() || value < 0.0 {
            return Err(SizingError::configuration(format!(
                "{what} 값은 0 이상이어야 합니다 (입력: {value})"
            )));
        }
    }

    let base_kwh = input.electric_power_w * input.operating_hours / 1000.0;
    let annual_kwh = base_kwh * control_factor(input.control);
    let annual_cost = annual_kwh * input.electricity_price_per_kwh;

    let regulated = match (input.control, input.regulated_premium) {
        (PumpControl::Constant, Some(premium)) => {
            let kwh = base_kwh * REGULATED_ENERGY_FACTOR;
            let cost = kwh * input.electricity_price_per_kwh;
            let savings_annual = annual_cost - cost;
            let payback_years = if savings_annual > 0.0 {
                Some(premium.max(0.0) / savings_annual)
            } else {
                None
            };
            Some(RegulatedComparison {
                annual_kwh: kwh,
                annual_cost: cost,
                savings_annual,
                payback_years,
            })
        }
        _ => None,
    };

    Ok(PumpEnergyResult {
        annual_kwh,
        annual_cost,
        lifetime_10y_kwh: annual_kwh * LIFETIME_YEARS,
        lifetime_10y_cost: annual_cost * LIFETIME_YEARS,
        regulated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_from_flow_and_pressure() {
        // 3.6 m³/h = 0.001 m³/s, 1 bar → 100 W 수력, 효율 0.5 → 200 W
        let p = pump_power(3.6, 1.0, 0.5).expect("valid");
        assert!((p.hydraulic_power_w - 100.0).abs() < 1e-9);
        assert!((p.electric_power_w - 200.0).abs() < 1e-9);
        assert!(pump_power(3.6, 1.0, 0.0).is_err());
    }

    #[test]
    fn constant_pump_energy() {
        let r = pump_energy(&PumpEnergyInput {
            electric_power_w: 100.0,
            operating_hours: 1800.0,
            electricity_price_per_kwh: 0.30,
            control: PumpControl::Constant,
            regulated_premium: None,
        })
        .expect("valid");
        assert!((r.annual_kwh - 180.0).abs() < 1e-9);
        assert!((r.annual_cost - 54.0).abs() < 1e-9);
        assert!((r.lifetime_10y_cost - 540.0).abs() < 1e-9);
        assert!(r.regulated.is_none());
    }

    #[test]
    fn regulated_comparison_pays_back() {
        let r = pump_energy(&PumpEnergyInput {
            electric_power_w: 100.0,
            operating_hours: 1800.0,
            electricity_price_per_kwh: 0.30,
            control: PumpControl::Constant,
            regulated_premium: Some(243.0),
        })
        .expect("valid");
        let cmp = r.regulated.expect("comparison");
        assert!((cmp.annual_kwh - 99.0).abs() < 1e-9);
        assert!((cmp.savings_annual - 24.3).abs() < 1e-9);
        assert!((cmp.payback_years.expect("payback") - 10.0).abs() < 1e-9);
    }

    #[test]
    fn zero_power_has_no_payback() {
        let r = pump_energy(&PumpEnergyInput {
            electric_power_w: 0.0,
            operating_hours: 1800.0,
            electricity_price_per_kwh: 0.30,
            control: PumpControl::Constant,
            regulated_premium: Some(100.0),
        })
        .expect("valid");
        assert_eq!(r.regulated.and_then(|c| c.payback_years), None);
    }
}
