//! 건물 부하를 지반 측 열부하로 바꾼다.
//!
//! 난방은 지반에서 열을 빼고(추출), 냉방은 압축기 동력까지 더해 지반에 열을 넣는다(주입).

use serde::{Deserialize, Serialize};

use crate::error::SizingError;
use crate::model::{validate_cop_heating, validate_eer_cooling, LoadProfile};

/// 연간 시간 [h]
pub const HOURS_PER_YEAR: f64 = 8760.0;
/// 월 평균 시간 [h]
pub const HOURS_PER_MONTH: f64 = 730.0;

/// 기본 월별 난방 형상 (합 = 1).
pub const DEFAULT_MONTHLY_HEATING: [f64; 12] = [
    0.155, 0.148, 0.125, 0.099, 0.064, 0.0, 0.0, 0.0, 0.061, 0.087, 0.117, 0.144,
];

/// 기본 월별 냉방 형상 (합 = 1).
pub const DEFAULT_MONTHLY_COOLING: [f64; 12] = [
    0.0, 0.0, 0.0, 0.05, 0.15, 0.25, 0.30, 0.25, 0.0, 0.0, 0.0, 0.0,
];

/// 월별 가중치가 모두 0 일 때 쓰는 최대 월 비율.
pub const FALLBACK_PERIODIC_FACTOR: f64 = 0.155;

/// 난방 지반 측 효율 계수 `(COP−1)/COP`.
pub fn heating_efficiency_factor(cop: f64) -> Result<f64, SizingError> {
    validate_cop_heating(cop)?;
    Ok((cop - 1.0) / cop)
}

/// 냉방 지반 측 효율 계수 `(EER+1)/EER`.
pub fn cooling_efficiency_factor(eer: f64) -> Result<f64, SizingError> {
    validate_eer_cooling(eer)?;
    Ok((eer + 1.0) / eer)
}

/// 가중치 중 최대 월 비율. 합으로 정규화하며, 합이 0 이면 기본값을 쓴다.
pub fn peak_month_fraction(factors: &[f64]) -> f64 {
    let sum: f64 = factors.iter().sum();
    if !(sum > 0.0) {
        return FALLBACK_PERIODIC_FACTOR;
    }
    factors.iter().fold(0.0_f64, |acc, f| acc.max(*f)) / sum
}

/// 3부하(기저/주기/최대) 분해 결과 [W]. 지반 측 값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreeLoads {
    /// 연평균 기저부하
    pub base_w: f64,
    /// 최악의 달 평균 부하
    pub periodic_w: f64,
    /// 순간 최대부하
    pub peak_w: f64,
}

/// 연간 에너지 [kWh], 최대 부하 [kW], 월별 가중치, 효율 계수로 3부하를 구한다.
pub fn three_loads(annual_kwh: f64, peak_kw: f64, factors: &[f64], efficiency: f64) -> ThreeLoads {
    let annual_ground_kwh = annual_kwh * efficiency;
    let month_ground_kwh = annual_kwh * peak_month_fraction(factors) * efficiency;
    ThreeLoads {
        base_w: annual_ground_kwh * 1000.0 / HOURS_PER_YEAR,
        periodic_w: month_ground_kwh * 1000.0 / HOURS_PER_MONTH,
        peak_w: peak_kw * 1000.0 * efficiency,
    }
}

/// 12개월 지반 부하 [W]. 추출/주입은 각각 0 이상.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyGroundLoads {
    pub extraction_w: [f64; 12],
    pub injection_w: [f64; 12],
    /// 난방 최대 추출 [W]
    pub peak_extraction_w: f64,
    /// 냉방 최대 주입 [W]
    pub peak_injection_w: f64,
}

impl MonthlyGroundLoads {
    /// 월 순부하 (추출 − 주입). 양수면 지반이 식는다.
    pub fn net_w(&self, month: usize) -> f64 {
        self.extraction_w[month % 12] - self.injection_w[month % 12]
    }

    /// 모든 값을 `1/n` 로 나눈 보어홀 하나의 부하.
    pub fn per_borehole(&self, n_boreholes: usize) -> Self {
        let n = n_boreholes.max(1) as f64;
        Self {
            extraction_w: self.extraction_w.map(|q| q / n),
            injection_w: self.injection_w.map(|q| q / n),
            peak_extraction_w: self.peak_extraction_w / n,
            peak_injection_w: self.peak_injection_w / n,
        }
    }
}

/// 부하 프로필을 월별 지반 부하로 나눈다.
///
/// 월 에너지 = 연간 × f(m)/Σf, 월 평균 출력 = 월 에너지 / 730 h.
pub fn monthly_ground_loads(loads: &LoadProfile) -> Result<MonthlyGroundLoads, SizingError> {
    loads.validate()?;
    let heat_eff = heating_efficiency_factor(loads.cop_heating)?;
    let cool_eff = cooling_efficiency_factor(loads.eer_cooling)?;

    let heating_shape = loads.monthly_heating.unwrap_or(DEFAULT_MONTHLY_HEATING);
    let cooling_shape = loads.monthly_cooling.unwrap_or(DEFAULT_MONTHLY_COOLING);

    Ok(MonthlyGroundLoads {
        extraction_w: distribute(
            loads.annual_heating_kwh * heat_eff,
            &heating_shape,
            &DEFAULT_MONTHLY_HEATING,
        ),
        injection_w: distribute(
            loads.annual_cooling_kwh * cool_eff,
            &cooling_shape,
            &DEFAULT_MONTHLY_COOLING,
        ),
        peak_extraction_w: loads.peak_heating_kw * 1000.0 * heat_eff,
        peak_injection_w: loads.peak_cooling_kw * 1000.0 * cool_eff,
    })
}

fn distribute(annual_kwh: f64, shape: &[f64; 12], fallback: &[f64; 12]) -> [f64; 12] {
    let sum: f64 = shape.iter().sum();
    let (shape, sum) = if sum > 0.0 {
        (shape, sum)
    } else {
        (fallback, fallback.iter().sum())
    };
    shape.map(|f| annual_kwh * f / sum * 1000.0 / HOURS_PER_MONTH)
}
