//! 브라인 유량과 Darcy-Weisbach 압력손실.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, SizingError};
use crate::hydraulics::fluid::{fluid_properties, FluidLookup};
use crate::model::FlowRegime;
use crate::units::{from_bar, from_m3_s, to_bar, to_m3_s, PressureUnit, VolumeFlowUnit};

/// PE 관 절대 거칠기 [m] (0.0015 mm)
pub const PE_ROUGHNESS_M: f64 = 0.0015e-3;
/// 수평 연결관 추정 길이 [m]
pub const DEFAULT_HORIZONTAL_LENGTH_M: f64 = 50.0;
/// 히트펌프 증발기 등 기기 압력손실 [bar]
pub const DEFAULT_EQUIPMENT_PRESSURE_DROP_BAR: f64 = 0.5;

const GRAVITY: f64 = 9.81;

/// 필요 유량.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowRate {
    pub m3_s: f64,
    pub m3_h: f64,
    pub l_min: f64,
    pub l_s: f64,
    pub kg_s: f64,
}

/// 추출 열량 [kW] 을 온도차 [K] 로 나르는 데 필요한 유량.
pub fn required_flow_rate(
    power_kw: f64,
    delta_t_k: f64,
    concentration_percent: f64,
) -> Result<FlowRate, SizingError> {
    if !(delta_t_k.is_finite() && delta_t_k > 0.0) {
        return Err(SizingError::configuration(format!(
            "유체 온도차는 0보다 커야 합니다 (입력: {delta_t_k})"
        )));
    }
    if !(power_kw.is_finite() && power_kw >= 0.0) {
        return Err(SizingError::configuration(format!(
            "추출 열량은 0 이상이어야 합니다 (입력: {power_kw})"
        )));
    }
    let fluid = fluid_properties(concentration_percent);
    let kg_s = power_kw * 1000.0 / (fluid.heat_capacity * delta_t_k);
    let m3_s = kg_s / fluid.density;
    Ok(FlowRate {
        m3_s,
        m3_h: from_m3_s(m3_s, VolumeFlowUnit::CubicMeterPerHour),
        l_min: from_m3_s(m3_s, VolumeFlowUnit::LiterPerMinute),
        l_s: from_m3_s(m3_s, VolumeFlowUnit::LiterPerSecond),
        kg_s,
    })
}

/// Darcy 마찰계수. 층류 `64/Re`, 난류 Swamee–Jain.
pub fn friction_factor(reynolds: f64, roughness_m: f64, diameter_m: f64) -> f64 {
    if reynolds <= 0.0 {
        return 0.0;
    }
    match FlowRegime::from_reynolds(reynolds) {
        FlowRegime::Laminar => 64.0 / reynolds,
        FlowRegime::Turbulent => {
            let log_term = (roughness_m / (3.7 * diameter_m) + 5.74 / reynolds.powf(0.9)).log10();
            0.25 / (log_term * log_term)
        }
    }
}

/// 배관 한 구간 입력.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeRunInput {
    /// 길이 [m]
    pub length_m: f64,
    /// 내경 [m]
    pub inner_diameter_m: f64,
    /// 체적 유량 [m³/h]
    pub flow_m3_h: f64,
    /// 글리콜 농도 [%]
    pub concentration_percent: f64,
    /// 거칠기 [m]
    pub roughness_m: f64,
    /// 피팅 계수 총합 (K 값 합)
    pub fittings_k_sum: f64,
}

impl PipeRunInput {
    pub fn new(
        length_m: f64,
        inner_diameter_m: f64,
        flow_m3_h: f64,
        concentration_percent: f64,
    ) -> Self {
        Self {
            length_m,
            inner_diameter_m,
            flow_m3_h,
            concentration_percent,
            roughness_m: PE_ROUGHNESS_M,
            fittings_k_sum: 0.0,
        }
    }
}

/// 배관 한 구간 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeRunResult {
    /// 유속 [m/s]
    pub velocity_m_per_s: f64,
    pub reynolds: f64,
    pub regime: FlowRegime,
    pub friction_factor: f64,
    /// 마찰 손실 [Pa]
    pub friction_pa: f64,
    /// 피팅 손실 [Pa]
    pub fittings_pa: f64,
    /// 합계 [Pa]
    pub pressure_drop_pa: f64,
    pub pressure_drop_bar: f64,
    pub pressure_drop_mbar: f64,
}

impl PipeRunResult {
    fn zero() -> Self {
        Self {
            velocity_m_per_s: 0.0,
            reynolds: 0.0,
            regime: FlowRegime::Laminar,
            friction_factor: 0.0,
            friction_pa: 0.0,
            fittings_pa: 0.0,
            pressure_drop_pa: 0.0,
            pressure_drop_bar: 0.0,
            pressure_drop_mbar: 0.0,
        }
    }
}

/// Darcy-Weisbach 식으로 한 구간의 압력손실을 계산한다.
///
/// ΔP = (f·L/D + ΣK)·ρ·v²/2. 유량 0 이면 모두 0, 층류로 보고한다.
pub fn pressure_drop(input: &PipeRunInput) -> Result<PipeRunResult, SizingError> {
    ensure_positive(input.inner_diameter_m, "배관 내경")?;
    if !(input.length_m.is_finite() && input.length_m >= 0.0) {
        return Err(SizingError::geometry(format!(
            "배관 길이는 0 이상이어야 합니다 (입력: {})",
            input.length_m
        )));
    }
    if !(input.flow_m3_h.is_finite() && input.flow_m3_h >= 0.0) {
        return Err(SizingError::configuration(format!(
            "유량은 0 이상이어야 합니다 (입력: {})",
            input.flow_m3_h
        )));
    }
    if input.flow_m3_h == 0.0 {
        return Ok(PipeRunResult::zero());
    }

    let fluid = fluid_properties(input.concentration_percent);
    let flow_m3_s = to_m3_s(input.flow_m3_h, VolumeFlowUnit::CubicMeterPerHour);
    let area = PI * input.inner_diameter_m * input.inner_diameter_m / 4.0;
    let velocity = flow_m3_s / area;
    let reynolds = fluid.density * velocity * input.inner_diameter_m / fluid.viscosity;
    let f = friction_factor(reynolds, input.roughness_m, input.inner_diameter_m);

    let dynamic = fluid.density * velocity * velocity / 2.0;
    let friction_pa = f * (input.length_m / input.inner_diameter_m) * dynamic;
    let fittings_pa = input.fittings_k_sum.max(0.0) * dynamic;
    let total = friction_pa + fittings_pa;
    let total_bar = to_bar(total, PressureUnit::Pascal);

    Ok(PipeRunResult {
        velocity_m_per_s: velocity,
        reynolds,
        regime: FlowRegime::from_reynolds(reynolds),
        friction_factor: f,
        friction_pa,
        fittings_pa,
        pressure_drop_pa: total,
        pressure_drop_bar: total_bar,
        pressure_drop_mbar: from_bar(total_bar, PressureUnit::MilliBar),
    })
}

/// 보어홀 필드 전체 압력손실 입력.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInput {
    pub borehole_depth_m: f64,
    pub n_boreholes: usize,
    /// 병렬 회로 수
    pub n_circuits: usize,
    /// 보어홀 하나의 병렬 루프 수 (이중 U관 = 2)
    pub loops_per_borehole: usize,
    pub pipe_inner_diameter_m: f64,
    /// 전체 유량 [m³/h]
    pub flow_total_m3_h: f64,
    pub concentration_percent: f64,
    /// 수평 연결관 길이 [m]
    pub horizontal_length_m: f64,
    pub fittings_k_sum: f64,
    /// 기기 압력손실 [bar]. 유량이 있을 때만 더한다.
    pub equipment_pressure_drop_bar: f64,
    pub roughness_m: f64,
}

impl SystemInput {
    /// 기본 수평관 길이, 기기 손실, PE 거칠기를 쓰는 입력.
    pub fn new(
        borehole_depth_m: f64,
        n_boreholes: usize,
        n_circuits: usize,
        pipe_inner_diameter_m: f64,
        flow_total_m3_h: f64,
        concentration_percent: f64,
    ) -> Self {
        Self {
            borehole_depth_m,
            n_boreholes,
            n_circuits,
            loops_per_borehole: 1,
            pipe_inner_diameter_m,
            flow_total_m3_h,
            concentration_percent,
            horizontal_length_m: DEFAULT_HORIZONTAL_LENGTH_M,
            fittings_k_sum: 0.0,
            equipment_pressure_drop_bar: DEFAULT_EQUIPMENT_PRESSURE_DROP_BAR,
            roughness_m: PE_ROUGHNESS_M,
        }
    }
}

/// 원인별 압력손실 내역.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemResult {
    pub fluid: FluidLookup,
    /// 회로 하나의 배관 경로 길이 [m]
    pub pipe_length_per_circuit_m: f64,
    pub flow_per_circuit_m3_h: f64,
    pub flow_per_loop_m3_h: f64,
    /// 보어홀 레그 구간
    pub borehole_legs: PipeRunResult,
    /// 수평 연결관 구간
    pub horizontal: PipeRunResult,
    pub fittings_pa: f64,
    pub equipment_pa: f64,
    pub total_pressure_drop_pa: f64,
    pub total_pressure_drop_bar: f64,
    pub total_pressure_drop_mbar: f64,
    /// 양정 [m]
    pub total_head_m: f64,
}

/// 레그(직렬), 루프(병렬), 수평관, 피팅, 기기 손실을 더한다.
pub fn system_pressure_drop(input: &SystemInput) -> Result<SystemResult, SizingError> {
    if input.n_boreholes == 0 || input.n_circuits == 0 || input.loops_per_borehole == 0 {
        return Err(SizingError::configuration(
            "보어홀 수, 회로 수, 루프 수는 1 이상이어야 합니다.",
        ));
    }
    ensure_positive(input.borehole_depth_m, "보어홀 심도")?;

    let boreholes_per_circuit = input.n_boreholes as f64 / input.n_circuits as f64;
    let flow_per_circuit = input.flow_total_m3_h / input.n_circuits as f64;
    let flow_per_loop = flow_per_circuit / input.loops_per_borehole as f64;
    let leg_length = boreholes_per_circuit * 2.0 * input.borehole_depth_m;

    let legs = pressure_drop(&PipeRunInput {
        length_m: leg_length,
        inner_diameter_m: input.pipe_inner_diameter_m,
        flow_m3_h: flow_per_loop,
        concentration_percent: input.concentration_percent,
        roughness_m: input.roughness_m,
        fittings_k_sum: 0.0,
    })?;
    let horizontal = pressure_drop(&PipeRunInput {
        length_m: input.horizontal_length_m,
        inner_diameter_m: input.pipe_inner_diameter_m,
        flow_m3_h: flow_per_circuit,
        concentration_percent: input.concentration_percent,
        roughness_m: input.roughness_m,
        fittings_k_sum: input.fittings_k_sum,
    })?;

    let equipment_pa = if input.flow_total_m3_h > 0.0 {
        from_bar(input.equipment_pressure_drop_bar.max(0.0), PressureUnit::Pascal)
    } else {
        0.0
    };
    let total = legs.pressure_drop_pa + horizontal.pressure_drop_pa + equipment_pa;
    let total_bar = to_bar(total, PressureUnit::Pascal);
    let fluid = fluid_properties(input.concentration_percent);

    Ok(SystemResult {
        fluid,
        pipe_length_per_circuit_m: leg_length + input.horizontal_length_m,
        flow_per_circuit_m3_h: flow_per_circuit,
        flow_per_loop_m3_h: flow_per_loop,
        borehole_legs: legs,
        horizontal,
        fittings_pa: horizontal.fittings_pa,
        equipment_pa,
        total_pressure_drop_pa: total,
        total_pressure_drop_bar: total_bar,
        total_pressure_drop_mbar: from_bar(total_bar, PressureUnit::MilliBar),
        total_head_m: total / (fluid.density * GRAVITY),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_kilowatt_flow_is_plausible() {
        let flow = required_flow_rate(6.0, 3.0, 25.0).expect("valid");
        assert!(flow.m3_h > 0.5 && flow.m3_h < 3.0);
        assert!((flow.l_min - flow.m3_h * 1000.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn zero_power_gives_zero_flow() {
        let flow = required_flow_rate(0.0, 3.0, 25.0).expect("valid");
        assert_eq!(flow.m3_s, 0.0);
        assert!(required_flow_rate(6.0, 0.0, 25.0).is_err());
    }

    #[test]
    fn regime_boundary_at_2300() {
        assert_eq!(FlowRegime::from_reynolds(2299.9), FlowRegime::Laminar);
        assert_eq!(FlowRegime::from_reynolds(2300.0), FlowRegime::Turbulent);
        assert!((friction_factor(1000.0, PE_ROUGHNESS_M, 0.026) - 0.064).abs() < 1e-12);
    }

    #[test]
    fn turbulent_friction_is_in_smooth_pipe_range() {
        let f = friction_factor(10_000.0, PE_ROUGHNESS_M, 0.026);
        assert!(f > 0.028 && f < 0.034, "f = {f}");
    }

    #[test]
    fn zero_flow_gives_zero_drop() {
        let result = pressure_drop(&PipeRunInput::new(200.0, 0.026, 0.0, 25.0)).expect("valid");
        assert_eq!(result.pressure_drop_pa, 0.0);
        assert_eq!(result.velocity_m_per_s, 0.0);
        assert_eq!(result.regime, FlowRegime::Laminar);
    }

    #[test]
    fn units_are_consistent() {
        let result = pressure_drop(&PipeRunInput::new(200.0, 0.026, 1.5, 25.0)).expect("valid");
        assert!((result.pressure_drop_mbar - result.pressure_drop_bar * 1000.0).abs() < 1e-9);
        assert!(result.reynolds > 100.0 && result.reynolds < 50_000.0);
    }

    #[test]
    fn equipment_loss_only_with_flow() {
        let idle =
            system_pressure_drop(&SystemInput::new(100.0, 1, 1, 0.026, 0.0, 25.0)).expect("idle");
        assert_eq!(idle.total_pressure_drop_pa, 0.0);
        let running = system_pressure_drop(&SystemInput::new(100.0, 1, 1, 0.026, 1.5, 25.0))
            .expect("running");
        assert!(running.total_pressure_drop_bar > DEFAULT_EQUIPMENT_PRESSURE_DROP_BAR);
        assert!(running.pipe_length_per_circuit_m > 200.0);
    }
}
