//! 브라인 회로 수력 계산: 유량, 압력손실, 펌프 동력과 운전비.

pub mod fluid;
pub mod pressure;
pub mod pump;

use serde::{Deserialize, Serialize};

use crate::error::SizingError;
use crate::model::FlowRegime;
use crate::trace::TraceSink;

pub use fluid::{fluid_properties, FluidLookup};
pub use pressure::{
    friction_factor, pressure_drop, required_flow_rate, system_pressure_drop, FlowRate,
    PipeRunInput, PipeRunResult, SystemInput, SystemResult, DEFAULT_EQUIPMENT_PRESSURE_DROP_BAR,
    DEFAULT_HORIZONTAL_LENGTH_M, PE_ROUGHNESS_M,
};
pub use pump::{
    pump_energy, pump_power, PumpControl, PumpEnergyInput, PumpEnergyResult, PumpPower,
    RegulatedComparison, DEFAULT_PUMP_EFFICIENCY, REGULATED_ENERGY_FACTOR,
};

/// 권장 유체 온도차 범위 [K]
pub const RECOMMENDED_DELTA_T_K: (f64, f64) = (3.0, 5.0);
/// 난류 유지를 위한 보어홀당 최소 유량 [m³/h]
pub const MIN_FLOW_PER_BOREHOLE_M3_H: f64 = 2.1;

/// 연간 운전비 추정 조건.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyProjection {
    /// 연간 운전 시간 [h]
    pub operating_hours: f64,
    /// 전력 단가 [원/kWh]
    pub electricity_price_per_kwh: f64,
    #[serde(default)]
    pub control: PumpControl,
    #[serde(default)]
    pub regulated_premium: Option<f64>,
}

/// 수력 계산 입력.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydraulicInput {
    /// 지중 추출 열량 [kW]
    pub extraction_power_kw: f64,
    /// 유체 온도차 [K]
    pub delta_t_k: f64,
    pub concentration_percent: f64,
    pub borehole_depth_m: f64,
    pub n_boreholes: usize,
    pub n_circuits: usize,
    pub loops_per_borehole: usize,
    pub pipe_inner_diameter_m: f64,
    pub horizontal_length_m: f64,
    pub fittings_k_sum: f64,
    pub equipment_pressure_drop_bar: f64,
    pub pump_efficiency: f64,
    pub energy: Option<EnergyProjection>,
}

impl HydraulicInput {
    pub fn new(
        extraction_power_kw: f64,
        delta_t_k: f64,
        concentration_percent: f64,
        borehole_depth_m: f64,
        n_boreholes: usize,
        pipe_inner_diameter_m: f64,
    ) -> Self {
        Self {
            extraction_power_kw,
            delta_t_k,
            concentration_percent,
            borehole_depth_m,
            n_boreholes,
            n_circuits: n_boreholes,
            loops_per_borehole: 1,
            pipe_inner_diameter_m,
            horizontal_length_m: DEFAULT_HORIZONTAL_LENGTH_M,
            fittings_k_sum: 0.0,
            equipment_pressure_drop_bar: DEFAULT_EQUIPMENT_PRESSURE_DROP_BAR,
            pump_efficiency: DEFAULT_PUMP_EFFICIENCY,
            energy: None,
        }
    }
}

/// 수력 계산 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydraulicResult {
    pub fluid: FluidLookup,
    pub flow: FlowRate,
    pub system: SystemResult,
    pub pump: PumpPower,
    pub energy: Option<PumpEnergyResult>,
    pub warnings: Vec<String>,
}

impl HydraulicResult {
    /// 보어홀 레그 유동 영역.
    pub fn regime(&self) -> FlowRegime {
        self.system.borehole_legs.regime
    }
}

/// 유량 → 시스템 압력손실 → 펌프 동력 → (선택) 운전비 순으로 계산한다.
pub fn compute_hydraulics(
    input: &HydraulicInput,
    trace: &dyn TraceSink,
) -> Result<HydraulicResult, SizingError> {
    let flow = required_flow_rate(
        input.extraction_power_kw,
        input.delta_t_k,
        input.concentration_percent,
    )?;
    let fluid = fluid_properties(input.concentration_percent);

    let system = system_pressure_drop(&SystemInput {
        borehole_depth_m: input.borehole_depth_m,
        n_boreholes: input.n_boreholes,
        n_circuits: input.n_circuits,
        loops_per_borehole: input.loops_per_borehole,
        pipe_inner_diameter_m: input.pipe_inner_diameter_m,
        flow_total_m3_h: flow.m3_h,
        concentration_percent: input.concentration_percent,
        horizontal_length_m: input.horizontal_length_m,
        fittings_k_sum: input.fittings_k_sum,
        equipment_pressure_drop_bar: input.equipment_pressure_drop_bar,
        roughness_m: PE_ROUGHNESS_M,
    })?;
    trace.record(
        "hydraulics.pressure",
        &[
            ("flow_m3_h", flow.m3_h),
            ("reynolds", system.borehole_legs.reynolds),
            ("legs_pa", system.borehole_legs.pressure_drop_pa),
            ("horizontal_pa", system.horizontal.pressure_drop_pa),
            ("equipment_pa", system.equipment_pa),
            ("total_bar", system.total_pressure_drop_bar),
        ],
    );

    let pump = pump_power(flow.m3_h, system.total_pressure_drop_bar, input.pump_efficiency)?;
    let energy = match &input.energy {
        Some(projection) => Some(pump_energy(&PumpEnergyInput {
            electric_power_w: pump.electric_power_w,
            operating_hours: projection.operating_hours,
            electricity_price_per_kwh: projection.electricity_price_per_kwh,
            control: projection.control,
            regulated_premium: projection.regulated_premium,
        })?),
        None => None,
    };
    trace.record(
        "hydraulics.pump",
        &[
            ("hydraulic_w", pump.hydraulic_power_w),
            ("electric_w", pump.electric_power_w),
            ("annual_kwh", energy.map(|e| e.annual_kwh).unwrap_or(0.0)),
        ],
    );

    let mut warnings = flow_rate_warnings(input.delta_t_k, flow.m3_h, input.n_boreholes);
    if fluid.clamped {
        warnings.push(format!(
            "농도 {:.1} % 는 물성표 범위 밖입니다. {:.0} % 값으로 계산했습니다.",
            input.concentration_percent, fluid.concentration_percent
        ));
    }
    if flow.m3_h > 0.0 && system.borehole_legs.regime == FlowRegime::Laminar {
        warnings.push(format!(
            "보어홀 배관 유동이 층류입니다 (Re {:.0} < 2300). 열전달이 나빠집니다.",
            system.borehole_legs.reynolds
        ));
    }

    Ok(HydraulicResult {
        fluid,
        flow,
        system,
        pump,
        energy,
        warnings,
    })
}

/// 온도차와 보어홀당 유량에 대한 권장값 점검.
pub fn flow_rate_warnings(delta_t_k: f64, flow_total_m3_h: f64, n_boreholes: usize) -> Vec<String> {
    let mut warnings = Vec::new();
    let (low, high) = RECOMMENDED_DELTA_T_K;
    if delta_t_k < low || delta_t_k > high {
        warnings.push(format!(
            "유체 온도차 {:.1} K 가 권장 범위({low:.0}~{high:.0} K)를 벗어납니다.",
            delta_t_k
        ));
    }
    if n_boreholes > 0 && flow_total_m3_h > 0.0 {
        let per_borehole = flow_total_m3_h / n_boreholes as f64;
        if per_borehole < MIN_FLOW_PER_BOREHOLE_M3_H {
            warnings.push(format!(
                "보어홀당 유량 {:.2} m³/h (<{MIN_FLOW_PER_BOREHOLE_M3_H}). 난류 확보가 어렵습니다.",
                per_borehole
            ));
        }
    }
    warnings
}
