//! VDI 4640 (Koenigsdorff) 3부하 방식 보어홀 길이 계산.
//!
//! 난방/냉방 각각을 기저(10년), 주기(1개월), 최대(6시간) 부하로 나누고
//! 시간 척도별 지반 열저항으로 필요 길이를 구한다. 더 긴 쪽이 설계를 지배한다.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, SizingError};
use crate::model::{DesignCase, GroundProperties, LoadProfile, TemperatureLimits};
use crate::sizing::loads::{
    cooling_efficiency_factor, heating_efficiency_factor, three_loads, ThreeLoads,
    DEFAULT_MONTHLY_COOLING, DEFAULT_MONTHLY_HEATING,
};
use crate::thermal::g_function::{
    FiniteLineSource, ResponseFunction, ONE_MONTH_S, SIX_HOURS_S, TEN_YEARS_S,
};
use crate::trace::TraceSink;

/// 출구 온도에서 빼는 유체 온도차 비율 (VDI 4640 관례값).
pub const EXIT_FLUID_FRACTION: f64 = 0.5;

/// VDI 4640 계산 입력.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vdi4640Input {
    pub ground: GroundProperties,
    /// 보어홀 직경 [m]
    pub borehole_diameter_m: f64,
    /// 지반 열저항 계산에 쓰는 기준 심도 [m]
    pub borehole_depth_initial_m: f64,
    pub n_boreholes: usize,
    /// 보어홀 열저항 R_b [m·K/W]
    pub r_borehole: f64,
    /// 냉방 측은 `eer_cooling` 을 냉방 COP 로 쓴다.
    pub loads: LoadProfile,
    pub limits: TemperatureLimits,
}

/// 세 시간 척도의 g 값과 지반 열저항.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundResponse {
    pub g_base: f64,
    pub g_periodic: f64,
    pub g_peak: f64,
    /// 10년 [m·K/W]
    pub r_base: f64,
    /// 1개월 [m·K/W]
    pub r_periodic: f64,
    /// 6시간 [m·K/W]
    pub r_peak: f64,
}

/// 난방 또는 냉방 한쪽의 계산 내역.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaseBreakdown {
    /// 지반 측 3부하 [W]
    pub loads: ThreeLoads,
    /// 이 경우만으로 필요한 길이 [m]
    pub required_depth_m: f64,
    /// 최종 길이에서의 온도 변화 성분 [K]
    pub delta_t_base_k: f64,
    pub delta_t_periodic_k: f64,
    pub delta_t_peak_k: f64,
    pub delta_t_fluid_k: f64,
    /// 최종 길이에서의 히트펌프 출구(브라인) 온도 [°C]
    pub exit_temperature_c: f64,
}

/// VDI 4640 계산 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vdi4640Result {
    /// 지배 조건 길이 = max(난방, 냉방) [m]
    pub required_depth_final_m: f64,
    pub design_case: DesignCase,
    pub n_boreholes: usize,
    pub heating: CaseBreakdown,
    pub cooling: CaseBreakdown,
    pub ground_response: GroundResponse,
    /// 보어홀 열저항 R_b [m·K/W]
    pub r_borehole: f64,
    /// 지반 열저항을 계산한 심도 [m]
    pub reference_depth_m: f64,
    /// 기준 심도 재설정 횟수 (단일 계산은 0)
    pub reseeds: usize,
}

impl Vdi4640Result {
    pub fn required_depth_heating_m(&self) -> f64 {
        self.heating.required_depth_m
    }

    pub fn required_depth_cooling_m(&self) -> f64 {
        self.cooling.required_depth_m
    }

    /// 전체 보어홀 길이 [m]
    pub fn total_length_m(&self) -> f64 {
        self.required_depth_final_m * self.n_boreholes as f64
    }
}

/// 기준 심도에서 한 번 계산한다.
///
/// `response` 가 없으면 보어홀 하나의 유한 선열원을 쓴다.
pub fn compute_vdi4640(
    input: &Vdi4640Input,
    response: Option<&dyn ResponseFunction>,
    trace: &dyn TraceSink,
) -> Result<Vdi4640Result, SizingError> {
    validate(input)?;
    let fls = FiniteLineSource::new(
        input.borehole_diameter_m / 2.0,
        input.ground.thermal_diffusivity,
    )?;
    let response: &dyn ResponseFunction = match response {
        Some(custom) => custom,
        None => &fls,
    };

    let ground_response = ground_response(
        response,
        input.borehole_depth_initial_m,
        input.ground.thermal_conductivity,
    );
    trace.record(
        "vdi4640.resistances",
        &[
            ("reference_depth_m", input.borehole_depth_initial_m),
            ("r_base", ground_response.r_base),
            ("r_periodic", ground_response.r_periodic),
            ("r_peak", ground_response.r_peak),
            ("g_base", ground_response.g_base),
            ("g_periodic", ground_response.g_periodic),
            ("g_peak", ground_response.g_peak),
        ],
    );

    let loads = &input.loads;
    let heating_loads = three_loads(
        loads.annual_heating_kwh,
        loads.peak_heating_kw,
        &loads.monthly_heating.unwrap_or(DEFAULT_MONTHLY_HEATING),
        heating_efficiency_factor(loads.cop_heating)?,
    );
    let cooling_loads = three_loads(
        loads.annual_cooling_kwh,
        loads.peak_cooling_kw,
        &loads.monthly_cooling.unwrap_or(DEFAULT_MONTHLY_COOLING),
        cooling_efficiency_factor(loads.eer_cooling)?,
    );
    trace.record(
        "vdi4640.loads",
        &[
            ("heating_base_w", heating_loads.base_w),
            ("heating_periodic_w", heating_loads.periodic_w),
            ("heating_peak_w", heating_loads.peak_w),
            ("cooling_base_w", cooling_loads.base_w),
            ("cooling_periodic_w", cooling_loads.periodic_w),
            ("cooling_peak_w", cooling_loads.peak_w),
        ],
    );

    let t_ground = input.ground.undisturbed_temperature_c;
    let reaction_heating = t_ground - input.limits.min_fluid_temperature_c;
    if reaction_heating <= 0.0 {
        return Err(SizingError::configuration(format!(
            "난방 온도차가 {reaction_heating:.2} K 입니다. 최소 유체 온도 {:.1} °C 는 비교란 지중 온도 {t_ground:.1} °C 보다 낮아야 합니다.",
            input.limits.min_fluid_temperature_c
        )));
    }
    let reaction_cooling = input.limits.max_fluid_temperature_c - t_ground;
    if reaction_cooling <= 0.0 {
        return Err(SizingError::configuration(format!(
            "냉방 온도차가 {reaction_cooling:.2} K 입니다. 최대 유체 온도 {:.1} °C 는 비교란 지중 온도 {t_ground:.1} °C 보다 높아야 합니다.",
            input.limits.max_fluid_temperature_c
        )));
    }

    let depth_heating = borehole_length(&heating_loads, &ground_response, input, reaction_heating);
    let depth_cooling = borehole_length(&cooling_loads, &ground_response, input, reaction_cooling);
    let (depth_final, design_case) = if depth_heating > depth_cooling {
        (depth_heating, DesignCase::Heating)
    } else {
        (depth_cooling, DesignCase::Cooling)
    };
    if !(depth_final.is_finite() && depth_final > 0.0) {
        return Err(SizingError::configuration(
            "난방과 냉방 부하가 모두 0 이라 보어홀 길이를 정할 수 없습니다.",
        ));
    }
    trace.record(
        "vdi4640.length",
        &[
            ("depth_heating_m", depth_heating),
            ("depth_cooling_m", depth_cooling),
            ("depth_final_m", depth_final),
        ],
    );

    let heating = breakdown(
        heating_loads,
        depth_heating,
        depth_final,
        &ground_response,
        input,
        DesignCase::Heating,
    );
    let cooling = breakdown(
        cooling_loads,
        depth_cooling,
        depth_final,
        &ground_response,
        input,
        DesignCase::Cooling,
    );
    trace.record(
        "vdi4640.exit_temperature",
        &[
            ("heating_c", heating.exit_temperature_c),
            ("cooling_c", cooling.exit_temperature_c),
        ],
    );

    Ok(Vdi4640Result {
        required_depth_final_m: depth_final,
        design_case,
        n_boreholes: input.n_boreholes,
        heating,
        cooling,
        ground_response,
        r_borehole: input.r_borehole,
        reference_depth_m: input.borehole_depth_initial_m,
        reseeds: 0,
    })
}

/// 결과 길이로 기준 심도를 다시 잡아 길이가 안정될 때까지 반복한다.
pub fn compute_vdi4640_converged(
    input: &Vdi4640Input,
    response: Option<&dyn ResponseFunction>,
    depth_tolerance_m: f64,
    max_iterations: usize,
    trace: &dyn TraceSink,
) -> Result<Vdi4640Result, SizingError> {
    ensure_positive(depth_tolerance_m, "심도 허용오차")?;
    let mut current = input.clone();
    for reseed in 0..=max_iterations {
        let mut result = compute_vdi4640(&current, response, trace)?;
        let change = (result.required_depth_final_m - current.borehole_depth_initial_m).abs();
        if change <= depth_tolerance_m {
            result.reseeds = reseed;
            return Ok(result);
        }
        trace.record(
            "vdi4640.reseed",
            &[
                ("from_m", current.borehole_depth_initial_m),
                ("to_m", result.required_depth_final_m),
            ],
        );
        current.borehole_depth_initial_m = result.required_depth_final_m;
    }
    Err(SizingError::Convergence {
        iterations: max_iterations,
        depth_m: current.borehole_depth_initial_m,
        reason: format!("VDI 4640 길이가 {max_iterations}회 재계산 안에 안정되지 않았습니다."),
    })
}

fn validate(input: &Vdi4640Input) -> Result<(), SizingError> {
    input.ground.validate()?;
    input.limits.validate()?;
    input.loads.validate()?;
    ensure_positive(input.borehole_diameter_m, "보어홀 직경")?;
    ensure_positive(input.borehole_depth_initial_m, "기준 심도")?;
    ensure_positive(input.r_borehole, "보어홀 열저항")?;
    if input.n_boreholes == 0 {
        return Err(SizingError::configuration("보어홀 수는 1 이상이어야 합니다."));
    }
    Ok(())
}

fn ground_response(
    response: &dyn ResponseFunction,
    depth_m: f64,
    conductivity: f64,
) -> GroundResponse {
    let g_base = response.g(TEN_YEARS_S, depth_m);
    let g_periodic = response.g(ONE_MONTH_S, depth_m);
    let g_peak = response.g(SIX_HOURS_S, depth_m);
    let to_r = |g: f64| g / (2.0 * std::f64::consts::PI * conductivity);
    GroundResponse {
        g_base,
        g_periodic,
        g_peak,
        r_base: to_r(g_base),
        r_periodic: to_r(g_periodic),
        r_peak: to_r(g_peak),
    }
}

/// `H = Σ|Q_x|(R_x + R_b) / (ΔT_reaction · n)`
fn borehole_length(
    loads: &ThreeLoads,
    ground: &GroundResponse,
    input: &Vdi4640Input,
    reaction_k: f64,
) -> f64 {
    let rb = input.r_borehole;
    let numerator = loads.base_w.abs() * (ground.r_base + rb)
        + loads.periodic_w.abs() * (ground.r_periodic + rb)
        + loads.peak_w.abs() * (ground.r_peak + rb);
    numerator / (reaction_k * input.n_boreholes as f64)
}

/// 최종 길이에서 온도 성분과 출구 온도를 구한다.
fn breakdown(
    loads: ThreeLoads,
    required_depth_m: f64,
    final_depth_m: f64,
    ground: &GroundResponse,
    input: &Vdi4640Input,
    case: DesignCase,
) -> CaseBreakdown {
    let rb = input.r_borehole;
    let total_length = final_depth_m * input.n_boreholes as f64;
    let per_metre = |q: f64| if total_length > 0.0 { q.abs() / total_length } else { 0.0 };

    let delta_t_base_k = per_metre(loads.base_w) * (ground.r_base + rb);
    let delta_t_periodic_k = per_metre(loads.periodic_w) * (ground.r_periodic + rb);
    let delta_t_peak_k = per_metre(loads.peak_w) * (ground.r_peak + rb);
    let sign = match case {
        DesignCase::Heating => -1.0,
        DesignCase::Cooling => 1.0,
    };
    let delta_t_fluid_k = input.limits.delta_t_fluid_k;
    let exit_temperature_c = input.ground.undisturbed_temperature_c
        + sign * (delta_t_base_k + delta_t_periodic_k + delta_t_peak_k)
        - EXIT_FLUID_FRACTION * delta_t_fluid_k;

    CaseBreakdown {
        loads,
        required_depth_m,
        delta_t_base_k,
        delta_t_periodic_k,
        delta_t_peak_k,
        delta_t_fluid_k,
        exit_temperature_c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{MemoryTrace, NoopTrace};

    fn reference_input() -> Vdi4640Input {
        Vdi4640Input {
            ground: GroundProperties {
                thermal_conductivity: 2.0,
                thermal_diffusivity: 1.0e-6,
                undisturbed_temperature_c: 10.0,
                geothermal_gradient_k_per_m: 0.0,
            },
            borehole_diameter_m: 0.152,
            borehole_depth_initial_m: 100.0,
            n_boreholes: 1,
            r_borehole: 0.1,
            loads: LoadProfile {
                annual_heating_kwh: 10_000.0,
                annual_cooling_kwh: 3_000.0,
                peak_heating_kw: 6.0,
                peak_cooling_kw: 4.0,
                cop_heating: 4.0,
                eer_cooling: 4.0,
                monthly_heating: None,
                monthly_cooling: None,
            },
            limits: TemperatureLimits::default(),
        }
    }

    #[test]
    fn heating_governs_reference_house() {
        let result = compute_vdi4640(&reference_input(), None, &NoopTrace).expect("valid");
        assert_eq!(result.design_case, DesignCase::Heating);
        assert!(result.required_depth_final_m > 0.0);
        assert_eq!(
            result.required_depth_final_m,
            result.required_depth_heating_m().max(result.required_depth_cooling_m())
        );
        assert!(result.heating.exit_temperature_c < 10.0);
        assert!(result.cooling.exit_temperature_c > 10.0);
    }

    #[test]
    fn heating_loads_match_hand_calculation() {
        let result = compute_vdi4640(&reference_input(), None, &NoopTrace).expect("valid");
        assert!((result.heating.loads.base_w - 856.16).abs() < 0.01);
        assert!((result.heating.loads.peak_w - 4500.0).abs() < 1e-9);
        assert!((result.cooling.loads.peak_w - 5000.0).abs() < 1e-9);
    }

    #[test]
    fn ground_above_limit_is_configuration_error() {
        let mut input = reference_input();
        input.limits.min_fluid_temperature_c = 12.0;
        let err = compute_vdi4640(&input, None, &NoopTrace).expect_err("limit above ground");
        assert!(matches!(err, SizingError::Configuration(_)));
    }

    #[test]
    fn load_free_profile_is_rejected() {
        let mut input = reference_input();
        input.loads.annual_heating_kwh = 0.0;
        input.loads.peak_heating_kw = 0.0;
        input.loads.annual_cooling_kwh = 0.0;
        input.loads.peak_cooling_kw = 0.0;
        let err = compute_vdi4640(&input, None, &NoopTrace).expect_err("no load");
        assert!(matches!(err, SizingError::Configuration(_)));
        assert!(compute_vdi4640_converged(&input, None, 0.01, 50, &NoopTrace).is_err());
    }

    #[test]
    fn cooling_only_profile_still_has_positive_depth() {
        let mut input = reference_input();
        input.loads.annual_heating_kwh = 0.0;
        input.loads.peak_heating_kw = 0.0;
        let result = compute_vdi4640(&input, None, &NoopTrace).expect("cooling only");
        assert_eq!(result.design_case, DesignCase::Cooling);
        assert!(result.required_depth_final_m > 0.0);
    }

    #[test]
    fn converged_length_is_a_fixed_point() {
        let input = reference_input();
        let converged =
            compute_vdi4640_converged(&input, None, 0.01, 50, &NoopTrace).expect("settles");
        let mut again = input.clone();
        again.borehole_depth_initial_m = converged.required_depth_final_m;
        let rerun = compute_vdi4640(&again, None, &NoopTrace).expect("rerun");
        assert!((rerun.required_depth_final_m - converged.required_depth_final_m).abs() <= 0.01);
    }

    #[test]
    fn trace_records_each_step() {
        let trace = MemoryTrace::new();
        let result = compute_vdi4640(&reference_input(), None, &trace).expect("valid");
        assert_eq!(
            trace.value("vdi4640.length", "depth_final_m"),
            Some(result.required_depth_final_m)
        );
        assert!(trace.value("vdi4640.loads", "heating_base_w").is_some());
    }
}
