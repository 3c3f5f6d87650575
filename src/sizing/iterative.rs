//! 다년간 월별 중첩 시뮬레이션에 의한 심도 계산.
//!
//! 기준 심도에서 열저항(g 값, 유효 R_b)을 고정한 채 심도를 찾고, 그 결과로
//! 기준 심도를 다시 잡아 심도가 변하지 않을 때까지 반복한다.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, SizingError};
use crate::model::{
    BoreholeGeometry, DesignCase, FluidProperties, GroundProperties, GroutMaterial, LoadProfile,
    TemperatureLimits,
};
use crate::sizing::loads::{monthly_ground_loads, MonthlyGroundLoads};
use crate::thermal::g_function::{
    resistance_at, FiniteLineSource, ResponseFunction, MONTH_STEP_S, SIX_HOURS_S,
};
use crate::thermal::resistance::{
    borehole_resistances, configuration_effective_resistance, FlowDirection,
};
use crate::trace::TraceSink;

/// 반복 계산 한계와 허용오차.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// 극한 유체 온도와 한계의 허용 차 [K]
    pub temperature_tolerance_k: f64,
    /// 심도 변화 허용 차 [m]
    pub depth_tolerance_m: f64,
    /// 심도 탐색 최대 반복 횟수
    pub max_iterations: usize,
    /// 기준 심도 재설정 최대 횟수
    pub max_reseeds: usize,
    pub min_depth_m: f64,
    pub max_depth_m: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            temperature_tolerance_k: 0.05,
            depth_tolerance_m: 0.1,
            max_iterations: 100,
            max_reseeds: 20,
            min_depth_m: 10.0,
            max_depth_m: 400.0,
        }
    }
}

impl SolverSettings {
    pub fn validate(&self) -> Result<(), SizingError> {
        ensure_positive(self.temperature_tolerance_k, "온도 허용오차")?;
        ensure_positive(self.depth_tolerance_m, "심도 허용오차")?;
        ensure_positive(self.min_depth_m, "최소 심도")?;
        if self.max_depth_m <= self.min_depth_m {
            return Err(SizingError::configuration(format!(
                "최대 심도({:.1} m)가 최소 심도({:.1} m)보다 커야 합니다.",
                self.max_depth_m, self.min_depth_m
            )));
        }
        if self.max_iterations == 0 {
            return Err(SizingError::configuration("최대 반복 횟수는 1 이상이어야 합니다."));
        }
        Ok(())
    }
}

/// 반복 심도 계산 입력.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterativeInput {
    pub ground: GroundProperties,
    pub borehole: BoreholeGeometry,
    pub grout: GroutMaterial,
    pub fluid: FluidProperties,
    /// 보어홀 하나당 체적 유량 [m³/s]
    pub flow_rate_m3_s: f64,
    pub loads: LoadProfile,
    pub limits: TemperatureLimits,
    pub n_boreholes: usize,
    /// 시뮬레이션 연수
    pub years: usize,
    /// 초기 심도 추정 [m]
    pub initial_depth_m: f64,
}

/// 심도 계산 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    /// 보어홀 하나의 필요 심도 [m]
    pub required_depth_m: f64,
    pub n_boreholes: usize,
    /// 보어홀 열저항 R_b [m·K/W]
    pub borehole_resistance: f64,
    /// 지배 조건의 유효 열저항 R_b* [m·K/W]
    pub effective_resistance: f64,
    /// 최대 난방 시 단위 길이당 추출량 [W/m]
    pub heat_extraction_rate_w_per_m: f64,
    /// 전 기간 최저 유체 온도 [°C]
    pub fluid_temperature_min_c: f64,
    /// 전 기간 최고 유체 온도 [°C]
    pub fluid_temperature_max_c: f64,
    /// 마지막 해의 월평균 유체 온도 [°C]
    pub monthly_temperatures_c: [f64; 12],
    pub governing_case: DesignCase,
    /// 전체 심도 탐색 반복 횟수
    pub iterations: usize,
    /// 기준 심도 재설정 횟수
    pub reseeds: usize,
}

impl SizingResult {
    /// 전체 보어홀 길이 [m]
    pub fn total_length_m(&self) -> f64 {
        self.required_depth_m * self.n_boreholes as f64
    }
}

/// 다년간 월별 중첩으로 필요 심도를 구한다.
///
/// `response` 가 없으면 보어홀 하나의 유한 선열원을 쓴다. 어느 경우든 부하는
/// 보어홀 수로 나눈 값이 적용된다.
pub fn compute_iterative_depth(
    input: &IterativeInput,
    settings: &SolverSettings,
    response: Option<&dyn ResponseFunction>,
    trace: &dyn TraceSink,
) -> Result<SizingResult, SizingError> {
    validate(input, settings)?;

    let fls = FiniteLineSource::new(input.borehole.radius_m(), input.ground.thermal_diffusivity)?;
    let response: &dyn ResponseFunction = match response {
        Some(custom) => custom,
        None => &fls,
    };
    let loads = monthly_ground_loads(&input.loads)?.per_borehole(input.n_boreholes);

    let mut reference_depth = input
        .initial_depth_m
        .clamp(settings.min_depth_m, settings.max_depth_m);
    let mut iterations = 0;

    for reseed in 0..=settings.max_reseeds {
        let field = FieldResponse::evaluate(input, &loads, response, reference_depth)?;
        trace.record(
            "iterative.resistances",
            &[
                ("reference_depth_m", reference_depth),
                ("r_b", field.r_b),
                ("r_eff_heating", field.r_eff_heating),
                ("r_eff_cooling", field.r_eff_cooling),
                ("r_6h", field.r_peak),
            ],
        );

        let (depth, state, used) =
            search_depth(input, settings, &field, reference_depth, iterations, trace)?;
        iterations += used;

        if (depth - reference_depth).abs() <= settings.depth_tolerance_m {
            let governing_case = state.governing_case;
            let effective = match governing_case {
                DesignCase::Heating => field.r_eff_heating,
                DesignCase::Cooling => field.r_eff_cooling,
            };
            return Ok(SizingResult {
                required_depth_m: depth,
                n_boreholes: input.n_boreholes,
                borehole_resistance: field.r_b,
                effective_resistance: effective,
                heat_extraction_rate_w_per_m: loads.peak_extraction_w / depth,
                fluid_temperature_min_c: state.t_min,
                fluid_temperature_max_c: state.t_max,
                monthly_temperatures_c: state.last_year_mean,
                governing_case,
                iterations,
                reseeds: reseed,
            });
        }

        trace.record(
            "iterative.reseed",
            &[("from_m", reference_depth), ("to_m", depth)],
        );
        reference_depth = depth;
    }

    Err(SizingError::Convergence {
        iterations,
        depth_m: reference_depth,
        reason: format!(
            "기준 심도 재설정이 {}회 안에 안정되지 않았습니다.",
            settings.max_reseeds
        ),
    })
}

fn validate(input: &IterativeInput, settings: &SolverSettings) -> Result<(), SizingError> {
    settings.validate()?;
    input.ground.validate()?;
    input.borehole.validate()?;
    input.fluid.validate()?;
    input.limits.validate()?;
    input.loads.validate()?;
    ensure_positive(input.grout.thermal_conductivity, "그라우트 열전도율")?;
    ensure_positive(input.flow_rate_m3_s, "보어홀 유량")?;
    ensure_positive(input.initial_depth_m, "초기 심도")?;
    if input.n_boreholes == 0 {
        return Err(SizingError::configuration("보어홀 수는 1 이상이어야 합니다."));
    }
    if input.years == 0 {
        return Err(SizingError::configuration("시뮬레이션 연수는 1 이상이어야 합니다."));
    }
    Ok(())
}

/// 기준 심도에서 고정한 열저항과 월별 중첩 합.
struct FieldResponse {
    r_b: f64,
    r_eff_heating: f64,
    r_eff_cooling: f64,
    /// 6시간 지반 열저항
    r_peak: f64,
    /// 월 m 말의 `Σ (q_j − q_{j−1})·R(t_{m+1} − t_j)` [W·m·K/W]. 심도로 나누면 벽 온도 강하.
    wall_sums: Vec<f64>,
    /// 월 m 의 보어홀 순부하 [W]
    net_w: Vec<f64>,
    /// 월 m 의 난방 최대부하 초과분 [W]
    heating_excess_w: Vec<f64>,
    /// 월 m 의 냉방 최대부하 초과분 [W]
    cooling_excess_w: Vec<f64>,
}

impl FieldResponse {
    fn evaluate(
        input: &IterativeInput,
        loads: &MonthlyGroundLoads,
        response: &dyn ResponseFunction,
        depth_m: f64,
    ) -> Result<Self, SizingError> {
        let lambda = input.ground.thermal_conductivity;
        let mass_flow = input.flow_rate_m3_s * input.fluid.density;

        let mut r_eff = [0.0; 2];
        let mut r_b = 0.0;
        let directions = [FlowDirection::Heating, FlowDirection::Cooling];
        for (slot, direction) in directions.into_iter().enumerate() {
            let resistances = borehole_resistances(
                &input.borehole,
                input.grout.thermal_conductivity,
                lambda,
                &input.fluid,
                input.flow_rate_m3_s,
                direction,
            )?;
            if slot == 0 {
                r_b = resistances.r_b;
            }
            r_eff[slot] = configuration_effective_resistance(
                &input.borehole.pipes,
                &resistances,
                depth_m,
                mass_flow,
                input.fluid.heat_capacity,
            )?;
        }

        let months = input.years * 12;
        let step_resistance: Vec<f64> = (1..=months)
            .map(|k| resistance_at(response, k as f64 * MONTH_STEP_S, depth_m, lambda))
            .collect();
        if step_resistance.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(SizingError::configuration(
                "응답 함수가 유한한 양수 g 값을 주지 않습니다.",
            ));
        }

        let net_w: Vec<f64> = (0..months).map(|m| loads.net_w(m)).collect();
        let mut wall_sums = Vec::with_capacity(months);
        for m in 0..months {
            let mut sum = 0.0;
            let mut previous = 0.0;
            for (j, q) in net_w.iter().enumerate().take(m + 1) {
                sum += (q - previous) * step_resistance[m - j];
                previous = *q;
            }
            wall_sums.push(sum);
        }

        let heating_excess_w = (0..months)
            .map(|m| (loads.peak_extraction_w - loads.extraction_w[m % 12]).max(0.0))
            .collect();
        let cooling_excess_w = (0..months)
            .map(|m| (loads.peak_injection_w - loads.injection_w[m % 12]).max(0.0))
            .collect();

        Ok(Self {
            r_b,
            r_eff_heating: r_eff[0],
            r_eff_cooling: r_eff[1],
            r_peak: resistance_at(response, SIX_HOURS_S, depth_m, lambda),
            wall_sums,
            net_w,
            heating_excess_w,
            cooling_excess_w,
        })
    }

    /// 심도 `depth_m` 에서의 유체 온도 범위와 조건별 필요 심도.
    fn temperatures(
        &self,
        input: &IterativeInput,
        settings: &SolverSettings,
        depth_m: f64,
    ) -> Result<DepthState, SizingError> {
        let limits = &input.limits;
        let half_dt = limits.delta_t_fluid_k / 2.0;
        let t_ground = input.ground.mean_temperature_c(depth_m);

        // 심도에 반비례하는 온도 변화 성분 [K·m]
        let mut heating_demand = f64::NEG_INFINITY;
        let mut cooling_demand = f64::NEG_INFINITY;
        let months = self.net_w.len();
        let mut last_year_mean = [0.0; 12];
        for m in 0..months {
            let q = self.net_w[m];
            let r_mean = if q >= 0.0 { self.r_eff_heating } else { self.r_eff_cooling };
            let mean_drop = self.wall_sums[m] + q * r_mean;
            if m + 12 >= months {
                last_year_mean[m % 12] = t_ground - mean_drop / depth_m;
            }
            let low = self.wall_sums[m]
                + q * self.r_eff_heating
                + self.heating_excess_w[m] * (self.r_peak + self.r_eff_heating);
            let high = -self.wall_sums[m] - q * self.r_eff_cooling
                + self.cooling_excess_w[m] * (self.r_peak + self.r_eff_cooling);
            heating_demand = heating_demand.max(low);
            cooling_demand = cooling_demand.max(high);
        }

        let t_min = t_ground - heating_demand / depth_m - half_dt;
        let t_max = t_ground + cooling_demand / depth_m + half_dt;

        let required_heating = if heating_demand > 0.0 {
            let allowed = t_ground - limits.min_fluid_temperature_c - half_dt;
            if allowed <= 0.0 {
                return Err(SizingError::configuration(format!(
                    "최소 유체 온도 {:.1} °C 와 ΔT/2 = {:.1} K 가 평균 지중 온도 {:.1} °C 와 맞지 않습니다.",
                    limits.min_fluid_temperature_c, half_dt, t_ground
                )));
            }
            heating_demand / allowed
        } else {
            settings.min_depth_m
        };
        let required_cooling = if cooling_demand > 0.0 {
            let allowed = limits.max_fluid_temperature_c - t_ground - half_dt;
            if allowed <= 0.0 {
                return Err(SizingError::configuration(format!(
                    "최대 유체 온도 {:.1} °C 와 ΔT/2 = {:.1} K 가 평균 지중 온도 {:.1} °C 와 맞지 않습니다.",
                    limits.max_fluid_temperature_c, half_dt, t_ground
                )));
            }
            cooling_demand / allowed
        } else {
            settings.min_depth_m
        };

        let governing_case = if required_heating >= required_cooling {
            DesignCase::Heating
        } else {
            DesignCase::Cooling
        };

        Ok(DepthState {
            t_min,
            t_max,
            last_year_mean,
            required_heating,
            required_cooling,
            governing_case,
        })
    }
}

struct DepthState {
    t_min: f64,
    t_max: f64,
    last_year_mean: [f64; 12],
    required_heating: f64,
    required_cooling: f64,
    governing_case: DesignCase,
}

impl DepthState {
    fn required_depth(&self, settings: &SolverSettings) -> f64 {
        self.required_heating
            .max(self.required_cooling)
            .max(settings.min_depth_m)
    }

    /// 지배 조건의 온도가 한계에서 얼마나 떨어져 있는지 [K].
    fn limit_gap(&self, limits: &TemperatureLimits) -> f64 {
        match self.governing_case {
            DesignCase::Heating => (self.t_min - limits.min_fluid_temperature_c).abs(),
            DesignCase::Cooling => (self.t_max - limits.max_fluid_temperature_c).abs(),
        }
    }
}

/// 열저항을 고정한 채 심도를 갱신한다. 반환값은 (심도, 상태, 반복 횟수).
fn search_depth(
    input: &IterativeInput,
    settings: &SolverSettings,
    field: &FieldResponse,
    start_depth_m: f64,
    previous_iterations: usize,
    trace: &dyn TraceSink,
) -> Result<(f64, DepthState, usize), SizingError> {
    let mut depth = start_depth_m;
    for iteration in 1..=settings.max_iterations {
        let state = field.temperatures(input, settings, depth)?;
        let required = state.required_depth(settings);
        trace.record(
            "iterative.step",
            &[
                ("iteration", (previous_iterations + iteration) as f64),
                ("depth_m", depth),
                ("t_min_c", state.t_min),
                ("t_max_c", state.t_max),
                ("required_heating_m", state.required_heating),
                ("required_cooling_m", state.required_cooling),
            ],
        );

        if required > settings.max_depth_m {
            return Err(SizingError::Convergence {
                iterations: previous_iterations + iteration,
                depth_m: required,
                reason: format!(
                    "필요 심도가 최대 심도 {:.1} m 를 넘습니다.",
                    settings.max_depth_m
                ),
            });
        }

        let at_min_depth = required <= settings.min_depth_m && depth <= settings.min_depth_m;
        let near_limit = state.limit_gap(&input.limits) <= settings.temperature_tolerance_k;
        let settled =
            (required - depth).abs() <= settings.depth_tolerance_m || (!at_min_depth && near_limit);
        if settled || at_min_depth {
            let final_state = field.temperatures(input, settings, required)?;
            return Ok((required, final_state, iteration));
        }
        depth = required;
    }

    Err(SizingError::Convergence {
        iterations: previous_iterations + settings.max_iterations,
        depth_m: depth,
        reason: format!(
            "{}회 반복 안에 심도가 수렴하지 않았습니다.",
            settings.max_iterations
        ),
    })
}
