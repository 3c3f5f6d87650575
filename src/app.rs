use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{self, GroutAmount};
use crate::config::{validate_ranges, ConfigError, ProjectConfig};
use crate::error::SizingError;
use crate::hydraulics::{
    compute_hydraulics, required_flow_rate, HydraulicInput, HydraulicResult,
};
use crate::model::DesignCase;
use crate::sizing::loads::{cooling_efficiency_factor, heating_efficiency_factor};
use crate::sizing::{
    compute_iterative_depth, compute_vdi4640_converged, IterativeInput, SizingResult,
    Vdi4640Input, Vdi4640Result,
};
use crate::thermal::{borehole_resistances, BoreholeResistances, FlowDirection};
use crate::trace::TraceSink;

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("설정 오류: {0}")]
    Config(#[from] ConfigError),
    #[error("계산 오류: {0}")]
    Sizing(#[from] SizingError),
    #[error("보고서 직렬화 오류: {0}")]
    Report(#[from] toml::ser::Error),
}

/// 심도 계산 방법.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// 다년간 월별 중첩 반복법
    #[default]
    Iterative,
    /// VDI 4640 3부하법
    Vdi4640,
}

/// 방법별 상세 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingDetail {
    Iterative(SizingResult),
    Vdi4640(Vdi4640Result),
}

/// 최대 심도를 넘을 때 제안하는 배치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthAdvice {
    pub n_boreholes: usize,
    pub depth_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PumpSuggestion {
    pub code: String,
    pub name: String,
    pub score: f64,
}

/// 프로젝트에 지정한 펌프의 운전점 점검.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedPump {
    pub code: String,
    pub name: String,
    /// 여유율을 포함해 운전점을 감당하는지
    pub fits: bool,
    pub score: f64,
}

/// 프로젝트 계산 보고서. TOML 로 저장할 수 있다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectReport {
    pub project: String,
    pub method: Method,
    pub required_depth_m: f64,
    pub n_boreholes: usize,
    pub total_length_m: f64,
    pub design_case: DesignCase,
    /// 지중 추출 열량 [kW]
    pub extraction_power_kw: f64,
    /// 보어홀 하나당 유량 [m³/s]
    pub flow_per_borehole_m3_s: f64,
    pub warnings: Vec<String>,
    pub depth_advice: Option<DepthAdvice>,
    pub resistances: BoreholeResistances,
    pub sizing: SizingDetail,
    pub hydraulics: HydraulicResult,
    pub pumps: Vec<PumpSuggestion>,
    pub selected_pump: Option<SelectedPump>,
    pub grout: Option<GroutAmount>,
}

impl ProjectReport {
    pub fn to_toml(&self) -> Result<String, AppError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// 프로젝트를 계산한다. 범위 경고는 보고서에 담고 계산은 계속한다.
pub fn run(
    cfg: &ProjectConfig,
    method: Method,
    trace: &dyn TraceSink,
) -> Result<ProjectReport, AppError> {
    let mut warnings = validate_ranges(cfg);

    let ground = cfg.to_ground()?;
    let borehole = cfg.to_borehole()?;
    let grout = cfg.to_grout()?;
    let fluid_entry = cfg.fluid_entry()?;
    let fluid = cfg.to_fluid()?;
    let loads = cfg.to_loads()?;
    let chosen_pump = cfg.selected_pump()?;
    let limits = cfg.limits;
    limits.validate()?;
    let settings = cfg.solver.settings;
    let n_boreholes = cfg.borehole.n_boreholes;
    if n_boreholes == 0 {
        return Err(SizingError::configuration("보어홀 수는 1 이상이어야 합니다.").into());
    }

    let extraction_kw = loads.peak_heating_kw * heating_efficiency_factor(loads.cop_heating)?;
    let injection_kw = loads.peak_cooling_kw * cooling_efficiency_factor(loads.eer_cooling)?;
    // 열저항은 난방과 냉방 중 큰 지중 부하의 유량으로 평가한다.
    let design_flow = required_flow_rate(
        extraction_kw.max(injection_kw),
        limits.delta_t_fluid_k,
        fluid_entry.concentration_percent,
    )?;
    let flow_per_borehole = design_flow.m3_s / n_boreholes as f64;
    let resistances = borehole_resistances(
        &borehole,
        grout.thermal_conductivity,
        ground.thermal_conductivity,
        &fluid,
        flow_per_borehole,
        FlowDirection::Heating,
    )?;

    let (required_depth_m, design_case, sizing) = match method {
        Method::Iterative => {
            let input = IterativeInput {
                ground,
                borehole,
                grout,
                fluid,
                flow_rate_m3_s: flow_per_borehole,
                loads: loads.clone(),
                limits,
                n_boreholes,
                years: cfg.solver.years,
                initial_depth_m: cfg.borehole.initial_depth_m,
            };
            let result = compute_iterative_depth(&input, &settings, None, trace)?;
            (result.required_depth_m, result.governing_case, SizingDetail::Iterative(result))
        }
        Method::Vdi4640 => {
            let input = Vdi4640Input {
                ground,
                borehole_diameter_m: borehole.diameter_m,
                borehole_depth_initial_m: cfg.borehole.initial_depth_m,
                n_boreholes,
                r_borehole: cfg.borehole.r_borehole.unwrap_or(resistances.r_b),
                loads: loads.clone(),
                limits,
            };
            let result = compute_vdi4640_converged(
                &input,
                None,
                settings.depth_tolerance_m,
                settings.max_reseeds,
                trace,
            )?;
            (result.required_depth_final_m, result.design_case, SizingDetail::Vdi4640(result))
        }
    };
    tracing::info!(
        method = ?method,
        depth_m = required_depth_m,
        n_boreholes,
        case = %design_case,
        "심도 계산 완료"
    );

    let hydraulic_depth = required_depth_m.max(settings.min_depth_m);
    let h = &cfg.hydraulics;
    let hydraulics = compute_hydraulics(
        &HydraulicInput {
            extraction_power_kw: extraction_kw,
            delta_t_k: limits.delta_t_fluid_k,
            concentration_percent: fluid_entry.concentration_percent,
            borehole_depth_m: hydraulic_depth,
            n_boreholes,
            n_circuits: h.n_circuits.unwrap_or(n_boreholes),
            loops_per_borehole: borehole.pipes.loops_per_borehole(),
            pipe_inner_diameter_m: borehole.pipes.flow_pipe().inner_diameter_m,
            horizontal_length_m: h.horizontal_length_m,
            fittings_k_sum: h.fittings_k_sum,
            equipment_pressure_drop_bar: h.equipment_pressure_drop_bar,
            pump_efficiency: h.pump_efficiency,
            energy: cfg.to_energy_projection(),
        },
        trace,
    )?;
    warnings.extend(hydraulics.warnings.iter().cloned());

    let heat_pump_kw = h.heat_pump_kw.unwrap_or(loads.peak_heating_kw);
    let (flow, head) = (hydraulics.flow.m3_h, hydraulics.system.total_head_m);
    let pumps: Vec<PumpSuggestion> = catalog::suitable_pumps(flow, head, heat_pump_kw)
        .into_iter()
        .map(|m| PumpSuggestion {
            code: m.pump.code.to_string(),
            name: m.pump.name.to_string(),
            score: m.score,
        })
        .collect();
    if pumps.is_empty() && flow > 0.0 {
        warnings.push(format!(
            "운전점({flow:.2} m³/h, {head:.1} m)에 맞는 펌프가 카탈로그에 없습니다."
        ));
    }
    let selected_pump = chosen_pump.map(|pump| {
        let fits = pump.fits(flow, head);
        if !fits {
            warnings.push(format!(
                "지정한 펌프 {} 는 운전점({flow:.2} m³/h, {head:.1} m)을 감당하지 못합니다.",
                pump.code
            ));
        }
        SelectedPump {
            code: pump.code.to_string(),
            name: pump.name.to_string(),
            fits,
            score: pump.suitability_score(flow, head, heat_pump_kw),
        }
    });

    let grout_amount = cfg.grout_entry()?.map(|entry| {
        let volume = catalog::grout_volume_m3(
            borehole.diameter_m,
            borehole.pipes.flow_pipe().outer_diameter_m,
            borehole.pipes.legs(),
            required_depth_m,
            n_boreholes,
        );
        catalog::grout_amount(volume, entry)
    });

    let depth_advice = match cfg.borehole.max_depth_per_borehole_m {
        Some(max_depth) if required_depth_m > max_depth => {
            let advice = depth_advice(required_depth_m, n_boreholes, max_depth);
            if advice.is_none() {
                warnings.push(format!(
                    "심도 {required_depth_m:.1} m 가 최대 {max_depth:.1} m 를 넘습니다. \
                     보어홀 3개를 더해도 부족합니다."
                ));
            }
            advice
        }
        _ => None,
    };

    for w in &warnings {
        tracing::warn!("{w}");
    }

    Ok(ProjectReport {
        project: cfg.name.clone(),
        method,
        required_depth_m,
        n_boreholes,
        total_length_m: required_depth_m * n_boreholes as f64,
        design_case,
        extraction_power_kw: extraction_kw,
        flow_per_borehole_m3_s: flow_per_borehole,
        warnings,
        depth_advice,
        resistances,
        sizing,
        hydraulics,
        pumps,
        selected_pump,
        grout: grout_amount,
    })
}

/// 같은 총 길이를 최대 심도 안에 나눠 담는 보어홀 수 (최대 3개 추가).
pub fn depth_advice(depth_m: f64, n_boreholes: usize, max_depth_m: f64) -> Option<DepthAdvice> {
    let total = depth_m * n_boreholes as f64;
    (1..=3).map(|extra| n_boreholes + extra).find_map(|n| {
        let depth = total / n as f64;
        (depth <= max_depth_m).then_some(DepthAdvice { n_boreholes: n, depth_m: depth })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::NoopTrace;

    #[test]
    fn advice_splits_total_length() {
        let advice = depth_advice(180.0, 1, 100.0).expect("advice");
        assert_eq!(advice.n_boreholes, 2);
        assert!((advice.depth_m - 90.0).abs() < 1e-12);
        assert!(depth_advice(500.0, 1, 100.0).is_none());
    }

    #[test]
    fn default_project_runs_with_both_methods() {
        let cfg = ProjectConfig::default();
        for method in [Method::Iterative, Method::Vdi4640] {
            let report = run(&cfg, method, &NoopTrace).expect("report");
            assert!(report.required_depth_m > 0.0, "{method:?}");
            assert!(report.hydraulics.pump.electric_power_w > 0.0);
            assert!(report.grout.is_some());
        }
    }

    #[test]
    fn selected_pump_is_checked_against_operating_point() {
        let mut cfg = ProjectConfig::default();
        cfg.hydraulics.pump = Some("ST-25-6".to_string());
        let report = run(&cfg, Method::Vdi4640, &NoopTrace).expect("report");
        let selected = report.selected_pump.expect("selected pump");
        assert_eq!(selected.code, "ST-25-6");
        let flagged = report.warnings.iter().any(|w| w.contains("ST-25-6"));
        assert_eq!(flagged, !selected.fits);
    }

    #[test]
    fn unknown_pump_is_a_config_error() {
        let mut cfg = ProjectConfig::default();
        cfg.hydraulics.pump = Some("XX-99".to_string());
        let err = run(&cfg, Method::Vdi4640, &NoopTrace).expect_err("unknown pump");
        assert!(matches!(
            err,
            AppError::Config(ConfigError::UnknownReference { kind: "펌프", .. })
        ));
    }

    #[test]
    fn report_serialises_to_toml() {
        let report = run(&ProjectConfig::default(), Method::Vdi4640, &NoopTrace).expect("report");
        let text = report.to_toml().expect("toml");
        assert!(text.contains("required_depth_m"));
    }
}
