//! 보어홀 열저항 계산.
//!
//! 유체 → 보어홀 벽 사이의 단위 길이당 열저항 R_b 와 레그 간 내부 열저항 R_a 를
//! 배관 배치별로 구한다. 결과는 모두 [m·K/W].

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, SizingError};
use crate::model::{BoreholeGeometry, DesignCase, FlowRegime, FluidProperties, PipeConfiguration};

/// 층류 완전발달 유동의 누셀트 수 (등열유속).
pub const LAMINAR_NUSSELT: f64 = 4.36;

/// 이중 U관 R_b 보정 계수 (단일 U관 대비).
pub const DOUBLE_U_RB_FACTOR: f64 = 0.7;
/// 이중 U관 R_a 보정 계수 (단일 U관 대비).
pub const DOUBLE_U_RA_FACTOR: f64 = 0.5;

/// 유체 가열/냉각 방향. Dittus–Boelter 지수를 고른다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    /// 지반이 유체를 데운다 (난방 운전, n = 0.4)
    #[default]
    Heating,
    /// 지반이 유체를 식힌다 (냉방 운전, n = 0.3)
    Cooling,
}

impl FlowDirection {
    pub fn dittus_boelter_exponent(&self) -> f64 {
        match self {
            FlowDirection::Heating => 0.4,
            FlowDirection::Cooling => 0.3,
        }
    }
}

impl From<DesignCase> for FlowDirection {
    fn from(case: DesignCase) -> Self {
        match case {
            DesignCase::Heating => FlowDirection::Heating,
            DesignCase::Cooling => FlowDirection::Cooling,
        }
    }
}

/// 관내 대류 계산 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvectionResult {
    /// 평균 유속 [m/s]
    pub velocity_m_per_s: f64,
    pub reynolds: f64,
    pub prandtl: f64,
    pub nusselt: f64,
    pub regime: FlowRegime,
    /// 대류 열저항 [m·K/W]
    pub resistance: f64,
}

/// 배관 배치별 열저항 묶음.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoreholeResistances {
    /// 유체 → 보어홀 벽 열저항 [m·K/W]
    pub r_b: f64,
    /// 레그 간 내부 열저항 [m·K/W]
    pub r_a: f64,
    /// R_b 에 포함된 관벽 전도 저항 (레그 하나)
    pub r_pipe: f64,
    /// R_b 에 포함된 대류 저항 (레그 하나)
    pub r_conv: f64,
}

/// 원통 관벽 전도 저항 `ln(do/di) / (2πλ)`.
pub fn pipe_wall_resistance(
    inner_diameter_m: f64,
    outer_diameter_m: f64,
    conductivity: f64,
) -> Result<f64, SizingError> {
    ensure_positive(inner_diameter_m, "배관 내경")?;
    ensure_positive(conductivity, "배관 열전도율")?;
    if inner_diameter_m >= outer_diameter_m {
        return Err(SizingError::geometry(format!(
            "배관 내경({inner_diameter_m:.4} m)은 외경({outer_diameter_m:.4} m)보다 작아야 합니다."
        )));
    }
    Ok((outer_diameter_m / inner_diameter_m).ln() / (2.0 * PI * conductivity))
}

/// 층류는 4.36, 난류는 Dittus–Boelter `0.023 Re^0.8 Pr^n`.
pub fn nusselt_number(reynolds: f64, prandtl: f64, direction: FlowDirection) -> f64 {
    match FlowRegime::from_reynolds(reynolds) {
        FlowRegime::Laminar => LAMINAR_NUSSELT,
        FlowRegime::Turbulent => {
            0.023 * reynolds.powf(0.8) * prandtl.powf(direction.dittus_boelter_exponent())
        }
    }
}

/// 원관 내 강제대류. 유량은 해당 관 하나를 지나는 체적 유량 [m³/s].
pub fn convection(
    inner_diameter_m: f64,
    flow_m3_s: f64,
    fluid: &FluidProperties,
    direction: FlowDirection,
) -> Result<ConvectionResult, SizingError> {
    ensure_positive(inner_diameter_m, "배관 내경")?;
    ensure_positive(flow_m3_s, "유량")?;
    fluid.validate()?;

    let area = PI * inner_diameter_m * inner_diameter_m / 4.0;
    let velocity = flow_m3_s / area;
    let reynolds = fluid.density * velocity * inner_diameter_m / fluid.viscosity;
    let prandtl = fluid.prandtl();
    let nusselt = nusselt_number(reynolds, prandtl, direction);

    Ok(ConvectionResult {
        velocity_m_per_s: velocity,
        reynolds,
        prandtl,
        nusselt,
        regime: FlowRegime::from_reynolds(reynolds),
        resistance: 1.0 / (PI * nusselt * fluid.thermal_conductivity),
    })
}

/// [`convection`] 의 열저항만 돌려준다.
pub fn convective_resistance(
    inner_diameter_m: f64,
    flow_m3_s: f64,
    fluid: &FluidProperties,
    direction: FlowDirection,
) -> Result<f64, SizingError> {
    Ok(convection(inner_diameter_m, flow_m3_s, fluid, direction)?.resistance)
}

/// 배관 배치별 R_b, R_a 를 계산한다.
///
/// `flow_m3_s` 는 보어홀 하나를 지나는 전체 체적 유량이다.
pub fn borehole_resistances(
    borehole: &BoreholeGeometry,
    grout_conductivity: f64,
    ground_conductivity: f64,
    fluid: &FluidProperties,
    flow_m3_s: f64,
    direction: FlowDirection,
) -> Result<BoreholeResistances, SizingError> {
    borehole.validate()?;
    ensure_positive(grout_conductivity, "그라우트 열전도율")?;
    ensure_positive(ground_conductivity, "지반 열전도율")?;

    match &borehole.pipes {
        PipeConfiguration::SingleU {
            pipe,
            shank_spacing_m,
        }
        | PipeConfiguration::DoubleU {
            pipe,
            shank_spacing_m,
        } => {
            let r_pipe = pipe_wall_resistance(
                pipe.inner_diameter_m,
                pipe.outer_diameter_m,
                pipe.thermal_conductivity,
            )?;
            let r_conv = convective_resistance(pipe.inner_diameter_m, flow_m3_s, fluid, direction)?;
            let (r_b, r_a) = single_u_multipole(
                borehole.radius_m(),
                pipe.outer_radius_m(),
                shank_spacing_m / 2.0,
                grout_conductivity,
                ground_conductivity,
                r_pipe + r_conv,
            );
            // 이중 U관은 단일 U관 값에 보정 계수를 곱한다.
            let (rb_factor, ra_factor) = match borehole.pipes {
                PipeConfiguration::DoubleU { .. } => (DOUBLE_U_RB_FACTOR, DOUBLE_U_RA_FACTOR),
                _ => (1.0, 1.0),
            };
            finish(r_b * rb_factor, r_a * ra_factor, r_pipe, r_conv)
        }
        PipeConfiguration::Coaxial { outer, inner } => {
            // 내관
            let inner_conv =
                convective_resistance(inner.inner_diameter_m, flow_m3_s, fluid, direction)?;
            let inner_wall = pipe_wall_resistance(
                inner.inner_diameter_m,
                inner.outer_diameter_m,
                inner.thermal_conductivity,
            )?;

            // 환형부
            let h_annulus = annulus_heat_transfer_coefficient(
                outer.inner_diameter_m,
                inner.outer_diameter_m,
                flow_m3_s,
                fluid,
                direction,
            )?;
            let annulus_outer = 1.0 / (PI * outer.inner_diameter_m * h_annulus);
            let annulus_inner = 1.0 / (PI * inner.outer_diameter_m * h_annulus);

            let outer_wall = pipe_wall_resistance(
                outer.inner_diameter_m,
                outer.outer_diameter_m,
                outer.thermal_conductivity,
            )?;
            let grout = (borehole.diameter_m / outer.outer_diameter_m).ln()
                / (2.0 * PI * grout_conductivity);

            finish(
                grout + outer_wall + annulus_outer,
                inner_conv + inner_wall + annulus_inner,
                outer_wall,
                annulus_outer,
            )
        }
    }
}

/// Hellström 유효 보어홀 열저항 `R_b + (1/(3 R_a))·(H/(ṁ c_p))²`.
///
/// `mass_flow_kg_s` 는 보어홀 하나의 질량 유량.
pub fn effective_resistance(
    r_b: f64,
    r_a: f64,
    depth_m: f64,
    mass_flow_kg_s: f64,
    heat_capacity: f64,
) -> Result<f64, SizingError> {
    ensure_positive(r_b, "보어홀 열저항 R_b")?;
    ensure_positive(r_a, "내부 열저항 R_a")?;
    ensure_positive(depth_m, "보어홀 심도")?;
    ensure_positive(mass_flow_kg_s, "질량 유량")?;
    ensure_positive(heat_capacity, "유체 비열")?;
    let ratio = depth_m / (mass_flow_kg_s * heat_capacity);
    Ok(r_b + ratio * ratio / (3.0 * r_a))
}

/// 배관 배치를 반영한 유효 열저항.
///
/// 이중 U관은 보정 전(단일 U관) R_b, R_a 로 Hellström 식을 풀고 결과 전체에
/// R_b 보정 계수를 곱한다. 같은 조건의 단일 U관 값보다 커지지 않는다.
pub fn configuration_effective_resistance(
    pipes: &PipeConfiguration,
    resistances: &BoreholeResistances,
    depth_m: f64,
    mass_flow_kg_s: f64,
    heat_capacity: f64,
) -> Result<f64, SizingError> {
    match pipes {
        PipeConfiguration::DoubleU { .. } => {
            let single = effective_resistance(
                resistances.r_b / DOUBLE_U_RB_FACTOR,
                resistances.r_a / DOUBLE_U_RA_FACTOR,
                depth_m,
                mass_flow_kg_s,
                heat_capacity,
            )?;
            Ok(single * DOUBLE_U_RB_FACTOR)
        }
        _ => effective_resistance(
            resistances.r_b,
            resistances.r_a,
            depth_m,
            mass_flow_kg_s,
            heat_capacity,
        ),
    }
}

/// 1차 다극(multipole) 근사. 반환값은 (R_b, R_a).
///
/// `half_spacing_m` 은 보어홀 중심에서 레그 중심까지 거리 D.
fn single_u_multipole(
    borehole_radius_m: f64,
    pipe_radius_m: f64,
    half_spacing_m: f64,
    grout_conductivity: f64,
    ground_conductivity: f64,
    pipe_resistance: f64,
) -> (f64, f64) {
    let rb = borehole_radius_m;
    let rp = pipe_radius_m;
    let d = half_spacing_m;
    let lambda_b = grout_conductivity;

    let sigma = (lambda_b - ground_conductivity) / (lambda_b + ground_conductivity);
    let beta = 2.0 * PI * lambda_b * pipe_resistance;
    let p = (1.0 - beta) / (1.0 + beta);

    let rb2 = rb * rb;
    let rb4 = rb2 * rb2;
    let d2 = d * d;
    let d4 = d2 * d2;

    let zeroth = beta
        + (rb / rp).ln()
        + (rb / (2.0 * d)).ln()
        + sigma * (rb4 / (rb4 - d4)).ln();

    let ratio = rp * rp / (4.0 * d2);
    let a = ratio * (1.0 - sigma * 4.0 * d4 / (rb4 - d4)).powi(2);
    let b = ratio * (1.0 + sigma * 16.0 * d4 * rb4 / (rb4 * rb4 - d4 * d4));
    let first_order = p * a / (1.0 + p * b);

    let r_b = (zeroth - first_order) / (4.0 * PI * lambda_b);
    let r_a =
        (beta + (2.0 * d / rp).ln() + sigma * ((rb2 + d2) / (rb2 - d2)).ln()) / (PI * lambda_b);
    (r_b, r_a)
}

/// 동축관 환형부의 열전달계수 [W/m²·K]. 수력직경 `D_oi − d_io` 기준.
fn annulus_heat_transfer_coefficient(
    outer_inner_diameter_m: f64,
    inner_outer_diameter_m: f64,
    flow_m3_s: f64,
    fluid: &FluidProperties,
    direction: FlowDirection,
) -> Result<f64, SizingError> {
    ensure_positive(flow_m3_s, "유량")?;
    let hydraulic_diameter = outer_inner_diameter_m - inner_outer_diameter_m;
    ensure_positive(hydraulic_diameter, "환형부 수력직경")?;
    let area = PI / 4.0
        * (outer_inner_diameter_m * outer_inner_diameter_m
            - inner_outer_diameter_m * inner_outer_diameter_m);
    let velocity = flow_m3_s / area;
    let reynolds = fluid.density * velocity * hydraulic_diameter / fluid.viscosity;
    let nusselt = nusselt_number(reynolds, fluid.prandtl(), direction);
    Ok(nusselt * fluid.thermal_conductivity / hydraulic_diameter)
}

fn finish(
    r_b: f64,
    r_a: f64,
    r_pipe: f64,
    r_conv: f64,
) -> Result<BoreholeResistances, SizingError> {
    if !(r_b.is_finite() && r_b > 0.0 && r_a.is_finite() && r_a > 0.0) {
        return Err(SizingError::geometry(format!(
            "열저항이 양수가 아닙니다 (R_b = {r_b}, R_a = {r_a}). 배관 배치를 확인하세요."
        )));
    }
    Ok(BoreholeResistances {
        r_b,
        r_a,
        r_pipe,
        r_conv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PipeGeometry;

    fn brine() -> FluidProperties {
        FluidProperties {
            density: 1040.0,
            viscosity: 0.0045,
            heat_capacity: 3950.0,
            thermal_conductivity: 0.45,
            concentration_percent: 30.0,
        }
    }

    fn pe32() -> PipeGeometry {
        PipeGeometry::from_wall(0.032, 0.003, 0.42)
    }

    fn single_u() -> BoreholeGeometry {
        BoreholeGeometry {
            diameter_m: 0.152,
            pipes: PipeConfiguration::SingleU {
                pipe: pe32(),
                shank_spacing_m: 0.052,
            },
        }
    }

    #[test]
    fn pipe_wall_matches_closed_form() {
        let r = pipe_wall_resistance(0.026, 0.032, 0.42).expect("valid pipe");
        let expected = (0.032_f64 / 0.026).ln() / (2.0 * PI * 0.42);
        assert!((r - expected).abs() < 1e-12);
        assert!(r > 0.05 && r < 0.1);
    }

    #[test]
    fn pipe_wall_rejects_inverted_diameters() {
        assert!(matches!(
            pipe_wall_resistance(0.032, 0.026, 0.42),
            Err(SizingError::Geometry(_))
        ));
        assert!(pipe_wall_resistance(0.026, 0.032, 0.0).is_err());
    }

    #[test]
    fn convection_switches_regime_at_2300() {
        let slow = convection(0.026, 0.00005, &brine(), FlowDirection::Heating).expect("laminar");
        assert_eq!(slow.regime, FlowRegime::Laminar);
        assert_eq!(slow.nusselt, LAMINAR_NUSSELT);

        let fast = convection(0.026, 0.0004, &brine(), FlowDirection::Heating).expect("turbulent");
        assert_eq!(fast.regime, FlowRegime::Turbulent);
        assert!(fast.resistance < slow.resistance);
    }

    #[test]
    fn convection_rejects_zero_flow() {
        assert!(convective_resistance(0.026, 0.0, &brine(), FlowDirection::Heating).is_err());
    }

    #[test]
    fn heating_exponent_gives_higher_nusselt_for_viscous_brine() {
        let heating = nusselt_number(10_000.0, 40.0, FlowDirection::Heating);
        let cooling = nusselt_number(10_000.0, 40.0, FlowDirection::Cooling);
        assert!(heating > cooling);
    }

    fn resistances(
        borehole: &BoreholeGeometry,
        grout: f64,
        flow: f64,
    ) -> Result<BoreholeResistances, SizingError> {
        borehole_resistances(borehole, grout, 2.0, &brine(), flow, FlowDirection::Heating)
    }

    fn double_u(pipe: PipeGeometry, shank_spacing_m: f64) -> BoreholeGeometry {
        BoreholeGeometry {
            diameter_m: 0.152,
            pipes: PipeConfiguration::DoubleU {
                pipe,
                shank_spacing_m,
            },
        }
    }

    #[test]
    fn single_u_resistances_in_typical_range() {
        let r = resistances(&single_u(), 1.3, 0.0004).expect("valid single-u");
        assert!(r.r_b > 0.05 && r.r_b < 0.25, "R_b = {}", r.r_b);
        assert!(r.r_a > r.r_b, "R_a = {}", r.r_a);
    }

    #[test]
    fn better_grout_lowers_rb() {
        let low = resistances(&single_u(), 0.8, 0.0004).expect("low grout");
        let high = resistances(&single_u(), 2.0, 0.0004).expect("high grout");
        assert!(high.r_b < low.r_b);
    }

    #[test]
    fn double_u_applies_correction_factors() {
        let single = resistances(&single_u(), 1.3, 0.0004).expect("single");
        let double = resistances(&double_u(pe32(), 0.052), 1.3, 0.0004).expect("double");
        assert!((double.r_b - single.r_b * DOUBLE_U_RB_FACTOR).abs() < 1e-12);
        assert!((double.r_a - single.r_a * DOUBLE_U_RA_FACTOR).abs() < 1e-12);
    }

    #[test]
    fn coaxial_resistances_are_positive() {
        let coax = BoreholeGeometry {
            diameter_m: 0.152,
            pipes: PipeConfiguration::Coaxial {
                outer: PipeGeometry::from_wall(0.110, 0.010, 0.42),
                inner: PipeGeometry::from_wall(0.050, 0.0046, 0.42),
            },
        };
        let r = resistances(&coax, 1.3, 0.0008).expect("valid coaxial");
        assert!(r.r_b > 0.0 && r.r_a > 0.0);
    }

    #[test]
    fn spacing_wider_than_borehole_is_rejected() {
        let bad = BoreholeGeometry {
            diameter_m: 0.152,
            pipes: PipeConfiguration::SingleU {
                pipe: pe32(),
                shank_spacing_m: 0.2,
            },
        };
        assert!(matches!(resistances(&bad, 1.3, 0.0004), Err(SizingError::Geometry(_))));
    }

    #[test]
    fn pipe_bundle_wider_than_borehole_is_rejected() {
        // 4 × 40 mm = 160 mm > 152 mm
        let bad = double_u(PipeGeometry::from_wall(0.040, 0.0037, 0.42), 0.06);
        match resistances(&bad, 1.3, 0.0004) {
            Err(SizingError::Geometry(msg)) => assert!(msg.contains("배관 묶음"), "{msg}"),
            other => panic!("expected geometry error, got {other:?}"),
        }

        // 같은 배관이라도 단일 U관(2 × 40 mm)은 들어간다.
        let fits = BoreholeGeometry {
            diameter_m: 0.152,
            pipes: PipeConfiguration::SingleU {
                pipe: PipeGeometry::from_wall(0.040, 0.0037, 0.42),
                shank_spacing_m: 0.06,
            },
        };
        assert!(resistances(&fits, 1.3, 0.0004).is_ok());
    }

    #[test]
    fn double_u_effective_resistance_never_exceeds_single_u() {
        let double = double_u(pe32(), 0.052);
        for flow in [0.0008, 0.0004, 0.0002, 0.0001, 0.00005] {
            let rs = resistances(&single_u(), 1.3, flow).expect("single");
            let rd = resistances(&double, 1.3, flow).expect("double");
            let mass_flow = flow * brine().density;
            let single_pipes = single_u().pipes;
            for depth in [50.0, 150.0, 300.0] {
                let single = configuration_effective_resistance(
                    &single_pipes,
                    &rs,
                    depth,
                    mass_flow,
                    3950.0,
                )
                .expect("single eff");
                let double = configuration_effective_resistance(
                    &double.pipes,
                    &rd,
                    depth,
                    mass_flow,
                    3950.0,
                )
                .expect("double eff");
                assert!(double <= single, "flow {flow}, H {depth}: {double} > {single}");
            }
        }
    }

    #[test]
    fn effective_resistance_exceeds_rb() {
        let eff = effective_resistance(0.12, 0.45, 100.0, 0.4, 3950.0).expect("valid");
        assert!(eff > 0.12 && eff < 0.13);
    }
}
