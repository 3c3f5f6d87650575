/// 지반, 그라우트, 배관, 브라인, 순환펌프, 부하 형상 참고 데이터.
/// 값은 VDI 4640 계열 문헌의 대표값이며 설계 시 현장 시험(TRT)으로 검증해야 한다.
use std::f64::consts::PI;

use serde::Serialize;

use crate::error::SizingError;
use crate::model::{FluidProperties, GroundProperties, GroutMaterial, PipeGeometry};
use crate::sizing::loads::{DEFAULT_MONTHLY_COOLING, DEFAULT_MONTHLY_HEATING};

/// 그라우트 주입량 여유율
pub const GROUT_SAFETY_FACTOR: f64 = 1.10;
/// 그라우트 포대 중량 [kg]
pub const GROUT_BAG_KG: f64 = 25.0;
/// 펌프 선정 여유율
pub const PUMP_SAFETY_FACTOR: f64 = 1.1;
const MAX_PUMP_MATCHES: usize = 5;

#[derive(Debug, Serialize)]
pub struct SoilType {
    pub name: &'static str,
    /// 열전도율 최소/최대/대표 [W/m·K]
    pub conductivity_min: f64,
    pub conductivity_max: f64,
    pub conductivity_typical: f64,
    /// 체적 열용량 최소/최대/대표 [MJ/m³·K]
    pub heat_capacity_min: f64,
    pub heat_capacity_max: f64,
    pub heat_capacity_typical: f64,
    /// 채열량 지침값 [W/m]
    pub extraction_rate_min: f64,
    pub extraction_rate_max: f64,
    pub description: &'static str,
}

impl SoilType {
    /// 대표값으로 지반 물성을 만든다.
    pub fn ground_properties(
        &self,
        undisturbed_temperature_c: f64,
    ) -> Result<GroundProperties, SizingError> {
        GroundProperties::from_heat_capacity(
            self.conductivity_typical,
            self.heat_capacity_typical * 1.0e6,
            undisturbed_temperature_c,
        )
    }
}

#[derive(Debug, Serialize)]
pub struct GroutEntry {
    pub name: &'static str,
    /// 열전도율 [W/m·K]
    pub thermal_conductivity: f64,
    /// 밀도 [kg/m³]
    pub density: f64,
    /// 단가 [€/kg]
    pub price_per_kg: f64,
    pub description: &'static str,
}

impl GroutEntry {
    pub fn material(&self) -> GroutMaterial {
        GroutMaterial {
            thermal_conductivity: self.thermal_conductivity,
        }
    }
}

/// 그라우트 소요량.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroutAmount {
    pub volume_m3: f64,
    pub mass_kg: f64,
    pub cost: f64,
    /// 25 kg 포대 수 (올림)
    pub bags: u32,
}

/// 보어홀 단면에서 배관 레그를 뺀 부피에 여유율을 곱한다.
pub fn grout_volume_m3(
    borehole_diameter_m: f64,
    pipe_outer_diameter_m: f64,
    legs: usize,
    depth_m: f64,
    n_boreholes: usize,
) -> f64 {
    let rb = borehole_diameter_m / 2.0;
    let rp = pipe_outer_diameter_m / 2.0;
    let area = (PI * (rb * rb - legs as f64 * rp * rp)).max(0.0);
    area * depth_m.max(0.0) * n_boreholes as f64 * GROUT_SAFETY_FACTOR
}

pub fn grout_amount(volume_m3: f64, grout: &GroutEntry) -> GroutAmount {
    let mass_kg = volume_m3 * grout.density;
    GroutAmount {
        volume_m3,
        mass_kg,
        cost: mass_kg * grout.price_per_kg,
        bags: (mass_kg / GROUT_BAG_KG).ceil() as u32,
    }
}

#[derive(Debug, Serialize)]
pub struct PipeEntry {
    pub name: &'static str,
    /// 외경 [m]
    pub outer_diameter_m: f64,
    /// 두께 [m]
    pub wall_thickness_m: f64,
    /// 열전도율 [W/m·K]
    pub thermal_conductivity: f64,
}

impl PipeEntry {
    pub fn geometry(&self) -> PipeGeometry {
        PipeGeometry::from_wall(
            self.outer_diameter_m,
            self.wall_thickness_m,
            self.thermal_conductivity,
        )
    }

    pub fn inner_diameter_m(&self) -> f64 {
        self.outer_diameter_m - 2.0 * self.wall_thickness_m
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FluidKind {
    Water,
    EthyleneGlycol,
    PropyleneGlycol,
}

#[derive(Debug, Serialize)]
pub struct FluidEntry {
    pub name: &'static str,
    pub kind: FluidKind,
    pub concentration_percent: f64,
    /// 20 °C 기준 물성
    pub density: f64,
    pub viscosity: f64,
    pub heat_capacity: f64,
    pub thermal_conductivity: f64,
    /// 동결 한계 [°C]
    pub min_temperature_c: f64,
}

impl FluidEntry {
    /// 온도 보정한 물성. 20 °C 기준값에 경험식 보정을 곱한다.
    pub fn properties_at(&self, temperature_c: f64) -> FluidProperties {
        let dt = temperature_c - 20.0;
        let viscosity_factor = if temperature_c > 0.0 {
            1.0 / (1.0 + 0.03 * dt)
        } else {
            1.0 + 0.1 * dt.abs()
        };
        FluidProperties {
            density: self.density * (1.0 - 0.0002 * dt),
            viscosity: self.viscosity * viscosity_factor,
            heat_capacity: self.heat_capacity * (1.0 + 0.0001 * dt),
            thermal_conductivity: self.thermal_conductivity * (1.0 + 0.0005 * dt),
            concentration_percent: self.concentration_percent,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PumpEntry {
    pub code: &'static str,
    pub name: &'static str,
    /// 에너지 효율 등급
    pub efficiency_class: &'static str,
    pub regulated: bool,
    pub max_flow_m3_h: f64,
    pub max_head_m: f64,
    pub power_min_w: f64,
    pub power_max_w: f64,
    /// 적용 히트펌프 용량 범위 [kW]
    pub heat_pump_min_kw: f64,
    pub heat_pump_max_kw: f64,
}

impl PumpEntry {
    pub fn fits(&self, flow_m3_h: f64, head_m: f64) -> bool {
        flow_m3_h * PUMP_SAFETY_FACTOR <= self.max_flow_m3_h
            && head_m * PUMP_SAFETY_FACTOR <= self.max_head_m
    }

    /// 0~100 적합도. 정격의 60~80 % 운전을 최적으로 본다.
    pub fn suitability_score(&self, flow_m3_h: f64, head_m: f64, heat_pump_kw: f64) -> f64 {
        let utilisation_score = |u: f64| {
            if (0.6..=0.8).contains(&u) {
                100.0
            } else {
                (100.0 - (u - 0.7).abs() * 200.0).max(0.0)
            }
        };
        let flow_u = if self.max_flow_m3_h > 0.0 { flow_m3_h / self.max_flow_m3_h } else { 0.0 };
        let head_u = if self.max_head_m > 0.0 { head_m / self.max_head_m } else { 0.0 };
        let power_range = self.heat_pump_min_kw..=self.heat_pump_max_kw;
        let power_score = if power_range.contains(&heat_pump_kw) {
            100.0
        } else {
            50.0
        };
        let bonus = if self.efficiency_class == "A" { 10.0 } else { 0.0 };
        let weighted =
            utilisation_score(flow_u) * 0.4 + utilisation_score(head_u) * 0.4 + power_score * 0.2;
        (weighted + bonus).min(100.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PumpMatch {
    pub pump: &'static PumpEntry,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct LoadProfileTemplate {
    pub code: &'static str,
    pub name: &'static str,
    pub monthly_heating: [f64; 12],
    pub monthly_cooling: [f64; 12],
}

pub fn soil_types() -> &'static [SoilType] {
    SOILS
}

pub fn find_soil(name: &str) -> Option<&'static SoilType> {
    SOILS.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

pub fn grout_materials() -> &'static [GroutEntry] {
    GROUTS
}

pub fn find_grout(name: &str) -> Option<&'static GroutEntry> {
    GROUTS.iter().find(|g| g.name.eq_ignore_ascii_case(name))
}

pub fn pipes() -> &'static [PipeEntry] {
    PIPES
}

pub fn find_pipe(name: &str) -> Option<&'static PipeEntry> {
    PIPES.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

pub fn fluids() -> &'static [FluidEntry] {
    FLUIDS
}

pub fn find_fluid(name: &str) -> Option<&'static FluidEntry> {
    FLUIDS.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

pub fn pumps() -> &'static [PumpEntry] {
    PUMPS
}

pub fn find_pump(code: &str) -> Option<&'static PumpEntry> {
    PUMPS
        .iter()
        .find(|p| p.code.eq_ignore_ascii_case(code) || p.name.eq_ignore_ascii_case(code))
}

/// 운전점을 여유율 안에서 감당하는 펌프를 적합도 순으로 최대 5개 돌려준다.
pub fn suitable_pumps(flow_m3_h: f64, head_m: f64, heat_pump_kw: f64) -> Vec<PumpMatch> {
    let mut matches: Vec<PumpMatch> = PUMPS
        .iter()
        .filter(|p| p.fits(flow_m3_h, head_m))
        .map(|pump| PumpMatch {
            pump,
            score: pump.suitability_score(flow_m3_h, head_m, heat_pump_kw),
        })
        .collect();
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches.truncate(MAX_PUMP_MATCHES);
    matches
}

pub fn load_profile_templates() -> &'static [LoadProfileTemplate] {
    LOAD_PROFILES
}

pub fn find_load_profile(name: &str) -> Option<&'static LoadProfileTemplate> {
    LOAD_PROFILES
        .iter()
        .find(|t| t.code.eq_ignore_ascii_case(name) || t.name.eq_ignore_ascii_case(name))
}

const fn soil(
    name: &'static str,
    conductivity: (f64, f64, f64),
    heat_capacity: (f64, f64, f64),
    extraction_rate: (f64, f64),
    description: &'static str,
) -> SoilType {
    SoilType {
        name,
        conductivity_min: conductivity.0,
        conductivity_max: conductivity.1,
        conductivity_typical: conductivity.2,
        heat_capacity_min: heat_capacity.0,
        heat_capacity_max: heat_capacity.1,
        heat_capacity_typical: heat_capacity.2,
        extraction_rate_min: extraction_rate.0,
        extraction_rate_max: extraction_rate.1,
        description,
    }
}

#[rustfmt::skip]
const SOILS: &[SoilType] = &[
    soil("Sand", (0.3, 2.4, 1.8), (2.0, 2.8, 2.4), (40.0, 80.0), "Sand, trocken bis wassergesättigt"),
    soil("Kies trocken", (0.4, 0.5, 0.4), (1.4, 1.6, 1.5), (15.0, 20.0), "Kies, trocken"),
    soil("Ton/Schluff", (0.9, 2.3, 1.7), (1.6, 3.4, 2.5), (35.0, 50.0), "Ton oder Schluff, wassergesättigt"),
    soil("Kalkstein", (2.0, 3.9, 2.8), (2.1, 2.4, 2.2), (55.0, 70.0), "Kalkstein, massig"),
    soil("Sandstein", (1.3, 5.1, 2.3), (1.6, 2.8, 2.2), (55.0, 65.0), "Sandstein"),
    soil("Granit/Gneis", (2.9, 4.1, 3.5), (2.2, 2.7, 2.4), (65.0, 85.0), "Kristallines Festgestein"),
];

const GROUTS: &[GroutEntry] = &[
    GroutEntry {
        name: "Zement-Bentonit Standard",
        thermal_conductivity: 0.8,
        density: 1800.0,
        price_per_kg: 0.15,
        description: "Standardverfüllung",
    },
    GroutEntry {
        name: "Zement-Bentonit verbessert",
        thermal_conductivity: 1.3,
        density: 1900.0,
        price_per_kg: 0.25,
        description: "Thermisch verbesserte Verfüllung",
    },
];

const PIPES: &[PipeEntry] = &[
    PipeEntry {
        name: "PE DN32 SDR-11",
        outer_diameter_m: 0.032,
        wall_thickness_m: 0.003,
        thermal_conductivity: 0.42,
    },
    PipeEntry {
        name: "PE DN40 SDR-11",
        outer_diameter_m: 0.040,
        wall_thickness_m: 0.0037,
        thermal_conductivity: 0.42,
    },
    PipeEntry {
        name: "PE-Xa DN32 SDR-11",
        outer_diameter_m: 0.032,
        wall_thickness_m: 0.0029,
        thermal_conductivity: 0.35,
    },
];

const fn fluid(
    name: &'static str,
    kind: FluidKind,
    concentration_percent: f64,
    props: (f64, f64, f64, f64),
    min_temperature_c: f64,
) -> FluidEntry {
    FluidEntry {
        name,
        kind,
        concentration_percent,
        density: props.0,
        viscosity: props.1,
        heat_capacity: props.2,
        thermal_conductivity: props.3,
        min_temperature_c,
    }
}

#[rustfmt::skip]
const FLUIDS: &[FluidEntry] = &[
    fluid("Reines Wasser", FluidKind::Water, 0.0, (998.2, 0.001002, 4182.0, 0.598), 0.0),
    fluid("Ethylenglykol 20%", FluidKind::EthyleneGlycol, 20.0, (1028.0, 0.0025, 3900.0, 0.52), -8.0),
    fluid("Ethylenglykol 25%", FluidKind::EthyleneGlycol, 25.0, (1035.0, 0.0030, 3850.0, 0.48), -12.0),
    fluid("Ethylenglykol 30%", FluidKind::EthyleneGlycol, 30.0, (1042.0, 0.0038, 3800.0, 0.45), -18.0),
    fluid("Propylenglykol 20%", FluidKind::PropyleneGlycol, 20.0, (1020.0, 0.0030, 3920.0, 0.50), -8.0),
    fluid("Propylenglykol 30%", FluidKind::PropyleneGlycol, 30.0, (1035.0, 0.0045, 3850.0, 0.46), -18.0),
];

const PUMPS: &[PumpEntry] = &[
    PumpEntry {
        code: "HE-25-6",
        name: "Hocheffizienz 25-60",
        efficiency_class: "A",
        regulated: true,
        max_flow_m3_h: 3.5,
        max_head_m: 6.0,
        power_min_w: 4.0,
        power_max_w: 45.0,
        heat_pump_min_kw: 3.0,
        heat_pump_max_kw: 12.0,
    },
    PumpEntry {
        code: "HE-25-8",
        name: "Hocheffizienz 25-80",
        efficiency_class: "A",
        regulated: true,
        max_flow_m3_h: 4.5,
        max_head_m: 8.0,
        power_min_w: 5.0,
        power_max_w: 75.0,
        heat_pump_min_kw: 5.0,
        heat_pump_max_kw: 18.0,
    },
    PumpEntry {
        code: "HE-32-10",
        name: "Hocheffizienz 32-100",
        efficiency_class: "A",
        regulated: true,
        max_flow_m3_h: 8.0,
        max_head_m: 10.0,
        power_min_w: 9.0,
        power_max_w: 180.0,
        heat_pump_min_kw: 10.0,
        heat_pump_max_kw: 35.0,
    },
    PumpEntry {
        code: "HE-40-12",
        name: "Hocheffizienz 40-120",
        efficiency_class: "A",
        regulated: true,
        max_flow_m3_h: 16.0,
        max_head_m: 12.0,
        power_min_w: 20.0,
        power_max_w: 450.0,
        heat_pump_min_kw: 25.0,
        heat_pump_max_kw: 80.0,
    },
    PumpEntry {
        code: "ST-25-6",
        name: "Standard 25-60",
        efficiency_class: "C",
        regulated: false,
        max_flow_m3_h: 3.0,
        max_head_m: 6.0,
        power_min_w: 45.0,
        power_max_w: 90.0,
        heat_pump_min_kw: 3.0,
        heat_pump_max_kw: 10.0,
    },
    PumpEntry {
        code: "ST-32-8",
        name: "Standard 32-80",
        efficiency_class: "C",
        regulated: false,
        max_flow_m3_h: 7.0,
        max_head_m: 8.0,
        power_min_w: 90.0,
        power_max_w: 245.0,
        heat_pump_min_kw: 8.0,
        heat_pump_max_kw: 30.0,
    },
];

const LOAD_PROFILES: &[LoadProfileTemplate] = &[
    LoadProfileTemplate {
        code: "EFH",
        name: "Einfamilienhaus",
        monthly_heating: DEFAULT_MONTHLY_HEATING,
        monthly_cooling: DEFAULT_MONTHLY_COOLING,
    },
    LoadProfileTemplate {
        code: "MFH",
        name: "Mehrfamilienhaus",
        monthly_heating: [0.14, 0.135, 0.12, 0.10, 0.07, 0.02, 0.01, 0.01, 0.06, 0.09, 0.12, 0.125],
        monthly_cooling: [0.0, 0.0, 0.02, 0.08, 0.15, 0.22, 0.25, 0.23, 0.05, 0.0, 0.0, 0.0],
    },
    LoadProfileTemplate {
        code: "BUERO",
        name: "Büro",
        monthly_heating: [0.12, 0.12, 0.11, 0.09, 0.06, 0.02, 0.01, 0.01, 0.05, 0.10, 0.12, 0.19],
        monthly_cooling: [0.0, 0.0, 0.03, 0.08, 0.14, 0.18, 0.25, 0.23, 0.09, 0.0, 0.0, 0.0],
    },
    LoadProfileTemplate {
        code: "GEWERBE",
        name: "Gewerbe",
        monthly_heating: [0.11, 0.11, 0.10, 0.09, 0.06, 0.03, 0.02, 0.02, 0.06, 0.10, 0.12, 0.18],
        monthly_cooling: [0.0, 0.0, 0.04, 0.10, 0.15, 0.18, 0.25, 0.23, 0.05, 0.0, 0.0, 0.0],
    },
];
