//! TOML 프로젝트 파일.
//!
//! 이름으로 참조한 지반/그라우트/배관/브라인은 [`crate::catalog`] 에서 찾고,
//! 직접 적은 수치가 있으면 그 값을 우선한다. 엔진으로 넘기기 전에 모두 SI 로 바꾼다.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::catalog;
use crate::error::SizingError;
use crate::hydraulics::{EnergyProjection, PumpControl};
use crate::model::{
    BoreholeGeometry, FluidProperties, GroundProperties, GroutMaterial, LoadProfile,
    PipeConfiguration, PipeGeometry, TemperatureLimits,
};
use crate::sizing::SolverSettings;
use crate::units::{energy_to_kwh, length_to_m, EnergyUnit, LengthUnit};

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("설정 파싱 오류: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("설정 직렬화 오류: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// 카탈로그에 없는 이름
    #[error("알 수 없는 {kind}: {name}")]
    UnknownReference { kind: &'static str, name: String },
    /// 필수 값 누락
    #[error("필수 값이 없습니다: {0}")]
    Missing(&'static str),
    #[error(transparent)]
    Invalid(#[from] SizingError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundSection {
    /// 카탈로그 지반 이름
    #[serde(default)]
    pub soil: Option<String>,
    /// 열전도율 [W/m·K]. 있으면 카탈로그 값 대신 사용
    #[serde(default)]
    pub thermal_conductivity: Option<f64>,
    /// 체적 열용량 [MJ/m³·K]
    #[serde(default)]
    pub volumetric_heat_capacity_mj: Option<f64>,
    pub undisturbed_temperature_c: f64,
    #[serde(default)]
    pub geothermal_gradient_k_per_m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipeLayout {
    #[default]
    SingleU,
    DoubleU,
    Coaxial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoreholeSection {
    pub n_boreholes: usize,
    /// 초기 심도 [m]
    pub initial_depth_m: f64,
    /// 보어홀 하나의 시공 가능 최대 심도 [m]
    #[serde(default)]
    pub max_depth_per_borehole_m: Option<f64>,
    /// 아래 직경/간격/배관 치수의 단위
    #[serde(default = "default_dimension_unit")]
    pub dimension_unit: LengthUnit,
    pub diameter: f64,
    #[serde(default)]
    pub layout: PipeLayout,
    /// 카탈로그 배관 이름
    #[serde(default)]
    pub pipe: Option<String>,
    #[serde(default)]
    pub pipe_outer_diameter: Option<f64>,
    #[serde(default)]
    pub pipe_wall_thickness: Option<f64>,
    #[serde(default)]
    pub pipe_thermal_conductivity: Option<f64>,
    /// U관 레그 중심 간격
    #[serde(default)]
    pub shank_spacing: Option<f64>,
    /// 동축관 내관 외경
    #[serde(default)]
    pub inner_pipe_outer_diameter: Option<f64>,
    #[serde(default)]
    pub inner_pipe_wall_thickness: Option<f64>,
    /// 보어홀 열저항 [m·K/W]. 없으면 배관 배치로 계산
    #[serde(default)]
    pub r_borehole: Option<f64>,
}

fn default_dimension_unit() -> LengthUnit {
    LengthUnit::Millimeter
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroutSection {
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub thermal_conductivity: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluidSection {
    /// 카탈로그 브라인 이름
    pub name: String,
    /// 물성 평가 온도 [°C]
    #[serde(default)]
    pub design_temperature_c: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadsSection {
    #[serde(default)]
    pub energy_unit: EnergyUnit,
    pub annual_heating: f64,
    pub annual_cooling: f64,
    pub peak_heating_kw: f64,
    pub peak_cooling_kw: f64,
    pub cop_heating: f64,
    pub eer_cooling: f64,
    /// 부하 형상 템플릿 (EFH, MFH, BUERO, GEWERBE)
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub monthly_heating: Option<[f64; 12]>,
    #[serde(default)]
    pub monthly_cooling: Option<[f64; 12]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HydraulicsSection {
    /// 병렬 회로 수. 없으면 보어홀마다 한 회로
    pub n_circuits: Option<usize>,
    pub horizontal_length_m: f64,
    pub fittings_k_sum: f64,
    pub equipment_pressure_drop_bar: f64,
    pub pump_efficiency: f64,
    /// 히트펌프 용량 [kW]. 없으면 최대 난방 부하
    pub heat_pump_kw: Option<f64>,
    /// 설치할 카탈로그 펌프 코드 또는 이름. 운전점을 감당하는지 확인한다.
    pub pump: Option<String>,
    /// 연간 운전 시간 [h]. 있으면 운전비를 추정
    pub operating_hours: Option<f64>,
    pub electricity_price_per_kwh: f64,
    pub control: PumpControl,
    pub regulated_premium: Option<f64>,
}

impl Default for HydraulicsSection {
    fn default() -> Self {
        Self {
            n_circuits: None,
            horizontal_length_m: crate::hydraulics::DEFAULT_HORIZONTAL_LENGTH_M,
            fittings_k_sum: 0.0,
            equipment_pressure_drop_bar: crate::hydraulics::DEFAULT_EQUIPMENT_PRESSURE_DROP_BAR,
            pump_efficiency: crate::hydraulics::DEFAULT_PUMP_EFFICIENCY,
            heat_pump_kw: None,
            pump: None,
            operating_hours: None,
            electricity_price_per_kwh: 0.30,
            control: PumpControl::Constant,
            regulated_premium: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSection {
    /// 반복법 시뮬레이션 연수
    pub years: usize,
    #[serde(flatten)]
    pub settings: SolverSettings,
}

impl Default for SolverSection {
    fn default() -> Self {
        Self {
            years: 25,
            settings: SolverSettings::default(),
        }
    }
}

/// 프로젝트 파일 전체.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub name: String,
    pub ground: GroundSection,
    pub borehole: BoreholeSection,
    pub grout: GroutSection,
    pub fluid: FluidSection,
    pub loads: LoadsSection,
    #[serde(default)]
    pub limits: TemperatureLimits,
    #[serde(default)]
    pub hydraulics: HydraulicsSection,
    #[serde(default)]
    pub solver: SolverSection,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Einfamilienhaus".to_string(),
            ground: GroundSection {
                soil: Some("Sand".to_string()),
                thermal_conductivity: None,
                volumetric_heat_capacity_mj: None,
                undisturbed_temperature_c: 10.0,
                geothermal_gradient_k_per_m: 0.0,
            },
            borehole: BoreholeSection {
                n_boreholes: 1,
                initial_depth_m: 100.0,
                max_depth_per_borehole_m: None,
                dimension_unit: LengthUnit::Millimeter,
                diameter: 152.0,
                layout: PipeLayout::SingleU,
                pipe: Some("PE DN32 SDR-11".to_string()),
                pipe_outer_diameter: None,
                pipe_wall_thickness: None,
                pipe_thermal_conductivity: None,
                shank_spacing: Some(80.0),
                inner_pipe_outer_diameter: None,
                inner_pipe_wall_thickness: None,
                r_borehole: None,
            },
            grout: GroutSection {
                material: Some("Zement-Bentonit verbessert".to_string()),
                thermal_conductivity: None,
            },
            fluid: FluidSection {
                name: "Ethylenglykol 25%".to_string(),
                design_temperature_c: 0.0,
            },
            loads: LoadsSection {
                energy_unit: EnergyUnit::KilowattHour,
                annual_heating: 10_000.0,
                annual_cooling: 3_000.0,
                peak_heating_kw: 6.0,
                peak_cooling_kw: 4.0,
                cop_heating: 4.0,
                eer_cooling: 4.0,
                profile: Some("EFH".to_string()),
                monthly_heating: None,
                monthly_cooling: None,
            },
            limits: TemperatureLimits::default(),
            hydraulics: HydraulicsSection::default(),
            solver: SolverSection::default(),
        }
    }
}

impl ProjectConfig {
    pub fn to_ground(&self) -> Result<GroundProperties, ConfigError> {
        let g = &self.ground;
        let soil = lookup(g.soil.as_deref(), "지반", catalog::find_soil)?;
        let conductivity = g
            .thermal_conductivity
            .or(soil.map(|s| s.conductivity_typical))
            .ok_or(ConfigError::Missing("ground.thermal_conductivity"))?;
        let capacity_mj = g
            .volumetric_heat_capacity_mj
            .or(soil.map(|s| s.heat_capacity_typical))
            .ok_or(ConfigError::Missing("ground.volumetric_heat_capacity_mj"))?;
        let ground = GroundProperties::from_heat_capacity(
            conductivity,
            capacity_mj * 1.0e6,
            g.undisturbed_temperature_c,
        )?
        .with_gradient(g.geothermal_gradient_k_per_m);
        Ok(ground)
    }

    fn dimension_m(&self, value: f64) -> f64 {
        length_to_m(value, self.borehole.dimension_unit)
    }

    fn pipe(&self) -> Result<PipeGeometry, ConfigError> {
        let b = &self.borehole;
        let entry = lookup(b.pipe.as_deref(), "배관", catalog::find_pipe)?;
        let outer = match b.pipe_outer_diameter {
            Some(v) => self.dimension_m(v),
            None => entry
                .map(|p| p.outer_diameter_m)
                .ok_or(ConfigError::Missing("borehole.pipe_outer_diameter"))?,
        };
        let wall = match b.pipe_wall_thickness {
            Some(v) => self.dimension_m(v),
            None => entry
                .map(|p| p.wall_thickness_m)
                .ok_or(ConfigError::Missing("borehole.pipe_wall_thickness"))?,
        };
        let conductivity = b
            .pipe_thermal_conductivity
            .or(entry.map(|p| p.thermal_conductivity))
            .ok_or(ConfigError::Missing("borehole.pipe_thermal_conductivity"))?;
        Ok(PipeGeometry::from_wall(outer, wall, conductivity))
    }

    pub fn to_borehole(&self) -> Result<BoreholeGeometry, ConfigError> {
        let b = &self.borehole;
        let pipe = self.pipe()?;
        let pipes = match b.layout {
            PipeLayout::SingleU | PipeLayout::DoubleU => {
                let spacing = b
                    .shank_spacing
                    .ok_or(ConfigError::Missing("borehole.shank_spacing"))?;
                let spacing = self.dimension_m(spacing);
                if b.layout == PipeLayout::SingleU {
                    PipeConfiguration::SingleU {
                        pipe,
                        shank_spacing_m: spacing,
                    }
                } else {
                    PipeConfiguration::DoubleU {
                        pipe,
                        shank_spacing_m: spacing,
                    }
                }
            }
            PipeLayout::Coaxial => {
                let inner_outer = b
                    .inner_pipe_outer_diameter
                    .ok_or(ConfigError::Missing("borehole.inner_pipe_outer_diameter"))?;
                let inner_wall = b
                    .inner_pipe_wall_thickness
                    .ok_or(ConfigError::Missing("borehole.inner_pipe_wall_thickness"))?;
                PipeConfiguration::Coaxial {
                    outer: pipe,
                    inner: PipeGeometry::from_wall(
                        self.dimension_m(inner_outer),
                        self.dimension_m(inner_wall),
                        pipe.thermal_conductivity,
                    ),
                }
            }
        };
        let borehole = BoreholeGeometry {
            diameter_m: self.dimension_m(b.diameter),
            pipes,
        };
        borehole.validate()?;
        Ok(borehole)
    }

    pub fn grout_entry(&self) -> Result<Option<&'static catalog::GroutEntry>, ConfigError> {
        lookup(self.grout.material.as_deref(), "그라우트", catalog::find_grout)
    }

    pub fn to_grout(&self) -> Result<GroutMaterial, ConfigError> {
        let entry = self.grout_entry()?;
        let thermal_conductivity = self
            .grout
            .thermal_conductivity
            .or(entry.map(|g| g.thermal_conductivity))
            .ok_or(ConfigError::Missing("grout.thermal_conductivity"))?;
        Ok(GroutMaterial { thermal_conductivity })
    }

    pub fn fluid_entry(&self) -> Result<&'static catalog::FluidEntry, ConfigError> {
        catalog::find_fluid(&self.fluid.name).ok_or_else(|| ConfigError::UnknownReference {
            kind: "브라인",
            name: self.fluid.name.clone(),
        })
    }

    pub fn to_fluid(&self) -> Result<FluidProperties, ConfigError> {
        let fluid = self.fluid_entry()?.properties_at(self.fluid.design_temperature_c);
        fluid.validate()?;
        Ok(fluid)
    }

    pub fn to_loads(&self) -> Result<LoadProfile, ConfigError> {
        let l = &self.loads;
        let template = lookup(l.profile.as_deref(), "부하 형상", catalog::find_load_profile)?;
        let loads = LoadProfile {
            annual_heating_kwh: energy_to_kwh(l.annual_heating, l.energy_unit),
            annual_cooling_kwh: energy_to_kwh(l.annual_cooling, l.energy_unit),
            peak_heating_kw: l.peak_heating_kw,
            peak_cooling_kw: l.peak_cooling_kw,
            cop_heating: l.cop_heating,
            eer_cooling: l.eer_cooling,
            monthly_heating: l.monthly_heating.or(template.map(|t| t.monthly_heating)),
            monthly_cooling: l.monthly_cooling.or(template.map(|t| t.monthly_cooling)),
        };
        loads.validate()?;
        Ok(loads)
    }

    pub fn selected_pump(&self) -> Result<Option<&'static catalog::PumpEntry>, ConfigError> {
        lookup(self.hydraulics.pump.as_deref(), "펌프", catalog::find_pump)
    }

    pub fn to_energy_projection(&self) -> Option<EnergyProjection> {
        let h = &self.hydraulics;
        h.operating_hours.map(|operating_hours| EnergyProjection {
            operating_hours,
            electricity_price_per_kwh: h.electricity_price_per_kwh,
            control: h.control,
            regulated_premium: h.regulated_premium,
        })
    }

    /// 설정을 파일로 저장한다.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// 프로젝트 파일을 로드하거나 없으면 기본 프로젝트를 생성한다.
pub fn load_or_default(path: &Path) -> Result<ProjectConfig, ConfigError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let cfg: ProjectConfig = toml::from_str(&content)?;
        Ok(cfg)
    } else {
        let cfg = ProjectConfig::default();
        cfg.save(path)?;
        Ok(cfg)
    }
}

/// 이름이 있으면 카탈로그에서 찾는다. 없는 이름은 오류.
fn lookup<T>(
    name: Option<&str>,
    kind: &'static str,
    find: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError> {
    name.map(|n| {
        find(n).ok_or_else(|| ConfigError::UnknownReference {
            kind,
            name: n.to_string(),
        })
    })
    .transpose()
}

fn check_range(
    warnings: &mut Vec<String>,
    what: &str,
    value: f64,
    (low, high): (f64, f64),
    unit: &str,
) {
    if value < low || value > high {
        warnings.push(format!(
            "{what} {value:.2} {unit} 가 일반 범위({low}~{high} {unit})를 벗어납니다."
        ));
    }
}

/// VDI 4640 일반 범위를 벗어난 값에 대한 경고. 계산을 막지 않는다.
pub fn validate_ranges(cfg: &ProjectConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    check_range(&mut warnings, "보어홀 심도", cfg.borehole.initial_depth_m, (10.0, 400.0), "m");
    let diameter_mm = length_to_m(cfg.borehole.diameter, cfg.borehole.dimension_unit) * 1000.0;
    check_range(&mut warnings, "보어홀 직경", diameter_mm, (100.0, 300.0), "mm");
    if let Ok(ground) = cfg.to_ground() {
        check_range(&mut warnings, "지반 열전도율", ground.thermal_conductivity, (0.5, 6.0), "W/m·K");
    }
    check_range(&mut warnings, "난방 COP", cfg.loads.cop_heating, (2.0, 8.0), "");
    check_range(&mut warnings, "유체 온도차", cfg.limits.delta_t_fluid_k, (1.0, 10.0), "K");
    if let Ok(fluid) = cfg.fluid_entry() {
        check_range(&mut warnings, "부동액 농도", fluid.concentration_percent, (0.0, 40.0), "%");
        if cfg.limits.min_fluid_temperature_c < fluid.min_temperature_c {
            warnings.push(format!(
                "최소 유체 온도 {:.1} °C 가 {} 의 동결 한계 {:.1} °C 보다 낮습니다.",
                cfg.limits.min_fluid_temperature_c, fluid.name, fluid.min_temperature_c
            ));
        }
    }
    warnings
}
