//! 사이징 엔진의 입력 데이터 모델.
//!
//! 모든 값은 SI 기준(m, s, W, K)이며, 연간 에너지와 최대 부하만 관례에 따라
//! kWh / kW 로 받는다. 단위 변환은 경계(config)에서 끝내고 들어온다.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, SizingError};

/// 지반 열물성.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundProperties {
    /// 열전도율 [W/m·K]
    pub thermal_conductivity: f64,
    /// 열확산율 [m²/s]
    pub thermal_diffusivity: f64,
    /// 비교란 지중 온도 [°C]
    pub undisturbed_temperature_c: f64,
    /// 지온 경사 [K/m], 없으면 0
    #[serde(default)]
    pub geothermal_gradient_k_per_m: f64,
}

impl GroundProperties {
    /// 체적 열용량 [J/m³·K] 으로부터 열확산율을 구해 생성한다.
    pub fn from_heat_capacity(
        thermal_conductivity: f64,
        volumetric_heat_capacity: f64,
        undisturbed_temperature_c: f64,
    ) -> Result<Self, SizingError> {
        ensure_positive(volumetric_heat_capacity, "지반 체적 열용량")?;
        let ground = Self {
            thermal_conductivity,
            thermal_diffusivity: thermal_conductivity / volumetric_heat_capacity,
            undisturbed_temperature_c,
            geothermal_gradient_k_per_m: 0.0,
        };
        ground.validate()?;
        Ok(ground)
    }

    pub fn with_gradient(mut self, gradient_k_per_m: f64) -> Self {
        self.geothermal_gradient_k_per_m = gradient_k_per_m;
        self
    }

    /// 심도 `depth_m` 보어홀 길이 방향 평균 지중 온도.
    pub fn mean_temperature_c(&self, depth_m: f64) -> f64 {
        self.undisturbed_temperature_c + self.geothermal_gradient_k_per_m * depth_m / 2.0
    }

    pub fn validate(&self) -> Result<(), SizingError> {
        ensure_positive(self.thermal_conductivity, "지반 열전도율")?;
        ensure_positive(self.thermal_diffusivity, "지반 열확산율")?;
        if !self.undisturbed_temperature_c.is_finite()
            || !self.geothermal_gradient_k_per_m.is_finite()
        {
            return Err(SizingError::geometry("지중 온도/지온 경사 값이 유한하지 않습니다."));
        }
        Ok(())
    }
}

/// 단일 배관의 치수와 재질.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeGeometry {
    /// 외경 [m]
    pub outer_diameter_m: f64,
    /// 내경 [m]
    pub inner_diameter_m: f64,
    /// 관 재질 열전도율 [W/m·K]
    pub thermal_conductivity: f64,
}

impl PipeGeometry {
    /// 외경과 두께로 생성한다. (PE 32×2.9 → `from_wall(0.032, 0.0029, 0.42)`)
    pub fn from_wall(
        outer_diameter_m: f64,
        wall_thickness_m: f64,
        thermal_conductivity: f64,
    ) -> Self {
        Self {
            outer_diameter_m,
            inner_diameter_m: outer_diameter_m - 2.0 * wall_thickness_m,
            thermal_conductivity,
        }
    }

    pub fn outer_radius_m(&self) -> f64 {
        self.outer_diameter_m / 2.0
    }

    pub fn validate(&self) -> Result<(), SizingError> {
        ensure_positive(self.inner_diameter_m, "배관 내경")?;
        ensure_positive(self.thermal_conductivity, "배관 열전도율")?;
        if self.inner_diameter_m >= self.outer_diameter_m {
            return Err(SizingError::geometry(format!(
                "배관 내경({:.4} m)은 외경({:.4} m)보다 작아야 합니다.",
                self.inner_diameter_m, self.outer_diameter_m
            )));
        }
        Ok(())
    }
}

/// 보어홀 내부 배관 배치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipeConfiguration {
    /// 단일 U관 (2 레그)
    SingleU {
        pipe: PipeGeometry,
        /// 두 레그 중심 간 거리 [m]
        shank_spacing_m: f64,
    },
    /// 이중 U관 (4 레그, 2 회로)
    DoubleU {
        pipe: PipeGeometry,
        /// 마주보는 레그 중심 간 거리 [m]
        shank_spacing_m: f64,
    },
    /// 동축관. 내관으로 내려가고 환형부로 올라온다.
    Coaxial {
        outer: PipeGeometry,
        inner: PipeGeometry,
    },
}

impl PipeConfiguration {
    /// 보어홀 단면의 배관 레그 수.
    pub fn legs(&self) -> usize {
        match self {
            PipeConfiguration::SingleU { .. } => 2,
            PipeConfiguration::DoubleU { .. } => 4,
            PipeConfiguration::Coaxial { .. } => 1,
        }
    }

    /// 보어홀 하나당 병렬 회로(루프) 수.
    pub fn loops_per_borehole(&self) -> usize {
        match self {
            PipeConfiguration::DoubleU { .. } => 2,
            _ => 1,
        }
    }

    /// 유동 계산에 쓰는 대표 배관. 동축관은 외관을 돌려준다.
    pub fn flow_pipe(&self) -> &PipeGeometry {
        match self {
            PipeConfiguration::SingleU { pipe, .. }
            | PipeConfiguration::DoubleU { pipe, .. } => pipe,
            PipeConfiguration::Coaxial { outer, .. } => outer,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PipeConfiguration::SingleU { .. } => "single-u",
            PipeConfiguration::DoubleU { .. } => "double-u",
            PipeConfiguration::Coaxial { .. } => "coaxial",
        }
    }
}

/// 보어홀 직경과 배관 배치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoreholeGeometry {
    /// 보어홀 직경 [m]
    pub diameter_m: f64,
    pub pipes: PipeConfiguration,
}

impl BoreholeGeometry {
    pub fn radius_m(&self) -> f64 {
        self.diameter_m / 2.0
    }

    /// 형상 불변식을 검사한다.
    pub fn validate(&self) -> Result<(), SizingError> {
        ensure_positive(self.diameter_m, "보어홀 직경")?;
        match &self.pipes {
            PipeConfiguration::SingleU {
                pipe,
                shank_spacing_m,
            }
            | PipeConfiguration::DoubleU {
                pipe,
                shank_spacing_m,
            } => {
                pipe.validate()?;
                ensure_positive(*shank_spacing_m, "레그 간격")?;
                if *shank_spacing_m >= self.diameter_m {
                    return Err(SizingError::geometry(format!(
                        "레그 간격({:.4} m)은 보어홀 직경({:.4} m)보다 작아야 합니다.",
                        shank_spacing_m, self.diameter_m
                    )));
                }
                let legs = self.pipes.legs() as f64;
                if self.diameter_m <= pipe.outer_diameter_m * legs {
                    return Err(SizingError::geometry(format!(
                        "보어홀 직경({:.4} m)이 배관 묶음({} × {:.4} m)보다 커야 합니다.",
                        self.diameter_m, legs, pipe.outer_diameter_m
                    )));
                }
                if *shank_spacing_m <= pipe.outer_diameter_m {
                    return Err(SizingError::geometry(
                        "레그 간격이 배관 외경보다 작아 레그가 겹칩니다.",
                    ));
                }
                if shank_spacing_m / 2.0 + pipe.outer_radius_m() > self.radius_m() {
                    return Err(SizingError::geometry("배관이 보어홀 벽을 벗어납니다."));
                }
            }
            PipeConfiguration::Coaxial { outer, inner } => {
                outer.validate()?;
                inner.validate()?;
                if inner.outer_diameter_m >= outer.inner_diameter_m {
                    return Err(SizingError::geometry("동축관 내관이 외관 안에 들어가지 않습니다."));
                }
                if self.diameter_m <= outer.outer_diameter_m {
                    return Err(SizingError::geometry(format!(
                        "보어홀 직경({:.4} m)이 동축관 외경({:.4} m)보다 커야 합니다.",
                        self.diameter_m, outer.outer_diameter_m
                    )));
                }
            }
        }
        Ok(())
    }
}

/// 그라우트(뒤채움재).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroutMaterial {
    /// 열전도율 [W/m·K]
    pub thermal_conductivity: f64,
}

/// 열매체(브라인) 물성.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidProperties {
    /// 밀도 [kg/m³]
    pub density: f64,
    /// 점성계수 [Pa·s]
    pub viscosity: f64,
    /// 비열 [J/kg·K]
    pub heat_capacity: f64,
    /// 열전도율 [W/m·K]
    pub thermal_conductivity: f64,
    /// 부동액 농도 [%], 수력 계산에서만 사용
    #[serde(default)]
    pub concentration_percent: f64,
}

impl FluidProperties {
    pub fn validate(&self) -> Result<(), SizingError> {
        ensure_positive(self.density, "유체 밀도")?;
        ensure_positive(self.viscosity, "유체 점성계수")?;
        ensure_positive(self.heat_capacity, "유체 비열")?;
        ensure_positive(self.thermal_conductivity, "유체 열전도율")?;
        Ok(())
    }

    /// 프란틀 수.
    pub fn prandtl(&self) -> f64 {
        self.viscosity * self.heat_capacity / self.thermal_conductivity
    }
}

/// 건물 냉난방 부하와 히트펌프 효율.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadProfile {
    /// 연간 난방 에너지 [kWh]
    pub annual_heating_kwh: f64,
    /// 연간 냉방 에너지 [kWh]
    pub annual_cooling_kwh: f64,
    /// 최대 난방 부하 [kW]
    pub peak_heating_kw: f64,
    /// 최대 냉방 부하 [kW]
    pub peak_cooling_kw: f64,
    /// 난방 COP (> 1)
    pub cop_heating: f64,
    /// 냉방 EER (> 0)
    pub eer_cooling: f64,
    /// 월별 난방 가중치. 없으면 기본 형상 사용
    #[serde(default)]
    pub monthly_heating: Option<[f64; 12]>,
    /// 월별 냉방 가중치. 없으면 기본 형상 사용
    #[serde(default)]
    pub monthly_cooling: Option<[f64; 12]>,
}

impl LoadProfile {
    pub fn validate(&self) -> Result<(), SizingError> {
        let non_negative = [
            (self.annual_heating_kwh, "연간 난방 에너지"),
            (self.annual_cooling_kwh, "연간 냉방 에너지"),
            (self.peak_heating_kw, "최대 난방 부하"),
            (self.peak_cooling_kw, "최대 냉방 부하"),
        ];
        for (value, what) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SizingError::configuration(format!(
                    "{what} 값은 0 이상이어야 합니다 (입력: {value})"
                )));
            }
        }
        validate_cop_heating(self.cop_heating)?;
        validate_eer_cooling(self.eer_cooling)?;
        for factors in [&self.monthly_heating, &self.monthly_cooling].into_iter().flatten() {
            if factors.iter().any(|f| !f.is_finite() || *f < 0.0) {
                return Err(SizingError::configuration("월별 가중치는 0 이상이어야 합니다."));
            }
        }
        Ok(())
    }
}

pub(crate) fn validate_cop_heating(cop: f64) -> Result<(), SizingError> {
    if cop.is_finite() && cop > 1.0 {
        Ok(())
    } else {
        Err(SizingError::configuration(format!(
            "난방 COP 는 1보다 커야 합니다 (입력: {cop})"
        )))
    }
}

pub(crate) fn validate_eer_cooling(eer: f64) -> Result<(), SizingError> {
    if eer.is_finite() && eer > 0.0 {
        Ok(())
    } else {
        Err(SizingError::configuration(format!(
            "냉방 EER 는 0보다 커야 합니다 (입력: {eer})"
        )))
    }
}

/// 유체 온도 한계.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureLimits {
    /// 난방 시 최소 유체 온도 [°C]
    pub min_fluid_temperature_c: f64,
    /// 냉방 시 최대 유체 온도 [°C]
    pub max_fluid_temperature_c: f64,
    /// 히트펌프 전후 유체 온도차 [K]
    pub delta_t_fluid_k: f64,
}

impl TemperatureLimits {
    pub fn validate(&self) -> Result<(), SizingError> {
        if !(self.delta_t_fluid_k.is_finite() && self.delta_t_fluid_k > 0.0) {
            return Err(SizingError::configuration(format!(
                "유체 온도차는 0보다 커야 합니다 (입력: {})",
                self.delta_t_fluid_k
            )));
        }
        if self.min_fluid_temperature_c >= self.max_fluid_temperature_c {
            return Err(SizingError::configuration(format!(
                "최소 유체 온도({:.1} °C)가 최대 유체 온도({:.1} °C)보다 낮아야 합니다.",
                self.min_fluid_temperature_c, self.max_fluid_temperature_c
            )));
        }
        Ok(())
    }
}

impl Default for TemperatureLimits {
    fn default() -> Self {
        Self {
            min_fluid_temperature_c: -2.0,
            max_fluid_temperature_c: 35.0,
            delta_t_fluid_k: 3.0,
        }
    }
}

/// 설계를 지배하는 운전 조건.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignCase {
    Heating,
    Cooling,
}

impl DesignCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DesignCase::Heating => "heating",
            DesignCase::Cooling => "cooling",
        }
    }
}

impl std::fmt::Display for DesignCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 관내 유동 영역. 임계 레이놀즈수 2300 을 기준으로 나눈다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowRegime {
    Laminar,
    Turbulent,
}

/// 층류/난류 경계 레이놀즈수.
pub const CRITICAL_REYNOLDS: f64 = 2300.0;

impl FlowRegime {
    pub fn from_reynolds(reynolds: f64) -> Self {
        if reynolds < CRITICAL_REYNOLDS {
            FlowRegime::Laminar
        } else {
            FlowRegime::Turbulent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowRegime::Laminar => "laminar",
            FlowRegime::Turbulent => "turbulent",
        }
    }
}

impl std::fmt::Display for FlowRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
