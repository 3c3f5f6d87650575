use serde::{Deserialize, Serialize};

/// 체적 유량 단위. 내부 기준은 m³/s 이다.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum VolumeFlowUnit {
    CubicMeterPerSecond,
    #[default]
    CubicMeterPerHour,
    LiterPerMinute,
    LiterPerSecond,
}

pub fn to_m3_s(value: f64, unit: VolumeFlowUnit) -> f64 {
    match unit {
        VolumeFlowUnit::CubicMeterPerSecond => value,
        VolumeFlowUnit::CubicMeterPerHour => value / 3600.0,
        VolumeFlowUnit::LiterPerMinute => value / 60_000.0,
        VolumeFlowUnit::LiterPerSecond => value / 1000.0,
    }
}

pub fn from_m3_s(value: f64, unit: VolumeFlowUnit) -> f64 {
    match unit {
        VolumeFlowUnit::CubicMeterPerSecond => value,
        VolumeFlowUnit::CubicMeterPerHour => value * 3600.0,
        VolumeFlowUnit::LiterPerMinute => value * 60_000.0,
        VolumeFlowUnit::LiterPerSecond => value * 1000.0,
    }
}

impl VolumeFlowUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            VolumeFlowUnit::CubicMeterPerSecond => "m³/s",
            VolumeFlowUnit::CubicMeterPerHour => "m³/h",
            VolumeFlowUnit::LiterPerMinute => "l/min",
            VolumeFlowUnit::LiterPerSecond => "l/s",
        }
    }
}

/// 체적 유량을 변환한다.
pub fn convert_volume_flow(value: f64, from: VolumeFlowUnit, to: VolumeFlowUnit) -> f64 {
    from_m3_s(to_m3_s(value, from), to)
}
