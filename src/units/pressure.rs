use serde::{Deserialize, Serialize};

/// 차압 단위. 내부 기준은 bar 이다. 배관 손실은 차압이므로 게이지/절대 구분이 없다.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum PressureUnit {
    Bar,
    #[default]
    MilliBar,
    Pascal,
    KiloPascal,
    /// 물기둥 [mWS]
    MeterWater,
}

const PA_PER_BAR: f64 = 100_000.0;
const PA_PER_M_WATER: f64 = 9806.65;

pub fn to_bar(value: f64, unit: PressureUnit) -> f64 {
    match unit {
        PressureUnit::Bar => value,
        PressureUnit::MilliBar => value / 1000.0,
        PressureUnit::Pascal => value / PA_PER_BAR,
        PressureUnit::KiloPascal => value / 100.0,
        PressureUnit::MeterWater => value * PA_PER_M_WATER / PA_PER_BAR,
    }
}

pub fn from_bar(value_bar: f64, unit: PressureUnit) -> f64 {
    match unit {
        PressureUnit::Bar => value_bar,
        PressureUnit::MilliBar => value_bar * 1000.0,
        PressureUnit::Pascal => value_bar * PA_PER_BAR,
        PressureUnit::KiloPascal => value_bar * 100.0,
        PressureUnit::MeterWater => value_bar * PA_PER_BAR / PA_PER_M_WATER,
    }
}

impl PressureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            PressureUnit::Bar => "bar",
            PressureUnit::MilliBar => "mbar",
            PressureUnit::Pascal => "Pa",
            PressureUnit::KiloPascal => "kPa",
            PressureUnit::MeterWater => "mWS",
        }
    }
}

/// 압력을 원하는 단위로 변환한다.
pub fn convert_pressure(value: f64, from: PressureUnit, to: PressureUnit) -> f64 {
    from_bar(to_bar(value, from), to)
}
