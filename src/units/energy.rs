use serde::{Deserialize, Serialize};

/// 에너지 단위. 내부 기준은 줄(J)이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyUnit {
    Joule,
    Megajoule,
    Gigajoule,
    #[default]
    KilowattHour,
    MegawattHour,
}

const J_PER_KWH: f64 = 3.6e6;

fn to_joule(value: f64, unit: EnergyUnit) -> f64 {
    match unit {
        EnergyUnit::Joule => value,
        EnergyUnit::Megajoule => value * 1.0e6,
        EnergyUnit::Gigajoule => value * 1.0e9,
        EnergyUnit::KilowattHour => value * J_PER_KWH,
        EnergyUnit::MegawattHour => value * J_PER_KWH * 1000.0,
    }
}

fn from_joule(value: f64, unit: EnergyUnit) -> f64 {
    match unit {
        EnergyUnit::Joule => value,
        EnergyUnit::Megajoule => value / 1.0e6,
        EnergyUnit::Gigajoule => value / 1.0e9,
        EnergyUnit::KilowattHour => value / J_PER_KWH,
        EnergyUnit::MegawattHour => value / (J_PER_KWH * 1000.0),
    }
}

/// 에너지를 변환한다.
pub fn convert_energy(value: f64, from: EnergyUnit, to: EnergyUnit) -> f64 {
    from_joule(to_joule(value, from), to)
}

/// kWh 로 변환한다. 부하 입력은 kWh 를 기준으로 받는다.
pub fn energy_to_kwh(value: f64, unit: EnergyUnit) -> f64 {
    convert_energy(value, unit, EnergyUnit::KilowattHour)
}
