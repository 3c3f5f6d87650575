//! 설정 파일과 CLI 경계에서 쓰는 단위 정의 및 변환.

pub mod energy;
pub mod length;
pub mod pressure;
pub mod volume_flow;

pub use energy::{convert_energy, energy_to_kwh, EnergyUnit};
pub use length::{convert_length, length_to_m, LengthUnit};
pub use pressure::{convert_pressure, from_bar, to_bar, PressureUnit};
pub use volume_flow::{convert_volume_flow, from_m3_s, to_m3_s, VolumeFlowUnit};
