//! 글리콜 농도별 브라인 물성 표와 선형 보간.
//! 표 범위(0~40 %) 밖의 농도는 가장자리 값으로 고정한다.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy)]
struct ConcentrationPoint {
    concentration_percent: f64,
    /// 밀도 [kg/m³]
    density: f64,
    /// 점성계수 [Pa·s]
    viscosity: f64,
    /// 비열 [J/kg·K]
    heat_capacity: f64,
}

const fn cp(
    concentration_percent: f64,
    density: f64,
    viscosity: f64,
    heat_capacity: f64,
) -> ConcentrationPoint {
    ConcentrationPoint {
        concentration_percent,
        density,
        viscosity,
        heat_capacity,
    }
}

const TABLE: &[ConcentrationPoint] = &[
    cp(0.0, 1000.0, 0.0018, 4190.0),
    cp(10.0, 1013.0, 0.0024, 4120.0),
    cp(20.0, 1026.0, 0.0032, 4040.0),
    cp(25.0, 1033.0, 0.0037, 4000.0),
    cp(30.0, 1040.0, 0.0045, 3950.0),
    cp(40.0, 1053.0, 0.0075, 3840.0),
];

/// 보간 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidLookup {
    pub concentration_percent: f64,
    pub density: f64,
    pub viscosity: f64,
    pub heat_capacity: f64,
    /// true면 표 범위 밖이라 가장자리 값으로 클램프됨을 의미한다.
    pub clamped: bool,
}

/// 농도 [%] 의 브라인 물성. 실패하지 않는다.
pub fn fluid_properties(concentration_percent: f64) -> FluidLookup {
    let first = TABLE[0];
    let last = TABLE[TABLE.len() - 1];
    if concentration_percent.is_nan() || concentration_percent <= first.concentration_percent {
        let below = concentration_percent < first.concentration_percent;
        return lookup(first, below || concentration_percent.is_nan());
    }
    if concentration_percent >= last.concentration_percent {
        return lookup(last, concentration_percent > last.concentration_percent);
    }
    for win in TABLE.windows(2) {
        let a = win[0];
        let b = win[1];
        if (a.concentration_percent..=b.concentration_percent).contains(&concentration_percent) {
            let frac = (concentration_percent - a.concentration_percent)
                / (b.concentration_percent - a.concentration_percent);
            return FluidLookup {
                concentration_percent,
                density: a.density + frac * (b.density - a.density),
                viscosity: a.viscosity + frac * (b.viscosity - a.viscosity),
                heat_capacity: a.heat_capacity + frac * (b.heat_capacity - a.heat_capacity),
                clamped: false,
            };
        }
    }
    lookup(last, true)
}

fn lookup(point: ConcentrationPoint, clamped: bool) -> FluidLookup {
    FluidLookup {
        concentration_percent: point.concentration_percent,
        density: point.density,
        viscosity: point.viscosity,
        heat_capacity: point.heat_capacity,
        clamped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_points_are_exact() {
        let p = fluid_properties(25.0);
        assert_eq!(p.density, 1033.0);
        assert_eq!(p.viscosity, 0.0037);
        assert_eq!(p.heat_capacity, 4000.0);
        assert!(!p.clamped);
    }

    #[test]
    fn interpolates_between_points() {
        let p = fluid_properties(15.0);
        assert!((p.density - 1019.5).abs() < 1e-9);
        assert!(p.viscosity > 0.0024 && p.viscosity < 0.0032);
    }

    #[test]
    fn clamps_outside_table() {
        let below = fluid_properties(-5.0);
        assert_eq!(below.density, 1000.0);
        assert!(below.clamped);
        let above = fluid_properties(50.0);
        assert_eq!(above.density, 1053.0);
        assert!(above.clamped);
        assert!(!fluid_properties(40.0).clamped);
    }
}
