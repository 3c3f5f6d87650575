//! 보어홀 심도 계산. 다년간 반복법과 VDI 4640 3부하법 두 가지를 제공한다.

pub mod iterative;
pub mod loads;
pub mod vdi4640;

pub use iterative::{compute_iterative_depth, IterativeInput, SizingResult, SolverSettings};
pub use loads::{
    cooling_efficiency_factor, heating_efficiency_factor, monthly_ground_loads, three_loads,
    MonthlyGroundLoads, ThreeLoads, DEFAULT_MONTHLY_COOLING, DEFAULT_MONTHLY_HEATING,
};
pub use vdi4640::{
    compute_vdi4640, compute_vdi4640_converged, CaseBreakdown, GroundResponse, Vdi4640Input,
    Vdi4640Result,
};
