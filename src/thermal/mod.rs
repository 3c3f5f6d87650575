//! 보어홀 열저항과 지반 열응답.

pub mod g_function;
pub mod resistance;

pub use g_function::{
    finite_line_source, resistance_at, FiniteLineSource, ResponseFunction, TabulatedResponse,
    MONTH_STEP_S, ONE_MONTH_S, SIX_HOURS_S, TEN_YEARS_S,
};
pub use resistance::{
    borehole_resistances, configuration_effective_resistance, convection, convective_resistance,
    effective_resistance, pipe_wall_resistance, BoreholeResistances, ConvectionResult,
    FlowDirection,
};
