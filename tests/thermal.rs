use approx::assert_relative_eq;
use borehole_sizing_toolbox::{
    model::{BoreholeGeometry, FluidProperties, PipeConfiguration, PipeGeometry},
    sizing::{cooling_efficiency_factor, heating_efficiency_factor},
    thermal::{
        borehole_resistances, effective_resistance, finite_line_source, pipe_wall_resistance,
        FlowDirection, ONE_MONTH_S, SIX_HOURS_S, TEN_YEARS_S,
    },
    SizingError,
};

fn brine() -> FluidProperties {
    FluidProperties {
        density: 1040.0,
        viscosity: 0.0045,
        heat_capacity: 3950.0,
        thermal_conductivity: 0.45,
        concentration_percent: 30.0,
    }
}

fn pe32() -> PipeGeometry {
    PipeGeometry::from_wall(0.032, 0.003, 0.42)
}

fn borehole(pipes: PipeConfiguration) -> BoreholeGeometry {
    BoreholeGeometry {
        diameter_m: 0.152,
        pipes,
    }
}

#[test]
fn pipe_wall_rejects_inverted_diameters() {
    let err = pipe_wall_resistance(0.032, 0.026, 0.42).expect_err("inverted");
    assert!(matches!(err, SizingError::Geometry(_)));
    let r = pipe_wall_resistance(0.026, 0.032, 0.42).expect("valid");
    let expected = (0.032f64 / 0.026).ln() / (2.0 * std::f64::consts::PI * 0.42);
    assert_relative_eq!(r, expected, max_relative = 1e-12);
}

#[test]
fn all_configurations_give_positive_resistances() {
    let configs = [
        PipeConfiguration::SingleU {
            pipe: pe32(),
            shank_spacing_m: 0.052,
        },
        PipeConfiguration::DoubleU {
            pipe: pe32(),
            shank_spacing_m: 0.052,
        },
        PipeConfiguration::Coaxial {
            outer: PipeGeometry::from_wall(0.063, 0.0058, 0.42),
            inner: PipeGeometry::from_wall(0.032, 0.003, 0.42),
        },
    ];
    for pipes in configs {
        let heating = FlowDirection::Heating;
        let r = borehole_resistances(&borehole(pipes), 1.3, 2.0, &brine(), 0.0008, heating)
            .expect("valid geometry");
        assert!(r.r_b > 0.0 && r.r_a > 0.0, "{}: {r:?}", pipes.label());
    }
}

#[test]
fn double_u_has_lower_borehole_resistance() {
    let single = borehole_resistances(
        &borehole(PipeConfiguration::SingleU {
            pipe: pe32(),
            shank_spacing_m: 0.052,
        }),
        1.3,
        2.0,
        &brine(),
        0.0008,
        FlowDirection::Heating,
    )
    .expect("single");
    let double = borehole_resistances(
        &borehole(PipeConfiguration::DoubleU {
            pipe: pe32(),
            shank_spacing_m: 0.052,
        }),
        1.3,
        2.0,
        &brine(),
        0.0008,
        FlowDirection::Heating,
    )
    .expect("double");
    assert!(double.r_b < single.r_b);
}

#[test]
fn effective_resistance_grows_with_depth() {
    let shallow = effective_resistance(0.1, 0.3, 50.0, 0.4, 3950.0).expect("valid");
    let deep = effective_resistance(0.1, 0.3, 200.0, 0.4, 3950.0).expect("valid");
    assert!(shallow > 0.1);
    assert!(deep > shallow);
}

#[test]
fn g_function_increases_over_vdi_time_scales() {
    let g_peak = finite_line_source(SIX_HOURS_S, 100.0, 0.076, 1.0e-6);
    let g_month = finite_line_source(ONE_MONTH_S, 100.0, 0.076, 1.0e-6);
    let g_base = finite_line_source(TEN_YEARS_S, 100.0, 0.076, 1.0e-6);
    assert!(g_peak > 0.0);
    assert!(g_peak < g_month && g_month < g_base);
    assert_eq!(finite_line_source(0.0, 100.0, 0.076, 1.0e-6), 0.0);
}

#[test]
fn efficiency_factors_move_in_opposite_directions() {
    let cops = [1.5, 2.0, 3.0, 4.0, 6.0];
    for pair in cops.windows(2) {
        let lo = heating_efficiency_factor(pair[0]).expect("cop > 1");
        let hi = heating_efficiency_factor(pair[1]).expect("cop > 1");
        assert!(hi > lo);
        let lo = cooling_efficiency_factor(pair[0]).expect("eer > 0");
        let hi = cooling_efficiency_factor(pair[1]).expect("eer > 0");
        assert!(hi < lo);
    }
    assert!(heating_efficiency_factor(1.0).is_err());
    assert!(cooling_efficiency_factor(0.0).is_err());
}
