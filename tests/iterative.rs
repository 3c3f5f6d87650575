use borehole_sizing_toolbox::{
    model::{
        BoreholeGeometry, FluidProperties, GroundProperties, GroutMaterial, LoadProfile,
        PipeConfiguration, PipeGeometry, TemperatureLimits,
    },
    sizing::{compute_iterative_depth, IterativeInput, SolverSettings},
    thermal::{FiniteLineSource, ResponseFunction},
    trace::NoopTrace,
};

fn house() -> IterativeInput {
    IterativeInput {
        ground: GroundProperties {
            thermal_conductivity: 2.0,
            thermal_diffusivity: 1.0e-6,
            undisturbed_temperature_c: 10.0,
            geothermal_gradient_k_per_m: 0.0,
        },
        borehole: BoreholeGeometry {
            diameter_m: 0.152,
            pipes: PipeConfiguration::SingleU {
                pipe: PipeGeometry::from_wall(0.032, 0.003, 0.42),
                shank_spacing_m: 0.052,
            },
        },
        grout: GroutMaterial {
            thermal_conductivity: 1.3,
        },
        fluid: FluidProperties {
            density: 1040.0,
            viscosity: 0.0045,
            heat_capacity: 3950.0,
            thermal_conductivity: 0.45,
            concentration_percent: 30.0,
        },
        flow_rate_m3_s: 0.0008,
        loads: LoadProfile {
            annual_heating_kwh: 10_000.0,
            annual_cooling_kwh: 3_000.0,
            peak_heating_kw: 6.0,
            peak_cooling_kw: 4.0,
            cop_heating: 4.0,
            eer_cooling: 4.0,
            monthly_heating: None,
            monthly_cooling: None,
        },
        limits: TemperatureLimits::default(),
        n_boreholes: 1,
        years: 10,
        initial_depth_m: 100.0,
    }
}

fn depth(input: &IterativeInput) -> f64 {
    compute_iterative_depth(input, &SolverSettings::default(), None, &NoopTrace)
        .expect("converges")
        .required_depth_m
}

#[test]
fn result_is_positive_with_positive_resistances() {
    let result = compute_iterative_depth(&house(), &SolverSettings::default(), None, &NoopTrace)
        .expect("converges");
    assert!(result.required_depth_m > 0.0);
    assert!(result.borehole_resistance > 0.0);
    assert!(result.effective_resistance >= result.borehole_resistance);
    assert!(result.heat_extraction_rate_w_per_m > 0.0);
}

#[test]
fn more_heating_demand_never_needs_less_depth() {
    let mut previous = 0.0;
    for annual in [8_000.0, 12_000.0, 16_000.0] {
        let mut input = house();
        input.loads.annual_heating_kwh = annual;
        let d = depth(&input);
        assert!(d >= previous, "{annual} kWh: {d} < {previous}");
        previous = d;
    }
}

#[test]
fn better_ground_never_needs_more_depth() {
    let mut previous = f64::INFINITY;
    for conductivity in [1.5, 2.0, 3.0] {
        let mut input = house();
        input.ground.thermal_conductivity = conductivity;
        let d = depth(&input);
        assert!(d <= previous, "λ {conductivity}: {d} > {previous}");
        previous = d;
    }
}

#[test]
fn double_u_needs_no_more_depth_than_single_u() {
    // 낮은 유량에서는 유효 열저항의 단락 항이 커진다.
    for flow in [0.0008, 0.0004, 0.0002, 0.0001] {
        let mut single_input = house();
        single_input.flow_rate_m3_s = flow;
        let single = depth(&single_input);

        let mut double_input = single_input.clone();
        double_input.borehole.pipes = PipeConfiguration::DoubleU {
            pipe: PipeGeometry::from_wall(0.032, 0.003, 0.42),
            shank_spacing_m: 0.052,
        };
        let double = depth(&double_input);
        assert!(double <= single, "{flow} m³/s: double {double} > single {single}");
    }
}

#[test]
fn custom_response_is_used() {
    let input = house();
    let fls = FiniteLineSource::new(0.076, 1.0e-6).expect("valid");
    let stronger = move |t: f64, h: f64| 1.3 * fls.g(t, h);
    let custom = compute_iterative_depth(
        &input,
        &SolverSettings::default(),
        Some(&stronger as &dyn ResponseFunction),
        &NoopTrace,
    )
    .expect("converges");
    assert!(custom.required_depth_m > depth(&input));
}

#[test]
fn reseeding_reaches_a_stable_depth() {
    let settings = SolverSettings::default();
    let first = compute_iterative_depth(&house(), &settings, None, &NoopTrace).expect("first");
    let mut seeded = house();
    seeded.initial_depth_m = first.required_depth_m;
    let second = compute_iterative_depth(&seeded, &settings, None, &NoopTrace).expect("second");
    assert!((second.required_depth_m - first.required_depth_m).abs() < 1.0);
}
