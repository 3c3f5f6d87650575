use borehole_sizing_toolbox::{
    model::{DesignCase, GroundProperties, LoadProfile, TemperatureLimits},
    sizing::{compute_vdi4640, compute_vdi4640_converged, Vdi4640Input},
    trace::{MemoryTrace, NoopTrace},
};

fn scenario() -> Vdi4640Input {
    Vdi4640Input {
        ground: GroundProperties {
            thermal_conductivity: 2.0,
            thermal_diffusivity: 1.0e-6,
            undisturbed_temperature_c: 10.0,
            geothermal_gradient_k_per_m: 0.0,
        },
        borehole_diameter_m: 0.152,
        borehole_depth_initial_m: 100.0,
        n_boreholes: 1,
        r_borehole: 0.1,
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
        limits: TemperatureLimits {
            min_fluid_temperature_c: -2.0,
            max_fluid_temperature_c: 35.0,
            delta_t_fluid_k: 3.0,
        },
    }
}

#[test]
fn concrete_scenario() {
    let result = compute_vdi4640(&scenario(), None, &NoopTrace).expect("valid");
    assert!(matches!(result.design_case, DesignCase::Heating | DesignCase::Cooling));
    assert!(result.required_depth_final_m > 0.0);
    assert!(result.heating.exit_temperature_c < 10.0);
    assert!(result.cooling.exit_temperature_c > 10.0);
}

#[test]
fn final_depth_is_the_larger_requirement() {
    let result = compute_vdi4640(&scenario(), None, &NoopTrace).expect("valid");
    assert_eq!(
        result.required_depth_final_m,
        result.required_depth_heating_m().max(result.required_depth_cooling_m())
    );
    assert!(result.ground_response.g_base > result.ground_response.g_periodic);
    assert!(result.ground_response.g_periodic > result.ground_response.g_peak);
}

#[test]
fn heating_demand_is_monotone() {
    let mut previous = 0.0;
    for annual in [5_000.0, 10_000.0, 20_000.0] {
        let mut input = scenario();
        input.loads.annual_heating_kwh = annual;
        let d = compute_vdi4640(&input, None, &NoopTrace).expect("valid").required_depth_final_m;
        assert!(d >= previous);
        previous = d;
    }
}

#[test]
fn feeding_back_the_result_is_stable() {
    let trace = MemoryTrace::new();
    let converged =
        compute_vdi4640_converged(&scenario(), None, 0.01, 50, &trace).expect("settles");
    let mut again = scenario();
    again.borehole_depth_initial_m = converged.required_depth_final_m;
    let rerun = compute_vdi4640(&again, None, &NoopTrace).expect("rerun");
    assert!((rerun.required_depth_final_m - converged.required_depth_final_m).abs() <= 0.01);
    assert!(converged.reseeds > 0);
    assert!(trace.value("vdi4640.reseed", "to_m").is_some());
}

#[test]
fn more_boreholes_share_the_load() {
    let one = compute_vdi4640(&scenario(), None, &NoopTrace).expect("one");
    let mut input = scenario();
    input.n_boreholes = 2;
    let two = compute_vdi4640(&input, None, &NoopTrace).expect("two");
    assert!(two.required_depth_final_m < one.required_depth_final_m);
}
