use borehole_sizing_toolbox::{
    app::{self, Method},
    config::{self, ProjectConfig},
    model::PipeConfiguration,
    trace::NoopTrace,
};

const PROJECT: &str = r#"
name = "Mehrfamilienhaus"

[ground]
thermal_conductivity = 2.2
volumetric_heat_capacity_mj = 2.3
undisturbed_temperature_c = 11.0

[borehole]
n_boreholes = 2
initial_depth_m = 90.0
dimension_unit = "meter"
diameter = 0.15
layout = "double_u"
pipe = "PE DN32 SDR-11"
shank_spacing = 0.08

[grout]
thermal_conductivity = 2.0

[fluid]
name = "Propylenglykol 30%"

[loads]
energy_unit = "megawatt_hour"
annual_heating = 20.0
annual_cooling = 0.0
peak_heating_kw = 12.0
peak_cooling_kw = 0.0
cop_heating = 4.5
eer_cooling = 5.0
profile = "MFH"

[hydraulics]
operating_hours = 2000.0
control = "regulated"

[solver]
years = 10
max_depth_m = 300.0
"#;

#[test]
fn project_file_converts_to_si() {
    let cfg: ProjectConfig = toml::from_str(PROJECT).expect("parse");
    let borehole = cfg.to_borehole().expect("borehole");
    assert!(matches!(borehole.pipes, PipeConfiguration::DoubleU { .. }));
    assert!((borehole.diameter_m - 0.15).abs() < 1e-12);
    let loads = cfg.to_loads().expect("loads");
    assert!((loads.annual_heating_kwh - 20_000.0).abs() < 1e-6);
    assert_eq!(cfg.solver.settings.max_depth_m, 300.0);
    assert_eq!(cfg.solver.settings.max_iterations, 100);
    assert!(cfg.grout_entry().expect("no reference").is_none());
}

#[test]
fn project_runs_end_to_end() {
    let cfg: ProjectConfig = toml::from_str(PROJECT).expect("parse");
    let report = app::run(&cfg, Method::Iterative, &NoopTrace).expect("report");
    assert!(report.required_depth_m > 0.0 && report.required_depth_m <= 300.0);
    assert_eq!(report.n_boreholes, 2);
    assert!(report.hydraulics.energy.is_some());
    assert!(report.grout.is_none());
    let text = report.to_toml().expect("toml");
    assert!(text.contains("Mehrfamilienhaus"));
}

#[test]
fn missing_project_is_created_with_defaults() {
    let path = std::env::temp_dir().join(format!("borehole_project_{}.toml", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let cfg = config::load_or_default(&path).expect("created");
    assert!(path.exists());
    let again = config::load_or_default(&path).expect("reloaded");
    assert_eq!(again.borehole.n_boreholes, cfg.borehole.n_boreholes);
    assert_eq!(again.fluid.name, cfg.fluid.name);
    std::fs::remove_file(&path).expect("cleanup");
}
