use std::path::PathBuf;
use std::process::ExitCode;

use borehole_sizing_toolbox::app::{self, Method, ProjectReport};
use borehole_sizing_toolbox::catalog;
use borehole_sizing_toolbox::config::{self, ProjectConfig};
use borehole_sizing_toolbox::trace::{NoopTrace, TraceSink, TracingTrace};
use borehole_sizing_toolbox::units::{
    convert_pressure, convert_volume_flow, PressureUnit, VolumeFlowUnit,
};
use clap::Parser;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[clap(author, version, about = "지중 열교환기 보어홀 심도/수력 계산", long_about = None)]
struct Args {
    /// 프로젝트 파일 (TOML). 없으면 기본 프로젝트를 만든다.
    #[arg(default_value = "project.toml")]
    project: PathBuf,
    #[arg(long, short, value_enum, default_value_t = Method::Iterative)]
    method: Method,
    /// 보고서를 TOML 로 저장할 파일
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// 계산 단계를 DEBUG 로그로 출력
    #[arg(long, default_value_t = false)]
    trace: bool,
    /// 기본 프로젝트 파일만 쓰고 끝낸다
    #[arg(long, default_value_t = false)]
    init: bool,
    /// 카탈로그(지반, 그라우트, 배관, 브라인, 펌프, 부하 형상)를 출력하고 끝낸다
    #[arg(long, default_value_t = false)]
    catalog: bool,
    /// 요약의 유량 표시 단위
    #[arg(long, value_enum, default_value_t = VolumeFlowUnit::CubicMeterPerHour)]
    flow_unit: VolumeFlowUnit,
    /// 요약의 압력손실 표시 단위
    #[arg(long, value_enum, default_value_t = PressureUnit::MilliBar)]
    pressure_unit: PressureUnit,
}

/// 프로그램의 엔트리 포인트. 프로젝트를 로드한 뒤 계산 결과를 출력한다.
fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.trace { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("로그 초기화 실패: {err}");
    }

    match try_run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("오류: {err}");
            ExitCode::FAILURE
        }
    }
}

fn try_run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.catalog {
        print_catalog();
        return Ok(());
    }
    if args.init {
        ProjectConfig::default().save(&args.project)?;
        println!("기본 프로젝트를 {} 에 저장했습니다.", args.project.display());
        return Ok(());
    }

    let cfg = config::load_or_default(&args.project)?;
    let trace: &dyn TraceSink = if args.trace { &TracingTrace } else { &NoopTrace };
    let report = app::run(&cfg, args.method, trace)?;
    print_summary(&report, args.flow_unit, args.pressure_unit);

    if let Some(path) = &args.output {
        std::fs::write(path, report.to_toml()?)?;
        println!("보고서를 {} 에 저장했습니다.", path.display());
    }
    Ok(())
}

fn print_summary(report: &ProjectReport, flow_unit: VolumeFlowUnit, pressure_unit: PressureUnit) {
    println!("== {} ({:?}) ==", report.project, report.method);
    println!(
        "필요 심도: {:.1} m × {} 공 = {:.1} m ({} 지배)",
        report.required_depth_m, report.n_boreholes, report.total_length_m, report.design_case
    );
    println!(
        "R_b = {:.4} m·K/W, R_a = {:.4} m·K/W",
        report.resistances.r_b, report.resistances.r_a
    );
    let h = &report.hydraulics;
    let flow = convert_volume_flow(h.flow.m3_s, VolumeFlowUnit::CubicMeterPerSecond, flow_unit);
    let pressure =
        convert_pressure(h.system.total_pressure_drop_bar, PressureUnit::Bar, pressure_unit);
    println!(
        "유량 {flow:.3} {}, 압력손실 {pressure:.3} {}, 양정 {:.1} m, 펌프 {:.0} W ({})",
        flow_unit.symbol(),
        pressure_unit.symbol(),
        h.system.total_head_m,
        h.pump.electric_power_w,
        h.regime()
    );
    if let Some(energy) = &h.energy {
        println!(
            "펌프 연간 {:.0} kWh / {:.0} (10년 {:.0})",
            energy.annual_kwh, energy.annual_cost, energy.lifetime_10y_cost
        );
    }
    if let Some(advice) = &report.depth_advice {
        println!("제안: {} 공 × {:.1} m", advice.n_boreholes, advice.depth_m);
    }
    for pump in &report.pumps {
        println!("펌프 후보 {} ({}) 적합도 {:.0}", pump.code, pump.name, pump.score);
    }
    if let Some(pump) = &report.selected_pump {
        let verdict = if pump.fits { "적합" } else { "부족" };
        println!("지정 펌프 {} ({}) {verdict}, 적합도 {:.0}", pump.code, pump.name, pump.score);
    }
    for w in &report.warnings {
        println!("경고: {w}");
    }
}

fn print_catalog() {
    println!("== 지반 ==");
    for soil in catalog::soil_types() {
        println!(
            "{}: λ {:.1} W/m·K, 채열량 {:.0}~{:.0} W/m",
            soil.name, soil.conductivity_typical, soil.extraction_rate_min, soil.extraction_rate_max
        );
    }
    println!("== 그라우트 ==");
    for grout in catalog::grout_materials() {
        println!("{}: λ {:.2} W/m·K", grout.name, grout.thermal_conductivity);
    }
    println!("== 배관 ==");
    for pipe in catalog::pipes() {
        println!(
            "{}: 외경 {:.1} mm, 두께 {:.1} mm",
            pipe.name,
            pipe.outer_diameter_m * 1000.0,
            pipe.wall_thickness_m * 1000.0
        );
    }
    println!("== 브라인 ==");
    for fluid in catalog::fluids() {
        println!("{}: 동결 한계 {:.0} °C", fluid.name, fluid.min_temperature_c);
    }
    println!("== 순환펌프 ==");
    for pump in catalog::pumps() {
        println!(
            "{} ({}): 최대 {:.1} m³/h, {:.1} m",
            pump.code, pump.name, pump.max_flow_m3_h, pump.max_head_m
        );
    }
    println!("== 부하 형상 ==");
    for template in catalog::load_profile_templates() {
        println!("{}: {}", template.code, template.name);
    }
}
