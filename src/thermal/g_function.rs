//! 유한 선열원(FLS) g-함수와 응답 함수 전략.
//!
//! 단일 보어홀의 무차원 열응답 `g(t)` 를 적분으로 구하고, 다공 간섭 등
//! 외부에서 계산한 응답 곡선을 같은 인터페이스로 끼울 수 있게 한다.
//! 열저항은 `R(t) = g / (2πλ)`.

use std::f64::consts::PI;

use statrs::function::erf::erf;

use crate::error::{ensure_positive, SizingError};

/// 10년 [s] (VDI 4640 기저부하)
pub const TEN_YEARS_S: f64 = 10.0 * 365.25 * 24.0 * 3600.0;
/// 1개월 [s] (VDI 4640 주기부하)
pub const ONE_MONTH_S: f64 = 30.0 * 24.0 * 3600.0;
/// 6시간 [s] (VDI 4640 최대부하)
pub const SIX_HOURS_S: f64 = 6.0 * 3600.0;
/// 월별 중첩 계산의 한 달 [s]. 1년 = 12 × 730 h.
pub const MONTH_STEP_S: f64 = 730.0 * 3600.0;

const SIMPSON_INTERVALS: usize = 512;
/// 적분 상한 `s = √40 / r_b` (e^-40 이하 무시)
const UPPER_EXPONENT: f64 = 40.0;
const SMALL_ARGUMENT: f64 = 1e-2;

/// 시간 `time_s` 와 보어홀 길이 `depth_m` 에 대한 무차원 열응답을 주는 전략.
pub trait ResponseFunction {
    fn g(&self, time_s: f64, depth_m: f64) -> f64;
}

impl<F> ResponseFunction for F
where
    F: Fn(f64, f64) -> f64,
{
    fn g(&self, time_s: f64, depth_m: f64) -> f64 {
        self(time_s, depth_m)
    }
}

/// 단일 보어홀 유한 선열원 응답.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiniteLineSource {
    pub borehole_radius_m: f64,
    /// 지반 열확산율 [m²/s]
    pub diffusivity: f64,
}

impl FiniteLineSource {
    pub fn new(borehole_radius_m: f64, diffusivity: f64) -> Result<Self, SizingError> {
        ensure_positive(borehole_radius_m, "보어홀 반경")?;
        ensure_positive(diffusivity, "지반 열확산율")?;
        Ok(Self {
            borehole_radius_m,
            diffusivity,
        })
    }
}

impl ResponseFunction for FiniteLineSource {
    fn g(&self, time_s: f64, depth_m: f64) -> f64 {
        finite_line_source(time_s, depth_m, self.borehole_radius_m, self.diffusivity)
    }
}

/// `ln(t/t_s)` 대 g 표로 주어진 응답 (Eskilson 형식, `t_s = H²/(9α)`).
///
/// 표 범위 밖은 양 끝값으로 고정한다.
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedResponse {
    ln_t_over_ts: Vec<f64>,
    values: Vec<f64>,
    diffusivity: f64,
}

impl TabulatedResponse {
    /// `points` 는 (ln(t/t_s), g) 쌍. 오름차순이어야 한다.
    pub fn new(points: &[(f64, f64)], diffusivity: f64) -> Result<Self, SizingError> {
        ensure_positive(diffusivity, "지반 열확산율")?;
        if points.len() < 2 {
            return Err(SizingError::configuration("응답 표에는 최소 2개의 점이 필요합니다."));
        }
        if points.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(SizingError::configuration(
                "응답 표의 ln(t/ts) 값은 오름차순이어야 합니다.",
            ));
        }
        if points.iter().any(|(x, g)| !x.is_finite() || !g.is_finite() || *g < 0.0) {
            return Err(SizingError::configuration("응답 표에 유효하지 않은 값이 있습니다."));
        }
        Ok(Self {
            ln_t_over_ts: points.iter().map(|(x, _)| *x).collect(),
            values: points.iter().map(|(_, g)| *g).collect(),
            diffusivity,
        })
    }
}

impl ResponseFunction for TabulatedResponse {
    fn g(&self, time_s: f64, depth_m: f64) -> f64 {
        if time_s <= 0.0 || depth_m <= 0.0 {
            return 0.0;
        }
        let ts = depth_m * depth_m / (9.0 * self.diffusivity);
        let x = (time_s / ts).ln();
        let xs = &self.ln_t_over_ts;
        let last = xs.len() - 1;
        if x <= xs[0] {
            return self.values[0];
        }
        if x >= xs[last] {
            return self.values[last];
        }
        let upper = xs.partition_point(|v| *v <= x).min(last);
        let lower = upper - 1;
        let ratio = (x - xs[lower]) / (xs[upper] - xs[lower]);
        self.values[lower] + (self.values[upper] - self.values[lower]) * ratio
    }
}

/// 응답 함수로부터 시간 `time_s` 의 지반 열저항 [m·K/W].
pub fn resistance_at(
    response: &dyn ResponseFunction,
    time_s: f64,
    depth_m: f64,
    ground_conductivity: f64,
) -> f64 {
    response.g(time_s, depth_m) / (2.0 * PI * ground_conductivity)
}

/// 유한 선열원 g-함수 (보어홀 벽 평균 온도 기준).
///
/// `g = ½ ∫_{1/√(4αt)}^{∞} e^{-r_b² s²} / s · Y(Hs) ds`,
/// `Y(h) = (4·ierf(h) − ierf(2h)) / h`.
/// `t ≤ 0` 또는 길이/물성이 0 이하이면 0 을 돌려준다.
pub fn finite_line_source(
    time_s: f64,
    depth_m: f64,
    borehole_radius_m: f64,
    diffusivity: f64,
) -> f64 {
    if !(time_s > 0.0 && depth_m > 0.0 && borehole_radius_m > 0.0 && diffusivity > 0.0) {
        return 0.0;
    }

    let upper = UPPER_EXPONENT.sqrt() / borehole_radius_m;
    // Y(Hs) ~ (Hs)³ 이므로 1e-6/H 아래는 기여가 없다.
    let lower = (1.0 / (4.0 * diffusivity * time_s).sqrt()).max(1e-6 / depth_m);
    if !lower.is_finite() || lower >= upper {
        return 0.0;
    }

    // s = e^u 로 치환: ds/s = du
    let (u0, u1) = (lower.ln(), upper.ln());
    let integrand = |u: f64| {
        let s = u.exp();
        (-(borehole_radius_m * s).powi(2)).exp() * length_factor(depth_m * s)
    };
    0.5 * simpson(integrand, u0, u1, SIMPSON_INTERVALS)
}

/// 적분 오차 함수 `ierf(x) = x·erf(x) − (1 − e^{-x²})/√π`.
fn ierf(x: f64) -> f64 {
    x * erf(x) + (-x * x).exp_m1() / PI.sqrt()
}

/// `Y(h) = (4·ierf(h) − ierf(2h)) / h`. 작은 h 는 급수로 계산한다.
fn length_factor(h: f64) -> f64 {
    if h < SMALL_ARGUMENT {
        2.0 / PI.sqrt() * (h.powi(3) - h.powi(5))
    } else {
        (4.0 * ierf(h) - ierf(2.0 * h)) / h
    }
}

fn simpson(f: impl Fn(f64) -> f64, a: f64, b: f64, intervals: usize) -> f64 {
    let n = if intervals % 2 == 0 { intervals } else { intervals + 1 };
    let h = (b - a) / n as f64;
    let mut sum = f(a) + f(b);
    for i in 1..n {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(a + i as f64 * h);
    }
    sum * h / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const RB: f64 = 0.076;
    const ALPHA: f64 = 1.0e-6;

    #[test]
    fn non_positive_time_gives_zero() {
        assert_eq!(finite_line_source(0.0, 100.0, RB, ALPHA), 0.0);
        assert_eq!(finite_line_source(-5.0, 100.0, RB, ALPHA), 0.0);
    }

    #[test]
    fn short_times_match_infinite_line_source() {
        // ILS: g ≈ ½(−γ − ln(r²/(4αt)))
        let t = ONE_MONTH_S;
        let x = RB * RB / (4.0 * ALPHA * t);
        let ils = 0.5 * (-0.577_215_664_9 - x.ln());
        let fls = finite_line_source(t, 100.0, RB, ALPHA);
        assert!(((fls - ils) / ils).abs() < 0.03, "fls = {fls}, ils = {ils}");
    }

    #[test]
    fn response_increases_with_time_and_levels_off() {
        let g6h = finite_line_source(SIX_HOURS_S, 100.0, RB, ALPHA);
        let g1m = finite_line_source(ONE_MONTH_S, 100.0, RB, ALPHA);
        let g10y = finite_line_source(TEN_YEARS_S, 100.0, RB, ALPHA);
        assert!(0.0 < g6h && g6h < g1m && g1m < g10y);

        let far = finite_line_source(1e12, 100.0, RB, ALPHA);
        let farther = finite_line_source(1e14, 100.0, RB, ALPHA);
        assert!(far.is_finite() && farther.is_finite());
        assert!((farther - far).abs() < 1e-2);
        assert!(farther > 5.0 && farther < 8.0);
    }

    #[test]
    fn small_argument_series_is_continuous() {
        let below = length_factor(SMALL_ARGUMENT * 0.999_999);
        let above = length_factor(SMALL_ARGUMENT * 1.000_001);
        assert!((below - above).abs() / above < 1e-3);
    }

    #[test]
    fn tabulated_response_clamps_and_interpolates() {
        let table = TabulatedResponse::new(&[(-4.0, 2.0), (0.0, 6.0), (2.0, 7.0)], ALPHA)
            .expect("valid table");
        let depth = 100.0;
        let ts = depth * depth / (9.0 * ALPHA);
        assert!((table.g(ts * (-8.0_f64).exp(), depth) - 2.0).abs() < 1e-12);
        assert!((table.g(ts * (-2.0_f64).exp(), depth) - 4.0).abs() < 1e-9);
        assert!((table.g(ts * 100.0, depth) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn tabulated_response_rejects_unsorted_points() {
        assert!(TabulatedResponse::new(&[(0.0, 1.0), (-1.0, 2.0)], ALPHA).is_err());
    }

    #[test]
    fn closures_are_response_functions() {
        let doubled = |t: f64, h: f64| 2.0 * finite_line_source(t, h, RB, ALPHA);
        let fls = FiniteLineSource::new(RB, ALPHA).expect("valid");
        let r_closure = resistance_at(&doubled, ONE_MONTH_S, 100.0, 2.0);
        let r_fls = resistance_at(&fls, ONE_MONTH_S, 100.0, 2.0);
        assert!((r_closure - 2.0 * r_fls).abs() < 1e-12);
    }
}
