use thiserror::Error;

/// 사이징 엔진 전체에서 사용하는 오류.
///
/// 어떤 오류도 내부에서 조용히 복구하지 않는다. 호출자가 한계를 완화하거나
/// 입력을 고칠지 결정한다.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    /// 잘못된 형상/물성 입력 (내경 ≥ 외경, 0 이하 길이 등)
    #[error("형상 오류: {0}")]
    Geometry(String),

    /// 반복 계산이 반복 횟수 또는 최대 심도 한계 안에서 수렴하지 못함
    #[error("수렴 실패 ({iterations}회, 심도 {depth_m:.1} m): {reason}")]
    Convergence {
        /// 수행한 반복 횟수
        iterations: usize,
        /// 중단 시점의 심도 [m]
        depth_m: f64,
        /// 중단 사유
        reason: String,
    },

    /// 지중 온도와 모순되는 온도 한계, COP ≤ 1 등 물리적으로 일관되지 않은 설정
    #[error("설정 오류: {0}")]
    Configuration(String),
}

impl SizingError {
    pub(crate) fn geometry(msg: impl Into<String>) -> Self {
        SizingError::Geometry(msg.into())
    }

    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        SizingError::Configuration(msg.into())
    }

    /// 수렴 실패 여부. 경계값에서의 정상 결과와 구분하기 위해 사용한다.
    pub fn is_convergence(&self) -> bool {
        matches!(self, SizingError::Convergence { .. })
    }
}

/// 양수 여부를 검사한다. NaN 도 거부한다.
pub(crate) fn ensure_positive(value: f64, what: &str) -> Result<(), SizingError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SizingError::geometry(format!(
            "{what} 값은 0보다 커야 합니다 (입력: {value})"
        )))
    }
}
