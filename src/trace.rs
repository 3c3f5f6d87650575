//! 계산 단계별 디버그 기록.
//!
//! 계산기는 전역 상태에 쓰지 않고 호출자가 넘겨준 [`TraceSink`] 에만 기록한다.
//! 기본값은 아무것도 하지 않는 [`NoopTrace`] 이며, 기록 여부는 결과에 영향을 주지 않는다.

use std::sync::Mutex;

/// 단계 이름과 (키, 값) 목록을 받는 기록 대상.
pub trait TraceSink {
    fn record(&self, step: &str, values: &[(&str, f64)]);
}

/// 기록하지 않는다.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTrace;

impl TraceSink for NoopTrace {
    fn record(&self, _step: &str, _values: &[(&str, f64)]) {}
}

/// `tracing` 의 debug 이벤트로 내보낸다.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTrace;

impl TraceSink for TracingTrace {
    fn record(&self, step: &str, values: &[(&str, f64)]) {
        let rendered = values
            .iter()
            .map(|(k, v)| format!("{k}={v:.6}"))
            .collect::<Vec<_>>()
            .join(", ");
        tracing::debug!(target: "borehole_sizing", step = step, "{rendered}");
    }
}

/// 기록 한 건.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub step: String,
    pub values: Vec<(String, f64)>,
}

/// 메모리에 쌓아 두는 기록기. 테스트와 보고서용.
#[derive(Debug, Default)]
pub struct MemoryTrace {
    entries: Mutex<Vec<TraceEntry>>,
}

impl MemoryTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// 지금까지 기록된 항목의 복사본.
    pub fn entries(&self) -> Vec<TraceEntry> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// 주어진 단계의 마지막 기록에서 값을 찾는다.
    pub fn value(&self, step: &str, key: &str) -> Option<f64> {
        self.entries()
            .iter()
            .rev()
            .find(|e| e.step == step)
            .and_then(|e| e.values.iter().find(|(k, _)| k == key).map(|(_, v)| *v))
    }
}

impl TraceSink for MemoryTrace {
    fn record(&self, step: &str, values: &[(&str, f64)]) {
        let entry = TraceEntry {
            step: step.to_string(),
            values: values.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        };
        match self.entries.lock() {
            Ok(mut guard) => guard.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
