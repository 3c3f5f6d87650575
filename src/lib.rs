//! 지중 열교환기(보어홀) 심도 계산과 브라인 회로 수력 계산 라이브러리.
//! 계산 엔진은 순수 함수이며 CLI 는 설정 파일과 보고서만 다룬다.

pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod hydraulics;
pub mod model;
pub mod sizing;
pub mod thermal;
pub mod trace;
pub mod units;

pub use error::SizingError;
