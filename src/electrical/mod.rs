//! 교류 부하의 전력/전류 환산 모듈.
//! 전압·역률·효율·상수를 고정한 채 kVA, kW, hp, A 중 하나로부터 나머지를 계산한다.

pub mod power_model;

pub use power_model::{PowerError, PowerModel, SolveReport, HP_WATTS, THREE_PHASE_OFFSET};
