//! # API 层
//!
//! 前端以 `action` 参数走单一端点，本层负责参数合并、动作解析、
//! 授权检查与域写锁，再交由服务层处理业务。

pub mod action;
pub mod dispatch;
pub mod envelope;
pub mod locks;
pub mod params;

pub use action::{AccessLevel, Action, LockDomain};
pub use envelope::ApiEnvelope;
pub use locks::WriteGate;
pub use params::ParamBag;
