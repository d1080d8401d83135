//! # Scout Base
//!
//! Scout 底盘的指令/遥测桥：接收应用线程的运动与灯光意图，
//! 以固定节拍编码成二进制帧经 CAN 或串口下发，同时把异步到达
//! 的遥测帧解码、合并成线程安全的底盘状态快照。
//!
//! ## 架构
//!
//! ```text
//! API 调用方 → 指令状态 → 控制循环 → 帧编码 → 活跃传输   （出站）
//! 传输接收线程 → 遥测解码（校验和准入） → 状态仓库        （入站）
//! ```
//!
//! 两条通路不共享锁；三把独立的锁（运动指令、灯光指令、底盘
//! 状态）只做锁内拷贝，从不跨 IO 持有、从不嵌套。
//!
//! ## 使用场景
//!
//! 适用于上层导航/控制代码：下发速度意图、读取底盘观测状态。
//! 传输细节（SocketCAN / 串口）由 [`TransportKind`] 在连接时选定，
//! 会话内互斥。

mod base;
mod command;
mod connection;
mod control_loop;
mod decoder;
mod error;
mod state;

pub use base::{ScoutBase, ScoutBaseConfig};
pub use command::{LightCommand, MotionCommand};
pub use connection::TransportKind;
pub use error::ScoutError;
pub use state::{LightState, MotorState, ScoutState};

// 协议层常用类型直接再导出，调用方无需显式依赖 scout-protocol
pub use scout_protocol::{FaultClearFlag, LightMode};
