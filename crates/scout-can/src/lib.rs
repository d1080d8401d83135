//! # Scout CAN 传输层
//!
//! 基于 Linux SocketCAN 的双工帧通道：发送走调用方线程，
//! 接收由传输自有的后台线程驱动，每收到一条有效数据帧就调用
//! 注册的回调。回调在接收线程上下文执行，上层必须按跨线程
//! 投递处理。
//!
//! ## 限制
//!
//! - **仅限 Linux 平台**：SocketCAN 是 Linux 内核特性
//! - **接口配置**：波特率由系统工具（`ip link`）完成，不在应用层设置

use thiserror::Error;

#[cfg(target_os = "linux")]
mod transport;

#[cfg(target_os = "linux")]
pub use transport::CanTransport;

/// 收到一条 CAN 帧时的回调类型
pub type FrameCallback = Box<dyn Fn(scout_protocol::ScoutFrame) + Send + Sync>;

/// CAN 传输层错误类型
#[derive(Error, Debug)]
pub enum CanError {
    #[error("Failed to open CAN interface '{interface}': {message}")]
    Open { interface: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid CAN ID: 0x{id:X}")]
    InvalidId { id: u32 },

    #[error("Transport not open")]
    NotOpen,
}
