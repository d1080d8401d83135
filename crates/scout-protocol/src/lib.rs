//! # Scout Protocol
//!
//! Scout 底盘 CAN/串口协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `ids`: CAN ID 与串口帧 ID 常量定义
//! - `constants`: 协议常量定义（控制模式、灯光模式等）
//! - `command`: 控制帧构建（运动控制、灯光控制）
//! - `status`: 状态反馈帧解析（六种反馈消息）
//! - `serial`: 串口帧打包与字节流解析器
//!
//! ## 字节序
//!
//! 状态帧中的 16 位字段低字节在前：`value = low | (high << 8)`。

pub mod command;
pub mod constants;
pub mod ids;
pub mod serial;
pub mod status;

// 重新导出常用类型
pub use command::*;
pub use constants::*;
pub use ids::*;
pub use serial::{SerialFrameParser, SerialParserStats, pack_command_frame, serial_frame_checksum};
pub use status::*;

use thiserror::Error;

/// CAN 2.0 标准帧的统一抽象
///
/// 协议层和硬件层之间的中间抽象：上层构建/解析 `ScoutFrame`，
/// 底层适配器负责与 SocketCAN 帧互转。
///
/// # 设计特性
///
/// - **Copy trait**：零成本复制，适合高频收发场景
/// - **固定 8 字节**：避免堆分配
/// - **无生命周期**：自包含数据结构，简化 API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoutFrame {
    /// CAN ID（标准帧，11-bit）
    pub id: u32,

    /// 帧数据（固定 8 字节，未使用部分为 0）
    pub data: [u8; 8],

    /// 有效数据长度 (0-8)
    pub len: u8,
}

impl ScoutFrame {
    /// 创建标准帧
    pub fn new(id: u32, data: &[u8]) -> Self {
        let mut fixed_data = [0u8; 8];
        let len = data.len().min(8);
        fixed_data[..len].copy_from_slice(&data[..len]);

        Self {
            id,
            data: fixed_data,
            len: len as u8,
        }
    }

    /// 获取数据切片（只包含有效数据）
    pub fn data_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

/// 协议解析错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Unknown CAN ID: 0x{id:X}")]
    UnknownCanId { id: u32 },

    #[error("Unknown serial frame id: 0x{id:02X}")]
    UnknownFrameId { id: u8 },
}

/// AgileX 风格的 CAN 帧校验和
///
/// 对 ID 低字节、ID 高字节、DLC 以及 `data[..dlc-1]`（即除末字节校验槽
/// 之外的负载）按字节求和取模。命令帧打包时写入 `data[7]`，
/// 接收端以直接相等判断准入。
pub fn can_frame_checksum(id: u32, data: &[u8; 8], dlc: u8) -> u8 {
    let mut sum = (id & 0xFF) as u8;
    sum = sum.wrapping_add(((id >> 8) & 0xFF) as u8);
    sum = sum.wrapping_add(dlc);
    let payload_len = (dlc as usize).saturating_sub(1).min(8);
    for &byte in &data[..payload_len] {
        sum = sum.wrapping_add(byte);
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_new_truncates_to_eight_bytes() {
        let frame = ScoutFrame::new(0x131, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(frame.len, 8);
        assert_eq!(frame.data, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_frame_data_slice() {
        let frame = ScoutFrame::new(0x131, &[0xAA, 0xBB]);
        assert_eq!(frame.data_slice(), &[0xAA, 0xBB]);
        assert_eq!(frame.data[2..], [0u8; 6]);
    }

    #[test]
    fn test_checksum_covers_id_dlc_and_payload() {
        let data = [1, 2, 3, 4, 5, 6, 7, 0];
        let sum = can_frame_checksum(0x131, &data, 8);
        // 0x31 + 0x01 + 8 + (1+2+3+4+5+6+7) = 0x56
        assert_eq!(sum, 0x31 + 0x01 + 8 + 28);
    }

    #[test]
    fn test_checksum_excludes_checksum_slot() {
        let mut data = [1, 2, 3, 4, 5, 6, 7, 0];
        let before = can_frame_checksum(0x131, &data, 8);
        data[7] = 0xFF;
        assert_eq!(before, can_frame_checksum(0x131, &data, 8));
    }

    #[test]
    fn test_checksum_wraps() {
        let data = [0xFF; 8];
        // 求和溢出按 u8 回绕，不 panic
        let _ = can_frame_checksum(0x7FF, &data, 8);
    }
}
