//! 状态反馈帧解析
//!
//! 底盘周期性上报六种状态帧：运动、灯光、系统，以及四路电机驱动器。
//! 本模块把 8 字节负载重建为强类型的物理量；位重建逻辑集中在这里，
//! 与状态合并步骤解耦，便于独立测试。
//!
//! 16 位字段重建：`value = low | (high << 8)`，随后按字段做符号
//! 解释与定点缩放（速度 ÷1000，电压/电流 ÷10）。

use crate::constants::LightMode;
use crate::ids::*;
use crate::{ProtocolError, ScoutFrame};

/// 低字节在前的 16 位重建（有符号）
#[inline]
fn i16_le(low: u8, high: u8) -> i16 {
    (low as u16 | (high as u16) << 8) as i16
}

/// 低字节在前的 16 位重建（无符号）
#[inline]
fn u16_le(low: u8, high: u8) -> u16 {
    low as u16 | (high as u16) << 8
}

/// 运动状态反馈
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionStatus {
    /// 线速度（m/s）
    pub linear_velocity: f64,
    /// 角速度（rad/s）
    pub angular_velocity: f64,
}

impl MotionStatus {
    fn from_payload(d: &[u8; 8]) -> Self {
        Self {
            linear_velocity: i16_le(d[0], d[1]) as f64 / 1000.0,
            angular_velocity: i16_le(d[2], d[3]) as f64 / 1000.0,
        }
    }
}

/// 灯光状态反馈
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightStatus {
    pub control_enabled: bool,
    pub front_mode: LightMode,
    pub front_custom: u8,
    pub rear_mode: LightMode,
    pub rear_custom: u8,
}

impl LightStatus {
    fn from_payload(d: &[u8; 8]) -> Self {
        Self {
            control_enabled: d[0] != 0,
            front_mode: LightMode::from(d[1]),
            front_custom: d[2],
            rear_mode: LightMode::from(d[3]),
            rear_custom: d[4],
        }
    }
}

/// 系统状态反馈
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemStatus {
    pub base_state: u8,
    pub control_mode: u8,
    /// 电池电压（V）
    pub battery_voltage: f64,
    pub fault_code: u16,
}

impl SystemStatus {
    fn from_payload(d: &[u8; 8]) -> Self {
        Self {
            base_state: d[0],
            control_mode: d[1],
            battery_voltage: u16_le(d[2], d[3]) as f64 / 10.0,
            fault_code: u16_le(d[4], d[5]),
        }
    }
}

/// 电机驱动器状态反馈
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorDriverStatus {
    /// 电流（A）
    pub current: f64,
    pub rpm: i16,
    /// 温度（℃）
    pub temperature: i8,
}

impl MotorDriverStatus {
    fn from_payload(d: &[u8; 8]) -> Self {
        Self {
            current: u16_le(d[0], d[1]) as f64 / 10.0,
            rpm: i16_le(d[2], d[3]),
            temperature: d[4] as i8,
        }
    }
}

/// 状态反馈消息（六种变体的闭合和类型）
///
/// 电机驱动器变体携带槽位下标：外部报文按 1-4 编号，内部统一为 0-3。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusMessage {
    Motion(MotionStatus),
    Light(LightStatus),
    System(SystemStatus),
    MotorDriver {
        /// 电机槽位（0-3）
        slot: usize,
        status: MotorDriverStatus,
    },
}

impl StatusMessage {
    /// 按 CAN ID 解析状态帧
    ///
    /// 校验和准入由接收端先行完成，这里只做负载重建。
    ///
    /// # 错误
    /// - `UnknownCanId`: 不属于状态帧 ID 集合
    /// - `InvalidLength`: 状态帧负载不足 8 字节
    pub fn from_can_frame(frame: &ScoutFrame) -> Result<Self, ProtocolError> {
        if frame.len != 8 {
            return Err(ProtocolError::InvalidLength {
                expected: 8,
                actual: frame.len as usize,
            });
        }
        let d = &frame.data;
        match frame.id {
            CAN_MSG_MOTION_STATUS_ID => Ok(Self::Motion(MotionStatus::from_payload(d))),
            CAN_MSG_LIGHT_STATUS_ID => Ok(Self::Light(LightStatus::from_payload(d))),
            CAN_MSG_SYSTEM_STATUS_ID => Ok(Self::System(SystemStatus::from_payload(d))),
            CAN_MSG_MOTOR1_DRIVER_STATUS_ID..=CAN_MSG_MOTOR4_DRIVER_STATUS_ID => {
                Ok(Self::MotorDriver {
                    slot: (frame.id - CAN_MSG_MOTOR1_DRIVER_STATUS_ID) as usize,
                    status: MotorDriverStatus::from_payload(d),
                })
            },
            id => Err(ProtocolError::UnknownCanId { id }),
        }
    }

    /// 按串口帧 ID 解析状态负载
    pub fn from_serial_payload(frame_id: u8, d: &[u8; 8]) -> Result<Self, ProtocolError> {
        match frame_id {
            FRAME_MOTION_STATUS_ID => Ok(Self::Motion(MotionStatus::from_payload(d))),
            FRAME_LIGHT_STATUS_ID => Ok(Self::Light(LightStatus::from_payload(d))),
            FRAME_SYSTEM_STATUS_ID => Ok(Self::System(SystemStatus::from_payload(d))),
            FRAME_MOTOR1_DRIVER_STATUS_ID..=FRAME_MOTOR4_DRIVER_STATUS_ID => {
                Ok(Self::MotorDriver {
                    slot: (frame_id - FRAME_MOTOR1_DRIVER_STATUS_ID) as usize,
                    status: MotorDriverStatus::from_payload(d),
                })
            },
            id => Err(ProtocolError::UnknownFrameId { id }),
        }
    }
}

impl TryFrom<&ScoutFrame> for StatusMessage {
    type Error = ProtocolError;

    fn try_from(frame: &ScoutFrame) -> Result<Self, Self::Error> {
        Self::from_can_frame(frame)
    }
}
