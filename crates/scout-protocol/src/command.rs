//! 控制帧构建
//!
//! 运动控制与灯光控制指令的 8 字节负载布局，以及到 CAN 帧 / 串口帧
//! 的打包。CAN 路径在打包时填充末字节校验和；串口路径的校验和由
//! [`crate::serial::pack_command_frame`] 在组完整帧时计算。

use crate::constants::{FaultClearFlag, LIGHT_CTRL_DISABLE, LIGHT_CTRL_ENABLE, LightMode};
use crate::ids::{
    CAN_MSG_LIGHT_CONTROL_CMD_ID, CAN_MSG_MOTION_CONTROL_CMD_ID, FRAME_LIGHT_CONTROL_CMD_ID,
    FRAME_MOTION_CONTROL_CMD_ID, SERIAL_FRAME_LEN,
};
use crate::serial::pack_command_frame;
use crate::{ScoutFrame, can_frame_checksum};

/// 运动控制指令帧
///
/// 负载布局：
/// `[control_mode, fault_clear_flag, linear_pct, angular_pct, 0, 0, count, checksum]`
///
/// 速度以有符号百分比（-100..=100）折叠进一个字节传输；
/// `count` 为每次发送递增并回绕的 8 位序列计数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionControlFrame {
    /// 指令来源（[`crate::CTRL_MODE_CMD_CAN`] / [`crate::CTRL_MODE_CMD_UART`]）
    pub control_mode: u8,
    pub fault_clear_flag: FaultClearFlag,
    /// 线速度百分比（-100..=100）
    pub linear_percent: i8,
    /// 角速度百分比（-100..=100）
    pub angular_percent: i8,
    /// 序列计数（回绕）
    pub count: u8,
}

impl MotionControlFrame {
    fn payload(&self) -> [u8; 8] {
        [
            self.control_mode,
            self.fault_clear_flag.into(),
            self.linear_percent as u8,
            self.angular_percent as u8,
            0,
            0,
            self.count,
            0,
        ]
    }

    /// 打包为 CAN 帧（填充校验和字节）
    pub fn to_can_frame(&self) -> ScoutFrame {
        let mut data = self.payload();
        data[7] = can_frame_checksum(CAN_MSG_MOTION_CONTROL_CMD_ID, &data, 8);
        ScoutFrame {
            id: CAN_MSG_MOTION_CONTROL_CMD_ID,
            data,
            len: 8,
        }
    }

    /// 打包为完整串口帧
    pub fn to_serial_frame(&self) -> [u8; SERIAL_FRAME_LEN] {
        pack_command_frame(FRAME_MOTION_CONTROL_CMD_ID, &self.payload())
    }
}

/// 灯光控制指令帧
///
/// 负载布局：
/// `[light_ctrl_enable, front_mode, front_custom, rear_mode, rear_custom, 0, count, checksum]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightControlFrame {
    pub enable: bool,
    pub front_mode: LightMode,
    pub front_custom: u8,
    pub rear_mode: LightMode,
    pub rear_custom: u8,
    pub count: u8,
}

impl LightControlFrame {
    /// 构建"灯控关闭"帧：两灯常灭，自定义值归零
    pub fn disabled(count: u8) -> Self {
        Self {
            enable: false,
            front_mode: LightMode::ConstOff,
            front_custom: 0,
            rear_mode: LightMode::ConstOff,
            rear_custom: 0,
            count,
        }
    }

    fn payload(&self) -> [u8; 8] {
        let enable = if self.enable {
            LIGHT_CTRL_ENABLE
        } else {
            LIGHT_CTRL_DISABLE
        };
        [
            enable,
            self.front_mode.into(),
            self.front_custom,
            self.rear_mode.into(),
            self.rear_custom,
            0,
            self.count,
            0,
        ]
    }

    /// 打包为 CAN 帧（填充校验和字节）
    pub fn to_can_frame(&self) -> ScoutFrame {
        let mut data = self.payload();
        data[7] = can_frame_checksum(CAN_MSG_LIGHT_CONTROL_CMD_ID, &data, 8);
        ScoutFrame {
            id: CAN_MSG_LIGHT_CONTROL_CMD_ID,
            data,
            len: 8,
        }
    }

    /// 打包为完整串口帧
    pub fn to_serial_frame(&self) -> [u8; SERIAL_FRAME_LEN] {
        pack_command_frame(FRAME_LIGHT_CONTROL_CMD_ID, &self.payload())
    }
}
