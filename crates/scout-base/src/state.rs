//! 底盘状态与状态仓库
//!
//! [`ScoutState`] 是合并目标：每条入站状态消息只更新自己携带的
//! 字段子集，其余字段保留上一次的值。首条消息到达前为全零初始。
//! 仓库独占持有状态，调用方只能拿到拷贝。

use parking_lot::Mutex;
use scout_protocol::{LightMode, StatusMessage};

/// 单灯状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightState {
    pub mode: LightMode,
    pub custom_value: u8,
}

/// 单个电机驱动器状态
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorState {
    /// 电流（A）
    pub current: f64,
    pub rpm: i16,
    /// 温度（℃）
    pub temperature: i8,
}

/// 底盘观测状态聚合
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoutState {
    // 运动
    /// 实测线速度（m/s）
    pub linear_velocity: f64,
    /// 实测角速度（rad/s）
    pub angular_velocity: f64,

    // 灯光
    pub light_control_enabled: bool,
    pub front_light: LightState,
    pub rear_light: LightState,

    // 系统
    pub control_mode: u8,
    pub base_state: u8,
    /// 电池电压（V）
    pub battery_voltage: f64,
    pub fault_code: u16,

    /// 四路电机驱动器（下标 0-3）
    pub motor_states: [MotorState; 4],
}

/// 状态仓库
///
/// 唯一的写入方是遥测解码器；任意线程可通过 [`snapshot`](Self::snapshot)
/// 取得一致性拷贝。
#[derive(Default)]
pub(crate) struct StateStore {
    inner: Mutex<ScoutState>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取一份一致性快照
    pub fn snapshot(&self) -> ScoutState {
        *self.inner.lock()
    }

    /// 按消息变体做部分更新
    pub fn apply(&self, msg: &StatusMessage) {
        let mut state = self.inner.lock();
        match msg {
            StatusMessage::Motion(m) => {
                state.linear_velocity = m.linear_velocity;
                state.angular_velocity = m.angular_velocity;
            },
            StatusMessage::Light(l) => {
                state.light_control_enabled = l.control_enabled;
                state.front_light = LightState {
                    mode: l.front_mode,
                    custom_value: l.front_custom,
                };
                state.rear_light = LightState {
                    mode: l.rear_mode,
                    custom_value: l.rear_custom,
                };
            },
            StatusMessage::System(s) => {
                state.control_mode = s.control_mode;
                state.base_state = s.base_state;
                state.battery_voltage = s.battery_voltage;
                state.fault_code = s.fault_code;
            },
            StatusMessage::MotorDriver { slot, status } => {
                if let Some(motor) = state.motor_states.get_mut(*slot) {
                    *motor = MotorState {
                        current: status.current,
                        rpm: status.rpm,
                        temperature: status.temperature,
                    };
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_protocol::{LightStatus, MotionStatus, MotorDriverStatus, SystemStatus};

    fn populated_store() -> StateStore {
        let store = StateStore::new();
        store.apply(&StatusMessage::Motion(MotionStatus {
            linear_velocity: 0.8,
            angular_velocity: -0.2,
        }));
        store.apply(&StatusMessage::System(SystemStatus {
            base_state: 0x00,
            control_mode: 0x01,
            battery_voltage: 25.7,
            fault_code: 0x0010,
        }));
        store.apply(&StatusMessage::Light(LightStatus {
            control_enabled: true,
            front_mode: LightMode::Breath,
            front_custom: 0,
            rear_mode: LightMode::ConstOn,
            rear_custom: 0,
        }));
        for slot in 0..4 {
            store.apply(&StatusMessage::MotorDriver {
                slot,
                status: MotorDriverStatus {
                    current: 1.0 + slot as f64,
                    rpm: 100 * slot as i16,
                    temperature: 40,
                },
            });
        }
        store
    }

    #[test]
    fn test_initial_state_is_zeroed() {
        let store = StateStore::new();
        assert_eq!(store.snapshot(), ScoutState::default());
    }

    #[test]
    fn test_motor_driver_update_touches_only_its_slot() {
        let store = populated_store();
        let before = store.snapshot();

        store.apply(&StatusMessage::MotorDriver {
            slot: 1,
            status: MotorDriverStatus {
                current: 9.9,
                rpm: -500,
                temperature: 55,
            },
        });

        let after = store.snapshot();
        assert_eq!(after.motor_states[1].current, 9.9);
        assert_eq!(after.motor_states[1].rpm, -500);
        assert_eq!(after.motor_states[1].temperature, 55);

        // 其余字段与更新前完全一致
        let mut expected = before;
        expected.motor_states[1] = after.motor_states[1];
        assert_eq!(after, expected);
    }

    #[test]
    fn test_motion_update_preserves_other_groups() {
        let store = populated_store();
        let before = store.snapshot();

        store.apply(&StatusMessage::Motion(MotionStatus {
            linear_velocity: 0.1,
            angular_velocity: 0.0,
        }));

        let after = store.snapshot();
        assert_eq!(after.linear_velocity, 0.1);
        assert_eq!(after.battery_voltage, before.battery_voltage);
        assert_eq!(after.front_light, before.front_light);
        assert_eq!(after.motor_states, before.motor_states);
    }

    #[test]
    fn test_out_of_range_slot_is_ignored() {
        let store = populated_store();
        let before = store.snapshot();
        store.apply(&StatusMessage::MotorDriver {
            slot: 7,
            status: MotorDriverStatus::default(),
        });
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let store = StateStore::new();
        let snap = store.snapshot();
        store.apply(&StatusMessage::Motion(MotionStatus {
            linear_velocity: 1.0,
            angular_velocity: 0.0,
        }));
        // 先前的快照不会被后续合并改写
        assert_eq!(snap.linear_velocity, 0.0);
    }
}
