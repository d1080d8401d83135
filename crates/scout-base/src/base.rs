//! ScoutBase 对外 API
//!
//! 封装指令状态、控制循环线程、遥测解码与连接管理。三把独立的
//! 锁（运动指令、灯光指令、底盘状态）各自保护一小块扁平记录，
//! 都不跨 IO 持有，也从不嵌套。

use crate::command::{LightCommand, LightCommandState, MotionCommand};
use crate::connection::{ConnectionManager, TransportKind};
use crate::control_loop::{LoopContext, control_loop};
use crate::error::ScoutError;
use crate::state::{ScoutState, StateStore};
use crossbeam_channel::{Sender, bounded};
use parking_lot::Mutex;
use scout_protocol::{FaultClearFlag, SerialFrameParser};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error};

/// ScoutBase 配置
///
/// 速度限幅对应 Scout 底盘的物理能力；超限指令会被钳位到边界
/// 而不是拒绝。
#[derive(Debug, Clone, PartialEq)]
pub struct ScoutBaseConfig {
    /// 控制循环周期
    pub control_period: Duration,
    /// 线速度上限（m/s）
    pub max_linear_velocity: f64,
    /// 线速度下限（m/s）
    pub min_linear_velocity: f64,
    /// 角速度上限（rad/s）
    pub max_angular_velocity: f64,
    /// 角速度下限（rad/s）
    pub min_angular_velocity: f64,
}

impl Default for ScoutBaseConfig {
    fn default() -> Self {
        Self {
            control_period: Duration::from_millis(50),
            max_linear_velocity: 1.5,
            min_linear_velocity: -1.5,
            max_angular_velocity: 0.5235988,
            min_angular_velocity: -0.5235988,
        }
    }
}

/// 运行中的控制循环句柄
struct LoopHandle {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Scout 底盘指令/遥测桥
///
/// - 出站：API 线程写指令状态，控制循环按固定节拍编码下发；
/// - 入站：传输接收线程经解码器合并进状态仓库，任意线程可取快照。
///
/// 两条通路不共享任何锁，除了各自短暂的临界区外互不阻塞。
///
/// # 示例
///
/// ```no_run
/// use scout_base::{FaultClearFlag, ScoutBase, TransportKind};
///
/// let base = ScoutBase::new();
/// base.connect(TransportKind::Serial, "/dev/ttyUSB0", 115200).unwrap();
/// base.set_motion_command(0.5, 0.0, FaultClearFlag::None);
/// let state = base.state();
/// println!("battery: {:.1} V", state.battery_voltage);
/// ```
pub struct ScoutBase {
    config: ScoutBaseConfig,
    motion_cmd: Arc<Mutex<MotionCommand>>,
    light_cmd: Arc<Mutex<LightCommandState>>,
    store: Arc<StateStore>,
    serial_parser: Arc<Mutex<SerialFrameParser>>,
    conn: Arc<ConnectionManager>,
    loop_ctl: Mutex<Option<LoopHandle>>,
}

impl ScoutBase {
    /// 以默认配置创建
    pub fn new() -> Self {
        Self::with_config(ScoutBaseConfig::default())
    }

    pub fn with_config(config: ScoutBaseConfig) -> Self {
        Self {
            config,
            motion_cmd: Arc::new(Mutex::new(MotionCommand::default())),
            light_cmd: Arc::new(Mutex::new(LightCommandState::default())),
            store: Arc::new(StateStore::new()),
            serial_parser: Arc::new(Mutex::new(SerialFrameParser::new())),
            conn: Arc::new(ConnectionManager::new()),
            loop_ctl: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ScoutBaseConfig {
        &self.config
    }

    /// 建立传输连接（会话内互斥，CAN/串口二选一）
    ///
    /// CAN 忽略 `baud_rate`（SocketCAN 波特率由系统工具配置）。
    ///
    /// # 错误
    /// - [`ScoutError::AlreadyConnected`]
    /// - [`ScoutError::ConnectFailure`]（可重试）
    pub fn connect(
        &self,
        kind: TransportKind,
        device: &str,
        baud_rate: u32,
    ) -> Result<(), ScoutError> {
        self.conn
            .connect(kind, device, baud_rate, &self.store, &self.serial_parser)
    }

    /// 拆掉活跃传输（幂等）
    pub fn disconnect(&self) {
        self.conn.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    /// 下发运动指令
    ///
    /// 超出配置范围的速度被钳位到最近的边界（静默纠正，不是错误）。
    /// 首次调用时惰性启动控制循环（线程安全、幂等）。
    pub fn set_motion_command(&self, linear: f64, angular: f64, fault_clear_flag: FaultClearFlag) {
        let linear = linear.clamp(
            self.config.min_linear_velocity,
            self.config.max_linear_velocity,
        );
        let angular = angular.clamp(
            self.config.min_angular_velocity,
            self.config.max_angular_velocity,
        );

        *self.motion_cmd.lock() = MotionCommand {
            linear_velocity: linear,
            angular_velocity: angular,
            fault_clear_flag,
        };

        // 指令先落地再保证循环在跑：首个节拍看到的一定是这次的指令
        self.start();
    }

    /// 下发灯光指令并使能灯控
    ///
    /// 下一个节拍发送一次，之后不再重复下发（被动携带）。
    pub fn set_light_command(&self, cmd: LightCommand) {
        let mut light = self.light_cmd.lock();
        light.cmd = cmd;
        light.enabled = true;
        light.change_requested = true;
    }

    /// 关闭灯控
    ///
    /// 存储的灯效保持不动：之后不带新指令直接重新使能，
    /// 恢复的就是之前的灯效。
    pub fn disable_light_control(&self) {
        let mut light = self.light_cmd.lock();
        light.enabled = false;
        light.change_requested = true;
    }

    /// 取底盘状态快照（锁内拷贝，与并发合并互不撕裂）
    pub fn state(&self) -> ScoutState {
        self.store.snapshot()
    }

    /// 显式启动控制循环（幂等；并发双启动只会产生一个循环）
    pub fn start(&self) {
        let mut guard = self.loop_ctl.lock();
        if guard.is_some() {
            return;
        }

        let (stop_tx, stop_rx) = bounded(1);
        let ctx = LoopContext {
            period: self.config.control_period,
            max_linear_velocity: self.config.max_linear_velocity,
            max_angular_velocity: self.config.max_angular_velocity,
            motion_cmd: self.motion_cmd.clone(),
            light_cmd: self.light_cmd.clone(),
            conn: self.conn.clone(),
        };

        let handle = std::thread::Builder::new()
            .name("scout-control-loop".into())
            .spawn(move || control_loop(ctx, stop_rx))
            .expect("failed to spawn control loop thread");

        *guard = Some(LoopHandle { stop_tx, handle });
        debug!("Control loop thread spawned");
    }

    /// 停止控制循环（幂等）
    ///
    /// 发出停止信号立即唤醒循环（不等整个周期），join 后返回；
    /// 从未启动或已停止时是空操作。停止后可再次 [`start`](Self::start)。
    pub fn stop(&self) {
        let handle = self.loop_ctl.lock().take();
        if let Some(LoopHandle { stop_tx, handle }) = handle {
            // 循环可能已因发送端失效退出，发送失败可忽略
            let _ = stop_tx.send(());
            if handle.join().is_err() {
                error!("Control loop thread panicked during join");
            }
        }
    }
}

impl Default for ScoutBase {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScoutBase {
    /// 析构顺序：先停控制循环，再拆接收路径
    fn drop(&mut self) {
        self.stop();
        self.conn.disconnect();
    }
}
