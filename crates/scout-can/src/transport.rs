//! SocketCAN 传输实现
//!
//! 打开即启动读超时（2ms），确保停止信号能及时打断接收线程。
//! 错误帧与远程帧在本层过滤，不会进入回调。

use crate::{CanError, FrameCallback};
use parking_lot::Mutex;
use scout_protocol::ScoutFrame;
use socketcan::{CanFrame, CanSocket, EmbeddedFrame, Frame, Socket};
use std::io::ErrorKind;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{error, trace, warn};

/// 接收线程唤醒周期，同时是 close() 的最大等待时间
const READ_TIMEOUT: Duration = Duration::from_millis(2);

/// SocketCAN 传输
///
/// # 示例
///
/// ```no_run
/// use scout_can::CanTransport;
///
/// let can = CanTransport::open("can0").unwrap();
/// can.set_receive_callback(|frame| println!("frame id 0x{:X}", frame.id));
/// can.start();
/// ```
pub struct CanTransport {
    /// 接口名称（如 "can0"）
    interface: String,
    socket: Arc<CanSocket>,
    callback: Arc<Mutex<Option<FrameCallback>>>,
    stop_flag: Arc<AtomicBool>,
    rx_thread: Mutex<Option<JoinHandle<()>>>,
    open: Arc<AtomicBool>,
}

impl CanTransport {
    /// 打开 CAN 接口
    ///
    /// # 错误
    /// - `CanError::Open`: 接口不存在、未启动或无权限
    pub fn open(interface: impl Into<String>) -> Result<Self, CanError> {
        let interface = interface.into();

        let socket = CanSocket::open(&interface).map_err(|e| CanError::Open {
            interface: interface.clone(),
            message: e.to_string(),
        })?;
        socket.set_read_timeout(READ_TIMEOUT).map_err(CanError::Io)?;

        trace!("CAN interface '{}' opened", interface);

        Ok(Self {
            interface,
            socket: Arc::new(socket),
            callback: Arc::new(Mutex::new(None)),
            stop_flag: Arc::new(AtomicBool::new(false)),
            rx_thread: Mutex::new(None),
            open: Arc::new(AtomicBool::new(true)),
        })
    }

    /// 获取接口名称
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// 注册接收回调
    ///
    /// 必须在 [`start`](Self::start) 之前调用；回调在接收线程上执行。
    pub fn set_receive_callback(&self, callback: impl Fn(ScoutFrame) + Send + Sync + 'static) {
        *self.callback.lock() = Some(Box::new(callback));
    }

    /// 启动接收线程（幂等）
    pub fn start(&self) {
        let mut guard = self.rx_thread.lock();
        if guard.is_some() {
            return;
        }

        let socket = self.socket.clone();
        let callback = self.callback.clone();
        let stop_flag = self.stop_flag.clone();
        let interface = self.interface.clone();

        let handle = std::thread::Builder::new()
            .name("scout-can-rx".into())
            .spawn(move || rx_loop(socket, callback, stop_flag, interface))
            .expect("failed to spawn CAN receive thread");
        *guard = Some(handle);
    }

    /// 发送一条标准帧（Fire-and-Forget）
    ///
    /// # 错误
    /// - `CanError::NotOpen`: 传输已关闭
    /// - `CanError::InvalidId`: ID 超出 11-bit 标准帧范围
    /// - `CanError::Io`: 发送失败（如总线错误）
    pub fn send_frame(&self, frame: &ScoutFrame) -> Result<(), CanError> {
        if !self.is_open() {
            return Err(CanError::NotOpen);
        }

        let id = socketcan::StandardId::new(frame.id as u16)
            .filter(|_| frame.id <= 0x7FF)
            .ok_or(CanError::InvalidId { id: frame.id })?;
        let can_frame =
            CanFrame::new(id, frame.data_slice()).ok_or(CanError::InvalidId { id: frame.id })?;

        self.socket.write_frame(&can_frame).map_err(CanError::Io)?;
        trace!("Sent CAN frame: ID=0x{:X}, len={}", frame.id, frame.len);
        Ok(())
    }

    /// 传输是否处于打开状态
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// 停止接收线程并标记关闭（幂等）
    ///
    /// socket 本身随最后一个引用释放而关闭。
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
        self.stop_flag.store(true, Ordering::Release);
        if let Some(handle) = self.rx_thread.lock().take() {
            if handle.join().is_err() {
                error!("CAN receive thread panicked during join");
            }
        }
        trace!("CAN interface '{}' closed", self.interface);
    }
}

impl Drop for CanTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// 接收线程主循环
///
/// 读超时用于周期性检查停止标志；扩展帧 / 远程帧 / 错误帧不进入回调。
fn rx_loop(
    socket: Arc<CanSocket>,
    callback: Arc<Mutex<Option<FrameCallback>>>,
    stop_flag: Arc<AtomicBool>,
    interface: String,
) {
    trace!("CAN receive thread started on '{}'", interface);

    while !stop_flag.load(Ordering::Acquire) {
        let frame = match socket.read_frame() {
            Ok(frame) => frame,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => continue,
            Err(e) => {
                error!("CAN receive error on '{}': {}", interface, e);
                continue;
            },
        };

        let scout_frame = match frame {
            CanFrame::Data(data_frame) => {
                if data_frame.is_extended() {
                    trace!("Ignoring extended frame 0x{:X}", data_frame.raw_id());
                    continue;
                }
                let mut data = [0u8; 8];
                let payload = data_frame.data();
                let len = payload.len().min(8);
                data[..len].copy_from_slice(&payload[..len]);
                ScoutFrame {
                    id: data_frame.raw_id() & 0x7FF,
                    data,
                    len: len as u8,
                }
            },
            CanFrame::Remote(_) => continue,
            CanFrame::Error(error_frame) => {
                warn!("CAN error frame received: {:?}, ignoring", error_frame);
                continue;
            },
        };

        if let Some(cb) = callback.lock().as_ref() {
            cb(scout_frame);
        }
    }

    trace!("CAN receive thread stopped on '{}'", interface);
}
