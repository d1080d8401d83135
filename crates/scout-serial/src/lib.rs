//! # Scout 串口传输层
//!
//! 基于 `serialport` 的双工字节通道：发送走调用方线程，接收由
//! 传输自有的后台线程驱动。串口不保证帧边界，回调拿到的是任意
//! 切分的原始字节块，组帧由上层的字节流解析器完成。
//!
//! 打开失败向调用方报告（不是致命错误），由调用方决定是否重试。

use parking_lot::Mutex;
use serialport::SerialPort;
use std::io::{ErrorKind, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, trace};

/// 收到一段原始字节时的回调类型
pub type ByteCallback = Box<dyn Fn(&[u8]) + Send + Sync>;

/// 接收线程唤醒周期，同时是 close() 的最大等待时间
const READ_TIMEOUT: Duration = Duration::from_millis(10);

/// 接收缓冲区大小（单次 read 的最大字节数）
const RX_BUFFER_SIZE: usize = 256;

/// 串口传输层错误类型
#[derive(Error, Debug)]
pub enum SerialError {
    #[error("Failed to open serial port '{port}': {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serial port error: {0}")]
    Port(#[from] serialport::Error),

    #[error("Transport not open")]
    NotOpen,
}

/// 串口传输
///
/// # 示例
///
/// ```no_run
/// use scout_serial::SerialTransport;
///
/// let serial = SerialTransport::open("/dev/ttyUSB0", 115200).unwrap();
/// serial.set_receive_callback(|bytes| println!("{} bytes received", bytes.len()));
/// serial.start().unwrap();
/// ```
pub struct SerialTransport {
    port_name: String,
    writer: Arc<Mutex<Box<dyn SerialPort>>>,
    callback: Arc<Mutex<Option<ByteCallback>>>,
    stop_flag: Arc<AtomicBool>,
    rx_thread: Mutex<Option<JoinHandle<()>>>,
    open: Arc<AtomicBool>,
}

impl SerialTransport {
    /// 打开串口
    ///
    /// # 错误
    /// - `SerialError::Open`: 设备不存在、被占用或无权限
    pub fn open(port_name: impl Into<String>, baud_rate: u32) -> Result<Self, SerialError> {
        let port_name = port_name.into();

        let port = serialport::new(&port_name, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| SerialError::Open {
                port: port_name.clone(),
                source: e,
            })?;

        trace!("Serial port '{}' opened at {} baud", port_name, baud_rate);

        Ok(Self {
            port_name,
            writer: Arc::new(Mutex::new(port)),
            callback: Arc::new(Mutex::new(None)),
            stop_flag: Arc::new(AtomicBool::new(false)),
            rx_thread: Mutex::new(None),
            open: Arc::new(AtomicBool::new(true)),
        })
    }

    /// 获取设备名称
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// 注册接收回调
    ///
    /// 必须在 [`start`](Self::start) 之前调用；回调在接收线程上执行，
    /// 字节块的大小与切分方式没有任何保证。
    pub fn set_receive_callback(&self, callback: impl Fn(&[u8]) + Send + Sync + 'static) {
        *self.callback.lock() = Some(Box::new(callback));
    }

    /// 启动接收线程（幂等）
    ///
    /// # 错误
    /// - `SerialError::Port`: 克隆读端句柄失败
    pub fn start(&self) -> Result<(), SerialError> {
        let mut guard = self.rx_thread.lock();
        if guard.is_some() {
            return Ok(());
        }

        // 读端使用独立克隆的句柄，避免与发送端争用同一把锁
        let reader = self.writer.lock().try_clone()?;
        let callback = self.callback.clone();
        let stop_flag = self.stop_flag.clone();
        let port_name = self.port_name.clone();

        let handle = std::thread::Builder::new()
            .name("scout-serial-rx".into())
            .spawn(move || rx_loop(reader, callback, stop_flag, port_name))
            .expect("failed to spawn serial receive thread");
        *guard = Some(handle);
        Ok(())
    }

    /// 发送一段字节（Fire-and-Forget）
    ///
    /// # 错误
    /// - `SerialError::NotOpen`: 传输已关闭
    /// - `SerialError::Io`: 写入失败
    pub fn send_bytes(&self, bytes: &[u8]) -> Result<(), SerialError> {
        if !self.is_open() {
            return Err(SerialError::NotOpen);
        }
        self.writer.lock().write_all(bytes)?;
        trace!("Sent {} bytes on '{}'", bytes.len(), self.port_name);
        Ok(())
    }

    /// 传输是否处于打开状态
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// 停止接收线程并标记关闭（幂等）
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
        self.stop_flag.store(true, Ordering::Release);
        if let Some(handle) = self.rx_thread.lock().take() {
            if handle.join().is_err() {
                error!("Serial receive thread panicked during join");
            }
        }
        trace!("Serial port '{}' closed", self.port_name);
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// 接收线程主循环
///
/// 读超时用于周期性检查停止标志；超时与中断不是错误。
fn rx_loop(
    mut reader: Box<dyn SerialPort>,
    callback: Arc<Mutex<Option<ByteCallback>>>,
    stop_flag: Arc<AtomicBool>,
    port_name: String,
) {
    trace!("Serial receive thread started on '{}'", port_name);
    let mut buf = [0u8; RX_BUFFER_SIZE];

    while !stop_flag.load(Ordering::Acquire) {
        match reader.read(&mut buf) {
            Ok(0) => continue,
            Ok(n) => {
                if let Some(cb) = callback.lock().as_ref() {
                    cb(&buf[..n]);
                }
            },
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => continue,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                error!("Serial receive error on '{}': {}", port_name, e);
                // 设备拔出等持续性错误：避免紧循环刷日志
                std::thread::sleep(READ_TIMEOUT);
            },
        }
    }

    trace!("Serial receive thread stopped on '{}'", port_name);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_invalid_port_reports_failure() {
        let result = SerialTransport::open("/dev/nonexistent_tty99", 115200);
        match result {
            Err(SerialError::Open { port, .. }) => {
                assert_eq!(port, "/dev/nonexistent_tty99");
            },
            Ok(_) => panic!("Expected open failure for nonexistent port"),
            Err(e) => panic!("Expected Open error, got {:?}", e),
        }
    }
}
