//! 连接管理
//!
//! 一个会话同一时刻只有一种活跃传输（CAN 或串口，互斥）。
//! 建立连接时把对应的解码入口接到传输的接收回调上；切换传输
//! 必须先 `disconnect()` 拆掉旧的接收路径。
//!
//! 活跃传输同时决定出站帧的编码与寻址：CAN 走帧打包并嵌入
//! 总线来源控制模式，串口走字节打包并嵌入链路来源控制模式。

use crate::decoder;
use crate::error::ScoutError;
use crate::state::StateStore;
use parking_lot::{Mutex, RwLock};
use scout_protocol::SerialFrameParser;
use scout_serial::SerialTransport;
use std::sync::Arc;
use tracing::info;

#[cfg(target_os = "linux")]
use scout_can::CanTransport;

/// 传输类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransportKind {
    /// CAN 总线（仅限 Linux / SocketCAN）
    Can,
    /// 串口链路
    Serial,
}

/// 活跃传输句柄
///
/// 控制循环每个节拍解析一次；克隆只复制 Arc。
#[derive(Clone)]
pub(crate) enum ActiveLink {
    #[cfg(target_os = "linux")]
    Can(Arc<CanTransport>),
    Serial(Arc<SerialTransport>),
    #[cfg(test)]
    Mock(Arc<MockLink>),
}

impl ActiveLink {
    pub fn is_open(&self) -> bool {
        match self {
            #[cfg(target_os = "linux")]
            ActiveLink::Can(t) => t.is_open(),
            ActiveLink::Serial(t) => t.is_open(),
            #[cfg(test)]
            ActiveLink::Mock(_) => true,
        }
    }
}

/// 连接管理器
pub(crate) struct ConnectionManager {
    active: RwLock<Option<ActiveLink>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            active: RwLock::new(None),
        }
    }

    /// 当前活跃传输（无则返回 None）
    pub fn active(&self) -> Option<ActiveLink> {
        self.active.read().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.active.read().is_some()
    }

    /// 建立传输并接好遥测回调
    ///
    /// # 错误
    /// - `AlreadyConnected`: 会话内已有活跃传输
    /// - `ConnectFailure`: 设备打开失败（可重试，系统保持可用）
    pub fn connect(
        &self,
        kind: TransportKind,
        device: &str,
        baud_rate: u32,
        store: &Arc<StateStore>,
        parser: &Arc<Mutex<SerialFrameParser>>,
    ) -> Result<(), ScoutError> {
        let mut guard = self.active.write();
        if guard.is_some() {
            return Err(ScoutError::AlreadyConnected);
        }

        match kind {
            TransportKind::Can => {
                #[cfg(target_os = "linux")]
                {
                    let _ = baud_rate; // SocketCAN 波特率由系统工具配置
                    let transport =
                        CanTransport::open(device).map_err(|e| ScoutError::ConnectFailure {
                            kind,
                            device: device.to_string(),
                            reason: e.to_string(),
                        })?;
                    let store = store.clone();
                    transport
                        .set_receive_callback(move |frame| decoder::handle_can_frame(&frame, &store));
                    transport.start();
                    *guard = Some(ActiveLink::Can(Arc::new(transport)));
                    info!("Connected to CAN interface '{}'", device);
                    Ok(())
                }
                #[cfg(not(target_os = "linux"))]
                {
                    let _ = (baud_rate, store, parser);
                    Err(ScoutError::ConnectFailure {
                        kind,
                        device: device.to_string(),
                        reason: "SocketCAN requires Linux".to_string(),
                    })
                }
            },
            TransportKind::Serial => {
                let transport = SerialTransport::open(device, baud_rate).map_err(|e| {
                    ScoutError::ConnectFailure {
                        kind,
                        device: device.to_string(),
                        reason: e.to_string(),
                    }
                })?;

                // 新会话从干净的解析器状态开始
                *parser.lock() = SerialFrameParser::new();

                let store = store.clone();
                let parser = parser.clone();
                transport.set_receive_callback(move |bytes| {
                    decoder::handle_serial_chunk(&parser, bytes, &store)
                });
                transport.start().map_err(|e| ScoutError::ConnectFailure {
                    kind,
                    device: device.to_string(),
                    reason: e.to_string(),
                })?;

                *guard = Some(ActiveLink::Serial(Arc::new(transport)));
                info!("Connected to serial port '{}' at {} baud", device, baud_rate);
                Ok(())
            },
        }
    }

    /// 拆掉活跃传输（幂等）
    pub fn disconnect(&self) {
        let link = self.active.write().take();
        if let Some(link) = link {
            match link {
                #[cfg(target_os = "linux")]
                ActiveLink::Can(t) => t.close(),
                ActiveLink::Serial(t) => t.close(),
                #[cfg(test)]
                ActiveLink::Mock(_) => {},
            }
            info!("Transport disconnected");
        }
    }

    /// 直接挂接一个测试替身作为活跃传输
    #[cfg(test)]
    pub fn attach_mock(&self, mock: Arc<MockLink>) {
        *self.active.write() = Some(ActiveLink::Mock(mock));
    }
}

/// 记录出站流量的测试替身
#[cfg(test)]
pub(crate) struct MockLink {
    pub kind: TransportKind,
    sent: Mutex<Vec<SentCommand>>,
}

/// 测试替身捕获到的一次发送
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SentCommand {
    Can(scout_protocol::ScoutFrame),
    Serial(Vec<u8>),
}

#[cfg(test)]
impl MockLink {
    pub fn new(kind: TransportKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, cmd: SentCommand) {
        self.sent.lock().push(cmd);
    }

    pub fn sent(&self) -> Vec<SentCommand> {
        self.sent.lock().clone()
    }
}
