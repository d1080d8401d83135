//! 协议层属性测试
//!
//! 覆盖校验和的单字节突变检出与串口解析器对任意切分的不变性。

use proptest::prelude::*;
use scout_protocol::{
    FRAME_SOF1, FRAME_SOF2, FRAME_TYPE_STATUS, SERIAL_FRAME_LEN, SerialFrameParser, StatusMessage,
    can_frame_checksum, serial_frame_checksum,
};

fn build_status_frame(frame_id: u8, payload: [u8; 8]) -> [u8; SERIAL_FRAME_LEN] {
    let mut buf = [0u8; SERIAL_FRAME_LEN];
    buf[0] = FRAME_SOF1;
    buf[1] = FRAME_SOF2;
    buf[2] = FRAME_TYPE_STATUS;
    buf[3] = frame_id;
    buf[4..12].copy_from_slice(&payload);
    buf[12] = serial_frame_checksum(FRAME_TYPE_STATUS, frame_id, &payload);
    buf
}

fn parse_all(parser: &mut SerialFrameParser, bytes: &[u8]) -> Vec<StatusMessage> {
    let mut out = Vec::new();
    parser.feed(bytes, |msg| out.push(msg));
    out
}

proptest! {
    /// 负载任一字节的非零突变都会改变求和校验值
    #[test]
    fn can_checksum_detects_single_byte_mutation(
        payload in any::<[u8; 7]>(),
        idx in 0usize..7,
        delta in 1u8..=255,
    ) {
        let mut data = [0u8; 8];
        data[..7].copy_from_slice(&payload);
        data[7] = can_frame_checksum(0x131, &data, 8);

        data[idx] = data[idx].wrapping_add(delta);
        prop_assert_ne!(data[7], can_frame_checksum(0x131, &data, 8));
    }

    /// 字节流在任意位置切分不影响解析结果
    #[test]
    fn serial_parser_is_chunking_invariant(
        payload in any::<[u8; 8]>(),
        frame_id in 1u8..=7,
        split in 1usize..SERIAL_FRAME_LEN,
    ) {
        let frame = build_status_frame(frame_id, payload);

        let mut whole = SerialFrameParser::new();
        let expected = parse_all(&mut whole, &frame);

        let mut chunked = SerialFrameParser::new();
        let mut actual = parse_all(&mut chunked, &frame[..split]);
        actual.extend(parse_all(&mut chunked, &frame[split..]));

        prop_assert_eq!(expected.len(), 1);
        prop_assert_eq!(actual, expected);
    }

    /// 前置噪声（不含帧头字节）后解析器仍能同步到后续合法帧
    #[test]
    fn serial_parser_resyncs_after_noise(
        noise in proptest::collection::vec(0u8..0x5A, 0..32),
        payload in any::<[u8; 8]>(),
    ) {
        let frame = build_status_frame(2, payload);
        let mut stream = noise;
        stream.extend_from_slice(&frame);
        stream.extend_from_slice(&frame);

        let mut parser = SerialFrameParser::new();
        let msgs = parse_all(&mut parser, &stream);
        prop_assert_eq!(msgs.len(), 2);
    }
}
