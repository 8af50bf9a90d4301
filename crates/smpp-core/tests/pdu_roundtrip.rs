//! Integration tests for the smpp-core protocol stack.
//!
//! These drive complete round trips through the public API (encode a
//! PDU, feed the bytes through the stream framing entry, compare),
//! exercising the codec, the variant family, the sequence generator,
//! and the character set engine together.

use smpp_core::{
    charset::DataCoding,
    decode_frame,
    protocol::{
        fields::{iei, tags, Tlv},
        pdu::{
            BindSm, BindSmResp, DeliverSm, DeliverSmResp, EnquireLinkSm, EnquireLinkSmResp,
            GenericNackSm, QuerySm, QuerySmResp, SubmitSm, SubmitSmResp, UnbindSm, UnbindSmResp,
        },
        segmentation::split_with_concatenation,
    },
    CommandId, CommandStatus, DecodeOutcome, Encodable, Introspectable, Pdu, SequenceGenerator,
    SmppBuffer,
};

/// Encodes a PDU and decodes it back through the framing entry,
/// asserting the frame is consumed exactly.
fn roundtrip(pdu: &Pdu) -> Pdu {
    let bytes = pdu.encode().expect("encode must succeed");
    let buf = SmppBuffer::from_bytes(DataCoding::Latin1, &bytes);
    let mut cursor = 0;
    match decode_frame(&buf, &mut cursor) {
        DecodeOutcome::Pdu(decoded) => {
            assert_eq!(cursor, bytes.len(), "the whole frame must be consumed");
            decoded
        }
        other => panic!("expected a decoded PDU, got {other:?}"),
    }
}

#[test]
fn test_roundtrip_enquire_link() {
    let sequencer = SequenceGenerator::new();
    let original = Pdu::EnquireLink(EnquireLinkSm::new(DataCoding::Latin1, &sequencer));

    assert_eq!(roundtrip(&original), original);
}

#[test]
fn test_roundtrip_enquire_link_resp() {
    let original = Pdu::EnquireLinkResp(EnquireLinkSmResp::new(
        DataCoding::Latin1,
        CommandStatus::OK,
        314,
    ));

    assert_eq!(roundtrip(&original), original);
}

#[test]
fn test_roundtrip_unbind_and_resp() {
    let sequencer = SequenceGenerator::new();
    let unbind = Pdu::Unbind(UnbindSm::new(DataCoding::Latin1, &sequencer));
    let resp = Pdu::UnbindResp(UnbindSmResp::new(DataCoding::Latin1, CommandStatus::OK, 9));

    assert_eq!(roundtrip(&unbind), unbind);
    assert_eq!(roundtrip(&resp), resp);
}

#[test]
fn test_roundtrip_generic_nack() {
    let original = Pdu::GenericNack(GenericNackSm::new(
        DataCoding::Latin1,
        CommandStatus::INVALID_COMMAND_LENGTH,
        0x0101_0101,
    ));

    let decoded = roundtrip(&original);
    assert_eq!(decoded, original);
    assert_eq!(decoded.header().status, CommandStatus::INVALID_COMMAND_LENGTH);
}

#[test]
fn test_roundtrip_bind() {
    let sequencer = SequenceGenerator::new();
    let mut bind = BindSm::new(
        DataCoding::Latin1,
        CommandId::BindReceiver,
        "client01",
        "secret",
        &sequencer,
    );
    bind.address_range = "55555".to_string();
    let original = Pdu::Bind(bind);

    assert_eq!(roundtrip(&original), original);
}

#[test]
fn test_roundtrip_bind_resp() {
    let mut resp = BindSmResp::new(
        DataCoding::Latin1,
        CommandId::BindReceiverResp,
        CommandStatus::OK,
        21,
        "SMSC-01",
    );
    resp.optional.push(Tlv::new(tags::SC_INTERFACE_VERSION, vec![0x34]));
    let original = Pdu::BindResp(resp);

    assert_eq!(roundtrip(&original), original);
}

#[test]
fn test_roundtrip_submit_with_gsm_text() {
    let sequencer = SequenceGenerator::new();
    let mut submit = SubmitSm::new(DataCoding::Latin1, &sequencer);
    submit.dest_ton = 1;
    submit.dest_npi = 1;
    submit.dest_addr = "12223334444".to_string();
    submit.set_message_text("hello {jack}", DataCoding::Ascii);
    let original = Pdu::SubmitSm(submit);

    let decoded = roundtrip(&original);
    assert_eq!(decoded, original);
    let Pdu::SubmitSm(decoded) = decoded else {
        unreachable!()
    };
    assert_eq!(decoded.message_text(), "hello {jack}");
}

#[test]
fn test_roundtrip_submit_resp() {
    let original = Pdu::SubmitSmResp(SubmitSmResp::new(
        DataCoding::Latin1,
        CommandStatus::OK,
        100,
        "id-123456",
    ));

    assert_eq!(roundtrip(&original), original);
}

#[test]
fn test_roundtrip_deliver_and_resp() {
    let sequencer = SequenceGenerator::new();
    let mut deliver = DeliverSm::new(DataCoding::Latin1, &sequencer);
    deliver.source_addr = "12223334444".to_string();
    deliver.dest_addr = "55555".to_string();
    deliver.data_coding = DataCoding::Latin1;
    deliver.user_data.short_message = b"who is this?".to_vec();
    let original = Pdu::DeliverSm(deliver.clone());

    assert_eq!(roundtrip(&original), original);

    let resp = Pdu::DeliverSmResp(DeliverSmResp::reply_to(&deliver));
    assert_eq!(roundtrip(&resp), resp);
}

#[test]
fn test_roundtrip_query_and_resp() {
    let sequencer = SequenceGenerator::new();
    let query = Pdu::QuerySm(QuerySm::new(DataCoding::Latin1, "id-42", &sequencer));
    assert_eq!(roundtrip(&query), query);

    let mut resp = QuerySmResp::new(DataCoding::Latin1, CommandStatus::OK, 55, "id-42");
    resp.final_date = "260807153000000+".to_string();
    resp.message_state = smpp_core::protocol::pdu::message_state::DELIVERED;
    let resp = Pdu::QuerySmResp(resp);
    assert_eq!(roundtrip(&resp), resp);
}

#[test]
fn test_stream_of_mixed_pdus_decodes_in_order() {
    let sequencer = SequenceGenerator::new();
    let probe = EnquireLinkSm::new(DataCoding::Latin1, &sequencer);
    let mut submit = SubmitSm::new(DataCoding::Latin1, &sequencer);
    submit.dest_addr = "12223334444".to_string();
    submit.set_message_text("first", DataCoding::Ascii);
    let unbind = UnbindSm::new(DataCoding::Latin1, &sequencer);

    let mut stream = SmppBuffer::new(DataCoding::Latin1);
    stream.add_bytes(&probe.encode().unwrap());
    stream.add_bytes(&submit.encode().unwrap());
    stream.add_bytes(&unbind.encode().unwrap());

    let mut cursor = 0;
    let mut commands = Vec::new();
    loop {
        match decode_frame(&stream, &mut cursor) {
            DecodeOutcome::Pdu(pdu) => commands.push(pdu.command()),
            DecodeOutcome::Incomplete => break,
            DecodeOutcome::Unrecognized { .. } => panic!("all frames are recognizable"),
        }
    }

    assert_eq!(
        commands,
        vec![CommandId::EnquireLink, CommandId::SubmitSm, CommandId::Unbind]
    );
    assert_eq!(cursor, stream.len());
}

#[test]
fn test_unknown_frame_in_stream_is_skippable() {
    let sequencer = SequenceGenerator::new();

    // A frame with a command id from some newer protocol revision.
    let mut alien = SmppBuffer::new(DataCoding::Latin1);
    alien.add_u32(0x0000_0102);
    alien.add_u32(0);
    alien.add_u32(640);
    alien.add_bytes(b"opaque payload");
    alien.add_final_length();

    let probe = EnquireLinkSm::new(DataCoding::Latin1, &sequencer);

    let mut stream = SmppBuffer::new(DataCoding::Latin1);
    stream.add_bytes(alien.bytes());
    stream.add_bytes(&probe.encode().unwrap());

    let mut cursor = 0;
    let DecodeOutcome::Unrecognized { length, command, sequence } = decode_frame(&stream, &mut cursor)
    else {
        panic!("alien frame must be unrecognized");
    };
    assert_eq!(command, 0x0000_0102);
    assert_eq!(sequence, 640);
    assert_eq!(length as usize, alien.len());

    cursor += length as usize;
    match decode_frame(&stream, &mut cursor) {
        DecodeOutcome::Pdu(Pdu::EnquireLink(decoded)) => {
            assert_eq!(decoded.header.sequence, probe.header.sequence);
        }
        other => panic!("expected the probe after the skip, got {other:?}"),
    }
}

#[test]
fn test_concatenated_submit_parts_reassemble() {
    let sequencer = SequenceGenerator::new();
    let text = "x".repeat(400);
    let payload = smpp_core::charset::encode_string(&text, DataCoding::Ascii);

    let parts = split_with_concatenation(&payload, 134, &sequencer);
    assert!(parts.len() > 1);

    let mut reassembled = Vec::new();
    for (index, part) in parts.iter().enumerate() {
        let mut submit = SubmitSm::new(DataCoding::Latin1, &sequencer);
        submit.dest_addr = "12223334444".to_string();
        submit.data_coding = DataCoding::Ascii;
        submit.user_data = part.clone();

        let Pdu::SubmitSm(decoded) = roundtrip(&Pdu::SubmitSm(submit)) else {
            unreachable!()
        };
        let element = decoded.user_data.headers.find(iei::CONCATENATED_8BIT).unwrap();
        assert_eq!(element.data[1] as usize, parts.len());
        assert_eq!(element.data[2] as usize, index + 1);
        reassembled.extend(decoded.user_data.short_message);
    }

    assert_eq!(reassembled, payload);
}

#[test]
fn test_details_walk_matches_wire_layout() {
    let sequencer = SequenceGenerator::new();
    let mut submit = SubmitSm::new(DataCoding::Latin1, &sequencer);
    submit.dest_addr = "12223334444".to_string();
    submit.set_message_text("audit me", DataCoding::Latin1);

    let Pdu::SubmitSm(decoded) = roundtrip(&Pdu::SubmitSm(submit)) else {
        unreachable!()
    };

    let details = decoded.details();
    assert_eq!(details[0].name, "Length");
    assert_eq!(details[0].as_u32(), Some(decoded.header.length));

    // Offsets must be strictly increasing and rooted at 0.
    assert_eq!(details[0].offset, 0);
    for pair in details.windows(2) {
        assert!(pair[1].offset > pair[0].offset);
    }

    let payload = details.iter().find(|d| d.name == "ShortMessage").unwrap();
    assert_eq!(payload.data_block, b"audit me");
}
