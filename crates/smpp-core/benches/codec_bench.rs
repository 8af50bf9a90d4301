//! Criterion benchmarks for the SMPP binary codec.
//!
//! Measures encode and decode latency for the PDU kinds a busy client
//! handles constantly: the keep-alive probe (smallest frame) and submit
//! PDUs with and without a concatenation header.
//!
//! Run with:
//! ```bash
//! cargo bench --package smpp-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use smpp_core::charset::DataCoding;
use smpp_core::protocol::pdu::{EnquireLinkSm, SubmitSm};
use smpp_core::{decode_frame, DecodeOutcome, Encodable, SequenceGenerator, SmppBuffer};

// ── PDU fixtures ──────────────────────────────────────────────────────────────

fn make_enquire_link(sequencer: &SequenceGenerator) -> EnquireLinkSm {
    EnquireLinkSm::new(DataCoding::Latin1, sequencer)
}

fn make_submit(sequencer: &SequenceGenerator) -> SubmitSm {
    let mut submit = SubmitSm::new(DataCoding::Latin1, sequencer);
    submit.source_ton = 2;
    submit.source_npi = 1;
    submit.source_addr = "55555".to_string();
    submit.dest_ton = 1;
    submit.dest_npi = 1;
    submit.dest_addr = "12223334444".to_string();
    submit.set_message_text(
        "the quick brown fox jumps over the lazy dog 0123456789",
        DataCoding::Ascii,
    );
    submit
}

fn make_concatenated_submit(sequencer: &SequenceGenerator) -> SubmitSm {
    let mut submit = make_submit(sequencer);
    submit.user_data.headers.add_concatenated_8bit(42, 3, 1);
    submit
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_encode(c: &mut Criterion) {
    let sequencer = SequenceGenerator::new();
    let enquire = make_enquire_link(&sequencer);
    let submit = make_submit(&sequencer);
    let concatenated = make_concatenated_submit(&sequencer);

    let mut group = c.benchmark_group("encode");
    group.bench_function("enquire_link", |b| {
        b.iter(|| black_box(&enquire).encode().unwrap())
    });
    group.bench_function("submit_sm", |b| {
        b.iter(|| black_box(&submit).encode().unwrap())
    });
    group.bench_function("submit_sm_concatenated", |b| {
        b.iter(|| black_box(&concatenated).encode().unwrap())
    });
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let sequencer = SequenceGenerator::new();
    let enquire_bytes = make_enquire_link(&sequencer).encode().unwrap();
    let submit_bytes = make_submit(&sequencer).encode().unwrap();
    let concatenated_bytes = make_concatenated_submit(&sequencer).encode().unwrap();

    let mut group = c.benchmark_group("decode");
    for (name, bytes) in [
        ("enquire_link", enquire_bytes),
        ("submit_sm", submit_bytes),
        ("submit_sm_concatenated", concatenated_bytes),
    ] {
        let buf = SmppBuffer::from_bytes(DataCoding::Latin1, &bytes);
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut cursor = 0;
                match decode_frame(black_box(&buf), &mut cursor) {
                    DecodeOutcome::Pdu(pdu) => pdu,
                    other => panic!("fixture must decode, got {other:?}"),
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
