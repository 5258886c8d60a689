//! Round-trip matrix over both codecs, all element types and pre-transforms

use tsframe::codec::{Chimp, Gorilla, PackOp, Packer};
use tsframe::types::Number;

fn round_trip<T: Number, P: Packer<T>>(codec: &mut P, src: &[T], op: PackOp, op_param: T) {
    let mut buffer = Vec::new();
    codec.pack(src, &mut buffer, op, op_param).unwrap();
    assert_eq!(codec.num_elements(), src.len() as u64);
    assert_eq!(codec.packed_size(), buffer.len() as u64);

    let mut out = Vec::new();
    let unpacked = codec.unpack(&buffer, &mut out, op, op_param).unwrap();
    assert_eq!(unpacked, src.len() as u64);
    assert_eq!(&out, src);
}

// Float vectors whose Offset/Delta arithmetic is exact at param 2.5, so the
// transformed stream reproduces the input bit-for-bit under every op.
fn exact_float_inputs() -> Vec<Vec<f64>> {
    vec![
        vec![1.0; 100],
        (0..100).map(|i| i as f64).collect(),
        (0..100).map(|i| (i * i) as f64 - 2500.0).collect(),
        vec![1999.9999],
    ]
}

// Irrational and extreme patterns; the identity transform keeps them exact.
fn nop_only_float_inputs() -> Vec<Vec<f64>> {
    vec![
        (0..100).map(|i| (i as f64 * 0.1).sin() * 10.0 + 100.0).collect(),
        vec![0.0, -0.0, f64::MAX, f64::MIN, f64::MIN_POSITIVE],
    ]
}

fn int_inputs() -> Vec<Vec<i64>> {
    vec![
        vec![1; 100],
        (0..100).collect(),
        (-50..50).collect(),
        vec![i64::MIN, i64::MAX, 0, -1, 1],
        (0..100).map(|i| i * i - 2500).collect(),
    ]
}

fn uint_inputs() -> Vec<Vec<u64>> {
    vec![
        vec![1; 100],
        (0..100).collect(),
        vec![u64::MAX, 0, u64::MAX - 1, 1],
        (0..100).map(|i| i * 1_000_003).collect(),
    ]
}

const OPS: [PackOp; 3] = [PackOp::Nop, PackOp::Offset, PackOp::Delta];

#[test]
fn chimp_round_trip_matrix() {
    for op in OPS {
        for input in exact_float_inputs() {
            round_trip(&mut Chimp::new(), &input, op, 2.5);
        }
        for input in int_inputs() {
            round_trip(&mut Chimp::new(), &input, op, 7);
        }
        for input in uint_inputs() {
            round_trip(&mut Chimp::new(), &input, op, 7);
        }
    }
    for input in nop_only_float_inputs() {
        round_trip(&mut Chimp::new(), &input, PackOp::Nop, 0.0);
    }
}

#[test]
fn gorilla_round_trip_matrix() {
    for op in OPS {
        for input in exact_float_inputs() {
            round_trip(&mut Gorilla::new(), &input, op, 2.5);
        }
        for input in int_inputs() {
            round_trip(&mut Gorilla::new(), &input, op, 7);
        }
        for input in uint_inputs() {
            round_trip(&mut Gorilla::new(), &input, op, 7);
        }
    }
    for input in nop_only_float_inputs() {
        round_trip(&mut Gorilla::new(), &input, PackOp::Nop, 0.0);
    }
}

#[test]
fn chimp_constant_run_stays_small() {
    // Five identical floats cost 64 bits up front and 2 bits apiece after
    let values = vec![1.0f64; 5];
    let mut codec = Chimp::new();
    let mut buffer = Vec::new();
    codec.pack(&values, &mut buffer, PackOp::Nop, 0.0).unwrap();
    assert!(buffer.len() <= 11);

    let mut out = Vec::new();
    codec.unpack(&buffer, &mut out, PackOp::Nop, 0.0).unwrap();
    assert_eq!(out, values);
}

#[test]
fn chimp_delta_beats_nop_on_a_ramp() {
    let values: Vec<f64> = (0..10).map(|i| i as f64).collect();

    let mut nop_codec = Chimp::new();
    let mut nop_buffer = Vec::new();
    nop_codec
        .pack(&values, &mut nop_buffer, PackOp::Nop, 0.0)
        .unwrap();

    let mut delta_codec = Chimp::new();
    let mut delta_buffer = Vec::new();
    delta_codec
        .pack(&values, &mut delta_buffer, PackOp::Delta, 0.0)
        .unwrap();

    assert!(delta_buffer.len() < nop_buffer.len());

    let mut out = Vec::new();
    delta_codec
        .unpack(&delta_buffer, &mut out, PackOp::Delta, 0.0)
        .unwrap();
    assert_eq!(out, values);
}

#[test]
fn descriptor_survives_json_round_trip() {
    // The wire format is headerless: a persisted buffer is only usable
    // together with its descriptor, so the descriptor must serialize.
    let values: Vec<i64> = (0..500).map(|i| i * 3 - 700).collect();
    let mut codec = Chimp::new();
    let mut buffer = Vec::new();
    codec.pack(&values, &mut buffer, PackOp::Delta, 5).unwrap();

    let json = serde_json::to_string(&codec.descriptor(PackOp::Delta, 5)).unwrap();
    let desc: tsframe::PackDescriptor<i64> = serde_json::from_str(&json).unwrap();
    assert_eq!(desc.num_elements, 500);

    let mut restored = Chimp::from_descriptor(&desc);
    let mut out = Vec::new();
    restored
        .unpack(&buffer, &mut out, desc.op, desc.op_param)
        .unwrap();
    assert_eq!(out, values);
}

#[test]
fn random_data_round_trips_on_both_codecs() {
    use rand::Rng;

    let mut rng = rand::rng();
    for _ in 0..20 {
        let floats: Vec<f64> = (0..500).map(|_| rng.random::<f64>() * 1e9 - 5e8).collect();
        let ints: Vec<i64> = (0..500).map(|_| rng.random()).collect();

        // Integer transforms wrap, so every op is lossless on any input;
        // float transforms are only exercised with the identity here.
        round_trip(&mut Chimp::new(), &floats, PackOp::Nop, 0.0);
        round_trip(&mut Gorilla::new(), &floats, PackOp::Nop, 0.0);
        for op in OPS {
            round_trip(&mut Chimp::new(), &ints, op, 1);
            round_trip(&mut Gorilla::new(), &ints, op, 1);
        }
    }
}
