//! End-to-end encode/decode tests against the real liblzma backend.

use oxz_stream::{
    Check, Decoder, DecoderFlags, Encoder, FilterChain, Options, XzError, DEFAULT_BUFFER_SIZE,
};

/// The XZ container magic header.
const XZ_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];

/// Deterministic, mildly compressible test document.
fn document(seed: u8, len: usize) -> Vec<u8> {
    let phrase = b"the quick brown fox jumps over the lazy dog; ";
    let mut data = Vec::with_capacity(len);
    while data.len() < len {
        let i = data.len();
        let byte = phrase[i % phrase.len()].wrapping_add(seed.wrapping_mul((i / 512) as u8));
        data.push(byte);
    }
    data
}

/// Drain a finished encoder into a vector.
fn encode_all(encoder: &Encoder, input: &[u8]) -> Vec<u8> {
    if !input.is_empty() {
        encoder.set_input(input).unwrap();
    }
    encoder.finish();
    let mut encoded = Vec::new();
    let mut chunk = vec![0u8; 64 * 1024];
    while !encoder.finished() {
        let n = encoder.encode(&mut chunk).unwrap();
        encoded.extend_from_slice(&chunk[..n]);
    }
    encoded
}

/// Drain a decoder fed with the whole encoded stream.
fn decode_all(decoder: &Decoder, encoded: &[u8]) -> Vec<u8> {
    decoder.set_input(encoded).unwrap();
    let mut decoded = Vec::new();
    let mut chunk = vec![0u8; 64 * 1024];
    while !decoder.finished() {
        let n = decoder.decode(&mut chunk).unwrap();
        decoded.extend_from_slice(&chunk[..n]);
    }
    decoded
}

#[test]
fn round_trip_across_presets() {
    let input = document(3, 48 * 1024);
    for preset in 0..=9 {
        let encoder = Encoder::from_preset(preset).unwrap();
        let encoded = encode_all(&encoder, &input);
        encoder.end();

        let decoder = Decoder::new().unwrap();
        let decoded = decode_all(&decoder, &encoded);
        decoder.end();

        assert_eq!(decoded, input, "round trip failed at preset {preset}");
    }
}

#[test]
fn round_trip_across_checks() {
    let input = document(7, 16 * 1024);
    for check in [Check::None, Check::Crc32, Check::Crc64, Check::Sha256] {
        let encoder = Encoder::with_check(6, check).unwrap();
        let encoded = encode_all(&encoder, &input);
        let decoder = Decoder::new().unwrap();
        assert_eq!(decode_all(&decoder, &encoded), input);
    }
}

#[test]
fn round_trip_without_prefilter() {
    let input = document(1, 8 * 1024);
    let options = Options::from_preset(4).unwrap();
    let encoder =
        Encoder::with_chain(FilterChain::lzma2_only(options), Check::Crc32, DEFAULT_BUFFER_SIZE)
            .unwrap();
    let encoded = encode_all(&encoder, &input);
    let decoder = Decoder::new().unwrap();
    assert_eq!(decode_all(&decoder, &encoded), input);
}

#[test]
fn output_starts_with_magic_bytes() {
    let encoder = Encoder::new().unwrap();
    let encoded = encode_all(&encoder, b"magic header probe");
    assert!(encoded.len() > 6);
    assert_eq!(&encoded[..6], &XZ_MAGIC);
}

#[test]
fn zero_length_input_produces_valid_container() {
    let encoder = Encoder::new().unwrap();
    let encoded = encode_all(&encoder, b"");
    assert!(encoded.len() >= 6);
    assert_eq!(&encoded[..6], &XZ_MAGIC);

    let decoder = Decoder::new().unwrap();
    let decoded = decode_all(&decoder, &encoded);
    assert!(decoded.is_empty());
}

#[test]
fn reset_reproduces_identical_output() {
    let input = document(9, 24 * 1024);
    let encoder = Encoder::from_preset(5).unwrap();

    let first = encode_all(&encoder, &input);
    encoder.reset().unwrap();
    let second = encode_all(&encoder, &input);

    assert_eq!(first, second);
}

#[test]
fn session_pair_reuse_across_documents() {
    let encoder = Encoder::new().unwrap();
    let decoder = Decoder::new().unwrap();

    for (seed, len) in [(11, 512), (42, 96 * 1024), (97, 3000)] {
        let input = document(seed, len);
        let encoded = encode_all(&encoder, &input);
        assert_eq!(&encoded[..6], &XZ_MAGIC);
        let decoded = decode_all(&decoder, &encoded);
        assert_eq!(decoded, input, "reuse failed for seed {seed}");

        encoder.reset().unwrap();
        decoder.reset().unwrap();
    }
    encoder.end();
    decoder.end();
}

#[test]
fn counters_track_stream_totals() {
    let input = document(5, 10 * 1024);
    let encoder = Encoder::new().unwrap();
    let encoded = encode_all(&encoder, &input);
    assert_eq!(encoder.bytes_read(), input.len() as u64);
    assert_eq!(encoder.bytes_written(), encoded.len() as u64);

    let decoder = Decoder::new().unwrap();
    let decoded = decode_all(&decoder, &encoded);
    assert_eq!(decoder.bytes_read(), encoded.len() as u64);
    assert_eq!(decoder.bytes_written(), decoded.len() as u64);
}

#[test]
fn concatenated_flag_decodes_two_streams() {
    let first = document(1, 2048);
    let second = document(2, 4096);
    let encoder = Encoder::new().unwrap();
    let mut joined = encode_all(&encoder, &first);
    encoder.reset().unwrap();
    joined.extend_from_slice(&encode_all(&encoder, &second));

    let decoder =
        Decoder::with_limit(u64::MAX, DecoderFlags::CONCATENATED, DEFAULT_BUFFER_SIZE).unwrap();
    let decoded = decode_all(&decoder, &joined);
    let mut expected = first;
    expected.extend_from_slice(&second);
    assert_eq!(decoded, expected);
}

#[test]
fn corrupted_magic_is_a_format_error() {
    let encoder = Encoder::new().unwrap();
    let mut encoded = encode_all(&encoder, b"soon to be corrupted");
    encoded[0] ^= 0xFF;

    let decoder = Decoder::new().unwrap();
    decoder.set_input(&encoded).unwrap();
    let mut out = vec![0u8; 4096];
    assert!(matches!(decoder.decode(&mut out), Err(XzError::Format)));
}

#[test]
fn corrupted_body_is_detected() {
    let input = document(8, 8 * 1024);
    let encoder = Encoder::with_check(6, Check::Crc32).unwrap();
    let mut encoded = encode_all(&encoder, &input);
    // Flip a byte well past the headers.
    let mid = encoded.len() / 2;
    encoded[mid] ^= 0x55;

    let decoder = Decoder::new().unwrap();
    decoder.set_input(&encoded).unwrap();
    let mut out = vec![0u8; 64 * 1024];
    let mut result = Ok(0);
    for _ in 0..16 {
        if decoder.finished() {
            break;
        }
        result = decoder.decode(&mut out);
        if result.is_err() {
            break;
        }
    }
    assert!(result.is_err(), "corruption went undetected");
}

#[test]
fn memory_limit_is_enforced() {
    let encoder = Encoder::new().unwrap();
    let encoded = encode_all(&encoder, &document(4, 4096));

    let decoder = Decoder::with_limit(1, DecoderFlags::NONE, DEFAULT_BUFFER_SIZE).unwrap();
    decoder.set_input(&encoded).unwrap();
    let mut out = vec![0u8; 4096];
    assert!(matches!(
        decoder.decode(&mut out),
        Err(XzError::MemoryLimit)
    ));
}
