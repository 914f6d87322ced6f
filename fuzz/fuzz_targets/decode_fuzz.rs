//! Decoder fuzz target: feed arbitrary bytes to the `types.Data` decoder and the
//! delimited-stream decoder. Neither may panic; anything that decodes must re-encode
//! and decode back to the same record.
//! Build with: cargo fuzz run decode_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let schemas = match ttproto::transit::TransitSchemas::new() {
        Ok(s) => s,
        Err(_) => return,
    };
    if let Ok(record) = ttproto::decode(data, &schemas.data) {
        let bytes = ttproto::encode(&record, &schemas.data).expect("re-encode");
        let again = ttproto::decode(&bytes, &schemas.data).expect("decode re-encoded");
        assert_eq!(record, again);
    }
    let _ = ttproto::decode_delimited(data, &schemas.data);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
