#![no_main]
use bdmp_rs::{EncryptionKey, Loadable};
use libfuzzer_sys::fuzz_target;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct Target {
    name: String,
    values: Vec<u64>,
    nested: Option<Box<Target>>,
}

impl Loadable for Target {}

const KEY: EncryptionKey = [7u8; 32];

fuzz_target!(|data: &[u8]| {
    let _ = Target::from_bytes(data);
    let _ = Target::from_compressed_bytes(data);
    let _ = Target::from_sealed_bytes(data, &KEY);
});
