#![no_main]

use ccn_codec::content::decode_content_cbor;
use ccn_codec::interest::decode_interest_cbor;
use ccn_crypto::content::verify_content;
use ccn_crypto::Ed25519Verifier;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(object) = decode_content_cbor(data) {
        let _ = verify_content(&Ed25519Verifier, &object);
    }
    let _ = decode_interest_cbor(data);
});
