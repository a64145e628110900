use ccn_codec::content::{
    decode_content_cbor, encode_content_cbor, signature_message_digest, CONTENT_TYPE_GONE,
};
use ccn_codec::interest::{decode_interest_cbor, encode_interest_cbor};
use ccn_codec::{ChildSelector, ContentObject, ContentType, Exclude, Interest, SignedInfo};
use ccn_core::segmentation::{segment_component, segment_name};
use ccn_core::versioning::{version_component, version_name_at};
use ccn_core::{CcnTime, Name, PublisherKey};

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn versioned() -> Name {
    let root = Name::from_uri("/wire/doc").expect("uri should parse");
    version_name_at(&root, CcnTime::from_ticks(0x0A0B0C))
}

fn gone_unit() -> ContentObject {
    let mut signed_info = SignedInfo::new(PublisherKey([0xAA; 32]), ContentType::Gone);
    signed_info.timestamp = CcnTime::from_ticks(77);
    ContentObject::unsigned(versioned(), signed_info, Vec::new())
}

#[test]
fn components_travel_as_cbor_byte_strings() {
    let obj = ContentObject::unsigned(
        segment_name(&versioned(), 0),
        SignedInfo::new(PublisherKey([0xAA; 32]), ContentType::Data),
        b"payload".to_vec(),
    );
    let encoded = encode_content_cbor(&obj).expect("object should encode");
    // bstr(1) 0xF8: first segment marker.
    assert!(contains(&encoded, &[0x41, 0xF8]));
    // bstr(7): fixed-width version component.
    assert!(contains(
        &encoded,
        &[0x47, 0xFD, 0x00, 0x00, 0x00, 0x0A, 0x0B, 0x0C]
    ));
    assert_eq!(decode_content_cbor(&encoded).expect("should decode"), obj);
}

#[test]
fn gone_tag_is_encoded_as_its_numeric_value() {
    let encoded = encode_content_cbor(&gone_unit()).expect("gone unit should encode");
    let tag = CONTENT_TYPE_GONE.to_be_bytes();
    assert!(contains(&encoded, &[0x1A, tag[0], tag[1], tag[2], tag[3]]));
    let decoded = decode_content_cbor(&encoded).expect("gone unit should decode");
    assert!(decoded.is_gone());
    assert!(decoded.content.is_empty());
}

#[test]
fn gone_with_payload_is_rejected_on_encode() {
    let mut obj = gone_unit();
    obj.content = vec![1];
    let err = encode_content_cbor(&obj).expect_err("gone payload must be empty");
    assert!(
        err.to_string().contains("gone content must be empty"),
        "unexpected error: {err}"
    );
}

#[test]
fn interest_selectors_survive_encoding() {
    let interest = Interest::new(versioned().cut_last())
        .with_child_selector(ChildSelector::Rightmost)
        .with_exclude(
            Exclude::through(version_component(CcnTime::from_ticks(5)))
                .with_component(segment_component(3)),
        )
        .with_max_suffix_components(2)
        .with_publisher(PublisherKey([0x01; 32]));
    let encoded = encode_interest_cbor(&interest).expect("interest should encode");
    let decoded = decode_interest_cbor(&encoded).expect("interest should decode");
    assert_eq!(decoded, interest);
}

#[test]
fn signature_digest_is_deterministic() {
    let a = signature_message_digest(&gone_unit()).expect("digest should build");
    let b = signature_message_digest(&gone_unit()).expect("digest should build");
    assert_eq!(a, b);
}
