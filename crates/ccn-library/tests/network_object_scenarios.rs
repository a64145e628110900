use std::sync::Arc;

use serde::{Deserialize, Serialize};

use ccn_core::segmentation::{is_unsegmented, segment_name, SegmentNumbering};
use ccn_core::versioning::{is_versioned, version_root};
use ccn_core::Name;
use ccn_crypto::Ed25519Signer;
use ccn_library::{Library, LibraryConfig, NetworkObject, ObjectError, ObjectState, ReadError};
use ccn_transport::{InMemoryForwarder, NetworkAccess};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Note {
    title: String,
    body: String,
}

fn note(title: &str, body: &str) -> Note {
    Note {
        title: title.to_string(),
        body: body.to_string(),
    }
}

fn name(uri: &str) -> Name {
    Name::from_uri(uri).expect("uri should parse")
}

fn network() -> Arc<dyn NetworkAccess> {
    Arc::new(InMemoryForwarder::default())
}

fn fast_config() -> LibraryConfig {
    LibraryConfig {
        fetch_timeout_ms: 2_000,
        latest_version_timeout_ms: 100,
        ..LibraryConfig::default()
    }
}

fn library(network: &Arc<dyn NetworkAccess>, seed: &[u8], config: LibraryConfig) -> Library {
    Library::open(Arc::clone(network), Ed25519Signer::from_seed(seed), config)
        .expect("library should open")
}

#[test]
fn successive_saves_produce_increasing_versions() {
    let net = network();
    let writer = library(&net, b"writer", fast_config());
    let mut obj = NetworkObject::<Note>::with_value(&writer, Some(name("/a/b")), note("t", "one"));
    assert_eq!(obj.state(), ObjectState::Dirty);
    assert_eq!(obj.version(), None);

    assert!(obj.save().expect("first save should succeed"));
    let v1 = obj.name().cloned().expect("saved object is named");
    assert!(is_versioned(&v1));
    assert_eq!(version_root(&v1), name("/a/b"));
    assert_eq!(obj.state(), ObjectState::Clean);
    let t1 = obj.version().expect("saved object has a version");
    assert_eq!(obj.last_saved(), Some(t1));

    obj.data_mut().expect("value present").body = "two".into();
    assert!(obj.is_dirty());
    assert!(obj.save().expect("second save should succeed"));
    let v2 = obj.name().cloned().expect("saved object is named");
    assert!(v2 > v1);
    assert!(obj.version().expect("versioned") > t1);
}

#[test]
fn saving_a_clean_object_is_a_no_op() {
    let net = network();
    let writer = library(&net, b"writer", fast_config());
    let mut obj = NetworkObject::<Note>::with_value(&writer, Some(name("/noop")), note("t", "b"));
    obj.save().expect("save should succeed");
    let bound = obj.name().cloned();

    assert!(!obj.save().expect("clean save should succeed"));
    assert!(!obj.save_to(&name("/elsewhere")).expect("clean save should succeed"));
    assert_eq!(obj.name().cloned(), bound);
}

#[test]
fn update_resolves_the_latest_version() {
    let net = network();
    let writer = library(&net, b"writer", fast_config());
    let mut obj = NetworkObject::<Note>::with_value(&writer, Some(name("/a/b")), note("t", "v1"));
    obj.save().expect("save should succeed");
    obj.set_data(note("t", "v2"));
    obj.save().expect("save should succeed");
    let latest = obj.name().cloned().expect("named");

    let reader = library(&net, b"reader", fast_config());
    let mut copy = NetworkObject::<Note>::named(&reader, name("/a/b"));
    assert_eq!(copy.state(), ObjectState::Unbound);
    copy.update().expect("update should succeed");
    assert_eq!(copy.name(), Some(&latest));
    assert_eq!(copy.data(), Some(&note("t", "v2")));
    assert_eq!(copy.state(), ObjectState::Clean);
    assert_eq!(copy.version(), obj.version());
    assert_eq!(copy, obj);
}

#[test]
fn specific_versions_can_be_fetched() {
    let net = network();
    let writer = library(&net, b"writer", fast_config());
    let mut obj = NetworkObject::<Note>::with_value(&writer, Some(name("/hist")), note("t", "old"));
    obj.save().expect("save should succeed");
    let first = obj.name().cloned().expect("named");
    obj.set_data(note("t", "new"));
    obj.save().expect("save should succeed");

    let reader = library(&net, b"reader", fast_config());
    let mut copy = NetworkObject::<Note>::new(&reader);
    copy.update_name(&first).expect("update should succeed");
    assert_eq!(copy.data(), Some(&note("t", "old")));
    assert_eq!(copy.name(), Some(&first));
}

#[test]
fn segmented_streams_bind_to_their_version_root() {
    let net = network();
    let config = LibraryConfig {
        block_size: 16,
        ..fast_config()
    };
    let writer = library(&net, b"writer", config.clone());
    let body = "x".repeat(200);
    let mut obj = NetworkObject::<Note>::with_value(&writer, Some(name("/big")), note("long", &body));
    obj.save().expect("save should succeed");
    let version = obj.name().cloned().expect("named");

    let reader = library(&net, b"reader", config);
    let mut copy = NetworkObject::<Note>::new(&reader);
    copy.update_name(&segment_name(&version, 3))
        .expect("update from a segment name should succeed");
    let bound = copy.name().cloned().expect("bound after update");
    assert_eq!(bound, version);
    assert!(is_unsegmented(&bound));
    assert_eq!(copy.data(), Some(&note("long", &body)));
}

#[test]
fn byte_count_streams_read_back_end_to_end() {
    let net = network();
    let config = LibraryConfig {
        block_size: 8,
        numbering: SegmentNumbering::ByteCount,
        ..fast_config()
    };
    let writer = library(&net, b"writer", config.clone());
    let body = "b".repeat(100);
    let mut obj = NetworkObject::<Note>::with_value(&writer, Some(name("/bytes")), note("offsets", &body));
    obj.save().expect("save should succeed");

    let reader = library(&net, b"reader", config);
    let mut copy = NetworkObject::<Note>::named(&reader, name("/bytes"));
    copy.update().expect("update should succeed");
    assert_eq!(copy.name(), obj.name());
    assert_eq!(copy.data(), Some(&note("offsets", &body)));
}

#[test]
fn tombstone_is_observed_by_fresh_readers() {
    let net = network();
    let writer = library(&net, b"writer", fast_config());
    let mut obj = NetworkObject::<Note>::with_value(&writer, Some(name("/a/b")), note("t", "v1"));
    obj.save().expect("save should succeed");

    obj.save_as_gone(&name("/a/b"))
        .expect("tombstone on an unversioned name should succeed");
    assert!(obj.is_gone());
    assert_eq!(obj.state(), ObjectState::Gone);
    let tombstone = obj.name().cloned().expect("named");
    assert!(is_versioned(&tombstone));
    assert_eq!(version_root(&tombstone), name("/a/b"));

    let reader = library(&net, b"reader", fast_config());
    let mut copy = NetworkObject::<Note>::named(&reader, name("/a/b"));
    copy.update().expect("gone is a state, not an error");
    assert!(copy.is_gone());
    assert_eq!(copy.name(), Some(&tombstone));
    assert!(copy.data().is_none());
}

#[test]
fn tombstones_never_attach_to_existing_versions() {
    let net = network();
    let writer = library(&net, b"writer", fast_config());
    let mut obj = NetworkObject::<Note>::with_value(&writer, Some(name("/v")), note("t", "b"));
    obj.save().expect("save should succeed");
    let versioned = obj.name().cloned().expect("named");

    let err = obj
        .save_as_gone(&versioned)
        .expect_err("versioned names cannot be tombstoned");
    assert_eq!(err, ObjectError::AlreadyVersioned(versioned.clone()));
    assert!(err.is_usage());
    assert!(!obj.is_gone());
    assert_eq!(obj.name(), Some(&versioned));

    obj.save_root_as_gone()
        .expect("the root of the bound name can be tombstoned");
    assert!(obj.is_gone());
}

#[test]
fn unnamed_objects_refuse_to_sync() {
    let net = network();
    let lib = library(&net, b"writer", fast_config());
    let mut empty = NetworkObject::<Note>::new(&lib);
    let err = empty.update().expect_err("no name to update from");
    assert_eq!(err, ObjectError::Unnamed);
    assert_eq!(err.to_string(), "cannot retrieve or save without a name");

    let mut unnamed = NetworkObject::<Note>::with_value(&lib, None, note("t", "b"));
    assert_eq!(unnamed.save(), Err(ObjectError::Unnamed));
    assert!(unnamed.is_dirty());
}

#[test]
fn missing_content_surfaces_as_read_error() {
    let net = network();
    let config = LibraryConfig {
        fetch_timeout_ms: 50,
        ..fast_config()
    };
    let lib = library(&net, b"reader", config);
    let mut obj = NetworkObject::<Note>::named(&lib, name("/nobody/home"));
    let err = obj.update().expect_err("nothing is published");
    assert_eq!(
        err,
        ObjectError::Read(ReadError::NoVersionFound {
            name: name("/nobody/home")
        })
    );
    assert!(!err.is_usage());
    assert_eq!(obj.state(), ObjectState::Unbound);
}

#[test]
fn readers_follow_new_versions() {
    let net = network();
    let writer = library(&net, b"writer", fast_config());
    let reader = library(&net, b"reader", fast_config());
    let mut obj = NetworkObject::<Note>::with_value(&writer, Some(name("/feed")), note("t", "1"));
    let mut copy = NetworkObject::<Note>::named(&reader, name("/feed"));

    obj.save().expect("save should succeed");
    copy.update().expect("update should succeed");
    assert_eq!(copy.data(), Some(&note("t", "1")));

    obj.set_data(note("t", "2"));
    obj.save().expect("save should succeed");
    copy.update().expect("update should succeed");
    assert_eq!(copy.data(), Some(&note("t", "2")));
    assert_eq!(copy.name(), obj.name());
}
