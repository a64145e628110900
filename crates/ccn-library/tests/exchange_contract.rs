use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ccn_codec::{ContentObject, ContentType, Interest, SignedInfo};
use ccn_core::{Name, PublisherKey};
use ccn_library::{
    CancellationToken, Exchange, ExchangeError, FlowController, FlowLimits, RetryPolicy,
    NO_TIMEOUT,
};
use ccn_transport::{
    ContentListener, InMemoryForwarder, InterestListener, ListenerId, NetworkAccess, OwnerId,
    TransportError,
};

fn name(uri: &str) -> Name {
    Name::from_uri(uri).expect("uri should parse")
}

fn unit(uri: &str) -> ContentObject {
    ContentObject::unsigned(
        name(uri),
        SignedInfo::new(PublisherKey([9; 32]), ContentType::Data),
        uri.as_bytes().to_vec(),
    )
}

fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..5_000 {
        if condition() {
            return;
        }
        thread::sleep(Duration::from_millis(1));
    }
    panic!("condition not reached in time");
}

/// Reports `Interrupted` for the first `interruptions` blocking calls.
struct FlakyNetwork {
    inner: InMemoryForwarder,
    interruptions: AtomicU32,
    calls: AtomicU32,
}

impl FlakyNetwork {
    fn new(interruptions: u32) -> Self {
        Self {
            inner: InMemoryForwarder::default(),
            interruptions: AtomicU32::new(interruptions),
            calls: AtomicU32::new(0),
        }
    }

    fn interrupt(&self) -> Result<(), TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self
            .interruptions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match remaining {
            Ok(_) => Err(TransportError::Interrupted),
            Err(_) => Ok(()),
        }
    }
}

impl NetworkAccess for FlakyNetwork {
    fn put(&self, object: &ContentObject) -> Result<(), TransportError> {
        self.interrupt()?;
        self.inner.put(object)
    }

    fn get(
        &self,
        interest: &Interest,
        timeout: Option<Duration>,
    ) -> Result<Option<ContentObject>, TransportError> {
        self.interrupt()?;
        self.inner.get(interest, timeout)
    }

    fn set_interest_filter(
        &self,
        owner: OwnerId,
        prefix: &Name,
        listener: &InterestListener,
    ) -> Result<(), TransportError> {
        self.inner.set_interest_filter(owner, prefix, listener)
    }

    fn cancel_interest_filter(
        &self,
        owner: OwnerId,
        prefix: &Name,
        listener: ListenerId,
    ) -> Result<(), TransportError> {
        self.inner.cancel_interest_filter(owner, prefix, listener)
    }

    fn express_interest(
        &self,
        owner: OwnerId,
        interest: &Interest,
        listener: &ContentListener,
    ) -> Result<(), TransportError> {
        self.inner.express_interest(owner, interest, listener)
    }

    fn cancel_interest(
        &self,
        owner: OwnerId,
        interest: &Interest,
        listener: ListenerId,
    ) -> Result<(), TransportError> {
        self.inner.cancel_interest(owner, interest, listener)
    }
}

fn writer_and_reader() -> (FlowController, Exchange) {
    let network: Arc<dyn NetworkAccess> = Arc::new(InMemoryForwarder::default());
    let flow = FlowController::new(
        Arc::new(Exchange::new(Arc::clone(&network))),
        FlowLimits::default(),
    );
    (flow, Exchange::new(network))
}

#[test]
fn get_without_timeout_waits_for_a_later_put() {
    let (flow, reader) = writer_and_reader();
    flow.add_namespace(&name("/wait")).expect("namespace registers");

    let pending = thread::spawn(move || reader.get(&Interest::new(name("/wait")), NO_TIMEOUT));
    wait_for(|| flow.unsatisfied_len() == 1);
    thread::sleep(Duration::from_millis(20));
    flow.put(unit("/wait/late")).expect("put should succeed");

    let got = pending
        .join()
        .expect("reader thread should not panic")
        .expect("get should succeed")
        .expect("late content should arrive");
    assert_eq!(got.name, name("/wait/late"));
}

#[test]
fn zero_timeout_get_does_not_wait() {
    let (flow, reader) = writer_and_reader();
    flow.add_namespace(&name("/now")).expect("namespace registers");
    let got = reader
        .get(&Interest::new(name("/now")), Some(Duration::ZERO))
        .expect("get should run");
    assert!(got.is_none());
}

#[test]
fn unsolicited_put_is_not_an_error() {
    let (_, reader) = writer_and_reader();
    let published = reader.put(unit("/nobody/asked")).expect("put reports success");
    assert_eq!(published.name, name("/nobody/asked"));
    let got = reader
        .get(&Interest::new(name("/nobody")), Some(Duration::ZERO))
        .expect("get should run");
    assert!(got.is_none());
}

#[test]
fn interruptions_are_retried_inside_get() {
    let flaky = Arc::new(FlakyNetwork::new(3));
    let network: Arc<dyn NetworkAccess> = flaky.clone();
    let exchange = Exchange::new(network).with_retry_policy(RetryPolicy::bounded(5));
    let got = exchange
        .get(&Interest::new(name("/flaky")), Some(Duration::from_millis(10)))
        .expect("interruptions should be absorbed");
    assert!(got.is_none());
    assert_eq!(flaky.calls.load(Ordering::SeqCst), 4);
}

#[test]
fn bounded_retries_surface_exhaustion() {
    let network: Arc<dyn NetworkAccess> = Arc::new(FlakyNetwork::new(10));
    let exchange = Exchange::new(network).with_retry_policy(RetryPolicy::bounded(2));
    let err = exchange
        .put(unit("/flaky/1"))
        .expect_err("retries should run out");
    assert_eq!(
        err,
        ExchangeError::RetriesExhausted {
            op: "put",
            attempts: 2
        }
    );
}

#[test]
fn cancellation_token_stops_retrying() {
    let network: Arc<dyn NetworkAccess> = Arc::new(FlakyNetwork::new(u32::MAX));
    let token = CancellationToken::new();
    let exchange = Exchange::new(network).with_cancellation(token.clone());
    let canceller = {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            token.cancel();
        })
    };
    let err = exchange
        .get(&Interest::new(name("/forever")), NO_TIMEOUT)
        .expect_err("cancellation should end the retry loop");
    canceller.join().expect("canceller should not panic");
    assert_eq!(err, ExchangeError::Cancelled);
}

#[test]
fn independent_filters_on_one_prefix() {
    let network: Arc<dyn NetworkAccess> = Arc::new(InMemoryForwarder::default());
    let publisher = Exchange::new(Arc::clone(&network));
    let reader = Exchange::new(network);
    let first = InterestListener::new();
    let second = InterestListener::new();
    publisher
        .register_filter(&name("/shared"), &first)
        .expect("filter registers");
    publisher
        .register_filter(&name("/shared"), &second)
        .expect("filter registers");

    let _ = reader.get(&Interest::new(name("/shared/x")), Some(Duration::from_millis(1)));
    assert_eq!(first.drain().len(), 1);
    assert_eq!(second.drain().len(), 1);

    publisher
        .unregister_filter(&name("/shared"), &first)
        .expect("filter unregisters");
    let _ = reader.get(&Interest::new(name("/shared/y")), Some(Duration::from_millis(1)));
    assert!(first.drain().is_empty());
    assert_eq!(second.drain().len(), 1);
}

#[test]
fn independent_listeners_on_one_standing_interest() {
    let (flow, subscriber) = writer_and_reader();
    flow.add_namespace(&name("/live")).expect("namespace registers");
    let interest = Interest::new(name("/live"));
    let a = ContentListener::new();
    let b = ContentListener::new();
    subscriber
        .express_interest(&interest, &a)
        .expect("express should succeed");
    subscriber
        .express_interest(&interest, &b)
        .expect("express should succeed");
    wait_for(|| flow.unsatisfied_len() == 2);

    flow.put(unit("/live/1")).expect("put should succeed");
    assert_eq!(
        a.next_timeout(Duration::from_secs(5)).map(|u| u.name),
        Some(name("/live/1"))
    );
    assert_eq!(
        b.next_timeout(Duration::from_secs(5)).map(|u| u.name),
        Some(name("/live/1"))
    );

    subscriber
        .cancel_interest(&interest, &a)
        .expect("cancel should succeed");
    flow.put(unit("/live/2")).expect("put should succeed");
    assert_eq!(
        b.next_timeout(Duration::from_secs(5)).map(|u| u.name),
        Some(name("/live/2"))
    );
    assert!(a.try_next().is_none());
}
