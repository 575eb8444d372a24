use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("parley.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("parley.client.request_errors");
pub(crate) static CLIENT_EMPTY_REPLIES: Counter = Counter::new("parley.client.empty_replies");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("parley.client.request_duration_seconds");

pub(crate) static SESSION_TURNS: Counter = Counter::new("parley.session.turns");
pub(crate) static SESSION_RETRIES: Counter = Counter::new("parley.session.retries");

pub(crate) static TRANSCRIPT_SAVES: Counter = Counter::new("parley.transcript.saves");
pub(crate) static TRANSCRIPT_SAVE_ERRORS: Counter = Counter::new("parley.transcript.save_errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_EMPTY_REPLIES);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_RETRIES);

    collector.register_counter(&TRANSCRIPT_SAVES);
    collector.register_counter(&TRANSCRIPT_SAVE_ERRORS);
}
