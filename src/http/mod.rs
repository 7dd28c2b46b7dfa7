//! HTTP retrieval with bounded retry and failure classification.

mod fetch;
mod useragent;

pub use fetch::{
    AttemptOutcome, FETCH_TIMEOUT, FailureKind, FetchSession, RETRY_DELAY, RETRY_MAX, RETRY_STATUS,
    client,
};
pub use useragent::{USER_AGENTS, random_user_agent};
