pub mod domain;
pub mod gcp;
pub mod telemetry;

pub use domain::*;
pub use gcp::*;
pub use telemetry::*;

// Re-export mocks when the testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockLogStore;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockMessageSource;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockSubscriberTransport;
#[cfg(any(test, feature = "testing"))]
pub use gcp::MockAccessTokenProvider;
