use http::StatusCode;

use crate::Error;

/// A blocking operation that suspends the calling thread until some external party responds.
///
/// This trait is automatically mocked by mockall in test builds, generating `MockBlockingIo`.
#[cfg_attr(test, mockall::automock)]
pub trait BlockingIo: Send + Sync + 'static {
    /// Performs the operation, blocking until it completes or fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoFailure`] if the operation failed or did not complete within its
    /// bounded wait.
    fn perform_io(&self) -> Result<StatusCode, Error>;
}

impl<T> BlockingIo for Box<T>
where
    T: BlockingIo + ?Sized,
{
    fn perform_io(&self) -> Result<StatusCode, Error> {
        (**self).perform_io()
    }
}
