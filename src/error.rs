//! Error-handling helpers shared across the crate.

/// Extension for results whose failure should be logged and swallowed
/// rather than propagated, such as the reactive sampling pass behind a
/// scrape.
pub trait ResultOkLogExt<T, E> {
    /// Converts the result to an [`Option`], logging the error case.
    fn ok_log(self) -> Option<T>;
}

impl<T, E: std::error::Error> ResultOkLogExt<T, E> for std::result::Result<T, E> {
    fn ok_log(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }
}
