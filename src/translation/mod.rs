/*!
 * Translation of pending records.
 *
 * - `dispatcher`: bounded-concurrency dispatch pass over the store
 */

pub use self::dispatcher::{DispatchReport, FailureKind, TranslationDispatcher};

pub mod dispatcher;
