use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};

/// Asynchronous value computed at most once.
///
/// The factory runs the first time any caller awaits [`Lazy::value`]. Every
/// caller, including those that arrive while the first computation is still
/// pending, gets a clone of the same result. Failures are shared too, behind
/// an [`Arc`].
///
/// ```
/// use futures_util::FutureExt;
/// use shipwright_http::Lazy;
///
/// let token = Lazy::new(|| async { Ok::<_, std::io::Error>("secret".to_string()) });
/// let value = token.value().now_or_never().unwrap();
/// assert_eq!(value.unwrap(), "secret");
/// ```
pub struct Lazy<T, E> {
    shared: Shared<BoxFuture<'static, Result<T, Arc<E>>>>,
}

impl<T, E> Lazy<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let shared = async move { factory().await.map_err(Arc::new) }.boxed().shared();
        Self { shared }
    }

    /// Resolve the value, running the factory if nobody has yet.
    pub fn value(&self) -> Shared<BoxFuture<'static, Result<T, Arc<E>>>> { self.shared.clone() }

    /// The result, if the computation has already finished.
    pub fn peek(&self) -> Option<Result<T, Arc<E>>> { self.shared.peek().cloned() }
}

impl<T, E> Clone for Lazy<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone, E> fmt::Debug for Lazy<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("settled", &self.shared.peek().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    struct Boom;

    #[tokio::test]
    async fn test_factory_runs_once_for_concurrent_callers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let lazy = Lazy::new(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, Boom>(42u32)
        });

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let value = lazy.value();
                tokio::spawn(value)
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(lazy.value().await.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_shared_by_concurrent_callers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let lazy: Lazy<u32, Boom> = Lazy::new(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Err(Boom)
        });

        let handles: Vec<_> = (0..8).map(|_| tokio::spawn(lazy.value())).collect();

        let mut failures = Vec::new();
        for handle in handles {
            failures.push(handle.await.unwrap().unwrap_err());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(failures.iter().all(|failure| Arc::ptr_eq(failure, &failures[0])));
        assert_eq!(*failures[0], Boom);

        let late = lazy.value().await.unwrap_err();
        assert!(Arc::ptr_eq(&late, &failures[0]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_factory_not_invoked_until_awaited() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let lazy = Lazy::new(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Boom>("v")
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(lazy.peek().is_none());

        lazy.value().await.unwrap();
        assert!(matches!(lazy.peek(), Some(Ok("v"))));
    }
}
