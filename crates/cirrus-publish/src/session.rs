//! Publishing sessions with a guaranteed final flush.

use crate::publisher::ContentPublisher;
use cirrus_core::Result;
use std::future::Future;
use tracing::warn;

impl ContentPublisher {
    /// Run `body` against this publisher, then flush the invalidator.
    ///
    /// The flush is attempted whether or not `body` fails. An error from
    /// `body` takes precedence over a flush error.
    pub async fn session<'a, F, Fut, T>(&'a self, body: F) -> Result<T>
    where
        F: FnOnce(&'a ContentPublisher) -> Fut,
        Fut: Future<Output = Result<T>> + 'a,
    {
        let result = body(self).await;
        let flushed = self.flush().await;

        match (result, flushed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(flush_error)) => {
                warn!(error = %flush_error, "Final flush failed after publishing error");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ContentPublisher, PublisherConfig};
    use cirrus_cdn::InvalidationBatcher;
    use cirrus_core::Error;
    use cirrus_core::cdn::DistributionSummary;
    use cirrus_core::memory::{InMemoryCdn, InMemoryObjectStore};
    use std::sync::Arc;

    fn setup() -> (ContentPublisher, Arc<InMemoryObjectStore>, Arc<InMemoryCdn>) {
        let store = Arc::new(InMemoryObjectStore::new());
        let cdn = Arc::new(InMemoryCdn::new(vec![DistributionSummary::new(
            "E123",
            ["assets.s3.amazonaws.com"],
        )]));
        let batcher = Arc::new(InvalidationBatcher::new(cdn.clone()));
        let publisher = ContentPublisher::new(PublisherConfig::new("assets"), store.clone())
            .unwrap()
            .with_invalidator(batcher);
        (publisher, store, cdn)
    }

    #[tokio::test]
    async fn test_session_flushes_on_success() {
        let (publisher, _, cdn) = setup();

        let uploaded = publisher
            .session(|p| async move {
                p.render("a", "a.css").await?;
                p.render("b", "b.css").await?;
                Ok::<_, Error>(2)
            })
            .await
            .unwrap();

        assert_eq!(uploaded, 2);
        let sent = cdn.invalidations();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].paths.items, vec!["/a.css", "/b.css"]);
    }

    #[tokio::test]
    async fn test_session_flushes_on_failure() {
        let (publisher, _, cdn) = setup();

        let err = publisher
            .session(|p| async move {
                p.render("a", "a.css").await?;
                p.render("", "b.css").await?;
                Ok::<_, Error>(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(cdn.invalidations()[0].paths.items, vec!["/a.css"]);
    }

    #[tokio::test]
    async fn test_session_reports_flush_failure() {
        let (publisher, store, cdn) = setup();
        cdn.fail_invalidations(true);

        let err = publisher
            .session(|p| async move { p.render("a", "a.css").await.map(|_| ()) })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cdn(_)));
        assert_eq!(store.puts().len(), 1);
    }
}
