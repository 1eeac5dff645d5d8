use crate::hooks::{Acceptor, HookContext};
use crate::HookRejection;
use url::Url;

/// Admits each URL once
///
/// Records every `(url, referrer)` pair in the ledger, so a rediscovered URL
/// still gains its new referrer before being turned away.
#[derive(Debug, Default, Clone, Copy)]
pub struct HistoryAcceptor;

impl Acceptor for HistoryAcceptor {
    fn name(&self) -> &'static str {
        "history"
    }

    fn accept(&self, url: &str, referrer: &str, ctx: &HookContext) -> Result<(), HookRejection> {
        if ctx.ledger.record(url, referrer) {
            Ok(())
        } else {
            Err(HookRejection::new(self.name(), "already seen"))
        }
    }
}

/// Keeps the crawl on the host of the page a link was found on
///
/// Seeds (empty referrer) always pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct SameHostAcceptor;

impl Acceptor for SameHostAcceptor {
    fn name(&self) -> &'static str {
        "same-host"
    }

    fn accept(&self, url: &str, referrer: &str, _ctx: &HookContext) -> Result<(), HookRejection> {
        if referrer.is_empty() {
            return Ok(());
        }

        let referrer_host = match Url::parse(referrer) {
            Ok(parsed) => parsed.host_str().map(str::to_ascii_lowercase),
            Err(_) => return Ok(()),
        };

        let host = Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase));

        if host.is_some() && host == referrer_host {
            Ok(())
        } else {
            Err(HookRejection::new(
                self.name(),
                format!(
                    "{} leaves host {}",
                    url,
                    referrer_host.as_deref().unwrap_or("<none>")
                ),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Ledger;
    use std::sync::Arc;

    fn ctx() -> HookContext {
        HookContext::new(Arc::new(Ledger::new()), "/tmp/crawly-test")
    }

    #[test]
    fn test_history_admits_once() {
        let ctx = ctx();
        let history = HistoryAcceptor;

        assert!(history.accept("http://a.com/x", "", &ctx).is_ok());
        let rejection = history
            .accept("http://a.com/x", "http://a.com/", &ctx)
            .unwrap_err();
        assert_eq!(rejection.hook, "history");
    }

    #[test]
    fn test_history_keeps_every_referrer() {
        let ctx = ctx();
        let history = HistoryAcceptor;

        let _ = history.accept("http://a.com/x", "http://a.com/p1", &ctx);
        let _ = history.accept("http://a.com/x", "http://a.com/p2", &ctx);

        let referrers = ctx.ledger.referrers_of("http://a.com/x");
        assert_eq!(referrers.len(), 2);
        assert!(referrers.contains("http://a.com/p1"));
        assert!(referrers.contains("http://a.com/p2"));
    }

    #[test]
    fn test_same_host_passes_seeds() {
        assert!(SameHostAcceptor
            .accept("http://anywhere.org/", "", &ctx())
            .is_ok());
    }

    #[test]
    fn test_same_host_compares_hosts() {
        let ctx = ctx();
        assert!(SameHostAcceptor
            .accept("http://a.com/deep/page", "http://A.com/", &ctx)
            .is_ok());
        assert!(SameHostAcceptor
            .accept("http://b.com/", "http://a.com/", &ctx)
            .is_err());
        assert!(SameHostAcceptor
            .accept("not a url", "http://a.com/", &ctx)
            .is_err());
    }

    #[test]
    fn test_same_host_ignores_port() {
        assert!(SameHostAcceptor
            .accept("http://127.0.0.1:9000/img.png", "http://127.0.0.1:8000/", &ctx())
            .is_ok());
    }
}
