//! Built-in hooks addressable by name from the configuration

use crate::config::Config;
use crate::hooks::{
    HistoryAcceptor, HookChains, MirrorDownloads, SameHostAcceptor, SrcsetLinks, StripFragment,
    StripQuery, TraceVisitor, VisitedLog, WebSchemeValidator,
};
use crate::{ConfigError, CrawlyError, CrawlyResult};

pub const HISTORY: &str = "history";
pub const SAME_HOST: &str = "same-host";
pub const VISITED_LOG: &str = "visited-log";
pub const TRACE: &str = "trace";
pub const STRIP_FRAGMENT: &str = "strip-fragment";
pub const STRIP_QUERY: &str = "strip-query";
pub const WEB_SCHEME: &str = "web-scheme";
pub const MIRROR: &str = "mirror";
pub const SRCSET: &str = "srcset";

pub const ACCEPTORS: &[&str] = &[HISTORY, SAME_HOST];
pub const VISITORS: &[&str] = &[VISITED_LOG, TRACE];
pub const CLEANERS: &[&str] = &[STRIP_FRAGMENT, STRIP_QUERY];
pub const VALIDATORS: &[&str] = &[WEB_SCHEME];
pub const DOWNLOAD_HANDLERS: &[&str] = &[MIRROR];
pub const PARSING_HANDLERS: &[&str] = &[SRCSET];

fn unknown(chain: &'static str, name: &str) -> CrawlyError {
    CrawlyError::Config(ConfigError::UnknownHook {
        chain,
        name: name.to_string(),
    })
}

/// Instantiates the hook chains named in the configuration
///
/// Opens the visited log when the `visited-log` visitor is configured.
pub fn build_chains(config: &Config) -> CrawlyResult<HookChains> {
    let hooks = &config.hooks;
    let mut chains = HookChains::new();

    for name in &hooks.acceptors {
        chains = match name.as_str() {
            HISTORY => chains.with_acceptor(HistoryAcceptor),
            SAME_HOST => chains.with_acceptor(SameHostAcceptor),
            other => return Err(unknown("acceptor", other)),
        };
    }

    for name in &hooks.visitors {
        chains = match name.as_str() {
            VISITED_LOG => {
                let path = config.output.visited_log.as_deref().ok_or_else(|| {
                    ConfigError::Validation(
                        "the visited-log visitor requires output.visited-log to be set".to_string(),
                    )
                })?;
                chains.with_visitor(VisitedLog::open(path)?)
            }
            TRACE => chains.with_visitor(TraceVisitor),
            other => return Err(unknown("visitor", other)),
        };
    }

    for name in &hooks.cleaners {
        chains = match name.as_str() {
            STRIP_FRAGMENT => chains.with_cleaner(StripFragment),
            STRIP_QUERY => chains.with_cleaner(StripQuery),
            other => return Err(unknown("cleaner", other)),
        };
    }

    for name in &hooks.validators {
        chains = match name.as_str() {
            WEB_SCHEME => chains.with_validator(WebSchemeValidator),
            other => return Err(unknown("validator", other)),
        };
    }

    for name in &hooks.download_handlers {
        chains = match name.as_str() {
            MIRROR => chains.with_download_handler(MirrorDownloads),
            other => return Err(unknown("download handler", other)),
        };
    }

    for name in &hooks.parsing_handlers {
        chains = match name.as_str() {
            SRCSET => chains.with_parsing_handler(SrcsetLinks),
            other => return Err(unknown("parsing handler", other)),
        };
    }

    Ok(chains)
}
