use crate::crawler::{PersistOutcome, Resource};
use crate::hooks::{DownloadHandler, HookContext};
use crate::HookRejection;
use async_trait::async_trait;

/// Mirrors downloadable resources under the output root
///
/// Hypertext and unknown content pass through untouched. Existing files are
/// never overwritten.
#[derive(Debug, Default, Clone, Copy)]
pub struct MirrorDownloads;

#[async_trait]
impl DownloadHandler for MirrorDownloads {
    fn name(&self) -> &'static str {
        "mirror"
    }

    async fn handle(&self, resource: &mut Resource, ctx: &HookContext) -> Result<(), HookRejection> {
        if !resource.kind().is_downloadable() {
            return Ok(());
        }

        match resource.persist(&ctx.output_root).await {
            Ok(PersistOutcome::Written { path, bytes }) => {
                tracing::debug!(url = %resource.url(), path = %path.display(), bytes, "Mirrored");
                Ok(())
            }
            Ok(PersistOutcome::AlreadyExists { path }) => {
                tracing::debug!(url = %resource.url(), path = %path.display(), "Already mirrored");
                Ok(())
            }
            Err(e) => Err(HookRejection::new(self.name(), e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Ledger;
    use crate::url::{Classification, Identity};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn resource(url: &str, content_type: &str, body: &'static [u8]) -> Resource {
        let mut identity = Identity::parse(url).unwrap();
        identity.classify(Classification::from_content_type(Some(content_type)));
        Resource::from_bytes(identity, body)
    }

    #[tokio::test]
    async fn test_mirror_writes_downloadable() {
        let dir = TempDir::new().unwrap();
        let ctx = HookContext::new(Arc::new(Ledger::new()), dir.path());
        let mut image = resource("http://a.com/img/cat.jpg", "image/jpeg", b"\xff\xd8\xff");

        MirrorDownloads.handle(&mut image, &ctx).await.unwrap();

        let written = std::fs::read(dir.path().join("a.com/img/cat.jpg")).unwrap();
        assert_eq!(written, b"\xff\xd8\xff");
    }

    #[tokio::test]
    async fn test_mirror_skips_hypertext() {
        let dir = TempDir::new().unwrap();
        let ctx = HookContext::new(Arc::new(Ledger::new()), dir.path());
        let mut page = resource("http://a.com/", "text/html", b"<html></html>");

        MirrorDownloads.handle(&mut page, &ctx).await.unwrap();

        assert!(!dir.path().join("a.com").exists());
    }
}
