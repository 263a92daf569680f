use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{DetailContent, ExternalRef, MarkerStyle, OverlayHandle, Position, ResultBatch, SearchCriteria, SearchResult, ViewportTransition};

/// The rendering side of the map. Handles are minted and owned by the surface.
pub trait MapSurface {
    fn create_overlay(&mut self, position: Position, style: &MarkerStyle) -> OverlayHandle;
    fn remove_overlay(&mut self, handle: OverlayHandle);
    /// `zoom = None` keeps the current zoom level. The surface reports completion
    /// by handing `transition` back to the session.
    fn set_viewport(&mut self, center: Position, zoom: Option<u8>, transition: ViewportTransition);
    fn open_detail(&mut self, handle: OverlayHandle, content: &DetailContent);
    fn close_detail(&mut self, handle: OverlayHandle);
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, criteria: &SearchCriteria) -> Result<ResultBatch, ProviderError>;
}

#[async_trait]
pub trait ConversionProvider: Send + Sync {
    async fn convert(&self, result: &SearchResult) -> Result<ExternalRef, ProviderError>;
}
