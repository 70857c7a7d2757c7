use async_trait::async_trait;

use super::{ActionHandler, HandlerContext, Outcome};
use crate::error::ActionError;
use crate::ws::actions::Action;

/// Accepted on the wire but not acted on yet.
pub struct NotImplementedHandler;

#[async_trait]
impl ActionHandler for NotImplementedHandler {
    async fn handle(&self, _ctx: &HandlerContext<'_>, action: Action) -> Result<Outcome, ActionError> {
        Err(ActionError::NotImplemented(action.kind()))
    }
}
