//! Request extractors that report failures through the API error body.

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Path},
    http::request::Parts,
};
use spoolyard_ids::{decode, Id};

use crate::Error;

/// A JSON request body. Malformed bodies, unknown fields and invalid ids
/// inside the body all become `400` with a `{"message"}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Query string parameters, rejected the same way as bodies.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);

/// The `{id}` path segment, decoded with the identifier codec before any
/// store access.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub Id);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;
        Ok(IdPath(decode(&raw)?))
    }
}

/// Parse a comma-separated list of encoded ids from a query filter.
pub fn parse_id_list(raw: Option<&str>) -> Result<Option<Vec<Id>>, Error> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    raw.split(',')
        .map(|part| decode(part.trim()).map_err(Error::from))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
