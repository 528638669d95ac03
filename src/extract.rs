use axum::{
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// ApiPath
///
/// `Path` extractor whose rejection is an `AppError::ParameterValidation`, so a malformed
/// id such as `/api/v1/types/abc` gets the structured error body.
#[derive(Debug, Clone, Copy)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::ParameterValidation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// ApiQuery
///
/// `Query` extractor with the same rejection mapping as `ApiPath`.
#[derive(Debug, Clone, Default)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::ParameterValidation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    use crate::pagination::PageQueryParams;

    fn parts(uri: &str) -> Parts {
        Request::builder().uri(uri).body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn duplicate_direction_is_a_parameter_error() {
        let mut parts = parts("/api/v1/types?direction=true&asc=true");

        let result = ApiQuery::<PageQueryParams>::from_request_parts(&mut parts, &()).await;

        assert!(matches!(result, Err(AppError::ParameterValidation(msg)) if msg.contains("direction")));
    }

    #[tokio::test]
    async fn query_values_pass_through() {
        let mut parts = parts("/api/v1/types?page=2&asc=false");

        let ApiQuery(params) = ApiQuery::<PageQueryParams>::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(params.page.as_deref(), Some("2"));
        assert_eq!(params.direction.as_deref(), Some("false"));
    }
}
