use axum::{Form, Json, extract::State};
use tracing::info;

use crate::{
    AppState,
    api::models::auth::{Token, TokenRequest},
    auth::credentials,
    errors::Error,
};

/// OAuth2 compatible token login, get an access token for future requests
#[utoipa::path(
    post,
    path = "/token",
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = Token),
        (status = 400, description = "Unsupported grant type"),
        (status = 401, description = "Incorrect username or password"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Form(request): Form<TokenRequest>) -> Result<Json<Token>, Error> {
    if let Some(grant_type) = request.grant_type.as_deref().filter(|g| *g != "password") {
        return Err(Error::BadRequest {
            message: format!("Unsupported grant_type '{grant_type}'"),
        });
    }

    let user = credentials::authenticate(&*state.users, &state.passwords, &request.username, &request.password).await?;

    let access_token = state.issuer.issue(&user.username, Some(state.config.access_token_ttl()))?;
    info!(user_id = user.id, "Issued access token");

    Ok(Json(Token::bearer(access_token)))
}
