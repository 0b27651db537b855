use crate::{
    api::{ApiError, AppState, Error},
    domain::{Account, AccountRepository, CreateAccountRequest, UpdateAccountRequest},
};
use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    http::Method,
    routing::{get, post},
    Json, Router,
};
use futures::TryStreamExt;
use tracing::info;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_accounts,
        create_account,
        delete_accounts,
        account_by_id,
        update_account,
        delete_account,
        transfer
    ),
    components(schemas(Account, CreateAccountRequest, UpdateAccountRequest, ApiError))
)]
pub struct ApiDoc;

pub(super) fn app<R>() -> Router<AppState<R>>
where
    R: AccountRepository,
{
    Router::new()
        .route(
            "/account",
            get(list_accounts::<R>)
                .post(create_account::<R>)
                .delete(delete_accounts)
                .fallback(method_not_allowed),
        )
        .route(
            "/account/:id",
            get(account_by_id::<R>)
                .put(update_account::<R>)
                .delete(delete_account::<R>)
                .fallback(method_not_allowed),
        )
        .route(
            "/transfer",
            post(transfer).fallback(method_not_allowed),
        )
}

/// List all accounts.
#[utoipa::path(
    get,
    path = "/account",
    responses(
        (status = 200, description = "All accounts", body = [Account]),
        (status = 500, description = "Storage failure", body = ApiError)
    )
)]
async fn list_accounts<R>(
    State(app_state): State<AppState<R>>,
) -> Result<Json<Vec<Account>>, Error>
where
    R: AccountRepository,
{
    let accounts = app_state
        .account_repository
        .accounts()
        .await
        .map_err(Error::storage)?
        .try_collect::<Vec<_>>()
        .await
        .map_err(Error::storage)?;
    Ok(Json(accounts))
}

/// Create an account with a random number and a zero balance.
#[utoipa::path(
    post,
    path = "/account",
    request_body = CreateAccountRequest,
    responses(
        (status = 200, description = "The created account", body = Account),
        (status = 400, description = "Malformed request", body = ApiError),
        (status = 500, description = "Storage failure", body = ApiError)
    )
)]
async fn create_account<R>(
    State(app_state): State<AppState<R>>,
    body: Bytes,
) -> Result<Json<Account>, Error>
where
    R: AccountRepository,
{
    let request = serde_json::from_slice::<CreateAccountRequest>(&body)?;

    let account = app_state
        .account_repository
        .create_account(request.into())
        .await
        .map_err(Error::storage)?;

    info!(id = account.id, number = account.number, "created account");
    Ok(Json(account))
}

/// Deleting all accounts at once is not supported, use `DELETE /account/{id}`.
#[utoipa::path(
    delete,
    path = "/account",
    responses((status = 501, description = "Not implemented", body = ApiError))
)]
async fn delete_accounts() -> Error {
    Error::NotImplemented("deleting all accounts")
}

/// Get the account with the given ID.
#[utoipa::path(
    get,
    path = "/account/{id}",
    params(("id" = i64, Path, description = "Account ID")),
    responses(
        (status = 200, description = "The account", body = Account),
        (status = 400, description = "Malformed ID", body = ApiError),
        (status = 404, description = "Unknown ID", body = ApiError),
        (status = 500, description = "Storage failure", body = ApiError)
    )
)]
async fn account_by_id<R>(
    State(app_state): State<AppState<R>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Account>, Error>
where
    R: AccountRepository,
{
    let Path(id) = id?;

    app_state
        .account_repository
        .account_by_id(id)
        .await
        .map_err(Error::storage)?
        .map(Json)
        .ok_or(Error::NotFound(id))
}

/// Replace the holder names of the account with the given ID.
#[utoipa::path(
    put,
    path = "/account/{id}",
    params(("id" = i64, Path, description = "Account ID")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "The updated account", body = Account),
        (status = 400, description = "Malformed request", body = ApiError),
        (status = 404, description = "Unknown ID", body = ApiError),
        (status = 500, description = "Storage failure", body = ApiError)
    )
)]
async fn update_account<R>(
    State(app_state): State<AppState<R>>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<Json<Account>, Error>
where
    R: AccountRepository,
{
    let Path(id) = id?;
    let UpdateAccountRequest {
        first_name,
        last_name,
    } = serde_json::from_slice::<UpdateAccountRequest>(&body)?;

    let account = app_state
        .account_repository
        .rename_account(id, first_name, last_name)
        .await
        .map_err(Error::storage)?
        .ok_or(Error::NotFound(id))?;

    info!(id, "updated account");
    Ok(Json(account))
}

/// Delete the account with the given ID.
#[utoipa::path(
    delete,
    path = "/account/{id}",
    params(("id" = i64, Path, description = "Account ID")),
    responses(
        (status = 200, description = "The deleted account", body = Account),
        (status = 400, description = "Malformed ID", body = ApiError),
        (status = 404, description = "Unknown ID", body = ApiError),
        (status = 500, description = "Storage failure", body = ApiError)
    )
)]
async fn delete_account<R>(
    State(app_state): State<AppState<R>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Account>, Error>
where
    R: AccountRepository,
{
    let Path(id) = id?;

    let account = app_state
        .account_repository
        .delete_account(id)
        .await
        .map_err(Error::storage)?
        .ok_or(Error::NotFound(id))?;

    info!(id, "deleted account");
    Ok(Json(account))
}

/// Money transfers between accounts are not supported.
#[utoipa::path(
    post,
    path = "/transfer",
    responses((status = 501, description = "Not implemented", body = ApiError))
)]
async fn transfer() -> Error {
    Error::NotImplemented("transfer")
}

async fn method_not_allowed(method: Method) -> Error {
    Error::MethodNotAllowed(method)
}
