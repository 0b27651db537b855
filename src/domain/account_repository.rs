use crate::domain::Account;
use futures::Stream;
use std::error::Error as StdError;

/// Persistence of [Account]s. Each operation is a single unit of work, there are neither retries
/// nor transactions spanning multiple operations.
#[trait_variant::make(Send)]
pub trait AccountRepository
where
    Self: Clone + Send + Sync + 'static,
{
    type Error: StdError + Send + Sync + 'static;

    /// Persist the given account, ignoring its `id`, and return it with the assigned `id`.
    async fn create_account(&self, account: Account) -> Result<Account, Self::Error>;

    /// All accounts in ascending `id` order.
    async fn accounts(
        &self,
    ) -> Result<impl Stream<Item = Result<Account, Self::Error>> + Send, Self::Error>;

    async fn account_by_id(&self, id: i64) -> Result<Option<Account>, Self::Error>;

    /// Replace all fields but the `id` of the account with the given account's `id`; `None` if
    /// there is no such account.
    async fn update_account(&self, account: Account) -> Result<Option<Account>, Self::Error>;

    /// Replace only the first and last name of the account with the given `id` in a single step,
    /// leaving all other fields untouched; `None` if there is no such account.
    async fn rename_account(
        &self,
        id: i64,
        first_name: String,
        last_name: String,
    ) -> Result<Option<Account>, Self::Error>;

    /// Remove and return the account with the given `id`; `None` if there is no such account.
    async fn delete_account(&self, id: i64) -> Result<Option<Account>, Self::Error>;
}
