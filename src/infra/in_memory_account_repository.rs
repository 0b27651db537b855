use crate::domain::{Account, AccountRepository};
use futures::{stream, Stream};
use std::{collections::BTreeMap, convert::Infallible, sync::Arc};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Non-persistent [AccountRepository], assigning ids from 1 upwards.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountRepository {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    accounts: BTreeMap<i64, Account>,
}

impl AccountRepository for InMemoryAccountRepository {
    type Error = Infallible;

    #[instrument(skip(self))]
    async fn create_account(&self, mut account: Account) -> Result<Account, Self::Error> {
        let mut state = self.state.write().await;

        state.last_id += 1;
        account.id = state.last_id;
        state.accounts.insert(account.id, account.clone());

        debug!(id = account.id, "inserted account");
        Ok(account)
    }

    #[instrument(skip(self))]
    async fn accounts(
        &self,
    ) -> Result<impl Stream<Item = Result<Account, Self::Error>> + Send, Self::Error> {
        let accounts = self
            .state
            .read()
            .await
            .accounts
            .values()
            .cloned()
            .collect::<Vec<_>>();
        Ok(stream::iter(accounts.into_iter().map(Ok)))
    }

    #[instrument(skip(self))]
    async fn account_by_id(&self, id: i64) -> Result<Option<Account>, Self::Error> {
        let account = self.state.read().await.accounts.get(&id).cloned();
        Ok(account)
    }

    #[instrument(skip(self))]
    async fn update_account(&self, account: Account) -> Result<Option<Account>, Self::Error> {
        let mut state = self.state.write().await;

        let updated = state.accounts.get_mut(&account.id).map(|existing| {
            *existing = account;
            existing.clone()
        });
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn rename_account(
        &self,
        id: i64,
        first_name: String,
        last_name: String,
    ) -> Result<Option<Account>, Self::Error> {
        let mut state = self.state.write().await;

        let renamed = state.accounts.get_mut(&id).map(|account| {
            account.first_name = first_name;
            account.last_name = last_name;
            account.clone()
        });
        Ok(renamed)
    }

    #[instrument(skip(self))]
    async fn delete_account(&self, id: i64) -> Result<Option<Account>, Self::Error> {
        let account = self.state.write().await.accounts.remove(&id);
        Ok(account)
    }
}
