use crate::domain::{self, AccountRepository};
use futures::{Stream, TryStreamExt};
use sqlx::{prelude::FromRow, PgPool, QueryBuilder};
use std::iter::once;
use time::OffsetDateTime;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AccountRepository for PgAccountRepository {
    type Error = sqlx::Error;

    #[instrument(skip(self))]
    async fn create_account(&self, account: domain::Account) -> Result<domain::Account, Self::Error> {
        let account = QueryBuilder::new(
            "INSERT INTO account (first_name, last_name, number, balance, created_at) ",
        )
        .push_values(once(account), |mut q, account| {
            q.push_bind(account.first_name)
                .push_bind(account.last_name)
                .push_bind(account.number)
                .push_bind(account.balance)
                .push_bind(account.created_at);
        })
        .push(" RETURNING *")
        .build_query_as::<Account>()
        .fetch_one(&self.pool)
        .await?;

        debug!(id = account.id, "inserted account");
        Ok(account.into())
    }

    #[instrument(skip(self))]
    async fn accounts(
        &self,
    ) -> Result<impl Stream<Item = Result<domain::Account, Self::Error>> + Send, Self::Error> {
        let accounts = sqlx::query_as::<_, Account>("SELECT * FROM account ORDER BY id")
            .fetch(&self.pool)
            .map_ok(domain::Account::from);
        Ok(accounts)
    }

    #[instrument(skip(self))]
    async fn account_by_id(&self, id: i64) -> Result<Option<domain::Account>, Self::Error> {
        let account = QueryBuilder::new("SELECT * FROM account WHERE id = ")
            .push_bind(id)
            .build_query_as::<Account>()
            .fetch_optional(&self.pool)
            .await?;
        let account = account.map(domain::Account::from);
        Ok(account)
    }

    #[instrument(skip(self))]
    async fn update_account(
        &self,
        account: domain::Account,
    ) -> Result<Option<domain::Account>, Self::Error> {
        let domain::Account {
            id,
            first_name,
            last_name,
            number,
            created_at,
            balance,
        } = account;

        let account = QueryBuilder::new("UPDATE account SET first_name = ")
            .push_bind(first_name)
            .push(", last_name = ")
            .push_bind(last_name)
            .push(", number = ")
            .push_bind(number)
            .push(", balance = ")
            .push_bind(balance)
            .push(", created_at = ")
            .push_bind(created_at)
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING *")
            .build_query_as::<Account>()
            .fetch_optional(&self.pool)
            .await?;
        let account = account.map(domain::Account::from);
        Ok(account)
    }

    #[instrument(skip(self))]
    async fn rename_account(
        &self,
        id: i64,
        first_name: String,
        last_name: String,
    ) -> Result<Option<domain::Account>, Self::Error> {
        let account = QueryBuilder::new("UPDATE account SET first_name = ")
            .push_bind(first_name)
            .push(", last_name = ")
            .push_bind(last_name)
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING *")
            .build_query_as::<Account>()
            .fetch_optional(&self.pool)
            .await?;
        let account = account.map(domain::Account::from);
        Ok(account)
    }

    #[instrument(skip(self))]
    async fn delete_account(&self, id: i64) -> Result<Option<domain::Account>, Self::Error> {
        let account = QueryBuilder::new("DELETE FROM account WHERE id = ")
            .push_bind(id)
            .push(" RETURNING *")
            .build_query_as::<Account>()
            .fetch_optional(&self.pool)
            .await?;
        let account = account.map(domain::Account::from);
        Ok(account)
    }
}

#[derive(Debug, FromRow)]
struct Account {
    id: i64,
    first_name: String,
    last_name: String,
    number: i64,
    balance: i64,
    created_at: OffsetDateTime,
}

impl From<Account> for domain::Account {
    fn from(
        Account {
            id,
            first_name,
            last_name,
            number,
            balance,
            created_at,
        }: Account,
    ) -> Self {
        domain::Account {
            id,
            first_name,
            last_name,
            number,
            created_at,
            balance,
        }
    }
}
