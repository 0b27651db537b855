use rand::Rng;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use utoipa::ToSchema;

/// Account numbers are drawn from `0..ACCOUNT_NUMBER_UPPER_BOUND`. They are not guaranteed to be
/// unique.
pub const ACCOUNT_NUMBER_UPPER_BOUND: i64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Account {
    /// Assigned by the repository on creation, `0` before.
    pub id: i64,

    #[serde(rename = "firstname")]
    pub first_name: String,

    #[serde(rename = "lastname")]
    pub last_name: String,

    pub number: i64,

    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    pub balance: i64,
}

impl Account {
    /// Create a new, not yet persisted account with a random number and a zero balance.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        let number = rand::rng().random_range(0..ACCOUNT_NUMBER_UPPER_BOUND);

        Self {
            id: 0,
            first_name: first_name.into(),
            last_name: last_name.into(),
            number,
            created_at: now_utc_micros(),
            balance: 0,
        }
    }
}

/// Missing names decode as empty strings.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    #[serde(rename = "firstname", default)]
    pub first_name: String,

    #[serde(rename = "lastname", default)]
    pub last_name: String,
}

impl From<CreateAccountRequest> for Account {
    fn from(CreateAccountRequest { first_name, last_name }: CreateAccountRequest) -> Self {
        Account::new(first_name, last_name)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateAccountRequest {
    #[serde(rename = "firstname", default)]
    pub first_name: String,

    #[serde(rename = "lastname", default)]
    pub last_name: String,
}

// Postgres keeps timestamps with microsecond precision.
fn now_utc_micros() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now - Duration::nanoseconds((now.nanosecond() % 1_000) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_new() {
        let before = OffsetDateTime::now_utc();
        let account = Account::new("Ada", "Lovelace");
        let after = OffsetDateTime::now_utc();

        assert_eq!(account.id, 0);
        assert_eq!(account.first_name, "Ada");
        assert_eq!(account.last_name, "Lovelace");
        assert_eq!(account.balance, 0);
        assert!((0..ACCOUNT_NUMBER_UPPER_BOUND).contains(&account.number));
        assert!(account.created_at >= before - Duration::microseconds(1));
        assert!(account.created_at <= after);
        assert_eq!(account.created_at.nanosecond() % 1_000, 0);
        assert_eq!(account.created_at.offset(), time::UtcOffset::UTC);
    }

    #[test]
    fn test_json_field_names() {
        let account = Account::new("Ada", "Lovelace");
        let value = serde_json::to_value(&account).unwrap();

        let Value::Object(fields) = value else {
            panic!("account must serialize as JSON object");
        };
        let mut names = fields.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        assert_eq!(
            names,
            vec!["balance", "createdAt", "firstname", "id", "lastname", "number"]
        );
        assert_eq!(fields["firstname"], json!("Ada"));
        assert_eq!(fields["balance"], json!(0));
    }

    #[test]
    fn test_create_account_request() {
        let request =
            serde_json::from_str::<CreateAccountRequest>(r#"{"firstname":"","lastname":""}"#)
                .unwrap();
        let account = Account::from(request);
        assert!(account.first_name.is_empty());
        assert!(account.last_name.is_empty());

        let request =
            serde_json::from_str::<CreateAccountRequest>(r#"{"firstname":"Ada"}"#).unwrap();
        assert_eq!(request.first_name, "Ada");
        assert!(request.last_name.is_empty());

        let request = serde_json::from_str::<UpdateAccountRequest>("{}").unwrap();
        assert!(request.first_name.is_empty());
        assert!(request.last_name.is_empty());

        let request = serde_json::from_str::<CreateAccountRequest>(r#"{"firstname":42}"#);
        assert!(request.is_err());
    }
}
