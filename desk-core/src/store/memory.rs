//! In-Memory Store
//!
//! Test double for the remote store. Implements the same row semantics the
//! hosted service applies: system columns assigned at insert, sequential
//! membership numbers, foreign-key checks on payments, and embedded join
//! projections. An offline switch makes every operation fail with a
//! transport error so failure paths can be exercised.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{Value, json};
use uuid::Uuid;

use shared::models::{Identity, Role};

use super::{
    AuthApi, AuthError, AuthSession, OrderDir, QuerySpec, StoreClient, StoreError, StoreResult,
};

struct RegisteredUser {
    password: String,
    identity: Identity,
}

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<Value>>,
    membership_seq: u64,
    users: HashMap<String, RegisteredUser>,
    offline: Option<String>,
}

/// In-memory store and auth service.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with the given message.
    pub fn set_offline(&self, message: impl Into<String>) {
        self.inner.lock().offline = Some(message.into());
    }

    pub fn set_online(&self) {
        self.inner.lock().offline = None;
    }

    /// Register a user account; sign-in with the same pair succeeds.
    pub fn register_user(&self, email: &str, password: &str) -> Identity {
        let identity = Identity {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        self.inner.lock().users.insert(
            email.to_string(),
            RegisteredUser {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );
        identity
    }

    /// Seed a role row for the given user.
    pub fn seed_role(&self, user_id: Uuid, role: &str) {
        self.push_raw(
            "user_roles",
            json!({
                "id": Uuid::new_v4(),
                "user_id": user_id,
                "role": role,
            }),
        );
    }

    pub fn grant_admin(&self, user_id: Uuid) {
        self.seed_role(user_id, Role::Admin.as_str());
    }

    /// Append a row verbatim, bypassing insert-time system columns.
    pub fn push_raw(&self, table: &str, row: Value) {
        self.inner
            .lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    /// Build an unsigned token carrying the identity and expiry claims,
    /// shaped like the tokens the hosted auth service issues.
    pub fn mint_token(identity: &Identity, exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let claims = json!({
            "sub": identity.id,
            "email": identity.email,
            "exp": exp,
        });
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.")
    }

    fn check_online(inner: &Inner) -> StoreResult<()> {
        match &inner.offline {
            Some(message) => Err(StoreError::Transport(message.clone())),
            None => Ok(()),
        }
    }

    /// Stringify a column for equality comparison and sorting.
    fn column_text(row: &Value, column: &str) -> String {
        match row.get(column) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Apply a `related(col_a,col_b)` embedded join term: look up the row in
    /// `related` whose id matches this row's `related_id` singular FK and
    /// attach the projected object (or null) under the resource name.
    fn embed_join(tables: &HashMap<String, Vec<Value>>, row: &mut Value, term: &str) {
        let Some((resource, rest)) = term.split_once('(') else {
            return;
        };
        let resource = resource.trim();
        let columns: Vec<&str> = rest
            .trim_end_matches(')')
            .split(',')
            .map(str::trim)
            .collect();

        // "memberships" joins through "membership_id".
        let fk = format!("{}_id", resource.trim_end_matches('s'));
        let fk_value = row.get(&fk).cloned().unwrap_or(Value::Null);

        let joined = tables
            .get(resource)
            .and_then(|rows| rows.iter().find(|r| r.get("id") == Some(&fk_value)))
            .map(|r| {
                let mut obj = serde_json::Map::new();
                for col in &columns {
                    obj.insert((*col).to_string(), r.get(*col).cloned().unwrap_or(Value::Null));
                }
                Value::Object(obj)
            })
            .unwrap_or(Value::Null);

        if let Value::Object(map) = row {
            map.insert(resource.to_string(), joined);
        }
    }

    fn project(tables: &HashMap<String, Vec<Value>>, row: &Value, columns: &str) -> Value {
        if columns.trim() == "*" {
            return row.clone();
        }

        // Split the projection list at top level, keeping join terms with
        // their parenthesized column lists intact.
        let mut terms: Vec<String> = Vec::new();
        let mut depth = 0usize;
        let mut current = String::new();
        for c in columns.chars() {
            match c {
                '(' => {
                    depth += 1;
                    current.push(c);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                ',' if depth == 0 => {
                    terms.push(current.trim().to_string());
                    current.clear();
                }
                _ => current.push(c),
            }
        }
        if !current.trim().is_empty() {
            terms.push(current.trim().to_string());
        }

        let mut out = if terms.iter().any(|t| t == "*") {
            row.clone()
        } else {
            let mut obj = serde_json::Map::new();
            for term in terms.iter().filter(|t| !t.contains('(')) {
                obj.insert(term.clone(), row.get(term).cloned().unwrap_or(Value::Null));
            }
            Value::Object(obj)
        };

        for term in terms.iter().filter(|t| t.contains('(')) {
            Self::embed_join(tables, &mut out, term);
        }
        out
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn select(&self, table: &str, spec: QuerySpec) -> StoreResult<Vec<Value>> {
        let inner = self.inner.lock();
        Self::check_online(&inner)?;

        let rows = inner.tables.get(table).cloned().unwrap_or_default();

        let mut matched: Vec<(usize, Value)> = rows
            .into_iter()
            .enumerate()
            .filter(|(_, row)| match &spec.filter {
                Some((column, value)) => &Self::column_text(row, column) == value,
                None => true,
            })
            .collect();

        if let Some((column, dir)) = &spec.order {
            // Stable sort on the column text, index as insertion tiebreak.
            matched.sort_by(|(ia, a), (ib, b)| {
                let key_a = (Self::column_text(a, column), *ia);
                let key_b = (Self::column_text(b, column), *ib);
                key_a.cmp(&key_b)
            });
            if *dir == OrderDir::Desc {
                matched.reverse();
            }
        }

        let projected = matched
            .into_iter()
            .map(|(_, row)| match &spec.columns {
                Some(columns) => Self::project(&inner.tables, &row, columns),
                None => row,
            })
            .collect();
        Ok(projected)
    }

    async fn insert(&self, table: &str, row: Value) -> StoreResult<Value> {
        let mut inner = self.inner.lock();
        Self::check_online(&inner)?;

        let mut row = row;
        let map = row
            .as_object_mut()
            .ok_or_else(|| StoreError::Rejected("row must be an object".into()))?;

        map.insert("id".into(), json!(Uuid::new_v4()));
        map.insert("created_at".into(), json!(Utc::now().to_rfc3339()));

        if table == "memberships" {
            inner.membership_seq += 1;
            let number = format!("MEM-{:05}", inner.membership_seq);
            if let Some(map) = row.as_object_mut() {
                map.insert("membership_number".into(), json!(number));
            }
        }

        if table == "payments" {
            let fk = row.get("membership_id").cloned().unwrap_or(Value::Null);
            let exists = inner
                .tables
                .get("memberships")
                .is_some_and(|rows| rows.iter().any(|r| r.get("id") == Some(&fk)));
            if !exists {
                return Err(StoreError::Rejected(
                    "violates foreign key constraint on membership_id".into(),
                ));
            }
        }

        inner
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: &str, fields: Value) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        Self::check_online(&inner)?;

        let Some(map) = fields.as_object() else {
            return Err(StoreError::Rejected("fields must be an object".into()));
        };

        if let Some(rows) = inner.tables.get_mut(table) {
            for row in rows.iter_mut() {
                if Self::column_text(row, "id") == id
                    && let Some(target) = row.as_object_mut()
                {
                    for (key, value) in map {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        // Matching nothing is not an error, mirroring the hosted store.
        Ok(())
    }

    async fn count(&self, table: &str) -> StoreResult<u64> {
        let inner = self.inner.lock();
        Self::check_online(&inner)?;
        Ok(inner.tables.get(table).map_or(0, |rows| rows.len() as u64))
    }
}

#[async_trait]
impl AuthApi for MemoryStore {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let inner = self.inner.lock();
        if let Some(message) = &inner.offline {
            return Err(AuthError::Service(message.clone()));
        }

        let user = inner
            .users
            .get(email)
            .filter(|u| u.password == password)
            .ok_or(AuthError::InvalidCredentials)?;

        let exp = Utc::now().timestamp() + 3600;
        Ok(AuthSession {
            access_token: Self::mint_token(&user.identity, exp),
            identity: user.identity.clone(),
        })
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthSession, AuthError> {
        let mut inner = self.inner.lock();
        if let Some(message) = &inner.offline {
            return Err(AuthError::Service(message.clone()));
        }
        if password.len() < 6 {
            return Err(AuthError::WeakPassword);
        }
        if inner.users.contains_key(email) {
            return Err(AuthError::EmailTaken);
        }

        let identity = Identity {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        inner.users.insert(
            email.to_string(),
            RegisteredUser {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );
        inner
            .tables
            .entry("profiles".to_string())
            .or_default()
            .push(json!({
                "id": identity.id,
                "email": email,
                "full_name": full_name,
                "created_at": Utc::now().to_rfc3339(),
            }));

        let exp = Utc::now().timestamp() + 3600;
        Ok(AuthSession {
            access_token: Self::mint_token(&identity, exp),
            identity,
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        let inner = self.inner.lock();
        if let Some(message) = &inner.offline {
            return Err(AuthError::Service(message.clone()));
        }
        Ok(())
    }
}
