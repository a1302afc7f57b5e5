//! User persistence (`users` collection)

use crate::error::{Result, StorageError};
use betnad_core::types::{SubjectId, User};
use bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

/// Collection name
pub const COLLECTION: &str = "users";

/// Stored shape of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_token_expires_at: Option<BsonDateTime>,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        Self {
            uid: SubjectId::new(doc.uid),
            email: doc.email,
            display_name: doc.display_name,
            photo_url: doc.photo_url,
            wallet_address: doc.wallet_address,
            twitter_id: doc.twitter_id,
            twitter_username: doc.twitter_username,
            twitter_access_token: doc.twitter_access_token,
            twitter_refresh_token: doc.twitter_refresh_token,
            twitter_token_expires_at: doc.twitter_token_expires_at.map(|dt| dt.to_chrono()),
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.to_chrono(),
        }
    }
}

fn collection(db: &Database) -> Collection<UserDocument> {
    db.collection(COLLECTION)
}

/// Create the unique index on `uid`
pub async fn ensure_indexes(db: &Database) -> Result<()> {
    let index = IndexModel::builder()
        .keys(doc! { "uid": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    collection(db).create_index(index, None).await?;
    Ok(())
}

/// Find a user by subject id
pub async fn find_by_subject_id(db: &Database, uid: &SubjectId) -> Result<Option<User>> {
    let doc = collection(db)
        .find_one(doc! { "uid": uid.as_str() }, None)
        .await?;

    Ok(doc.map(User::from))
}

/// `updatedAt` for a pipeline update: the database clock, but always at
/// least one millisecond past the stored value.
fn next_updated_at() -> Document {
    doc! {
        "$max": [
            "$$NOW",
            { "$add": [{ "$ifNull": ["$updatedAt", "$$NOW"] }, 1] },
        ]
    }
}

/// Build the `$set` stage of a login upsert.
///
/// Only fields present on the incoming user are written, so a login never
/// clears a stored wallet address or Twitter token. Values go through
/// `$literal` so strings starting with `$` are not read as field paths.
fn upsert_fields(user: &User) -> Document {
    let mut set = doc! {
        "email": { "$literal": user.email.as_str() },
        "createdAt": {
            "$ifNull": ["$createdAt", BsonDateTime::from_chrono(user.created_at)]
        },
        "updatedAt": next_updated_at(),
    };

    let optional = [
        ("displayName", &user.display_name),
        ("photoURL", &user.photo_url),
        ("walletAddress", &user.wallet_address),
        ("twitterId", &user.twitter_id),
        ("twitterUsername", &user.twitter_username),
        ("twitterAccessToken", &user.twitter_access_token),
        ("twitterRefreshToken", &user.twitter_refresh_token),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            set.insert(key, doc! { "$literal": value.as_str() });
        }
    }

    if let Some(expires_at) = user.twitter_token_expires_at {
        set.insert("twitterTokenExpiresAt", BsonDateTime::from_chrono(expires_at));
    }

    set
}

/// Insert or update the user keyed on `uid` in one `findOneAndUpdate`.
///
/// Two first-time upserts racing on the same `uid` can make one of them fail
/// with a duplicate key; that one is retried once and then matches the
/// document the other created.
pub async fn create_or_update(db: &Database, user: &User) -> Result<User> {
    match upsert(db, user).await {
        Err(StorageError::Duplicate(_)) => {
            tracing::debug!(uid = %user.uid, "Concurrent insert detected, retrying upsert");
            upsert(db, user).await
        }
        other => other,
    }
}

async fn upsert(db: &Database, user: &User) -> Result<User> {
    let pipeline = vec![doc! { "$set": upsert_fields(user) }];
    let options = FindOneAndUpdateOptions::builder()
        .upsert(true)
        .return_document(ReturnDocument::After)
        .build();

    collection(db)
        .find_one_and_update(doc! { "uid": user.uid.as_str() }, pipeline, options)
        .await?
        .map(User::from)
        .ok_or_else(|| StorageError::Query(format!("upsert of {} returned no document", user.uid)))
}

/// Set the wallet address of an existing user
pub async fn set_wallet_address(
    db: &Database,
    uid: &SubjectId,
    address: &str,
) -> Result<Option<User>> {
    let update = vec![doc! {
        "$set": {
            "walletAddress": { "$literal": address },
            "updatedAt": next_updated_at(),
        }
    }];
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let doc = collection(db)
        .find_one_and_update(doc! { "uid": uid.as_str() }, update, options)
        .await?;

    Ok(doc.map(User::from))
}

/// Delete a user by subject id
pub async fn delete(db: &Database, uid: &SubjectId) -> Result<bool> {
    let result = collection(db)
        .delete_one(doc! { "uid": uid.as_str() }, None)
        .await?;

    Ok(result.deleted_count > 0)
}
