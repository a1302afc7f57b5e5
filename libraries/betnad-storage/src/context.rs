use crate::error::StorageError;
use crate::{users, wallets};
use async_trait::async_trait;
use betnad_core::{
    error::Result,
    traits::{UserStore, WalletStore},
    types::*,
};
use bson::doc;
use mongodb::{options::ClientOptions, Client, Database};

/// Storage backed by a single, pooled MongoDB client
#[derive(Clone)]
pub struct MongoStorage {
    client: Client,
    db: Database,
}

impl MongoStorage {
    /// Connect to MongoDB and check the server answers a `ping`
    pub async fn connect(uri: &str, database: &str) -> std::result::Result<Self, StorageError> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        options.app_name = Some("betnad-backend".to_string());

        let client =
            Client::with_options(options).map_err(|e| StorageError::Connection(e.to_string()))?;
        let db = client.database(database);

        db.run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        tracing::info!(database = %database, "Connected to MongoDB");

        Ok(Self { client, db })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Create the unique indexes the models rely on
    pub async fn ensure_indexes(&self) -> std::result::Result<(), StorageError> {
        users::ensure_indexes(&self.db).await?;
        wallets::ensure_indexes(&self.db).await?;
        Ok(())
    }

    /// Close the client; pooled connections are dropped once in-flight operations finish
    pub async fn close(&self) {
        self.client.clone().shutdown().await;
        tracing::info!("MongoDB connection closed");
    }
}

#[async_trait]
impl UserStore for MongoStorage {
    async fn find_by_subject_id(&self, uid: &SubjectId) -> Result<Option<User>> {
        Ok(users::find_by_subject_id(&self.db, uid).await?)
    }

    async fn create_or_update(&self, user: User) -> Result<User> {
        Ok(users::create_or_update(&self.db, &user).await?)
    }

    async fn set_wallet_address(&self, uid: &SubjectId, address: &str) -> Result<Option<User>> {
        Ok(users::set_wallet_address(&self.db, uid, address).await?)
    }

    async fn delete(&self, uid: &SubjectId) -> Result<bool> {
        Ok(users::delete(&self.db, uid).await?)
    }
}

#[async_trait]
impl WalletStore for MongoStorage {
    async fn find_by_user_id(&self, user_id: &SubjectId) -> Result<Option<Wallet>> {
        Ok(wallets::find_by_user_id(&self.db, user_id).await?)
    }

    async fn create(&self, wallet: NewWallet) -> Result<Wallet> {
        Ok(wallets::create(&self.db, wallet).await?)
    }

    async fn update(&self, user_id: &SubjectId, update: WalletUpdate) -> Result<Option<Wallet>> {
        Ok(wallets::update(&self.db, user_id, update).await?)
    }

    async fn delete(&self, user_id: &SubjectId) -> Result<bool> {
        Ok(wallets::delete(&self.db, user_id).await?)
    }
}
