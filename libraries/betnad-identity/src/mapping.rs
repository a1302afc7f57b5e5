//! Provider record to `User` mapping

use betnad_core::{ProviderUser, User};

/// Build the `User` to persist from the provider's record.
///
/// Pure: reads only `record`. A missing email becomes the empty string,
/// `created_at` is the provider's creation time and `updated_at` its last
/// sign-in (or the creation time when the user never signed in). The wallet
/// address and Twitter OAuth tokens are never set here, so an upsert leaves
/// stored values alone.
pub fn map_to_user(record: &ProviderUser) -> User {
    let mut user = User::new(
        record.uid.clone(),
        record.email.clone().unwrap_or_default(),
        record.created_at,
    );

    user.display_name = record.display_name.clone();
    user.photo_url = record.photo_url.clone();
    user.updated_at = record.last_sign_in_at.unwrap_or(record.created_at);

    if let Some(twitter) = &record.twitter {
        user.twitter_id = Some(twitter.id.clone());
        user.twitter_username = twitter.username.clone();
    }

    user
}
