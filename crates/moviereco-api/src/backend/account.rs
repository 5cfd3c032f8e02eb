//! Account operations.

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::instrument;

use super::api::LocalAccountApi;
use super::client::{MovieClient, RequestOptions};
use crate::error::ApiError;
use crate::types::{
    AvatarList, AvatarUpload, LoginResponse, ProfileResponse, ProfileUpdate, Registration,
    UploadedAvatar, UserProfile,
};

impl MovieClient {
    async fn load_profile(&self) -> Result<UserProfile, ApiError> {
        if !self.session().is_authenticated() {
            return Err(ApiError::NotAuthenticated);
        }
        let raw: ProfileResponse = self.fetch("/users/profile", RequestOptions::get()).await?;
        Ok(UserProfile::from(raw))
    }
}

impl LocalAccountApi for MovieClient {
    #[instrument(skip_all)]
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let fields = vec![
            (String::from("username"), String::from(email)),
            (String::from("password"), String::from(password)),
        ];
        let response: LoginResponse = self
            .fetch("/auth/login", RequestOptions::post().form(fields))
            .await?;

        // Nothing is stored unless an access token came back.
        let Some(ref token) = response.access_token else {
            tracing::warn!("Login response carried no access token");
            return Ok(response);
        };
        let session = self.session();
        session.set_token(token)?;
        if let Some(ref refresh_token) = response.refresh_token {
            session.set_refresh_token(refresh_token)?;
        }
        if let Some(ref user) = response.user {
            session.set_user(user)?;
        }
        tracing::info!("Signed in");
        Ok(response)
    }

    #[instrument(skip_all)]
    async fn register(&self, registration: &Registration) -> Result<Value, ApiError> {
        let body = serde_json::to_value(registration)?;
        self.api_call("/auth/register", RequestOptions::post().json(body))
            .await
    }

    #[instrument(skip_all)]
    async fn current_user(&self) -> Result<Option<Value>, ApiError> {
        if !self.session().is_authenticated() {
            return Ok(None);
        }
        self.api_call("/auth/me", RequestOptions::get())
            .await
            .map(Some)
    }

    #[instrument(skip_all)]
    async fn user_profile(&self) -> Result<UserProfile, ApiError> {
        self.load_profile().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to load user profile");
            ApiError::ProfileLoad(Box::new(e))
        })
    }

    #[instrument(skip_all)]
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Value, ApiError> {
        let mut form = Form::new();
        if let Some(ref avatar) = update.avatar {
            form = form.text("avatar", avatar.clone());
        }
        if let Some(ref username) = update.username {
            form = form.text("username", username.clone());
        }
        if let Some(ref email) = update.email {
            form = form.text("email", email.clone());
        }

        let response = self
            .api_call("/users/profile", RequestOptions::put().multipart(form))
            .await?;
        if response.is_null() {
            return Err(ApiError::Shape(String::from("No response from server")));
        }
        Ok(response)
    }

    #[instrument(skip_all)]
    async fn upload_profile_picture(
        &self,
        upload: AvatarUpload,
    ) -> Result<UploadedAvatar, ApiError> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime_type)?;
        let form = Form::new().part("avatar", part);
        self.fetch("/users/avatar", RequestOptions::post().multipart(form))
            .await
    }

    #[instrument(skip_all)]
    async fn avatars(&self) -> Result<AvatarList, ApiError> {
        self.fetch("/users/avatars", RequestOptions::get()).await
    }

    #[instrument(skip_all)]
    async fn logout(&self) -> Result<(), ApiError> {
        self.session().clear()?;
        tracing::info!("Signed out");
        Ok(())
    }
}
