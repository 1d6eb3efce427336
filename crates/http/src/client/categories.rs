//! Category management API client methods

use super::{ClientError, OmnideskClient};
use crate::types::{
    CategoriesResponse, Category, CategoryEnvelope, CategoryUpdate, MessageResponse, NewCategory,
};
use reqwest::Method;

impl OmnideskClient {
    /// Active categories with per-status ticket counts
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionExpired`] if not logged in
    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        let req = self.request(Method::GET, "/categories");
        let response: CategoriesResponse = self.execute(req).await?;
        Ok(response.categories)
    }

    /// A category with detailed statistics and its five newest tickets
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if the category does not exist
    pub async fn get_category(&self, id: i64) -> Result<Category, ClientError> {
        let req = self.request(Method::GET, &format!("/categories/{id}"));
        self.execute(req).await
    }

    /// Create a category (admin only)
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Forbidden`] for non-admins and
    /// [`ClientError::BadRequest`] for duplicate or invalid names
    pub async fn create_category(
        &self,
        category: &NewCategory,
    ) -> Result<CategoryEnvelope, ClientError> {
        let req = self.request(Method::POST, "/categories").json(category);
        self.execute(req).await
    }

    /// Update a category (admin only)
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Forbidden`] for non-admins
    pub async fn update_category(
        &self,
        id: i64,
        update: &CategoryUpdate,
    ) -> Result<CategoryEnvelope, ClientError> {
        let req = self
            .request(Method::PUT, &format!("/categories/{id}"))
            .json(update);
        self.execute(req).await
    }

    /// Deactivate a category (admin only)
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::BadRequest`] while the category still has
    /// active tickets
    pub async fn delete_category(&self, id: i64) -> Result<MessageResponse, ClientError> {
        let req = self.request(Method::DELETE, &format!("/categories/{id}"));
        self.execute(req).await
    }
}
