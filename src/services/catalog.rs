//! Catalog Service - Category and product management
//!
//! Customer-facing reads filter soft-deleted rows out; admin mutations
//! reach any row, so a hidden product can still be edited or brought back
//! by flipping `is_active`.
//!
//! Prices are normalized to two decimal places on the way in. Stored
//! prices are therefore already rounded and checkout arithmetic downstream
//! works on exact values.

use crate::db::ShopStorage;
use crate::db::models::{
    Category, CategoryCreate, CategoryUpdate, Product, ProductCreate, ProductUpdate,
};
use crate::orders::money;
use crate::utils::validation::{
    self, MAX_CATEGORY_NAME_LEN, MAX_PRODUCT_NAME_LEN,
};
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct CatalogService {
    storage: ShopStorage,
}

impl CatalogService {
    pub fn new(storage: ShopStorage) -> Self {
        Self { storage }
    }

    // ========== Categories ==========

    pub fn create_category(&self, request: CategoryCreate) -> AppResult<Category> {
        validation::validate_required_text(&request.name, "Category name", MAX_CATEGORY_NAME_LEN)?;
        let category = Category::new(request.name, request.description);
        self.storage.insert_category(&category)?;
        tracing::info!(category_id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub fn update_category(
        &self,
        category_id: i64,
        update: CategoryUpdate,
    ) -> AppResult<Category> {
        if let Some(name) = &update.name {
            validation::validate_required_text(name, "Category name", MAX_CATEGORY_NAME_LEN)?;
        }
        let updated = self
            .storage
            .update_category(category_id, &update)?
            .ok_or_else(|| AppError::not_found(format!("Category not found: {category_id}")))?;
        tracing::info!(category_id, "Category updated");
        Ok(updated)
    }

    /// Soft-delete: flips `is_active` off and leaves the row in place, so
    /// existing cart rows and order lines keep resolving. Repeating the
    /// call is a no-op that still succeeds.
    pub fn delete_category(&self, category_id: i64) -> AppResult<Category> {
        let update = CategoryUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        let deleted = self
            .storage
            .update_category(category_id, &update)?
            .ok_or_else(|| AppError::not_found(format!("Category not found: {category_id}")))?;
        tracing::info!(category_id, name = %deleted.name, "Category deactivated");
        Ok(deleted)
    }

    /// Active categories, for the storefront menu.
    pub fn get_categories(&self) -> AppResult<Vec<Category>> {
        let categories = self
            .storage
            .list_categories()?
            .into_iter()
            .filter(|category| category.is_active)
            .collect();
        Ok(categories)
    }

    /// One active category. Inactive rows look absent to customers.
    pub fn get_category(&self, category_id: i64) -> AppResult<Category> {
        self.storage
            .get_category(category_id)?
            .filter(|category| category.is_active)
            .ok_or_else(|| AppError::not_found(format!("Category not found: {category_id}")))
    }

    // ========== Products ==========

    pub fn create_product(&self, mut request: ProductCreate) -> AppResult<Product> {
        request.price = money::round_amount(request.price);
        validation::validate_required_text(&request.name, "Product name", MAX_PRODUCT_NAME_LEN)?;
        validation::validate_price(request.price)?;
        validation::validate_stock(request.stock_quantity)?;
        // Admin-side FK check: the category must exist, active or not
        if self.storage.get_category(request.category_id)?.is_none() {
            return Err(AppError::not_found(format!(
                "Category not found: {}",
                request.category_id
            )));
        }
        let product = Product::new(request);
        self.storage.insert_product(&product)?;
        tracing::info!(product_id = product.id, name = %product.name, price = %product.price, "Product created");
        Ok(product)
    }

    pub fn update_product(&self, product_id: i64, mut update: ProductUpdate) -> AppResult<Product> {
        if let Some(name) = &update.name {
            validation::validate_required_text(name, "Product name", MAX_PRODUCT_NAME_LEN)?;
        }
        if let Some(price) = update.price {
            let price = money::round_amount(price);
            validation::validate_price(price)?;
            update.price = Some(price);
        }
        if let Some(stock_quantity) = update.stock_quantity {
            validation::validate_stock(stock_quantity)?;
        }
        if let Some(category_id) = update.category_id
            && self.storage.get_category(category_id)?.is_none()
        {
            return Err(AppError::not_found(format!(
                "Category not found: {category_id}"
            )));
        }
        let updated = self
            .storage
            .update_product(product_id, &update)?
            .ok_or_else(|| AppError::not_found(format!("Product not found: {product_id}")))?;
        tracing::info!(product_id, "Product updated");
        Ok(updated)
    }

    /// Soft-delete, same semantics as [`Self::delete_category`].
    pub fn delete_product(&self, product_id: i64) -> AppResult<Product> {
        let update = ProductUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        let deleted = self
            .storage
            .update_product(product_id, &update)?
            .ok_or_else(|| AppError::not_found(format!("Product not found: {product_id}")))?;
        tracing::info!(product_id, name = %deleted.name, "Product deactivated");
        Ok(deleted)
    }

    /// Active products of one category, for the storefront listing.
    pub fn get_products(&self, category_id: i64) -> AppResult<Vec<Product>> {
        let products = self
            .storage
            .list_products_by_category(category_id)?
            .into_iter()
            .filter(|product| product.is_active)
            .collect();
        Ok(products)
    }

    /// Every active product across all categories.
    pub fn get_all_products(&self) -> AppResult<Vec<Product>> {
        let products = self
            .storage
            .list_products()?
            .into_iter()
            .filter(|product| product.is_active)
            .collect();
        Ok(products)
    }

    /// One active product. Inactive rows look absent to customers.
    pub fn get_product(&self, product_id: i64) -> AppResult<Product> {
        self.storage
            .get_product(product_id)?
            .filter(|product| product.is_active)
            .ok_or_else(|| AppError::not_found(format!("Product not found: {product_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn create_test_service() -> CatalogService {
        CatalogService::new(ShopStorage::open_in_memory().unwrap())
    }

    fn create_test_product_request(category_id: i64, name: &str) -> ProductCreate {
        ProductCreate {
            category_id,
            name: name.to_string(),
            description: None,
            price: Decimal::from(100),
            photo_url: None,
            stock_quantity: 10,
        }
    }

    #[test]
    fn test_create_category_validates_name() {
        let service = create_test_service();
        let err = service
            .create_category(CategoryCreate {
                name: "   ".to_string(),
                description: None,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let category = service
            .create_category(CategoryCreate {
                name: "Tea".to_string(),
                description: Some("Loose leaf".to_string()),
            })
            .unwrap();
        assert_eq!(category.name, "Tea");
    }

    #[test]
    fn test_multibyte_category_names_measured_in_characters() {
        let service = create_test_service();
        // 59 characters but over 100 UTF-8 bytes; the limit is on characters
        let name = "Чай ".repeat(15).trim_end().to_string();
        let category = service
            .create_category(CategoryCreate {
                name: name.clone(),
                description: None,
            })
            .unwrap();
        assert_eq!(category.name, name);
    }

    #[test]
    fn test_duplicate_category_name_is_validation_error() {
        let service = create_test_service();
        service
            .create_category(CategoryCreate {
                name: "Tea".to_string(),
                description: None,
            })
            .unwrap();
        let err = service
            .create_category(CategoryCreate {
                name: "Tea".to_string(),
                description: None,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_deleted_category_hidden_from_customers_but_editable() {
        let service = create_test_service();
        let category = service
            .create_category(CategoryCreate {
                name: "Tea".to_string(),
                description: None,
            })
            .unwrap();

        service.delete_category(category.id).unwrap();
        assert!(service.get_categories().unwrap().is_empty());
        assert!(matches!(
            service.get_category(category.id).unwrap_err(),
            AppError::NotFound(_)
        ));

        // Admin can still reach it and bring it back
        let restored = service
            .update_category(
                category.id,
                CategoryUpdate {
                    is_active: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(restored.is_active);
        assert_eq!(service.get_categories().unwrap().len(), 1);

        // Deleting twice still succeeds
        service.delete_category(category.id).unwrap();
        service.delete_category(category.id).unwrap();
    }

    #[test]
    fn test_create_product_requires_existing_category() {
        let service = create_test_service();
        let err = service
            .create_product(create_test_product_request(404, "Sencha"))
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_create_product_rounds_price_before_validating() {
        let service = create_test_service();
        let category = service
            .create_category(CategoryCreate {
                name: "Tea".to_string(),
                description: None,
            })
            .unwrap();

        let mut request = create_test_product_request(category.id, "Sencha");
        request.price = Decimal::new(99_995, 3); // 99.995 -> 100.00
        let product = service.create_product(request).unwrap();
        assert_eq!(product.price, Decimal::new(10_000, 2));

        // 0.004 rounds to 0.00, which fails the positive check
        let mut request = create_test_product_request(category.id, "Dust");
        request.price = Decimal::new(4, 3);
        assert!(matches!(
            service.create_product(request).unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[test]
    fn test_product_visibility_follows_is_active() {
        let service = create_test_service();
        let category = service
            .create_category(CategoryCreate {
                name: "Tea".to_string(),
                description: None,
            })
            .unwrap();
        let product = service
            .create_product(create_test_product_request(category.id, "Sencha"))
            .unwrap();

        assert_eq!(service.get_products(category.id).unwrap().len(), 1);
        assert_eq!(service.get_all_products().unwrap().len(), 1);

        service.delete_product(product.id).unwrap();
        assert!(service.get_products(category.id).unwrap().is_empty());
        assert!(service.get_all_products().unwrap().is_empty());
        assert!(matches!(
            service.get_product(product.id).unwrap_err(),
            AppError::NotFound(_)
        ));

        // Admin update still reaches the hidden row
        let updated = service
            .update_product(
                product.id,
                ProductUpdate {
                    stock_quantity: Some(3),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.stock_quantity, 3);
        assert!(!updated.is_active);
    }

    #[test]
    fn test_deleting_category_leaves_products_in_place() {
        let service = create_test_service();
        let category = service
            .create_category(CategoryCreate {
                name: "Tea".to_string(),
                description: None,
            })
            .unwrap();
        let product = service
            .create_product(create_test_product_request(category.id, "Sencha"))
            .unwrap();

        service.delete_category(category.id).unwrap();

        // The product row survives and stays individually fetchable
        let fetched = service.get_product(product.id).unwrap();
        assert!(fetched.is_active);
        assert_eq!(fetched.category_id, category.id);
    }

    #[test]
    fn test_update_product_rejects_unknown_category_move() {
        let service = create_test_service();
        let category = service
            .create_category(CategoryCreate {
                name: "Tea".to_string(),
                description: None,
            })
            .unwrap();
        let product = service
            .create_product(create_test_product_request(category.id, "Sencha"))
            .unwrap();

        let err = service
            .update_product(
                product.id,
                ProductUpdate {
                    category_id: Some(12345),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
