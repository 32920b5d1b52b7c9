use std::collections::HashSet;

use serde::Deserialize;

use super::error::ApiError;
use crate::constants::{
    MAX_EMAIL_LENGTH, MAX_INGREDIENT_AMOUNT, MAX_NAME_LENGTH, MAX_USERNAME_LENGTH,
    MIN_INGREDIENT_AMOUNT,
};

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        require(&self.email, "email")?;
        require(&self.username, "username")?;
        require(&self.first_name, "first_name")?;
        require(&self.last_name, "last_name")?;
        require(&self.password, "password")?;

        if self.email.len() > MAX_EMAIL_LENGTH {
            return Err(ApiError::Validation(String::from("email is too long")));
        }
        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => {
                return Err(ApiError::Validation(String::from(
                    "email address is not valid",
                )))
            }
        }
        if self.username.len() > MAX_USERNAME_LENGTH {
            return Err(ApiError::Validation(String::from("username is too long")));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        require(&self.email, "email")?;
        require(&self.password, "password")
    }
}

#[derive(Debug, Deserialize)]
pub struct SetPasswordForm {
    pub new_password: String,
    pub current_password: String,
}

impl SetPasswordForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        require(&self.new_password, "new_password")?;
        require(&self.current_password, "current_password")
    }
}

#[derive(Debug, Deserialize)]
pub struct IngredientAmount {
    pub id: i32,
    pub amount: i32,
}

#[derive(Debug, Deserialize)]
pub struct RecipeForm {
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i32>,
    pub image: Option<String>,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
}

impl RecipeForm {
    /// Image is required on create and optional on update, everything else
    /// is validated the same way on both paths.
    pub fn validate(&self, require_image: bool) -> Result<(), ApiError> {
        require(&self.name, "name")?;
        if self.name.len() > MAX_NAME_LENGTH {
            return Err(ApiError::Validation(String::from("name is too long")));
        }
        require(&self.text, "text")?;
        if self.cooking_time < 1 {
            return Err(ApiError::Validation(String::from(
                "cooking_time must be a positive integer",
            )));
        }
        if self.ingredients.is_empty() {
            return Err(ApiError::Validation(String::from(
                "at least one ingredient is required",
            )));
        }

        let mut seen = HashSet::new();
        for ingredient in &self.ingredients {
            if !seen.insert(ingredient.id) {
                return Err(ApiError::Validation(format!(
                    "ingredient {} is listed more than once",
                    ingredient.id
                )));
            }
            if !(MIN_INGREDIENT_AMOUNT..=MAX_INGREDIENT_AMOUNT).contains(&ingredient.amount) {
                return Err(ApiError::Validation(format!(
                    "ingredient amount must be between {} and {}",
                    MIN_INGREDIENT_AMOUNT, MAX_INGREDIENT_AMOUNT
                )));
            }
        }

        if require_image && self.image.is_none() {
            return Err(ApiError::Validation(String::from("image is required")));
        }

        Ok(())
    }
}

/// `#RRGGBB`, used for tag colors loaded from fixtures.
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(digits) => digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn require(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe_form(ingredients: Vec<IngredientAmount>, cooking_time: i32) -> RecipeForm {
        RecipeForm {
            ingredients,
            tags: vec![1],
            image: Some(String::from("data:image/png;base64,AAAA")),
            name: String::from("Borscht"),
            text: String::from("Chop and simmer."),
            cooking_time,
        }
    }

    #[test]
    fn duplicate_ingredient_ids_are_rejected() {
        let form = recipe_form(
            vec![
                IngredientAmount { id: 1, amount: 2 },
                IngredientAmount { id: 1, amount: 5 },
            ],
            30,
        );
        assert!(matches!(form.validate(true), Err(ApiError::Validation(_))));
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let form = recipe_form(vec![IngredientAmount { id: 1, amount: 0 }], 30);
        assert!(form.validate(true).is_err());
        let form = recipe_form(vec![IngredientAmount { id: 1, amount: -5 }], 30);
        assert!(form.validate(true).is_err());
    }

    #[test]
    fn amount_above_upper_bound_is_rejected() {
        let form = recipe_form(vec![IngredientAmount { id: 1, amount: 10_001 }], 30);
        assert!(form.validate(true).is_err());
    }

    #[test]
    fn cooking_time_must_be_positive() {
        let form = recipe_form(vec![IngredientAmount { id: 1, amount: 10 }], 0);
        assert!(form.validate(true).is_err());
    }

    #[test]
    fn image_only_required_on_create() {
        let mut form = recipe_form(vec![IngredientAmount { id: 1, amount: 10 }], 30);
        form.image = None;
        assert!(form.validate(true).is_err());
        assert!(form.validate(false).is_ok());
    }

    #[test]
    fn valid_form_passes() {
        let form = recipe_form(vec![IngredientAmount { id: 1, amount: 10 }], 30);
        assert!(form.validate(true).is_ok());
    }

    #[test]
    fn hex_colors() {
        assert!(is_hex_color("#E26C2D"));
        assert!(is_hex_color("#ffffff"));
        assert!(!is_hex_color("E26C2D"));
        assert!(!is_hex_color("#E26C2"));
        assert!(!is_hex_color("#E26C2DZ"));
        assert!(!is_hex_color("#GGGGGG"));
    }

    #[test]
    fn registration_validates_email_shape() {
        let mut form = RegisterForm {
            email: String::from("cook@example.com"),
            username: String::from("cook"),
            first_name: String::from("Anna"),
            last_name: String::from("Smith"),
            password: String::from("secret123"),
        };
        assert!(form.validate().is_ok());
        form.email = String::from("not-an-email");
        assert!(form.validate().is_err());
    }
}
