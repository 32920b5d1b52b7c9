pub const DEFAULT_PAGE_SIZE: i64 = 6;
pub const MAX_PAGE_SIZE: i64 = 100;

pub const SESSION_TTL_HOURS: i64 = 24;

/* base64 image payloads inflate request bodies */
pub const MAX_JSON_BODY_BYTES: u64 = 4 * 1024 * 1024;

pub const MIN_INGREDIENT_AMOUNT: i32 = 1;
pub const MAX_INGREDIENT_AMOUNT: i32 = 10_000;

pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MAX_EMAIL_LENGTH: usize = 254;

pub const ACCEPTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg", "gif", "webp"];

/* shopping list document layout, US-Letter in points */
pub const PDF_PAGE_WIDTH_PT: f32 = 612.0;
pub const PDF_PAGE_HEIGHT_PT: f32 = 792.0;
pub const PDF_TITLE_SIZE: f32 = 20.0;
pub const PDF_BODY_SIZE: f32 = 16.0;
pub const PDF_TITLE_X_PT: f32 = 200.0;
pub const PDF_TITLE_Y_PT: f32 = 750.0;
pub const PDF_BODY_X_PT: f32 = 100.0;
pub const PDF_FIRST_LINE_Y_PT: f32 = 710.0;
pub const PDF_LINE_STEP_PT: f32 = 20.0;
pub const PDF_BOTTOM_MARGIN_PT: f32 = 50.0;

pub const SHOPPING_LIST_FILENAME: &str = "shopping_cart.pdf";
