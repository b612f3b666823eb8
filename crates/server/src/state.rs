use std::sync::Arc;

use service::{images::ImageStore, meals::MealStore, vendors::VendorStore};

/// Shared handler state: one store per collection plus the image directory.
#[derive(Clone)]
pub struct AppState {
    pub vendors: Arc<VendorStore>,
    pub meals: Arc<MealStore>,
    pub images: Arc<ImageStore>,
}
